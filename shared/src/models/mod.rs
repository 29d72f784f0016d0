//! Data models
//!
//! Payloads come from a remote queue whose producers are not under our
//! control, so deserialization is lenient: missing or `null` text becomes an
//! empty string and unparsable numbers become an absent [`Amount`].

pub mod amount;
pub mod print_data;
pub mod print_job;

// Re-exports
pub use amount::Amount;
pub use print_data::{LineItem, PrintData};
pub use print_job::{JobStatus, MarkJobRequest, PrintJob};

pub(crate) mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Text field that tolerates `null`, numbers and booleans
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(D::Error::custom(format!("expected text, got {}", other))),
        }
    }

    /// Optional text field, `null` stays absent
    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(D::Error::custom(format!("expected text, got {}", other))),
        }
    }

    /// Sequence field where `null` means empty
    pub fn seq<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
    }
}
