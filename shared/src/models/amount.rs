//! Lenient decimal amounts

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A decimal value that may be absent
///
/// Accepts JSON strings or numbers. `null`, missing fields, empty strings and
/// anything that does not parse as a decimal are all treated as absent;
/// [`value`](Self::value) reads an absent amount as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amount(Option<Decimal>);

impl Amount {
    pub const fn absent() -> Self {
        Self(None)
    }

    /// Parse text such as `"5.50"`, `"-3"` or `"1e3"`
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self(None);
        }
        Self(
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .ok(),
        )
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Self::parse(&n.to_string()),
            _ => Self(None),
        }
    }

    pub fn get(&self) -> Option<Decimal> {
        self.0
    }

    /// The amount, or zero when absent
    pub fn value(&self) -> Decimal {
        self.0.unwrap_or(Decimal::ZERO)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(Self::from_value(&value))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(d) => s.serialize_str(&d.to_string()),
            None => s.serialize_none(),
        }
    }
}
