//! Invoice payload embedded in a print job

use rust_decimal::Decimal;
use serde::de::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::amount::Amount;
use super::lenient;

/// Structured invoice record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintData {
    // === Company identity ===
    #[serde(deserialize_with = "lenient::text")]
    pub company_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub company_address: String,
    #[serde(alias = "vat_reg_no", alias = "company_vat_no", deserialize_with = "lenient::text")]
    pub company_vat: String,

    // === Invoice metadata ===
    #[serde(alias = "invoice_no", deserialize_with = "lenient::text")]
    pub invoice_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(deserialize_with = "lenient::text")]
    pub member_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub department: String,
    #[serde(deserialize_with = "lenient::text")]
    pub payment_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub total_in_words: String,

    // === Aggregates ===
    pub discount: Amount,
    pub service_charge: Amount,
    pub vat_amount: Amount,
    #[serde(alias = "invoice_discount")]
    pub invoice_discount_amount: Amount,
    pub total: Amount,

    #[serde(deserialize_with = "lenient::seq")]
    pub products: Vec<LineItem>,
}

impl PrintData {
    /// Decode a job's `print_data`
    ///
    /// Some producers store the payload as a JSON-encoded string; both forms
    /// are accepted.
    pub fn from_payload(payload: &Value) -> serde_json::Result<Self> {
        match payload {
            Value::Object(_) => Self::deserialize(payload),
            Value::String(s) => {
                let decoded: Value = serde_json::from_str(s)?;
                match decoded {
                    Value::Object(_) => Self::deserialize(&decoded),
                    _ => Err(Error::custom("print_data must be an object")),
                }
            }
            _ => Err(Error::custom("print_data must be an object")),
        }
    }
}

/// One invoice line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(alias = "qty")]
    pub quantity: Amount,
    #[serde(alias = "unit_price")]
    pub price: Amount,
    /// Pre-computed line total, may be absent
    pub total: Amount,
}

impl LineItem {
    /// Line total, derived as quantity × price when not supplied
    ///
    /// `None` when the derived product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        match self.total.get() {
            Some(total) => Some(total),
            None => self.quantity.value().checked_mul(self.price.value()),
        }
    }
}
