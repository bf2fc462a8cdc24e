//! Tenant root: one business account per device fleet.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub name: String,
    /// ISO 4217 code; all money fields are minor units of this currency.
    pub currency_code: String,
    pub contact_phone: Option<String>,
}
