//! Sales aggregates: transactions with their line items, and cash shifts.

use serde::{Deserialize, Serialize};

/// A completed sale. Line items are part of the aggregate: they are stored,
/// loaded and synchronized with the transaction, never on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTransaction {
    pub id: String,
    pub business_id: String,
    pub customer_id: Option<String>,
    pub user_id: Option<String>,
    pub total_cents: i64,
    pub payment_method: String,
    pub occurred_at: i64,
    pub items: Vec<TransactionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// A till session between opening and closing counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashShift {
    pub id: String,
    pub business_id: String,
    pub user_id: Option<String>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub opening_float_cents: i64,
    pub closing_total_cents: Option<i64>,
}
