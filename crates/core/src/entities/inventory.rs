//! Inbound stock: receipts with their line items.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReceipt {
    pub id: String,
    pub business_id: String,
    pub supplier_name: Option<String>,
    pub received_at: i64,
    pub items: Vec<StockReceiptItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReceiptItem {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}
