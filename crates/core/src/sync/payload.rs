//! Typed wire payloads for the remote upsert endpoints.
//!
//! Each entity kind has an explicit payload struct, so adding or renaming a
//! field is a compile-time-checked change rather than a silent shape mismatch
//! between a local row and the remote call. Aggregates embed their line items;
//! an aggregate and its items always travel as one atomic payload.

use serde::{Deserialize, Serialize};

use super::SyncEntityKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUpsert {
    pub id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub name: String,
    pub currency_code: String,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub display_name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub full_name: String,
    pub phone: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub name: String,
    pub sku: Option<String>,
    /// Unit price in minor currency units.
    pub price_cents: i64,
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub plan_code: String,
    pub status: String,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItemPayload {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTransactionUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub customer_id: Option<String>,
    pub user_id: Option<String>,
    pub total_cents: i64,
    pub payment_method: String,
    pub occurred_at: i64,
    pub items: Vec<TransactionItemPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashShiftUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub user_id: Option<String>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub opening_float_cents: i64,
    pub closing_total_cents: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReceiptItemPayload {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReceiptUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub supplier_name: Option<String>,
    pub received_at: i64,
    pub items: Vec<StockReceiptItemPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogUpsert {
    pub id: String,
    pub business_id: String,
    pub updated_at: i64,
    pub deleted: bool,
    pub user_id: Option<String>,
    pub action: String,
    pub detail: Option<String>,
    pub occurred_at: i64,
}

/// One upsert call's body, tagged by entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum UpsertPayload {
    Business(BusinessUpsert),
    User(UserUpsert),
    Customer(CustomerUpsert),
    Product(ProductUpsert),
    Subscription(SubscriptionUpsert),
    SaleTransaction(SaleTransactionUpsert),
    CashShift(CashShiftUpsert),
    StockReceipt(StockReceiptUpsert),
    ActivityLog(ActivityLogUpsert),
}

impl UpsertPayload {
    pub fn kind(&self) -> SyncEntityKind {
        match self {
            UpsertPayload::Business(_) => SyncEntityKind::Business,
            UpsertPayload::User(_) => SyncEntityKind::User,
            UpsertPayload::Customer(_) => SyncEntityKind::Customer,
            UpsertPayload::Product(_) => SyncEntityKind::Product,
            UpsertPayload::Subscription(_) => SyncEntityKind::Subscription,
            UpsertPayload::SaleTransaction(_) => SyncEntityKind::SaleTransaction,
            UpsertPayload::CashShift(_) => SyncEntityKind::CashShift,
            UpsertPayload::StockReceipt(_) => SyncEntityKind::StockReceipt,
            UpsertPayload::ActivityLog(_) => SyncEntityKind::ActivityLog,
        }
    }

    /// Stable identity of the record being upserted.
    pub fn record_id(&self) -> &str {
        match self {
            UpsertPayload::Business(p) => &p.id,
            UpsertPayload::User(p) => &p.id,
            UpsertPayload::Customer(p) => &p.id,
            UpsertPayload::Product(p) => &p.id,
            UpsertPayload::Subscription(p) => &p.id,
            UpsertPayload::SaleTransaction(p) => &p.id,
            UpsertPayload::CashShift(p) => &p.id,
            UpsertPayload::StockReceipt(p) => &p.id,
            UpsertPayload::ActivityLog(p) => &p.id,
        }
    }

    /// Tenant scope, absent only on the root entity.
    pub fn business_id(&self) -> Option<&str> {
        match self {
            UpsertPayload::Business(_) => None,
            UpsertPayload::User(p) => Some(&p.business_id),
            UpsertPayload::Customer(p) => Some(&p.business_id),
            UpsertPayload::Product(p) => Some(&p.business_id),
            UpsertPayload::Subscription(p) => Some(&p.business_id),
            UpsertPayload::SaleTransaction(p) => Some(&p.business_id),
            UpsertPayload::CashShift(p) => Some(&p.business_id),
            UpsertPayload::StockReceipt(p) => Some(&p.business_id),
            UpsertPayload::ActivityLog(p) => Some(&p.business_id),
        }
    }

    pub fn updated_at(&self) -> i64 {
        match self {
            UpsertPayload::Business(p) => p.updated_at,
            UpsertPayload::User(p) => p.updated_at,
            UpsertPayload::Customer(p) => p.updated_at,
            UpsertPayload::Product(p) => p.updated_at,
            UpsertPayload::Subscription(p) => p.updated_at,
            UpsertPayload::SaleTransaction(p) => p.updated_at,
            UpsertPayload::CashShift(p) => p.updated_at,
            UpsertPayload::StockReceipt(p) => p.updated_at,
            UpsertPayload::ActivityLog(p) => p.updated_at,
        }
    }

    pub fn deleted(&self) -> bool {
        match self {
            UpsertPayload::Business(p) => p.deleted,
            UpsertPayload::User(p) => p.deleted,
            UpsertPayload::Customer(p) => p.deleted,
            UpsertPayload::Product(p) => p.deleted,
            UpsertPayload::Subscription(p) => p.deleted,
            UpsertPayload::SaleTransaction(p) => p.deleted,
            UpsertPayload::CashShift(p) => p.deleted,
            UpsertPayload::StockReceipt(p) => p.deleted,
            UpsertPayload::ActivityLog(p) => p.deleted,
        }
    }
}

/// A row selected for pushing, with its write-back identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub kind: SyncEntityKind,
    pub record_id: String,
    pub payload: UpsertPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_payload() -> UpsertPayload {
        UpsertPayload::Customer(CustomerUpsert {
            id: "c1".to_string(),
            business_id: "t1".to_string(),
            updated_at: 1000,
            deleted: false,
            full_name: "Amai Moyo".to_string(),
            phone: None,
            note: None,
        })
    }

    #[test]
    fn payload_tag_matches_entity_wire_name() {
        let value = serde_json::to_value(customer_payload()).unwrap();
        assert_eq!(value["entity"], "customer");
        assert_eq!(
            value["entity"],
            SyncEntityKind::Customer.wire_name(),
            "tag and route segment must agree"
        );
    }

    #[test]
    fn payload_fields_are_camel_case() {
        let value = serde_json::to_value(customer_payload()).unwrap();
        assert_eq!(value["businessId"], "t1");
        assert_eq!(value["updatedAt"], 1000);
        assert_eq!(value["fullName"], "Amai Moyo");
        assert_eq!(value["deleted"], false);
    }

    #[test]
    fn aggregate_embeds_line_items() {
        let payload = UpsertPayload::SaleTransaction(SaleTransactionUpsert {
            id: "tx1".to_string(),
            business_id: "t1".to_string(),
            updated_at: 1001,
            deleted: false,
            customer_id: Some("c1".to_string()),
            user_id: None,
            total_cents: 550,
            payment_method: "cash".to_string(),
            occurred_at: 1001,
            items: vec![TransactionItemPayload {
                id: "li1".to_string(),
                product_id: "p1".to_string(),
                quantity: 2,
                unit_price_cents: 275,
                line_total_cents: 550,
            }],
        });

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["items"][0]["unitPriceCents"], 275);

        let round_tripped: UpsertPayload = serde_json::from_value(value).unwrap();
        assert_eq!(round_tripped, payload);
    }

    #[test]
    fn accessors_agree_with_variant_contents() {
        let payload = customer_payload();
        assert_eq!(payload.kind(), SyncEntityKind::Customer);
        assert_eq!(payload.record_id(), "c1");
        assert_eq!(payload.business_id(), Some("t1"));
        assert_eq!(payload.updated_at(), 1000);
        assert!(!payload.deleted());
    }
}
