//! Entity catalog and push ordering.

use serde::{Deserialize, Serialize};

/// Entity types that carry their own sync metadata and are pushed
/// independently.
///
/// Line items (`transaction_items`, `stock_receipt_items`) are not listed
/// here: they have no sync metadata of their own and travel inside their
/// owning aggregate's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntityKind {
    Business,
    User,
    Customer,
    Product,
    Subscription,
    SaleTransaction,
    CashShift,
    StockReceipt,
    ActivityLog,
}

/// Total push order for one cycle.
///
/// The tenant root goes first, then the entities its dependents reference,
/// then the dependents themselves. Within a cycle a kind is fully drained
/// before the next kind starts, so a parent's push attempt always precedes
/// its dependents'.
pub const PUSH_ORDER: [SyncEntityKind; 9] = [
    SyncEntityKind::Business,
    SyncEntityKind::User,
    SyncEntityKind::Customer,
    SyncEntityKind::Product,
    SyncEntityKind::Subscription,
    SyncEntityKind::SaleTransaction,
    SyncEntityKind::CashShift,
    SyncEntityKind::StockReceipt,
    SyncEntityKind::ActivityLog,
];

impl SyncEntityKind {
    /// Wire name used in payload tags and upsert route paths.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SyncEntityKind::Business => "business",
            SyncEntityKind::User => "user",
            SyncEntityKind::Customer => "customer",
            SyncEntityKind::Product => "product",
            SyncEntityKind::Subscription => "subscription",
            SyncEntityKind::SaleTransaction => "sale_transaction",
            SyncEntityKind::CashShift => "cash_shift",
            SyncEntityKind::StockReceipt => "stock_receipt",
            SyncEntityKind::ActivityLog => "activity_log",
        }
    }

    /// Local table holding this entity's rows.
    pub fn table_name(&self) -> &'static str {
        match self {
            SyncEntityKind::Business => "businesses",
            SyncEntityKind::User => "users",
            SyncEntityKind::Customer => "customers",
            SyncEntityKind::Product => "products",
            SyncEntityKind::Subscription => "subscriptions",
            SyncEntityKind::SaleTransaction => "sale_transactions",
            SyncEntityKind::CashShift => "cash_shifts",
            SyncEntityKind::StockReceipt => "stock_receipts",
            SyncEntityKind::ActivityLog => "activity_logs",
        }
    }

    /// Whether remote documents of this kind are keyed by (`businessId`, `id`)
    /// rather than `id` alone.
    pub fn is_tenant_scoped(&self) -> bool {
        !matches!(self, SyncEntityKind::Business)
    }
}
