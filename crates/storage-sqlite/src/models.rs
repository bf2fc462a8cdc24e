//! Database row models, one per table.
//!
//! `deleted` is stored as 0/1 and `sync_status` as its string form; the
//! repository converts to and from the core types at the boundary.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::businesses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BusinessDB {
    pub id: String,
    pub name: String,
    pub currency_code: String,
    pub contact_phone: Option<String>,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub business_id: String,
    pub display_name: String,
    pub role: String,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CustomerDB {
    pub id: String,
    pub business_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub note: Option<String>,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDB {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i64,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubscriptionDB {
    pub id: String,
    pub business_id: String,
    pub plan_code: String,
    pub status: String,
    pub expires_at: Option<i64>,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::sale_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SaleTransactionDB {
    pub id: String,
    pub business_id: String,
    pub customer_id: Option<String>,
    pub user_id: Option<String>,
    pub total_cents: i64,
    pub payment_method: String,
    pub occurred_at: i64,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::transaction_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionItemDB {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::cash_shifts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CashShiftDB {
    pub id: String,
    pub business_id: String,
    pub user_id: Option<String>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub opening_float_cents: i64,
    pub closing_total_cents: Option<i64>,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::stock_receipts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockReceiptDB {
    pub id: String,
    pub business_id: String,
    pub supplier_name: Option<String>,
    pub received_at: i64,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::stock_receipt_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockReceiptItemDB {
    pub id: String,
    pub receipt_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::activity_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ActivityLogDB {
    pub id: String,
    pub business_id: String,
    pub user_id: Option<String>,
    pub action: String,
    pub detail: Option<String>,
    pub occurred_at: i64,
    pub updated_at: i64,
    pub sync_status: String,
    pub remote_id: Option<String>,
    pub deleted: i32,
    pub last_error: Option<String>,
}
