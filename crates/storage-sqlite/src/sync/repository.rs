//! Repository over the local record store.
//!
//! Three roles, all row-scoped and local-only:
//! - save helpers used by the application: write domain fields, bump
//!   `updated_at`, reset the row to pending (a cached `remote_id` and the
//!   tombstone flag survive edits);
//! - the change selector used by the push engine: every pending or failed row
//!   per entity kind, tombstones included, as a typed upsert payload;
//! - the status reconciler: metadata-only write-back of push outcomes.

use std::collections::HashMap;
use std::sync::Arc;

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};

use tillpoint_core::entities::{
    ActivityLog, Business, CashShift, Customer, Product, SaleTransaction, StockReceipt,
    Subscription, User,
};
use tillpoint_core::errors::Result;
use tillpoint_core::sync::{
    ActivityLogUpsert, BusinessUpsert, CashShiftUpsert, CustomerUpsert, PendingRecord,
    ProductUpsert, SaleTransactionUpsert, StockReceiptItemPayload, StockReceiptUpsert,
    SubscriptionUpsert, SyncEntityKind, SyncMeta, SyncStatus, TransactionItemPayload, UpsertPayload,
    UserUpsert, PUSH_ORDER,
};
use tillpoint_core::time::now_millis;

use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::models::*;
use crate::schema::{
    activity_logs, businesses, cash_shifts, customers, products, sale_transactions,
    stock_receipts, stock_receipt_items, subscriptions, transaction_items, users,
};

/// Statuses eligible for selection: failed rows are retried every cycle.
const PUSH_ELIGIBLE_STATUSES: [&str; 2] = ["pending", "failed"];

fn quote_identifier(value: &str) -> String {
    format!("`{}`", value.replace('`', "``"))
}

#[derive(diesel::QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    c: i64,
}

#[derive(diesel::QueryableByName)]
struct SyncMetaRow {
    #[diesel(sql_type = Text)]
    sync_status: String,
    #[diesel(sql_type = Nullable<Text>)]
    remote_id: Option<String>,
    #[diesel(sql_type = BigInt)]
    deleted: i64,
    #[diesel(sql_type = Nullable<Text>)]
    last_error: Option<String>,
    #[diesel(sql_type = BigInt)]
    updated_at: i64,
}

pub struct SyncRepository {
    pool: Arc<DbPool>,
}

impl SyncRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Local mutations
    // ─────────────────────────────────────────────────────────────────────

    pub fn save_business(&self, business: &Business) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        let row = BusinessDB {
            id: business.id.clone(),
            name: business.name.clone(),
            currency_code: business.currency_code.clone(),
            contact_phone: business.contact_phone.clone(),
            updated_at: now,
            sync_status: SyncStatus::Pending.as_db_str().to_string(),
            remote_id: None,
            deleted: 0,
            last_error: None,
        };
        diesel::insert_into(businesses::table)
            .values(&row)
            .on_conflict(businesses::id)
            .do_update()
            .set((
                businesses::name.eq(&business.name),
                businesses::currency_code.eq(&business.currency_code),
                businesses::contact_phone.eq(business.contact_phone.clone()),
                businesses::updated_at.eq(now),
                businesses::sync_status.eq(SyncStatus::Pending.as_db_str()),
                businesses::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        let row = UserDB {
            id: user.id.clone(),
            business_id: user.business_id.clone(),
            display_name: user.display_name.clone(),
            role: user.role.clone(),
            updated_at: now,
            sync_status: SyncStatus::Pending.as_db_str().to_string(),
            remote_id: None,
            deleted: 0,
            last_error: None,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set((
                users::display_name.eq(&user.display_name),
                users::role.eq(&user.role),
                users::updated_at.eq(now),
                users::sync_status.eq(SyncStatus::Pending.as_db_str()),
                users::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    pub fn save_customer(&self, customer: &Customer) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        let row = CustomerDB {
            id: customer.id.clone(),
            business_id: customer.business_id.clone(),
            full_name: customer.full_name.clone(),
            phone: customer.phone.clone(),
            note: customer.note.clone(),
            updated_at: now,
            sync_status: SyncStatus::Pending.as_db_str().to_string(),
            remote_id: None,
            deleted: 0,
            last_error: None,
        };
        diesel::insert_into(customers::table)
            .values(&row)
            .on_conflict(customers::id)
            .do_update()
            .set((
                customers::full_name.eq(&customer.full_name),
                customers::phone.eq(customer.phone.clone()),
                customers::note.eq(customer.note.clone()),
                customers::updated_at.eq(now),
                customers::sync_status.eq(SyncStatus::Pending.as_db_str()),
                customers::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    pub fn save_product(&self, product: &Product) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        let row = ProductDB {
            id: product.id.clone(),
            business_id: product.business_id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            price_cents: product.price_cents,
            stock_quantity: product.stock_quantity,
            updated_at: now,
            sync_status: SyncStatus::Pending.as_db_str().to_string(),
            remote_id: None,
            deleted: 0,
            last_error: None,
        };
        diesel::insert_into(products::table)
            .values(&row)
            .on_conflict(products::id)
            .do_update()
            .set((
                products::name.eq(&product.name),
                products::sku.eq(product.sku.clone()),
                products::price_cents.eq(product.price_cents),
                products::stock_quantity.eq(product.stock_quantity),
                products::updated_at.eq(now),
                products::sync_status.eq(SyncStatus::Pending.as_db_str()),
                products::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    pub fn save_subscription(&self, subscription: &Subscription) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        let row = SubscriptionDB {
            id: subscription.id.clone(),
            business_id: subscription.business_id.clone(),
            plan_code: subscription.plan_code.clone(),
            status: subscription.status.clone(),
            expires_at: subscription.expires_at,
            updated_at: now,
            sync_status: SyncStatus::Pending.as_db_str().to_string(),
            remote_id: None,
            deleted: 0,
            last_error: None,
        };
        diesel::insert_into(subscriptions::table)
            .values(&row)
            .on_conflict(subscriptions::id)
            .do_update()
            .set((
                subscriptions::plan_code.eq(&subscription.plan_code),
                subscriptions::status.eq(&subscription.status),
                subscriptions::expires_at.eq(subscription.expires_at),
                subscriptions::updated_at.eq(now),
                subscriptions::sync_status.eq(SyncStatus::Pending.as_db_str()),
                subscriptions::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Save a transaction and replace its full line-item set atomically.
    pub fn save_transaction(&self, transaction: &SaleTransaction) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        conn.transaction::<_, StorageError, _>(|conn| {
            let row = SaleTransactionDB {
                id: transaction.id.clone(),
                business_id: transaction.business_id.clone(),
                customer_id: transaction.customer_id.clone(),
                user_id: transaction.user_id.clone(),
                total_cents: transaction.total_cents,
                payment_method: transaction.payment_method.clone(),
                occurred_at: transaction.occurred_at,
                updated_at: now,
                sync_status: SyncStatus::Pending.as_db_str().to_string(),
                remote_id: None,
                deleted: 0,
                last_error: None,
            };
            diesel::insert_into(sale_transactions::table)
                .values(&row)
                .on_conflict(sale_transactions::id)
                .do_update()
                .set((
                    sale_transactions::customer_id.eq(transaction.customer_id.clone()),
                    sale_transactions::user_id.eq(transaction.user_id.clone()),
                    sale_transactions::total_cents.eq(transaction.total_cents),
                    sale_transactions::payment_method.eq(&transaction.payment_method),
                    sale_transactions::occurred_at.eq(transaction.occurred_at),
                    sale_transactions::updated_at.eq(now),
                    sale_transactions::sync_status.eq(SyncStatus::Pending.as_db_str()),
                    sale_transactions::last_error.eq(None::<String>),
                ))
                .execute(conn)?;

            diesel::delete(
                transaction_items::table
                    .filter(transaction_items::transaction_id.eq(&transaction.id)),
            )
            .execute(conn)?;
            for item in &transaction.items {
                diesel::insert_into(transaction_items::table)
                    .values(TransactionItemDB {
                        id: item.id.clone(),
                        transaction_id: transaction.id.clone(),
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                        unit_price_cents: item.unit_price_cents,
                        line_total_cents: item.line_total_cents,
                    })
                    .execute(conn)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn save_cash_shift(&self, shift: &CashShift) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        let row = CashShiftDB {
            id: shift.id.clone(),
            business_id: shift.business_id.clone(),
            user_id: shift.user_id.clone(),
            opened_at: shift.opened_at,
            closed_at: shift.closed_at,
            opening_float_cents: shift.opening_float_cents,
            closing_total_cents: shift.closing_total_cents,
            updated_at: now,
            sync_status: SyncStatus::Pending.as_db_str().to_string(),
            remote_id: None,
            deleted: 0,
            last_error: None,
        };
        diesel::insert_into(cash_shifts::table)
            .values(&row)
            .on_conflict(cash_shifts::id)
            .do_update()
            .set((
                cash_shifts::user_id.eq(shift.user_id.clone()),
                cash_shifts::opened_at.eq(shift.opened_at),
                cash_shifts::closed_at.eq(shift.closed_at),
                cash_shifts::opening_float_cents.eq(shift.opening_float_cents),
                cash_shifts::closing_total_cents.eq(shift.closing_total_cents),
                cash_shifts::updated_at.eq(now),
                cash_shifts::sync_status.eq(SyncStatus::Pending.as_db_str()),
                cash_shifts::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Save a stock receipt and replace its full line-item set atomically.
    pub fn save_stock_receipt(&self, receipt: &StockReceipt) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        conn.transaction::<_, StorageError, _>(|conn| {
            let row = StockReceiptDB {
                id: receipt.id.clone(),
                business_id: receipt.business_id.clone(),
                supplier_name: receipt.supplier_name.clone(),
                received_at: receipt.received_at,
                updated_at: now,
                sync_status: SyncStatus::Pending.as_db_str().to_string(),
                remote_id: None,
                deleted: 0,
                last_error: None,
            };
            diesel::insert_into(stock_receipts::table)
                .values(&row)
                .on_conflict(stock_receipts::id)
                .do_update()
                .set((
                    stock_receipts::supplier_name.eq(receipt.supplier_name.clone()),
                    stock_receipts::received_at.eq(receipt.received_at),
                    stock_receipts::updated_at.eq(now),
                    stock_receipts::sync_status.eq(SyncStatus::Pending.as_db_str()),
                    stock_receipts::last_error.eq(None::<String>),
                ))
                .execute(conn)?;

            diesel::delete(
                stock_receipt_items::table
                    .filter(stock_receipt_items::receipt_id.eq(&receipt.id)),
            )
            .execute(conn)?;
            for item in &receipt.items {
                diesel::insert_into(stock_receipt_items::table)
                    .values(StockReceiptItemDB {
                        id: item.id.clone(),
                        receipt_id: receipt.id.clone(),
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                        unit_cost_cents: item.unit_cost_cents,
                    })
                    .execute(conn)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn save_activity_log(&self, entry: &ActivityLog) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let now = now_millis();
        let row = ActivityLogDB {
            id: entry.id.clone(),
            business_id: entry.business_id.clone(),
            user_id: entry.user_id.clone(),
            action: entry.action.clone(),
            detail: entry.detail.clone(),
            occurred_at: entry.occurred_at,
            updated_at: now,
            sync_status: SyncStatus::Pending.as_db_str().to_string(),
            remote_id: None,
            deleted: 0,
            last_error: None,
        };
        diesel::insert_into(activity_logs::table)
            .values(&row)
            .on_conflict(activity_logs::id)
            .do_update()
            .set((
                activity_logs::action.eq(&entry.action),
                activity_logs::detail.eq(entry.detail.clone()),
                activity_logs::occurred_at.eq(entry.occurred_at),
                activity_logs::updated_at.eq(now),
                activity_logs::sync_status.eq(SyncStatus::Pending.as_db_str()),
                activity_logs::last_error.eq(None::<String>),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Soft-delete a record. The tombstone is a regular mutation: the row
    /// stays in place, gets a bumped `updated_at` and goes back to pending so
    /// the deletion propagates remotely. Returns the number of affected rows.
    pub fn soft_delete(&self, kind: SyncEntityKind, record_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let sql = format!(
            "UPDATE {} SET deleted = 1, updated_at = ?, sync_status = 'pending', last_error = NULL WHERE id = ?",
            quote_identifier(kind.table_name())
        );
        let affected = diesel::sql_query(sql)
            .bind::<BigInt, _>(now_millis())
            .bind::<Text, _>(record_id)
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(affected)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Change selector
    // ─────────────────────────────────────────────────────────────────────

    /// All rows of `kind` eligible for the next push, tombstones included,
    /// oldest local mutation first.
    pub fn list_pending(&self, kind: SyncEntityKind) -> Result<Vec<PendingRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let records = match kind {
            SyncEntityKind::Business => businesses::table
                .filter(businesses::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                .order(businesses::updated_at.asc())
                .load::<BusinessDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PendingRecord {
                    kind,
                    record_id: row.id.clone(),
                    payload: UpsertPayload::Business(BusinessUpsert {
                        id: row.id,
                        updated_at: row.updated_at,
                        deleted: row.deleted != 0,
                        name: row.name,
                        currency_code: row.currency_code,
                        contact_phone: row.contact_phone,
                    }),
                })
                .collect(),
            SyncEntityKind::User => users::table
                .filter(users::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                .order(users::updated_at.asc())
                .load::<UserDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PendingRecord {
                    kind,
                    record_id: row.id.clone(),
                    payload: UpsertPayload::User(UserUpsert {
                        id: row.id,
                        business_id: row.business_id,
                        updated_at: row.updated_at,
                        deleted: row.deleted != 0,
                        display_name: row.display_name,
                        role: row.role,
                    }),
                })
                .collect(),
            SyncEntityKind::Customer => customers::table
                .filter(customers::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                .order(customers::updated_at.asc())
                .load::<CustomerDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PendingRecord {
                    kind,
                    record_id: row.id.clone(),
                    payload: UpsertPayload::Customer(CustomerUpsert {
                        id: row.id,
                        business_id: row.business_id,
                        updated_at: row.updated_at,
                        deleted: row.deleted != 0,
                        full_name: row.full_name,
                        phone: row.phone,
                        note: row.note,
                    }),
                })
                .collect(),
            SyncEntityKind::Product => products::table
                .filter(products::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                .order(products::updated_at.asc())
                .load::<ProductDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PendingRecord {
                    kind,
                    record_id: row.id.clone(),
                    payload: UpsertPayload::Product(ProductUpsert {
                        id: row.id,
                        business_id: row.business_id,
                        updated_at: row.updated_at,
                        deleted: row.deleted != 0,
                        name: row.name,
                        sku: row.sku,
                        price_cents: row.price_cents,
                        stock_quantity: row.stock_quantity,
                    }),
                })
                .collect(),
            SyncEntityKind::Subscription => subscriptions::table
                .filter(subscriptions::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                .order(subscriptions::updated_at.asc())
                .load::<SubscriptionDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PendingRecord {
                    kind,
                    record_id: row.id.clone(),
                    payload: UpsertPayload::Subscription(SubscriptionUpsert {
                        id: row.id,
                        business_id: row.business_id,
                        updated_at: row.updated_at,
                        deleted: row.deleted != 0,
                        plan_code: row.plan_code,
                        status: row.status,
                        expires_at: row.expires_at,
                    }),
                })
                .collect(),
            SyncEntityKind::SaleTransaction => {
                let rows = sale_transactions::table
                    .filter(sale_transactions::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                    .order(sale_transactions::updated_at.asc())
                    .load::<SaleTransactionDB>(&mut conn)
                    .map_err(StorageError::from)?;
                let ids = rows.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
                let mut items_by_parent: HashMap<String, Vec<TransactionItemPayload>> =
                    HashMap::new();
                for item in transaction_items::table
                    .filter(transaction_items::transaction_id.eq_any(&ids))
                    .load::<TransactionItemDB>(&mut conn)
                    .map_err(StorageError::from)?
                {
                    items_by_parent
                        .entry(item.transaction_id.clone())
                        .or_default()
                        .push(TransactionItemPayload {
                            id: item.id,
                            product_id: item.product_id,
                            quantity: item.quantity,
                            unit_price_cents: item.unit_price_cents,
                            line_total_cents: item.line_total_cents,
                        });
                }
                rows.into_iter()
                    .map(|row| PendingRecord {
                        kind,
                        record_id: row.id.clone(),
                        payload: UpsertPayload::SaleTransaction(SaleTransactionUpsert {
                            items: items_by_parent.remove(&row.id).unwrap_or_default(),
                            id: row.id,
                            business_id: row.business_id,
                            updated_at: row.updated_at,
                            deleted: row.deleted != 0,
                            customer_id: row.customer_id,
                            user_id: row.user_id,
                            total_cents: row.total_cents,
                            payment_method: row.payment_method,
                            occurred_at: row.occurred_at,
                        }),
                    })
                    .collect()
            }
            SyncEntityKind::CashShift => cash_shifts::table
                .filter(cash_shifts::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                .order(cash_shifts::updated_at.asc())
                .load::<CashShiftDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PendingRecord {
                    kind,
                    record_id: row.id.clone(),
                    payload: UpsertPayload::CashShift(CashShiftUpsert {
                        id: row.id,
                        business_id: row.business_id,
                        updated_at: row.updated_at,
                        deleted: row.deleted != 0,
                        user_id: row.user_id,
                        opened_at: row.opened_at,
                        closed_at: row.closed_at,
                        opening_float_cents: row.opening_float_cents,
                        closing_total_cents: row.closing_total_cents,
                    }),
                })
                .collect(),
            SyncEntityKind::StockReceipt => {
                let rows = stock_receipts::table
                    .filter(stock_receipts::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                    .order(stock_receipts::updated_at.asc())
                    .load::<StockReceiptDB>(&mut conn)
                    .map_err(StorageError::from)?;
                let ids = rows.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
                let mut items_by_parent: HashMap<String, Vec<StockReceiptItemPayload>> =
                    HashMap::new();
                for item in stock_receipt_items::table
                    .filter(stock_receipt_items::receipt_id.eq_any(&ids))
                    .load::<StockReceiptItemDB>(&mut conn)
                    .map_err(StorageError::from)?
                {
                    items_by_parent
                        .entry(item.receipt_id.clone())
                        .or_default()
                        .push(StockReceiptItemPayload {
                            id: item.id,
                            product_id: item.product_id,
                            quantity: item.quantity,
                            unit_cost_cents: item.unit_cost_cents,
                        });
                }
                rows.into_iter()
                    .map(|row| PendingRecord {
                        kind,
                        record_id: row.id.clone(),
                        payload: UpsertPayload::StockReceipt(StockReceiptUpsert {
                            items: items_by_parent.remove(&row.id).unwrap_or_default(),
                            id: row.id,
                            business_id: row.business_id,
                            updated_at: row.updated_at,
                            deleted: row.deleted != 0,
                            supplier_name: row.supplier_name,
                            received_at: row.received_at,
                        }),
                    })
                    .collect()
            }
            SyncEntityKind::ActivityLog => activity_logs::table
                .filter(activity_logs::sync_status.eq_any(PUSH_ELIGIBLE_STATUSES))
                .order(activity_logs::updated_at.asc())
                .load::<ActivityLogDB>(&mut conn)
                .map_err(StorageError::from)?
                .into_iter()
                .map(|row| PendingRecord {
                    kind,
                    record_id: row.id.clone(),
                    payload: UpsertPayload::ActivityLog(ActivityLogUpsert {
                        id: row.id,
                        business_id: row.business_id,
                        updated_at: row.updated_at,
                        deleted: row.deleted != 0,
                        user_id: row.user_id,
                        action: row.action,
                        detail: row.detail,
                        occurred_at: row.occurred_at,
                    }),
                })
                .collect(),
        };
        Ok(records)
    }

    /// Eligible-row counts per kind, for operator-facing status displays.
    /// The engine itself never reads this.
    pub fn pending_counts(&self) -> Result<Vec<(SyncEntityKind, i64)>> {
        let mut conn = get_connection(&self.pool)?;
        let mut counts = Vec::with_capacity(PUSH_ORDER.len());
        for kind in PUSH_ORDER {
            let sql = format!(
                "SELECT COUNT(*) AS c FROM {} WHERE sync_status IN ('pending', 'failed')",
                quote_identifier(kind.table_name())
            );
            let row = diesel::sql_query(sql)
                .get_result::<CountRow>(&mut conn)
                .map_err(StorageError::from)?;
            counts.push((kind, row.c));
        }
        Ok(counts)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Status reconciler
    // ─────────────────────────────────────────────────────────────────────

    /// Record a remote acknowledgment. Metadata only: domain fields and
    /// `updated_at` are untouched; a previously cached `remote_id` survives
    /// when the backend returns none.
    pub fn mark_synced(
        &self,
        kind: SyncEntityKind,
        record_id: &str,
        remote_id: Option<&str>,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let sql = format!(
            "UPDATE {} SET sync_status = 'synced', remote_id = COALESCE(?, remote_id), last_error = NULL WHERE id = ?",
            quote_identifier(kind.table_name())
        );
        diesel::sql_query(sql)
            .bind::<Nullable<Text>, _>(remote_id)
            .bind::<Text, _>(record_id)
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Record a push failure. The row stays eligible for the next cycle.
    pub fn mark_failed(&self, kind: SyncEntityKind, record_id: &str, cause: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let sql = format!(
            "UPDATE {} SET sync_status = 'failed', last_error = ? WHERE id = ?",
            quote_identifier(kind.table_name())
        );
        diesel::sql_query(sql)
            .bind::<Text, _>(cause)
            .bind::<Text, _>(record_id)
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    pub fn sync_meta(&self, kind: SyncEntityKind, record_id: &str) -> Result<Option<SyncMeta>> {
        let mut conn = get_connection(&self.pool)?;
        let sql = format!(
            "SELECT sync_status, remote_id, deleted, last_error, updated_at FROM {} WHERE id = ?",
            quote_identifier(kind.table_name())
        );
        let row = diesel::sql_query(sql)
            .bind::<Text, _>(record_id)
            .get_result::<SyncMetaRow>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        row.map(|r| {
            Ok(SyncMeta {
                sync_status: SyncStatus::from_db_str(&r.sync_status)?,
                remote_id: r.remote_id,
                deleted: r.deleted != 0,
                last_error: r.last_error,
                updated_at: r.updated_at,
            })
        })
        .transpose()
    }

    /// The device's tenant root id, used for health reporting.
    pub fn primary_business_id(&self) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let id = businesses::table
            .select(businesses::id)
            .order(businesses::updated_at.asc())
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    use crate::db::{create_pool, init_database, run_migrations};

    fn setup_repo() -> SyncRepository {
        let app_data = tempdir()
            .expect("tempdir")
            .keep()
            .to_string_lossy()
            .to_string();
        let db_path = init_database(&app_data).expect("init db");
        run_migrations(&db_path).expect("migrate db");
        let pool = create_pool(&db_path).expect("create pool");
        SyncRepository::new(pool)
    }

    fn sample_business() -> Business {
        Business {
            id: "t1".to_string(),
            name: "Moyo General Store".to_string(),
            currency_code: "USD".to_string(),
            contact_phone: None,
        }
    }

    fn sample_customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            business_id: "t1".to_string(),
            full_name: "Amai Moyo".to_string(),
            phone: Some("+263771234567".to_string()),
            note: None,
        }
    }

    fn sample_transaction(id: &str) -> SaleTransaction {
        SaleTransaction {
            id: id.to_string(),
            business_id: "t1".to_string(),
            customer_id: Some("c1".to_string()),
            user_id: None,
            total_cents: 550,
            payment_method: "cash".to_string(),
            occurred_at: 1001,
            items: vec![tillpoint_core::entities::TransactionItem {
                id: Uuid::new_v4().to_string(),
                product_id: "p1".to_string(),
                quantity: 2,
                unit_price_cents: 275,
                line_total_cents: 550,
            }],
        }
    }

    #[test]
    fn new_records_are_created_pending() {
        let repo = setup_repo();
        repo.save_customer(&sample_customer("c1")).unwrap();

        let meta = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .expect("meta");
        assert_eq!(meta.sync_status, SyncStatus::Pending);
        assert!(!meta.deleted);
        assert!(meta.remote_id.is_none());
        assert!(meta.last_error.is_none());

        let pending = repo.list_pending(SyncEntityKind::Customer).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].record_id, "c1");
    }

    #[test]
    fn selection_includes_failed_and_tombstoned_rows_but_not_synced() {
        let repo = setup_repo();
        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.save_customer(&sample_customer("c2")).unwrap();
        repo.save_customer(&sample_customer("c3")).unwrap();

        repo.mark_synced(SyncEntityKind::Customer, "c1", Some("r1"))
            .unwrap();
        repo.mark_failed(SyncEntityKind::Customer, "c2", "timeout")
            .unwrap();
        repo.soft_delete(SyncEntityKind::Customer, "c3").unwrap();

        let ids = repo
            .list_pending(SyncEntityKind::Customer)
            .unwrap()
            .into_iter()
            .map(|r| r.record_id)
            .collect::<Vec<_>>();
        assert!(!ids.contains(&"c1".to_string()));
        assert!(ids.contains(&"c2".to_string()));
        assert!(ids.contains(&"c3".to_string()));
    }

    #[test]
    fn mark_synced_touches_metadata_only() {
        let repo = setup_repo();
        repo.save_customer(&sample_customer("c1")).unwrap();
        let before = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();

        repo.mark_synced(SyncEntityKind::Customer, "c1", Some("remote-1"))
            .unwrap();
        let after = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();

        assert_eq!(after.sync_status, SyncStatus::Synced);
        assert_eq!(after.remote_id.as_deref(), Some("remote-1"));
        assert!(after.last_error.is_none());
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn mark_synced_without_handle_keeps_cached_remote_id() {
        let repo = setup_repo();
        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.mark_synced(SyncEntityKind::Customer, "c1", Some("remote-1"))
            .unwrap();

        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.mark_synced(SyncEntityKind::Customer, "c1", None).unwrap();

        let meta = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();
        assert_eq!(meta.remote_id.as_deref(), Some("remote-1"));
    }

    #[test]
    fn mark_failed_records_cause_and_stays_eligible() {
        let repo = setup_repo();
        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.mark_failed(SyncEntityKind::Customer, "c1", "HTTP error: connection refused")
            .unwrap();

        let meta = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();
        assert_eq!(meta.sync_status, SyncStatus::Failed);
        assert_eq!(
            meta.last_error.as_deref(),
            Some("HTTP error: connection refused")
        );
        assert_eq!(repo.list_pending(SyncEntityKind::Customer).unwrap().len(), 1);
    }

    #[test]
    fn local_edit_resets_synced_row_to_pending_and_keeps_remote_id() {
        let repo = setup_repo();
        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.mark_synced(SyncEntityKind::Customer, "c1", Some("remote-1"))
            .unwrap();

        let mut edited = sample_customer("c1");
        edited.full_name = "Amai R. Moyo".to_string();
        repo.save_customer(&edited).unwrap();

        let meta = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();
        assert_eq!(meta.sync_status, SyncStatus::Pending);
        assert_eq!(meta.remote_id.as_deref(), Some("remote-1"));
    }

    #[test]
    fn soft_delete_is_a_pending_mutation_with_bumped_timestamp() {
        let repo = setup_repo();
        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.mark_synced(SyncEntityKind::Customer, "c1", None).unwrap();
        let before = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();

        assert_eq!(repo.soft_delete(SyncEntityKind::Customer, "c1").unwrap(), 1);
        let after = repo
            .sync_meta(SyncEntityKind::Customer, "c1")
            .unwrap()
            .unwrap();
        assert!(after.deleted);
        assert_eq!(after.sync_status, SyncStatus::Pending);
        assert!(after.updated_at >= before.updated_at);

        let pending = repo.list_pending(SyncEntityKind::Customer).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].payload.deleted());
    }

    #[test]
    fn transaction_payload_embeds_its_line_items() {
        let repo = setup_repo();
        repo.save_transaction(&sample_transaction("tx1")).unwrap();

        let pending = repo.list_pending(SyncEntityKind::SaleTransaction).unwrap();
        assert_eq!(pending.len(), 1);
        match &pending[0].payload {
            UpsertPayload::SaleTransaction(tx) => {
                assert_eq!(tx.items.len(), 1);
                assert_eq!(tx.items[0].line_total_cents, 550);
            }
            other => panic!("expected sale_transaction payload, got {:?}", other),
        }
    }

    #[test]
    fn resaving_a_transaction_replaces_its_item_set() {
        let repo = setup_repo();
        let mut tx = sample_transaction("tx1");
        repo.save_transaction(&tx).unwrap();

        tx.items = vec![tillpoint_core::entities::TransactionItem {
            id: Uuid::new_v4().to_string(),
            product_id: "p2".to_string(),
            quantity: 1,
            unit_price_cents: 300,
            line_total_cents: 300,
        }];
        tx.total_cents = 300;
        repo.save_transaction(&tx).unwrap();

        let pending = repo.list_pending(SyncEntityKind::SaleTransaction).unwrap();
        match &pending[0].payload {
            UpsertPayload::SaleTransaction(payload) => {
                assert_eq!(payload.items.len(), 1);
                assert_eq!(payload.items[0].product_id, "p2");
                assert_eq!(payload.total_cents, 300);
            }
            other => panic!("expected sale_transaction payload, got {:?}", other),
        }
    }

    #[test]
    fn pending_counts_cover_every_kind() {
        let repo = setup_repo();
        repo.save_business(&sample_business()).unwrap();
        repo.save_customer(&sample_customer("c1")).unwrap();
        repo.save_transaction(&sample_transaction("tx1")).unwrap();

        let counts = repo.pending_counts().unwrap();
        assert_eq!(counts.len(), PUSH_ORDER.len());
        let count_for = |kind: SyncEntityKind| {
            counts
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, c)| *c)
                .unwrap()
        };
        assert_eq!(count_for(SyncEntityKind::Business), 1);
        assert_eq!(count_for(SyncEntityKind::Customer), 1);
        assert_eq!(count_for(SyncEntityKind::SaleTransaction), 1);
        assert_eq!(count_for(SyncEntityKind::Product), 0);
    }

    #[test]
    fn primary_business_id_resolves_the_tenant_root() {
        let repo = setup_repo();
        assert!(repo.primary_business_id().unwrap().is_none());
        repo.save_business(&sample_business()).unwrap();
        assert_eq!(repo.primary_business_id().unwrap().as_deref(), Some("t1"));
    }
}
