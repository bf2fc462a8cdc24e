//! Multi-tenant document store.
//!
//! Documents are keyed by (`businessId`, `id`) for tenant-scoped entities and
//! by `id` alone for the tenant root, so colliding stable ids across tenants
//! never collide here. An upsert replaces the full mutable field set of the
//! target document; there is no field-level merge and no `updatedAt`
//! comparison. The most recently applied push wins even when it is causally
//! older than the stored copy. Callers rely on this as a documented property;
//! it must not be swapped for compare-and-swap without revisiting every
//! retry path in the device engine.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use tillpoint_core::sync::{SyncEntityKind, UpsertPayload};

/// Composite document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DocKey {
    tenant: Option<String>,
    id: String,
}

/// One stored remote document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Server-assigned handle, stable across re-upserts of the same key.
    pub remote_id: String,
    /// Full field set as received, including the entity tag.
    pub payload: Value,
    pub updated_at: i64,
    pub deleted: bool,
    pub first_stored_at: String,
    pub last_applied_at: String,
}

#[derive(Default)]
pub struct DocumentStore {
    collections: RwLock<HashMap<SyncEntityKind, HashMap<DocKey, StoredDocument>>>,
    health: RwLock<HashMap<String, String>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_for(payload: &UpsertPayload) -> DocKey {
        DocKey {
            tenant: payload.business_id().map(|v| v.to_string()),
            id: payload.record_id().to_string(),
        }
    }

    /// Insert-or-replace by stable identity. Idempotent: applying the same
    /// payload twice leaves the same terminal state and the same handle.
    pub async fn upsert(&self, payload: &UpsertPayload) -> StoredDocument {
        let now = Utc::now().to_rfc3339();
        let body = serde_json::to_value(payload).unwrap_or(Value::Null);
        let key = Self::key_for(payload);

        let mut collections = self.collections.write().await;
        let collection = collections.entry(payload.kind()).or_default();
        let document = match collection.get_mut(&key) {
            Some(existing) => {
                existing.payload = body;
                existing.updated_at = payload.updated_at();
                existing.deleted = payload.deleted();
                existing.last_applied_at = now;
                existing.clone()
            }
            None => {
                let document = StoredDocument {
                    remote_id: format!("doc-{}", Uuid::new_v4()),
                    payload: body,
                    updated_at: payload.updated_at(),
                    deleted: payload.deleted(),
                    first_stored_at: now.clone(),
                    last_applied_at: now,
                };
                collection.insert(key, document.clone());
                document
            }
        };
        document
    }

    pub async fn get(
        &self,
        kind: SyncEntityKind,
        tenant: Option<&str>,
        id: &str,
    ) -> Option<StoredDocument> {
        let key = DocKey {
            tenant: tenant.map(|v| v.to_string()),
            id: id.to_string(),
        };
        self.collections
            .read()
            .await
            .get(&kind)
            .and_then(|collection| collection.get(&key))
            .cloned()
    }

    /// Record "last synced at" for a tenant; returns the stored timestamp.
    pub async fn record_health(&self, business_id: &str) -> String {
        let now = Utc::now().to_rfc3339();
        self.health
            .write()
            .await
            .insert(business_id.to_string(), now.clone());
        now
    }

    pub async fn health_for(&self, business_id: &str) -> Option<String> {
        self.health.read().await.get(business_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_core::sync::{BusinessUpsert, CustomerUpsert};

    fn customer(business_id: &str, id: &str, updated_at: i64, deleted: bool) -> UpsertPayload {
        UpsertPayload::Customer(CustomerUpsert {
            id: id.to_string(),
            business_id: business_id.to_string(),
            updated_at,
            deleted,
            full_name: "Amai Moyo".to_string(),
            phone: None,
            note: None,
        })
    }

    #[tokio::test]
    async fn repeated_upsert_is_idempotent_with_a_stable_handle() {
        let store = DocumentStore::new();
        let payload = customer("t1", "c1", 1000, false);

        let first = store.upsert(&payload).await;
        let second = store.upsert(&payload).await;

        assert_eq!(first.remote_id, second.remote_id);
        assert_eq!(first.payload, second.payload);
        assert_eq!(first.updated_at, second.updated_at);
        assert_eq!(first.deleted, second.deleted);

        let stored = store
            .get(SyncEntityKind::Customer, Some("t1"), "c1")
            .await
            .expect("stored");
        assert_eq!(stored.remote_id, first.remote_id);
    }

    #[tokio::test]
    async fn a_causally_older_push_still_overwrites() {
        let store = DocumentStore::new();
        store.upsert(&customer("t1", "c1", 2000, false)).await;

        // An out-of-order retry with an older timestamp is applied as-is:
        // last write applied wins, by contract.
        let mut older = CustomerUpsert {
            id: "c1".to_string(),
            business_id: "t1".to_string(),
            updated_at: 1000,
            deleted: false,
            full_name: "Stale Name".to_string(),
            phone: None,
            note: None,
        };
        older.full_name = "Stale Name".to_string();
        store.upsert(&UpsertPayload::Customer(older)).await;

        let stored = store
            .get(SyncEntityKind::Customer, Some("t1"), "c1")
            .await
            .expect("stored");
        assert_eq!(stored.updated_at, 1000);
        assert_eq!(stored.payload["fullName"], "Stale Name");
    }

    #[tokio::test]
    async fn tombstones_update_the_document_rather_than_removing_it() {
        let store = DocumentStore::new();
        store.upsert(&customer("t1", "c1", 1000, false)).await;
        store.upsert(&customer("t1", "c1", 1001, true)).await;

        let stored = store
            .get(SyncEntityKind::Customer, Some("t1"), "c1")
            .await
            .expect("document still present");
        assert!(stored.deleted);
        assert_eq!(stored.payload["deleted"], true);
    }

    #[tokio::test]
    async fn colliding_ids_across_tenants_stay_separate() {
        let store = DocumentStore::new();
        let a = store.upsert(&customer("t1", "c1", 1000, false)).await;
        let b = store.upsert(&customer("t2", "c1", 1000, false)).await;

        assert_ne!(a.remote_id, b.remote_id);
        assert!(store
            .get(SyncEntityKind::Customer, Some("t1"), "c1")
            .await
            .is_some());
        assert!(store
            .get(SyncEntityKind::Customer, Some("t2"), "c1")
            .await
            .is_some());
    }

    #[tokio::test]
    async fn the_tenant_root_is_keyed_globally() {
        let store = DocumentStore::new();
        store
            .upsert(&UpsertPayload::Business(BusinessUpsert {
                id: "t1".to_string(),
                updated_at: 1000,
                deleted: false,
                name: "Moyo General Store".to_string(),
                currency_code: "USD".to_string(),
                contact_phone: None,
            }))
            .await;

        assert!(store
            .get(SyncEntityKind::Business, None, "t1")
            .await
            .is_some());
    }

    #[tokio::test]
    async fn health_records_latest_timestamp_per_tenant() {
        let store = DocumentStore::new();
        assert!(store.health_for("t1").await.is_none());
        let recorded = store.record_health("t1").await;
        assert_eq!(store.health_for("t1").await.as_deref(), Some(recorded.as_str()));
    }
}
