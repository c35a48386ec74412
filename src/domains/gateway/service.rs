//! Gateway façade used by tool handlers.
//!
//! Wraps a [`DocumentStore`] with the policies handlers rely on:
//! - the connection is established (awaited) before every operation;
//! - every call honors the configured timeout;
//! - `find_many` never returns more than [`MAX_DOCUMENTS`];
//! - string identifiers are coerced to ObjectIds, and bad ones are rejected;
//! - writes are refused in read-only mode.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::{Bson, Document, oid::ObjectId};
use rmcp::model::JsonObject;
use serde_json::Value;
use tracing::{instrument, warn};

use super::error::{GatewayError, GatewayResult};
use super::store::{ConnectionStatus, DocumentStore};
use crate::core::config::DatabaseConfig;
use crate::domains::tools::ValidationError;

/// Upper bound on documents returned by a single query.
pub const MAX_DOCUMENTS: i64 = 100;

/// Result of a capped query.
#[derive(Debug, Clone, Default)]
pub struct FoundDocuments {
    /// At most [`MAX_DOCUMENTS`] matches.
    pub documents: Vec<Document>,

    /// More documents matched than were returned.
    pub truncated: bool,
}

/// Policy settings for the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub timeout: Duration,
    pub read_only: bool,
}

impl From<&DatabaseConfig> for GatewaySettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            timeout: config.timeout(),
            read_only: config.read_only,
        }
    }
}

/// The data access gateway shared by all handlers of a session.
pub struct Gateway {
    store: Arc<dyn DocumentStore>,
    settings: GatewaySettings,
}

impl Gateway {
    /// Create a gateway over `store`.
    pub fn new(store: Arc<dyn DocumentStore>, settings: GatewaySettings) -> Self {
        Self { store, settings }
    }

    /// Whether write operations are refused.
    pub fn is_read_only(&self) -> bool {
        self.settings.read_only
    }

    /// Current connection state of the underlying store.
    pub async fn status(&self) -> ConnectionStatus {
        self.store.status().await
    }

    /// Establish the store connection within the configured timeout.
    pub async fn connect(&self) -> GatewayResult<()> {
        match tokio::time::timeout(self.settings.timeout, self.store.connect()).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::connection(format!(
                "no connection established within {:?}",
                self.settings.timeout
            ))),
        }
    }

    /// Close the store connection.
    pub async fn close(&self) {
        self.store.close().await;
    }

    /// Names of all collections, sorted.
    #[instrument(skip(self))]
    pub async fn list_collections(&self) -> GatewayResult<Vec<String>> {
        self.connect().await?;
        let mut names = self
            .with_timeout("listCollections", self.store.list_collections())
            .await?;
        names.sort();
        Ok(names)
    }

    /// First document of `collection`.
    ///
    /// Returns `None` for empty collections and for collections that cannot be
    /// read; read failures are logged and skipped.
    #[instrument(skip(self))]
    pub async fn sample_one(&self, collection: &str) -> Option<Document> {
        if let Err(e) = self.connect().await {
            warn!("Skipping {}: {}", collection, e);
            return None;
        }
        match self
            .with_timeout("sampleOne", self.store.find_one(collection))
            .await
        {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Skipping {} due to read error: {}", collection, e);
                None
            }
        }
    }

    /// Documents of `collection` matching `filter`, capped at [`MAX_DOCUMENTS`].
    ///
    /// One extra document is requested so a cut-off result can be told apart
    /// from exactly `MAX_DOCUMENTS` matches.
    #[instrument(skip(self, filter))]
    pub async fn find_many(
        &self,
        collection: &str,
        filter: &JsonObject,
    ) -> GatewayResult<FoundDocuments> {
        let filter = json_to_document("filter", filter)?;
        self.connect().await?;
        let mut documents = self
            .with_timeout(
                "findMany",
                self.store.find_many(collection, filter, MAX_DOCUMENTS + 1),
            )
            .await?;
        let truncated = documents.len() > MAX_DOCUMENTS as usize;
        documents.truncate(MAX_DOCUMENTS as usize);
        Ok(FoundDocuments {
            documents,
            truncated,
        })
    }

    /// Apply `$set: updates` to the document whose `_id` is `id`.
    ///
    /// Returns the updated document, or `None` when no document has that id.
    #[instrument(skip(self, updates))]
    pub async fn find_and_update_by_id(
        &self,
        collection: &str,
        id: &str,
        updates: &JsonObject,
    ) -> GatewayResult<Option<Document>> {
        if self.settings.read_only {
            return Err(GatewayError::ReadOnly(format!("update of {}", collection)));
        }
        let id = parse_object_id(id)?;
        let updates = json_to_document("updates", updates)?;
        self.connect().await?;
        self.with_timeout(
            "findAndUpdateById",
            self.store.find_one_and_set(collection, id, updates),
        )
        .await
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = GatewayResult<T>>,
    ) -> GatewayResult<T> {
        tokio::time::timeout(self.settings.timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout {
                operation,
                after: self.settings.timeout,
            })?
    }
}

/// Coerce a string identifier into an ObjectId.
pub fn parse_object_id(id: &str) -> Result<ObjectId, ValidationError> {
    ObjectId::parse_str(id).map_err(|_| {
        ValidationError::single(
            "id",
            format!("\"{}\" is not a valid ObjectId (expected 24 hex characters)", id),
        )
    })
}

/// Convert a JSON argument object (Extended JSON allowed) into a BSON document.
pub fn json_to_document(field: &str, object: &JsonObject) -> Result<Document, ValidationError> {
    match Bson::try_from(Value::Object(object.clone())) {
        Ok(Bson::Document(document)) => Ok(document),
        Ok(other) => Err(ValidationError::single(
            field,
            format!("expected a document, got {:?}", other.element_type()),
        )),
        Err(e) => Err(ValidationError::single(field, e.to_string())),
    }
}

/// Render a document as relaxed Extended JSON.
pub fn document_to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::gateway::memory::MemoryStore;
    use mongodb::bson::doc;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn gateway(store: MemoryStore) -> Gateway {
        Gateway::new(
            Arc::new(store),
            GatewaySettings {
                timeout: Duration::from_millis(100),
                read_only: false,
            },
        )
    }

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_connect_is_established_lazily() {
        let gateway = gateway(MemoryStore::new().with_collection("users", vec![]));
        assert_eq!(gateway.status().await, ConnectionStatus::Disconnected);

        assert_ok!(gateway.list_collections().await);
        assert_eq!(gateway.status().await, ConnectionStatus::Connected);

        gateway.close().await;
        assert_eq!(gateway.status().await, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_connection_failure_is_connection_error() {
        let gateway = gateway(MemoryStore::new().refusing_connections());
        let err = gateway.list_collections().await.unwrap_err();
        assert!(matches!(err, GatewayError::Connection(_)));
        assert_eq!(gateway.status().await, ConnectionStatus::Failed);
    }

    #[tokio::test]
    async fn test_find_many_caps_at_one_hundred() {
        let docs: Vec<Document> = (0..150)
            .map(|i| doc! { "_id": ObjectId::new(), "n": i, "kind": "user" })
            .collect();
        let gateway = gateway(MemoryStore::new().with_collection("users", docs));

        let found = gateway
            .find_many("users", &object(json!({ "kind": "user" })))
            .await
            .unwrap();
        assert_eq!(found.documents.len(), 100);
        assert!(found.truncated);
    }

    #[tokio::test]
    async fn test_exactly_one_hundred_is_not_truncated() {
        let docs: Vec<Document> = (0..100).map(|i| doc! { "n": i }).collect();
        let gateway = gateway(MemoryStore::new().with_collection("users", docs));

        let found = gateway.find_many("users", &JsonObject::new()).await.unwrap();
        assert_eq!(found.documents.len(), 100);
        assert!(!found.truncated);
    }

    #[tokio::test]
    async fn test_invalid_id_is_validation_error() {
        let gateway = gateway(MemoryStore::new().with_collection("users", vec![]));
        let err = gateway
            .find_and_update_by_id("users", "not-an-id", &object(json!({ "role": "admin" })))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(err.to_string().contains("not-an-id"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_none() {
        let gateway = gateway(MemoryStore::new().with_collection("users", vec![]));
        let updated = gateway
            .find_and_update_by_id(
                "users",
                "65a1b2c3d4e5f60718293a4b",
                &object(json!({ "role": "admin" })),
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_read_only_rejects_updates() {
        let gateway = Gateway::new(
            Arc::new(MemoryStore::new()),
            GatewaySettings {
                timeout: Duration::from_millis(100),
                read_only: true,
            },
        );
        let err = gateway
            .find_and_update_by_id("users", "65a1b2c3d4e5f60718293a4b", &JsonObject::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ReadOnly(_)));
    }

    #[tokio::test]
    async fn test_sample_one_skips_unreadable_collection() {
        let gateway = gateway(
            MemoryStore::new()
                .with_collection("users", vec![doc! { "name": "Alice" }])
                .unreadable("secrets"),
        );
        assert!(gateway.sample_one("users").await.is_some());
        assert!(gateway.sample_one("secrets").await.is_none());
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let gateway = gateway(
            MemoryStore::new()
                .with_collection("users", vec![])
                .with_latency(Duration::from_millis(500)),
        );
        let err = gateway.find_many("users", &JsonObject::new()).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Timeout {
                operation: "findMany",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_object_id() {
        assert_ok!(parse_object_id("65a1b2c3d4e5f60718293a4b"));
        assert_err!(parse_object_id("65a1b2c3"));
        assert_err!(parse_object_id("zzzzzzzzzzzzzzzzzzzzzzzz"));
    }

    #[test]
    fn test_json_to_document_accepts_extended_json() {
        let document = json_to_document(
            "filter",
            &object(json!({ "_id": { "$oid": "65a1b2c3d4e5f60718293a4b" }, "age": { "$gt": 21 } })),
        )
        .unwrap();
        assert!(matches!(document.get("_id"), Some(Bson::ObjectId(_))));
        assert!(matches!(document.get("age"), Some(Bson::Document(_))));
    }

    #[test]
    fn test_document_to_json() {
        let value = document_to_json(doc! { "name": "Alice", "age": 30 });
        assert_eq!(value, json!({ "name": "Alice", "age": 30 }));
    }
}
