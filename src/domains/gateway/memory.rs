//! In-process document store for tests.
//!
//! Supports top-level equality filters and `$set` updates. Collections can be
//! marked unreadable and every data call can be slowed down, so that the
//! gateway's skip and timeout paths can be exercised.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use mongodb::bson::{Bson, Document, oid::ObjectId};

use super::error::{GatewayError, GatewayResult};
use super::store::{ConnectionStatus, DocumentStore};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
    unreadable: HashSet<String>,
    latency: Option<Duration>,
    refuse_connections: bool,
    status: Mutex<Option<ConnectionStatus>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, name: &str, documents: Vec<Document>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(name.to_string(), documents);
        self
    }

    /// Reads of `name` fail; it still shows up in `list_collections`.
    pub fn unreadable(mut self, name: &str) -> Self {
        self.unreadable.insert(name.to_string());
        self.collections
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default();
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    /// Snapshot of a collection's documents.
    pub fn documents(&self, name: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_readable(&self, collection: &str) -> GatewayResult<()> {
        if self.unreadable.contains(collection) {
            return Err(GatewayError::operation(format!(
                "not authorized to read {}",
                collection
            )));
        }
        Ok(())
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn connect(&self) -> GatewayResult<()> {
        let mut status = self.status.lock().unwrap();
        if self.refuse_connections {
            *status = Some(ConnectionStatus::Failed);
            return Err(GatewayError::connection("connection refused"));
        }
        *status = Some(ConnectionStatus::Connected);
        Ok(())
    }

    async fn close(&self) {
        *self.status.lock().unwrap() = Some(ConnectionStatus::Disconnected);
    }

    async fn status(&self) -> ConnectionStatus {
        self.status
            .lock()
            .unwrap()
            .unwrap_or(ConnectionStatus::Disconnected)
    }

    async fn list_collections(&self) -> GatewayResult<Vec<String>> {
        self.delay().await;
        Ok(self.collections.lock().unwrap().keys().cloned().collect())
    }

    async fn find_one(&self, collection: &str) -> GatewayResult<Option<Document>> {
        self.delay().await;
        self.check_readable(collection)?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.first().cloned()))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> GatewayResult<Vec<Document>> {
        self.delay().await;
        self.check_readable(collection)?;
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, &filter))
                    .take(limit.max(0) as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one_and_set(
        &self,
        collection: &str,
        id: ObjectId,
        updates: Document,
    ) -> GatewayResult<Option<Document>> {
        self.delay().await;
        self.check_readable(collection)?;
        let mut collections = self.collections.lock().unwrap();
        let target = Bson::ObjectId(id);
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.get("_id") == Some(&target)))
        else {
            return Ok(None);
        };
        for (key, value) in updates {
            document.insert(key, value);
        }
        Ok(Some(document.clone()))
    }
}
