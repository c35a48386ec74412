//! Document store abstraction.
//!
//! The gateway talks to the store only through [`DocumentStore`]. The
//! production implementation is [`MongoStore`](super::mongo::MongoStore).

use std::fmt;

use mongodb::bson::{Document, oid::ObjectId};

use super::error::GatewayResult;

/// Lifecycle state of a store connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Narrow interface over the external document store.
///
/// `connect` must succeed before any data operation is issued. A failed
/// connection is not retried by the store; the next `connect` call tries again.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Establish the connection. Idempotent once connected.
    async fn connect(&self) -> GatewayResult<()>;

    /// Close the connection, if any.
    async fn close(&self);

    /// Current connection state.
    async fn status(&self) -> ConnectionStatus;

    /// Names of all collections in the target database.
    async fn list_collections(&self) -> GatewayResult<Vec<String>>;

    /// First document of a collection, if any.
    async fn find_one(&self, collection: &str) -> GatewayResult<Option<Document>>;

    /// Documents matching `filter`, at most `limit`.
    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> GatewayResult<Vec<Document>>;

    /// Apply `$set: updates` to the document with `_id == id` and return it
    /// after the update.
    async fn find_one_and_set(
        &self,
        collection: &str,
        id: ObjectId,
        updates: Document,
    ) -> GatewayResult<Option<Document>>;
}
