//! MongoDB-backed document store.
//!
//! One client per server session, created lazily by [`MongoStore::connect`].
//! The connection moves through `Disconnected → Connecting → Connected`, or
//! `Failed` when the handshake does not complete within the configured
//! timeout or its caller gives up on it. A failed connection is left as is;
//! the next `connect` call starts a fresh attempt.

use futures::TryStreamExt;
use mongodb::{
    Client, Database,
    bson::{Document, doc, oid::ObjectId},
    options::{
        Acknowledgment, ClientOptions, ReadConcern, ReadPreference, ReturnDocument,
        SelectionCriteria, WriteConcern,
    },
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::error::{GatewayError, GatewayResult};
use super::store::{ConnectionStatus, DocumentStore};
use crate::core::config::{
    DatabaseConfig, ReadConcernLevel, ReadPreferenceMode, WriteConcernLevel,
};

enum ConnectionState {
    Disconnected,
    Connecting,
    Connected { client: Client, database: Database },
    Failed(String),
}

impl ConnectionState {
    fn status(&self) -> ConnectionStatus {
        match self {
            Self::Disconnected => ConnectionStatus::Disconnected,
            Self::Connecting => ConnectionStatus::Connecting,
            Self::Connected { .. } => ConnectionStatus::Connected,
            Self::Failed(_) => ConnectionStatus::Failed,
        }
    }
}

/// Holds the state lock for one connection attempt.
///
/// Dropping it mid-attempt (the caller's future was cancelled) leaves
/// `Failed` rather than a stale `Connecting`.
struct Attempt<'a> {
    state: MutexGuard<'a, ConnectionState>,
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if matches!(*self.state, ConnectionState::Connecting) {
            warn!("MongoDB connection attempt abandoned");
            *self.state = ConnectionState::Failed("connection attempt abandoned".to_string());
        }
    }
}

/// Document store backed by the official MongoDB driver.
pub struct MongoStore {
    config: DatabaseConfig,
    app_name: String,
    state: Mutex<ConnectionState>,
}

impl MongoStore {
    /// Create a store; no connection is made until [`connect`](DocumentStore::connect).
    pub fn new(config: DatabaseConfig, app_name: impl Into<String>) -> Self {
        Self {
            config,
            app_name: app_name.into(),
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    async fn establish(&self) -> GatewayResult<(Client, Database)> {
        let timeout = self.config.timeout();

        let mut options = ClientOptions::parse(self.config.uri.as_str())
            .await
            .map_err(|e| GatewayError::connection(format!("invalid connection string: {}", e)))?;
        options.app_name = Some(self.app_name.clone());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.read_concern = Some(read_concern(self.config.read_concern));
        options.write_concern = Some(write_concern(self.config.write_concern));
        options.selection_criteria = Some(SelectionCriteria::ReadPreference(read_preference(
            self.config.read_preference,
        )));

        let client = Client::with_options(options).map_err(|e| GatewayError::connection(e.to_string()))?;
        let database = client.database(&self.config.name);

        // The driver connects lazily; ping forces server selection and the handshake.
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| GatewayError::connection(e.to_string()))?;

        Ok((client, database))
    }

    async fn database(&self) -> GatewayResult<Database> {
        match &*self.state.lock().await {
            ConnectionState::Connected { database, .. } => Ok(database.clone()),
            ConnectionState::Failed(reason) => Err(GatewayError::connection(reason.clone())),
            _ => Err(GatewayError::connection("not connected")),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MongoStore {
    #[instrument(skip(self), fields(uri = %self.config.redacted_uri(), db = %self.config.name))]
    async fn connect(&self) -> GatewayResult<()> {
        let mut attempt = Attempt {
            state: self.state.lock().await,
        };
        match &*attempt.state {
            ConnectionState::Connected { .. } => return Ok(()),
            ConnectionState::Failed(reason) => debug!("Retrying after failed connection: {}", reason),
            ConnectionState::Connecting | ConnectionState::Disconnected => {}
        }

        *attempt.state = ConnectionState::Connecting;
        info!("Connecting to MongoDB");

        let timeout = self.config.timeout();
        let outcome = match tokio::time::timeout(timeout, self.establish()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GatewayError::connection(format!(
                "no connection established within {:?}",
                timeout
            ))),
        };

        match outcome {
            Ok((client, database)) => {
                info!("Connected to database {}", self.config.name);
                *attempt.state = ConnectionState::Connected { client, database };
                Ok(())
            }
            Err(e) => {
                warn!("MongoDB connection failed: {}", e);
                *attempt.state = ConnectionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn close(&self) {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, ConnectionState::Disconnected)
        };
        if let ConnectionState::Connected { client, .. } = previous {
            client.shutdown().await;
            info!("MongoDB connection closed");
        }
    }

    async fn status(&self) -> ConnectionStatus {
        self.state.lock().await.status()
    }

    async fn list_collections(&self) -> GatewayResult<Vec<String>> {
        self.database()
            .await?
            .list_collection_names()
            .await
            .map_err(|e| GatewayError::operation(e.to_string()))
    }

    async fn find_one(&self, collection: &str) -> GatewayResult<Option<Document>> {
        self.database()
            .await?
            .collection::<Document>(collection)
            .find_one(doc! {})
            .await
            .map_err(|e| GatewayError::operation(e.to_string()))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> GatewayResult<Vec<Document>> {
        let cursor = self
            .database()
            .await?
            .collection::<Document>(collection)
            .find(filter)
            .limit(limit)
            .await
            .map_err(|e| GatewayError::operation(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| GatewayError::operation(e.to_string()))
    }

    async fn find_one_and_set(
        &self,
        collection: &str,
        id: ObjectId,
        updates: Document,
    ) -> GatewayResult<Option<Document>> {
        self.database()
            .await?
            .collection::<Document>(collection)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": updates })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| GatewayError::operation(e.to_string()))
    }
}

fn read_concern(level: ReadConcernLevel) -> ReadConcern {
    match level {
        ReadConcernLevel::Local => ReadConcern::local(),
        ReadConcernLevel::Available => ReadConcern::available(),
        ReadConcernLevel::Majority => ReadConcern::majority(),
        ReadConcernLevel::Linearizable => ReadConcern::linearizable(),
        ReadConcernLevel::Snapshot => ReadConcern::snapshot(),
    }
}

fn read_preference(mode: ReadPreferenceMode) -> ReadPreference {
    match mode {
        ReadPreferenceMode::Primary => ReadPreference::Primary,
        ReadPreferenceMode::PrimaryPreferred => ReadPreference::PrimaryPreferred {
            options: Default::default(),
        },
        ReadPreferenceMode::Secondary => ReadPreference::Secondary {
            options: Default::default(),
        },
        ReadPreferenceMode::SecondaryPreferred => ReadPreference::SecondaryPreferred {
            options: Default::default(),
        },
        ReadPreferenceMode::Nearest => ReadPreference::Nearest {
            options: Default::default(),
        },
    }
}

fn write_concern(level: WriteConcernLevel) -> WriteConcern {
    let mut concern = WriteConcern::default();
    concern.w = Some(match level {
        WriteConcernLevel::Majority => Acknowledgment::Majority,
        WriteConcernLevel::Nodes(n) => Acknowledgment::Nodes(n),
    });
    concern
}
