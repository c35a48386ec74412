//! Data access gateway.
//!
//! All document store access from tool handlers goes through [`Gateway`],
//! which sits on top of a [`DocumentStore`] implementation.
//!
//! ## Architecture
//!
//! - `store.rs` - The `DocumentStore` trait and connection states
//! - `mongo.rs` - MongoDB implementation with lazy, lifecycle-managed connection
//! - `service.rs` - The `Gateway` façade (timeouts, result cap, id coercion, read-only)
//! - `error.rs` - Gateway error types

mod error;
#[cfg(test)]
pub(crate) mod memory;
mod mongo;
mod service;
mod store;

pub use error::{GatewayError, GatewayResult};
pub use mongo::MongoStore;
pub use service::{
    FoundDocuments, Gateway, GatewaySettings, MAX_DOCUMENTS, document_to_json, json_to_document,
    parse_object_id,
};
pub use store::{ConnectionStatus, DocumentStore};
