//! Domains module containing business logic organized by bounded contexts.
//!
//! - `gateway` - the data access gateway in front of the document store
//! - `tools` - tool schemas, registry, dispatch and the tool implementations

pub mod gateway;
pub mod tools;
