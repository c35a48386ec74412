//! Tools domain module.
//!
//! Tools are the named operations MCP clients invoke with `tools/call`.
//!
//! ## Architecture
//!
//! - `schema.rs` - Composable parameter schemas and argument validation
//! - `handlers.rs` - The `ToolHandler` trait and result helpers
//! - `registry.rs` - Tool definitions and the name → definition registry
//! - `dispatch.rs` - Lookup → validate → execute → encode for one invocation
//! - `router.rs` - Builds the registry with every tool
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with `NAME`, `DESCRIPTION`, `schema()`
//!    and a `ToolHandler` impl
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `router.rs`

pub mod definitions;
mod dispatch;
mod error;
mod handlers;
mod registry;
pub mod router;
pub mod schema;

pub use dispatch::{Dispatcher, InvocationRequest};
pub use error::ToolError;
pub use handlers::*;
pub use registry::{ToolDefinition, ToolRegistry};
pub use router::build_registry;
pub use schema::{ObjectSchema, ParamSchema, ValidatedArgs, ValidationError, Violation};
