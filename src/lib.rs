//! MongoDB administration MCP server.
//!
//! Exposes a MongoDB database to MCP clients through a small set of tools:
//! schema discovery (`getSchemas`, `analyzeSchema`), queries (`getObjects`),
//! single-document updates (`updateObject`), React-Admin scaffolding
//! (`generateReactAdmin`, `generateReactAdminPrompt`) and UI design
//! generation (`generateDesign`, `generateDesignPrompt`).
//!
//! # Architecture
//!
//! - **core**: configuration, CLI, logging, errors, the rmcp server handler
//!   and the transports
//! - **domains**: business logic organized by bounded contexts
//!   - **gateway**: the data access gateway in front of MongoDB
//!   - **tools**: parameter schemas, the tool registry, dispatch and the tools
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use mongo_admin_mcp::core::{Cli, Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (config, _warnings) = Config::load(&Cli::parse());
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server.clone()).await?;
//!     server.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
