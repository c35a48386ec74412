//! MCP Server implementation and lifecycle management.
//!
//! [`McpServer`] owns the gateway and the tool dispatcher and implements
//! rmcp's `ServerHandler`: the handshake, version negotiation and request
//! routing are rmcp's, `tools/list` and `tools/call` go through the registry
//! and the [`Dispatcher`].
//!
//! The HTTP transport reuses [`McpServer::tools`] and [`McpServer::invoke`].

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use tracing::{debug, info, instrument};

use super::config::Config;
use super::error::Result;
use crate::domains::gateway::{ConnectionStatus, Gateway, GatewaySettings, MongoStore};
use crate::domains::tools::{Dispatcher, InvocationRequest, build_registry};

const INSTRUCTIONS: &str = "MongoDB administration server. Use getSchemas or analyzeSchema to discover collections, getObjects to query and updateObject to modify single documents, then generateReactAdmin or generateReactAdminPrompt to scaffold admin views. generateDesign and generateDesignPrompt turn a design system or an architecture into UI designs.";

/// The main MCP server handler.
///
/// Cheap to clone; clones share the gateway connection and the registry.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Data access gateway shared by all database tools.
    gateway: Arc<Gateway>,

    /// Tool dispatcher.
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server backed by MongoDB.
    ///
    /// No connection is made yet; the first database tool call connects.
    pub fn new(config: Config) -> Result<Self> {
        let store = MongoStore::new(config.database.clone(), config.server.name.clone());
        let gateway = Gateway::new(Arc::new(store), GatewaySettings::from(&config.database));
        Self::with_gateway(config, Arc::new(gateway))
    }

    /// Create a server over an existing gateway.
    pub fn with_gateway(config: Config, gateway: Arc<Gateway>) -> Result<Self> {
        let registry = build_registry(gateway.clone())?;
        info!("Registered {} tools", registry.len());

        Ok(Self {
            config: Arc::new(config),
            gateway,
            dispatcher: Dispatcher::new(Arc::new(registry)),
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The tool dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ========================================================================
    // Transport Support Methods
    // ========================================================================

    /// Advertised tools, sorted by name.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher.registry().to_tools()
    }

    /// Run one tool invocation. Failures come back as `isError` results.
    pub async fn invoke(&self, request: InvocationRequest) -> CallToolResult {
        self.dispatcher.dispatch(request).await
    }

    /// Connection state of the document store.
    pub async fn store_status(&self) -> ConnectionStatus {
        self.gateway.status().await
    }

    /// Close the gateway connection.
    pub async fn shutdown(&self) {
        info!("Closing document store connection");
        self.gateway.close().await;
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                title: None,
                version: self.version().to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    #[instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        let tools = self.tools();
        debug!("Listing {} tools", tools.len());
        Ok(ListToolsResult::with_all_items(tools))
    }

    #[instrument(skip_all, fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let invocation = InvocationRequest {
            request_id: serde_json::to_value(&context.id).ok(),
            tool_name: request.name.into_owned(),
            arguments: request.arguments,
        };
        Ok(self.invoke(invocation).await)
    }
}
