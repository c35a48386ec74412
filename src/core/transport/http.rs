//! HTTP transport implementation.
//!
//! JSON-RPC over POST requests, so standard HTTP clients (curl, browsers, etc.)
//! can talk to the server. Requests are independent: there is no session, the
//! `initialize` result is the same rmcp `ServerInfo` the stream transports
//! send, and tool calls go through [`McpServer::invoke`].

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rmcp::ServerHandler;
use rmcp::model::{ErrorCode, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::tools::InvocationRequest;

// ============================================================================
// JSON-RPC Envelope
// ============================================================================

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Decode one message body.
    ///
    /// Malformed JSON is a parse error; well-formed JSON that is not a request
    /// is an invalid request carrying the original `id` when there is one.
    pub fn decode(body: &str) -> Result<Self, JsonRpcResponse> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            JsonRpcResponse::error(Value::Null, ErrorCode::PARSE_ERROR, format!("Parse error: {}", e))
        })?;

        let Some(object) = value.as_object() else {
            return Err(JsonRpcResponse::invalid_request(
                Value::Null,
                "expected a JSON object",
            ));
        };
        let id = object.get("id").cloned().unwrap_or(Value::Null);

        if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return Err(JsonRpcResponse::invalid_request(id, "jsonrpc must be \"2.0\""));
        }
        serde_json::from_value(value).map_err(|e| JsonRpcResponse::invalid_request(id, e.to_string()))
    }
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: code.0,
                message: message.into(),
                data: None,
            }),
        }
    }

    pub fn invalid_request(id: Value, detail: impl std::fmt::Display) -> Self {
        Self::error(id, ErrorCode::INVALID_REQUEST, format!("Invalid Request: {}", detail))
    }

    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::error(id, ErrorCode::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, ErrorCode::INVALID_PARAMS, msg)
    }

    pub fn internal_error(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, ErrorCode::INTERNAL_ERROR, msg)
    }

    /// Error code, if this is an error response.
    pub fn error_code(&self) -> Option<i32> {
        self.error.as_ref().map(|e| e.code)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    /// Path of the JSON-RPC endpoint, for the info page.
    rpc_path: String,
}

impl AppState {
    pub fn new(server: McpServer, rpc_path: impl Into<String>) -> Self {
        Self {
            server,
            rpc_path: rpc_path.into(),
        }
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router.
    pub fn router(&self, server: McpServer) -> Router {
        let state = AppState::new(server, self.config.rpc_path.clone());

        let mut app = Router::new()
            .route(&self.config.rpc_path, post(handle_rpc))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }
        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0"
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "database": state.server.store_status().await.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle one JSON-RPC message.
///
/// The body is taken as raw text so malformed JSON gets a JSON-RPC parse
/// error instead of an HTTP rejection. Notifications get `202 Accepted`.
#[instrument(skip_all)]
async fn handle_rpc(State(state): State<AppState>, body: String) -> Response {
    let request = match JsonRpcRequest::decode(&body) {
        Ok(request) => request,
        Err(response) => {
            warn!("Rejected message: {:?}", response.error);
            return (StatusCode::OK, Json(response)).into_response();
        }
    };

    if request.id.is_none() {
        debug!("Notification accepted: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    info!("Received JSON-RPC request: {}", request.method);
    let response = process_request(&state, request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.unwrap_or(Value::Null);

    match request.method.as_str() {
        "initialize" => match serde_json::to_value(state.server.get_info()) {
            Ok(info) => JsonRpcResponse::success(id, info),
            Err(e) => JsonRpcResponse::internal_error(id, e.to_string()),
        },
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(id, json!({ "tools": state.server.tools() })),
        "tools/call" => handle_tools_call(state, id, request.params).await,
        method => {
            warn!("Unknown method: {}", method);
            JsonRpcResponse::method_not_found(id, method)
        }
    }
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let Some(Value::Object(mut params)) = params else {
        return JsonRpcResponse::invalid_params(id, "Missing params");
    };

    let name = match params.remove("name") {
        Some(Value::String(name)) => name,
        _ => return JsonRpcResponse::invalid_params(id, "Missing tool name"),
    };

    let arguments: Option<JsonObject> = match params.remove("arguments") {
        None | Some(Value::Null) => None,
        Some(Value::Object(arguments)) => Some(arguments),
        Some(_) => return JsonRpcResponse::invalid_params(id, "Tool arguments must be an object"),
    };

    let invocation = InvocationRequest {
        request_id: Some(id.clone()),
        tool_name: name,
        arguments,
    };
    let result = state.server.invoke(invocation).await;

    match serde_json::to_value(&result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::internal_error(id, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::domains::gateway::memory::MemoryStore;
    use crate::domains::gateway::{Gateway, GatewaySettings};
    use std::sync::Arc;
    use std::time::Duration;

    fn state() -> AppState {
        let gateway = Gateway::new(
            Arc::new(MemoryStore::new()),
            GatewaySettings {
                timeout: Duration::from_secs(1),
                read_only: false,
            },
        );
        let server = McpServer::with_gateway(Config::default(), Arc::new(gateway)).unwrap();
        AppState::new(server, "/mcp")
    }

    async fn rpc(body: &str) -> (StatusCode, Option<JsonRpcResponse>) {
        let response = handle_rpc(State(state()), body.to_string()).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn test_initialize_answers_supported_version() {
        let (status, response) = rpc(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"1999-01-01"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let result = response.unwrap().result.unwrap();
        assert_eq!(result["protocolVersion"], json!("2024-11-05"));
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_runs_the_tool() {
        let (_, response) = rpc(
            r#"{"jsonrpc":"2.0","id":"c1","method":"tools/call","params":{"name":"doesNotExist"}}"#,
        )
        .await;
        let response = response.unwrap();
        assert_eq!(response.id, json!("c1"));
        assert_eq!(response.result.unwrap()["isError"], json!(true));
    }

    #[tokio::test]
    async fn test_notification_gets_accepted() {
        let (status, response) =
            rpc(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let (status, response) = rpc("{").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.unwrap().error_code(), Some(-32700));

        let (_, response) = rpc(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#).await;
        let response = response.unwrap();
        assert_eq!(response.id, json!(3));
        assert_eq!(response.error_code(), Some(-32600));

        let (_, response) = rpc(r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#).await;
        assert_eq!(response.unwrap().error_code(), Some(-32601));

        let (_, response) = rpc(r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{}}"#).await;
        assert_eq!(response.unwrap().error_code(), Some(-32602));
    }

    #[test]
    fn test_address() {
        let transport = HttpTransport::new(HttpConfig::default());
        assert_eq!(transport.address(), "127.0.0.1:8080");
    }
}
