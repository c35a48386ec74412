//! Dispatch engine: lookup → validate → execute → normalize.
//!
//! Every outcome is folded into a [`CallToolResult`]. Unknown tools,
//! validation failures and handler errors are reported with `isError: true`;
//! none of them propagate past this boundary.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::handlers::error_result;
use super::registry::ToolRegistry;

/// One decoded tool invocation.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Correlation token of the enclosing protocol message, if any.
    pub request_id: Option<Value>,
    pub tool_name: String,
    pub arguments: Option<JsonObject>,
}

impl InvocationRequest {
    /// Create an invocation without a correlation id.
    pub fn new(tool_name: impl Into<String>, arguments: Option<JsonObject>) -> Self {
        Self {
            request_id: None,
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Routes invocations to registered tool handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a populated registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher routes through.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatch one invocation and return its response envelope.
    #[instrument(skip_all, fields(tool = %request.tool_name, id = ?request.request_id))]
    pub async fn dispatch(&self, request: InvocationRequest) -> CallToolResult {
        let Some(definition) = self.registry.lookup(&request.tool_name) else {
            warn!("Unknown tool requested: {}", request.tool_name);
            return error_result(format!("Unknown tool: {}", request.tool_name));
        };

        let args = match definition.schema.validate(request.arguments.as_ref()) {
            Ok(args) => args,
            Err(e) => {
                warn!("Invalid arguments for {}: {}", definition.name, e);
                return error_result(format!(
                    "Invalid arguments for {}: {}",
                    definition.name, e
                ));
            }
        };

        debug!("Executing tool {}", definition.name);
        match definition.handler.call(args).await {
            Ok(result) => {
                info!("Tool {} completed", definition.name);
                result
            }
            Err(e) => {
                warn!("Tool {} failed: {}", definition.name, e);
                error_result(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::domains::tools::error::ToolError;
    use crate::domains::tools::handlers::{
        ToolHandler, ToolResult, is_error, result_text, text_result,
    };
    use crate::domains::tools::registry::ToolDefinition;
    use crate::domains::tools::schema::{ObjectSchema, ParamSchema, ValidatedArgs};

    /// Handler that counts calls and either echoes the collection or fails.
    struct Counting {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ToolHandler for Counting {
        async fn call(&self, args: ValidatedArgs) -> ToolResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ToolError::execution_failed("store exploded"));
            }
            let collection = args.as_object()["collection"].as_str().unwrap_or_default();
            Ok(text_result(format!("queried {}", collection)))
        }
    }

    fn dispatcher(fail: bool) -> (Dispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "getObjects",
                "Fetch documents",
                ObjectSchema::new()
                    .required("collection", ParamSchema::String, "")
                    .with_default("filter", ParamSchema::record(), json!({}), ""),
                Arc::new(Counting {
                    calls: calls.clone(),
                    fail,
                }),
            ))
            .unwrap();
        (Dispatcher::new(Arc::new(registry)), calls)
    }

    fn object(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_handler() {
        let (dispatcher, calls) = dispatcher(false);
        let result = dispatcher
            .dispatch(InvocationRequest::new("getObjects", object(json!({ "filter": {} }))))
            .await;

        assert!(is_error(&result));
        assert!(result_text(&result).contains("collection: required field is missing"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_arguments_invoke_handler_once() {
        let (dispatcher, calls) = dispatcher(false);
        let result = dispatcher
            .dispatch(InvocationRequest::new(
                "getObjects",
                object(json!({ "collection": "users" })),
            ))
            .await;

        assert!(!is_error(&result));
        assert_eq!(result_text(&result), "queried users");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_failure_becomes_error_envelope() {
        let (dispatcher, calls) = dispatcher(true);
        let result = dispatcher
            .dispatch(InvocationRequest::new(
                "getObjects",
                object(json!({ "collection": "users" })),
            ))
            .await;

        assert!(is_error(&result));
        assert_eq!(result_text(&result), "Execution failed: store exploded");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_then_valid_request() {
        let (dispatcher, calls) = dispatcher(false);

        let unknown = dispatcher
            .dispatch(InvocationRequest::new("doesNotExist", None))
            .await;
        assert!(is_error(&unknown));
        assert!(result_text(&unknown).contains("doesNotExist"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let next = dispatcher
            .dispatch(InvocationRequest::new(
                "getObjects",
                object(json!({ "collection": "logs" })),
            ))
            .await;
        assert!(!is_error(&next));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
