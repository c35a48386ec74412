//! Object query tool definition.

use std::sync::Arc;

use rmcp::model::JsonObject;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::domains::gateway::{Gateway, MAX_DOCUMENTS, document_to_json};
use crate::domains::tools::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ParamSchema, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GetObjectsParams {
    /// Collection to query.
    pub collection: String,

    /// Query filter, passed to the store as is.
    #[serde(default)]
    pub filter: JsonObject,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Object query tool - fetches up to 100 documents matching a filter.
pub struct GetObjectsTool {
    gateway: Arc<Gateway>,
}

impl GetObjectsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "getObjects";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Fetch documents from a MongoDB collection. The optional filter uses MongoDB query syntax (Extended JSON allowed); at most 100 documents are returned.";

    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .required("collection", ParamSchema::String, "Collection name")
            .with_default(
                "filter",
                ParamSchema::record(),
                Value::Object(JsonObject::new()),
                "MongoDB query filter",
            )
    }

    pub fn definition(gateway: Arc<Gateway>) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(),
            Arc::new(Self::new(gateway)),
        )
    }
}

#[async_trait::async_trait]
impl ToolHandler for GetObjectsTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ValidatedArgs) -> ToolResult {
        let params: GetObjectsParams = args.parse()?;
        info!("Querying collection '{}'", params.collection);

        let found = self
            .gateway
            .find_many(&params.collection, &params.filter)
            .await?;
        let documents = found.documents;

        if documents.is_empty() {
            return Ok(text_result(format!(
                "No documents found in {}",
                params.collection
            )));
        }

        let count = documents.len();
        let rendered: Vec<Value> = documents.into_iter().map(document_to_json).collect();
        let json = serde_json::to_string_pretty(&rendered)
            .map_err(|e| ToolError::internal(e.to_string()))?;

        let mut text = format!(
            "Fetched {} documents from \"{}\"",
            count, params.collection
        );
        if found.truncated {
            text.push_str(&format!(" (limited to {})", MAX_DOCUMENTS));
        }
        text.push_str(":\n\n");
        text.push_str(&json);

        Ok(text_result(text))
    }
}

// ============================================================================
// Tests
// ============================================================================
