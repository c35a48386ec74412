//! Object update tool definition.
//!
//! Applies a `$set` of the given fields to one document selected by `_id`.
//! Fields not named in `updates` are left untouched.

use std::sync::Arc;

use rmcp::model::JsonObject;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::gateway::{Gateway, document_to_json};
use crate::domains::tools::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ParamSchema, ValidatedArgs, ValidationError};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateObjectParams {
    /// Collection holding the document.
    pub collection: String,

    /// Document `_id` as a 24-character hex string.
    pub id: String,

    /// Fields to set.
    pub updates: JsonObject,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Object update tool - partial update of a single document.
pub struct UpdateObjectTool {
    gateway: Arc<Gateway>,
}

impl UpdateObjectTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "updateObject";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Update a single document by its ObjectId. Only the fields named in `updates` are changed; the updated document is returned.";

    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .required("collection", ParamSchema::String, "Collection name")
            .required("id", ParamSchema::String, "Document ObjectId (24 hex characters)")
            .required("updates", ParamSchema::record(), "Fields to set on the document")
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
impl ToolHandler for UpdateObjectTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ValidatedArgs) -> ToolResult {
        let params: UpdateObjectParams = args.parse()?;

        if params.updates.is_empty() {
            return Err(ValidationError::single("updates", "must name at least one field").into());
        }

        info!(
            "Updating {} in '{}' ({} fields)",
            params.id,
            params.collection,
            params.updates.len()
        );

        let updated = self
            .gateway
            .find_and_update_by_id(&params.collection, &params.id, &params.updates)
            .await?;

        let Some(document) = updated else {
            return Ok(text_result(format!(
                "Document {} not found in {}",
                params.id, params.collection
            )));
        };

        let json = serde_json::to_string_pretty(&document_to_json(document))
            .map_err(|e| ToolError::internal(e.to_string()))?;
        Ok(text_result(format!("Updated document:\n{}", json)))
    }
}

// ============================================================================
// Tests
// ============================================================================
