//! Schema introspection tool definition.
//!
//! Infers a field → type map per collection from a single sample document.
//! This is a heuristic: documents in the same collection may differ in shape,
//! and only the sampled document's fields are reported.

use std::sync::Arc;

use mongodb::bson::{Bson, Document};
use serde_json::Value;
use tracing::{info, instrument};

use crate::domains::gateway::Gateway;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ValidatedArgs};
use crate::domains::tools::ToolError;

// ============================================================================
// Type Inference
// ============================================================================

/// Type tag for a single BSON value.
pub fn type_tag(value: &Bson) -> &'static str {
    match value {
        Bson::String(_) | Bson::Symbol(_) => "string",
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => "number",
        Bson::Boolean(_) => "boolean",
        Bson::DateTime(_) => "date",
        Bson::ObjectId(_) => "objectId",
        Bson::Array(_) => "array",
        Bson::Document(_) => "object",
        Bson::Null | Bson::Undefined => "null",
        Bson::Binary(_) => "binary",
        Bson::Timestamp(_) => "timestamp",
        Bson::RegularExpression(_) => "regex",
        _ => "unknown",
    }
}

/// Field name → type tag for one sample document.
pub fn infer_field_types(sample: &Document) -> serde_json::Map<String, Value> {
    sample
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(type_tag(value).to_string())))
        .collect()
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Schema introspection tool - one inferred field map per non-empty collection.
pub struct GetSchemasTool {
    gateway: Arc<Gateway>,
}

impl GetSchemasTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "getSchemas";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Fetch all MongoDB collection schemas. Field types are inferred from one sample document per collection; empty or unreadable collections are omitted.";

    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn schema() -> ObjectSchema {
        ObjectSchema::new()
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
impl ToolHandler for GetSchemasTool {
    #[instrument(skip_all)]
    async fn call(&self, _args: ValidatedArgs) -> ToolResult {
        let collections = self.gateway.list_collections().await?;
        info!("Inferring schemas for {} collections", collections.len());

        let mut schemas = serde_json::Map::new();
        for name in collections {
            if let Some(sample) = self.gateway.sample_one(&name).await {
                schemas.insert(name, Value::Object(infer_field_types(&sample)));
            }
        }

        let text = serde_json::to_string_pretty(&schemas)
            .map_err(|e| ToolError::internal(e.to_string()))?;
        Ok(text_result(text))
    }
}

// ============================================================================
// Tests
// ============================================================================
