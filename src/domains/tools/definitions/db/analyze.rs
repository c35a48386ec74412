//! Schema analysis tool definition.
//!
//! Samples one document per collection and derives an architecture sketch:
//! component kinds, embedded relationships, security needs, per-field rules,
//! data flow edges and access levels. Like `getSchemas`, everything here is
//! inferred from a single sample and is only a starting point.

use std::sync::Arc;

use mongodb::bson::{Bson, Document};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::schemas::type_tag;
use crate::domains::gateway::Gateway;
use crate::domains::tools::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ValidatedArgs};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const PASSWORD_PATTERN: &str = r"^(?=.*[A-Za-z])(?=.*\d)[A-Za-z\d]{8,}$";

// ============================================================================
// Output Structure (JSON format for AI agents)
// ============================================================================

#[derive(Debug, Default, Serialize)]
pub struct SchemaAnalysis {
    pub architecture: Architecture,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Architecture {
    pub components: Vec<ComponentAnalysis>,
    pub data_flow: Vec<DataFlowEdge>,
    pub security: Vec<AccessPolicy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    Task,
    User,
    Generic,
}

#[derive(Debug, Serialize)]
pub struct ComponentAnalysis {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub relationships: Vec<String>,
    pub security: Vec<&'static str>,
    pub fields: Vec<FieldAnalysis>,
}

#[derive(Debug, Serialize)]
pub struct FieldAnalysis {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub required: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DataFlowEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AccessPolicy {
    pub component: String,
    pub access: Vec<&'static str>,
}

// ============================================================================
// Heuristics
// ============================================================================

fn component_kind(sample: &Document) -> ComponentKind {
    if sample.contains_key("status") && sample.contains_key("priority") {
        ComponentKind::Task
    } else if sample.contains_key("email") && sample.contains_key("role") {
        ComponentKind::User
    } else {
        ComponentKind::Generic
    }
}

/// Embedded documents and arrays.
fn is_nested(value: &Bson) -> bool {
    matches!(value, Bson::Document(_) | Bson::Array(_))
}

fn relationships(sample: &Document) -> Vec<String> {
    sample
        .iter()
        .filter(|(_, value)| is_nested(value))
        .map(|(key, _)| key.clone())
        .collect()
}

fn security_needs(sample: &Document) -> Vec<&'static str> {
    let mut needs = Vec::new();
    if sample.contains_key("password") {
        needs.push("encryption");
    }
    if sample.contains_key("role") {
        needs.push("authorization");
    }
    needs
}

fn access_levels(sample: &Document) -> Vec<&'static str> {
    if sample.contains_key("system") {
        vec!["read"]
    } else {
        vec!["read", "create", "update", "delete"]
    }
}

fn numeric_value(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn analyze_field(name: &str, value: &Bson) -> FieldAnalysis {
    let mut field = FieldAnalysis {
        name: name.to_string(),
        field_type: type_tag(value),
        required: true,
        unique: name == "email" || name == "username" || name.contains("code"),
        reference: None,
        validation: None,
    };

    if let Some(id) = value.as_document().and_then(|embedded| embedded.get("_id")) {
        field.field_type = "reference";
        field.reference = Some(match id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s.clone(),
            other => other.to_string(),
        });
    }

    if let Some(n) = numeric_value(value) {
        field.validation = Some(FieldValidation {
            min: Some(0.0),
            max: (n > 100.0).then_some(100.0),
            pattern: None,
        });
    } else if let Bson::String(_) = value {
        let pattern = if name.contains("email") {
            Some(EMAIL_PATTERN)
        } else if name.contains("password") {
            Some(PASSWORD_PATTERN)
        } else {
            None
        };
        field.validation = pattern.map(|pattern| FieldValidation {
            pattern: Some(pattern),
            ..Default::default()
        });
    }

    field
}

/// Add one collection's sample to the analysis.
pub fn analyze_collection(analysis: &mut SchemaAnalysis, collection: &str, sample: &Document) {
    let architecture = &mut analysis.architecture;

    architecture.components.push(ComponentAnalysis {
        name: collection.to_string(),
        kind: component_kind(sample),
        relationships: relationships(sample),
        security: security_needs(sample),
        fields: sample
            .iter()
            .map(|(name, value)| analyze_field(name, value))
            .collect(),
    });

    architecture.data_flow.extend(relationships(sample).into_iter().map(|to| DataFlowEdge {
        from: collection.to_string(),
        to,
        kind: "reference",
    }));

    architecture.security.push(AccessPolicy {
        component: collection.to_string(),
        access: access_levels(sample),
    });
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Schema analysis tool - architecture recommendations from sampled documents.
pub struct AnalyzeSchemaTool {
    gateway: Arc<Gateway>,
}

impl AnalyzeSchemaTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "analyzeSchema";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Analyze MongoDB collection schemas to produce architecture recommendations: component types, relationships, field rules, data flow and access levels.";

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
impl ToolHandler for AnalyzeSchemaTool {
    #[instrument(skip_all)]
    async fn call(&self, _args: ValidatedArgs) -> ToolResult {
        let collections = self.gateway.list_collections().await?;
        info!("Analyzing {} collections", collections.len());

        let mut analysis = SchemaAnalysis::default();
        for name in &collections {
            match self.gateway.sample_one(name).await {
                Some(sample) => analyze_collection(&mut analysis, name, &sample),
                None => debug!("No sample for {}", name),
            }
        }

        let text = serde_json::to_string_pretty(&analysis)
            .map_err(|e| ToolError::internal(e.to_string()))?;
        Ok(text_result(text))
    }
}

// ============================================================================
// Tests
// ============================================================================
