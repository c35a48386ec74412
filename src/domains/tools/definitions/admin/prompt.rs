//! React-Admin generation prompt tool definition.
//!
//! Turns an architecture (components, fields, data flow) and a UI design
//! (layout components, visualizations) into a Markdown prompt that asks for
//! the matching React-Admin code.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use rmcp::model::JsonObject;
use serde::Deserialize;
use tracing::{info, instrument};

use super::generate::FieldConfig;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ParamSchema, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Architecture {
    pub components: Vec<ComponentSpec>,
    #[serde(rename = "dataFlow")]
    pub data_flow: Vec<DataFlow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub relationships: Vec<String>,
    pub fields: BTreeMap<String, FieldConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataFlow {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Design {
    pub layout: Layout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    pub components: Vec<LayoutComponent>,
    pub visualizations: Vec<Visualization>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutComponent {
    #[serde(rename = "type")]
    pub kind: String,
    pub placement: String,
    pub props: JsonObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Visualization {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<String>,
    pub placement: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePromptParams {
    pub architecture: Architecture,
    pub design: Design,
}

// ============================================================================
// Prompt Rendering
// ============================================================================

const GUIDELINES: &str = "\
## 3. Implementation Guidelines

### Component Structure
- Each component should implement List, Create, Edit, and Show views
- Use React Admin's built-in components where possible
- Implement custom components for specialized requirements

### Data Management
- Handle relationships and references appropriately
- Implement validation for required and unique fields
- Add error handling and loading states

### UI/UX Requirements
- Follow the specified layout and placement guidelines
- Use responsive design patterns
- Ensure accessibility compliance

### Security Considerations
- Apply access control based on component types
- Handle sensitive data appropriately
- Validate all inputs

## 4. Expected Output

The generated components should:
- Follow React Admin's component patterns
- Implement all required views (List, Create, Edit, Show)
- Handle all specified relationships and data flow
- Follow the specified layout and design requirements
- Include error handling and loading states
";

fn describe_field(name: &str, config: &FieldConfig) -> String {
    let mut line = format!("  - {}: {}", name, config.field_type);
    if config.required {
        line.push_str(" (required)");
    }
    if config.unique {
        line.push_str(" (unique)");
    }
    if let Some(reference) = &config.reference {
        let _ = write!(line, " (references {})", reference);
    }
    line
}

/// Render the generation prompt.
pub fn render_prompt(architecture: &Architecture, design: &Design) -> String {
    let mut out = String::from("# React Admin Component Generation Prompt\n\n");

    out.push_str("## 1. Component Architecture\n\n### Components Overview\n");
    for component in &architecture.components {
        let _ = writeln!(out, "\n#### {} ({})\n- Fields:", component.name, component.kind);
        for (name, config) in &component.fields {
            let _ = writeln!(out, "{}", describe_field(name, config));
        }
        let _ = writeln!(out, "- Relationships: {}", component.relationships.join(", "));
    }

    out.push_str("\n### Data Flow\n");
    for flow in &architecture.data_flow {
        let _ = writeln!(out, "- {} → {} ({})", flow.from, flow.to, flow.kind);
    }

    out.push_str("\n## 2. Component Design Requirements\n\n### Layout Components\n");
    for component in &design.layout.components {
        let _ = writeln!(
            out,
            "\n#### {}\n- Placement: {}\n- Properties:",
            component.kind, component.placement
        );
        for (prop, value) in &component.props {
            let _ = writeln!(out, "  - {}: {}", prop, value);
        }
    }

    out.push_str("\n### Visualizations\n");
    for visualization in &design.layout.visualizations {
        let _ = writeln!(
            out,
            "\n#### {}\n- Data Fields: {}\n- Placement: {}",
            visualization.kind,
            visualization.data.join(", "),
            visualization.placement
        );
    }

    out.push('\n');
    out.push_str(GUIDELINES);
    out
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Prompt generator tool - architecture + design to a Markdown prompt.
pub struct GenerateReactAdminPromptTool;

impl GenerateReactAdminPromptTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generateReactAdminPrompt";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Build a detailed prompt for React-Admin component generation from an architecture (components, fields, data flow) and a design (layout components, visualizations). The output of analyzeSchema is a good starting point for the architecture.";

    pub fn schema() -> ObjectSchema {
        let field = ObjectSchema::new()
            .required("type", ParamSchema::String, "Field type tag")
            .optional("required", ParamSchema::Boolean, "")
            .optional("unique", ParamSchema::Boolean, "")
            .optional("reference", ParamSchema::String, "Referenced component");

        let component = ObjectSchema::new()
            .required("name", ParamSchema::String, "Component name, e.g. User")
            .required(
                "type",
                ParamSchema::one_of_strings(["Task", "User", "Generic"]),
                "",
            )
            .required(
                "relationships",
                ParamSchema::array_of(ParamSchema::String),
                "Related component names",
            )
            .required(
                "fields",
                ParamSchema::record_of(ParamSchema::Object(field)),
                "Field definitions",
            );

        let flow = ObjectSchema::new()
            .required("from", ParamSchema::String, "")
            .required("to", ParamSchema::String, "")
            .required("type", ParamSchema::String, "");

        let architecture = ObjectSchema::new()
            .required(
                "components",
                ParamSchema::array_of(ParamSchema::Object(component)),
                "",
            )
            .required("dataFlow", ParamSchema::array_of(ParamSchema::Object(flow)), "");

        let layout_component = ObjectSchema::new()
            .required("type", ParamSchema::String, "")
            .required("placement", ParamSchema::String, "")
            .required("props", ParamSchema::record(), "Component properties");

        let visualization = ObjectSchema::new()
            .required("type", ParamSchema::String, "Chart type")
            .required("data", ParamSchema::array_of(ParamSchema::String), "Fields to visualize")
            .required("placement", ParamSchema::String, "");

        let layout = ObjectSchema::new()
            .required(
                "components",
                ParamSchema::array_of(ParamSchema::Object(layout_component)),
                "",
            )
            .required(
                "visualizations",
                ParamSchema::array_of(ParamSchema::Object(visualization)),
                "",
            );

        ObjectSchema::new()
            .required(
                "architecture",
                ParamSchema::Object(architecture),
                "Components and data flow",
            )
            .required(
                "design",
                ParamSchema::Object(ObjectSchema::new().required(
                    "layout",
                    ParamSchema::Object(layout),
                    "",
                )),
                "UI layout and visualizations",
            )
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, Self::schema(), Arc::new(Self))
    }
}

#[async_trait::async_trait]
impl ToolHandler for GenerateReactAdminPromptTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ValidatedArgs) -> ToolResult {
        let params: GeneratePromptParams = args.parse()?;
        info!(
            "Rendering generation prompt for {} components",
            params.architecture.components.len()
        );
        Ok(text_result(render_prompt(&params.architecture, &params.design)))
    }
}

// ============================================================================
// Tests
// ============================================================================
