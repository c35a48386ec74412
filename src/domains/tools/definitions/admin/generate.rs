//! React-Admin resource generator tool definition.
//!
//! A pure text transform: a resource name plus a field → type map becomes the
//! source of the List / Create / Edit / Show views. No store access.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ParamSchema, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Full field description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldConfig {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub reference: Option<String>,
}

/// A field given either as a bare type tag or as a full description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Tag(String),
    Config(FieldConfig),
}

impl FieldSpec {
    fn into_config(self) -> FieldConfig {
        match self {
            Self::Tag(field_type) => FieldConfig {
                field_type,
                ..Default::default()
            },
            Self::Config(config) => config,
        }
    }
}

/// Which views to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewSelection {
    List,
    Create,
    Edit,
    Show,
    #[default]
    All,
}

impl ViewSelection {
    fn includes(self, view: View) -> bool {
        match self {
            Self::All => true,
            Self::List => view == View::List,
            Self::Create => view == View::Create,
            Self::Edit => view == View::Edit,
            Self::Show => view == View::Show,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReactAdminParams {
    pub name: String,
    pub fields: BTreeMap<String, FieldSpec>,
    #[serde(rename = "type", default)]
    pub views: ViewSelection,
    #[serde(default)]
    pub relationships: Vec<String>,
}

// ============================================================================
// Generation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    List,
    Create,
    Edit,
    Show,
}

impl View {
    const ALL: [View; 4] = [View::List, View::Create, View::Edit, View::Show];

    fn suffix(self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Create => "Create",
            Self::Edit => "Edit",
            Self::Show => "Show",
        }
    }

    /// Outer and inner layout components.
    fn containers(self) -> (&'static str, &'static str) {
        match self {
            Self::List => ("List", "Datagrid"),
            Self::Create => ("Create", "SimpleForm"),
            Self::Edit => ("Edit", "SimpleForm"),
            Self::Show => ("Show", "SimpleShowLayout"),
        }
    }

    fn is_form(self) -> bool {
        matches!(self, Self::Create | Self::Edit)
    }
}

/// Import names in first-use order, without duplicates.
#[derive(Debug, Default)]
struct Imports(Vec<&'static str>);

impl Imports {
    fn add(&mut self, name: &'static str) {
        if !self.0.contains(&name) {
            self.0.push(name);
        }
    }

    fn render(&self) -> String {
        format!("import {{ {} }} from 'react-admin';", self.0.join(", "))
    }
}

enum Widget<'a> {
    Number,
    Date,
    Boolean,
    Reference(&'a str),
    Text,
}

fn widget<'a>(name: &'a str, config: &'a FieldConfig, relationships: &[String]) -> Widget<'a> {
    if config.field_type == "reference" || relationships.iter().any(|r| r == name) {
        return Widget::Reference(config.reference.as_deref().unwrap_or(name));
    }
    match config.field_type.as_str() {
        "number" => Widget::Number,
        "date" => Widget::Date,
        "boolean" => Widget::Boolean,
        _ => Widget::Text,
    }
}

fn render_field(
    name: &str,
    config: &FieldConfig,
    relationships: &[String],
    form: bool,
    imports: &mut Imports,
) -> String {
    let validate = if form && config.required {
        imports.add("required");
        " validate={required()}"
    } else {
        ""
    };

    let simple = |component: &'static str, imports: &mut Imports| {
        imports.add(component);
        format!("<{} source=\"{}\"{} />", component, name, validate)
    };

    match (widget(name, config, relationships), form) {
        (Widget::Reference(target), false) => {
            imports.add("ReferenceField");
            imports.add("TextField");
            format!(
                "<ReferenceField source=\"{}\" reference=\"{}\"><TextField source=\"name\" /></ReferenceField>",
                name, target
            )
        }
        (Widget::Reference(target), true) => {
            imports.add("ReferenceInput");
            imports.add("SelectInput");
            format!(
                "<ReferenceInput source=\"{}\" reference=\"{}\"{}><SelectInput optionText=\"name\" /></ReferenceInput>",
                name, target, validate
            )
        }
        (Widget::Number, false) => simple("NumberField", imports),
        (Widget::Number, true) => simple("NumberInput", imports),
        (Widget::Date, false) => simple("DateField", imports),
        (Widget::Date, true) => simple("DateInput", imports),
        (Widget::Boolean, false) => simple("BooleanField", imports),
        (Widget::Boolean, true) => simple("BooleanInput", imports),
        (Widget::Text, false) => simple("TextField", imports),
        (Widget::Text, true) => simple("TextInput", imports),
    }
}

fn render_view(
    resource: &str,
    view: View,
    fields: &[(String, FieldConfig)],
    relationships: &[String],
    imports: &mut Imports,
) -> String {
    let (outer, inner) = view.containers();
    imports.add(outer);
    imports.add(inner);

    let body = fields
        .iter()
        .map(|(name, config)| render_field(name, config, relationships, view.is_form(), imports))
        .collect::<Vec<_>>()
        .join("\n      ");

    format!(
        "export const {resource}{suffix} = () => (\n  <{outer}>\n    <{inner}>\n      {body}\n    </{inner}>\n  </{outer}>\n);",
        suffix = view.suffix(),
    )
}

/// Generate React-Admin view source for one resource.
pub fn generate_resource(params: GenerateReactAdminParams) -> String {
    let fields: Vec<(String, FieldConfig)> = params
        .fields
        .into_iter()
        .map(|(name, spec)| (name, spec.into_config()))
        .collect();

    let mut imports = Imports::default();
    let views: Vec<String> = View::ALL
        .into_iter()
        .filter(|view| params.views.includes(*view))
        .map(|view| render_view(&params.name, view, &fields, &params.relationships, &mut imports))
        .collect();

    format!("{}\n\n{}\n", imports.render(), views.join("\n\n"))
}

// ============================================================================
// Tool Definition
// ============================================================================

/// React-Admin generator tool - emits view components for a resource.
pub struct GenerateReactAdminTool;

impl GenerateReactAdminTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generateReactAdmin";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Generate React-Admin List/Create/Edit/Show components for a resource. Field types select widgets (number, date, boolean, reference, anything else is text); required fields get validation.";

    pub fn schema() -> ObjectSchema {
        let field_config = ObjectSchema::new()
            .required("type", ParamSchema::String, "Field type tag")
            .optional("required", ParamSchema::Boolean, "Add required() validation")
            .optional("unique", ParamSchema::Boolean, "Field holds unique values")
            .optional("reference", ParamSchema::String, "Referenced resource");

        ObjectSchema::new()
            .required("name", ParamSchema::String, "Resource/component name, e.g. User")
            .required(
                "fields",
                ParamSchema::record_of(ParamSchema::AnyOf(vec![
                    ParamSchema::String,
                    ParamSchema::Object(field_config),
                ])),
                "Field name → type tag, or → {type, required?, unique?, reference?}",
            )
            .with_default(
                "type",
                ParamSchema::one_of_strings(["list", "create", "edit", "show", "all"]),
                Value::String("all".into()),
                "Views to generate",
            )
            .optional(
                "relationships",
                ParamSchema::array_of(ParamSchema::String),
                "Fields rendered as reference widgets",
            )
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, Self::schema(), Arc::new(Self))
    }
}

#[async_trait::async_trait]
impl ToolHandler for GenerateReactAdminTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ValidatedArgs) -> ToolResult {
        let params: GenerateReactAdminParams = args.parse()?;
        info!(
            "Generating React-Admin views for {} ({} fields)",
            params.name,
            params.fields.len()
        );
        Ok(text_result(generate_resource(params)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::handlers::{is_error, result_text};
    use serde_json::json;

    fn params(value: Value) -> GenerateReactAdminParams {
        GenerateReactAdminTool::schema()
            .validate(value.as_object())
            .unwrap()
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_number_and_text_widgets() {
        let args = GenerateReactAdminTool::schema()
            .validate(
                json!({ "name": "User", "fields": { "age": "number", "email": "string" } })
                    .as_object(),
            )
            .unwrap();
        let result = GenerateReactAdminTool.call(args).await.unwrap();
        assert!(!is_error(&result));

        let code = result_text(&result);
        assert!(code.contains("<NumberField source=\"age\" />"));
        assert!(code.contains("<NumberInput source=\"age\" />"));
        assert!(code.contains("<TextField source=\"email\" />"));
        assert!(code.contains("<TextInput source=\"email\" />"));
        for view in ["UserList", "UserCreate", "UserEdit", "UserShow"] {
            assert!(code.contains(&format!("export const {} = () => (", view)));
        }
    }

    #[test]
    fn test_single_deduplicated_import_line() {
        let code = generate_resource(params(json!({
            "name": "Task",
            "fields": { "done": "boolean", "due": "date", "title": "string" }
        })));

        let import_lines: Vec<&str> = code.lines().filter(|l| l.starts_with("import")).collect();
        assert_eq!(
            import_lines,
            vec![
                "import { List, Datagrid, BooleanField, DateField, TextField, Create, SimpleForm, \
                 BooleanInput, DateInput, TextInput, Edit, Show, SimpleShowLayout } from 'react-admin';"
            ]
        );
    }

    #[test]
    fn test_required_fields_are_validated_in_forms() {
        let code = generate_resource(params(json!({
            "name": "User",
            "fields": { "email": { "type": "string", "required": true } },
            "type": "create"
        })));

        assert!(code.starts_with("import { Create, SimpleForm, required, TextInput } from 'react-admin';"));
        assert!(code.contains("<TextInput source=\"email\" validate={required()} />"));
        assert!(!code.contains("UserList"));
    }

    #[test]
    fn test_relationships_render_reference_widgets() {
        let code = generate_resource(params(json!({
            "name": "Post",
            "fields": {
                "author": "string",
                "category": { "type": "reference", "reference": "categories" }
            },
            "relationships": ["author"]
        })));

        assert!(code.contains(
            "<ReferenceField source=\"author\" reference=\"author\"><TextField source=\"name\" /></ReferenceField>"
        ));
        assert!(code.contains(
            "<ReferenceInput source=\"category\" reference=\"categories\"><SelectInput optionText=\"name\" /></ReferenceInput>"
        ));
        assert!(!code.contains("<TextInput source=\"author\""));
    }

    #[test]
    fn test_view_selection() {
        let code = generate_resource(params(json!({
            "name": "User",
            "fields": { "age": "number" },
            "type": "show"
        })));
        assert!(code.contains("export const UserShow"));
        assert!(!code.contains("export const UserList"));
        assert!(!code.contains("NumberInput"));
    }

    #[test]
    fn test_bad_field_description_fails_validation() {
        let err = GenerateReactAdminTool::schema()
            .validate(json!({ "name": "User", "fields": { "age": 5 } }).as_object())
            .unwrap_err();
        assert!(err.to_string().contains("fields.age"));
    }
}
