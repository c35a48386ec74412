//! UI design generator tool definition.
//!
//! A design system (colors, typography, spacing, per-component styles) and a
//! list of page designs become React source: a global style table with a
//! theme provider, then one page component and one style table per page.
//!
//! Design-system component styles are resolved here, not in the generated
//! code: a component of type `Card` starts from `designSystem.components.card`
//! and its own `style` wins on conflicts.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use rmcp::model::JsonObject;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ParamSchema, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

pub type StyleMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: String,
    pub heading_sizes: StyleMap,
    pub body_size: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Spacing {
    pub unit: String,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentStyle {
    pub style: StyleMap,
    #[serde(default)]
    pub variants: BTreeMap<String, StyleMap>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DesignSystem {
    pub colors: Colors,
    pub typography: Typography,
    pub spacing: Spacing,
    pub components: BTreeMap<String, ComponentStyle>,
}

impl DesignSystem {
    /// Base style for a component type, looked up case-insensitively.
    fn style_for(&self, kind: &str) -> Option<&StyleMap> {
        self.components
            .get(&kind.to_lowercase())
            .map(|component| &component.style)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Grid,
    Flex,
    Stack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Row,
    Column,
}

impl Direction {
    fn as_css(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub gap: Option<String>,
    #[serde(default)]
    pub columns: Option<u32>,
}

impl LayoutConfig {
    /// CSS properties for this layout. A stack is a flex column.
    fn css(&self) -> StyleMap {
        let mut css = StyleMap::new();
        match self.kind {
            LayoutKind::Grid => {
                css.insert("display".into(), "grid".into());
                if let Some(columns) = self.columns {
                    css.insert(
                        "gridTemplateColumns".into(),
                        format!("repeat({}, 1fr)", columns),
                    );
                }
            }
            LayoutKind::Flex => {
                css.insert("display".into(), "flex".into());
                if let Some(direction) = self.direction {
                    css.insert("flexDirection".into(), direction.as_css().into());
                }
            }
            LayoutKind::Stack => {
                css.insert("display".into(), "flex".into());
                css.insert("flexDirection".into(), "column".into());
            }
        }
        if let Some(gap) = &self.gap {
            css.insert("gap".into(), gap.clone());
        }
        css
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDesign {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub layout: LayoutConfig,
    pub style: StyleMap,
    #[serde(default)]
    pub children: Vec<ComponentDesign>,
    #[serde(default)]
    pub props: JsonObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavPosition {
    Top,
    Side,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Navigation {
    pub position: NavPosition,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageDesign {
    pub name: String,
    pub layout: LayoutConfig,
    pub components: Vec<ComponentDesign>,
    #[serde(default)]
    pub navigation: Option<Navigation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDesignParams {
    pub design_system: DesignSystem,
    pub pages: Vec<PageDesign>,
}

// ============================================================================
// Rendering
// ============================================================================

const INDENT: &str = "  ";

fn pad(depth: usize) -> String {
    INDENT.repeat(depth)
}

/// `Task list` → `TaskList`.
fn pascal_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `Task list` → `taskList`.
fn camel_case(name: &str) -> String {
    let pascal = pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `Task list` → `task-list`.
fn kebab_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn js_key(key: &str) -> String {
    let identifier = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        key.to_string()
    } else {
        js_string(key)
    }
}

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Inline object literal: `{ display: "grid", gap: "8px" }`.
fn inline_object(style: &StyleMap) -> String {
    if style.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = style
        .iter()
        .map(|(key, value)| format!("{}: {}", js_key(key), js_string(value)))
        .collect();
    format!("{{ {} }}", entries.join(", "))
}

/// Multi-line object literal of pre-rendered values, closed at `depth`.
fn block_object(entries: &[(String, String)], depth: usize) -> String {
    let mut out = String::from("{\n");
    for (key, value) in entries {
        let _ = writeln!(out, "{}{}: {},", pad(depth + 1), js_key(key), value);
    }
    out.push_str(&pad(depth));
    out.push('}');
    out
}

fn style_entries(style: &StyleMap) -> Vec<(String, String)> {
    style
        .iter()
        .map(|(key, value)| (key.clone(), js_string(value)))
        .collect()
}

fn merged(layers: &[Option<&StyleMap>]) -> StyleMap {
    let mut style = StyleMap::new();
    for layer in layers.iter().flatten() {
        style.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    style
}

/// Style of one component: its layout, then the design-system entry for its
/// type, then its own style.
fn component_style(component: &ComponentDesign, system: &DesignSystem) -> StyleMap {
    let layout = component.layout.css();
    merged(&[
        Some(&layout),
        system.style_for(&component.kind),
        Some(&component.style),
    ])
}

fn render_global_styles(system: &DesignSystem) -> String {
    let colors = &system.colors;
    let color_entries = vec![
        ("primary".to_string(), js_string(&colors.primary)),
        ("secondary".to_string(), js_string(&colors.secondary)),
        ("accent".to_string(), js_string(&colors.accent)),
        ("background".to_string(), js_string(&colors.background)),
        ("text".to_string(), js_string(&colors.text)),
    ];

    let mut typography = vec![(
        "fontFamily".to_string(),
        js_string(&system.typography.font_family),
    )];
    typography.extend(style_entries(&system.typography.heading_sizes));
    typography.push((
        "body".to_string(),
        format!("{{ fontSize: {} }}", js_string(&system.typography.body_size)),
    ));

    let scale: Vec<String> = system.spacing.scale.iter().map(|s| s.to_string()).collect();
    let spacing = vec![
        ("unit".to_string(), js_string(&system.spacing.unit)),
        ("scale".to_string(), format!("[{}]", scale.join(", "))),
    ];

    let components: Vec<(String, String)> = system
        .components
        .iter()
        .map(|(name, component)| {
            let mut entries = vec![("style".to_string(), inline_object(&component.style))];
            if !component.variants.is_empty() {
                let variants: Vec<(String, String)> = component
                    .variants
                    .iter()
                    .map(|(variant, style)| (variant.clone(), inline_object(style)))
                    .collect();
                entries.push(("variants".to_string(), block_object(&variants, 3)));
            }
            (name.clone(), block_object(&entries, 2))
        })
        .collect();

    let table = vec![
        ("colors".to_string(), block_object(&color_entries, 1)),
        ("typography".to_string(), block_object(&typography, 1)),
        ("spacing".to_string(), block_object(&spacing, 1)),
        ("components".to_string(), block_object(&components, 1)),
    ];

    format!(
        "import {{ ThemeProvider as MuiThemeProvider, createTheme }} from '@mui/material/styles';\n\n\
         const globalStyles = {};\n\n\
         // Theme Provider\n\
         export const ThemeProvider = ({{ children }}) => (\n\
         {i}<MuiThemeProvider theme={{createTheme(globalStyles)}}>\n\
         {i}{i}{{children}}\n\
         {i}</MuiThemeProvider>\n\
         );\n",
        block_object(&table, 0),
        i = INDENT,
    )
}

fn render_navigation(out: &mut String, navigation: &Navigation, depth: usize) {
    let class = match navigation.position {
        NavPosition::Top => "horizontal-nav",
        NavPosition::Side => "vertical-nav",
    };
    let _ = writeln!(out, "{}<nav className=\"{}\">", pad(depth), class);
    for item in &navigation.items {
        let _ = writeln!(
            out,
            "{}<NavItem key={} to={} icon={{{}}}>",
            pad(depth + 1),
            js_string(&item.path),
            js_string(&item.path),
            item.icon.as_deref().unwrap_or("null")
        );
        let _ = writeln!(out, "{}{}", pad(depth + 2), item.label);
        let _ = writeln!(out, "{}</NavItem>", pad(depth + 1));
    }
    let _ = writeln!(out, "{}</nav>", pad(depth));
}

fn render_component(
    out: &mut String,
    component: &ComponentDesign,
    system: &DesignSystem,
    depth: usize,
) {
    let _ = writeln!(out, "{}<{}", pad(depth), component.kind);
    let _ = writeln!(
        out,
        "{}className=\"{}\"",
        pad(depth + 1),
        kebab_case(&component.name)
    );
    let _ = writeln!(
        out,
        "{}style={{{}}}",
        pad(depth + 1),
        inline_object(&component_style(component, system))
    );
    for (prop, value) in &component.props {
        let _ = writeln!(out, "{}{}={{{}}}", pad(depth + 1), prop, value);
    }

    if component.children.is_empty() {
        let _ = writeln!(out, "{}/>", pad(depth));
        return;
    }

    let _ = writeln!(out, "{}>", pad(depth));
    for child in &component.children {
        render_component(out, child, system, depth + 1);
    }
    let _ = writeln!(out, "{}</{}>", pad(depth), component.kind);
}

fn render_page(page: &PageDesign, system: &DesignSystem) -> String {
    let component_name = pascal_case(&page.name);
    let styles_name = format!("{}Styles", camel_case(&page.name));

    let mut out = String::new();
    let _ = writeln!(out, "// {} Page Design", page.name);
    let _ = writeln!(out, "export const {}Page = () => (", component_name);
    let _ = writeln!(
        out,
        "{}<div className=\"{}-page\" style={{{}.page}}>",
        pad(1),
        kebab_case(&page.name),
        styles_name
    );
    if let Some(navigation) = &page.navigation {
        render_navigation(&mut out, navigation, 2);
    }

    let layout = page.layout.css();
    let layout_style = merged(&[Some(&layout), system.style_for("layout")]);
    let _ = writeln!(
        out,
        "{}<div className=\"page-layout\" style={{{}}}>",
        pad(2),
        inline_object(&layout_style)
    );
    for component in &page.components {
        render_component(&mut out, component, system, 3);
    }
    let _ = writeln!(out, "{}</div>", pad(2));
    let _ = writeln!(out, "{}</div>", pad(1));
    out.push_str(");\n\n");

    let mut page_style = StyleMap::from([
        ("display".to_string(), "flex".to_string()),
        ("flexDirection".to_string(), "column".to_string()),
        ("minHeight".to_string(), "100vh".to_string()),
    ]);
    if let Some(style) = system.style_for("page") {
        page_style.extend(style.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    let mut styles = vec![("page".to_string(), block_object(&style_entries(&page_style), 1))];
    for component in &page.components {
        let style = component_style(component, system);
        styles.push((
            camel_case(&component.name),
            block_object(&style_entries(&style), 1),
        ));
    }

    let _ = writeln!(out, "// {} Page Styles", page.name);
    let _ = writeln!(out, "const {} = {};", styles_name, block_object(&styles, 0));
    out
}

/// Render the global styles and every page.
pub fn generate_design(params: &GenerateDesignParams) -> String {
    let pages: Vec<String> = params
        .pages
        .iter()
        .map(|page| render_page(page, &params.design_system))
        .collect();

    format!(
        "// Global Styles\n{}\n// Page Designs\n{}",
        render_global_styles(&params.design_system),
        pages.join("\n")
    )
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Design generator tool - design system + pages to React source.
pub struct GenerateDesignTool;

impl GenerateDesignTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generateDesign";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Generate React UI designs from a design system (colors, typography, spacing, per-component styles) and page designs (layout, nested components, optional navigation). Returns a global style table with a theme provider plus one page component and style table per page.";

    fn layout_schema() -> ParamSchema {
        ParamSchema::Object(
            ObjectSchema::new()
                .required(
                    "type",
                    ParamSchema::one_of_strings(["grid", "flex", "stack"]),
                    "Layout type",
                )
                .optional(
                    "direction",
                    ParamSchema::one_of_strings(["row", "column"]),
                    "Flex direction",
                )
                .optional("gap", ParamSchema::String, "Gap between elements")
                .optional("columns", ParamSchema::Integer, "Number of grid columns"),
        )
    }

    fn component_schema() -> ParamSchema {
        ParamSchema::named(
            "componentDesign",
            ParamSchema::Object(
                ObjectSchema::new()
                    .required("type", ParamSchema::String, "Component type, e.g. Card")
                    .required("name", ParamSchema::String, "Component name")
                    .required("layout", Self::layout_schema(), "")
                    .required("style", ParamSchema::record_of(ParamSchema::String), "")
                    .optional(
                        "children",
                        ParamSchema::array_of(ParamSchema::reference("componentDesign")),
                        "Nested components",
                    )
                    .optional("props", ParamSchema::record(), "Component props"),
            ),
        )
    }

    pub fn schema() -> ObjectSchema {
        let styles = || ParamSchema::record_of(ParamSchema::String);

        let colors = ObjectSchema::new()
            .required("primary", ParamSchema::String, "e.g. #1976d2")
            .required("secondary", ParamSchema::String, "")
            .required("accent", ParamSchema::String, "")
            .required("background", ParamSchema::String, "")
            .required("text", ParamSchema::String, "");

        let typography = ObjectSchema::new()
            .required("fontFamily", ParamSchema::String, "")
            .required("headingSizes", styles(), "e.g. { h1: 2.5rem }")
            .required("bodySize", ParamSchema::String, "");

        let spacing = ObjectSchema::new()
            .required("unit", ParamSchema::String, "Base unit, e.g. 8px")
            .required("scale", ParamSchema::array_of(ParamSchema::Number), "Multipliers");

        let component_style = ObjectSchema::new()
            .required("style", styles(), "Base styles")
            .optional("variants", ParamSchema::record_of(styles()), "");

        let design_system = ObjectSchema::new()
            .required("colors", ParamSchema::Object(colors), "")
            .required("typography", ParamSchema::Object(typography), "")
            .required("spacing", ParamSchema::Object(spacing), "")
            .required(
                "components",
                ParamSchema::record_of(ParamSchema::Object(component_style)),
                "Styles per component type, keyed by lowercase type",
            );

        let nav_item = ObjectSchema::new()
            .required("label", ParamSchema::String, "")
            .required("path", ParamSchema::String, "")
            .optional("icon", ParamSchema::String, "Icon component name");

        let navigation = ObjectSchema::new()
            .required("position", ParamSchema::one_of_strings(["top", "side"]), "")
            .required("items", ParamSchema::array_of(ParamSchema::Object(nav_item)), "");

        let page = ObjectSchema::new()
            .required("name", ParamSchema::String, "Page name, e.g. Dashboard")
            .required("layout", Self::layout_schema(), "")
            .required("components", ParamSchema::array_of(Self::component_schema()), "")
            .optional("navigation", ParamSchema::Object(navigation), "");

        ObjectSchema::new()
            .required("designSystem", ParamSchema::Object(design_system), "")
            .required("pages", ParamSchema::array_of(ParamSchema::Object(page)), "")
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, Self::schema(), Arc::new(Self))
    }
}

#[async_trait::async_trait]
impl ToolHandler for GenerateDesignTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ValidatedArgs) -> ToolResult {
        let params: GenerateDesignParams = args.parse()?;
        info!("Generating designs for {} pages", params.pages.len());
        Ok(text_result(generate_design(&params)))
    }
}

// ============================================================================
// Tests
// ============================================================================
