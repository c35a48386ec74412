//! UX design prompt tool definition.
//!
//! Turns an architecture (components, data flow, access rules) into a
//! ten-section Markdown brief for designing a React-Admin interface. Most
//! per-component advice depends on whether the component is a `Task`, a
//! `User` or anything else.

use std::fmt::Write;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};

use super::prompt::DataFlow;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, text_result};
use crate::domains::tools::registry::ToolDefinition;
use crate::domains::tools::schema::{ObjectSchema, ParamSchema, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct DesignComponent {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub relationships: Vec<String>,
    pub security: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessRule {
    pub component: String,
    pub access: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignArchitecture {
    pub components: Vec<DesignComponent>,
    pub data_flow: Vec<DataFlow>,
    pub security: Vec<AccessRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaAnalysis {
    pub architecture: DesignArchitecture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateDesignPromptParams {
    pub schema: SchemaAnalysis,
}

// ============================================================================
// Prompt Rendering
// ============================================================================

/// Advice for one aspect: task components, user components, the rest.
type Advice = [&'static str; 3];

fn pick(component: &DesignComponent, advice: &Advice) -> &'static str {
    match component.kind.as_str() {
        "Task" => advice[0],
        "User" => advice[1],
        _ => advice[2],
    }
}

const LIST_VIEW: Advice = [
    "Sortable list with status filters, priority indicators, and assignee",
    "Grid view with role badges, status indicators, and quick actions",
    "Standard list with filters and bulk actions",
];
const EDIT_VIEW: Advice = [
    "Tabbed form with main details, assignments, and history",
    "Multi-section form with profile, roles, and permissions",
    "Standard edit form with validation",
];
const SHOW_VIEW: Advice = [
    "Detailed view with status timeline, comments, and related tasks",
    "Profile view with activity history and role information",
    "Standard detail view with related data",
];
const CREATE_VIEW: Advice = [
    "Wizard-style form with step-by-step creation",
    "Multi-step form with role assignment",
    "Standard create form",
];

const LIST_COMPONENT: Advice = [
    "Custom DataGrid with status indicators and quick actions",
    "CardGrid with user avatars and role badges",
    "Standard DataGrid with filters",
];
const EDIT_COMPONENT: Advice = [
    "TabbedForm with custom fields and validation",
    "MultiSectionForm with role management",
    "SimpleForm with standard fields",
];
const SHOW_COMPONENT: Advice = [
    "Custom Show with timeline and comments",
    "ProfileShow with activity feed",
    "Standard Show component",
];
const CREATE_COMPONENT: Advice = [
    "WizardForm with step validation",
    "MultiStepForm with role selection",
    "SimpleForm with validation",
];
const CUSTOM_COMPONENTS: Advice = [
    "StatusTimeline, CommentSection, AssignmentPicker",
    "RoleManager, ActivityFeed, PermissionMatrix",
    "CustomField, ValidationWrapper",
];

const KEY_METRICS: Advice = [
    "Completion rate, Average time, Priority distribution",
    "Active users, Role distribution, Activity level",
    "Count, Status, Trends",
];
const CHARTS: Advice = [
    "Status pie chart, Timeline view, Priority bar chart",
    "Activity line chart, Role distribution, Usage metrics",
    "Standard charts based on data type",
];
const DATA_CARDS: Advice = [
    "Status summary, Priority overview, Assignment stats",
    "User stats, Role summary, Activity metrics",
    "Key metrics, Status cards",
];
const RECENT_ACTIVITY: Advice = [
    "Status changes, Comments, Assignments",
    "Login history, Role changes, Actions",
    "Recent updates, Changes",
];

const FORM_INTERACTIONS: Advice = [
    "Auto-save, Field validation, Dynamic fields",
    "Role-based fields, Permission checks, Validation",
    "Standard form interactions",
];
const LIST_INTERACTIONS: Advice = [
    "Drag-and-drop, Quick edit, Bulk actions",
    "Role assignment, Status toggle, Batch update",
    "Standard list interactions",
];
const DETAIL_INTERACTIONS: Advice = [
    "Status update, Comment addition, Assignment change",
    "Role management, Permission update, Profile edit",
    "Standard detail interactions",
];
const BULK_ACTIONS: Advice = [
    "Status update, Assignment, Delete",
    "Role update, Status change, Delete",
    "Standard bulk actions",
];

const MOBILE_LAYOUT: Advice = [
    "Stack layout with collapsible sections",
    "Card layout with swipe actions",
    "Responsive grid layout",
];
const TABLET_LAYOUT: Advice = [
    "Two-column layout with main content and sidebar",
    "Grid layout with expanded cards",
    "Adaptive grid layout",
];
const DESKTOP_LAYOUT: Advice = [
    "Multi-column layout with detailed views",
    "Dashboard layout with widgets",
    "Full-featured layout",
];

const DATA_LOADING: Advice = [
    "Pagination with infinite scroll, Optimistic updates",
    "Lazy loading with caching, Background sync",
    "Standard data loading",
];
const COMPONENT_OPTIMIZATION: Advice = [
    "Memoized components, Virtualized lists",
    "Lazy-loaded components, Cached data",
    "Standard optimization",
];

const COMPONENT_STYLING: Advice = [
    "Status-based styling, Priority indicators",
    "Role-based styling, Activity indicators",
    "Consistent component styling",
];
const COLOR_SCHEME: Advice = [
    "Status-based colors, Priority indicators",
    "Role-based colors, Activity indicators",
    "Brand colors with semantic meaning",
];

/// Value of one bullet in a per-component block.
#[derive(Clone, Copy)]
enum Bullet {
    /// The lowercased component name.
    ResourceName,
    ByType(&'static Advice),
    Fixed(&'static str),
}

impl Bullet {
    fn render(self, component: &DesignComponent) -> String {
        match self {
            Self::ResourceName => component.name.to_lowercase(),
            Self::ByType(advice) => pick(component, advice).to_string(),
            Self::Fixed(text) => text.to_string(),
        }
    }
}

/// One `#### {name} {heading}` block per component with the given bullets.
fn per_component(
    out: &mut String,
    components: &[DesignComponent],
    heading: &str,
    bullets: &[(&str, Bullet)],
) {
    let blocks: Vec<String> = components
        .iter()
        .map(|component| {
            let mut block = format!("#### {} {}", component.name, heading);
            for (label, bullet) in bullets {
                let _ = write!(block, "\n- {}: {}", label, bullet.render(component));
            }
            block
        })
        .collect();
    out.push_str(&blocks.join("\n\n"));
}

fn information_architecture(out: &mut String, architecture: &DesignArchitecture) {
    out.push_str("\n### Component Hierarchy\n");
    let hierarchy: Vec<String> = architecture
        .components
        .iter()
        .map(|c| {
            format!(
                "- {} ({})\n  - Related to: {}",
                c.name,
                c.kind,
                c.relationships.join(", ")
            )
        })
        .collect();
    out.push_str(&hierarchy.join("\n"));

    out.push_str("\n\n### Data Relationships\n");
    let flows: Vec<String> = architecture
        .data_flow
        .iter()
        .map(|f| format!("- {} → {} ({})", f.from, f.to, f.kind))
        .collect();
    out.push_str(&flows.join("\n"));

    out.push_str(
        "\n\n### Key Considerations\n\
         - Organize components based on their relationships and data flow\n\
         - Ensure logical grouping of related information\n\
         - Maintain clear hierarchy in information presentation\n\
         - Consider user mental models when structuring content",
    );
}

fn navigation(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### React Admin Resource Configuration\n");
    per_component(
        out,
        components,
        "Resource",
        &[
            ("Resource Name", Bullet::ResourceName),
            ("List View", Bullet::ByType(&LIST_VIEW)),
            ("Edit View", Bullet::ByType(&EDIT_VIEW)),
            ("Show View", Bullet::ByType(&SHOW_VIEW)),
            ("Create View", Bullet::ByType(&CREATE_VIEW)),
        ],
    );
    out.push_str(
        "\n\n### Navigation Structure\n\
         - Use React Admin's <Resource> components for automatic routing\n\
         - Implement custom routes for complex navigation flows\n\
         - Configure breadcrumbs for deep navigation\n\
         - Add custom menu items for special features\n\n\
         ### Menu Configuration\n\
         - Group related resources in the sidebar\n\
         - Use icons for better visual recognition\n\
         - Implement collapsible menu sections\n\
         - Add custom menu items for dashboards\n\n\
         ### Routing Best Practices\n\
         - Use React Admin's built-in routing system\n\
         - Implement custom routes for special features\n\
         - Handle deep linking and bookmarking\n\
         - Manage route permissions based on user roles",
    );
}

fn component_guidelines(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### React Admin Component Integration\n");
    per_component(
        out,
        components,
        "Components",
        &[
            ("List Component", Bullet::ByType(&LIST_COMPONENT)),
            ("Edit Component", Bullet::ByType(&EDIT_COMPONENT)),
            ("Show Component", Bullet::ByType(&SHOW_COMPONENT)),
            ("Create Component", Bullet::ByType(&CREATE_COMPONENT)),
            ("Custom Components", Bullet::ByType(&CUSTOM_COMPONENTS)),
        ],
    );
    out.push_str(
        "\n\n### Form Design Guidelines\n\
         - Use React Admin's <SimpleForm> or <TabbedForm> based on complexity\n\
         - Implement custom input components for special fields\n\
         - Add validation using react-hook-form\n\
         - Include field-level help text and tooltips\n\n\
         ### List View Guidelines\n\
         - Configure columns based on data importance\n\
         - Implement sorting and filtering\n\
         - Add bulk actions for common operations\n\
         - Include custom actions in the list view\n\n\
         ### Detail View Guidelines\n\
         - Use <Show> component with custom layout\n\
         - Implement tabs for complex data\n\
         - Add related data sections\n\
         - Include action buttons for common operations",
    );
}

fn visualization(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### Dashboard Design\n");
    per_component(
        out,
        components,
        "Dashboard",
        &[
            ("Key Metrics", Bullet::ByType(&KEY_METRICS)),
            ("Charts", Bullet::ByType(&CHARTS)),
            ("Data Cards", Bullet::ByType(&DATA_CARDS)),
            ("Recent Activity", Bullet::ByType(&RECENT_ACTIVITY)),
        ],
    );
    out.push_str(
        "\n\n### Data Visualization Components\n\
         - Use @mui/x-charts for standard charts\n\
         - Implement custom charts for specific needs\n\
         - Add interactive features to charts\n\
         - Include data export options\n\n\
         ### Dashboard Layout\n\
         - Use grid system for responsive layout\n\
         - Implement collapsible sections\n\
         - Add refresh controls\n\
         - Include date range selectors\n\n\
         ### Real-time Updates\n\
         - Implement WebSocket connections for live data\n\
         - Add polling for periodic updates\n\
         - Show loading states during updates\n\
         - Handle offline scenarios gracefully",
    );
}

fn interactions(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### User Interactions\n");
    per_component(
        out,
        components,
        "Interactions",
        &[
            ("Form Interactions", Bullet::ByType(&FORM_INTERACTIONS)),
            ("List Interactions", Bullet::ByType(&LIST_INTERACTIONS)),
            ("Detail View Interactions", Bullet::ByType(&DETAIL_INTERACTIONS)),
            ("Bulk Actions", Bullet::ByType(&BULK_ACTIONS)),
        ],
    );
    out.push_str(
        "\n\n### Form Interactions\n\
         - Implement field-level validation\n\
         - Add auto-save functionality\n\
         - Show inline help and tooltips\n\
         - Handle complex field dependencies\n\n\
         ### List Interactions\n\
         - Add inline editing capabilities\n\
         - Implement drag-and-drop reordering\n\
         - Include quick action buttons\n\
         - Add row selection and bulk actions\n\n\
         ### Search and Filter\n\
         - Implement advanced search\n\
         - Add custom filters\n\
         - Include saved searches\n\
         - Show filter combinations",
    );
}

fn security(out: &mut String, rules: &[AccessRule]) {
    out.push_str("\n### React Admin Security\n");
    let blocks: Vec<String> = rules
        .iter()
        .map(|rule| {
            let access = rule.access.join(", ");
            format!(
                "#### {c} Security\n\
                 - Resource Access: Control access to {c} resource based on {a}\n\
                 - Field-level Security: Implement field-level permissions for {c} based on {a}\n\
                 - Action Permissions: Control actions (create, edit, delete) for {c} based on {a}",
                c = rule.component,
                a = access
            )
        })
        .collect();
    out.push_str(&blocks.join("\n\n"));
    out.push_str(
        "\n\n### Authentication Integration\n\
         - Implement custom authProvider\n\
         - Handle token management\n\
         - Add session timeout\n\
         - Implement refresh token logic\n\n\
         ### Authorization\n\
         - Use React Admin's permissions system\n\
         - Implement custom permission checks\n\
         - Add role-based access control\n\
         - Handle field-level permissions",
    );
}

fn responsive(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### Responsive Design\n");
    per_component(
        out,
        components,
        "Responsive Design",
        &[
            ("Mobile Layout", Bullet::ByType(&MOBILE_LAYOUT)),
            ("Tablet Layout", Bullet::ByType(&TABLET_LAYOUT)),
            ("Desktop Layout", Bullet::ByType(&DESKTOP_LAYOUT)),
        ],
    );
    out.push_str(
        "\n\n### Responsive Components\n\
         - Use MUI's responsive components\n\
         - Implement custom responsive layouts\n\
         - Add touch-friendly interactions\n\
         - Optimize for different screen sizes\n\n\
         ### Mobile Experience\n\
         - Implement bottom navigation\n\
         - Add pull-to-refresh\n\
         - Optimize forms for mobile\n\
         - Handle touch gestures",
    );
}

fn accessibility(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### Accessibility Features\n");
    per_component(
        out,
        components,
        "Accessibility",
        &[
            (
                "Keyboard Navigation",
                Bullet::Fixed("Implement keyboard navigation, shortcuts, and focus management"),
            ),
            (
                "Screen Reader Support",
                Bullet::Fixed("ARIA labels, Semantic HTML, Screen reader announcements"),
            ),
            (
                "Color Contrast",
                Bullet::Fixed("WCAG AA compliance, High contrast mode support"),
            ),
        ],
    );
    out.push_str(
        "\n\n### Internationalization\n\
         - Implement i18n using react-i18next\n\
         - Add RTL support\n\
         - Handle date and number formatting\n\
         - Support multiple languages\n\n\
         ### Accessibility Best Practices\n\
         - Use semantic HTML elements\n\
         - Add ARIA labels and roles\n\
         - Implement keyboard shortcuts\n\
         - Ensure sufficient color contrast",
    );
}

fn performance(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### Performance Optimization\n");
    per_component(
        out,
        components,
        "Performance",
        &[
            ("Data Loading", Bullet::ByType(&DATA_LOADING)),
            (
                "Caching Strategy",
                Bullet::Fixed("Local storage for preferences, Cache critical data"),
            ),
            ("Component Optimization", Bullet::ByType(&COMPONENT_OPTIMIZATION)),
        ],
    );
    out.push_str(
        "\n\n### Data Management\n\
         - Implement efficient data fetching\n\
         - Use optimistic updates\n\
         - Add data caching\n\
         - Handle offline scenarios\n\n\
         ### Performance Best Practices\n\
         - Implement code splitting\n\
         - Use React.memo for expensive components\n\
         - Optimize re-renders\n\
         - Add loading states and skeletons",
    );
}

fn design_system(out: &mut String, components: &[DesignComponent]) {
    out.push_str("\n### React Admin Theme Customization\n");
    per_component(
        out,
        components,
        "Theme",
        &[
            ("Component Styling", Bullet::ByType(&COMPONENT_STYLING)),
            (
                "Typography",
                Bullet::Fixed("Clear hierarchy, Readable sizes, Consistent family"),
            ),
            ("Color Scheme", Bullet::ByType(&COLOR_SCHEME)),
        ],
    );
    out.push_str(
        "\n\n### Design System Implementation\n\
         - Extend MUI theme\n\
         - Create custom components\n\
         - Implement consistent spacing\n\
         - Use design tokens\n\n\
         ### Theme Customization\n\
         - Create custom theme\n\
         - Add dark mode support\n\
         - Implement brand colors\n\
         - Customize component styles",
    );
}

fn section(out: &mut String, number: usize, title: &str) {
    if number > 1 {
        out.push_str("\n\n");
    }
    let _ = writeln!(out, "## {}. {}", number, title);
}

/// Render the ten-section design brief.
pub fn render_design_prompt(analysis: &SchemaAnalysis) -> String {
    let architecture = &analysis.architecture;
    let components = architecture.components.as_slice();

    let mut out = String::from("# React Admin UX Design Requirements and Guidelines\n\n");

    section(&mut out, 1, "Information Architecture & Layout");
    information_architecture(&mut out, architecture);
    section(&mut out, 2, "React Admin Navigation & Routing");
    navigation(&mut out, components);
    section(&mut out, 3, "Component Design & React Admin Integration");
    component_guidelines(&mut out, components);
    section(&mut out, 4, "Data Visualization & Dashboard Design");
    visualization(&mut out, components);
    section(&mut out, 5, "Interactive Features & User Experience");
    interactions(&mut out, components);
    section(&mut out, 6, "Security & Access Control");
    security(&mut out, &architecture.security);
    section(&mut out, 7, "Responsive Design & Mobile Experience");
    responsive(&mut out, components);
    section(&mut out, 8, "Accessibility & Internationalization");
    accessibility(&mut out, components);
    section(&mut out, 9, "Performance & Data Management");
    performance(&mut out, components);
    section(&mut out, 10, "Design System & Theme Customization");
    design_system(&mut out, components);
    out.push('\n');
    out
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Design prompt tool - architecture to a UX design brief.
pub struct GenerateDesignPromptTool;

impl GenerateDesignPromptTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generateDesignPrompt";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Build a UX design brief for a React-Admin interface from an architecture: components (name, type, relationships, security), data flow between them and per-component access rules. Covers navigation, components, dashboards, interactions, security, responsiveness, accessibility, performance and theming.";

    pub fn schema() -> ObjectSchema {
        let strings = || ParamSchema::array_of(ParamSchema::String);

        let component = ObjectSchema::new()
            .required("name", ParamSchema::String, "Component name, e.g. Task")
            .required("type", ParamSchema::String, "Task, User or another type")
            .required("relationships", strings(), "Related components")
            .required("security", strings(), "Security requirements");

        let flow = ObjectSchema::new()
            .required("from", ParamSchema::String, "Source component")
            .required("to", ParamSchema::String, "Target component")
            .required("type", ParamSchema::String, "Relationship type");

        let rule = ObjectSchema::new()
            .required("component", ParamSchema::String, "")
            .required("access", strings(), "Access levels");

        let architecture = ObjectSchema::new()
            .required(
                "components",
                ParamSchema::array_of(ParamSchema::Object(component)),
                "",
            )
            .required("dataFlow", ParamSchema::array_of(ParamSchema::Object(flow)), "")
            .required("security", ParamSchema::array_of(ParamSchema::Object(rule)), "");

        ObjectSchema::new().required(
            "schema",
            ParamSchema::Object(ObjectSchema::new().required(
                "architecture",
                ParamSchema::Object(architecture),
                "",
            )),
            "Schema analysis to design for",
        )
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, Self::schema(), Arc::new(Self))
    }
}

#[async_trait::async_trait]
impl ToolHandler for GenerateDesignPromptTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ValidatedArgs) -> ToolResult {
        let params: GenerateDesignPromptParams = args.parse()?;
        info!(
            "Rendering design prompt for {} components",
            params.schema.architecture.components.len()
        );
        Ok(text_result(render_design_prompt(&params.schema)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::handlers::result_text;
    use serde_json::{Value, json};

    fn sample_args() -> Value {
        json!({
            "schema": {
                "architecture": {
                    "components": [
                        { "name": "Task", "type": "Task", "relationships": ["User"], "security": ["owner"] },
                        { "name": "User", "type": "User", "relationships": ["Task"], "security": [] },
                        { "name": "Invoice", "type": "Generic", "relationships": [], "security": [] }
                    ],
                    "dataFlow": [{ "from": "Task", "to": "User", "type": "assignee" }],
                    "security": [{ "component": "Task", "access": ["admin", "owner"] }]
                }
            }
        })
    }

    async fn render() -> String {
        let args = GenerateDesignPromptTool::schema()
            .validate(sample_args().as_object())
            .unwrap();
        let result = GenerateDesignPromptTool.call(args).await.unwrap();
        result_text(&result)
    }

    #[tokio::test]
    async fn test_all_sections_in_order() {
        let prompt = render().await;
        assert!(prompt.starts_with("# React Admin UX Design Requirements and Guidelines\n"));

        let headings = [
            "## 1. Information Architecture & Layout",
            "## 2. React Admin Navigation & Routing",
            "## 3. Component Design & React Admin Integration",
            "## 4. Data Visualization & Dashboard Design",
            "## 5. Interactive Features & User Experience",
            "## 6. Security & Access Control",
            "## 7. Responsive Design & Mobile Experience",
            "## 8. Accessibility & Internationalization",
            "## 9. Performance & Data Management",
            "## 10. Design System & Theme Customization",
        ];
        let positions: Vec<usize> = headings
            .iter()
            .map(|heading| prompt.find(heading).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_advice_follows_component_type() {
        let prompt = render().await;

        assert!(prompt.contains("- Task (Task)\n  - Related to: User"));
        assert!(prompt.contains("- Task → User (assignee)"));
        assert!(prompt.contains("#### Task Resource\n- Resource Name: task\n- List View: Sortable list"));
        assert!(prompt.contains("- Edit View: Multi-section form with profile, roles, and permissions"));
        assert!(prompt.contains("#### Invoice Components\n- List Component: Standard DataGrid with filters"));
        assert!(prompt.contains("- Mobile Layout: Card layout with swipe actions"));
        assert!(prompt.contains("- Caching Strategy: Local storage for preferences, Cache critical data"));
    }

    #[tokio::test]
    async fn test_security_rules_render_per_component() {
        let prompt = render().await;
        assert!(prompt.contains("#### Task Security"));
        assert!(prompt.contains(
            "- Resource Access: Control access to Task resource based on admin, owner"
        ));
        assert!(!prompt.contains("#### User Security"));
    }

    #[test]
    fn test_missing_security_list_is_rejected() {
        let mut args = sample_args();
        args["schema"]["architecture"]
            .as_object_mut()
            .unwrap()
            .remove("security");

        let err = GenerateDesignPromptTool::schema()
            .validate(args.as_object())
            .unwrap_err();
        assert_eq!(err.violations[0].path, "schema.architecture.security");
    }
}
