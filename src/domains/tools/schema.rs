//! Parameter schemas for tool arguments.
//!
//! A [`ParamSchema`] describes the accepted shape of a tool's arguments. The
//! same description is used twice:
//!
//! - at dispatch time, [`ObjectSchema::validate`] checks incoming arguments and
//!   reports every violation with its field path;
//! - at handshake time, [`ObjectSchema::to_json_schema`] renders the JSON Schema
//!   advertised to clients in `tools/list`.
//!
//! Unknown top-level fields pass through untouched. Fields declared as free-form
//! records (`filter`, `updates`) only have to be objects.
//!
//! Recursive shapes (a component whose `children` are components) are written
//! with [`ParamSchema::named`] and [`ParamSchema::reference`]. They render as
//! `$defs` entries on the root schema, referenced through `$ref`.

use std::fmt;

use rmcp::model::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

// ============================================================================
// Schema Model
// ============================================================================

/// Accepted shape of a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSchema {
    /// Any JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A string restricted to a fixed set of values.
    Enum(Vec<String>),
    /// An array whose items all match the inner schema.
    Array(Box<ParamSchema>),
    /// An object with declared fields.
    Object(ObjectSchema),
    /// A free-form record. With a value schema, every value must match it.
    Record(Option<Box<ParamSchema>>),
    /// A value matching at least one of the alternatives.
    AnyOf(Vec<ParamSchema>),
    /// Anything, including `null`.
    Any,
    /// A schema that nested [`ParamSchema::Ref`]s can refer to by name.
    Named(String, Box<ParamSchema>),
    /// The enclosing [`ParamSchema::Named`] schema with this name.
    Ref(String),
}

/// Named schemas visible at a point of validation, innermost first.
struct Scope<'a> {
    name: &'a str,
    schema: &'a ParamSchema,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    fn resolve(scope: Option<&Scope<'a>>, name: &str) -> Option<&'a ParamSchema> {
        let mut current = scope;
        while let Some(frame) = current {
            if frame.name == name {
                return Some(frame.schema);
            }
            current = frame.parent;
        }
        None
    }
}

impl ParamSchema {
    /// Free-form record accepting any object.
    pub fn record() -> Self {
        Self::Record(None)
    }

    /// Record whose values must all match `values`.
    pub fn record_of(values: ParamSchema) -> Self {
        Self::Record(Some(Box::new(values)))
    }

    /// Array of `items`.
    pub fn array_of(items: ParamSchema) -> Self {
        Self::Array(Box::new(items))
    }

    /// Name `schema` so that [`reference`](Self::reference)s inside it can
    /// recurse into it.
    pub fn named(name: &str, schema: ParamSchema) -> Self {
        Self::Named(name.to_string(), Box::new(schema))
    }

    /// Refer to the enclosing schema declared with [`named`](Self::named).
    pub fn reference(name: &str) -> Self {
        Self::Ref(name.to_string())
    }

    /// String enum over `values`.
    pub fn one_of_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Short name used in error messages.
    fn expected_name(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Enum(values) => format!("one of [{}]", values.join(", ")),
            Self::Array(_) => "array".to_string(),
            Self::Object(_) | Self::Record(_) => "object".to_string(),
            Self::AnyOf(options) => options
                .iter()
                .map(Self::expected_name)
                .collect::<Vec<_>>()
                .join(" | "),
            Self::Any => "any".to_string(),
            Self::Named(_, inner) => inner.expected_name(),
            Self::Ref(name) => name.clone(),
        }
    }

    /// Render this schema as a JSON Schema fragment.
    ///
    /// Named schemas end up in a `$defs` object on the returned fragment.
    pub fn to_json_schema(&self) -> Value {
        let mut defs = JsonObject::new();
        let mut rendered = self.render(&mut defs);
        attach_defs(&mut rendered, defs);
        rendered
    }

    fn render(&self, defs: &mut JsonObject) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Number => json!({ "type": "number" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Enum(values) => json!({ "type": "string", "enum": values }),
            Self::Array(items) => json!({ "type": "array", "items": items.render(defs) }),
            Self::Object(object) => Value::Object(object.render(defs)),
            Self::Record(None) => json!({ "type": "object", "additionalProperties": true }),
            Self::Record(Some(values)) => {
                json!({ "type": "object", "additionalProperties": values.render(defs) })
            }
            Self::AnyOf(options) => json!({
                "anyOf": options.iter().map(|o| o.render(defs)).collect::<Vec<_>>()
            }),
            Self::Any => json!({}),
            Self::Named(name, inner) => {
                if !defs.contains_key(name) {
                    // Placeholder first: the body may refer to itself.
                    defs.insert(name.clone(), Value::Null);
                    let body = inner.render(defs);
                    defs.insert(name.clone(), body);
                }
                def_ref(name)
            }
            Self::Ref(name) => def_ref(name),
        }
    }

    fn check(
        &self,
        value: &Value,
        path: &FieldPath,
        scope: Option<&Scope<'_>>,
        out: &mut Vec<Violation>,
    ) {
        match self {
            Self::Any => {}
            Self::Named(name, inner) => {
                let frame = Scope {
                    name,
                    schema: inner,
                    parent: scope,
                };
                inner.check(value, path, Some(&frame), out);
            }
            Self::Ref(name) => match Scope::resolve(scope, name) {
                Some(schema) => schema.check(value, path, scope, out),
                None => out.push(Violation::new(
                    path,
                    format!("schema \"{}\" is not defined here", name),
                )),
            },
            Self::String => {
                if !value.is_string() {
                    out.push(Violation::mismatch(path, self, value));
                }
            }
            Self::Number => {
                if !value.is_number() {
                    out.push(Violation::mismatch(path, self, value));
                }
            }
            Self::Integer => {
                let is_integer = value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|n| n.fract() == 0.0);
                if !is_integer {
                    out.push(Violation::mismatch(path, self, value));
                }
            }
            Self::Boolean => {
                if !value.is_boolean() {
                    out.push(Violation::mismatch(path, self, value));
                }
            }
            Self::Enum(values) => match value.as_str() {
                Some(s) if values.iter().any(|v| v == s) => {}
                Some(s) => out.push(Violation::new(
                    path,
                    format!("expected one of [{}], got \"{}\"", values.join(", "), s),
                )),
                None => out.push(Violation::mismatch(path, self, value)),
            },
            Self::Array(items) => match value.as_array() {
                Some(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        items.check(element, &path.index(index), scope, out);
                    }
                }
                None => out.push(Violation::mismatch(path, self, value)),
            },
            Self::Object(object) => match value.as_object() {
                Some(map) => object.check_fields(map, path, scope, out),
                None => out.push(Violation::mismatch(path, self, value)),
            },
            Self::Record(values) => match (value.as_object(), values) {
                (Some(map), Some(values)) => {
                    for (key, entry) in map {
                        values.check(entry, &path.key(key), scope, out);
                    }
                }
                (Some(_), None) => {}
                (None, _) => out.push(Violation::mismatch(path, self, value)),
            },
            Self::AnyOf(options) => {
                let matched = options.iter().any(|option| {
                    let mut scratch = Vec::new();
                    option.check(value, path, scope, &mut scratch);
                    scratch.is_empty()
                });
                if !matched {
                    out.push(Violation::mismatch(path, self, value));
                }
            }
        }
    }
}

/// A declared field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    pub description: Option<String>,
    pub schema: ParamSchema,
    pub required: bool,
    pub default: Option<Value>,
}

/// An object with declared fields. Undeclared fields are permitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<FieldSchema>,
}

impl ObjectSchema {
    /// An object schema without declared fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required field.
    pub fn required(mut self, name: &str, schema: ParamSchema, description: &str) -> Self {
        self.fields.push(FieldSchema {
            name: name.to_string(),
            description: non_empty(description),
            schema,
            required: true,
            default: None,
        });
        self
    }

    /// Declare an optional field.
    pub fn optional(mut self, name: &str, schema: ParamSchema, description: &str) -> Self {
        self.fields.push(FieldSchema {
            name: name.to_string(),
            description: non_empty(description),
            schema,
            required: false,
            default: None,
        });
        self
    }

    /// Declare an optional field that is filled with `default` when absent.
    pub fn with_default(
        mut self,
        name: &str,
        schema: ParamSchema,
        default: Value,
        description: &str,
    ) -> Self {
        self.fields.push(FieldSchema {
            name: name.to_string(),
            description: non_empty(description),
            schema,
            required: false,
            default: Some(default),
        });
        self
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Look up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON Schema object suitable for a tool's `inputSchema`.
    pub fn to_json_schema(&self) -> JsonObject {
        let mut defs = JsonObject::new();
        let mut schema = self.render(&mut defs);
        if !defs.is_empty() {
            schema.insert("$defs".into(), Value::Object(defs));
        }
        schema
    }

    fn render(&self, defs: &mut JsonObject) -> JsonObject {
        let mut properties = JsonObject::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut property = field.schema.render(defs);
            if let Value::Object(ref mut map) = property {
                if let Some(description) = &field.description {
                    map.insert("description".into(), Value::String(description.clone()));
                }
                if let Some(default) = &field.default {
                    map.insert("default".into(), default.clone());
                }
            }
            properties.insert(field.name.clone(), property);
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        let mut schema = JsonObject::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        schema
    }

    /// Validate tool arguments against this schema.
    ///
    /// Missing arguments are treated as an empty object. Defaults are filled in
    /// for absent (or `null`) optional fields. All violations are collected.
    pub fn validate(&self, arguments: Option<&JsonObject>) -> Result<ValidatedArgs, ValidationError> {
        let mut args = arguments.cloned().unwrap_or_default();
        let mut violations = Vec::new();

        self.check_fields(&args, &FieldPath::root(), None, &mut violations);
        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        for field in &self.fields {
            if let Some(default) = &field.default {
                let slot = args.entry(field.name.clone()).or_insert(Value::Null);
                if slot.is_null() {
                    *slot = default.clone();
                }
            }
        }

        Ok(ValidatedArgs(args))
    }

    fn check_fields(
        &self,
        map: &JsonObject,
        path: &FieldPath,
        scope: Option<&Scope<'_>>,
        out: &mut Vec<Violation>,
    ) {
        for field in &self.fields {
            let field_path = path.key(&field.name);
            match map.get(&field.name) {
                // An explicit null counts as absent for optional fields.
                None | Some(Value::Null) if !field.required => {}
                None => out.push(Violation::new(&field_path, "required field is missing")),
                Some(value) => field.schema.check(value, &field_path, scope, out),
            }
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn def_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/$defs/{}", name) })
}

fn attach_defs(schema: &mut Value, defs: JsonObject) {
    if defs.is_empty() {
        return;
    }
    if let Value::Object(map) = schema {
        map.insert("$defs".into(), Value::Object(defs));
    }
}

// ============================================================================
// Validation Results
// ============================================================================

/// Arguments that satisfied a tool's schema, with defaults applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs(JsonObject);

impl ValidatedArgs {
    /// Borrow the underlying argument object.
    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    /// Take the underlying argument object.
    pub fn into_inner(self) -> JsonObject {
        self.0
    }

    /// Deserialize into a typed parameter struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|e| ValidationError {
            violations: vec![Violation {
                path: String::new(),
                message: e.to_string(),
            }],
        })
    }
}

/// Dotted/indexed location inside an argument object, e.g. `components[0].name`.
#[derive(Debug, Clone, Default)]
struct FieldPath(String);

impl FieldPath {
    fn root() -> Self {
        Self::default()
    }

    fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{}", self.0, key))
        }
    }

    fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field path; empty for the argument object itself.
    pub path: String,
    pub message: String,
}

impl Violation {
    fn new(path: &FieldPath, message: impl Into<String>) -> Self {
        Self {
            path: path.0.clone(),
            message: message.into(),
        }
    }

    fn mismatch(path: &FieldPath, expected: &ParamSchema, actual: &Value) -> Self {
        Self::new(
            path,
            format!(
                "expected {}, got {}",
                expected.expected_name(),
                json_type_name(actual)
            ),
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Arguments failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// A single violation at `path`.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation {
                path: path.into(),
                message: message.into(),
            }],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

/// JSON type name of a value, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn objects_schema() -> ObjectSchema {
        ObjectSchema::new()
            .required("collection", ParamSchema::String, "Collection name")
            .with_default("filter", ParamSchema::record(), json!({}), "Query filter")
    }

    #[test]
    fn test_missing_required_field() {
        let err = objects_schema().validate(Some(&args(json!({})))).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].path, "collection");
        assert!(err.to_string().contains("required field is missing"));
    }

    #[test]
    fn test_missing_arguments_treated_as_empty() {
        let err = objects_schema().validate(None).unwrap_err();
        assert_eq!(err.violations[0].path, "collection");

        let ok = ObjectSchema::new().validate(None).unwrap();
        assert!(ok.as_object().is_empty());
    }

    #[test]
    fn test_type_mismatch_reports_expected_and_actual() {
        let err = objects_schema()
            .validate(Some(&args(json!({ "collection": 42 }))))
            .unwrap_err();
        assert_eq!(err.to_string(), "collection: expected string, got number");
    }

    #[test]
    fn test_default_applied_and_unknown_fields_kept() {
        let validated = objects_schema()
            .validate(Some(&args(json!({ "collection": "users", "extra": true }))))
            .unwrap();
        let map = validated.as_object();
        assert_eq!(map.get("filter"), Some(&json!({})));
        assert_eq!(map.get("extra"), Some(&json!(true)));
    }

    #[test]
    fn test_free_form_record_accepts_any_object() {
        let validated = objects_schema().validate(Some(&args(json!({
            "collection": "users",
            "filter": { "age": { "$gt": 21 }, "tags": ["a", null] }
        }))));
        assert!(validated.is_ok());

        let err = objects_schema()
            .validate(Some(&args(json!({ "collection": "users", "filter": [1, 2] }))))
            .unwrap_err();
        assert_eq!(err.violations[0].path, "filter");
    }

    #[test]
    fn test_null_optional_is_absent() {
        let validated = objects_schema()
            .validate(Some(&args(json!({ "collection": "users", "filter": null }))))
            .unwrap();
        assert_eq!(validated.as_object().get("filter"), Some(&json!({})));
    }

    #[test]
    fn test_nested_paths_and_all_violations() {
        let schema = ObjectSchema::new().required(
            "architecture",
            ParamSchema::Object(ObjectSchema::new().required(
                "components",
                ParamSchema::array_of(ParamSchema::Object(
                    ObjectSchema::new()
                        .required("name", ParamSchema::String, "")
                        .required(
                            "type",
                            ParamSchema::one_of_strings(["Task", "User", "Generic"]),
                            "",
                        ),
                )),
                "",
            )),
            "",
        );

        let err = schema
            .validate(Some(&args(json!({
                "architecture": {
                    "components": [
                        { "name": "User", "type": "User" },
                        { "name": 7, "type": "Widget" }
                    ]
                }
            }))))
            .unwrap_err();

        let paths: Vec<_> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["architecture.components[1].name", "architecture.components[1].type"]
        );
        assert!(err.violations[1].message.contains("\"Widget\""));
    }

    #[test]
    fn test_record_of_any_of() {
        let field_config = ObjectSchema::new()
            .required("type", ParamSchema::String, "")
            .optional("required", ParamSchema::Boolean, "");
        let schema = ObjectSchema::new().required(
            "fields",
            ParamSchema::record_of(ParamSchema::AnyOf(vec![
                ParamSchema::String,
                ParamSchema::Object(field_config),
            ])),
            "",
        );

        assert!(
            schema
                .validate(Some(&args(json!({
                    "fields": { "age": "number", "email": { "type": "string", "required": true } }
                }))))
                .is_ok()
        );

        let err = schema
            .validate(Some(&args(json!({ "fields": { "age": 5 } }))))
            .unwrap_err();
        assert_eq!(err.violations[0].path, "fields.age");
        assert!(err.violations[0].message.contains("string | object"));
    }

    fn tree_schema() -> ObjectSchema {
        let node = ParamSchema::named(
            "node",
            ParamSchema::Object(
                ObjectSchema::new()
                    .required("name", ParamSchema::String, "")
                    .optional(
                        "children",
                        ParamSchema::array_of(ParamSchema::reference("node")),
                        "",
                    ),
            ),
        );
        ObjectSchema::new().required("root", node, "Tree root")
    }

    #[test]
    fn test_recursive_schema_validates_every_level() {
        let schema = tree_schema();
        assert!(
            schema
                .validate(Some(&args(json!({
                    "root": { "name": "a", "children": [
                        { "name": "b", "children": [{ "name": "c" }] }
                    ] }
                }))))
                .is_ok()
        );

        let err = schema
            .validate(Some(&args(json!({
                "root": { "name": "a", "children": [
                    { "name": "b", "children": [{ "name": 3 }, {}] }
                ] }
            }))))
            .unwrap_err();
        let paths: Vec<_> = err.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "root.children[0].children[0].name",
                "root.children[0].children[1].name"
            ]
        );
    }

    #[test]
    fn test_recursive_schema_rendering() {
        let rendered = tree_schema().to_json_schema();
        let properties = rendered.get("properties").unwrap();
        assert_eq!(properties["root"]["$ref"], json!("#/$defs/node"));
        assert_eq!(properties["root"]["description"], json!("Tree root"));

        let node = &rendered.get("$defs").unwrap()["node"];
        assert_eq!(node["type"], json!("object"));
        assert_eq!(
            node["properties"]["children"]["items"]["$ref"],
            json!("#/$defs/node")
        );
    }

    #[test]
    fn test_dangling_reference_is_a_violation() {
        let schema = ObjectSchema::new().required("x", ParamSchema::reference("nowhere"), "");
        let err = schema.validate(Some(&args(json!({ "x": 1 })))).unwrap_err();
        assert!(err.violations[0].message.contains("\"nowhere\" is not defined"));
    }

    #[test]
    fn test_integer_check() {
        let schema = ObjectSchema::new().required("limit", ParamSchema::Integer, "");
        assert!(schema.validate(Some(&args(json!({ "limit": 10 })))).is_ok());
        assert!(schema.validate(Some(&args(json!({ "limit": 10.5 })))).is_err());
    }

    #[test]
    fn test_json_schema_rendering() {
        let rendered = objects_schema().to_json_schema();
        assert_eq!(rendered.get("type"), Some(&json!("object")));
        assert_eq!(rendered.get("required"), Some(&json!(["collection"])));

        let properties = rendered.get("properties").unwrap();
        assert_eq!(properties["collection"]["type"], json!("string"));
        assert_eq!(properties["collection"]["description"], json!("Collection name"));
        assert_eq!(properties["filter"]["default"], json!({}));
        assert_eq!(properties["filter"]["additionalProperties"], json!(true));
    }

    #[test]
    fn test_empty_schema_has_no_required_list() {
        let rendered = ObjectSchema::new().to_json_schema();
        assert!(rendered.get("required").is_none());
        assert_eq!(rendered.get("properties"), Some(&json!({})));
    }

    #[test]
    fn test_parse_into_typed_params() {
        #[derive(Deserialize)]
        struct Params {
            collection: String,
            filter: JsonObject,
        }

        let validated = objects_schema()
            .validate(Some(&args(json!({ "collection": "users" }))))
            .unwrap();
        let params: Params = validated.parse().unwrap();
        assert_eq!(params.collection, "users");
        assert!(params.filter.is_empty());
    }
}
