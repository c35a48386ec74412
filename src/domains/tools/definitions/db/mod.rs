//! Database tools: schema introspection, analysis, queries and updates.

mod analyze;
mod objects;
mod schemas;
mod update;

pub use analyze::{AnalyzeSchemaTool, SchemaAnalysis, analyze_collection};
pub use objects::{GetObjectsParams, GetObjectsTool};
pub use schemas::{GetSchemasTool, infer_field_types, type_tag};
pub use update::{UpdateObjectParams, UpdateObjectTool};
