//! Tool registry builder.
//!
//! Collects every tool definition into a [`ToolRegistry`]. Database tools share
//! the session's [`Gateway`]; the generators and designers need nothing.

use std::sync::Arc;

use crate::domains::gateway::Gateway;

use super::definitions::{
    AnalyzeSchemaTool, GenerateDesignPromptTool, GenerateDesignTool, GenerateReactAdminPromptTool,
    GenerateReactAdminTool, GetObjectsTool, GetSchemasTool, UpdateObjectTool,
};
use super::error::ToolError;
use super::registry::ToolRegistry;

/// Build the registry with all tools.
pub fn build_registry(gateway: Arc<Gateway>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(GetSchemasTool::definition(gateway.clone()))?;
    registry.register(AnalyzeSchemaTool::definition(gateway.clone()))?;
    registry.register(GetObjectsTool::definition(gateway.clone()))?;
    registry.register(UpdateObjectTool::definition(gateway))?;
    registry.register(GenerateReactAdminTool::definition())?;
    registry.register(GenerateReactAdminPromptTool::definition())?;
    registry.register(GenerateDesignTool::definition())?;
    registry.register(GenerateDesignPromptTool::definition())?;
    Ok(registry)
}
