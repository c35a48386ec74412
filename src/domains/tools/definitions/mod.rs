//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod admin;
pub mod db;

pub use admin::{
    GenerateDesignPromptTool, GenerateDesignTool, GenerateReactAdminPromptTool,
    GenerateReactAdminTool,
};
pub use db::{AnalyzeSchemaTool, GetObjectsTool, GetSchemasTool, UpdateObjectTool};
