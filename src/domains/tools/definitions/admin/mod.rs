//! React-Admin code, UI design and prompt generators. Pure text transforms.

mod design;
mod design_prompt;
mod generate;
mod prompt;

pub use design::{GenerateDesignParams, GenerateDesignTool, generate_design};
pub use design_prompt::{GenerateDesignPromptParams, GenerateDesignPromptTool, render_design_prompt};
pub use generate::{
    FieldConfig, FieldSpec, GenerateReactAdminParams, GenerateReactAdminTool, ViewSelection,
    generate_resource,
};
pub use prompt::{GeneratePromptParams, GenerateReactAdminPromptTool, render_prompt};
