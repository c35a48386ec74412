//! Tool handler contract.
//!
//! Every tool implements [`ToolHandler`]. Handlers receive arguments that have
//! already passed the tool's [`ObjectSchema`](super::schema::ObjectSchema), so
//! required fields are present and correctly typed.

use rmcp::model::{CallToolResult, Content};

use super::error::ToolError;
use super::schema::ValidatedArgs;

/// Result type returned by tool handlers.
pub type ToolResult = Result<CallToolResult, ToolError>;

/// Trait implemented by every tool.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with validated arguments.
    async fn call(&self, args: ValidatedArgs) -> ToolResult;
}

/// Successful result carrying a single text block.
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Failed result carrying a single text block.
pub fn error_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}

/// Concatenated text of all text blocks in a result.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            rmcp::model::RawContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether a result is flagged as an error.
pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_helpers() {
        let ok = text_result("done");
        assert!(!is_error(&ok));
        assert_eq!(result_text(&ok), "done");

        let failed = error_result("broken");
        assert!(is_error(&failed));
        assert_eq!(result_text(&failed), "broken");
    }
}
