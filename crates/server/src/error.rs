//! Errors raised by the tool layer itself.
//!
//! Controller and storage failures arrive as `offline_core::Error` and
//! convert directly; these cover argument parsing and output encoding.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool arguments that are well-formed JSON but make no sense.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Output could not be encoded.
    #[error("INTERNAL: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidInput(_) => -32602,
            ToolError::Serialize(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_code() {
        let err: McpError = ToolError::InvalidInput("nothing to purge".into()).into();
        assert_eq!(err.code, ErrorCode(-32602));
        assert!(err.message.contains("nothing to purge"));
    }

    #[test]
    fn test_serialize_code() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err: McpError = ToolError::from(source).into();
        assert_eq!(err.code, ErrorCode(-32603));
    }
}
