//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider output did not parse into a valid action
    #[error("Malformed action: {0}")]
    MalformedAction(String),

    /// Tool name already registered
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments do not satisfy the declared schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool handler failed; carries the original cause
    #[error("Tool '{tool}' execution failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Provider-class faults get exactly one corrective retry per step
    pub fn is_provider_fault(&self) -> bool {
        matches!(
            self,
            AgentError::Provider(_)
                | AgentError::ProviderUnavailable(_)
                | AgentError::MalformedAction(_)
        )
    }

    /// Tool-class faults are captured as observations, never propagated
    pub fn is_tool_fault(&self) -> bool {
        matches!(
            self,
            AgentError::ToolNotFound(_)
                | AgentError::InvalidArguments(_)
                | AgentError::ToolExecution { .. }
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(msg) => format!("The AI service encountered an error: {}", msg),
            AgentError::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            AgentError::MalformedAction(_) => {
                "The AI service returned an unusable response. Please try again.".into()
            }
            AgentError::DuplicateTool(name) => {
                format!("A tool named '{}' is already registered.", name)
            }
            AgentError::ToolNotFound(name) => format!("The tool '{}' is not available.", name),
            AgentError::InvalidArguments(msg) => format!("Invalid tool input: {}", msg),
            AgentError::ToolExecution { tool, source } => {
                format!("Tool '{}' error: {}", tool, source)
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classes() {
        assert!(AgentError::MalformedAction("bad json".into()).is_provider_fault());
        assert!(AgentError::ToolNotFound("missing".into()).is_tool_fault());
        assert!(!AgentError::ToolNotFound("missing".into()).is_provider_fault());
        assert!(!AgentError::Config("no provider".into()).is_tool_fault());
    }

    #[test]
    fn test_execution_error_carries_cause() {
        let err = AgentError::ToolExecution {
            tool: "search".into(),
            source: anyhow::anyhow!("connection reset"),
        };
        assert!(err.to_string().contains("search"));
        assert!(err.to_string().contains("connection reset"));
    }
}
