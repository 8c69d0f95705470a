//! Actions and Observations
//!
//! Each reasoning step produces one `Action` from the model provider.
//! Tool actions yield an `Observation`, recorded as a `Step` in the
//! transcript. The transcript is append-only and owned by a single
//! loop invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tool call request from the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    #[serde(rename = "tool")]
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

/// A single decision emitted by the model provider each step.
///
/// Either a tool invocation request or a final answer, never both.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Invoke a tool and feed the result back into the loop
    ToolCall(ToolCall),

    /// Terminate the loop with this answer
    Final { answer: String },
}

impl Action {
    pub fn is_final(&self) -> bool {
        matches!(self, Action::Final { .. })
    }
}

/// Recorded result of executing an action's tool call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Observation {
    /// Tool that produced this observation
    pub source_tool: String,

    /// Tool output, or the stringified error if the call failed
    pub result: String,

    /// Whether the tool call succeeded
    pub success: bool,

    /// When the observation was recorded
    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
}

impl Observation {
    pub fn success(source_tool: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            source_tool: source_tool.into(),
            result: result.into(),
            success: true,
            recorded_at: Utc::now(),
        }
    }

    pub fn failure(source_tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_tool: source_tool.into(),
            result: error.into(),
            success: false,
            recorded_at: Utc::now(),
        }
    }
}

/// One completed think/act/observe cycle.
///
/// The observation always follows the call that produced it; steps are
/// indexed in causal order starting at 0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    /// Position in the transcript
    pub index: usize,

    /// The tool call the model requested
    pub call: ToolCall,

    /// What happened when it was dispatched
    pub observation: Observation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_is_final() {
        let action = Action::Final {
            answer: "42".into(),
        };
        assert!(action.is_final());

        let action = Action::ToolCall(ToolCall {
            name: "calculator".into(),
            arguments: HashMap::new(),
            id: None,
        });
        assert!(!action.is_final());
    }

    #[test]
    fn test_observation_failure_is_data() {
        let obs = Observation::failure("search_documents", "Tool not found: search_documents");
        assert!(!obs.success);
        assert!(obs.result.contains("not found"));
    }
}
