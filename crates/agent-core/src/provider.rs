//! Model Provider Strategy Pattern
//!
//! Defines a common interface for all model providers, allowing the
//! reasoning loop to work with any backend without code changes. A
//! provider is asked for exactly one `Action` per step, given the
//! original request, the tool choice set, and the transcript so far.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{ModelProvider, StepContext};
//!
//! let action = provider.next_action(&ctx).await?;
//! ```

use async_trait::async_trait;

use crate::action::{Action, Step, ToolCall};
use crate::error::{AgentError, Result};
use crate::tool::ToolSchema;

/// Everything the provider sees when deciding the next action
#[derive(Clone, Debug)]
pub struct StepContext<'a> {
    /// The original natural-language request
    pub request: &'a str,

    /// Tool choice set, in stable registry order
    pub tools: &'a [ToolSchema],

    /// All completed steps so far, oldest first
    pub transcript: &'a [Step],

    /// Corrective instruction after a malformed action, if any
    pub corrective: Option<&'a str>,
}

/// Strategy trait for model providers
///
/// Implement this trait to add support for new model backends. The
/// reasoning loop works exclusively through this interface and treats
/// the call as a suspension point with its own deadline.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Decide the next action for the current step.
    ///
    /// Returns a provider-class error (`Provider`, `ProviderUnavailable`,
    /// `MalformedAction`) when unreachable or when the output does not
    /// satisfy the action contract; the loop retries once with a
    /// corrective instruction before aborting.
    async fn next_action(&self, ctx: &StepContext<'_>) -> Result<Action>;
}

/// Parse a raw model completion into an `Action`.
///
/// Providers that work over plain text completions can use this to
/// satisfy the action contract: a ```` ```tool ```` fenced JSON block or
/// inline `{"tool": ...}` object becomes a tool call, anything else is
/// the final answer. A tool block that is present but does not parse is
/// a `MalformedAction`.
pub fn parse_action(content: &str) -> Result<Action> {
    const FENCE_START: &str = "```tool";
    const FENCE_END: &str = "```";

    if let Some(start_idx) = content.find(FENCE_START) {
        let after_marker = &content[start_idx + FENCE_START.len()..];
        let Some(end_idx) = after_marker.find(FENCE_END) else {
            return Err(AgentError::MalformedAction(
                "unterminated tool block".into(),
            ));
        };
        let json_str = after_marker[..end_idx].trim();
        return match serde_json::from_str::<ToolCall>(json_str) {
            Ok(call) => Ok(Action::ToolCall(with_call_id(call))),
            Err(e) => Err(AgentError::MalformedAction(format!(
                "tool block does not parse: {e}"
            ))),
        };
    }

    // Fallback: inline JSON object with a "tool" key
    if let Some(call) = parse_inline_tool_call(content) {
        return Ok(Action::ToolCall(with_call_id(call)));
    }

    let answer = content.trim();
    if answer.is_empty() {
        return Err(AgentError::MalformedAction("empty completion".into()));
    }

    Ok(Action::Final {
        answer: answer.to_string(),
    })
}

/// Try to parse an inline JSON tool call
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;

    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
}

fn with_call_id(mut call: ToolCall) -> ToolCall {
    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }
    call
}
