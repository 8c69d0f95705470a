//! Reasoning Loop
//!
//! Implements the think/act/observe cycle for agent behavior. Each step
//! asks the model provider for one action, dispatches tool calls through
//! the registry, and records the observation. The loop terminates when
//! the model emits a final answer (`Completed`) or when the step budget
//! is exhausted, the caller cancels, or the provider fails structurally
//! (`Aborted` with a best-effort answer). Callers always receive a
//! `RunOutcome`, never an error.
//!
//! Tool failures are data: the stringified error becomes a failed
//! observation and the model decides how to proceed on its next turn.
//! Provider faults are structural and get exactly one corrective retry
//! per step before aborting the invocation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::{Action, Observation, Step, ToolCall};
use crate::error::{AgentError, Result};
use crate::provider::{ModelProvider, StepContext};
use crate::tool::ToolRegistry;

/// Agent configuration
///
/// Passed explicitly into the constructor; there is no ambient or
/// process-wide agent state.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum think/act/observe steps before forced termination
    pub max_steps: usize,

    /// Deadline for each model provider call
    pub provider_timeout: Duration,

    /// Deadline for each tool invocation
    pub tool_timeout: Duration,

    /// Whether to append tool descriptions to the system prompt
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_steps: 10,
            provider_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

When you need to use a tool, respond with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate."#;

/// How a loop invocation ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    /// The model emitted a final answer
    Completed,
    /// Budget exhaustion, cancellation, or a structural provider fault
    Aborted,
}

/// Result of one loop invocation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The model's answer, or a best-effort transcript summary on abort
    pub final_answer: String,

    /// Full step history, oldest first
    pub transcript: Vec<Step>,

    /// How the run ended
    pub terminal_state: TerminalState,

    /// Why the run aborted, if it did
    pub abort_reason: Option<String>,
}

impl RunOutcome {
    pub fn completed(&self) -> bool {
        self.terminal_state == TerminalState::Completed
    }
}

/// Cooperative cancellation handle.
///
/// Cancellation takes effect between steps, never mid-tool-call; the run
/// aborts with a partial-result summary built from the transcript so far.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn ModelProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Build the full system prompt including tool descriptions.
    ///
    /// Providers that assemble their own prompt text can use this as the
    /// leading system message.
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.prompt_section());
        }

        prompt
    }

    /// Run the loop on a request
    pub async fn run(&self, request: &str) -> RunOutcome {
        self.run_with_cancel(request, &CancelToken::new()).await
    }

    /// Run the loop with an external cancellation handle
    pub async fn run_with_cancel(&self, request: &str, cancel: &CancelToken) -> RunOutcome {
        let tools = self.tools.describe_all();
        let mut transcript: Vec<Step> = Vec::new();

        if self.config.max_steps == 0 {
            return aborted(request, transcript, "step budget is zero");
        }

        loop {
            if cancel.is_cancelled() {
                return aborted(request, transcript, "cancelled by caller");
            }

            let ctx = StepContext {
                request,
                tools: &tools,
                transcript: &transcript,
                corrective: None,
            };

            let action = match self.think(&ctx).await {
                Ok(action) => action,
                Err(e) => {
                    tracing::warn!(error = %e, "aborting run on provider fault");
                    return aborted(request, transcript, &e.to_string());
                }
            };

            let call = match action {
                Action::Final { answer } => {
                    return RunOutcome {
                        final_answer: answer,
                        transcript,
                        terminal_state: TerminalState::Completed,
                        abort_reason: None,
                    };
                }
                Action::ToolCall(call) => call,
            };

            tracing::debug!(tool = %call.name, step = transcript.len(), "dispatching tool");
            let observation = self.act(&call).await;

            let index = transcript.len();
            transcript.push(Step {
                index,
                call,
                observation,
            });

            if transcript.len() == self.config.max_steps {
                return aborted(
                    request,
                    transcript,
                    &format!("step budget ({}) exhausted", self.config.max_steps),
                );
            }
        }
    }

    /// Ask the provider for the next action, with one corrective retry
    /// on provider-class faults (unreachable, timeout, malformed output).
    async fn think(&self, ctx: &StepContext<'_>) -> Result<Action> {
        match self.next_action_with_deadline(ctx).await {
            Ok(action) => Ok(action),
            Err(e) if e.is_provider_fault() => {
                tracing::warn!(error = %e, "provider fault, retrying once");
                let corrective = format!(
                    "Your previous response was not usable ({}). Respond with either a \
                     single ```tool JSON block or a plain-text final answer.",
                    e
                );
                let retry_ctx = StepContext {
                    request: ctx.request,
                    tools: ctx.tools,
                    transcript: ctx.transcript,
                    corrective: Some(&corrective),
                };
                self.next_action_with_deadline(&retry_ctx).await
            }
            Err(e) => Err(e),
        }
    }

    async fn next_action_with_deadline(&self, ctx: &StepContext<'_>) -> Result<Action> {
        match tokio::time::timeout(self.config.provider_timeout, self.provider.next_action(ctx))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AgentError::ProviderUnavailable(format!(
                "no action within {:?}",
                self.config.provider_timeout
            ))),
        }
    }

    /// Dispatch a tool call; failures become observation data.
    async fn act(&self, call: &ToolCall) -> Observation {
        match tokio::time::timeout(self.config.tool_timeout, self.tools.invoke(call)).await {
            Ok(Ok(result)) if result.success => Observation::success(&result.name, &result.output),
            Ok(Ok(result)) => Observation::failure(&result.name, &result.output),
            Ok(Err(e)) => Observation::failure(&call.name, e.to_string()),
            Err(_) => Observation::failure(
                &call.name,
                format!("tool call timed out after {:?}", self.config.tool_timeout),
            ),
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

fn aborted(request: &str, transcript: Vec<Step>, reason: &str) -> RunOutcome {
    let final_answer = summarize_transcript(request, &transcript);
    RunOutcome {
        final_answer,
        transcript,
        terminal_state: TerminalState::Aborted,
        abort_reason: Some(reason.to_string()),
    }
}

/// Best-effort answer for aborted runs; never empty.
fn summarize_transcript(request: &str, steps: &[Step]) -> String {
    if steps.is_empty() {
        return format!(
            "No answer was produced for \"{}\" before the run was stopped.",
            request
        );
    }

    let mut summary = format!(
        "No final answer was reached for \"{}\". Steps taken:\n",
        request
    );
    for step in steps {
        let status = if step.observation.success { "ok" } else { "failed" };
        let mut snippet: String = step.observation.result.chars().take(120).collect();
        if step.observation.result.chars().count() > 120 {
            snippet.push_str("...");
        }
        summary.push_str(&format!(
            "  {}. {} [{}]: {}\n",
            step.index + 1,
            step.call.name,
            status,
            snippet
        ));
    }
    summary
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn ModelProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Result<Self> {
        self.tools.register(tool)?;
        Ok(self)
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn max_steps(mut self, max: usize) -> Self {
        self.config.max_steps = max;
        self
    }

    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.config.provider_timeout = timeout;
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
