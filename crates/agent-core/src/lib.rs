//! # agent-core
//!
//! Tool-using reasoning loop with a provider-agnostic model abstraction
//! and schema-validated tool dispatch.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   ModelProvider     │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop asks the provider for one `Action` per step, dispatches tool
//! calls through the registry, and records observations until the model
//! emits a final answer or the step budget runs out. The `ModelProvider`
//! trait keeps the loop independent of any particular model backend.

pub mod action;
pub mod error;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use action::{Action, Observation, Step, ToolCall};
pub use error::{AgentError, Result};
pub use provider::{ModelProvider, StepContext, parse_action};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, CancelToken, RunOutcome, TerminalState};
pub use tool::{Tool, ToolRegistry, ToolResult, ToolSchema};
