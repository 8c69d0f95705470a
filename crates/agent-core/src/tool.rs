//! Tool System
//!
//! Extensible tool framework for agent capabilities.
//! Tools are registered at runtime and invoked by the reasoning loop.
//! Arguments are validated against the declared schema before dispatch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::ToolCall;
use crate::error::{AgentError, Result};

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, integer, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

/// Tool definition schema (presented to the model for selection)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,

    /// Whether tool has side effects
    #[serde(default)]
    pub has_side_effects: bool,
}

/// Tool trait - implement to add new capabilities
///
/// Handlers must be pure functions of their declared inputs; they hold
/// no loop state. Domain failures (bad expression, no results) are
/// reported as an unsuccessful `ToolResult`, infrastructure failures as
/// `Err`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for model-facing selection
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;
}

/// Check a call's arguments against the declared schema
fn validate_arguments(schema: &ToolSchema, call: &ToolCall) -> Result<()> {
    for param in &schema.parameters {
        let Some(value) = call.arguments.get(&param.name) else {
            if param.required {
                return Err(AgentError::InvalidArguments(format!(
                    "missing required parameter '{}'",
                    param.name
                )));
            }
            continue;
        };

        if !type_matches(&param.param_type, value) {
            return Err(AgentError::InvalidArguments(format!(
                "parameter '{}' must be of type {}",
                param.name, param.param_type
            )));
        }

        if let Some(allowed) = &param.enum_values {
            if !allowed.contains(value) {
                return Err(AgentError::InvalidArguments(format!(
                    "parameter '{}' must be one of {:?}",
                    param.name, allowed
                )));
            }
        }
    }

    Ok(())
}

fn type_matches(param_type: &str, value: &serde_json::Value) -> bool {
    match param_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // Unknown declared type: accept anything
        _ => true,
    }
}

/// Registry for available tools
///
/// Keyed by name in a `BTreeMap` so the choice set presented to the
/// model is stable across calls within one process. Read-only after
/// setup; holds no per-call state.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a new tool; fails if the name is already taken
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool; fails if the name is already taken
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.schema().name;
        if self.tools.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Dispatch a tool call.
    ///
    /// Fails with `ToolNotFound` for unknown names, `InvalidArguments`
    /// when the call does not satisfy the schema, and wraps handler
    /// errors as `ToolExecution` carrying the original cause.
    pub async fn invoke(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        validate_arguments(&tool.schema(), call)?;

        match tool.execute(call).await {
            Ok(mut result) => {
                result.id = call.id.clone();
                Ok(result)
            }
            Err(e @ AgentError::ToolExecution { .. }) => Err(e),
            Err(e) => Err(AgentError::ToolExecution {
                tool: call.name.clone(),
                source: anyhow::Error::new(e),
            }),
        }
    }

    /// All tool schemas in ascending-name order.
    ///
    /// Idempotent between registrations, so the model always sees the
    /// same choice set.
    pub fn describe_all(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Tool names in registry order
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    pub fn prompt_section(&self) -> String {
        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
        prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");

        for schema in self.describe_all() {
            prompt.push_str(&format!("### {}\n", schema.name));
            prompt.push_str(&format!("{}\n", schema.description));

            if !schema.parameters.is_empty() {
                prompt.push_str("**Parameters:**\n");
                for param in &schema.parameters {
                    let required = if param.required { " (required)" } else { "" };
                    prompt.push_str(&format!(
                        "- `{}` ({}){}: {}\n",
                        param.name, param.param_type, required, param.description
                    ));
                }
            }
            prompt.push('\n');
        }

        prompt
    }
}

// ============================================================================
// Built-in Tools
// ============================================================================

/// Calculator tool - basic arithmetic over two operands
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "calculator".into(),
            description: "Perform basic math operations: add, subtract, multiply, divide".into(),
            parameters: vec![
                ParameterSchema {
                    name: "operation".into(),
                    param_type: "string".into(),
                    description: "Operation to perform".into(),
                    required: true,
                    default: None,
                    enum_values: Some(vec![
                        serde_json::json!("add"),
                        serde_json::json!("subtract"),
                        serde_json::json!("multiply"),
                        serde_json::json!("divide"),
                    ]),
                },
                ParameterSchema {
                    name: "x".into(),
                    param_type: "number".into(),
                    description: "First operand".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "y".into(),
                    param_type: "number".into(),
                    description: "Second operand".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
            ],
            category: Some("math".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let operation = call
            .arguments
            .get("operation")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::InvalidArguments("missing operation".into()))?;
        let x = call
            .arguments
            .get("x")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| AgentError::InvalidArguments("missing x".into()))?;
        let y = call
            .arguments
            .get("y")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| AgentError::InvalidArguments("missing y".into()))?;

        let result = match operation {
            "add" => x + y,
            "subtract" => x - y,
            "multiply" => x * y,
            "divide" => {
                if y == 0.0 {
                    return Ok(ToolResult::failure("calculator", "Cannot divide by zero"));
                }
                x / y
            }
            other => {
                return Ok(ToolResult::failure(
                    "calculator",
                    format!("Unknown operation: {}", other),
                ));
            }
        };

        Ok(ToolResult::success(
            "calculator",
            format!("{} {} {} = {}", x, operation, y, result),
        ))
    }
}
