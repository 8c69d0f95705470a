//! Document Search Tool
//!
//! Exposes the retriever to the reasoning loop. An empty store is a
//! "no results" observation, not a failure, so the loop can degrade to
//! answering without retrieval context.

use async_trait::async_trait;
use std::sync::Arc;

use agent_core::tool::ParameterSchema;
use agent_core::{AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::error::RetrievalError;
use crate::store::Retriever;

const TOOL_NAME: &str = "search_documents";
const DEFAULT_K: usize = 3;
const SNIPPET_CHARS: usize = 150;

/// Tool for similarity search over the document store
pub struct DocumentSearchTool {
    retriever: Arc<Retriever>,
}

impl DocumentSearchTool {
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for DocumentSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Search the document store for the passages most relevant to a query. \
                          Returns ranked results with similarity scores and metadata."
                .into(),
            parameters: vec![
                ParameterSchema {
                    name: "query".into(),
                    param_type: "string".into(),
                    description: "Natural-language search query".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "k".into(),
                    param_type: "integer".into(),
                    description: "Number of results to return".into(),
                    required: false,
                    default: Some(serde_json::json!(DEFAULT_K)),
                    enum_values: None,
                },
            ],
            category: Some("retrieval".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call
            .arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::InvalidArguments("missing query".into()))?;

        let k = call
            .arguments
            .get("k")
            .and_then(serde_json::Value::as_u64)
            .map_or(DEFAULT_K, |v| v as usize);

        match self.retriever.search_records(query, k).await {
            Ok(hits) => {
                let mut output = format!("Top {} result(s) for \"{}\":\n", hits.len(), query);
                for (hit, record) in &hits {
                    let mut snippet: String = record.text.chars().take(SNIPPET_CHARS).collect();
                    if record.text.chars().count() > SNIPPET_CHARS {
                        snippet.push_str("...");
                    }
                    output.push_str(&format!(
                        "  {}. {} (score: {:.4})\n     {}\n",
                        hit.rank, hit.record_id, hit.score, snippet
                    ));
                    if !record.metadata.is_empty() {
                        output.push_str(&format!(
                            "     metadata: {}\n",
                            serde_json::to_string(&record.metadata)?
                        ));
                    }
                }
                Ok(ToolResult::success(TOOL_NAME, output.trim_end()))
            }
            Err(RetrievalError::EmptyStore) => Ok(ToolResult::success(
                TOOL_NAME,
                "The document store is empty; no retrieval context available.",
            )),
            Err(e) => Err(AgentError::ToolExecution {
                tool: TOOL_NAME.into(),
                source: anyhow::Error::new(e),
            }),
        }
    }
}
