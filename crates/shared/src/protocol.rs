use serde::{Deserialize, Serialize};

use crate::domain::ConversationId;

/// Body of `POST /query`.
///
/// `conversation_id` is always present on the wire, as `null` on the first turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub conversation_id: Option<ConversationId>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>, conversation_id: Option<ConversationId>) -> Self {
        Self {
            question: question.into(),
            conversation_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub model_used: String,
    pub classification: String,
    pub latency_ms: u64,
    pub tokens: TokenUsage,
    pub chunks_retrieved: u64,
    #[serde(default)]
    pub evaluator_flags: Vec<String>,
}

impl TurnMetadata {
    /// True when the evaluator raised at least one reliability flag.
    pub fn is_flagged(&self) -> bool {
        !self.evaluator_flags.is_empty()
    }
}

/// A retrieved document chunk the answer was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    pub metadata: TurnMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceItem>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
