//! View model for the diagnostic panel.

use shared::protocol::TurnMetadata;

pub const NO_FLAGS_LABEL: &str = "None";
pub const FLAG_SEPARATOR: &str = ", ";

/// Binary emphasis of the evaluator-flags row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagStatus {
    Ok,
    Alert,
}

impl FlagStatus {
    /// Hex colour for the row.
    pub fn color(self) -> &'static str {
        match self {
            FlagStatus::Ok => "#00b894",
            FlagStatus::Alert => "#ff7675",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsView {
    pub model_used: String,
    pub classification: String,
    pub latency: String,
    pub tokens: String,
    pub chunks_retrieved: String,
    pub evaluator_flags: String,
    pub flag_status: FlagStatus,
}

impl DiagnosticsView {
    pub fn from_metadata(metadata: &TurnMetadata) -> Self {
        let (evaluator_flags, flag_status) = if metadata.is_flagged() {
            (metadata.evaluator_flags.join(FLAG_SEPARATOR), FlagStatus::Alert)
        } else {
            (NO_FLAGS_LABEL.to_string(), FlagStatus::Ok)
        };

        Self {
            model_used: metadata.model_used.clone(),
            classification: metadata.classification.clone(),
            latency: format!("{} ms", metadata.latency_ms),
            tokens: format!("{} / {}", metadata.tokens.input, metadata.tokens.output),
            chunks_retrieved: metadata.chunks_retrieved.to_string(),
            evaluator_flags,
            flag_status,
        }
    }

    /// Rows in panel order.
    pub fn rows(&self) -> Vec<DiagnosticRow> {
        [
            ("Model Used", &self.model_used),
            ("Classification", &self.classification),
            ("Latency", &self.latency),
            ("Tokens (In / Out)", &self.tokens),
            ("Chunks Retrieved", &self.chunks_retrieved),
            ("Evaluator Flags", &self.evaluator_flags),
        ]
        .into_iter()
        .map(|(label, value)| DiagnosticRow {
            label,
            value: value.clone(),
        })
        .collect()
    }
}
