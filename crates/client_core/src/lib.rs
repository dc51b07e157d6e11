//! Client runtime for the question-answering chat widget: one conversational
//! turn at a time between a render surface and the remote query service.

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod service;
pub mod session;
pub mod surface;

pub use config::{load_settings, ClientSettings, SettingsError};
pub use controller::{TurnController, TurnOutcome, TurnPhase};
pub use diagnostics::{DiagnosticsView, FlagStatus};
pub use service::{HttpQueryService, HttpServiceError, QueryService, TransportError};
pub use session::{ConversationSession, SessionIdPolicy};
pub use surface::{EntryId, LogEntry, RenderSurface, Transcript};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
