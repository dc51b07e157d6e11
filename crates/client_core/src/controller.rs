//! Drives one conversational turn between a render surface and the query service.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use shared::{
    domain::Author,
    protocol::{QueryRequest, QueryResponse},
};
use tracing::{debug, error, info, warn};

use crate::{
    diagnostics::DiagnosticsView,
    service::{QueryService, TransportError},
    session::ConversationSession,
    surface::{EntryId, RenderSurface, ERROR_TEXT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Sending,
}

#[derive(Debug)]
pub enum TurnOutcome {
    /// Blank input; nothing was rendered or sent.
    Skipped,
    /// Another turn is still in flight; nothing was rendered or sent.
    Busy,
    Answered(QueryResponse),
    Failed(TransportError),
}

pub struct TurnController<Q, S> {
    service: Q,
    surface: Mutex<S>,
    session: ConversationSession,
    sending: AtomicBool,
}

impl<Q, S> TurnController<Q, S>
where
    Q: QueryService,
    S: RenderSurface,
{
    pub fn new(service: Q, surface: S, session: ConversationSession) -> Self {
        Self {
            service,
            surface: Mutex::new(surface),
            session,
            sending: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> TurnPhase {
        if self.sending.load(Ordering::Acquire) {
            TurnPhase::Sending
        } else {
            TurnPhase::Idle
        }
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn service(&self) -> &Q {
        &self.service
    }

    /// Do not hold the guard across an await point.
    pub fn surface(&self) -> MutexGuard<'_, S> {
        lock_surface(&self.surface)
    }

    /// Clears the session and the surface. Refused while a turn is in flight.
    pub fn reset(&self) -> bool {
        if self.phase() == TurnPhase::Sending {
            warn!("reset refused while a turn is in flight");
            return false;
        }
        self.session.reset();
        self.surface().clear();
        true
    }

    pub async fn submit(&self, question: &str) -> TurnOutcome {
        let question = question.trim();
        if question.is_empty() {
            debug!("ignoring blank question");
            return TurnOutcome::Skipped;
        }

        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("question submitted while a turn is in flight");
            return TurnOutcome::Busy;
        }

        let pending = {
            let mut surface = self.surface();
            surface.append_log_entry(Author::User, question, false);
            surface.scroll_to_latest();
            surface.clear_input();
            surface.set_input_enabled(false);
            let pending = surface.append_pending_entry();
            surface.scroll_to_latest();
            pending
        };
        let mut in_flight = InFlight {
            sending: &self.sending,
            surface: &self.surface,
            pending: Some(pending),
        };

        let request = QueryRequest::new(question, self.session.current_id());
        info!(
            conversation_id = ?request.conversation_id,
            question_chars = question.chars().count(),
            "sending question"
        );

        match self.service.query(&request).await {
            Ok(response) => {
                in_flight.remove_pending();
                self.session.record(response.conversation_id.clone());

                let flagged = response.metadata.is_flagged();
                let view = DiagnosticsView::from_metadata(&response.metadata);
                {
                    let mut surface = self.surface();
                    surface.append_log_entry(Author::Bot, &response.answer, flagged);
                    surface.scroll_to_latest();
                    surface.render_diagnostics(&view);
                }

                info!(
                    model = %response.metadata.model_used,
                    classification = %response.metadata.classification,
                    latency_ms = response.metadata.latency_ms,
                    chunks = response.metadata.chunks_retrieved,
                    flags = ?response.metadata.evaluator_flags,
                    "turn answered"
                );
                TurnOutcome::Answered(response)
            }
            Err(err) => {
                error!(error = %err, "turn failed");
                in_flight.remove_pending();
                {
                    let mut surface = self.surface();
                    surface.append_log_entry(Author::Bot, ERROR_TEXT, false);
                    surface.scroll_to_latest();
                }
                TurnOutcome::Failed(err)
            }
        }
    }
}

fn lock_surface<S>(surface: &Mutex<S>) -> MutexGuard<'_, S> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the controller to `Idle` when dropped, including when the submit
/// future is dropped before the service answers.
struct InFlight<'a, S: RenderSurface> {
    sending: &'a AtomicBool,
    surface: &'a Mutex<S>,
    pending: Option<EntryId>,
}

impl<S: RenderSurface> InFlight<'_, S> {
    fn remove_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            let mut surface = lock_surface(self.surface);
            surface.remove_log_entry(id);
            surface.scroll_to_latest();
        }
    }
}

impl<S: RenderSurface> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        self.remove_pending();
        {
            let mut surface = lock_surface(self.surface);
            surface.set_input_enabled(true);
            surface.focus_input();
        }
        self.sending.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
