//! Conversation session handle shared between the controller and its owner.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;
use shared::domain::ConversationId;
use tracing::{debug, info};

/// What to do when a response carries an identifier and one is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionIdPolicy {
    /// Replace the stored identifier; the service may rotate it.
    #[default]
    AcceptRotation,
    /// Keep the first identifier issued for the session.
    KeepFirst,
}

#[derive(Debug, Default)]
struct SessionState {
    conversation_id: Option<ConversationId>,
}

/// Cloneable handle; all clones observe the same identifier.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    policy: SessionIdPolicy,
    state: Arc<Mutex<SessionState>>,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(SessionIdPolicy::default())
    }
}

impl ConversationSession {
    pub fn new(policy: SessionIdPolicy) -> Self {
        Self {
            policy,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn policy(&self) -> SessionIdPolicy {
        self.policy
    }

    pub fn current_id(&self) -> Option<ConversationId> {
        self.lock().conversation_id.clone()
    }

    /// Stores `incoming` according to the policy. `None` or blank values never
    /// clear an identifier that is already stored. Returns true if the stored
    /// identifier changed.
    pub fn record(&self, incoming: Option<ConversationId>) -> bool {
        let Some(incoming) = incoming.filter(|id| !id.is_blank()) else {
            return false;
        };

        let mut state = self.lock();
        if let Some(current) = state.conversation_id.as_ref() {
            if *current == incoming {
                return false;
            }
            if self.policy == SessionIdPolicy::KeepFirst {
                debug!(
                    stored = %current,
                    offered = %incoming,
                    "keeping first conversation id"
                );
                return false;
            }
        }

        info!(
            previous = ?state.conversation_id,
            conversation_id = %incoming,
            "conversation id stored"
        );
        state.conversation_id = Some(incoming);
        true
    }

    pub fn reset(&self) {
        let mut state = self.lock();
        if let Some(previous) = state.conversation_id.take() {
            info!(previous = %previous, "conversation session reset");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // The state is a single Option; a panic elsewhere cannot leave it torn.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
