//! Render commands the controller issues, and a headless surface that records them.

use shared::domain::Author;

use crate::diagnostics::DiagnosticsView;

pub const PENDING_TEXT: &str = "Thinking...";
pub const ERROR_TEXT: &str = "Sorry, an error occurred while connecting to the server.";
pub const LOW_CONFIDENCE_WARNING: &str = "Low confidence, please verify with support.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

/// A display that accepts render commands. It owns all styling.
///
/// The log is append-only; the only entries the controller ever removes are
/// the ones it created with [`RenderSurface::append_pending_entry`].
pub trait RenderSurface: Send {
    fn append_log_entry(&mut self, author: Author, text: &str, warning: bool) -> EntryId;
    fn append_pending_entry(&mut self) -> EntryId;
    fn remove_log_entry(&mut self, id: EntryId);
    fn scroll_to_latest(&mut self);
    fn render_diagnostics(&mut self, view: &DiagnosticsView);
    fn set_input_enabled(&mut self, enabled: bool);
    fn clear_input(&mut self);
    fn focus_input(&mut self);
    /// Drops every log entry and the diagnostic panel contents.
    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: EntryId,
    pub author: Author,
    pub text: String,
    pub warning: Option<&'static str>,
    pub pending: bool,
}

impl LogEntry {
    /// Text split into visual lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

#[derive(Debug, Clone)]
pub struct InputState {
    pub enabled: bool,
    pub text: String,
    pub focused: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            enabled: true,
            text: String::new(),
            focused: true,
        }
    }
}

/// In-memory surface for headless use and tests.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<LogEntry>,
    diagnostics: Option<DiagnosticsView>,
    input: InputState,
    scrolled_to: Option<EntryId>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn diagnostics(&self) -> Option<&DiagnosticsView> {
        self.diagnostics.as_ref()
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Latest entry the view is scrolled to, if any.
    pub fn scrolled_to(&self) -> Option<EntryId> {
        self.scrolled_to
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input.text = text.into();
    }

    pub fn has_pending(&self) -> bool {
        self.entries.iter().any(|entry| entry.pending)
    }

    fn push(&mut self, author: Author, text: &str, warning: bool, pending: bool) -> EntryId {
        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.entries.push(LogEntry {
            id,
            author,
            text: text.to_string(),
            warning: (warning && author == Author::Bot).then_some(LOW_CONFIDENCE_WARNING),
            pending,
        });
        id
    }
}

impl RenderSurface for Transcript {
    fn append_log_entry(&mut self, author: Author, text: &str, warning: bool) -> EntryId {
        self.push(author, text, warning, false)
    }

    fn append_pending_entry(&mut self) -> EntryId {
        self.push(Author::Bot, PENDING_TEXT, false, true)
    }

    fn remove_log_entry(&mut self, id: EntryId) {
        self.entries.retain(|entry| !(entry.id == id && entry.pending));
    }

    fn scroll_to_latest(&mut self) {
        self.scrolled_to = self.entries.last().map(|entry| entry.id);
    }

    fn render_diagnostics(&mut self, view: &DiagnosticsView) {
        self.diagnostics = Some(view.clone());
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input.enabled = enabled;
    }

    fn clear_input(&mut self) {
        self.input.text.clear();
    }

    fn focus_input(&mut self) {
        self.input.focused = true;
    }

    fn clear(&mut self) {
        *self = Self {
            next_id: self.next_id,
            ..Self::default()
        };
    }
}
