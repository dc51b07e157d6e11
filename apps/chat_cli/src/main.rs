use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ConversationSession, DiagnosticsView, EntryId, FlagStatus, HttpQueryService,
    RenderSurface, TurnController, TurnOutcome,
};
use shared::domain::Author;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const RESET_COMMAND: &str = "/reset";

#[derive(Parser, Debug)]
struct Args {
    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured query endpoint
    #[arg(long)]
    endpoint: Option<String>,
}

/// Line-oriented terminal rendering of the chat log and diagnostic panel.
struct TerminalSurface<W: Write + Send> {
    out: W,
    next_id: u64,
    pending: Option<EntryId>,
}

impl<W: Write + Send> TerminalSurface<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            next_id: 0,
            pending: None,
        }
    }

    fn next_id(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId(self.next_id)
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            debug!(error = %err, "terminal write failed");
        }
    }
}

impl<W: Write + Send> RenderSurface for TerminalSurface<W> {
    fn append_log_entry(&mut self, author: Author, text: &str, warning: bool) -> EntryId {
        let prefix = match author {
            Author::User => "you",
            Author::Bot => "bot",
        };
        let mut rendered = String::new();
        for line in text.split('\n') {
            rendered.push_str(&format!("{prefix}> {line}\n"));
        }
        if warning && author == Author::Bot {
            rendered.push_str(&format!(
                "     ! {}\n",
                client_core::surface::LOW_CONFIDENCE_WARNING
            ));
        }
        self.emit(&rendered);
        self.next_id()
    }

    fn append_pending_entry(&mut self) -> EntryId {
        let id = self.next_id();
        self.pending = Some(id);
        self.emit(&format!("bot> {}", client_core::surface::PENDING_TEXT));
        id
    }

    fn remove_log_entry(&mut self, id: EntryId) {
        if self.pending == Some(id) {
            self.pending = None;
            self.emit("\r\x1b[2K");
        }
    }

    fn scroll_to_latest(&mut self) {}

    fn render_diagnostics(&mut self, view: &DiagnosticsView) {
        let color = match view.flag_status {
            FlagStatus::Ok => "\x1b[32m",
            FlagStatus::Alert => "\x1b[31m",
        };
        let rows = view.rows();
        let last = rows.len().saturating_sub(1);
        let mut rendered = String::from("  --- diagnostics ---\n");
        for (index, row) in rows.into_iter().enumerate() {
            if index == last {
                rendered.push_str(&format!("  {:<18} {color}{}\x1b[0m\n", row.label, row.value));
            } else {
                rendered.push_str(&format!("  {:<18} {}\n", row.label, row.value));
            }
        }
        self.emit(&rendered);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if enabled {
            self.emit("> ");
        }
    }

    fn clear_input(&mut self) {}

    fn focus_input(&mut self) {}

    fn clear(&mut self) {
        self.pending = None;
        self.emit("\x1b[2J\x1b[H> ");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = endpoint;
    }
    let service =
        HttpQueryService::from_settings(&settings).context("failed to build query service")?;
    info!(endpoint = %service.endpoint(), "chat client ready");

    let controller = TurnController::new(
        service,
        TerminalSurface::new(io::stdout()),
        ConversationSession::new(settings.session_id_policy),
    );

    print!("> ");
    io::stdout().flush()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == RESET_COMMAND {
            controller.reset();
            continue;
        }
        if let TurnOutcome::Skipped = controller.submit(&line).await {
            print!("> ");
            io::stdout().flush()?;
        }
    }

    Ok(())
}
