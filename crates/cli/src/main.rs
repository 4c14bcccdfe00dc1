//! Pocket Tasks command-line front end
//!
//! One-shot commands operate on the task store and exit; `shell` keeps a
//! live list view open while commands are entered.

mod actions;
mod config;
mod render;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use pt_core::attachment::{AttachmentPicker, FileAttachmentPicker};
use pt_core::task::{date_format, TaskDraft, TaskRepository, TaskStatus};
use tracing_subscriber::EnvFilter;

use crate::actions::Action;
use crate::config::{Config, StoreLocation};

/// Pocket Tasks: a personal task tracker.
#[derive(Parser)]
#[command(name = "pt", version, about)]
struct Cli {
    /// Directory holding the task store (overrides PT_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// List all tasks.
    List,

    /// Show the details of one task.
    Show { id: String },

    /// Create a task.
    Add(AddArgs),

    /// Mark a task as done.
    Done { id: String },

    /// Mark a task as todo again.
    Reopen { id: String },

    /// Delete a task.
    Delete { id: String },

    /// Interactive session with a live task list.
    Shell,
}

#[derive(Args)]
struct AddArgs {
    /// Task title.
    title: String,

    /// Free-text details.
    #[arg(short, long, default_value = "")]
    description: String,

    /// Due date (YYYY-MM-DD or RFC 3339); defaults to now.
    #[arg(long, value_parser = parse_date)]
    due: Option<DateTime<Utc>>,

    /// Start date; defaults to now.
    #[arg(long, value_parser = parse_date)]
    start: Option<DateTime<Utc>>,

    /// End date; defaults to now.
    #[arg(long, value_parser = parse_date)]
    end: Option<DateTime<Utc>>,

    /// File to attach.
    #[arg(long)]
    attach: Option<PathBuf>,
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    date_format::parse(raw).ok_or_else(|| format!("expected YYYY-MM-DD or RFC 3339, got '{raw}'"))
}

impl AddArgs {
    fn into_draft(self) -> anyhow::Result<TaskDraft> {
        let mut draft = TaskDraft::new(self.title).with_description(self.description);
        if let Some(due) = self.due {
            draft = draft.with_due_date(due);
        }
        if let Some(start) = self.start {
            draft = draft.with_start_date(start);
        }
        if let Some(end) = self.end {
            draft = draft.with_end_date(end);
        }

        let mut picker = FileAttachmentPicker::new(self.attach);
        match picker.pick().context("Failed to attach file")? {
            Some(attachment) => draft = draft.with_attachment(attachment),
            None => tracing::debug!("No attachment picked"),
        }
        Ok(draft)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pt_cli=info,pt_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir);
    match &config.store {
        StoreLocation::Directory(dir) => tracing::debug!("Using data directory: {:?}", dir),
        StoreLocation::Memory => tracing::info!("Using in-memory store, nothing will be saved"),
    }

    let repo = TaskRepository::new(Arc::new(config.open_store()));

    let action = match cli.command.unwrap_or(Command::List) {
        Command::Shell => return shell::run(repo).await,
        Command::List => Action::List,
        Command::Show { id } => Action::Show(id),
        Command::Add(args) => Action::Add(args.into_draft()?),
        Command::Done { id } => Action::SetStatus(id, TaskStatus::Done),
        Command::Reopen { id } => Action::SetStatus(id, TaskStatus::Todo),
        Command::Delete { id } => Action::Delete(id),
    };

    let output = actions::apply(&repo, action)?;
    println!("{output}");
    Ok(())
}
