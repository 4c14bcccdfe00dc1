//! Interactive session
//!
//! Reads commands from stdin while a separate list view task redraws the
//! task list every time the repository reports a change.

use anyhow::Context;
use pt_core::task::{ChangeStream, TaskDraft, TaskRepository, TaskStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::actions::{self, Action};
use crate::render;

const HELP: &str = "\
Commands:
  list               show all tasks
  show <id>          show task details
  add <title>        create a task due now
  done <id>          mark a task as done
  reopen <id>        mark a task as todo
  delete <id>        delete a task
  help               show this help
  quit               leave the shell";

#[derive(Debug, PartialEq)]
enum Input {
    Run(Action),
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let id = |name: &str| {
        if rest.is_empty() {
            Err(format!("usage: {name} <id>"))
        } else {
            Ok(rest.to_string())
        }
    };

    Ok(match command {
        "" => Input::Empty,
        "list" | "ls" => Input::Run(Action::List),
        "show" => Input::Run(Action::Show(id("show")?)),
        "add" => Input::Run(Action::Add(TaskDraft::new(rest))),
        "done" => Input::Run(Action::SetStatus(id("done")?, TaskStatus::Done)),
        "reopen" => Input::Run(Action::SetStatus(id("reopen")?, TaskStatus::Todo)),
        "delete" | "rm" => Input::Run(Action::Delete(id("delete")?)),
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    })
}

/// Background task that redraws the task list after every commit
struct ListView {
    /// Last commit revision the view has drawn
    rendered: watch::Receiver<u64>,
    /// Commits made since the view was spawned
    commits: ChangeStream,
    task: JoinHandle<()>,
}

impl ListView {
    fn spawn(repo: TaskRepository, draw: impl Fn(String) + Send + 'static) -> Self {
        let commits = repo.changes();
        let mut changes = repo.changes();
        let (drawn, rendered) = watch::channel(0u64);
        let task = tokio::spawn(async move {
            while let Some(revision) = changes.changed().await {
                debug!("Refreshing list view at revision {}", revision);
                draw(render::task_list(&repo.list_all()));
                drawn.send_replace(revision);
            }
        });
        Self {
            rendered,
            commits,
            task,
        }
    }

    /// Wait until every commit made so far has been drawn.
    async fn caught_up(&mut self) {
        let target = self.commits.revision();
        // Err only if the view task has stopped
        let _ = self.rendered.wait_for(|drawn| *drawn >= target).await;
    }
}

impl Drop for ListView {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn run(repo: TaskRepository) -> anyhow::Result<()> {
    let mut view = ListView::spawn(repo.clone(), |frame| println!("{frame}\n"));

    println!("{}\n", render::task_list(&repo.list_all()));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match parse_line(&line) {
            Ok(Input::Run(Action::List)) => {
                println!("{}", render::task_list(&repo.list_all()));
            }
            Ok(Input::Run(action)) => match actions::apply(&repo, action) {
                Ok(message) => println!("{message}"),
                Err(e) => eprintln!("{e}"),
            },
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => break,
            Ok(Input::Empty) => {}
            Err(message) => eprintln!("{message}"),
        }
        view.caught_up().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_core::storage::KvStore;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn recording_view(repo: &TaskRepository) -> (ListView, Arc<Mutex<Vec<String>>>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let view = ListView::spawn(repo.clone(), move |frame| sink.lock().unwrap().push(frame));
        (view, frames)
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_line("  "), Ok(Input::Empty));
        assert_eq!(parse_line("ls"), Ok(Input::Run(Action::List)));
        assert_eq!(parse_line("help"), Ok(Input::Help));
        assert_eq!(parse_line("quit"), Ok(Input::Quit));
    }

    #[test]
    fn test_parse_id_commands() {
        assert_eq!(
            parse_line("done 1704067200000"),
            Ok(Input::Run(Action::SetStatus(
                "1704067200000".to_string(),
                TaskStatus::Done
            )))
        );
        assert_eq!(
            parse_line("rm  42 "),
            Ok(Input::Run(Action::Delete("42".to_string())))
        );
        assert_eq!(parse_line("show"), Err("usage: show <id>".to_string()));
    }

    #[test]
    fn test_parse_add_keeps_whole_title() {
        match parse_line("add Buy milk and eggs") {
            Ok(Input::Run(Action::Add(draft))) => assert_eq!(draft.title, "Buy milk and eggs"),
            other => panic!("Expected add action, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(parse_line("frobnicate").unwrap_err().contains("unknown command"));
    }

    #[tokio::test]
    async fn test_list_view_drawn_before_next_prompt() {
        let repo = TaskRepository::new(Arc::new(KvStore::in_memory()));
        let (mut view, frames) = recording_view(&repo);

        actions::apply(&repo, Action::Add(TaskDraft::new("Buy milk"))).unwrap();
        view.caught_up().await;

        let frames = frames.lock().unwrap();
        assert!(frames.last().unwrap().contains("Buy milk"));
    }

    #[tokio::test]
    async fn test_caught_up_without_commits_returns_at_once() {
        let repo = TaskRepository::new(Arc::new(KvStore::in_memory()));
        let (mut view, frames) = recording_view(&repo);

        tokio::time::timeout(Duration::from_secs(1), view.caught_up())
            .await
            .unwrap();
        assert!(frames.lock().unwrap().is_empty());
    }
}
