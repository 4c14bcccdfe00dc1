//! Operations the front end performs on the repository

use pt_core::task::{TaskDraft, TaskRepository, TaskStatus};
use pt_core::Result;
use tracing::info;

use crate::render;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    List,
    Show(String),
    Add(TaskDraft),
    SetStatus(String, TaskStatus),
    Delete(String),
}

/// Run `action` and return the text to show the user
pub fn apply(repo: &TaskRepository, action: Action) -> Result<String> {
    match action {
        Action::List => Ok(render::task_list(&repo.list_all())),
        Action::Show(id) => Ok(match repo.get(&id) {
            Some(task) => render::task_details(&task),
            None => format!("No task with id {id}"),
        }),
        Action::Add(draft) => {
            let task = repo.create(draft)?;
            info!("Created task {}", task.id);
            Ok(format!("Created {}", render::task_line(&task)))
        }
        Action::SetStatus(id, status) => {
            if repo.get(&id).is_none() {
                return Ok(format!("No task with id {id}"));
            }
            let message = format!("Marked {id} as {status}");
            repo.update_status(&id, status)?;
            Ok(message)
        }
        Action::Delete(id) => {
            repo.delete(&id)?;
            Ok(format!("Deleted {id}"))
        }
    }
}
