//! Plain-text rendering of tasks

use chrono::{DateTime, Local, Utc};
use pt_core::task::Task;

pub fn local_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// One list row: done marker, id, title and due date
pub fn task_line(task: &Task) -> String {
    let marker = if task.is_done() { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{} {}  {}  (due {})",
        marker,
        task.id,
        task.title,
        local_date(&task.due_date)
    );
    if !task.description.is_empty() {
        line.push_str("\n      ");
        line.push_str(&task.description);
    }
    line
}

pub fn task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks yet.".to_string();
    }
    tasks.iter().map(task_line).collect::<Vec<_>>().join("\n")
}

pub fn task_details(task: &Task) -> String {
    let mut out = format!(
        "{}\n  id:     {}\n  status: {}\n  due:    {}\n  start:  {}\n  end:    {}\n",
        task.title,
        task.id,
        task.status,
        local_date(&task.due_date),
        local_date(&task.start_date),
        local_date(&task.end_date),
    );
    if !task.description.is_empty() {
        out.push_str(&format!("\n  {}\n", task.description));
    }
    for attachment in &task.attachments {
        let name = attachment.name.as_deref().unwrap_or("(unnamed)");
        out.push_str(&format!("  attachment: {} <{}>\n", name, attachment.uri));
    }
    out
}
