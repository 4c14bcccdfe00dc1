//! User-supplied input for creating a task

use chrono::{DateTime, Utc};
use serde_json::Map;

use super::date_format::normalize;
use super::model::{Attachment, Task, TaskStatus};
use crate::{Error, Result};

/// A not-yet-validated task, as entered in a creation form
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}

impl TaskDraft {
    /// Create a draft with the given title; every date starts at "now"
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            description: String::new(),
            due_date: now,
            start_date: now,
            end_date: now,
            attachments: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, date: DateTime<Utc>) -> Self {
        self.due_date = date;
        self
    }

    /// Set the start date
    pub fn with_start_date(mut self, date: DateTime<Utc>) -> Self {
        self.start_date = date;
        self
    }

    /// Set the end date
    pub fn with_end_date(mut self, date: DateTime<Utc>) -> Self {
        self.end_date = date;
        self
    }

    /// Append an attachment
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        Ok(())
    }

    /// Turn the draft into a stored task under `id`
    pub(crate) fn into_task(self, id: String) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            due_date: normalize(self.due_date),
            start_date: normalize(self.start_date),
            end_date: normalize(self.end_date),
            status: TaskStatus::default(),
            attachments: self.attachments,
            extra: Map::new(),
        }
    }
}
