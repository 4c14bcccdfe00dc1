//! Task model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::date_format;
use crate::Error;

/// Task completion status.
///
/// Values other than `todo` and `done` written by other clients are kept
/// verbatim in `Other` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Todo,
    Done,
    Other(String),
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Todo => "todo",
            Self::Done => "done",
            Self::Other(value) => value,
        }
    }

    /// Done becomes todo; anything else becomes done
    pub fn toggled(&self) -> Self {
        match self {
            Self::Done => Self::Todo,
            _ => Self::Done,
        }
    }

    fn from_stored(value: String) -> Self {
        match value.as_str() {
            "todo" => Self::Todo,
            "done" => Self::Done,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        if value.is_empty() {
            return Err(Error::Validation("Task status is empty".to_string()));
        }
        Ok(Self::from_stored(value))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from_stored)
    }
}

/// Metadata of an externally picked file.
///
/// Stored as-is; fields other than `name`, `uri` and `type` are kept in
/// `extra` so nothing the picker reported is lost on rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            name: None,
            uri: uri.into(),
            mime_type: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A task as persisted in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "date_format")]
    pub due_date: DateTime<Utc>,
    #[serde(with = "date_format")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "date_format")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "one_or_many")]
    pub attachments: Vec<Attachment>,
    /// Fields this version does not know about, kept for rewrites
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Copy of this task with a different status
    pub fn with_status(self, status: TaskStatus) -> Self {
        Self { status, ..self }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Attachment>),
    One(Attachment),
}

/// Older records hold a single attachment object instead of a list
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Attachment>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(attachments)) => attachments,
        Some(OneOrMany::One(attachment)) => vec![attachment],
    })
}
