//! Task module
//!
//! This module contains the task model, the collection repository and
//! its change notifications.

mod changes;
pub mod date_format;
mod draft;
mod model;
mod repository;

pub use changes::ChangeStream;
pub use draft::TaskDraft;
pub use model::*;
pub use repository::{decode_collection, encode_collection, TaskRepository, TASKS_KEY};
