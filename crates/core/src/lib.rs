//! Core library for Pocket Tasks
//!
//! This crate contains the local task store:
//! - Key/value persistence with change notifications
//! - Task collection repository
//! - Attachment picking

pub mod attachment;
pub mod error;
pub mod storage;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
