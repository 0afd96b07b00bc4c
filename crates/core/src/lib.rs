//! Core domain types for KB Chat
//!
//! This crate defines the data structures shared across the workspace:
//! chat messages, the export snapshot, and knowledge files.

pub mod error;
pub mod export;
pub mod knowledge;
pub mod message;

pub use error::{CoreError, Result};
pub use export::ChatExport;
pub use knowledge::KnowledgeFile;
pub use message::{Message, MessageRole};
