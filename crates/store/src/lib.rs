//! Storage layer for KB Chat
//!
//! A knowledge base is one flat directory of `*.txt` files. This crate
//! provides the file store and the aggregator that concatenates every
//! document into the prompt prefix sent with each model call.

pub mod error;
pub mod seed;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{KnowledgeBundle, KnowledgeStore, SkippedFile};
