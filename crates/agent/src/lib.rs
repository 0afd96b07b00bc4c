//! Chat agent for KB Chat
//!
//! This crate talks to the hosted model and drives the conversation:
//! - Gemini: HTTP client for the generateContent endpoint
//! - Session: per-knowledge-text session configs with a bounded cache
//! - Controller: ordered message history, one stateless session per turn

pub mod controller;
pub mod error;
pub mod gemini;
pub mod session;

pub use controller::{ChatController, SubmitOutcome};
pub use error::{AgentError, Result};
pub use gemini::GeminiClient;
pub use session::{ChatSession, SessionConfig, SessionFactory};
