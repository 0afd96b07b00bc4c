//! Chat controller - ordered message history, one stateless session per turn

use crate::{Result, SessionFactory};
use kbchat_core::{ChatExport, Message};
use kbchat_store::{KnowledgeStore, SkippedFile};
use tracing::{info, instrument};
use uuid::Uuid;

/// Owns the conversation: message history, the file store, and the
/// session factory. One controller per interactive session; no globals.
pub struct ChatController {
    store: KnowledgeStore,
    factory: SessionFactory,
    messages: Vec<Message>,
    session_id: Uuid,
}

/// What a submit produced, for the presentation layer.
///
/// `reply` is always the text that was appended as the assistant turn,
/// including the formatted error string on failure.
pub struct SubmitOutcome {
    pub reply: String,
    pub failed: bool,
    pub skipped: Vec<SkippedFile>,
}

impl ChatController {
    pub fn new(store: KnowledgeStore, factory: SessionFactory) -> Self {
        Self {
            store,
            factory,
            messages: Vec::new(),
            session_id: Uuid::new_v4(),
        }
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// The conversation so far, in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Submit one user message.
    ///
    /// Appends the user turn, re-aggregates the knowledge base (always
    /// fresh, so mid-session file edits are reflected), builds a session
    /// and sends the text. Exactly two messages are appended whether the
    /// call succeeds or fails: failures are formatted into the assistant
    /// turn, never returned to the caller.
    #[instrument(skip(self, user_text), fields(session = %self.session_id))]
    pub async fn submit(&mut self, user_text: &str) -> SubmitOutcome {
        self.messages.push(Message::user(user_text));

        let (reply, skipped, failed) = match self.answer(user_text).await {
            Ok((text, skipped)) => (text, skipped, false),
            Err(e) => (format!("Error: {}", e), Vec::new(), true),
        };

        self.messages.push(Message::assistant(reply.clone()));
        info!(
            "Turn complete ({} messages, failed: {})",
            self.messages.len(),
            failed
        );

        SubmitOutcome {
            reply,
            failed,
            skipped,
        }
    }

    async fn answer(&mut self, user_text: &str) -> Result<(String, Vec<SkippedFile>)> {
        let bundle = self.store.aggregate()?;
        let session = self.factory.session(&bundle.text);
        let reply = session.send(user_text).await?;
        Ok((reply, bundle.skipped))
    }

    /// Empty the message history
    pub fn clear(&mut self) {
        self.messages.clear();
        info!("Cleared chat history");
    }

    /// Export the history as pretty JSON, or None when it is empty
    pub fn export_json(&self) -> Result<Option<String>> {
        if self.messages.is_empty() {
            return Ok(None);
        }
        let export = ChatExport::from_messages(&self.messages);
        Ok(Some(export.to_json()?))
    }
}
