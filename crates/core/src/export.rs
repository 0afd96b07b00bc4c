//! Chat export snapshot - the downloadable JSON artifact

use crate::{Message, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of the conversation, serialized on demand.
///
/// Write-only: there is no import path back into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExport {
    /// When the snapshot was taken
    pub exported_at: DateTime<Utc>,

    /// The conversation in order
    pub messages: Vec<Message>,

    /// Convenience count, always equal to `messages.len()`
    pub total_messages: usize,
}

impl ChatExport {
    /// Snapshot the given message history, stamped with the current time
    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            exported_at: Utc::now(),
            messages: messages.to_vec(),
            total_messages: messages.len(),
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_counts_messages() {
        let messages = vec![Message::user("hi"), Message::assistant("hello")];
        let export = ChatExport::from_messages(&messages);

        assert_eq!(export.total_messages, 2);
        assert_eq!(export.messages.len(), export.total_messages);
    }

    #[test]
    fn test_export_json_round_trip() {
        let messages = vec![
            Message::user("what is X?"),
            Message::assistant("X is 42"),
        ];
        let export = ChatExport::from_messages(&messages);
        let json = export.to_json().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["total_messages"], 2);
        assert_eq!(parsed["messages"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["messages"][0]["role"], "user");
        assert_eq!(parsed["messages"][1]["role"], "assistant");
        // exported_at must be an ISO-8601 string
        assert!(parsed["exported_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_export_empty_history() {
        let export = ChatExport::from_messages(&[]);
        assert_eq!(export.total_messages, 0);
        assert!(export.messages.is_empty());
    }
}
