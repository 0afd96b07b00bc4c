//! Common test utilities

use kbchat_agent::{ChatController, GeminiClient, SessionFactory};
use kbchat_store::KnowledgeStore;
use tempfile::TempDir;

/// Open a store over a fresh temp directory
pub fn test_store(dir: &TempDir) -> KnowledgeStore {
    KnowledgeStore::open(dir.path()).expect("Failed to open store")
}

/// Build a controller whose model calls go to the given base URL
pub fn test_controller(base_url: &str, dir: &TempDir) -> ChatController {
    let client = GeminiClient::new("test-key")
        .with_base_url(base_url)
        .with_model("gemini-1.5-flash");
    ChatController::new(test_store(dir), SessionFactory::new(client))
}

/// A generateContent response body carrying one text candidate
pub fn reply_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            }
        }]
    })
    .to_string()
}
