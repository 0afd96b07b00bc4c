//! Integration tests for the chat controller against a stub model server

mod common;

use kbchat_core::MessageRole;
use mockito::Matcher;
use tempfile::TempDir;

const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

/// A successful turn appends exactly one user and one assistant message
#[tokio::test]
async fn test_submit_appends_two_messages_on_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::reply_body("Paris is the capital of France."))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let mut controller = common::test_controller(&server.url(), &dir);

    let outcome = controller.submit("capital of France?").await;

    assert!(!outcome.failed);
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(controller.messages()[0].role, MessageRole::User);
    assert_eq!(controller.messages()[0].content, "capital of France?");
    assert_eq!(controller.messages()[1].role, MessageRole::Assistant);
    assert!(controller.messages()[1].content.contains("Paris"));
}

/// A failed turn also appends exactly two messages, with the error
/// formatted into the assistant turn
#[tokio::test]
async fn test_submit_appends_two_messages_on_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let mut controller = common::test_controller(&server.url(), &dir);

    let outcome = controller.submit("does this survive a 500?").await;

    assert!(outcome.failed);
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(controller.messages()[1].role, MessageRole::Assistant);
    assert!(controller.messages()[1].content.starts_with("Error:"));
    assert_eq!(outcome.reply, controller.messages()[1].content);
}

/// The knowledge base is re-aggregated on every submit, so a file
/// uploaded mid-session reaches the model on the next turn
#[tokio::test]
async fn test_uploaded_knowledge_reaches_the_model() {
    let mut server = mockito::Server::new_async().await;
    // The stub only answers requests whose system instruction carries the
    // uploaded fact
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("X=42".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::reply_body("According to facts.txt, X is 42."))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let mut controller = common::test_controller(&server.url(), &dir);

    controller.store().write("facts.txt", b"X=42").unwrap();
    let outcome = controller.submit("what is X?").await;

    assert!(!outcome.failed, "reply was: {}", outcome.reply);
    assert!(outcome.reply.contains("42"));
    mock.assert_async().await;
}

/// Unreadable files are skipped with a notice; the turn still succeeds
#[tokio::test]
async fn test_unreadable_file_is_reported_not_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::reply_body("answered anyway"))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let mut controller = common::test_controller(&server.url(), &dir);

    controller.store().write("good.txt", b"fine").unwrap();
    std::fs::write(dir.path().join("bad.txt"), [0xff, 0xfe]).unwrap();

    let outcome = controller.submit("anything").await;

    assert!(!outcome.failed);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].name, "bad.txt");
}

/// clear() followed by export_json() yields None
#[tokio::test]
async fn test_clear_then_export_is_empty() {
    let dir = TempDir::new().unwrap();
    // No server listening: the turn fails, but history still grows by two
    let mut controller = common::test_controller("http://127.0.0.1:9", &dir);

    controller.submit("hello?").await;
    assert_eq!(controller.messages().len(), 2);
    assert!(controller.export_json().unwrap().is_some());

    controller.clear();
    assert!(controller.messages().is_empty());
    assert!(controller.export_json().unwrap().is_none());
}

/// Export JSON parses and its count matches the messages array
#[tokio::test]
async fn test_export_counts_match() {
    let dir = TempDir::new().unwrap();
    let mut controller = common::test_controller("http://127.0.0.1:9", &dir);

    controller.submit("first").await;
    controller.submit("second").await;

    let json = controller.export_json().unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let messages = parsed["messages"].as_array().unwrap();
    assert_eq!(parsed["total_messages"].as_u64().unwrap() as usize, messages.len());
    assert_eq!(messages.len(), 4);
    assert!(parsed["exported_at"].is_string());
}

/// An empty store is seeded before the first model call
#[tokio::test]
async fn test_empty_store_seeded_into_prompt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Sample Knowledge Base".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::reply_body("seeded"))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let mut controller = common::test_controller(&server.url(), &dir);

    let outcome = controller.submit("what do you know?").await;

    assert!(!outcome.failed, "reply was: {}", outcome.reply);
    assert_eq!(
        controller.store().list().unwrap(),
        vec!["my_knowledge.txt"]
    );
    mock.assert_async().await;
}
