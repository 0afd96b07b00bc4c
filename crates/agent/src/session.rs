//! Model session configs and the factory that caches them.
//!
//! A session is stateless: each send carries only the current user message,
//! so the model sees nothing of earlier turns beyond what is in the
//! knowledge text itself.

use crate::{GeminiClient, Result};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Decoding parameters, fixed for every session
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.95;
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Cache bound: knowledge text changes with every file edit, so the
/// config map must not grow without limit.
const MAX_CACHED_CONFIGS: usize = 8;

const SYSTEM_PREAMBLE: &str = "\
You are a knowledge assistant.

Your role:
- Answer questions ONLY based on the provided knowledge base
- Cite the source document when providing information
- If information is not in the knowledge base, clearly state that
- Be helpful, professional, and concise";

/// A remote-model configuration: system instruction plus decoding parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub system_instruction: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl SessionConfig {
    /// Build the config for one snapshot of the knowledge text
    pub fn for_knowledge(knowledge_text: &str) -> Self {
        Self {
            system_instruction: format!(
                "{}\n\nKnowledge Base:\n{}",
                SYSTEM_PREAMBLE, knowledge_text
            ),
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// Builds chat sessions, reusing configs for identical knowledge text.
///
/// Configs are keyed by SHA-256 of the knowledge text and capped at
/// [`MAX_CACHED_CONFIGS`] entries, oldest-inserted evicted first.
pub struct SessionFactory {
    client: GeminiClient,
    configs: VecDeque<(String, Arc<SessionConfig>)>,
}

impl SessionFactory {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            configs: VecDeque::new(),
        }
    }

    /// Get a session for the given knowledge text
    pub fn session(&mut self, knowledge_text: &str) -> ChatSession {
        let key = content_key(knowledge_text);

        if let Some((_, config)) = self.configs.iter().find(|(k, _)| *k == key) {
            debug!("Reusing cached session config");
            return ChatSession {
                client: self.client.clone(),
                config: Arc::clone(config),
            };
        }

        let config = Arc::new(SessionConfig::for_knowledge(knowledge_text));
        if self.configs.len() == MAX_CACHED_CONFIGS {
            self.configs.pop_front();
        }
        self.configs.push_back((key, Arc::clone(&config)));
        debug!("Built session config ({} cached)", self.configs.len());

        ChatSession {
            client: self.client.clone(),
            config,
        }
    }

    /// Drop all cached configs
    pub fn invalidate(&mut self) {
        self.configs.clear();
    }

    /// Number of cached configs
    pub fn cached_configs(&self) -> usize {
        self.configs.len()
    }
}

/// A one-turn handle on the remote model
pub struct ChatSession {
    client: GeminiClient,
    config: Arc<SessionConfig>,
}

impl ChatSession {
    /// Send the current user message; prior turns are never included
    pub async fn send(&self, user_text: &str) -> Result<String> {
        self.client.generate(&self.config, user_text).await
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

fn content_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
