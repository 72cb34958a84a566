//! Generative-model backend access.
//!
//! `ChatBackend` is the seam between the HTTP layer and the hosted model:
//! it takes a mapped conversation history plus the active turn, and yields
//! the model's reply as an ordered stream of text chunks. `GeminiClient`
//! is the production implementation; `MockBackend` drives tests.

use std::pin::Pin;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::Stream;
use thiserror::Error;

pub mod gemini;
pub mod persona;

pub use gemini::GeminiClient;
pub use persona::{split_active_turn, PERSONA_INSTRUCTION};

/// Which side of the conversation a turn belongs to, in the backend's
/// vocabulary. The persona instruction and assistant replies are both
/// `Model` turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Model,
}

impl Speaker {
    /// Role string on the Gemini wire.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One `(speaker, text)` pair of the mapped history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Ordered stream of reply text chunks. Ends when the model signals
/// completion; dropping it cancels the relay.
pub type ReplyStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Errors raised at the backend boundary. These are caught by the chat
/// endpoint and converted into a single non-streaming error response —
/// never leaked to the caller as a raw failure.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("cannot reach model backend: {0}")]
    Connection(String),

    #[error("model backend authentication failed: {0}")]
    Auth(String),

    #[error("model backend rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model backend configuration error: {0}")]
    Config(String),
}

/// A stateful chat session against a hosted model: seed with history,
/// submit the newest turn, stream back the reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn stream_reply(
        &self,
        history: Vec<ChatTurn>,
        message: &str,
    ) -> Result<ReplyStream, BackendError>;
}

// ═══════════════════════════════════════════════════════════
// MockBackend — test double
// ═══════════════════════════════════════════════════════════

/// Mock backend for testing — replays configured chunks and records what
/// it was called with.
pub struct MockBackend {
    chunks: Vec<String>,
    fail: bool,
    calls: Mutex<Vec<(Vec<ChatTurn>, String)>>,
}

impl MockBackend {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|s| s.to_string()).collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose every call fails at the boundary.
    pub fn failing() -> Self {
        Self {
            chunks: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Everything `stream_reply` has been called with, in order.
    pub fn calls(&self) -> Vec<(Vec<ChatTurn>, String)> {
        self.calls.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn stream_reply(
        &self,
        history: Vec<ChatTurn>,
        message: &str,
    ) -> Result<ReplyStream, BackendError> {
        self.calls
            .lock()
            .expect("mock lock")
            .push((history, message.to_string()));
        if self.fail {
            return Err(BackendError::Connection("mock backend offline".into()));
        }
        let chunks = self.chunks.clone();
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}
