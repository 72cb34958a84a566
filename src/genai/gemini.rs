//! Streaming client for the Google Generative Language API.
//!
//! One request shape: `streamGenerateContent?alt=sse` with the mapped
//! history plus the active turn as `contents`, and a fixed generation
//! config. The SSE body is parsed line-by-line and each candidate part's
//! text is forwarded through a channel in arrival order.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;

use crate::config;

use super::{BackendError, ChatBackend, ChatTurn, ReplyStream};

/// Sampling parameters sent with every request. Fixed, not user-configurable.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

/// HTTP client for Gemini streaming chat.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Build a client from the environment. `GEMINI_API_KEY` is required;
    /// `GEMINI_BASE_URL` and `GEMINI_MODEL` override the defaults.
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| BackendError::Config("GEMINI_API_KEY is not set".into()))?;
        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| config::DEFAULT_GENAI_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| config::DEFAULT_GENAI_MODEL.to_string());
        Ok(Self::new(&base_url, &api_key, &model))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key,
        )
    }
}

// ─── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

/// Extract the text payloads from one SSE line. Non-data lines and
/// unparseable payloads yield nothing.
fn parse_sse_line(line: &str) -> Vec<String> {
    let Some(data) = line.trim().strip_prefix("data: ") else {
        return Vec::new();
    };
    let Ok(parsed) = serde_json::from_str::<StreamResponse>(data) else {
        return Vec::new();
    };
    parsed
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter(|p| !p.text.is_empty())
        .map(|p| p.text)
        .collect()
}

fn classify_send_error(err: reqwest::Error) -> BackendError {
    if err.is_connect() {
        BackendError::Connection(format!("connect failed: {err}"))
    } else if err.is_timeout() {
        BackendError::Connection(format!("request timed out: {err}"))
    } else {
        BackendError::Connection(err.to_string())
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn stream_reply(
        &self,
        history: Vec<ChatTurn>,
        message: &str,
    ) -> Result<ReplyStream, BackendError> {
        let mut contents: Vec<Content> = history
            .into_iter()
            .map(|turn| Content {
                role: turn.speaker.as_wire(),
                parts: vec![Part { text: turn.text }],
            })
            .collect();
        contents.push(Content {
            role: "user",
            parts: vec![Part {
                text: message.to_string(),
            }],
        });

        let body = GenerateRequest {
            contents,
            generation_config: GenerationConfig::default(),
        };

        let response = self
            .client
            .post(self.stream_url())
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let detail = body_text.chars().take(200).collect::<String>();
            return Err(match status.as_u16() {
                401 | 403 => BackendError::Auth(detail),
                code => BackendError::Api {
                    status: code,
                    message: detail,
                },
            });
        }

        // Relay task: parse SSE lines as bytes arrive and forward each text
        // payload in order. The receiver dropping (caller went away) ends
        // the relay; so does stream end or a transport error.
        let (tx, rx) = tokio::sync::mpsc::channel::<String>(32);
        let mut byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            let mut buffer = String::new();
            while let Some(result) = byte_stream.next().await {
                let bytes = match result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(error = %e, "model stream read error, relay stopped");
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].to_string();
                    buffer.drain(..=line_end);
                    for text in parse_sse_line(&line) {
                        if tx.send(text).await.is_err() {
                            return; // Caller abandoned the stream
                        }
                    }
                }
            }
            // Trailing data without a final newline
            for text in parse_sse_line(&buffer) {
                if tx.send(text).await.is_err() {
                    return;
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
