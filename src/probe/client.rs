// src/probe/client.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{path::Path, time::Duration};
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

/// Anything that can answer a text prompt about a video.
#[allow(async_fn_in_trait)]
pub trait VisionLanguageService {
    async fn respond(&self, video: &Path, prompt: &str) -> Result<String>;
}

/// Decoding parameters forwarded with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampling {
    pub max_new_tokens: u32,
    pub fps: f32,
    pub max_pixels: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            fps: 1.0,
            max_pixels: 360 * 420,
        }
    }
}

/// Client for an OpenAI-compatible `/v1/chat/completions` server that
/// accepts `video_url` content parts (e.g. vLLM serving Qwen3-VL).
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: Url,
    model: String,
    sampling: Sampling,
    max_retries: u32,
    initial_backoff_ms: u64,
}

impl ChatCompletionsClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000/`.
    pub fn new(base_url: &str, model: impl Into<String>, sampling: Sampling) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("bad base URL {}", base_url))?;
        let endpoint = base
            .join("v1/chat/completions")
            .with_context(|| format!("joining endpoint onto {}", base))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            model: model.into(),
            sampling,
            max_retries: 3,
            initial_backoff_ms: 500,
        })
    }

    pub fn with_retries(mut self, max_retries: u32, initial_backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_once(&self, body: &Value) -> Result<String> {
        let reply: ChatReply = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", self.endpoint))?
            .json()
            .await
            .with_context(|| format!("Decoding reply from {}", self.endpoint))?;
        reply.into_text()
    }
}

impl VisionLanguageService for ChatCompletionsClient {
    async fn respond(&self, video: &Path, prompt: &str) -> Result<String> {
        let body = request_body(&self.model, &self.sampling, video, prompt)?;
        debug!(endpoint = %self.endpoint, video = %video.display(), "querying model");

        let mut attempts = 0;
        loop {
            match self.post_once(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if attempts < self.max_retries => {
                    attempts += 1;
                    let backoff = backoff_delay_ms(self.initial_backoff_ms, attempts);
                    warn!(endpoint = %self.endpoint, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    error!(endpoint = %self.endpoint, error = %e, "Exhausted retries");
                    return Err(e);
                }
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based): doubles each time and
/// saturates instead of overflowing.
fn backoff_delay_ms(initial_ms: u64, attempt: u32) -> u64 {
    initial_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}

/// `file://` URL for a local video; relative paths are resolved first.
fn video_url(video: &Path) -> Result<Url> {
    let abs = if video.is_absolute() {
        video.to_path_buf()
    } else {
        std::env::current_dir()?.join(video)
    };
    Url::from_file_path(&abs).map_err(|_| anyhow::anyhow!("cannot build file URL for {:?}", abs))
}

/// Single-turn chat request: the video first, then the prompt. Greedy
/// decoding.
pub fn request_body(model: &str, sampling: &Sampling, video: &Path, prompt: &str) -> Result<Value> {
    let url = video_url(video)?;
    Ok(json!({
        "model": model,
        "max_tokens": sampling.max_new_tokens,
        "temperature": 0.0,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "video_url", "video_url": { "url": url.as_str() } },
                { "type": "text", "text": prompt }
            ]
        }],
        "mm_processor_kwargs": {
            "fps": sampling.fps,
            "max_pixels": sampling.max_pixels
        }
    }))
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatReply {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("reply has no message content")
    }
}

/// Extract the first choice's text from a raw chat-completions reply.
pub fn parse_reply(raw: &str) -> Result<String> {
    let reply: ChatReply = serde_json::from_str(raw).context("parsing chat reply")?;
    reply.into_text()
}
