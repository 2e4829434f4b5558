use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use salesdesk_core::config::{LlmConfig, LlmProvider};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";
const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build llm http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("llm request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("llm provider returned {0}")]
    Status(StatusCode),
    #[error("llm response could not be decoded: {0}")]
    Decode(String),
    #[error("llm returned an empty completion")]
    EmptyCompletion,
    #[error("llm provider `{0}` requires an api key")]
    MissingApiKey(&'static str),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl<T> LlmClient for Arc<T>
where
    T: LlmClient + ?Sized,
{
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }
}

/// Builds the client for the configured provider.
pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(LlmError::Build)?;

    match config.provider {
        LlmProvider::Ollama => Ok(Arc::new(OllamaClient {
            client: http,
            base_url: base_url_or(config.base_url.as_deref(), OLLAMA_DEFAULT_BASE_URL),
            model: config.model.clone(),
        })),
        LlmProvider::OpenAi => {
            let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey("openai"))?;
            Ok(Arc::new(OpenAiClient {
                client: http,
                base_url: base_url_or(config.base_url.as_deref(), OPENAI_DEFAULT_BASE_URL),
                model: config.model.clone(),
                api_key,
            }))
        }
    }
}

fn base_url_or(configured: Option<&str>, fallback: &str) -> String {
    configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .trim_end_matches('/')
        .to_string()
}

pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest { model: &self.model, prompt, stream: false };
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(log_transport)?;

        let payload: GenerateResponse = decode(response).await?;
        non_empty(payload.response)
    }
}

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, LlmError> {
        let text = self.choices.into_iter().next().and_then(|choice| choice.message.content);
        non_empty(text.unwrap_or_default())
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: 0.7,
        };
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(log_transport)?;

        let payload: ChatResponse = decode(response).await?;
        payload.into_text()
    }
}

fn log_transport(source: reqwest::Error) -> LlmError {
    error!(event_name = "agent.llm.request_failed", error = %source, "llm request failed");
    LlmError::Transport(source)
}

async fn decode<T>(response: reqwest::Response) -> Result<T, LlmError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        error!(event_name = "agent.llm.rejected", status = %status, "llm provider rejected request");
        return Err(LlmError::Status(status));
    }
    debug!(event_name = "agent.llm.completed", status = %status, "llm completion received");
    response.json::<T>().await.map_err(|error| LlmError::Decode(error.to_string()))
}

fn non_empty(text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::EmptyCompletion)
    } else {
        Ok(text)
    }
}
