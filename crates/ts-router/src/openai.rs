//! Adapter for OpenAI-compatible `/chat/completions` endpoints.

use crate::adapter::{AdapterResponse, ProviderAdapter};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

pub struct OpenAiCompatAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatAdapter {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("therapysync-router/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Reads `<PROVIDER>_API_KEY` and optional `<PROVIDER>_BASE_URL`.
    pub fn from_env(provider: &str) -> Result<Self> {
        let prefix = provider.to_uppercase().replace('-', "_");
        let key = std::env::var(format!("{prefix}_API_KEY"))
            .with_context(|| format!("{prefix}_API_KEY is not set"))?;
        let url = std::env::var(format!("{prefix}_BASE_URL")).unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string());
        Self::new(&url, key)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatAdapter {
    async fn invoke(
        &self,
        model_id: &str,
        message: &str,
        system_prompt: Option<&str>,
        timeout: Duration,
    ) -> Result<AdapterResponse> {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = system_prompt {
            messages.push(ChatMessage { role: "system", content: prompt });
        }
        messages.push(ChatMessage { role: "user", content: message });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&ChatRequest { model: model_id, messages })
            .send()
            .await
            .with_context(|| format!("Failed to reach provider for {model_id}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            bail!("Provider returned {status} for {model_id}: {snippet}");
        }

        let body: ChatResponse = response.json().await.context("Failed to parse chat completion")?;
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Chat completion had no content")?;
        let tokens_used = body.usage.map(|u| u.total_tokens).unwrap_or(0);
        Ok(AdapterResponse { text, tokens_used })
    }
}
