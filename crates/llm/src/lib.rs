pub mod mock;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client as Http;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// The text-generation collaborator: one prompt in, one completion out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    Groq,
    /// Local Ollama server through its OpenAI-compatible endpoint.
    Ollama,
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "ollama" => Ok(Provider::Ollama),
            other => Err(anyhow!("unknown provider: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    http: Http,
    provider: Provider,
    api_key: Option<String>,
    model: String,
    base_url: String, // provider-specific defaulted
    temperature: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { System, User, Assistant }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Clone, Debug, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    /// If true, request JSON-only output (`json_object`) when provider supports it.
    pub json_object: bool,
}

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";
const GROQ_URL: &str = "https://api.groq.com/openai/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

impl Client {
    pub fn new(provider: Provider, api_key: Option<String>, model: String) -> Result<Self> {
        let base_url = match provider {
            Provider::Groq => GROQ_URL.to_string(),
            Provider::Ollama => DEFAULT_OLLAMA_URL.to_string(),
        };
        if provider == Provider::Groq && api_key.is_none() {
            return Err(anyhow!("groq requires an api key"));
        }
        Ok(Self {
            http: Http::builder()
                .pool_max_idle_per_host(8)
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            provider, api_key, model, base_url,
            temperature: 0.0,
        })
    }

    /// Convenience: pick up GROQ_API_KEY from env for Groq.
    pub fn from_env_groq(model: &str) -> Result<Self> {
        let key = std::env::var("GROQ_API_KEY").context("GROQ_API_KEY not set")?;
        Self::new(Provider::Groq, Some(key), model.to_string())
    }

    /// Local Ollama; honours OLLAMA_BASE_URL when set.
    pub fn from_env_ollama(model: &str) -> Result<Self> {
        let client = Self::new(Provider::Ollama, None, model.to_string())?;
        Ok(match std::env::var("OLLAMA_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(url),
            _ => client,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Default sampling temperature for `simple` and `generate`.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn provider(&self) -> &Provider { &self.provider }

    pub fn model(&self) -> &str { &self.model }

    pub async fn chat(&self, messages: &[ChatMessage], opts: ChatOptions) -> Result<String> {
        // Both providers speak OpenAI-compatible Chat Completions
        let url = format!("{}/chat/completions", self.base_url);

        let msgs: Vec<Value> = messages.iter().map(|m| {
            let role = match m.role { Role::System=>"system", Role::User=>"user", Role::Assistant=>"assistant" };
            json!({ "role": role, "content": m.content })
        }).collect();

        let mut body = json!({
            "model": self.model,
            "messages": msgs,
            "temperature": opts.temperature.unwrap_or(self.temperature)
        });
        if opts.json_object {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("response_format".into(), json!({ "type": "json_object" }));
            }
        }

        let mut req = self.http.post(url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.context("request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("{:?} {}: {}", self.provider, resp.status(), resp.text().await.unwrap_or_default()));
        }

        let v: Value = resp.json().await.context("invalid json")?;
        let content = v.pointer("/choices/0/message/content")
            .and_then(|x| x.as_str())
            .ok_or_else(|| anyhow!("missing choices[0].message.content"))?;
        tracing::debug!(model = %self.model, chars = content.len(), "chat completion received");
        Ok(content.to_string())
    }

    /// Simple helper for one-shot prompts.
    pub async fn simple(&self, prompt: &str) -> Result<String> {
        let msgs = vec![ChatMessage{ role: Role::User, content: prompt.to_string() }];
        self.chat(&msgs, ChatOptions::default()).await
    }
}

#[async_trait]
impl TextGenerator for Client {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let out = self.simple(prompt).await?;
        let out = out.trim();
        if out.is_empty() {
            return Err(anyhow!("empty completion from {}", self.model));
        }
        Ok(out.to_string())
    }
}
