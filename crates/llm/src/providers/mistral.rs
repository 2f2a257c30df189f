use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, SamplingParams};

/// Mistral served through an Ollama-compatible `/generate` endpoint.
pub struct MistralProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl MistralProvider {
    pub fn new(client: reqwest::Client, url: String, model: String) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for MistralProvider {
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<String, LlmError> {
        let url = format!("{}/generate", self.url);

        let mut body = json!({
            "model": self.model,
            "prompt": prompt,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "stream": false,
        });
        if let Some(top_p) = params.top_p {
            body["top_p"] = json!(top_p);
        }

        debug!("Mistral request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["response"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing response".into()))?
            .to_string();

        Ok(content)
    }
}
