use super::{GenerationConfig, LlmError};
use crate::settings::ApiKey;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: ApiKey,
    pub base_url: String,
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

fn endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub async fn generate(
    config: &OpenAiConfig,
    prompt: &str,
    generation: &GenerationConfig,
) -> Result<String, LlmError> {
    let client = Client::new();

    let body = OpenAiRequest {
        model: generation.model.clone(),
        messages: vec![OpenAiMessage {
            role: "user".into(),
            content: Some(prompt.to_string()),
        }],
        temperature: generation.temperature,
        max_tokens: generation.max_output_tokens,
        stream: false,
    };

    let mut req = client
        .post(endpoint(&config.base_url))
        .header("Content-Type", "application/json")
        .json(&body);

    if !config.api_key.is_empty() {
        req = req.header("Authorization", format!("Bearer {}", config.api_key.expose()));
    }

    let resp = req.send().await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "failed to read error body");
            String::new()
        });
        tracing::warn!(status, "chat completion API error");
        return Err(LlmError::Api {
            status,
            message: text,
        });
    }

    let data: OpenAiResponse = resp
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))?;
    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse { reason: None })?;

    match choice.message.content {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(LlmError::EmptyResponse {
            reason: choice.finish_reason,
        }),
    }
}
