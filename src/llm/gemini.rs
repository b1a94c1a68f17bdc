use super::{GenerationConfig, LlmError};
use crate::settings::ApiKey;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: ApiKey,
    pub base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Model names may be given with or without the `models/` prefix.
fn endpoint(base_url: &str, model: &str) -> String {
    let model = if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    };
    format!(
        "{}/v1beta/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn build_request(prompt: &str, config: &GenerationConfig) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".into()),
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
        generation_config: GeminiGenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        },
    }
}

fn extract_text(data: GenerateContentResponse) -> Result<String, LlmError> {
    let Some(candidate) = data.candidates.into_iter().next() else {
        let reason = data.prompt_feedback.and_then(|f| f.block_reason);
        return Err(LlmError::EmptyResponse { reason });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse {
            reason: candidate.finish_reason,
        });
    }
    Ok(text)
}

pub async fn generate(
    config: &GeminiConfig,
    prompt: &str,
    generation: &GenerationConfig,
) -> Result<String, LlmError> {
    let client = Client::new();
    let url = endpoint(&config.base_url, &generation.model);
    let body = build_request(prompt, generation);

    tracing::debug!(%url, temperature = generation.temperature, max_output_tokens = generation.max_output_tokens, "gemini request");

    let resp = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("x-goog-api-key", config.api_key.expose())
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "failed to read error body");
            String::new()
        });
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        tracing::warn!(status, %message, "gemini API error");
        return Err(LlmError::Api { status, message });
    }

    let data: GenerateContentResponse = resp
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))?;
    extract_text(data)
}
