use anyhow::{anyhow, Context};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::app_config::ModelConfig;
use crate::error::{AppError, AppResult};
use crate::prompt::{extraction_prompt, ExtractionModel};
use crate::HttpClient;

const AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
pub struct GenerateApiResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: CandidateContent,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateApiError {
    pub error: GenerateApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct GenerateApiErrorDetail {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GenerateApiResponseOrError {
    Response(GenerateApiResponse),
    Error(GenerateApiError),
}

pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    model_id: String,
    temperature: f64,
}

impl GeminiClient {
    pub fn new(http_client: HttpClient, cfg: &ModelConfig) -> GeminiClient {
        GeminiClient {
            http_client,
            api_key: cfg.api_key.clone(),
            model_id: cfg.id.clone(),
            temperature: cfg.temperature,
        }
    }
}

impl ExtractionModel for GeminiClient {
    async fn generate(&self, canonical_text: &str, page_images: &[Vec<u8>]) -> AppResult<String> {
        let mut parts = vec![json!({ "text": extraction_prompt(canonical_text) })];
        for png in page_images {
            parts.push(json!({
                "inlineData": {
                    "mimeType": "image/png",
                    "data": STANDARD.encode(png),
                }
            }));
        }

        let url = format!("{}/{}:generateContent", AI_ENDPOINT, self.model_id);
        let resp = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": parts }],
                "generationConfig": { "temperature": self.temperature }
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| {
                if let Some(status) = e.status() {
                    match status {
                        StatusCode::BAD_REQUEST => AppError::BadRequest(e.to_string()),
                        StatusCode::REQUEST_TIMEOUT => AppError::RequestTimeout,
                        StatusCode::TOO_MANY_REQUESTS => AppError::TooManyRequests,
                        _ => AppError::Internal(e.into()),
                    }
                } else {
                    AppError::Internal(e.into())
                }
            })?;

        let parsed = serde_json::from_value::<GenerateApiResponseOrError>(resp.clone())
            .context(format!("Could not parse model response: {}", resp))?;

        let parsed = match parsed {
            GenerateApiResponseOrError::Error(error) => {
                return Err(anyhow!("Model API error: {:?}", error.error).into());
            }
            GenerateApiResponseOrError::Response(parsed) => parsed,
        };

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .context("No candidates in model response")?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(anyhow!(
                "Model candidate carried no text (finish reason: {:?})",
                candidate.finish_reason
            )
            .into());
        }

        Ok(text)
    }
}
