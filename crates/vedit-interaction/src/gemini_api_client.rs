//! GeminiApiClient - Direct REST API implementation of the remote edit service.
//!
//! Refinement goes to a text model, editing to an image model; both use the
//! `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vedit_core::config::{DEFAULT_EDIT_MODEL, DEFAULT_REFINE_MODEL, ModelConfig};
use vedit_core::edit::NO_IMAGE_GENERATED;
use vedit_core::{InlineImage, RemoteEditClient, Result, VeditError};

use crate::prompts::{REFINE_SYSTEM_INSTRUCTION, render_refine_prompt};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Remote edit client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    refine_model: String,
    edit_model: String,
    base_url: String,
}

impl GeminiApiClient {
    /// Creates a client with the default refine and edit models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            refine_model: DEFAULT_REFINE_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides both models after construction.
    pub fn with_models(mut self, models: &ModelConfig) -> Self {
        self.refine_model = models.refine.clone();
        self.edit_model = models.edit.clone();
        self
    }

    /// Points the client at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the underlying HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn refine_model(&self) -> &str {
        &self.refine_model
    }

    pub fn edit_model(&self) -> &str {
        &self.edit_model
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/{model}:generateContent", self.base_url);
        debug!(%model, "sending Gemini generateContent request");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| VeditError::Http {
                status: 0,
                message: format!("Gemini API request failed: {err}"),
                retry_after_secs: None,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            let err = map_http_error(status, body_text, retry_after);
            if err.is_retryable() {
                warn!(%model, status = status.as_u16(), ?retry_after, "Gemini API temporarily unavailable");
            }
            return Err(err);
        }

        response
            .json()
            .await
            .map_err(|err| VeditError::internal(format!("Failed to parse Gemini response: {err}")))
    }
}

#[async_trait]
impl RemoteEditClient for GeminiApiClient {
    async fn refine(&self, instruction: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::Text {
                text: render_refine_prompt(instruction)?,
            }])],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text {
                    text: REFINE_SYSTEM_INSTRUCTION.to_string(),
                }],
            }),
            generation_config: None,
        };

        let response = self
            .send_request(&self.refine_model, &request)
            .await
            .map_err(|err| VeditError::refinement(err.to_string()))?;
        extract_text_response(response)
    }

    async fn edit(&self, image: &InlineImage, instruction: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::InlineData {
                    inline_data: image.clone(),
                },
                Part::Text {
                    text: instruction.to_string(),
                },
            ])],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            }),
        };

        let response = self
            .send_request(&self.edit_model, &request)
            .await
            .map_err(|err| match err {
                VeditError::Http { .. } => VeditError::edit_failed(err.to_string()),
                other => other,
            })?;
        extract_image_response(response)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineImage,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
struct InlineDataResponse {
    data: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn first_candidate_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

/// Concatenated text of the first candidate, trimmed.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text: String = first_candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(VeditError::refinement(
            "Gemini API returned no text in the response candidates",
        ));
    }
    Ok(text.to_string())
}

/// Base64 payload of the first inline image in the first candidate.
fn extract_image_response(response: GenerateContentResponse) -> Result<String> {
    first_candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.inline_data)
        .filter_map(|inline| inline.data)
        .find(|data| !data.is_empty())
        .ok_or_else(|| VeditError::edit_failed(NO_IMAGE_GENERATED))
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> VeditError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    VeditError::Http {
        status: status.as_u16(),
        message,
        retry_after_secs: retry_after.map(|delay| delay.as_secs()),
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are ignored
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
