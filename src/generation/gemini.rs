//! Blocking client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::CollaboratorError;
use crate::generation::collaborator::{CollaboratorOutcome, GenerationCollaborator};
use crate::generation::request::{GenerationRequest, ImagePayload};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataOut<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataOut<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineDataIn>,
}

#[derive(Deserialize)]
struct InlineDataIn {
    #[serde(rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

/// Gemini image model reached over HTTPS with an API key.
pub struct GeminiClient {
    http: HttpClient,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CollaboratorError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            model: model.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, CollaboratorError> {
        Self::new(
            settings.api_base.clone(),
            settings.model.clone(),
            settings.api_key.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        let trimmed = self.model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!(
            "{}/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            model_path
        )
    }
}

fn build_body(request: &GenerationRequest) -> GenerateContentBody<'_> {
    let mut parts: Vec<RequestPart<'_>> = request
        .parts()
        .iter()
        .map(|payload| RequestPart::Image {
            inline_data: InlineDataOut {
                mime_type: &payload.mime_type,
                data: payload.to_base64(),
            },
        })
        .collect();
    parts.push(RequestPart::Text {
        text: request.prompt(),
    });
    GenerateContentBody {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE"],
        },
    }
}

/// First inline image of the first candidate, if any.
fn extract_image(body: &str) -> CollaboratorOutcome {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|err| CollaboratorError::Decode(err.to_string()))?;

    let Some(content) = response.candidates.into_iter().next().and_then(|c| c.content) else {
        return Ok(None);
    };
    for part in content.parts {
        let Some(inline) = part.inline_data else {
            continue;
        };
        if inline.data.is_empty() {
            continue;
        }
        let mime = inline.mime_type.unwrap_or_else(|| "image/png".to_string());
        let payload = ImagePayload::from_base64(mime, &inline.data)
            .map_err(|err| CollaboratorError::Decode(format!("image base64: {err}")))?;
        return Ok(Some(payload));
    }
    Ok(None)
}

impl GenerationCollaborator for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn generate(&self, request: &GenerationRequest) -> CollaboratorOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CollaboratorError::MissingApiKey);
        };
        let endpoint = self.endpoint();
        let body = build_body(request);

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            log::error!("{endpoint} returned {status}");
            return Err(CollaboratorError::Service {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }

        let outcome = extract_image(&text);
        if matches!(outcome, Ok(None)) {
            log::warn!("{} answered without an inline image", self.model);
        }
        outcome
    }
}
