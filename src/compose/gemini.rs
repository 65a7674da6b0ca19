use crate::compose::instruction::InstructionPair;
use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Fixed sampling temperature for prompt refinement.
const SAMPLING_TEMPERATURE: f32 = 0.7;

/// Errors crossing the generation-service boundary. Callers are expected to
/// absorb these; nothing above the composer ever sees them.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to call the generation service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Seam between the composer and the hosted model, so tests can script replies.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        instructions: &InstructionPair,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, config: &Config) -> Result<Self> {
        let trimmed_endpoint = config.endpoint.trim_end_matches('/');
        let endpoint = Url::parse(&format!(
            "{}/{}:generateContent",
            trimmed_endpoint, config.model
        ))
        .with_context(|| format!("Invalid Gemini endpoint: {}", config.endpoint))?;

        let request_timeout = Duration::from_secs(config.request_timeout_secs.max(5));
        let client = Client::builder()
            .user_agent("promptwand-rs (gemini)")
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// False when no credential was supplied. The generator still accepts
    /// calls in that state; they fail at the service and the composer's
    /// deterministic fallback takes over.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn needs_refresh(current: &Config, new: &Config) -> bool {
        current.model != new.model
            || current.endpoint != new.endpoint
            || current.request_timeout_secs != new.request_timeout_secs
    }

    async fn send_once(&self, instructions: &InstructionPair) -> Result<String, GenerationError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let body = GenerateRequest {
            system_instruction: InstructionContent {
                parts: vec![TextPart {
                    text: &instructions.system,
                }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart {
                    text: &instructions.user,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: SAMPLING_TEMPERATURE,
            },
        };

        let response = self.client.post(url).json(&body).send().await?;

        if response.status().is_success() {
            let payload: GenerateResponse = response.json().await?;
            let text = extract_text(payload).unwrap_or_default();
            debug!(model = %self.model, chars = text.len(), "Gemini reply received");
            return Ok(text);
        }

        let status = response.status();
        let body = response
            .json::<GeminiErrorResponse>()
            .await
            .unwrap_or_default();
        let message = body
            .error
            .and_then(|err| err.message)
            .unwrap_or_else(|| format!("request failed with status {status}"));

        Err(GenerationError::Api { status, message })
    }
}

impl TextGenerator for GeminiGenerator {
    fn generate(
        &self,
        instructions: &InstructionPair,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        self.send_once(instructions)
    }
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| {
            candidate
                .content
                .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        })
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "systemInstruction")]
    system_instruction: InstructionContent<'a>,
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct InstructionContent<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct GeminiErrorResponse {
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_text(text: &str) -> GenerateResponse {
        GenerateResponse {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: vec![CandidatePart {
                        text: Some(text.to_string()),
                    }],
                }),
            }]),
        }
    }

    #[test]
    fn extracts_first_candidate_text() {
        assert_eq!(
            extract_text(response_with_text("A bear explores.")),
            Some("A bear explores.".to_string())
        );
    }

    #[test]
    fn missing_candidates_yield_none() {
        assert_eq!(extract_text(GenerateResponse::default()), None);
        let empty = GenerateResponse {
            candidates: Some(vec![Candidate { content: None }]),
        };
        assert_eq!(extract_text(empty), None);
    }

    #[test]
    fn request_body_uses_gemini_wire_names() {
        let body = GenerateRequest {
            system_instruction: InstructionContent {
                parts: vec![TextPart { text: "system" }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: "user" }],
            }],
            generation_config: GenerationConfig { temperature: 0.7 },
        };

        let json = serde_json::to_value(&body).expect("serializable request");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "system");
        assert_eq!(json["contents"][0]["role"], "user");
        let temperature = json["generationConfig"]["temperature"]
            .as_f64()
            .expect("temperature is a number");
        assert!((temperature - 0.7).abs() < 1e-6);
    }
}
