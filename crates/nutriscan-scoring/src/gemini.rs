//! Gemini `generateContent` REST client.
//!
//! Sends the rubric prompt with JSON output mode enabled and parses the first
//! candidate's text as `{"score": int, "comment": string}`.

use std::time::Duration;

use async_trait::async_trait;
use nutriscan_core::{AppConfig, NutritionRecord};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ScoringError;
use crate::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::scorer::{NutritionScore, NutritionScorer};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_USER_AGENT: &str = "nutriscan/0.1 (barcode-nutrition)";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Longest upstream error body kept in [`ScoringError::Upstream`].
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    score: i64,
    comment: String,
}

/// Scores records with a Gemini model.
///
/// Use [`GeminiScorer::new`] for production or
/// [`GeminiScorer::with_base_url`] to point at a mock server in tests.
pub struct GeminiScorer {
    client: Client,
    base_url: Url,
    model: String,
    api_key: String,
}

impl GeminiScorer {
    /// Creates a scorer against the public Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Http`] if the `reqwest::Client` cannot be
    /// built.
    pub fn new(api_key: &str, model: &str) -> Result<Self, ScoringError> {
        Self::with_base_url(
            api_key,
            model,
            DEFAULT_TIMEOUT_SECS,
            DEFAULT_USER_AGENT,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a scorer from the loaded application config.
    ///
    /// # Errors
    ///
    /// As [`GeminiScorer::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScoringError> {
        Self::with_base_url(
            &config.google_api_key,
            &config.scorer_model,
            config.scorer_timeout_secs,
            &config.user_agent,
            &config.scorer_base_url,
        )
    }

    /// # Errors
    ///
    /// Returns [`ScoringError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScoringError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScoringError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            model: model.to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    fn endpoint(&self) -> Result<Url, ScoringError> {
        self.base_url
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| ScoringError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl NutritionScorer for GeminiScorer {
    async fn score(&self, record: &NutritionRecord) -> Result<NutritionScore, ScoringError> {
        let prompt = build_prompt(record);
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };

        info!(model = %self.model, fields = record.len(), "requesting nutrition score");
        let response = self
            .client
            .post(self.endpoint()?)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "scoring service error");
            return Err(ScoringError::Upstream {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            ScoringError::MalformedOutput(format!("response is not a generateContent reply: {e}"))
        })?;

        let text = first_text(parsed)
            .ok_or_else(|| ScoringError::MalformedOutput("no candidate text in reply".into()))?;
        let score = parse_score(&text)?;
        debug!(score = score.score, "nutrition score received");
        Ok(score)
    }
}

fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|p| p.text)
}

/// Parses model output into a [`NutritionScore`], tolerating a fenced
/// ```` ```json ```` block around the object.
fn parse_score(text: &str) -> Result<NutritionScore, ScoringError> {
    let raw: RawScore = serde_json::from_str(strip_fence(text))
        .map_err(|e| ScoringError::MalformedOutput(format!("{e}: {text}")))?;

    let score = u8::try_from(raw.score)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or(ScoringError::ScoreOutOfRange(raw.score))?;

    Ok(NutritionScore {
        score,
        comment: raw.comment,
    })
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) up to the first newline.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
