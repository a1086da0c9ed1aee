//! Google Gemini `generateContent` client.

use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::provider::{Prompt, TextProvider};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    system_instruction: GeminiContent<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build gemini http client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn request<'a>(prompt: &'a Prompt) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![RequestPart { text: &prompt.user }],
            }],
            system_instruction: GeminiContent {
                role: None,
                parts: vec![RequestPart { text: &prompt.system }],
            },
        }
    }

    /// Concatenated text parts of the first candidate.
    fn extract_text(response: GeminiResponse) -> anyhow::Result<String> {
        if let Some(err) = response.error {
            bail!("gemini api error: {}", err.message);
        }
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| anyhow!("gemini returned no candidates"))?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() {
            bail!("gemini returned an empty answer");
        }
        Ok(text)
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_text(&self, prompt: &Prompt) -> anyhow::Result<String> {
        debug!("sending request to gemini");
        let response = self
            .client
            .post(self.url())
            .json(&Self::request(prompt))
            .send()
            .await
            .context("gemini request failed")?;

        let status = response.status();
        let body = response.text().await.context("read gemini response")?;
        if !status.is_success() {
            error!(%status, "gemini api error");
            bail!("gemini returned {status}");
        }

        let parsed: GeminiResponse =
            serde_json::from_str(&body).context("parse gemini response")?;
        Self::extract_text(parsed)
    }
}
