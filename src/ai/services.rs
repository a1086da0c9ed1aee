use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::gemini::GeminiProvider;
use super::openai::OpenAiCompatibleProvider;
use super::parse::{parse_structured, StructuredRecipe};
use super::prompts;
use super::provider::{Prompt, TextProvider};
use crate::config::AiConfig;
use crate::error::{AppError, AppResult};

/// Result of a structured generation. A malformed answer still comes back,
/// with `recipe` unset and `error` explaining why.
#[derive(Debug, Serialize)]
pub struct StructuredOutcome {
    pub recipe: Option<StructuredRecipe>,
    pub raw_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ordered providers; the first one to answer wins.
pub struct SuggestionGateway {
    providers: Vec<Arc<dyn TextProvider>>,
    reply_language: String,
}

impl SuggestionGateway {
    pub fn new(providers: Vec<Arc<dyn TextProvider>>, reply_language: impl Into<String>) -> Self {
        Self {
            providers,
            reply_language: reply_language.into(),
        }
    }

    /// Gemini first when keyed, then the OpenAI-compatible fallback.
    pub fn from_config(cfg: &AiConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let mut providers: Vec<Arc<dyn TextProvider>> = Vec::new();
        if let Some(key) = &cfg.gemini_api_key {
            providers.push(Arc::new(GeminiProvider::new(key, &cfg.gemini_model, timeout)?));
        }
        if let Some(key) = &cfg.fallback_api_key {
            providers.push(Arc::new(OpenAiCompatibleProvider::new(
                key,
                &cfg.fallback_base_url,
                &cfg.fallback_model,
                timeout,
            )?));
        }
        let gateway = Self::new(providers, &cfg.reply_language);
        if !gateway.is_available() {
            warn!("no AI provider configured; AI endpoints will answer 503");
        }
        Ok(gateway)
    }

    pub fn is_available(&self) -> bool {
        !self.providers.is_empty()
    }

    pub async fn suggest(&self, ingredients: &str) -> AppResult<String> {
        let ingredients = required_ingredients(ingredients)?;
        self.generate(&prompts::suggestion(ingredients, &self.reply_language))
            .await
    }

    pub async fn generate_structured(&self, ingredients: &str) -> AppResult<StructuredOutcome> {
        let ingredients = required_ingredients(ingredients)?;
        let raw_response = self
            .generate(&prompts::structured(ingredients, &self.reply_language))
            .await?;

        Ok(match parse_structured(&raw_response) {
            Ok(recipe) => StructuredOutcome {
                recipe: Some(recipe),
                raw_response,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "structured answer did not parse");
                StructuredOutcome {
                    recipe: None,
                    raw_response,
                    error: Some(format!("Could not parse recipe: {e}")),
                }
            }
        })
    }

    async fn generate(&self, prompt: &Prompt) -> AppResult<String> {
        if self.providers.is_empty() {
            return Err(AppError::ServiceUnavailable);
        }

        let mut last_error = String::new();
        for provider in &self.providers {
            match provider.generate_text(prompt).await {
                Ok(text) => {
                    info!(provider = provider.name(), chars = text.len(), "ai answer received");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "ai provider failed");
                    last_error = format!("{}: {e}", provider.name());
                }
            }
        }
        Err(AppError::UpstreamFailure(last_error))
    }
}

fn required_ingredients(ingredients: &str) -> AppResult<&str> {
    let trimmed = ingredients.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("ingredients is required".into()));
    }
    Ok(trimmed)
}
