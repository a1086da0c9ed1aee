//! OpenAI-compatible `chat/completions` client, used as the fallback provider.

use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::provider::{Prompt, TextProvider};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiCompatibleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build openai-compatible http client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    fn request<'a>(&'a self, prompt: &'a Prompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            stream: false,
        }
    }

    fn extract_text(response: ChatResponse) -> anyhow::Result<String> {
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("api returned no choices"))?
            .message
            .content
            .unwrap_or_default();
        if content.trim().is_empty() {
            bail!("api returned an empty answer");
        }
        Ok(content)
    }
}

#[async_trait]
impl TextProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_text(&self, prompt: &Prompt) -> anyhow::Result<String> {
        debug!(base_url = %self.base_url, "sending chat completion");
        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        let body = response.text().await.context("read chat completion response")?;
        if !status.is_success() {
            error!(%status, "chat completion api error");
            bail!("chat completion returned {status}");
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).context("parse chat completion response")?;
        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new("k", base_url, "gpt-4o-mini", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn api_url_tolerates_trailing_slash() {
        assert_eq!(
            provider("https://api.openai.com/v1/").api_url("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            provider("http://localhost:11434/v1").api_url("chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn request_sends_system_then_user() {
        let p = provider("http://x");
        let prompt = Prompt {
            system: "chef".into(),
            user: "eggs".into(),
        };
        let v = serde_json::to_value(p.request(&prompt)).unwrap();
        assert_eq!(v["model"], "gpt-4o-mini");
        assert_eq!(v["stream"], false);
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "eggs");
    }

    #[test]
    fn first_choice_content_is_returned() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Quiche"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(OpenAiCompatibleProvider::extract_text(parsed).unwrap(), "Quiche");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(OpenAiCompatibleProvider::extract_text(empty).is_err());
    }
}
