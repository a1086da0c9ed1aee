use async_trait::async_trait;

/// One request to a text model: a system instruction and the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// A remote text-generation backend.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn generate_text(&self, prompt: &Prompt) -> anyhow::Result<String>;
}
