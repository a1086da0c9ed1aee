use async_trait::async_trait;
use tracing::info;

/// Delivers password reset links to account holders.
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn send_reset_link(&self, email: &str, token: &str) -> anyhow::Result<()>;
}

/// Writes the reset link to the service log instead of mailing it.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    frontend_url: String,
}

impl LogNotifier {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into(),
        }
    }

    pub fn reset_url(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn send_reset_link(&self, email: &str, token: &str) -> anyhow::Result<()> {
        info!(%email, reset_url = %self.reset_url(token), "password reset link issued");
        Ok(())
    }
}
