//! Password reset protocol.
//!
//! A reset request always acknowledges, so callers cannot probe which emails
//! are registered. Tokens live for `ResetConfig::token_ttl_minutes`, several
//! may be outstanding per account, and each is redeemable exactly once.

use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::notifier::ResetNotifier;
use super::password::{hash_password, random_url_token};
use super::repo_types::PasswordResetToken;
use crate::config::ResetConfig;
use crate::error::{AppError, AppResult};
use crate::store::Store;

pub const RESET_ACK: &str = "If this email is registered, a reset link has been sent";

pub async fn request_reset(
    store: &dyn Store,
    notifier: &dyn ResetNotifier,
    cfg: &ResetConfig,
    email: &str,
) -> AppResult<()> {
    let email = email.trim();
    let Some(account) = store.find_account_by_email(email).await? else {
        debug!("reset requested for unknown email");
        return Ok(());
    };

    let now = OffsetDateTime::now_utc();
    let token = PasswordResetToken {
        id: Uuid::new_v4(),
        account_id: account.id,
        email: account.email.clone(),
        token: random_url_token(),
        expires_at: now + Duration::minutes(cfg.token_ttl_minutes),
        used: false,
        created_at: now,
    };
    store.insert_reset_token(&token).await?;

    if let Err(e) = notifier.send_reset_link(&token.email, &token.token).await {
        error!(error = %e, account_id = %account.id, "reset notification failed");
    }

    info!(account_id = %account.id, "password reset token issued");
    Ok(())
}

/// Email of the account a redeemable token belongs to.
pub async fn verify_reset_token(store: &dyn Store, token: &str) -> AppResult<String> {
    store
        .find_redeemable_token(token, OffsetDateTime::now_utc())
        .await?
        .map(|t| t.email)
        .ok_or(AppError::InvalidOrExpiredToken)
}

pub async fn complete_reset(store: &dyn Store, token: &str, new_password: &str) -> AppResult<()> {
    if new_password.is_empty() {
        return Err(AppError::Validation("New password is required".into()));
    }

    let hash = hash_password(new_password)?;
    if !store
        .redeem_reset_token(token, &hash, OffsetDateTime::now_utc())
        .await?
    {
        warn!("reset attempted with unusable token");
        return Err(AppError::InvalidOrExpiredToken);
    }

    info!("password reset completed");
    Ok(())
}
