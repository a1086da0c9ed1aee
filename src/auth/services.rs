use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::password::{hash_password, random_url_token, verify_password};
use super::repo_types::{Account, NewAccount, Role};
use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::store::Store;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub async fn register(
    store: &dyn Store,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<Account> {
    let name = name.trim();
    let email = email.trim();

    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }

    if store.find_account_by_email(email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let new = NewAccount {
        name: name.to_string(),
        email: email.to_string(),
        role: Role::Client,
        password_hash: hash_password(password)?,
    };
    // A concurrent registration can still win the race; the insert is conditional.
    let account = store
        .insert_account(new)
        .await?
        .ok_or_else(|| AppError::Conflict("Email already registered".into()))?;

    info!(account_id = %account.id, email = %account.email, "account registered");
    Ok(account)
}

pub async fn verify_login(store: &dyn Store, email: &str, password: &str) -> AppResult<Account> {
    let email = email.trim();
    let account = store
        .find_account_by_email(email)
        .await?
        .ok_or_else(|| {
            warn!(%email, "login unknown email");
            AppError::NotFound("Account not found".into())
        })?;

    if !verify_password(password, &account.password_hash)? {
        warn!(account_id = %account.id, "login invalid password");
        return Err(AppError::InvalidCredential);
    }

    info!(account_id = %account.id, "account logged in");
    Ok(account)
}

/// Load the account behind a verified session.
pub async fn current_account(store: &dyn Store, account_id: Uuid) -> AppResult<Account> {
    store
        .find_account_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".into()))
}

#[derive(Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created {
        email: String,
        /// Only set when no password was configured and one had to be generated.
        generated_password: Option<String>,
    },
    AlreadyExists,
}

pub async fn bootstrap_admin(store: &dyn Store, cfg: &AdminConfig) -> AppResult<BootstrapOutcome> {
    if store.admin_exists().await? {
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    let (password, generated) = match &cfg.password {
        Some(p) => (p.clone(), false),
        None => {
            let p = random_url_token();
            (p, true)
        }
    };

    let new = NewAccount {
        name: cfg.name.clone(),
        email: cfg.email.clone(),
        role: Role::Admin,
        password_hash: hash_password(&password)?,
    };
    let Some(admin) = store.insert_account(new).await? else {
        // Lost a race with another bootstrap, or the address belongs to a client.
        if store.admin_exists().await? {
            return Ok(BootstrapOutcome::AlreadyExists);
        }
        return Err(AppError::Conflict(format!(
            "{} is already registered as a client account",
            cfg.email
        )));
    };

    info!(account_id = %admin.id, email = %admin.email, "admin account created");
    Ok(BootstrapOutcome::Created {
        email: admin.email,
        generated_password: generated.then_some(password),
    })
}
