use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role carried in the session token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Account row as stored in the database.
#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Registered account.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<AccountRow> for Account {
    type Error = anyhow::Error;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            email: r.email,
            role: r.role.parse()?,
            password_hash: r.password_hash,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Single-use password reset token.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub account_id: Uuid,
    pub email: String,
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub used: bool,
    pub created_at: OffsetDateTime,
}

impl PasswordResetToken {
    pub fn is_redeemable(&self, now: OffsetDateTime) -> bool {
        !self.used && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn role_round_trips_through_its_label() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Client.to_string(), "client");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn account_json_hides_password_hash() {
        let account = Account {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "a@x.com".into(),
            role: Role::Client,
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(json.contains("\"role\":\"client\""));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn used_or_expired_tokens_are_not_redeemable() {
        let now = OffsetDateTime::now_utc();
        let mut token = PasswordResetToken {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            email: "a@x.com".into(),
            token: "t".into(),
            expires_at: now + Duration::hours(1),
            used: false,
            created_at: now,
        };
        assert!(token.is_redeemable(now));

        token.used = true;
        assert!(!token.is_redeemable(now));

        token.used = false;
        token.expires_at = now - Duration::seconds(1);
        assert!(!token.is_redeemable(now));
    }
}
