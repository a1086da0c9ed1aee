use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{jwt::SessionKeys, repo_types::Role};
use crate::error::AppError;

/// Caller identity taken from a verified `Authorization: Bearer` token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

/// Authenticated caller holding the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<SessionKeys>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = Arc::<SessionKeys>::from_ref(state).verify(token).map_err(|e| {
            warn!("invalid or expired session token");
            e
        })?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<SessionKeys>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(account_id = %user.id, "admin route refused");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Request};
    use time::OffsetDateTime;

    use super::*;
    use crate::auth::repo_types::Account;
    use crate::state::AppState;

    fn parts_with_session(state: &AppState, role: Role) -> (Uuid, Parts) {
        let account = Account {
            id: Uuid::new_v4(),
            name: "Root".into(),
            email: "root@x.com".into(),
            role,
            password_hash: String::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        let token = state.session.sign(&account).unwrap();
        let (parts, _) = Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts();
        (account.id, parts)
    }

    #[tokio::test]
    async fn admin_extractor_carries_the_caller() {
        let state = AppState::fake();
        let (id, mut parts) = parts_with_session(&state, Role::Admin);

        let AdminUser(admin) = AdminUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(admin.id, id);
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn client_is_refused_by_admin_extractor() {
        let state = AppState::fake();
        let (_, mut parts) = parts_with_session(&state, Role::Client);

        let err = AdminUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
