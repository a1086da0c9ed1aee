use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, BootstrapResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
            RegisterRequest, ResetPasswordRequest, TokenCheckResponse,
        },
        extractors::AuthUser,
        repo_types::Account,
        reset::{self, RESET_ACK},
        services::{self, BootstrapOutcome},
    },
    error::AppResult,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/verify-reset-token/:token", get(verify_reset_token))
        .route("/auth/reset-password", post(reset_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

pub fn ops_routes() -> Router<AppState> {
    Router::new().route("/init-admin", post(init_admin))
}

fn session(state: &AppState, user: Account) -> AppResult<Json<AuthResponse>> {
    let token = state.session.sign(&user)?;
    Ok(Json(AuthResponse { token, user }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = services::register(
        state.store.as_ref(),
        &payload.name,
        &payload.email,
        &payload.password,
    )
    .await?;
    session(&state, user)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = services::verify_login(state.store.as_ref(), &payload.email, &payload.password).await?;
    session(&state, user)
}

#[instrument(skip(state))]
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Account>> {
    Ok(Json(services::current_account(state.store.as_ref(), user.id).await?))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    reset::request_reset(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.config.reset,
        &payload.email,
    )
    .await?;
    Ok(Json(MessageResponse {
        message: RESET_ACK.into(),
    }))
}

#[instrument(skip(state, token))]
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<TokenCheckResponse>> {
    let email = reset::verify_reset_token(state.store.as_ref(), &token).await?;
    Ok(Json(TokenCheckResponse { valid: true, email }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    reset::complete_reset(state.store.as_ref(), &payload.token, &payload.new_password).await?;
    Ok(Json(MessageResponse {
        message: "Password has been reset".into(),
    }))
}

#[instrument(skip(state))]
pub async fn init_admin(State(state): State<AppState>) -> AppResult<Json<BootstrapResponse>> {
    let response = match services::bootstrap_admin(state.store.as_ref(), &state.config.admin).await? {
        BootstrapOutcome::Created {
            email,
            generated_password,
        } => BootstrapResponse {
            message: "Admin account created".into(),
            email: Some(email),
            password: generated_password,
        },
        BootstrapOutcome::AlreadyExists => BootstrapResponse {
            message: "An admin account already exists".into(),
            email: None,
            password: None,
        },
    };
    Ok(Json(response))
}
