use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::repo::Comment;
use super::services;
use crate::{
    auth::{extractors::AuthUser, services::current_account},
    error::AppResult,
    extract::{AppJson, RecipeId},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

pub fn comment_routes() -> Router<AppState> {
    Router::new().route("/recipes/:id/comments", get(list_comments).post(add_comment))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    RecipeId(recipe_id): RecipeId,
    AppJson(payload): AppJson<CommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let author = current_account(state.store.as_ref(), user.id).await?;
    let comment = services::add(state.store.as_ref(), recipe_id, &author, &payload.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    RecipeId(recipe_id): RecipeId,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(services::list(state.store.as_ref(), recipe_id).await?))
}
