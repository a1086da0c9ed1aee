use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use super::services::{self, AdminStats};
use crate::{
    auth::extractors::AdminUser,
    error::AppResult,
    extract::RecipeId,
    recipes::{repo_types::Recipe, services as recipes},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct ModerationResponse {
    pub message: &'static str,
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/recipes", get(list_pending))
        .route("/admin/recipes/:id/approve", post(approve_recipe))
        .route("/admin/recipes/:id", delete(reject_recipe))
        .route("/admin/stats", get(stats))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn list_pending(
    State(state): State<AppState>,
    admin: AdminUser,
) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(recipes::list_pending(state.store.as_ref()).await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn approve_recipe(
    State(state): State<AppState>,
    admin: AdminUser,
    RecipeId(id): RecipeId,
) -> AppResult<Json<ModerationResponse>> {
    recipes::approve(state.store.as_ref(), id).await?;
    Ok(Json(ModerationResponse {
        message: "Recipe approved",
    }))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn reject_recipe(
    State(state): State<AppState>,
    admin: AdminUser,
    RecipeId(id): RecipeId,
) -> AppResult<Json<ModerationResponse>> {
    recipes::reject(state.store.as_ref(), id).await?;
    Ok(Json(ModerationResponse {
        message: "Recipe rejected and deleted",
    }))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn stats(State(state): State<AppState>, admin: AdminUser) -> AppResult<Json<AdminStats>> {
    Ok(Json(services::stats(state.store.as_ref()).await?))
}
