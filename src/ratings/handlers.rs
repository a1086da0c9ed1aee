use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Number;
use tracing::instrument;

use super::repo::RatingSummary;
use super::services;
use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{AppJson, RecipeId},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub value: Number,
}

impl RateRequest {
    /// Fractional or oversized numbers are outside the rating scale too.
    fn rating(&self) -> AppResult<i32> {
        self.value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(services::out_of_range)
    }
}

pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/recipes/:id/rate", post(rate_recipe))
}

#[instrument(skip(state, payload))]
pub async fn rate_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    RecipeId(recipe_id): RecipeId,
    AppJson(payload): AppJson<RateRequest>,
) -> AppResult<Json<RatingSummary>> {
    let value = payload.rating()?;
    let summary = services::rate(state.store.as_ref(), recipe_id, user.id, value).await?;
    Ok(Json(summary))
}
