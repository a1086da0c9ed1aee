use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{IngredientsRequest, SuggestionResponse};
use super::services::StructuredOutcome;
use crate::{error::AppResult, extract::AppJson, state::AppState};

pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/ai/suggestions", post(suggest))
        .route("/ai/generate-recipe", post(generate_recipe))
}

#[instrument(skip(state, payload))]
pub async fn suggest(
    State(state): State<AppState>,
    AppJson(payload): AppJson<IngredientsRequest>,
) -> AppResult<Json<SuggestionResponse>> {
    let suggestion = state.ai.suggest(&payload.ingredients).await?;
    Ok(Json(SuggestionResponse { suggestion }))
}

#[instrument(skip(state, payload))]
pub async fn generate_recipe(
    State(state): State<AppState>,
    AppJson(payload): AppJson<IngredientsRequest>,
) -> AppResult<Json<StructuredOutcome>> {
    Ok(Json(state.ai.generate_structured(&payload.ingredients).await?))
}
