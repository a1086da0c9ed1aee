use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{CategoriesResponse, RecipeQuery};
use super::repo_types::{Category, Recipe};
use super::services::{self, RecipeSubmission};
use crate::{
    auth::{extractors::AuthUser, services::current_account},
    error::{AppError, AppResult},
    extract::AppQuery,
    images::services::UploadItem,
    state::AppState,
};

/// Upper bound on a multipart submission, image included.
pub const SUBMISSION_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_public))
        .route("/recipes/mine", get(list_mine))
        .route("/recipes/categories", get(list_categories))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", post(submit_recipe))
        .layer(DefaultBodyLimit::max(SUBMISSION_BODY_LIMIT))
}

#[instrument(skip(state))]
pub async fn list_public(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<RecipeQuery>,
) -> AppResult<Json<Vec<Recipe>>> {
    let recipes = services::list_public(
        state.store.as_ref(),
        q.category.as_deref(),
        q.search.as_deref(),
    )
    .await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn list_mine(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(services::list_mine(state.store.as_ref(), user.id).await?))
}

pub async fn list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: Category::ALL.iter().map(|c| c.label()).collect(),
    })
}

/// POST /recipes (multipart)
/// Text fields: title, ingredients, instructions, category. Optional file field: image.
#[instrument(skip(state, mp))]
pub async fn submit_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    mut mp: Multipart,
) -> AppResult<(StatusCode, Json<Recipe>)> {
    let author = current_account(state.store.as_ref(), user.id).await?;

    let mut input = RecipeSubmission {
        title: String::new(),
        ingredients: String::new(),
        instructions: String::new(),
        category: String::new(),
        image: None,
    };

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read image: {e}")))?;
                if !body.is_empty() {
                    input.image = Some(UploadItem { body, content_type });
                }
            }
            "title" | "ingredients" | "instructions" | "category" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read {name}: {e}")))?;
                match name.as_str() {
                    "title" => input.title = value,
                    "ingredients" => input.ingredients = value,
                    "instructions" => input.instructions = value,
                    _ => input.category = value,
                }
            }
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let recipe = services::submit(state.store.as_ref(), state.media.clone(), &author, input).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}
