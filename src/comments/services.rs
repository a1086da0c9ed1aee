use tracing::info;
use uuid::Uuid;

use super::repo::{Comment, NewComment};
use crate::auth::repo_types::Account;
use crate::error::{AppError, AppResult};
use crate::store::{Store, MAX_LIST};

/// Append a comment to a recipe that is approved at call time.
pub async fn add(store: &dyn Store, recipe_id: Uuid, author: &Account, text: &str) -> AppResult<Comment> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Comment text is required".into()));
    }

    let comment = store
        .insert_comment_if_approved(&NewComment {
            recipe_id,
            author_id: author.id,
            author_name: author.name.clone(),
            text: text.to_string(),
        })
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))?;

    info!(comment_id = %comment.id, %recipe_id, author_id = %author.id, "comment added");
    Ok(comment)
}

/// Thread of a recipe, newest first. Stays readable whatever the recipe's
/// current moderation state.
pub async fn list(store: &dyn Store, recipe_id: Uuid) -> AppResult<Vec<Comment>> {
    Ok(store.list_comments(recipe_id, MAX_LIST).await?)
}
