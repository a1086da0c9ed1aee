use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::PgStore;

/// Immutable comment on a recipe.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub recipe_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub text: String,
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Append a comment if the recipe exists and is approved right now.
    async fn insert_comment_if_approved(&self, new: &NewComment) -> anyhow::Result<Option<Comment>>;

    /// Comments of a recipe, newest first. No approval check.
    async fn list_comments(&self, recipe_id: Uuid, limit: i64) -> anyhow::Result<Vec<Comment>>;
}

#[async_trait]
impl CommentRepo for PgStore {
    async fn insert_comment_if_approved(&self, new: &NewComment) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, recipe_id, author_id, author_name, text)
            SELECT $1::uuid, $2::uuid, $3::uuid, $4::text, $5::text
             WHERE EXISTS (SELECT 1 FROM recipes WHERE id = $2 AND approved = TRUE)
            RETURNING id, recipe_id, author_id, author_name, text, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.recipe_id)
        .bind(new.author_id)
        .bind(&new.author_name)
        .bind(&new.text)
        .fetch_optional(&self.pool)
        .await
        .context("insert comment")?;
        Ok(row)
    }

    async fn list_comments(&self, recipe_id: Uuid, limit: i64) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, recipe_id, author_id, author_name, text, created_at
              FROM comments
             WHERE recipe_id = $1
             ORDER BY created_at DESC
             LIMIT $2
            "#,
        )
        .bind(recipe_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("list comments")?;
        Ok(rows)
    }
}
