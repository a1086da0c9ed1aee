use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{NewRecipe, Recipe, RecipeCounts, RecipeFilter, RecipeRow};
use crate::store::PgStore;

#[async_trait]
pub trait RecipeRepo: Send + Sync {
    async fn insert_recipe(&self, new: &NewRecipe) -> anyhow::Result<Recipe>;

    /// Recipes matching `filter`, newest first.
    async fn list_recipes(&self, filter: &RecipeFilter, limit: i64) -> anyhow::Result<Vec<Recipe>>;

    /// Returns `false` if no recipe has this id.
    async fn approve_recipe(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Returns `false` if no recipe has this id.
    async fn delete_recipe(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn recipe_counts(&self) -> anyhow::Result<RecipeCounts>;
}

/// `%needle%` with LIKE metacharacters escaped (escape char `\`).
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[async_trait]
impl RecipeRepo for PgStore {
    async fn insert_recipe(&self, new: &NewRecipe) -> anyhow::Result<Recipe> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            INSERT INTO recipes (id, title, ingredients, instructions, category,
                                 author_id, author_name, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, ingredients, instructions, category, author_id,
                      author_name, image, approved, average_rating, vote_count, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.ingredients)
        .bind(&new.instructions)
        .bind(new.category.label())
        .bind(new.author_id)
        .bind(&new.author_name)
        .bind(new.image.as_deref())
        .fetch_one(&self.pool)
        .await
        .context("insert recipe")?;
        row.try_into()
    }

    async fn list_recipes(&self, filter: &RecipeFilter, limit: i64) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, title, ingredients, instructions, category, author_id,
                   author_name, image, approved, average_rating, vote_count, created_at
              FROM recipes
             WHERE ($1::boolean IS NULL OR approved = $1)
               AND ($2::uuid IS NULL OR author_id = $2)
               AND ($3::text IS NULL OR category = $3)
               AND ($4::text IS NULL
                    OR title ILIKE $4 ESCAPE '\'
                    OR ingredients ILIKE $4 ESCAPE '\')
             ORDER BY created_at DESC
             LIMIT $5
            "#,
        )
        .bind(filter.approved)
        .bind(filter.author_id)
        .bind(filter.category.map(|c| c.label()))
        .bind(filter.search.as_deref().map(like_pattern))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("list recipes")?;
        rows.into_iter().map(Recipe::try_from).collect()
    }

    async fn approve_recipe(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"UPDATE recipes SET approved = TRUE WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("approve recipe")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_recipe(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM recipes WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete recipe")?;
        Ok(res.rows_affected() > 0)
    }

    async fn recipe_counts(&self) -> anyhow::Result<RecipeCounts> {
        let (total, approved, pending): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE approved),
                   COUNT(*) FILTER (WHERE NOT approved)
              FROM recipes
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("count recipes")?;
        Ok(RecipeCounts {
            total,
            approved,
            pending,
        })
    }
}
