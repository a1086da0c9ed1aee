use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::PgStore;

/// Aggregate written back onto the recipe after every vote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, FromRow)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub vote_count: i32,
}

#[async_trait]
pub trait VoteRepo: Send + Sync {
    /// Upsert the voter's value and recompute the recipe's aggregate from all
    /// of its votes, as one atomic unit. Returns `None` when the recipe does
    /// not exist or is not approved; nothing is written in that case.
    async fn record_vote(
        &self,
        recipe_id: Uuid,
        voter_id: Uuid,
        value: i32,
    ) -> anyhow::Result<Option<RatingSummary>>;
}

#[async_trait]
impl VoteRepo for PgStore {
    async fn record_vote(
        &self,
        recipe_id: Uuid,
        voter_id: Uuid,
        value: i32,
    ) -> anyhow::Result<Option<RatingSummary>> {
        let mut tx = self.pool.begin().await.context("begin tx")?;

        // Locks the recipe row so concurrent votes recompute one after another.
        let locked: Option<Uuid> = sqlx::query_scalar(
            r#"SELECT id FROM recipes WHERE id = $1 AND approved = TRUE FOR UPDATE"#,
        )
        .bind(recipe_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock recipe")?;
        if locked.is_none() {
            tx.rollback().await.context("rollback tx")?;
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO votes (recipe_id, voter_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (recipe_id, voter_id)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(recipe_id)
        .bind(voter_id)
        .bind(value)
        .execute(&mut *tx)
        .await
        .context("upsert vote")?;

        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            UPDATE recipes r
               SET average_rating = s.average_rating,
                   vote_count = s.vote_count
              FROM (SELECT COALESCE(AVG(value), 0)::float8 AS average_rating,
                           COUNT(*)::int4 AS vote_count
                      FROM votes
                     WHERE recipe_id = $1) s
             WHERE r.id = $1
            RETURNING r.average_rating, r.vote_count
            "#,
        )
        .bind(recipe_id)
        .fetch_one(&mut *tx)
        .await
        .context("recompute rating")?;

        tx.commit().await.context("commit tx")?;
        Ok(Some(summary))
    }
}
