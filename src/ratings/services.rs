use std::ops::RangeInclusive;

use tracing::info;
use uuid::Uuid;

use super::repo::RatingSummary;
use crate::error::{AppError, AppResult};
use crate::store::Store;

pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;

pub fn out_of_range() -> AppError {
    AppError::InvalidRange(format!(
        "Rating must be between {} and {}",
        RATING_RANGE.start(),
        RATING_RANGE.end()
    ))
}

/// Record `voter_id`'s rating of an approved recipe, replacing any earlier
/// rating by the same voter, and return the recomputed aggregate.
pub async fn rate(
    store: &dyn Store,
    recipe_id: Uuid,
    voter_id: Uuid,
    value: i32,
) -> AppResult<RatingSummary> {
    if !RATING_RANGE.contains(&value) {
        return Err(out_of_range());
    }

    let summary = store
        .record_vote(recipe_id, voter_id, value)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))?;

    info!(
        %recipe_id,
        %voter_id,
        average = summary.average_rating,
        votes = summary.vote_count,
        "rating recorded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::register;
    use crate::recipes::services::tests::{approved_recipe, media, submission};
    use crate::recipes::services::{list_public, submit};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn two_voters_then_a_revote() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let bob = register(&store, "Bob", "b@x.com", "Pw1!").await.unwrap();
        let recipe = approved_recipe(&store, &alice, "Tarte").await;

        rate(&store, recipe.id, alice.id, 5).await.unwrap();
        let s = rate(&store, recipe.id, bob.id, 3).await.unwrap();
        assert_eq!(s, RatingSummary { average_rating: 4.0, vote_count: 2 });

        let s = rate(&store, recipe.id, alice.id, 1).await.unwrap();
        assert_eq!(s, RatingSummary { average_rating: 2.0, vote_count: 2 });
        assert_eq!(store.vote_rows(recipe.id), 2);

        let listed = list_public(&store, None, None).await.unwrap();
        assert_eq!(listed[0].average_rating, 2.0);
        assert_eq!(listed[0].vote_count, 2);
    }

    #[tokio::test]
    async fn aggregate_tracks_every_vote_sequence() {
        let store = MemoryStore::new();
        let author = register(&store, "Author", "author@x.com", "pw").await.unwrap();
        let recipe = approved_recipe(&store, &author, "Gratin").await;

        let voters: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let sequence = [(0, 4), (1, 2), (0, 5), (2, 1), (3, 3), (1, 5), (2, 2)];
        let mut latest = std::collections::HashMap::new();
        for (voter, value) in sequence {
            latest.insert(voter, value);
            let s = rate(&store, recipe.id, voters[voter], value).await.unwrap();

            let expected_mean =
                latest.values().map(|v| f64::from(*v)).sum::<f64>() / latest.len() as f64;
            assert_eq!(s.vote_count as usize, latest.len());
            assert!((s.average_rating - expected_mean).abs() < 1e-9);
            assert_eq!(store.vote_rows(recipe.id), latest.len());
        }
    }

    #[tokio::test]
    async fn out_of_range_is_rejected_before_any_write() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let recipe = approved_recipe(&store, &alice, "Tarte").await;

        for bad in [0, 6, -1, i32::MAX] {
            let err = rate(&store, recipe.id, alice.id, bad).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidRange(_)));
        }
        // Range is checked even when the recipe does not exist.
        assert!(matches!(
            rate(&store, Uuid::new_v4(), alice.id, 9).await,
            Err(AppError::InvalidRange(_))
        ));
        assert_eq!(store.vote_rows(recipe.id), 0);
    }

    #[tokio::test]
    async fn pending_or_missing_recipes_cannot_be_rated() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let pending = submit(&store, media(), &alice, submission("T", "x", "Dessert"))
            .await
            .unwrap();

        assert!(matches!(
            rate(&store, pending.id, alice.id, 4).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            rate(&store, Uuid::new_v4(), alice.id, 4).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.vote_rows(pending.id), 0);
    }
}
