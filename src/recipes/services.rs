use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{Category, NewRecipe, Recipe, RecipeFilter};
use crate::auth::repo_types::Account;
use crate::error::{AppError, AppResult};
use crate::images::services::{normalize_upload, MediaNormalizer, UploadItem};
use crate::store::{Store, MAX_LIST};

/// Raw submission as received from the client.
pub struct RecipeSubmission {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub category: String,
    pub image: Option<UploadItem>,
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(v.to_string())
}

/// Create a recipe in the pending state.
pub async fn submit(
    store: &dyn Store,
    media: Arc<dyn MediaNormalizer>,
    author: &Account,
    input: RecipeSubmission,
) -> AppResult<Recipe> {
    let title = required("title", &input.title)?;
    let ingredients = required("ingredients", &input.ingredients)?;
    let instructions = required("instructions", &input.instructions)?;
    let category: Category = input
        .category
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown category {:?}", input.category)))?;

    let image = match input.image {
        Some(item) => normalize_upload(media, item).await?,
        None => None,
    };

    let recipe = store
        .insert_recipe(&NewRecipe {
            title,
            ingredients,
            instructions,
            category,
            author_id: author.id,
            author_name: author.name.clone(),
            image,
        })
        .await?;

    info!(recipe_id = %recipe.id, author_id = %author.id, "recipe submitted for moderation");
    Ok(recipe)
}

/// Approved recipes, optionally narrowed by category and free-text search.
/// Blank parameters are ignored; an unknown category matches nothing.
pub async fn list_public(
    store: &dyn Store,
    category: Option<&str>,
    search: Option<&str>,
) -> AppResult<Vec<Recipe>> {
    let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => match c.parse::<Category>() {
            Ok(c) => Some(c),
            Err(_) => return Ok(Vec::new()),
        },
        None => None,
    };
    let search = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let filter = RecipeFilter {
        approved: Some(true),
        category,
        search,
        ..Default::default()
    };
    Ok(store.list_recipes(&filter, MAX_LIST).await?)
}

pub async fn list_mine(store: &dyn Store, author_id: Uuid) -> AppResult<Vec<Recipe>> {
    let filter = RecipeFilter {
        author_id: Some(author_id),
        ..Default::default()
    };
    Ok(store.list_recipes(&filter, MAX_LIST).await?)
}

pub async fn list_pending(store: &dyn Store) -> AppResult<Vec<Recipe>> {
    let filter = RecipeFilter {
        approved: Some(false),
        ..Default::default()
    };
    Ok(store.list_recipes(&filter, MAX_LIST).await?)
}

/// Idempotent: approving an approved recipe succeeds and changes nothing.
pub async fn approve(store: &dyn Store, id: Uuid) -> AppResult<()> {
    if !store.approve_recipe(id).await? {
        warn!(recipe_id = %id, "approve: recipe not found");
        return Err(AppError::NotFound("Recipe not found".into()));
    }
    info!(recipe_id = %id, "recipe approved");
    Ok(())
}

/// Rejection deletes the submission outright.
pub async fn reject(store: &dyn Store, id: Uuid) -> AppResult<()> {
    if !store.delete_recipe(id).await? {
        warn!(recipe_id = %id, "reject: recipe not found");
        return Err(AppError::NotFound("Recipe not found".into()));
    }
    info!(recipe_id = %id, "recipe rejected and deleted");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::services::register;
    use crate::images::services::JpegNormalizer;
    use crate::recipes::repo::RecipeRepo;
    use crate::store::MemoryStore;
    use bytes::Bytes;

    pub(crate) fn media() -> Arc<dyn MediaNormalizer> {
        Arc::new(JpegNormalizer::default())
    }

    pub(crate) fn submission(title: &str, ingredients: &str, category: &str) -> RecipeSubmission {
        RecipeSubmission {
            title: title.into(),
            ingredients: ingredients.into(),
            instructions: "Mix and bake.".into(),
            category: category.into(),
            image: None,
        }
    }

    /// Submit and approve in one go.
    pub(crate) async fn approved_recipe(store: &MemoryStore, author: &Account, title: &str) -> Recipe {
        let r = submit(store, media(), author, submission(title, "eggs", "Dessert"))
            .await
            .unwrap();
        approve(store, r.id).await.unwrap();
        r
    }

    #[tokio::test]
    async fn submitted_recipe_is_hidden_until_approved() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();

        let recipe = submit(&store, media(), &alice, submission("Crêpes", "lait, oeufs", "Dessert"))
            .await
            .unwrap();
        assert!(!recipe.approved);
        assert_eq!(recipe.author_name, "Alice");
        assert!(list_public(&store, None, None).await.unwrap().is_empty());

        approve(&store, recipe.id).await.unwrap();
        let public = list_public(&store, None, None).await.unwrap();
        assert_eq!(public.len(), 1);
        assert!(public[0].approved);
        assert_eq!(public[0].average_rating, 0.0);
        assert_eq!(public[0].vote_count, 0);
    }

    #[tokio::test]
    async fn submit_validates_fields_and_category() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();

        for input in [
            submission("  ", "x", "Dessert"),
            submission("T", "", "Dessert"),
            submission("T", "x", "Soupe"),
        ] {
            let err = submit(&store, media(), &alice, input).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        let mut no_steps = submission("T", "x", "Dessert");
        no_steps.instructions = "\n".into();
        assert!(submit(&store, media(), &alice, no_steps).await.is_err());
        assert_eq!(store.recipe_counts().await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn undecodable_image_is_rejected() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let mut input = submission("T", "x", "Dessert");
        input.image = Some(UploadItem {
            body: Bytes::from_static(b"not a jpeg"),
            content_type: "image/jpeg".into(),
        });
        assert!(matches!(
            submit(&store, media(), &alice, input).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn public_listing_filters_by_category_and_search() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();

        let tarte = submit(&store, media(), &alice, submission("Tarte aux pommes", "pommes, farine", "Dessert"))
            .await
            .unwrap();
        let soupe = submit(&store, media(), &alice, submission("Velouté", "POTIRON, crème", "Entrée"))
            .await
            .unwrap();
        let pending = submit(&store, media(), &alice, submission("Pommes sautées", "pommes", "Dessert"))
            .await
            .unwrap();
        approve(&store, tarte.id).await.unwrap();
        approve(&store, soupe.id).await.unwrap();

        let desserts = list_public(&store, Some("Dessert"), None).await.unwrap();
        assert_eq!(desserts.len(), 1);
        assert_eq!(desserts[0].id, tarte.id);

        let pommes = list_public(&store, None, Some("POMMES")).await.unwrap();
        assert_eq!(pommes.iter().map(|r| r.id).collect::<Vec<_>>(), vec![tarte.id]);

        let by_ingredient = list_public(&store, None, Some("potiron")).await.unwrap();
        assert_eq!(by_ingredient.len(), 1);
        assert_eq!(by_ingredient[0].id, soupe.id);

        assert!(list_public(&store, Some("Soupe"), None).await.unwrap().is_empty());
        assert_eq!(list_public(&store, Some(""), Some(" ")).await.unwrap().len(), 2);

        for (c, s) in [(None, None), (Some("Dessert"), Some("pommes")), (None, Some("sautées"))] {
            let listed = list_public(&store, c, s).await.unwrap();
            assert!(listed.iter().all(|r| r.approved));
            assert!(listed.iter().all(|r| r.id != pending.id));
        }
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let first = approved_recipe(&store, &alice, "first").await;
        let second = approved_recipe(&store, &alice, "second").await;

        let ids: Vec<Uuid> = list_public(&store, None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn listings_are_capped() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        for i in 0..(MAX_LIST + 5) {
            submit(&store, media(), &alice, submission(&format!("r{i}"), "x", "Autre"))
                .await
                .unwrap();
        }
        assert_eq!(list_mine(&store, alice.id).await.unwrap().len(), MAX_LIST as usize);
        assert_eq!(list_pending(&store).await.unwrap().len(), MAX_LIST as usize);
    }

    #[tokio::test]
    async fn mine_includes_every_state_and_only_mine() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let bob = register(&store, "Bob", "b@x.com", "Pw1!").await.unwrap();

        approved_recipe(&store, &alice, "approved").await;
        submit(&store, media(), &alice, submission("pending", "x", "Sauce")).await.unwrap();
        submit(&store, media(), &bob, submission("bob's", "x", "Sauce")).await.unwrap();

        let mine = list_mine(&store, alice.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.author_id == alice.id));
    }

    #[tokio::test]
    async fn approve_is_idempotent_and_checks_existence() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let r = submit(&store, media(), &alice, submission("T", "x", "Dessert")).await.unwrap();

        approve(&store, r.id).await.unwrap();
        approve(&store, r.id).await.unwrap();
        assert_eq!(list_public(&store, None, None).await.unwrap().len(), 1);
        assert!(list_pending(&store).await.unwrap().is_empty());

        assert!(matches!(
            approve(&store, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reject_deletes_the_submission() {
        let store = MemoryStore::new();
        let alice = register(&store, "Alice", "a@x.com", "Pw1!").await.unwrap();
        let r = submit(&store, media(), &alice, submission("T", "x", "Dessert")).await.unwrap();

        reject(&store, r.id).await.unwrap();
        assert!(list_mine(&store, alice.id).await.unwrap().is_empty());
        assert!(matches!(reject(&store, r.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(approve(&store, r.id).await, Err(AppError::NotFound(_))));
    }
}
