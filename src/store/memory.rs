use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::{AccountRepo, ResetTokenRepo};
use crate::auth::repo_types::{Account, NewAccount, PasswordResetToken, Role};
use crate::comments::repo::{Comment, CommentRepo, NewComment};
use crate::ratings::repo::{RatingSummary, VoteRepo};
use crate::recipes::repo::RecipeRepo;
use crate::recipes::repo_types::{NewRecipe, Recipe, RecipeCounts, RecipeFilter};

/// In-process store for tests. One lock guards everything, so each trait
/// method is atomic the same way the Postgres statements are.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    recipes: Vec<Recipe>,
    votes: HashMap<(Uuid, Uuid), i32>,
    comments: Vec<Comment>,
    reset_tokens: Vec<PasswordResetToken>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of stored votes for a recipe.
    pub fn vote_rows(&self, recipe_id: Uuid) -> usize {
        self.lock()
            .votes
            .keys()
            .filter(|(r, _)| *r == recipe_id)
            .count()
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

#[async_trait]
impl AccountRepo for MemoryStore {
    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        Ok(self.lock().accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        Ok(self.lock().accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_account(&self, new: NewAccount) -> anyhow::Result<Option<Account>> {
        let mut inner = self.lock();
        if inner.accounts.iter().any(|a| a.email == new.email) {
            return Ok(None);
        }
        let account = Account {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            role: new.role,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.accounts.push(account.clone());
        Ok(Some(account))
    }

    async fn admin_exists(&self) -> anyhow::Result<bool> {
        Ok(self.lock().accounts.iter().any(|a| a.role == Role::Admin))
    }

    async fn count_accounts(&self) -> anyhow::Result<i64> {
        Ok(self.lock().accounts.len() as i64)
    }
}

#[async_trait]
impl ResetTokenRepo for MemoryStore {
    async fn insert_reset_token(&self, token: &PasswordResetToken) -> anyhow::Result<()> {
        let mut inner = self.lock();
        anyhow::ensure!(
            !inner.reset_tokens.iter().any(|t| t.token == token.token),
            "duplicate reset token"
        );
        inner.reset_tokens.push(token.clone());
        Ok(())
    }

    async fn find_redeemable_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let inner = self.lock();
        let candidates: Vec<PasswordResetToken> = inner
            .reset_tokens
            .iter()
            .filter(|t| t.token == token && t.is_redeemable(now))
            .cloned()
            .collect();
        Ok(newest_first(&candidates, |t| t.created_at).into_iter().next())
    }

    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        let Some(t) = inner
            .reset_tokens
            .iter_mut()
            .find(|t| t.token == token && t.is_redeemable(now))
        else {
            return Ok(false);
        };
        t.used = true;
        let account_id = t.account_id;

        let account = inner
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or_else(|| anyhow::anyhow!("reset token references missing account"))?;
        account.password_hash = new_password_hash.to_string();
        Ok(true)
    }
}

#[async_trait]
impl RecipeRepo for MemoryStore {
    async fn insert_recipe(&self, new: &NewRecipe) -> anyhow::Result<Recipe> {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            title: new.title.clone(),
            ingredients: new.ingredients.clone(),
            instructions: new.instructions.clone(),
            category: new.category,
            author_id: new.author_id,
            author_name: new.author_name.clone(),
            image: new.image.clone(),
            approved: false,
            average_rating: 0.0,
            vote_count: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        self.lock().recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn list_recipes(&self, filter: &RecipeFilter, limit: i64) -> anyhow::Result<Vec<Recipe>> {
        let inner = self.lock();
        let matching: Vec<Recipe> = inner
            .recipes
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |r| r.created_at)
            .into_iter()
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn approve_recipe(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        match inner.recipes.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_recipe(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        let before = inner.recipes.len();
        inner.recipes.retain(|r| r.id != id);
        if inner.recipes.len() == before {
            return Ok(false);
        }
        inner.votes.retain(|(r, _), _| *r != id);
        Ok(true)
    }

    async fn recipe_counts(&self) -> anyhow::Result<RecipeCounts> {
        let inner = self.lock();
        let total = inner.recipes.len() as i64;
        let approved = inner.recipes.iter().filter(|r| r.approved).count() as i64;
        Ok(RecipeCounts {
            total,
            approved,
            pending: total - approved,
        })
    }
}

#[async_trait]
impl VoteRepo for MemoryStore {
    async fn record_vote(
        &self,
        recipe_id: Uuid,
        voter_id: Uuid,
        value: i32,
    ) -> anyhow::Result<Option<RatingSummary>> {
        let mut inner = self.lock();
        if !inner.recipes.iter().any(|r| r.id == recipe_id && r.approved) {
            return Ok(None);
        }

        inner.votes.insert((recipe_id, voter_id), value);

        let values: Vec<i32> = inner
            .votes
            .iter()
            .filter(|((r, _), _)| *r == recipe_id)
            .map(|(_, v)| *v)
            .collect();
        let vote_count = values.len() as i32;
        let average_rating = if values.is_empty() {
            0.0
        } else {
            values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64
        };

        let recipe = inner
            .recipes
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .ok_or_else(|| anyhow::anyhow!("recipe vanished while locked"))?;
        recipe.average_rating = average_rating;
        recipe.vote_count = vote_count;

        Ok(Some(RatingSummary {
            average_rating,
            vote_count,
        }))
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn insert_comment_if_approved(&self, new: &NewComment) -> anyhow::Result<Option<Comment>> {
        let mut inner = self.lock();
        if !inner.recipes.iter().any(|r| r.id == new.recipe_id && r.approved) {
            return Ok(None);
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            recipe_id: new.recipe_id,
            author_id: new.author_id,
            author_name: new.author_name.clone(),
            text: new.text.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.comments.push(comment.clone());
        Ok(Some(comment))
    }

    async fn list_comments(&self, recipe_id: Uuid, limit: i64) -> anyhow::Result<Vec<Comment>> {
        let inner = self.lock();
        let matching: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| c.recipe_id == recipe_id)
            .cloned()
            .collect();
        Ok(newest_first(&matching, |c| c.created_at)
            .into_iter()
            .take(limit.max(0) as usize)
            .collect())
    }
}
