//! Persistence seam.
//!
//! Each domain module declares the repository trait it needs (`AccountRepo`,
//! `RecipeRepo`, ...) and implements it for [`PgStore`]. Handlers reach the
//! database only through `Arc<dyn Store>`, so tests swap in the in-memory
//! implementation. Every multi-step write is a single statement or a short
//! transaction; callers never do read-then-write round trips.

#[cfg(test)]
mod memory;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::repo::{AccountRepo, ResetTokenRepo};
use crate::comments::repo::CommentRepo;
use crate::ratings::repo::VoteRepo;
use crate::recipes::repo::RecipeRepo;

#[cfg(test)]
pub use memory::MemoryStore;

/// Upper bound on every list endpoint.
pub const MAX_LIST: i64 = 100;

pub trait Store: AccountRepo + ResetTokenRepo + RecipeRepo + VoteRepo + CommentRepo {}

impl<T> Store for T where T: AccountRepo + ResetTokenRepo + RecipeRepo + VoteRepo + CommentRepo {}

#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}
