use serde::Serialize;

use crate::error::AppResult;
use crate::store::Store;

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_recipes: i64,
    pub approved: i64,
    pub pending: i64,
}

pub async fn stats(store: &dyn Store) -> AppResult<AdminStats> {
    let total_users = store.count_accounts().await?;
    let counts = store.recipe_counts().await?;
    Ok(AdminStats {
        total_users,
        total_recipes: counts.total,
        approved: counts.approved,
        pending: counts.pending,
    })
}
