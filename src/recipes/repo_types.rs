use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Fixed recipe categories. The serialized form is the label shown to users
/// and stored in the `recipes.category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Entrée")]
    Starter,
    #[serde(rename = "Plat principal")]
    MainCourse,
    #[serde(rename = "Dessert")]
    Dessert,
    #[serde(rename = "Boisson")]
    Drink,
    #[serde(rename = "Apéritif")]
    Appetizer,
    #[serde(rename = "Petit-déjeuner")]
    Breakfast,
    #[serde(rename = "Goûter")]
    Snack,
    #[serde(rename = "Sauce")]
    Sauce,
    #[serde(rename = "Autre")]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Starter,
        Category::MainCourse,
        Category::Dessert,
        Category::Drink,
        Category::Appetizer,
        Category::Breakfast,
        Category::Snack,
        Category::Sauce,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Starter => "Entrée",
            Category::MainCourse => "Plat principal",
            Category::Dessert => "Dessert",
            Category::Drink => "Boisson",
            Category::Appetizer => "Apéritif",
            Category::Breakfast => "Petit-déjeuner",
            Category::Snack => "Goûter",
            Category::Sauce => "Sauce",
            Category::Other => "Autre",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown category {s:?}"))
    }
}

#[derive(Debug, FromRow)]
pub struct RecipeRow {
    pub id: Uuid,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub category: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub image: Option<String>,
    pub approved: bool,
    pub average_rating: f64,
    pub vote_count: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub category: Category,
    pub author_id: Uuid,
    pub author_name: String, // copied from the author at submission, never re-synced
    pub image: Option<String>, // base64 JPEG
    pub approved: bool,
    pub average_rating: f64,
    pub vote_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = anyhow::Error;

    fn try_from(r: RecipeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            title: r.title,
            ingredients: r.ingredients,
            instructions: r.instructions,
            category: r.category.parse()?,
            author_id: r.author_id,
            author_name: r.author_name,
            image: r.image,
            approved: r.approved,
            average_rating: r.average_rating,
            vote_count: r.vote_count,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub category: Category,
    pub author_id: Uuid,
    pub author_name: String,
    pub image: Option<String>,
}

/// Conjunction of optional predicates over recipes.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub approved: Option<bool>,
    pub author_id: Option<Uuid>,
    pub category: Option<Category>,
    /// Case-insensitive substring of the title or the ingredients.
    pub search: Option<String>,
}

impl RecipeFilter {
    pub fn matches(&self, r: &Recipe) -> bool {
        if self.approved.is_some_and(|a| a != r.approved) {
            return false;
        }
        if self.author_id.is_some_and(|id| id != r.author_id) {
            return false;
        }
        if self.category.is_some_and(|c| c != r.category) {
            return false;
        }
        match &self.search {
            Some(s) => {
                let needle = s.to_lowercase();
                r.title.to_lowercase().contains(&needle)
                    || r.ingredients.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecipeCounts {
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
}
