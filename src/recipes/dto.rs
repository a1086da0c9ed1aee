use serde::{Deserialize, Serialize};

/// Query string of the public listing. Both filters are optional.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<&'static str>,
}
