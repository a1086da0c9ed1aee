use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct IngredientsRequest {
    pub ingredients: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestion: String,
}
