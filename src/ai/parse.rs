use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A recipe draft extracted from a model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRecipe {
    #[serde(alias = "titre")]
    pub title: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub ingredients: String,
    #[serde(deserialize_with = "text_or_lines")]
    pub instructions: String,
    #[serde(alias = "categorie", alias = "catégorie")]
    pub category: String,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field `{0}` is empty")]
    EmptyField(&'static str),
}

/// Models sometimes answer with a list where a block of text was asked for.
fn text_or_lines<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrLines {
        Text(String),
        Lines(Vec<String>),
    }

    Ok(match TextOrLines::deserialize(deserializer)? {
        TextOrLines::Text(s) => s,
        TextOrLines::Lines(lines) => lines.join("\n"),
    })
}

/// Drop a surrounding markdown code fence, with or without a `json` tag.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

pub fn parse_structured(raw: &str) -> Result<StructuredRecipe, ParseError> {
    let recipe: StructuredRecipe = serde_json::from_str(strip_code_fence(raw))?;
    for (name, value) in [
        ("title", &recipe.title),
        ("ingredients", &recipe.ingredients),
        ("instructions", &recipe.instructions),
        ("category", &recipe.category),
    ] {
        if value.trim().is_empty() {
            return Err(ParseError::EmptyField(name));
        }
    }
    Ok(recipe)
}
