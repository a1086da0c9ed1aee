//! Recipe suggestions from hosted text models.
//!
//! Providers are tried in order until one answers; nothing here touches the
//! database.

mod dto;
pub mod gemini;
pub mod handlers;
pub mod openai;
pub mod parse;
pub mod prompts;
pub mod provider;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::ai_routes()
}
