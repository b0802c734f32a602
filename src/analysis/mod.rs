mod dto;
pub mod handlers;
mod prompt;
pub mod services;

pub use dto::{AnalyzeRequest, RecalculateRequest};
pub use prompt::build_prompt;

use crate::state::AppState;
use axum::Router;

pub fn router(state: AppState) -> Router<AppState> {
    handlers::routes(state)
}
