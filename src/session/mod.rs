mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
mod keys;
mod page;
pub mod store;

pub use dto::TokenStatus;
pub use extractors::{require_credential, AuthedSession, CurrentSession, SESSION_COOKIE};
pub use keys::SessionKeys;
pub use store::{Credential, SessionRecord, SessionStore};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::routes())
}
