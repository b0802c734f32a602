use axum::{
    extract::{FromRef, Query, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{IndexQuery, TokenStatus},
    extractors::{session_cookie, CurrentSession},
    keys::SessionKeys,
    page::render_index,
    store::Credential,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

const BAD_FORMAT: &str = r#"Invalid key format. OpenAI keys start with "sk-"."#;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/check-token", get(check_token))
}

/// Landing page. Attaches a session and optionally stores `?token=`.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<IndexQuery>,
) -> AppResult<Response> {
    let now = OffsetDateTime::now_utc();
    let (mut record, mut reissue) = match session {
        Some(s) => (s, false),
        None => (state.sessions.create(now), true),
    };

    let mut page_error = None;
    if let Some(raw) = query.token.as_deref().filter(|t| !t.is_empty()) {
        match Credential::parse(raw) {
            Some(credential) => {
                record = state
                    .sessions
                    .store_credential(record.id, credential, now)
                    .ok_or_else(|| AppError::Internal("session vanished".into()))?;
                reissue = true;
                info!(session_id = %record.id, "credential stored; session made permanent");
            }
            None => {
                warn!(session_id = %record.id, "rejected credential with bad format");
                page_error = Some(BAD_FORMAT);
            }
        }
    }

    let has_token = record.credential.is_some();
    let mut response = Html(render_index(has_token, page_error)).into_response();

    if reissue {
        let token = SessionKeys::from_ref(&state).sign(&record).map_err(|e| {
            error!(error = %e, "session token signing failed");
            AppError::Internal(e.to_string())
        })?;
        let max_age = record
            .permanent
            .then(|| (record.expires_at - now).whole_seconds());
        let cookie = session_cookie(&token, max_age, state.config.session.cookie_secure);
        let value =
            HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))?;
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

#[instrument(skip_all)]
pub async fn check_token(CurrentSession(session): CurrentSession) -> Json<TokenStatus> {
    Json(TokenStatus {
        has_token: session.is_some_and(|s| s.credential.is_some()),
    })
}
