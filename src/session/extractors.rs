use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use super::keys::SessionKeys;
use super::store::{Credential, SessionRecord};
use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "nutriscan_session";

/// Session token from the session cookie, or from `Authorization: Bearer`.
pub fn read_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
    })
}

/// `Set-Cookie` value for a session token. Permanent sessions get a Max-Age,
/// the others last for the browser session.
pub fn session_cookie(token: &str, max_age_secs: Option<i64>, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(age) = max_age_secs {
        cookie.push_str(&format!("; Max-Age={age}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// The live session attached to the request, if any.
pub struct CurrentSession(pub Option<SessionRecord>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = read_token(&parts.headers) else {
            return Ok(CurrentSession(None));
        };

        let keys = SessionKeys::from_ref(state);
        let session_id = match keys.verify(&token) {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "ignoring invalid session token");
                return Ok(CurrentSession(None));
            }
        };

        let record = state.sessions.get(session_id, OffsetDateTime::now_utc());
        if record.is_none() {
            debug!(%session_id, "session token refers to unknown or expired session");
        }
        Ok(CurrentSession(record))
    }
}

/// Session that passed [`require_credential`].
#[derive(Debug, Clone)]
pub struct AuthedSession {
    pub session_id: Uuid,
    pub credential: Credential,
}

/// Guard for routes that call the provider: needs a session holding a
/// credential, otherwise answers 401.
pub async fn require_credential(
    CurrentSession(session): CurrentSession,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(SessionRecord {
        id,
        credential: Some(credential),
        ..
    }) = session
    else {
        warn!(path = %req.uri().path(), "request without credential");
        return Err(AppError::missing_credential());
    };

    req.extensions_mut().insert(AuthedSession {
        session_id: id,
        credential,
    });
    Ok(next.run(req).await)
}
