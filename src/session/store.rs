use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::SessionConfig;

/// API key for the AI provider, supplied by the user.
///
/// Never logged: `Debug` only shows the prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accepts keys of the form `sk-<non-whitespace>`.
    pub fn parse(raw: &str) -> Option<Self> {
        lazy_static! {
            static ref KEY_RE: Regex = Regex::new(r"^sk-\S+$").unwrap();
        }
        KEY_RE.is_match(raw).then(|| Credential(raw.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(sk-***)")
    }
}

/// Server-side state of one browser session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: Uuid,
    pub credential: Option<Credential>,
    pub permanent: bool,
    pub expires_at: OffsetDateTime,
}

/// In-memory session table. Expired records are dropped lazily.
pub struct SessionStore {
    ttl: Duration,
    permanent_ttl: Duration,
    sessions: Mutex<HashMap<Uuid, SessionRecord>>,
}

impl SessionStore {
    pub fn new(ttl: Duration, permanent_ttl: Duration) -> Self {
        Self {
            ttl,
            permanent_ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self::new(
            Duration::minutes(cfg.ttl_minutes),
            Duration::days(cfg.permanent_ttl_days),
        )
    }

    pub fn create(&self, now: OffsetDateTime) -> SessionRecord {
        let record = SessionRecord {
            id: Uuid::new_v4(),
            credential: None,
            permanent: false,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        if sessions.len() < before {
            debug!(purged = before - sessions.len(), "dropped expired sessions");
        }
        sessions.insert(record.id, record.clone());
        debug!(session_id = %record.id, "session created");
        record
    }

    pub fn get(&self, id: Uuid, now: OffsetDateTime) -> Option<SessionRecord> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(&id) {
            Some(s) if s.expires_at > now => Some(s.clone()),
            Some(_) => {
                sessions.remove(&id);
                None
            }
            None => None,
        }
    }

    /// Stores the credential and makes the session long-lived.
    pub fn store_credential(
        &self,
        id: Uuid,
        credential: Credential,
        now: OffsetDateTime,
    ) -> Option<SessionRecord> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let record = sessions.get_mut(&id)?;
        record.credential = Some(credential);
        record.permanent = true;
        record.expires_at = now + self.permanent_ttl;
        Some(record.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
