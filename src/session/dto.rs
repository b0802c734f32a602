use serde::{Deserialize, Serialize};

/// Query string of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub token: Option<String>,
}

/// Response of `GET /check-token`.
#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub has_token: bool,
}
