#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use nutriscan::app::build_app;
use nutriscan::config::{AppConfig, ModelConfig, RateLimitConfig, SessionConfig};
use nutriscan::session::{Credential, SessionKeys};
use nutriscan::state::AppState;
use nutriscan::vision::{ImagePayload, VisionError, VisionModel};

pub const IMAGE: &str = "data:image/png;base64,aGVsbG8=";

pub const PASTA_REPLY: &str = r#"Here is my estimate:
{
    "food_name": "Pasta with tomato sauce",
    "estimated_portion": "1 plate",
    "estimated_weight_g": 200,
    "nutrition": {"calories": 350, "protein": 11.2, "carbs": 62.4, "fat": 6.3, "fiber": 4.1, "sugar": 8.5},
    "ingredients": ["pasta", "tomatoes", "olive oil"],
    "confidence": "high"
}"#;

/// Model double that answers every call with the same reply.
pub struct FakeModel {
    reply: Result<String, fn() -> VisionError>,
    pub calls: Mutex<Vec<(String, String)>>, // (key, prompt)
}

impl FakeModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: fn() -> VisionError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VisionModel for FakeModel {
    async fn describe(
        &self,
        credential: &Credential,
        prompt: &str,
        _image: &ImagePayload,
    ) -> Result<String, VisionError> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.expose().to_string(), prompt.to_string()));
        match &self.reply {
            Ok(r) => Ok(r.clone()),
            Err(make) => Err(make()),
        }
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        max_body_bytes: 16 * 1024 * 1024,
        session: SessionConfig {
            secret: "test-secret".into(),
            issuer: "test-iss".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60,
            permanent_ttl_days: 31,
            cookie_secure: false,
        },
        model: ModelConfig {
            base_url: "http://127.0.0.1:9".into(),
            model: "gpt-4o".into(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 5,
        },
        rate_limit: RateLimitConfig::default(),
    }
}

pub fn test_state(model: Arc<FakeModel>) -> AppState {
    AppState::from_parts(Arc::new(test_config()), model)
}

pub fn app(state: &AppState) -> Router {
    build_app(state.clone())
}

/// Creates a session holding `key` directly in the store and returns
/// `(session id, Cookie header value)`.
pub fn session_with_key(state: &AppState, key: &str) -> (String, String) {
    let now = time::OffsetDateTime::now_utc();
    let rec = state.sessions.create(now);
    let rec = state
        .sessions
        .store_credential(rec.id, Credential::parse(key).unwrap(), now)
        .unwrap();
    let token = SessionKeys::new(&state.config.session).sign(&rec).unwrap();
    (rec.id.to_string(), format!("nutriscan_session={token}"))
}

/// `name=value` part of a `Set-Cookie` header.
pub fn cookie_from(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder().uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    app.oneshot(req.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}
