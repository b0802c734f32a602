use crate::config::AppConfig;
use crate::ratelimit::SessionRateLimiter;
use crate::session::SessionStore;
use crate::vision::{OpenAiVision, VisionModel};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionStore>,
    pub limiter: Arc<SessionRateLimiter>,
    pub model: Arc<dyn VisionModel>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let model = Arc::new(OpenAiVision::new(config.model.clone())?) as Arc<dyn VisionModel>;
        Ok(Self::from_parts(config, model))
    }

    pub fn from_parts(config: Arc<AppConfig>, model: Arc<dyn VisionModel>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::from_config(&config.session)),
            limiter: Arc::new(SessionRateLimiter::from_config(&config.rate_limit)),
            config,
            model,
        }
    }
}
