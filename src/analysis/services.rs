use std::time::Instant;

use tracing::{info, warn};

use super::{dto::AnalyzeRequest, prompt::build_prompt};
use crate::{
    error::{AppError, AppResult},
    nutrition::{recalculate, AnalysisResult},
    ratelimit::SessionRateLimiter,
    session::AuthedSession,
    vision::{ImagePayload, VisionError, VisionModel},
};

/// Slice from the first `{` to the last `}` of a model reply.
pub fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

pub fn parse_reply(reply: &str) -> AppResult<AnalysisResult> {
    let json = extract_json(reply)
        .ok_or_else(|| AppError::Parse("no JSON object in model reply".into()))?;
    let result: AnalysisResult =
        serde_json::from_str(json).map_err(|e| AppError::Parse(e.to_string()))?;
    result.check_values().map_err(AppError::Parse)?;
    Ok(result)
}

fn provider_error(e: VisionError) -> AppError {
    match e {
        VisionError::CredentialRejected => AppError::Auth(
            "The OpenAI API key was rejected. Check it and add it again with ?token=<your key>."
                .into(),
        ),
        other => AppError::Provider(other.to_string()),
    }
}

/// Validate → rate limit → remote call → parse → optional recalculation.
pub async fn analyze_food(
    model: &dyn VisionModel,
    limiter: &SessionRateLimiter,
    session: &AuthedSession,
    req: AnalyzeRequest,
    now: Instant,
) -> AppResult<AnalysisResult> {
    let image = ImagePayload::from_client(req.image.as_deref().unwrap_or_default())
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session_key = session.session_id.to_string();
    let decision = limiter.check(&session_key, now);
    if !decision.admitted {
        warn!(
            session_id = %session.session_id,
            retry_after = decision.remaining_secs,
            "analysis throttled"
        );
        return Err(AppError::Throttled {
            retry_after: decision.remaining_secs,
        });
    }

    let prompt = build_prompt(req.description.as_deref());
    let reply = model
        .describe(&session.credential, &prompt, &image)
        .await
        .map_err(provider_error)?;

    let mut result = parse_reply(&reply)?;
    info!(
        session_id = %session.session_id,
        food = %result.food_name,
        weight_g = result.estimated_weight_g,
        "analysis complete"
    );

    if req.portion_size.is_some() || req.portion_weight.is_some() {
        result = recalculate(
            &result,
            req.portion_size.as_deref(),
            req.portion_weight.as_ref(),
        );
    }

    Ok(result)
}
