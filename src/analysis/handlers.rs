use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::post,
    Extension, Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AnalyzeRequest, RecalculateRequest},
    services::analyze_food,
};
use crate::{
    error::{AppError, AppResult},
    nutrition::{recalculate, AnalysisResult},
    session::{require_credential, AuthedSession},
    state::AppState,
};

/// Both routes sit behind the credential guard.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/recalculate", post(recalculate_portion))
        .route_layer(middleware::from_fn_with_state(state, require_credential))
}

fn bad_body(e: JsonRejection) -> AppError {
    AppError::Validation(e.body_text())
}

#[instrument(skip_all, fields(session_id = %session.session_id))]
pub async fn analyze(
    State(state): State<AppState>,
    Extension(session): Extension<AuthedSession>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalysisResult>> {
    let Json(req) = payload.map_err(bad_body)?;
    let result = analyze_food(
        state.model.as_ref(),
        &state.limiter,
        &session,
        req,
        Instant::now(),
    )
    .await?;
    Ok(Json(result))
}

#[instrument(skip_all, fields(session_id = %session.session_id))]
pub async fn recalculate_portion(
    Extension(session): Extension<AuthedSession>,
    payload: Result<Json<RecalculateRequest>, JsonRejection>,
) -> AppResult<Json<AnalysisResult>> {
    let Json(req) = payload.map_err(bad_body)?;
    if let Err(reason) = req.original_data.check_values() {
        warn!(%reason, "original analysis out of range; returned unchanged");
        return Ok(Json(req.original_data));
    }
    let result = recalculate(
        &req.original_data,
        req.portion_size.as_deref(),
        req.portion_weight.as_ref(),
    );
    info!(weight_g = result.estimated_weight_g, "portion recalculated");
    Ok(Json(result))
}
