use serde::Deserialize;

use crate::nutrition::{AnalysisResult, PortionWeight};

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub image: Option<String>, // base64, optionally as a data URL
    pub description: Option<String>,
    pub portion_size: Option<String>,
    pub portion_weight: Option<PortionWeight>,
}

/// Body of `POST /recalculate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    pub original_data: AnalysisResult,
    pub portion_size: Option<String>,
    pub portion_weight: Option<PortionWeight>,
}
