mod model;
mod recalc;

pub use model::{AnalysisResult, Confidence, NutritionRecord};
pub use recalc::{recalculate, try_recalculate, PortionWeight, RecalcError};
