use serde::Deserialize;
use tracing::{debug, warn};

use super::model::{AnalysisResult, NutritionRecord};

/// Portion weight as sent by the client: a JSON number or a numeric string
/// straight from a form field. Anything else is kept as-is and refused when
/// read, so a bad weight never fails the whole request body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PortionWeight {
    Grams(f64),
    Text(String),
    Other(serde_json::Value),
}

impl PortionWeight {
    /// `Ok(None)` means "no weight given" (blank text or zero).
    pub fn grams(&self) -> Result<Option<f64>, RecalcError> {
        let value = match self {
            PortionWeight::Grams(g) => *g,
            PortionWeight::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                s.parse::<f64>()
                    .map_err(|_| RecalcError::NotANumber(s.to_string()))?
            }
            PortionWeight::Other(v) => return Err(RecalcError::NotANumber(v.to_string())),
        };
        if !value.is_finite() {
            return Err(RecalcError::NotANumber(value.to_string()));
        }
        if value < 0.0 {
            return Err(RecalcError::Negative(value));
        }
        if value == 0.0 {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

impl From<f64> for PortionWeight {
    fn from(g: f64) -> Self {
        PortionWeight::Grams(g)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecalcError {
    #[error("portion weight is not a number: {0:?}")]
    NotANumber(String),
    #[error("portion weight must not be negative: {0}")]
    Negative(f64),
    #[error("original weight is unusable: {0}")]
    BadOriginalWeight(f64),
}

/// Rounds to the nearest integer, halves away from zero.
fn round_whole(x: f64) -> f64 {
    x.round()
}

/// Rounds to one decimal place, halves away from zero.
fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn scale(n: &NutritionRecord, factor: f64) -> NutritionRecord {
    NutritionRecord {
        calories: round_whole(n.calories * factor),
        protein: round_tenth(n.protein * factor),
        carbs: round_tenth(n.carbs * factor),
        fat: round_tenth(n.fat * factor),
        fiber: round_tenth(n.fiber * factor),
        sugar: round_tenth(n.sugar * factor),
    }
}

/// Scales `original` to a new weight.
///
/// Without a usable new weight, or when the original weight is zero, the
/// input comes back unchanged. Malformed weights are errors; callers that
/// must never fail use [`recalculate`].
pub fn try_recalculate(
    original: &AnalysisResult,
    portion_size: Option<&str>,
    new_weight: Option<&PortionWeight>,
) -> Result<AnalysisResult, RecalcError> {
    let Some(new_weight) = new_weight else {
        return Ok(original.clone());
    };
    let Some(new_grams) = new_weight.grams()? else {
        return Ok(original.clone());
    };

    let original_grams = original.estimated_weight_g;
    if original_grams == 0.0 {
        return Ok(original.clone());
    }
    if !original_grams.is_finite() || original_grams < 0.0 {
        return Err(RecalcError::BadOriginalWeight(original_grams));
    }

    let factor = new_grams / original_grams;
    debug!(from = original_grams, to = new_grams, factor, "rescaling nutrition");

    let mut result = original.clone();
    result.nutrition = scale(&original.nutrition, factor);
    result.estimated_weight_g = new_grams;
    if let Some(label) = portion_size.map(str::trim).filter(|s| !s.is_empty()) {
        result.estimated_portion = label.to_string();
    }
    Ok(result)
}

/// Fail-soft recalculation: errors are logged and the original is kept.
pub fn recalculate(
    original: &AnalysisResult,
    portion_size: Option<&str>,
    new_weight: Option<&PortionWeight>,
) -> AnalysisResult {
    match try_recalculate(original, portion_size, new_weight) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "recalculation failed; returning original analysis");
            original.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::model::Confidence;

    fn sample(weight: f64) -> AnalysisResult {
        AnalysisResult {
            food_name: "Chicken curry with rice".into(),
            estimated_portion: "1 bowl".into(),
            estimated_weight_g: weight,
            nutrition: NutritionRecord {
                calories: 480.0,
                protein: 28.4,
                carbs: 55.0,
                fat: 14.6,
                fiber: 3.2,
                sugar: 6.1,
            },
            ingredients: vec!["chicken".into(), "rice".into(), "curry sauce".into()],
            confidence: Confidence::High,
        }
    }

    fn approx(a: &NutritionRecord, b: &NutritionRecord) -> bool {
        (a.calories - b.calories).abs() <= 1.0
            && (a.protein - b.protein).abs() <= 0.15
            && (a.carbs - b.carbs).abs() <= 0.15
            && (a.fat - b.fat).abs() <= 0.15
            && (a.fiber - b.fiber).abs() <= 0.15
            && (a.sugar - b.sugar).abs() <= 0.15
    }

    #[test]
    fn no_weight_is_identity() {
        let orig = sample(200.0);
        assert_eq!(try_recalculate(&orig, None, None).unwrap(), orig);
        assert_eq!(try_recalculate(&orig, Some("2 bowls"), None).unwrap(), orig);
        let blank = PortionWeight::Text("  ".into());
        assert_eq!(try_recalculate(&orig, None, Some(&blank)).unwrap(), orig);
    }

    #[test]
    fn zero_original_weight_is_unchanged() {
        let orig = sample(0.0);
        let w = PortionWeight::from(300.0);
        assert_eq!(try_recalculate(&orig, Some("big"), Some(&w)).unwrap(), orig);
    }

    #[test]
    fn doubling_weight_doubles_everything() {
        let orig = sample(200.0);
        let w = PortionWeight::from(400.0);
        let r = try_recalculate(&orig, None, Some(&w)).unwrap();
        assert_eq!(r.estimated_weight_g, 400.0);
        assert_eq!(r.estimated_portion, "1 bowl");
        assert_eq!(r.nutrition.calories, 960.0);
        assert_eq!(r.nutrition.protein, 56.8);
        assert_eq!(r.nutrition.carbs, 110.0);
        assert_eq!(r.nutrition.fat, 29.2);
        assert_eq!(r.nutrition.fiber, 6.4);
        assert_eq!(r.nutrition.sugar, 12.2);
        assert_eq!(r.ingredients, orig.ingredients);
    }

    #[test]
    fn label_replaced_only_when_given() {
        let orig = sample(200.0);
        let w = PortionWeight::from(100.0);
        let r = try_recalculate(&orig, Some("half a bowl"), Some(&w)).unwrap();
        assert_eq!(r.estimated_portion, "half a bowl");
        assert_eq!(r.nutrition.calories, 240.0);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_whole(2.5), 3.0);
        assert_eq!(round_whole(3.5), 4.0);
        assert_eq!(round_tenth(0.25), 0.3);
        assert_eq!(round_tenth(1.04), 1.0);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let orig = sample(200.0);
        let w = PortionWeight::Text(" 100 ".into());
        let r = try_recalculate(&orig, None, Some(&w)).unwrap();
        assert_eq!(r.estimated_weight_g, 100.0);
        assert_eq!(r.nutrition.protein, 14.2);
    }

    #[test]
    fn malformed_weights_fail_soft() {
        let orig = sample(200.0);
        let bad = PortionWeight::Text("a lot".into());
        assert!(matches!(
            try_recalculate(&orig, None, Some(&bad)),
            Err(RecalcError::NotANumber(_))
        ));
        assert_eq!(recalculate(&orig, Some("x"), Some(&bad)), orig);

        let neg = PortionWeight::from(-50.0);
        assert_eq!(
            try_recalculate(&orig, None, Some(&neg)),
            Err(RecalcError::Negative(-50.0))
        );
        assert_eq!(recalculate(&orig, None, Some(&neg)), orig);
    }

    #[test]
    fn scaling_composes_modulo_rounding() {
        let orig = sample(250.0);
        for (w1, w2) in [(100.0, 400.0), (180.0, 90.0), (333.0, 512.0), (75.0, 1000.0)] {
            let direct = try_recalculate(&orig, None, Some(&PortionWeight::from(w1))).unwrap();
            let via = try_recalculate(&orig, None, Some(&PortionWeight::from(w2))).unwrap();
            let back = try_recalculate(&via, None, Some(&PortionWeight::from(w1))).unwrap();
            assert_eq!(back.estimated_weight_g, w1);
            assert!(
                approx(&back.nutrition, &direct.nutrition),
                "{w1}/{w2}: {:?} vs {:?}",
                back.nutrition,
                direct.nutrition
            );
        }
    }

    #[test]
    fn weight_deserializes_from_number_or_string() {
        let n: PortionWeight = serde_json::from_str("400").unwrap();
        assert_eq!(n.grams().unwrap(), Some(400.0));
        let s: PortionWeight = serde_json::from_str("\"250.5\"").unwrap();
        assert_eq!(s.grams().unwrap(), Some(250.5));
    }

    #[test]
    fn non_scalar_weights_fail_soft() {
        let orig = sample(200.0);
        for raw in ["true", "{}", "[400]"] {
            let w: PortionWeight = serde_json::from_str(raw).unwrap();
            assert!(matches!(w.grams(), Err(RecalcError::NotANumber(_))), "{raw}");
            assert_eq!(recalculate(&orig, Some("big"), Some(&w)), orig);
        }
    }
}
