use serde::{Deserialize, Deserializer, Serialize};

/// Nutrition values for one portion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub calories: f64, // kcal
    pub protein: f64,  // g
    pub carbs: f64,    // g
    pub fat: f64,      // g
    pub fiber: f64,    // g
    pub sugar: f64,    // g
}

impl NutritionRecord {
    fn values(&self) -> [f64; 6] {
        [
            self.calories,
            self.protein,
            self.carbs,
            self.fat,
            self.fiber,
            self.sugar,
        ]
    }
}

/// How sure the model is about its estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "high" | "hoch" => Ok(Confidence::High),
            "medium" | "mittel" => Ok(Confidence::Medium),
            "low" | "niedrig" => Ok(Confidence::Low),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["high", "medium", "low"],
            )),
        }
    }
}

/// Structured estimate returned by `/analyze` and `/recalculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub food_name: String,
    pub estimated_portion: String, // e.g. "1 plate", "200g"
    pub estimated_weight_g: f64,
    pub nutrition: NutritionRecord,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub confidence: Confidence,
}

impl AnalysisResult {
    /// Rejects a non-positive weight and negative or non-finite nutrients.
    pub fn check_values(&self) -> Result<(), String> {
        if !self.estimated_weight_g.is_finite() || self.estimated_weight_g <= 0.0 {
            return Err(format!(
                "estimated_weight_g out of range: {}",
                self.estimated_weight_g
            ));
        }
        if self
            .nutrition
            .values()
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err("nutrition values must be finite and non-negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "food_name": "Spaghetti Bolognese",
        "estimated_portion": "1 plate",
        "estimated_weight_g": 350,
        "nutrition": {"calories": 520, "protein": 24.5, "carbs": 62, "fat": 18.2, "fiber": 5.1, "sugar": 9},
        "ingredients": ["pasta", "minced beef", "tomato sauce"],
        "confidence": "medium"
    }"#;

    #[test]
    fn parses_model_shape() {
        let r: AnalysisResult = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(r.food_name, "Spaghetti Bolognese");
        assert_eq!(r.estimated_weight_g, 350.0);
        assert_eq!(r.nutrition.calories, 520.0);
        assert_eq!(r.ingredients.len(), 3);
        assert_eq!(r.confidence, Confidence::Medium);
        assert!(r.check_values().is_ok());
    }

    #[test]
    fn confidence_accepts_german_and_mixed_case() {
        let c: Confidence = serde_json::from_str("\"Hoch\"").unwrap();
        assert_eq!(c, Confidence::High);
        let c: Confidence = serde_json::from_str("\"niedrig\"").unwrap();
        assert_eq!(c, Confidence::Low);
        assert!(serde_json::from_str::<Confidence>("\"certain\"").is_err());
        assert_eq!(serde_json::to_string(&Confidence::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut r: AnalysisResult = serde_json::from_str(SAMPLE).unwrap();
        r.nutrition.fat = -1.0;
        assert!(r.check_values().is_err());
    }

    #[test]
    fn zero_weight_is_rejected() {
        let mut r: AnalysisResult = serde_json::from_str(SAMPLE).unwrap();
        r.estimated_weight_g = 0.0;
        assert!(r.check_values().is_err());
    }
}
