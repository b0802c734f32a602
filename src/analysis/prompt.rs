const NO_DESCRIPTION: &str = "No description provided";

/// Instruction sent next to the photo. Asks for exactly the
/// `AnalysisResult` JSON shape.
pub fn build_prompt(description: Option<&str>) -> String {
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);

    format!(
        r#"Analyze this food photo and produce a detailed nutrition estimate.

User description: {description}

Return the nutrition values as JSON in exactly this format:
{{
    "food_name": "Name of the food or dish",
    "estimated_portion": "Estimated portion size (e.g. '1 plate', '200g')",
    "estimated_weight_g": estimated weight in grams as a number,
    "nutrition": {{
        "calories": calories in kcal,
        "protein": protein in g,
        "carbs": carbohydrates in g,
        "fat": fat in g,
        "fiber": fiber in g,
        "sugar": sugar in g
    }},
    "ingredients": ["list", "of", "main", "ingredients"],
    "confidence": "high/medium/low"
}}

Be as precise as the photo allows. If you are unsure, give realistic estimates."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_description() {
        let p = build_prompt(Some("  grilled salmon with rice "));
        assert!(p.contains("User description: grilled salmon with rice\n"));
        assert!(p.contains("\"estimated_weight_g\""));
    }

    #[test]
    fn placeholder_when_missing_or_blank() {
        assert!(build_prompt(None).contains("User description: No description provided"));
        assert!(build_prompt(Some("   ")).contains("No description provided"));
    }
}
