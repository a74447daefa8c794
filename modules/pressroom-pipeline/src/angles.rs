//! Angle selection: which editorial framings a scored item supports.

use pressroom_common::{Angle, PipelineConfig, ScoreBreakdown};

/// Picks angles in a fixed order of preference, so the truncation to
/// `max_angles` keeps the strongest framings. An item that qualifies for
/// nothing still gets an explainer.
pub fn select_angles(breakdown: &ScoreBreakdown, config: &PipelineConfig) -> Vec<Angle> {
    let mut angles = Vec::new();

    if breakdown.relevance >= config.explainer_min_relevance {
        angles.push(Angle::Explainer);
    }
    if breakdown.macro_impact >= config.investor_min_macro {
        angles.push(Angle::Investor);
    }
    if breakdown
        .matched_keywords
        .iter()
        .any(|kw| config.property_angle_terms.contains(kw))
    {
        angles.push(Angle::Property);
    }
    if breakdown.virality >= config.data_backed_min_virality {
        angles.push(Angle::DataBacked);
    }
    if breakdown.relevance >= config.contrarian_min_relevance
        && breakdown.macro_impact >= config.contrarian_min_macro
    {
        angles.push(Angle::Contrarian);
    }

    if angles.is_empty() {
        angles.push(Angle::Explainer);
    }
    angles.truncate(config.max_angles);
    angles
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_common::RiskTier;

    fn breakdown(relevance: f64, virality: f64, macro_impact: f64, matched: &[&str]) -> ScoreBreakdown {
        ScoreBreakdown {
            relevance,
            matched_keywords: matched.iter().map(|s| s.to_string()).collect(),
            virality,
            macro_impact,
            risk: RiskTier::Safe,
            sensitive_flags: Vec::new(),
            risk_reason: "No risk flags detected".to_string(),
            eligible: true,
        }
    }

    #[test]
    fn weak_item_falls_back_to_an_explainer() {
        let angles = select_angles(&breakdown(62.0, 10.0, 5.0, &["naira"]), &PipelineConfig::default());
        assert_eq!(angles, vec![Angle::Explainer]);
    }

    #[test]
    fn each_threshold_unlocks_its_angle() {
        let config = PipelineConfig::default();
        assert!(select_angles(&breakdown(70.0, 0.0, 0.0, &[]), &config).contains(&Angle::Explainer));
        assert!(select_angles(&breakdown(0.0, 0.0, 50.0, &[]), &config).contains(&Angle::Investor));
        assert!(select_angles(&breakdown(0.0, 0.0, 0.0, &["rent"]), &config).contains(&Angle::Property));
        assert!(select_angles(&breakdown(0.0, 50.0, 0.0, &[]), &config).contains(&Angle::DataBacked));
    }

    #[test]
    fn contrarian_needs_both_relevance_and_macro() {
        let config = PipelineConfig::default();
        assert!(!select_angles(&breakdown(80.0, 0.0, 59.0, &[]), &config).contains(&Angle::Contrarian));
        assert!(!select_angles(&breakdown(79.0, 0.0, 60.0, &[]), &config).contains(&Angle::Contrarian));
        assert!(select_angles(&breakdown(80.0, 0.0, 60.0, &[]), &config).contains(&Angle::Contrarian));
    }

    #[test]
    fn property_angle_requires_a_property_keyword_match() {
        let config = PipelineConfig::default();
        // "naira" is a primary keyword but not a property term
        let angles = select_angles(&breakdown(0.0, 0.0, 0.0, &["naira"]), &config);
        assert!(!angles.contains(&Angle::Property));
        // "mortgage" is in the wider angle list, not the macro combo list
        let angles = select_angles(&breakdown(0.0, 0.0, 0.0, &["mortgage"]), &config);
        assert!(angles.contains(&Angle::Property));
    }

    #[test]
    fn truncation_keeps_the_preferred_order() {
        let config = PipelineConfig::default();
        // qualifies for all five; only the first three survive
        let angles = select_angles(&breakdown(90.0, 80.0, 80.0, &["housing"]), &config);
        assert_eq!(angles, vec![Angle::Explainer, Angle::Investor, Angle::Property]);
    }
}
