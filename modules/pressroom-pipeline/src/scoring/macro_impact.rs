//! Macro impact: does the story touch a policy lever that moves the
//! property market?

use super::ScoringRules;

/// Substring matching by intent. "taxation" should count for "tax" and
/// "interest rates" for "interest rate", unlike the word-bounded relevance
/// pass.
pub(crate) fn score(rules: &ScoringRules, text: &str) -> f64 {
    let hits = rules
        .high_impact
        .iter()
        .filter(|term| text.contains(term.as_str()))
        .count();
    let mut total = hits as f64 * rules.macro_term_points;

    let property = rules
        .property_terms
        .iter()
        .any(|term| text.contains(term.as_str()));
    let policy = rules
        .policy_terms
        .iter()
        .any(|term| text.contains(term.as_str()));
    if property && policy {
        total += rules.macro_combo_bonus;
    }

    total.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_common::PipelineConfig;

    fn rules() -> ScoringRules {
        ScoringRules::compile(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn no_terms_no_score() {
        assert_eq!(score(&rules(), "a quiet day at the beach"), 0.0);
    }

    #[test]
    fn each_high_impact_term_adds_twenty() {
        assert_eq!(score(&rules(), "new government subsidy announced"), 40.0);
    }

    #[test]
    fn embedded_forms_still_count() {
        // "taxation" contains "tax"
        assert_eq!(score(&rules(), "taxation reforms are coming"), 20.0);
    }

    #[test]
    fn property_policy_pairing_earns_the_combo_bonus() {
        // "policy" is high-impact (20) and also a policy term; "housing"
        // is a property term, so the combo lands: 20 + 30
        assert_eq!(score(&rules(), "housing policy under review"), 50.0);
    }

    #[test]
    fn property_alone_earns_nothing_extra() {
        assert_eq!(score(&rules(), "a lovely apartment with a view"), 0.0);
    }

    #[test]
    fn total_caps_at_one_hundred() {
        let text = "government policy on the cbn interest rate, the mortgage \
                    rate, rent control and land reform, plus a new tax in the budget";
        assert_eq!(score(&rules(), text), 100.0);
    }
}
