//! Risk tiering: should the brand touch this story at all?

use pressroom_common::RiskTier;

use super::ScoringRules;

/// Returns the tier, the flags that triggered it, and a human-readable
/// reason. Avoid keywords match as substrings and win outright; sensitive
/// keywords match whole words and escalate to Avoid at three or more.
pub(crate) fn assess(rules: &ScoringRules, text: &str) -> (RiskTier, Vec<String>, String) {
    if let Some(kw) = rules.avoid.iter().find(|kw| text.contains(kw.as_str())) {
        return (
            RiskTier::Avoid,
            vec![kw.clone()],
            format!("Contains prohibited keyword: {kw}"),
        );
    }

    let flags: Vec<String> = rules
        .sensitive
        .iter()
        .filter(|m| m.is_match(text))
        .map(|m| m.keyword.clone())
        .collect();

    match flags.len() {
        0 => (
            RiskTier::Safe,
            flags,
            "No risk flags detected".to_string(),
        ),
        1 | 2 => {
            let reason = format!("Contains sensitive content: {}", flags.join(", "));
            (RiskTier::Sensitive, flags, reason)
        }
        _ => {
            let reason = format!("Multiple sensitive keywords: {}", flags[..3].join(", "));
            (RiskTier::Avoid, flags, reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_common::PipelineConfig;

    fn rules() -> ScoringRules {
        ScoringRules::compile(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn clean_text_is_safe() {
        let (tier, flags, reason) = assess(&rules(), "rents rose in lagos this quarter");
        assert_eq!(tier, RiskTier::Safe);
        assert!(flags.is_empty());
        assert_eq!(reason, "No risk flags detected");
    }

    #[test]
    fn one_sensitive_keyword_flags_but_does_not_block() {
        let (tier, flags, reason) = assess(&rules(), "a protest over rent disrupted the market");
        assert_eq!(tier, RiskTier::Sensitive);
        assert_eq!(flags, vec!["protest".to_string()]);
        assert_eq!(reason, "Contains sensitive content: protest");
    }

    #[test]
    fn two_sensitive_keywords_stay_sensitive() {
        let (tier, flags, reason) = assess(&rules(), "a protest turned into a riot downtown");
        assert_eq!(tier, RiskTier::Sensitive);
        assert_eq!(flags.len(), 2);
        assert_eq!(reason, "Contains sensitive content: protest, riot");
    }

    #[test]
    fn three_sensitive_keywords_escalate_to_avoid() {
        let (tier, flags, reason) = assess(
            &rules(),
            "the accident during the protest led to a riot near the estate",
        );
        assert_eq!(tier, RiskTier::Avoid);
        assert_eq!(flags.len(), 3);
        assert_eq!(reason, "Multiple sensitive keywords: accident, protest, riot");
    }

    #[test]
    fn avoid_keyword_wins_before_sensitive_counting() {
        let (tier, flags, reason) = assess(&rules(), "explicit footage of the protest riot clash");
        assert_eq!(tier, RiskTier::Avoid);
        assert_eq!(flags, vec!["explicit".to_string()]);
        assert_eq!(reason, "Contains prohibited keyword: explicit");
    }

    #[test]
    fn sensitive_matching_is_whole_word() {
        // "studied" must not trip "died"
        let (tier, flags, _) = assess(&rules(), "she studied the housing market for a decade");
        assert_eq!(tier, RiskTier::Safe);
        assert!(flags.is_empty());
    }

    #[test]
    fn avoid_matching_is_substring() {
        let (tier, _, _) = assess(&rules(), "the xxxl warehouse listing");
        assert_eq!(tier, RiskTier::Avoid);
    }
}
