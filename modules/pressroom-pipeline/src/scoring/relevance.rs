//! Relevance: how squarely the item sits in our coverage area.

use super::ScoringRules;

/// Returns the relevance score and the distinct primary keywords that hit,
/// in configuration order. An item that matches no primary keyword scores
/// zero outright; bonuses never rescue it.
pub(crate) fn score(rules: &ScoringRules, text: &str) -> (f64, Vec<String>) {
    let matched: Vec<String> = rules
        .primary
        .iter()
        .filter(|m| m.is_match(text))
        .map(|m| m.keyword.clone())
        .collect();

    if matched.is_empty() {
        return (0.0, matched);
    }

    let base = (matched.len() as f64 * rules.keyword_match_points).min(rules.keyword_base_cap);

    let priority_hits = rules.priority.iter().filter(|m| m.is_match(text)).count();
    let priority = priority_hits as f64 * rules.priority_bonus;

    let categories_hit = rules
        .categories
        .iter()
        .filter(|kws| kws.iter().any(|m| m.is_match(text)))
        .count();
    let category = categories_hit as f64 * rules.category_bonus;

    ((base + priority + category).min(100.0), matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_common::PipelineConfig;

    fn rules() -> ScoringRules {
        ScoringRules::compile(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn no_primary_match_means_zero_regardless_of_priority_terms() {
        // "developer" is a priority keyword but not a primary one
        let (score, matched) = score(&rules(), "a developer spoke at the conference");
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn single_match_accumulates_priority_and_category_bonuses() {
        // rent: base 10, priority +15, property category +5
        let (score, matched) = score(&rules(), "rent is due on friday");
        assert_eq!(score, 30.0);
        assert_eq!(matched, vec!["rent".to_string()]);
    }

    #[test]
    fn two_keywords_in_two_categories() {
        // rent + lagos: base 20, rent is priority +15, property and
        // location categories +10
        let (score, matched) = score(&rules(), "rent in lagos keeps climbing");
        assert_eq!(score, 45.0);
        assert_eq!(matched, vec!["rent".to_string(), "lagos".to_string()]);
    }

    #[test]
    fn adding_a_priority_keyword_never_lowers_the_score() {
        let (fewer, _) = score(&rules(), "rent in lagos keeps climbing");
        // mortgage adds base 10 and priority 15 on top of the 45 baseline
        let (more, _) = score(&rules(), "rent and mortgage costs in lagos keep climbing");
        assert!(more > fewer);
        assert_eq!(more, 70.0);
    }

    #[test]
    fn matches_are_whole_words_only() {
        let (score, matched) = score(&rules(), "renting and landlords were discussed");
        // "renting" must not hit "rent"; "landlords" must not hit "landlord"
        assert_eq!(score, 0.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let (one, _) = score(&rules(), "rent rent rent rent");
        let (also_one, _) = score(&rules(), "rent");
        assert_eq!(one, also_one);
    }

    #[test]
    fn base_score_caps_before_bonuses() {
        // seven distinct primary keywords, base would be 70 but caps at 60
        let text = "power gas fuel electricity nepa inflation naira";
        let (score, matched) = score(&rules(), text);
        assert_eq!(matched.len(), 7);
        // 60 base + 0 priority + 2 categories (utilities, economy) = 70
        assert_eq!(score, 70.0);
    }

    #[test]
    fn total_never_exceeds_one_hundred() {
        let text = "real estate land rent housing mortgage property power gas \
                    inflation naira policy investment lagos abuja nigeria cbn \
                    economy subsidy fuel electricity nepa landlord tenant \
                    developer construction residential commercial apartment";
        let (score, _) = score(&rules(), text);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn multiword_keywords_match_across_spaces() {
        let (score, matched) = score(&rules(), "the real estate market is hot");
        assert!(matched.contains(&"real estate".to_string()));
        assert!(score > 0.0);
    }
}
