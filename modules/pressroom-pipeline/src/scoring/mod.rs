//! Item scoring.
//!
//! Four independent passes over one item: relevance (what the item is
//! about), virality (how fast it is moving), macro impact (whether it
//! touches policy levers), and risk (whether we should touch it at all).
//! All four are pure given a compiled rule set and a clock, which is what
//! the tests lean on.

use chrono::{DateTime, Utc};
use pressroom_common::{Item, PipelineConfig, Result, RiskTier, ScoreBreakdown};
use regex::Regex;

mod cycle;
mod macro_impact;
mod relevance;
mod risk;
mod virality;

pub use cycle::{ScoreFailure, ScoreStats, Scorer};

/// Word-bounded, case-insensitive matcher for one keyword. "rent" matches
/// "rent is due" but not "renting".
pub(crate) struct WordMatch {
    pub(crate) keyword: String,
    regex: Regex,
}

impl WordMatch {
    fn compile(keyword: &str) -> Result<Self> {
        let keyword = keyword.to_lowercase();
        let pattern = format!(r"\b{}\b", regex::escape(&keyword));
        let regex = Regex::new(&pattern).map_err(anyhow::Error::from)?;
        Ok(Self { keyword, regex })
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn compile_all(keywords: &[String]) -> Result<Vec<WordMatch>> {
    keywords.iter().map(|k| WordMatch::compile(k)).collect()
}

fn lowercase_all(terms: &[String]) -> Vec<String> {
    terms.iter().map(|t| t.to_lowercase()).collect()
}

/// A snapshot's keyword sets compiled for matching. Built once per cycle.
pub struct ScoringRules {
    pub(crate) relevance_threshold: f64,
    pub(crate) keyword_match_points: f64,
    pub(crate) keyword_base_cap: f64,
    pub(crate) priority_bonus: f64,
    pub(crate) category_bonus: f64,
    pub(crate) macro_term_points: f64,
    pub(crate) macro_combo_bonus: f64,
    pub(crate) virality_velocity_divisor: f64,
    pub(crate) virality_decay_hours: f64,
    pub(crate) primary: Vec<WordMatch>,
    pub(crate) priority: Vec<WordMatch>,
    pub(crate) categories: Vec<Vec<WordMatch>>,
    pub(crate) sensitive: Vec<WordMatch>,
    pub(crate) avoid: Vec<String>,
    pub(crate) high_impact: Vec<String>,
    pub(crate) property_terms: Vec<String>,
    pub(crate) policy_terms: Vec<String>,
}

impl ScoringRules {
    pub fn compile(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            relevance_threshold: config.relevance_threshold,
            keyword_match_points: config.keyword_match_points,
            keyword_base_cap: config.keyword_base_cap,
            priority_bonus: config.priority_bonus,
            category_bonus: config.category_bonus,
            macro_term_points: config.macro_term_points,
            macro_combo_bonus: config.macro_combo_bonus,
            virality_velocity_divisor: config.virality_velocity_divisor,
            virality_decay_hours: config.virality_decay_hours,
            primary: compile_all(&config.primary_keywords)?,
            priority: compile_all(&config.priority_keywords)?,
            categories: config
                .keyword_categories
                .values()
                .map(|kws| compile_all(kws))
                .collect::<Result<_>>()?,
            sensitive: compile_all(&config.sensitive_keywords)?,
            avoid: lowercase_all(&config.avoid_keywords),
            high_impact: lowercase_all(&config.high_impact_terms),
            property_terms: lowercase_all(&config.property_terms),
            policy_terms: lowercase_all(&config.policy_terms),
        })
    }

    /// Score one item at a fixed instant. Same item, same clock, same
    /// breakdown.
    pub fn score_at(&self, item: &Item, now: DateTime<Utc>) -> ScoreBreakdown {
        let text = item.full_text().to_lowercase();

        let (relevance, matched_keywords) = relevance::score(self, &text);
        let virality = virality::score(self, item, now);
        let macro_impact = macro_impact::score(self, &text);
        let (risk, sensitive_flags, risk_reason) = risk::assess(self, &text);

        let eligible = relevance >= self.relevance_threshold && risk != RiskTier::Avoid;

        ScoreBreakdown {
            relevance,
            matched_keywords,
            virality,
            macro_impact,
            risk,
            sensitive_flags,
            risk_reason,
            eligible,
        }
    }

    pub fn score(&self, item: &Item) -> ScoreBreakdown {
        self.score_at(item, Utc::now())
    }
}
