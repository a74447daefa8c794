use std::collections::HashMap;
use std::env;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::types::Platform;

/// Process-level configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// "gemini" or "openai".
    pub generation_backend: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub web_host: String,
    pub web_port: u16,
    pub digest_webhook_url: Option<String>,
    /// Hours between background pipeline runs. Zero disables the loop.
    pub pipeline_interval_hours: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            generation_backend: env::var("GENERATION_BACKEND")
                .unwrap_or_else(|_| "gemini".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            digest_webhook_url: env::var("DIGEST_WEBHOOK_URL").ok(),
            pipeline_interval_hours: env::var("PIPELINE_INTERVAL_HOURS")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("PIPELINE_INTERVAL_HOURS must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

/// Tunable pipeline behavior: keyword sets, scoring weights, angle
/// thresholds, batch sizes. Defaults are compiled in; rows in the
/// configuration table override individual fields at snapshot load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub relevance_threshold: f64,
    pub max_items_per_cycle: usize,
    pub max_candidates_per_cycle: usize,
    pub generation_concurrency: usize,
    pub generation_temperature: f32,
    pub generation_max_tokens: u32,

    /// Whole-word matches here build the relevance base score.
    pub primary_keywords: Vec<String>,
    pub priority_keywords: Vec<String>,
    pub keyword_categories: HashMap<String, Vec<String>>,
    /// Whole-word matches; three or more push the item to `avoid`.
    pub sensitive_keywords: Vec<String>,
    /// Substring matches; any single hit is an immediate `avoid`.
    pub avoid_keywords: Vec<String>,
    /// Substring matches feeding the macro-impact score.
    pub high_impact_terms: Vec<String>,
    pub property_terms: Vec<String>,
    pub policy_terms: Vec<String>,
    /// Matched-keyword subset that unlocks the property angle. Wider than
    /// `property_terms`, which feeds the macro combo.
    pub property_angle_terms: Vec<String>,

    pub keyword_match_points: f64,
    pub keyword_base_cap: f64,
    pub priority_bonus: f64,
    pub category_bonus: f64,
    pub macro_term_points: f64,
    pub macro_combo_bonus: f64,
    pub virality_velocity_divisor: f64,
    pub virality_decay_hours: f64,

    pub explainer_min_relevance: f64,
    pub investor_min_macro: f64,
    pub data_backed_min_virality: f64,
    pub contrarian_min_relevance: f64,
    pub contrarian_min_macro: f64,
    pub max_angles: usize,

    pub platforms: Vec<Platform>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 60.0,
            max_items_per_cycle: 20,
            max_candidates_per_cycle: 10,
            generation_concurrency: 4,
            generation_temperature: 0.7,
            generation_max_tokens: 1024,

            primary_keywords: strings(&[
                "real estate",
                "land",
                "rent",
                "housing",
                "mortgage",
                "property",
                "power",
                "gas",
                "inflation",
                "naira",
                "policy",
                "investment",
                "lagos",
                "abuja",
                "nigeria",
                "cbn",
                "economy",
                "subsidy",
                "fuel",
                "electricity",
                "nepa",
                "landlord",
                "tenant",
            ]),
            priority_keywords: strings(&[
                "real estate",
                "housing",
                "property",
                "land",
                "mortgage",
                "rent",
                "developer",
                "construction",
                "residential",
                "commercial",
                "apartment",
            ]),
            keyword_categories: HashMap::from([
                (
                    "property".to_string(),
                    strings(&[
                        "real estate",
                        "housing",
                        "property",
                        "land",
                        "rent",
                        "mortgage",
                        "landlord",
                        "tenant",
                    ]),
                ),
                (
                    "economy".to_string(),
                    strings(&[
                        "inflation",
                        "naira",
                        "cbn",
                        "policy",
                        "economy",
                        "investment",
                        "subsidy",
                    ]),
                ),
                (
                    "utilities".to_string(),
                    strings(&["power", "gas", "fuel", "electricity", "nepa"]),
                ),
                (
                    "location".to_string(),
                    strings(&["lagos", "abuja", "nigeria"]),
                ),
            ]),
            sensitive_keywords: strings(&[
                "death", "died", "killed", "tragedy", "accident", "bomb", "terror", "kidnap",
                "murder", "protest", "riot", "clash",
            ]),
            avoid_keywords: strings(&["explicit", "nsfw", "porn", "xxx"]),
            high_impact_terms: strings(&[
                "policy",
                "government",
                "cbn",
                "central bank",
                "regulation",
                "subsidy",
                "interest rate",
                "mortgage rate",
                "housing crisis",
                "rent control",
                "land reform",
                "tax",
                "budget",
            ]),
            property_terms: strings(&["real estate", "housing", "rent", "property", "land"]),
            policy_terms: strings(&["policy", "government", "regulation", "law"]),
            property_angle_terms: strings(&[
                "real estate",
                "housing",
                "rent",
                "property",
                "land",
                "mortgage",
            ]),

            keyword_match_points: 10.0,
            keyword_base_cap: 60.0,
            priority_bonus: 15.0,
            category_bonus: 5.0,
            macro_term_points: 20.0,
            macro_combo_bonus: 30.0,
            virality_velocity_divisor: 100.0,
            virality_decay_hours: 24.0,

            explainer_min_relevance: 70.0,
            investor_min_macro: 50.0,
            data_backed_min_virality: 50.0,
            contrarian_min_relevance: 80.0,
            contrarian_min_macro: 60.0,
            max_angles: 3,

            platforms: Platform::all().to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Apply one configuration-table row to this snapshot. Unknown keys and
    /// type mismatches are errors so the loader can log and skip them.
    pub fn apply_override(&mut self, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        match key {
            "relevance_threshold" => self.relevance_threshold = as_f64(value)?,
            "max_items_per_cycle" => self.max_items_per_cycle = as_usize(value)?,
            "max_candidates_per_cycle" => self.max_candidates_per_cycle = as_usize(value)?,
            "generation_concurrency" => self.generation_concurrency = as_usize(value)?,
            "generation_temperature" => self.generation_temperature = as_f64(value)? as f32,
            "generation_max_tokens" => self.generation_max_tokens = as_usize(value)? as u32,
            "primary_keywords" => self.primary_keywords = as_strings(value)?,
            "priority_keywords" => self.priority_keywords = as_strings(value)?,
            "keyword_categories" => {
                self.keyword_categories = serde_json::from_value(value.clone())?
            }
            "sensitive_keywords" => self.sensitive_keywords = as_strings(value)?,
            "avoid_keywords" => self.avoid_keywords = as_strings(value)?,
            "high_impact_terms" => self.high_impact_terms = as_strings(value)?,
            "property_terms" => self.property_terms = as_strings(value)?,
            "policy_terms" => self.policy_terms = as_strings(value)?,
            "property_angle_terms" => self.property_angle_terms = as_strings(value)?,
            "keyword_match_points" => self.keyword_match_points = as_f64(value)?,
            "keyword_base_cap" => self.keyword_base_cap = as_f64(value)?,
            "priority_bonus" => self.priority_bonus = as_f64(value)?,
            "category_bonus" => self.category_bonus = as_f64(value)?,
            "macro_term_points" => self.macro_term_points = as_f64(value)?,
            "macro_combo_bonus" => self.macro_combo_bonus = as_f64(value)?,
            "virality_velocity_divisor" => self.virality_velocity_divisor = as_f64(value)?,
            "virality_decay_hours" => self.virality_decay_hours = as_f64(value)?,
            "explainer_min_relevance" => self.explainer_min_relevance = as_f64(value)?,
            "investor_min_macro" => self.investor_min_macro = as_f64(value)?,
            "data_backed_min_virality" => self.data_backed_min_virality = as_f64(value)?,
            "contrarian_min_relevance" => self.contrarian_min_relevance = as_f64(value)?,
            "contrarian_min_macro" => self.contrarian_min_macro = as_f64(value)?,
            "max_angles" => self.max_angles = as_usize(value)?,
            "platforms" => self.platforms = serde_json::from_value(value.clone())?,
            other => return Err(anyhow!("unknown configuration key: {other}")),
        }
        Ok(())
    }
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn as_f64(value: &serde_json::Value) -> anyhow::Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow!("expected a number, got {value}"))
}

fn as_usize(value: &serde_json::Value) -> anyhow::Result<usize> {
    value
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| anyhow!("expected a non-negative integer, got {value}"))
}

fn as_strings(value: &serde_json::Value) -> anyhow::Result<Vec<String>> {
    serde_json::from_value(value.clone()).map_err(|e| anyhow!("expected a string list: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_cover_every_keyword_set() {
        let config = PipelineConfig::default();
        assert_eq!(config.relevance_threshold, 60.0);
        assert_eq!(config.primary_keywords.len(), 23);
        assert_eq!(config.priority_keywords.len(), 11);
        assert_eq!(config.keyword_categories.len(), 4);
        assert_eq!(config.sensitive_keywords.len(), 12);
        assert_eq!(config.avoid_keywords.len(), 4);
        assert_eq!(config.high_impact_terms.len(), 13);
        assert_eq!(config.platforms.len(), 4);
    }

    #[test]
    fn categories_partition_the_primary_keywords() {
        let config = PipelineConfig::default();
        let categorized: usize = config.keyword_categories.values().map(|v| v.len()).sum();
        assert_eq!(categorized, config.primary_keywords.len());
    }

    #[test]
    fn override_replaces_scalar_fields() {
        let mut config = PipelineConfig::default();
        config
            .apply_override("relevance_threshold", &json!(75.5))
            .unwrap();
        assert_eq!(config.relevance_threshold, 75.5);

        config.apply_override("max_angles", &json!(2)).unwrap();
        assert_eq!(config.max_angles, 2);
    }

    #[test]
    fn override_replaces_keyword_lists() {
        let mut config = PipelineConfig::default();
        config
            .apply_override("avoid_keywords", &json!(["banned", "blocked"]))
            .unwrap();
        assert_eq!(config.avoid_keywords, vec!["banned", "blocked"]);
    }

    #[test]
    fn override_parses_platform_lists() {
        let mut config = PipelineConfig::default();
        config
            .apply_override("platforms", &json!(["twitter", "linkedin"]))
            .unwrap();
        assert_eq!(config.platforms, vec![Platform::Twitter, Platform::Linkedin]);
    }

    #[test]
    fn override_rejects_unknown_keys_and_bad_types() {
        let mut config = PipelineConfig::default();
        assert!(config.apply_override("no_such_key", &json!(1)).is_err());
        assert!(config
            .apply_override("relevance_threshold", &json!("high"))
            .is_err());
        // a failed override must leave the previous value intact
        assert_eq!(config.relevance_threshold, 60.0);
    }
}
