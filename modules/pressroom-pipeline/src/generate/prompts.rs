//! Prompt assembly for draft generation.
//!
//! The format contract given to the model here must match what parse.rs
//! expects back, marker for marker.

use gen_client::GenerationRequest;
use pressroom_common::{Angle, Candidate, PipelineConfig, Platform, RiskTier};

pub fn build_request(
    candidate: &Candidate,
    platform: Platform,
    angle: Angle,
    config: &PipelineConfig,
) -> GenerationRequest {
    GenerationRequest {
        system: system_prompt().to_string(),
        prompt: task_prompt(candidate, platform, angle),
        temperature: config.generation_temperature,
        max_tokens: config.generation_max_tokens,
    }
}

fn system_prompt() -> &'static str {
    "You are a content strategist for a Nigerian real estate and investment \
     brand. You write clear, grounded social media copy about housing, land, \
     utilities and the economy. You never invent statistics. You write for a \
     Nigerian audience and use naira figures where amounts come up."
}

fn angle_instruction(angle: Angle) -> &'static str {
    match angle {
        Angle::Explainer => {
            "Write an explainer: break the story down for a reader hearing \
             about it for the first time. Plain language, no jargon."
        }
        Angle::Investor => {
            "Write for property investors: what does this mean for yields, \
             financing costs and where capital should sit."
        }
        Angle::Property => {
            "Write for renters and homeowners: what changes for people \
             paying rent or holding property right now."
        }
        Angle::DataBacked => {
            "Lead with the numbers in the story. Use only figures present \
             in the source material."
        }
        Angle::Contrarian => {
            "Take the contrarian view: what is everyone getting wrong about \
             this story. Stay factual, challenge the obvious reading."
        }
    }
}

fn format_contract(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => {
            "Format: first line `HOOK: <opening tweet, under 280 characters>`. \
             Each following tweet on its own line starting with `THREAD: `. \
             At most 4 tweets total."
        }
        Platform::Instagram => {
            "Format: carousel slides as lines `SLIDE 1: <text>` through at \
             most `SLIDE 5: <text>`, then a line `CAPTION: <caption>`. Keep \
             each slide under 20 words."
        }
        Platform::Linkedin => {
            "Format: a single post of 2 to 4 short paragraphs. No markers, \
             no hashtags beyond two at the end."
        }
        Platform::Facebook => {
            "Format: a single conversational post of 1 to 3 short \
             paragraphs. No markers."
        }
    }
}

fn task_prompt(candidate: &Candidate, platform: Platform, angle: Angle) -> String {
    let item = &candidate.item;
    let breakdown = &candidate.score.breakdown;

    let mut prompt = String::new();
    match &item.author {
        Some(author) => prompt.push_str(&format!("Source: {} by {author}\n", item.source)),
        None => prompt.push_str(&format!("Source: {}\n", item.source)),
    }
    if let Some(title) = &item.title {
        prompt.push_str(&format!("Title: {title}\n"));
    }
    prompt.push_str(&format!("Content: {}\n", item.body));
    if !breakdown.matched_keywords.is_empty() {
        prompt.push_str(&format!(
            "Matched topics: {}\n",
            breakdown.matched_keywords.join(", ")
        ));
    }
    prompt.push('\n');
    prompt.push_str(angle_instruction(angle));
    prompt.push_str("\n\n");
    prompt.push_str(format_contract(platform));
    if breakdown.risk == RiskTier::Sensitive {
        prompt.push_str(
            "\n\nThis story touches sensitive events. Keep the tone sober \
             and factual; no hype, no jokes.",
        );
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pressroom_common::{Item, Score, ScoreBreakdown};
    use uuid::Uuid;

    fn candidate(risk: RiskTier) -> Candidate {
        let item_id = Uuid::new_v4();
        Candidate {
            item: Item {
                id: item_id,
                source: "twitter".to_string(),
                external_id: "1".to_string(),
                title: Some("Fuel subsidy removed".to_string()),
                body: "The subsidy ends next month.".to_string(),
                url: None,
                author: None,
                published_at: Utc::now(),
                ingested_at: Utc::now(),
                likes: 10,
                shares: 2,
                comments: 1,
                views: 0,
                scored: true,
            },
            score: Score {
                id: Uuid::new_v4(),
                item_id,
                breakdown: ScoreBreakdown {
                    relevance: 75.0,
                    matched_keywords: vec!["subsidy".to_string(), "fuel".to_string()],
                    virality: 20.0,
                    macro_impact: 50.0,
                    risk,
                    sensitive_flags: Vec::new(),
                    risk_reason: "No risk flags detected".to_string(),
                    eligible: true,
                },
                scored_at: Utc::now(),
            },
        }
    }

    #[test]
    fn prompt_carries_source_material_and_contract() {
        let request = build_request(
            &candidate(RiskTier::Safe),
            Platform::Twitter,
            Angle::Explainer,
            &PipelineConfig::default(),
        );
        assert!(request.prompt.contains("Title: Fuel subsidy removed"));
        assert!(request.prompt.contains("Matched topics: subsidy, fuel"));
        assert!(request.prompt.contains("HOOK:"));
        assert!(request.prompt.contains("explainer"));
        assert!(!request.prompt.contains("sensitive events"));
        assert!(request.system.contains("content strategist"));
    }

    #[test]
    fn sensitive_items_get_the_tone_note() {
        let request = build_request(
            &candidate(RiskTier::Sensitive),
            Platform::Linkedin,
            Angle::Investor,
            &PipelineConfig::default(),
        );
        assert!(request.prompt.contains("sensitive events"));
        assert!(!request.prompt.contains("HOOK:"));
    }

    #[test]
    fn each_platform_names_its_own_markers() {
        let config = PipelineConfig::default();
        let c = candidate(RiskTier::Safe);
        let instagram = build_request(&c, Platform::Instagram, Angle::Explainer, &config);
        assert!(instagram.prompt.contains("SLIDE 1:"));
        assert!(instagram.prompt.contains("CAPTION:"));
        let facebook = build_request(&c, Platform::Facebook, Angle::Explainer, &config);
        assert!(!facebook.prompt.contains("SLIDE"));
    }
}
