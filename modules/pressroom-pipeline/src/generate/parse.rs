//! Parsing model output into structured draft content.
//!
//! Models follow the format contract most of the time, not always. Every
//! parser here degrades to something usable: the raw text always survives
//! in `body`, so a reviewer never loses copy to a formatting miss.

use pressroom_common::{DraftContent, Platform};

const HOOK_MARKER: &str = "HOOK:";
const THREAD_MARKER: &str = "THREAD:";
const CAPTION_MARKER: &str = "CAPTION:";
const SLIDE_PREFIX: &str = "SLIDE ";

const TWEET_LIMIT: usize = 280;
const MAX_THREAD: usize = 3;

pub fn parse_output(platform: Platform, raw: &str) -> DraftContent {
    match platform {
        Platform::Twitter => parse_twitter(raw),
        Platform::Instagram => parse_instagram(raw),
        Platform::Linkedin | Platform::Facebook => DraftContent {
            body: raw.trim().to_string(),
            ..DraftContent::default()
        },
    }
}

fn parse_twitter(raw: &str) -> DraftContent {
    let mut hook: Option<String> = None;
    let mut thread = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(HOOK_MARKER) {
            if hook.is_none() {
                hook = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix(THREAD_MARKER) {
            if thread.len() < MAX_THREAD {
                thread.push(rest.trim().to_string());
            }
        } else if hook.is_some() && thread.len() < MAX_THREAD {
            // models drop the THREAD marker often enough to tolerate it
            thread.push(line.to_string());
        }
    }

    let hook = hook.unwrap_or_else(|| truncate_chars(raw.trim(), TWEET_LIMIT));
    DraftContent {
        body: raw.trim().to_string(),
        hook: Some(hook),
        thread,
        ..DraftContent::default()
    }
}

fn parse_instagram(raw: &str) -> DraftContent {
    let mut slides = Vec::new();
    let mut caption_lines: Vec<String> = Vec::new();
    let mut in_caption = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.starts_with(SLIDE_PREFIX) {
            if let Some((_, text)) = line.split_once(':') {
                slides.push(text.trim().to_string());
                in_caption = false;
            }
        } else if let Some(rest) = line.strip_prefix(CAPTION_MARKER) {
            caption_lines.push(rest.trim().to_string());
            in_caption = true;
        } else if in_caption && !line.is_empty() {
            caption_lines.push(line.to_string());
        }
    }

    let body = if caption_lines.is_empty() {
        raw.trim().to_string()
    } else {
        caption_lines.join("\n")
    };
    DraftContent {
        body,
        slides,
        ..DraftContent::default()
    }
}

/// Truncates on character boundaries. Byte slicing would split multibyte
/// characters like the naira sign.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twitter_markers_split_hook_and_thread() {
        let raw = "HOOK: Rates just hit 18.5%.\n\
                   THREAD: Here is what that does to mortgages.\n\
                   THREAD: And what it does to rents.";
        let content = parse_output(Platform::Twitter, raw);
        assert_eq!(content.hook.as_deref(), Some("Rates just hit 18.5%."));
        assert_eq!(
            content.thread,
            vec![
                "Here is what that does to mortgages.".to_string(),
                "And what it does to rents.".to_string(),
            ]
        );
        assert_eq!(content.body, raw);
    }

    #[test]
    fn unmarked_lines_after_the_hook_join_the_thread() {
        let raw = "HOOK: Big news.\nFirst follow-up.\n\nSecond follow-up.";
        let content = parse_output(Platform::Twitter, raw);
        assert_eq!(
            content.thread,
            vec!["First follow-up.".to_string(), "Second follow-up.".to_string()]
        );
    }

    #[test]
    fn thread_caps_at_three_tweets() {
        let raw = "HOOK: h\nTHREAD: a\nTHREAD: b\nTHREAD: c\nTHREAD: d\ne";
        let content = parse_output(Platform::Twitter, raw);
        assert_eq!(content.thread.len(), 3);
        assert_eq!(content.thread, vec!["a", "b", "c"]);
    }

    #[test]
    fn only_the_first_hook_counts() {
        let raw = "HOOK: the real one\nHOOK: an imposter";
        let content = parse_output(Platform::Twitter, raw);
        assert_eq!(content.hook.as_deref(), Some("the real one"));
        assert!(content.thread.is_empty());
    }

    #[test]
    fn missing_hook_falls_back_to_truncated_raw() {
        // 300 naira signs: a byte-based cut would land mid-character
        let raw = "₦".repeat(300);
        let content = parse_output(Platform::Twitter, &raw);
        let hook = content.hook.unwrap();
        assert_eq!(hook.chars().count(), 280);
        assert_eq!(content.body, raw);
        assert!(content.thread.is_empty());
    }

    #[test]
    fn thread_markers_survive_without_a_hook() {
        let raw = "THREAD: still captured";
        let content = parse_output(Platform::Twitter, raw);
        assert_eq!(content.thread, vec!["still captured"]);
        assert_eq!(content.hook.as_deref(), Some("THREAD: still captured"));
    }

    #[test]
    fn instagram_slides_and_caption_parse() {
        let raw = "SLIDE 1: Rates up.\nSLIDE 2: Rents follow.\nCAPTION: What 18.5% means for you.";
        let content = parse_output(Platform::Instagram, raw);
        assert_eq!(content.slides, vec!["Rates up.", "Rents follow."]);
        assert_eq!(content.body, "What 18.5% means for you.");
    }

    #[test]
    fn caption_continuation_lines_are_kept() {
        let raw = "SLIDE 1: One.\nCAPTION: First line.\nSecond line.\n\nThird line after a blank.";
        let content = parse_output(Platform::Instagram, raw);
        assert_eq!(
            content.body,
            "First line.\nSecond line.\nThird line after a blank."
        );
    }

    #[test]
    fn instagram_without_caption_keeps_raw_body() {
        let raw = "SLIDE 1: Only slides came back.";
        let content = parse_output(Platform::Instagram, raw);
        assert_eq!(content.slides, vec!["Only slides came back."]);
        assert_eq!(content.body, raw);
    }

    #[test]
    fn prose_platforms_pass_through_trimmed() {
        let raw = "\n  A considered post about land titles.  \n";
        for platform in [Platform::Linkedin, Platform::Facebook] {
            let content = parse_output(platform, raw);
            assert_eq!(content.body, "A considered post about land titles.");
            assert!(content.hook.is_none());
            assert!(content.thread.is_empty());
            assert!(content.slides.is_empty());
        }
    }
}
