use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use super::{DeliveryOutcome, Digest, DigestSink};

/// Posts digests to a Slack-compatible incoming webhook.
pub struct WebhookSink {
    webhook_url: String,
    http: reqwest::Client,
}

impl WebhookSink {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            http: reqwest::Client::new(),
        }
    }
}

fn render(digest: &Digest) -> String {
    let mut lines = vec![format!(
        "*Content review digest*: {} draft(s) across {} item(s) awaiting review",
        digest.total_drafts,
        digest.groups.len()
    )];
    for group in &digest.groups {
        lines.push(format!(
            "• {} ({}, relevance {:.0})",
            group.item_title, group.item_source, group.relevance
        ));
        let slots: Vec<String> = group
            .drafts
            .iter()
            .map(|d| format!("{}/{}", d.platform, d.angle))
            .collect();
        lines.push(format!("    {}", slots.join(", ")));
    }
    lines.join("\n")
}

#[async_trait]
impl DigestSink for WebhookSink {
    async fn deliver(&self, digest: &Digest) -> DeliveryOutcome {
        let payload = json!({
            "text": render(digest),
            "unfurl_links": false,
        });

        match self.http.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => DeliveryOutcome::delivered(),
            Ok(response) => {
                let status = response.status();
                warn!(%status, "Digest webhook refused the payload");
                DeliveryOutcome::failed(format!("webhook returned {status}"))
            }
            Err(e) => {
                warn!(error = %e, "Digest webhook unreachable");
                DeliveryOutcome::failed(e.to_string())
            }
        }
    }
}
