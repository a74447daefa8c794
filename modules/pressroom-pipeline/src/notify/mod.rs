//! Review digests: telling humans there is work waiting.

pub mod noop;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pressroom_common::{DigestEntry, Result};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::traits::PipelineStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    Skipped,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct DeliveryOutcome {
    pub status: DeliveryStatus,
    pub detail: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered() -> Self {
        Self { status: DeliveryStatus::Delivered, detail: None }
    }

    pub fn skipped(detail: &str) -> Self {
        Self {
            status: DeliveryStatus::Skipped,
            detail: Some(detail.to_string()),
        }
    }

    pub fn failed(detail: String) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            detail: Some(detail),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub total_drafts: usize,
    pub groups: Vec<DigestGroup>,
}

/// One source item and every pending draft written from it.
#[derive(Debug, Serialize)]
pub struct DigestGroup {
    pub item_id: Uuid,
    pub item_title: String,
    pub item_source: String,
    pub relevance: f64,
    pub drafts: Vec<DigestEntry>,
}

/// Folds store entries, which arrive ordered by item, into per-item groups.
pub fn build_digest(entries: Vec<DigestEntry>, now: DateTime<Utc>) -> Digest {
    let total_drafts = entries.len();
    let mut groups: Vec<DigestGroup> = Vec::new();
    for entry in entries {
        if let Some(group) = groups.last_mut() {
            if group.item_id == entry.item_id {
                group.drafts.push(entry);
                continue;
            }
        }
        groups.push(DigestGroup {
            item_id: entry.item_id,
            item_title: entry.item_title.clone(),
            item_source: entry.item_source.clone(),
            relevance: entry.relevance,
            drafts: vec![entry],
        });
    }
    Digest {
        generated_at: now,
        total_drafts,
        groups,
    }
}

// ==========================================================
// DigestSink
// ==========================================================

/// Where a digest goes. Delivery problems are outcomes, not errors: a
/// digest is advisory and the pipeline never fails over one.
#[async_trait]
pub trait DigestSink: Send + Sync {
    async fn deliver(&self, digest: &Digest) -> DeliveryOutcome;
}

pub struct Digests {
    store: Arc<dyn PipelineStore>,
    sink: Arc<dyn DigestSink>,
}

impl Digests {
    pub fn new(store: Arc<dyn PipelineStore>, sink: Arc<dyn DigestSink>) -> Self {
        Self { store, sink }
    }

    /// Sends one digest covering every pending draft. When nothing is
    /// pending the sink is never called.
    pub async fn send_pending(&self) -> Result<DeliveryOutcome> {
        let entries = self.store.pending_digest_entries().await?;
        if entries.is_empty() {
            return Ok(DeliveryOutcome::skipped("no pending drafts"));
        }

        let digest = build_digest(entries, Utc::now());
        let outcome = self.sink.deliver(&digest).await;
        info!(
            status = ?outcome.status,
            drafts = digest.total_drafts,
            items = digest.groups.len(),
            "Digest delivery"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_common::{Angle, Platform};

    fn entry(item_id: Uuid, title: &str, platform: Platform, angle: Angle) -> DigestEntry {
        DigestEntry {
            draft_id: Uuid::new_v4(),
            item_id,
            item_title: title.to_string(),
            item_source: "twitter".to_string(),
            relevance: 80.0,
            platform,
            angle,
        }
    }

    #[test]
    fn adjacent_entries_for_one_item_share_a_group() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entries = vec![
            entry(a, "Rates up", Platform::Twitter, Angle::Explainer),
            entry(a, "Rates up", Platform::Linkedin, Angle::Explainer),
            entry(b, "Subsidy gone", Platform::Twitter, Angle::Investor),
        ];

        let digest = build_digest(entries, Utc::now());

        assert_eq!(digest.total_drafts, 3);
        assert_eq!(digest.groups.len(), 2);
        assert_eq!(digest.groups[0].item_id, a);
        assert_eq!(digest.groups[0].drafts.len(), 2);
        assert_eq!(digest.groups[1].item_title, "Subsidy gone");
    }

    #[test]
    fn empty_entries_build_an_empty_digest() {
        let digest = build_digest(Vec::new(), Utc::now());
        assert_eq!(digest.total_drafts, 0);
        assert!(digest.groups.is_empty());
    }
}
