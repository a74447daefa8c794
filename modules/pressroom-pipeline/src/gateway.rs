//! Ingestion gateway: validation and deduplicated intake of raw items.

use std::fmt;

use async_trait::async_trait;
use pressroom_common::{Item, PressroomError, RawItem, Result};
use pressroom_store::Store;
use serde::Serialize;
use tracing::{info, warn};

/// A source of raw items: a social feed poller, a scraper, a replayed
/// capture. The gateway does not care where records come from.
#[async_trait]
pub trait ItemFeed: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<Vec<RawItem>>;
}

/// What happened to one submitted item.
pub enum Submission {
    Created(Item),
    /// The (source, external_id) pair was already ingested.
    Skipped,
}

pub struct Gateway {
    store: Store,
}

impl Gateway {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Validates and stores one raw item. Duplicates are reported, not
    /// errors.
    pub async fn submit(&self, raw: RawItem) -> Result<Submission> {
        validate(&raw)?;
        match self.store.insert_item(&raw).await? {
            Some(item) => {
                info!(item = %item.id, source = %item.source, "Ingested item");
                Ok(Submission::Created(item))
            }
            None => Ok(Submission::Skipped),
        }
    }

    /// Drains one feed through the gateway. Errs only when the feed
    /// itself cannot be read.
    pub async fn pull(&self, feed: &dyn ItemFeed) -> Result<IngestStats> {
        let raws = feed.fetch().await?;
        Ok(self.submit_batch(&raws).await)
    }

    /// Runs a whole batch, isolating failures per item. The batch itself
    /// never fails; bad entries land in the stats.
    pub async fn submit_batch(&self, raws: &[RawItem]) -> IngestStats {
        let mut stats = IngestStats::default();
        for raw in raws {
            match self.submit(raw.clone()).await {
                Ok(Submission::Created(_)) => stats.created += 1,
                Ok(Submission::Skipped) => stats.skipped += 1,
                Err(e) => {
                    warn!(
                        source = %raw.source,
                        external_id = %raw.external_id,
                        error = %e,
                        "Rejected item"
                    );
                    stats.rejected += 1;
                    stats.failures.push(ItemFailure {
                        source: raw.source.clone(),
                        external_id: raw.external_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        info!("{stats}");
        stats
    }
}

fn validate(raw: &RawItem) -> Result<()> {
    if raw.source.trim().is_empty() {
        return Err(PressroomError::Validation("source must not be empty".to_string()));
    }
    if raw.external_id.trim().is_empty() {
        return Err(PressroomError::Validation(
            "external_id must not be empty".to_string(),
        ));
    }
    if raw.body.trim().is_empty() {
        return Err(PressroomError::Validation("body must not be empty".to_string()));
    }
    if raw.likes < 0 || raw.shares < 0 || raw.comments < 0 || raw.views < 0 {
        return Err(PressroomError::Validation(
            "engagement counts must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Serialize)]
pub struct IngestStats {
    pub created: u32,
    pub skipped: u32,
    pub rejected: u32,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Serialize)]
pub struct ItemFailure {
    pub source: String,
    pub external_id: String,
    pub error: String,
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Ingest Complete ===")?;
        writeln!(f, "Created:   {}", self.created)?;
        writeln!(f, "Skipped:   {}", self.skipped)?;
        writeln!(f, "Rejected:  {}", self.rejected)?;
        Ok(())
    }
}
