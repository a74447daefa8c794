use std::fmt;

use pressroom_common::{PipelineConfig, Result, RiskTier};
use pressroom_store::Store;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::ScoringRules;

/// Runs one scoring pass over the unscored backlog.
pub struct Scorer {
    store: Store,
}

impl Scorer {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Scores up to `max_items_per_cycle` of the oldest unscored items.
    /// A persistence failure on one item is logged and counted; the rest
    /// of the batch still runs.
    pub async fn run_cycle(&self, config: &PipelineConfig) -> Result<ScoreStats> {
        let rules = ScoringRules::compile(config)?;
        let items = self
            .store
            .unscored_items(config.max_items_per_cycle as i64)
            .await?;

        let mut stats = ScoreStats::default();
        for item in items {
            let breakdown = rules.score(&item);
            match self.store.insert_score(item.id, &breakdown).await {
                Ok(_) => {
                    stats.scored += 1;
                    if breakdown.eligible {
                        stats.eligible += 1;
                    }
                    match breakdown.risk {
                        RiskTier::Safe => stats.safe += 1,
                        RiskTier::Sensitive => stats.sensitive += 1,
                        RiskTier::Avoid => stats.avoided += 1,
                    }
                    info!(
                        item = %item.id,
                        relevance = breakdown.relevance,
                        risk = %breakdown.risk,
                        eligible = breakdown.eligible,
                        "Scored item"
                    );
                }
                Err(e) => {
                    warn!(item = %item.id, error = %e, "Failed to persist score");
                    stats.failures.push(ScoreFailure {
                        item_id: item.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!("{stats}");
        Ok(stats)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ScoreStats {
    pub scored: u32,
    pub eligible: u32,
    pub safe: u32,
    pub sensitive: u32,
    pub avoided: u32,
    pub failures: Vec<ScoreFailure>,
}

#[derive(Debug, Serialize)]
pub struct ScoreFailure {
    pub item_id: Uuid,
    pub error: String,
}

impl fmt::Display for ScoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Scoring Cycle Complete ===")?;
        writeln!(f, "Items scored:    {}", self.scored)?;
        writeln!(f, "  Eligible:      {}", self.eligible)?;
        writeln!(f, "  Safe:          {}", self.safe)?;
        writeln!(f, "  Sensitive:     {}", self.sensitive)?;
        writeln!(f, "  Avoided:       {}", self.avoided)?;
        writeln!(f, "Failed:          {}", self.failures.len())?;
        Ok(())
    }
}
