//! Draft generation: turns eligible scored items into platform drafts.

pub mod parse;
pub mod prompts;

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use gen_client::TextGenerator;
use pressroom_common::{Angle, Candidate, NewDraft, PipelineConfig, Platform, Result};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::angles::select_angles;
use crate::traits::PipelineStore;

pub struct Orchestrator {
    store: Arc<dyn PipelineStore>,
    generator: Arc<dyn TextGenerator>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn PipelineStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    /// Drafts every platform and angle pairing for the top eligible,
    /// unclaimed candidates. Model calls run concurrently per candidate;
    /// writes are sequential so a failed call never burns its slot.
    pub async fn run_cycle(&self, config: &PipelineConfig) -> Result<GenerationStats> {
        let candidates = self
            .store
            .generation_candidates(config.max_candidates_per_cycle)
            .await?;

        let mut stats = GenerationStats {
            candidates: candidates.len() as u32,
            ..GenerationStats::default()
        };

        for candidate in &candidates {
            self.generate_for_candidate(candidate, config, &mut stats).await;
        }

        info!("{stats}");
        Ok(stats)
    }

    async fn generate_for_candidate(
        &self,
        candidate: &Candidate,
        config: &PipelineConfig,
        stats: &mut GenerationStats,
    ) {
        let angles = select_angles(&candidate.score.breakdown, config);
        let mut pairs = Vec::new();
        for &platform in &config.platforms {
            for &angle in &angles {
                pairs.push((platform, angle));
            }
        }

        let outputs: Vec<_> = stream::iter(pairs.into_iter().map(|(platform, angle)| {
            let generator = Arc::clone(&self.generator);
            let request = prompts::build_request(candidate, platform, angle, config);
            async move {
                let output = generator.generate(&request).await;
                (platform, angle, output)
            }
        }))
        .buffer_unordered(config.generation_concurrency)
        .collect()
        .await;

        for (platform, angle, output) in outputs {
            let raw = match output {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(
                        item = %candidate.item.id,
                        platform = %platform,
                        angle = %angle,
                        error = %e,
                        "Generation failed"
                    );
                    stats.generation_failures += 1;
                    stats.failures.push(PairFailure {
                        item_id: candidate.item.id,
                        platform,
                        angle,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let draft = NewDraft {
                score_id: candidate.score.id,
                platform,
                angle,
                content: parse::parse_output(platform, &raw),
                model: self.generator.model_id().to_string(),
            };
            match self.store.save_draft(&draft).await {
                Ok(Some(saved)) => {
                    stats.drafts_created += 1;
                    info!(
                        draft = %saved.id,
                        item = %candidate.item.id,
                        platform = %platform,
                        angle = %angle,
                        "Draft created"
                    );
                }
                Ok(None) => stats.slots_occupied += 1,
                Err(e) => {
                    warn!(
                        item = %candidate.item.id,
                        platform = %platform,
                        angle = %angle,
                        error = %e,
                        "Failed to persist draft"
                    );
                    stats.write_failures += 1;
                    stats.failures.push(PairFailure {
                        item_id: candidate.item.id,
                        platform,
                        angle,
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct GenerationStats {
    pub candidates: u32,
    pub drafts_created: u32,
    pub slots_occupied: u32,
    pub generation_failures: u32,
    pub write_failures: u32,
    pub failures: Vec<PairFailure>,
}

/// One (item, platform, angle) pairing that produced no draft.
#[derive(Debug, Serialize)]
pub struct PairFailure {
    pub item_id: Uuid,
    pub platform: Platform,
    pub angle: Angle,
    pub error: String,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Generation Cycle Complete ===")?;
        writeln!(f, "Candidates:          {}", self.candidates)?;
        writeln!(f, "Drafts created:      {}", self.drafts_created)?;
        writeln!(f, "Slots occupied:      {}", self.slots_occupied)?;
        writeln!(f, "Generation failures: {}", self.generation_failures)?;
        writeln!(f, "Write failures:      {}", self.write_failures)?;
        Ok(())
    }
}
