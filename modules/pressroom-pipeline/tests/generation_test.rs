use std::collections::HashSet;
use std::sync::Arc;

use gen_client::TextGenerator;
use pressroom_common::{Angle, DraftStatus, PipelineConfig, Platform, RiskTier};
use pressroom_pipeline::generate::Orchestrator;
use pressroom_pipeline::testing::{candidate, MemoryStore, MockGenerator};
use pressroom_pipeline::traits::PipelineStore;

fn orchestrator(
    store: &Arc<MemoryStore>,
    generator: &Arc<MockGenerator>,
) -> Orchestrator {
    Orchestrator::new(
        Arc::clone(store) as Arc<dyn PipelineStore>,
        Arc::clone(generator) as Arc<dyn TextGenerator>,
    )
}

// ============================================================================
// Basic behavior tests
// ============================================================================

#[tokio::test]
async fn creates_one_draft_per_platform_angle_pair() {
    // relevance 75 earns the explainer, "housing" earns the property angle
    let store = Arc::new(MemoryStore::new().with_candidate(candidate(75.0, 20.0, 10.0, &["housing"])));
    let generator = Arc::new(MockGenerator::new());

    let stats = orchestrator(&store, &generator)
        .run_cycle(&PipelineConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.candidates, 1);
    assert_eq!(stats.drafts_created, 8);
    assert_eq!(stats.generation_failures, 0);
    assert_eq!(generator.calls(), 8);

    let drafts = store.drafts_saved();
    assert!(drafts.iter().all(|d| d.status == DraftStatus::Pending));
    let slots: HashSet<(Platform, Angle)> = drafts.iter().map(|d| (d.platform, d.angle)).collect();
    assert_eq!(slots.len(), 8);
    for platform in Platform::all() {
        assert!(slots.contains(&(platform, Angle::Explainer)));
        assert!(slots.contains(&(platform, Angle::Property)));
    }
}

#[tokio::test]
async fn rerun_fills_no_duplicate_slots() {
    let store = Arc::new(MemoryStore::new().with_candidate(candidate(75.0, 20.0, 10.0, &["housing"])));
    let generator = Arc::new(MockGenerator::new());
    let config = PipelineConfig::default();

    let first = orchestrator(&store, &generator).run_cycle(&config).await.unwrap();
    assert_eq!(first.drafts_created, 8);

    // the score now has drafts, so it is no longer a candidate at all
    let second = orchestrator(&store, &generator).run_cycle(&config).await.unwrap();
    assert_eq!(second.candidates, 0);
    assert_eq!(second.drafts_created, 0);
    assert_eq!(store.draft_count(), 8);
}

#[tokio::test]
async fn model_output_is_parsed_per_platform() {
    let store = Arc::new(MemoryStore::new().with_candidate(candidate(62.0, 10.0, 5.0, &[])));
    let generator = Arc::new(
        MockGenerator::new().with_default_reply("HOOK: Short take.\nTHREAD: Longer take."),
    );

    orchestrator(&store, &generator)
        .run_cycle(&PipelineConfig::default())
        .await
        .unwrap();

    let drafts = store.drafts_saved();
    assert_eq!(drafts.len(), 4);
    for draft in drafts {
        match draft.platform {
            Platform::Twitter => {
                assert_eq!(draft.hook.as_deref(), Some("Short take."));
                assert_eq!(draft.thread, vec!["Longer take.".to_string()]);
            }
            _ => {
                assert!(draft.hook.is_none());
                assert_eq!(draft.body, "HOOK: Short take.\nTHREAD: Longer take.");
            }
        }
        assert_eq!(draft.model, "mock-model");
    }
}

#[tokio::test]
async fn default_angle_when_nothing_qualifies() {
    let store = Arc::new(MemoryStore::new().with_candidate(candidate(62.0, 10.0, 5.0, &[])));
    let generator = Arc::new(MockGenerator::new());

    let stats = orchestrator(&store, &generator)
        .run_cycle(&PipelineConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.drafts_created, 4);
    assert!(store.drafts_saved().iter().all(|d| d.angle == Angle::Explainer));
}

#[tokio::test]
async fn respects_candidate_limit_by_relevance() {
    let strong = candidate(90.0, 0.0, 0.0, &[]);
    let strong_score = strong.score.id;
    let store = Arc::new(
        MemoryStore::new()
            .with_candidate(candidate(70.0, 0.0, 0.0, &[]))
            .with_candidate(strong),
    );
    let generator = Arc::new(MockGenerator::new());
    let config = PipelineConfig {
        max_candidates_per_cycle: 1,
        ..PipelineConfig::default()
    };

    let stats = orchestrator(&store, &generator).run_cycle(&config).await.unwrap();

    assert_eq!(stats.candidates, 1);
    assert!(store.drafts_saved().iter().all(|d| d.score_id == strong_score));
}

// ============================================================================
// Adversarial: generator failures and hostile model output
// ============================================================================

#[tokio::test]
async fn generation_failures_do_not_block_other_pairs() {
    let store = Arc::new(MemoryStore::new().with_candidate(candidate(75.0, 20.0, 10.0, &["housing"])));
    // only the twitter prompts carry the HOOK contract, so they all fail
    let generator = Arc::new(MockGenerator::new().failing_on("HOOK:"));

    let stats = orchestrator(&store, &generator)
        .run_cycle(&PipelineConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.generation_failures, 2);
    assert_eq!(stats.failures.len(), 2);
    assert!(stats.failures.iter().all(|f| f.platform == Platform::Twitter));
    assert_eq!(stats.drafts_created, 6);
    assert!(store
        .drafts_saved()
        .iter()
        .all(|d| d.platform != Platform::Twitter));
}

#[tokio::test]
async fn write_failures_are_counted_and_isolated() {
    let store = Arc::new(
        MemoryStore::new()
            .with_candidate(candidate(75.0, 20.0, 10.0, &["housing"]))
            .failing_saves(),
    );
    let generator = Arc::new(MockGenerator::new());

    let stats = orchestrator(&store, &generator)
        .run_cycle(&PipelineConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.drafts_created, 0);
    assert_eq!(stats.write_failures, 8);
    assert_eq!(store.draft_count(), 0);
}

#[tokio::test]
async fn ineligible_score_is_never_picked_up() {
    let mut avoided = candidate(95.0, 80.0, 80.0, &["housing"]);
    avoided.score.breakdown.risk = RiskTier::Avoid;
    avoided.score.breakdown.eligible = false;
    let store = Arc::new(MemoryStore::new().with_candidate(avoided));
    let generator = Arc::new(MockGenerator::new());

    let stats = orchestrator(&store, &generator)
        .run_cycle(&PipelineConfig::default())
        .await
        .unwrap();

    assert_eq!(stats.candidates, 0);
    assert_eq!(stats.drafts_created, 0);
    assert_eq!(generator.calls(), 0);
}
