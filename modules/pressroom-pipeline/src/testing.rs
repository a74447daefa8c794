//! Test support: fixtures plus in-memory fakes.
//!
//! `MemoryStore` stands in for the Postgres store behind `PipelineStore`,
//! `MockGenerator` for the model client. Both record what they were asked
//! so tests can assert on behavior, and both can inject failures.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gen_client::{GenerationRequest, TextGenerator};
use pressroom_common::{
    Angle, Candidate, DigestEntry, Draft, DraftStatus, Item, NewDraft, Platform, RawItem,
    Result, RiskTier, Score, ScoreBreakdown,
};
use uuid::Uuid;

use crate::gateway::ItemFeed;
use crate::traits::PipelineStore;

// ==========================================================
// Fixtures
// ==========================================================

pub fn raw_item(source: &str, external_id: &str, body: &str) -> RawItem {
    RawItem {
        source: source.to_string(),
        external_id: external_id.to_string(),
        title: None,
        body: body.to_string(),
        url: None,
        author: None,
        published_at: Some(Utc::now() - Duration::hours(1)),
        likes: 10,
        shares: 2,
        comments: 1,
        views: 500,
    }
}

pub fn item_with_body(body: &str) -> Item {
    let now = Utc::now();
    Item {
        id: Uuid::new_v4(),
        source: "twitter".to_string(),
        external_id: Uuid::new_v4().to_string(),
        title: None,
        body: body.to_string(),
        url: None,
        author: Some("@lagosproperty".to_string()),
        published_at: now - Duration::hours(2),
        ingested_at: now,
        likes: 100,
        shares: 20,
        comments: 10,
        views: 5000,
        scored: true,
    }
}

pub fn candidate(relevance: f64, macro_impact: f64, virality: f64, matched: &[&str]) -> Candidate {
    let item = item_with_body("Rents in Lagos moved again this week.");
    let score = Score {
        id: Uuid::new_v4(),
        item_id: item.id,
        breakdown: ScoreBreakdown {
            relevance,
            matched_keywords: matched.iter().map(|s| s.to_string()).collect(),
            virality,
            macro_impact,
            risk: RiskTier::Safe,
            sensitive_flags: Vec::new(),
            risk_reason: "No risk flags detected".to_string(),
            eligible: true,
        },
        scored_at: Utc::now(),
    };
    Candidate { score, item }
}

pub fn pending_draft(platform: Platform, angle: Angle) -> Draft {
    Draft {
        id: Uuid::new_v4(),
        score_id: Uuid::new_v4(),
        platform,
        angle,
        body: "Generated copy.".to_string(),
        hook: None,
        thread: Vec::new(),
        slides: Vec::new(),
        model: "mock-model".to_string(),
        status: DraftStatus::Pending,
        generated_at: Utc::now(),
        edited_body: None,
        edited_at: None,
        edited_by: None,
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        scheduled_at: None,
        published_at: None,
        external_post_id: None,
    }
}

pub fn digest_entry(
    item_id: Uuid,
    title: &str,
    relevance: f64,
    platform: Platform,
    angle: Angle,
) -> DigestEntry {
    DigestEntry {
        draft_id: Uuid::new_v4(),
        item_id,
        item_title: title.to_string(),
        item_source: "twitter".to_string(),
        relevance,
        platform,
        angle,
    }
}

// ==========================================================
// MemoryStore
// ==========================================================

#[derive(Default)]
struct MemoryStoreInner {
    candidates: Vec<Candidate>,
    drafts: Vec<Draft>,
    slots: HashSet<(Uuid, Platform, Angle)>,
    audit: Vec<(String, Uuid, String, serde_json::Value)>,
    digest_entries: Vec<DigestEntry>,
    fail_on_save: bool,
    conflict_on_update: bool,
}

/// In-memory `PipelineStore` mirroring the Postgres semantics: slot
/// uniqueness on save, status-guarded updates that return None on a miss.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate(self, candidate: Candidate) -> Self {
        self.inner.lock().unwrap().candidates.push(candidate);
        self
    }

    pub fn with_draft(self, draft: Draft) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.slots.insert((draft.score_id, draft.platform, draft.angle));
            inner.drafts.push(draft);
        }
        self
    }

    pub fn with_digest_entry(self, entry: DigestEntry) -> Self {
        self.inner.lock().unwrap().digest_entries.push(entry);
        self
    }

    /// Every save_draft call fails, as a database write error would.
    pub fn failing_saves(self) -> Self {
        self.inner.lock().unwrap().fail_on_save = true;
        self
    }

    /// Every guarded update misses, as if another writer got there first.
    pub fn conflicting_updates(self) -> Self {
        self.inner.lock().unwrap().conflict_on_update = true;
        self
    }

    pub fn drafts_saved(&self) -> Vec<Draft> {
        self.inner.lock().unwrap().drafts.clone()
    }

    pub fn draft_count(&self) -> usize {
        self.inner.lock().unwrap().drafts.len()
    }

    pub fn audit_actions(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .audit
            .iter()
            .map(|(action, _, _, _)| action.clone())
            .collect()
    }

    pub fn audit_entries(&self) -> Vec<(String, Uuid, String, serde_json::Value)> {
        self.inner.lock().unwrap().audit.clone()
    }

    fn update_where<F>(&self, id: Uuid, expected: DraftStatus, mutate: F) -> Option<Draft>
    where
        F: FnOnce(&mut Draft),
    {
        let mut inner = self.inner.lock().unwrap();
        if inner.conflict_on_update {
            return None;
        }
        let draft = inner
            .drafts
            .iter_mut()
            .find(|d| d.id == id && d.status == expected)?;
        mutate(draft);
        Some(draft.clone())
    }
}

#[async_trait]
impl PipelineStore for MemoryStore {
    async fn generation_candidates(&self, limit: usize) -> Result<Vec<Candidate>> {
        let inner = self.inner.lock().unwrap();
        let mut eligible: Vec<Candidate> = inner
            .candidates
            .iter()
            .filter(|c| c.score.breakdown.eligible)
            .filter(|c| !inner.slots.iter().any(|(score_id, _, _)| *score_id == c.score.id))
            .cloned()
            .collect();
        eligible.sort_by(|a, b| {
            b.score
                .breakdown
                .relevance
                .partial_cmp(&a.score.breakdown.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        eligible.truncate(limit);
        Ok(eligible)
    }

    async fn save_draft(&self, draft: &NewDraft) -> Result<Option<Draft>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_on_save {
            return Err(anyhow::anyhow!("MemoryStore: save_draft failure injected").into());
        }
        if !inner.slots.insert((draft.score_id, draft.platform, draft.angle)) {
            return Ok(None);
        }
        let stored = Draft {
            id: Uuid::new_v4(),
            score_id: draft.score_id,
            platform: draft.platform,
            angle: draft.angle,
            body: draft.content.body.clone(),
            hook: draft.content.hook.clone(),
            thread: draft.content.thread.clone(),
            slides: draft.content.slides.clone(),
            model: draft.model.clone(),
            status: DraftStatus::Pending,
            generated_at: Utc::now(),
            edited_body: None,
            edited_at: None,
            edited_by: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            scheduled_at: None,
            published_at: None,
            external_post_id: None,
        };
        inner.drafts.push(stored.clone());
        Ok(Some(stored))
    }

    async fn draft(&self, id: Uuid) -> Result<Option<Draft>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.drafts.iter().find(|d| d.id == id).cloned())
    }

    async fn approve_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        edited_body: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        Ok(self.update_where(id, expected, |d| {
            d.status = DraftStatus::Approved;
            d.approved_by = Some(actor.to_string());
            d.approved_at = Some(now);
            if let Some(body) = edited_body {
                d.edited_body = Some(body.to_string());
                d.edited_at = Some(now);
                d.edited_by = Some(actor.to_string());
            }
        }))
    }

    async fn reject_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        reason: &str,
    ) -> Result<Option<Draft>> {
        Ok(self.update_where(id, expected, |d| {
            d.status = DraftStatus::Rejected;
            d.rejection_reason = Some(reason.to_string());
        }))
    }

    async fn edit_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        Ok(self.update_where(id, expected, |d| {
            d.edited_body = Some(body.to_string());
            d.edited_at = Some(now);
            d.edited_by = Some(actor.to_string());
        }))
    }

    async fn schedule_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        Ok(self.update_where(id, expected, |d| {
            d.status = DraftStatus::Scheduled;
            d.scheduled_at = Some(at);
        }))
    }

    async fn publish_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        external_post_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        Ok(self.update_where(id, expected, |d| {
            d.status = DraftStatus::Published;
            d.published_at = Some(now);
            d.external_post_id = Some(external_post_id.to_string());
        }))
    }

    async fn record_audit(
        &self,
        action: &str,
        _entity_kind: &str,
        entity_id: Uuid,
        actor: &str,
        details: serde_json::Value,
    ) -> Result<()> {
        self.inner.lock().unwrap().audit.push((
            action.to_string(),
            entity_id,
            actor.to_string(),
            details,
        ));
        Ok(())
    }

    async fn pending_digest_entries(&self) -> Result<Vec<DigestEntry>> {
        Ok(self.inner.lock().unwrap().digest_entries.clone())
    }
}

// ==========================================================
// ScriptedFeed
// ==========================================================

/// `ItemFeed` that hands back a fixed batch, or fails on demand.
pub struct ScriptedFeed {
    items: Vec<RawItem>,
    fail: bool,
}

impl ScriptedFeed {
    pub fn new(items: Vec<RawItem>) -> Self {
        Self { items, fail: false }
    }

    pub fn unreachable() -> Self {
        Self { items: Vec::new(), fail: true }
    }
}

#[async_trait]
impl ItemFeed for ScriptedFeed {
    async fn fetch(&self) -> anyhow::Result<Vec<RawItem>> {
        if self.fail {
            anyhow::bail!("ScriptedFeed: feed unreachable");
        }
        Ok(self.items.clone())
    }
}

// ==========================================================
// MockGenerator
// ==========================================================

struct MockGeneratorInner {
    replies: Vec<(String, String)>,
    default_reply: String,
    fail_on: Vec<String>,
    prompts_seen: Vec<String>,
}

/// Scripted `TextGenerator`. Replies are matched by substring against the
/// prompt; unmatched prompts get the default reply.
pub struct MockGenerator {
    inner: Mutex<MockGeneratorInner>,
    model: String,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockGeneratorInner {
                replies: Vec::new(),
                default_reply: "Generated copy.".to_string(),
                fail_on: Vec::new(),
                prompts_seen: Vec::new(),
            }),
            model: "mock-model".to_string(),
        }
    }

    pub fn on_prompt(self, needle: &str, reply: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .replies
            .push((needle.to_string(), reply.to_string()));
        self
    }

    pub fn with_default_reply(self, reply: &str) -> Self {
        self.inner.lock().unwrap().default_reply = reply.to_string();
        self
    }

    /// Prompts containing the needle fail instead of replying.
    pub fn failing_on(self, needle: &str) -> Self {
        self.inner.lock().unwrap().fail_on.push(needle.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().prompts_seen.len()
    }

    pub fn prompts_seen(&self) -> Vec<String> {
        self.inner.lock().unwrap().prompts_seen.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.prompts_seen.push(request.prompt.clone());
        if inner.fail_on.iter().any(|n| request.prompt.contains(n.as_str())) {
            anyhow::bail!("MockGenerator: failure injected");
        }
        let reply = inner
            .replies
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| inner.default_reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_enforces_slot_uniqueness() {
        let store = MemoryStore::new();
        let draft = NewDraft {
            score_id: Uuid::new_v4(),
            platform: Platform::Twitter,
            angle: Angle::Explainer,
            content: Default::default(),
            model: "mock-model".to_string(),
        };
        assert!(store.save_draft(&draft).await.unwrap().is_some());
        assert!(store.save_draft(&draft).await.unwrap().is_none());
        assert_eq!(store.draft_count(), 1);
    }

    #[tokio::test]
    async fn guarded_update_misses_on_wrong_status() {
        let store = MemoryStore::new().with_draft(pending_draft(Platform::Twitter, Angle::Explainer));
        let id = store.drafts_saved()[0].id;
        let miss = store
            .schedule_draft(id, DraftStatus::Approved, Utc::now())
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn mock_generator_matches_replies_and_injects_failures() {
        let generator = MockGenerator::new()
            .on_prompt("subsidy", "SCRIPTED")
            .failing_on("broken");

        let ask = |prompt: &str| GenerationRequest {
            system: String::new(),
            prompt: prompt.to_string(),
            temperature: 0.0,
            max_tokens: 16,
        };

        assert_eq!(generator.generate(&ask("about the subsidy")).await.unwrap(), "SCRIPTED");
        assert_eq!(generator.generate(&ask("anything else")).await.unwrap(), "Generated copy.");
        assert!(generator.generate(&ask("a broken one")).await.is_err());
        assert_eq!(generator.calls(), 3);
    }
}
