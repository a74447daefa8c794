// Trait seam between pipeline logic and storage.
//
// PipelineStore is everything the generation, approval, and digest paths
// need from persistence. The Postgres Store implements it by delegation;
// testing.rs provides MemoryStore so those paths are testable without a
// database. The scoring cycle and the gateway talk to Store directly: their
// logic is pure and tested as pure functions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pressroom_common::{Candidate, DigestEntry, Draft, DraftStatus, NewDraft, Result};
use uuid::Uuid;

#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Eligible scores with no draft in any slot yet, strongest first.
    async fn generation_candidates(&self, limit: usize) -> Result<Vec<Candidate>>;

    /// None when the (score, platform, angle) slot is already taken.
    async fn save_draft(&self, draft: &NewDraft) -> Result<Option<Draft>>;

    async fn draft(&self, id: Uuid) -> Result<Option<Draft>>;

    /// Guarded transitions: each one applies only while the draft still
    /// holds `expected`, and returns None when it no longer does.
    async fn approve_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        edited_body: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>>;

    async fn reject_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        reason: &str,
    ) -> Result<Option<Draft>>;

    async fn edit_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>>;

    async fn schedule_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Draft>>;

    async fn publish_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        external_post_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>>;

    async fn record_audit(
        &self,
        action: &str,
        entity_kind: &str,
        entity_id: Uuid,
        actor: &str,
        details: serde_json::Value,
    ) -> Result<()>;

    async fn pending_digest_entries(&self) -> Result<Vec<DigestEntry>>;
}

#[async_trait]
impl PipelineStore for pressroom_store::Store {
    async fn generation_candidates(&self, limit: usize) -> Result<Vec<Candidate>> {
        self.eligible_unclaimed(limit as i64).await
    }

    async fn save_draft(&self, draft: &NewDraft) -> Result<Option<Draft>> {
        self.insert_draft(draft).await
    }

    async fn draft(&self, id: Uuid) -> Result<Option<Draft>> {
        pressroom_store::Store::draft(self, id).await
    }

    async fn approve_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        edited_body: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        pressroom_store::Store::approve_draft(self, id, expected, actor, edited_body, now).await
    }

    async fn reject_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        reason: &str,
    ) -> Result<Option<Draft>> {
        pressroom_store::Store::reject_draft(self, id, expected, reason).await
    }

    async fn edit_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        pressroom_store::Store::edit_draft(self, id, expected, actor, body, now).await
    }

    async fn schedule_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        pressroom_store::Store::schedule_draft(self, id, expected, at).await
    }

    async fn publish_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        external_post_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        pressroom_store::Store::publish_draft(self, id, expected, external_post_id, now).await
    }

    async fn record_audit(
        &self,
        action: &str,
        entity_kind: &str,
        entity_id: Uuid,
        actor: &str,
        details: serde_json::Value,
    ) -> Result<()> {
        self.append_audit(action, entity_kind, entity_id, actor, details)
            .await
    }

    async fn pending_digest_entries(&self) -> Result<Vec<DigestEntry>> {
        pressroom_store::Store::pending_digest_entries(self).await
    }
}
