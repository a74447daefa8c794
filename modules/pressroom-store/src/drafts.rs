//! Draft persistence and guarded status transitions.
//!
//! Every transition UPDATE matches on both the draft id and the status the
//! caller loaded. A concurrent writer that got there first leaves zero rows
//! to update, which surfaces as None instead of a silent double-apply.

use chrono::{DateTime, Utc};
use pressroom_common::{
    Angle, DigestEntry, Draft, DraftStatus, NewDraft, Platform, Result,
};
use uuid::Uuid;

use crate::items::string_list;
use crate::Store;

impl Store {
    /// Insert unless the (score, platform, angle) slot is already taken.
    /// The occupied path returns None and writes nothing.
    pub async fn insert_draft(&self, new: &NewDraft) -> Result<Option<Draft>> {
        let thread = serde_json::to_value(&new.content.thread).map_err(anyhow::Error::from)?;
        let slides = serde_json::to_value(&new.content.slides).map_err(anyhow::Error::from)?;

        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            INSERT INTO drafts
                (id, score_id, platform, angle, body, hook, thread, slides, model)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (score_id, platform, angle) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.score_id)
        .bind(new.platform.to_string())
        .bind(new.angle.to_string())
        .bind(&new.content.body)
        .bind(&new.content.hook)
        .bind(thread)
        .bind(slides)
        .bind(&new.model)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Draft::from))
    }

    pub async fn draft(&self, id: Uuid) -> Result<Option<Draft>> {
        let row = sqlx::query_as::<_, DraftRow>("SELECT * FROM drafts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Draft::from))
    }

    pub async fn list_drafts(
        &self,
        status: Option<DraftStatus>,
        platform: Option<Platform>,
        limit: i64,
    ) -> Result<Vec<Draft>> {
        let rows = sqlx::query_as::<_, DraftRow>(
            r#"
            SELECT * FROM drafts
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR platform = $2)
            ORDER BY generated_at DESC
            LIMIT $3
            "#,
        )
        .bind(status.map(|s| s.to_string()))
        .bind(platform.map(|p| p.to_string()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Draft::from).collect())
    }

    pub async fn approve_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        edited_body: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            UPDATE drafts
            SET status      = 'approved',
                approved_by = $3,
                approved_at = $4,
                edited_body = COALESCE($5, edited_body),
                edited_at   = CASE WHEN $5 IS NULL THEN edited_at ELSE $4 END,
                edited_by   = CASE WHEN $5 IS NULL THEN edited_by ELSE $3 END
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected.to_string())
        .bind(actor)
        .bind(now)
        .bind(edited_body)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Draft::from))
    }

    pub async fn reject_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        reason: &str,
    ) -> Result<Option<Draft>> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            UPDATE drafts
            SET status = 'rejected', rejection_reason = $3
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected.to_string())
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Draft::from))
    }

    pub async fn edit_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        actor: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            UPDATE drafts
            SET edited_body = $4, edited_at = $5, edited_by = $3
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected.to_string())
        .bind(actor)
        .bind(body)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Draft::from))
    }

    pub async fn schedule_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            UPDATE drafts
            SET status = 'scheduled', scheduled_at = $3
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected.to_string())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Draft::from))
    }

    pub async fn publish_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        external_post_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Draft>> {
        let row = sqlx::query_as::<_, DraftRow>(
            r#"
            UPDATE drafts
            SET status = 'published', published_at = $4, external_post_id = $3
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected.to_string())
        .bind(external_post_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Draft::from))
    }

    pub async fn draft_status_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM drafts GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Pending drafts flattened with item context, strongest item first.
    /// Untitled items fall back to a body prefix so the digest always has
    /// something to show.
    pub async fn pending_digest_entries(&self) -> Result<Vec<DigestEntry>> {
        let rows = sqlx::query_as::<_, DigestRow>(
            r#"
            SELECT d.id AS draft_id, i.id AS item_id,
                   COALESCE(i.title, LEFT(i.body, 80)) AS item_title,
                   i.source AS item_source, s.relevance, d.platform, d.angle
            FROM drafts d
            JOIN scores s ON s.id = d.score_id
            JOIN items i ON i.id = s.item_id
            WHERE d.status = 'pending'
            ORDER BY s.relevance DESC, i.id, d.platform, d.angle
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DigestEntry::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct DraftRow {
    id: Uuid,
    score_id: Uuid,
    platform: String,
    angle: String,
    body: String,
    hook: Option<String>,
    thread: serde_json::Value,
    slides: serde_json::Value,
    model: String,
    status: String,
    generated_at: DateTime<Utc>,
    edited_body: Option<String>,
    edited_at: Option<DateTime<Utc>>,
    edited_by: Option<String>,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
    external_post_id: Option<String>,
}

impl From<DraftRow> for Draft {
    fn from(r: DraftRow) -> Self {
        Draft {
            id: r.id,
            score_id: r.score_id,
            platform: Platform::from_str_loose(&r.platform),
            angle: Angle::from_str_loose(&r.angle),
            body: r.body,
            hook: r.hook,
            thread: string_list(Some(r.thread)),
            slides: string_list(Some(r.slides)),
            model: r.model,
            status: DraftStatus::from_str_loose(&r.status),
            generated_at: r.generated_at,
            edited_body: r.edited_body,
            edited_at: r.edited_at,
            edited_by: r.edited_by,
            approved_by: r.approved_by,
            approved_at: r.approved_at,
            rejection_reason: r.rejection_reason,
            scheduled_at: r.scheduled_at,
            published_at: r.published_at,
            external_post_id: r.external_post_id,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DigestRow {
    draft_id: Uuid,
    item_id: Uuid,
    item_title: String,
    item_source: String,
    relevance: f64,
    platform: String,
    angle: String,
}

impl From<DigestRow> for DigestEntry {
    fn from(r: DigestRow) -> Self {
        DigestEntry {
            draft_id: r.draft_id,
            item_id: r.item_id,
            item_title: r.item_title,
            item_source: r.item_source,
            relevance: r.relevance,
            platform: Platform::from_str_loose(&r.platform),
            angle: Angle::from_str_loose(&r.angle),
        }
    }
}
