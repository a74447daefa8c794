//! Score persistence. One score per item, written in the same transaction
//! that flips the item's scored flag, so a crash between the two cannot
//! leave an item half-processed.

use chrono::{DateTime, Utc};
use pressroom_common::{Candidate, Item, Result, RiskTier, Score, ScoreBreakdown};
use uuid::Uuid;

use crate::items::string_list;
use crate::Store;

impl Store {
    pub async fn insert_score(&self, item_id: Uuid, breakdown: &ScoreBreakdown) -> Result<Score> {
        let matched = serde_json::to_value(&breakdown.matched_keywords)
            .map_err(anyhow::Error::from)?;
        let flags = serde_json::to_value(&breakdown.sensitive_flags)
            .map_err(anyhow::Error::from)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ScoreRow>(
            r#"
            INSERT INTO scores
                (id, item_id, relevance, virality, macro_impact, risk,
                 matched_keywords, sensitive_flags, risk_reason, eligible)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, item_id, relevance, virality, macro_impact, risk,
                      matched_keywords, sensitive_flags, risk_reason, eligible, scored_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(item_id)
        .bind(breakdown.relevance)
        .bind(breakdown.virality)
        .bind(breakdown.macro_impact)
        .bind(breakdown.risk.to_string())
        .bind(matched)
        .bind(flags)
        .bind(&breakdown.risk_reason)
        .bind(breakdown.eligible)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE items SET scored = TRUE WHERE id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    pub async fn score_for_item(&self, item_id: Uuid) -> Result<Option<Score>> {
        let row = sqlx::query_as::<_, ScoreRow>(
            r#"
            SELECT id, item_id, relevance, virality, macro_impact, risk,
                   matched_keywords, sensitive_flags, risk_reason, eligible, scored_at
            FROM scores
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Score::from))
    }

    /// Eligible scores with no draft in any slot yet, strongest relevance
    /// first. These are the generation cycle's inputs.
    pub async fn eligible_unclaimed(&self, limit: i64) -> Result<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT s.id AS score_id, s.relevance, s.virality, s.macro_impact,
                   s.risk, s.matched_keywords, s.sensitive_flags, s.risk_reason,
                   s.eligible, s.scored_at,
                   i.id AS item_id, i.source, i.external_id, i.title, i.body,
                   i.url, i.author, i.published_at, i.ingested_at,
                   i.likes, i.shares, i.comments, i.views, i.scored
            FROM scores s
            JOIN items i ON i.id = s.item_id
            WHERE s.eligible
              AND NOT EXISTS (SELECT 1 FROM drafts d WHERE d.score_id = s.id)
            ORDER BY s.relevance DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Candidate::from).collect())
    }

    pub async fn eligible_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scores WHERE eligible")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct ScoreRow {
    id: Uuid,
    item_id: Uuid,
    relevance: f64,
    virality: f64,
    macro_impact: f64,
    risk: String,
    matched_keywords: serde_json::Value,
    sensitive_flags: serde_json::Value,
    risk_reason: String,
    eligible: bool,
    scored_at: DateTime<Utc>,
}

impl From<ScoreRow> for Score {
    fn from(r: ScoreRow) -> Self {
        Score {
            id: r.id,
            item_id: r.item_id,
            breakdown: ScoreBreakdown {
                relevance: r.relevance,
                matched_keywords: string_list(Some(r.matched_keywords)),
                virality: r.virality,
                macro_impact: r.macro_impact,
                risk: RiskTier::from_str_loose(&r.risk),
                sensitive_flags: string_list(Some(r.sensitive_flags)),
                risk_reason: r.risk_reason,
                eligible: r.eligible,
            },
            scored_at: r.scored_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    score_id: Uuid,
    relevance: f64,
    virality: f64,
    macro_impact: f64,
    risk: String,
    matched_keywords: serde_json::Value,
    sensitive_flags: serde_json::Value,
    risk_reason: String,
    eligible: bool,
    scored_at: DateTime<Utc>,
    item_id: Uuid,
    source: String,
    external_id: String,
    title: Option<String>,
    body: String,
    url: Option<String>,
    author: Option<String>,
    published_at: DateTime<Utc>,
    ingested_at: DateTime<Utc>,
    likes: i64,
    shares: i64,
    comments: i64,
    views: i64,
    scored: bool,
}

impl From<CandidateRow> for Candidate {
    fn from(r: CandidateRow) -> Self {
        Candidate {
            score: Score {
                id: r.score_id,
                item_id: r.item_id,
                breakdown: ScoreBreakdown {
                    relevance: r.relevance,
                    matched_keywords: string_list(Some(r.matched_keywords)),
                    virality: r.virality,
                    macro_impact: r.macro_impact,
                    risk: RiskTier::from_str_loose(&r.risk),
                    sensitive_flags: string_list(Some(r.sensitive_flags)),
                    risk_reason: r.risk_reason,
                    eligible: r.eligible,
                },
                scored_at: r.scored_at,
            },
            item: Item {
                id: r.item_id,
                source: r.source,
                external_id: r.external_id,
                title: r.title,
                body: r.body,
                url: r.url,
                author: r.author,
                published_at: r.published_at,
                ingested_at: r.ingested_at,
                likes: r.likes,
                shares: r.shares,
                comments: r.comments,
                views: r.views,
                scored: r.scored,
            },
        }
    }
}
