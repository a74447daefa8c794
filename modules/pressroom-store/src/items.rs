//! Item ingestion and reads.

use chrono::{DateTime, Utc};
use pressroom_common::{Item, RawItem, Result, RiskTier, Score, ScoreBreakdown, ScoredItem};
use uuid::Uuid;

use crate::Store;

impl Store {
    /// Insert an item unless its (source, external_id) pair already exists.
    /// The duplicate path returns None and writes nothing.
    pub async fn insert_item(&self, raw: &RawItem) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items
                (id, source, external_id, title, body, url, author, published_at,
                 likes, shares, comments, views)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (source, external_id) DO NOTHING
            RETURNING id, source, external_id, title, body, url, author,
                      published_at, ingested_at, likes, shares, comments, views, scored
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&raw.source)
        .bind(&raw.external_id)
        .bind(&raw.title)
        .bind(&raw.body)
        .bind(&raw.url)
        .bind(&raw.author)
        .bind(raw.published_at.unwrap_or_else(Utc::now))
        .bind(raw.likes)
        .bind(raw.shares)
        .bind(raw.comments)
        .bind(raw.views)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Item::from))
    }

    /// Items still waiting for a score, oldest first.
    pub async fn unscored_items(&self, limit: i64) -> Result<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, source, external_id, title, body, url, author,
                   published_at, ingested_at, likes, shares, comments, views, scored
            FROM items
            WHERE NOT scored
            ORDER BY ingested_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    pub async fn item(&self, id: Uuid) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, source, external_id, title, body, url, author,
                   published_at, ingested_at, likes, shares, comments, views, scored
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Item::from))
    }

    /// Listing view: newest items first, score attached where one exists.
    /// Both filters require a score, so unscored items drop out when either
    /// is set.
    pub async fn list_items(
        &self,
        min_relevance: Option<f64>,
        risk: Option<RiskTier>,
        limit: i64,
    ) -> Result<Vec<ScoredItem>> {
        let rows = sqlx::query_as::<_, ItemScoreRow>(
            r#"
            SELECT i.id, i.source, i.external_id, i.title, i.body, i.url, i.author,
                   i.published_at, i.ingested_at, i.likes, i.shares, i.comments,
                   i.views, i.scored,
                   s.id AS score_id, s.relevance, s.virality, s.macro_impact,
                   s.risk, s.matched_keywords, s.sensitive_flags, s.risk_reason,
                   s.eligible, s.scored_at
            FROM items i
            LEFT JOIN scores s ON s.item_id = i.id
            WHERE ($1::float8 IS NULL OR s.relevance >= $1)
              AND ($2::text IS NULL OR s.risk = $2)
            ORDER BY i.ingested_at DESC
            LIMIT $3
            "#,
        )
        .bind(min_relevance)
        .bind(risk.map(|r| r.to_string()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ScoredItem::from).collect())
    }

    pub async fn items_total(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn items_scored(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE scored")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub source: String,
    pub external_id: String,
    pub title: Option<String>,
    pub body: String,
    pub url: Option<String>,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
    pub views: i64,
    pub scored: bool,
}

impl From<ItemRow> for Item {
    fn from(r: ItemRow) -> Self {
        Item {
            id: r.id,
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
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemScoreRow {
    id: Uuid,
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
    score_id: Option<Uuid>,
    relevance: Option<f64>,
    virality: Option<f64>,
    macro_impact: Option<f64>,
    risk: Option<String>,
    matched_keywords: Option<serde_json::Value>,
    sensitive_flags: Option<serde_json::Value>,
    risk_reason: Option<String>,
    eligible: Option<bool>,
    scored_at: Option<DateTime<Utc>>,
}

impl From<ItemScoreRow> for ScoredItem {
    fn from(r: ItemScoreRow) -> Self {
        let item = Item {
            id: r.id,
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
        };
        let score = match (r.score_id, r.scored_at) {
            (Some(score_id), Some(scored_at)) => Some(Score {
                id: score_id,
                item_id: item.id,
                breakdown: ScoreBreakdown {
                    relevance: r.relevance.unwrap_or_default(),
                    matched_keywords: string_list(r.matched_keywords),
                    virality: r.virality.unwrap_or_default(),
                    macro_impact: r.macro_impact.unwrap_or_default(),
                    risk: RiskTier::from_str_loose(r.risk.as_deref().unwrap_or_default()),
                    sensitive_flags: string_list(r.sensitive_flags),
                    risk_reason: r.risk_reason.unwrap_or_default(),
                    eligible: r.eligible.unwrap_or_default(),
                },
                scored_at,
            }),
            _ => None,
        };
        ScoredItem { item, score }
    }
}

/// JSONB column holding a string array. Anything malformed reads as empty
/// rather than failing the whole row.
pub(crate) fn string_list(value: Option<serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
