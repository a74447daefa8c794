//! Core domain types shared across the pipeline: ingested items, score
//! breakdowns, platform drafts, and the review/audit records around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Platforms and angles ---

/// Target platform for a generated draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Twitter,
    Linkedin,
    Instagram,
    Facebook,
}

impl Platform {
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "linkedin" => Platform::Linkedin,
            "instagram" => Platform::Instagram,
            "facebook" => Platform::Facebook,
            _ => Platform::Twitter,
        }
    }

    /// All platforms a generation cycle targets, in output order.
    pub fn all() -> [Platform; 4] {
        [
            Platform::Twitter,
            Platform::Linkedin,
            Platform::Instagram,
            Platform::Facebook,
        ]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Twitter => write!(f, "twitter"),
            Platform::Linkedin => write!(f, "linkedin"),
            Platform::Instagram => write!(f, "instagram"),
            Platform::Facebook => write!(f, "facebook"),
        }
    }
}

/// Editorial angle a draft is written from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Angle {
    Explainer,
    Investor,
    Property,
    DataBacked,
    Contrarian,
}

impl Angle {
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "investor" => Angle::Investor,
            "property" => Angle::Property,
            "data_backed" => Angle::DataBacked,
            "contrarian" => Angle::Contrarian,
            _ => Angle::Explainer,
        }
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Angle::Explainer => write!(f, "explainer"),
            Angle::Investor => write!(f, "investor"),
            Angle::Property => write!(f, "property"),
            Angle::DataBacked => write!(f, "data_backed"),
            Angle::Contrarian => write!(f, "contrarian"),
        }
    }
}

// --- Risk and workflow states ---

/// Content risk tier assigned during scoring. `Avoid` is terminal: the item
/// is never eligible for generation regardless of relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Safe,
    Sensitive,
    Avoid,
}

impl RiskTier {
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sensitive" => RiskTier::Sensitive,
            "avoid" => RiskTier::Avoid,
            _ => RiskTier::Safe,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Safe => write!(f, "safe"),
            RiskTier::Sensitive => write!(f, "sensitive"),
            RiskTier::Avoid => write!(f, "avoid"),
        }
    }
}

/// Review lifecycle of a draft. Transitions are validated by the approval
/// state machine; the store only ever writes states that passed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Pending,
    Approved,
    Rejected,
    Scheduled,
    Published,
}

impl DraftStatus {
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "approved" => DraftStatus::Approved,
            "rejected" => DraftStatus::Rejected,
            "scheduled" => DraftStatus::Scheduled,
            "published" => DraftStatus::Published,
            _ => DraftStatus::Pending,
        }
    }
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftStatus::Pending => write!(f, "pending"),
            DraftStatus::Approved => write!(f, "approved"),
            DraftStatus::Rejected => write!(f, "rejected"),
            DraftStatus::Scheduled => write!(f, "scheduled"),
            DraftStatus::Published => write!(f, "published"),
        }
    }
}

// --- Items ---

/// An item as submitted by a feed, before identity and timestamps are
/// assigned. `source` + `external_id` form the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub source: String,
    /// Upstream identifier within the source (tweet id, article guid, ...).
    pub external_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// When the item appeared upstream. Missing means "just now".
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub views: i64,
}

/// A stored item awaiting (or past) scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
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
    /// Flipped in the same transaction that persists the score.
    pub scored: bool,
}

impl Item {
    /// Title and body joined, the text every keyword pass runs over.
    pub fn full_text(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} {}", self.body),
            None => self.body.clone(),
        }
    }

    /// Engagement used for velocity. Views are stored but not counted here.
    pub fn engagement(&self) -> i64 {
        self.likes + self.shares + self.comments
    }
}

// --- Scores ---

/// Pure output of the scoring pass over one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0-100. Keyword base, priority bonus, category bonus.
    pub relevance: f64,
    pub matched_keywords: Vec<String>,
    /// 0-100. Engagement velocity damped by age.
    pub virality: f64,
    /// 0-100. High-impact term hits plus the property+policy combination.
    pub macro_impact: f64,
    pub risk: RiskTier,
    pub sensitive_flags: Vec<String>,
    pub risk_reason: String,
    /// Relevance at or above threshold and risk below `Avoid`.
    pub eligible: bool,
}

/// A persisted score row. One per item, enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub id: Uuid,
    pub item_id: Uuid,
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
    pub scored_at: DateTime<Utc>,
}

/// An eligible score paired with its item, ready for generation.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub score: Score,
    pub item: Item,
}

/// Read view for listings: an item with its score when one exists.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    pub item: Item,
    pub score: Option<Score>,
}

// --- Drafts ---

/// Structured content parsed out of raw model output for one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftContent {
    pub body: String,
    /// Twitter opener, capped at 280 chars by the parser fallback.
    pub hook: Option<String>,
    pub thread: Vec<String>,
    pub slides: Vec<String>,
}

/// Insert payload for a freshly generated draft.
#[derive(Debug, Clone)]
pub struct NewDraft {
    pub score_id: Uuid,
    pub platform: Platform,
    pub angle: Angle,
    pub content: DraftContent,
    pub model: String,
}

/// A generated draft moving through review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: Uuid,
    pub score_id: Uuid,
    pub platform: Platform,
    pub angle: Angle,
    pub body: String,
    pub hook: Option<String>,
    pub thread: Vec<String>,
    pub slides: Vec<String>,
    /// Model identifier that produced the body, e.g. "gemini-pro".
    pub model: String,
    pub status: DraftStatus,
    pub generated_at: DateTime<Utc>,
    /// Reviewer replacement text. The original body is never overwritten.
    pub edited_body: Option<String>,
    pub edited_at: Option<DateTime<Utc>>,
    pub edited_by: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub external_post_id: Option<String>,
}

impl Draft {
    /// Text that would actually be posted: the reviewer's edit when present,
    /// otherwise the generated body.
    pub fn effective_body(&self) -> &str {
        self.edited_body.as_deref().unwrap_or(&self.body)
    }
}

// --- Audit and configuration ---

/// Append-only record of a human action on the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: Uuid,
    pub actor: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A runtime override row. `value` is interpreted against the matching
/// `PipelineConfig` field at snapshot load. The id survives upserts so
/// audit entries can point at the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub id: Uuid,
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

// --- Watched accounts ---

/// Registry payload for an account worth polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWatchedAccount {
    pub platform: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    1
}

/// An account the ingestion side polls for items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedAccount {
    pub id: Uuid,
    pub platform: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub category: Option<String>,
    /// Higher polls first when a feed rations requests.
    pub priority: i32,
    pub active: bool,
    pub added_at: DateTime<Utc>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

// --- Digest ---

/// One pending draft flattened with its item context, as read for a digest.
#[derive(Debug, Clone, Serialize)]
pub struct DigestEntry {
    pub draft_id: Uuid,
    pub item_id: Uuid,
    pub item_title: String,
    pub item_source: String,
    pub relevance: f64,
    pub platform: Platform,
    pub angle: Angle,
}
