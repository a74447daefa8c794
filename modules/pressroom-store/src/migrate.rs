//! Schema creation. Every statement is IF NOT EXISTS so the whole pass is
//! idempotent and safe to run on every startup.

use pressroom_common::Result;
use sqlx::PgPool;
use tracing::info;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id            UUID         PRIMARY KEY,
        source        TEXT         NOT NULL,
        external_id   TEXT         NOT NULL,
        title         TEXT,
        body          TEXT         NOT NULL,
        url           TEXT,
        author        TEXT,
        published_at  TIMESTAMPTZ  NOT NULL,
        ingested_at   TIMESTAMPTZ  NOT NULL DEFAULT now(),
        likes         BIGINT       NOT NULL DEFAULT 0,
        shares        BIGINT       NOT NULL DEFAULT 0,
        comments      BIGINT       NOT NULL DEFAULT 0,
        views         BIGINT       NOT NULL DEFAULT 0,
        scored        BOOLEAN      NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS scores (
        id                UUID              PRIMARY KEY,
        item_id           UUID              NOT NULL UNIQUE REFERENCES items(id),
        relevance         DOUBLE PRECISION  NOT NULL,
        virality          DOUBLE PRECISION  NOT NULL,
        macro_impact      DOUBLE PRECISION  NOT NULL,
        risk              TEXT              NOT NULL,
        matched_keywords  JSONB             NOT NULL DEFAULT '[]',
        sensitive_flags   JSONB             NOT NULL DEFAULT '[]',
        risk_reason       TEXT              NOT NULL,
        eligible          BOOLEAN           NOT NULL,
        scored_at         TIMESTAMPTZ       NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS drafts (
        id                UUID         PRIMARY KEY,
        score_id          UUID         NOT NULL REFERENCES scores(id),
        platform          TEXT         NOT NULL,
        angle             TEXT         NOT NULL,
        body              TEXT         NOT NULL,
        hook              TEXT,
        thread            JSONB        NOT NULL DEFAULT '[]',
        slides            JSONB        NOT NULL DEFAULT '[]',
        model             TEXT         NOT NULL,
        status            TEXT         NOT NULL DEFAULT 'pending',
        generated_at      TIMESTAMPTZ  NOT NULL DEFAULT now(),
        edited_body       TEXT,
        edited_at         TIMESTAMPTZ,
        edited_by         TEXT,
        approved_by       TEXT,
        approved_at       TIMESTAMPTZ,
        rejection_reason  TEXT,
        scheduled_at      TIMESTAMPTZ,
        published_at      TIMESTAMPTZ,
        external_post_id  TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id           UUID         PRIMARY KEY,
        action       TEXT         NOT NULL,
        entity_kind  TEXT         NOT NULL,
        entity_id    UUID         NOT NULL,
        actor        TEXT         NOT NULL,
        details      JSONB        NOT NULL DEFAULT '{}',
        created_at   TIMESTAMPTZ  NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS configuration (
        id          UUID         NOT NULL,
        key         TEXT         PRIMARY KEY,
        value       JSONB        NOT NULL,
        description TEXT,
        updated_at  TIMESTAMPTZ  NOT NULL DEFAULT now(),
        updated_by  TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS watched_accounts (
        id               UUID         PRIMARY KEY,
        platform         TEXT         NOT NULL,
        handle           TEXT         NOT NULL,
        display_name     TEXT,
        category         TEXT,
        priority         INTEGER      NOT NULL DEFAULT 1,
        active           BOOLEAN      NOT NULL DEFAULT TRUE,
        added_at         TIMESTAMPTZ  NOT NULL DEFAULT now(),
        last_checked_at  TIMESTAMPTZ
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS items_source_external ON items (source, external_id)",
    "CREATE INDEX IF NOT EXISTS items_unscored ON items (ingested_at) WHERE NOT scored",
    "CREATE INDEX IF NOT EXISTS scores_relevance ON scores (relevance DESC)",
    "CREATE UNIQUE INDEX IF NOT EXISTS drafts_slot ON drafts (score_id, platform, angle)",
    "CREATE INDEX IF NOT EXISTS drafts_status ON drafts (status)",
    "CREATE INDEX IF NOT EXISTS audit_entity ON audit_log (entity_id, created_at)",
    "CREATE UNIQUE INDEX IF NOT EXISTS watched_accounts_handle ON watched_accounts (platform, handle)",
];

pub async fn migrate(pool: &PgPool) -> Result<()> {
    for ddl in TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("Tables created");

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("Indexes created");

    Ok(())
}
