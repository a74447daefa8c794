//! Runtime configuration overrides.
//!
//! The table holds sparse key/value rows. A snapshot starts from compiled
//! defaults and overlays whatever rows exist; a row that no longer parses
//! is logged and skipped so one bad override cannot stall the pipeline.

use chrono::{DateTime, Utc};
use pressroom_common::{ConfigEntry, PipelineConfig, Result};
use tracing::warn;
use uuid::Uuid;

use crate::Store;

impl Store {
    pub async fn config_entries(&self) -> Result<Vec<ConfigEntry>> {
        let rows = sqlx::query_as::<_, ConfigRow>(
            r#"
            SELECT id, key, value, description, updated_at, updated_by
            FROM configuration
            ORDER BY key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ConfigEntry::from).collect())
    }

    /// Upsert by key. The row id is minted on first insert and kept on
    /// every later update.
    pub async fn set_config(
        &self,
        key: &str,
        value: &serde_json::Value,
        description: Option<&str>,
        actor: &str,
    ) -> Result<ConfigEntry> {
        let row = sqlx::query_as::<_, ConfigRow>(
            r#"
            INSERT INTO configuration (id, key, value, description, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, now(), $5)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                description = COALESCE(EXCLUDED.description, configuration.description),
                updated_at = now(),
                updated_by = EXCLUDED.updated_by
            RETURNING id, key, value, description, updated_at, updated_by
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(value)
        .bind(description)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Compiled defaults overlaid with the table's rows. Loaded once per
    /// cycle so every item in a run is judged by the same rules.
    pub async fn load_snapshot(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::default();
        for entry in self.config_entries().await? {
            if let Err(e) = config.apply_override(&entry.key, &entry.value) {
                warn!(key = %entry.key, error = %e, "Skipping configuration override");
            }
        }
        Ok(config)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConfigRow {
    id: Uuid,
    key: String,
    value: serde_json::Value,
    description: Option<String>,
    updated_at: DateTime<Utc>,
    updated_by: Option<String>,
}

impl From<ConfigRow> for ConfigEntry {
    fn from(r: ConfigRow) -> Self {
        ConfigEntry {
            id: r.id,
            key: r.key,
            value: r.value,
            description: r.description,
            updated_at: r.updated_at,
            updated_by: r.updated_by,
        }
    }
}
