//! Append-only audit trail. Rows are never updated or deleted.

use chrono::{DateTime, Utc};
use pressroom_common::{AuditEntry, Result};
use uuid::Uuid;

use crate::Store;

impl Store {
    pub async fn append_audit(
        &self,
        action: &str,
        entity_kind: &str,
        entity_id: Uuid,
        actor: &str,
        details: serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, action, entity_kind, entity_id, actor, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(action)
        .bind(entity_kind)
        .bind(entity_id)
        .bind(actor)
        .bind(details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn audit_for_entity(&self, entity_id: Uuid) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, action, entity_kind, entity_id, actor, details, created_at
            FROM audit_log
            WHERE entity_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AuditEntry::from).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    action: String,
    entity_kind: String,
    entity_id: Uuid,
    actor: String,
    details: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditEntry {
    fn from(r: AuditRow) -> Self {
        AuditEntry {
            id: r.id,
            action: r.action,
            entity_kind: r.entity_kind,
            entity_id: r.entity_id,
            actor: r.actor,
            details: r.details,
            created_at: r.created_at,
        }
    }
}
