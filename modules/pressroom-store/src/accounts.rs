//! Watched-account registry. The pipeline itself does not poll these;
//! external fetchers read the registry and push what they find to the
//! ingestion endpoint.

use chrono::{DateTime, Utc};
use pressroom_common::{NewWatchedAccount, Result, WatchedAccount};
use uuid::Uuid;

use crate::Store;

impl Store {
    pub async fn watched_accounts(&self, active_only: bool) -> Result<Vec<WatchedAccount>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, platform, handle, display_name, category, priority,
                   active, added_at, last_checked_at
            FROM watched_accounts
            WHERE ($1 = FALSE OR active)
            ORDER BY priority DESC, handle
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WatchedAccount::from).collect())
    }

    /// Adding an already-known handle updates its metadata and reactivates it.
    pub async fn upsert_account(&self, new: &NewWatchedAccount) -> Result<WatchedAccount> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO watched_accounts (id, platform, handle, display_name, category, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (platform, handle) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                category = EXCLUDED.category,
                priority = EXCLUDED.priority,
                active = TRUE
            RETURNING id, platform, handle, display_name, category, priority,
                      active, added_at, last_checked_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.platform)
        .bind(&new.handle)
        .bind(&new.display_name)
        .bind(&new.category)
        .bind(new.priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Returns false when no such account exists.
    pub async fn deactivate_account(&self, platform: &str, handle: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE watched_accounts SET active = FALSE WHERE platform = $1 AND handle = $2",
        )
        .bind(platform)
        .bind(handle)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    platform: String,
    handle: String,
    display_name: Option<String>,
    category: Option<String>,
    priority: i32,
    active: bool,
    added_at: DateTime<Utc>,
    last_checked_at: Option<DateTime<Utc>>,
}

impl From<AccountRow> for WatchedAccount {
    fn from(r: AccountRow) -> Self {
        WatchedAccount {
            id: r.id,
            platform: r.platform,
            handle: r.handle,
            display_name: r.display_name,
            category: r.category,
            priority: r.priority,
            active: r.active,
            added_at: r.added_at,
            last_checked_at: r.last_checked_at,
        }
    }
}
