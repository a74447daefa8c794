//! Postgres persistence for the pipeline.
//!
//! One `Store` handle, cloneable, wrapping a connection pool. Uniqueness
//! rules live in the schema, not in process memory: duplicate items,
//! duplicate scores, and duplicate draft slots are all rejected by unique
//! indexes, so concurrent writers converge on the same rows.

pub mod accounts;
pub mod audit;
pub mod config_store;
pub mod drafts;
pub mod items;
pub mod migrate;
pub mod scores;

pub use migrate::migrate;

use pressroom_common::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
