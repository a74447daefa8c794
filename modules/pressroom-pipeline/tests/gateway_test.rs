//! Gateway tests against a real Postgres.
//! Requires DATABASE_TEST_URL; every test no-ops when it is absent.

use pressroom_common::PressroomError;
use pressroom_pipeline::gateway::{Gateway, Submission};
use pressroom_pipeline::testing::{raw_item, ScriptedFeed};
use pressroom_store::{migrate, Store};
use sqlx::postgres::PgPoolOptions;

async fn test_store() -> Option<Store> {
    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .ok()?;
    migrate(&pool).await.ok()?;
    sqlx::query(
        "TRUNCATE items, scores, drafts, audit_log, configuration, watched_accounts \
         RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await
    .ok()?;
    Some(Store::new(pool))
}

#[tokio::test]
async fn submit_validates_then_stores() {
    let Some(store) = test_store().await else { return };
    let gateway = Gateway::new(store);

    let created = gateway
        .submit(raw_item("twitter", "gw-1", "rent is up"))
        .await
        .unwrap();
    assert!(matches!(created, Submission::Created(_)));

    let duplicate = gateway
        .submit(raw_item("twitter", "gw-1", "rent is up"))
        .await
        .unwrap();
    assert!(matches!(duplicate, Submission::Skipped));

    let invalid = gateway.submit(raw_item("twitter", "gw-2", "   ")).await;
    assert!(matches!(invalid, Err(PressroomError::Validation(_))));
}

#[tokio::test]
async fn batch_isolates_bad_records() {
    let Some(store) = test_store().await else { return };
    let gateway = Gateway::new(store);

    let batch = vec![
        raw_item("twitter", "gw-10", "housing news"),
        raw_item("", "gw-11", "record without a source"),
        raw_item("twitter", "gw-10", "housing news"),
    ];
    let stats = gateway.submit_batch(&batch).await;

    assert_eq!(stats.created, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].external_id, "gw-11");
}

#[tokio::test]
async fn pull_drains_a_feed_and_surfaces_unreachable_feeds() {
    let Some(store) = test_store().await else { return };
    let gateway = Gateway::new(store);

    let feed = ScriptedFeed::new(vec![
        raw_item("twitter", "gw-20", "naira moved"),
        raw_item("twitter", "gw-21", "rates held"),
    ]);
    let stats = gateway.pull(&feed).await.unwrap();
    assert_eq!(stats.created, 2);

    assert!(gateway.pull(&ScriptedFeed::unreachable()).await.is_err());
}
