//! Seeds a development database with demo items and watched accounts.
//! Safe to re-run: everything goes through the same dedup paths the
//! server uses.

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pressroom_common::{Config, NewWatchedAccount, RawItem};
use pressroom_pipeline::gateway::Gateway;
use pressroom_store::{migrate, Store};

fn demo_item(
    external_id: &str,
    title: &str,
    body: &str,
    hours_old: i64,
    likes: i64,
    shares: i64,
    comments: i64,
) -> RawItem {
    RawItem {
        source: "twitter".to_string(),
        external_id: external_id.to_string(),
        title: Some(title.to_string()),
        body: body.to_string(),
        url: Some(format!("https://example.com/posts/{external_id}")),
        author: Some("@lagosmarketwatch".to_string()),
        published_at: Some(Utc::now() - Duration::hours(hours_old)),
        likes,
        shares,
        comments,
        views: likes * 40,
    }
}

fn demo_items() -> Vec<RawItem> {
    vec![
        demo_item(
            "seed-cbn-rates",
            "CBN Raises Interest Rates to 18.5%",
            "The Central Bank of Nigeria has raised interest rates, affecting \
             mortgage and housing policy across Lagos.",
            2,
            245,
            89,
            34,
        ),
        demo_item(
            "seed-fuel-subsidy",
            "Fuel Subsidy Removal Hits Logistics Costs",
            "Transport unions say the fuel subsidy removal has doubled delivery \
             costs for building materials into Abuja estates.",
            5,
            180,
            40,
            22,
        ),
        demo_item(
            "seed-lekki-rents",
            "Lekki Rents Up 30% Year on Year",
            "New data shows rent in Lekki Phase 1 climbing 30% as landlords \
             reprice against inflation and the naira.",
            1,
            320,
            110,
            58,
        ),
        demo_item(
            "seed-land-registry",
            "Lagos Digitizes Land Registry",
            "The Lagos state government says digitizing the land registry will \
             cut property title verification from months to days.",
            8,
            95,
            31,
            12,
        ),
        demo_item(
            "seed-nepa-tariff",
            "Electricity Tariff Review Announced",
            "A new electricity tariff band structure lands next quarter; estate \
             facility managers expect service charges to follow power costs up.",
            12,
            60,
            9,
            15,
        ),
        demo_item(
            "seed-offtopic",
            "Premier League Weekend Roundup",
            "A quiet weekend of football with two late winners and a red card.",
            3,
            900,
            300,
            120,
        ),
    ]
}

fn demo_accounts() -> Vec<NewWatchedAccount> {
    vec![
        NewWatchedAccount {
            platform: "twitter".to_string(),
            handle: "@cenbank".to_string(),
            display_name: Some("Central Bank of Nigeria".to_string()),
            category: Some("policy".to_string()),
            priority: 3,
        },
        NewWatchedAccount {
            platform: "twitter".to_string(),
            handle: "@lagosmarketwatch".to_string(),
            display_name: Some("Lagos Market Watch".to_string()),
            category: Some("market".to_string()),
            priority: 2,
        },
        NewWatchedAccount {
            platform: "instagram".to_string(),
            handle: "estateintel".to_string(),
            display_name: Some("Estate Intel".to_string()),
            category: Some("data".to_string()),
            priority: 1,
        },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pressroom=info".parse()?))
        .init();

    info!("Seeding pressroom database...");

    let config = Config::from_env();
    let store = Store::connect(&config.database_url).await?;
    migrate(store.pool()).await?;

    let gateway = Gateway::new(store.clone());
    let stats = gateway.submit_batch(&demo_items()).await;
    info!(
        created = stats.created,
        skipped = stats.skipped,
        "Demo items seeded"
    );

    for account in demo_accounts() {
        let stored = store.upsert_account(&account).await?;
        info!(platform = %stored.platform, handle = %stored.handle, "Watched account seeded");
    }

    info!("Seed complete. Run a scoring cycle to see the pipeline move.");
    Ok(())
}
