use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gen_client::{GeminiGenerator, OpenAiGenerator, TextGenerator};
use pressroom_common::Config;
use pressroom_pipeline::approval::Approvals;
use pressroom_pipeline::gateway::Gateway;
use pressroom_pipeline::generate::Orchestrator;
use pressroom_pipeline::notify::{noop::NoopSink, webhook::WebhookSink, DigestSink, Digests};
use pressroom_pipeline::scoring::Scorer;
use pressroom_pipeline::traits::PipelineStore;
use pressroom_store::{migrate, Store};

mod loops;
mod rest;
mod state;

use state::AppState;

fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    match config.generation_backend.as_str() {
        "gemini" => {
            let key = config
                .gemini_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is required for the gemini backend"))?;
            Ok(Arc::new(
                GeminiGenerator::new(&key).with_model(&config.gemini_model),
            ))
        }
        "openai" => {
            let key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is required for the openai backend"))?;
            Ok(Arc::new(
                OpenAiGenerator::new(&key).with_model(&config.openai_model),
            ))
        }
        other => anyhow::bail!("Unknown generation backend '{other}' (expected gemini or openai)"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pressroom=info".parse()?))
        .init();

    info!("Pressroom server starting...");

    let config = Config::from_env();

    let store = Store::connect(&config.database_url).await?;
    migrate(store.pool()).await?;

    let generator = build_generator(&config)?;
    info!(model = generator.model_id(), "Generation backend ready");

    // Digest sink: webhook if configured, otherwise Noop
    let sink: Arc<dyn DigestSink> = match &config.digest_webhook_url {
        Some(url) => {
            info!("Digest webhook enabled");
            Arc::new(WebhookSink::new(url))
        }
        None => {
            info!("No DIGEST_WEBHOOK_URL set, digests disabled");
            Arc::new(NoopSink)
        }
    };

    let pipeline_store: Arc<dyn PipelineStore> = Arc::new(store.clone());
    let state = Arc::new(AppState {
        store: store.clone(),
        gateway: Gateway::new(store.clone()),
        scorer: Scorer::new(store.clone()),
        orchestrator: Orchestrator::new(Arc::clone(&pipeline_store), generator),
        approvals: Approvals::new(Arc::clone(&pipeline_store)),
        digests: Digests::new(pipeline_store, sink),
    });

    if config.pipeline_interval_hours > 0 {
        tokio::spawn(loops::run_pipeline_loop(
            Arc::clone(&state),
            config.pipeline_interval_hours,
        ));
    } else {
        info!("PIPELINE_INTERVAL_HOURS is 0, scheduled cycles disabled");
    }

    let app = Router::new()
        // Health check
        .route("/health", get(|| async { "ok" }))
        // Items
        .route("/items", get(rest::api_items).post(rest::api_submit_items))
        .route("/items/{id}", get(rest::api_item_detail))
        // Cycle triggers
        .route("/cycles/score", post(rest::cycles::api_run_scoring))
        .route("/cycles/generate", post(rest::cycles::api_run_generation))
        .route("/digest/send", post(rest::cycles::api_send_digest))
        // Drafts and review
        .route("/drafts", get(rest::drafts::api_drafts))
        .route("/drafts/{id}", get(rest::drafts::api_draft_detail))
        .route("/drafts/{id}/approve", post(rest::drafts::api_approve))
        .route("/drafts/{id}/reject", post(rest::drafts::api_reject))
        .route("/drafts/{id}/edit", post(rest::drafts::api_edit))
        .route("/drafts/{id}/schedule", post(rest::drafts::api_schedule))
        .route("/drafts/{id}/publish", post(rest::drafts::api_publish))
        .route("/drafts/{id}/audit", get(rest::drafts::api_draft_audit))
        // Configuration
        .route("/config", get(rest::api_config))
        .route("/config/{key}", put(rest::api_set_config))
        // Watched accounts
        .route("/accounts", get(rest::api_accounts).post(rest::api_upsert_account))
        .route("/accounts/deactivate", post(rest::api_deactivate_account))
        // Stats
        .route("/stats", get(rest::api_stats))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Pressroom API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
