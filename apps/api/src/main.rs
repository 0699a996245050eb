mod config;
mod db;
mod errors;
mod matching;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::matching::escalation::{HttpPlacementService, PlacementService};
use crate::matching::matcher::OpportunityMatcher;
use crate::matching::scoring::MatcherConfig;
use crate::matching::signals::SignalSources;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MatchStore, PgMatchStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting linkmatch v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store: Arc<dyn MatchStore> = Arc::new(PgMatchStore::new(db));

    // Escalation is off unless both the flag and the service URL are set
    let placement: Option<Arc<dyn PlacementService>> = match config.placement_endpoint() {
        Some(url) => {
            info!("Auto-placement enabled via {url}");
            let service: Arc<dyn PlacementService> = Arc::new(HttpPlacementService::new(
                url,
                config.placement_service_token.clone(),
            )?);
            Some(service)
        }
        None => {
            info!("Auto-placement disabled");
            None
        }
    };

    // Placeholder dimensions (authority, geography, partner quality) stay neutral
    // until real data sources exist.
    let matcher_config = MatcherConfig::default();
    info!(
        "Matcher: min_score={} auto_approve={} max_candidates={} max_opportunities={}",
        matcher_config.min_score,
        matcher_config.auto_approve_score,
        matcher_config.max_candidate_users,
        matcher_config.max_opportunities
    );
    let matcher = OpportunityMatcher::new(
        Arc::clone(&store),
        matcher_config,
        SignalSources::default(),
        placement,
    );

    // Build app state
    let state = AppState {
        matcher: Arc::new(matcher),
        store,
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
