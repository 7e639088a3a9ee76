use axum::Router;
use gps_daystats::{config, routes, state};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gps_daystats=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();
    let state = state::AppState::new(config.clone()).expect("failed to build HTTP client");

    // Start cache eviction task
    let eviction_state = state.clone();
    let eviction_ttl = config.cache_ttl;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
            eviction_state.evict_expired(eviction_ttl);
        }
    });

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::stats::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    tracing::info!("GPS day-stats listening on {}", addr);
    tracing::info!("Backend history: {}", config.history_url());
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Today: GET http://{}/api/stats/today", addr);

    axum::serve(listener, app).await.unwrap();
}
