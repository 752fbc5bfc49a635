//! RideLink entitlement service binary.

use std::error::Error;
use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ridelink::adapters::directory::DirectoryApiClient;
use ridelink::adapters::http::{app_router, AppState};
use ridelink::adapters::postgres::{
    connect_pool, PostgresMembershipStore, PostgresUnlockLedger, PostgresUsageCounterStore,
};
use ridelink::config::AppConfig;
use ridelink::domain::entitlement::PaymentWebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server.log_level);

    let pool = connect_pool(&config.database).await?;
    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let directory = Arc::new(DirectoryApiClient::new(&config.directory)?);

    let state = AppState {
        memberships: Arc::new(PostgresMembershipStore::new(pool.clone())),
        unlocks: Arc::new(PostgresUnlockLedger::new(pool.clone())),
        usage: Arc::new(PostgresUsageCounterStore::new(pool)),
        referrals: directory.clone(),
        eligibility: directory,
        webhook_verifier: Arc::new(PaymentWebhookVerifier::new(
            config.payment.webhook_secret.clone(),
        )),
        require_live_events: config.payment.require_live_events || config.is_production(),
    };

    let router = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        version = env!("CARGO_PKG_VERSION"),
        "ridelink entitlement service listening"
    );

    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true),
        )
        .init();
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
