use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use adapter::{
    cleanup::{next_run_delay, CleanupSweeper},
    database::{connect_database_with, run_migrations},
};
use anyhow::{Context, Result};
use api::route::v1;
use axum::Router;
use chrono::{FixedOffset, Utc};
use registry::AppRegistry;
use shared::{
    config::AppConfig,
    env::{which, Environment},
};
use tokio::{net::TcpListener, time::sleep};
use tower_http::{
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    bootstrap().await
}

fn init_logger() -> Result<()> {
    let log_level = match which() {
        Environment::Development => "debug",
        Environment::Production => "info",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

// 指定時刻（店舗の現地時刻）まで待ってから 24 時間ごとに掃除する。
// 起動時点で指定時刻を過ぎていればすぐに 1 回目を実行する
async fn cleanup_loop(sweeper: CleanupSweeper, run_at_hour: u32, shop_timezone: FixedOffset) {
    let delay = next_run_delay(&Utc::now().with_timezone(&shop_timezone), run_at_hour);
    tracing::info!(
        delay_secs = delay.as_secs(),
        run_at_hour,
        "cleanup sweep scheduled"
    );
    sleep(delay).await;

    loop {
        sweeper.run_once(Utc::now()).await;
        sleep(CLEANUP_INTERVAL).await;
    }
}

async fn bootstrap() -> Result<()> {
    let app_config = AppConfig::new()?;
    let pool = connect_database_with(&app_config.database);
    run_migrations(&pool)
        .await
        .context("failed to apply database migrations")?;

    let registry = AppRegistry::new(pool, &app_config);

    let sweeper = CleanupSweeper::new(
        registry.identity_repository(),
        app_config.cleanup.clone(),
    );
    tokio::spawn(cleanup_loop(
        sweeper,
        app_config.cleanup.run_at_hour,
        app_config.shop.timezone,
    ));

    let app = Router::new()
        .merge(v1::routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(registry);

    let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), app_config.server.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| {
            tracing::error!(
                error.cause_chain = ?e, error.message = %e, "Unexpected error"
            )
        })
}
