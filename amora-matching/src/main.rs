use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod push;
mod routes;
mod schema;
mod services;

use amora_shared::clients::db::{self, DbPool};
use amora_shared::clients::rabbitmq::RabbitMQClient;
use amora_shared::clients::redis::RedisClient;
use config::AppConfig;
use push::{Pusher, RedisPusher};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
    pub pusher: Arc<dyn Pusher>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    amora_shared::middleware::init_tracing("amora-matching");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = db::create_pool(&config.database_url)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;
    let pusher: Arc<dyn Pusher> = RedisPusher::new(redis.clone());

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        pusher,
    });

    // Seed user/profile rows from auth registrations.
    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_user_registered(sub_state).await {
            tracing::error!(error = %e, "user.registered subscriber failed");
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/likes", post(routes::likes::create_like))
        .route("/likes/received", get(routes::likes::list_received_likes))
        .route("/likes/:profile_id", axum::routing::delete(routes::likes::delete_like))
        .route("/blocks", post(routes::blocks::create_block).get(routes::blocks::list_blocks))
        .route("/blocks/:profile_id", axum::routing::delete(routes::blocks::delete_block))
        .route("/matches", get(routes::matches::list_matches))
        .route("/suggestions", get(routes::suggestions::get_suggestions))
        .route("/visits", get(routes::visits::list_received_visits))
        .route("/visits/:profile_id", post(routes::visits::record_visit))
        .route("/reports", post(routes::reports::create_report))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
