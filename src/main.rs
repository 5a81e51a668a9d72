use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    http::{HeaderValue, Method},
    response::Json,
    routing::get,
};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde_json::json;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use pollboard::db::connection::{ensure_indexes, init_db};
use pollboard::routes::poll_routes::poll_routes;
use pollboard::state::AppState;
use pollboard::utils::identity::MokaSessionStore;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

#[tokio::main]
async fn main() {
    dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let database = match init_db().await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = ensure_indexes(&database).await {
        error!("Failed to create indexes: {e}");
        std::process::exit(1);
    }

    let session_ttl: u64 = std::env::var("SESSION_TTL_SECS")
        .unwrap_or_else(|_| "86400".to_string())
        .parse()
        .unwrap_or_else(|_| {
            error!("Failed to parse SESSION_TTL_SECS");
            std::process::exit(1);
        });

    let session_capacity: u64 = std::env::var("SESSION_CAPACITY")
        .unwrap_or_else(|_| "100000".to_string())
        .parse()
        .unwrap_or_else(|_| {
            error!("Failed to parse SESSION_CAPACITY");
            std::process::exit(1);
        });

    let sessions = Arc::new(MokaSessionStore::new(
        session_capacity,
        Duration::from_secs(session_ttl),
    ));
    let app_state = AppState::new(database, sessions);

    let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or_else(|_| {
        error!("CORS_ORIGIN environment variable not set");
        std::process::exit(1);
    });

    let origin = cors_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        error!("Failed to parse CORS origin: {cors_origin}");
        std::process::exit(1);
    });

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::USER_AGENT,
            axum::http::header::COOKIE,
            axum::http::header::HeaderName::from_static("x-session-id"),
        ])
        .allow_credentials(true);

    let app = Router::new()
        .route("/", get(root))
        .nest("/api/polls", poll_routes(app_state))
        .layer(cors);

    let server_addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| {
        info!("SERVER_ADDR not set, using default 0.0.0.0:8000");
        "0.0.0.0:8000".to_string()
    });

    let addr: SocketAddr = server_addr.parse().unwrap_or_else(|_| {
        error!("Failed to parse SERVER_ADDR: {server_addr}");
        std::process::exit(1);
    });

    info!("Server running at http://{addr}");
    info!("CORS origin: {cors_origin}");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn root() -> Json<serde_json::Value> {
    let elapsed = START_TIME.elapsed();
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let uptime_message = if days > 0 {
        format!("{}d {}h {}m {}s", days, hours % 24, minutes % 60, seconds % 60)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    };

    Json(json!({
        "status": "ok",
        "message": format!("Poll backend is running! Uptime: {}", uptime_message)
    }))
}
