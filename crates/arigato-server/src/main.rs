use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use arigato_api::auth::{self, AppState, AppStateInner};
use arigato_api::messages;
use arigato_api::middleware::require_auth;
use arigato_api::threads;
use arigato_api::users;
use arigato_core::Journal;
use arigato_notify::{Notifier, NotifyConfig};
use arigato_store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arigato=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("ARIGATO_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("ARIGATO_DB_PATH").unwrap_or_else(|_| "arigato.db".into());
    let host = std::env::var("ARIGATO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("ARIGATO_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let push_endpoint = std::env::var("ARIGATO_PUSH_ENDPOINT").ok();
    let push_key = std::env::var("ARIGATO_PUSH_KEY").ok();

    // Init document store and journal
    let store = SqliteStore::open(&PathBuf::from(&db_path))?;
    let journal = Journal::new(Arc::new(store));

    let notifier = Notifier::new(NotifyConfig {
        endpoint: push_endpoint,
        api_key: push_key,
    });

    let app_state: AppState = Arc::new(AppStateInner {
        journal,
        notifier,
        jwt_secret,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/timeline", get(messages::timeline))
        .route("/messages", post(messages::send_message))
        .route("/inbox", get(messages::received_groups))
        .route("/inbox/unread", get(messages::unread_count))
        .route("/inbox/{from_id}", get(messages::received_detail))
        .route("/outbox", get(messages::sent_groups))
        .route("/outbox/{to_id}", get(messages::sent_detail))
        .route("/threads/{message_id}", get(threads::open_thread))
        .route("/threads/{message_id}/reply", post(threads::reply))
        .route("/users/search", get(users::search))
        .route("/users/me", put(users::update_profile))
        .route("/users/me/push-token", put(users::set_push_token))
        .route("/users/me/following", get(users::following))
        .route("/users/me/followers", get(users::followers))
        .route("/users/me/blocked", get(users::blocked))
        .route("/users/me/recipients", get(users::recipients))
        .route("/users/{user_id}", get(users::profile))
        .route(
            "/users/{user_id}/follow",
            post(users::follow).delete(users::unfollow),
        )
        .route(
            "/users/{user_id}/block",
            post(users::block).delete(users::unblock),
        )
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Arigato server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
