mod handlers;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::feed::FeedEngine;
use crate::posts::PostLifecycle;
use crate::store::{FeedStore, Notifier};

/// Shared state handed to every handler: the engine, the lifecycle manager
/// and the raw store for the simple read endpoints.
#[derive(Clone)]
pub struct AppState {
    pub engine: FeedEngine,
    pub lifecycle: PostLifecycle,
    pub store: Arc<dyn FeedStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn FeedStore>, notifier: Arc<dyn Notifier>) -> Self {
        AppState {
            engine: FeedEngine::new(store.clone()),
            lifecycle: PostLifecycle::new(store.clone(), notifier),
            store,
        }
    }
}

/// Start the API server
pub async fn start_api_server(state: AppState) -> Result<()> {
    let config = Config::get();

    // Set up CORS
    let cors = if config.api.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Create router with all routes
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        // Feed routes
        .route("/api/feed", get(handlers::feed::get_feed))
        .route("/api/feed/legacy", get(handlers::feed::get_legacy_feed))
        // Post routes
        .route("/api/posts", post(handlers::posts::create_post))
        .route(
            "/api/posts/:id",
            get(handlers::posts::get_post)
                .patch(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route(
            "/api/posts/:id/interactions",
            post(handlers::posts::add_interaction),
        )
        // Hashtag index
        .route(
            "/api/hashtags/:tag/posts",
            get(handlers::posts::get_hashtag_posts),
        )
        // Blocking routes
        .route("/api/blocks", post(handlers::blocking::create_block))
        .route(
            "/api/blocks/:blocker_id/:blocked_id",
            delete(handlers::blocking::remove_block),
        )
        .route(
            "/api/blocks/:a/:b/status",
            get(handlers::blocking::check_blocked),
        )
        // Moderation routes
        .route(
            "/api/moderation/posts/:id/deactivate",
            post(handlers::moderation::deactivate_post),
        )
        .route(
            "/api/moderation/posts/:id/reactivate",
            post(handlers::moderation::reactivate_post),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.api.host, config.api.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
