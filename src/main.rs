//! Bookshelf Server - library catalog management
//!
//! REST API server for browsing, borrowing and managing books.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    storage::LocalStorage,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookshelf_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Bookshelf Server v{}", env!("CARGO_PKG_VERSION"));

    // The schema is owned by the external store; no migrations are run here
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    let storage = LocalStorage::new(&config.storage.root, &config.storage.bucket);
    storage.init().await?;

    tracing::info!(
        "Cover storage at {}/{}",
        config.storage.root,
        config.storage.bucket
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let repository = Repository::new(pool);
    let services = Services::new(repository, Arc::new(storage), &config);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Room for the multipart envelope around the largest accepted image
    let upload_limit = state.config.storage.max_upload_bytes + 64 * 1024;

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Books (catalog)
        .route("/books", get(api::books::list_books).post(api::books::create_book))
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        // Covers
        .route(
            "/books/:id/cover",
            put(api::covers::set_book_cover).delete(api::covers::clear_book_cover),
        )
        .route("/covers", post(api::covers::upload_cover))
        // Borrowings
        .route("/books/:id/borrow", post(api::borrowings::borrow_book))
        .route("/books/:id/borrowed", get(api::borrowings::has_borrowed))
        .route("/borrowings", get(api::borrowings::list_borrowings))
        .route("/borrowings/:id/return", post(api::borrowings::return_book))
        // Favorites
        .route(
            "/books/:id/favorite",
            get(api::favorites::is_favorited)
                .post(api::favorites::favorite_book)
                .delete(api::favorites::unfavorite_book),
        )
        .route("/books/:id/favorite/toggle", post(api::favorites::toggle_favorite))
        // Own profile
        .route("/me", get(api::users::me).put(api::users::update_my_profile))
        .route("/me/borrowings", get(api::borrowings::my_borrowings))
        .route("/me/favorites", get(api::favorites::my_favorites))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state.clone());

    // Stored objects, addressed like the URLs handed out for covers
    let storage = Router::new()
        .route("/storage/object/public/:bucket/*path", get(api::storage::public_object))
        .route("/storage/object/sign/:bucket/*path", get(api::storage::signed_object))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(storage)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
}
