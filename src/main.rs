//! Lendstock Server - Inventory Lending Management System
//!
//! A Rust REST API server for managing lendable things, library customers
//! and lendings.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendstock_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("lendstock_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Lendstock Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository.clone(), config.auth.clone());

    // Seed the configured admin credential when none exists yet
    services
        .auth
        .bootstrap_admin()
        .await
        .expect("Failed to bootstrap admin credential");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        repository,
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health checks
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Security
        .route("/security/login", post(api::security::login))
        .route("/security/register", post(api::security::register))
        .route("/security/password", put(api::security::change_password))
        .route("/security/roles/admin", post(api::security::grant_admin))
        .route("/security/roles/admin", delete(api::security::revoke_admin))
        .route(
            "/security/credentials/:email",
            delete(api::security::delete_credential),
        )
        .route("/security/credentials", put(api::security::set_password))
        // Things (catalog)
        .route("/things/all", get(api::things::list_things))
        .route("/things/:id", get(api::things::get_thing))
        .route("/things/:id", delete(api::things::delete_thing))
        .route(
            "/things/short-name/:short_name",
            get(api::things::get_things_by_short_name),
        )
        .route("/things", post(api::things::create_thing))
        .route("/things", patch(api::things::update_thing))
        .route("/shelves", post(api::things::create_shelf))
        // Images
        .route("/things/image/:thing_id", get(api::things::get_image))
        .route("/things/image", post(api::things::create_image))
        .route("/things/image", delete(api::things::delete_image))
        // Customers
        .route("/customers/all", get(api::customers::list_customers))
        .route("/customers/:id", get(api::customers::get_customer))
        .route("/customers/:id", patch(api::customers::update_customer))
        .route("/customers/:id", delete(api::customers::delete_customer))
        .route(
            "/customers/by-email/:email",
            get(api::customers::get_customer_by_email),
        )
        .route("/customers", post(api::customers::create_customer))
        // Lendings
        .route("/lendings/all", get(api::lendings::list_lendings))
        .route("/lendings/:id", get(api::lendings::get_lending))
        .route("/lendings/overdue", get(api::lendings::list_overdue))
        .route(
            "/lendings/overdue/:user_id",
            get(api::lendings::list_overdue_for_customer),
        )
        .route(
            "/lendings/thing/:short_name",
            get(api::lendings::list_lendings_by_thing_short_name),
        )
        .route("/lendings", get(api::lendings::list_lendings_filtered))
        .route("/lendings", post(api::lendings::create_lending))
        .route("/lendings", put(api::lendings::update_lending))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(routes)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
