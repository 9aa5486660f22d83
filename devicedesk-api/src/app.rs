/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use devicedesk_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```
use crate::config::Config;
use axum::{
    routing::{get, post},
    Router,
};
use devicedesk_shared::auth::password::{Argon2Hasher, CredentialHasher};
use devicedesk_shared::storage::{BlobStore, DiskStore};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; all fields
/// are cheaply cloneable handles. There is no other cross-request state:
/// correctness under concurrency comes from the database, not from locks
/// held here.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Credential hashing capability
    pub hasher: Arc<dyn CredentialHasher>,

    /// Blob storage for uploaded images
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Creates application state with the production hasher and disk store
    pub fn new(db: PgPool, config: Config) -> Self {
        let blobs = DiskStore::new(&config.upload.dir);
        Self {
            db,
            config: Arc::new(config),
            hasher: Arc::new(Argon2Hasher),
            blobs: Arc::new(blobs),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health                          # Health check
/// ├── GET  /devices                         # List devices
/// ├── POST /devices                         # Create device
/// ├── GET  /devices/:id                     # Get device
/// ├── PUT  /devices/:id                     # Update descriptive fields
/// ├── DELETE /devices/:id                   # Delete device
/// ├── POST /devices/:id/checkout            # Check out to a user
/// ├── POST /devices/:id/checkin             # Check back in
/// ├── POST /register                        # Register user
/// ├── POST /login                           # Stateless login check
/// ├── GET  /users                           # List users
/// ├── GET  /user/:user_id/devices           # Devices held by a user
/// ├── POST /upload/:device_id               # Attach device image
/// ├── POST /upload-user-image/:user_id      # Attach user image
/// ├── GET  /device-image/:device_id         # Fetch device image
/// ├── GET  /user-image/:user_id             # Fetch user image
/// └── GET  /uploads/*                       # Static upload directory
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let device_routes = Router::new()
        .route(
            "/devices",
            get(routes::devices::list_devices).post(routes::devices::create_device),
        )
        .route(
            "/devices/:id",
            get(routes::devices::get_device)
                .put(routes::devices::update_device)
                .delete(routes::devices::delete_device),
        )
        .route(
            "/devices/:id/checkout",
            post(routes::devices::checkout_device),
        )
        .route("/devices/:id/checkin", post(routes::devices::checkin_device));

    let user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/users", get(routes::users::list_users))
        .route(
            "/user/:user_id/devices",
            get(routes::devices::list_user_devices),
        );

    let upload_routes = Router::new()
        .route("/upload/:device_id", post(routes::uploads::attach_device_image))
        .route(
            "/upload-user-image/:user_id",
            post(routes::uploads::attach_user_image),
        )
        .route(
            "/device-image/:device_id",
            get(routes::uploads::get_device_image),
        )
        .route("/user-image/:user_id", get(routes::uploads::get_user_image));

    let uploads_dir = ServeDir::new(&state.config.upload.dir);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(device_routes)
        .merge(user_routes)
        .merge(upload_routes)
        .nest_service("/uploads", uploads_dir)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
