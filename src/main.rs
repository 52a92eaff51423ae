use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine_api::config::Config;
use vitrine_api::middleware::auth::JwtSecret;
use vitrine_api::services::cache::PromoCache;
use vitrine_api::services::image_relay::ImageRelay;
use vitrine_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    // Best-effort cache: an unreachable backend just disables it.
    let cache = PromoCache::connect(config.redis_url.as_deref(), config.cache_ttl_seconds).await;

    let relay = ImageRelay::from_config(&config).map(Arc::new);
    if relay.is_none() {
        info!("Image relay not configured — uploads with files will be rejected");
    }

    let state = AppState {
        db: pool,
        cache,
        config: config.clone(),
        relay,
    };

    // Build CORS: allow the configured frontend origin; localhost is always
    // allowed for local development.
    let cors_origin = {
        let base = config.app_base_url.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let o = match origin.to_str() {
                Ok(s) => s,
                Err(_) => return false,
            };
            if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
                return true;
            }
            o == base
        })
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Public
        .route(
            "/promotions",
            get(routes::promotions::public_list).post(routes::promotions::submit),
        )
        .route("/announcements", get(routes::announcements::public_list))
        // Admin
        .route("/admin/login", post(routes::auth::login))
        .route(
            "/admin/promotions",
            get(routes::promotions::admin_list).post(routes::promotions::admin_create),
        )
        .route(
            "/admin/promotions/{id}",
            put(routes::promotions::update_status).delete(routes::promotions::delete),
        )
        .route("/admin/promotions/{id}/edit", put(routes::promotions::edit))
        .route(
            "/admin/announcements",
            get(routes::announcements::admin_list).post(routes::announcements::create),
        )
        .route(
            "/admin/announcements/{id}",
            put(routes::announcements::update).delete(routes::announcements::delete),
        )
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Global body size limit of 16 MB (covers image uploads)
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("vitrine API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
