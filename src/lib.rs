// Library exports for the api/seed binaries and tests
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use config::Config;
use services::cache::PromoCache;
use services::image_relay::ImageRelay;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: PromoCache,
    pub config: Arc<Config>,
    pub relay: Option<Arc<ImageRelay>>,
}
