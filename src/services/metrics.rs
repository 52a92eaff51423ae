use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "api_admin_logins_total",
        "Tentatives de connexion admin par statut",
        &["status"]
    ).unwrap();

    pub static ref PROMO_SUBMISSIONS_COUNTER: CounterVec = register_counter_vec!(
        "api_promotion_submissions_total",
        "Promotions créées par origine (public ou admin)",
        &["source"]
    ).unwrap();

    pub static ref MODERATION_COUNTER: CounterVec = register_counter_vec!(
        "api_moderation_actions_total",
        "Actions de modération par type",
        &["action"]
    ).unwrap();

    pub static ref CACHE_LOOKUPS_COUNTER: CounterVec = register_counter_vec!(
        "api_cache_lookups_total",
        "Lectures du cache des promotions par résultat",
        &["outcome"]
    ).unwrap();

    pub static ref RELAY_UPLOADS_COUNTER: CounterVec = register_counter_vec!(
        "api_image_relay_uploads_total",
        "Images relayées vers l'hébergeur externe par statut",
        &["status"]
    ).unwrap();
}
