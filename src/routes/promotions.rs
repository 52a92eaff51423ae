use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::auth::AdminUser;
use crate::models::promotion::{Promotion, PromotionStatus, UpdateStatusRequest};
use crate::services::cache::VISIBLE_PROMOTIONS_KEY;
use crate::services::metrics::{MODERATION_COUNTER, PROMO_SUBMISSIONS_COUNTER};
use crate::services::promotions::PromotionService;
use crate::AppState;

/// GET /promotions — public endpoint, the currently visible set.
///
/// Read-through cached: a hit returns the cached serialized array verbatim;
/// a miss computes the set, stores it with the configured TTL, and returns
/// it. The cached entry may lag the visibility predicate by up to the TTL.
pub async fn public_list(State(state): State<AppState>) -> Result<Response, ApiError> {
    if let Some(cached) = state.cache.get(VISIBLE_PROMOTIONS_KEY).await {
        return Ok(json_body(cached));
    }

    let visible = PromotionService::list_visible(&state.db).await?;
    let payload = serde_json::to_string(&visible).map_err(anyhow::Error::from)?;
    state.cache.put(VISIBLE_PROMOTIONS_KEY, &payload).await;
    Ok(json_body(payload))
}

/// POST /promotions — public submission; lands in the moderation inbox as
/// `pending` and never affects the visible set until approved.
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    let promotion = PromotionService::create(
        &state.db,
        state.relay.as_deref(),
        multipart,
        PromotionStatus::Pending,
    )
    .await?;

    PROMO_SUBMISSIONS_COUNTER.with_label_values(&["public"]).inc();
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// GET /admin/promotions — the full inbox, any status, newest first.
pub async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    let promotions = PromotionService::list_all(&state.db).await?;
    Ok(Json(promotions))
}

/// POST /admin/promotions — created pre-approved, so the visible set may
/// change immediately.
pub async fn admin_create(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    let promotion = PromotionService::create(
        &state.db,
        state.relay.as_deref(),
        multipart,
        PromotionStatus::Approved,
    )
    .await?;

    state.cache.invalidate(VISIBLE_PROMOTIONS_KEY).await;
    PROMO_SUBMISSIONS_COUNTER.with_label_values(&["admin"]).inc();
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// PUT /admin/promotions/{id} — status-only update.
pub async fn update_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Promotion>, ApiError> {
    let promotion = PromotionService::update_status(&state.db, id, &body.status)
        .await?
        .ok_or(ApiError::NotFound("promotion"))?;

    state.cache.invalidate(VISIBLE_PROMOTIONS_KEY).await;
    MODERATION_COUNTER
        .with_label_values(&[promotion.status.as_str()])
        .inc();
    Ok(Json(promotion))
}

/// PUT /admin/promotions/{id}/edit — content fields only, status untouched.
pub async fn edit(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Promotion>, ApiError> {
    let promotion =
        PromotionService::update_content(&state.db, state.relay.as_deref(), id, multipart)
            .await?
            .ok_or(ApiError::NotFound("promotion"))?;

    state.cache.invalidate(VISIBLE_PROMOTIONS_KEY).await;
    MODERATION_COUNTER.with_label_values(&["edit"]).inc();
    Ok(Json(promotion))
}

/// DELETE /admin/promotions/{id}
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !PromotionService::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("promotion"));
    }

    state.cache.invalidate(VISIBLE_PROMOTIONS_KEY).await;
    MODERATION_COUNTER.with_label_values(&["delete"]).inc();
    Ok(StatusCode::NO_CONTENT)
}

fn json_body(payload: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap()
}
