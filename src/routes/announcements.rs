use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::announcement::Announcement;
use crate::models::auth::AdminUser;
use crate::services::announcements::AnnouncementService;
use crate::AppState;

/// GET /announcements — public endpoint, active announcements whose window
/// covers now, newest first. Never cached.
pub async fn public_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let announcements = AnnouncementService::list_visible(&state.db).await?;
    Ok(Json(announcements))
}

/// GET /admin/announcements — every announcement, newest first.
pub async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    let announcements = AnnouncementService::list_all(&state.db).await?;
    Ok(Json(announcements))
}

/// POST /admin/announcements
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    let announcement =
        AnnouncementService::create(&state.db, state.relay.as_deref(), multipart).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// PUT /admin/announcements/{id} — edit content fields and the active flag.
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Announcement>, ApiError> {
    let announcement =
        AnnouncementService::update(&state.db, state.relay.as_deref(), id, multipart)
            .await?
            .ok_or(ApiError::NotFound("announcement"))?;
    Ok(Json(announcement))
}

/// DELETE /admin/announcements/{id}
pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !AnnouncementService::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("announcement"));
    }
    Ok(StatusCode::NO_CONTENT)
}
