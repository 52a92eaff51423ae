use axum::extract::Multipart;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::promotion::{parse_date, ImageUpload, Promotion, PromotionForm, PromotionStatus};
use crate::services::image_relay::{relay_images, ImageRelay};

pub struct PromotionService;

impl PromotionService {
    /// Insert a new promotion. Uploaded images are relayed to the external
    /// host first; a relay failure aborts the insert.
    pub async fn create(
        pool: &PgPool,
        relay: Option<&ImageRelay>,
        multipart: Multipart,
        status: PromotionStatus,
    ) -> Result<Promotion, ApiError> {
        let mut form = Self::collect_form(multipart).await?;
        let images = std::mem::take(&mut form.images);
        let new = form.into_new()?;
        let image_urls = relay_images(relay, &images).await?;

        let promotion = sqlx::query_as::<_, Promotion>(
            "INSERT INTO promotions (title, description, image_urls, start_date, end_date, color, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&image_urls)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.color)
        .bind(status.to_string())
        .fetch_one(pool)
        .await?;

        Ok(promotion)
    }

    /// The publicly visible set: approved, with the display window still
    /// open as of today. The start bound is not checked.
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<Promotion>, ApiError> {
        let today = Utc::now().date_naive();
        let rows = sqlx::query_as::<_, Promotion>(
            "SELECT * FROM promotions WHERE status = 'approved' ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().filter(|p| p.is_live(today)).collect())
    }

    /// Administrative inbox: every promotion, any status, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Promotion>, ApiError> {
        let rows = sqlx::query_as::<_, Promotion>(
            "SELECT * FROM promotions ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Status-only update. Any of the three enumerated statuses is accepted
    /// from any current status; there is no transition guard.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: &str,
    ) -> Result<Option<Promotion>, ApiError> {
        let status: PromotionStatus = status.parse().map_err(|_| {
            ApiError::Validation("status must be pending, approved or rejected".into())
        })?;

        let promotion = sqlx::query_as::<_, Promotion>(
            "UPDATE promotions SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(pool)
        .await?;

        Ok(promotion)
    }

    /// Content-field update, orthogonal to status: only the submitted fields
    /// change, and new image uploads replace the stored URL list.
    pub async fn update_content(
        pool: &PgPool,
        relay: Option<&ImageRelay>,
        id: Uuid,
        multipart: Multipart,
    ) -> Result<Option<Promotion>, ApiError> {
        let Some(mut existing) = sqlx::query_as::<_, Promotion>(
            "SELECT * FROM promotions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        else {
            return Ok(None);
        };

        let mut form = Self::collect_form(multipart).await?;
        let images = std::mem::take(&mut form.images);

        if let Some(title) = form.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ApiError::Validation("title cannot be blank".into()));
            }
            existing.title = title;
        }
        if let Some(description) = form.description {
            let description = description.trim().to_string();
            existing.description = (!description.is_empty()).then_some(description);
        }
        if form.start.is_some() {
            existing.start_date = parse_date(form.start.as_deref(), "start")?;
        }
        if form.end.is_some() {
            existing.end_date = parse_date(form.end.as_deref(), "end")?;
        }
        if let Some(color) = form.color.filter(|c| !c.trim().is_empty()) {
            existing.color = color.trim().to_string();
        }
        if !images.is_empty() {
            existing.image_urls = relay_images(relay, &images).await?;
        }

        let updated = sqlx::query_as::<_, Promotion>(
            "UPDATE promotions
             SET title = $2, description = $3, image_urls = $4,
                 start_date = $5, end_date = $6, color = $7
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&existing.title)
        .bind(&existing.description)
        .bind(&existing.image_urls)
        .bind(existing.start_date)
        .bind(existing.end_date)
        .bind(&existing.color)
        .fetch_optional(pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Collect the allow-listed multipart fields for a promotion.
    /// Unknown field names are dropped.
    pub async fn collect_form(mut multipart: Multipart) -> Result<PromotionForm, ApiError> {
        let mut form = PromotionForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "title" => form.title = Some(read_text(field).await?),
                "description" => form.description = Some(read_text(field).await?),
                "start" => form.start = Some(read_text(field).await?),
                "end" => form.end = Some(read_text(field).await?),
                "color" => form.color = Some(read_text(field).await?),
                // Accept "image" or "image[]" (multiple values)
                n if n == "image" || n == "image[]" => {
                    if let Some(upload) = read_image(field).await? {
                        form.images.push(upload);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

pub(crate) async fn read_text(
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))
}

pub(crate) async fn read_image(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<ImageUpload>, ApiError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if bytes.is_empty() {
        // Browsers submit an empty part for an untouched file input.
        return Ok(None);
    }
    Ok(Some(ImageUpload {
        bytes,
        filename,
        content_type,
    }))
}
