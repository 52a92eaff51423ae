use axum::extract::Multipart;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::announcement::{Announcement, AnnouncementForm};
use crate::services::image_relay::{relay_images, ImageRelay};
use crate::services::promotions::{read_image, read_text};

pub struct AnnouncementService;

impl AnnouncementService {
    pub async fn create(
        pool: &PgPool,
        relay: Option<&ImageRelay>,
        multipart: Multipart,
    ) -> Result<Announcement, ApiError> {
        let mut form = Self::collect_form(multipart).await?;
        let images = std::mem::take(&mut form.images);
        let new = form.into_new()?;
        let image_urls = relay_images(relay, &images).await?;

        let announcement = sqlx::query_as::<_, Announcement>(
            "INSERT INTO announcements (title, description, image_urls, start_date, end_date, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&image_urls)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.is_active)
        .fetch_one(pool)
        .await?;

        Ok(announcement)
    }

    /// Active announcements whose window covers `now`, newest first. Both
    /// bounds are enforced, unlike the promotion predicate.
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<Announcement>, ApiError> {
        let now = Utc::now();
        let rows = sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements WHERE is_active = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().filter(|a| a.is_live(now)).collect())
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Announcement>, ApiError> {
        let rows = sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Edit content fields and the active flag; submitted fields only.
    pub async fn update(
        pool: &PgPool,
        relay: Option<&ImageRelay>,
        id: Uuid,
        multipart: Multipart,
    ) -> Result<Option<Announcement>, ApiError> {
        let Some(existing) = sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        else {
            return Ok(None);
        };

        let mut form = Self::collect_form(multipart).await?;
        let images = std::mem::take(&mut form.images);

        // Overlay the stored record with the submitted fields, then run the
        // whole result through the same validation as a create.
        let merged = AnnouncementForm {
            title: form.title.or(Some(existing.title)),
            description: form
                .description
                .or(existing.description),
            start: form.start.or(Some(existing.start_date.to_rfc3339())),
            end: form.end.or(Some(existing.end_date.to_rfc3339())),
            is_active: form.is_active.or(Some(existing.is_active.to_string())),
            images: Vec::new(),
        };
        let new = merged.into_new()?;

        let image_urls = if images.is_empty() {
            existing.image_urls
        } else {
            relay_images(relay, &images).await?
        };

        let updated = sqlx::query_as::<_, Announcement>(
            "UPDATE announcements
             SET title = $2, description = $3, image_urls = $4,
                 start_date = $5, end_date = $6, is_active = $7
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&image_urls)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.is_active)
        .fetch_optional(pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn collect_form(mut multipart: Multipart) -> Result<AnnouncementForm, ApiError> {
        let mut form = AnnouncementForm::default();

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
                n if n == "isActive" || n == "is_active" => {
                    form.is_active = Some(read_text(field).await?)
                }
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
