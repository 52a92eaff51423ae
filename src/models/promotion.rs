use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

pub const DEFAULT_COLOR: &str = "#f97316";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PromotionStatus::Pending => "pending",
            PromotionStatus::Approved => "approved",
            PromotionStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PromotionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(PromotionStatus::Pending),
            "approved" => Ok(PromotionStatus::Approved),
            "rejected" => Ok(PromotionStatus::Rejected),
            _ => Err(anyhow::anyhow!("Unknown status: {s}")),
        }
    }
}

/// DB row struct — status is stored as TEXT, parse into [`PromotionStatus`]
/// where a typed comparison is needed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub color: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether this promotion is shown to the public on `today`.
    ///
    /// Only the status and the end of the display window are checked: an
    /// approved promotion is live immediately, even before its declared
    /// `start_date`, and stays live through the whole of `end_date`.
    pub fn is_live(&self, today: NaiveDate) -> bool {
        self.status
            .parse::<PromotionStatus>()
            .is_ok_and(|s| s == PromotionStatus::Approved)
            && self.end_date >= today
    }
}

/// Raw multipart fields collected for a promotion create/edit. Unknown
/// fields are discarded at collection time; only these names are accepted.
#[derive(Debug, Default)]
pub struct PromotionForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub color: Option<String>,
    pub images: Vec<ImageUpload>,
}

/// One uploaded file field, prior to being relayed to the image host.
#[derive(Debug)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: String,
}

/// Validated payload for inserting a promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPromotion {
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub color: String,
}

impl PromotionForm {
    /// Validate the collected fields into an insertable payload.
    ///
    /// `title`, `start` and `end` are required; `start <= end` is not
    /// checked (the window is taken as submitted).
    pub fn into_new(self) -> Result<NewPromotion, ApiError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Validation("title is required".into()))?;

        let start_date = parse_date(self.start.as_deref(), "start")?;
        let end_date = parse_date(self.end.as_deref(), "end")?;

        let color = self
            .color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string());

        Ok(NewPromotion {
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            start_date,
            end_date,
            color,
        })
    }
}

pub(crate) fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{field} date is required")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(format!("{field} must be a YYYY-MM-DD date")))
}

/// Body of `PUT /admin/promotions/{id}` — a status change and nothing else.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promotion(status: &str, start: NaiveDate, end: NaiveDate) -> Promotion {
        Promotion {
            id: Uuid::new_v4(),
            title: "Soldes d'été".into(),
            description: None,
            image_urls: vec![],
            start_date: start,
            end_date: end,
            color: DEFAULT_COLOR.into(),
            status: status.into(),
            created_at: Utc::now(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn approved_promotion_is_live_before_its_start_date() {
        // The start bound is intentionally not part of the public predicate.
        let p = promotion("approved", d(2024, 6, 1), d(2024, 6, 30));
        assert!(p.is_live(d(2024, 5, 1)));
    }

    #[test]
    fn approved_promotion_is_live_through_its_end_date() {
        let p = promotion("approved", d(2024, 6, 1), d(2024, 6, 30));
        assert!(p.is_live(d(2024, 6, 30)));
        assert!(!p.is_live(d(2024, 7, 1)));
    }

    #[test]
    fn pending_and_rejected_promotions_are_never_live() {
        let start = d(2024, 6, 1);
        let end = d(2024, 6, 30);
        assert!(!promotion("pending", start, end).is_live(d(2024, 6, 15)));
        assert!(!promotion("rejected", start, end).is_live(d(2024, 6, 15)));
    }

    #[test]
    fn unknown_status_is_treated_as_not_live() {
        let p = promotion("archived", d(2024, 6, 1), d(2024, 6, 30));
        assert!(!p.is_live(d(2024, 6, 15)));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "APPROVED".parse::<PromotionStatus>().unwrap(),
            PromotionStatus::Approved
        );
        assert_eq!(
            "pending".parse::<PromotionStatus>().unwrap(),
            PromotionStatus::Pending
        );
        assert!("published".parse::<PromotionStatus>().is_err());
    }

    #[test]
    fn form_requires_a_non_blank_title() {
        let form = PromotionForm {
            title: Some("   ".into()),
            start: Some("2024-01-01".into()),
            end: Some("2024-01-10".into()),
            ..Default::default()
        };
        assert!(form.into_new().is_err());

        let form = PromotionForm {
            start: Some("2024-01-01".into()),
            end: Some("2024-01-10".into()),
            ..Default::default()
        };
        assert!(form.into_new().is_err());
    }

    #[test]
    fn form_rejects_malformed_dates() {
        let form = PromotionForm {
            title: Some("Sale".into()),
            start: Some("01/06/2024".into()),
            end: Some("2024-06-30".into()),
            ..Default::default()
        };
        assert!(form.into_new().is_err());
    }

    #[test]
    fn form_applies_the_default_color() {
        let form = PromotionForm {
            title: Some("Sale".into()),
            start: Some("2024-01-01".into()),
            end: Some("2024-01-10".into()),
            ..Default::default()
        };
        let new = form.into_new().unwrap();
        assert_eq!(new.color, DEFAULT_COLOR);
        assert_eq!(new.description, None);
    }

    #[test]
    fn form_keeps_an_inverted_window_as_submitted() {
        let form = PromotionForm {
            title: Some("Sale".into()),
            start: Some("2024-02-01".into()),
            end: Some("2024-01-01".into()),
            ..Default::default()
        };
        let new = form.into_new().unwrap();
        assert!(new.start_date > new.end_date);
    }
}
