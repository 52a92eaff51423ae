use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::promotion::ImageUpload;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    /// Whether this announcement is shown to the public at `now`.
    ///
    /// Unlike promotions, both window bounds are enforced: the start bound
    /// is compared against the exact instant, the end bound against the
    /// calendar date (an announcement expiring earlier today is still shown
    /// for the rest of the day).
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date <= now
            && self.end_date.date_naive() >= now.date_naive()
    }
}

/// Raw multipart fields collected for an announcement create/edit.
#[derive(Debug, Default)]
pub struct AnnouncementForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub is_active: Option<String>,
    pub images: Vec<ImageUpload>,
}

/// Validated payload for inserting an announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnouncement {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

impl AnnouncementForm {
    pub fn into_new(self) -> Result<NewAnnouncement, ApiError> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Validation("title is required".into()))?;

        let start_date = parse_instant(self.start.as_deref(), "start")?;
        let end_date = parse_instant(self.end.as_deref(), "end")?;
        let is_active = parse_active_flag(self.is_active.as_deref())?;

        Ok(NewAnnouncement {
            title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            start_date,
            end_date,
            is_active,
        })
    }
}

/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (taken as
/// midnight UTC).
fn parse_instant(value: Option<&str>, field: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{field} date is required")))?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            ApiError::Validation(format!(
                "{field} must be an RFC 3339 timestamp or a YYYY-MM-DD date"
            ))
        })
}

fn parse_active_flag(value: Option<&str>) -> Result<bool, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(true),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ApiError::Validation(format!(
            "isActive must be true or false, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(active: bool, start: &str, end: &str) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Fermeture estivale".into(),
            description: None,
            image_urls: vec![],
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            is_active: active,
            created_at: Utc::now(),
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn announcement_enforces_both_window_bounds() {
        let a = announcement(true, "2024-06-10T00:00:00Z", "2024-06-20T00:00:00Z");
        assert!(!a.is_live(at("2024-06-09T23:59:59Z")));
        assert!(a.is_live(at("2024-06-10T00:00:00Z")));
        assert!(a.is_live(at("2024-06-15T12:00:00Z")));
        assert!(!a.is_live(at("2024-06-21T00:00:00Z")));
    }

    #[test]
    fn end_bound_is_date_truncated() {
        // Expired at 08:00 today, but still shown for the rest of the day.
        let a = announcement(true, "2024-06-01T00:00:00Z", "2024-06-20T08:00:00Z");
        assert!(a.is_live(at("2024-06-20T18:00:00Z")));
        assert!(!a.is_live(at("2024-06-21T01:00:00Z")));
    }

    #[test]
    fn inactive_announcement_is_never_live() {
        let a = announcement(false, "2024-06-01T00:00:00Z", "2024-06-30T00:00:00Z");
        assert!(!a.is_live(at("2024-06-15T12:00:00Z")));
    }

    #[test]
    fn form_accepts_plain_dates_and_rfc3339() {
        let form = AnnouncementForm {
            title: Some("Info".into()),
            start: Some("2024-06-01".into()),
            end: Some("2024-06-30T18:00:00Z".into()),
            ..Default::default()
        };
        let new = form.into_new().unwrap();
        assert_eq!(new.start_date, at("2024-06-01T00:00:00Z"));
        assert_eq!(new.end_date, at("2024-06-30T18:00:00Z"));
        assert!(new.is_active);
    }

    #[test]
    fn form_rejects_a_bad_active_flag() {
        let form = AnnouncementForm {
            title: Some("Info".into()),
            start: Some("2024-06-01".into()),
            end: Some("2024-06-30".into()),
            is_active: Some("maybe".into()),
            ..Default::default()
        };
        assert!(form.into_new().is_err());
    }

    #[test]
    fn form_requires_title_and_dates() {
        let form = AnnouncementForm::default();
        assert!(form.into_new().is_err());

        let form = AnnouncementForm {
            title: Some("Info".into()),
            start: Some("2024-06-01".into()),
            ..Default::default()
        };
        assert!(form.into_new().is_err());
    }
}
