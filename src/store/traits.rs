//! Report store trait and document types.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The body of a care report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContent {
    pub diagnosis: String,
    pub recommendations: String,
}

/// A stored care report. `date` is assigned by the store, not the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub icon_name: String,
    pub date: Option<DateTime<Utc>>,
    pub content: ReportContent,
}

impl Report {
    /// Report date in the display format the product uses ("July 04, 2026").
    pub fn display_date(&self) -> Option<String> {
        self.date.map(|date| date.format("%B %d, %Y").to_string())
    }
}

/// Caller-supplied fields for a new report.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub diagnosis: String,
    pub recommendations: String,
}

/// Icon every report row renders with in the dashboard.
pub const REPORT_ICON: &str = "LineChart";

/// A document database holding care reports.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All reports, newest first.
    async fn list_reports(&self) -> Result<Vec<Report>>;

    /// Persist a new report; the store assigns id and date.
    async fn create_report(&self, new: NewReport) -> Result<Report>;

    /// One report by id, or None when absent.
    async fn get_report(&self, id: &str) -> Result<Option<Report>>;

    /// The name of this store implementation.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_date_uses_long_month_format() {
        let report = Report {
            id: "r1".into(),
            title: "Quarterly check".into(),
            icon_name: REPORT_ICON.into(),
            date: Some(Utc.with_ymd_and_hms(2026, 7, 4, 12, 0, 0).unwrap()),
            content: ReportContent::default(),
        };
        assert_eq!(report.display_date().as_deref(), Some("July 04, 2026"));
    }

    #[test]
    fn display_date_absent_when_store_gave_none() {
        let report = Report {
            id: "r1".into(),
            title: String::new(),
            icon_name: REPORT_ICON.into(),
            date: None,
            content: ReportContent::default(),
        };
        assert_eq!(report.display_date(), None);
    }
}
