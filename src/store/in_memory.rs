//! In-memory report store, for tests and credential-less local runs.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::traits::{DocumentStore, NewReport, Report, ReportContent, REPORT_ICON};

#[derive(Default)]
pub struct InMemoryStore {
    reports: Mutex<Vec<Report>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_reports(&self) -> Result<Vec<Report>> {
        let mut reports = self.reports.lock().clone();
        reports.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(reports)
    }

    async fn create_report(&self, new: NewReport) -> Result<Report> {
        let report = Report {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            icon_name: REPORT_ICON.into(),
            date: Some(Utc::now()),
            content: ReportContent {
                diagnosis: new.diagnosis,
                recommendations: new.recommendations,
            },
        };
        self.reports.lock().push(report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: &str) -> Result<Option<Report>> {
        Ok(self.reports.lock().iter().find(|r| r.id == id).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_report(title: &str) -> NewReport {
        NewReport {
            title: title.into(),
            diagnosis: "stable".into(),
            recommendations: "rest".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_date() {
        let store = InMemoryStore::new();
        let report = store.create_report(new_report("First")).await.unwrap();
        assert!(!report.id.is_empty());
        assert!(report.date.is_some());
        assert_eq!(report.icon_name, REPORT_ICON);
    }

    #[tokio::test]
    async fn get_returns_created_report() {
        let store = InMemoryStore::new();
        let created = store.create_report(new_report("First")).await.unwrap();
        let fetched = store.get_report(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "First");
        assert_eq!(fetched.content.diagnosis, "stable");
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let store = InMemoryStore::new();
        assert!(store.get_report("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryStore::new();
        let first = store.create_report(new_report("older")).await.unwrap();
        // Force distinct timestamps.
        {
            let mut reports = store.reports.lock();
            let report = reports.iter_mut().find(|r| r.id == first.id).unwrap();
            report.date = Some(Utc::now() - chrono::Duration::seconds(60));
        }
        store.create_report(new_report("newer")).await.unwrap();

        let listed = store.list_reports().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "newer");
        assert_eq!(listed[1].title, "older");
    }
}
