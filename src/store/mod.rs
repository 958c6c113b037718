//! Report document store.
//!
//! Firestore in production; an in-memory store backs tests and
//! credential-less local runs.

pub mod firestore;
pub mod in_memory;
pub mod traits;

pub use traits::{DocumentStore, NewReport, Report, ReportContent};

use tracing::info;

use crate::config::FirestoreConfig;

/// Factory: Firestore when a project is configured, in-memory otherwise.
pub fn create_store(config: &FirestoreConfig) -> Box<dyn DocumentStore> {
    if config.project_id.is_empty() {
        info!("no Firestore project configured; using in-memory report store");
        Box::new(in_memory::InMemoryStore::new())
    } else {
        Box::new(firestore::FirestoreStore::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_falls_back_to_memory() {
        let store = create_store(&FirestoreConfig::default());
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn factory_picks_firestore_when_project_set() {
        let config = FirestoreConfig {
            project_id: "care-prod".into(),
            ..FirestoreConfig::default()
        };
        assert_eq!(create_store(&config).name(), "firestore");
    }
}
