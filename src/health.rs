//! Process health snapshot for the liveness endpoint.

use serde::Serialize;
use std::sync::OnceLock;
use std::time::Instant;

static STARTED_AT: OnceLock<Instant> = OnceLock::new();

/// Record process start. Idempotent; call once from main.
pub fn init() {
    let _ = STARTED_AT.set(Instant::now());
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub uptime_seconds: u64,
}

/// Current process health.
pub fn snapshot() -> HealthSnapshot {
    let uptime_seconds = STARTED_AT
        .get()
        .map(|started| started.elapsed().as_secs())
        .unwrap_or(0);
    HealthSnapshot { uptime_seconds }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_without_init_is_zero_uptime() {
        // init() may have run in another test; either way this never panics
        // and uptime is monotonic from zero.
        let first = snapshot();
        init();
        let second = snapshot();
        assert!(second.uptime_seconds >= first.uptime_seconds || first.uptime_seconds == 0);
    }
}
