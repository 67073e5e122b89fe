use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub struct Metrics {
    pub requests_rejected: AtomicU64,
    pub tenants_created: AtomicU64,
    pub onboarding_submissions: AtomicU64,
    pub assistants_created: AtomicU64,
    pub appointments_synced: AtomicU64,
    pub calls_logged: AtomicU64,
    pub rollups_written: AtomicU64,
    pub conflicts: AtomicU64,
    pub errors: AtomicU64,
    pub start_time: Instant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub requests_rejected: u64,
    pub tenants_created: u64,
    pub onboarding_submissions: u64,
    pub assistants_created: u64,
    pub appointments_synced: u64,
    pub calls_logged: u64,
    pub rollups_written: u64,
    pub conflicts: u64,
    pub errors: u64,
    pub uptime_secs: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_rejected: AtomicU64::new(0),
            tenants_created: AtomicU64::new(0),
            onboarding_submissions: AtomicU64::new(0),
            assistants_created: AtomicU64::new(0),
            appointments_synced: AtomicU64::new(0),
            calls_logged: AtomicU64::new(0),
            rollups_written: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Payload failed validation or could not be parsed.
    pub fn increment_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tenants_created(&self) {
        self.tenants_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_onboarding(&self) {
        self.onboarding_submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_assistants_created(&self) {
        self.assistants_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_appointments_synced(&self) {
        self.appointments_synced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_calls_logged(&self) {
        self.calls_logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rollups_written(&self) {
        self.rollups_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_conflicts(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            tenants_created: self.tenants_created.load(Ordering::Relaxed),
            onboarding_submissions: self.onboarding_submissions.load(Ordering::Relaxed),
            assistants_created: self.assistants_created.load(Ordering::Relaxed),
            appointments_synced: self.appointments_synced.load(Ordering::Relaxed),
            calls_logged: self.calls_logged.load(Ordering::Relaxed),
            rollups_written: self.rollups_written.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_metrics() {
        let metrics = Metrics::new();
        metrics.increment_calls_logged();
        metrics.increment_calls_logged();
        metrics.increment_conflicts();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls_logged, 2);
        assert_eq!(snapshot.conflicts, 1);
        assert_eq!(snapshot.errors, 0);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let metrics = Metrics::new();
        metrics.increment_rejected();

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["requestsRejected"], 1);
        assert!(json.get("uptimeSecs").is_some());
    }
}
