use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Round-trip times of redemption requests, in milliseconds, oldest first.
#[derive(Debug, Clone, Default)]
pub struct LatencyTracker {
    samples: Arc<Mutex<Vec<u64>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min_ms: Option<u64>,
    pub max_ms: Option<u64>,
    pub mean_ms: Option<f64>,
    pub last_ms: Option<u64>,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.samples.lock().await.push(millis);
    }

    pub async fn samples(&self) -> Vec<u64> {
        self.samples.lock().await.clone()
    }

    pub async fn summary(&self) -> LatencySummary {
        let samples = self.samples.lock().await;

        if samples.is_empty() {
            return LatencySummary::default();
        }

        let total: u128 = samples.iter().map(|&ms| ms as u128).sum();

        LatencySummary {
            count: samples.len(),
            min_ms: samples.iter().copied().min(),
            max_ms: samples.iter().copied().max(),
            mean_ms: Some(total as f64 / samples.len() as f64),
            last_ms: samples.last().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_summary() {
        let tracker = LatencyTracker::new();
        assert_eq!(tracker.summary().await, LatencySummary::default());
    }

    #[tokio::test]
    async fn test_samples_keep_order() {
        let tracker = LatencyTracker::new();
        tracker.record(Duration::from_millis(120)).await;
        tracker.record(Duration::from_millis(80)).await;
        tracker.record(Duration::from_micros(100_900)).await;

        assert_eq!(tracker.samples().await, vec![120, 80, 100]);

        let summary = tracker.summary().await;
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_ms, Some(80));
        assert_eq!(summary.max_ms, Some(120));
        assert_eq!(summary.mean_ms, Some(100.0));
        assert_eq!(summary.last_ms, Some(100));
    }
}
