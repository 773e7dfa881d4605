//! Runtime counters.
//!
//! The collector is a set of atomics bumped from the coordinator's hot
//! paths; [`RuntimeStatistics`] is the point-in-time snapshot handed to
//! callers. Snapshots are values, never views into live state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time runtime snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RuntimeStatistics {
    /// Bytes of payload currently mapped.
    pub payload_bytes: u64,
    /// High-water mark of mapped payload bytes.
    pub peak_payload_bytes: u64,
    /// Logical ticks executed while running.
    pub ticks: u64,
    /// CPU usage fraction. Always zero until an engine reports it.
    pub cpu_usage: f64,
    /// Bytes received over the network. Always zero until an engine
    /// reports it.
    pub network_rx: u64,
    /// Bytes sent over the network. Always zero until an engine
    /// reports it.
    pub network_tx: u64,
    /// API requests dispatched through the coordinator.
    pub api_requests: u64,
    /// API requests that came back as failures.
    pub api_failures: u64,
    /// Frames presented by the render thread.
    pub frames_rendered: u64,
    /// Time since the coordinator was created.
    pub uptime: Duration,
}

/// Live counters behind the snapshots.
#[derive(Debug, Default)]
pub struct StatsCollector {
    payload_bytes: AtomicU64,
    peak_payload_bytes: AtomicU64,
    ticks: AtomicU64,
    api_requests: AtomicU64,
    api_failures: AtomicU64,
}

impl StatsCollector {
    /// Creates a zeroed collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current mapped payload size and advances the peak.
    pub fn set_payload_bytes(&self, bytes: u64) {
        self.payload_bytes.store(bytes, Ordering::Release);
        self.peak_payload_bytes.fetch_max(bytes, Ordering::AcqRel);
    }

    /// Counts one logical tick.
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one dispatched API request and its outcome.
    pub fn record_api(&self, success: bool) {
        self.api_requests.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.api_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Snapshots the counters. `frames_rendered` and `uptime` come from
    /// the caller, which owns the pipeline and the start instant.
    #[must_use]
    pub fn snapshot(&self, frames_rendered: u64, uptime: Duration) -> RuntimeStatistics {
        RuntimeStatistics {
            payload_bytes: self.payload_bytes.load(Ordering::Acquire),
            peak_payload_bytes: self.peak_payload_bytes.load(Ordering::Acquire),
            ticks: self.ticks.load(Ordering::Relaxed),
            // The stub engine runs no code and opens no sockets.
            cpu_usage: 0.0,
            network_rx: 0,
            network_tx: 0,
            api_requests: self.api_requests.load(Ordering::Relaxed),
            api_failures: self.api_failures.load(Ordering::Relaxed),
            frames_rendered,
            uptime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_survives_unload() {
        let stats = StatsCollector::new();
        stats.set_payload_bytes(4096);
        stats.set_payload_bytes(0);

        let snap = stats.snapshot(0, Duration::ZERO);
        assert_eq!(snap.payload_bytes, 0);
        assert_eq!(snap.peak_payload_bytes, 4096);
    }

    #[test]
    fn test_api_failures_counted_separately() {
        let stats = StatsCollector::new();
        stats.record_api(true);
        stats.record_api(false);
        stats.record_api(true);

        let snap = stats.snapshot(0, Duration::ZERO);
        assert_eq!(snap.api_requests, 3);
        assert_eq!(snap.api_failures, 1);
    }

    #[test]
    fn test_cpu_and_network_counters_present_and_zero() {
        let stats = StatsCollector::new();
        stats.record_tick();

        let snap = stats.snapshot(0, Duration::ZERO);
        assert!(snap.cpu_usage.abs() < f64::EPSILON);
        assert_eq!(snap.network_rx, 0);
        assert_eq!(snap.network_tx, 0);
    }

    #[test]
    fn test_ticks_accumulate() {
        let stats = StatsCollector::new();
        for _ in 0..5 {
            stats.record_tick();
        }
        assert_eq!(stats.snapshot(0, Duration::ZERO).ticks, 5);
    }
}
