//! Connection metrics for the client connection manager.
//!
//! Tracks RTT (from keepalive ping/pong) with exponential smoothing,
//! envelope counters, and reconnection statistics.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Connection metrics tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    /// Most recent RTT sample.
    #[serde(with = "duration_opt_millis")]
    pub rtt: Option<Duration>,
    /// Smoothed RTT estimate (EWMA, RFC 6298 style).
    #[serde(with = "duration_opt_millis")]
    pub rtt_smoothed: Option<Duration>,
    /// Total bytes sent on the command channel.
    pub bytes_sent: u64,
    /// Total bytes received on the command channel.
    pub bytes_recv: u64,
    /// Total command envelopes sent.
    pub commands_sent: u64,
    /// Total result envelopes received.
    pub results_recv: u64,
    /// Number of reconnections since construction.
    pub reconnect_count: u32,
    /// Construction timestamp (not serialized, reset on deserialize).
    #[serde(skip, default = "Instant::now")]
    pub started_at: Instant,
}

impl Default for ConnectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            rtt: None,
            rtt_smoothed: None,
            bytes_sent: 0,
            bytes_recv: 0,
            commands_sent: 0,
            results_recv: 0,
            reconnect_count: 0,
            started_at: Instant::now(),
        }
    }

    /// Update RTT with a new sample.
    ///
    /// SRTT = 7/8 * SRTT + 1/8 * sample.
    pub fn update_rtt(&mut self, sample: Duration) {
        self.rtt = Some(sample);
        self.rtt_smoothed = Some(match self.rtt_smoothed {
            Some(srtt) => {
                let srtt_nanos = srtt.as_nanos() as u64;
                let sample_nanos = sample.as_nanos() as u64;
                Duration::from_nanos((srtt_nanos * 7 + sample_nanos) / 8)
            }
            None => sample,
        });
    }

    /// Record an envelope sent.
    pub fn record_send(&mut self, bytes: usize) {
        self.bytes_sent = self.bytes_sent.saturating_add(bytes as u64);
        self.commands_sent = self.commands_sent.saturating_add(1);
    }

    /// Record an envelope received.
    pub fn record_recv(&mut self, bytes: usize) {
        self.bytes_recv = self.bytes_recv.saturating_add(bytes as u64);
        self.results_recv = self.results_recv.saturating_add(1);
    }

    /// Record a reconnection.
    pub fn record_reconnect(&mut self) {
        self.reconnect_count = self.reconnect_count.saturating_add(1);
    }

    /// Time since construction.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Serde helper for optional Duration as milliseconds.
mod duration_opt_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => (d.as_millis() as u64).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<u64> = Option::deserialize(deserializer)?;
        Ok(opt.map(Duration::from_millis))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_new() {
        let metrics = ConnectionMetrics::new();
        assert!(metrics.rtt.is_none());
        assert_eq!(metrics.commands_sent, 0);
        assert_eq!(metrics.reconnect_count, 0);
    }

    #[test]
    fn rtt_smoothing() {
        let mut metrics = ConnectionMetrics::new();

        metrics.update_rtt(Duration::from_millis(100));
        assert_eq!(metrics.rtt_smoothed, Some(Duration::from_millis(100)));

        metrics.update_rtt(Duration::from_millis(200));
        let srtt = metrics.rtt_smoothed.unwrap();
        // SRTT = 7/8 * 100 + 1/8 * 200 = 112.5
        assert!(srtt.as_millis() > 100);
        assert!(srtt.as_millis() < 200);
    }

    #[test]
    fn counters() {
        let mut metrics = ConnectionMetrics::new();
        metrics.record_send(100);
        metrics.record_recv(250);
        metrics.record_reconnect();

        assert_eq!(metrics.bytes_sent, 100);
        assert_eq!(metrics.commands_sent, 1);
        assert_eq!(metrics.bytes_recv, 250);
        assert_eq!(metrics.results_recv, 1);
        assert_eq!(metrics.reconnect_count, 1);
    }

    #[test]
    fn saturating_counters() {
        let mut metrics = ConnectionMetrics::new();
        metrics.bytes_sent = u64::MAX - 10;
        metrics.record_send(100);
        assert_eq!(metrics.bytes_sent, u64::MAX);
    }

    #[test]
    fn serialize_roundtrip() {
        let mut metrics = ConnectionMetrics::new();
        metrics.update_rtt(Duration::from_millis(50));
        metrics.record_send(100);

        let json = serde_json::to_string(&metrics).unwrap();
        let restored: ConnectionMetrics = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.rtt, metrics.rtt);
        assert_eq!(restored.bytes_sent, metrics.bytes_sent);
    }
}
