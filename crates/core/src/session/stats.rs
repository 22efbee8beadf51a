use std::sync::atomic::{AtomicU64, Ordering};

/// Per-session delivery counters.
#[derive(Debug, Default)]
pub struct SessionStats {
    packets_sent: AtomicU64,
    bytes_sent: AtomicU64,
    send_failures: AtomicU64,
    awaiting_keyframe: AtomicU64,
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub packets_sent: u64,
    /// Bytes handed to transports, interleaved framing included.
    pub bytes_sent: u64,
    pub send_failures: u64,
    /// Packets dropped while a binding waited for a random-access point.
    pub awaiting_keyframe: u64,
}

impl SessionStats {
    pub(crate) fn record_sent(&self, bytes: usize) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_awaiting_keyframe(&self) {
        self.awaiting_keyframe.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            awaiting_keyframe: self.awaiting_keyframe.load(Ordering::Relaxed),
        }
    }
}
