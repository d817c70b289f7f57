//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Transactions ---
    pub tx_submitted: AtomicU64,
    pub tx_confirmed: AtomicU64,
    pub tx_failed: AtomicU64,
    pub tx_timeouts: AtomicU64,
    pub confirm_duration_ms_sum: AtomicU64,

    // --- RPC ---
    pub rpc_errors: AtomicU64,
    pub rpc_failovers: AtomicU64,

    // --- Uploads ---
    pub uploads_accepted: AtomicU64,
    pub uploads_rejected: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            tx_submitted: AtomicU64::new(0),
            tx_confirmed: AtomicU64::new(0),
            tx_failed: AtomicU64::new(0),
            tx_timeouts: AtomicU64::new(0),
            confirm_duration_ms_sum: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            uploads_accepted: AtomicU64::new(0),
            uploads_rejected: AtomicU64::new(0),
        }
    }

    pub fn record_confirm_duration(&self, start: Instant) {
        let ms = start.elapsed().as_millis() as u64;
        self.confirm_duration_ms_sum.fetch_add(ms, Ordering::Relaxed);
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let tx_submitted = self.tx_submitted.load(Ordering::Relaxed);
        let tx_confirmed = self.tx_confirmed.load(Ordering::Relaxed);
        let tx_failed = self.tx_failed.load(Ordering::Relaxed);
        let tx_timeouts = self.tx_timeouts.load(Ordering::Relaxed);
        let confirm_sum_s = self.confirm_duration_ms_sum.load(Ordering::Relaxed) as f64 / 1_000.0;
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);
        let rpc_failovers = self.rpc_failovers.load(Ordering::Relaxed);
        let uploads_accepted = self.uploads_accepted.load(Ordering::Relaxed);
        let uploads_rejected = self.uploads_rejected.load(Ordering::Relaxed);

        format!(
            "\
# HELP collectibles_tx_submitted_total Transactions handed to the wallet.\n\
# TYPE collectibles_tx_submitted_total counter\n\
collectibles_tx_submitted_total {tx_submitted}\n\
# HELP collectibles_tx_confirmed_total Transactions included with success status.\n\
# TYPE collectibles_tx_confirmed_total counter\n\
collectibles_tx_confirmed_total {tx_confirmed}\n\
# HELP collectibles_tx_failed_total Rejected or reverted transactions.\n\
# TYPE collectibles_tx_failed_total counter\n\
collectibles_tx_failed_total {tx_failed}\n\
# HELP collectibles_tx_timeouts_total Confirmation waits that hit the timeout.\n\
# TYPE collectibles_tx_timeouts_total counter\n\
collectibles_tx_timeouts_total {tx_timeouts}\n\
# HELP collectibles_confirm_duration_seconds_sum Total time spent awaiting confirmation.\n\
# TYPE collectibles_confirm_duration_seconds_sum counter\n\
collectibles_confirm_duration_seconds_sum {confirm_sum_s:.3}\n\
# HELP collectibles_rpc_errors_total RPC transport errors.\n\
# TYPE collectibles_rpc_errors_total counter\n\
collectibles_rpc_errors_total {rpc_errors}\n\
# HELP collectibles_rpc_failovers_total RPC primary-to-fallback failovers.\n\
# TYPE collectibles_rpc_failovers_total counter\n\
collectibles_rpc_failovers_total {rpc_failovers}\n\
# HELP collectibles_uploads_accepted_total Stored uploads.\n\
# TYPE collectibles_uploads_accepted_total counter\n\
collectibles_uploads_accepted_total {uploads_accepted}\n\
# HELP collectibles_uploads_rejected_total Uploads refused for size or type.\n\
# TYPE collectibles_uploads_rejected_total counter\n\
collectibles_uploads_rejected_total {uploads_rejected}\n"
        )
    }
}
