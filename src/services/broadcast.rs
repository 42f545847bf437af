//! Broadcast service
//!
//! Copies one admin message to every known user with a fixed pause between
//! deliveries. A failed delivery is counted and the batch goes on. An admin
//! can cancel their running broadcast at any time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use dashmap::DashMap;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use crate::database::UserRepository;
use crate::utils::errors::Result;
use crate::utils::logging::log_broadcast_summary;
use super::transport::ChatTransport;

/// Outcome counters of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub ok: u32,
    pub fail: u32,
    pub cancelled: bool,
}

impl BroadcastReport {
    pub fn summary(&self) -> String {
        let head = if self.cancelled { "⛔ Broadcast cancelled" } else { "📣 Broadcast finished" };
        format!("{}\n✅ Delivered: {}\n❌ Failed: {}", head, self.ok, self.fail)
    }
}

#[derive(Clone)]
pub struct BroadcastService {
    transport: Arc<dyn ChatTransport>,
    users: UserRepository,
    delay: Duration,
    /// Running broadcasts per admin, tagged with a run number
    active: Arc<DashMap<i64, (u64, CancellationToken)>>,
    runs: Arc<AtomicU64>,
}

impl BroadcastService {
    pub fn new(transport: Arc<dyn ChatTransport>, users: UserRepository, delay: Duration) -> Self {
        Self {
            transport,
            users,
            delay,
            active: Arc::new(DashMap::new()),
            runs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether this admin has a broadcast in flight
    pub fn is_running(&self, admin_id: i64) -> bool {
        self.active.contains_key(&admin_id)
    }

    /// Ask a running broadcast to stop after the current delivery
    pub fn cancel(&self, admin_id: i64) -> bool {
        match self.active.get(&admin_id) {
            Some(entry) => {
                entry.1.cancel();
                info!(admin_id = admin_id, "Broadcast cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Copy a message to every user
    pub async fn run(&self, admin_id: i64, from_chat_id: i64, message_id: i32) -> Result<BroadcastReport> {
        let recipients = self.users.list_ids().await?;
        self.run_to(admin_id, from_chat_id, message_id, &recipients).await
    }

    /// Copy a message to the given recipients
    pub async fn run_to(
        &self,
        admin_id: i64,
        from_chat_id: i64,
        message_id: i32,
        recipients: &[i64],
    ) -> Result<BroadcastReport> {
        let token = CancellationToken::new();
        let run = self.runs.fetch_add(1, Ordering::Relaxed);
        if let Some((_, previous)) = self.active.insert(admin_id, (run, token.clone())) {
            warn!(admin_id = admin_id, "Replacing a running broadcast");
            previous.cancel();
        }

        info!(admin_id = admin_id, recipients = recipients.len(), "Broadcast started");
        let mut report = BroadcastReport::default();

        for (index, &user_id) in recipients.iter().enumerate() {
            if token.is_cancelled() {
                report.cancelled = true;
                break;
            }

            match self.transport.copy_message(user_id, from_chat_id, message_id).await {
                Ok(_) => report.ok += 1,
                Err(e) => {
                    debug!(user_id = user_id, error = %e, "Broadcast delivery failed");
                    report.fail += 1;
                }
            }

            if index + 1 < recipients.len() {
                tokio::select! {
                    _ = token.cancelled() => {
                        report.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
        }

        self.active.remove_if(&admin_id, |_, (current, _)| *current == run);
        log_broadcast_summary(admin_id, report.ok, report.fail, report.cancelled);
        Ok(report)
    }
}

impl std::fmt::Debug for BroadcastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastService")
            .field("delay", &self.delay)
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let report = BroadcastReport { ok: 2, fail: 1, cancelled: false };
        assert!(report.summary().contains("Delivered: 2"));
        assert!(report.summary().contains("Failed: 1"));

        let cancelled = BroadcastReport { cancelled: true, ..report };
        assert!(cancelled.summary().starts_with("⛔"));
    }
}
