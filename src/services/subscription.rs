//! Subscription gate
//!
//! Decides whether a user is subscribed to every mandatory channel. The gate
//! fails closed: malformed channel ids, lookup errors and timeouts all count
//! as "not subscribed".

use std::sync::Arc;
use std::time::Duration;
use dashmap::{DashMap, DashSet};
use futures::future::join_all;
use tracing::{debug, warn};
use crate::database::ChannelRepository;
use crate::models::Channel;
use crate::utils::errors::Result;
use crate::utils::logging::log_gate_verdict;
use super::transport::ChatTransport;

/// Join requests the bot has seen, per user
#[derive(Debug, Clone, Default)]
pub struct JoinRequestTracker {
    pending: Arc<DashMap<i64, DashSet<i64>>>,
}

impl JoinRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user_id: i64, chat_id: i64) {
        self.pending.entry(user_id).or_default().insert(chat_id);
    }

    pub fn is_pending(&self, user_id: i64, chat_id: i64) -> bool {
        self.pending
            .get(&user_id)
            .map(|chats| chats.contains(&chat_id))
            .unwrap_or(false)
    }

    /// Forget a user's requests once they pass the gate
    pub fn clear(&self, user_id: i64) {
        self.pending.remove(&user_id);
    }
}

/// A channel the user still has to join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingChannel {
    pub channel: Channel,
    /// The user already asked to join and waits for approval
    pub pending_request: bool,
}

#[derive(Clone)]
pub struct SubscriptionGate {
    channels: ChannelRepository,
    transport: Arc<dyn ChatTransport>,
    join_requests: JoinRequestTracker,
    check_timeout: Duration,
}

impl SubscriptionGate {
    pub fn new(
        channels: ChannelRepository,
        transport: Arc<dyn ChatTransport>,
        join_requests: JoinRequestTracker,
        check_timeout: Duration,
    ) -> Self {
        Self {
            channels,
            transport,
            join_requests,
            check_timeout,
        }
    }

    pub fn join_requests(&self) -> &JoinRequestTracker {
        &self.join_requests
    }

    /// Membership check for one channel; any failure means unsatisfied
    async fn is_subscribed(&self, channel: &Channel, user_id: i64) -> bool {
        let Some(chat_id) = channel.numeric_id() else {
            warn!(chat_id = %channel.chat_id, "Channel id is not numeric, treating as unsubscribed");
            return false;
        };

        match tokio::time::timeout(self.check_timeout, self.transport.membership(chat_id, user_id)).await {
            Ok(Ok(status)) => status.is_satisfied(),
            Ok(Err(e)) => {
                debug!(chat_id = chat_id, user_id = user_id, error = %e, "Membership query failed");
                false
            }
            Err(_) => {
                warn!(chat_id = chat_id, user_id = user_id, "Membership query timed out");
                false
            }
        }
    }

    /// True when the user satisfies every registered channel.
    ///
    /// Stops at the first unsatisfied channel.
    pub async fn verify(&self, user_id: i64) -> Result<bool> {
        let channels = self.channels.list_full().await?;
        if channels.is_empty() {
            return Ok(true);
        }

        for channel in &channels {
            if !self.is_subscribed(channel, user_id).await {
                log_gate_verdict(user_id, false, 1);
                return Ok(false);
            }
        }

        self.join_requests.clear(user_id);
        log_gate_verdict(user_id, true, 0);
        Ok(true)
    }

    /// Every channel the user has not satisfied, in registry order
    pub async fn unsatisfied(&self, user_id: i64) -> Result<Vec<Channel>> {
        let channels = self.channels.list_full().await?;
        let checks = channels.iter().map(|channel| self.is_subscribed(channel, user_id));
        let verdicts = join_all(checks).await;

        let missing: Vec<Channel> = channels
            .into_iter()
            .zip(verdicts)
            .filter(|(_, subscribed)| !subscribed)
            .map(|(channel, _)| channel)
            .collect();

        log_gate_verdict(user_id, missing.is_empty(), missing.len());
        Ok(missing)
    }

    /// Unsatisfied channels annotated with pending join requests
    pub async fn missing_channels(&self, user_id: i64) -> Result<Vec<MissingChannel>> {
        let missing = self.unsatisfied(user_id).await?;
        Ok(missing
            .into_iter()
            .map(|channel| {
                let pending_request = channel
                    .numeric_id()
                    .map(|chat_id| self.join_requests.is_pending(user_id, chat_id))
                    .unwrap_or(false);
                MissingChannel { channel, pending_request }
            })
            .collect())
    }
}

impl std::fmt::Debug for SubscriptionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionGate")
            .field("check_timeout", &self.check_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_request_tracker() {
        let tracker = JoinRequestTracker::new();
        assert!(!tracker.is_pending(1, -100));
        tracker.record(1, -100);
        tracker.record(1, -200);
        assert!(tracker.is_pending(1, -100));
        assert!(!tracker.is_pending(2, -100));
        tracker.clear(1);
        assert!(!tracker.is_pending(1, -200));
    }
}
