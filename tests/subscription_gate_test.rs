//! Subscription gate tests

mod helpers;

use std::sync::Arc;
use std::time::Duration;
use helpers::*;
use MenuGate::services::{ChatTransport, JoinRequestTracker, MembershipStatus, SubscriptionGate};

#[tokio::test]
async fn test_no_channels_passes_everyone() {
    let ctx = TestContext::new().await;

    assert!(ctx.services.gate().verify(ALICE).await.unwrap());
    assert!(ctx.services.gate().missing_channels(ALICE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_member_statuses() {
    let ctx = TestContext::new().await;
    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    let gate = ctx.services.gate();

    assert!(!gate.verify(ALICE).await.unwrap(), "unknown membership counts as left");

    for (status, expected) in [
        (MembershipStatus::Member, true),
        (MembershipStatus::Administrator, true),
        (MembershipStatus::Owner, true),
        (MembershipStatus::Restricted, false),
        (MembershipStatus::Banned, false),
        (MembershipStatus::Left, false),
    ] {
        ctx.transport.set_membership(NEWS_CHANNEL, ALICE, status);
        assert_eq!(gate.verify(ALICE).await.unwrap(), expected, "{:?}", status);
    }
}

#[tokio::test]
async fn test_every_channel_is_required() {
    let ctx = TestContext::new().await;
    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    ctx.db.add_channel(CHAT_CHANNEL, "chat").await;
    ctx.subscribe(NEWS_CHANNEL, ALICE);

    let gate = ctx.services.gate();
    assert!(!gate.verify(ALICE).await.unwrap());

    ctx.subscribe(CHAT_CHANNEL, ALICE);
    assert!(gate.verify(ALICE).await.unwrap());
}

#[tokio::test]
async fn test_gate_fails_closed() {
    let ctx = TestContext::new().await;
    let gate = ctx.services.gate();

    // A handle stored instead of a numeric id can never be checked
    ctx.db.add_raw_channel("@legacy", Some("legacy")).await;
    assert!(!gate.verify(ALICE).await.unwrap());
    let unsatisfied = gate.unsatisfied(ALICE).await.unwrap();
    let ids: Vec<&str> = unsatisfied.iter().map(|c| c.chat_id.as_str()).collect();
    assert_eq!(ids, vec!["@legacy"], "listed under its raw identifier");

    let ctx = TestContext::new().await;
    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    ctx.subscribe(NEWS_CHANNEL, ALICE);
    ctx.transport.break_channel(NEWS_CHANNEL);
    assert!(!ctx.services.gate().verify(ALICE).await.unwrap());
}

#[tokio::test]
async fn test_slow_membership_query_times_out() {
    let db = TestDatabase::new().await.unwrap();
    db.add_channel(NEWS_CHANNEL, "news").await;

    let transport = Arc::new(FakeTransport::new());
    transport.set_membership(NEWS_CHANNEL, ALICE, MembershipStatus::Member);
    transport.delay_membership(Duration::from_secs(5));

    let dyn_transport: Arc<dyn ChatTransport> = transport.clone();
    let gate = SubscriptionGate::new(
        db.service.channels.clone(),
        dyn_transport,
        JoinRequestTracker::new(),
        Duration::from_millis(50),
    );

    let started = std::time::Instant::now();
    assert!(!gate.verify(ALICE).await.unwrap());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_missing_channels_keep_registry_order_and_pending_marks() {
    let ctx = TestContext::new().await;
    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    ctx.db.add_channel(CHAT_CHANNEL, "chat").await;
    let third = -1003333;
    ctx.db.add_channel(third, "third").await;
    ctx.subscribe(CHAT_CHANNEL, ALICE);

    let gate = ctx.services.gate();
    gate.join_requests().record(ALICE, third);

    let missing = gate.missing_channels(ALICE).await.unwrap();
    let ids: Vec<&str> = missing.iter().map(|m| m.channel.chat_id.as_str()).collect();
    assert_eq!(ids, vec![NEWS_CHANNEL.to_string(), third.to_string()]);
    assert!(!missing[0].pending_request);
    assert!(missing[1].pending_request);
}

#[tokio::test]
async fn test_passing_clears_join_requests() {
    let ctx = TestContext::new().await;
    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    let gate = ctx.services.gate();

    gate.join_requests().record(ALICE, NEWS_CHANNEL);
    assert!(!gate.verify(ALICE).await.unwrap());
    assert!(gate.join_requests().is_pending(ALICE, NEWS_CHANNEL));

    ctx.subscribe(NEWS_CHANNEL, ALICE);
    assert!(gate.verify(ALICE).await.unwrap());
    assert!(!gate.join_requests().is_pending(ALICE, NEWS_CHANNEL));
}

#[tokio::test]
async fn test_removed_channel_stops_gating() {
    let ctx = TestContext::new().await;
    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    assert!(!ctx.services.gate().verify(BOB).await.unwrap());

    assert!(ctx.services.channel_service.remove(&NEWS_CHANNEL.to_string()).await.unwrap());
    assert!(ctx.services.gate().verify(BOB).await.unwrap());
}

#[tokio::test]
async fn test_unsatisfied_is_an_ordered_subset_of_the_registry() {
    let ctx = TestContext::new().await;
    let third = -1003333;
    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    ctx.db.add_raw_channel("@legacy", Some("legacy")).await;
    ctx.db.add_channel(CHAT_CHANNEL, "chat").await;
    ctx.db.add_channel(third, "third").await;
    ctx.subscribe(CHAT_CHANNEL, ALICE);

    let registry: Vec<String> = ctx.services.channel_service.list().await.unwrap().into_iter().map(|c| c.chat_id).collect();
    let unsatisfied: Vec<String> = ctx.services.gate().unsatisfied(ALICE).await.unwrap().into_iter().map(|c| c.chat_id).collect();

    assert_eq!(unsatisfied, vec![NEWS_CHANNEL.to_string(), "@legacy".to_string(), third.to_string()]);
    let in_registry_order: Vec<String> = registry.into_iter().filter(|id| unsatisfied.contains(id)).collect();
    assert_eq!(unsatisfied, in_registry_order);
}

#[tokio::test]
async fn test_verify_agrees_with_unsatisfied() {
    let ctx = TestContext::new().await;
    let gate = ctx.services.gate();

    // Vacuous pass
    assert!(gate.verify(BOB).await.unwrap());
    assert!(gate.unsatisfied(BOB).await.unwrap().is_empty());

    ctx.db.add_channel(NEWS_CHANNEL, "news").await;
    ctx.db.add_channel(CHAT_CHANNEL, "chat").await;

    for joined in [None, Some(NEWS_CHANNEL), Some(CHAT_CHANNEL)] {
        if let Some(chat_id) = joined {
            ctx.subscribe(chat_id, BOB);
        }
        let verified = gate.verify(BOB).await.unwrap();
        let unsatisfied = gate.unsatisfied(BOB).await.unwrap();
        assert_eq!(verified, unsatisfied.is_empty(), "after joining {:?}: {:?}", joined, unsatisfied);
    }
    assert!(gate.verify(BOB).await.unwrap());

    ctx.transport.break_channel(CHAT_CHANNEL);
    assert!(!gate.verify(BOB).await.unwrap());
    let unsatisfied = gate.unsatisfied(BOB).await.unwrap();
    assert_eq!(unsatisfied.len(), 1);
    assert_eq!(unsatisfied[0].chat_id, CHAT_CHANNEL.to_string());
}
