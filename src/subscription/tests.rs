use chrono::{TimeZone, Utc};

use super::*;
use crate::topic::Pattern;

fn at(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_725_000_000 + secs, 0).unwrap()
}

/// A registry holding `pattern` in the `Active` state.
fn registry_with_active(pattern: &str) -> SubscriptionRegistry {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe(pattern).unwrap();
    registry.ack_subscribe(pattern).unwrap();
    registry
}

fn state_of(registry: &SubscriptionRegistry, pattern: &str) -> SubscriptionState {
    registry.get(pattern).unwrap().state().clone()
}

#[test]
fn test_registry_new() {
    let registry = SubscriptionRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[test]
fn test_subscribe_creates_pending_record() {
    let mut registry = SubscriptionRegistry::new();
    let transition = registry.request_subscribe(" a/* ").unwrap();

    assert_eq!(transition.pattern.as_str(), "a/*");
    assert_eq!(transition.from, None);
    assert_eq!(transition.to, SubscriptionState::PendingAdd);
    assert_eq!(transition.request(), Some(BrokerRequest::Subscribe));
    assert!(!transition.is_resubscribe());

    let record = registry.get("a/*").unwrap();
    assert_eq!(*record.state(), SubscriptionState::PendingAdd);
    assert_eq!(record.message_count(), 0);
    assert_eq!(record.last_received_at(), None);
}

#[test]
fn test_subscribe_rejects_blank_pattern() {
    let mut registry = SubscriptionRegistry::new();
    let err = registry.request_subscribe("   ").unwrap_err();
    assert_eq!(err, SubscriptionError::InvalidPattern("   ".to_string()));
    assert!(registry.is_empty());
}

#[test]
fn test_full_cycle_returns_to_inactive_with_counts_untouched() {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe("a/b").unwrap();
    registry.attribute("a/b", at(0));
    let before = registry.get("a/b").unwrap().message_count();

    registry.ack_subscribe("a/b").unwrap();
    registry.request_unsubscribe("a/b").unwrap();
    let outcome = registry.ack_unsubscribe("a/b").unwrap();

    match outcome {
        AckOutcome::Confirmed(transition) => {
            assert_eq!(transition.from, Some(SubscriptionState::PendingRemove));
            assert_eq!(transition.to, SubscriptionState::Inactive);
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
    let record = registry.get("a/b").unwrap();
    assert_eq!(*record.state(), SubscriptionState::Inactive);
    assert_eq!(record.message_count(), before);
}

#[test]
fn test_resubscribe_preserves_counters() {
    let mut registry = registry_with_active("a/b");
    for i in 0..5 {
        registry.attribute("a/b", at(i));
    }
    registry.request_unsubscribe("a/b").unwrap();
    registry.ack_unsubscribe("a/b").unwrap();
    assert_eq!(registry.get("a/b").unwrap().message_count(), 5);

    let transition = registry.request_subscribe("a/b").unwrap();
    assert!(transition.is_resubscribe());
    assert_eq!(transition.from, Some(SubscriptionState::Inactive));
    registry.ack_subscribe("a/b").unwrap();

    let record = registry.get("a/b").unwrap();
    assert_eq!(*record.state(), SubscriptionState::Active);
    assert_eq!(record.message_count(), 5);
    assert_eq!(record.last_received_at(), Some(at(4)));
}

#[test]
fn test_resubscribe_from_error_clears_last_error() {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe("a/>/b").unwrap();
    registry.fail("a/>/b", "invalid topic syntax").unwrap();
    assert_eq!(
        registry.get("a/>/b").unwrap().last_error(),
        Some("invalid topic syntax")
    );

    registry.request_subscribe("a/>/b").unwrap();
    let record = registry.get("a/>/b").unwrap();
    assert_eq!(*record.state(), SubscriptionState::PendingAdd);
    assert_eq!(record.last_error(), None);
}

#[test]
fn test_duplicate_subscribe_is_rejected_without_mutation() {
    let mut registry = registry_with_active("a/b");
    let err = registry.request_subscribe("a/b").unwrap_err();
    assert_eq!(
        err,
        SubscriptionError::DuplicateOrInFlight {
            pattern: "a/b".to_string(),
            state: SubscriptionState::Active,
        }
    );
    assert_eq!(err.title(), "Duplicate subscription");
    assert_eq!(state_of(&registry, "a/b"), SubscriptionState::Active);

    registry.request_subscribe("c").unwrap();
    assert!(matches!(
        registry.request_subscribe("c"),
        Err(SubscriptionError::DuplicateOrInFlight { .. })
    ));
    assert_eq!(state_of(&registry, "c"), SubscriptionState::PendingAdd);
}

#[test]
fn test_unsubscribe_requires_active() {
    let mut registry = SubscriptionRegistry::new();
    assert_eq!(
        registry.request_unsubscribe("a"),
        Err(SubscriptionError::UnknownSubscription("a".to_string()))
    );

    registry.request_subscribe("a").unwrap();
    assert_eq!(
        registry.request_unsubscribe("a"),
        Err(SubscriptionError::NotSubscribed {
            pattern: "a".to_string(),
            state: SubscriptionState::PendingAdd,
        })
    );
    assert_eq!(state_of(&registry, "a"), SubscriptionState::PendingAdd);

    registry.ack_subscribe("a").unwrap();
    let transition = registry.request_unsubscribe("a").unwrap();
    assert_eq!(transition.request(), Some(BrokerRequest::Unsubscribe));
    assert_eq!(state_of(&registry, "a"), SubscriptionState::PendingRemove);
}

#[test]
fn test_wrong_direction_ack_is_reported_not_applied() {
    let mut registry = registry_with_active("a");
    registry.request_unsubscribe("a").unwrap();

    let outcome = registry.ack_subscribe("a").unwrap();
    assert_eq!(
        outcome,
        AckOutcome::Mismatched {
            pattern: Pattern::normalize("a").unwrap(),
            state: SubscriptionState::PendingRemove,
        }
    );
    assert_eq!(state_of(&registry, "a"), SubscriptionState::PendingRemove);

    registry.request_subscribe("b").unwrap();
    assert!(matches!(
        registry.ack_unsubscribe("b").unwrap(),
        AckOutcome::Mismatched { .. }
    ));
    assert_eq!(state_of(&registry, "b"), SubscriptionState::PendingAdd);
}

#[test]
fn test_ack_for_unknown_pattern() {
    let mut registry = SubscriptionRegistry::new();
    assert_eq!(
        registry.ack_subscribe("nope"),
        Err(SubscriptionError::UnknownSubscription("nope".to_string()))
    );
    assert!(registry.is_empty());
}

#[test]
fn test_acks_correlate_by_pattern_in_any_order() {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe("a").unwrap();
    registry.request_subscribe("b").unwrap();

    registry.ack_subscribe("b").unwrap();
    assert_eq!(state_of(&registry, "a"), SubscriptionState::PendingAdd);
    assert_eq!(state_of(&registry, "b"), SubscriptionState::Active);

    registry.ack_subscribe("a").unwrap();
    assert_eq!(state_of(&registry, "a"), SubscriptionState::Active);
}

#[test]
fn test_broker_error_moves_any_state_to_error() {
    let mut registry = registry_with_active("a");
    let transition = registry.fail("a", "permission denied").unwrap();
    assert_eq!(transition.from, Some(SubscriptionState::Active));
    assert_eq!(
        transition.to,
        SubscriptionState::Error("permission denied".to_string())
    );

    registry.request_subscribe("b").unwrap();
    registry.fail("b", "").unwrap();
    assert_eq!(
        registry.get("b").unwrap().last_error(),
        Some("Subscription error")
    );

    assert_eq!(
        registry.fail("c", "x"),
        Err(SubscriptionError::UnknownSubscription("c".to_string()))
    );
}

#[test]
fn test_delete_guard() {
    let mut registry = registry_with_active("active");
    registry.request_subscribe("pending-add").unwrap();
    registry.request_subscribe("pending-remove").unwrap();
    registry.ack_subscribe("pending-remove").unwrap();
    registry.request_unsubscribe("pending-remove").unwrap();

    for pattern in ["active", "pending-add", "pending-remove"] {
        let err = registry.delete(pattern).unwrap_err();
        assert!(
            matches!(err, SubscriptionError::ProtectedFromDelete { .. }),
            "{pattern}: {err:?}"
        );
        assert!(registry.get(pattern).is_some());
    }
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_delete_inactive_disconnected_and_error_records() {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe("inactive").unwrap();
    registry.ack_subscribe("inactive").unwrap();
    registry.request_unsubscribe("inactive").unwrap();
    registry.ack_unsubscribe("inactive").unwrap();
    registry.request_subscribe("failed").unwrap();
    registry.fail("failed", "nope").unwrap();
    registry.request_subscribe("dropped").unwrap();
    registry.mark_disconnected();

    for pattern in ["inactive", "failed", "dropped"] {
        let removed = registry.delete(pattern).unwrap();
        assert_eq!(removed.pattern().as_str(), pattern);
    }
    assert!(registry.is_empty());
    assert_eq!(
        registry.delete("inactive"),
        Err(SubscriptionError::UnknownSubscription("inactive".to_string()))
    );
}

#[test]
fn test_deleted_record_starts_over() {
    let mut registry = registry_with_active("a");
    registry.attribute("a", at(0));
    registry.request_unsubscribe("a").unwrap();
    registry.ack_unsubscribe("a").unwrap();
    registry.delete("a").unwrap();

    let transition = registry.request_subscribe("a").unwrap();
    assert!(!transition.is_resubscribe());
    assert_eq!(registry.get("a").unwrap().message_count(), 0);
}

#[test]
fn test_toggle_dispatches_on_state() {
    let mut registry = registry_with_active("a");

    let transition = registry.toggle("a").unwrap();
    assert_eq!(transition.to, SubscriptionState::PendingRemove);

    let err = registry.toggle("a").unwrap_err();
    assert_eq!(err.title(), "Please wait");
    assert_eq!(state_of(&registry, "a"), SubscriptionState::PendingRemove);

    registry.ack_unsubscribe("a").unwrap();
    assert_eq!(registry.plan_toggle("a"), Ok(BrokerRequest::Subscribe));
    let transition = registry.toggle("a").unwrap();
    assert!(transition.is_resubscribe());
    assert_eq!(transition.to, SubscriptionState::PendingAdd);

    assert_eq!(
        registry.toggle("missing"),
        Err(SubscriptionError::UnknownSubscription("missing".to_string()))
    );
}

#[test]
fn test_attribution_fans_out_to_every_matching_record() {
    let mut registry = registry_with_active("a/*");
    registry.request_subscribe("a/b").unwrap();
    registry.request_subscribe("x/>").unwrap();

    let matched = registry.attribute("a/b", at(7));
    let matched: Vec<&str> = matched.iter().map(Pattern::as_str).collect();
    assert_eq!(matched, vec!["a/*", "a/b"]);

    assert_eq!(registry.get("a/*").unwrap().message_count(), 1);
    assert_eq!(registry.get("a/b").unwrap().message_count(), 1);
    assert_eq!(registry.get("a/b").unwrap().last_received_at(), Some(at(7)));
    assert_eq!(registry.get("x/>").unwrap().message_count(), 0);
}

#[test]
fn test_attribution_counts_inactive_records_too() {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe("a/b").unwrap();
    registry.fail("a/b", "rejected").unwrap();

    let matched = registry.attribute("a/b", at(1));
    assert_eq!(matched.len(), 1);
    assert_eq!(registry.get("a/b").unwrap().message_count(), 1);
    assert!(registry.attribute("z", at(2)).is_empty());
}

#[test]
fn test_disconnect_only_touches_subscribed_and_pending() {
    let mut registry = registry_with_active("active");
    registry.request_subscribe("pending").unwrap();
    registry.request_subscribe("inactive").unwrap();
    registry.ack_subscribe("inactive").unwrap();
    registry.request_unsubscribe("inactive").unwrap();
    registry.ack_unsubscribe("inactive").unwrap();
    registry.request_subscribe("failed").unwrap();
    registry.fail("failed", "nope").unwrap();
    registry.request_subscribe("leaving").unwrap();
    registry.ack_subscribe("leaving").unwrap();
    registry.request_unsubscribe("leaving").unwrap();
    registry.attribute("leaving", at(1));

    let transitions = registry.mark_disconnected();
    assert_eq!(transitions.len(), 3);
    let leaving = transitions
        .iter()
        .find(|t| t.pattern.as_str() == "leaving")
        .unwrap();
    assert_eq!(leaving.from, Some(SubscriptionState::PendingRemove));
    assert_eq!(leaving.to, SubscriptionState::Disconnected);

    assert_eq!(state_of(&registry, "active"), SubscriptionState::Disconnected);
    assert_eq!(state_of(&registry, "pending"), SubscriptionState::Disconnected);
    assert_eq!(state_of(&registry, "inactive"), SubscriptionState::Inactive);
    assert_eq!(
        state_of(&registry, "failed"),
        SubscriptionState::Error("nope".to_string())
    );
    assert_eq!(state_of(&registry, "leaving"), SubscriptionState::Disconnected);
    assert_eq!(registry.get("leaving").unwrap().message_count(), 1);

    // a late ack for the abandoned unsubscribe changes nothing
    let outcome = registry.ack_subscribe("leaving").unwrap();
    assert!(matches!(
        outcome,
        AckOutcome::Mismatched {
            state: SubscriptionState::Disconnected,
            ..
        }
    ));
    assert_eq!(state_of(&registry, "leaving"), SubscriptionState::Disconnected);
}

#[test]
fn test_active_coverage_ignores_non_active_records() {
    let mut registry = registry_with_active("a/*");
    registry.request_subscribe("b/>").unwrap();

    assert!(registry.has_active_coverage("a/x"));
    assert!(!registry.has_active_coverage("a/x/y"));
    assert!(!registry.has_active_coverage("b/c"));
}

#[test]
fn test_snapshot_is_sorted_by_pattern() {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe("zeta").unwrap();
    registry.request_subscribe("alpha").unwrap();
    registry.request_subscribe("mid/*").unwrap();

    let patterns: Vec<String> = registry
        .snapshot()
        .iter()
        .map(|record| record.pattern().to_string())
        .collect();
    assert_eq!(patterns, vec!["alpha", "mid/*", "zeta"]);
}

#[test]
fn test_state_labels_and_names() {
    assert_eq!(SubscriptionState::PendingAdd.label(), "Subscribing…");
    assert_eq!(
        SubscriptionState::Disconnected.label(),
        "Not Active (Disconnected)"
    );
    assert_eq!(SubscriptionState::PendingRemove.to_string(), "pending_remove");
    assert_eq!(SubscriptionState::Error("x".into()).to_string(), "error");
}

#[test]
fn test_record_serializes_state_and_error() {
    let mut registry = SubscriptionRegistry::new();
    registry.request_subscribe("a").unwrap();
    registry.fail("a", "denied").unwrap();

    let json = serde_json::to_value(registry.get("a").unwrap()).unwrap();
    assert_eq!(json["pattern"], "a");
    assert_eq!(json["state"]["state"], "error");
    assert_eq!(json["state"]["last_error"], "denied");
    assert_eq!(json["message_count"], 0);
}
