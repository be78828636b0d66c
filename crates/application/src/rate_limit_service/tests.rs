use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use courtside_core::AppError;
use courtside_domain::{RateLimitDecision, RateLimitEntry, RateLimitPolicy};

use crate::Clock;

use super::{
    ANONYMOUS_IDENTIFIER, RateLimitPolicies, RateLimitService, RateLimitStore, debounce, throttle,
};

#[derive(Default)]
struct FakeRateLimitStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl FakeRateLimitStore {
    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl RateLimitStore for FakeRateLimitStore {
    fn record_attempt(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|_| panic!("fake store lock poisoned"));
        let (entry, decision) = RateLimitEntry::register_attempt(entries.get(key), policy, now);
        entries.insert(key.to_owned(), entry);
        decision
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn starting_at(millis: i64) -> Self {
        Self {
            now: Mutex::new(
                DateTime::<Utc>::from_timestamp_millis(millis)
                    .unwrap_or_else(|| panic!("test timestamp")),
            ),
        }
    }

    fn advance(&self, millis: i64) {
        if let Ok(mut now) = self.now.lock() {
            *now += TimeDelta::milliseconds(millis);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|_| panic!("manual clock lock poisoned"))
    }
}

fn policy(max_attempts: u32, window_ms: u64) -> RateLimitPolicy {
    RateLimitPolicy::new(max_attempts, window_ms).unwrap_or_else(|_| panic!("test policy"))
}

fn service_with(
    policies: RateLimitPolicies,
) -> (RateLimitService, Arc<FakeRateLimitStore>, Arc<ManualClock>) {
    let store = Arc::new(FakeRateLimitStore::default());
    let clock = Arc::new(ManualClock::starting_at(1_700_000_000_000));
    let service = RateLimitService::with_clock(store.clone(), policies, clock.clone());
    (service, store, clock)
}

fn three_per_second() -> RateLimitPolicies {
    RateLimitPolicies::standard()
        .with_policy("send_message", policy(3, 1_000))
        .unwrap_or_else(|_| panic!("test policies"))
}

#[test]
fn window_admits_max_attempts_then_resets() {
    let (service, _store, clock) = service_with(three_per_second());

    let remaining: Vec<u32> = (0..3)
        .map(|_| service.check("send_message", Some("user-1")))
        .inspect(|decision| assert!(decision.allowed))
        .map(|decision| decision.remaining)
        .collect();
    assert_eq!(remaining, vec![2, 1, 0]);

    let rejected = service.check("send_message", Some("user-1"));
    assert!(!rejected.allowed);
    assert_eq!(rejected.remaining, 0);
    assert_eq!(rejected.retry_after, Some(Duration::from_millis(1_000)));

    clock.advance(1_000);
    let reopened = service.check("send_message", Some("user-1"));
    assert!(reopened.allowed);
    assert_eq!(reopened.remaining, 2);
}

#[test]
fn rejected_attempts_do_not_extend_the_window() {
    let (service, _store, clock) = service_with(three_per_second());
    for _ in 0..3 {
        service.check("send_message", Some("user-1"));
    }

    let mut previous = Duration::MAX;
    for _ in 0..5 {
        let decision = service.check("send_message", Some("user-1"));
        assert!(!decision.allowed);
        let retry_after = decision.retry_after.unwrap_or(Duration::MAX);
        assert!(retry_after < previous);
        previous = retry_after;
        clock.advance(150);
    }

    clock.advance(1_000);
    assert!(service.check("send_message", Some("user-1")).allowed);
}

#[test]
fn identifiers_and_actions_have_separate_buckets() {
    let (service, store, _clock) = service_with(three_per_second());

    for _ in 0..3 {
        service.check("send_message", Some("user-1"));
    }

    assert!(!service.check("send_message", Some("user-1")).allowed);
    assert!(service.check("send_message", Some("user-2")).allowed);
    assert!(service.check("like", Some("user-1")).allowed);
    assert_eq!(
        store.keys(),
        vec![
            "like:user-1".to_owned(),
            "send_message:user-1".to_owned(),
            "send_message:user-2".to_owned(),
        ]
    );
}

#[test]
fn missing_identifier_shares_anonymous_bucket() {
    let (service, store, _clock) = service_with(three_per_second());

    service.check("login", None);
    service.check("login", Some("   "));

    assert_eq!(store.keys(), vec![format!("login:{ANONYMOUS_IDENTIFIER}")]);
}

#[test]
fn identifiers_are_used_verbatim_in_keys() {
    let (service, store, _clock) = service_with(three_per_second());

    service.check("login", Some("bob"));
    service.check("login", Some("bob "));

    assert_eq!(
        store.keys(),
        vec!["login:bob".to_owned(), "login:bob ".to_owned()]
    );
}

#[test]
fn unknown_action_uses_default_policy() {
    let policies = RateLimitPolicies::new(policy(1, 60_000));
    let (service, _store, _clock) = service_with(policies);

    assert_eq!(service.policy_for("launch_rocket"), policy(1, 60_000));
    assert!(service.check("launch_rocket", Some("user-1")).allowed);
    assert!(!service.check("launch_rocket", Some("user-1")).allowed);
}

#[test]
fn enforce_reports_retry_delay_in_whole_seconds() {
    let policies = RateLimitPolicies::standard()
        .with_policy("create_match", policy(1, 2_500))
        .unwrap_or_else(|_| panic!("test policies"));
    let (service, _store, clock) = service_with(policies);

    assert!(service.enforce("create_match", Some("user-1")).is_ok());
    clock.advance(400);

    match service.enforce("create_match", Some("user-1")) {
        Err(AppError::RateLimited(message)) => {
            assert_eq!(message, "too many attempts, try again in 3 seconds");
        }
        other => panic!("expected rate limited error, got {other:?}"),
    }
}

#[test]
fn reset_clears_one_key_and_clear_all_clears_everything() {
    let policies = RateLimitPolicies::standard()
        .with_policy("password_reset", policy(1, 60_000))
        .unwrap_or_else(|_| panic!("test policies"));
    let (service, store, _clock) = service_with(policies);

    service.check("password_reset", Some("user-1"));
    service.check("password_reset", Some("user-2"));
    assert!(!service.check("password_reset", Some("user-1")).allowed);

    service.reset("password_reset", Some("user-1"));
    assert!(service.check("password_reset", Some("user-1")).allowed);
    assert!(!service.check("password_reset", Some("user-2")).allowed);

    service.clear_all();
    assert!(store.keys().is_empty());
}

#[test]
fn env_overrides_replace_policies() {
    let vars = vec![
        ("RATE_LIMIT_LOGIN".to_owned(), "2/30000".to_owned()),
        ("RATE_LIMIT_DEFAULT".to_owned(), "7/1000".to_owned()),
        ("UNRELATED".to_owned(), "whatever".to_owned()),
    ];

    let policies = RateLimitPolicies::standard().with_env_overrides(vars);
    let policies = policies.unwrap_or_else(|error| panic!("overrides rejected: {error}"));

    assert_eq!(policies.policy_for("login"), policy(2, 30_000));
    assert_eq!(policies.default_policy(), policy(7, 1_000));
    assert_eq!(policies.policy_for("unknown"), policy(7, 1_000));
}

#[test]
fn malformed_env_override_is_rejected() {
    for value in ["5", "x/100", "5/0", "0/100"] {
        let vars = vec![("RATE_LIMIT_LIKE".to_owned(), value.to_owned())];
        let result = RateLimitPolicies::standard().with_env_overrides(vars);
        assert!(matches!(result, Err(AppError::Validation(_))), "{value}");
    }
}

#[tokio::test(start_paused = true)]
async fn debounce_runs_only_the_last_call_of_a_burst() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();
    let debounced = debounce(
        move |value: u32| {
            if let Ok(mut calls) = recorded.lock() {
                calls.push(value);
            }
        },
        Duration::from_millis(100),
    );

    for value in 1..=5 {
        debounced.call(value);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(debounced.is_pending());

    tokio::time::sleep(Duration::from_millis(200)).await;

    let calls = calls.lock().map(|calls| calls.clone()).unwrap_or_default();
    assert_eq!(calls, vec![5]);
    assert!(!debounced.is_pending());
}

#[tokio::test(start_paused = true)]
async fn debounce_cancel_drops_pending_call() {
    let calls = Arc::new(Mutex::new(0_u32));
    let recorded = calls.clone();
    let debounced = debounce(
        move |()| {
            if let Ok(mut calls) = recorded.lock() {
                *calls += 1;
            }
        },
        Duration::from_millis(100),
    );

    debounced.call(());
    debounced.cancel();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(calls.lock().map(|calls| *calls).unwrap_or(u32::MAX), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_debounced_wrapper_drops_pending_call() {
    let calls = Arc::new(Mutex::new(0_u32));
    let recorded = calls.clone();
    let debounced = debounce(
        move |()| {
            if let Ok(mut calls) = recorded.lock() {
                *calls += 1;
            }
        },
        Duration::from_millis(100),
    );

    debounced.call(());
    drop(debounced);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(calls.lock().map(|calls| *calls).unwrap_or(u32::MAX), 0);
}

#[tokio::test(start_paused = true)]
async fn throttle_runs_first_call_of_each_window() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();
    let throttled = throttle(
        move |value: u32| {
            if let Ok(mut calls) = recorded.lock() {
                calls.push(value);
            }
        },
        Duration::from_millis(100),
    );

    let mut executed = Vec::new();
    for value in 0..10 {
        executed.push(throttled.call(value));
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    let calls = calls.lock().map(|calls| calls.clone()).unwrap_or_default();
    // Calls land at 0, 30, ..., 270 ms; windows open at 0, 120 and 240 ms.
    assert_eq!(calls, vec![0, 4, 8]);
    assert_eq!(executed.iter().filter(|ran| **ran).count(), 3);
}
