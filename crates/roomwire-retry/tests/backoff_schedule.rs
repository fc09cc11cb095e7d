//! Integration tests for the reconnect backoff schedule.
//!
//! Uses `start_paused` so `Backoff::wait` completes by auto-advancing the
//! Tokio clock, which lets the tests measure exact virtual delays.

use std::time::Duration;

use roomwire_retry::{Backoff, RetryConfig, RetryState};
use tokio::time::Instant;

// =========================================================================
// Schedule
// =========================================================================

#[test]
fn test_schedule_is_linear_and_bounded() {
    let mut state = RetryState::default();

    let delays: Vec<u64> = std::iter::from_fn(|| state.next_backoff())
        .map(|b| b.delay.as_millis() as u64)
        .collect();

    assert_eq!(delays, vec![500, 1000, 1500, 2000, 2500]);
    assert!(state.is_exhausted());
    assert_eq!(state.next_backoff(), None, "no 6th retry");
}

#[test]
fn test_attempt_numbers_are_one_based() {
    let mut state = RetryState::default();
    let first = state.next_backoff().unwrap();
    let second = state.next_backoff().unwrap();
    assert_eq!(first.attempt, 1);
    assert_eq!(second.attempt, 2);
    assert_eq!(state.attempt(), 2);
}

#[test]
fn test_reset_restarts_at_one() {
    let mut state = RetryState::default();
    for _ in 0..3 {
        state.next_backoff();
    }
    state.reset();
    assert_eq!(state.attempt(), 0);

    let next = state.next_backoff().unwrap();
    assert_eq!(next.attempt, 1);
    assert_eq!(next.delay, Duration::from_millis(500));
}

#[test]
fn test_reset_after_exhaustion_restores_budget() {
    let mut state = RetryState::default();
    while state.next_backoff().is_some() {}
    state.reset();
    assert!(!state.is_exhausted());
    assert!(state.next_backoff().is_some());
}

#[test]
fn test_custom_config() {
    let mut state = RetryState::new(RetryConfig {
        max_attempts: 2,
        base_delay: Duration::from_millis(100),
        jitter: Duration::ZERO,
    });
    assert_eq!(state.next_backoff().unwrap().delay, Duration::from_millis(100));
    assert_eq!(state.next_backoff().unwrap().delay, Duration::from_millis(200));
    assert_eq!(state.next_backoff(), None);
}

#[test]
fn test_jitter_stays_within_bound() {
    let jitter = Duration::from_millis(50);
    for _ in 0..50 {
        let mut state = RetryState::new(RetryConfig {
            jitter,
            ..RetryConfig::default()
        });
        let b = state.next_backoff().unwrap();
        assert!(b.delay >= Duration::from_millis(500));
        assert!(b.delay <= Duration::from_millis(500) + jitter);
    }
}

// =========================================================================
// Waiting
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_sleeps_for_exact_delay() {
    let start = Instant::now();
    Backoff {
        attempt: 3,
        delay: Duration::from_millis(1500),
    }
    .wait()
    .await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1500));
    assert!(elapsed < Duration::from_millis(1501));
}

#[tokio::test(start_paused = true)]
async fn test_wait_is_cancellable() {
    let backoff = Backoff {
        attempt: 1,
        delay: Duration::from_millis(500),
    };
    let result =
        tokio::time::timeout(Duration::from_millis(100), backoff.wait()).await;
    assert!(result.is_err(), "wait should not finish early");
}
