use std::thread;
use std::time::{Duration, Instant};

use watchpoint::CancelToken;

#[test]
fn clones_share_the_flag() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());

    token.cancel();
    assert!(other.is_cancelled());
    // Cancelling again is a no-op.
    other.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn wait_times_out_when_not_cancelled() {
    let token = CancelToken::new();
    let started = Instant::now();
    assert!(!token.wait(Duration::from_millis(30)));
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn wait_wakes_early_on_cancel() {
    let token = CancelToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        })
    };

    let started = Instant::now();
    assert!(token.wait(Duration::from_secs(30)));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(canceller.join().is_ok());
}

#[test]
fn wait_on_cancelled_token_returns_immediately() {
    let token = CancelToken::new();
    token.cancel();
    let started = Instant::now();
    assert!(token.wait(Duration::from_secs(30)));
    assert!(started.elapsed() < Duration::from_secs(1));
}
