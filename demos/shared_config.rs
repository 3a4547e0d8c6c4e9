//! Shared configuration example for singleton-factory.
//!
//! Demonstrates:
//! - A `static` singleton built lazily on first access
//! - Many threads racing for it while the constructor runs once
//! - A failing first attempt that leaves the slot retryable
//!
//! Run with: `cargo run --example shared_config`

use singleton_factory::{define_singleton, BoxError, SingletonSlot, SlotState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Application configuration loaded once per process.
#[derive(Debug)]
struct AppSettings {
    api_endpoint: String,
    timeout_ms: u64,
}

static LOADS: AtomicUsize = AtomicUsize::new(0);

fn load_settings() -> Result<AppSettings, BoxError> {
    LOADS.fetch_add(1, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    Ok(AppSettings {
        api_endpoint: "https://api.example.com".to_string(),
        timeout_ms: 5000,
    })
}

define_singleton!(SETTINGS: AppSettings = load_settings);

fn main() {
    println!("=== singleton-factory: Shared Configuration ===\n");

    // -------------------------------------------------------------------------
    // 1. Race for the singleton
    // -------------------------------------------------------------------------
    println!("1. Spawning 8 threads that all want the settings...");
    println!("   state before: {:?}", SETTINGS.state());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || match SETTINGS.get_instance() {
                Ok(settings) => format!(
                    "   thread {i}: {} (timeout: {}ms)",
                    settings.api_endpoint, settings.timeout_ms
                ),
                Err(err) => format!("   thread {i}: {err}"),
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(line) => println!("{line}"),
            Err(_) => println!("   a thread panicked"),
        }
    }

    println!("   constructor ran {} time(s)", LOADS.load(Ordering::SeqCst));
    println!("   state after: {:?}", SETTINGS.state());

    // -------------------------------------------------------------------------
    // 2. Retry after a failed construction
    // -------------------------------------------------------------------------
    println!("\n2. Constructing with a flaky backend...");

    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = attempts.clone();
    let flaky = SingletonSlot::new(move || {
        if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
            Err("backend not ready")
        } else {
            Ok("connected".to_string())
        }
    });

    match flaky.get_instance() {
        Ok(value) => println!("   first call: {value}"),
        Err(err) => println!("   first call: {err}"),
    }
    assert_eq!(flaky.state(), SlotState::Uninitialized);

    match flaky.get_instance() {
        Ok(value) => println!("   second call: {value}"),
        Err(err) => println!("   second call: {err}"),
    }
    println!("   attempts: {}", attempts.load(Ordering::SeqCst));

    println!("\n=== Example completed successfully ===");
}
