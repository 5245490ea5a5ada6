//! Tests for the tracing setup.

use std::sync::Mutex;

use errcontract_core::tracing::setup::{init_tracing, LOG_ENV};

/// Serializes tests that touch `ERRCONTRACT_LOG`.
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_init_with_module_filters() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(LOG_ENV, "errcontract_analysis::contract=debug,errcontract_core=info");
    init_tracing();
    std::env::remove_var(LOG_ENV);
}

#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    tracing::debug!("still alive after repeated init");
}

#[test]
fn test_invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(LOG_ENV, "=!=garbage=!=");
    init_tracing();
    std::env::remove_var(LOG_ENV);
}
