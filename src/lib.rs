pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod index;
pub mod vault;
pub mod view_state;
pub mod wordcount;

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether debug logging is active, shared between the host's logger filter
/// and its settings toggle.
static DEBUG_LOGGING: AtomicBool = AtomicBool::new(false);

pub fn set_debug_logging(enabled: bool) {
    DEBUG_LOGGING.store(enabled, Ordering::Relaxed);
}

pub fn debug_logging() -> bool {
    DEBUG_LOGGING.load(Ordering::Relaxed)
}
