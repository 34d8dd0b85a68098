use thiserror::Error;

/// Failure during a full created-day index rebuild.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Vault enumeration failed; the index falls back to empty.
    #[error("vault enumeration failed: {0}")]
    Enumeration(String),
    /// A newer rebuild started before this one committed. The stale build's
    /// result is discarded, never an error state the UI sees.
    #[error("index rebuild superseded by a newer build")]
    Superseded,
}

/// Failure during one list recompute pass. Caught per attempt: the displayed
/// list is cleared and the message surfaced, but the next recompute starts
/// from a clean slate.
#[derive(Debug, Error)]
pub enum RecomputeError {
    #[error("created-day index rebuild failed: {0}")]
    Index(#[from] IndexError),
    /// A newer recompute started while this one was suspended; its result is
    /// dropped silently (last started wins).
    #[error("recompute superseded by a newer pass")]
    Superseded,
}
