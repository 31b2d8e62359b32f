// ============================================================================
// File: src/error.rs
// ----------------------------------------------------------------------------
// Launch error taxonomy
// ============================================================================

use crate::runners::Platform;

/// Errors a launch attempt can surface.
///
/// Classification never errors (unreadable binaries downgrade to
/// `Platform::Unknown`), and supervisor operations report outcomes as
/// booleans/counts, so everything here is about selecting a runner and
/// getting a process off the ground.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LaunchError {
    /// No registered runner both matches the game and is installed
    #[error("no suitable runner found for platform '{platform}'")]
    NoRunnerAvailable { platform: Platform },

    /// The chosen runner's underlying tool is missing or unusable
    #[error("runner '{runner}' is not available: {reason}")]
    RunnerUnavailable { runner: String, reason: String },

    /// Preparing the launch failed before any process was spawned
    #[error("failed to prepare launch via '{runner}': {detail}")]
    Setup { runner: String, detail: String },

    /// The operating system rejected the spawn
    #[error("failed to spawn '{program}': {detail}")]
    SpawnFailed { program: String, detail: String },

    /// The child neither stayed up nor exited within the startup window
    #[error("'{program}' did not confirm startup within {waited_ms}ms")]
    StartTimeout { program: String, waited_ms: u64 },
}

/// Result type for launch operations
pub type Result<T> = std::result::Result<T, LaunchError>;
