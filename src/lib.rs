// ============================================================================
// File: src/lib.rs
// ----------------------------------------------------------------------------
// Compatibility-layer orchestration for launching games.
// ============================================================================

//! runlayer picks the right way to start a game and starts it.
//!
//! A desktop game-library client hands over a [`GameDescriptor`]; the crate
//! classifies the binary (ELF, PE, Mach-O or legacy MZ), selects a runner
//! from the registry (native execution, Wine, a discovered Proton-GE
//! install, DOSBox or an ISA-translation wrapper) and returns the running
//! child in a [`LaunchOutcome`]. DOSBox sessions additionally get process
//! supervision: stale instances are swept with a graceful-then-forceful
//! termination pass before every launch.
//!
//! Everything is synchronous and blocking. The crate owns no background
//! threads and keeps no process state; callers own the returned [`Child`]
//! handle.
//!
//! [`Child`]: std::process::Child

pub mod error;
pub mod introspect;
pub mod launch;
pub mod registry;
pub mod runners;

pub use error::{LaunchError, Result};
pub use launch::{launch_game, GameDescriptor, LaunchOutcome};
pub use registry::{DiscoveryConfig, RunnerRegistry, WrapperConfig};
pub use runners::dosbox::DosBoxOptions;
pub use runners::{
    host_architecture, host_platform, Architecture, DosBoxRunner, LaunchSpec, NativeRunner,
    Platform, ProtonRunner, Runner, RunnerCapabilities, WineRunner, WrapperRunner,
};

/// DOSBox process supervision, re-exported for explicit "shut down every
/// DOSBox session" operations in the hosting client.
#[cfg(unix)]
pub use runners::dosbox::supervisor;
