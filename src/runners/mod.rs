// ============================================================================
// File: src/runners/mod.rs
// ----------------------------------------------------------------------------
// Runner variants and module organization for compatibility-layer launches.
//
// One enum covers every way a game can be started:
// - Native direct execution on the host platform
// - Wine and Proton for Windows titles on Unix hosts
// - DOSBox for legacy DOS titles
// - Wrapper for ISA-translation preludes (Rosetta 2, Box64, FEX, QEMU)
// ============================================================================

mod native;
mod proton;
mod wine;
mod wrapper;

pub mod dosbox;
pub mod types;

pub(crate) mod spawn;

// Re-export the runner structs and the shared launch vocabulary
pub use dosbox::DosBoxRunner;
pub use native::NativeRunner;
pub use proton::ProtonRunner;
pub use types::{
    host_architecture, host_platform, Architecture, LaunchSpec, Platform, RunnerCapabilities,
};
pub use wine::WineRunner;
pub use wrapper::WrapperRunner;

use std::process::Child;

use log::warn;

use crate::error::Result;

/// A configured way to start a game.
///
/// The set of compatibility layers is closed and small, so runners are
/// tagged variants rather than trait objects; matching keeps every launch
/// path visible in one place.
#[derive(Debug, Clone)]
pub enum Runner {
    Native(NativeRunner),
    Wine(WineRunner),
    Proton(ProtonRunner),
    DosBox(DosBoxRunner),
    Wrapper(WrapperRunner),
}

impl Runner {
    pub fn name(&self) -> &str {
        match self {
            Runner::Native(r) => r.name(),
            Runner::Wine(r) => r.name(),
            Runner::Proton(r) => r.name(),
            Runner::DosBox(r) => r.name(),
            Runner::Wrapper(r) => r.name(),
        }
    }

    pub fn version(&self) -> String {
        match self {
            Runner::Native(r) => r.version(),
            Runner::Wine(r) => r.version(),
            Runner::Proton(r) => r.version(),
            Runner::DosBox(r) => r.version(),
            Runner::Wrapper(r) => r.version(),
        }
    }

    pub fn is_available(&self) -> bool {
        match self {
            Runner::Native(r) => r.is_available(),
            Runner::Wine(r) => r.is_available(),
            Runner::Proton(r) => r.is_available(),
            Runner::DosBox(r) => r.is_available(),
            Runner::Wrapper(r) => r.is_available(),
        }
    }

    pub fn capabilities(&self) -> RunnerCapabilities {
        match self {
            Runner::Native(r) => r.capabilities(),
            Runner::Wine(r) => r.capabilities(),
            Runner::Proton(r) => r.capabilities(),
            Runner::DosBox(r) => r.capabilities(),
            Runner::Wrapper(r) => r.capabilities(),
        }
    }

    /// Whether this runner handles the game described by `spec`. Purely a
    /// platform/architecture match; availability is checked separately so
    /// callers can distinguish "wrong runner" from "right runner, missing
    /// binary".
    pub fn can_run(&self, spec: &LaunchSpec) -> bool {
        match self {
            Runner::Native(r) => r.can_run(spec),
            Runner::Wine(r) => r.can_run(spec),
            Runner::Proton(r) => r.can_run(spec),
            Runner::DosBox(r) => r.can_run(spec),
            Runner::Wrapper(r) => r.can_run(spec),
        }
    }

    /// Start the game and hand back the child once startup is confirmed.
    pub fn launch(&self, spec: &LaunchSpec) -> Result<Child> {
        match self {
            Runner::Native(r) => r.launch(spec),
            Runner::Wine(r) => r.launch(spec),
            Runner::Proton(r) => r.launch(spec),
            Runner::DosBox(r) => r.launch(spec),
            Runner::Wrapper(r) => r.launch(spec),
        }
    }

    /// Keys accepted by [`set_config_option`](Self::set_config_option);
    /// empty for runners without tunables.
    pub fn config_options(&self) -> &'static [&'static str] {
        match self {
            Runner::DosBox(r) => r.config_options(),
            _ => &[],
        }
    }

    pub fn set_config_option(&mut self, key: &str, value: &str) {
        match self {
            Runner::DosBox(r) => r.set_config_option(key, value),
            other => warn!(
                "runner {} has no configurable option '{key}'",
                other.name()
            ),
        }
    }
}
