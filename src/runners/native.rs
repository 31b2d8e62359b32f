// ============================================================================
// File: src/runners/native.rs
// ----------------------------------------------------------------------------
// Direct execution of games built for the host platform.
// ============================================================================

use std::path::PathBuf;
use std::process::Child;

use crate::error::Result;
use crate::runners::spawn;
use crate::runners::{
    host_architecture, host_platform, LaunchSpec, Platform, RunnerCapabilities,
};

/// Runs a game binary directly, no compatibility layer involved.
///
/// Always available; the only runner with no underlying tool to probe.
#[derive(Debug, Clone)]
pub struct NativeRunner {
    host: Platform,
}

impl NativeRunner {
    pub fn new() -> Self {
        Self {
            host: host_platform(),
        }
    }

    pub fn name(&self) -> &str {
        "Native"
    }

    pub fn version(&self) -> String {
        "1.0".to_string()
    }

    pub fn is_available(&self) -> bool {
        true
    }

    pub fn capabilities(&self) -> RunnerCapabilities {
        RunnerCapabilities {
            name: self.name().to_string(),
            version: self.version(),
            executable: PathBuf::new(),
            available: true,
            supported_platform: self.host,
            host_architecture: host_architecture(),
            target_architecture: host_architecture(),
            requires_isa_translation: false,
            supported_extensions: Vec::new(),
        }
    }

    pub fn can_run(&self, spec: &LaunchSpec) -> bool {
        spec.platform == self.host
    }

    pub fn launch(&self, spec: &LaunchSpec) -> Result<Child> {
        let cmd = spawn::build_command(&spec.game_path, &spec.args, spec);
        spawn::spawn_and_confirm(cmd, self.name())
    }
}

impl Default for NativeRunner {
    fn default() -> Self {
        Self::new()
    }
}
