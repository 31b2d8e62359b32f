// ============================================================================
// File: src/runners/wine.rs
// ----------------------------------------------------------------------------
// Windows games through a system Wine installation.
// ============================================================================

use std::path::PathBuf;
use std::process::Child;

use crate::error::Result;
use crate::runners::spawn;
use crate::runners::{Architecture, LaunchSpec, Platform, RunnerCapabilities};

/// Runs Windows games through Wine.
///
/// Registered whenever the host profile names a wine binary, even if that
/// binary is missing; availability gates selection at query time instead.
#[derive(Debug, Clone)]
pub struct WineRunner {
    wine_path: PathBuf,
}

impl WineRunner {
    pub fn new<P: Into<PathBuf>>(wine_path: P) -> Self {
        Self {
            wine_path: wine_path.into(),
        }
    }

    pub fn name(&self) -> &str {
        "Wine"
    }

    pub fn version(&self) -> String {
        // Whatever the distribution shipped; nobody pins wine versions here
        "system".to_string()
    }

    pub fn is_available(&self) -> bool {
        self.wine_path.exists()
    }

    pub fn capabilities(&self) -> RunnerCapabilities {
        RunnerCapabilities {
            name: self.name().to_string(),
            version: self.version(),
            executable: self.wine_path.clone(),
            available: self.is_available(),
            supported_platform: Platform::Windows,
            host_architecture: Architecture::X86_64,
            target_architecture: Architecture::X86_64,
            requires_isa_translation: false,
            supported_extensions: vec![".exe".to_string(), ".msi".to_string()],
        }
    }

    pub fn can_run(&self, spec: &LaunchSpec) -> bool {
        spec.platform == Platform::Windows
    }

    pub fn launch(&self, spec: &LaunchSpec) -> Result<Child> {
        let mut args = Vec::with_capacity(spec.args.len() + 1);
        args.push(spec.game_path.to_string_lossy().into_owned());
        args.extend(spec.args.iter().cloned());

        let cmd = spawn::build_command(&self.wine_path, &args, spec);
        spawn::spawn_and_confirm(cmd, self.name())
    }
}
