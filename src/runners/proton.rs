// ============================================================================
// File: src/runners/proton.rs
// ----------------------------------------------------------------------------
// Windows games through a Proton-GE installation, outside of Steam.
// ============================================================================

use std::path::PathBuf;
use std::process::Child;

use log::info;

use crate::error::Result;
use crate::runners::spawn;
use crate::runners::{Architecture, LaunchSpec, Platform, RunnerCapabilities};

/// Directory name of the per-game compatibility prefix synthesized when the
/// caller did not pick one.
const DEFAULT_COMPAT_PREFIX: &str = ".compat-prefix";

/// Runs Windows games through a discovered Proton-GE tree.
///
/// One instance per discovered installation; the display name carries the
/// directory name ("Proton-GE (GE-Proton9-20)") so users can tell builds
/// apart.
#[derive(Debug, Clone)]
pub struct ProtonRunner {
    name: String,
    proton_dir: PathBuf,
}

impl ProtonRunner {
    pub fn new<N: Into<String>, P: Into<PathBuf>>(name: N, proton_dir: P) -> Self {
        Self {
            name: name.into(),
            proton_dir: proton_dir.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> String {
        "unknown".to_string()
    }

    /// The `proton` launcher script inside the installation directory.
    fn script_path(&self) -> PathBuf {
        self.proton_dir.join("proton")
    }

    pub fn is_available(&self) -> bool {
        self.script_path().exists()
    }

    pub fn capabilities(&self) -> RunnerCapabilities {
        RunnerCapabilities {
            name: self.name.clone(),
            version: self.version(),
            executable: self.script_path(),
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
        let mut args = Vec::with_capacity(spec.args.len() + 2);
        args.push("run".to_string());
        args.push(spec.game_path.to_string_lossy().into_owned());
        args.extend(spec.args.iter().cloned());

        let mut cmd = spawn::build_command(&self.script_path(), &args, spec);

        // Proton needs a compat data path to place its prefix; without an
        // explicit override every game gets an isolated one next to itself.
        if !spec.env.contains_key("STEAM_COMPAT_DATA_PATH") {
            let compat = spec.working_dir.join(DEFAULT_COMPAT_PREFIX);
            info!("{}: using compat prefix {}", self.name, compat.display());
            cmd.env("STEAM_COMPAT_DATA_PATH", &compat);
        }

        spawn::spawn_and_confirm(cmd, &self.name)
    }
}
