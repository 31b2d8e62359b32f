// ============================================================================
// File: src/runners/wrapper.rs
// ----------------------------------------------------------------------------
// ISA-translation wrappers (Box64, FEX, QEMU user-mode, Rosetta2).
// ============================================================================

use std::path::{Path, PathBuf};
use std::process::Child;

use log::{error, info};

use crate::error::{LaunchError, Result};
use crate::runners::spawn;
use crate::runners::{Architecture, LaunchSpec, Platform, RunnerCapabilities};

/// Runs a binary through a translating wrapper executable.
///
/// Fully instance-configured: the same type covers Box64, FEX, QEMU
/// user-mode emulators and Rosetta2. A wrapper declares which game platform
/// it serves and which host/target architecture pair it translates between;
/// `prelude_args` carries fixed flags the wrapper itself needs before
/// anything else on the command line (Rosetta2's `arch` requires
/// `-x86_64` there).
#[derive(Debug, Clone)]
pub struct WrapperRunner {
    name: String,
    executable: PathBuf,
    platform: Platform,
    host_arch: Architecture,
    target_arch: Architecture,
    requires_isa_translation: bool,
    prelude_args: Vec<String>,
}

impl WrapperRunner {
    pub fn new<N: Into<String>, P: Into<PathBuf>>(
        name: N,
        executable: P,
        platform: Platform,
        host_arch: Architecture,
        target_arch: Architecture,
        requires_isa_translation: bool,
    ) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            platform,
            host_arch,
            target_arch,
            requires_isa_translation,
            prelude_args: Vec::new(),
        }
    }

    /// Fixed flags placed before everything else on the wrapper's command
    /// line.
    pub fn with_prelude_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.prelude_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> String {
        "1.0".to_string()
    }

    pub fn is_available(&self) -> bool {
        self.executable.exists()
    }

    pub fn capabilities(&self) -> RunnerCapabilities {
        RunnerCapabilities {
            name: self.name.clone(),
            version: self.version(),
            executable: self.executable.clone(),
            available: self.is_available(),
            supported_platform: self.platform,
            host_architecture: self.host_arch,
            target_architecture: self.target_arch,
            requires_isa_translation: self.requires_isa_translation,
            supported_extensions: Vec::new(),
        }
    }

    /// Platform match only. Two wrappers serving the same platform are
    /// ranked purely by registration order; users pin a specific one by
    /// name when that is not what they want.
    pub fn can_run(&self, spec: &LaunchSpec) -> bool {
        spec.platform == self.platform
    }

    pub fn launch(&self, spec: &LaunchSpec) -> Result<Child> {
        let chosen: &Path = spec
            .runner_executable_override
            .as_deref()
            .unwrap_or(&self.executable);

        if chosen.as_os_str().is_empty() || !chosen.exists() {
            error!("{}: wrapper executable not found: {}", self.name, chosen.display());
            return Err(LaunchError::RunnerUnavailable {
                runner: self.name.clone(),
                reason: format!("wrapper executable not found: {}", chosen.display()),
            });
        }

        let mut args = Vec::with_capacity(
            self.prelude_args.len() + spec.runner_args.len() + spec.args.len() + 1,
        );
        args.extend(self.prelude_args.iter().cloned());
        args.extend(spec.runner_args.iter().cloned());
        args.push(spec.game_path.to_string_lossy().into_owned());
        args.extend(spec.args.iter().cloned());

        let cmd = spawn::build_command(chosen, &args, spec);
        let child = spawn::spawn_and_confirm(cmd, &self.name)?;
        info!(
            "{}: launched {} game via {}",
            self.name,
            spec.platform,
            chosen.display()
        );
        Ok(child)
    }
}
