// ============================================================================
// File: src/runners/dosbox/mod.rs
// ----------------------------------------------------------------------------
// Legacy DOS games through DOSBox: config synthesis, stale-session cleanup
// and executable location inside install trees.
// ============================================================================

use std::path::PathBuf;
use std::process::Child;
use std::time::Duration;

use log::{error, info, warn};

use crate::error::{LaunchError, Result};
use crate::runners::spawn::{self, is_executable, run_with_timeout};
use crate::runners::{host_architecture, Architecture, LaunchSpec, Platform, RunnerCapabilities};

mod conf;
mod locate;
#[cfg(unix)]
pub mod supervisor;

pub use conf::{render_conf, DosBoxOptions};

#[cfg(test)]
pub(crate) mod tests;

/// Bounded wait for the `-version` probe.
const VERSION_TIMEOUT: Duration = Duration::from_secs(2);

/// Graceful-termination window for stale sessions swept before a launch.
#[cfg(unix)]
const CLEANUP_TIMEOUT_MS: u64 = 3000;

/// Runs legacy DOS games through DOSBox.
///
/// The only runner with mutable per-runner options; cycles and scaler feed
/// the generated configuration, fullscreen becomes a command-line flag.
#[derive(Debug, Clone)]
pub struct DosBoxRunner {
    dosbox_path: PathBuf,
    options: DosBoxOptions,
}

impl DosBoxRunner {
    pub fn new<P: Into<PathBuf>>(dosbox_path: P) -> Self {
        Self {
            dosbox_path: dosbox_path.into(),
            options: DosBoxOptions::default(),
        }
    }

    pub fn name(&self) -> &str {
        "DOSBox"
    }

    /// Probe `dosbox -version` and pull the token after "version" out of
    /// output like "DOSBox version 0.74-3".
    pub fn version(&self) -> String {
        let path = self.dosbox_path.to_string_lossy();
        if let Some(output) = run_with_timeout(&path, &["-version"], VERSION_TIMEOUT) {
            let tokens: Vec<&str> = output.split_whitespace().collect();
            for pair in tokens.windows(2) {
                if pair[0] == "version" {
                    return pair[1].trim_matches(',').to_string();
                }
            }
        }
        "unknown".to_string()
    }

    pub fn is_available(&self) -> bool {
        is_executable(&self.dosbox_path)
    }

    pub fn capabilities(&self) -> RunnerCapabilities {
        RunnerCapabilities {
            name: self.name().to_string(),
            version: self.version(),
            executable: self.dosbox_path.clone(),
            available: self.is_available(),
            supported_platform: Platform::Dos,
            host_architecture: host_architecture(),
            target_architecture: Architecture::X86,
            requires_isa_translation: false,
            supported_extensions: vec![
                ".exe".to_string(),
                ".com".to_string(),
                ".bat".to_string(),
            ],
        }
    }

    pub fn can_run(&self, spec: &LaunchSpec) -> bool {
        spec.platform == Platform::Dos
    }

    /// Keys accepted by [`set_config_option`](Self::set_config_option).
    pub fn config_options(&self) -> &'static [&'static str] {
        &["cpu_cycles", "render_scaler", "fullscreen"]
    }

    pub fn set_config_option(&mut self, key: &str, value: &str) {
        match key {
            "cpu_cycles" => {
                self.options.cpu_cycles = value.to_string();
                info!("DOSBox CPU cycles set to: {value}");
            }
            "render_scaler" => {
                self.options.render_scaler = value.to_string();
                info!("DOSBox render scaler set to: {value}");
            }
            "fullscreen" => {
                self.options.fullscreen = value.eq_ignore_ascii_case("true");
                info!(
                    "DOSBox fullscreen: {}",
                    if self.options.fullscreen { "enabled" } else { "disabled" }
                );
            }
            other => warn!("ignoring unknown DOSBox option '{other}'"),
        }
    }

    pub fn options(&self) -> &DosBoxOptions {
        &self.options
    }

    pub fn launch(&self, spec: &LaunchSpec) -> Result<Child> {
        if !self.is_available() {
            error!("DOSBox is not available at {}", self.dosbox_path.display());
            return Err(LaunchError::RunnerUnavailable {
                runner: self.name().to_string(),
                reason: format!(
                    "{} is missing or not executable",
                    self.dosbox_path.display()
                ),
            });
        }

        let game_path = self.resolve_game_path(spec)?;

        // Stale sessions keep drive mounts and audio ports; sweep them
        // before bringing up a new one.
        #[cfg(unix)]
        {
            info!("cleaning up old DOSBox processes");
            supervisor::terminate_all(CLEANUP_TIMEOUT_MS);
        }

        let conf_path = conf::write_conf(&game_path, &spec.args, &self.options)?;

        let mut args = vec![
            "-conf".to_string(),
            conf_path.to_string_lossy().into_owned(),
        ];
        if self.options.fullscreen {
            args.push("-fullscreen".to_string());
        }

        // DOSBox runs from the game's own directory, wherever the
        // executable was resolved to
        let mut run_spec = spec.clone();
        run_spec.working_dir = game_path.parent().map(PathBuf::from).unwrap_or_default();

        let cmd = spawn::build_command(&self.dosbox_path, &args, &run_spec);
        let child = spawn::spawn_and_confirm(cmd, self.name())?;
        info!("DOSBox started for game: {}", game_path.display());
        Ok(child)
    }

    /// A descriptor may point at the install directory instead of the
    /// binary; dig the real executable out in that case.
    fn resolve_game_path(&self, spec: &LaunchSpec) -> Result<PathBuf> {
        if !spec.game_path.is_dir() {
            return Ok(spec.game_path.clone());
        }

        info!(
            "game path is a directory, searching for executable: {}",
            spec.game_path.display()
        );
        match locate::locate_dos_executable(&spec.game_path) {
            Some(path) => Ok(path),
            None => {
                error!(
                    "no executable files found in game directory or Wine/Proton prefix: {}",
                    spec.game_path.display()
                );
                Err(LaunchError::Setup {
                    runner: self.name().to_string(),
                    detail: format!(
                        "no DOS executable found under {}",
                        spec.game_path.display()
                    ),
                })
            }
        }
    }
}
