// ============================================================================
// File: src/launch.rs
// ----------------------------------------------------------------------------
// Launch coordinator: game descriptor in, running child process out.
//
// The single entry point stitches the other modules together:
// - classify the binary (unless the descriptor pre-declares platform/arch)
// - reroute legacy MZ executables from Windows to DOSBox
// - pick a runner (explicit pin or first capable+available match)
// - hand the assembled LaunchSpec to that runner
// ============================================================================

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Child;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, Result};
use crate::introspect;
use crate::registry::RunnerRegistry;
use crate::runners::{Architecture, LaunchSpec, Platform, Runner};

/// Everything the hosting client knows about a game before launch.
///
/// The client's library layer stores per-game settings as JSON, so the
/// descriptor deserializes straight from that blob; only `path` is
/// required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDescriptor {
    /// Game binary, or the install directory for DOS titles.
    pub path: PathBuf,

    /// Pre-declared platform; `None` means "classify from the binary
    /// header". Store metadata often knows this before any file exists
    /// on disk.
    #[serde(default)]
    pub platform: Option<Platform>,

    /// Pre-declared architecture; `None` means "classify from the header".
    #[serde(default)]
    pub arch: Option<Architecture>,

    /// Pin a runner by name instead of first-match selection.
    #[serde(default)]
    pub preferred_runner: Option<String>,

    /// Per-game replacement for the runner's own executable.
    #[serde(default)]
    pub runner_executable: Option<PathBuf>,

    /// Extra arguments for the runner binary, placed before the game path.
    #[serde(default)]
    pub runner_args: Vec<String>,

    /// Arguments for the game itself.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment overrides for the spawned process.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl GameDescriptor {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            platform: None,
            arch: None,
            preferred_runner: None,
            runner_executable: None,
            runner_args: Vec::new(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Parse a descriptor from the per-game JSON settings blob.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Declare the platform, skipping header classification.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Declare the architecture, skipping header classification.
    pub fn with_arch(mut self, arch: Architecture) -> Self {
        self.arch = Some(arch);
        self
    }

    /// Pin a runner by name.
    pub fn with_preferred_runner<N: Into<String>>(mut self, name: N) -> Self {
        self.preferred_runner = Some(name.into());
        self
    }

    /// Replace the runner's executable for this game.
    pub fn with_runner_executable<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.runner_executable = Some(path.into());
        self
    }

    /// Append an argument for the runner binary itself.
    pub fn with_runner_arg<A: Into<String>>(mut self, arg: A) -> Self {
        self.runner_args.push(arg.into());
        self
    }

    /// Append a game argument.
    pub fn with_arg<A: Into<String>>(mut self, arg: A) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment override.
    pub fn with_env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// A successfully started game.
#[derive(Debug)]
pub struct LaunchOutcome {
    /// Name of the runner that started it.
    pub runner_name: String,

    /// Handle to the running process. The caller owns waiting/reaping;
    /// the crate keeps nothing.
    pub child: Child,
}

/// Launch a game end to end.
///
/// Classification runs at most once per attempt and only here; runners
/// receive the finished [`LaunchSpec`] and never re-classify. MZ images
/// whose PE offset predates the PE format are rerouted from Windows to
/// DOSBox before selection.
pub fn launch_game(registry: &RunnerRegistry, game: &GameDescriptor) -> Result<LaunchOutcome> {
    let mut platform = game
        .platform
        .unwrap_or_else(|| introspect::classify_platform(&game.path));
    let arch = game
        .arch
        .unwrap_or_else(|| introspect::classify_architecture(&game.path));

    if platform == Platform::Windows && introspect::is_dos_executable(&game.path) {
        info!(
            "{} looks like a legacy DOS executable, routing to DOSBox",
            game.path.display()
        );
        platform = Platform::Dos;
    }

    info!(
        "launching {} (platform: {platform}, architecture: {arch})",
        game.path.display()
    );

    let mut spec = LaunchSpec::new(&game.path)
        .with_platform(platform)
        .with_arch(arch);
    spec.args = game.args.clone();
    spec.env = game.env.clone();
    spec.runner_args = game.runner_args.clone();
    spec.runner_executable_override = game.runner_executable.clone();

    let runner = match &game.preferred_runner {
        Some(name) => pinned_runner(registry, name, &spec)?,
        None => registry
            .select_runner(&spec)
            .ok_or(LaunchError::NoRunnerAvailable { platform })?,
    };

    let child = runner.launch(&spec)?;
    Ok(LaunchOutcome {
        runner_name: runner.name().to_string(),
        child,
    })
}

/// Resolve an explicit runner pin.
///
/// The pin must name a registered, available runner. A platform mismatch
/// is only logged: pinning exists precisely to override selection, and the
/// user may know something the classifier does not.
fn pinned_runner<'a>(
    registry: &'a RunnerRegistry,
    name: &str,
    spec: &LaunchSpec,
) -> Result<&'a Runner> {
    let runner = registry
        .runner_named(name)
        .ok_or_else(|| LaunchError::RunnerUnavailable {
            runner: name.to_string(),
            reason: "no runner registered under that name".to_string(),
        })?;

    if !runner.is_available() {
        return Err(LaunchError::RunnerUnavailable {
            runner: name.to_string(),
            reason: "pinned runner is not available on this host".to_string(),
        });
    }

    if !runner.can_run(spec) {
        warn!(
            "pinned runner {name} does not claim {} support, launching anyway",
            spec.platform
        );
    }

    Ok(runner)
}
