// ============================================================================
// File: src/runners/types.rs
// ----------------------------------------------------------------------------
// Platform/architecture model, runner capability snapshots and launch
// parameters shared by every runner variant.
// ============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Platform a game binary targets.
///
/// `Dos` is distinct from `Windows`: both start from an `MZ` header, but
/// legacy DOS binaries are routed to DOSBox rather than Wine/Proton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Could not be determined from headers or metadata
    #[default]
    Unknown,
    /// Windows PE executable
    Windows,
    /// Linux ELF executable
    Linux,
    /// macOS Mach-O executable (or .app bundle)
    MacOS,
    /// Legacy 16-bit DOS executable
    Dos,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Platform::Unknown => "unknown",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOS => "macos",
            Platform::Dos => "dos",
        };
        write!(f, "{name}")
    }
}

/// CPU architecture of a game binary or a host.
///
/// Header classification only ever produces `Unknown`, `X86`, `X86_64`,
/// `Arm` and `Arm64`; the remaining variants exist so wrapper instances
/// (qemu-style user-mode emulators) can declare exotic host/target pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum Architecture {
    /// Could not be determined
    #[default]
    Unknown,
    /// 32-bit x86
    X86,
    /// 64-bit x86
    X86_64,
    /// 32-bit ARM
    Arm,
    /// 64-bit ARM (aarch64)
    Arm64,
    /// 64-bit RISC-V
    Riscv64,
    /// 64-bit PowerPC
    Ppc64,
    /// 64-bit MIPS
    Mips64,
    /// 64-bit LoongArch
    LoongArch64,
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Architecture::Unknown => "unknown",
            Architecture::X86 => "x86",
            Architecture::X86_64 => "x86_64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
            Architecture::Riscv64 => "riscv64",
            Architecture::Ppc64 => "ppc64",
            Architecture::Mips64 => "mips64",
            Architecture::LoongArch64 => "loongarch64",
        };
        write!(f, "{name}")
    }
}

/// Platform of the machine this crate was compiled for.
pub fn host_platform() -> Platform {
    #[cfg(target_os = "linux")]
    {
        Platform::Linux
    }

    #[cfg(target_os = "macos")]
    {
        Platform::MacOS
    }

    #[cfg(target_os = "windows")]
    {
        Platform::Windows
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Platform::Unknown
    }
}

/// CPU architecture of the machine this crate was compiled for.
pub fn host_architecture() -> Architecture {
    match std::env::consts::ARCH {
        "x86" => Architecture::X86,
        "x86_64" => Architecture::X86_64,
        "arm" => Architecture::Arm,
        "aarch64" => Architecture::Arm64,
        "riscv64" => Architecture::Riscv64,
        "powerpc64" => Architecture::Ppc64,
        "mips64" => Architecture::Mips64,
        "loongarch64" => Architecture::LoongArch64,
        _ => Architecture::Unknown,
    }
}

/// Capability snapshot of a single runner.
///
/// Produced fresh on every query so `available` and `version` reflect the
/// current state of the host, not the state at discovery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerCapabilities {
    /// Runner name as shown to users ("Wine", "Proton-GE (GE-Proton9-20)", ...)
    pub name: String,

    /// Version string of the underlying tool, "unknown" when undeterminable
    pub version: String,

    /// Path to the tool's executable (empty for the native runner)
    pub executable: PathBuf,

    /// Whether the underlying tool currently exists on this host
    pub available: bool,

    /// Game platform this runner can handle
    pub supported_platform: Platform,

    /// Host architecture the runner itself needs
    pub host_architecture: Architecture,

    /// Game architecture the runner can execute
    pub target_architecture: Architecture,

    /// True when the runner translates between instruction sets
    pub requires_isa_translation: bool,

    /// File extensions the runner accepts, with leading dot; empty means
    /// the runner does not care
    pub supported_extensions: Vec<String>,
}

/// Parameters for a single launch attempt.
///
/// Collected once by the launch coordinator and passed immutably to the
/// selected runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Game binary (or, for DOS titles, possibly the install directory)
    pub game_path: PathBuf,

    /// Working directory for the spawned process; empty means "inherit"
    pub working_dir: PathBuf,

    /// Arguments passed to the game itself
    pub args: Vec<String>,

    /// Environment overrides applied on top of the inherited host
    /// environment; an override always wins over the inherited value
    pub env: HashMap<String, String>,

    /// Classified (or caller-declared) platform of the game
    pub platform: Platform,

    /// Classified (or caller-declared) architecture of the game
    pub arch: Architecture,

    /// Per-game replacement for the runner's own executable
    pub runner_executable_override: Option<PathBuf>,

    /// Extra arguments for the runner binary, placed before the game path
    pub runner_args: Vec<String>,
}

impl LaunchSpec {
    /// Create a launch spec for a game binary.
    ///
    /// The working directory defaults to the binary's parent directory.
    pub fn new<P: Into<PathBuf>>(game_path: P) -> Self {
        let game_path = game_path.into();
        let working_dir = game_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            game_path,
            working_dir,
            args: Vec::new(),
            env: HashMap::new(),
            platform: Platform::Unknown,
            arch: Architecture::Unknown,
            runner_executable_override: None,
            runner_args: Vec::new(),
        }
    }

    /// Set the working directory
    pub fn with_working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Append a game argument
    pub fn with_arg<A: Into<String>>(mut self, arg: A) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment override
    pub fn with_env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Declare the game's platform, skipping header classification
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Declare the game's architecture, skipping header classification
    pub fn with_arch(mut self, arch: Architecture) -> Self {
        self.arch = arch;
        self
    }

    /// Replace the runner's executable for this launch only
    pub fn with_runner_executable<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.runner_executable_override = Some(path.into());
        self
    }

    /// Append an argument for the runner binary itself
    pub fn with_runner_arg<A: Into<String>>(mut self, arg: A) -> Self {
        self.runner_args.push(arg.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_spec_builder() {
        let spec = LaunchSpec::new("/games/doom/DOOM.EXE")
            .with_arg("-episode")
            .with_arg("1")
            .with_env("DISPLAY", ":0")
            .with_platform(Platform::Dos)
            .with_arch(Architecture::X86);

        assert_eq!(spec.game_path, PathBuf::from("/games/doom/DOOM.EXE"));
        assert_eq!(spec.working_dir, PathBuf::from("/games/doom"));
        assert_eq!(spec.args, vec!["-episode".to_string(), "1".to_string()]);
        assert_eq!(spec.env.get("DISPLAY"), Some(&":0".to_string()));
        assert_eq!(spec.platform, Platform::Dos);
        assert_eq!(spec.arch, Architecture::X86);
        assert!(spec.runner_executable_override.is_none());
    }

    #[test]
    fn launch_spec_runner_override() {
        let spec = LaunchSpec::new("/games/tool.exe")
            .with_runner_executable("/opt/wine-staging/bin/wine")
            .with_runner_arg("--verbose");

        assert_eq!(
            spec.runner_executable_override,
            Some(PathBuf::from("/opt/wine-staging/bin/wine"))
        );
        assert_eq!(spec.runner_args, vec!["--verbose".to_string()]);
    }

    #[test]
    fn platform_display() {
        assert_eq!(Platform::Dos.to_string(), "dos");
        assert_eq!(Platform::MacOS.to_string(), "macos");
        assert_eq!(Platform::default(), Platform::Unknown);
    }

    #[test]
    fn architecture_display() {
        assert_eq!(Architecture::X86_64.to_string(), "x86_64");
        assert_eq!(Architecture::Arm64.to_string(), "arm64");
        assert_eq!(Architecture::default(), Architecture::Unknown);
    }

    #[test]
    fn host_values_are_consistent() {
        // Whatever the build target, the host probes must agree with cfg.
        #[cfg(target_os = "linux")]
        assert_eq!(host_platform(), Platform::Linux);
        #[cfg(target_os = "macos")]
        assert_eq!(host_platform(), Platform::MacOS);

        #[cfg(target_arch = "x86_64")]
        assert_eq!(host_architecture(), Architecture::X86_64);
        #[cfg(target_arch = "aarch64")]
        assert_eq!(host_architecture(), Architecture::Arm64);
    }

    #[test]
    fn platform_serde_round_trip() {
        let json = serde_json::to_string(&Platform::Windows).unwrap();
        assert_eq!(json, "\"Windows\"");
        let back: Platform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Platform::Windows);
    }
}
