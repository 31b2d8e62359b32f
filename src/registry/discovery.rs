// ============================================================================
// File: src/registry/discovery.rs
// ----------------------------------------------------------------------------
// Host discovery configuration: where to look for Wine, DOSBox, Proton-GE
// installs and which ISA-translation wrappers this host carries.
// ============================================================================

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::runners::{Architecture, Platform, ProtonRunner, WrapperRunner};

/// Search locations for runner discovery.
///
/// Everything the registry probes is spelled out here instead of being baked
/// into the runners, so embedders and tests can point discovery at their own
/// trees. [`DiscoveryConfig::for_host`] carries the stock locations for the
/// build target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Candidate Wine executables, most preferred first.
    pub wine_paths: Vec<PathBuf>,

    /// Candidate DOSBox executables, most preferred first.
    pub dosbox_paths: Vec<PathBuf>,

    /// Steam compatibility-tool directories scanned for Proton-GE installs.
    pub proton_roots: Vec<PathBuf>,

    /// ISA-translation wrappers available on this host.
    pub wrappers: Vec<WrapperConfig>,
}

impl DiscoveryConfig {
    /// A configuration that discovers nothing beyond native execution.
    pub fn empty() -> Self {
        Self {
            wine_paths: Vec::new(),
            dosbox_paths: Vec::new(),
            proton_roots: Vec::new(),
            wrappers: Vec::new(),
        }
    }

    /// Stock search locations for the platform this build targets.
    #[cfg(target_os = "linux")]
    pub fn for_host() -> Self {
        Self {
            wine_paths: vec![
                PathBuf::from("/usr/bin/wine"),
                PathBuf::from("/usr/local/bin/wine"),
            ],
            dosbox_paths: vec![
                PathBuf::from("/usr/bin/dosbox"),
                PathBuf::from("/usr/local/bin/dosbox"),
                PathBuf::from("/usr/bin/dosbox-staging"),
                PathBuf::from("/usr/bin/dosbox-x"),
            ],
            proton_roots: steam_compat_roots(),
            wrappers: host_wrappers(),
        }
    }

    #[cfg(target_os = "macos")]
    pub fn for_host() -> Self {
        Self {
            wine_paths: vec![
                PathBuf::from("/usr/local/bin/wine"),
                PathBuf::from("/opt/homebrew/bin/wine"),
            ],
            dosbox_paths: vec![
                PathBuf::from("/opt/homebrew/bin/dosbox"),
                PathBuf::from("/usr/local/bin/dosbox"),
            ],
            proton_roots: Vec::new(),
            wrappers: host_wrappers(),
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    pub fn for_host() -> Self {
        Self::empty()
    }

    /// Add a Wine candidate.
    pub fn with_wine_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.wine_paths.push(path.into());
        self
    }

    /// Add a DOSBox candidate.
    pub fn with_dosbox_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.dosbox_paths.push(path.into());
        self
    }

    /// Add a Proton-GE scan root.
    pub fn with_proton_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.proton_roots.push(path.into());
        self
    }

    /// Add a wrapper definition.
    pub fn with_wrapper(mut self, wrapper: WrapperConfig) -> Self {
        self.wrappers.push(wrapper);
        self
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::for_host()
    }
}

/// Definition of one ISA-translation wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperConfig {
    /// Runner name shown in listings and used for pinning.
    pub name: String,

    /// The wrapper executable itself.
    pub executable: PathBuf,

    /// Game platform this wrapper serves.
    pub platform: Platform,

    /// Architecture the wrapper runs on.
    pub host_architecture: Architecture,

    /// Architecture of the binaries it translates.
    pub target_architecture: Architecture,

    /// Whether the wrapper crosses an instruction-set boundary.
    pub requires_isa_translation: bool,

    /// Fixed flags placed before everything else on the command line.
    pub prelude_args: Vec<String>,
}

impl WrapperConfig {
    /// An Arm64-to-x86_64 translation wrapper, the common case on Arm hosts.
    pub fn translation<N: Into<String>, P: Into<PathBuf>>(
        name: N,
        executable: P,
        platform: Platform,
    ) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            platform,
            host_architecture: Architecture::Arm64,
            target_architecture: Architecture::X86_64,
            requires_isa_translation: true,
            prelude_args: Vec::new(),
        }
    }

    /// Set the fixed prelude flags.
    pub fn with_prelude_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.prelude_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn to_runner(&self) -> WrapperRunner {
        WrapperRunner::new(
            self.name.clone(),
            self.executable.clone(),
            self.platform,
            self.host_architecture,
            self.target_architecture,
            self.requires_isa_translation,
        )
        .with_prelude_args(self.prelude_args.iter().cloned())
    }
}

// x86 translation layers only make sense on Arm hosts.
#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
fn host_wrappers() -> Vec<WrapperConfig> {
    vec![
        WrapperConfig::translation("Box64", "/usr/bin/box64", Platform::Linux),
        WrapperConfig::translation("FEX", "/usr/bin/FEXInterpreter", Platform::Linux),
        WrapperConfig::translation("QEMU-x86_64", "/usr/bin/qemu-x86_64", Platform::Linux),
    ]
}

#[cfg(all(target_os = "macos", target_arch = "aarch64"))]
fn host_wrappers() -> Vec<WrapperConfig> {
    vec![
        WrapperConfig::translation("Rosetta2", "/usr/bin/arch", Platform::MacOS)
            .with_prelude_args(["-x86_64"]),
    ]
}

#[cfg(all(
    any(target_os = "linux", target_os = "macos"),
    not(target_arch = "aarch64")
))]
fn host_wrappers() -> Vec<WrapperConfig> {
    Vec::new()
}

/// Steam compatibility-tool directories, including the Flatpak install.
#[cfg(target_os = "linux")]
fn steam_compat_roots() -> Vec<PathBuf> {
    let Some(home) = std::env::var_os("HOME").map(PathBuf::from) else {
        return Vec::new();
    };
    vec![
        home.join(".steam/root/compatibilitytools.d"),
        home.join(".local/share/Steam/compatibilitytools.d"),
        home.join(".var/app/com.valvesoftware.Steam/data/Steam/compatibilitytools.d"),
    ]
}

/// Scan the configured roots for Proton-GE installs.
///
/// A usable install is a directory named `GE-Proton*` that carries the
/// `proton` launch script. Results keep root order, name-sorted within each
/// root, so earlier roots take selection priority.
pub(crate) fn scan_proton_installs(roots: &[PathBuf]) -> Vec<ProtonRunner> {
    let mut found = Vec::new();
    for root in roots {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("skipping Proton root {}: {e}", root.display());
                continue;
            }
        };

        let mut installs: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let name = path.file_name().and_then(OsStr::to_str)?.to_string();
                if path.is_dir() && name.starts_with("GE-Proton") && path.join("proton").is_file()
                {
                    Some((name, path))
                } else {
                    None
                }
            })
            .collect();
        installs.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path) in installs {
            found.push(ProtonRunner::new(format!("Proton-GE ({name})"), path));
        }
    }
    found
}
