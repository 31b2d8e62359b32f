// ============================================================================
// File: src/runners/dosbox/conf.rs
// ----------------------------------------------------------------------------
// Generated DOSBox configuration.
//
// The file shape is a compatibility contract with DOSBox itself: section
// order, the mount command and the autoexec trailer must come out exactly
// like this, so rendering is a pure function the tests can pin down.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::error::{LaunchError, Result};

/// Tunable pieces of the generated configuration.
#[derive(Debug, Clone)]
pub struct DosBoxOptions {
    /// CPU cycles setting ("max", "auto" or a fixed number)
    pub cpu_cycles: String,

    /// Video scaler ("normal2x", "hq2x", ...)
    pub render_scaler: String,

    /// Pass `-fullscreen` on the command line
    pub fullscreen: bool,
}

impl Default for DosBoxOptions {
    fn default() -> Self {
        Self {
            cpu_cycles: "max".to_string(),
            render_scaler: "normal2x".to_string(),
            fullscreen: false,
        }
    }
}

/// Render the configuration for one game.
///
/// Mounts the game's directory as drive C, switches to it, starts the
/// executable with its arguments and exits DOSBox when the game quits.
pub fn render_conf(game_path: &Path, args: &[String], options: &DosBoxOptions) -> String {
    let game_dir = game_path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let game_exe = game_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str("[cpu]\n");
    out.push_str("core=auto\n");
    out.push_str("cputype=auto\n");
    out.push_str(&format!("cycles={}\n", options.cpu_cycles));
    out.push('\n');

    out.push_str("[render]\n");
    out.push_str("frameskip=0\n");
    out.push_str(&format!("scaler={}\n", options.render_scaler));
    out.push('\n');

    out.push_str("[mixer]\n");
    out.push_str("rate=44100\n");
    out.push_str("nosound=false\n");
    out.push('\n');

    out.push_str("[dos]\n");
    out.push_str("xms=true\n");
    out.push_str("ems=true\n");
    out.push_str("umb=true\n");
    out.push('\n');

    out.push_str("[autoexec]\n");
    out.push_str("@echo off\n");
    out.push_str(&format!("mount c: \"{game_dir}\"\n"));
    out.push_str("c:\n");
    out.push_str(&game_exe);
    for arg in args {
        out.push(' ');
        out.push_str(arg);
    }
    out.push('\n');
    out.push_str("exit\n");

    out
}

/// Write the rendered configuration to a fresh temp directory.
///
/// The directory is persisted rather than cleaned up on drop: DOSBox reads
/// the file after the spawn returns, so tying its lifetime to this call
/// would hand DOSBox a dangling path. The OS temp cleaner reclaims it.
pub(crate) fn write_conf(
    game_path: &Path,
    args: &[String],
    options: &DosBoxOptions,
) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix("runlayer-dosbox-")
        .tempdir()
        .map_err(|e| LaunchError::Setup {
            runner: "DOSBox".to_string(),
            detail: format!("failed to create config directory: {e}"),
        })?;

    let dir = dir.keep();
    let conf_path = dir.join("dosbox.conf");
    let contents = render_conf(game_path, args, options);
    if let Err(e) = fs::write(&conf_path, &contents) {
        error!("failed to write DOSBox config {}: {e}", conf_path.display());
        return Err(LaunchError::Setup {
            runner: "DOSBox".to_string(),
            detail: format!("failed to write config {}: {e}", conf_path.display()),
        });
    }

    info!("created DOSBox config: {}", conf_path.display());
    Ok(conf_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn conf_sections_in_contract_order() {
        let conf = render_conf(
            Path::new("/games/Foo/FOO.EXE"),
            &[],
            &DosBoxOptions::default(),
        );
        let sections: Vec<usize> = ["[cpu]", "[render]", "[mixer]", "[dos]", "[autoexec]"]
            .iter()
            .map(|s| conf.find(s).unwrap_or_else(|| panic!("missing {s}")))
            .collect();
        let mut sorted = sections.clone();
        sorted.sort_unstable();
        assert_eq!(sections, sorted, "sections out of order");
        // Exactly one [cpu] section
        assert_eq!(conf.matches("[cpu]").count(), 1);
    }

    #[test]
    fn autoexec_mounts_runs_and_exits_in_order() {
        let conf = render_conf(
            Path::new("/games/Foo/FOO.EXE"),
            &[],
            &DosBoxOptions::default(),
        );
        let mount = conf.find("mount c: \"/games/Foo\"").expect("mount line");
        let drive = conf.find("\nc:\n").expect("drive switch");
        let exe = conf.find("\nFOO.EXE\n").expect("exe line");
        let exit = conf.find("\nexit\n").expect("exit trailer");
        assert!(mount < drive && drive < exe && exe < exit);
    }

    #[test]
    fn game_arguments_follow_the_executable() {
        let conf = render_conf(
            Path::new("/games/doom/DOOM.EXE"),
            &["-episode".to_string(), "1".to_string()],
            &DosBoxOptions::default(),
        );
        assert!(predicate::str::contains("\nDOOM.EXE -episode 1\n").eval(&conf));
    }

    #[test]
    fn options_flow_into_cpu_and_render() {
        let options = DosBoxOptions {
            cpu_cycles: "30000".to_string(),
            render_scaler: "hq2x".to_string(),
            fullscreen: true,
        };
        let conf = render_conf(Path::new("/g/GAME.EXE"), &[], &options);
        assert!(predicate::str::contains("cycles=30000\n").eval(&conf));
        assert!(predicate::str::contains("scaler=hq2x\n").eval(&conf));
        // Fullscreen is a command-line flag, never part of the file
        assert!(predicate::str::contains("fullscreen").not().eval(&conf));
    }

    #[test]
    fn written_conf_persists_past_the_call() {
        let path = write_conf(
            Path::new("/games/Foo/FOO.EXE"),
            &[],
            &DosBoxOptions::default(),
        )
        .expect("write_conf");
        let contents = fs::read_to_string(&path).expect("config must still exist");
        assert!(predicate::str::contains("mount c: \"/games/Foo\"").eval(&contents));
        // Leave no test droppings in the real temp dir
        let _ = fs::remove_dir_all(path.parent().expect("parent"));
    }
}
