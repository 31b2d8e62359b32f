// ============================================================================
// File: src/runners/dosbox/tests.rs
// ----------------------------------------------------------------------------
// Tests for the DOSBox runner.
// ============================================================================

use std::path::Path;
use std::sync::Mutex;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use crate::error::LaunchError;
use crate::runners::{LaunchSpec, Platform};

use super::DosBoxRunner;

/// Launching sweeps the process table for stale "dosbox" command lines, so
/// tests that really call `launch` must not overlap or they reap each
/// other's stand-in processes.
pub(crate) static DOSBOX_LAUNCH_LOCK: Mutex<()> = Mutex::new(());

#[cfg(unix)]
fn write_stub(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let _ = env_logger::builder().is_test(true).try_init();

    let stub = dir.child(name);
    stub.write_str(body).unwrap();
    let mut perms = std::fs::metadata(stub.path()).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(stub.path(), perms).unwrap();
    stub.path().to_path_buf()
}

#[test]
fn dosbox_matches_dos_platform_only() {
    let runner = DosBoxRunner::new("/usr/bin/dosbox");
    assert!(runner.can_run(&LaunchSpec::new("/g/GAME.EXE").with_platform(Platform::Dos)));
    assert!(!runner.can_run(&LaunchSpec::new("/g/game.exe").with_platform(Platform::Windows)));
    assert!(!runner.can_run(&LaunchSpec::new("/g/game").with_platform(Platform::Linux)));
}

#[cfg(unix)]
#[test]
fn availability_needs_the_execute_bit() {
    let dir = TempDir::new().unwrap();
    let plain = dir.child("dosbox-plain");
    plain.write_str("not a binary").unwrap();

    let runner = DosBoxRunner::new(plain.path());
    assert!(!runner.is_available());

    let stub = write_stub(&dir, "fakedos", "#!/bin/sh\nexit 0\n");
    assert!(DosBoxRunner::new(&stub).is_available());
}

#[test]
fn config_options_round_trip() {
    let mut runner = DosBoxRunner::new("/usr/bin/dosbox");
    assert_eq!(
        runner.config_options(),
        &["cpu_cycles", "render_scaler", "fullscreen"]
    );

    runner.set_config_option("cpu_cycles", "30000");
    runner.set_config_option("render_scaler", "hq2x");
    runner.set_config_option("fullscreen", "TRUE");
    assert_eq!(runner.options().cpu_cycles, "30000");
    assert_eq!(runner.options().render_scaler, "hq2x");
    assert!(runner.options().fullscreen);

    runner.set_config_option("fullscreen", "no");
    assert!(!runner.options().fullscreen);
}

#[test]
fn unknown_config_option_changes_nothing() {
    let mut runner = DosBoxRunner::new("/usr/bin/dosbox");
    runner.set_config_option("midi_device", "mt32");
    assert_eq!(runner.options().cpu_cycles, "max");
    assert_eq!(runner.options().render_scaler, "normal2x");
    assert!(!runner.options().fullscreen);
}

#[test]
fn launch_without_dosbox_reports_unavailable() {
    let runner = DosBoxRunner::new("/nonexistent/dosbox");
    let spec = LaunchSpec::new("/g/GAME.EXE").with_platform(Platform::Dos);
    match runner.launch(&spec) {
        Err(LaunchError::RunnerUnavailable { runner, .. }) => assert_eq!(runner, "DOSBox"),
        other => panic!("expected RunnerUnavailable, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn launch_with_empty_install_dir_fails_setup() {
    let dir = TempDir::new().unwrap();
    let stub = write_stub(&dir, "fakedos", "#!/bin/sh\nexit 0\n");
    let install = TempDir::new().unwrap();

    let runner = DosBoxRunner::new(&stub);
    let spec = LaunchSpec::new(install.path()).with_platform(Platform::Dos);
    match runner.launch(&spec) {
        Err(LaunchError::Setup { detail, .. }) => {
            assert!(detail.contains("no DOS executable"), "detail: {detail}");
        }
        other => panic!("expected Setup error, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn version_parses_probe_output() {
    let dir = TempDir::new().unwrap();
    let stub = write_stub(
        &dir,
        "fakedos",
        "#!/bin/sh\necho \"FakeDOS version 0.74-3, copyright 2002 the team\"\n",
    );
    assert_eq!(DosBoxRunner::new(&stub).version(), "0.74-3");

    assert_eq!(DosBoxRunner::new("/nonexistent/dosbox").version(), "unknown");
}

#[cfg(unix)]
#[test]
fn launch_argv_carries_conf_and_optional_fullscreen() {
    let _guard = DOSBOX_LAUNCH_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let dir = TempDir::new().unwrap();
    let capture = dir.child("argv.txt");
    let stub = write_stub(
        &dir,
        "fakedos",
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$CAPTURE\"\nsleep 2\n",
    );

    let game_dir = TempDir::new().unwrap();
    let game = game_dir.child("KEEN.EXE");
    let mut bytes = vec![0u8; 0x40];
    bytes[0] = b'M';
    bytes[1] = b'Z';
    game.write_binary(&bytes).unwrap();

    let mut runner = DosBoxRunner::new(&stub);
    let spec = LaunchSpec::new(game.path())
        .with_platform(Platform::Dos)
        .with_env("CAPTURE", capture.path().to_string_lossy());

    // Windowed launch first: exactly -conf <path>
    let mut child = runner.launch(&spec).expect("launch");
    let _ = child.wait();
    let recorded = std::fs::read_to_string(capture.path()).unwrap();
    let argv: Vec<&str> = recorded.lines().collect();
    assert_eq!(argv.len(), 2, "argv: {argv:?}");
    assert_eq!(argv[0], "-conf");
    let conf_path = Path::new(argv[1]);
    let conf = std::fs::read_to_string(conf_path).expect("conf must outlive the spawn");
    let mount = format!("mount c: \"{}\"", game_dir.path().display());
    assert!(predicate::str::contains(mount).eval(&conf));
    assert!(predicate::str::contains("\nKEEN.EXE\n").eval(&conf));
    let _ = std::fs::remove_dir_all(conf_path.parent().unwrap());

    // Fullscreen flag only when the option is set
    runner.set_config_option("fullscreen", "true");
    let mut child = runner.launch(&spec).expect("launch fullscreen");
    let _ = child.wait();
    let recorded = std::fs::read_to_string(capture.path()).unwrap();
    let argv: Vec<&str> = recorded.lines().collect();
    assert_eq!(argv.len(), 3, "argv: {argv:?}");
    assert_eq!(argv[2], "-fullscreen");
    let _ = std::fs::remove_dir_all(Path::new(argv[1]).parent().unwrap());
}
