use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::{LaunchError, Result};
use crate::runners::LaunchSpec;

/// How long a freshly spawned child gets to prove it started.
pub(crate) const START_TIMEOUT: Duration = Duration::from_secs(3);

/// Poll interval for the startup window and termination sweeps.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Assemble a command with the launch spec's working directory and
/// environment overrides. The child inherits the host environment; an
/// override always wins over the inherited value.
pub(crate) fn build_command(program: &Path, args: &[String], spec: &LaunchSpec) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if !spec.working_dir.as_os_str().is_empty() {
        cmd.current_dir(&spec.working_dir);
    }
    cmd.envs(&spec.env);
    cmd
}

/// Spawn a command and wait for the startup window to settle.
///
/// A child that is still alive at the first probe, or that already exited
/// cleanly, counts as started. A child that died with a failure status is a
/// spawn failure carrying the exit status. When the window elapses without
/// a verdict the child is killed and reaped so no half-started process
/// leaks, and `StartTimeout` is returned.
pub(crate) fn spawn_and_confirm(mut cmd: Command, runner: &str) -> Result<Child> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let argv: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    info!("{runner}: spawning {program} {}", argv.join(" "));

    let mut child = cmd.spawn().map_err(|e| LaunchError::SpawnFailed {
        program: program.clone(),
        detail: e.to_string(),
    })?;

    let deadline = Instant::now() + START_TIMEOUT;
    // One scheduler beat so immediate exec failures have a chance to surface
    thread::sleep(POLL_INTERVAL);
    loop {
        match child.try_wait() {
            Ok(None) => {
                debug!("{runner}: {program} up as pid {}", child.id());
                return Ok(child);
            }
            Ok(Some(status)) if status.success() => {
                // Short-lived launcher stubs exit immediately, that is fine
                debug!("{runner}: {program} already exited cleanly");
                return Ok(child);
            }
            Ok(Some(status)) => {
                return Err(LaunchError::SpawnFailed {
                    program,
                    detail: format!("exited with {status} during startup"),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                return Err(LaunchError::SpawnFailed {
                    program,
                    detail: e.to_string(),
                });
            }
        }

        if Instant::now() >= deadline {
            warn!("{runner}: {program} did not settle, killing it");
            let _ = child.kill();
            let _ = child.wait();
            return Err(LaunchError::StartTimeout {
                program,
                waited_ms: START_TIMEOUT.as_millis() as u64,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Run a short probe command and capture its stdout, killing it when the
/// deadline passes. Used for `pgrep`/`ps`/`dosbox -version` style helpers
/// that must never wedge a launch.
pub(crate) fn run_with_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    let timed_out = loop {
        match child.try_wait() {
            Ok(Some(_)) => break false,
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!("probe '{program}' exceeded {}ms, killing it", timeout.as_millis());
                    let _ = child.kill();
                    break true;
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(_) => {
                let _ = child.kill();
                break true;
            }
        }
    };

    let output = child.wait_with_output().ok()?;
    if timed_out {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Probe a list of candidate paths and return the first that exists,
/// falling back to the first candidate so callers always get a path to
/// report in diagnostics.
pub(crate) fn first_existing_or_first(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|p| p.exists())
        .or_else(|| candidates.first())
        .cloned()
}

/// Whether a path exists and carries an execute bit (any exists check on
/// platforms without unix permissions).
pub(crate) fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runners::LaunchSpec;

    #[cfg(unix)]
    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn first_existing_prefers_real_paths() {
        let candidates = vec![
            PathBuf::from("/nonexistent/wine"),
            PathBuf::from("/bin/sh"),
            PathBuf::from("/nonexistent/other"),
        ];
        assert_eq!(
            first_existing_or_first(&candidates),
            Some(PathBuf::from("/bin/sh"))
        );
    }

    #[test]
    fn first_existing_falls_back_to_first() {
        let candidates = vec![
            PathBuf::from("/nonexistent/a"),
            PathBuf::from("/nonexistent/b"),
        ];
        assert_eq!(
            first_existing_or_first(&candidates),
            Some(PathBuf::from("/nonexistent/a"))
        );
        assert_eq!(first_existing_or_first(&[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn spawn_failure_reports_os_detail() {
        init_logs();
        let spec = LaunchSpec::new("/nonexistent/game");
        let cmd = build_command(Path::new("/nonexistent/runner"), &[], &spec);
        match spawn_and_confirm(cmd, "test") {
            Err(LaunchError::SpawnFailed { program, .. }) => {
                assert_eq!(program, "/nonexistent/runner");
            }
            other => panic!("expected SpawnFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn clean_fast_exit_counts_as_started() {
        init_logs();
        let spec = LaunchSpec::new("/tmp/ignored");
        let mut cmd = build_command(Path::new("/bin/sh"), &["-c".into(), "exit 0".into()], &spec);
        cmd.stdout(Stdio::null());
        let child = spawn_and_confirm(cmd, "test").expect("clean exit should count as started");
        drop(child);
    }

    #[cfg(unix)]
    #[test]
    fn failing_fast_exit_is_a_spawn_failure() {
        init_logs();
        let spec = LaunchSpec::new("/tmp/ignored");
        let cmd = build_command(Path::new("/bin/sh"), &["-c".into(), "exit 3".into()], &spec);
        match spawn_and_confirm(cmd, "test") {
            Err(LaunchError::SpawnFailed { detail, .. }) => {
                assert!(detail.contains("during startup"), "detail: {detail}");
            }
            other => panic!("expected SpawnFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn long_lived_child_is_returned_alive() {
        init_logs();
        let spec = LaunchSpec::new("/tmp/ignored");
        let cmd = build_command(Path::new("/bin/sh"), &["-c".into(), "sleep 5".into()], &spec);
        let mut child = spawn_and_confirm(cmd, "test").expect("sleeping child should count");
        assert!(child.try_wait().expect("try_wait").is_none(), "child should still run");
        let _ = child.kill();
        let _ = child.wait();
    }

    #[cfg(unix)]
    #[test]
    fn env_override_wins_over_inherited() {
        // SAFETY: test process is single-purpose here, the var is unique
        unsafe { std::env::set_var("RUNLAYER_SPAWN_TEST", "inherited") };
        let spec = LaunchSpec::new("/tmp/ignored").with_env("RUNLAYER_SPAWN_TEST", "override");
        let cmd = build_command(
            Path::new("/bin/sh"),
            &[
                "-c".into(),
                "test \"$RUNLAYER_SPAWN_TEST\" = override".into(),
            ],
            &spec,
        );
        spawn_and_confirm(cmd, "test").expect("override must reach the child");
    }

    #[cfg(unix)]
    #[test]
    fn run_with_timeout_captures_output() {
        let out = run_with_timeout("/bin/sh", &["-c", "echo probe"], Duration::from_secs(2));
        assert_eq!(out.as_deref().map(str::trim), Some("probe"));
    }

    #[cfg(unix)]
    #[test]
    fn run_with_timeout_kills_stuck_probe() {
        init_logs();
        let started = Instant::now();
        let out = run_with_timeout("/bin/sh", &["-c", "sleep 10"], Duration::from_millis(200));
        assert!(out.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
