// ============================================================================
// File: src/runners/dosbox/supervisor.rs
// ----------------------------------------------------------------------------
// Lifecycle supervision for DOSBox-family processes.
//
// DOSBox sessions can outlive the client across restarts, so ownership via
// child handles is not enough: every operation re-derives state from the OS
// process table instead of caching it. Termination is two-phase, graceful
// first so sessions get a chance to save, forced for whatever survives.
// ============================================================================

use std::thread;
use std::time::Duration;

use log::{error, info, warn};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

use crate::runners::spawn::{run_with_timeout, POLL_INTERVAL};

/// Process-table pattern that identifies DOSBox sessions.
const PROCESS_PATTERN: &str = "dosbox";

/// Sessions older than this probably hold unsaved game state.
const UNSAVED_PROGRESS_UPTIME_SECS: i64 = 30;

/// Grace period after SIGKILL before confirming the process is gone.
const FORCE_KILL_GRACE: Duration = Duration::from_millis(500);

const PGREP_TIMEOUT: Duration = Duration::from_secs(5);
const PS_TIMEOUT: Duration = Duration::from_secs(2);

/// Scan the process table for running DOSBox sessions.
pub fn find_running() -> Vec<u32> {
    let pids = find_matching(PROCESS_PATTERN);
    info!("found {} DOSBox processes", pids.len());
    pids
}

/// All pids whose command line matches `pattern` (`pgrep -f`).
pub(crate) fn find_matching(pattern: &str) -> Vec<u32> {
    let Some(output) = run_with_timeout("pgrep", &["-f", pattern], PGREP_TIMEOUT) else {
        return Vec::new();
    };
    output
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .collect()
}

/// Elapsed run time of a process in seconds, -1 when it cannot be found.
pub fn uptime_seconds(pid: u32) -> i64 {
    if pid == 0 {
        return -1;
    }
    let pid_arg = pid.to_string();
    let Some(output) = run_with_timeout("ps", &["-p", &pid_arg, "-o", "etime="], PS_TIMEOUT)
    else {
        return -1;
    };
    parse_etime(&output).unwrap_or(-1)
}

/// Parse `ps` elapsed-time output of the form `[[dd-]hh:]mm:ss`.
fn parse_etime(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (days, clock) = match raw.split_once('-') {
        Some((d, rest)) => (d.parse::<i64>().ok()?, rest),
        None => (0, raw),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, m.parse::<i64>().ok()?, s.parse::<i64>().ok()?),
        [h, m, s] => (
            h.parse::<i64>().ok()?,
            m.parse::<i64>().ok()?,
            s.parse::<i64>().ok()?,
        ),
        _ => return None,
    };

    Some(days * 86_400 + hours * 3_600 + minutes * 60 + seconds)
}

/// Whether a session has run long enough that terminating it may lose
/// unsaved state. Only ever used to log a warning, never to block.
pub fn likely_has_unsaved_progress(pid: u32) -> bool {
    uptime_seconds(pid) > UNSAVED_PROGRESS_UPTIME_SECS
}

/// Signal-0 existence probe. A process owned by someone else (EPERM)
/// still counts as running.
pub fn is_running(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    match signal::kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Ask a process to exit via SIGTERM and poll until it does or the timeout
/// elapses. False signals the caller to escalate.
pub fn graceful_terminate(pid: u32, timeout_ms: u64) -> bool {
    if pid == 0 {
        return false;
    }

    info!("gracefully terminating DOSBox process {pid}");
    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        error!("failed to send SIGTERM to {pid}: {e}");
        return false;
    }

    let mut elapsed = Duration::ZERO;
    let timeout = Duration::from_millis(timeout_ms);
    while elapsed < timeout {
        if !is_running(pid) {
            info!("process {pid} terminated gracefully");
            return true;
        }
        thread::sleep(POLL_INTERVAL);
        elapsed += POLL_INTERVAL;
    }

    warn!("process {pid} did not terminate within {timeout_ms}ms");
    false
}

/// SIGKILL a process, wait a short grace period, then confirm it is gone.
pub fn force_kill(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }

    warn!("force killing DOSBox process {pid}");
    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        error!("failed to send SIGKILL to {pid}: {e}");
        return false;
    }

    thread::sleep(FORCE_KILL_GRACE);
    if !is_running(pid) {
        info!("process {pid} force killed");
        return true;
    }
    false
}

/// Two-phase sweep over an explicit pid set: every graceful attempt
/// completes before any forced kill, so all sessions get their chance to
/// save before the hammer comes down. Returns how many pids were stopped
/// by either phase.
pub fn terminate_pids(pids: &[u32], timeout_ms: u64) -> usize {
    let mut terminated = 0;

    for &pid in pids {
        if likely_has_unsaved_progress(pid) {
            warn!(
                "DOSBox process {pid} may have unsaved progress (uptime: {}s)",
                uptime_seconds(pid)
            );
        }
    }

    for &pid in pids {
        if graceful_terminate(pid, timeout_ms) {
            terminated += 1;
        }
    }

    for &pid in pids {
        if is_running(pid) && force_kill(pid) {
            terminated += 1;
        }
    }

    terminated
}

/// Find and stop every running DOSBox session.
pub fn terminate_all(timeout_ms: u64) -> usize {
    let pids = find_running();
    if pids.is_empty() {
        return 0;
    }
    info!("terminating {} DOSBox processes", pids.len());
    let terminated = terminate_pids(&pids, timeout_ms);
    info!("terminated {terminated} DOSBox processes");
    terminated
}
