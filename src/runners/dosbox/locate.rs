use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::introspect::is_dos_executable;

/// Filename fragments that mark setup/installer executables.
const INSTALLER_PATTERNS: &[&str] = &["setup", "install", "uninstall", "patch", "update"];

/// Extensions DOSBox can start.
const SEARCH_EXTENSIONS: &[&str] = &["exe", "com", "bat"];

/// Find the game executable inside an install directory.
///
/// GOG ships DOS titles as directory trees, sometimes buried in a Wine or
/// Proton prefix, so the search covers the directory itself plus the usual
/// prefix locations. Candidates are ordered largest-first, then picked in
/// passes: a non-installer DOS executable, any DOS executable, the largest
/// non-installer, and as a last resort the largest file at all.
pub(crate) fn locate_dos_executable(install_dir: &Path) -> Option<PathBuf> {
    let search_roots = [
        install_dir.to_path_buf(),
        install_dir.join(".wine/drive_c"),
        install_dir.join(".proton/pfx/drive_c"),
    ];

    let mut candidates = Vec::new();
    for root in &search_roots {
        if !root.is_dir() {
            info!("search path does not exist: {}", root.display());
            continue;
        }
        info!("searching for executables in: {}", root.display());
        candidates = collect_executables(root);
        if !candidates.is_empty() {
            info!("found {} executable files in: {}", candidates.len(), root.display());
            break;
        }
    }

    if candidates.is_empty() {
        return None;
    }

    for path in &candidates {
        if !is_installer_name(path) && is_dos_executable(path) {
            info!("found DOS executable (non-installer): {}", path.display());
            return Some(path.clone());
        }
    }

    for path in &candidates {
        if is_dos_executable(path) {
            info!("found DOS executable: {}", path.display());
            return Some(path.clone());
        }
    }

    for path in &candidates {
        if !is_installer_name(path) {
            warn!("using largest non-installer file: {}", path.display());
            return Some(path.clone());
        }
    }

    let fallback = candidates.first().cloned();
    if let Some(path) = &fallback {
        warn!("no suitable executable found, using largest file: {}", path.display());
    }
    fallback
}

/// Recursively collect `*.exe`/`*.com`/`*.bat` files, largest first.
/// Symlinked directories are not followed.
fn collect_executables(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<(PathBuf, u64)> = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() && has_search_extension(&path) {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                files.push((path, size));
            }
        }
    }

    files.sort_by(|a, b| b.1.cmp(&a.1));
    files.into_iter().map(|(path, _)| path).collect()
}

fn has_search_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            SEARCH_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}

fn is_installer_name(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy().to_lowercase();
    INSTALLER_PATTERNS.iter().any(|p| name.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    /// An MZ image with a chosen PE-offset field, padded to a chosen size.
    fn mz_bytes(pe_offset: u32, total_len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; total_len.max(0x40)];
        bytes[0] = b'M';
        bytes[1] = b'Z';
        bytes[0x3C..0x40].copy_from_slice(&pe_offset.to_le_bytes());
        bytes
    }

    #[test]
    fn prefers_non_installer_dos_executable() {
        let dir = TempDir::new().unwrap();
        // The installer is bigger, the game must still win
        dir.child("SETUP.EXE").write_binary(&mz_bytes(0, 9000)).unwrap();
        dir.child("GAME.EXE").write_binary(&mz_bytes(0, 4000)).unwrap();

        let found = locate_dos_executable(dir.path()).expect("executable");
        assert_eq!(found.file_name().unwrap(), "GAME.EXE");
    }

    #[test]
    fn falls_back_to_installer_when_nothing_else_is_dos() {
        let dir = TempDir::new().unwrap();
        dir.child("INSTALL.EXE").write_binary(&mz_bytes(0, 5000)).unwrap();
        // A Windows PE, not DOS
        dir.child("launcher.exe").write_binary(&mz_bytes(128, 8000)).unwrap();

        let found = locate_dos_executable(dir.path()).expect("executable");
        assert_eq!(found.file_name().unwrap(), "INSTALL.EXE");
    }

    #[test]
    fn falls_back_to_largest_non_installer() {
        let dir = TempDir::new().unwrap();
        // No DOS executables anywhere
        dir.child("game.exe").write_binary(&mz_bytes(128, 7000)).unwrap();
        dir.child("setup.exe").write_binary(&mz_bytes(128, 9000)).unwrap();

        let found = locate_dos_executable(dir.path()).expect("executable");
        assert_eq!(found.file_name().unwrap(), "game.exe");
    }

    #[test]
    fn searches_wine_prefix_when_top_level_is_bare() {
        let dir = TempDir::new().unwrap();
        dir.child("gog-metadata.json").write_str("{}").unwrap();
        dir.child(".wine/drive_c/GOG Games/Foo/FOO.EXE")
            .write_binary(&mz_bytes(0, 3000))
            .unwrap();

        let found = locate_dos_executable(dir.path()).expect("executable");
        assert_eq!(found.file_name().unwrap(), "FOO.EXE");
    }

    #[test]
    fn recurses_into_subdirectories() {
        let dir = TempDir::new().unwrap();
        dir.child("data/bin/KEEN.EXE").write_binary(&mz_bytes(0, 2000)).unwrap();

        let found = locate_dos_executable(dir.path()).expect("executable");
        assert_eq!(found.file_name().unwrap(), "KEEN.EXE");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        dir.child("game.CoM").write_binary(&mz_bytes(0, 1000)).unwrap();

        assert!(locate_dos_executable(dir.path()).is_some());
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(locate_dos_executable(dir.path()).is_none());
        assert!(locate_dos_executable(Path::new("/nonexistent/install")).is_none());
    }
}
