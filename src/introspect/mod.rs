// ============================================================================
// File: src/introspect/mod.rs
// ----------------------------------------------------------------------------
// Executable header classification.
//
// Reads the first few bytes of a game binary to decide which platform and
// architecture it targets. Deliberately shallow: magic numbers and a couple
// of fixed-offset fields, no full ELF/PE/Mach-O parsing. Classification is
// infallible; anything unreadable or unrecognized is Unknown.
// ============================================================================

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::runners::{Architecture, Platform};

pub mod dos;

pub use dos::{is_dos_game_by_metadata, DOS_GENRE_KEYWORDS, KNOWN_DOS_TITLES};

/// Classify the platform a binary targets from its header magic.
///
/// `ELF` maps to Linux, `MZ` to Windows and the three Mach-O magics
/// (32-bit, 64-bit, universal) to macOS. When no magic matches, filename
/// extensions are consulted as a last resort (`.exe` means Windows, `.app`
/// means macOS). Unreadable or too-short files are `Unknown`; extension
/// heuristics only apply to readable binaries with an unrecognized header.
///
/// `MZ` covers both Windows PE and legacy DOS binaries; callers that need
/// the distinction refine the result with [`is_dos_executable`].
pub fn classify_platform(path: &Path) -> Platform {
    let mut header = [0u8; 4];
    if !read_exact_at_start(path, &mut header) {
        return Platform::Unknown;
    }

    if header == [0x7F, b'E', b'L', b'F'] {
        return Platform::Linux;
    }

    if header[0] == b'M' && header[1] == b'Z' {
        return Platform::Windows;
    }

    let magic = u32::from_be_bytes(header);
    if magic == 0xFEED_FACE || magic == 0xFEED_FACF || magic == 0xCAFE_BABE {
        return Platform::MacOS;
    }

    if has_extension(path, "exe") {
        debug!("{}: no known magic, classified Windows by extension", path.display());
        return Platform::Windows;
    }
    if has_extension(path, "app") {
        debug!("{}: no known magic, classified macOS by extension", path.display());
        return Platform::MacOS;
    }

    Platform::Unknown
}

/// Classify the CPU architecture a binary targets.
///
/// ELF uses the machine field at offset 18 (little-endian); 64-bit Mach-O
/// uses the CPU type at offset 4 (big-endian). `MZ` binaries always report
/// `X86_64`: deciding properly would need the COFF machine field, which
/// this classifier does not parse. Universal Mach-O binaries stay `Unknown`
/// since the header alone does not pick a slice.
pub fn classify_architecture(path: &Path) -> Architecture {
    let mut header = [0u8; 20];
    if !read_exact_at_start(path, &mut header) {
        return Architecture::Unknown;
    }

    if header[0..4] == [0x7F, b'E', b'L', b'F'] {
        // e_machine, little-endian u16
        let machine = u16::from_le_bytes([header[18], header[19]]);
        return match machine {
            0x3E => Architecture::X86_64,
            0x03 => Architecture::X86,
            0xB7 => Architecture::Arm64,
            0x28 => Architecture::Arm,
            other => {
                debug!("{}: unmapped ELF machine 0x{other:02X}", path.display());
                Architecture::Unknown
            }
        };
    }

    if header[0] == b'M' && header[1] == b'Z' {
        return Architecture::X86_64;
    }

    let magic = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    match magic {
        0xFEED_FACF => {
            // 64-bit Mach-O, CPU type in bytes 4..8 (big-endian)
            let cpu_type = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
            match cpu_type {
                0x0100_0007 => Architecture::X86_64,
                0x0100_000C => Architecture::Arm64,
                _ => Architecture::Unknown,
            }
        }
        0xFEED_FACE => Architecture::X86,
        // Universal binary: one header, several slices
        0xCAFE_BABE => Architecture::Unknown,
        _ => {
            if has_extension(path, "exe") {
                Architecture::X86_64
            } else {
                Architecture::Unknown
            }
        }
    }
}

/// Decide whether an `MZ` binary is a legacy DOS executable rather than a
/// Windows PE.
///
/// PE files store the offset of their `PE\0\0` signature as a little-endian
/// u32 at 0x3C; a plausible value (at least 64 and below 0x10000) marks a
/// real PE. Anything else, including files too short to carry the field,
/// counts as DOS. Non-`MZ` files are never DOS executables.
pub fn is_dos_executable(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };

    let mut magic = [0u8; 2];
    match file.read(&mut magic) {
        Ok(2) if magic == [b'M', b'Z'] => {}
        _ => return false,
    }

    if file.seek(SeekFrom::Start(0x3C)).is_err() {
        return true;
    }
    let mut offset_bytes = [0u8; 4];
    match file.read(&mut offset_bytes) {
        Ok(4) => {}
        // Too short to carry a PE offset, must be a tiny DOS binary
        _ => return true,
    }

    let pe_offset = u32::from_le_bytes(offset_bytes);
    !(64..0x10000).contains(&pe_offset)
}

/// Read exactly `buf.len()` bytes from the start of `path`.
///
/// Returns false on open errors and on files shorter than the buffer.
fn read_exact_at_start(path: &Path, buf: &mut [u8]) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };
    file.read_exact(buf).is_ok()
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
