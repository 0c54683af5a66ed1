//! Mapped interpreter image discovery
//!
//! Scans `/proc/<pid>/maps` for the python executable or a libpython shared
//! library, recording the lowest mapped address of the image. That base is
//! what symbol virtual addresses are rebased against for
//! position-independent images.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::domain::{Pid, RemoteAddress, TraceError};

use super::version::{version_from_image_name, PyVersion};

/// A python image mapped into the tracee.
#[derive(Debug, Clone)]
pub struct InterpreterImage {
    /// Lowest start address among the image's mappings.
    pub base: RemoteAddress,
    /// Host path of the mapped file, usable for local symbol lookup.
    pub path: PathBuf,
    pub version: PyVersion,
}

/// Find the interpreter image mapped into process `pid`.
///
/// # Errors
/// - [`TraceError::Io`] if the maps file is unreadable
/// - [`TraceError::InterpreterNotFound`] if no python image is mapped
pub fn find_interpreter_image(pid: Pid) -> Result<InterpreterImage, TraceError> {
    let maps = fs::read_to_string(format!("/proc/{pid}/maps"))?;
    let image = parse_interpreter_image(&maps).ok_or(TraceError::InterpreterNotFound(pid))?;
    debug!("interpreter image {} mapped at {}", image.path.display(), image.base);
    Ok(image)
}

/// Pick the interpreter image out of maps content.
///
/// When both the python executable and a libpython library are mapped, the
/// library wins: in shared builds the executable is a thin wrapper and the
/// runtime symbols live in the library.
#[must_use]
pub fn parse_interpreter_image(maps: &str) -> Option<InterpreterImage> {
    let mut candidates: Vec<InterpreterImage> = Vec::new();

    for line in maps.lines() {
        // "start-end perms offset dev inode pathname"
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            continue;
        }
        let path = parts[5];
        let Some(name) = Path::new(path).file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(version) = version_from_image_name(name) else {
            continue;
        };
        let Some(start) = parts[0]
            .split('-')
            .next()
            .and_then(|s| u64::from_str_radix(s, 16).ok())
        else {
            continue;
        };

        match candidates.iter_mut().find(|c| c.path == Path::new(path)) {
            Some(existing) => existing.base = RemoteAddress(existing.base.0.min(start)),
            None => candidates.push(InterpreterImage {
                base: RemoteAddress(start),
                path: PathBuf::from(path),
                version,
            }),
        }
    }

    candidates
        .iter()
        .find(|c| is_libpython(&c.path))
        .or_else(|| candidates.first())
        .cloned()
}

fn is_libpython(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("libpython"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPS: &str = "\
00400000-00401000 r-xp 00000000 08:01 131 /usr/bin/python3.9
00600000-00601000 r--p 00000000 08:01 131 /usr/bin/python3.9
7f2a10000000-7f2a10200000 r-xp 00000000 08:01 200 /usr/lib/x86_64-linux-gnu/libpython3.9.so.1.0
7f2a0fe00000-7f2a10000000 r--p 00000000 08:01 200 /usr/lib/x86_64-linux-gnu/libpython3.9.so.1.0
7f2a10300000-7f2a10400000 r-xp 00000000 08:01 77 /usr/lib/x86_64-linux-gnu/libc.so.6
7f2a10500000-7f2a10501000 rw-p 00000000 00:00 0
";

    #[test]
    fn test_prefers_libpython_over_executable() {
        let image = parse_interpreter_image(MAPS).expect("image");
        assert!(is_libpython(&image.path));
        assert_eq!(image.version, PyVersion::new(3, 9));
        // Lowest start of all libpython mappings, not the first seen.
        assert_eq!(image.base, RemoteAddress(0x7f2a_0fe0_0000));
    }

    #[test]
    fn test_executable_only_build() {
        let maps = "\
00400000-00800000 r-xp 00000000 08:01 55 /usr/local/bin/python2.7
7f0000000000-7f0000100000 r-xp 00000000 08:01 77 /lib/libc.so.6
";
        let image = parse_interpreter_image(maps).expect("image");
        assert_eq!(image.path, Path::new("/usr/local/bin/python2.7"));
        assert_eq!(image.version, PyVersion::new(2, 7));
        assert_eq!(image.base, RemoteAddress(0x0040_0000));
    }

    #[test]
    fn test_no_interpreter_mapped() {
        let maps = "7f0000000000-7f0000100000 r-xp 00000000 08:01 77 /lib/libc.so.6\n";
        assert!(parse_interpreter_image(maps).is_none());
    }
}
