//! Interpreter version detection
//!
//! The CPython version is read off the mapped image's file name
//! (`python3.9`, `libpython2.7.so.1.0`, `libpython3.10d.so`). Everything
//! layout-dependent keys off this value; an unrecognized name means no
//! offsets can be trusted and the run fails before any structure is read.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PyVersion {
    pub major: u8,
    pub minor: u8,
}

impl PyVersion {
    #[must_use]
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for PyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parse `major.minor` out of a python image file name.
///
/// Returns `None` for names that are not a python executable or libpython
/// library, or that carry no minor version (`python3` alone is ambiguous).
#[must_use]
pub fn version_from_image_name(name: &str) -> Option<PyVersion> {
    let rest = name.strip_prefix("libpython").or_else(|| name.strip_prefix("python"))?;

    let mut parts = rest.splitn(2, '.');
    let major: u8 = parts.next()?.parse().ok()?;
    // The minor component may carry an ABI suffix ("10d", "9m") or further
    // shared-object version parts ("9.so.1.0").
    let minor_digits: String =
        parts.next()?.chars().take_while(char::is_ascii_digit).collect();
    let minor: u8 = minor_digits.parse().ok()?;

    Some(PyVersion { major, minor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_names() {
        assert_eq!(version_from_image_name("python2.7"), Some(PyVersion::new(2, 7)));
        assert_eq!(version_from_image_name("python3.9"), Some(PyVersion::new(3, 9)));
        assert_eq!(version_from_image_name("python3.10"), Some(PyVersion::new(3, 10)));
    }

    #[test]
    fn test_library_names() {
        assert_eq!(
            version_from_image_name("libpython2.7.so.1.0"),
            Some(PyVersion::new(2, 7))
        );
        assert_eq!(
            version_from_image_name("libpython3.8.so.1.0"),
            Some(PyVersion::new(3, 8))
        );
        assert_eq!(version_from_image_name("libpython3.10d.so"), Some(PyVersion::new(3, 10)));
        assert_eq!(version_from_image_name("libpython3.6m.so.1.0"), Some(PyVersion::new(3, 6)));
    }

    #[test]
    fn test_non_python_names() {
        assert_eq!(version_from_image_name("libc.so.6"), None);
        assert_eq!(version_from_image_name("python3"), None);
        assert_eq!(version_from_image_name("pythonista"), None);
        assert_eq!(version_from_image_name("perl5.36"), None);
    }
}
