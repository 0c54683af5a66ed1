//! Locating the interpreter inside the tracee
//!
//! - `maps`: find the mapped python/libpython image via /proc/pid/maps
//! - `version`: detect the interpreter version from the image name
//! - `layout`: version-keyed struct offset tables
//! - `locator`: resolve the live thread-state record's address

pub mod layout;
pub mod locator;
pub mod maps;
pub mod version;

pub use layout::{layout_for, PyLayout, ThreadStateAccess};
pub use locator::{locate, InterpreterInfo};
pub use maps::InterpreterImage;
pub use version::PyVersion;
