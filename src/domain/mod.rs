//! Domain logic - version values and their ordering, independent of any I/O

pub mod prerelease;
pub mod version;

pub use prerelease::{PreRelease, PreReleaseKind};
pub use version::Version;
