pub mod archive;
pub mod commands;
pub mod descriptor;
pub mod entry;
pub mod package;
pub mod runtime;
mod syntax;

pub use descriptor::{
    Descriptor, DescriptorError, EntryPointGroup, parse_descriptor, render_descriptor,
};

/// Test utilities for cross-platform path handling.
#[cfg(test)]
pub mod test_utils {
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    /// Returns a test home directory path based on the platform.
    /// - Unix: `/home/user`
    /// - Windows: `C:\Users\user`
    pub fn test_home() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user")
        }
    }

    /// Configure a mock runtime with common defaults for tests.
    /// - current_dir set to [`test_home`]
    pub fn configure_mock_runtime_basics(runtime: &mut MockRuntime) {
        runtime.expect_current_dir().returning(|| Ok(test_home()));
    }
}
