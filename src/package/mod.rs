//! Package descriptor files on disk.
//!
//! This module finds descriptor sources under a directory tree and loads
//! them, whatever form they take (flat listing, `setup.py`, core metadata
//! or a distribution archive).

mod discovery;
mod loader;

pub use discovery::find_descriptor_files;
pub use loader::{load_descriptor, load_entry_module};
