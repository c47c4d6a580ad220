//! Library requirement resolution.
//!
//! This module turns a [`NativeLibraryRequirement`](crate::core::NativeLibraryRequirement)
//! into the binaries of the library it names. Resolution is pure: it reads
//! the workspace model and never touches the filesystem.

pub mod chain;
pub mod errors;
pub mod locator;
pub mod prebuilt;

pub use chain::{ChainPolicy, LocatorChain};
pub use errors::LocateError;
pub use locator::{LibraryBinaryLocator, ProjectLibraryLocator};
pub use prebuilt::PrebuiltLibraryLocator;
