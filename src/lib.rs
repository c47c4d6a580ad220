//! Slipway - native library resolution for multi-unit builds
//!
//! This crate provides the build model (named, typed registries of native
//! libraries hung off build units) and the locators that turn a library
//! requirement into the binaries that satisfy it.
//!
//! ```
//! use slipway::core::{NativeLibraryRequirement, StaticLibrary, UnitPath, Workspace};
//! use slipway::resolver::{LibraryBinaryLocator, ProjectLibraryLocator};
//!
//! let mut ws = Workspace::new("/ws");
//! let app = UnitPath::parse(":app").unwrap();
//! ws.add_native_unit(app.clone()).unwrap();
//! ws.libraries_mut(&app).unwrap().create::<StaticLibrary>("core").unwrap();
//!
//! let locator = ProjectLibraryLocator::new(&ws);
//! let binaries = locator
//!     .binaries(&NativeLibraryRequirement::new(":app", "core"))
//!     .unwrap();
//! assert!(binaries.is_empty());
//! ```

pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test fixtures and instrumented lookups for Slipway unit tests.
///
/// Only available when compiling tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    BinarySet, ErrorKind, LibraryRegistry, Manifest, NamedTypedRegistry, NativeBinary,
    NativeLibrary, NativeLibraryRequirement, Workspace,
};
pub use resolver::{LibraryBinaryLocator, LocateError, LocatorChain, ProjectLibraryLocator};
pub use util::context::GlobalContext;
