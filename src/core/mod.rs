//! Core data structures for Slipway.
//!
//! This module contains the build model:
//! - Named, polymorphically typed registries
//! - Native libraries and the binaries they own
//! - Build units, their extensions, and the lookups over them
//! - Library requirements
//! - Workspaces and manifests

use std::fmt;

pub mod binary;
pub mod library;
pub mod manifest;
pub mod registry;
pub mod repository;
pub mod requirement;
pub mod unit;
pub mod workspace;

pub use binary::{BinaryKind, BinarySet, BuildType, NativeBinary, Platform};
pub use library::{
    HeaderOnlyLibrary, LibraryRegistry, Linkage, NativeLibrary, PrebuiltLibrary, SharedLibrary,
    StaticLibrary,
};
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use registry::{DomainObject, NamedTypedRegistry, RegistryError, Subtype, TypeDescriptor};
pub use repository::{PrebuiltRepository, RepositoryRegistry};
pub use requirement::NativeLibraryRequirement;
pub use unit::{
    BuildUnit, BuildUnitLookup, ExtensionContainer, ExtensionLookup, ExtensionRef,
    UnitExtensions, UnitLookupError, UnitPath, UnitPathError,
};
pub use workspace::{Workspace, LIBRARIES_EXTENSION};

/// Externally observable failure category shared by every error in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A precondition the caller could have checked (duplicate name, malformed path).
    InvalidInput,
    /// No construction strategy is registered for the requested type.
    UnsupportedType,
    /// A build unit exists but is not set up for the requested registry.
    Configuration,
    /// A named lookup failed inside an otherwise well-formed structure.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidInput => write!(f, "invalid input"),
            ErrorKind::UnsupportedType => write!(f, "unsupported type"),
            ErrorKind::Configuration => write!(f, "configuration error"),
            ErrorKind::NotFound => write!(f, "not found"),
        }
    }
}
