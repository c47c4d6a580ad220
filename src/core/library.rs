//! Native libraries and the registry that holds them.
//!
//! A library is a named component of a build unit that owns a set of
//! binaries. Libraries come in several concrete kinds behind the
//! [`NativeLibrary`] trait; a [`LibraryRegistry`] decides which kinds it
//! can create.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::binary::{BinaryKind, BinarySet};
use crate::core::registry::{DomainObject, NamedTypedRegistry, Subtype};
use crate::core::requirement::NativeLibraryRequirement;

/// How a library is linked into its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Linkage {
    Static,
    Shared,
    /// Headers only; nothing to link
    #[serde(alias = "interface")]
    HeaderOnly,
}

impl Linkage {
    /// The kind of binary a library with this linkage produces, if any.
    pub fn binary_kind(&self) -> Option<BinaryKind> {
        match self {
            Linkage::Static => Some(BinaryKind::StaticLib),
            Linkage::Shared => Some(BinaryKind::SharedLib),
            Linkage::HeaderOnly => None,
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::Static => write!(f, "static"),
            Linkage::Shared => write!(f, "shared"),
            Linkage::HeaderOnly => write!(f, "header-only"),
        }
    }
}

/// State every library kind carries.
#[derive(Debug, Clone, Default)]
pub struct LibraryDetails {
    /// Binaries owned by the library
    pub binaries: BinarySet,

    /// Other libraries this one links against
    pub requirements: Vec<NativeLibraryRequirement>,

    /// Public header directories
    pub headers: Vec<PathBuf>,
}

/// Base type of everything a [`LibraryRegistry`] holds.
pub trait NativeLibrary: DomainObject + fmt::Debug + Send + Sync {
    fn linkage(&self) -> Linkage;

    fn details(&self) -> &LibraryDetails;

    fn details_mut(&mut self) -> &mut LibraryDetails;

    /// The binaries this library owns.
    fn binaries(&self) -> &BinarySet {
        &self.details().binaries
    }

    fn binaries_mut(&mut self) -> &mut BinarySet {
        &mut self.details_mut().binaries
    }

    fn requirements(&self) -> &[NativeLibraryRequirement] {
        &self.details().requirements
    }

    fn requirements_mut(&mut self) -> &mut Vec<NativeLibraryRequirement> {
        &mut self.details_mut().requirements
    }

    fn headers(&self) -> &[PathBuf] {
        &self.details().headers
    }

    fn headers_mut(&mut self) -> &mut Vec<PathBuf> {
        &mut self.details_mut().headers
    }
}

impl<T: NativeLibrary> Subtype<dyn NativeLibrary> for T {
    fn upcast(self: Box<Self>) -> Box<dyn NativeLibrary> {
        self
    }
}

/// A library archived into a static binary.
#[derive(Debug, Clone, Default)]
pub struct StaticLibrary {
    details: LibraryDetails,
}

impl NativeLibrary for StaticLibrary {
    fn linkage(&self) -> Linkage {
        Linkage::Static
    }

    fn details(&self) -> &LibraryDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut LibraryDetails {
        &mut self.details
    }
}

/// A library linked into a shared binary.
#[derive(Debug, Clone, Default)]
pub struct SharedLibrary {
    details: LibraryDetails,

    /// Shared object name recorded in the binary (`-Wl,-soname`)
    pub soname: Option<String>,
}

impl NativeLibrary for SharedLibrary {
    fn linkage(&self) -> Linkage {
        Linkage::Shared
    }

    fn details(&self) -> &LibraryDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut LibraryDetails {
        &mut self.details
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeaderOnlyLibrary {
    details: LibraryDetails,
}

impl NativeLibrary for HeaderOnlyLibrary {
    fn linkage(&self) -> Linkage {
        Linkage::HeaderOnly
    }

    fn details(&self) -> &LibraryDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut LibraryDetails {
        &mut self.details
    }
}

/// A library whose binaries already exist on disk.
#[derive(Debug, Clone)]
pub struct PrebuiltLibrary {
    details: LibraryDetails,

    pub linkage: Linkage,

    /// Root directory of the prebuilt files
    pub location: PathBuf,
}

impl Default for PrebuiltLibrary {
    fn default() -> Self {
        PrebuiltLibrary {
            details: LibraryDetails::default(),
            linkage: Linkage::Shared,
            location: PathBuf::new(),
        }
    }
}

impl NativeLibrary for PrebuiltLibrary {
    fn linkage(&self) -> Linkage {
        self.linkage
    }

    fn details(&self) -> &LibraryDetails {
        &self.details
    }

    fn details_mut(&mut self) -> &mut LibraryDetails {
        &mut self.details
    }
}

/// Registry of native libraries.
pub type LibraryRegistry = NamedTypedRegistry<dyn NativeLibrary>;

impl NamedTypedRegistry<dyn NativeLibrary> {
    /// Registry for the libraries a build unit builds itself.
    pub fn for_unit() -> Self {
        NamedTypedRegistry::new("library")
            .with_factory(StaticLibrary::default)
            .with_factory(SharedLibrary::default)
            .with_factory(HeaderOnlyLibrary::default)
    }

    /// Registry for libraries that are shipped already built.
    pub fn prebuilt() -> Self {
        NamedTypedRegistry::new("prebuilt library").with_factory(PrebuiltLibrary::default)
    }
}
