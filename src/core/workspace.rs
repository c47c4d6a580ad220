//! Workspace - the host-side collection of build units.
//!
//! A Workspace owns every build unit of a build plus the prebuilt
//! repositories, and is the default [`BuildUnitLookup`].

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::core::library::LibraryRegistry;
use crate::core::registry::RegistryError;
use crate::core::repository::RepositoryRegistry;
use crate::core::unit::{BuildUnit, BuildUnitLookup, UnitLookupError, UnitPath};

/// Name of the extension that holds a unit's libraries.
pub const LIBRARIES_EXTENSION: &str = "libraries";

/// All build units of a build, keyed by path in declaration order.
#[derive(Debug)]
pub struct Workspace {
    /// Workspace root directory
    root: PathBuf,

    units: IndexMap<UnitPath, BuildUnit>,

    repositories: RepositoryRegistry,
}

impl Workspace {
    /// Create an empty workspace rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace {
            root: root.into(),
            units: IndexMap::new(),
            repositories: RepositoryRegistry::repositories(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a unit at `path`, placed in its conventional directory under the
    /// workspace root.
    pub fn add_unit(&mut self, path: UnitPath) -> Result<&mut BuildUnit, RegistryError> {
        let dir = self.root.join(path.to_relative_dir());
        self.add_unit_in(path, dir)
    }

    /// Add a unit at `path` rooted at an explicit directory.
    pub fn add_unit_in(
        &mut self,
        path: UnitPath,
        dir: impl Into<PathBuf>,
    ) -> Result<&mut BuildUnit, RegistryError> {
        if self.units.contains_key(&path) {
            return Err(RegistryError::DuplicateName {
                element: "build unit",
                name: path.to_string(),
            });
        }
        tracing::debug!(unit = %path, "added build unit");
        let unit = BuildUnit::new(path.clone(), dir);
        Ok(self.units.entry(path).or_insert(unit))
    }

    /// Add a unit that carries an empty `libraries` registry.
    pub fn add_native_unit(&mut self, path: UnitPath) -> Result<&mut BuildUnit, RegistryError> {
        let unit = self.add_unit(path)?;
        unit.extensions_mut()
            .add(LIBRARIES_EXTENSION, LibraryRegistry::for_unit())?;
        Ok(unit)
    }

    pub fn unit(&self, path: &UnitPath) -> Option<&BuildUnit> {
        self.units.get(path)
    }

    /// All units in declaration order.
    pub fn units(&self) -> impl Iterator<Item = &BuildUnit> + '_ {
        self.units.values()
    }

    /// The unit's library registry, if it has one.
    pub fn libraries(&self, path: &UnitPath) -> Option<&LibraryRegistry> {
        self.units
            .get(path)
            .and_then(|unit| unit.extensions().get::<LibraryRegistry>(LIBRARIES_EXTENSION))
    }

    pub fn libraries_mut(&mut self, path: &UnitPath) -> Option<&mut LibraryRegistry> {
        self.units
            .get_mut(path)
            .and_then(|unit| unit.extensions_mut().get_mut::<LibraryRegistry>(LIBRARIES_EXTENSION))
    }

    pub fn repositories(&self) -> &RepositoryRegistry {
        &self.repositories
    }

    pub fn repositories_mut(&mut self) -> &mut RepositoryRegistry {
        &mut self.repositories
    }
}

impl BuildUnitLookup for Workspace {
    fn resolve(&self, path: &str) -> Result<&BuildUnit, UnitLookupError> {
        let path = UnitPath::parse(path)?;
        self.units
            .get(&path)
            .ok_or_else(|| UnitLookupError::NotFound {
                path: path.to_string(),
                known: self.units.keys().map(UnitPath::to_string).collect(),
            })
    }
}
