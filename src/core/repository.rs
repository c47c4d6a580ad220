//! Prebuilt library repositories.
//!
//! A repository is a named source of libraries that are not built by any
//! unit of the workspace, e.g. vendored SDKs. Repositories are kept in a
//! [`NamedTypedRegistry`] whose base type is the repository itself.

use crate::core::library::LibraryRegistry;
use crate::core::registry::{NamedTypedRegistry, Subtype};

/// A named collection of prebuilt libraries.
#[derive(Debug)]
pub struct PrebuiltRepository {
    libraries: LibraryRegistry,
}

impl PrebuiltRepository {
    pub fn new() -> Self {
        PrebuiltRepository {
            libraries: LibraryRegistry::prebuilt(),
        }
    }

    pub fn libraries(&self) -> &LibraryRegistry {
        &self.libraries
    }

    pub fn libraries_mut(&mut self) -> &mut LibraryRegistry {
        &mut self.libraries
    }
}

impl Default for PrebuiltRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Subtype<PrebuiltRepository> for PrebuiltRepository {
    fn upcast(self: Box<Self>) -> Box<PrebuiltRepository> {
        self
    }
}

/// Registry of prebuilt repositories, searched in declaration order.
pub type RepositoryRegistry = NamedTypedRegistry<PrebuiltRepository>;

impl NamedTypedRegistry<PrebuiltRepository> {
    pub fn repositories() -> Self {
        NamedTypedRegistry::new("repository").with_factory(PrebuiltRepository::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::PrebuiltLibrary;

    #[test]
    fn test_repository_registry_accepts_base_type() {
        let mut repositories = RepositoryRegistry::repositories();
        repositories
            .create_with::<PrebuiltRepository, _>("vendor", |repo| {
                repo.libraries_mut()
                    .create::<PrebuiltLibrary>("zlib")
                    .unwrap();
            })
            .unwrap();

        let vendor = repositories.get_by_name("vendor").unwrap();
        assert!(vendor.libraries().contains("zlib"));
        assert!(repositories.create::<PrebuiltRepository>("vendor").is_err());
    }
}
