//! Locator over prebuilt repositories.

use crate::core::{BinarySet, NativeLibraryRequirement, RepositoryRegistry};
use crate::resolver::errors::LocateError;
use crate::resolver::locator::LibraryBinaryLocator;

/// Finds a required library by name in the prebuilt repositories, searched
/// in declaration order. The requirement's unit path is not consulted.
#[derive(Debug, Clone, Copy)]
pub struct PrebuiltLibraryLocator<'a> {
    repositories: &'a RepositoryRegistry,
}

impl<'a> PrebuiltLibraryLocator<'a> {
    pub fn new(repositories: &'a RepositoryRegistry) -> Self {
        PrebuiltLibraryLocator { repositories }
    }
}

impl LibraryBinaryLocator for PrebuiltLibraryLocator<'_> {
    fn name(&self) -> &str {
        "prebuilt"
    }

    fn binaries(&self, requirement: &NativeLibraryRequirement) -> Result<BinarySet, LocateError> {
        let library_name = requirement.library_name();

        for (repository, repo) in self.repositories.iter() {
            if let Some(library) = repo.libraries().find_by_name(library_name) {
                tracing::debug!(
                    repository,
                    library = library_name,
                    binaries = library.binaries().len(),
                    "located prebuilt library"
                );
                return Ok(library.binaries().clone());
            }
            tracing::trace!(repository, library = library_name, "not in repository");
        }

        Err(LocateError::PrebuiltNotFound {
            library: library_name.to_string(),
            searched: self.repositories.names().map(String::from).collect(),
        })
    }
}
