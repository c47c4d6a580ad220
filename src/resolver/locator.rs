//! Library binary locators.
//!
//! A locator turns a [`NativeLibraryRequirement`] into the [`BinarySet`] of
//! the library it names. The project locator answers for libraries declared
//! by build units of the workspace; other locators (prebuilt repositories)
//! are combined with it in a [`LocatorChain`](super::LocatorChain).

use crate::core::{
    BinarySet, BuildUnit, BuildUnitLookup, ExtensionLookup, LibraryRegistry,
    NativeLibraryRequirement, UnitExtensions, LIBRARIES_EXTENSION,
};
use crate::resolver::errors::LocateError;

/// Strategy for finding the binaries of a required library.
pub trait LibraryBinaryLocator {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Find the binaries of the required library.
    ///
    /// An empty set is a valid answer (e.g. header-only libraries).
    fn binaries(&self, requirement: &NativeLibraryRequirement) -> Result<BinarySet, LocateError>;
}

impl<T: LibraryBinaryLocator + ?Sized> LibraryBinaryLocator for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn binaries(&self, requirement: &NativeLibraryRequirement) -> Result<BinarySet, LocateError> {
        (**self).binaries(requirement)
    }
}

impl<T: LibraryBinaryLocator + ?Sized> LibraryBinaryLocator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn binaries(&self, requirement: &NativeLibraryRequirement) -> Result<BinarySet, LocateError> {
        (**self).binaries(requirement)
    }
}

/// Resolves requirements against the `libraries` registry of the required
/// build unit.
///
/// Holds no state between calls: every resolution looks the unit up again,
/// so later changes to the unit's libraries are always observed.
#[derive(Debug, Clone)]
pub struct ProjectLibraryLocator<L, E = UnitExtensions> {
    units: L,
    extensions: E,
}

impl<L: BuildUnitLookup> ProjectLibraryLocator<L> {
    /// Locator reading extensions directly from each unit.
    pub fn new(units: L) -> Self {
        ProjectLibraryLocator {
            units,
            extensions: UnitExtensions,
        }
    }
}

impl<L: BuildUnitLookup, E: ExtensionLookup> ProjectLibraryLocator<L, E> {
    pub fn with_extensions(units: L, extensions: E) -> Self {
        ProjectLibraryLocator { units, extensions }
    }

    /// The unit's library registry.
    fn library_registry<'u>(&self, unit: &'u BuildUnit) -> Result<&'u LibraryRegistry, LocateError> {
        let extension = self
            .extensions
            .find_by_name(unit, LIBRARIES_EXTENSION)
            .ok_or_else(|| LocateError::MissingLibraries {
                path: unit.path().to_string(),
            })?;

        extension
            .downcast_ref::<LibraryRegistry>()
            .ok_or_else(|| LocateError::NotALibraryRegistry {
                path: unit.path().to_string(),
                found: extension.type_name(),
            })
    }
}

impl<L: BuildUnitLookup, E: ExtensionLookup> LibraryBinaryLocator for ProjectLibraryLocator<L, E> {
    fn name(&self) -> &str {
        "project"
    }

    fn binaries(&self, requirement: &NativeLibraryRequirement) -> Result<BinarySet, LocateError> {
        let unit = self.units.resolve(requirement.unit_path())?;
        let libraries = self.library_registry(unit)?;

        let library = libraries
            .get_by_name(requirement.library_name())
            .map_err(|source| LocateError::Library {
                path: unit.path().to_string(),
                library: requirement.library_name().to_string(),
                source,
            })?;

        tracing::debug!(
            unit = %unit.path(),
            library = requirement.library_name(),
            linkage = %library.linkage(),
            binaries = library.binaries().len(),
            "located project library"
        );

        Ok(library.binaries().clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{BuildType, ErrorKind, NativeLibrary, SharedLibrary, StaticLibrary, Workspace};
    use crate::test_support::{
        app_workspace, binary, path, unit_libraries, CountingLookup, PrefixedExtensions,
    };

    fn req(unit: &str, library: &str) -> NativeLibraryRequirement {
        NativeLibraryRequirement::new(unit, library)
    }

    #[test]
    fn test_returns_the_librarys_binaries() {
        let ws = app_workspace();
        let locator = ProjectLibraryLocator::new(&ws);

        let binaries = locator.binaries(&req(":app", "core")).unwrap();
        let core = ws.libraries(&path(":app")).unwrap().get_by_name("core").unwrap();

        assert_eq!(binaries.len(), 2);
        assert_eq!(&binaries, core.binaries());
        for b in core.binaries() {
            assert!(binaries.contains(b));
        }
        assert_eq!(
            binaries.names().collect::<Vec<_>>(),
            vec!["core-linux-x86_64-debug", "core-linux-x86_64-release"]
        );
    }

    #[test]
    fn test_result_shares_binaries_with_library() {
        let ws = app_workspace();
        let binaries = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":app", "core"))
            .unwrap();
        let core = ws.libraries(&path(":app")).unwrap().get_by_name("core").unwrap();

        let ours = binaries.get("core-linux-x86_64-release").unwrap();
        let theirs = core.binaries().get("core-linux-x86_64-release").unwrap();
        assert!(Arc::ptr_eq(ours, theirs));
    }

    #[test]
    fn test_header_only_library_has_no_binaries() {
        let ws = app_workspace();
        let binaries = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":app", "util"))
            .unwrap();
        assert!(binaries.is_empty());
    }

    #[test]
    fn test_unknown_unit_passes_lookup_error_through() {
        let ws = app_workspace();
        let err = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":missing", "core"))
            .unwrap_err();

        assert!(matches!(err, LocateError::Unit(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "build unit `:missing` not found");
    }

    #[test]
    fn test_invalid_unit_path() {
        let ws = app_workspace();
        let err = ProjectLibraryLocator::new(&ws)
            .binaries(&req("app", "core"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_unit_without_libraries() {
        let ws = app_workspace();
        let err = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":plain", "core"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.to_string(),
            "build unit `:plain` does not have a libraries registry"
        );
    }

    #[test]
    fn test_libraries_extension_of_wrong_type() {
        let ws = app_workspace();
        let err = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":odd", "core"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        match err {
            LocateError::NotALibraryRegistry { path, found } => {
                assert_eq!(path, ":odd");
                assert!(found.contains("String"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_library() {
        let ws = app_workspace();
        let err = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":app", "nonexistent"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "library `nonexistent` not found in build unit `:app`"
        );
    }

    #[test]
    fn test_unit_is_resolved_once_per_call() {
        let ws = app_workspace();
        let lookup = CountingLookup::new(&ws);
        let locator = ProjectLibraryLocator::new(&lookup);

        locator.binaries(&req(":app", "core")).unwrap();
        assert_eq!(lookup.calls(), 1);
        assert_eq!(lookup.paths(), vec![":app"]);

        locator.binaries(&req(":app", "core")).unwrap();
        assert_eq!(lookup.calls(), 2);
    }

    #[test]
    fn test_observes_later_library_changes() {
        let mut ws = app_workspace();
        assert!(ProjectLibraryLocator::new(&ws)
            .binaries(&req(":app", "late"))
            .is_err());

        ws.libraries_mut(&path(":app"))
            .unwrap()
            .create_with::<SharedLibrary, _>("late", |lib| {
                lib.binaries_mut().add(binary("late", BuildType::Release));
            })
            .unwrap();

        let binaries = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":app", "late"))
            .unwrap();
        assert_eq!(binaries.len(), 1);
    }

    #[test]
    fn test_uses_supplied_extension_lookup() {
        let mut ws = Workspace::new("/ws");
        ws.add_unit(path(":app"))
            .unwrap()
            .extensions_mut()
            .add("test.libraries", unit_libraries(&["core"]))
            .unwrap();

        let extensions = PrefixedExtensions::new("test.");
        let locator = ProjectLibraryLocator::with_extensions(&ws, &extensions);

        assert!(locator.binaries(&req(":app", "core")).unwrap().is_empty());
        assert_eq!(extensions.requested(), vec![LIBRARIES_EXTENSION]);

        // The unit's own container has no `libraries` entry.
        let err = ProjectLibraryLocator::new(&ws)
            .binaries(&req(":app", "core"))
            .unwrap_err();
        assert!(matches!(err, LocateError::MissingLibraries { .. }));
    }

    #[test]
    fn test_library_of_any_subtype() {
        let mut ws = Workspace::new("/ws");
        ws.add_native_unit(path(":lib")).unwrap();
        let libraries = ws.libraries_mut(&path(":lib")).unwrap();
        libraries
            .create_with::<StaticLibrary, _>("a", |lib| {
                lib.binaries_mut().add(binary("a", BuildType::Debug));
            })
            .unwrap();
        libraries
            .create_with::<SharedLibrary, _>("b", |lib| {
                lib.binaries_mut().add(binary("b", BuildType::Debug));
            })
            .unwrap();

        let locator = ProjectLibraryLocator::new(&ws);
        assert_eq!(locator.binaries(&req(":lib", "a")).unwrap().len(), 1);
        assert_eq!(locator.binaries(&req(":lib", "b")).unwrap().len(), 1);
    }

    #[test]
    fn test_boxed_locator() {
        let ws = app_workspace();
        let boxed: Box<dyn LibraryBinaryLocator + '_> = Box::new(ProjectLibraryLocator::new(&ws));
        assert_eq!(boxed.name(), "project");
        assert_eq!(boxed.binaries(&req(":app", "core")).unwrap().len(), 2);
    }
}
