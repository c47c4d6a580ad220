//! Listing units and libraries.

use std::path::PathBuf;

use crate::core::{
    BuildUnit, BuildUnitLookup, HeaderOnlyLibrary, LibraryRegistry, Linkage, NativeLibrary,
    SharedLibrary, StaticLibrary, UnitPath, Workspace,
};
use crate::resolver::LocateError;

/// One build unit as shown by `slipway units`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitListing {
    pub path: UnitPath,
    pub dir: PathBuf,
    /// Number of declared libraries, or None for a unit without a registry
    pub libraries: Option<usize>,
}

/// One library as shown by `slipway libraries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryListing {
    pub unit: UnitPath,
    pub name: String,
    pub linkage: Linkage,
    pub binaries: usize,
    pub requirements: usize,
}

impl LibraryListing {
    fn new(unit: &UnitPath, name: &str, library: &dyn NativeLibrary) -> Self {
        LibraryListing {
            unit: unit.clone(),
            name: name.to_string(),
            linkage: library.linkage(),
            binaries: library.binaries().len(),
            requirements: library.requirements().len(),
        }
    }
}

/// All build units in declaration order.
pub fn list_units(ws: &Workspace) -> Vec<UnitListing> {
    ws.units()
        .map(|unit| UnitListing {
            path: unit.path().clone(),
            dir: unit.dir().to_path_buf(),
            libraries: ws.libraries(unit.path()).map(LibraryRegistry::len),
        })
        .collect()
}

/// Libraries of one unit, or of every unit that has a registry, in creation
/// order. With `linkage`, only libraries created as that kind are listed.
pub fn list_libraries(
    ws: &Workspace,
    unit: Option<&str>,
    linkage: Option<Linkage>,
) -> Result<Vec<LibraryListing>, LocateError> {
    let units: Vec<&BuildUnit> = match unit {
        Some(path) => {
            let unit = ws.resolve(path)?;
            if ws.libraries(unit.path()).is_none() {
                return Err(LocateError::MissingLibraries {
                    path: unit.path().to_string(),
                });
            }
            vec![unit]
        }
        None => ws.units().collect(),
    };

    let mut listings = Vec::new();
    for unit in units {
        let Some(libraries) = ws.libraries(unit.path()) else {
            continue;
        };
        let path = unit.path();
        match linkage {
            None => listings.extend(
                libraries
                    .iter()
                    .map(|(name, lib)| LibraryListing::new(path, name, lib)),
            ),
            Some(Linkage::Static) => listings.extend(
                libraries
                    .with_type::<StaticLibrary>()
                    .into_iter()
                    .map(|(name, lib)| LibraryListing::new(path, name, lib)),
            ),
            Some(Linkage::Shared) => listings.extend(
                libraries
                    .with_type::<SharedLibrary>()
                    .into_iter()
                    .map(|(name, lib)| LibraryListing::new(path, name, lib)),
            ),
            Some(Linkage::HeaderOnly) => listings.extend(
                libraries
                    .with_type::<HeaderOnlyLibrary>()
                    .into_iter()
                    .map(|(name, lib)| LibraryListing::new(path, name, lib)),
            ),
        }
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::test_support::{app_workspace, path};

    #[test]
    fn test_list_units() {
        let ws = app_workspace();
        let units = list_units(&ws);

        let summary: Vec<_> = units
            .iter()
            .map(|u| (u.path.as_str(), u.libraries))
            .collect();
        assert_eq!(
            summary,
            vec![(":app", Some(2)), (":plain", None), (":odd", None)]
        );
    }

    #[test]
    fn test_list_all_libraries() {
        let ws = app_workspace();
        let listings = list_libraries(&ws, None, None).unwrap();

        let names: Vec<_> = listings.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["core", "util"]);
        assert_eq!(listings[0].linkage, Linkage::Static);
        assert_eq!(listings[0].binaries, 2);
        assert_eq!(listings[1].linkage, Linkage::HeaderOnly);
    }

    #[test]
    fn test_list_by_kind() {
        let mut ws = app_workspace();
        ws.libraries_mut(&path(":app"))
            .unwrap()
            .create::<StaticLibrary>("extra")
            .unwrap();

        let statics = list_libraries(&ws, Some(":app"), Some(Linkage::Static)).unwrap();
        let names: Vec<_> = statics.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["core", "extra"]);

        assert!(list_libraries(&ws, None, Some(Linkage::Shared))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_unit_errors() {
        let ws = app_workspace();

        let err = list_libraries(&ws, Some(":plain"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = list_libraries(&ws, Some(":nope"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
