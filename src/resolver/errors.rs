//! Library resolution errors and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::{ErrorKind, NativeLibraryRequirement, RegistryError, UnitLookupError};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Failure to turn a library requirement into binaries.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum LocateError {
    /// The build unit lookup failed; passed through unchanged.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Unit(#[from] UnitLookupError),

    #[error("build unit `{path}` does not have a libraries registry")]
    #[diagnostic(code(slipway::locate::no_libraries))]
    MissingLibraries { path: String },

    #[error("build unit `{path}` has a `libraries` extension of type `{found}`, which is not a library registry")]
    #[diagnostic(code(slipway::locate::not_a_library_registry))]
    NotALibraryRegistry { path: String, found: &'static str },

    #[error("library `{library}` not found in build unit `{path}`")]
    #[diagnostic(code(slipway::locate::library_not_found))]
    Library {
        path: String,
        library: String,
        source: RegistryError,
    },

    #[error("library `{library}` not found in any prebuilt repository")]
    #[diagnostic(code(slipway::locate::prebuilt_not_found))]
    PrebuiltNotFound {
        library: String,
        searched: Vec<String>,
    },

    #[error("could not resolve {requirement}")]
    #[diagnostic(code(slipway::locate::unresolved))]
    Unresolved {
        requirement: NativeLibraryRequirement,
        /// (locator name, failure) for every locator that was tried
        attempts: Vec<(String, LocateError)>,
    },
}

impl LocateError {
    /// The failure category of this error.
    ///
    /// A missing and a wrong-kind `libraries` extension are both
    /// configuration errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocateError::Unit(err) => err.kind(),
            LocateError::MissingLibraries { .. } | LocateError::NotALibraryRegistry { .. } => {
                ErrorKind::Configuration
            }
            LocateError::Library { source, .. } => source.kind(),
            LocateError::PrebuiltNotFound { .. } => ErrorKind::NotFound,
            LocateError::Unresolved { attempts, .. } => attempts
                .first()
                .map(|(_, err)| err.kind())
                .unwrap_or(ErrorKind::NotFound),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::from_miette(self);

        match self {
            LocateError::Unit(UnitLookupError::NotFound { known, .. }) => {
                if !known.is_empty() {
                    diag = diag.with_context(format!("known build units: {}", known.join(", ")));
                }
                diag = diag.with_suggestion(suggestions::UNIT_NOT_FOUND);
            }

            LocateError::Unit(UnitLookupError::InvalidPath(_)) => {}

            LocateError::MissingLibraries { .. } => {
                diag = diag
                    .with_context("the requirement refers to a unit that is not set up for native libraries")
                    .with_suggestion(suggestions::NOT_NATIVE);
            }

            LocateError::NotALibraryRegistry { found, .. } => {
                diag = diag
                    .with_context(format!("found an extension of type `{}`", found))
                    .with_suggestion("Rename the conflicting extension; `libraries` is reserved");
            }

            LocateError::Library { source, .. } => {
                if let RegistryError::NotFound { available, .. } = source {
                    if available.is_empty() {
                        diag = diag.with_context("the unit declares no libraries");
                    } else {
                        diag = diag.with_context(format!("available libraries: {}", available.join(", ")));
                    }
                }
                diag = diag
                    .with_suggestion("Check that the library name is spelled correctly")
                    .with_suggestion(suggestions::LIBRARY_NOT_FOUND);
            }

            LocateError::PrebuiltNotFound { searched, .. } => {
                if searched.is_empty() {
                    diag = diag.with_context("no prebuilt repositories are declared");
                } else {
                    diag = diag.with_context(format!("searched repositories: {}", searched.join(", ")));
                }
                diag = diag.with_suggestion(suggestions::NO_PREBUILT);
            }

            LocateError::Unresolved { attempts, .. } => {
                for (locator, err) in attempts {
                    diag = diag.with_context(format!("{}: {}", locator, err));
                }
            }
        }

        diag
    }
}
