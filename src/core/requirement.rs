//! Native library requirements.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a native library declared by a specific build unit.
///
/// In a manifest this is written `{ unit = ":lib", library = "core" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeLibraryRequirement {
    #[serde(rename = "unit", alias = "project")]
    unit_path: String,
    #[serde(rename = "library")]
    library_name: String,
}

impl NativeLibraryRequirement {
    pub fn new(unit_path: impl Into<String>, library_name: impl Into<String>) -> Self {
        NativeLibraryRequirement {
            unit_path: unit_path.into(),
            library_name: library_name.into(),
        }
    }

    /// Path of the build unit that declares the library.
    pub fn unit_path(&self) -> &str {
        &self.unit_path
    }

    pub fn library_name(&self) -> &str {
        &self.library_name
    }
}

impl fmt::Display for NativeLibraryRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "library `{}` of `{}`", self.library_name, self.unit_path)
    }
}
