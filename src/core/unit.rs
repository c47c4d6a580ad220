//! Build units and the extensions attached to them.
//!
//! A build unit is an independently configurable part of a workspace,
//! addressed by a [`UnitPath`]. Its configuration state carries named,
//! optional extension objects; the `libraries` extension is the one library
//! resolution cares about.
//!
//! Both lookups used during resolution are traits so a host can supply its
//! own: [`BuildUnitLookup`] turns a path into a unit, [`ExtensionLookup`]
//! finds an extension on a unit.

use std::any::{type_name, Any};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::registry::RegistryError;
use crate::core::ErrorKind;

/// Separator between unit path segments.
pub const PATH_SEPARATOR: char = ':';

/// A malformed unit path.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("invalid build unit path `{path}`: {reason}")]
#[diagnostic(
    code(slipway::unit::invalid_path),
    help("unit paths are absolute and `:`-separated, e.g. `:` or `:app:core`")
)]
pub struct UnitPathError {
    pub path: String,
    pub reason: &'static str,
}

/// Absolute, `:`-separated path of a build unit. `:` is the root unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitPath(String);

impl UnitPath {
    /// Parse and validate a unit path.
    pub fn parse(path: &str) -> Result<Self, UnitPathError> {
        let invalid = |reason| UnitPathError {
            path: path.to_string(),
            reason,
        };

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if !path.starts_with(PATH_SEPARATOR) {
            return Err(invalid("path must start with `:`"));
        }
        if path.chars().any(char::is_whitespace) {
            return Err(invalid("path must not contain whitespace"));
        }
        if path.len() > 1 && path[1..].split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(invalid("path has an empty segment"));
        }

        Ok(UnitPath(path.to_string()))
    }

    /// The root unit path, `:`.
    pub fn root() -> Self {
        UnitPath(PATH_SEPARATOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Path segments, outermost first. Empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0[1..].split(PATH_SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The enclosing unit's path, or `None` for the root.
    pub fn parent(&self) -> Option<UnitPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(PATH_SEPARATOR) {
            Some(0) => Some(UnitPath::root()),
            Some(pos) => Some(UnitPath(self.0[..pos].to_string())),
            None => None,
        }
    }

    /// Path of a direct child unit.
    pub fn child(&self, name: &str) -> Result<UnitPath, UnitPathError> {
        if self.is_root() {
            UnitPath::parse(&format!("{}{}", PATH_SEPARATOR, name))
        } else {
            UnitPath::parse(&format!("{}{}{}", self.0, PATH_SEPARATOR, name))
        }
    }

    /// Directory of the unit relative to the workspace root.
    pub fn to_relative_dir(&self) -> PathBuf {
        self.segments().collect()
    }
}

impl fmt::Display for UnitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UnitPath {
    type Err = UnitPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitPath::parse(s)
    }
}

impl Serialize for UnitPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UnitPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        UnitPath::parse(&s).map_err(serde::de::Error::custom)
    }
}

struct ExtensionEntry {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Named auxiliary objects attached to a build unit.
#[derive(Default)]
pub struct ExtensionContainer {
    extensions: IndexMap<String, ExtensionEntry>,
}

impl ExtensionContainer {
    pub fn new() -> Self {
        ExtensionContainer {
            extensions: IndexMap::new(),
        }
    }

    /// Attach `value` under `name`. Names are unique per unit.
    pub fn add<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.extensions.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                element: "extension",
                name,
            });
        }
        self.extensions.insert(
            name,
            ExtensionEntry {
                type_name: type_name::<T>(),
                value: Box::new(value),
            },
        );
        Ok(())
    }

    /// Find an extension by name. Absence is not an error.
    pub fn find_by_name(&self, name: &str) -> Option<ExtensionRef<'_>> {
        self.extensions
            .get_key_value(name)
            .map(|(name, entry)| ExtensionRef {
                name,
                type_name: entry.type_name,
                value: entry.value.as_ref(),
            })
    }

    /// Find an extension by name and narrow it to `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.find_by_name(name).and_then(|ext| ext.downcast_ref::<T>())
    }

    /// Mutable form of [`get`](Self::get).
    pub fn get_mut<T: Any>(&mut self, name: &str) -> Option<&mut T> {
        self.extensions
            .get_mut(name)
            .and_then(|entry| entry.value.downcast_mut::<T>())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.extensions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Debug for ExtensionContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.extensions
                    .iter()
                    .map(|(name, entry)| (name, entry.type_name)),
            )
            .finish()
    }
}

/// A borrowed extension, not yet narrowed to a concrete type.
#[derive(Clone, Copy)]
pub struct ExtensionRef<'a> {
    name: &'a str,
    type_name: &'static str,
    value: &'a (dyn Any + Send + Sync),
}

impl<'a> ExtensionRef<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Fully qualified type name of the stored object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Narrow the extension to `T`, or `None` if it is something else.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }
}

impl fmt::Debug for ExtensionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRef")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// An addressable, independently configurable part of the build.
#[derive(Debug)]
pub struct BuildUnit {
    path: UnitPath,
    dir: PathBuf,
    extensions: ExtensionContainer,
}

impl BuildUnit {
    /// Create a unit rooted at `dir` with no extensions.
    pub fn new(path: UnitPath, dir: impl Into<PathBuf>) -> Self {
        BuildUnit {
            path,
            dir: dir.into(),
            extensions: ExtensionContainer::new(),
        }
    }

    pub fn path(&self) -> &UnitPath {
        &self.path
    }

    /// Directory holding the unit's sources.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory binaries are written to.
    pub fn build_dir(&self) -> PathBuf {
        self.dir.join("build").join("binaries")
    }

    pub fn extensions(&self) -> &ExtensionContainer {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionContainer {
        &mut self.extensions
    }
}

/// Failure to resolve a unit path.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum UnitLookupError {
    #[error("build unit `{path}` not found")]
    #[diagnostic(code(slipway::unit::not_found))]
    NotFound { path: String, known: Vec<String> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidPath(#[from] UnitPathError),
}

impl UnitLookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnitLookupError::NotFound { .. } => ErrorKind::NotFound,
            UnitLookupError::InvalidPath(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Resolves a unit path to the unit's live configuration state.
///
/// The returned borrow is only meant to live for a single resolution; units
/// may be reconfigured between calls.
pub trait BuildUnitLookup {
    fn resolve(&self, path: &str) -> Result<&BuildUnit, UnitLookupError>;
}

impl<T: BuildUnitLookup + ?Sized> BuildUnitLookup for &T {
    fn resolve(&self, path: &str) -> Result<&BuildUnit, UnitLookupError> {
        (**self).resolve(path)
    }
}

/// Finds a named extension on a build unit.
pub trait ExtensionLookup {
    fn find_by_name<'u>(&self, unit: &'u BuildUnit, name: &str) -> Option<ExtensionRef<'u>>;
}

impl<T: ExtensionLookup + ?Sized> ExtensionLookup for &T {
    fn find_by_name<'u>(&self, unit: &'u BuildUnit, name: &str) -> Option<ExtensionRef<'u>> {
        (**self).find_by_name(unit, name)
    }
}

/// Reads extensions straight from the unit's own container.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitExtensions;

impl ExtensionLookup for UnitExtensions {
    fn find_by_name<'u>(&self, unit: &'u BuildUnit, name: &str) -> Option<ExtensionRef<'u>> {
        unit.extensions().find_by_name(name)
    }
}
