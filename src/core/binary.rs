//! Native binaries - the linkable artifacts a library owns.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// The kind of linkable artifact a binary is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryKind {
    /// Static library (.a / .lib)
    #[serde(alias = "static")]
    StaticLib,

    /// Shared/dynamic library (.so / .dylib / .dll)
    #[serde(alias = "shared", alias = "dylib")]
    SharedLib,
}

impl BinaryKind {
    /// Get the typical file extension for this kind on `os`.
    pub fn extension(&self, os: &str) -> &'static str {
        match self {
            BinaryKind::StaticLib => {
                if os == "windows" {
                    "lib"
                } else {
                    "a"
                }
            }
            BinaryKind::SharedLib => match os {
                "windows" => "dll",
                "macos" => "dylib",
                _ => "so",
            },
        }
    }

    /// Get the typical file prefix for this kind on `os`.
    pub fn prefix(&self, os: &str) -> &'static str {
        if os == "windows" {
            ""
        } else {
            "lib"
        }
    }

    /// Get the output filename for a library called `name`.
    pub fn output_filename(&self, name: &str, os: &str) -> String {
        format!("{}{}.{}", self.prefix(os), name, self.extension(os))
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryKind::StaticLib => write!(f, "static"),
            BinaryKind::SharedLib => write!(f, "shared"),
        }
    }
}

/// Build type a binary was configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    #[default]
    Debug,
    Release,
}

impl BuildType {
    /// Default set of build types for a library.
    pub fn all() -> Vec<BuildType> {
        vec![BuildType::Debug, BuildType::Release]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target platform as `os-arch`, e.g. `linux-x86_64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Create a platform from its parts.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Platform {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process runs on.
    pub fn host() -> Self {
        Platform::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        // OS names never contain a dash; everything after the first one is the arch.
        match s.split_once('-') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() => Ok(Platform::new(os, arch)),
            _ => bail!("invalid platform `{}`: expected `<os>-<arch>`, e.g. `linux-x86_64`", s),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl Serialize for Platform {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A linkable artifact owned by exactly one library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NativeBinary {
    name: String,
    library: String,
    kind: BinaryKind,
    build_type: BuildType,
    platform: Platform,
    output_file: PathBuf,
}

impl NativeBinary {
    /// Create a binary of `library` for one platform and build type.
    ///
    /// The binary is named `<library>-<platform>-<build type>`.
    pub fn new(
        library: impl Into<String>,
        kind: BinaryKind,
        platform: Platform,
        build_type: BuildType,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        let library = library.into();
        NativeBinary {
            name: format!("{}-{}-{}", library, platform, build_type),
            library,
            kind,
            build_type,
            platform,
            output_file: output_file.into(),
        }
    }

    /// Create a binary whose output file follows the standard layout under
    /// `build_dir`: `<build_dir>/<library>/<platform>/<build type>/<file>`.
    pub fn in_build_dir(
        build_dir: &Path,
        library: &str,
        kind: BinaryKind,
        platform: Platform,
        build_type: BuildType,
    ) -> Self {
        let output_file = build_dir
            .join(library)
            .join(platform.to_string())
            .join(build_type.as_str())
            .join(kind.output_filename(library, platform.os()));
        NativeBinary::new(library, kind, platform, build_type, output_file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning library.
    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn kind(&self) -> BinaryKind {
        self.kind
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }
}

impl fmt::Display for NativeBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.output_file.display())
    }
}

/// Ordered set of binaries, shared with the library that owns them.
///
/// Names are unique within a set: [`BinarySet::add`] rejects a clash and
/// [`BinarySet::merge`] keeps the binary already present. Sets returned by
/// resolution hold the same `Arc`s the library holds.
#[derive(Debug, Clone, Default)]
pub struct BinarySet {
    binaries: Vec<Arc<NativeBinary>>,
}

impl BinarySet {
    pub fn new() -> Self {
        BinarySet {
            binaries: Vec::new(),
        }
    }

    /// Add a binary. Returns false, leaving the set unchanged, if a binary
    /// with the same name is already present.
    pub fn add(&mut self, binary: NativeBinary) -> bool {
        if self.binaries.iter().any(|b| b.name == binary.name) {
            return false;
        }
        self.binaries.push(Arc::new(binary));
        true
    }

    /// Add every binary of `other` whose name is not already in this set.
    ///
    /// Names stay unique: on a clash the binary already present wins, so
    /// earlier sets take precedence over later ones.
    pub fn merge(&mut self, other: &BinarySet) {
        for binary in &other.binaries {
            match self.get(&binary.name) {
                Some(existing) if !Arc::ptr_eq(existing, binary) => {
                    tracing::debug!(binary = %binary.name, "skipping shadowed binary");
                }
                Some(_) => {}
                None => self.binaries.push(Arc::clone(binary)),
            }
        }
    }

    /// Check whether this exact binary is a member.
    pub fn contains(&self, binary: &Arc<NativeBinary>) -> bool {
        self.binaries.iter().any(|b| Arc::ptr_eq(b, binary))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<NativeBinary>> {
        self.binaries.iter().find(|b| b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NativeBinary>> + '_ {
        self.binaries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.binaries.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.binaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binaries.is_empty()
    }
}

impl PartialEq for BinarySet {
    fn eq(&self, other: &Self) -> bool {
        self.binaries.len() == other.binaries.len()
            && self.binaries.iter().all(|b| other.contains(b))
    }
}

impl<'a> IntoIterator for &'a BinarySet {
    type Item = &'a Arc<NativeBinary>;
    type IntoIter = std::slice::Iter<'a, Arc<NativeBinary>>;

    fn into_iter(self) -> Self::IntoIter {
        self.binaries.iter()
    }
}

impl Serialize for BinarySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.binaries.iter().map(|b| b.as_ref()))
    }
}
