//! Slipway.toml manifest parsing and schema.
//!
//! The manifest describes the build units of a workspace, the libraries each
//! unit declares, and any prebuilt repositories:
//!
//! ```toml
//! [[unit]]
//! path = ":lib"
//!
//! [[unit.library]]
//! name = "core"
//! kind = "static"
//! platforms = ["linux-x86_64"]
//! requires = [{ unit = ":util", library = "strings" }]
//!
//! [[repository]]
//! name = "vendor"
//!
//! [[repository.library]]
//! name = "zlib"
//! linkage = "shared"
//! location = "vendor/zlib"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::core::binary::{BuildType, NativeBinary, Platform};
use crate::core::library::{
    HeaderOnlyLibrary, LibraryRegistry, Linkage, NativeLibrary, PrebuiltLibrary, SharedLibrary,
    StaticLibrary,
};
use crate::core::registry::RegistryError;
use crate::core::repository::PrebuiltRepository;
use crate::core::requirement::NativeLibraryRequirement;
use crate::core::unit::UnitPath;
use crate::core::workspace::{Workspace, LIBRARIES_EXTENSION};

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Slipway.toml";

/// Manifest discovery failure.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `Slipway.toml` in {} or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },
}

/// Find the manifest in `dir` (not its parents).
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(MANIFEST_NAME);
    candidate.is_file().then_some(candidate)
}

/// A parsed Slipway.toml.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub units: Vec<UnitManifest>,
    pub repositories: Vec<RepositoryManifest>,

    /// Directory containing the manifest; the workspace root
    manifest_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default, rename = "unit")]
    units: Vec<UnitManifest>,

    #[serde(default, rename = "repository")]
    repositories: Vec<RepositoryManifest>,
}

/// A `[[unit]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitManifest {
    pub path: UnitPath,

    /// Unit directory relative to the workspace root. Defaults to the path's
    /// segments (`:app:core` -> `app/core`).
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Whether the unit carries a `libraries` registry
    #[serde(default = "default_true")]
    pub native: bool,

    #[serde(default, rename = "library")]
    pub libraries: Vec<LibraryManifest>,
}

/// A `[[unit.library]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LibraryManifest {
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: Linkage,

    /// Platforms to produce binaries for (default: host)
    #[serde(default)]
    pub platforms: Vec<Platform>,

    /// Build types to produce binaries for (default: debug and release)
    #[serde(default)]
    pub build_types: Vec<BuildType>,

    /// Public header directories, relative to the unit directory
    #[serde(default)]
    pub headers: Vec<PathBuf>,

    /// Shared object name (shared libraries only)
    #[serde(default)]
    pub soname: Option<String>,

    #[serde(default)]
    pub requires: Vec<NativeLibraryRequirement>,
}

/// A `[[repository]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryManifest {
    pub name: String,

    #[serde(default, rename = "library")]
    pub libraries: Vec<PrebuiltManifest>,
}

/// A `[[repository.library]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrebuiltManifest {
    pub name: String,

    #[serde(default = "default_linkage")]
    pub linkage: Linkage,

    /// Root of the prebuilt files, relative to the workspace root. Binaries
    /// are expected at `<location>/<platform>/<build type>/<file>`.
    pub location: PathBuf,

    #[serde(default)]
    pub platforms: Vec<Platform>,

    #[serde(default)]
    pub build_types: Vec<BuildType>,

    #[serde(default)]
    pub headers: Vec<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_kind() -> Linkage {
    Linkage::Static
}

fn default_linkage() -> Linkage {
    Linkage::Shared
}

fn platforms_or_host(platforms: &[Platform]) -> Vec<Platform> {
    if platforms.is_empty() {
        vec![Platform::host()]
    } else {
        platforms.to_vec()
    }
}

fn build_types_or_all(build_types: &[BuildType]) -> Vec<BuildType> {
    if build_types.is_empty() {
        BuildType::all()
    } else {
        build_types.to_vec()
    }
}

impl Manifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content read from `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        for unit in &raw.units {
            if !unit.native && !unit.libraries.is_empty() {
                bail!(
                    "build unit `{}` declares libraries but has `native = false`",
                    unit.path
                );
            }
        }

        Ok(Manifest {
            units: raw.units,
            repositories: raw.repositories,
            manifest_dir,
        })
    }

    /// Directory containing the manifest.
    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    /// Build the workspace model the manifest describes.
    pub fn to_workspace(&self) -> Result<Workspace> {
        let mut ws = Workspace::new(&self.manifest_dir);

        for unit in &self.units {
            let added = match &unit.dir {
                Some(dir) => ws.add_unit_in(unit.path.clone(), self.manifest_dir.join(dir))?,
                None => ws.add_unit(unit.path.clone())?,
            };
            if !unit.native {
                continue;
            }

            let unit_dir = added.dir().to_path_buf();
            let build_dir = added.build_dir();
            let mut libraries = LibraryRegistry::for_unit();
            for library in &unit.libraries {
                library
                    .declare(&mut libraries, &unit_dir, &build_dir)
                    .with_context(|| format!("invalid library in build unit `{}`", unit.path))?;
            }
            added
                .extensions_mut()
                .add(LIBRARIES_EXTENSION, libraries)?;
        }

        for repository in &self.repositories {
            let manifest_dir = &self.manifest_dir;
            let mut declared: Result<(), RegistryError> = Ok(());
            ws.repositories_mut()
                .create_with::<PrebuiltRepository, _>(&repository.name, |repo| {
                    declared = repository
                        .libraries
                        .iter()
                        .try_for_each(|library| library.declare(repo, manifest_dir));
                })?;
            declared
                .with_context(|| format!("invalid library in repository `{}`", repository.name))?;
        }

        Ok(ws)
    }
}

impl LibraryManifest {
    fn declare(
        &self,
        libraries: &mut LibraryRegistry,
        unit_dir: &Path,
        build_dir: &Path,
    ) -> Result<(), RegistryError> {
        match self.kind {
            Linkage::Static => {
                libraries.create_with::<StaticLibrary, _>(&self.name, |lib| {
                    self.configure(lib, unit_dir, build_dir)
                })?;
            }
            Linkage::Shared => {
                libraries.create_with::<SharedLibrary, _>(&self.name, |lib| {
                    lib.soname = self.soname.clone();
                    self.configure(lib, unit_dir, build_dir)
                })?;
            }
            Linkage::HeaderOnly => {
                libraries.create_with::<HeaderOnlyLibrary, _>(&self.name, |lib| {
                    self.configure(lib, unit_dir, build_dir)
                })?;
            }
        }
        Ok(())
    }

    fn configure(&self, lib: &mut dyn NativeLibrary, unit_dir: &Path, build_dir: &Path) {
        lib.headers_mut()
            .extend(self.headers.iter().map(|h| unit_dir.join(h)));
        lib.requirements_mut().extend(self.requires.iter().cloned());

        let Some(kind) = lib.linkage().binary_kind() else {
            return;
        };
        for platform in platforms_or_host(&self.platforms) {
            for build_type in build_types_or_all(&self.build_types) {
                let binary =
                    NativeBinary::in_build_dir(build_dir, &self.name, kind, platform.clone(), build_type);
                if !lib.binaries_mut().add(binary) {
                    tracing::warn!(
                        library = %self.name,
                        platform = %platform,
                        build_type = %build_type,
                        "duplicate binary variant ignored"
                    );
                }
            }
        }
    }
}

impl PrebuiltManifest {
    fn declare(&self, repo: &mut PrebuiltRepository, manifest_dir: &Path) -> Result<(), RegistryError> {
        let location = manifest_dir.join(&self.location);
        repo.libraries_mut()
            .create_with::<PrebuiltLibrary, _>(&self.name, |lib| {
                lib.linkage = self.linkage;
                lib.location = location.clone();
                lib.headers_mut()
                    .extend(self.headers.iter().map(|h| location.join(h)));

                let Some(kind) = self.linkage.binary_kind() else {
                    return;
                };
                for platform in platforms_or_host(&self.platforms) {
                    for build_type in build_types_or_all(&self.build_types) {
                        let file = location
                            .join(platform.to_string())
                            .join(build_type.as_str())
                            .join(kind.output_filename(&self.name, platform.os()));
                        lib.binaries_mut().add(NativeBinary::new(
                            &self.name,
                            kind,
                            platform.clone(),
                            build_type,
                            file,
                        ));
                    }
                }
            })?;
        Ok(())
    }
}
