//! Test fixtures for common test scenarios.
//!
//! The reference workspace used across the resolver and ops tests:
//!
//! - `:app` declares a static `core` library with a debug and a release
//!   binary, and a header-only `util` library with none
//! - `:plain` is a unit without a `libraries` registry
//! - `:odd` has a `libraries` extension that is not a library registry

use std::path::PathBuf;

use crate::core::{
    BinaryKind, BuildType, HeaderOnlyLibrary, LibraryRegistry, NativeBinary, NativeLibrary,
    Platform, PrebuiltLibrary, PrebuiltRepository, StaticLibrary, UnitPath, Workspace,
    LIBRARIES_EXTENSION,
};

/// Root directory of fixture workspaces.
pub const WORKSPACE_ROOT: &str = "/ws";

/// A Slipway.toml describing the same layout as [`app_workspace`], plus a
/// `vendor` repository with a prebuilt `zlib`.
pub const APP_MANIFEST: &str = r#"
[[unit]]
path = ":app"

[[unit.library]]
name = "core"
kind = "static"
platforms = ["linux-x86_64"]

[[unit.library]]
name = "util"
kind = "header-only"
headers = ["include"]

[[unit]]
path = ":plain"
native = false

[[repository]]
name = "vendor"

[[repository.library]]
name = "zlib"
location = "vendor/zlib"
platforms = ["linux-x86_64"]
build-types = ["release"]
"#;

pub fn linux() -> Platform {
    Platform::new("linux", "x86_64")
}

pub fn path(s: &str) -> UnitPath {
    UnitPath::parse(s).unwrap()
}

/// A static-library binary of `library` for linux-x86_64.
pub fn binary(library: &str, build_type: BuildType) -> NativeBinary {
    NativeBinary::in_build_dir(
        &PathBuf::from(WORKSPACE_ROOT).join("app/build/binaries"),
        library,
        BinaryKind::StaticLib,
        linux(),
        build_type,
    )
}

/// The reference workspace described in the module docs.
pub fn app_workspace() -> Workspace {
    let mut ws = Workspace::new(WORKSPACE_ROOT);

    ws.add_native_unit(path(":app")).unwrap();
    let libraries = ws.libraries_mut(&path(":app")).unwrap();
    libraries
        .create_with::<StaticLibrary, _>("core", |core| {
            core.binaries_mut().add(binary("core", BuildType::Debug));
            core.binaries_mut().add(binary("core", BuildType::Release));
        })
        .unwrap();
    libraries.create::<HeaderOnlyLibrary>("util").unwrap();

    ws.add_unit(path(":plain")).unwrap();

    ws.add_unit(path(":odd"))
        .unwrap()
        .extensions_mut()
        .add(LIBRARIES_EXTENSION, String::from("not a registry"))
        .unwrap();

    ws
}

/// Add a `vendor` repository holding a prebuilt library for each name.
pub fn add_vendor_repository(ws: &mut Workspace, libraries: &[&str]) {
    ws.repositories_mut()
        .create_with::<PrebuiltRepository, _>("vendor", |repo| {
            for name in libraries {
                repo.libraries_mut()
                    .create_with::<PrebuiltLibrary, _>(*name, |lib| {
                        lib.location = PathBuf::from(WORKSPACE_ROOT).join("vendor").join(name);
                        let file = lib.location.join(format!("lib{}.so", name));
                        lib.binaries_mut().add(NativeBinary::new(
                            *name,
                            BinaryKind::SharedLib,
                            linux(),
                            BuildType::Release,
                            file,
                        ));
                    })
                    .unwrap();
            }
        })
        .unwrap();
}

/// A free-standing unit registry, for tests that do not need a workspace.
pub fn unit_libraries(names: &[&str]) -> LibraryRegistry {
    let mut libraries = LibraryRegistry::for_unit();
    for name in names {
        libraries.create::<StaticLibrary>(*name).unwrap();
    }
    libraries
}
