//! Workspace loading.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::core::{Manifest, Workspace};
use crate::util::diagnostic::suggestions;
use crate::util::{Config, GlobalContext};

/// A workspace built from its manifest, with the config that applies to it.
#[derive(Debug)]
pub struct LoadedWorkspace {
    pub workspace: Workspace,
    pub config: Config,
    pub manifest_path: PathBuf,
}

/// Load the workspace at `manifest_path`, or the one found by searching
/// upward from the current directory.
pub fn load_workspace(ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<LoadedWorkspace> {
    let manifest_path = match manifest_path {
        Some(path) => ctx.cwd().join(path),
        None => ctx
            .find_manifest()
            .map_err(|e| anyhow!("{}\nhelp: {}", e, suggestions::NO_MANIFEST))?,
    };

    let manifest = Manifest::load(&manifest_path)?;
    let workspace = manifest
        .to_workspace()
        .with_context(|| format!("invalid workspace: {}", manifest_path.display()))?;
    let config = ctx.load_config(manifest.manifest_dir());

    tracing::debug!(
        manifest = %manifest_path.display(),
        units = workspace.units().count(),
        repositories = workspace.repositories().len(),
        "loaded workspace"
    );

    Ok(LoadedWorkspace {
        workspace,
        config,
        manifest_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildUnitLookup;
    use crate::resolver::ChainPolicy;
    use crate::test_support::APP_MANIFEST;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_explicit_path() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Slipway.toml"), APP_MANIFEST).unwrap();
        std::fs::create_dir_all(tmp.path().join(".slipway")).unwrap();
        std::fs::write(
            tmp.path().join(".slipway/config.toml"),
            "[resolve]\npolicy = \"merge\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        let loaded = load_workspace(&ctx, Some(Path::new("Slipway.toml"))).unwrap();

        assert!(loaded.workspace.resolve(":app").is_ok());
        assert_eq!(loaded.workspace.root(), tmp.path());
        assert_eq!(loaded.config.resolve.policy(), ChainPolicy::Merge);
    }

    #[test]
    fn test_missing_manifest_file() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();

        let err = load_workspace(&ctx, Some(Path::new("nope/Slipway.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read manifest"));
    }
}
