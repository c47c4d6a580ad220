//! `slipway config` command

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::cli::{ConfigArgs, ConfigCommands, ConfigSetArgs};
use slipway::util::{Config, GlobalContext};

pub fn execute(args: ConfigArgs, ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx, manifest_path),
        ConfigCommands::Set(set_args) => set_config(set_args, ctx, manifest_path),
    }
}

/// Directory holding the workspace manifest.
fn workspace_root(ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<PathBuf> {
    let manifest = match manifest_path {
        Some(path) => ctx.cwd().join(path),
        None => ctx.find_manifest()?,
    };
    Ok(manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.cwd().to_path_buf()))
}

fn show_config(ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<()> {
    let global = ctx.config_path();
    println!("Global:  {}", global.display());

    // Outside a workspace only the global layer applies
    let config = match workspace_root(ctx, manifest_path) {
        Ok(root) => {
            println!("Project: {}", ctx.project_config_path(&root).display());
            ctx.load_config(&root)
        }
        Err(_) => Config::load_or_default(&global),
    };

    println!();
    println!("policy   = {}", config.resolve.policy());
    println!("prebuilt = {}", config.resolve.prebuilt());
    Ok(())
}

fn set_config(args: ConfigSetArgs, ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<()> {
    if args.policy.is_none() && args.prebuilt.is_none() {
        bail!("nothing to set\nhelp: pass `--policy` or `--prebuilt`");
    }

    let path = if args.global {
        ctx.config_path()
    } else {
        ctx.project_config_path(&workspace_root(ctx, manifest_path)?)
    };

    let mut config = Config::load_or_default(&path);
    if let Some(policy) = args.policy {
        config.resolve.policy = Some(policy.into());
    }
    if let Some(prebuilt) = args.prebuilt {
        config.resolve.prebuilt = Some(prebuilt);
    }
    config.save(&path)?;

    if ctx.is_verbose() {
        println!("{}", toml::to_string_pretty(&config)?.trim_end());
    }
    println!("Updated {}", path.display());
    Ok(())
}
