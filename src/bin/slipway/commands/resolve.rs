//! `slipway resolve` command

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::cli::{OutputFormat, ResolveArgs};
use slipway::core::{BinarySet, NativeLibraryRequirement};
use slipway::ops::{load_workspace, resolve_requirement};
use slipway::util::GlobalContext;

#[derive(Serialize)]
struct ResolveOutput<'a> {
    requirement: &'a NativeLibraryRequirement,
    binaries: &'a BinarySet,
}

pub fn execute(args: ResolveArgs, ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<()> {
    let loaded = load_workspace(ctx, manifest_path)?;
    let opts = super::resolve_options(&loaded.config, &args.resolve);

    let requirement = NativeLibraryRequirement::new(args.unit, args.library);
    let binaries = resolve_requirement(&loaded.workspace, &requirement, &opts)?;

    match args.format {
        OutputFormat::Json => {
            let output = ResolveOutput {
                requirement: &requirement,
                binaries: &binaries,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            if binaries.is_empty() {
                println!("{} has no binaries", requirement);
            }
            for binary in &binaries {
                if ctx.is_verbose() {
                    println!(
                        "{}\t{}\t{}\t{}",
                        binary.name(),
                        binary.kind(),
                        binary.build_type(),
                        binary.output_file().display()
                    );
                } else {
                    println!("{}\t{}", binary.name(), binary.output_file().display());
                }
            }
        }
    }

    Ok(())
}
