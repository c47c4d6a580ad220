//! `slipway libraries` command

use std::path::Path;

use anyhow::Result;

use crate::cli::LibrariesArgs;
use slipway::ops::{list_libraries, load_workspace};
use slipway::util::GlobalContext;

pub fn execute(args: LibrariesArgs, ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<()> {
    let loaded = load_workspace(ctx, manifest_path)?;
    let listings = list_libraries(
        &loaded.workspace,
        args.unit.as_deref(),
        args.kind.map(Into::into),
    )?;

    if listings.is_empty() {
        println!("no libraries");
        return Ok(());
    }

    for listing in listings {
        println!(
            "{} {} ({}, {} binaries)",
            listing.unit, listing.name, listing.linkage, listing.binaries
        );
    }

    Ok(())
}
