//! `slipway units` command

use std::path::Path;

use anyhow::Result;

use slipway::ops::{list_units, load_workspace};
use slipway::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<()> {
    let loaded = load_workspace(ctx, manifest_path)?;

    for unit in list_units(&loaded.workspace) {
        let libraries = match unit.libraries {
            Some(1) => "1 library".to_string(),
            Some(n) => format!("{} libraries", n),
            None => "no library registry".to_string(),
        };
        println!("{}\t{}\t{}", unit.path, libraries, unit.dir.display());
    }

    Ok(())
}
