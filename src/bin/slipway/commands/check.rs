//! `slipway check` command

use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use slipway::ops::{check_requirements, load_workspace};
use slipway::util::diagnostic;
use slipway::util::{Diagnostic, GlobalContext};

pub fn execute(args: CheckArgs, ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<()> {
    let loaded = load_workspace(ctx, manifest_path)?;
    let opts = super::resolve_options(&loaded.config, &args.resolve);

    let checks = check_requirements(&loaded.workspace, &opts);
    let mut failed = 0;

    for check in &checks {
        match &check.outcome {
            Ok(binaries) => {
                println!(
                    "ok\t{} {} -> {} ({} binaries)",
                    check.unit,
                    check.library,
                    check.requirement,
                    binaries.len()
                );
                if binaries.is_empty() {
                    let warning =
                        Diagnostic::warning(format!("{} has no binaries", check.requirement))
                            .with_code("slipway::check::no_binaries")
                            .with_context(format!(
                                "required by `{}` of `{}`",
                                check.library, check.unit
                            ))
                            .with_suggestion("nothing will be linked for this requirement");
                    diagnostic::emit(&warning, ctx.color());
                }
            }
            Err(err) => {
                failed += 1;
                println!("FAILED\t{} {} -> {}", check.unit, check.library, check.requirement);
                diagnostic::emit(&err.to_diagnostic(), ctx.color());
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} requirements failed to resolve", failed, checks.len());
    }

    println!("{} requirements resolved", checks.len());
    Ok(())
}
