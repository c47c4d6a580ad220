//! Command implementations

pub mod check;
pub mod completions;
pub mod config;
pub mod libraries;
pub mod resolve;
pub mod units;

use slipway::ops::ResolveOptions;
use slipway::util::Config;

use crate::cli::ResolveFlags;

/// Config values with command-line flags applied on top.
fn resolve_options(config: &Config, flags: &ResolveFlags) -> ResolveOptions {
    let mut opts = ResolveOptions::from_config(config);
    if let Some(policy) = flags.policy {
        opts.policy = policy.into();
    }
    if flags.no_prebuilt {
        opts.prebuilt = false;
    }
    opts
}
