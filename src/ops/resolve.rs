//! Library requirement resolution operations.

use crate::core::{BinarySet, NativeLibraryRequirement, UnitPath, Workspace};
use crate::resolver::{
    ChainPolicy, LibraryBinaryLocator, LocateError, LocatorChain, PrebuiltLibraryLocator,
    ProjectLibraryLocator,
};
use crate::util::Config;

/// Options for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub policy: ChainPolicy,

    /// Search prebuilt repositories after the workspace's own units
    pub prebuilt: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            policy: ChainPolicy::First,
            prebuilt: true,
        }
    }
}

impl ResolveOptions {
    pub fn from_config(config: &Config) -> Self {
        ResolveOptions {
            policy: config.resolve.policy(),
            prebuilt: config.resolve.prebuilt(),
        }
    }
}

/// The locators used for `ws`: the workspace's units first, then its
/// prebuilt repositories when enabled and present.
pub fn locator_chain<'w>(ws: &'w Workspace, opts: &ResolveOptions) -> LocatorChain<'w> {
    let mut chain = LocatorChain::new(opts.policy).with(ProjectLibraryLocator::new(ws));
    if opts.prebuilt && !ws.repositories().is_empty() {
        chain.push(PrebuiltLibraryLocator::new(ws.repositories()));
    }
    chain
}

/// Resolve one requirement against the workspace.
pub fn resolve_requirement(
    ws: &Workspace,
    requirement: &NativeLibraryRequirement,
    opts: &ResolveOptions,
) -> Result<BinarySet, LocateError> {
    let chain = locator_chain(ws, opts);
    tracing::debug!(%requirement, locators = ?chain, "resolving");
    chain.binaries(requirement)
}

/// Outcome of resolving one declared `requires` entry.
#[derive(Debug)]
pub struct RequirementCheck {
    /// Unit declaring the requiring library
    pub unit: UnitPath,
    /// The requiring library
    pub library: String,
    pub requirement: NativeLibraryRequirement,
    pub outcome: Result<BinarySet, LocateError>,
}

impl RequirementCheck {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Resolve every requirement of every library in the workspace, in
/// declaration order.
pub fn check_requirements(ws: &Workspace, opts: &ResolveOptions) -> Vec<RequirementCheck> {
    let chain = locator_chain(ws, opts);
    let mut checks = Vec::new();

    for unit in ws.units() {
        let Some(libraries) = ws.libraries(unit.path()) else {
            continue;
        };
        for (name, library) in libraries.iter() {
            for requirement in library.requirements() {
                checks.push(RequirementCheck {
                    unit: unit.path().clone(),
                    library: name.to_string(),
                    requirement: requirement.clone(),
                    outcome: chain.binaries(requirement),
                });
            }
        }
    }

    checks
}
