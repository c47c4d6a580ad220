//! High-level operations.
//!
//! This module contains the implementation of Slipway commands.

pub mod libraries;
pub mod load;
pub mod resolve;

pub use libraries::{list_libraries, list_units, LibraryListing, UnitListing};
pub use load::{load_workspace, LoadedWorkspace};
pub use resolve::{
    check_requirements, locator_chain, resolve_requirement, RequirementCheck, ResolveOptions,
};
