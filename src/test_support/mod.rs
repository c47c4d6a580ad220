//! Test utilities and mocks for Slipway unit tests.
//!
//! Provides the reference fixtures plus instrumented implementations of the
//! lookup seams, so tests can observe how a locator drives them.
//!
//! # Example
//!
//! ```rust,ignore
//! use slipway::test_support::{app_workspace, CountingLookup};
//!
//! let ws = app_workspace();
//! let lookup = CountingLookup::new(&ws);
//! // hand `&lookup` to a locator, then check `lookup.calls()`
//! ```

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::core::{
    BinarySet, BuildUnit, BuildUnitLookup, ExtensionLookup, ExtensionRef,
    NativeLibraryRequirement, UnitLookupError,
};
use crate::resolver::{LibraryBinaryLocator, LocateError};

// Re-export fixtures for convenience
pub use fixtures::*;

/// A [`BuildUnitLookup`] that counts how often it is asked.
#[derive(Debug)]
pub struct CountingLookup<L> {
    inner: L,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

impl<L: BuildUnitLookup> CountingLookup<L> {
    pub fn new(inner: L) -> Self {
        CountingLookup {
            inner,
            calls: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Paths requested, in call order.
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl<L: BuildUnitLookup> BuildUnitLookup for CountingLookup<L> {
    fn resolve(&self, path: &str) -> Result<&BuildUnit, UnitLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(path.to_string());
        self.inner.resolve(path)
    }
}

/// An [`ExtensionLookup`] that records requested names and reads extensions
/// from the unit under a prefix, e.g. `libraries` is served from `test.libraries`.
#[derive(Debug, Default)]
pub struct PrefixedExtensions {
    pub prefix: &'static str,
    requested: Mutex<Vec<String>>,
}

impl PrefixedExtensions {
    pub fn new(prefix: &'static str) -> Self {
        PrefixedExtensions {
            prefix,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl ExtensionLookup for PrefixedExtensions {
    fn find_by_name<'u>(&self, unit: &'u BuildUnit, name: &str) -> Option<ExtensionRef<'u>> {
        self.requested.lock().unwrap().push(name.to_string());
        unit.extensions()
            .find_by_name(&format!("{}{}", self.prefix, name))
    }
}

type LocateFn = Box<dyn Fn(&NativeLibraryRequirement) -> Result<BinarySet, LocateError> + Send + Sync>;

/// A locator whose answer is a closure; counts invocations.
pub struct MockLocator {
    name: String,
    locate: LocateFn,
    calls: AtomicUsize,
}

impl MockLocator {
    pub fn new(
        name: impl Into<String>,
        locate: impl Fn(&NativeLibraryRequirement) -> Result<BinarySet, LocateError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        MockLocator {
            name: name.into(),
            locate: Box::new(locate),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always returns `binaries`.
    pub fn returning(name: impl Into<String>, binaries: BinarySet) -> Self {
        Self::new(name, move |_| Ok(binaries.clone()))
    }

    /// Always fails with a prebuilt-not-found error.
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, |req| {
            Err(LocateError::PrebuiltNotFound {
                library: req.library_name().to_string(),
                searched: Vec::new(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LibraryBinaryLocator for MockLocator {
    fn name(&self) -> &str {
        &self.name
    }

    fn binaries(&self, requirement: &NativeLibraryRequirement) -> Result<BinarySet, LocateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.locate)(requirement)
    }
}
