//! Ordered chains of locators.

use serde::{Deserialize, Serialize};

use crate::core::{BinarySet, NativeLibraryRequirement};
use crate::resolver::errors::LocateError;
use crate::resolver::locator::LibraryBinaryLocator;

/// How a [`LocatorChain`] combines the answers of its locators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainPolicy {
    /// Stop at the first locator that returns a non-empty set.
    #[default]
    First,
    /// Ask every locator and union the successful answers. When two answers
    /// hold binaries of the same name, the earlier locator's binary is kept.
    Merge,
}

impl std::fmt::Display for ChainPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainPolicy::First => write!(f, "first"),
            ChainPolicy::Merge => write!(f, "merge"),
        }
    }
}

/// Locators tried in order.
///
/// A failing locator does not stop the chain. Failures are reported only when
/// no locator succeeds: a single failure as-is, several as
/// [`LocateError::Unresolved`]. With [`ChainPolicy::First`] an empty success
/// lets the search continue, but is still returned if nothing better turns up.
pub struct LocatorChain<'a> {
    locators: Vec<Box<dyn LibraryBinaryLocator + 'a>>,
    policy: ChainPolicy,
}

impl<'a> LocatorChain<'a> {
    pub fn new(policy: ChainPolicy) -> Self {
        LocatorChain {
            locators: Vec::new(),
            policy,
        }
    }

    /// Append a locator (builder style).
    pub fn with(mut self, locator: impl LibraryBinaryLocator + 'a) -> Self {
        self.push(locator);
        self
    }

    pub fn push(&mut self, locator: impl LibraryBinaryLocator + 'a) {
        self.locators.push(Box::new(locator));
    }

    pub fn policy(&self) -> ChainPolicy {
        self.policy
    }

    /// Locator names in search order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.locators.iter().map(|l| l.name())
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

impl std::fmt::Debug for LocatorChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocatorChain")
            .field("locators", &self.names().collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish()
    }
}

impl LibraryBinaryLocator for LocatorChain<'_> {
    fn name(&self) -> &str {
        "chain"
    }

    fn binaries(&self, requirement: &NativeLibraryRequirement) -> Result<BinarySet, LocateError> {
        let mut found: Option<BinarySet> = None;
        let mut failures: Vec<(String, LocateError)> = Vec::new();

        for locator in &self.locators {
            match locator.binaries(requirement) {
                Ok(binaries) => {
                    tracing::debug!(
                        locator = locator.name(),
                        %requirement,
                        binaries = binaries.len(),
                        "locator answered"
                    );
                    match self.policy {
                        ChainPolicy::First if !binaries.is_empty() => return Ok(binaries),
                        ChainPolicy::First => {
                            if found.is_none() {
                                found = Some(binaries);
                            }
                        }
                        ChainPolicy::Merge => {
                            found.get_or_insert_with(BinarySet::new).merge(&binaries);
                        }
                    }
                }
                Err(err) => {
                    tracing::debug!(
                        locator = locator.name(),
                        %requirement,
                        error = %err,
                        "locator failed"
                    );
                    failures.push((locator.name().to_string(), err));
                }
            }
        }

        if let Some(binaries) = found {
            return Ok(binaries);
        }

        match failures.len() {
            1 => Err(failures.remove(0).1),
            _ => Err(LocateError::Unresolved {
                requirement: requirement.clone(),
                attempts: failures,
            }),
        }
    }
}
