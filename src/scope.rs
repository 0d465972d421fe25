//! @acp:module "Scope Set"
//! @acp:summary "Sorted, immutable set of active scope names with wildcard matching"
//! @acp:domain serialization
//! @acp:layer model

use std::fmt;
use std::sync::Arc;

/// Scope name that every scope set contains.
pub const WILDCARD: &str = "*";

/// @acp:summary "Active scopes for one projection request"
///
/// Names are sorted once at construction so lookups can binary search.
/// Duplicates are kept as given. Cloning is cheap, which lets child contexts
/// share the parent's set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    scopes: Arc<[String]>,
}

impl ScopeSet {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        if scopes.len() > 1 {
            scopes.sort();
        }
        Self {
            scopes: scopes.into(),
        }
    }

    /// An empty set. Only wildcard queries match it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// @acp:summary "Whether `scope` is active; the wildcard always is"
    pub fn contains(&self, scope: &str) -> bool {
        if scope == WILDCARD {
            return true;
        }
        self.scopes
            .binary_search_by(|probe| probe.as_str().cmp(scope))
            .is_ok()
    }

    /// Whether any of `scopes` is active.
    pub fn contains_any<I, S>(&self, scopes: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        scopes.into_iter().any(|scope| self.contains(scope.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.scopes
    }
}

impl fmt::Debug for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scopes.join(","))
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
