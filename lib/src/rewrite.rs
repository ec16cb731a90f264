//! Name criteria and bookkeeping for the read-filter-write rewrite shared by all providers.

use crate::error::Result;
use globset::{GlobBuilder, GlobMatcher};
use std::fmt::{self, Display, Formatter};

/// Criterion deciding which entries a rewrite drops.
#[derive(Clone, Debug)]
pub enum MatchCriterion {
    /// Whole-name glob match. `*` and `?` never match `/`.
    Glob(GlobMatcher),
    /// The name contains the string anywhere.
    Substring(String),
}

impl MatchCriterion {
    /// Compiles `pattern` into a glob criterion.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Pattern`] when `pattern` is not a valid glob.
    #[inline]
    pub fn glob(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
        Ok(Self::Glob(glob.compile_matcher()))
    }

    #[inline]
    pub fn substring(payload: impl Into<String>) -> Self {
        Self::Substring(payload.into())
    }

    /// Returns `true` when an entry named `name` must be dropped.
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Glob(glob) => glob.is_match(name),
            Self::Substring(payload) => name.contains(payload.as_str()),
        }
    }
}

impl Display for MatchCriterion {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Glob(glob) => write!(f, "glob '{}'", glob.glob()),
            Self::Substring(payload) => write!(f, "substring '{payload}'"),
        }
    }
}

/// Outcome of a rewrite.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct RewriteReport {
    pub kept: usize,
    pub removed: usize,
}

impl RewriteReport {
    /// Records the verdict for `name` and returns whether the entry is kept.
    #[inline]
    pub(crate) fn keep(&mut self, criterion: &MatchCriterion, name: &str) -> bool {
        if criterion.matches(name) {
            log::debug!("removing '{name}' ({criterion})");
            self.removed += 1;
            false
        } else {
            self.kept += 1;
            true
        }
    }
}
