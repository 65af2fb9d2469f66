//! `NotOf` — Negation of one borrowed matcher

use crate::{DescriptionCache, MatcherBase, MatcherKind};
use std::fmt;

/// Inverts the result of one borrowed matcher.
///
/// `describe()` is `"not " + underlying.description()`, which renders (and
/// caches) the underlying matcher's description as well.
///
/// Negation takes part in no flattening rule: it always has exactly one
/// operand, and any matcher (including a stored composite) may be negated.
pub struct NotOf<'a, T: ?Sized> {
    underlying: &'a dyn MatcherBase<T>,
    cache: DescriptionCache,
}

impl<'a, T: ?Sized> NotOf<'a, T> {
    /// Negate `underlying`.
    #[must_use]
    pub fn new(underlying: &'a dyn MatcherBase<T>) -> Self {
        Self {
            underlying,
            cache: DescriptionCache::new(),
        }
    }

    /// `true` exactly when the underlying matcher does not match.
    pub fn matches(&self, arg: &T) -> bool {
        !self.underlying.matches(arg)
    }

    /// Render the description without consulting this instance's cache.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("not {}", self.underlying.description())
    }

    /// The negated matcher.
    #[must_use]
    pub fn underlying(&self) -> &'a dyn MatcherBase<T> {
        self.underlying
    }
}

impl<T: ?Sized> MatcherBase<T> for NotOf<'_, T> {
    fn matches(&self, arg: &T) -> bool {
        NotOf::matches(self, arg)
    }

    fn description(&self) -> &str {
        self.cache.get_or_describe(|| self.describe())
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::Not
    }
}

impl<T: ?Sized> fmt::Display for NotOf<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl<T: ?Sized> fmt::Debug for NotOf<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NotOf")
            .field(&self.underlying.kind())
            .finish()
    }
}
