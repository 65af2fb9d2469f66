//! `check_that` — The hand-off point to an assertion framework
//!
//! One call to `matches`; on failure, one call to `description`. Nothing is
//! rendered on the success path.

use crate::MatcherBase;
use std::fmt;

/// A failed check: the actual value and the description of what was expected.
///
/// Formatting a full report is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFailure {
    /// `Debug` rendering of the value that did not match.
    pub actual: String,
    /// The matcher's description.
    pub description: String,
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} does not satisfy {}", self.actual, self.description)
    }
}

impl std::error::Error for MatchFailure {}

/// Check `actual` against `matcher`.
///
/// Calls `matches` exactly once. Only when it returns `false` is the
/// description requested, exactly once.
///
/// # Errors
///
/// Returns [`MatchFailure`] when `matcher` does not match `actual`.
///
/// # Example
///
/// ```
/// use matchkit::prelude::*;
///
/// struct Positive;
///
/// impl Matcher<i64> for Positive {
///     fn matches(&self, arg: &i64) -> bool { *arg > 0 }
///     fn describe(&self) -> String { "greater than 0".to_string() }
/// }
///
/// let positive = Described::new(Positive);
/// assert!(check_that(&3_i64, &positive).is_ok());
///
/// let failure = check_that(&-3_i64, &positive).unwrap_err();
/// assert_eq!(failure.to_string(), "-3 does not satisfy greater than 0");
/// ```
pub fn check_that<T, M>(actual: &T, matcher: &M) -> Result<(), MatchFailure>
where
    T: ?Sized + fmt::Debug,
    M: MatcherBase<T> + ?Sized,
{
    if matcher.matches(actual) {
        return Ok(());
    }

    let failure = MatchFailure {
        actual: format!("{actual:?}"),
        description: matcher.description().to_string(),
    };
    tracing::debug!(
        kind = %matcher.kind(),
        actual = %failure.actual,
        description = %failure.description,
        "match failed"
    );
    Err(failure)
}
