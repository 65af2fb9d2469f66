//! `AllOf` / `AnyOf` — Ordered AND / OR over borrowed matchers
//!
//! Both composites hold `&'a dyn MatcherBase<T>` references; every operand
//! must outlive the composite, and the borrow checker enforces it.
//!
//! # In-progress vs. stored
//!
//! An owned composite is *in progress*: [`AllOf::and`] / [`AnyOf::or`] take
//! `self` by value, so only the single owner can extend it. Once a composite
//! sits behind a shared reference (stored, named and borrowed, or held by
//! another matcher) it is *finalized*: it can be matched, described, negated,
//! or borrowed as one opaque operand of the *other* composite kind, but it can
//! no longer be extended.
//!
//! ```compile_fail
//! use matchkit::{and_, AllOf, Described, Matcher};
//!
//! struct Always;
//!
//! impl Matcher<i64> for Always {
//!     fn matches(&self, _: &i64) -> bool { true }
//!     fn describe(&self) -> String { "always".to_string() }
//! }
//!
//! let (a, b, c) = (Described::new(Always), Described::new(Always), Described::new(Always));
//! let stored: AllOf<'_, i64> = and_(&a, &b);
//! // A borrowed AllOf is not an AllOf operand.
//! let _ = and_(&stored, &c);
//! ```
//!
//! Wrapping a stored composite as the sole operand of a new one of the same
//! kind is not possible either; the single-operand constructor is internal:
//!
//! ```compile_fail
//! use matchkit::{and_, AllOf, Described, Matcher};
//!
//! struct Always;
//!
//! impl Matcher<i64> for Always {
//!     fn matches(&self, _: &i64) -> bool { true }
//!     fn describe(&self) -> String { "always".to_string() }
//! }
//!
//! let (a, b, c) = (Described::new(Always), Described::new(Always), Described::new(Always));
//! let stored: AllOf<'_, i64> = and_(&a, &b);
//! let _ = AllOf::with_matcher(&stored).and(&c);
//! ```
//!
//! ```compile_fail
//! use matchkit::{or_, AnyOf, Described, Matcher};
//!
//! struct Always;
//!
//! impl Matcher<i64> for Always {
//!     fn matches(&self, _: &i64) -> bool { true }
//!     fn describe(&self) -> String { "always".to_string() }
//! }
//!
//! let (a, b, c) = (Described::new(Always), Described::new(Always), Described::new(Always));
//! let stored: AnyOf<'_, i64> = or_(&a, &b);
//! let _ = AnyOf::with_matcher(&stored).or(&c);
//! ```

use crate::compose::{AllOfOperand, AnyOfOperand};
use crate::{DescriptionCache, MatcherBase, MatcherKind};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Render `"( d1<sep>d2<sep>... )"` from each operand's cached description.
fn join_descriptions<T: ?Sized>(matchers: &[&dyn MatcherBase<T>], separator: &str) -> String {
    let mut description = String::with_capacity(4 + matchers.len() * 32);
    description.push_str("( ");
    for (i, matcher) in matchers.iter().enumerate() {
        if i > 0 {
            description.push_str(separator);
        }
        description.push_str(matcher.description());
    }
    description.push_str(" )");
    description
}

/// Shared plumbing for the dynamic builders in [`crate::compose`].
pub(crate) trait Building<'a, T: ?Sized>: Sized {
    const KIND: MatcherKind;

    fn from_matcher(matcher: &'a dyn MatcherBase<T>) -> Self;

    fn operand_count(&self) -> usize;

    fn concat(self, rhs: Self) -> Self;
}

// ═══════════════════════════════════════════════════════════════════════════════
// AllOf
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered AND over borrowed matchers.
///
/// - `matches`: left to right, stops at the first failing operand. Empty → `true`.
/// - `describe`: `"( a and b and c )"`, each operand rendered through its own cache.
///
/// Chaining flattens: `and_(&a, &b).and(&c)` holds three operands, not a
/// nested pair.
///
/// # Example
///
/// ```
/// use matchkit::prelude::*;
///
/// struct Over(i64);
///
/// impl Matcher<i64> for Over {
///     fn matches(&self, arg: &i64) -> bool { *arg > self.0 }
///     fn describe(&self) -> String { format!("greater than {}", self.0) }
/// }
///
/// let (a, b, c) = (Described::new(Over(0)), Described::new(Over(1)), Described::new(Over(2)));
/// let all: AllOf<'_, i64> = and_(&a, &b).and(&c);
///
/// assert_eq!(all.len(), 3);
/// assert!(all.matches(&3));
/// assert!(!all.matches(&2));
/// assert_eq!(all.description(), "( greater than 0 and greater than 1 and greater than 2 )");
/// ```
pub struct AllOf<'a, T: ?Sized> {
    matchers: Vec<&'a dyn MatcherBase<T>>,
    cache: DescriptionCache,
}

impl<'a, T: ?Sized> AllOf<'a, T> {
    /// Create an empty, in-progress AllOf. It matches every value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
            cache: DescriptionCache::new(),
        }
    }

    /// Create an AllOf holding exactly one borrowed operand.
    ///
    /// Callers must not pass a stored AllOf; the operand impls and
    /// [`crate::try_and`] check that before getting here.
    #[must_use]
    pub(crate) fn with_matcher(matcher: &'a dyn MatcherBase<T>) -> Self {
        Self {
            matchers: vec![matcher],
            cache: DescriptionCache::new(),
        }
    }

    /// Extend this in-progress AllOf with `rhs`.
    ///
    /// A borrowed operand is appended; an owned AllOf is spliced in, keeping
    /// left-to-right order. Two in-progress AllOfs therefore concatenate:
    /// `and_(&a, &b).and(and_(&c, &d))` is `( a and b and c and d )`, not
    /// `( a and b and ( c and d ) )`. The right-hand list is owned by nobody
    /// else, so flattening it loses no grouping the caller can still see.
    #[must_use]
    pub fn and(mut self, rhs: impl AllOfOperand<'a, T>) -> Self {
        self.matchers.extend(rhs.into_all_of().matchers);
        // The operand list changed, so any earlier rendering is stale.
        self.cache = DescriptionCache::new();
        self
    }

    /// Evaluate operands in order, short-circuiting on the first `false`.
    pub fn matches(&self, arg: &T) -> bool {
        self.matchers.iter().all(|m| m.matches(arg))
    }

    /// Render the description without consulting this instance's cache.
    #[must_use]
    pub fn describe(&self) -> String {
        join_descriptions(&self.matchers, " and ")
    }

    /// The borrowed operands, in evaluation order.
    #[must_use]
    pub fn matchers(&self) -> &[&'a dyn MatcherBase<T>] {
        &self.matchers
    }

    /// Number of operands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Returns `true` if there are no operands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl<T: ?Sized> Default for AllOf<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> MatcherBase<T> for AllOf<'_, T> {
    fn matches(&self, arg: &T) -> bool {
        AllOf::matches(self, arg)
    }

    fn description(&self) -> &str {
        self.cache.get_or_describe(|| self.describe())
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::AllOf
    }
}

impl<'a, T: ?Sized> Building<'a, T> for AllOf<'a, T> {
    const KIND: MatcherKind = MatcherKind::AllOf;

    fn from_matcher(matcher: &'a dyn MatcherBase<T>) -> Self {
        Self::with_matcher(matcher)
    }

    fn operand_count(&self) -> usize {
        self.len()
    }

    fn concat(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl<'a, T: ?Sized, R: AllOfOperand<'a, T>> BitAnd<R> for AllOf<'a, T> {
    type Output = Self;

    fn bitand(self, rhs: R) -> Self {
        self.and(rhs)
    }
}

impl<T: ?Sized> fmt::Display for AllOf<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl<T: ?Sized> fmt::Debug for AllOf<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AllOf").field(&self.matchers.len()).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AnyOf
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered OR over borrowed matchers.
///
/// Mirror of [`AllOf`]: stops at the first passing operand, an empty AnyOf
/// matches nothing, and descriptions are joined with `" or "`.
/// An AllOf operand is never flattened into an AnyOf (and vice versa).
pub struct AnyOf<'a, T: ?Sized> {
    matchers: Vec<&'a dyn MatcherBase<T>>,
    cache: DescriptionCache,
}

impl<'a, T: ?Sized> AnyOf<'a, T> {
    /// Create an empty, in-progress AnyOf. It matches no value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
            cache: DescriptionCache::new(),
        }
    }

    /// Create an AnyOf holding exactly one borrowed operand.
    ///
    /// Same contract as [`AllOf::with_matcher`].
    #[must_use]
    pub(crate) fn with_matcher(matcher: &'a dyn MatcherBase<T>) -> Self {
        Self {
            matchers: vec![matcher],
            cache: DescriptionCache::new(),
        }
    }

    /// Extend this in-progress AnyOf with `rhs`.
    ///
    /// Mirror of [`AllOf::and`]: an owned AnyOf is spliced in, so two
    /// in-progress AnyOfs concatenate rather than nest.
    #[must_use]
    pub fn or(mut self, rhs: impl AnyOfOperand<'a, T>) -> Self {
        self.matchers.extend(rhs.into_any_of().matchers);
        self.cache = DescriptionCache::new();
        self
    }

    /// Evaluate operands in order, short-circuiting on the first `true`.
    pub fn matches(&self, arg: &T) -> bool {
        self.matchers.iter().any(|m| m.matches(arg))
    }

    /// Render the description without consulting this instance's cache.
    #[must_use]
    pub fn describe(&self) -> String {
        join_descriptions(&self.matchers, " or ")
    }

    /// The borrowed operands, in evaluation order.
    #[must_use]
    pub fn matchers(&self) -> &[&'a dyn MatcherBase<T>] {
        &self.matchers
    }

    /// Number of operands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Returns `true` if there are no operands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl<T: ?Sized> Default for AnyOf<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> MatcherBase<T> for AnyOf<'_, T> {
    fn matches(&self, arg: &T) -> bool {
        AnyOf::matches(self, arg)
    }

    fn description(&self) -> &str {
        self.cache.get_or_describe(|| self.describe())
    }

    fn kind(&self) -> MatcherKind {
        MatcherKind::AnyOf
    }
}

impl<'a, T: ?Sized> Building<'a, T> for AnyOf<'a, T> {
    const KIND: MatcherKind = MatcherKind::AnyOf;

    fn from_matcher(matcher: &'a dyn MatcherBase<T>) -> Self {
        Self::with_matcher(matcher)
    }

    fn operand_count(&self) -> usize {
        self.len()
    }

    fn concat(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl<'a, T: ?Sized, R: AnyOfOperand<'a, T>> BitOr<R> for AnyOf<'a, T> {
    type Output = Self;

    fn bitor(self, rhs: R) -> Self {
        self.or(rhs)
    }
}

impl<T: ?Sized> fmt::Display for AnyOf<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl<T: ?Sized> fmt::Debug for AnyOf<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyOf").field(&self.matchers.len()).finish()
    }
}
