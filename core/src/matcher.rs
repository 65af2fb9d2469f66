//! Matcher capability traits and the cached leaf wrapper
//!
//! Two traits split the responsibilities:
//!
//! - [`Matcher<T>`] is what leaf authors implement: a pure predicate plus a
//!   description of the check.
//! - [`MatcherBase<T>`] is what composites borrow: a predicate plus a
//!   *cached* description. [`Described`] bridges the two.

use crate::DescriptionCache;
use std::fmt;

/// A predicate over `T` paired with a human-readable description.
///
/// # Contract
///
/// - `matches` is pure and deterministic: same input, same answer, no side effects.
/// - `describe` describes the check, not an outcome. It must not depend on any
///   particular input value and must have no observable side effects, because
///   callers cannot know whether it will run zero times or once.
///
/// # Example
///
/// ```
/// use matchkit::{Described, Matcher, MatcherBase};
///
/// struct IsEven;
///
/// impl Matcher<i64> for IsEven {
///     fn matches(&self, arg: &i64) -> bool {
///         arg % 2 == 0
///     }
///
///     fn describe(&self) -> String {
///         "is even".to_string()
///     }
/// }
///
/// let even = Described::new(IsEven);
/// let even: &dyn MatcherBase<i64> = &even;
/// assert!(even.matches(&4));
/// assert!(!even.matches(&7));
/// assert_eq!(even.description(), "is even");
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Matcher<{T}>`",
    label = "this type cannot be used as a leaf matcher",
    note = "implement `matches(&self, &{T}) -> bool` and `describe(&self) -> String`, then wrap the value in `Described::new`"
)]
pub trait Matcher<T: ?Sized> {
    /// Check whether `arg` satisfies this predicate.
    fn matches(&self, arg: &T) -> bool;

    /// Render a description of the check.
    fn describe(&self) -> String;
}

impl<T: ?Sized, M: Matcher<T> + ?Sized> Matcher<T> for Box<M> {
    fn matches(&self, arg: &T) -> bool {
        (**self).matches(arg)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Which shape of matcher sits behind a [`MatcherBase`] reference.
///
/// Used by the dynamic builders to refuse stored composites, and in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    /// A leaf predicate supplied from outside the core.
    Leaf,
    /// An ordered AND composite.
    AllOf,
    /// An ordered OR composite.
    AnyOf,
    /// A negation of one matcher.
    Not,
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Leaf => "leaf",
            Self::AllOf => "all_of",
            Self::AnyOf => "any_of",
            Self::Not => "not",
        })
    }
}

/// A matcher whose description is rendered at most once.
///
/// Composites hold `&dyn MatcherBase<T>` references to their operands, so
/// every operand's own cache is reused when a composite renders.
///
/// This trait is object-safe.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `MatcherBase<{T}>`",
    label = "composites can only borrow cached matchers",
    note = "wrap leaf matchers in `Described::new(..)` before combining them"
)]
pub trait MatcherBase<T: ?Sized> {
    /// Check whether `arg` satisfies this matcher.
    fn matches(&self, arg: &T) -> bool;

    /// The cached description, rendering it on first call.
    fn description(&self) -> &str;

    /// The shape of this matcher. Leaves keep the default.
    fn kind(&self) -> MatcherKind {
        MatcherKind::Leaf
    }
}

/// A leaf [`Matcher`] paired with its own [`DescriptionCache`].
///
/// # Copying vs. overwriting
///
/// `Described<M>` is `Clone` when `M` is, so a matcher can be duplicated as a
/// template; the copy carries any description already rendered. Overwriting a
/// `Described` that a composite still borrows is rejected by the borrow checker:
///
/// ```compile_fail
/// use matchkit::{and_, AllOf, Described, Matcher};
///
/// #[derive(Clone)]
/// struct Always(&'static str);
///
/// impl Matcher<i64> for Always {
///     fn matches(&self, _: &i64) -> bool { true }
///     fn describe(&self) -> String { self.0.to_string() }
/// }
///
/// let mut a = Described::new(Always("a"));
/// let b = Described::new(Always("b"));
/// let both: AllOf<'_, i64> = and_(&a, &b);
/// a = b.clone(); // `a` is still borrowed by `both`
/// let _ = both.describe();
/// ```
#[derive(Clone, Default)]
pub struct Described<M> {
    matcher: M,
    cache: DescriptionCache,
}

impl<M> Described<M> {
    /// Wrap a leaf matcher with an empty description cache.
    pub fn new(matcher: M) -> Self {
        Self {
            matcher,
            cache: DescriptionCache::new(),
        }
    }

    /// Returns the wrapped leaf matcher.
    #[must_use]
    pub fn inner(&self) -> &M {
        &self.matcher
    }

    /// Returns the description cache of this instance.
    #[must_use]
    pub fn cache(&self) -> &DescriptionCache {
        &self.cache
    }

    /// Unwrap the leaf, discarding any cached description.
    pub fn into_inner(self) -> M {
        self.matcher
    }
}

impl<T: ?Sized, M: Matcher<T>> MatcherBase<T> for Described<M> {
    fn matches(&self, arg: &T) -> bool {
        self.matcher.matches(arg)
    }

    fn description(&self) -> &str {
        self.cache.get_or_describe(|| self.matcher.describe())
    }
}

impl<M> From<M> for Described<M> {
    fn from(matcher: M) -> Self {
        Self::new(matcher)
    }
}

impl<M: fmt::Debug> fmt::Debug for Described<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Described")
            .field("matcher", &self.matcher)
            .field("cache", &self.cache)
            .finish()
    }
}
