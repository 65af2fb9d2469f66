//! Composition builders — `and_`, `or_`, `negate`, and their dynamic forms
//!
//! # Rules
//!
//! For `and_(lhs, rhs)` (and symmetrically `or_`):
//!
//! 1. in-progress AllOf `and` borrowed operand → operand appended
//! 2. borrowed operand `and` in-progress AllOf → operand prepended
//! 3. two borrowed operands → a fresh AllOf holding both
//! 4. a *stored* AllOf on either side → refused
//!
//! The typed builders enforce rule 4 at compile time: a borrowed `AllOf` does
//! not implement [`AllOfOperand`]. The dynamic builders ([`try_and`],
//! [`try_or`]) work on type-erased `&dyn MatcherBase<T>` operands and enforce
//! it at construction time with [`CompositionError::FinalizedComposite`].

use crate::composite::Building;
use crate::{
    AllOf, AnyOf, CompositionError, Described, Matcher, MatcherBase, NotOf,
    MAX_MATCHERS_PER_COMPOSITE,
};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// Operand traits
// ═══════════════════════════════════════════════════════════════════════════════

/// A value that may stand on either side of `and_`.
///
/// Implemented for borrowed leaves, borrowed negations, a borrowed [`AnyOf`]
/// (one opaque operand), and an owned in-progress [`AllOf`] (spliced in).
/// A borrowed `AllOf` is not an operand.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be combined with `and_`",
    label = "not an AllOf operand",
    note = "a stored `AllOf` cannot be extended; build the whole chain in one expression, or negate / OR it instead"
)]
pub trait AllOfOperand<'a, T: ?Sized> {
    /// Convert into an AllOf whose operands are spliced into the caller's list.
    fn into_all_of(self) -> AllOf<'a, T>;
}

/// A value that may stand on either side of `or_`.
///
/// Mirror of [`AllOfOperand`]: a borrowed [`AnyOf`] is absent, a borrowed
/// [`AllOf`] is one opaque operand.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be combined with `or_`",
    label = "not an AnyOf operand",
    note = "a stored `AnyOf` cannot be extended; build the whole chain in one expression, or negate / AND it instead"
)]
pub trait AnyOfOperand<'a, T: ?Sized> {
    /// Convert into an AnyOf whose operands are spliced into the caller's list.
    fn into_any_of(self) -> AnyOf<'a, T>;
}

impl<'a, T: ?Sized> AllOfOperand<'a, T> for AllOf<'a, T> {
    fn into_all_of(self) -> AllOf<'a, T> {
        self
    }
}

impl<'a, T: ?Sized> AnyOfOperand<'a, T> for AnyOf<'a, T> {
    fn into_any_of(self) -> AnyOf<'a, T> {
        self
    }
}

impl<'a, T: ?Sized, M: Matcher<T>> AllOfOperand<'a, T> for &'a Described<M> {
    fn into_all_of(self) -> AllOf<'a, T> {
        AllOf::with_matcher(self)
    }
}

impl<'a, T: ?Sized, M: Matcher<T>> AnyOfOperand<'a, T> for &'a Described<M> {
    fn into_any_of(self) -> AnyOf<'a, T> {
        AnyOf::with_matcher(self)
    }
}

impl<'a, 'b: 'a, T: ?Sized> AllOfOperand<'a, T> for &'a NotOf<'b, T> {
    fn into_all_of(self) -> AllOf<'a, T> {
        AllOf::with_matcher(self)
    }
}

impl<'a, 'b: 'a, T: ?Sized> AnyOfOperand<'a, T> for &'a NotOf<'b, T> {
    fn into_any_of(self) -> AnyOf<'a, T> {
        AnyOf::with_matcher(self)
    }
}

impl<'a, 'b: 'a, T: ?Sized> AllOfOperand<'a, T> for &'a AnyOf<'b, T> {
    fn into_all_of(self) -> AllOf<'a, T> {
        AllOf::with_matcher(self)
    }
}

impl<'a, 'b: 'a, T: ?Sized> AnyOfOperand<'a, T> for &'a AllOf<'b, T> {
    fn into_any_of(self) -> AnyOf<'a, T> {
        AnyOf::with_matcher(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Typed builders
// ═══════════════════════════════════════════════════════════════════════════════

/// Combine two operands with AND, flattening in-progress AllOfs.
///
/// # Example
///
/// ```
/// use matchkit::prelude::*;
///
/// struct Is(i64);
///
/// impl Matcher<i64> for Is {
///     fn matches(&self, arg: &i64) -> bool { *arg == self.0 }
///     fn describe(&self) -> String { format!("equals {}", self.0) }
/// }
///
/// let (a, b, c) = (Described::new(Is(1)), Described::new(Is(2)), Described::new(Is(3)));
/// let all: AllOf<'_, i64> = and_(&a, and_(&b, &c));
/// assert_eq!(all.description(), "( equals 1 and equals 2 and equals 3 )");
/// ```
#[must_use]
pub fn and_<'a, T: ?Sized>(
    lhs: impl AllOfOperand<'a, T>,
    rhs: impl AllOfOperand<'a, T>,
) -> AllOf<'a, T> {
    lhs.into_all_of().and(rhs)
}

/// Combine two operands with OR, flattening in-progress AnyOfs.
#[must_use]
pub fn or_<'a, T: ?Sized>(
    lhs: impl AnyOfOperand<'a, T>,
    rhs: impl AnyOfOperand<'a, T>,
) -> AnyOf<'a, T> {
    lhs.into_any_of().or(rhs)
}

/// Negate one matcher. Any matcher may be negated, including a stored composite.
#[must_use]
pub fn negate<'a, T: ?Sized>(matcher: &'a dyn MatcherBase<T>) -> NotOf<'a, T> {
    NotOf::new(matcher)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dynamic builders
// ═══════════════════════════════════════════════════════════════════════════════

/// Which side of a binary composition an operand stood on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandSide {
    /// Left-hand operand.
    Left,
    /// Right-hand operand.
    Right,
}

impl fmt::Display for OperandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// An operand of [`try_and`] / [`try_or`].
///
/// `C` is the composite being built: an in-progress `C` is spliced in, and a
/// borrowed matcher is checked for being a stored `C`.
pub enum Operand<'a, T: ?Sized, C> {
    /// A borrowed, type-erased matcher.
    Borrowed(&'a dyn MatcherBase<T>),
    /// An owned, in-progress composite of the kind being built.
    Building(C),
}

impl<'a, T: ?Sized, C> From<&'a dyn MatcherBase<T>> for Operand<'a, T, C> {
    fn from(matcher: &'a dyn MatcherBase<T>) -> Self {
        Self::Borrowed(matcher)
    }
}

impl<'a, T: ?Sized> From<AllOf<'a, T>> for Operand<'a, T, AllOf<'a, T>> {
    fn from(all: AllOf<'a, T>) -> Self {
        Self::Building(all)
    }
}

impl<'a, T: ?Sized> From<AnyOf<'a, T>> for Operand<'a, T, AnyOf<'a, T>> {
    fn from(any: AnyOf<'a, T>) -> Self {
        Self::Building(any)
    }
}

impl<T: ?Sized, C: fmt::Debug> fmt::Debug for Operand<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrowed(m) => f.debug_tuple("Borrowed").field(&m.kind()).finish(),
            Self::Building(c) => f.debug_tuple("Building").field(c).finish(),
        }
    }
}

fn resolve<'a, T: ?Sized, C: Building<'a, T>>(
    operand: Operand<'a, T, C>,
    side: OperandSide,
) -> Result<C, CompositionError> {
    match operand {
        Operand::Building(composite) => Ok(composite),
        Operand::Borrowed(matcher) if matcher.kind() == C::KIND => {
            let kind = C::KIND;
            tracing::debug!(%kind, %side, "refused to extend a stored composite");
            Err(CompositionError::FinalizedComposite { kind, side })
        }
        Operand::Borrowed(matcher) => Ok(C::from_matcher(matcher)),
    }
}

fn combine<'a, T: ?Sized, C: Building<'a, T>>(
    lhs: Operand<'a, T, C>,
    rhs: Operand<'a, T, C>,
) -> Result<C, CompositionError> {
    let lhs = resolve(lhs, OperandSide::Left)?;
    let rhs = resolve(rhs, OperandSide::Right)?;

    let count = lhs.operand_count() + rhs.operand_count();
    if count > MAX_MATCHERS_PER_COMPOSITE {
        let kind = C::KIND;
        tracing::debug!(%kind, count, "refused oversized composite");
        return Err(CompositionError::TooManyMatchers {
            count,
            max: MAX_MATCHERS_PER_COMPOSITE,
        });
    }

    Ok(lhs.concat(rhs))
}

/// AND two operands whose concrete types are not known statically.
///
/// # Errors
///
/// - [`CompositionError::FinalizedComposite`] if a borrowed operand is an `AllOf`.
/// - [`CompositionError::TooManyMatchers`] if the result would exceed
///   [`MAX_MATCHERS_PER_COMPOSITE`] operands.
///
/// # Example
///
/// ```
/// use matchkit::prelude::*;
///
/// struct Any;
///
/// impl Matcher<i64> for Any {
///     fn matches(&self, _: &i64) -> bool { true }
///     fn describe(&self) -> String { "anything".to_string() }
/// }
///
/// let (a, b, c) = (Described::new(Any), Described::new(Any), Described::new(Any));
/// let (a, b, c): (&dyn MatcherBase<i64>, &dyn MatcherBase<i64>, &dyn MatcherBase<i64>) = (&a, &b, &c);
///
/// let stored = try_and(a.into(), b.into()).unwrap();
/// let stored: &dyn MatcherBase<i64> = &stored;
///
/// let err = try_and(stored.into(), c.into()).unwrap_err();
/// assert!(matches!(err, CompositionError::FinalizedComposite { .. }));
/// ```
pub fn try_and<'a, T: ?Sized>(
    lhs: Operand<'a, T, AllOf<'a, T>>,
    rhs: Operand<'a, T, AllOf<'a, T>>,
) -> Result<AllOf<'a, T>, CompositionError> {
    combine(lhs, rhs)
}

/// OR two operands whose concrete types are not known statically.
///
/// # Errors
///
/// - [`CompositionError::FinalizedComposite`] if a borrowed operand is an `AnyOf`.
/// - [`CompositionError::TooManyMatchers`] if the result would exceed
///   [`MAX_MATCHERS_PER_COMPOSITE`] operands.
pub fn try_or<'a, T: ?Sized>(
    lhs: Operand<'a, T, AnyOf<'a, T>>,
    rhs: Operand<'a, T, AnyOf<'a, T>>,
) -> Result<AnyOf<'a, T>, CompositionError> {
    combine(lhs, rhs)
}
