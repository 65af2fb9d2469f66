//! matchkit - Composable matchers with cached descriptions
//!
//! A small composition engine for test-assertion matchers: leaf predicates
//! combined with AND, OR and NOT into trees that evaluate with short-circuit
//! semantics and describe themselves in readable text.
//!
//! # Architecture
//!
//! - [`Matcher<T>`] — What leaf authors implement: `matches` + `describe`
//! - [`MatcherBase<T>`] — What composites borrow: `matches` + cached `description`
//! - [`Described<M>`] — A leaf paired with its own [`DescriptionCache`]
//! - [`AllOf`] / [`AnyOf`] — Ordered AND / OR over borrowed matchers
//! - [`NotOf`] — Negation of one borrowed matcher
//! - [`and_`] / [`or_`] / [`negate`] — Typed builders
//! - [`try_and`] / [`try_or`] — Dynamic builders for operands known only at runtime
//! - [`check_that`] — Hand-off to an assertion framework
//!
//! # Key Design Insights
//!
//! 1. **Composites borrow, never own**: an `AllOf` holds `&dyn MatcherBase<T>`
//!    references. Every operand must outlive the composite; the borrow checker
//!    enforces it.
//!
//! 2. **Descriptions render at most once**: each instance caches its own text.
//!    A composite's description reuses the cached text of every operand.
//!
//! 3. **Chains flatten while in progress**: `and_(and_(a, b), c)` is one
//!    three-operand `AllOf`. A composite that has been stored and borrowed is
//!    finished and can never be extended.
//!
//! # Example
//!
//! ```
//! use matchkit::prelude::*;
//!
//! struct Equals(i64);
//!
//! impl Matcher<i64> for Equals {
//!     fn matches(&self, arg: &i64) -> bool { *arg == self.0 }
//!     fn describe(&self) -> String { format!("equals {}", self.0) }
//! }
//!
//! struct Positive;
//!
//! impl Matcher<i64> for Positive {
//!     fn matches(&self, arg: &i64) -> bool { *arg > 0 }
//!     fn describe(&self) -> String { "greater than 0".to_string() }
//! }
//!
//! let five = Described::new(Equals(5));
//! let positive = Described::new(Positive);
//!
//! let both: AllOf<'_, i64> = and_(&five, &positive);
//! assert!(both.matches(&5));
//! assert!(!both.matches(&7));
//! assert_eq!(both.description(), "( equals 5 and greater than 0 )");
//!
//! let either: AnyOf<'_, i64> = or_(&five, &positive);
//! assert!(either.matches(&7));
//! assert!(!either.matches(&-5));
//!
//! let not_five = negate::<i64>(&five);
//! assert_eq!(not_five.description(), "not equals 5");
//! ```
//!
//! # Extensions
//!
//! - [`matchkit-test`](https://docs.rs/matchkit-test) — Test domain and YAML conformance fixtures (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod check;
mod compose;
mod composite;
mod description;
mod matcher;
mod negation;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use composite::{AllOf, AnyOf};
pub use description::DescriptionCache;
pub use matcher::{Described, Matcher, MatcherBase, MatcherKind};
pub use negation::NotOf;

// Builders
pub use compose::{
    and_, negate, or_, try_and, try_or, AllOfOperand, AnyOfOperand, Operand, OperandSide,
};

// Assertion boundary
pub use check::{check_that, MatchFailure};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use matchkit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Builders
        and_,
        // Assertion boundary
        check_that,
        negate,
        or_,
        try_and,
        try_or,
        // Core types
        AllOf,
        // Operand traits
        AllOfOperand,
        AnyOf,
        AnyOfOperand,
        // Errors
        CompositionError,
        Described,
        DescriptionCache,
        MatchFailure,
        // Traits
        Matcher,
        MatcherBase,
        MatcherKind,
        NotOf,
        Operand,
        OperandSide,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum number of operands in a single `AllOf` or `AnyOf` built by
/// [`try_and`] or [`try_or`].
///
/// Dynamic trees come from data, so their width is bounded. The typed
/// builders are written out in source and are not checked.
pub const MAX_MATCHERS_PER_COMPOSITE: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from the dynamic builders.
///
/// The typed builders cannot fail: the same mistakes are rejected at compile
/// time instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// A borrowed operand is a stored composite of the kind being built.
    ///
    /// Only an in-progress composite, passed by value, can be extended.
    FinalizedComposite {
        /// The composite kind being built (`AllOf` or `AnyOf`).
        kind: MatcherKind,
        /// Which operand was the stored composite.
        side: OperandSide,
    },
    /// The combined composite would exceed [`MAX_MATCHERS_PER_COMPOSITE`].
    TooManyMatchers {
        /// Operand count the composite would have had.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
}

impl std::fmt::Display for CompositionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FinalizedComposite { kind, side } => {
                write!(
                    f,
                    "{side} operand is a stored {kind} composite and cannot be extended \
                     — pass the in-progress composite by value, or negate the stored one"
                )
            }
            Self::TooManyMatchers { count, max } => {
                write!(
                    f,
                    "composite has {count} operands, but maximum allowed is {max}"
                )
            }
        }
    }
}

impl std::error::Error for CompositionError {}
