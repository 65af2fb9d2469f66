//! `DescriptionCache` — One-shot storage for a rendered matcher description
//!
//! Descriptions are only needed on the failure path, and rendering one may
//! walk a whole composite tree. The cache renders at most once per instance
//! and hands out the same `&str` afterwards.

use std::cell::OnceCell;
use std::fmt;

/// Holds the rendered description of exactly one matcher instance.
///
/// The cache starts empty. [`get_or_describe`](Self::get_or_describe) fills it
/// on first use and never changes it again.
///
/// # INV: describe runs at most once
///
/// There is no setter. The only way to fill a cache is through
/// `get_or_describe`, so a description can never be swapped for another
/// matcher's text after the fact.
///
/// # Copying
///
/// `Clone` duplicates the rendered text (if any) into an independent cache.
/// The copy owns its own cell from then on.
///
/// # Thread Safety
///
/// Backed by [`OnceCell`], so the cache (and every matcher holding one) is
/// `!Sync`. Sharing a single instance across threads does not compile; give
/// each thread its own clone instead.
///
/// # Example
///
/// ```
/// use matchkit::DescriptionCache;
///
/// let cache = DescriptionCache::new();
/// assert!(!cache.is_rendered());
///
/// assert_eq!(cache.get_or_describe(|| "equals 5".to_string()), "equals 5");
/// // Second call does not re-render.
/// assert_eq!(cache.get_or_describe(|| unreachable!()), "equals 5");
/// ```
#[derive(Clone, Default)]
pub struct DescriptionCache {
    rendered: OnceCell<String>,
}

impl DescriptionCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached description, rendering it with `describe` if empty.
    ///
    /// `describe` is called at most once over the lifetime of this cache.
    pub fn get_or_describe(&self, describe: impl FnOnce() -> String) -> &str {
        self.rendered.get_or_init(|| {
            let rendered = describe();
            tracing::trace!(len = rendered.len(), "rendered matcher description");
            rendered
        })
    }

    /// Return the description if it has already been rendered.
    #[must_use]
    pub fn get(&self) -> Option<&str> {
        self.rendered.get().map(String::as_str)
    }

    /// Returns `true` once the description has been rendered.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.rendered.get().is_some()
    }
}

impl fmt::Debug for DescriptionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DescriptionCache").field(&self.get()).finish()
    }
}
