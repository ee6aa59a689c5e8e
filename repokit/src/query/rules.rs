//! Filter, sort and page rules for repository queries
//!
//! These are the pieces a [`QueryParameters`](super::QueryParameters) is made
//! of. Repository implementations read them back and either translate them
//! into their store's query language or apply them in memory with the helpers
//! provided here.
//!
//! # Example
//!
//! ```rust
//! use repokit::expression::{KeySelector, Predicate};
//! use repokit::query::{FilterRule, PageRule, SortDirection, SortRule};
//!
//! let active = FilterRule::new(Predicate::<(u32, bool)>::new("r", |r| r.test("active", |r| r.1)));
//! let newest_first = SortRule::descending(KeySelector::<(u32, bool)>::member("id", |r| r.0));
//! let page = PageRule::new(2, 25);
//!
//! assert!(active.is_satisfied_by(&(7, true)).unwrap());
//! assert_eq!(newest_first.direction, SortDirection::Descending);
//! assert_eq!(page.skip(), Some(50));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::QueryDefaults;
use crate::error::Result;
use crate::expression::{KeySelector, Predicate};

/// Direction for ordering results
///
/// # Example
///
/// ```rust
/// use repokit::query::SortDirection;
///
/// assert_eq!(SortDirection::default(), SortDirection::Ascending);
/// assert_eq!(format!("{}", SortDirection::Descending), "desc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest key first
    #[default]
    Ascending,
    /// Largest key first
    Descending,
}

impl SortDirection {
    /// Orient an ascending `ordering` in this direction
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Which entities a query selects
///
/// A rule without an expression selects every entity.
pub struct FilterRule<E> {
    /// The filtering predicate
    pub expression: Option<Predicate<E>>,
}

impl<E> FilterRule<E> {
    /// Filter by `expression`
    pub fn new(expression: Predicate<E>) -> Self {
        Self {
            expression: Some(expression),
        }
    }

    /// A rule selecting every entity
    pub fn all() -> Self {
        Self { expression: None }
    }

    /// Whether this rule constrains anything
    pub fn is_constrained(&self) -> bool {
        self.expression.is_some()
    }

    /// Evaluate the rule against `candidate`
    ///
    /// # Errors
    ///
    /// Whatever evaluating the predicate raises.
    pub fn is_satisfied_by(&self, candidate: &E) -> Result<bool> {
        match &self.expression {
            Some(predicate) => predicate.is_satisfied_by(candidate),
            None => Ok(true),
        }
    }
}

impl<E> Default for FilterRule<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E> Clone for FilterRule<E> {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
        }
    }
}

impl<E> fmt::Debug for FilterRule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRule")
            .field("expression", &self.expression)
            .finish()
    }
}

impl<E> From<Predicate<E>> for FilterRule<E> {
    fn from(expression: Predicate<E>) -> Self {
        Self::new(expression)
    }
}

/// How a query orders its results
pub struct SortRule<E> {
    /// Selects the value entities are ordered by
    pub key_selector: Option<KeySelector<E>>,
    /// Ordering direction
    pub direction: SortDirection,
}

impl<E> SortRule<E> {
    /// Order by `key_selector` in `direction`
    pub fn new(key_selector: KeySelector<E>, direction: SortDirection) -> Self {
        Self {
            key_selector: Some(key_selector),
            direction,
        }
    }

    /// Order by `key_selector`, smallest first
    pub fn ascending(key_selector: KeySelector<E>) -> Self {
        Self::new(key_selector, SortDirection::Ascending)
    }

    /// Order by `key_selector`, largest first
    pub fn descending(key_selector: KeySelector<E>) -> Self {
        Self::new(key_selector, SortDirection::Descending)
    }

    /// A rule is valid when it has a key selector
    pub fn is_valid(&self) -> bool {
        self.key_selector.is_some()
    }

    /// Compare two entities under this rule
    ///
    /// Keys that cannot be ordered against each other compare equal, as does
    /// everything under a rule without a key selector.
    ///
    /// # Errors
    ///
    /// Whatever evaluating the key selector raises.
    pub fn compare(&self, a: &E, b: &E) -> Result<Ordering> {
        let Some(selector) = &self.key_selector else {
            return Ok(Ordering::Equal);
        };
        let left = selector.evaluate(a)?;
        let right = selector.evaluate(b)?;
        let ordering = left.compare(&right).unwrap_or(Ordering::Equal);
        Ok(self.direction.apply(ordering))
    }

    /// Stable in-place sort of `items`
    ///
    /// # Errors
    ///
    /// The first error raised by the key selector; `items` is left untouched.
    pub fn sort(&self, items: &mut [E]) -> Result<()> {
        let Some(selector) = &self.key_selector else {
            return Ok(());
        };
        let mut keyed = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            keyed.push((selector.evaluate(item)?, position));
        }
        keyed.sort_by(|(left, _), (right, _)| {
            self.direction
                .apply(left.compare(right).unwrap_or(Ordering::Equal))
        });

        let order: Vec<usize> = keyed.into_iter().map(|(_, position)| position).collect();
        apply_permutation(items, order);
        Ok(())
    }
}

/// Rearrange `items` so that `items[i]` becomes the old `items[order[i]]`
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..order.len() {
        let mut current = start;
        while order[current] != start {
            let next = order[current];
            items.swap(current, next);
            order[current] = current;
            current = next;
        }
        order[current] = current;
    }
}

impl<E> Clone for SortRule<E> {
    fn clone(&self) -> Self {
        Self {
            key_selector: self.key_selector.clone(),
            direction: self.direction,
        }
    }
}

impl<E> fmt::Debug for SortRule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortRule")
            .field("key_selector", &self.key_selector)
            .field("direction", &self.direction)
            .finish()
    }
}

/// Which page of results a query returns
///
/// `index` is zero-based. Both fields are signed so that out-of-range input
/// can be represented and rejected by [`PageRule::is_valid`].
///
/// # Example
///
/// ```rust
/// use repokit::query::PageRule;
///
/// assert!(PageRule::new(0, 10).is_valid());
/// assert!(!PageRule::new(-1, 10).is_valid());
/// assert!(!PageRule::new(0, 0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRule {
    /// Zero-based page number
    pub index: i64,
    /// Entities per page
    pub size: i64,
}

impl PageRule {
    /// Page `index` holding `size` entities
    #[must_use]
    pub const fn new(index: i64, size: i64) -> Self {
        Self { index, size }
    }

    /// The first page holding `size` entities
    #[must_use]
    pub const fn first(size: i64) -> Self {
        Self { index: 0, size }
    }

    /// `index >= 0 && size > 0`
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.index >= 0 && self.size > 0
    }

    /// Entities to skip before this page, `None` when invalid
    #[must_use]
    pub fn skip(&self) -> Option<u64> {
        if !self.is_valid() {
            return None;
        }
        let skip = self.index.checked_mul(self.size)?;
        u64::try_from(skip).ok()
    }

    /// Entities to take for this page, `None` when invalid
    #[must_use]
    pub fn take(&self) -> Option<u64> {
        if !self.is_valid() {
            return None;
        }
        u64::try_from(self.size).ok()
    }

    /// Clamp into range using the configured defaults
    ///
    /// A negative index becomes `0`, a non-positive size becomes the default
    /// page size, and sizes above the maximum are capped.
    ///
    /// ```rust
    /// use repokit::config::QueryDefaults;
    /// use repokit::query::PageRule;
    ///
    /// let defaults = QueryDefaults::default();
    /// assert_eq!(PageRule::new(-3, 0).normalized(&defaults), PageRule::new(0, 20));
    /// assert_eq!(PageRule::new(2, 5000).normalized(&defaults), PageRule::new(2, 100));
    /// ```
    #[must_use]
    pub fn normalized(&self, defaults: &QueryDefaults) -> Self {
        let size = if self.size <= 0 {
            defaults.default_page_size
        } else {
            self.size
        };
        Self {
            index: self.index.max(0),
            size: size.min(defaults.max_page_size).max(1),
        }
    }
}

impl Default for PageRule {
    fn default() -> Self {
        Self::first(QueryDefaults::default().default_page_size)
    }
}
