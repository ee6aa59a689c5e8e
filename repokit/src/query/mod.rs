//! Query descriptors handed to repositories
//!
//! A [`QueryParameters`] bundles an optional [`FilterRule`], [`SortRule`] and
//! [`PageRule`]. It is the only thing that crosses from the core into a
//! repository implementation, and it is built fresh for every query.
//!
//! # Example
//!
//! ```rust
//! use repokit::expression::{KeySelector, Predicate};
//! use repokit::query::{PageRule, QueryParameters, SortRule};
//!
//! struct Post {
//!     likes: u32,
//!     published: bool,
//! }
//!
//! let query = QueryParameters::from_predicate(Some(Predicate::<Post>::new("p", |p| {
//!     p.member("published", |p| p.published).eq(true)
//! })))
//! .unwrap()
//! .with_sort(SortRule::descending(KeySelector::member("likes", |p: &Post| p.likes)))
//! .with_page(PageRule::first(10));
//!
//! assert!(query.matches(&Post { likes: 3, published: true }).unwrap());
//! assert_eq!(query.page(), Some(&PageRule::new(0, 10)));
//! ```

pub mod identity;
mod paged;
mod rules;

use std::fmt;

use crate::error::{require, Result};
use crate::expression::Predicate;
use crate::specification::Specification;

pub use paged::PagedResult;
pub use rules::{FilterRule, PageRule, SortDirection, SortRule};

/// Filter, sort and page for one query
pub struct QueryParameters<E> {
    filter: Option<FilterRule<E>>,
    sort: Option<SortRule<E>>,
    page: Option<PageRule>,
}

impl<E> QueryParameters<E> {
    /// A query selecting every entity, unsorted and unpaged
    pub fn all() -> Self {
        Self {
            filter: None,
            sort: None,
            page: None,
        }
    }

    /// A query filtering by `predicate`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) naming
    /// `predicate` when it is absent.
    pub fn from_predicate(predicate: Option<Predicate<E>>) -> Result<Self> {
        let predicate = require(predicate, "predicate")?;
        tracing::trace!(%predicate, "query parameters from predicate");
        Ok(Self::all().with_filter(FilterRule::new(predicate)))
    }

    /// A query filtering by `specification`
    ///
    /// A specification without an expression yields a filter that matches
    /// every entity.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) naming
    /// `specification` when it is absent.
    pub fn from_specification<S>(specification: Option<&S>) -> Result<Self>
    where
        S: Specification<Entity = E> + ?Sized,
    {
        let specification = require(specification, "specification")?;
        tracing::trace!(
            specification = %specification.name(),
            "query parameters from specification"
        );
        let filter = FilterRule {
            expression: specification.as_expression(),
        };
        Ok(Self::all().with_filter(filter))
    }

    /// Replace the filter rule
    #[must_use]
    pub fn with_filter(mut self, filter: FilterRule<E>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Replace the sort rule
    #[must_use]
    pub fn with_sort(mut self, sort: SortRule<E>) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Replace the page rule
    #[must_use]
    pub fn with_page(mut self, page: PageRule) -> Self {
        self.page = Some(page);
        self
    }

    /// The filter rule, if any
    pub fn filter(&self) -> Option<&FilterRule<E>> {
        self.filter.as_ref()
    }

    /// The filtering predicate, if any
    pub fn predicate(&self) -> Option<&Predicate<E>> {
        self.filter.as_ref().and_then(|rule| rule.expression.as_ref())
    }

    /// The sort rule, if any
    pub fn sort(&self) -> Option<&SortRule<E>> {
        self.sort.as_ref()
    }

    /// The page rule, if any
    pub fn page(&self) -> Option<&PageRule> {
        self.page.as_ref()
    }

    /// Whether `candidate` passes the filter; everything passes without one
    ///
    /// # Errors
    ///
    /// Whatever evaluating the predicate raises.
    pub fn matches(&self, candidate: &E) -> Result<bool> {
        match &self.filter {
            Some(rule) => rule.is_satisfied_by(candidate),
            None => Ok(true),
        }
    }

    /// Filter, sort and page `items` in memory
    ///
    /// Returns the selected page and the number of entities that passed the
    /// filter before paging. An invalid page rule selects nothing.
    ///
    /// # Errors
    ///
    /// The first error raised while evaluating the filter or sort key.
    pub fn apply<I>(&self, items: I) -> Result<(Vec<E>, u64)>
    where
        I: IntoIterator<Item = E>,
    {
        let mut selected = Vec::new();
        for item in items {
            if self.matches(&item)? {
                selected.push(item);
            }
        }
        if let Some(sort) = &self.sort {
            sort.sort(&mut selected)?;
        }

        let total = selected.len() as u64;
        let Some(page) = &self.page else {
            return Ok((selected, total));
        };
        let (Some(skip), Some(take)) = (page.skip(), page.take()) else {
            return Ok((Vec::new(), total));
        };
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(usize::MAX);
        Ok((selected.into_iter().skip(skip).take(take).collect(), total))
    }
}

impl<E> Default for QueryParameters<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E> Clone for QueryParameters<E> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            page: self.page,
        }
    }
}

impl<E> fmt::Debug for QueryParameters<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParameters")
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .finish()
    }
}

impl<E> From<Predicate<E>> for QueryParameters<E> {
    fn from(predicate: Predicate<E>) -> Self {
        Self::all().with_filter(FilterRule::new(predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::KeySelector;
    use crate::specification::{ExpressionSpecification, SpecificationExt};
    use crate::Error;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        tag: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 3, tag: "b" },
            Row { id: 1, tag: "a" },
            Row { id: 4, tag: "a" },
            Row { id: 0, tag: "c" },
            Row { id: 2, tag: "a" },
        ]
    }

    fn tagged(tag: &'static str) -> ExpressionSpecification<Row> {
        ExpressionSpecification::new(
            format!("tag {tag}"),
            Predicate::new("r", move |r| r.member("tag", |r: &Row| r.tag).eq(tag)),
        )
    }

    #[test]
    fn test_from_predicate_requires_predicate() {
        let error = QueryParameters::<Row>::from_predicate(None).unwrap_err();
        assert!(matches!(error, Error::InvalidArgument { parameter: "predicate" }));
    }

    #[test]
    fn test_from_specification_requires_specification() {
        let error =
            QueryParameters::from_specification::<ExpressionSpecification<Row>>(None).unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidArgument {
                parameter: "specification"
            }
        ));
    }

    #[test]
    fn test_from_predicate_sets_only_filter() {
        let query =
            QueryParameters::from_predicate(Some(Predicate::<Row>::constant(true))).unwrap();
        assert!(query.filter().is_some());
        assert!(query.sort().is_none());
        assert!(query.page().is_none());
    }

    #[test]
    fn test_from_specification_is_behaviourally_equivalent() {
        let spec = tagged("a").or(tagged("c"));
        let query = QueryParameters::from_specification(Some(&spec)).unwrap();
        assert!(query.sort().is_none());
        assert!(query.page().is_none());
        for row in rows() {
            assert_eq!(query.matches(&row).unwrap(), spec.is_satisfied_by(&row).unwrap());
        }
    }

    #[test]
    fn test_unconstrained_specification_matches_all() {
        let spec = ExpressionSpecification::<Row>::unconstrained("anything");
        let query = QueryParameters::from_specification(Some(&spec)).unwrap();
        let filter = query.filter().unwrap();
        assert!(!filter.is_constrained());
        assert!(query.predicate().is_none());
        assert!(rows().iter().all(|row| query.matches(row).unwrap()));
    }

    #[test]
    fn test_apply_filters_sorts_and_pages() {
        let query = QueryParameters::from_specification(Some(&tagged("a")))
            .unwrap()
            .with_sort(SortRule::descending(KeySelector::member("id", |r: &Row| r.id)))
            .with_page(PageRule::new(0, 2));

        let (page, total) = query.apply(rows()).unwrap();
        assert_eq!(total, 3);
        let ids: Vec<i64> = page.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 2]);

        let (second, _) = query.clone().with_page(PageRule::new(1, 2)).apply(rows()).unwrap();
        assert_eq!(second, vec![Row { id: 1, tag: "a" }]);
    }

    #[test]
    fn test_apply_with_invalid_page_selects_nothing() {
        let query = QueryParameters::<Row>::all().with_page(PageRule::new(-1, 5));
        let (page, total) = query.apply(rows()).unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 5);
    }
}
