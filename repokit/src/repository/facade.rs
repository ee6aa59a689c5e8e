//! Convenience operations over a blocking [`Repository`]
//!
//! Every operation builds a predicate or query descriptor and hands it to the
//! repository; nothing is evaluated here. The free functions take their
//! collaborators as `Option` and reject `None` with
//! [`Error::InvalidArgument`](crate::Error::InvalidArgument) before touching
//! the repository. [`RepositoryExt`] offers the same operations as methods.
//!
//! Errors returned by the repository are passed through untouched.

use std::any::type_name;

use super::traits::{Projection, Repository};
use crate::entity::Entity;
use crate::error::{require, Result};
use crate::expression::Predicate;
use crate::query::{identity, PageRule, PagedResult, QueryParameters};
use crate::specification::Specification;

/// Entity with identifier `id`, or `None`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn get_by_id<E, R>(repository: Option<&R>, id: E::Key) -> Result<Option<E>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_id::<E>(id)))?;
    repository.get(Some(&query))
}

/// Whether an entity with identifier `id` exists
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn exists_by_id<E, R>(repository: Option<&R>, id: E::Key) -> Result<bool>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_id::<E>(id)))?;
    repository.exists(Some(&query))
}

/// Delete the entity with identifier `id`
///
/// The entity is fetched first; when nothing is found no delete is issued.
/// Otherwise [`Repository::delete`] is called exactly once.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn delete_by_id<E, R>(repository: Option<&R>, id: E::Key) -> Result<()>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_id::<E>(id)))?;
    match repository.get(Some(&query))? {
        Some(entity) => repository.delete(entity),
        None => {
            tracing::debug!("nothing to delete");
            Ok(())
        }
    }
}

/// Delete every entity whose identifier is in `ids`
///
/// The matching entities are fetched first; when none are found no delete is
/// issued. Otherwise [`Repository::delete_many`] is called exactly once.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn delete_by_ids<E, R, I>(repository: Option<&R>, ids: I) -> Result<()>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    I: IntoIterator<Item = E::Key>,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_any_id::<E, _>(ids)))?;
    let entities = repository.get_list(Some(&query))?;
    if entities.is_empty() {
        tracing::debug!("nothing to delete");
        return Ok(());
    }
    tracing::debug!(count = entities.len(), "deleting entities");
    repository.delete_many(entities)
}

/// First entity satisfying `predicate`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn get_by<E, R>(repository: Option<&R>, predicate: Option<Predicate<E>>) -> Result<Option<E>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.get(Some(&query))
}

/// Every entity satisfying `predicate`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn get_list_by<E, R>(repository: Option<&R>, predicate: Option<Predicate<E>>) -> Result<Vec<E>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.get_list(Some(&query))
}

/// Whether any entity satisfies `predicate`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn exists_by<E, R>(repository: Option<&R>, predicate: Option<Predicate<E>>) -> Result<bool>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.exists(Some(&query))
}

/// Number of entities satisfying `predicate`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn count_by<E, R>(repository: Option<&R>, predicate: Option<Predicate<E>>) -> Result<u64>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.count(Some(&query))
}

/// First entity satisfying `specification`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn get_matching<E, R, S>(repository: Option<&R>, specification: Option<&S>) -> Result<Option<E>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.get(Some(&query))
}

/// Every entity satisfying `specification`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn get_list_matching<E, R, S>(
    repository: Option<&R>,
    specification: Option<&S>,
) -> Result<Vec<E>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.get_list(Some(&query))
}

/// One page of the entities satisfying `specification`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn get_paged_list_matching<E, R, S>(
    repository: Option<&R>,
    specification: Option<&S>,
    page: Option<PageRule>,
) -> Result<PagedResult<E>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let page = require(page, "page")?;
    let query = QueryParameters::from_specification(specification)?.with_page(page);
    repository.get_paged_list(Some(&query))
}

/// Whether any entity satisfies `specification`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn exists_matching<E, R, S>(repository: Option<&R>, specification: Option<&S>) -> Result<bool>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.exists(Some(&query))
}

/// Number of entities satisfying `specification`
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub fn count_matching<E, R, S>(repository: Option<&R>, specification: Option<&S>) -> Result<u64>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.count(Some(&query))
}

/// First entity satisfying `predicate`, projected into `M`
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(entity = type_name::<E>(), model = type_name::<M>())
)]
pub fn get_as<E, M, R, P>(
    repository: Option<&R>,
    predicate: Option<Predicate<E>>,
    projection: Option<&P>,
) -> Result<Option<M>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    P: Projection<E, M> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let projection = require(projection, "projection")?;
    let query = QueryParameters::from_predicate(predicate)?;
    let found = repository.get(Some(&query))?;
    Ok(found.and_then(|entity| projection.project(vec![entity]).into_iter().next()))
}

/// Every entity satisfying `predicate`, projected into `M`
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(entity = type_name::<E>(), model = type_name::<M>())
)]
pub fn get_list_as<E, M, R, P>(
    repository: Option<&R>,
    predicate: Option<Predicate<E>>,
    projection: Option<&P>,
) -> Result<Vec<M>>
where
    E: Entity,
    R: Repository<E> + ?Sized,
    P: Projection<E, M> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let projection = require(projection, "projection")?;
    let query = QueryParameters::from_predicate(predicate)?;
    Ok(projection.project(repository.get_list(Some(&query))?))
}

/// Façade operations as methods on any [`Repository`]
///
/// # Example
///
/// ```rust,ignore
/// use repokit::prelude::*;
///
/// let order = orders.get_by_id(order_id)?;
/// let overdue = orders.get_list_matching(&unpaid.and(past_due))?;
/// orders.delete_by_ids(cancelled_ids)?;
/// ```
pub trait RepositoryExt<E: Entity>: Repository<E> {
    /// See [`get_by_id`]
    fn get_by_id(&self, id: E::Key) -> Result<Option<E>> {
        get_by_id(Some(self), id)
    }

    /// See [`exists_by_id`]
    fn exists_by_id(&self, id: E::Key) -> Result<bool> {
        exists_by_id(Some(self), id)
    }

    /// See [`delete_by_id`]
    fn delete_by_id(&self, id: E::Key) -> Result<()> {
        delete_by_id(Some(self), id)
    }

    /// See [`delete_by_ids`]
    fn delete_by_ids<I>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = E::Key>,
    {
        delete_by_ids(Some(self), ids)
    }

    /// See [`get_by`]
    fn get_by(&self, predicate: Predicate<E>) -> Result<Option<E>> {
        get_by(Some(self), Some(predicate))
    }

    /// See [`get_list_by`]
    fn get_list_by(&self, predicate: Predicate<E>) -> Result<Vec<E>> {
        get_list_by(Some(self), Some(predicate))
    }

    /// See [`exists_by`]
    fn exists_by(&self, predicate: Predicate<E>) -> Result<bool> {
        exists_by(Some(self), Some(predicate))
    }

    /// See [`count_by`]
    fn count_by(&self, predicate: Predicate<E>) -> Result<u64> {
        count_by(Some(self), Some(predicate))
    }

    /// See [`get_matching`]
    fn get_matching<S>(&self, specification: &S) -> Result<Option<E>>
    where
        S: Specification<Entity = E> + ?Sized,
    {
        get_matching(Some(self), Some(specification))
    }

    /// See [`get_list_matching`]
    fn get_list_matching<S>(&self, specification: &S) -> Result<Vec<E>>
    where
        S: Specification<Entity = E> + ?Sized,
    {
        get_list_matching(Some(self), Some(specification))
    }

    /// See [`get_paged_list_matching`]
    fn get_paged_list_matching<S>(
        &self,
        specification: &S,
        page: PageRule,
    ) -> Result<PagedResult<E>>
    where
        S: Specification<Entity = E> + ?Sized,
    {
        get_paged_list_matching(Some(self), Some(specification), Some(page))
    }

    /// See [`exists_matching`]
    fn exists_matching<S>(&self, specification: &S) -> Result<bool>
    where
        S: Specification<Entity = E> + ?Sized,
    {
        exists_matching(Some(self), Some(specification))
    }

    /// See [`count_matching`]
    fn count_matching<S>(&self, specification: &S) -> Result<u64>
    where
        S: Specification<Entity = E> + ?Sized,
    {
        count_matching(Some(self), Some(specification))
    }

    /// See [`get_as`]
    fn get_as<M, P>(&self, predicate: Predicate<E>, projection: &P) -> Result<Option<M>>
    where
        P: Projection<E, M> + ?Sized,
    {
        get_as(Some(self), Some(predicate), Some(projection))
    }

    /// See [`get_list_as`]
    fn get_list_as<M, P>(&self, predicate: Predicate<E>, projection: &P) -> Result<Vec<M>>
    where
        P: Projection<E, M> + ?Sized,
    {
        get_list_as(Some(self), Some(predicate), Some(projection))
    }
}

impl<E: Entity, R: Repository<E> + ?Sized> RepositoryExt<E> for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::ExpressionSpecification;
    use crate::Error;

    #[derive(Debug, Clone)]
    struct Widget {
        id: i32,
    }

    impl Entity for Widget {
        type Key = i32;

        fn id(&self) -> &i32 {
            &self.id
        }

        fn set_id(&mut self, id: i32) {
            self.id = id;
        }
    }

    /// Fails the test if any operation reaches storage
    struct Untouchable;

    impl Repository<Widget> for Untouchable {
        fn get(&self, _: Option<&QueryParameters<Widget>>) -> Result<Option<Widget>> {
            panic!("get reached storage")
        }
        fn get_list(&self, _: Option<&QueryParameters<Widget>>) -> Result<Vec<Widget>> {
            panic!("get_list reached storage")
        }
        fn get_paged_list(
            &self,
            _: Option<&QueryParameters<Widget>>,
        ) -> Result<PagedResult<Widget>> {
            panic!("get_paged_list reached storage")
        }
        fn exists(&self, _: Option<&QueryParameters<Widget>>) -> Result<bool> {
            panic!("exists reached storage")
        }
        fn count(&self, _: Option<&QueryParameters<Widget>>) -> Result<u64> {
            panic!("count reached storage")
        }
        fn insert(&self, _: Widget) -> Result<Widget> {
            panic!("insert reached storage")
        }
        fn insert_many(&self, _: Vec<Widget>) -> Result<Vec<Widget>> {
            panic!("insert_many reached storage")
        }
        fn update(&self, _: Widget) -> Result<Widget> {
            panic!("update reached storage")
        }
        fn update_many(&self, _: Vec<Widget>) -> Result<Vec<Widget>> {
            panic!("update_many reached storage")
        }
        fn delete(&self, _: Widget) -> Result<()> {
            panic!("delete reached storage")
        }
        fn delete_many(&self, _: Vec<Widget>) -> Result<()> {
            panic!("delete_many reached storage")
        }
    }

    fn parameter_of<T: std::fmt::Debug>(result: Result<T>) -> &'static str {
        match result {
            Err(Error::InvalidArgument { parameter }) => parameter,
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    const NO_REPOSITORY: Option<&Untouchable> = None;
    const NO_SPECIFICATION: Option<&ExpressionSpecification<Widget>> = None;

    #[test]
    fn test_absent_repository_is_rejected_first() {
        assert_eq!(parameter_of(get_by_id::<Widget, _>(NO_REPOSITORY, 1)), "repository");
        assert_eq!(parameter_of(exists_by_id::<Widget, _>(NO_REPOSITORY, 1)), "repository");
        assert_eq!(parameter_of(delete_by_id::<Widget, _>(NO_REPOSITORY, 1)), "repository");
        assert_eq!(
            parameter_of(delete_by_ids::<Widget, _, _>(NO_REPOSITORY, [1, 2])),
            "repository"
        );
        assert_eq!(parameter_of(count_by::<Widget, _>(NO_REPOSITORY, None)), "repository");
        assert_eq!(
            parameter_of(get_list_matching(NO_REPOSITORY, NO_SPECIFICATION)),
            "repository"
        );
    }

    #[test]
    fn test_absent_operands_are_rejected_before_storage() {
        let repo = Some(&Untouchable);
        assert_eq!(parameter_of(get_by::<Widget, _>(repo, None)), "predicate");
        assert_eq!(parameter_of(get_list_by::<Widget, _>(repo, None)), "predicate");
        assert_eq!(parameter_of(exists_by::<Widget, _>(repo, None)), "predicate");
        assert_eq!(parameter_of(count_by::<Widget, _>(repo, None)), "predicate");
        assert_eq!(parameter_of(get_matching(repo, NO_SPECIFICATION)), "specification");
        assert_eq!(parameter_of(exists_matching(repo, NO_SPECIFICATION)), "specification");
        assert_eq!(parameter_of(count_matching(repo, NO_SPECIFICATION)), "specification");
    }

    #[test]
    fn test_paged_list_requires_page() {
        let spec = ExpressionSpecification::<Widget>::unconstrained("all");
        let result = get_paged_list_matching(Some(&Untouchable), Some(&spec), None);
        assert_eq!(parameter_of(result), "page");
    }

    #[test]
    fn test_projection_is_required() {
        let result = get_list_as::<Widget, i32, _, fn(Widget) -> i32>(
            Some(&Untouchable),
            Some(Predicate::constant(true)),
            None,
        );
        assert_eq!(parameter_of(result), "projection");
    }
}
