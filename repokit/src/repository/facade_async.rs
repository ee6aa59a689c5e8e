//! Convenience operations over an [`AsyncRepository`]
//!
//! Mirrors [`facade`](super::facade) operation for operation. The only
//! suspension points are the repository calls themselves, so dropping a
//! returned future cancels the operation cleanly.
//!
//! # Validation
//!
//! Absent arguments are checked ahead of the first suspension point: the
//! returned future resolves to [`Error::InvalidArgument`](crate::Error::InvalidArgument)
//! on its first poll, without touching the repository.

use std::any::type_name;
use std::future::Future;

use super::traits::{AsyncRepository, Projection};
use crate::entity::Entity;
use crate::error::{require, Result};
use crate::expression::Predicate;
use crate::query::{identity, PageRule, PagedResult, QueryParameters};
use crate::specification::Specification;

/// Entity with identifier `id`, or `None`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn get_by_id<E, R>(repository: Option<&R>, id: E::Key) -> Result<Option<E>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_id::<E>(id)))?;
    repository.get(Some(&query)).await
}

/// Whether an entity with identifier `id` exists
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn exists_by_id<E, R>(repository: Option<&R>, id: E::Key) -> Result<bool>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_id::<E>(id)))?;
    repository.exists(Some(&query)).await
}

/// Delete the entity with identifier `id`
///
/// Fetches first; issues exactly one [`AsyncRepository::delete`] when
/// something was found and none otherwise.
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn delete_by_id<E, R>(repository: Option<&R>, id: E::Key) -> Result<()>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_id::<E>(id)))?;
    match repository.get(Some(&query)).await? {
        Some(entity) => repository.delete(entity).await,
        None => {
            tracing::debug!("nothing to delete");
            Ok(())
        }
    }
}

/// Delete every entity whose identifier is in `ids`
///
/// Fetches first; issues exactly one [`AsyncRepository::delete_many`] when
/// anything was found and none otherwise.
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn delete_by_ids<E, R, I>(repository: Option<&R>, ids: I) -> Result<()>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    I: IntoIterator<Item = E::Key>,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(Some(identity::has_any_id::<E, _>(ids)))?;
    let entities = repository.get_list(Some(&query)).await?;
    if entities.is_empty() {
        tracing::debug!("nothing to delete");
        return Ok(());
    }
    tracing::debug!(count = entities.len(), "deleting entities");
    repository.delete_many(entities).await
}

/// First entity satisfying `predicate`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn get_by<E, R>(
    repository: Option<&R>,
    predicate: Option<Predicate<E>>,
) -> Result<Option<E>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.get(Some(&query)).await
}

/// Every entity satisfying `predicate`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn get_list_by<E, R>(
    repository: Option<&R>,
    predicate: Option<Predicate<E>>,
) -> Result<Vec<E>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.get_list(Some(&query)).await
}

/// Whether any entity satisfies `predicate`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn exists_by<E, R>(
    repository: Option<&R>,
    predicate: Option<Predicate<E>>,
) -> Result<bool>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.exists(Some(&query)).await
}

/// Number of entities satisfying `predicate`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn count_by<E, R>(repository: Option<&R>, predicate: Option<Predicate<E>>) -> Result<u64>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_predicate(predicate)?;
    repository.count(Some(&query)).await
}

/// First entity satisfying `specification`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn get_matching<E, R, S>(
    repository: Option<&R>,
    specification: Option<&S>,
) -> Result<Option<E>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.get(Some(&query)).await
}

/// Every entity satisfying `specification`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn get_list_matching<E, R, S>(
    repository: Option<&R>,
    specification: Option<&S>,
) -> Result<Vec<E>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.get_list(Some(&query)).await
}

/// One page of the entities satisfying `specification`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn get_paged_list_matching<E, R, S>(
    repository: Option<&R>,
    specification: Option<&S>,
    page: Option<PageRule>,
) -> Result<PagedResult<E>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let page = require(page, "page")?;
    let query = QueryParameters::from_specification(specification)?.with_page(page);
    repository.get_paged_list(Some(&query)).await
}

/// Whether any entity satisfies `specification`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn exists_matching<E, R, S>(
    repository: Option<&R>,
    specification: Option<&S>,
) -> Result<bool>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.exists(Some(&query)).await
}

/// Number of entities satisfying `specification`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(level = "debug", skip_all, fields(entity = type_name::<E>()))]
pub async fn count_matching<E, R, S>(
    repository: Option<&R>,
    specification: Option<&S>,
) -> Result<u64>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    S: Specification<Entity = E> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let query = QueryParameters::from_specification(specification)?;
    repository.count(Some(&query)).await
}

/// First entity satisfying `predicate`, projected into `M`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(entity = type_name::<E>(), model = type_name::<M>())
)]
pub async fn get_as<E, M, R, P>(
    repository: Option<&R>,
    predicate: Option<Predicate<E>>,
    projection: Option<&P>,
) -> Result<Option<M>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    P: Projection<E, M> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let projection = require(projection, "projection")?;
    let query = QueryParameters::from_predicate(predicate)?;
    let found = repository.get(Some(&query)).await?;
    Ok(found.and_then(|entity| projection.project(vec![entity]).into_iter().next()))
}

/// Every entity satisfying `predicate`, projected into `M`
///
/// Absent arguments fail on the first poll, before the repository is reached.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(entity = type_name::<E>(), model = type_name::<M>())
)]
pub async fn get_list_as<E, M, R, P>(
    repository: Option<&R>,
    predicate: Option<Predicate<E>>,
    projection: Option<&P>,
) -> Result<Vec<M>>
where
    E: Entity,
    R: AsyncRepository<E> + ?Sized,
    P: Projection<E, M> + ?Sized,
{
    let repository = require(repository, "repository")?;
    let projection = require(projection, "projection")?;
    let query = QueryParameters::from_predicate(predicate)?;
    let entities = repository.get_list(Some(&query)).await?;
    Ok(projection.project(entities))
}

/// Façade operations as methods on any [`AsyncRepository`]
///
/// ```rust,ignore
/// use repokit::prelude::*;
///
/// let page = orders
///     .get_paged_list_matching(&open.and_not(flagged), PageRule::first(50))
///     .await?;
/// ```
pub trait AsyncRepositoryExt<E: Entity>: AsyncRepository<E> {
    /// See [`get_by_id`]
    fn get_by_id(&self, id: E::Key) -> impl Future<Output = Result<Option<E>>> + Send {
        get_by_id(Some(self), id)
    }

    /// See [`exists_by_id`]
    fn exists_by_id(&self, id: E::Key) -> impl Future<Output = Result<bool>> + Send {
        exists_by_id(Some(self), id)
    }

    /// See [`delete_by_id`]
    fn delete_by_id(&self, id: E::Key) -> impl Future<Output = Result<()>> + Send {
        delete_by_id(Some(self), id)
    }

    /// See [`delete_by_ids`]
    fn delete_by_ids<I>(&self, ids: I) -> impl Future<Output = Result<()>> + Send
    where
        I: IntoIterator<Item = E::Key> + Send,
    {
        delete_by_ids(Some(self), ids)
    }

    /// See [`get_by`]
    fn get_by(&self, predicate: Predicate<E>) -> impl Future<Output = Result<Option<E>>> + Send {
        get_by(Some(self), Some(predicate))
    }

    /// See [`get_list_by`]
    fn get_list_by(&self, predicate: Predicate<E>) -> impl Future<Output = Result<Vec<E>>> + Send {
        get_list_by(Some(self), Some(predicate))
    }

    /// See [`exists_by`]
    fn exists_by(&self, predicate: Predicate<E>) -> impl Future<Output = Result<bool>> + Send {
        exists_by(Some(self), Some(predicate))
    }

    /// See [`count_by`]
    fn count_by(&self, predicate: Predicate<E>) -> impl Future<Output = Result<u64>> + Send {
        count_by(Some(self), Some(predicate))
    }

    /// See [`get_matching`]
    fn get_matching<S>(&self, specification: &S) -> impl Future<Output = Result<Option<E>>> + Send
    where
        S: Specification<Entity = E> + ?Sized,
    {
        get_matching(Some(self), Some(specification))
    }

    /// See [`get_list_matching`]
    fn get_list_matching<S>(&self, specification: &S) -> impl Future<Output = Result<Vec<E>>> + Send
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
    ) -> impl Future<Output = Result<PagedResult<E>>> + Send
    where
        S: Specification<Entity = E> + ?Sized,
    {
        get_paged_list_matching(Some(self), Some(specification), Some(page))
    }

    /// See [`exists_matching`]
    fn exists_matching<S>(&self, specification: &S) -> impl Future<Output = Result<bool>> + Send
    where
        S: Specification<Entity = E> + ?Sized,
    {
        exists_matching(Some(self), Some(specification))
    }

    /// See [`count_matching`]
    fn count_matching<S>(&self, specification: &S) -> impl Future<Output = Result<u64>> + Send
    where
        S: Specification<Entity = E> + ?Sized,
    {
        count_matching(Some(self), Some(specification))
    }

    /// See [`get_as`]
    fn get_as<M, P>(
        &self,
        predicate: Predicate<E>,
        projection: &P,
    ) -> impl Future<Output = Result<Option<M>>> + Send
    where
        M: Send,
        P: Projection<E, M> + ?Sized,
    {
        get_as(Some(self), Some(predicate), Some(projection))
    }

    /// See [`get_list_as`]
    fn get_list_as<M, P>(
        &self,
        predicate: Predicate<E>,
        projection: &P,
    ) -> impl Future<Output = Result<Vec<M>>> + Send
    where
        M: Send,
        P: Projection<E, M> + ?Sized,
    {
        get_list_as(Some(self), Some(predicate), Some(projection))
    }
}

impl<E: Entity, R: AsyncRepository<E> + ?Sized> AsyncRepositoryExt<E> for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::ExpressionSpecification;
    use crate::Error;

    #[derive(Debug, Clone)]
    struct Gadget {
        id: u64,
    }

    impl Entity for Gadget {
        type Key = u64;

        fn id(&self) -> &u64 {
            &self.id
        }

        fn set_id(&mut self, id: u64) {
            self.id = id;
        }
    }

    struct Untouchable;

    impl AsyncRepository<Gadget> for Untouchable {
        async fn get(&self, _: Option<&QueryParameters<Gadget>>) -> Result<Option<Gadget>> {
            panic!("get reached storage")
        }
        async fn get_list(&self, _: Option<&QueryParameters<Gadget>>) -> Result<Vec<Gadget>> {
            panic!("get_list reached storage")
        }
        async fn get_paged_list(
            &self,
            _: Option<&QueryParameters<Gadget>>,
        ) -> Result<PagedResult<Gadget>> {
            panic!("get_paged_list reached storage")
        }
        async fn exists(&self, _: Option<&QueryParameters<Gadget>>) -> Result<bool> {
            panic!("exists reached storage")
        }
        async fn count(&self, _: Option<&QueryParameters<Gadget>>) -> Result<u64> {
            panic!("count reached storage")
        }
        async fn insert(&self, _: Gadget) -> Result<Gadget> {
            panic!("insert reached storage")
        }
        async fn insert_many(&self, _: Vec<Gadget>) -> Result<Vec<Gadget>> {
            panic!("insert_many reached storage")
        }
        async fn update(&self, _: Gadget) -> Result<Gadget> {
            panic!("update reached storage")
        }
        async fn update_many(&self, _: Vec<Gadget>) -> Result<Vec<Gadget>> {
            panic!("update_many reached storage")
        }
        async fn delete(&self, _: Gadget) -> Result<()> {
            panic!("delete reached storage")
        }
        async fn delete_many(&self, _: Vec<Gadget>) -> Result<()> {
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

    #[tokio::test]
    async fn test_validation_resolves_on_first_poll() {
        use std::time::Duration;

        let spec = ExpressionSpecification::<Gadget>::unconstrained("all");
        let missing_page = tokio::time::timeout(
            Duration::ZERO,
            get_paged_list_matching(Some(&Untouchable), Some(&spec), None),
        )
        .await
        .expect("validation does not suspend");
        assert_eq!(parameter_of(missing_page), "page");

        let missing_repository =
            tokio::time::timeout(Duration::ZERO, count_by::<Gadget, _>(NO_REPOSITORY, None))
                .await
                .expect("validation does not suspend");
        assert_eq!(parameter_of(missing_repository), "repository");
    }

    #[tokio::test]
    async fn test_absent_repository_is_rejected() {
        assert_eq!(
            parameter_of(get_by_id::<Gadget, _>(NO_REPOSITORY, 1).await),
            "repository"
        );
        assert_eq!(
            parameter_of(delete_by_ids::<Gadget, _, _>(NO_REPOSITORY, vec![1, 2]).await),
            "repository"
        );
        let spec = ExpressionSpecification::<Gadget>::unconstrained("all");
        assert_eq!(
            parameter_of(count_matching(NO_REPOSITORY, Some(&spec)).await),
            "repository"
        );
    }

    #[tokio::test]
    async fn test_absent_operands_are_rejected_before_storage() {
        let repo = Some(&Untouchable);
        assert_eq!(parameter_of(get_by::<Gadget, _>(repo, None).await), "predicate");
        assert_eq!(parameter_of(count_by::<Gadget, _>(repo, None).await), "predicate");
        assert_eq!(
            parameter_of(
                exists_matching::<Gadget, _, ExpressionSpecification<Gadget>>(repo, None).await
            ),
            "specification"
        );

        let spec = ExpressionSpecification::<Gadget>::unconstrained("all");
        assert_eq!(
            parameter_of(get_paged_list_matching(repo, Some(&spec), None).await),
            "page"
        );
    }

    #[test]
    fn test_ext_futures_are_send() {
        fn assert_send<T: Send>(_: T) {}
        let repo = Untouchable;
        let spec = ExpressionSpecification::<Gadget>::unconstrained("all");
        // Constructing the futures never polls them
        assert_send(repo.get_by_id(1));
        assert_send(repo.delete_by_ids(vec![1, 2, 3]));
        assert_send(repo.get_list_matching(&spec));
        assert_send(repo.get_list_as(Predicate::constant(true), &|g: Gadget| g.id));
    }
}
