//! Shared fixtures for the façade integration tests
//!
//! [`RecordingRepository`] keeps its rows in memory, evaluates every query
//! descriptor with [`QueryParameters::apply`], and records each call so tests
//! can assert exactly which storage operations a façade operation issued.

#![allow(dead_code)]

use std::sync::Mutex;

use repokit::query::{PagedResult, QueryParameters};
use repokit::repository::{AsyncRepository, Repository, StorageError, StorageOperation};
use repokit::{Entity, Result};
use uuid::Uuid;

/// One storage call as seen by the repository
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: StorageOperation,
    /// Rendered filter predicate, if the call carried one
    pub filter: Option<String>,
    /// Number of entities passed in (mutations) or returned (queries)
    pub entities: usize,
}

pub struct RecordingRepository<E> {
    rows: Mutex<Vec<E>>,
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<StorageError>>,
}

impl<E: Entity + Clone> RecordingRepository<E> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    pub fn with_rows(rows: impl IntoIterator<Item = E>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Make the next storage call fail with `error`
    pub fn fail_next(&self, error: StorageError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_of(&self, operation: StorageOperation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    pub fn rows(&self) -> Vec<E> {
        self.rows.lock().unwrap().clone()
    }

    fn record(
        &self,
        operation: StorageOperation,
        query: Option<&QueryParameters<E>>,
        entities: usize,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call {
            operation,
            filter: query
                .and_then(QueryParameters::predicate)
                .map(ToString::to_string),
            entities,
        });
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn select(&self, query: Option<&QueryParameters<E>>) -> Result<(Vec<E>, u64)> {
        let rows = self.rows();
        match query {
            Some(query) => query.apply(rows),
            None => {
                let total = rows.len() as u64;
                Ok((rows, total))
            }
        }
    }

    fn query(
        &self,
        operation: StorageOperation,
        query: Option<&QueryParameters<E>>,
    ) -> Result<(Vec<E>, u64)> {
        let selected = self.select(query);
        let returned = selected.as_ref().map_or(0, |(rows, _)| rows.len());
        self.record(operation, query, returned)?;
        selected
    }

    fn mutate(&self, operation: StorageOperation, entities: &[E]) -> Result<()> {
        self.record(operation, None, entities.len())?;
        let mut rows = self.rows.lock().unwrap();
        for entity in entities {
            match operation {
                StorageOperation::Insert => rows.push(entity.clone()),
                StorageOperation::Update => {
                    if let Some(row) = rows.iter_mut().find(|row| row.id() == entity.id()) {
                        *row = entity.clone();
                    }
                }
                StorageOperation::Delete => rows.retain(|row| row.id() != entity.id()),
                _ => {}
            }
        }
        Ok(())
    }

    fn paged(&self, query: Option<&QueryParameters<E>>) -> Result<PagedResult<E>> {
        let page = query.and_then(|q| q.page().copied()).unwrap_or_default();
        let (items, total) = self.query(StorageOperation::GetPagedList, query)?;
        Ok(PagedResult::for_page(page, items, total))
    }
}

impl<E: Entity + Clone> Repository<E> for RecordingRepository<E> {
    fn get(&self, query: Option<&QueryParameters<E>>) -> Result<Option<E>> {
        Ok(self.query(StorageOperation::Get, query)?.0.into_iter().next())
    }

    fn get_list(&self, query: Option<&QueryParameters<E>>) -> Result<Vec<E>> {
        Ok(self.query(StorageOperation::GetList, query)?.0)
    }

    fn get_paged_list(&self, query: Option<&QueryParameters<E>>) -> Result<PagedResult<E>> {
        self.paged(query)
    }

    fn exists(&self, query: Option<&QueryParameters<E>>) -> Result<bool> {
        Ok(!self.query(StorageOperation::Exists, query)?.0.is_empty())
    }

    fn count(&self, query: Option<&QueryParameters<E>>) -> Result<u64> {
        Ok(self.query(StorageOperation::Count, query)?.1)
    }

    fn insert(&self, entity: E) -> Result<E> {
        self.mutate(StorageOperation::Insert, std::slice::from_ref(&entity))?;
        Ok(entity)
    }

    fn insert_many(&self, entities: Vec<E>) -> Result<Vec<E>> {
        self.mutate(StorageOperation::Insert, &entities)?;
        Ok(entities)
    }

    fn update(&self, entity: E) -> Result<E> {
        self.mutate(StorageOperation::Update, std::slice::from_ref(&entity))?;
        Ok(entity)
    }

    fn update_many(&self, entities: Vec<E>) -> Result<Vec<E>> {
        self.mutate(StorageOperation::Update, &entities)?;
        Ok(entities)
    }

    fn delete(&self, entity: E) -> Result<()> {
        self.mutate(StorageOperation::Delete, std::slice::from_ref(&entity))
    }

    fn delete_many(&self, entities: Vec<E>) -> Result<()> {
        self.mutate(StorageOperation::Delete, &entities)
    }
}

impl<E: Entity + Clone> AsyncRepository<E> for RecordingRepository<E> {
    async fn get(&self, query: Option<&QueryParameters<E>>) -> Result<Option<E>> {
        Repository::get(self, query)
    }

    async fn get_list(&self, query: Option<&QueryParameters<E>>) -> Result<Vec<E>> {
        Repository::get_list(self, query)
    }

    async fn get_paged_list(&self, query: Option<&QueryParameters<E>>) -> Result<PagedResult<E>> {
        Repository::get_paged_list(self, query)
    }

    async fn exists(&self, query: Option<&QueryParameters<E>>) -> Result<bool> {
        Repository::exists(self, query)
    }

    async fn count(&self, query: Option<&QueryParameters<E>>) -> Result<u64> {
        Repository::count(self, query)
    }

    async fn insert(&self, entity: E) -> Result<E> {
        Repository::insert(self, entity)
    }

    async fn insert_many(&self, entities: Vec<E>) -> Result<Vec<E>> {
        Repository::insert_many(self, entities)
    }

    async fn update(&self, entity: E) -> Result<E> {
        Repository::update(self, entity)
    }

    async fn update_many(&self, entities: Vec<E>) -> Result<Vec<E>> {
        Repository::update_many(self, entities)
    }

    async fn delete(&self, entity: E) -> Result<()> {
        Repository::delete(self, entity)
    }

    async fn delete_many(&self, entities: Vec<E>) -> Result<()> {
        Repository::delete_many(self, entities)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub active: bool,
}

impl Entity for Account {
    type Key = i64;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

pub fn account(id: i64, owner: &str, balance: i64, active: bool) -> Account {
    Account {
        id,
        owner: owner.to_string(),
        balance,
        active,
    }
}

/// Accounts 0 through 9; even ids are active, balance is `id * 100`
pub fn ledger() -> Vec<Account> {
    (0..10)
        .map(|id| account(id, &format!("owner-{id}"), id * 100, id % 2 == 0))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub id: String,
}

impl Entity for Tag {
    type Key = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
}

impl Entity for Device {
    type Key = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}
