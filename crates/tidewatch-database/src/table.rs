//! Concurrent keyed table with atomic read-modify-write.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use tidewatch_core::error::AppError;
use tidewatch_core::result::AppResult;

use crate::connection::StoreHealth;

/// A keyed table of cloneable rows.
///
/// [`MemoryTable::update_with`] runs its closure while holding the row's
/// exclusive shard lock, so two concurrent updates of the same row are
/// serialized and neither is lost. The closure works on a copy: if it
/// returns an error the stored row is left untouched.
pub struct MemoryTable<K, V> {
    name: &'static str,
    rows: DashMap<K, V>,
    health: Arc<StoreHealth>,
}

impl<K: Eq + Hash, V> fmt::Debug for MemoryTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTable")
            .field("name", &self.name)
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl<K, V> MemoryTable<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    /// Create an empty table.
    pub fn new(name: &'static str, health: Arc<StoreHealth>) -> Self {
        Self {
            name,
            rows: DashMap::new(),
            health,
        }
    }

    /// Fetch a copy of a row.
    pub fn get(&self, key: &K) -> AppResult<Option<V>> {
        self.health.check()?;
        Ok(self.rows.get(key).map(|row| row.value().clone()))
    }

    /// Insert a row under a fresh key.
    pub fn insert_new(&self, key: K, value: V) -> AppResult<V> {
        self.health.check()?;
        match self.rows.entry(key) {
            Entry::Occupied(entry) => Err(AppError::conflict(format!(
                "{} row {} already exists",
                self.name,
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
                Ok(value)
            }
        }
    }

    /// Replace an existing row.
    pub fn replace(&self, key: &K, value: V) -> AppResult<V> {
        self.health.check()?;
        match self.rows.get_mut(key) {
            Some(mut row) => {
                *row = value.clone();
                Ok(value)
            }
            None => Err(self.missing(key)),
        }
    }

    /// Atomically modify a row and return the closure's result together
    /// with the new row.
    pub fn update_with<R>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> AppResult<R>,
    ) -> AppResult<(R, V)> {
        self.health.check()?;
        let mut row = self.rows.get_mut(key).ok_or_else(|| self.missing(key))?;
        let mut draft = row.value().clone();
        let result = f(&mut draft)?;
        *row = draft.clone();
        Ok((result, draft))
    }

    /// Copies of all rows matching `predicate`.
    pub fn scan(&self, predicate: impl Fn(&V) -> bool) -> AppResult<Vec<V>> {
        self.health.check()?;
        Ok(self
            .rows
            .iter()
            .filter(|row| predicate(row.value()))
            .map(|row| row.value().clone())
            .collect())
    }

    /// Fail with a database error while the store is offline.
    pub fn ensure_available(&self) -> AppResult<()> {
        self.health.check()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn missing(&self, key: &K) -> AppError {
        AppError::not_found(format!("{} {} not found", self.name, key))
    }
}
