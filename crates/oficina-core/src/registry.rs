use crate::error::Result;
use crate::store::{Record, RecordStore, Schema};
use std::marker::PhantomData;
use std::path::PathBuf;

/// A row type with a fixed table schema.
pub trait Entity: Sized {
    const SCHEMA: Schema;

    fn to_record(&self) -> Record;

    /// Parse a stored row. `position` is only used for error reporting.
    fn from_record(position: usize, record: &Record) -> Result<Self>;

    /// Reject input that must never be written.
    fn validate(&self) -> Result<()>;
}

/// Typed view over a [`RecordStore`] whose rows are `E`.
#[derive(Debug, Clone)]
pub struct Registry<E> {
    store: RecordStore,
    _entity: PhantomData<E>,
}

impl<E: Entity> Registry<E> {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::new(path, E::SCHEMA),
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn list(&self) -> Result<Vec<E>> {
        self.store
            .load()?
            .iter()
            .enumerate()
            .map(|(i, r)| E::from_record(i, r))
            .collect()
    }

    pub fn get(&self, position: usize) -> Result<E> {
        E::from_record(position, &self.store.get(position)?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.store.is_empty()
    }

    /// Validate and append. Nothing is written if validation fails.
    pub fn add(&self, entity: &E) -> Result<usize> {
        entity.validate()?;
        self.store.append(entity.to_record())
    }

    /// Apply `changes` to the row at `position`. The merged row must still
    /// validate; only the named columns are written.
    pub fn update(&self, position: usize, changes: &Record) -> Result<E> {
        let mut merged = self.store.get(position)?;
        for (column, value) in changes {
            merged.insert(column.clone(), value.clone());
        }
        let updated = E::from_record(position, &merged)?;
        updated.validate()?;
        self.store.update(position, changes)?;
        Ok(updated)
    }

    pub fn remove(&self, position: usize) -> Result<E> {
        let removed = self.store.delete(position)?;
        E::from_record(position, &removed)
    }

    /// First row matching `pred`, with its position.
    pub fn find(&self, pred: impl Fn(&E) -> bool) -> Result<Option<(usize, E)>> {
        Ok(self.list()?.into_iter().enumerate().find(|(_, e)| pred(e)))
    }
}
