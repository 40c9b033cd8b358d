//! Pluggable permission storage.
//!
//! The manager delegates permission lookups to a [`DataStore`]. The default
//! [`NoopDataStore`] stores nothing; [`MemoryDataStore`] keeps permissions in
//! process memory and can be seeded from a JSON table.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::access::Permission;
use crate::error::StoreError;
use crate::types::Capability;

pub trait DataStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<Permission>;
    fn put(&self, key: &str, needs: Vec<Capability>) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Placeholder store: lookups find nothing, mutations are not implemented.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDataStore;

impl DataStore for NoopDataStore {
    fn get(&self, _key: &str) -> Option<Permission> {
        None
    }

    fn put(&self, _key: &str, _needs: Vec<Capability>) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented)
    }

    fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented)
    }
}

/// In-process permission table keyed by name.
///
/// `put` on an existing key extends that permission's needs rather than
/// replacing it, matching [`Permission::need`]. A poisoned lock is recovered
/// in every method: each write is a single map operation, so the table is
/// never left half-updated.
#[derive(Debug, Default)]
pub struct MemoryDataStore {
    permissions: RwLock<HashMap<String, Permission>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table of the form `{ "edit": ["role:editor", 7], ... }`.
    /// Each key becomes the permission's tag.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let table: HashMap<String, Vec<Capability>> = serde_json::from_str(json)?;
        let permissions = table
            .into_iter()
            .map(|(key, needs)| {
                let permission = Permission::new(key.clone(), needs);
                (key, permission)
            })
            .collect();
        tracing::debug!("loaded permission table from json");
        Ok(MemoryDataStore { permissions: RwLock::new(permissions) })
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Permission>> {
        self.permissions.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Permission>> {
        self.permissions.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DataStore for MemoryDataStore {
    fn get(&self, key: &str) -> Option<Permission> {
        self.read().get(key).cloned()
    }

    fn put(&self, key: &str, needs: Vec<Capability>) -> Result<(), StoreError> {
        let mut permissions = self.write();
        permissions
            .entry(key.to_string())
            .or_insert_with(|| Permission::new(key, Vec::<Capability>::new()))
            .need(needs);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut permissions = self.write();
        permissions.remove(key).map(|_| ()).ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}
