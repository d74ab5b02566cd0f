//! In-memory storage backend
//!
//! Default storage implementation using in-memory tables.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use attestor_core::{Attestation, Attester, RecentAttestation, User};

use super::{AttestationStore, StorageError};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    public_keys: HashSet<String>,
    full_names: HashSet<String>,
    /// Insertion order, which is also `created_at` order
    content: Vec<ContentRow>,
    content_keys: HashSet<(String, String)>,
    last_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct ContentRow {
    attestation: Attestation,
    created_at: DateTime<Utc>,
}

/// In-memory attestation store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables
            .read()
            .map_err(|_| StorageError::Database("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables
            .write()
            .map_err(|_| StorageError::Database("memory store lock poisoned".into()))
    }
}

impl Tables {
    /// Timestamps never go backwards, even if the wall clock does
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }

    fn full_name(&self, user_id: &str) -> Option<&str> {
        self.users.get(user_id).map(|u| u.full_name.as_str())
    }
}

#[async_trait]
impl AttestationStore for MemoryStore {
    // =========================================================================
    // Users
    // =========================================================================

    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        let mut tables = self.write()?;

        if tables.users.contains_key(&user.id) {
            return Err(StorageError::AlreadyExists(format!("user id {}", user.id)));
        }
        if tables.public_keys.contains(&user.public_key) {
            return Err(StorageError::AlreadyExists("public key".into()));
        }
        if tables.full_names.contains(&user.full_name) {
            return Err(StorageError::AlreadyExists(format!("fullname {}", user.full_name)));
        }

        tables.public_keys.insert(user.public_key.clone());
        tables.full_names.insert(user.full_name.clone());
        tables.users.insert(user.id.clone(), user.clone());

        info!(user_id = %user.id, "Inserted user");
        Ok(())
    }

    async fn public_key(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let tables = self.read()?;
        Ok(tables.users.get(user_id).map(|u| u.public_key.clone()))
    }

    // =========================================================================
    // Attestations
    // =========================================================================

    async fn insert_attestation(&self, attestation: &Attestation) -> Result<(), StorageError> {
        let mut tables = self.write()?;

        if !tables.users.contains_key(&attestation.user_id) {
            return Err(StorageError::MissingReference(format!(
                "user {}",
                attestation.user_id
            )));
        }

        let key = (attestation.user_id.clone(), attestation.content_hash.clone());
        if tables.content_keys.contains(&key) {
            return Err(StorageError::AlreadyExists(format!(
                "content {} for user {}",
                attestation.content_hash, attestation.user_id
            )));
        }

        let created_at = tables.next_created_at();
        tables.content_keys.insert(key);
        tables.content.push(ContentRow {
            attestation: attestation.clone(),
            created_at,
        });

        info!(
            user_id = %attestation.user_id,
            content_hash = %attestation.content_hash,
            "Inserted attestation"
        );
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RecentAttestation>, StorageError> {
        let tables = self.read()?;

        Ok(tables
            .content
            .iter()
            .rev()
            .filter_map(|row| {
                let name = tables.full_name(&row.attestation.user_id)?;
                Some(RecentAttestation {
                    user_id: row.attestation.user_id.clone(),
                    user_name: name.to_string(),
                    hash: row.attestation.content_hash.clone(),
                    created_at: row.created_at,
                })
            })
            .take(limit)
            .collect())
    }

    async fn attesters(&self, content_hash: &str) -> Result<Vec<Attester>, StorageError> {
        let tables = self.read()?;

        Ok(tables
            .content
            .iter()
            .filter(|row| row.attestation.content_hash == content_hash)
            .filter_map(|row| {
                let name = tables.full_name(&row.attestation.user_id)?;
                Some(Attester {
                    id: row.attestation.user_id.clone(),
                    fullname: name.to_string(),
                })
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.read().map(|_| ())
    }
}
