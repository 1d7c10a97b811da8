//! The persistence gateway contract and an in-memory implementation.
//!
//! Conflict detection is revision-based: a record remembers the revision it
//! was loaded at, and a save against a store that has moved on fails with
//! [`StoreError::Conflict`]. The engine never retries; the caller restarts
//! the whole resolution from a fresh load, since it may need to re-prompt for
//! dice already shown.

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::model::{Character, Item};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("character not found: {0}")]
    NotFound(String),
    #[error("character '{0}' was modified since it was loaded")]
    Conflict(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to parse character data: {0}")]
    Parse(String),
}

/// A character plus its storage identity and the revision it was loaded at.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CharacterRecord {
    pub id: String,
    #[serde(default)]
    pub revision: u64,
    pub character: Character,
}

impl CharacterRecord {
    pub fn new(id: impl Into<String>, character: Character) -> Self {
        Self {
            id: id.into(),
            revision: 0,
            character,
        }
    }
}

pub trait CharacterStore {
    fn load_character(&self, id: &str) -> Result<CharacterRecord, StoreError>;
    /// Durably store the record; fails with [`StoreError::Conflict`] if the
    /// store has a newer revision than the one the record was loaded at.
    fn save_character(&mut self, record: &CharacterRecord) -> Result<(), StoreError>;
    fn save_item(&mut self, character_id: &str, item: &Item) -> Result<(), StoreError>;
    /// Idempotent: deleting an item that is already gone succeeds.
    fn delete_item(&mut self, character_id: &str, item_id: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: IndexMap<String, CharacterRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CharacterRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// Peek at the stored revision, mainly for asserting on write behavior.
    pub fn revision(&self, id: &str) -> Option<u64> {
        self.records.get(id).map(|r| r.revision)
    }
}

impl CharacterStore for MemoryStore {
    fn load_character(&self, id: &str) -> Result<CharacterRecord, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save_character(&mut self, record: &CharacterRecord) -> Result<(), StoreError> {
        let stored = self
            .records
            .get_mut(&record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        if stored.revision != record.revision {
            return Err(StoreError::Conflict(record.id.clone()));
        }
        *stored = record.clone();
        stored.revision += 1;
        debug!(id = %record.id, revision = stored.revision, "saved character");
        Ok(())
    }

    fn save_item(&mut self, character_id: &str, item: &Item) -> Result<(), StoreError> {
        let stored = self
            .records
            .get_mut(character_id)
            .ok_or_else(|| StoreError::NotFound(character_id.to_string()))?;
        match stored
            .character
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
        {
            Some(existing) => *existing = item.clone(),
            None => stored.character.items.push(item.clone()),
        }
        stored.revision += 1;
        Ok(())
    }

    fn delete_item(&mut self, character_id: &str, item_id: &str) -> Result<(), StoreError> {
        let stored = self
            .records
            .get_mut(character_id)
            .ok_or_else(|| StoreError::NotFound(character_id.to_string()))?;
        let before = stored.character.items.len();
        stored.character.items.retain(|i| i.id != item_id);
        if stored.character.items.len() != before {
            stored.revision += 1;
        }
        Ok(())
    }
}
