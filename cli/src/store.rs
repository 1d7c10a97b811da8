//! File-backed persistence gateway: one character record per JSON/YAML file,
//! with the record's revision field checked on save so concurrent edits of
//! the same file surface as conflicts instead of silent overwrites.

use std::path::PathBuf;

use engine::api::{load_character_file, save_character_file};
use engine::model::Item;
use engine::store::{CharacterRecord, CharacterStore, StoreError};

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<CharacterRecord, StoreError> {
        load_character_file(&self.path).map_err(|e| StoreError::Parse(format!("{e:#}")))
    }

    fn write(&self, record: &CharacterRecord) -> Result<(), StoreError> {
        save_character_file(&self.path, record).map_err(|e| StoreError::Parse(format!("{e:#}")))
    }
}

impl CharacterStore for FileStore {
    fn load_character(&self, id: &str) -> Result<CharacterRecord, StoreError> {
        let record = self.read()?;
        if record.id != id {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(record)
    }

    fn save_character(&mut self, record: &CharacterRecord) -> Result<(), StoreError> {
        let on_disk = self.read()?;
        if on_disk.id != record.id {
            return Err(StoreError::NotFound(record.id.clone()));
        }
        if on_disk.revision != record.revision {
            return Err(StoreError::Conflict(record.id.clone()));
        }
        let mut next = record.clone();
        next.revision += 1;
        self.write(&next)
    }

    fn save_item(&mut self, character_id: &str, item: &Item) -> Result<(), StoreError> {
        let mut record = self.load_character(character_id)?;
        match record.character.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => record.character.items.push(item.clone()),
        }
        self.save_character(&record)
    }

    fn delete_item(&mut self, character_id: &str, item_id: &str) -> Result<(), StoreError> {
        let mut record = self.load_character(character_id)?;
        let before = record.character.items.len();
        record.character.items.retain(|i| i.id != item_id);
        if record.character.items.len() == before {
            return Ok(());
        }
        self.save_character(&record)
    }
}
