//! Orchestration of a full resolution: load a character, run one attrition
//! procedure against a point-in-time snapshot, recompute derived stats, save
//! the batch, emit the narrative. Exclusive access per character within one
//! invocation is what `&mut` already guarantees; concurrent resolutions
//! against different characters need no coordination.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use thiserror::Error;
use tracing::debug;

use crate::attrition::{AttritionOutcome, ResolutionKind, resolve};
use crate::derived::recompute;
use crate::error::EngineError;
use crate::model::Character;
use crate::narrative::NarrativeSink;
use crate::store::{CharacterRecord, CharacterStore, StoreError};
use crate::{DieRoller, RulesConfig};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// `StoreError::Conflict` means the character changed underneath the
    /// resolution; the caller must restart from a fresh load.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run one attrition procedure end to end. An empty-pool outcome leaves the
/// character untouched and issues no write; everything else is saved as one
/// batch before the narrative is emitted.
pub fn run_attrition(
    store: &mut impl CharacterStore,
    sink: &mut impl NarrativeSink,
    config: &RulesConfig,
    dice: &mut impl DieRoller,
    character_id: &str,
    kind: ResolutionKind,
) -> Result<AttritionOutcome, ResolveError> {
    let mut record = store.load_character(character_id)?;
    let snapshot = record.character.clone();

    let outcome = resolve(&mut record.character, dice, config, kind)?;
    if config.auto_calculate {
        recompute(&mut record.character, config)?;
    }

    if record.character != snapshot {
        store.save_character(&record)?;
    } else {
        debug!(id = character_id, "no mutation; skipping write");
    }

    sink.emit(&record.character.name, kind, &outcome);
    Ok(outcome)
}

/// Recompute a stored character's derived stats on demand and persist them.
pub fn run_recompute(
    store: &mut impl CharacterStore,
    config: &RulesConfig,
    character_id: &str,
) -> Result<CharacterRecord, ResolveError> {
    let mut record = store.load_character(character_id)?;
    recompute(&mut record.character, config)?;
    store.save_character(&record)?;
    Ok(record)
}

/// Read a character record from a JSON or YAML file, validating it before it
/// enters play.
pub fn load_character_file(path: impl AsRef<Path>) -> Result<CharacterRecord> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read character file: {}", path.display()))?;
    let record = parse_character(&text, is_yaml(path))
        .with_context(|| format!("failed to parse character file: {}", path.display()))?;
    record.character.validate()?;
    Ok(record)
}

pub fn save_character_file(path: impl AsRef<Path>, record: &CharacterRecord) -> Result<()> {
    let path = path.as_ref();
    let text = if is_yaml(path) {
        serde_yaml::to_string(record)?
    } else {
        let mut text = serde_json::to_string_pretty(record)?;
        text.push('\n');
        text
    };
    fs::write(path, text)
        .with_context(|| format!("failed to write character file: {}", path.display()))
}

pub fn parse_character(text: &str, yaml: bool) -> Result<CharacterRecord> {
    if yaml {
        serde_yaml::from_str(text).context("invalid character YAML")
    } else {
        serde_json::from_str(text).context("invalid character JSON")
    }
}

/// Load one of the builtin sample characters by name.
pub fn builtin_character(name: &str) -> Result<CharacterRecord> {
    let Some(text) = crate::content::builtin_characters().get(name).copied() else {
        bail!("unknown builtin character '{}'", name);
    };
    let record = parse_character(text, false)?;
    record.character.validate()?;
    Ok(record)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Convenience for hosts that hold the character themselves: resolve and
/// recompute in one call without a store.
pub fn resolve_in_place(
    character: &mut Character,
    config: &RulesConfig,
    dice: &mut impl DieRoller,
    kind: ResolutionKind,
) -> Result<AttritionOutcome, EngineError> {
    let outcome = resolve(character, dice, config, kind)?;
    if config.auto_calculate {
        recompute(character, config)?;
    }
    Ok(outcome)
}
