//! The four attrition resolution procedures. Each one draws uniformly from an
//! eligible pool computed against a point-in-time snapshot of the character's
//! items, applies its mutations in one batch, and returns a structured outcome
//! carrying enough literal data (item names, die roll, remaining pool counts)
//! for a narrative sink to render without re-querying the engine.
//!
//! Every branch is an explicitly modeled outcome: an empty pool is a
//! first-class `HitToHeart`, never an error, and it short-circuits before any
//! mutation.

use serde::Serialize;
use tracing::debug;

use crate::derived::{equipment_pool, flesh_pool};
use crate::error::EngineError;
use crate::model::{ActorKind, AttritionMode, Character, Item, ItemKind};
use crate::{DieRoller, RulesConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Equipment,
    Flesh,
}

/// One of the four procedures, for callers that dispatch by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    Equipment,
    Flesh,
    Brutal,
    Destroy,
}

/// What brutal attrition did to one selected pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemEffect {
    pub item: String,
    /// False when a multi-use item only lost a use and stays serviceable.
    pub damaged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestroyedEquipment {
    pub item: String,
    pub cost: u32,
    /// False when automatic destruction is disabled and deletion is deferred
    /// to an external actor; the item is still named for the narrative.
    pub removed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttritionOutcome {
    /// The eligible pool was empty (roll absent) or a brutal roll exceeded it
    /// (roll shown). The character dies at the end of the round without
    /// intervention; the engine signals this, it does not apply it.
    HitToHeart { roll: Option<u8> },
    /// A brutal roll exactly exhausted the pool. Not lethal yet.
    NextHitLethal { roll: u8 },
    ItemDamaged {
        item: String,
        pool: PoolKind,
        remaining: u32,
    },
    UseLost {
        item: String,
        uses_left: u32,
        remaining: u32,
    },
    ItemsAffected {
        roll: u8,
        effects: Vec<ItemEffect>,
        equipment_remaining: u32,
        flesh_remaining: u32,
    },
    Destroyed {
        equipment: Option<DestroyedEquipment>,
        skill: Option<String>,
        hit_to_heart: bool,
        equipment_remaining: u32,
        flesh_remaining: u32,
    },
}

/// Dispatch one of the four procedures by kind.
pub fn resolve(
    character: &mut Character,
    dice: &mut impl DieRoller,
    config: &RulesConfig,
    kind: ResolutionKind,
) -> Result<AttritionOutcome, EngineError> {
    match kind {
        ResolutionKind::Equipment => equipment_attrition(character, dice),
        ResolutionKind::Flesh => flesh_attrition(character, dice),
        ResolutionKind::Brutal => brutal_attrition(character, dice),
        ResolutionKind::Destroy => destroy_attrition(character, dice, config),
    }
}

fn ensure_player_character(character: &Character) -> Result<(), EngineError> {
    if character.kind == ActorKind::Character {
        Ok(())
    } else {
        Err(EngineError::InvalidActorKind(character.kind))
    }
}

/// Damage or consume one undamaged, non-pouched piece of equipment chosen
/// uniformly at random. Multi-use items lose a use before breaking.
pub fn equipment_attrition(
    character: &mut Character,
    dice: &mut impl DieRoller,
) -> Result<AttritionOutcome, EngineError> {
    ensure_player_character(character)?;

    let picked = {
        let mut eligible: Vec<&mut Item> = character
            .items
            .iter_mut()
            .filter(|i| i.as_equipment().is_some_and(|eq| eq.in_equipment_pool()))
            .collect();
        if eligible.is_empty() {
            debug!(actor = %character.name, "equipment attrition on empty pool");
            return Ok(AttritionOutcome::HitToHeart { roll: None });
        }
        let item = eligible.swap_remove(dice.pick(eligible.len()));
        let name = item.name.clone();
        match &mut item.kind {
            ItemKind::Equipment(eq) => match &mut eq.attrition {
                AttritionMode::Multi { uses } if uses.current > 1 => {
                    uses.current -= 1;
                    (name, Some(uses.current))
                }
                AttritionMode::Multi { uses } => {
                    uses.current = uses.current.saturating_sub(1);
                    eq.damaged = true;
                    (name, None)
                }
                AttritionMode::Single => {
                    eq.damaged = true;
                    (name, None)
                }
            },
            // Eligibility filtered on equipment above.
            _ => (name, None),
        }
    };

    let remaining = equipment_pool(character).current;
    let (item, uses_left) = picked;
    debug!(actor = %character.name, %item, remaining, "equipment attrition");
    Ok(match uses_left {
        Some(uses_left) => AttritionOutcome::UseLost {
            item,
            uses_left,
            remaining,
        },
        None => AttritionOutcome::ItemDamaged {
            item,
            pool: PoolKind::Equipment,
            remaining,
        },
    })
}

/// Damage one undamaged skill chosen uniformly at random.
pub fn flesh_attrition(
    character: &mut Character,
    dice: &mut impl DieRoller,
) -> Result<AttritionOutcome, EngineError> {
    ensure_player_character(character)?;

    let item = {
        let mut eligible: Vec<&mut Item> = character
            .items
            .iter_mut()
            .filter(|i| i.as_skill().is_some_and(|sk| !sk.damaged))
            .collect();
        if eligible.is_empty() {
            debug!(actor = %character.name, "flesh attrition on empty pool");
            return Ok(AttritionOutcome::HitToHeart { roll: None });
        }
        let item = eligible.swap_remove(dice.pick(eligible.len()));
        if let ItemKind::Skill(sk) = &mut item.kind {
            sk.damaged = true;
        }
        item.name.clone()
    };

    let remaining = flesh_pool(character).current;
    debug!(actor = %character.name, %item, remaining, "flesh attrition");
    Ok(AttritionOutcome::ItemDamaged {
        item,
        pool: PoolKind::Flesh,
        remaining,
    })
}

/// Roll a d6 against a weighted pool where every undamaged skill and every
/// remaining equipment use counts as one entry. A roll over the pool size
/// annihilates it (heart hit); a roll matching it exhausts it exactly (next
/// hit lethal); a lower roll consumes that many distinct entries.
pub fn brutal_attrition(
    character: &mut Character,
    dice: &mut impl DieRoller,
) -> Result<AttritionOutcome, EngineError> {
    ensure_player_character(character)?;

    // One entry per undamaged skill, one per remaining use of a multi-use
    // item, one per intact single-use item. Entries index into `items`.
    let mut entries: Vec<usize> = Vec::new();
    for (idx, item) in character.items.iter().enumerate() {
        match &item.kind {
            ItemKind::Skill(sk) if !sk.damaged => entries.push(idx),
            ItemKind::Equipment(eq) if eq.in_equipment_pool() => match &eq.attrition {
                AttritionMode::Multi { uses } => {
                    for _ in 0..uses.current {
                        entries.push(idx);
                    }
                }
                AttritionMode::Single => entries.push(idx),
            },
            _ => {}
        }
    }

    let roll = dice.d6();
    let pool_size = entries.len();
    debug!(actor = %character.name, roll, pool_size, "brutal attrition");

    if usize::from(roll) >= pool_size {
        // Full exhaustion either way; the difference is whether the blow
        // overshot the pool.
        for idx in entries {
            exhaust_item(&mut character.items[idx]);
        }
        return Ok(if usize::from(roll) == pool_size {
            AttritionOutcome::NextHitLethal { roll }
        } else {
            AttritionOutcome::HitToHeart { roll: Some(roll) }
        });
    }

    // Draw `roll` distinct entries without replacement. A multi-use item can
    // be drawn once per remaining use, each draw costing one use.
    let mut effects = Vec::with_capacity(usize::from(roll));
    for _ in 0..roll {
        let entry = entries.swap_remove(dice.pick(entries.len()));
        apply_entry_hit(&mut character.items[entry], &mut effects);
    }

    Ok(AttritionOutcome::ItemsAffected {
        roll,
        effects,
        equipment_remaining: equipment_pool(character).current,
        flesh_remaining: flesh_pool(character).current,
    })
}

/// Independently destroy one piece of non-pouched equipment (damaged or not;
/// destruction bypasses the damage distinction) and damage one undamaged
/// skill. Either absent selection raises the heart-hit flag.
pub fn destroy_attrition(
    character: &mut Character,
    dice: &mut impl DieRoller,
    config: &RulesConfig,
) -> Result<AttritionOutcome, EngineError> {
    ensure_player_character(character)?;

    let equipment_indices: Vec<usize> = character
        .items
        .iter()
        .enumerate()
        .filter(|(_, i)| i.as_equipment().is_some_and(|eq| !eq.in_pouch))
        .map(|(idx, _)| idx)
        .collect();
    let skill_indices: Vec<usize> = character
        .items
        .iter()
        .enumerate()
        .filter(|(_, i)| i.as_skill().is_some_and(|sk| !sk.damaged))
        .map(|(idx, _)| idx)
        .collect();

    // Both selections observe the same snapshot; mutations follow.
    let equipment_pick = (!equipment_indices.is_empty())
        .then(|| equipment_indices[dice.pick(equipment_indices.len())]);
    let skill_pick =
        (!skill_indices.is_empty()).then(|| skill_indices[dice.pick(skill_indices.len())]);
    let mut hit_to_heart = false;

    let skill = match skill_pick {
        Some(idx) => {
            let item = &mut character.items[idx];
            if let ItemKind::Skill(sk) = &mut item.kind {
                sk.damaged = true;
            }
            Some(item.name.clone())
        }
        None => {
            hit_to_heart = true;
            None
        }
    };

    // Equipment removal last so the skill index above stays valid.
    let equipment = match equipment_pick {
        Some(idx) => {
            let name = character.items[idx].name.clone();
            let cost = character.items[idx].cost;
            let removed = config.auto_destroy;
            if removed {
                character.hero_points.lost += cost;
                character.items.remove(idx);
            }
            debug!(actor = %character.name, item = %name, removed, "destroy attrition");
            Some(DestroyedEquipment {
                item: name,
                cost,
                removed,
            })
        }
        None => {
            hit_to_heart = true;
            None
        }
    };

    Ok(AttritionOutcome::Destroyed {
        equipment,
        skill,
        hit_to_heart,
        equipment_remaining: equipment_pool(character).current,
        flesh_remaining: flesh_pool(character).current,
    })
}

/// Full exhaustion: multi-use items drop to zero uses; everything in the pool
/// ends up damaged.
fn exhaust_item(item: &mut Item) {
    match &mut item.kind {
        ItemKind::Skill(sk) => sk.damaged = true,
        ItemKind::Equipment(eq) => {
            if let AttritionMode::Multi { uses } = &mut eq.attrition {
                uses.current = 0;
            }
            eq.damaged = true;
        }
        _ => {}
    }
}

/// One brutal-attrition hit against a selected entry's owning item.
fn apply_entry_hit(item: &mut Item, effects: &mut Vec<ItemEffect>) {
    let name = item.name.clone();
    match &mut item.kind {
        ItemKind::Skill(sk) => {
            sk.damaged = true;
            effects.push(ItemEffect {
                item: name,
                damaged: true,
            });
        }
        ItemKind::Equipment(eq) => match &mut eq.attrition {
            AttritionMode::Multi { uses } => {
                uses.current = uses.current.saturating_sub(1);
                let damaged = uses.current == 0;
                if damaged {
                    eq.damaged = true;
                }
                effects.push(ItemEffect {
                    item: name,
                    damaged,
                });
            }
            AttritionMode::Single => {
                eq.damaged = true;
                effects.push(ItemEffect {
                    item: name,
                    damaged: true,
                });
            }
        },
        _ => {}
    }
}
