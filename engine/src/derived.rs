//! Derived-statistic recomputation: defense score, hero point bookkeeping and
//! attrition pool sizes, all recalculated from current item state. Idempotent:
//! with unchanged items, repeat calls always produce the same fields.

use crate::RulesConfig;
use crate::error::EngineError;
use crate::model::{ActorKind, Character, ItemKind, Pool};

pub const BASE_DEFENSE: i32 = 6;
pub const MAX_DEFENSE: i32 = 18;

const FLAW_HERO_POINT_BONUS: u32 = 5;
const ABILITY_HERO_POINT_COST: u32 = 15;

/// Rewrite the character's derived fields from its items. A no-op for actors
/// that are not player characters.
pub fn recompute(character: &mut Character, config: &RulesConfig) -> Result<(), EngineError> {
    if character.kind != ActorKind::Character {
        return Ok(());
    }
    let default_max = config
        .default_max_hero_points
        .ok_or(EngineError::ConfigurationMissing("default_max_hero_points"))?;

    character.defense = defense_score(character);

    let (max, spent) = hero_point_totals(character, default_max);
    character.hero_points.max = max;
    character.hero_points.spent = spent;
    character.hero_points.remaining =
        i64::from(max) - i64::from(spent) - i64::from(character.hero_points.lost);

    character.attrition.equipment = equipment_pool(character);
    character.attrition.flesh = flesh_pool(character);
    Ok(())
}

/// Base 6, plus the bonus of every equipped piece of equipment and the sheet's
/// flat modifier, clamped to [6, 18].
fn defense_score(character: &Character) -> i32 {
    let mut score = BASE_DEFENSE;
    for item in &character.items {
        if let ItemKind::Equipment(eq) = &item.kind {
            if eq.equipped {
                score += eq.defense;
            }
        }
    }
    score += character.defense_modifier;
    score.clamp(BASE_DEFENSE, MAX_DEFENSE)
}

/// Rewards raise the ceiling by their cost, flaws by a flat bonus regardless
/// of cost. Abilities cost a flat amount; every other item with a nonzero
/// cost counts at face value.
fn hero_point_totals(character: &Character, default_max: u32) -> (u32, u32) {
    let mut max = default_max;
    let mut spent = 0u32;
    for item in &character.items {
        match &item.kind {
            ItemKind::Reward => max += item.cost,
            ItemKind::Flaw => max += FLAW_HERO_POINT_BONUS,
            ItemKind::Ability => spent += ABILITY_HERO_POINT_COST,
            _ => spent += item.cost,
        }
    }
    (max, spent)
}

/// Equipment pool counts exclude pouched items from both sides, so that
/// `current <= max` holds by construction. A character with no equipment
/// yields an empty pool, never an error.
pub fn equipment_pool(character: &Character) -> Pool {
    let mut pool = Pool::default();
    for item in &character.items {
        if let ItemKind::Equipment(eq) = &item.kind {
            if eq.in_pouch {
                continue;
            }
            pool.max += 1;
            if !eq.damaged {
                pool.current += 1;
            }
        }
    }
    pool
}

pub fn flesh_pool(character: &Character) -> Pool {
    let mut pool = Pool::default();
    for item in &character.items {
        if let ItemKind::Skill(sk) = &item.kind {
            pool.max += 1;
            if !sk.damaged {
                pool.current += 1;
            }
        }
    }
    pool
}
