use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Character,
    Npc,
    Enemy,
    Companion,
}

/// A resource pool: `current` usable entries out of `max` total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pool {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttritionPools {
    #[serde(default)]
    pub flesh: Pool,
    #[serde(default)]
    pub equipment: Pool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeroPoints {
    #[serde(default)]
    pub max: u32,
    #[serde(default)]
    pub spent: u32,
    #[serde(default)]
    pub lost: u32,
    /// Signed on purpose: a negative remainder is a meaningful overspend
    /// signal, never clamped away.
    #[serde(default)]
    pub remaining: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Uses {
    pub current: u32,
    pub max: u32,
}

/// How an equipment item absorbs attrition. Multi-use items carry their uses
/// block inline, so a multi-attrition item without one is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttritionMode {
    #[default]
    Single,
    Multi {
        uses: Uses,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentState {
    #[serde(default)]
    pub damaged: bool,
    #[serde(default)]
    pub in_pouch: bool,
    #[serde(default = "default_equipped")]
    pub equipped: bool,
    /// Defense bonus granted while equipped.
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub attrition: AttritionMode,
}

impl EquipmentState {
    /// Eligible for the equipment attrition pool: undamaged and carried, not
    /// stored away in a pouch.
    pub fn in_equipment_pool(&self) -> bool {
        !self.damaged && !self.in_pouch
    }

    pub fn uses_left(&self) -> Option<u32> {
        match self.attrition {
            AttritionMode::Multi { uses } => Some(uses.current),
            AttritionMode::Single => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillState {
    #[serde(default)]
    pub damaged: bool,
    #[serde(default = "default_target_number")]
    pub target_number: i32,
    #[serde(default)]
    pub modifier: i32,
}

impl SkillState {
    pub fn total_target(&self) -> i32 {
        self.target_number + self.modifier
    }
}

/// Item variants keyed by kind. Spell, large item, advancement, flora and
/// companion entries are inert for attrition; they only contribute their cost
/// to spent hero points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    Equipment(EquipmentState),
    Skill(SkillState),
    Reward,
    Flaw,
    Ability,
    Spell,
    #[serde(rename = "largeitem")]
    LargeItem,
    Advancement,
    Flora,
    Companion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cost: u32,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    pub fn as_equipment(&self) -> Option<&EquipmentState> {
        match &self.kind {
            ItemKind::Equipment(eq) => Some(eq),
            _ => None,
        }
    }

    pub fn as_skill(&self) -> Option<&SkillState> {
        match &self.kind {
            ItemKind::Skill(sk) => Some(sk),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default = "default_actor_kind")]
    pub kind: ActorKind,
    #[serde(default)]
    pub hero_points: HeroPoints,
    #[serde(default = "default_defense")]
    pub defense: i32,
    /// Flat adjustment folded into the defense score on recompute.
    #[serde(default)]
    pub defense_modifier: i32,
    #[serde(default)]
    pub attrition: AttritionPools,
    #[serde(default)]
    pub hero_coin_available: bool,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Character {
    pub fn new(name: impl Into<String>, kind: ActorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            hero_points: HeroPoints::default(),
            defense: default_defense(),
            defense_modifier: 0,
            attrition: AttritionPools::default(),
            hero_coin_available: false,
            items: Vec::new(),
        }
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Structural checks the type system cannot express: uses bounds and
    /// duplicate item ids. Run by loaders before the character enters play.
    pub fn validate(&self) -> Result<(), EngineError> {
        for item in &self.items {
            if let ItemKind::Equipment(eq) = &item.kind {
                if let AttritionMode::Multi { uses } = eq.attrition {
                    if uses.max < 1 {
                        return Err(EngineError::InvalidData(format!(
                            "multi-attrition item '{}' must have at least one use",
                            item.name
                        )));
                    }
                    if uses.current > uses.max {
                        return Err(EngineError::InvalidData(format!(
                            "item '{}' has {} uses but a maximum of {}",
                            item.name, uses.current, uses.max
                        )));
                    }
                }
            }
        }
        for (idx, item) in self.items.iter().enumerate() {
            if self.items[..idx].iter().any(|other| other.id == item.id) {
                return Err(EngineError::InvalidData(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
        }
        Ok(())
    }
}

fn default_actor_kind() -> ActorKind {
    ActorKind::Character
}

fn default_defense() -> i32 {
    6
}

fn default_equipped() -> bool {
    true
}

fn default_target_number() -> i32 {
    3
}
