//! Equipment and flesh attrition: selection, mutation and outcome shape.

use engine::DieRoller;
use engine::attrition::{AttritionOutcome, PoolKind, equipment_attrition, flesh_attrition};
use engine::derived::{equipment_pool, flesh_pool};
use engine::error::EngineError;
use engine::model::{
    ActorKind, AttritionMode, Character, EquipmentState, Item, ItemKind, SkillState, Uses,
};

/// Scripted dice: hands out queued values, repeating the last pick as 0.
struct ScriptDice {
    picks: Vec<usize>,
}

impl ScriptDice {
    fn picks(picks: &[usize]) -> Self {
        Self {
            picks: picks.to_vec(),
        }
    }
}

impl DieRoller for ScriptDice {
    fn d6(&mut self) -> u8 {
        1
    }

    fn pick(&mut self, len: usize) -> usize {
        let next = if self.picks.is_empty() {
            0
        } else {
            self.picks.remove(0)
        };
        next.min(len - 1)
    }
}

fn hero(items: Vec<Item>) -> Character {
    let mut c = Character::new("Hero", ActorKind::Character);
    c.items = items;
    c
}

fn equipment(id: &str, damaged: bool, in_pouch: bool) -> Item {
    Item {
        id: id.into(),
        name: id.into(),
        cost: 0,
        kind: ItemKind::Equipment(EquipmentState {
            damaged,
            in_pouch,
            equipped: true,
            defense: 0,
            attrition: AttritionMode::Single,
        }),
    }
}

fn multi_equipment(id: &str, uses: u32) -> Item {
    Item {
        id: id.into(),
        name: id.into(),
        cost: 0,
        kind: ItemKind::Equipment(EquipmentState {
            damaged: false,
            in_pouch: false,
            equipped: false,
            defense: 0,
            attrition: AttritionMode::Multi {
                uses: Uses {
                    current: uses,
                    max: uses,
                },
            },
        }),
    }
}

fn skill(id: &str, damaged: bool) -> Item {
    Item {
        id: id.into(),
        name: id.into(),
        cost: 0,
        kind: ItemKind::Skill(SkillState {
            damaged,
            target_number: 8,
            modifier: 0,
        }),
    }
}

#[test]
fn pouched_equipment_is_never_selected() {
    // Scenario A: Sword eligible, Dagger pouched; the sword always takes the hit.
    let mut c = hero(vec![
        equipment("Sword", false, false),
        equipment("Dagger", false, true),
    ]);
    let outcome = equipment_attrition(&mut c, &mut ScriptDice::picks(&[0])).unwrap();
    assert_eq!(
        outcome,
        AttritionOutcome::ItemDamaged {
            item: "Sword".into(),
            pool: PoolKind::Equipment,
            remaining: 0,
        }
    );
    assert!(c.item("Sword").unwrap().as_equipment().unwrap().damaged);
    assert!(!c.item("Dagger").unwrap().as_equipment().unwrap().damaged);
}

#[test]
fn multi_use_item_loses_a_use_before_breaking() {
    let mut c = hero(vec![multi_equipment("Rations", 3)]);
    let outcome = equipment_attrition(&mut c, &mut ScriptDice::picks(&[0])).unwrap();
    assert_eq!(
        outcome,
        AttritionOutcome::UseLost {
            item: "Rations".into(),
            uses_left: 2,
            remaining: 1,
        }
    );
    let eq = c.item("Rations").unwrap().as_equipment().unwrap();
    assert!(!eq.damaged);
    assert_eq!(eq.uses_left(), Some(2));
}

#[test]
fn multi_use_item_breaks_on_its_last_use() {
    let mut c = hero(vec![multi_equipment("Rations", 1)]);
    let outcome = equipment_attrition(&mut c, &mut ScriptDice::picks(&[0])).unwrap();
    assert_eq!(
        outcome,
        AttritionOutcome::ItemDamaged {
            item: "Rations".into(),
            pool: PoolKind::Equipment,
            remaining: 0,
        }
    );
    let eq = c.item("Rations").unwrap().as_equipment().unwrap();
    assert!(eq.damaged);
    assert_eq!(eq.uses_left(), Some(0));
}

#[test]
fn equipment_attrition_conserves_pool_counts() {
    // A use-lost hit leaves the current count alone; a damaging hit drops it
    // by exactly one. Nothing ever increases.
    let mut c = hero(vec![equipment("Sword", false, false), multi_equipment("Rations", 2)]);
    let before = equipment_pool(&c).current;

    let outcome = equipment_attrition(&mut c, &mut ScriptDice::picks(&[1])).unwrap();
    assert!(matches!(outcome, AttritionOutcome::UseLost { .. }));
    assert_eq!(equipment_pool(&c).current, before);

    let outcome = equipment_attrition(&mut c, &mut ScriptDice::picks(&[0])).unwrap();
    assert!(matches!(outcome, AttritionOutcome::ItemDamaged { .. }));
    assert_eq!(equipment_pool(&c).current, before - 1);
}

#[test]
fn empty_equipment_pool_is_a_heart_hit_and_a_no_op() {
    let mut c = hero(vec![equipment("Sword", true, false), skill("Dodge", false)]);
    let before = c.clone();
    let outcome = equipment_attrition(&mut c, &mut ScriptDice::picks(&[])).unwrap();
    assert_eq!(outcome, AttritionOutcome::HitToHeart { roll: None });
    assert_eq!(c, before);
}

#[test]
fn flesh_attrition_damages_the_only_eligible_skill() {
    // Scenario B: Dodge undamaged, Parry already damaged.
    let mut c = hero(vec![skill("Dodge", false), skill("Parry", true)]);
    assert_eq!(flesh_pool(&c).max, 2);
    assert_eq!(flesh_pool(&c).current, 1);

    let outcome = flesh_attrition(&mut c, &mut ScriptDice::picks(&[3])).unwrap();
    assert_eq!(
        outcome,
        AttritionOutcome::ItemDamaged {
            item: "Dodge".into(),
            pool: PoolKind::Flesh,
            remaining: 0,
        }
    );
    assert!(c.item("Dodge").unwrap().as_skill().unwrap().damaged);

    // Nothing left: the second hit goes to the heart without mutation.
    let before = c.clone();
    let outcome = flesh_attrition(&mut c, &mut ScriptDice::picks(&[])).unwrap();
    assert_eq!(outcome, AttritionOutcome::HitToHeart { roll: None });
    assert_eq!(c, before);
}

#[test]
fn flesh_attrition_ignores_equipment() {
    let mut c = hero(vec![equipment("Sword", false, false)]);
    let outcome = flesh_attrition(&mut c, &mut ScriptDice::picks(&[])).unwrap();
    assert_eq!(outcome, AttritionOutcome::HitToHeart { roll: None });
    assert!(!c.item("Sword").unwrap().as_equipment().unwrap().damaged);
}

#[test]
fn attrition_rejects_non_character_actors() {
    let mut enemy = Character::new("Ogre", ActorKind::Enemy);
    enemy.items.push(equipment("Club", false, false));
    let before = enemy.clone();

    let err = equipment_attrition(&mut enemy, &mut ScriptDice::picks(&[])).unwrap_err();
    assert_eq!(err, EngineError::InvalidActorKind(ActorKind::Enemy));
    let err = flesh_attrition(&mut enemy, &mut ScriptDice::picks(&[])).unwrap_err();
    assert_eq!(err, EngineError::InvalidActorKind(ActorKind::Enemy));
    assert_eq!(enemy, before);
}
