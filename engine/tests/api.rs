//! End-to-end resolution through the store and narrative sink.

use engine::api::{ResolveError, builtin_character, run_attrition, run_recompute};
use engine::attrition::{AttritionOutcome, ResolutionKind};
use engine::model::{ActorKind, Character, Item, ItemKind, SkillState};
use engine::narrative::{Narration, NarrativeSink, render};
use engine::store::{CharacterRecord, CharacterStore, MemoryStore, StoreError};
use engine::{Dice, RulesConfig};

struct VecSink(Vec<Narration>);

impl NarrativeSink for VecSink {
    fn emit(&mut self, actor: &str, kind: ResolutionKind, outcome: &AttritionOutcome) {
        self.0.push(render(actor, kind, outcome));
    }
}

fn config() -> RulesConfig {
    RulesConfig {
        default_max_hero_points: Some(50),
        ..RulesConfig::default()
    }
}

fn skill(id: &str) -> Item {
    Item {
        id: id.into(),
        name: id.into(),
        cost: 0,
        kind: ItemKind::Skill(SkillState {
            damaged: false,
            target_number: 8,
            modifier: 0,
        }),
    }
}

fn seeded_store(items: Vec<Item>) -> MemoryStore {
    let mut character = Character::new("Hero", ActorKind::Character);
    character.items = items;
    // Stored characters carry current derived fields, like a sheet at rest.
    engine::derived::recompute(&mut character, &config()).unwrap();
    let mut store = MemoryStore::new();
    store.insert(CharacterRecord::new("hero", character));
    store
}

#[test]
fn resolution_mutates_recomputes_and_saves_one_batch() {
    let mut store = seeded_store(vec![skill("Dodge")]);
    let mut sink = VecSink(Vec::new());
    let mut dice = Dice::from_seed(7);

    let outcome = run_attrition(
        &mut store,
        &mut sink,
        &config(),
        &mut dice,
        "hero",
        ResolutionKind::Flesh,
    )
    .unwrap();

    assert!(matches!(outcome, AttritionOutcome::ItemDamaged { .. }));
    assert_eq!(store.revision("hero"), Some(1));

    let record = store.load_character("hero").unwrap();
    assert!(record.character.item("Dodge").unwrap().as_skill().unwrap().damaged);
    // auto_calculate ran: the pool reflects the damage.
    assert_eq!(record.character.attrition.flesh.current, 0);
    assert_eq!(record.character.attrition.flesh.max, 1);

    assert_eq!(sink.0.len(), 1);
    assert_eq!(sink.0[0].flavor, "Flesh Attrition!");
    assert!(sink.0[0].body.contains("Dodge"));
}

#[test]
fn empty_pool_short_circuits_without_a_write() {
    let mut store = seeded_store(Vec::new());
    let mut sink = VecSink(Vec::new());
    let mut dice = Dice::from_seed(7);

    let outcome = run_attrition(
        &mut store,
        &mut sink,
        &config(),
        &mut dice,
        "hero",
        ResolutionKind::Equipment,
    )
    .unwrap();

    assert_eq!(outcome, AttritionOutcome::HitToHeart { roll: None });
    assert_eq!(store.revision("hero"), Some(0));
    // The heart hit is still narrated.
    assert_eq!(sink.0.len(), 1);
    assert_eq!(sink.0[0].flavor, "Hit to the heart!");
}

#[test]
fn skipping_auto_calculate_leaves_derived_fields_stale() {
    let mut store = seeded_store(vec![skill("Dodge")]);

    let manual = RulesConfig {
        auto_calculate: false,
        ..config()
    };
    let mut sink = VecSink(Vec::new());
    let mut dice = Dice::from_seed(7);
    run_attrition(
        &mut store,
        &mut sink,
        &manual,
        &mut dice,
        "hero",
        ResolutionKind::Flesh,
    )
    .unwrap();

    let record = store.load_character("hero").unwrap();
    assert!(record.character.item("Dodge").unwrap().as_skill().unwrap().damaged);
    // Stale until an on-demand recompute.
    assert_eq!(record.character.attrition.flesh.current, 1);
    let record = run_recompute(&mut store, &config(), "hero").unwrap();
    assert_eq!(record.character.attrition.flesh.current, 0);
}

#[test]
fn unknown_character_is_not_found() {
    let mut store = MemoryStore::new();
    let mut sink = VecSink(Vec::new());
    let mut dice = Dice::from_seed(7);
    let err = run_attrition(
        &mut store,
        &mut sink,
        &config(),
        &mut dice,
        "nobody",
        ResolutionKind::Flesh,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Store(StoreError::NotFound(ref id)) if id == "nobody"
    ));
}

/// Store whose save always reports a concurrent modification.
struct ContendedStore(MemoryStore);

impl CharacterStore for ContendedStore {
    fn load_character(&self, id: &str) -> Result<CharacterRecord, StoreError> {
        self.0.load_character(id)
    }

    fn save_character(&mut self, record: &CharacterRecord) -> Result<(), StoreError> {
        Err(StoreError::Conflict(record.id.clone()))
    }

    fn save_item(&mut self, character_id: &str, item: &Item) -> Result<(), StoreError> {
        self.0.save_item(character_id, item)
    }

    fn delete_item(&mut self, character_id: &str, item_id: &str) -> Result<(), StoreError> {
        self.0.delete_item(character_id, item_id)
    }
}

#[test]
fn save_conflicts_surface_to_the_caller_unretried() {
    let mut store = ContendedStore(seeded_store(vec![skill("Dodge")]));
    let mut sink = VecSink(Vec::new());
    let mut dice = Dice::from_seed(7);
    let err = run_attrition(
        &mut store,
        &mut sink,
        &config(),
        &mut dice,
        "hero",
        ResolutionKind::Flesh,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Store(StoreError::Conflict(ref id)) if id == "hero"
    ));
    // Nothing was narrated for a resolution that failed to commit.
    assert!(sink.0.is_empty());
}

#[test]
fn stale_revision_conflicts_in_the_memory_store() {
    let mut store = seeded_store(vec![skill("Dodge")]);
    let stale = store.load_character("hero").unwrap();
    let mut current = store.load_character("hero").unwrap();
    current.character.hero_points.lost = 1;
    store.save_character(&current).unwrap();

    let err = store.save_character(&stale).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(ref id) if id == "hero"));
}

#[test]
fn item_level_saves_and_deletes_bump_the_revision() {
    let mut store = seeded_store(vec![skill("Dodge")]);
    let mut item = store
        .load_character("hero")
        .unwrap()
        .character
        .item("Dodge")
        .unwrap()
        .clone();
    if let ItemKind::Skill(sk) = &mut item.kind {
        sk.damaged = true;
    }
    store.save_item("hero", &item).unwrap();
    assert_eq!(store.revision("hero"), Some(1));

    store.delete_item("hero", "Dodge").unwrap();
    assert_eq!(store.revision("hero"), Some(2));
    // Idempotent: a second delete is fine and writes nothing.
    store.delete_item("hero", "Dodge").unwrap();
    assert_eq!(store.revision("hero"), Some(2));
}

#[test]
fn builtin_hero_recomputes_to_known_numbers() {
    let mut record = builtin_character("pregen_hero").unwrap();
    engine::derived::recompute(&mut record.character, &config()).unwrap();
    let c = &record.character;
    // Sword +1 and shield +2 equipped on the base 6.
    assert_eq!(c.defense, 9);
    // 50 + reward 10 + flaw 5; ability 15 + item costs 38.
    assert_eq!(c.hero_points.max, 65);
    assert_eq!(c.hero_points.spent, 53);
    assert_eq!(c.hero_points.remaining, 12);
    // Salve is pouched; sword, shield and rations count.
    assert_eq!(c.attrition.equipment.max, 3);
    assert_eq!(c.attrition.equipment.current, 3);
    assert_eq!(c.attrition.flesh.max, 3);
    assert_eq!(c.attrition.flesh.current, 3);
}
