//! Combat phase ordering. The natural comparator orders phases ascending; the
//! table rule evaluates it with its arguments swapped, so higher phases act
//! first. Ties keep insertion order (the sorts below are stable).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A participant in an active encounter. Holds the owning character's name as
/// a non-owning reference; phases are chosen at join time and are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub character: String,
    pub phase: i32,
}

/// The default ordering: lower phase first.
pub fn phase_order(a: &Combatant, b: &Combatant) -> Ordering {
    a.phase.cmp(&b.phase)
}

/// The ordering used at the table: the default comparator with its arguments
/// swapped, so combatants with higher phase values act first.
pub fn turn_order(a: &Combatant, b: &Combatant) -> Ordering {
    phase_order(b, a)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Encounter {
    combatants: Vec<Combatant>,
}

impl Encounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a character to the encounter with its chosen phase.
    pub fn join(&mut self, character: impl Into<String>, phase: i32) {
        self.combatants.push(Combatant {
            character: character.into(),
            phase,
        });
    }

    /// Remove every combatant belonging to the named character. Returns true
    /// if any were removed.
    pub fn remove(&mut self, character: &str) -> bool {
        let before = self.combatants.len();
        self.combatants.retain(|c| c.character != character);
        self.combatants.len() != before
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Combatants in acting order: descending phase, insertion order on ties.
    pub fn turn_order(&self) -> Vec<&Combatant> {
        let mut order: Vec<&Combatant> = self.combatants.iter().collect();
        order.sort_by(|a, b| turn_order(a, b));
        order
    }

    /// Sort the roster in place into acting order.
    pub fn sort(&mut self) {
        self.combatants.sort_by(turn_order);
    }
}
