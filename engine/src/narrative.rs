//! Rendering attrition outcomes as table chatter. The sink is a one-way
//! notification boundary; outcomes carry all the literal data the messages
//! need, so rendering never reads the character back.

use tracing::info;

use crate::attrition::{AttritionOutcome, PoolKind, ResolutionKind};

/// External collaborator that receives resolution outcomes for display.
pub trait NarrativeSink {
    fn emit(&mut self, actor: &str, kind: ResolutionKind, outcome: &AttritionOutcome);
}

/// A flavor line and message body, like a chat card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub flavor: String,
    pub body: String,
}

/// Sink that logs narrations through `tracing`.
#[derive(Debug, Default)]
pub struct LogSink;

impl NarrativeSink for LogSink {
    fn emit(&mut self, actor: &str, kind: ResolutionKind, outcome: &AttritionOutcome) {
        let narration = render(actor, kind, outcome);
        info!(actor, flavor = %narration.flavor, "{}", narration.body);
    }
}

pub fn render(actor: &str, kind: ResolutionKind, outcome: &AttritionOutcome) -> Narration {
    match outcome {
        AttritionOutcome::HitToHeart { roll: None } => Narration {
            flavor: "Hit to the heart!".into(),
            body: format!("{actor} will die at the end of Phase 5 without intervention!"),
        },
        AttritionOutcome::HitToHeart { roll: Some(roll) } => Narration {
            flavor: format!("Brutal Attrition! [{roll}] Hit to the heart!"),
            body: format!(
                "Attrition exceeds available equipment and skills. \
                 {actor} will die at the end of Phase 5 without intervention!"
            ),
        },
        AttritionOutcome::NextHitLethal { roll } => Narration {
            flavor: format!("Brutal Attrition! [{roll}]"),
            body: "Attrition equals available equipment and skills. The next hit will be lethal!"
                .into(),
        },
        AttritionOutcome::UseLost {
            item,
            uses_left: _,
            remaining,
        } => Narration {
            flavor: flavor_for(kind),
            body: format!(
                "{item} lost a use. {actor} has {}",
                remaining_phrase(PoolKind::Equipment, *remaining)
            ),
        },
        AttritionOutcome::ItemDamaged {
            item,
            pool,
            remaining,
        } => Narration {
            flavor: flavor_for(kind),
            body: match pool {
                PoolKind::Equipment => format!(
                    "{item} damaged! {actor} has {}",
                    remaining_phrase(*pool, *remaining)
                ),
                PoolKind::Flesh => format!(
                    "{item} skill damaged! {actor} has {}",
                    remaining_phrase(*pool, *remaining)
                ),
            },
        },
        AttritionOutcome::ItemsAffected {
            roll,
            effects,
            equipment_remaining,
            flesh_remaining,
        } => {
            let mut body = String::new();
            for effect in effects {
                if effect.damaged {
                    body.push_str(&format!("{} is damaged!\n", effect.item));
                } else {
                    body.push_str(&format!("{} lost a use!\n", effect.item));
                }
            }
            body.push_str(&format!(
                "Remaining attrition... Equipment: {equipment_remaining}, Skill: {flesh_remaining}"
            ));
            Narration {
                flavor: format!("Brutal Attrition! [{roll}]"),
                body,
            }
        }
        AttritionOutcome::Destroyed {
            equipment,
            skill,
            hit_to_heart,
            equipment_remaining,
            flesh_remaining,
        } => {
            let mut body = String::new();
            match equipment {
                Some(destroyed) => {
                    body.push_str(&format!("{} destroyed permanently!\n", destroyed.item));
                }
                None => body.push_str("No equipment to destroy. Hit to the heart!\n"),
            }
            match skill {
                Some(skill) => body.push_str(&format!("{skill} skill damaged!\n")),
                None => body.push_str("No skill to damage. Hit to the heart!\n"),
            }
            if *hit_to_heart {
                body.push_str(&format!("{actor} will die at the end of Phase 5!"));
            } else {
                body.push_str(&format!(
                    "Remaining attrition... Equipment: {equipment_remaining}, \
                     Skill: {flesh_remaining}"
                ));
            }
            Narration {
                flavor: "Destroy Attrition!".into(),
                body,
            }
        }
    }
}

fn flavor_for(kind: ResolutionKind) -> String {
    match kind {
        ResolutionKind::Equipment => "Equipment Attrition!".into(),
        ResolutionKind::Flesh => "Flesh Attrition!".into(),
        ResolutionKind::Brutal => "Brutal Attrition!".into(),
        ResolutionKind::Destroy => "Destroy Attrition!".into(),
    }
}

fn remaining_phrase(pool: PoolKind, remaining: u32) -> String {
    match (pool, remaining) {
        (PoolKind::Equipment, 0) => "no Equipment remaining. The next hit will be lethal!".into(),
        (PoolKind::Equipment, n) => format!("{n} equipment remaining."),
        (PoolKind::Flesh, 0) => "no Skills remaining. The next hit will be lethal!".into(),
        (PoolKind::Flesh, 1) => "1 skill remaining.".into(),
        (PoolKind::Flesh, n) => format!("{n} skills remaining."),
    }
}
