use thiserror::Error;

use crate::model::ActorKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Attrition was invoked on an actor without attrition pools. Nothing was
    /// mutated; the caller should pick a player character instead.
    #[error("attrition requires a player character, got a {0:?} actor")]
    InvalidActorKind(ActorKind),
    /// A required setting was not supplied. Propagated rather than defaulted
    /// so a setup error never masquerades as a valid zero.
    #[error("missing configuration value: {0}")]
    ConfigurationMissing(&'static str),
    #[error("invalid character data: {0}")]
    InvalidData(String),
}
