use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod attrition;
pub mod combat;
pub mod content;
pub mod derived;
pub mod error;
pub mod model;
pub mod narrative;
pub mod store;

/// Source of randomness for the resolution procedures. Implemented by [`Dice`]
/// for play and by scripted fakes in tests that need pinned rolls.
pub trait DieRoller {
    /// Uniform 1..=6.
    fn d6(&mut self) -> u8;
    /// Uniform index in 0..len. `len` must be nonzero; callers check for empty
    /// pools before drawing.
    fn pick(&mut self, len: usize) -> usize;
}

pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }
}

impl DieRoller for Dice {
    fn d6(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Externally supplied settings, passed in at call time rather than read from
/// a global registry. The engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Run the derived-stats calculator automatically after each resolution.
    #[serde(default = "default_true")]
    pub auto_calculate: bool,
    /// Let destroy attrition delete the selected equipment permanently. When
    /// off, the outcome still names the item but defers deletion.
    #[serde(default)]
    pub auto_destroy: bool,
    /// Starting hero point ceiling before rewards and flaws. No silent
    /// fallback: recompute fails if this is unset.
    pub default_max_hero_points: Option<u32>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            auto_calculate: true,
            auto_destroy: false,
            default_max_hero_points: None,
        }
    }
}

fn default_true() -> bool {
    true
}
