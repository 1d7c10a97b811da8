use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use engine::api::{
    builtin_character, load_character_file, run_attrition, run_recompute, save_character_file,
};
use engine::attrition::{AttritionOutcome, ResolutionKind};
use engine::combat::Encounter;
use engine::narrative::{NarrativeSink, render};
use engine::{Dice, DieRoller, RulesConfig};
use tracing_subscriber::EnvFilter;

mod store;

use store::FileStore;

#[derive(Copy, Clone, ValueEnum)]
enum AttritionKind {
    Equipment,
    Flesh,
    Brutal,
    Destroy,
}

impl From<AttritionKind> for ResolutionKind {
    fn from(kind: AttritionKind) -> Self {
        match kind {
            AttritionKind::Equipment => ResolutionKind::Equipment,
            AttritionKind::Flesh => ResolutionKind::Flesh,
            AttritionKind::Brutal => ResolutionKind::Brutal,
            AttritionKind::Destroy => ResolutionKind::Destroy,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Write a builtin sample character to a file (or stdout)
    Dump {
        /// Builtin character name
        #[arg(long, default_value = "pregen_hero")]
        name: String,
        /// Destination path; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Recompute a character file's derived stats in place
    Recompute {
        /// Path to a character record (JSON or YAML)
        #[arg(long)]
        file: PathBuf,
        /// Starting hero point ceiling before rewards and flaws
        #[arg(long, default_value_t = 50)]
        default_max: u32,
    },
    /// Run one attrition procedure against a character file
    Attrition {
        /// Path to a character record (JSON or YAML)
        #[arg(long)]
        file: PathBuf,
        /// Which procedure to run
        #[arg(long, value_enum)]
        kind: AttritionKind,
        /// RNG seed for determinism; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Let destroy attrition delete the selected equipment permanently
        #[arg(long, default_value_t = false)]
        auto_destroy: bool,
        /// Starting hero point ceiling before rewards and flaws
        #[arg(long, default_value_t = 50)]
        default_max: u32,
        /// Print the structured outcome as JSON instead of narration
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Sort combatants into acting order (higher phase acts first)
    Order {
        /// Combatants as name=phase pairs, in join order
        #[arg(required = true)]
        combatants: Vec<String>,
    },
    /// Roll a handful of d6s
    Roll {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 5)]
        rolls: u32,
    },
}

#[derive(Parser)]
#[command(name = "attrition-cli")]
#[command(about = "Harness for the attrition rules engine")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

/// Sink that prints chat-card style narration to stdout.
struct PrintSink;

impl NarrativeSink for PrintSink {
    fn emit(&mut self, actor: &str, kind: ResolutionKind, outcome: &AttritionOutcome) {
        let narration = render(actor, kind, outcome);
        println!("{}", narration.flavor);
        println!("{}", narration.body);
    }
}

/// Sink that swallows narration (used when JSON output is requested).
struct SilentSink;

impl NarrativeSink for SilentSink {
    fn emit(&mut self, _: &str, _: ResolutionKind, _: &AttritionOutcome) {}
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Dump { name, out } => {
            let record = builtin_character(&name)?;
            match out {
                Some(path) => save_character_file(path, &record)?,
                None => println!("{}", serde_json::to_string_pretty(&record)?),
            }
        }
        Cmd::Recompute { file, default_max } => {
            let config = RulesConfig {
                default_max_hero_points: Some(default_max),
                ..RulesConfig::default()
            };
            let id = load_character_file(&file)?.id;
            let mut store = FileStore::new(&file);
            let record = run_recompute(&mut store, &config, &id)?;
            let hp = record.character.hero_points;
            println!(
                "{}: defense {}, hero points {}/{} ({} remaining), equipment {}/{}, flesh {}/{}",
                record.character.name,
                record.character.defense,
                hp.spent,
                hp.max,
                hp.remaining,
                record.character.attrition.equipment.current,
                record.character.attrition.equipment.max,
                record.character.attrition.flesh.current,
                record.character.attrition.flesh.max,
            );
        }
        Cmd::Attrition {
            file,
            kind,
            seed,
            auto_destroy,
            default_max,
            json,
        } => {
            let config = RulesConfig {
                auto_destroy,
                default_max_hero_points: Some(default_max),
                ..RulesConfig::default()
            };
            let record = load_character_file(&file)?;
            let mut store = FileStore::new(&file);
            let mut dice = match seed {
                Some(seed) => Dice::from_seed(seed),
                None => Dice::from_entropy(),
            };
            let id = record.id.clone();
            let outcome = if json {
                run_attrition(
                    &mut store,
                    &mut SilentSink,
                    &config,
                    &mut dice,
                    &id,
                    kind.into(),
                )?
            } else {
                run_attrition(
                    &mut store,
                    &mut PrintSink,
                    &config,
                    &mut dice,
                    &id,
                    kind.into(),
                )?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
        Cmd::Order { combatants } => {
            let mut encounter = Encounter::new();
            for pair in &combatants {
                let Some((name, phase)) = pair.split_once('=') else {
                    bail!("expected name=phase, got '{pair}'");
                };
                let phase: i32 = phase
                    .parse()
                    .with_context(|| format!("invalid phase in '{pair}'"))?;
                encounter.join(name, phase);
            }
            for (slot, combatant) in encounter.turn_order().iter().enumerate() {
                println!(
                    "{}. {} (phase {})",
                    slot + 1,
                    combatant.character,
                    combatant.phase
                );
            }
        }
        Cmd::Roll { seed, rolls } => {
            let mut dice = Dice::from_seed(seed);
            let values: Vec<String> = (0..rolls).map(|_| dice.d6().to_string()).collect();
            println!("d6: {}", values.join(", "));
        }
    }
    Ok(())
}
