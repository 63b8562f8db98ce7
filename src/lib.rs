//! Tabletop combat engine with the CritScript ability language.
//!
//! This crate provides:
//! - Characters with derived combat stats, clamped resource pools, and
//!   durable equipment
//! - Timed status effects with apply/tick/merge/remove lifecycles
//! - A dice-expression evaluator with an injectable random source
//! - CritScript: a block-structured mini-language for abilities,
//!   compiled to a flat instruction list and interpreted against live
//!   combat state
//!
//! # Quick Start
//!
//! ```
//! use critscript::character::{BaseStats, Character};
//! use critscript::dice::RngRoller;
//! use critscript::script::{compile, run_script};
//!
//! let emberspark = compile(
//!     "atk(pwr vs dfp)\n\
//!      Damage Body 1d3+IMP\n\
//!      Effect Soulburn 1\n\
//!      crit\n\
//!      Effect Soulburn 5\n\
//!      endcrit\n\
//!      endatk",
//! )?;
//!
//! let mut caster = Character::new("Caster", BaseStats::default());
//! let mut targets = vec![Character::new("Target", BaseStats::default())];
//!
//! let mut roller = RngRoller::from_entropy();
//! let rolls = run_script(&mut roller, &mut caster, &mut targets, &emberspark)?;
//! assert_eq!(rolls.len(), targets.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod character;
pub mod combat;
pub mod dice;
pub mod effects;
pub mod equipment;
pub mod items;
pub mod script;
pub mod testing;

// Primary public API
pub use character::{BaseStats, Character, CharacterId, DamageChannel};
pub use combat::{
    apply_effect, damage, hit, hit_by_name, remove_effect, substitute_attributes, tick_effects,
    AttackStat, DefenseStat, RollResult, StatError,
};
pub use dice::{d100, dice, eval_formula, DiceError, DiceRoller, RngRoller};
pub use effects::{Duration, Effect, EffectName};
pub use equipment::{Armor, Durability, Implement, Weapon};
pub use script::{
    compile, compile_lines, run_script, CompileError, CompileErrorKind, CompiledScript,
    RuntimeError,
};
