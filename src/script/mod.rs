//! CritScript: the ability-scripting language.
//!
//! A line-oriented, block-structured mini-language describing what an
//! attack or spell does. Scripts are compiled (normalized and validated)
//! into a flat instruction list, then interpreted against an acting
//! character and a set of targets.
//!
//! ```
//! use critscript::dice::RngRoller;
//! use critscript::script::{compile, run_script};
//! # use critscript::character::{BaseStats, Character};
//!
//! let script = compile(
//!     "atk(atp vs dfp)\n\
//!      hit\n\
//!      Damage Body WEAPON\n\
//!      endhit\n\
//!      endatk",
//! )?;
//!
//! # let mut attacker = Character::new("A", BaseStats::default());
//! # let mut targets = vec![Character::new("B", BaseStats::default())];
//! let mut roller = RngRoller::from_entropy();
//! let rolls = run_script(&mut roller, &mut attacker, &mut targets, &script)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod compiler;
mod interpreter;
mod parse;

pub use compiler::{compile, compile_lines, CompileError, CompileErrorKind, CompiledScript};
pub use interpreter::{run_script, RuntimeError};
pub use parse::Block;
