//! The CritScript interpreter: executes a compiled script for an acting
//! character against a set of targets.
//!
//! Execution walks the instruction list top to bottom using the
//! compiler's jump table. The only state carried between instructions is
//! the implicit subject (acting character or current target), the roll
//! outcome of the enclosing `atk` block, and the instruction pointer.

use super::compiler::CompiledScript;
use super::parse::{parse_statement, Block, Statement};
use crate::character::{Character, DamageChannel};
use crate::combat::{
    apply_effect, damage, hit, substitute_attributes, AttackStat, RollResult, StatError,
};
use crate::dice::{eval_formula, DiceError, DiceRoller};
use crate::effects::{Effect, EffectName};
use thiserror::Error;

/// A failure during script execution.
///
/// Structure errors cannot occur in compiler output; formula and stat
/// errors can, since the compiler validates shape, not roll-ability.
/// Any runtime error aborts the run mid-script; the core performs no
/// rollback, so callers should not trust partial effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Dice(#[from] DiceError),
    #[error(transparent)]
    Stat(#[from] StatError),
    #[error("unknown effect `{0}` reached the interpreter")]
    UnknownEffect(String),
    #[error("instruction {index} is not executable: {text}")]
    BadInstruction { index: usize, text: String },
    #[error("block opened at instruction {0} has no jump target")]
    MissingJump(usize),
}

/// Execute `script` with `user` acting against `targets`, in order.
///
/// Returns the contested-roll results, one per target per `atk` pass,
/// in the order they were rolled.
pub fn run_script<R: DiceRoller + ?Sized>(
    roller: &mut R,
    user: &mut Character,
    targets: &mut [Character],
    script: &CompiledScript,
) -> Result<Vec<RollResult>, RuntimeError> {
    let mut runner = Runner {
        roller,
        user,
        targets,
        script,
        rolls: Vec::new(),
    };
    runner.exec_range(
        0,
        script.len(),
        Ctx {
            subject: Subject::User,
            roll: None,
        },
    )?;
    Ok(runner.rolls)
}

/// Who an unscoped statement currently applies to.
#[derive(Debug, Clone, Copy)]
enum Subject {
    User,
    Target(usize),
}

/// Execution context for one instruction slice.
#[derive(Debug, Clone, Copy)]
struct Ctx {
    subject: Subject,
    /// Roll outcome of the enclosing `atk` block, if any.
    roll: Option<RollResult>,
}

struct Runner<'a, R: DiceRoller + ?Sized> {
    roller: &'a mut R,
    user: &'a mut Character,
    targets: &'a mut [Character],
    script: &'a CompiledScript,
    rolls: Vec<RollResult>,
}

impl<R: DiceRoller + ?Sized> Runner<'_, R> {
    fn exec_range(&mut self, start: usize, end: usize, ctx: Ctx) -> Result<(), RuntimeError> {
        let mut index = start;
        while index < end {
            let line = self
                .script
                .line(index)
                .expect("instruction pointer within script");
            let stmt = parse_statement(line).ok_or_else(|| RuntimeError::BadInstruction {
                index,
                text: line.to_string(),
            })?;

            match stmt {
                Statement::Do { times } => {
                    let close = self.jump(index)?;
                    for _ in 0..times {
                        self.exec_range(index + 1, close, ctx)?;
                    }
                    index = close + 1;
                }
                Statement::Open(Block::SelfScope) => {
                    let close = self.jump(index)?;
                    self.exec_range(
                        index + 1,
                        close,
                        Ctx {
                            subject: Subject::User,
                            roll: ctx.roll,
                        },
                    )?;
                    index = close + 1;
                }
                Statement::Atk { atk_stat, def_stat } => {
                    let close = self.jump(index)?;
                    for target in 0..self.targets.len() {
                        self.spend_attack_durability(atk_stat);
                        let result = hit(
                            self.roller,
                            self.user,
                            &self.targets[target],
                            atk_stat,
                            def_stat,
                        );
                        self.rolls.push(result);
                        self.exec_range(
                            index + 1,
                            close,
                            Ctx {
                                subject: Subject::Target(target),
                                roll: Some(result),
                            },
                        )?;
                    }
                    index = close + 1;
                }
                Statement::Open(block @ (Block::Hit | Block::Miss | Block::Crit)) => {
                    let close = self.jump(index)?;
                    let roll = ctx.roll.ok_or_else(|| RuntimeError::BadInstruction {
                        index,
                        text: line.to_string(),
                    })?;
                    let taken = match block {
                        Block::Hit => roll.success,
                        Block::Miss => !roll.success,
                        _ => roll.crit,
                    };
                    if taken {
                        self.exec_range(index + 1, close, ctx)?;
                    }
                    index = close + 1;
                }
                // Closers are skipped over via the jump table; reaching
                // one directly (overlapping blocks) is a no-op.
                Statement::End(_) => {
                    index += 1;
                }
                Statement::Damage { channel, formula } => {
                    self.resolve_damage(ctx.subject, channel, &formula)?;
                    index += 1;
                }
                Statement::Effect {
                    name,
                    duration,
                    potency,
                } => {
                    self.resolve_effect(ctx.subject, &name, duration, potency)?;
                    index += 1;
                }
                Statement::Open(Block::Do | Block::Atk) => unreachable!(),
            }
        }
        Ok(())
    }

    fn jump(&self, open_index: usize) -> Result<usize, RuntimeError> {
        self.script
            .jump(open_index)
            .ok_or(RuntimeError::MissingJump(open_index))
    }

    /// Swinging wears equipment: one durability per attack roll, from
    /// the weapon for `atp` and the implement for `pwr`.
    fn spend_attack_durability(&mut self, atk_stat: AttackStat) {
        match atk_stat {
            AttackStat::Attack => {
                if let Some(weapon) = self.user.weapon.as_mut() {
                    weapon.durability.spend(1);
                }
            }
            AttackStat::Power => {
                if let Some(implement) = self.user.implement.as_mut() {
                    implement.durability.spend(1);
                }
            }
        }
    }

    /// Formulas always resolve against the acting character's stats and
    /// equipment; the result lands on the current subject.
    fn resolve_damage(
        &mut self,
        subject: Subject,
        channel: DamageChannel,
        formula: &str,
    ) -> Result<(), RuntimeError> {
        let substituted = substitute_attributes(self.user, formula);
        let amount = eval_formula(self.roller, &substituted)?;
        damage(self.subject_mut(subject), amount, channel);
        Ok(())
    }

    fn resolve_effect(
        &mut self,
        subject: Subject,
        name: &str,
        duration: i32,
        potency: Option<i32>,
    ) -> Result<(), RuntimeError> {
        let name = EffectName::from_script_name(name)
            .ok_or_else(|| RuntimeError::UnknownEffect(name.to_string()))?;
        let effect = Effect::from_script(name, duration, potency);
        apply_effect(self.subject_mut(subject), effect);
        Ok(())
    }

    fn subject_mut(&mut self, subject: Subject) -> &mut Character {
        match subject {
            Subject::User => self.user,
            Subject::Target(index) => &mut self.targets[index],
        }
    }
}
