//! Combat resolution: contested rolls, the damage mitigation pipeline,
//! the effect lifecycle, and attribute substitution in damage formulas.
//!
//! The damage pipeline resolves in a fixed order: shield absorption,
//! then armor mitigation (with durability wear), then the remaining
//! amount drains the selected resource pool.

use crate::character::{Character, DamageChannel};
use crate::dice::{d100, DiceRoller};
use crate::effects::{Duration, Effect, EffectName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for stat keys passed to the contested-roll system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    #[error("{0} is not a valid attack stat")]
    BadAttackStat(String),
    #[error("{0} is not a valid defense stat")]
    BadDefenseStat(String),
}

/// The attacker's side of a contested roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackStat {
    /// `atp`: physical attack power. Attacking wears the weapon.
    Attack,
    /// `pwr`: magical power. Attacking wears the implement.
    Power,
}

impl AttackStat {
    pub fn from_script_name(name: &str) -> Result<Self, StatError> {
        match name {
            "atp" => Ok(AttackStat::Attack),
            "pwr" => Ok(AttackStat::Power),
            other => Err(StatError::BadAttackStat(other.to_string())),
        }
    }

    fn bonus(&self, attacker: &Character) -> i32 {
        match self {
            AttackStat::Attack => attacker.atp(),
            AttackStat::Power => attacker.pwr(),
        }
    }
}

/// The defender's side of a contested roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefenseStat {
    /// `dfp`: defense power.
    Defense,
    /// `tou`: toughness.
    Toughness,
    /// `wil`: willpower.
    Willpower,
}

impl DefenseStat {
    pub fn from_script_name(name: &str) -> Result<Self, StatError> {
        match name {
            "dfp" => Ok(DefenseStat::Defense),
            "tou" => Ok(DefenseStat::Toughness),
            "wil" => Ok(DefenseStat::Willpower),
            other => Err(StatError::BadDefenseStat(other.to_string())),
        }
    }

    fn target_number(&self, defender: &Character) -> i32 {
        match self {
            DefenseStat::Defense => defender.dfp(),
            DefenseStat::Toughness => defender.tou(),
            DefenseStat::Willpower => defender.wil(),
        }
    }
}

/// Immutable record of one contested roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Attacker's total: raw d100 plus attack bonus.
    pub roll: i32,
    /// Defender's target number.
    pub target: i32,
    /// Margin over the target number (may be negative).
    pub margin: i32,
    /// Success: margin at least zero, or a crit regardless of margin.
    pub success: bool,
    /// Critical: margin of 50+, or an unmodified die of 95+.
    pub crit: bool,
}

/// Resolve one contested roll of `atk_stat` against `def_stat`.
pub fn hit<R: DiceRoller + ?Sized>(
    roller: &mut R,
    attacker: &Character,
    defender: &Character,
    atk_stat: AttackStat,
    def_stat: DefenseStat,
) -> RollResult {
    let raw = d100(roller);
    let roll = raw + atk_stat.bonus(attacker);
    let target = def_stat.target_number(defender);
    let margin = roll - target;
    let crit = margin >= 50 || raw >= 95;

    RollResult {
        roll,
        target,
        margin,
        success: margin >= 0 || crit,
        crit,
    }
}

/// Resolve a contested roll with script-spelled stat names.
pub fn hit_by_name<R: DiceRoller + ?Sized>(
    roller: &mut R,
    attacker: &Character,
    defender: &Character,
    atk_stat: &str,
    def_stat: &str,
) -> Result<RollResult, StatError> {
    let atk = AttackStat::from_script_name(atk_stat)?;
    let def = DefenseStat::from_script_name(def_stat)?;
    Ok(hit(roller, attacker, defender, atk, def))
}

// ============================================================================
// Damage pipeline
// ============================================================================

/// Apply `amount` damage with full mitigation (armor and shield).
pub fn damage(target: &mut Character, amount: i32, channel: DamageChannel) {
    damage_with(target, amount, channel, true, true);
}

/// Apply `amount` damage to `target` on `channel`.
///
/// Resolution order:
/// 1. A live Shield effect absorbs the damage if `shield_applies`; the
///    shield breaks (and is removed without its remove hook) when its
///    potency is exhausted, letting the excess through.
/// 2. Armor reduces the remainder if `armor_applies`. Fully-absorbed
///    hits cost the armor 1 durability, penetrating hits 2; broken
///    armor mitigates nothing and takes 2.
/// 3. Whatever is left drains the channel's pool, clamped at 0.
pub fn damage_with(
    target: &mut Character,
    amount: i32,
    channel: DamageChannel,
    armor_applies: bool,
    shield_applies: bool,
) {
    let mut remaining = amount;

    if shield_applies {
        if let Some(shield) = target.find_effect_mut(EffectName::Shield) {
            if shield.potency > 0 {
                shield.potency -= amount;
                if shield.potency <= 0 {
                    remaining = -shield.potency;
                    remove_effect(target, EffectName::Shield, true);
                } else {
                    remaining = 0;
                }
            }
        }
    }

    if armor_applies {
        if let Some(armor) = target.armor.as_mut() {
            if armor.durability.is_broken() {
                // Broken armor stops nothing and keeps getting battered.
                armor.durability.spend(2);
            } else {
                remaining -= armor.defense;
                if remaining <= 0 {
                    armor.durability.spend(1);
                } else {
                    armor.durability.spend(2);
                }
            }
        }
    }

    if remaining > 0 {
        target.drain_pool(channel, remaining);
    }
}

// ============================================================================
// Effect lifecycle
// ============================================================================

/// Apply `effect` to `target`.
///
/// A held effect of the same name merges the incoming copy instead of
/// duplicating; immediate effects fire their apply hook and are never
/// stored.
pub fn apply_effect(target: &mut Character, mut effect: Effect) {
    if let Some(held) = target.find_effect_mut(effect.name) {
        held.on_merge(effect);
        return;
    }

    if effect.duration.is_immediate() {
        effect.on_apply(target);
        return;
    }

    // The apply hook runs while the effect is detached from the bearer;
    // no hook inspects the bearer's effect collection.
    effect.on_apply(target);
    target.insert_effect(effect);
}

/// Remove the effect called `name` from `target`.
///
/// Fires the remove hook unless `skip_remove_hook`. The effect must be
/// present; removing an absent effect is a programmer error.
pub fn remove_effect(target: &mut Character, name: EffectName, skip_remove_hook: bool) {
    let mut effect = target
        .take_effect(name)
        .unwrap_or_else(|| panic!("remove_effect: {name} not present on {}", target.name));
    if !skip_remove_hook {
        effect.on_remove(target);
    }
}

/// Advance one combat turn for `target`'s effects.
///
/// Every effect's duration drops by one and its tick hook fires; expired
/// effects are swept afterwards in a second pass so the collection is
/// never mutated mid-iteration. Tick order across distinct effects is
/// unspecified and nothing may rely on it.
pub fn tick_effects(target: &mut Character) {
    let mut expired = Vec::new();
    for name in target.effect_names() {
        // A tick can remove other effects (a DOT can break a shield), so
        // the snapshot entry may already be gone.
        let Some(mut effect) = target.take_effect(name) else {
            continue;
        };
        effect.duration.decrement();
        effect.on_tick(target);
        if effect.duration.expired() {
            expired.push(name);
        }
        target.insert_effect(effect);
    }

    for name in expired {
        // A later tick in the same turn may have already removed the
        // effect (a DOT can break a shield that was due to expire).
        if target.has_effect(name) {
            remove_effect(target, name, false);
        }
    }
}

// ============================================================================
// Attribute substitution
// ============================================================================

/// Rewrite attribute tokens in a damage formula into concrete terms for
/// the dice evaluator, using `actor`'s current stats and equipment:
///
/// * `weapon`: the equipped weapon's damage formula (`1` unarmed),
/// * `imp`: the equipped implement's damage formula (`0` if none),
/// * `strmod` / `sklmod`: the stat modifier as a literal.
///
/// Matching is per whole term between `+`/`-` signs, so a token substring
/// inside another term is never touched. Does not mutate `actor`.
pub fn substitute_attributes(actor: &Character, formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut term = String::new();

    let mut flush = |term: &mut String, out: &mut String| {
        match term.to_ascii_lowercase().as_str() {
            "weapon" => out.push_str(actor.weapon_damage_formula()),
            "imp" => out.push_str(actor.implement_damage_formula()),
            "strmod" => out.push_str(&actor.str_mod().to_string()),
            "sklmod" => out.push_str(&actor.skl_mod().to_string()),
            _ => out.push_str(term),
        }
        term.clear();
    };

    for ch in formula.chars() {
        if ch == '+' || ch == '-' {
            flush(&mut term, &mut out);
            out.push(ch);
        } else {
            term.push(ch);
        }
    }
    flush(&mut term, &mut out);
    out
}
