//! Status effects and their lifecycle.
//!
//! Effects are a closed set of variants, each described by a `name`, a
//! `duration`, and a `potency` whose meaning is effect-specific (damage
//! per tick, shield points, stat delta). Four lifecycle hooks fire at
//! the appropriate times:
//!
//! * `on_apply` when a character first receives the effect,
//! * `on_tick` once per combat turn while attached,
//! * `on_merge` when the bearer receives another copy of the same effect
//!   (the held copy is retained and mutated; by default it adopts the
//!   incoming duration),
//! * `on_remove` when the effect leaves the bearer.
//!
//! Adding a new effect means adding an [`EffectName`] variant, a
//! constructor, and its arms in the hook dispatch below; the compiler's
//! effect-name check picks the new name up from the registry
//! automatically.

use crate::character::{BaseStats, Character, DamageChannel};
use crate::combat;
use crate::dice::{eval_formula, DiceError, DiceRoller};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed registry of effect names the script compiler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectName {
    Damage,
    Burn,
    Bleed,
    Soulburn,
    Might,
    Weakness,
    Shield,
    Stun,
}

impl EffectName {
    pub const ALL: [EffectName; 8] = [
        EffectName::Damage,
        EffectName::Burn,
        EffectName::Bleed,
        EffectName::Soulburn,
        EffectName::Might,
        EffectName::Weakness,
        EffectName::Shield,
        EffectName::Stun,
    ];

    /// The lowercase spelling used in CritScript `effect` statements.
    pub fn script_name(&self) -> &'static str {
        match self {
            EffectName::Damage => "damage",
            EffectName::Burn => "burn",
            EffectName::Bleed => "bleed",
            EffectName::Soulburn => "soulburn",
            EffectName::Might => "might",
            EffectName::Weakness => "weakness",
            EffectName::Shield => "shield",
            EffectName::Stun => "stun",
        }
    }

    /// Parse the script spelling. This is the compiler's effect check.
    pub fn from_script_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|n| n.script_name() == name)
    }

    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            EffectName::Damage => "Damage",
            EffectName::Burn => "Burning",
            EffectName::Bleed => "Bleeding",
            EffectName::Soulburn => "Soulburn",
            EffectName::Might => "Might",
            EffectName::Weakness => "Weakness",
            EffectName::Shield => "Shield",
            EffectName::Stun => "Stunned",
        }
    }
}

impl fmt::Display for EffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How long an effect lasts.
///
/// `Immediate` effects resolve once on apply and are never stored in the
/// bearer's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    Immediate,
    Turns(i32),
}

impl Duration {
    pub fn is_immediate(&self) -> bool {
        matches!(self, Duration::Immediate)
    }

    pub(crate) fn decrement(&mut self) {
        if let Duration::Turns(n) = self {
            *n -= 1;
        }
    }

    pub(crate) fn expired(&self) -> bool {
        matches!(self, Duration::Turns(n) if *n <= 0)
    }
}

/// Variant-specific mechanics payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum EffectData {
    /// Presence-only effects (Stun) and effects whose potency is consumed
    /// externally (Shield).
    Marker,
    /// One-shot damage routed through the mitigation pipeline on apply.
    Damage {
        channel: DamageChannel,
        armor_applies: bool,
        shield_applies: bool,
    },
    /// Damage-over-time: `potency` drains `channel` every tick.
    Dot {
        channel: DamageChannel,
        armor_applies: bool,
        shield_applies: bool,
    },
    /// Stat buff/debuff; the bearer's pre-effect stats are snapshotted on
    /// apply and restored on removal.
    StatChange {
        delta: BaseStats,
        snapshot: Option<BaseStats>,
    },
}

/// A game effect: one entry in a character's active-effect collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub name: EffectName,
    pub duration: Duration,
    pub potency: i32,
    data: EffectData,
}

impl Effect {
    /// Instant damage, e.g. from a spell or a crit rider. The potency is
    /// rolled from `formula` up front; `on_apply` routes it through the
    /// mitigation pipeline.
    pub fn damage<R: DiceRoller + ?Sized>(
        roller: &mut R,
        formula: &str,
        channel: DamageChannel,
        armor_applies: bool,
        shield_applies: bool,
    ) -> Result<Self, DiceError> {
        Ok(Self {
            name: EffectName::Damage,
            duration: Duration::Immediate,
            potency: eval_formula(roller, formula)?,
            data: EffectData::Damage {
                channel,
                armor_applies,
                shield_applies,
            },
        })
    }

    /// Burning: 3 body damage per tick, merges by stacking duration.
    /// Generally caused by magical effects.
    pub fn burn(turns: i32) -> Self {
        Self::dot(EffectName::Burn, turns, 3, DamageChannel::Body)
    }

    /// Bleeding: 1 body damage per tick, merges by stacking potency and
    /// refreshing duration. Generally caused by big attacks.
    pub fn bleed(turns: i32) -> Self {
        Self::dot(EffectName::Bleed, turns, 1, DamageChannel::Body)
    }

    /// Soulburn: 2 soul damage per tick, merges by stacking duration.
    pub fn soulburn(turns: i32) -> Self {
        Self::dot(EffectName::Soulburn, turns, 2, DamageChannel::Soul)
    }

    /// Might: +10 strength and stamina while active.
    pub fn might(turns: i32) -> Self {
        Self::stat_change(EffectName::Might, turns, BaseStats::physical_delta(10, 10))
    }

    /// Weakness: -10 strength and stamina while active.
    pub fn weakness(turns: i32) -> Self {
        Self::stat_change(
            EffectName::Weakness,
            turns,
            BaseStats::physical_delta(-10, -10),
        )
    }

    /// Shield: absorbs `potency` points of incoming shield-eligible damage
    /// before it reaches a pool. Breaks at potency 0.
    pub fn shield(turns: i32, potency: i32) -> Self {
        Self {
            name: EffectName::Shield,
            duration: Duration::Turns(turns),
            potency,
            data: EffectData::Marker,
        }
    }

    /// Stun: marker with no mechanics beyond being queryable.
    pub fn stun(turns: i32) -> Self {
        Self {
            name: EffectName::Stun,
            duration: Duration::Turns(turns),
            potency: 0,
            data: EffectData::Marker,
        }
    }

    /// Build an effect from the parts of a script `effect` statement.
    ///
    /// DOT variants have a canonical per-tick potency which an explicit
    /// script potency overrides.
    pub fn from_script(name: EffectName, turns: i32, potency: Option<i32>) -> Self {
        let mut eff = match name {
            EffectName::Damage => Self {
                name: EffectName::Damage,
                duration: Duration::Immediate,
                potency: 0,
                data: EffectData::Damage {
                    channel: DamageChannel::Body,
                    armor_applies: true,
                    shield_applies: true,
                },
            },
            EffectName::Burn => Self::burn(turns),
            EffectName::Bleed => Self::bleed(turns),
            EffectName::Soulburn => Self::soulburn(turns),
            EffectName::Might => Self::might(turns),
            EffectName::Weakness => Self::weakness(turns),
            EffectName::Shield => Self::shield(turns, 0),
            EffectName::Stun => Self::stun(turns),
        };
        if let Some(p) = potency {
            eff.potency = p;
        }
        eff
    }

    fn dot(name: EffectName, turns: i32, potency: i32, channel: DamageChannel) -> Self {
        Self {
            name,
            duration: Duration::Turns(turns),
            potency,
            data: EffectData::Dot {
                channel,
                // Ongoing wounds gnaw from within; armor does not help,
                // wards do.
                armor_applies: false,
                shield_applies: true,
            },
        }
    }

    fn stat_change(name: EffectName, turns: i32, delta: BaseStats) -> Self {
        Self {
            name,
            duration: Duration::Turns(turns),
            potency: 0,
            data: EffectData::StatChange {
                delta,
                snapshot: None,
            },
        }
    }

    // ========================================================================
    // Lifecycle hooks, invoked by the combat module
    // ========================================================================

    pub(crate) fn on_apply(&mut self, bearer: &mut Character) {
        match &mut self.data {
            EffectData::Damage {
                channel,
                armor_applies,
                shield_applies,
            } => {
                combat::damage_with(bearer, self.potency, *channel, *armor_applies, *shield_applies);
            }
            EffectData::StatChange { delta, snapshot } => {
                *snapshot = Some(bearer.stats);
                bearer.stats = bearer.stats + *delta;
            }
            EffectData::Marker | EffectData::Dot { .. } => {}
        }
    }

    pub(crate) fn on_tick(&mut self, bearer: &mut Character) {
        if let EffectData::Dot {
            channel,
            armor_applies,
            shield_applies,
        } = self.data
        {
            combat::damage_with(bearer, self.potency, channel, armor_applies, shield_applies);
        }
    }

    pub(crate) fn on_merge(&mut self, incoming: Effect) {
        match self.name {
            // Stacks duration.
            EffectName::Burn | EffectName::Soulburn => {
                if let (Duration::Turns(held), Duration::Turns(new)) =
                    (self.duration, incoming.duration)
                {
                    self.duration = Duration::Turns(held + new);
                }
            }
            // Stacks potency, refreshes duration.
            EffectName::Bleed => {
                self.potency += incoming.potency;
                self.duration = incoming.duration;
            }
            // Default: adopt the incoming duration.
            _ => {
                self.duration = incoming.duration;
            }
        }
    }

    pub(crate) fn on_remove(&mut self, bearer: &mut Character) {
        if let EffectData::StatChange { snapshot, .. } = &self.data {
            if let Some(orig) = snapshot {
                bearer.stats = *orig;
            }
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration {
            Duration::Immediate => write!(f, "{} (pot {})", self.name, self.potency),
            Duration::Turns(n) => write!(f, "{} ({} turns, pot {})", self.name, n, self.potency),
        }
    }
}
