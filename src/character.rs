//! Characters: base stats, derived combat numbers, resource pools, and
//! the active-effect collection.
//!
//! A character has three resource pools (body, mind, and soul), each
//! clamped to `[0, max]`, with maximums derived from base stats. Derived
//! combat numbers (ATP, DFP, TOU, WIL, PWR) feed the contested-roll
//! system in [`crate::combat`].

use crate::effects::{Effect, EffectName};
use crate::equipment::{Armor, Implement, Weapon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Add;
use uuid::Uuid;

/// Unique identifier for a character, for use by external stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// The damage channel a hit drains: one of the three resource pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageChannel {
    Body,
    Mind,
    Soul,
}

impl DamageChannel {
    /// Parse the lowercase script spelling.
    pub fn from_script_name(name: &str) -> Option<Self> {
        match name {
            "body" => Some(DamageChannel::Body),
            "mind" => Some(DamageChannel::Mind),
            "soul" => Some(DamageChannel::Soul),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageChannel::Body => "body",
            DamageChannel::Mind => "mind",
            DamageChannel::Soul => "soul",
        }
    }
}

impl fmt::Display for DamageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base stats of an actor. Stat-change effects add deltas to these;
/// everything else about a character is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub strength: i32,
    pub stamina: i32,
    pub speed: i32,
    pub skill: i32,
    pub sagacity: i32,
    pub smarts: i32,
    pub melee: i32,
    pub magic: i32,
}

impl BaseStats {
    /// A delta with only strength and stamina set, the shape used by the
    /// Might and Weakness effects.
    pub fn physical_delta(strength: i32, stamina: i32) -> Self {
        Self {
            strength,
            stamina,
            ..Self::default()
        }
    }
}

impl Add for BaseStats {
    type Output = BaseStats;

    fn add(self, other: BaseStats) -> BaseStats {
        BaseStats {
            strength: self.strength + other.strength,
            stamina: self.stamina + other.stamina,
            speed: self.speed + other.speed,
            skill: self.skill + other.skill,
            sagacity: self.sagacity + other.sagacity,
            smarts: self.smarts + other.smarts,
            melee: self.melee + other.melee,
            magic: self.magic + other.magic,
        }
    }
}

/// An animate actor in the world.
///
/// The combat core consumes characters; it never constructs them on its
/// own. External factories build them from race/class data and hand them
/// to the script interpreter as actor or targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub stats: BaseStats,
    body: i32,
    mind: i32,
    soul: i32,
    pub weapon: Option<Weapon>,
    pub armor: Option<Armor>,
    pub implement: Option<Implement>,
    effects: HashMap<EffectName, Effect>,
}

impl Character {
    /// Create a character with full pools and empty hands.
    pub fn new(name: impl Into<String>, stats: BaseStats) -> Self {
        let mut ch = Self {
            id: CharacterId::new(),
            name: name.into(),
            stats,
            body: 0,
            mind: 0,
            soul: 0,
            weapon: None,
            armor: None,
            implement: None,
            effects: HashMap::new(),
        };
        ch.body = ch.max_body();
        ch.mind = ch.max_mind();
        ch.soul = ch.max_soul();
        ch
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_armor(mut self, armor: Armor) -> Self {
        self.armor = Some(armor);
        self
    }

    pub fn with_implement(mut self, implement: Implement) -> Self {
        self.implement = Some(implement);
        self
    }

    // ========================================================================
    // Stat modifiers
    // ========================================================================

    pub fn str_mod(&self) -> i32 {
        self.stats.strength / 10
    }

    pub fn stam_mod(&self) -> i32 {
        self.stats.stamina / 10
    }

    pub fn spd_mod(&self) -> i32 {
        self.stats.speed / 10
    }

    pub fn skl_mod(&self) -> i32 {
        self.stats.skill / 10
    }

    pub fn sag_mod(&self) -> i32 {
        self.stats.sagacity / 10
    }

    pub fn smt_mod(&self) -> i32 {
        self.stats.smarts / 10
    }

    // ========================================================================
    // Derived combat numbers
    // ========================================================================

    /// Attack power: bonus to physical contested rolls.
    pub fn atp(&self) -> i32 {
        self.stats.melee + self.stats.skill
    }

    /// Defense power: target number against incoming attacks.
    pub fn dfp(&self) -> i32 {
        self.stats.skill + self.stats.magic.max(self.stats.melee)
    }

    /// Toughness: target number against attacks on the body.
    pub fn tou(&self) -> i32 {
        self.stats.stamina + 50
    }

    /// Willpower: target number against attacks on the mind.
    pub fn wil(&self) -> i32 {
        self.stats.sagacity + 50
    }

    /// Power: bonus to magical contested rolls. Includes the equipped
    /// implement's contribution.
    pub fn pwr(&self) -> i32 {
        let stat = self.stats.sagacity / 2 + self.stats.smarts / 2;
        let imp = self.implement.as_ref().map_or(0, |i| i.power);
        stat + imp + self.stats.magic
    }

    /// Armor defense value, 0 when unarmored.
    pub fn defense(&self) -> i32 {
        self.armor.as_ref().map_or(0, |a| a.defense)
    }

    // ========================================================================
    // Resource pools
    // ========================================================================

    pub fn max_body(&self) -> i32 {
        self.stam_mod() * 5 + self.str_mod() * 2
    }

    pub fn max_mind(&self) -> i32 {
        self.sag_mod() * 5 + self.smt_mod() * 2
    }

    pub fn max_soul(&self) -> i32 {
        (self.str_mod()
            + self.stam_mod()
            + self.spd_mod()
            + self.skl_mod()
            + self.sag_mod()
            + self.smt_mod())
            * 3
    }

    pub fn body(&self) -> i32 {
        self.body
    }

    pub fn mind(&self) -> i32 {
        self.mind
    }

    pub fn soul(&self) -> i32 {
        self.soul
    }

    pub fn set_body(&mut self, val: i32) {
        self.body = val.clamp(0, self.max_body());
    }

    pub fn set_mind(&mut self, val: i32) {
        self.mind = val.clamp(0, self.max_mind());
    }

    pub fn set_soul(&mut self, val: i32) {
        self.soul = val.clamp(0, self.max_soul());
    }

    /// Drain `amount` from the pool selected by `channel`, clamped at 0.
    pub fn drain_pool(&mut self, channel: DamageChannel, amount: i32) {
        match channel {
            DamageChannel::Body => self.set_body(self.body - amount),
            DamageChannel::Mind => self.set_mind(self.mind - amount),
            DamageChannel::Soul => self.set_soul(self.soul - amount),
        }
    }

    pub fn pool(&self, channel: DamageChannel) -> i32 {
        match channel {
            DamageChannel::Body => self.body,
            DamageChannel::Mind => self.mind,
            DamageChannel::Soul => self.soul,
        }
    }

    /// A character is out of the fight when body or soul hits zero.
    pub fn alive(&self) -> bool {
        self.body > 0 && self.soul > 0
    }

    // ========================================================================
    // Active effects
    // ========================================================================

    /// The effect collection holds at most one effect per name.
    pub fn find_effect(&self, name: EffectName) -> Option<&Effect> {
        self.effects.get(&name)
    }

    pub fn find_effect_mut(&mut self, name: EffectName) -> Option<&mut Effect> {
        self.effects.get_mut(&name)
    }

    pub fn has_effect(&self, name: EffectName) -> bool {
        self.effects.contains_key(&name)
    }

    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.values()
    }

    pub fn effect_names(&self) -> Vec<EffectName> {
        self.effects.keys().copied().collect()
    }

    pub(crate) fn insert_effect(&mut self, effect: Effect) {
        self.effects.insert(effect.name, effect);
    }

    pub(crate) fn take_effect(&mut self, name: EffectName) -> Option<Effect> {
        self.effects.remove(&name)
    }

    // ========================================================================
    // Formulas and display
    // ========================================================================

    /// Damage formula of the equipped weapon; bare fists hit for 1.
    pub fn weapon_damage_formula(&self) -> &str {
        self.weapon.as_ref().map_or("1", |w| w.damage.as_str())
    }

    /// Damage formula of the equipped implement; 0 with nothing equipped.
    pub fn implement_damage_formula(&self) -> &str {
        self.implement.as_ref().map_or("0", |i| i.damage.as_str())
    }

    pub fn body_display(&self) -> String {
        format!("{}/{}", self.body, self.max_body())
    }

    pub fn mind_display(&self) -> String {
        format!("{}/{}", self.mind, self.max_mind())
    }

    pub fn soul_display(&self) -> String {
        format!("{}/{}", self.soul, self.max_soul())
    }

    pub fn weapon_display(&self) -> String {
        match &self.weapon {
            Some(w) => w.to_string(),
            None => "Fists (Dmg 1)".to_string(),
        }
    }

    pub fn armor_display(&self) -> String {
        match &self.armor {
            Some(a) => a.to_string(),
            None => "None".to_string(),
        }
    }

    pub fn implement_display(&self) -> String {
        match &self.implement {
            Some(i) => i.to_string(),
            None => "None".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{Armor, Implement, Weapon};

    fn flat_twenties() -> BaseStats {
        BaseStats {
            strength: 20,
            stamina: 20,
            speed: 20,
            skill: 20,
            sagacity: 20,
            smarts: 20,
            melee: 0,
            magic: 0,
        }
    }

    #[test]
    fn test_derived_stats() {
        let dude = Character::new("Test Dude", flat_twenties());
        assert_eq!(dude.atp(), 20);
        assert_eq!(dude.dfp(), 20);
        assert_eq!(dude.tou(), 70);
        assert_eq!(dude.wil(), 70);
        assert_eq!(dude.pwr(), 20);
        assert_eq!(dude.defense(), 0);
        assert_eq!(dude.weapon_damage_formula(), "1");
    }

    #[test]
    fn test_pool_maximums() {
        let dude = Character::new("Test Dude", flat_twenties());
        assert_eq!(dude.max_body(), 14);
        assert_eq!(dude.max_mind(), 14);
        assert_eq!(dude.max_soul(), 36);
        assert_eq!(dude.body(), 14);
        assert_eq!(dude.body_display(), "14/14");
    }

    #[test]
    fn test_pools_clamp() {
        let mut dude = Character::new("Test Dude", flat_twenties());
        dude.set_body(-5);
        assert_eq!(dude.body(), 0);
        assert!(!dude.alive());

        dude.set_body(99);
        assert_eq!(dude.body(), 14);

        dude.drain_pool(DamageChannel::Soul, 100);
        assert_eq!(dude.soul(), 0);
    }

    #[test]
    fn test_equipped_numbers() {
        let dude = Character::new("Test Dude", flat_twenties())
            .with_weapon(Weapon::new("Dagger", "1d4", 50))
            .with_armor(Armor::new("Half Plate", 3, 40))
            .with_implement(Implement::new("Brass Rod", 10, "1d3", 50));

        assert_eq!(dude.defense(), 3);
        assert_eq!(dude.pwr(), 30);
        assert_eq!(dude.weapon_damage_formula(), "1d4");
        assert_eq!(dude.implement_damage_formula(), "1d3");
        assert_eq!(dude.weapon_display(), "Dagger (Dmg 1d4 Dur 50/50)");
    }

    #[test]
    fn test_stat_delta_addition() {
        let buffed = flat_twenties() + BaseStats::physical_delta(10, 10);
        assert_eq!(buffed.strength, 30);
        assert_eq!(buffed.stamina, 30);
        assert_eq!(buffed.skill, 20);
    }
}
