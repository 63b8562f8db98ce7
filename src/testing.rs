//! Testing utilities: deterministic rollers, sample characters, and
//! assertion helpers.
//!
//! The combat system draws every die through [`DiceRoller`], so tests
//! substitute one of the rollers here to make outcomes exact.

use crate::character::{BaseStats, Character};
use crate::dice::DiceRoller;
use crate::effects::EffectName;

/// A roller whose every die shows the same face.
pub struct FixedRoller(pub i32);

impl DiceRoller for FixedRoller {
    fn die(&mut self, _sides: i32) -> i32 {
        self.0
    }
}

/// A roller that replays a scripted sequence of draws, repeating the
/// final draw once the sequence is exhausted.
pub struct SequenceRoller {
    draws: Vec<i32>,
    index: usize,
}

impl SequenceRoller {
    pub fn new(draws: Vec<i32>) -> Self {
        assert!(!draws.is_empty(), "SequenceRoller needs at least one draw");
        Self { draws, index: 0 }
    }
}

impl DiceRoller for SequenceRoller {
    fn die(&mut self, _sides: i32) -> i32 {
        let draw = self.draws[self.index.min(self.draws.len() - 1)];
        self.index += 1;
        draw
    }
}

/// A physical combatant: every stat 20, melee 20, no magic.
///
/// Derived numbers: atp 40, dfp 40, tou 70, wil 70, pwr 20; pools
/// 14/14/36. Unequipped.
pub fn sample_warrior(name: &str) -> Character {
    Character::new(
        name,
        BaseStats {
            strength: 20,
            stamina: 20,
            speed: 20,
            skill: 20,
            sagacity: 20,
            smarts: 20,
            melee: 20,
            magic: 0,
        },
    )
}

/// A magical combatant: every stat 20, magic 20, no melee.
///
/// Derived numbers: atp 20, dfp 40, tou 70, wil 70, pwr 40 before any
/// implement. Unequipped.
pub fn sample_mage(name: &str) -> Character {
    Character::new(
        name,
        BaseStats {
            strength: 20,
            stamina: 20,
            speed: 20,
            skill: 20,
            sagacity: 20,
            smarts: 20,
            melee: 0,
            magic: 20,
        },
    )
}

/// Assert all three resource pools at once.
#[track_caller]
pub fn assert_pools(character: &Character, body: i32, mind: i32, soul: i32) {
    assert_eq!(
        (character.body(), character.mind(), character.soul()),
        (body, mind, soul),
        "expected {} at {body}/{mind}/{soul}, got {}/{}/{}",
        character.name,
        character.body(),
        character.mind(),
        character.soul(),
    );
}

/// Assert that `character` holds an effect called `name`.
#[track_caller]
pub fn assert_has_effect(character: &Character, name: EffectName) {
    assert!(
        character.has_effect(name),
        "expected {} to have the {name} effect",
        character.name
    );
}

/// Assert that `character` does not hold an effect called `name`.
#[track_caller]
pub fn assert_no_effect(character: &Character, name: EffectName) {
    assert!(
        !character.has_effect(name),
        "expected {} to NOT have the {name} effect",
        character.name
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_roller() {
        let mut roller = FixedRoller(4);
        assert_eq!(roller.die(6), 4);
        assert_eq!(roller.die(100), 4);
    }

    #[test]
    fn test_sequence_roller_repeats_last_draw() {
        let mut roller = SequenceRoller::new(vec![1, 2]);
        assert_eq!(roller.die(6), 1);
        assert_eq!(roller.die(6), 2);
        assert_eq!(roller.die(6), 2);
    }

    #[test]
    fn test_sample_characters() {
        let warrior = sample_warrior("W");
        assert_eq!(warrior.atp(), 40);
        assert_eq!(warrior.pwr(), 20);
        assert_pools(&warrior, 14, 14, 36);

        let mage = sample_mage("M");
        assert_eq!(mage.atp(), 20);
        assert_eq!(mage.pwr(), 40);
    }
}
