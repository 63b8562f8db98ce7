//! Equipment: weapons, armor, and magic implements.
//!
//! Every piece of equipment wears down as it is used. Durability can go
//! negative: at or below zero the item is broken (it stops working but
//! keeps taking wear), and at or below the negated maximum it is
//! destroyed outright.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wear tracking shared by all equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durability {
    pub current: i32,
    pub maximum: i32,
}

impl Durability {
    pub fn new(maximum: i32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Take `amount` points of wear.
    pub fn spend(&mut self, amount: i32) {
        self.current -= amount;
    }

    /// Repair back to full.
    pub fn restore(&mut self) {
        self.current = self.maximum;
    }

    pub fn is_broken(&self) -> bool {
        self.current <= 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.current <= -self.maximum
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.maximum)
    }
}

/// A melee or ranged weapon. `damage` is a dice formula like `1d8`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: String,
    pub durability: Durability,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage: impl Into<String>, max_durability: i32) -> Self {
        Self {
            name: name.into(),
            damage: damage.into(),
            durability: Durability::new(max_durability),
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Dmg {} Dur {})",
            self.name, self.damage, self.durability
        )
    }
}

/// Body armor. `defense` is subtracted from incoming mitigable damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub name: String,
    pub defense: i32,
    pub durability: Durability,
}

impl Armor {
    pub fn new(name: impl Into<String>, defense: i32, max_durability: i32) -> Self {
        Self {
            name: name.into(),
            defense,
            durability: Durability::new(max_durability),
        }
    }
}

impl fmt::Display for Armor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Def {} Dur {})",
            self.name, self.defense, self.durability
        )
    }
}

/// A magic implement: wand, rod, focus. Contributes `power` to the
/// bearer's PWR stat and carries its own damage formula for spells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implement {
    pub name: String,
    pub power: i32,
    pub damage: String,
    pub durability: Durability,
}

impl Implement {
    pub fn new(
        name: impl Into<String>,
        power: i32,
        damage: impl Into<String>,
        max_durability: i32,
    ) -> Self {
        Self {
            name: name.into(),
            power,
            damage: damage.into(),
            durability: Durability::new(max_durability),
        }
    }
}

impl fmt::Display for Implement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Pwr {} Dmg {} Dur {})",
            self.name, self.power, self.damage, self.durability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durability_lifecycle() {
        let mut dur = Durability::new(10);
        assert!(!dur.is_broken());

        dur.spend(10);
        assert!(dur.is_broken());
        assert!(!dur.is_destroyed());

        dur.spend(10);
        assert!(dur.is_destroyed());

        dur.restore();
        assert!(!dur.is_broken());
        assert_eq!(dur.current, 10);
    }

    #[test]
    fn test_display() {
        let dagger = Weapon::new("Dagger", "1d4", 30);
        assert_eq!(dagger.to_string(), "Dagger (Dmg 1d4 Dur 30/30)");

        let plate = Armor::new("Half Plate", 3, 40);
        assert_eq!(plate.to_string(), "Half Plate (Def 3 Dur 40/40)");

        let rod = Implement::new("Brass Rod", 10, "1d3", 50);
        assert_eq!(rod.to_string(), "Brass Rod (Pwr 10 Dmg 1d3 Dur 50/50)");
    }
}
