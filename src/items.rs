//! Built-in equipment catalog.
//!
//! A small set of standard gear for character factories and tests.
//! External data stores can build their own equipment directly with the
//! [`crate::equipment`] constructors; this catalog is the baseline kit.

use crate::equipment::{Armor, Implement, Weapon};

lazy_static::lazy_static! {
    /// Standard weapons.
    pub static ref WEAPONS: Vec<Weapon> = vec![
        Weapon::new("Dagger", "1d4", 30),
        Weapon::new("Shortsword", "1d6", 40),
        Weapon::new("Longsword", "1d8", 50),
        Weapon::new("Greataxe", "2d6", 45),
        Weapon::new("Warhammer", "1d10", 55),
        Weapon::new("Spear", "1d6+1", 40),
    ];

    /// Standard armor.
    pub static ref ARMOR: Vec<Armor> = vec![
        Armor::new("Padded Jack", 1, 25),
        Armor::new("Mail Shirt", 2, 35),
        Armor::new("Half Plate", 3, 40),
        Armor::new("Full Plate", 5, 60),
    ];

    /// Standard implements.
    pub static ref IMPLEMENTS: Vec<Implement> = vec![
        Implement::new("Ash Wand", 5, "1d2", 30),
        Implement::new("Brass Rod", 10, "1d3", 50),
        Implement::new("Crystal Orb", 15, "1d4", 40),
    ];
}

/// Look up a standard weapon by name (case-insensitive).
pub fn standard_weapon(name: &str) -> Option<Weapon> {
    WEAPONS
        .iter()
        .find(|w| w.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Look up standard armor by name (case-insensitive).
pub fn standard_armor(name: &str) -> Option<Armor> {
    ARMOR
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// Look up a standard implement by name (case-insensitive).
pub fn standard_implement(name: &str) -> Option<Implement> {
    IMPLEMENTS
        .iter()
        .find(|i| i.name.eq_ignore_ascii_case(name))
        .cloned()
}
