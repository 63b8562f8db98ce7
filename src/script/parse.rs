//! Statement shapes of the CritScript language.
//!
//! Both the compiler (for validation) and the interpreter (for
//! dispatch) parse normalized lines through [`parse_statement`], so the
//! two phases can never disagree about what a line means.

use crate::character::DamageChannel;
use crate::combat::{AttackStat, DefenseStat};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DO_RE: Regex = Regex::new(r"^do (\d+) times$").unwrap();
    static ref ATK_RE: Regex = Regex::new(r"^atk\((atp|pwr) vs (dfp|tou|wil)\)$").unwrap();
    static ref DMG_RE: Regex = Regex::new(
        r"^damage (body|mind|soul) ((?:[+-]?(?:\d+d\d+|imp|sklmod|strmod|weapon|\d+))+)$"
    )
    .unwrap();
    static ref EFF_RE: Regex = Regex::new(r"^effect ([a-z]+) (\d+)(?: (\d+))?$").unwrap();
}

/// The block-structured constructs of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    Do,
    Atk,
    Hit,
    Miss,
    Crit,
    SelfScope,
}

impl Block {
    pub const ALL: [Block; 6] = [
        Block::Do,
        Block::Atk,
        Block::Hit,
        Block::Miss,
        Block::Crit,
        Block::SelfScope,
    ];

    /// The keyword that opens this block, for error messages.
    pub fn keyword(&self) -> &'static str {
        match self {
            Block::Do => "do",
            Block::Atk => "atk",
            Block::Hit => "hit",
            Block::Miss => "miss",
            Block::Crit => "crit",
            Block::SelfScope => "self",
        }
    }

    /// The keyword that closes this block.
    pub fn closer(&self) -> &'static str {
        match self {
            Block::Do => "done",
            Block::Atk => "endatk",
            Block::Hit => "endhit",
            Block::Miss => "endmiss",
            Block::Crit => "endcrit",
            Block::SelfScope => "endself",
        }
    }

    /// Blocks that are only legal inside an open `atk` block.
    pub fn requires_atk(&self) -> bool {
        matches!(self, Block::Hit | Block::Miss | Block::Crit)
    }
}

/// One parsed instruction line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Statement {
    /// `do <N> times`
    Do { times: u32 },
    /// `atk(<atk> vs <def>)`
    Atk {
        atk_stat: AttackStat,
        def_stat: DefenseStat,
    },
    /// `hit`, `miss`, `crit`, `self`
    Open(Block),
    /// `done`, `endatk`, `endhit`, `endmiss`, `endcrit`, `endself`
    End(Block),
    /// `damage <channel> <formula>`
    Damage {
        channel: DamageChannel,
        formula: String,
    },
    /// `effect <name> <duration> [<potency>]`
    Effect {
        name: String,
        duration: i32,
        potency: Option<i32>,
    },
}

/// Parse one normalized (lowercase, single-spaced) line. Returns `None`
/// for anything that matches no recognized shape.
pub(crate) fn parse_statement(line: &str) -> Option<Statement> {
    match line {
        "hit" => return Some(Statement::Open(Block::Hit)),
        "miss" => return Some(Statement::Open(Block::Miss)),
        "crit" => return Some(Statement::Open(Block::Crit)),
        "self" => return Some(Statement::Open(Block::SelfScope)),
        "done" => return Some(Statement::End(Block::Do)),
        "endatk" => return Some(Statement::End(Block::Atk)),
        "endhit" => return Some(Statement::End(Block::Hit)),
        "endmiss" => return Some(Statement::End(Block::Miss)),
        "endcrit" => return Some(Statement::End(Block::Crit)),
        "endself" => return Some(Statement::End(Block::SelfScope)),
        _ => {}
    }

    if let Some(caps) = DO_RE.captures(line) {
        let times = caps[1].parse().ok()?;
        return Some(Statement::Do { times });
    }

    if let Some(caps) = ATK_RE.captures(line) {
        // The pattern only admits valid stat spellings.
        let atk_stat = AttackStat::from_script_name(&caps[1]).ok()?;
        let def_stat = DefenseStat::from_script_name(&caps[2]).ok()?;
        return Some(Statement::Atk { atk_stat, def_stat });
    }

    if let Some(caps) = DMG_RE.captures(line) {
        let channel = DamageChannel::from_script_name(&caps[1])?;
        return Some(Statement::Damage {
            channel,
            formula: caps[2].to_string(),
        });
    }

    if let Some(caps) = EFF_RE.captures(line) {
        let duration = caps[2].parse().ok()?;
        let potency = caps.get(3).and_then(|m| m.as_str().parse().ok());
        // A three-part effect line where the potency overflows i32 is
        // not a recognized statement.
        if caps.get(3).is_some() && potency.is_none() {
            return None;
        }
        return Some(Statement::Effect {
            name: caps[1].to_string(),
            duration,
            potency,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(parse_statement("crit"), Some(Statement::Open(Block::Crit)));
        assert_eq!(parse_statement("endself"), Some(Statement::End(Block::SelfScope)));
        assert_eq!(
            parse_statement("do 3 times"),
            Some(Statement::Do { times: 3 })
        );
    }

    #[test]
    fn test_atk_shapes() {
        assert_eq!(
            parse_statement("atk(pwr vs dfp)"),
            Some(Statement::Atk {
                atk_stat: AttackStat::Power,
                def_stat: DefenseStat::Defense,
            })
        );
        assert_eq!(parse_statement("atk(str vs dfp)"), None);
        assert_eq!(parse_statement("atk(atp vs dfp) extra"), None);
    }

    #[test]
    fn test_damage_shapes() {
        assert_eq!(
            parse_statement("damage body 1d4+imp"),
            Some(Statement::Damage {
                channel: DamageChannel::Body,
                formula: "1d4+imp".to_string(),
            })
        );
        assert_eq!(
            parse_statement("damage soul weapon"),
            Some(Statement::Damage {
                channel: DamageChannel::Soul,
                formula: "weapon".to_string(),
            })
        );
        assert_eq!(parse_statement("damage spleen 1d4"), None);
        assert_eq!(parse_statement("damage body"), None);
    }

    #[test]
    fn test_effect_shapes() {
        assert_eq!(
            parse_statement("effect shield 10 100"),
            Some(Statement::Effect {
                name: "shield".to_string(),
                duration: 10,
                potency: Some(100),
            })
        );
        assert_eq!(
            parse_statement("effect bleed 1"),
            Some(Statement::Effect {
                name: "bleed".to_string(),
                duration: 1,
                potency: None,
            })
        );
        assert_eq!(parse_statement("effect bleed"), None);
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(parse_statement("unknown"), None);
        assert_eq!(parse_statement(""), None);
        assert_eq!(parse_statement("do"), None);
    }
}
