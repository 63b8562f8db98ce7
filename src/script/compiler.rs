//! The CritScript compiler: normalization plus block-structure and
//! effect-name validation.
//!
//! Compilation is pure: it rolls no dice and touches no character
//! state. The same input always yields the same normalized instruction
//! list or the same first error.

use super::parse::{parse_statement, Block, Statement};
use crate::effects::EffectName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// What went wrong with a script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    /// A closing keyword with no matching open block, e.g. `done before do`.
    #[error("{} before {}", .0.closer(), .0.keyword())]
    EarlyEnd(Block),
    /// A block opened inside another block of the same type.
    #[error("nested {} block", .0.keyword())]
    NestedBlock(Block),
    /// `hit`/`miss`/`crit` used while no `atk` block is open.
    #[error("{} outside of atk block", .0.keyword())]
    OutsideAtk(Block),
    /// An `effect` statement naming an effect not in the registry.
    #[error("unrecognized effect")]
    UnknownEffect,
    /// A line matching no recognized statement shape.
    #[error("unrecognized syntax")]
    UnknownSyntax,
    /// End of input with the block still open, e.g. `do without done`.
    #[error("{} without {}", .0.keyword(), .0.closer())]
    MissingTerminator(Block),
}

/// A compilation failure, reported at the first offending line.
///
/// Line numbers are 1-based indices into the normalized stream (after
/// comment and blank-line stripping); missing-terminator errors report
/// the line where the unterminated block was opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error in script line {line}: {text}: {kind}")]
pub struct CompileError {
    pub line: usize,
    pub text: String,
    pub kind: CompileErrorKind,
}

impl CompileError {
    fn at(index: usize, text: &str, kind: CompileErrorKind) -> Self {
        Self {
            line: index + 1,
            text: text.to_string(),
            kind,
        }
    }
}

/// A validated script: normalized instruction lines plus a jump table
/// mapping each block-opening line to its matching closer.
///
/// The instruction lines are the compiler-to-interpreter contract; the
/// jump table is precomputed so execution never scans for terminators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledScript {
    lines: Vec<String>,
    jumps: HashMap<usize, usize>,
}

impl CompiledScript {
    /// The normalized instruction lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// The index of the closer matching the opener at `open_index`.
    pub fn jump(&self, open_index: usize) -> Option<usize> {
        self.jumps.get(&open_index).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for CompiledScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Compile CritScript source given as one newline-separated string.
pub fn compile(source: &str) -> Result<CompiledScript, CompileError> {
    compile_lines(source.lines())
}

/// Compile CritScript source given as an ordered sequence of lines.
pub fn compile_lines<I, S>(source: I) -> Result<CompiledScript, CompileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines = normalize(source);
    let jumps = validate(&lines)?;
    Ok(CompiledScript { lines, jumps })
}

/// Strip comments and blanks, lowercase, collapse whitespace.
fn normalize<I, S>(source: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    source
        .into_iter()
        .filter_map(|raw| {
            let trimmed = raw.as_ref().trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(
                trimmed
                    .to_lowercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        })
        .collect()
}

/// Check block structure and effect names, building the jump table.
fn validate(lines: &[String]) -> Result<HashMap<usize, usize>, CompileError> {
    // At most one block of each type may be open at a time, so a single
    // slot per type tracks the opening line.
    let mut open: HashMap<Block, usize> = HashMap::new();
    let mut jumps = HashMap::new();

    for (index, line) in lines.iter().enumerate() {
        let stmt = parse_statement(line)
            .ok_or_else(|| CompileError::at(index, line, CompileErrorKind::UnknownSyntax))?;

        match stmt {
            Statement::Do { .. } => open_block(&mut open, Block::Do, index, line)?,
            Statement::Atk { .. } => open_block(&mut open, Block::Atk, index, line)?,
            Statement::Open(block) => {
                if block.requires_atk() && !open.contains_key(&Block::Atk) {
                    return Err(CompileError::at(
                        index,
                        line,
                        CompileErrorKind::OutsideAtk(block),
                    ));
                }
                open_block(&mut open, block, index, line)?;
            }
            Statement::End(block) => match open.remove(&block) {
                Some(open_index) => {
                    jumps.insert(open_index, index);
                }
                None => {
                    return Err(CompileError::at(
                        index,
                        line,
                        CompileErrorKind::EarlyEnd(block),
                    ));
                }
            },
            Statement::Effect { ref name, .. } => {
                if EffectName::from_script_name(name).is_none() {
                    return Err(CompileError::at(
                        index,
                        line,
                        CompileErrorKind::UnknownEffect,
                    ));
                }
            }
            Statement::Damage { .. } => {}
        }
    }

    // Report the first still-open block in source order.
    if let Some((&block, &open_index)) = open.iter().min_by_key(|(_, &idx)| idx) {
        return Err(CompileError::at(
            open_index,
            &lines[open_index],
            CompileErrorKind::MissingTerminator(block),
        ));
    }

    Ok(jumps)
}

fn open_block(
    open: &mut HashMap<Block, usize>,
    block: Block,
    index: usize,
    line: &str,
) -> Result<(), CompileError> {
    if open.contains_key(&block) {
        return Err(CompileError::at(
            index,
            line,
            CompileErrorKind::NestedBlock(block),
        ));
    }
    open.insert(block, index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMBERSPARK: &str = "
#This spell hits one target.
#Caster makes a PWR roll against target's DFP.
#On crit, this deals an additional 5 turns of Soulburn.

atk(pwr vs dfp)
    Damage Body 1d3+IMP
    Damage Soul 1d2+IMP
    Effect Soulburn 1
    crit
        Effect Soulburn 5
    endcrit
endatk";

    const SAVAGERY: &str = "
#This attack hits 1 target twice and inflicts Bleed.
do 2 times
    atk(atp vs dfp)
        Damage Body WEAPON
        Effect Bleed 1
    endatk
done";

    fn emberspark_expected() -> Vec<String> {
        [
            "atk(pwr vs dfp)",
            "damage body 1d3+imp",
            "damage soul 1d2+imp",
            "effect soulburn 1",
            "crit",
            "effect soulburn 5",
            "endcrit",
            "endatk",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_oneliners() {
        assert_eq!(compile("Effect Bleed 1").unwrap().lines(), ["effect bleed 1"]);
        assert_eq!(
            compile("Effect Shield 10 100").unwrap().lines(),
            ["effect shield 10 100"]
        );
        assert_eq!(
            compile("Damage Body 1d4+IMP").unwrap().lines(),
            ["damage body 1d4+imp"]
        );
        assert_eq!(
            compile("Damage Soul WEAPON").unwrap().lines(),
            ["damage soul weapon"]
        );
    }

    #[test]
    fn test_string_and_line_sources_agree() {
        let from_str = compile(EMBERSPARK).unwrap();
        let from_lines = compile_lines(EMBERSPARK.lines().collect::<Vec<_>>()).unwrap();
        assert_eq!(from_str, from_lines);
        assert_eq!(from_str.lines(), emberspark_expected().as_slice());
    }

    #[test]
    fn test_savagery_normalization() {
        let compiled = compile(SAVAGERY).unwrap();
        assert_eq!(
            compiled.lines(),
            [
                "do 2 times",
                "atk(atp vs dfp)",
                "damage body weapon",
                "effect bleed 1",
                "endatk",
                "done",
            ]
        );
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let once = compile(EMBERSPARK).unwrap();
        let twice = compile_lines(once.lines()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_jump_table() {
        let compiled = compile(SAVAGERY).unwrap();
        assert_eq!(compiled.jump(0), Some(5)); // do -> done
        assert_eq!(compiled.jump(1), Some(4)); // atk -> endatk
        assert_eq!(compiled.jump(2), None);

        let ember = compile(EMBERSPARK).unwrap();
        assert_eq!(ember.jump(0), Some(7)); // atk -> endatk
        assert_eq!(ember.jump(4), Some(6)); // crit -> endcrit
    }

    #[test]
    fn test_early_done() {
        let err = compile("done\ndo 2 times\nEffect Bleed 1\ndone").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::EarlyEnd(Block::Do));
        assert_eq!(err.line, 1);
        assert_eq!(err.text, "done");
    }

    #[test]
    fn test_missing_done_reports_opening_line() {
        let err = compile("Effect Bleed 1\ndo 2 times\nDamage Body 1d4").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::MissingTerminator(Block::Do));
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "do 2 times");
    }

    #[test]
    fn test_line_numbers_skip_comments_and_blanks() {
        let err = compile("# header\n\n  # more\nEffect Bleed 1\nnonsense").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownSyntax);
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "nonsense");
    }

    #[test]
    fn test_nested_do() {
        let src = "
do 2 times
    atk(atp vs dfp)
        do 4 times
            Damage Body 1d2
        done
    endatk
done";
        let err = compile(src).unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::NestedBlock(Block::Do));
    }

    #[test]
    fn test_nested_atk() {
        let err = compile("atk(atp vs dfp)\natk(pwr vs wil)\nendatk\nendatk").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::NestedBlock(Block::Atk));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_branch_blocks_outside_atk() {
        for (src, block) in [
            ("crit\nEffect Burn 1\nendcrit", Block::Crit),
            ("hit\nEffect Burn 1\nendhit", Block::Hit),
            ("miss\nEffect Burn 1\nendmiss", Block::Miss),
        ] {
            let err = compile(src).unwrap_err();
            assert_eq!(err.kind, CompileErrorKind::OutsideAtk(block));
            assert_eq!(err.line, 1);
        }
    }

    #[test]
    fn test_branch_blocks_legal_inside_atk() {
        let src = "
atk(atp vs dfp)
    hit
        Damage Body WEAPON
    endhit
    miss
        self
            Effect Weakness 1
        endself
    endmiss
    crit
        Effect Bleed 3
    endcrit
endatk";
        assert!(compile(src).is_ok());
    }

    #[test]
    fn test_unterminated_blocks() {
        for (src, block) in [
            ("atk(atp vs dfp)\nDamage Body 1d4", Block::Atk),
            ("do 2 times\nEffect Bleed 1", Block::Do),
            ("self\nEffect Might 1", Block::SelfScope),
            // Two blocks open at end of input: the earliest is reported.
            ("atk(atp vs dfp)\nhit\nDamage Body 1d4", Block::Atk),
        ] {
            let err = compile(src).unwrap_err();
            assert_eq!(err.kind, CompileErrorKind::MissingTerminator(block), "{src}");
        }
    }

    #[test]
    fn test_unknown_effect() {
        let err = compile("Effect Plague 3").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownEffect);
        assert_eq!(err.text, "effect plague 3");
    }

    #[test]
    fn test_unknown_syntax() {
        for src in ["Unknown", "do", "damage body", "atk(atp vs dfp) trailing\nendatk"] {
            let err = compile(src).unwrap_err();
            assert_eq!(err.kind, CompileErrorKind::UnknownSyntax, "{src}");
        }
    }

    #[test]
    fn test_error_display_carries_context() {
        let err = compile("done").unwrap_err();
        assert_eq!(
            err.to_string(),
            "error in script line 1: done: done before do"
        );
    }

    #[test]
    fn test_empty_script_compiles() {
        let compiled = compile("# only comments\n\n").unwrap();
        assert!(compiled.is_empty());
    }
}
