//! Line matching: a minimal edit script between two line sequences.
//!
//! Uses the `similar` crate (Myers by default) and coalesces its output so
//! that every run of deletions and insertions with no equal line in between
//! becomes a single [`OpTag::Replace`] opcode.

use std::hash::Hash;
use std::ops::Range;
use std::time::{Duration, Instant};

use serde::Serialize;
use similar::{capture_diff_slices_deadline, DiffTag};

use crate::config::{EngineConfig, MatchAlgorithm};

/// The kind of alignment operation an opcode describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// One alignment operation over half-open ranges of both sequences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineOpcode {
    pub tag: OpTag,
    pub orig: Range<usize>,
    pub altered: Range<usize>,
}

impl LineOpcode {
    fn new(orig: Range<usize>, altered: Range<usize>) -> Self {
        let tag = match (orig.is_empty(), altered.is_empty()) {
            (false, true) => OpTag::Delete,
            (true, false) => OpTag::Insert,
            _ => OpTag::Replace,
        };
        Self { tag, orig, altered }
    }
}

/// Computes line opcodes with a configured algorithm and optional deadline.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineMatcher {
    algorithm: MatchAlgorithm,
    timeout: Option<Duration>,
}

impl LineMatcher {
    pub fn new(algorithm: MatchAlgorithm, timeout: Option<Duration>) -> Self {
        Self { algorithm, timeout }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.algorithm, config.timeout())
    }

    /// Compute the opcodes turning `old` into `new`.
    ///
    /// The result covers `0..old.len()` and `0..new.len()` in order, with no
    /// gaps and no two adjacent opcodes of which neither is `Equal`.
    pub fn opcodes<T: Hash + Eq + Ord>(&self, old: &[T], new: &[T]) -> Vec<LineOpcode> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let ops = capture_diff_slices_deadline(self.algorithm.into(), old, new, deadline);

        let mut opcodes: Vec<LineOpcode> = Vec::with_capacity(ops.len());
        let mut pending: Option<(Range<usize>, Range<usize>)> = None;

        for op in ops {
            let (tag, o, n) = op.as_tag_tuple();
            if o.is_empty() && n.is_empty() {
                continue;
            }
            if tag == DiffTag::Equal {
                if let Some((po, pn)) = pending.take() {
                    opcodes.push(LineOpcode::new(po, pn));
                }
                match opcodes.last_mut() {
                    Some(last) if last.tag == OpTag::Equal => {
                        last.orig.end = o.end;
                        last.altered.end = n.end;
                    }
                    _ => opcodes.push(LineOpcode {
                        tag: OpTag::Equal,
                        orig: o,
                        altered: n,
                    }),
                }
            } else {
                pending = Some(match pending {
                    Some((po, pn)) => (po.start..o.end, pn.start..n.end),
                    None => (o, n),
                });
            }
        }
        if let Some((po, pn)) = pending {
            opcodes.push(LineOpcode::new(po, pn));
        }
        opcodes
    }
}

/// Compute opcodes with the default algorithm and no deadline.
pub fn match_lines<T: Hash + Eq + Ord>(old: &[T], new: &[T]) -> Vec<LineOpcode> {
    LineMatcher::default().opcodes(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(ops: &[LineOpcode]) -> Vec<OpTag> {
        ops.iter().map(|op| op.tag).collect()
    }

    #[test]
    fn identical_sequences_single_equal() {
        let a = ["a", "b", "c"];
        let ops = match_lines(&a, &a);
        assert_eq!(
            ops,
            vec![LineOpcode {
                tag: OpTag::Equal,
                orig: 0..3,
                altered: 0..3
            }]
        );
    }

    #[test]
    fn both_empty_no_opcodes() {
        let empty: [&str; 0] = [];
        assert!(match_lines(&empty, &empty).is_empty());
    }

    #[test]
    fn pure_insert_at_end() {
        let ops = match_lines(&["a", "b"], &["a", "b", "c"]);
        assert_eq!(tags(&ops), vec![OpTag::Equal, OpTag::Insert]);
        assert_eq!(ops[1].orig, 2..2);
        assert_eq!(ops[1].altered, 2..3);
    }

    #[test]
    fn pure_delete_in_middle() {
        let ops = match_lines(&["a", "b", "c"], &["a", "c"]);
        assert_eq!(tags(&ops), vec![OpTag::Equal, OpTag::Delete, OpTag::Equal]);
        assert_eq!(ops[1].orig, 1..2);
        assert_eq!(ops[1].altered, 1..1);
    }

    #[test]
    fn delete_then_insert_is_replace() {
        let ops = match_lines(&["foo", "bar", "baz"], &["foo", "BAR", "baz"]);
        assert_eq!(tags(&ops), vec![OpTag::Equal, OpTag::Replace, OpTag::Equal]);
        assert_eq!(ops[1].orig, 1..2);
        assert_eq!(ops[1].altered, 1..2);
    }

    #[test]
    fn uneven_replace_block() {
        let ops = match_lines(&["x", "1", "2", "y"], &["x", "A", "B", "C", "y"]);
        assert_eq!(tags(&ops), vec![OpTag::Equal, OpTag::Replace, OpTag::Equal]);
        assert_eq!(ops[1].orig, 1..3);
        assert_eq!(ops[1].altered, 1..4);
    }

    #[test]
    fn everything_replaced() {
        let ops = match_lines(&["a"], &["b", "c"]);
        assert_eq!(tags(&ops), vec![OpTag::Replace]);
    }

    #[test]
    fn no_adjacent_non_equal_opcodes() {
        let old = ["a", "b", "c", "d", "e", "f"];
        let new = ["b", "x", "d", "y", "z", "f", "g"];
        let ops = match_lines(&old, &new);
        for pair in ops.windows(2) {
            assert!(pair[0].tag == OpTag::Equal || pair[1].tag == OpTag::Equal);
            assert_eq!(pair[0].orig.end, pair[1].orig.start);
            assert_eq!(pair[0].altered.end, pair[1].altered.start);
        }
    }

    #[test]
    fn every_algorithm_covers_inputs() {
        let old = ["a", "b", "c", "a", "b", "b", "a"];
        let new = ["c", "b", "a", "b", "a", "c"];
        for alg in [MatchAlgorithm::Myers, MatchAlgorithm::Patience, MatchAlgorithm::Lcs] {
            let ops = LineMatcher::new(alg, None).opcodes(&old, &new);
            assert_eq!(ops.first().unwrap().orig.start, 0);
            assert_eq!(ops.last().unwrap().orig.end, old.len());
            assert_eq!(ops.last().unwrap().altered.end, new.len());
        }
    }

    #[test]
    fn deadline_keeps_opcodes_covering() {
        let old = ["a", "b", "c", "d"];
        let new = ["a", "x", "c", "d", "e"];
        let ops = LineMatcher::new(MatchAlgorithm::Myers, Some(Duration::from_millis(50))).opcodes(&old, &new);
        assert_eq!(ops.last().unwrap().orig.end, old.len());
        assert_eq!(ops.last().unwrap().altered.end, new.len());
        assert_eq!(tags(&ops), vec![OpTag::Equal, OpTag::Replace, OpTag::Equal, OpTag::Insert]);
    }

    #[test]
    fn large_input_is_fast() {
        let old: Vec<String> = (0..10_000).map(|i| format!("line {i}")).collect();
        let mut new = old.clone();
        for i in (0..new.len()).step_by(97) {
            new[i] = format!("changed {i}");
        }
        let start = Instant::now();
        let ops = match_lines(&old, &new);
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(ops.iter().any(|op| op.tag == OpTag::Replace));
    }
}
