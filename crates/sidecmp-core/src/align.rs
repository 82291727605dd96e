//! Two-column expansion of line opcodes.
//!
//! Every row pairs one line of the original with one line of the altered
//! input, or with an empty placeholder. Replaced blocks are paired position
//! by position; leftovers of the longer block become pure deletions or
//! insertions.

use crate::char_diff::{escape_html, Highlighter};
use crate::line_matcher::{LineOpcode, OpTag};
use crate::result::{CompareResult, DiffLine, DiffType, Summary};

/// Accumulates aligned rows and the summary that goes with them.
#[derive(Debug, Default)]
pub struct Columns {
    original: Vec<DiffLine>,
    altered: Vec<DiffLine>,
    summary: Summary,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// An unchanged row. Content must already be escaped.
    pub fn context(&mut self, old: String, old_num: usize, new: String, new_num: usize) {
        self.original.push(DiffLine::context(old, old_num));
        self.altered.push(DiffLine::context(new, new_num));
    }

    /// A line only the original has.
    pub fn removed(&mut self, content: String, line_num: usize) {
        self.original.push(DiffLine::removed(content, line_num));
        self.altered.push(DiffLine::empty());
        self.summary.removals += 1;
    }

    /// A line only the altered input has.
    pub fn added(&mut self, content: String, line_num: usize) {
        self.original.push(DiffLine::empty());
        self.altered.push(DiffLine::added(content, line_num));
        self.summary.additions += 1;
    }

    /// A modified pair. Counts as one change.
    pub fn changed(&mut self, old: String, old_num: usize, new: String, new_num: usize) {
        self.original.push(DiffLine::removed(old, old_num));
        self.altered.push(DiffLine::added(new, new_num));
        self.summary.changes += 1;
    }

    /// Build the result. No rows at all yields the "no differences" notice.
    pub fn finish(self, diff_type: DiffType) -> CompareResult {
        if self.is_empty() {
            return CompareResult::no_differences(diff_type);
        }
        CompareResult::new(diff_type, self.original, self.altered, self.summary)
    }
}

/// Expand opcodes over `old`/`new` into aligned columns.
///
/// `opcodes` must cover both sequences in order, as produced by
/// [`LineMatcher`](crate::line_matcher::LineMatcher).
pub fn align<S: AsRef<str>>(
    old: &[S],
    new: &[S],
    opcodes: &[LineOpcode],
    highlighter: &Highlighter,
) -> Columns {
    let mut columns = Columns::new();

    for op in opcodes {
        match op.tag {
            OpTag::Equal => {
                for (i, j) in op.orig.clone().zip(op.altered.clone()) {
                    columns.context(
                        escape_html(old[i].as_ref()),
                        i + 1,
                        escape_html(new[j].as_ref()),
                        j + 1,
                    );
                }
            }
            OpTag::Delete => {
                for i in op.orig.clone() {
                    columns.removed(escape_html(old[i].as_ref()), i + 1);
                }
            }
            OpTag::Insert => {
                for j in op.altered.clone() {
                    columns.added(escape_html(new[j].as_ref()), j + 1);
                }
            }
            OpTag::Replace => {
                let width = op.orig.len().max(op.altered.len());
                for k in 0..width {
                    let i = op.orig.start + k;
                    let j = op.altered.start + k;
                    match (i < op.orig.end, j < op.altered.end) {
                        (true, true) => {
                            let (a, b) = highlighter.pair(old[i].as_ref(), new[j].as_ref());
                            columns.changed(a, i + 1, b, j + 1);
                        }
                        (true, false) => columns.removed(escape_html(old[i].as_ref()), i + 1),
                        (false, true) => columns.added(escape_html(new[j].as_ref()), j + 1),
                        (false, false) => unreachable!("k is below the larger block size"),
                    }
                }
            }
        }
    }

    columns
}
