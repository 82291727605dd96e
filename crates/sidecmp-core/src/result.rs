//! The comparison result handed to the presentation layer.
//!
//! Field names follow the wire format the web front end expects:
//! `diff_lines_original`, `diff_lines_altered`, `diff_type`, `summary`, and
//! per line `content`, `type`, `line_num`.

use serde::{Deserialize, Serialize};

/// Notice shown when two inputs have nothing to compare or nothing differs.
pub const NO_DIFFERENCES: &str = "no differences found";

/// Classification of a single rendered line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Added,
    Removed,
    /// Placeholder keeping the two columns aligned.
    Empty,
    /// The "no differences found" notice.
    None,
}

/// One line of one column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// Escaped text, possibly containing highlight markup.
    pub content: String,
    #[serde(rename = "type")]
    pub kind: LineKind,
    /// 1-based position in the side's own input; `None` for placeholders.
    pub line_num: Option<usize>,
}

impl DiffLine {
    pub fn context(content: impl Into<String>, line_num: usize) -> Self {
        Self::numbered(LineKind::Context, content, line_num)
    }

    pub fn added(content: impl Into<String>, line_num: usize) -> Self {
        Self::numbered(LineKind::Added, content, line_num)
    }

    pub fn removed(content: impl Into<String>, line_num: usize) -> Self {
        Self::numbered(LineKind::Removed, content, line_num)
    }

    pub fn empty() -> Self {
        Self {
            content: String::new(),
            kind: LineKind::Empty,
            line_num: None,
        }
    }

    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: LineKind::None,
            line_num: None,
        }
    }

    fn numbered(kind: LineKind, content: impl Into<String>, line_num: usize) -> Self {
        Self {
            content: content.into(),
            kind,
            line_num: Some(line_num),
        }
    }
}

/// Which comparison path produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffType {
    Text,
    #[serde(rename = "JSON")]
    Json,
    Properties,
}

impl std::fmt::Display for DiffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffType::Text => f.write_str("Text"),
            DiffType::Json => f.write_str("JSON"),
            DiffType::Properties => f.write_str("Properties"),
        }
    }
}

/// Counts of differences. A changed pair counts once, under `changes`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub removals: usize,
    pub additions: usize,
    pub changes: usize,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.removals == 0 && self.additions == 0 && self.changes == 0
    }
}

/// Two aligned columns plus a summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareResult {
    pub diff_type: DiffType,
    #[serde(rename = "diff_lines_original")]
    pub original_lines: Vec<DiffLine>,
    #[serde(rename = "diff_lines_altered")]
    pub altered_lines: Vec<DiffLine>,
    pub summary: Summary,
}

impl CompareResult {
    /// Assemble a result.
    ///
    /// # Panics
    ///
    /// Panics if the two columns differ in length. Consumers pair rows by
    /// position, so a mismatch is a bug in the engine.
    pub fn new(
        diff_type: DiffType,
        original_lines: Vec<DiffLine>,
        altered_lines: Vec<DiffLine>,
        summary: Summary,
    ) -> Self {
        assert_eq!(
            original_lines.len(),
            altered_lines.len(),
            "diff columns out of alignment"
        );
        Self {
            diff_type,
            original_lines,
            altered_lines,
            summary,
        }
    }

    /// The single-row "no differences found" result.
    pub fn no_differences(diff_type: DiffType) -> Self {
        Self::new(
            diff_type,
            vec![DiffLine::notice(NO_DIFFERENCES)],
            vec![DiffLine::notice(NO_DIFFERENCES)],
            Summary::default(),
        )
    }

    /// Returns `true` if nothing differs.
    pub fn is_identical(&self) -> bool {
        self.summary.is_empty()
    }

    /// Iterate over aligned rows.
    pub fn rows(&self) -> impl Iterator<Item = (&DiffLine, &DiffLine)> {
        self.original_lines.iter().zip(&self.altered_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape() {
        let result = CompareResult::new(
            DiffType::Json,
            vec![DiffLine::removed("a", 1)],
            vec![DiffLine::empty()],
            Summary {
                removals: 1,
                additions: 0,
                changes: 0,
            },
        );
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "diff_type": "JSON",
                "diff_lines_original": [{"content": "a", "type": "removed", "line_num": 1}],
                "diff_lines_altered": [{"content": "", "type": "empty", "line_num": null}],
                "summary": {"removals": 1, "additions": 0, "changes": 0}
            })
        );
    }

    #[test]
    fn wire_shape_round_trips() {
        let result = CompareResult::no_differences(DiffType::Text);
        let text = serde_json::to_string(&result).unwrap();
        let back: CompareResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, result);
        assert!(text.contains("\"type\":\"none\""));
    }

    #[test]
    #[should_panic(expected = "diff columns out of alignment")]
    fn misaligned_columns_panic() {
        CompareResult::new(
            DiffType::Text,
            vec![DiffLine::context("a", 1)],
            Vec::new(),
            Summary::default(),
        );
    }
}
