//! Renders a structural diff as two aligned columns.
//!
//! Property entries render as `key=value` and keep the line number the key
//! had in its file. JSON entries render as `path: <compact json>` and are
//! numbered by their position in the rendered column.

use serde_json::Value;

use crate::align::Columns;
use crate::char_diff::{escape_html, Highlighter};
use crate::error::Side;
use crate::properties::PropertyMap;
use crate::structural::{StructuralChange, StructuralDiff, ValuePath};

/// How entries of a structural diff are turned into text.
#[derive(Clone, Copy, Debug)]
pub enum LineStyle<'a> {
    Json,
    Properties {
        original: &'a PropertyMap,
        altered: &'a PropertyMap,
    },
}

impl LineStyle<'_> {
    fn text(&self, path: &ValuePath, value: &Value) -> String {
        match self {
            LineStyle::Json => format!("{path}: {value}"),
            LineStyle::Properties { .. } => {
                let key = path.root_key().unwrap_or_default();
                match value {
                    Value::String(s) => format!("{key}={s}"),
                    other => format!("{key}={other}"),
                }
            }
        }
    }
}

/// Per-side line numbering for rendered entries.
struct LineNumbers<'a> {
    style: LineStyle<'a>,
    original: usize,
    altered: usize,
}

impl<'a> LineNumbers<'a> {
    fn new(style: LineStyle<'a>) -> Self {
        Self {
            style,
            original: 0,
            altered: 0,
        }
    }

    fn next(&mut self, side: Side, path: &ValuePath) -> usize {
        let counter = match side {
            Side::Original => &mut self.original,
            Side::Altered => &mut self.altered,
        };
        *counter += 1;
        let keyed = match (self.style, path.root_key()) {
            (LineStyle::Properties { original, .. }, Some(key)) if side == Side::Original => {
                original.line_of(key)
            }
            (LineStyle::Properties { altered, .. }, Some(key)) => altered.line_of(key),
            _ => None,
        };
        keyed.unwrap_or(*counter)
    }
}

/// Render every entry of `diff` in order.
pub fn render_report(diff: &StructuralDiff, style: LineStyle<'_>, highlighter: &Highlighter) -> Columns {
    let mut columns = Columns::new();
    let mut numbers = LineNumbers::new(style);

    for change in &diff.changes {
        let path = change.path();
        match change {
            StructuralChange::Unchanged { value, .. } => {
                let text = escape_html(&style.text(path, value));
                let old_num = numbers.next(Side::Original, path);
                let new_num = numbers.next(Side::Altered, path);
                columns.context(text.clone(), old_num, text, new_num);
            }
            StructuralChange::KeyRemoved { value, .. } => {
                let num = numbers.next(Side::Original, path);
                columns.removed(escape_html(&style.text(path, value)), num);
            }
            StructuralChange::KeyAdded { value, .. } => {
                let num = numbers.next(Side::Altered, path);
                columns.added(escape_html(&style.text(path, value)), num);
            }
            StructuralChange::ValueChanged { old, new, .. }
            | StructuralChange::TypeChanged { old, new, .. } => {
                let (a, b) = highlighter.pair(&style.text(path, old), &style.text(path, new));
                let old_num = numbers.next(Side::Original, path);
                let new_num = numbers.next(Side::Altered, path);
                columns.changed(a, old_num, b, new_num);
            }
        }
    }

    columns
}
