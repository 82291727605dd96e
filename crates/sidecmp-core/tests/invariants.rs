use proptest::prelude::*;
use serde_json::{json, Value};

use sidecmp_core::{
    align, compare, match_lines, CharDiff, CompareOptions, DiffType, Highlighter, LineKind,
    OpTag,
};

fn lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[abc]{0,3}", 0..12)
}

fn unmark(markup: &str) -> String {
    markup
        .replace("<span class=\"highlight\">", "")
        .replace("</span>", "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z<&]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn opcodes_reconstruct_both_sides(old in lines(), new in lines()) {
        let ops = match_lines(&old, &new);
        let mut rebuilt_old = Vec::new();
        let mut rebuilt_new = Vec::new();
        for op in &ops {
            rebuilt_old.extend_from_slice(&old[op.orig.clone()]);
            rebuilt_new.extend_from_slice(&new[op.altered.clone()]);
            if op.tag == OpTag::Equal {
                prop_assert_eq!(&old[op.orig.clone()], &new[op.altered.clone()]);
            }
        }
        prop_assert_eq!(rebuilt_old, old);
        prop_assert_eq!(rebuilt_new, new);
        for pair in ops.windows(2) {
            prop_assert!(pair[0].tag == OpTag::Equal || pair[1].tag == OpTag::Equal);
        }
    }

    #[test]
    fn columns_align_and_number_lines(old in lines(), new in lines()) {
        let ops = match_lines(&old, &new);
        let result = align(&old, &new, &ops, &Highlighter::default()).finish(DiffType::Text);
        prop_assert_eq!(result.original_lines.len(), result.altered_lines.len());

        if old.is_empty() && new.is_empty() {
            prop_assert_eq!(result.original_lines[0].kind, LineKind::None);
            return Ok(());
        }

        let original: Vec<_> = result.original_lines.iter().filter(|l| l.kind != LineKind::Empty).collect();
        let altered: Vec<_> = result.altered_lines.iter().filter(|l| l.kind != LineKind::Empty).collect();
        prop_assert_eq!(original.len(), old.len());
        prop_assert_eq!(altered.len(), new.len());
        for (i, line) in original.iter().enumerate() {
            prop_assert_eq!(line.line_num, Some(i + 1));
            prop_assert_eq!(unmark(&line.content), old[i].clone());
        }
        for (j, line) in altered.iter().enumerate() {
            prop_assert_eq!(line.line_num, Some(j + 1));
            prop_assert_eq!(unmark(&line.content), new[j].clone());
        }

        let removed = result.original_lines.iter().filter(|l| l.kind == LineKind::Removed).count();
        let added = result.altered_lines.iter().filter(|l| l.kind == LineKind::Added).count();
        prop_assert_eq!(removed, result.summary.removals + result.summary.changes);
        prop_assert_eq!(added, result.summary.additions + result.summary.changes);
    }

    #[test]
    fn identical_text_is_all_context(old in lines()) {
        let text = old.join("\n");
        let result = compare(&text, &text, &CompareOptions::default()).unwrap();
        prop_assert!(result.summary.is_empty());
        if text.lines().next().is_some() {
            prop_assert!(result.original_lines.iter().all(|l| l.kind == LineKind::Context));
        }
    }

    #[test]
    fn char_diff_reproduces_inputs(old in "[ab<>& ]{0,12}", new in "[ab<>& ]{0,12}") {
        let diff = CharDiff::new(&old, &new);
        prop_assert_eq!(unmark(&diff.original_markup()), old.clone());
        prop_assert_eq!(unmark(&diff.altered_markup()), new.clone());
        let same = old == new;
        prop_assert_eq!(diff.has_changes(), !same);
    }

    #[test]
    fn json_compare_is_idempotent(value in arb_json()) {
        let text = value.to_string();
        let result = compare(&text, &text, &CompareOptions::default()).unwrap();
        prop_assert!(result.summary.is_empty());
        prop_assert_eq!(result.original_lines.len(), result.altered_lines.len());
    }

    #[test]
    fn json_compare_stays_aligned(a in arb_json(), b in arb_json()) {
        let result = compare(&a.to_string(), &b.to_string(), &CompareOptions::default()).unwrap();
        prop_assert_eq!(result.original_lines.len(), result.altered_lines.len());
        for (o, n) in result.rows() {
            prop_assert!(o.kind != LineKind::Empty || n.kind != LineKind::Empty);
        }
    }
}

#[test]
fn ten_thousand_lines_compare_quickly() {
    let old: String = (0..10_000).map(|i| format!("row {i}\n")).collect();
    let new = old.replace("row 5000\n", "row five thousand\n");
    let start = std::time::Instant::now();
    let result = compare(&old, &new, &CompareOptions::default()).unwrap();
    assert!(start.elapsed() < std::time::Duration::from_secs(5));
    assert_eq!(result.summary.changes, 1);
    assert_eq!(result.original_lines.len(), 10_000);
}
