//! Structural diff: recursive comparison of two JSON-like values.
//!
//! Maps are compared key by key, sequences index by index, scalars by kind
//! and value. Changes are recorded in traversal order; additions inside a
//! map appear where they sit in the altered map.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Number, Value};

/// One step in a [`ValuePath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a document, e.g. `servers[0].host`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValuePath(Vec<PathSegment>);

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The top-level key, if the path starts with one.
    pub fn root_key(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathSegment::Key(k)) => Some(k),
            _ => None,
        }
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i == 0 => f.write_str(k)?,
                PathSegment::Key(k) => write!(f, ".{k}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for ValuePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The JSON kind of a value; differing kinds are reported as type changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

/// A single entry of a structural diff.
#[derive(Clone, Debug, PartialEq)]
pub enum StructuralChange {
    /// Present only in the altered value.
    KeyAdded { path: ValuePath, value: Value },
    /// Present only in the original value.
    KeyRemoved { path: ValuePath, value: Value },
    /// Same kind, different value.
    ValueChanged {
        path: ValuePath,
        old: Value,
        new: Value,
    },
    /// The value's kind differs between the two sides.
    TypeChanged {
        path: ValuePath,
        old: Value,
        new: Value,
    },
    /// An equal leaf below the root, recorded only when asked for.
    Unchanged { path: ValuePath, value: Value },
}

impl StructuralChange {
    pub fn path(&self) -> &ValuePath {
        match self {
            StructuralChange::KeyAdded { path, .. }
            | StructuralChange::KeyRemoved { path, .. }
            | StructuralChange::ValueChanged { path, .. }
            | StructuralChange::TypeChanged { path, .. }
            | StructuralChange::Unchanged { path, .. } => path,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, StructuralChange::Unchanged { .. })
    }
}

/// The result of comparing two values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuralDiff {
    /// All entries in traversal order.
    pub changes: Vec<StructuralChange>,
}

impl StructuralDiff {
    /// Returns `true` if nothing differs. Unchanged entries don't count.
    pub fn is_empty(&self) -> bool {
        !self.changes.iter().any(StructuralChange::is_change)
    }

    pub fn len(&self) -> usize {
        self.changes.iter().filter(|c| c.is_change()).count()
    }

    pub fn keys_added(&self) -> impl Iterator<Item = &StructuralChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, StructuralChange::KeyAdded { .. }))
    }

    pub fn keys_removed(&self) -> impl Iterator<Item = &StructuralChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, StructuralChange::KeyRemoved { .. }))
    }

    pub fn values_changed(&self) -> impl Iterator<Item = &StructuralChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, StructuralChange::ValueChanged { .. }))
    }

    pub fn types_changed(&self) -> impl Iterator<Item = &StructuralChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, StructuralChange::TypeChanged { .. }))
    }

    pub fn additions(&self) -> usize {
        self.keys_added().count()
    }

    pub fn removals(&self) -> usize {
        self.keys_removed().count()
    }

    /// Value changes plus type changes.
    pub fn modifications(&self) -> usize {
        self.values_changed().count() + self.types_changed().count()
    }
}

/// Serializes as four buckets: `key_added`, `key_removed`, `value_changed`,
/// `type_changed`.
impl Serialize for StructuralDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct PathOnly<'a> {
            path: &'a ValuePath,
        }
        #[derive(serde::Serialize)]
        struct Changed<'a> {
            path: &'a ValuePath,
            old_value: &'a Value,
            new_value: &'a Value,
        }

        let mut added = Vec::new();
        let mut removed = Vec::new();
        let mut changed = Vec::new();
        let mut retyped = Vec::new();
        for change in &self.changes {
            match change {
                StructuralChange::KeyAdded { path, .. } => added.push(PathOnly { path }),
                StructuralChange::KeyRemoved { path, .. } => removed.push(PathOnly { path }),
                StructuralChange::ValueChanged { path, old, new } => changed.push(Changed {
                    path,
                    old_value: old,
                    new_value: new,
                }),
                StructuralChange::TypeChanged { path, old, new } => retyped.push(Changed {
                    path,
                    old_value: old,
                    new_value: new,
                }),
                StructuralChange::Unchanged { .. } => {}
            }
        }

        let mut s = serializer.serialize_struct("StructuralDiff", 4)?;
        s.serialize_field("key_added", &added)?;
        s.serialize_field("key_removed", &removed)?;
        s.serialize_field("value_changed", &changed)?;
        s.serialize_field("type_changed", &retyped)?;
        s.end()
    }
}

/// Computes structural diffs.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralDiffer {
    record_unchanged: bool,
}

impl StructuralDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record equal leaves as [`StructuralChange::Unchanged`].
    pub fn record_unchanged(mut self, yes: bool) -> Self {
        self.record_unchanged = yes;
        self
    }

    pub fn diff(&self, old: &Value, new: &Value) -> StructuralDiff {
        let mut changes = Vec::new();
        self.diff_at(&ValuePath::root(), old, new, &mut changes);
        StructuralDiff { changes }
    }

    fn diff_at(&self, path: &ValuePath, old: &Value, new: &Value, out: &mut Vec<StructuralChange>) {
        match (old, new) {
            (Value::Object(a), Value::Object(b)) if !(a.is_empty() && b.is_empty()) => {
                self.diff_maps(path, a, b, out)
            }
            (Value::Array(a), Value::Array(b)) if !(a.is_empty() && b.is_empty()) => {
                self.diff_arrays(path, a, b, out)
            }
            _ if ValueKind::of(old) != ValueKind::of(new) => {
                out.push(StructuralChange::TypeChanged {
                    path: path.clone(),
                    old: old.clone(),
                    new: new.clone(),
                })
            }
            _ if scalar_eq(old, new) => {
                if self.record_unchanged && !path.is_root() {
                    out.push(StructuralChange::Unchanged {
                        path: path.clone(),
                        value: old.clone(),
                    });
                }
            }
            _ => out.push(StructuralChange::ValueChanged {
                path: path.clone(),
                old: old.clone(),
                new: new.clone(),
            }),
        }
    }

    fn diff_maps(
        &self,
        path: &ValuePath,
        old: &Map<String, Value>,
        new: &Map<String, Value>,
        out: &mut Vec<StructuralChange>,
    ) {
        let new_entries: Vec<(&String, &Value)> = new.iter().collect();
        let new_pos: HashMap<&str, usize> = new_entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.as_str(), i))
            .collect();
        let mut next_new = 0;

        for (key, old_val) in old {
            match new_pos.get(key.as_str()) {
                Some(&pos) => {
                    while next_new < pos {
                        self.push_added_if_new(path, old, new_entries[next_new], out);
                        next_new += 1;
                    }
                    next_new = next_new.max(pos + 1);
                    self.diff_at(&path.key(key), old_val, new_entries[pos].1, out);
                }
                None => out.push(StructuralChange::KeyRemoved {
                    path: path.key(key),
                    value: old_val.clone(),
                }),
            }
        }

        for &entry in &new_entries[next_new.min(new_entries.len())..] {
            self.push_added_if_new(path, old, entry, out);
        }
    }

    fn push_added_if_new(
        &self,
        path: &ValuePath,
        old: &Map<String, Value>,
        (key, value): (&String, &Value),
        out: &mut Vec<StructuralChange>,
    ) {
        if !old.contains_key(key) {
            out.push(StructuralChange::KeyAdded {
                path: path.key(key),
                value: value.clone(),
            });
        }
    }

    fn diff_arrays(&self, path: &ValuePath, old: &[Value], new: &[Value], out: &mut Vec<StructuralChange>) {
        let common = old.len().min(new.len());
        for (i, (o, n)) in old.iter().zip(new).enumerate() {
            self.diff_at(&path.index(i), o, n, out);
        }
        for (i, value) in old.iter().enumerate().skip(common) {
            out.push(StructuralChange::KeyRemoved {
                path: path.index(i),
                value: value.clone(),
            });
        }
        for (i, value) in new.iter().enumerate().skip(common) {
            out.push(StructuralChange::KeyAdded {
                path: path.index(i),
                value: value.clone(),
            });
        }
    }
}

/// Compare scalars of the same kind. `1` and `1.0` are equal.
fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        _ => a == b,
    }
}

fn number_eq(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Compute the structural diff between two values, changes only.
pub fn diff_values(old: &Value, new: &Value) -> StructuralDiff {
    StructuralDiffer::new().diff(old, new)
}
