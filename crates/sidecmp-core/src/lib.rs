//! Comparison engine for sidecmp.
//!
//! Compares two inputs (plain text, JSON, or Java-style property files) and
//! produces two positionally aligned columns with per-line classification,
//! intra-line highlighting, and a summary of differences.
//!
//! # Key Types
//!
//! - [`Comparator`] / [`compare`] -- Format detection and dispatch
//! - [`CompareResult`] / [`DiffLine`] / [`Summary`] -- The two-column result
//! - [`LineMatcher`] / [`LineOpcode`] -- Line-level edit scripts
//! - [`CharDiff`] -- Character-level highlighting
//! - [`StructuralDiff`] / [`StructuralChange`] -- Tree diff of JSON-like values
//! - [`PropertyMap`] -- Parsed property files

pub mod align;
pub mod char_diff;
pub mod compare;
pub mod config;
pub mod error;
pub mod line_matcher;
pub mod properties;
pub mod render;
pub mod result;
pub mod structural;

pub use align::{align, Columns};
pub use char_diff::{highlight_pair, CharDiff, Highlighter};
pub use compare::{compare, detect_format, CompareOptions, Comparator, Detected};
pub use config::{EngineConfig, Limits, MatchAlgorithm, Verbosity};
pub use error::{CompareError, LimitKind, Side};
pub use line_matcher::{match_lines, LineMatcher, LineOpcode, OpTag};
pub use properties::{parse_properties, PropertyMap};
pub use render::{render_report, LineStyle};
pub use result::{CompareResult, DiffLine, DiffType, LineKind, Summary};
pub use structural::{diff_values, StructuralChange, StructuralDiff, StructuralDiffer, ValuePath};
