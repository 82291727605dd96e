//! Format detection and dispatch.
//!
//! [`Comparator::compare`] checks the size ceilings, decides which path an
//! input pair takes, and assembles the two-column [`CompareResult`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::align::align;
use crate::char_diff::Highlighter;
use crate::config::{EngineConfig, Verbosity};
use crate::error::{CompareError, LimitKind, Result, Side};
use crate::line_matcher::LineMatcher;
use crate::properties::parse_properties;
use crate::render::{render_report, LineStyle};
use crate::result::{CompareResult, DiffType};
use crate::structural::StructuralDiffer;

/// Per-request options.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompareOptions {
    /// Parse both inputs as property files.
    pub treat_as_properties: bool,
    /// Overrides the configured verbosity for structural comparisons.
    pub verbosity: Option<Verbosity>,
}

impl CompareOptions {
    pub fn properties() -> Self {
        Self {
            treat_as_properties: true,
            ..Self::default()
        }
    }
}

/// The outcome of format detection.
#[derive(Clone, Debug, PartialEq)]
pub enum Detected {
    Properties,
    /// Both inputs parsed as JSON; the parsed values are carried along.
    Json(Value, Value),
    Text,
}

impl Detected {
    pub fn diff_type(&self) -> DiffType {
        match self {
            Detected::Properties => DiffType::Properties,
            Detected::Json(..) => DiffType::Json,
            Detected::Text => DiffType::Text,
        }
    }
}

/// Decide how a pair of inputs is compared.
///
/// An explicit property flag wins. Otherwise both inputs must parse as JSON
/// and at least one must be an object or array; a pair of bare scalars such
/// as `"hello"` or `42` is compared as text.
pub fn detect_format(original: &str, altered: &str, treat_as_properties: bool) -> Detected {
    if treat_as_properties {
        return Detected::Properties;
    }
    let (Ok(a), Ok(b)) = (
        serde_json::from_str::<Value>(original),
        serde_json::from_str::<Value>(altered),
    ) else {
        return Detected::Text;
    };
    if is_composite(&a) || is_composite(&b) {
        Detected::Json(a, b)
    } else {
        Detected::Text
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Stateless comparison engine. Cheap to clone and safe to share.
#[derive(Clone, Debug, Default)]
pub struct Comparator {
    config: EngineConfig,
}

impl Comparator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compare two inputs.
    pub fn compare(
        &self,
        original: &str,
        altered: &str,
        options: &CompareOptions,
    ) -> Result<CompareResult> {
        self.check_inputs(original, altered)?;

        let detected = detect_format(original, altered, options.treat_as_properties);
        debug!(diff_type = %detected.diff_type(), "format detected");

        let verbosity = options.verbosity.unwrap_or(self.config.verbosity);
        let result = match detected {
            Detected::Properties => self.compare_properties(original, altered, verbosity)?,
            Detected::Json(a, b) => self.compare_json(&a, &b, verbosity),
            Detected::Text => self.compare_text(original, altered),
        };

        debug!(
            diff_type = %result.diff_type,
            rows = result.original_lines.len(),
            removals = result.summary.removals,
            additions = result.summary.additions,
            changes = result.summary.changes,
            "comparison complete"
        );
        Ok(result)
    }

    /// Fail fast when either input exceeds the configured ceilings.
    pub fn check_inputs(&self, original: &str, altered: &str) -> Result<()> {
        self.check_limits(Side::Original, original)?;
        self.check_limits(Side::Altered, altered)
    }

    fn check_limits(&self, side: Side, input: &str) -> Result<()> {
        let limits = self.config.limits;
        if input.len() > limits.max_bytes {
            warn!(%side, bytes = input.len(), limit = limits.max_bytes, "input rejected");
            return Err(CompareError::InputTooLarge {
                side,
                kind: LimitKind::Bytes,
                actual: input.len(),
                limit: limits.max_bytes,
            });
        }
        let lines = input.lines().count();
        if lines > limits.max_lines {
            warn!(%side, lines, limit = limits.max_lines, "input rejected");
            return Err(CompareError::InputTooLarge {
                side,
                kind: LimitKind::Lines,
                actual: lines,
                limit: limits.max_lines,
            });
        }
        Ok(())
    }

    fn highlighter(&self) -> Highlighter {
        Highlighter::new(self.config.algorithm.into(), self.config.timeout())
    }

    fn compare_text(&self, original: &str, altered: &str) -> CompareResult {
        let old: Vec<&str> = original.lines().collect();
        let new: Vec<&str> = altered.lines().collect();
        let opcodes = LineMatcher::from_config(&self.config).opcodes(&old, &new);
        debug!(opcodes = opcodes.len(), "lines matched");
        align(&old, &new, &opcodes, &self.highlighter()).finish(DiffType::Text)
    }

    fn compare_json(&self, original: &Value, altered: &Value, verbosity: Verbosity) -> CompareResult {
        let diff = StructuralDiffer::new()
            .record_unchanged(verbosity == Verbosity::Full)
            .diff(original, altered);
        if diff.is_empty() {
            return CompareResult::no_differences(DiffType::Json);
        }
        render_report(&diff, LineStyle::Json, &self.highlighter()).finish(DiffType::Json)
    }

    fn compare_properties(
        &self,
        original: &str,
        altered: &str,
        verbosity: Verbosity,
    ) -> Result<CompareResult> {
        let old = parse_properties(original)?;
        let new = parse_properties(altered)?;
        debug!(original_keys = old.len(), altered_keys = new.len(), "properties parsed");

        let diff = StructuralDiffer::new()
            .record_unchanged(verbosity == Verbosity::Full)
            .diff(&old.to_value(), &new.to_value());
        if diff.is_empty() {
            return Ok(CompareResult::no_differences(DiffType::Properties));
        }
        let style = LineStyle::Properties {
            original: &old,
            altered: &new,
        };
        Ok(render_report(&diff, style, &self.highlighter()).finish(DiffType::Properties))
    }
}

/// Compare two inputs with the default configuration.
pub fn compare(original: &str, altered: &str, options: &CompareOptions) -> Result<CompareResult> {
    Comparator::default().compare(original, altered, options)
}
