use std::io::Read;

use anyhow::{bail, Context};
use colored::Colorize;
use sidecmp_core::char_diff::{HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};
use sidecmp_core::{
    detect_format, diff_values, parse_properties, CompareOptions, CompareResult, Comparator,
    Detected, DiffLine, EngineConfig, LineKind, StructuralDiff,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    tracing::debug!(config = ?config, "engine configured");
    let comparator = Comparator::new(config);

    match cli.command {
        Command::Compare(args) => cmd_compare(&comparator, args, &cli.format),
        Command::Detect(args) => cmd_detect(args, &cli.format),
        Command::Report(args) => cmd_report(&comparator, args),
    }
}

fn cmd_compare(comparator: &Comparator, args: CompareArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (original, altered) = read_inputs(&args.inputs)?;
    let options = CompareOptions {
        treat_as_properties: args.inputs.properties,
        verbosity: args.verbosity.map(Into::into),
    };
    let result = comparator.compare(&original, &altered, &options)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_columns(&result),
    }
    Ok(())
}

fn cmd_detect(args: DetectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (original, altered) = read_inputs(&args.inputs)?;
    let detected = detect_format(&original, &altered, args.inputs.properties);
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "diff_type": detected.diff_type() })),
        OutputFormat::Text => println!("{}", detected.diff_type().to_string().bold()),
    }
    Ok(())
}

fn cmd_report(comparator: &Comparator, args: ReportArgs) -> anyhow::Result<()> {
    let (original, altered) = read_inputs(&args.inputs)?;
    let report = structural_report(comparator, &original, &altered, args.inputs.properties)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn structural_report(
    comparator: &Comparator,
    original: &str,
    altered: &str,
    properties: bool,
) -> anyhow::Result<StructuralDiff> {
    comparator.check_inputs(original, altered)?;
    let (old, new) = if properties {
        (
            parse_properties(original)?.to_value(),
            parse_properties(altered)?.to_value(),
        )
    } else {
        match detect_format(original, altered, false) {
            Detected::Json(a, b) => (a, b),
            _ => bail!("both inputs must be JSON (with an object or array on one side), or pass --properties"),
        }
    };
    Ok(diff_values(&old, &new))
}

fn read_inputs(inputs: &InputArgs) -> anyhow::Result<(String, String)> {
    if inputs.original == "-" && inputs.altered == "-" {
        bail!("only one input can be read from stdin");
    }
    Ok((read_input(&inputs.original)?, read_input(&inputs.altered)?))
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {path}"))
}

fn print_columns(result: &CompareResult) {
    println!("Comparing as {}", result.diff_type.to_string().bold());
    for (old, new) in result.rows() {
        match (old.kind, new.kind) {
            (LineKind::None, _) => println!("  {}", old.content.dimmed()),
            (LineKind::Context, _) => {
                println!("{} {}", gutter(old), to_terminal(&old.content, LineKind::Context))
            }
            _ => {
                if old.kind != LineKind::Empty {
                    println!("{} {}", gutter(old).red(), to_terminal(&old.content, old.kind));
                }
                if new.kind != LineKind::Empty {
                    println!("{} {}", gutter(new).green(), to_terminal(&new.content, new.kind));
                }
            }
        }
    }
    let summary = result.summary;
    println!(
        "\n{} removed, {} added, {} changed",
        summary.removals.to_string().red(),
        summary.additions.to_string().green(),
        summary.changes.to_string().yellow()
    );
}

fn gutter(line: &DiffLine) -> String {
    let marker = match line.kind {
        LineKind::Removed => '-',
        LineKind::Added => '+',
        _ => ' ',
    };
    match line.line_num {
        Some(n) => format!("{n:>5} {marker}"),
        None => format!("{:>5} {marker}", ""),
    }
}

/// Turn highlight markup into terminal colors and undo the escaping.
fn to_terminal(content: &str, kind: LineKind) -> String {
    let mut out = String::new();
    let mut rest = content;
    while let Some(start) = rest.find(HIGHLIGHT_OPEN) {
        out.push_str(&unescape(&rest[..start]));
        let after = &rest[start + HIGHLIGHT_OPEN.len()..];
        let end = after.find(HIGHLIGHT_CLOSE).unwrap_or(after.len());
        let span = unescape(&after[..end]);
        let painted = match kind {
            LineKind::Removed => span.black().on_red().to_string(),
            LineKind::Added => span.black().on_green().to_string(),
            _ => span,
        };
        out.push_str(&painted);
        rest = after.get(end + HIGHLIGHT_CLOSE.len()..).unwrap_or("");
    }
    out.push_str(&unescape(rest));
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn terminal_text_unescapes_markup() {
        colored::control::set_override(false);
        let text = to_terminal("&lt;<span class=\"highlight\">a&amp;b</span>&gt;", LineKind::Added);
        assert_eq!(text, "<a&b>");
    }

    #[test]
    fn gutter_shows_line_numbers() {
        assert_eq!(gutter(&DiffLine::removed("x", 12)), "   12 -");
        assert_eq!(gutter(&DiffLine::empty()), " ".repeat(7));
    }

    #[test]
    fn reads_inputs_from_files() {
        let mut a = tempfile::NamedTempFile::new().unwrap();
        let mut b = tempfile::NamedTempFile::new().unwrap();
        writeln!(a, "a=1").unwrap();
        writeln!(b, "a=2").unwrap();
        let inputs = InputArgs {
            original: a.path().display().to_string(),
            altered: b.path().display().to_string(),
            properties: true,
        };
        let (old, new) = read_inputs(&inputs).unwrap();
        assert_eq!(old, "a=1\n");
        assert_eq!(new, "a=2\n");
    }

    #[test]
    fn report_honors_size_limits() {
        let comparator = Comparator::new(
            EngineConfig::from_toml_str("[limits]\nmax_lines = 1\n").unwrap(),
        );
        let err = structural_report(&comparator, "a=1\nb=2", "a=1", true).unwrap_err();
        assert!(err.to_string().contains("too large"));

        let report = structural_report(&comparator, "{\"x\":1}", "{\"x\":2}", false).unwrap();
        assert_eq!(report.modifications(), 1);
    }

    #[test]
    fn two_stdin_inputs_rejected() {
        let inputs = InputArgs {
            original: "-".into(),
            altered: "-".into(),
            properties: false,
        };
        assert!(read_inputs(&inputs).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_input("/nonexistent/sidecmp-input").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sidecmp-input"));
    }
}
