//! Shared output formatting for lint results.

use anyhow::Result;
use symlint_core::{DiagnosticReport, LintResult, Severity};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Fancy => print_fancy(result),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        let severity_indicator = match diagnostic.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}",
            diagnostic.code, diagnostic.rule, diagnostic.location
        );
        println!("  {}: {}", severity_indicator, diagnostic.message);
        if let Some(suggestion) = &diagnostic.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        if let Some(cost) = diagnostic.remediation() {
            println!("  = effort: {cost}");
        }
        println!();
    }

    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} unit(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.units_checked
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        println!("{diagnostic}");
    }
}

fn print_fancy(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        let report = miette::Report::new(DiagnosticReport::from(diagnostic));
        println!("{report:?}");
    }
    print_summary(result);
}
