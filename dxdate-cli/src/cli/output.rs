//! Output formatting utilities for CLI commands

use std::io::{self, Write};

use is_terminal::IsTerminal;

use dxdate_core::MetricsReport;

/// Log info message (respects quiet flag)
pub fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content).map_err(|e| format!("Failed to write to {}: {}", path, e))?;
    } else {
        print!("{}", content);
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}

/// Colorize text with ANSI escape codes (only if stdout is a terminal)
pub fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Format a [0, 1] metric as a percentage, colored by band
pub fn metric_colored(value: f64) -> String {
    let pct = value * 100.0;
    let code = if pct >= 90.0 {
        "1;32"
    } else if pct >= 70.0 {
        "1;33"
    } else if pct >= 50.0 {
        "33"
    } else {
        "1;31"
    };
    color(code, &format!("{:5.1}%", pct))
}

/// Metrics table for terminal output
pub fn format_metrics(name: &str, m: &MetricsReport) -> String {
    format!(
        "{}\n  Precision: {}\n  Recall:    {}\n  F1:        {}\n  TP={} FP={} FN={}\n",
        color("1", name),
        metric_colored(m.precision),
        metric_colored(m.recall),
        metric_colored(m.f1),
        m.true_positives,
        m.false_positives,
        m.false_negatives,
    )
}

/// Pretty JSON with a trailing newline
pub fn to_json_line<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to serialize output: {}", e))
}
