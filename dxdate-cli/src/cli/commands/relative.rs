//! Relative command - resolve relative dates in one note

use clap::Parser;
use serde_json::json;

use dxdate::date::parse_timestamp;
use dxdate::relative::{backend_from_config, RelativeDateResolver, Resolution};

use super::super::output::{color, to_json_line, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::{get_input_text, load_config};

/// Resolve relative dates in a note through the configured chat backend
#[derive(Parser, Debug)]
pub struct RelativeArgs {
    /// Reference timestamp of the note (e.g. "2025-05-14 09:30:00")
    #[arg(long, value_name = "TIMESTAMP")]
    pub timestamp: String,

    /// Note text
    #[arg(short, long)]
    pub text: Option<String>,

    /// Read the note from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<String>,

    /// Config file for backend settings
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Note text as positional arguments
    #[arg(trailing_var_arg = true)]
    pub positional: Vec<String>,
}

pub fn run(args: RelativeArgs) -> Result<(), String> {
    let reference = parse_timestamp(&args.timestamp)
        .ok_or_else(|| format!("Unrecognized timestamp '{}'", args.timestamp))?;
    let text = get_input_text(&args.text, args.file.as_deref(), &args.positional)?;
    let config = load_config(args.config.as_deref())?;

    let backend = backend_from_config(&config.relative_dates).map_err(|e| e.to_string())?;
    let resolver = RelativeDateResolver::new(backend, config.relative_dates.context_window);
    let mentions = match resolver.resolve(&text, &reference) {
        Resolution::Failed(msg) => {
            return Err(format!("{} failed: {}", resolver.backend().name(), msg))
        }
        other => other.into_mentions(),
    };

    let out = match args.format {
        OutputFormat::Json => to_json_line(
            &mentions
                .iter()
                .map(|m| json!({"phrase": m.raw, "start_index": m.start, "calculated_date": m.parsed}))
                .collect::<Vec<_>>(),
        )?,
        OutputFormat::Human if mentions.is_empty() => "No relative dates found\n".to_string(),
        OutputFormat::Human => mentions
            .iter()
            .map(|m| {
                format!(
                    "  {:<24} {} @{}\n",
                    m.raw,
                    color("1;35", m.parsed.as_deref().unwrap_or("-")),
                    m.start
                )
            })
            .collect(),
    };
    write_output(&out, None)
}
