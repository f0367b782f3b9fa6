//! Parse-date command - normalize date strings

use clap::Parser;
use serde_json::json;

use dxdate::date::parse_date;

use super::super::output::{color, to_json_line, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::get_input_text;

/// Normalize date strings to YYYY-MM-DD
#[derive(Parser, Debug)]
pub struct ParseDateArgs {
    /// Dates to normalize (one per line from stdin when absent)
    #[arg(value_name = "DATE")]
    pub dates: Vec<String>,

    /// Fail if any input does not parse
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

pub fn run(args: ParseDateArgs) -> Result<(), String> {
    let inputs: Vec<String> = if args.dates.is_empty() {
        get_input_text(&None, None, &[])?
            .lines()
            .map(str::to_string)
            .filter(|l| !l.trim().is_empty())
            .collect()
    } else {
        args.dates
    };

    let parsed: Vec<(String, Option<String>)> = inputs
        .into_iter()
        .map(|raw| {
            let p = parse_date(&raw);
            (raw, p)
        })
        .collect();

    let out = match args.format {
        OutputFormat::Json => to_json_line(
            &parsed
                .iter()
                .map(|(raw, p)| json!({"input": raw, "parsed": p}))
                .collect::<Vec<_>>(),
        )?,
        OutputFormat::Human => parsed
            .iter()
            .map(|(raw, p)| match p {
                Some(d) => format!("{}\t{}\n", raw, d),
                None => format!("{}\t{}\n", raw, color("31", "-")),
            })
            .collect(),
    };
    write_output(&out, None)?;

    let failed = parsed.iter().filter(|(_, p)| p.is_none()).count();
    if args.strict && failed > 0 {
        return Err(format!("{} of {} dates did not parse", failed, parsed.len()));
    }
    Ok(())
}
