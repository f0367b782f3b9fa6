//! Config command - show, create and locate configuration

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dxdate::Config;

use super::super::output::{color, write_output};
use super::super::utils::{default_config_path, get_config_dir, load_config, LOCAL_CONFIG};

/// Show or create configuration
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Action to perform
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        /// Config file (default: ./dxdate.toml, then the user config dir)
        #[arg(short, long, value_name = "PATH")]
        config: Option<String>,
    },

    /// Write a config file with every default filled in
    Init {
        /// Destination (default: ./dxdate.toml)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Write to the user config dir instead
        #[arg(long, conflicts_with = "path")]
        global: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print which config file would be used
    Path,

    /// Check a config file for unknown keys and out-of-range values
    Check {
        /// Config file
        #[arg(value_name = "PATH")]
        path: String,
    },
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.action {
        ConfigAction::Show { config } => {
            let config = load_config(config.as_deref())?;
            let toml = config.to_toml_string().map_err(|e| e.to_string())?;
            write_output(&toml, None)?;
        }
        ConfigAction::Init {
            path,
            global,
            force,
        } => {
            let path = if global {
                get_config_dir()?.join("config.toml")
            } else {
                path.unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
            };
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ));
            }
            let toml = Config::default().to_toml_string().map_err(|e| e.to_string())?;
            fs::write(&path, toml)
                .map_err(|e| format!("Failed to write config: {}", e))?;
            println!("{} Wrote config: {}", color("32", "✓"), path.display());
        }
        ConfigAction::Path => match default_config_path() {
            Some(p) => println!("{}", p.display()),
            None => println!("No config file found; using built-in defaults"),
        },
        ConfigAction::Check { path } => {
            Config::load(&path).map_err(|e| e.to_string())?;
            println!("{} {} is valid", color("32", "✓"), path);
        }
    }

    Ok(())
}
