//! Utility functions for CLI commands

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use is_terminal::IsTerminal;

use dxdate::Config;

/// Config file looked up in the working directory when `--config` is absent
pub const LOCAL_CONFIG: &str = "dxdate.toml";

/// Get input text from various sources (text arg, file, or stdin)
pub fn get_input_text(
    text: &Option<String>,
    file: Option<&str>,
    positional: &[String],
) -> Result<String, String> {
    if let Some(t) = text {
        return Ok(t.clone());
    }

    if let Some(f) = file {
        return read_input_file(f);
    }

    if !positional.is_empty() {
        return Ok(positional.join(" "));
    }

    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format_error("read stdin", &e.to_string()))?;
        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    Err("No input text provided. Use -t 'text' or -f file or pipe via stdin".to_string())
}

/// Read a file with consistent error handling
pub fn read_input_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format_error("read file", &format!("{}: {}", path, e)))
}

/// Format error message consistently
pub fn format_error(operation: &str, details: &str) -> String {
    format!("Failed to {}: {}", operation, details)
}

/// Get config directory
pub fn get_config_dir() -> Result<PathBuf, String> {
    if let Some(mut config) = dirs::config_dir() {
        config.push("dxdate");
        fs::create_dir_all(&config)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        Ok(config)
    } else {
        Ok(PathBuf::from(".dxdate-config"))
    }
}

/// Where configuration is read from when `--config` is not given:
/// `./dxdate.toml`, then `<config dir>/dxdate/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|d| d.join("dxdate").join("config.toml"))
        .filter(|p| p.is_file())
}

/// Load configuration from `path`, the default locations, or built-in defaults
pub fn load_config(path: Option<&str>) -> Result<Config, String> {
    let resolved = path.map(PathBuf::from).or_else(default_config_path);
    match resolved {
        Some(p) => {
            log::debug!("using config {}", p.display());
            Config::load(&p).map_err(|e| e.to_string())
        }
        None => {
            log::debug!("no config file found, using defaults");
            Ok(Config::default())
        }
    }
}
