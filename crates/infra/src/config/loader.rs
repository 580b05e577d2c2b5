//! Configuration loader
//!
//! Loads the agent configuration from a file.
//!
//! ## Loading Strategy
//! 1. If `EXRELAY_CONFIG` is set, that path is used and must exist
//! 2. Otherwise, probes multiple paths for config files
//! 3. Supports TOML and JSON formats (detected by extension)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./exrelay.toml` or `./exrelay.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use exrelay_domain::{Config, RelayError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "EXRELAY_CONFIG";

/// Load configuration, honouring the `EXRELAY_CONFIG` override.
///
/// # Errors
/// Returns `RelayError::Config` if no file is found, the format is
/// invalid, or validation fails.
pub fn load() -> Result<Config> {
    load_from_file(resolve_path())
}

/// Resolve the config file location: the `EXRELAY_CONFIG` override
/// wins, otherwise the standard locations are probed.
///
/// An override pointing at a missing file is returned as-is so the
/// load surfaces the bad path instead of silently probing past it.
pub fn resolve_path() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from).or_else(probe_config_paths)
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes multiple locations for config files.
///
/// # Errors
/// Returns `RelayError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing or validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RelayError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RelayError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RelayError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content.
///
/// Format is detected by file extension (`.toml` or `.json`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RelayError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RelayError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(RelayError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.toml"),
            cwd.join("config.json"),
            cwd.join("exrelay.toml"),
            cwd.join("exrelay.json"),
            cwd.join("../config.toml"),
            cwd.join("../config.json"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.toml"),
                exe_dir.join("config.json"),
                exe_dir.join("exrelay.toml"),
                exe_dir.join("exrelay.json"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}
