//! Token lookup and config paths.
//!
//! The API token comes from the command line (or `TUSHARE_TOKEN`, which clap
//! folds into the same flag), falling back to a token file under the
//! platform config directory:
//! - Linux: `~/.config/lncap/token`
//! - macOS: `~/Library/Application Support/lncap/token`
//! - Windows: `%APPDATA%\lncap\token`

use lncap_data::DataError;
use std::path::{Path, PathBuf};

/// Environment variable read for the API token.
pub(crate) const TOKEN_ENV: &str = "TUSHARE_TOKEN";

/// Get the default config directory path.
pub(crate) fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lncap")
}

/// Get the default token file path.
pub(crate) fn default_token_path() -> PathBuf {
    default_config_dir().join("token")
}

/// First non-empty line of a token file.
pub(crate) fn read_token_file(path: &Path) -> Result<Option<String>, DataError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string))
}

/// Resolve the API token from the flag/env value or the token file.
pub(crate) fn resolve_token(flag: Option<String>, token_file: &Path) -> Result<String, DataError> {
    if let Some(token) = flag.map(|t| t.trim().to_string())
        && !token.is_empty()
    {
        return Ok(token);
    }
    read_token_file(token_file)?.ok_or(DataError::MissingToken)
}
