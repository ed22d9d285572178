use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::ConfigError;

static ENV_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").expect("env line pattern compiles")
});

/// Reads `KEY=VALUE` pairs from a dotenv-style file.
///
/// A missing file yields no pairs.
pub fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No env file at {:?}", path);
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(ConfigError::EnvFileRead {
                path: path.to_string_lossy().to_string(),
                message: e.to_string(),
            })
        }
    };

    parse_env_file(&content, path)
}

pub fn parse_env_file(content: &str, path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let mut pairs = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let captures = ENV_LINE
            .captures(line)
            .ok_or_else(|| ConfigError::EnvFileParse {
                path: path.to_string_lossy().to_string(),
                line: idx + 1,
                message: format!("expected KEY=VALUE, found '{}'", line),
            })?;

        let key = captures[1].to_string();
        let value = unquote(captures[2].trim());
        pairs.push((key, value.to_string()));
    }

    Ok(pairs)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
