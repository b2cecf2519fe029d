//! Configuration file parser
//!
//! Parses Redis-style `directive value` files into a [`ClientConfig`]:
//!
//! ```text
//! # cache connection
//! host cache.internal
//! port 6380
//! db 2
//! requirepass s3cret
//! timeout-ms 1500
//! ```

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use super::ClientConfig;

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid line format
    #[error("Invalid line format at line {0}: {1}")]
    Format(usize, String),

    /// Invalid parameter value
    #[error("Invalid value for parameter '{0}' at line {1}: {2}")]
    Value(String, usize, String),

    /// Unknown parameter
    #[error("Unknown parameter '{0}' at line {1}")]
    UnknownParam(String, usize),
}

/// Parse a Redis-style configuration file
pub fn parse_config_file(path: &Path) -> Result<ClientConfig, ConfigParseError> {
    let contents = fs::read_to_string(path)?;
    parse_config_str(&contents)
}

/// Parse configuration directives from a string
pub fn parse_config_str(contents: &str) -> Result<ClientConfig, ConfigParseError> {
    let mut config = ClientConfig::default();

    for (index, raw) in contents.lines().enumerate() {
        let line_num = index + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (param, value) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| ConfigParseError::Format(line_num, line.to_string()))?;

        let param = param.to_lowercase();
        let value = value.trim().trim_matches('"');
        apply_config_param(&mut config, &param, value, line_num)?;
    }

    Ok(config)
}

fn apply_config_param(
    config: &mut ClientConfig,
    param: &str,
    value: &str,
    line_num: usize,
) -> Result<(), ConfigParseError> {
    match param {
        "host" | "bind" => config.host = value.to_string(),
        "port" => config.port = parse_value(param, value, line_num)?,
        "db" | "database" => config.db = parse_value(param, value, line_num)?,
        "requirepass" | "password" => {
            config.password = if value.is_empty() { None } else { Some(value.to_string()) };
        }
        "user" | "username" => config.username = Some(value.to_string()),
        "client-name" => config.client_name = Some(value.to_string()),
        "connect-timeout-ms" => {
            config.connect_timeout = Duration::from_millis(parse_value(param, value, line_num)?);
        }
        "timeout-ms" | "command-timeout-ms" => {
            config.command_timeout = Duration::from_millis(parse_value(param, value, line_num)?);
        }
        _ => return Err(ConfigParseError::UnknownParam(param.to_string(), line_num)),
    }

    Ok(())
}

fn parse_value<T: FromStr>(
    param: &str,
    value: &str,
    line_num: usize,
) -> Result<T, ConfigParseError> {
    value
        .parse()
        .map_err(|_| ConfigParseError::Value(param.to_string(), line_num, value.to_string()))
}
