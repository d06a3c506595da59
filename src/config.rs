//! Runtime configuration
//!
//! Settings are read from `CHAT_RELAY_*` environment variables, falling back
//! to defaults. The bind address can also be given as the first CLI argument.

use std::str::FromStr;

use thiserror::Error;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Default room code length
pub const DEFAULT_CODE_LENGTH: usize = 4;

/// Capacity used when a create request has none (or a bad one)
pub const DEFAULT_CAPACITY: usize = 10;

/// Channel buffer size for server commands
pub const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Channel buffer size for per-client outbound messages
pub const DEFAULT_CLIENT_BUFFER: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

/// Relay settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind the WebSocket listener to
    pub addr: String,
    /// Number of letters in a generated room code
    pub code_length: usize,
    /// Fallback room capacity
    pub default_capacity: usize,
    /// Buffer of the server command channel
    pub command_buffer: usize,
    /// Buffer of each connection's outbound channel
    pub client_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            code_length: DEFAULT_CODE_LENGTH,
            default_capacity: DEFAULT_CAPACITY,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            client_buffer: DEFAULT_CLIENT_BUFFER,
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            addr: lookup("CHAT_RELAY_ADDR").unwrap_or(defaults.addr),
            code_length: positive(&lookup, "CHAT_RELAY_CODE_LENGTH", defaults.code_length)?,
            default_capacity: positive(
                &lookup,
                "CHAT_RELAY_DEFAULT_CAPACITY",
                defaults.default_capacity,
            )?,
            command_buffer: positive(&lookup, "CHAT_RELAY_COMMAND_BUFFER", defaults.command_buffer)?,
            client_buffer: positive(&lookup, "CHAT_RELAY_CLIENT_BUFFER", defaults.client_buffer)?,
        })
    }

    /// Override the bind address (e.g. from the command line)
    pub fn with_addr(mut self, addr: Option<String>) -> Self {
        if let Some(addr) = addr {
            self.addr = addr;
        }
        self
    }
}

fn positive<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };

    match usize::from_str(value.trim()) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}
