// src/config.rs

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_LOCKOUT_SECS: u64 = 60;
const DEFAULT_SUSPICIOUS_CODES: [&str; 3] = ["0000", "1111", "8888"];

/// Tuning knobs for the guard and the HTTP listener.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Consecutive failures that trigger a lockout.
    pub max_attempts: u32,
    pub lockout_duration: Duration,
    /// Codes flagged as likely guesses (trivial repeated digits).
    pub suspicious_codes: HashSet<String>,
}

impl Config {
    /// Load configuration from `LOCKDASH_*` environment variables,
    /// falling back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            port: env_parse("LOCKDASH_PORT", DEFAULT_PORT),
            max_attempts: env_parse("LOCKDASH_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            lockout_duration: Duration::from_secs(env_parse(
                "LOCKDASH_LOCKOUT_SECS",
                DEFAULT_LOCKOUT_SECS,
            )),
            suspicious_codes: env_code_set("LOCKDASH_SUSPICIOUS_CODES"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_duration: Duration::from_secs(DEFAULT_LOCKOUT_SECS),
            suspicious_codes: default_suspicious_codes(),
        }
    }
}

fn default_suspicious_codes() -> HashSet<String> {
    DEFAULT_SUSPICIOUS_CODES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Comma-separated code list, e.g. `LOCKDASH_SUSPICIOUS_CODES=0000,1234`.
fn env_code_set(key: &str) -> HashSet<String> {
    match std::env::var(key) {
        Ok(v) => v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => default_suspicious_codes(),
    }
}
