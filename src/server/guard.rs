// src/server/guard.rs

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::Serialize;

use crate::config::Config;

/// Display format used for dashboard timestamps and the plain-text reply.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One processed request, kept in arrival order. Display-only; decisions
/// never read the log.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptLogEntry {
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub code: String,
    pub note: String,
}

/// Decision for a single evaluated request.
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    /// The attempt was rejected outright due to an active lockout.
    pub denied: bool,
    /// This attempt crossed the failure threshold and started a lockout.
    pub lockout_triggered: bool,
    /// Whole seconds left on the active lockout, 0 unless `denied`.
    pub remaining_secs: u64,
    pub note: String,
}

/// Tracks per-code failure counts and lockout expiries, and records every
/// processed request. All state is in-memory and lost on restart.
pub struct LockoutGuard {
    max_attempts: u32,
    lockout_duration: Duration,
    suspicious_codes: HashSet<String>,

    fail_counter: HashMap<String, u32>,
    lockout_until: HashMap<String, DateTime<Utc>>,
    attempt_log: Vec<AttemptLogEntry>,
}

impl LockoutGuard {
    pub fn new(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts,
            lockout_duration: Duration::seconds(config.lockout_duration.as_secs() as i64),
            suspicious_codes: config.suspicious_codes.clone(),
            fail_counter: HashMap::new(),
            lockout_until: HashMap::new(),
            attempt_log: Vec::new(),
        }
    }

    /// Process one request and return the verdict. Every call appends a log
    /// entry, including denied ones. Unrecognized status values change no
    /// state and carry an empty note.
    pub fn evaluate(&mut self, code: &str, status: &str, now: DateTime<Utc>) -> Verdict {
        let verdict = match status {
            "attempt" => self.register_attempt(code, now),
            "unlocked" => self.register_unlock(code),
            _ => Verdict::default(),
        };

        self.attempt_log.push(AttemptLogEntry {
            timestamp: now,
            status: status.to_string(),
            code: code.to_string(),
            note: verdict.note.clone(),
        });

        verdict
    }

    fn register_attempt(&mut self, code: &str, now: DateTime<Utc>) -> Verdict {
        // A live lockout denies outright; the counter stays pinned.
        if let Some(&until) = self.lockout_until.get(code) {
            if now < until {
                let remaining = (until - now).num_seconds().max(0) as u64;
                return Verdict {
                    denied: true,
                    remaining_secs: remaining,
                    note: format!("LOCKED OUT for {remaining} seconds due to repeated failures."),
                    ..Verdict::default()
                };
            }
        }

        let count = {
            let entry = self.fail_counter.entry(code.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if count >= self.max_attempts {
            self.lockout_until
                .insert(code.to_string(), now + self.lockout_duration);
            let secs = self.lockout_duration.num_seconds();
            warn!("code {code:?} locked out for {secs}s after {count} consecutive failures");
            Verdict {
                lockout_triggered: true,
                note: format!("Code {code} has been LOCKED OUT for {secs} seconds"),
                ..Verdict::default()
            }
        } else if self.suspicious_codes.contains(code) {
            Verdict {
                note: format!("Suspicious pattern detected: {code}"),
                ..Verdict::default()
            }
        } else {
            Verdict::default()
        }
    }

    fn register_unlock(&mut self, code: &str) -> Verdict {
        self.fail_counter.insert(code.to_string(), 0);
        self.lockout_until.remove(code);
        Verdict::default()
    }

    /// Snapshot of the full attempt log, oldest first.
    pub fn history(&self) -> Vec<AttemptLogEntry> {
        self.attempt_log.clone()
    }
}
