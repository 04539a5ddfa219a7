use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::charset;
use crate::error::{Error, Result};

pub const MIN_SECRET_LENGTH: usize = 1;
pub const MAX_SECRET_LENGTH: usize = 20;
pub const MAX_THREADS: usize = 64;

/// Which strategy a run uses. Exactly one per attack, resolved by
/// precedence: smart flag, then wordlist path, then charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackMode {
    Smart,
    Wordlist,
    Charset,
}

impl AttackMode {
    pub fn name(self) -> &'static str {
        match self {
            AttackMode::Smart => "smart",
            AttackMode::Wordlist => "wordlist",
            AttackMode::Charset => "charset",
        }
    }
}

impl fmt::Display for AttackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Advisory performance level. Scales the thread hint from the machine's
/// available parallelism; the engine itself runs one sequential loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Performance {
    Eco,
    #[default]
    Balanced,
    Performance,
    Maximum,
}

impl Performance {
    pub fn name(self) -> &'static str {
        match self {
            Performance::Eco => "eco",
            Performance::Balanced => "balanced",
            Performance::Performance => "performance",
            Performance::Maximum => "maximum",
        }
    }

    pub fn advisory_threads(self) -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let threads = match self {
            Performance::Eco => cpus / 4,
            Performance::Balanced => cpus / 2,
            Performance::Performance => cpus,
            Performance::Maximum => cpus * 2,
        };
        threads.clamp(1, MAX_THREADS)
    }
}

impl FromStr for Performance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Performance> {
        match s {
            "eco" => Ok(Performance::Eco),
            "balanced" => Ok(Performance::Balanced),
            "performance" => Ok(Performance::Performance),
            "maximum" => Ok(Performance::Maximum),
            other => Err(Error::InvalidConfig(format!(
                "unknown performance level '{}' (valid: eco, balanced, performance, maximum)",
                other
            ))),
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated once, then handed to the engine and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub wordlist: Option<PathBuf>,
    pub charset: String,
    pub length_min: usize,
    pub length_max: usize,
    pub threads: usize,
    pub performance: Performance,
    pub smart: bool,
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            token: String::new(),
            wordlist: None,
            charset: "password".to_string(),
            length_min: 1,
            length_max: 8,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            performance: Performance::default(),
            smart: false,
            timeout: None,
        }
    }
}

impl Config {
    pub fn attack_mode(&self) -> AttackMode {
        if self.smart {
            AttackMode::Smart
        } else if self.wordlist.is_some() {
            AttackMode::Wordlist
        } else {
            AttackMode::Charset
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::InvalidConfig("token is required".to_string()));
        }

        if self.length_min < MIN_SECRET_LENGTH {
            return Err(Error::InvalidConfig(format!(
                "minimum length must be at least {}",
                MIN_SECRET_LENGTH
            )));
        }

        if self.length_max < self.length_min {
            return Err(Error::InvalidConfig(format!(
                "maximum length ({}) must be >= minimum length ({})",
                self.length_max, self.length_min
            )));
        }

        if self.length_max > MAX_SECRET_LENGTH {
            return Err(Error::InvalidConfig(format!(
                "maximum length cannot exceed {}, got {}",
                MAX_SECRET_LENGTH, self.length_max
            )));
        }

        if self.threads < 1 || self.threads > MAX_THREADS {
            return Err(Error::InvalidConfig(format!(
                "thread count must be between 1 and {}, got {}",
                MAX_THREADS, self.threads
            )));
        }

        // Resolving proves the charset is non-empty and within bounds.
        charset::resolve(&self.charset)?;

        Ok(())
    }
}
