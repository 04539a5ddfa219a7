use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while constructing an engine or running an
/// attack. Exhaustion without a match is not an error; it is a normal
/// `AttackResult` with `success == false`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("unsupported algorithm: {0} (supported: HS256, HS384, HS512)")]
    UnsupportedAlgorithm(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid charset: {0}")]
    InvalidCharset(String),

    #[error("wordlist {}: {}", path.display(), source)]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("attack cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("attack timed out after {attempts} attempts")]
    TimedOut { attempts: u64 },
}

impl Error {
    /// True for the two cooperative-stop variants, which callers usually
    /// report as information rather than failure.
    pub fn is_interruption(&self) -> bool {
        matches!(self, Error::Cancelled { .. } | Error::TimedOut { .. })
    }
}
