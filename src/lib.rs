//! Brute-force recovery of HMAC-signed JWT secrets.
//!
//! The [`Engine`] parses a token, picks one of three search strategies
//! (curated patterns, wordlist, or charset enumeration) from its [`Config`],
//! and tests candidates until the signature matches, the space is exhausted,
//! or the [`CancelToken`] fires.
//!
//! ```no_run
//! use jwt_crack::{CancelToken, Config, Engine};
//!
//! let config = Config {
//!     token: "eyJ...".to_string(),
//!     smart: true,
//!     ..Config::default()
//! };
//! let mut engine = Engine::new(config)?;
//! let result = engine.attack(&CancelToken::new())?;
//! if result.success {
//!     println!("secret: {}", result.secret.unwrap());
//! }
//! # Ok::<(), jwt_crack::Error>(())
//! ```

pub mod charset;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod patterns;
pub mod token;

pub use config::{AttackMode, Config, Performance};
pub use engine::{AttackResult, AttemptCounter, CancelToken, Engine, ProgressCallback};
pub use error::{Error, Result};
pub use token::{Algorithm, Token};
