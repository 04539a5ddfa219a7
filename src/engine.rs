//! The attack engine: owns a parsed token and a validated configuration,
//! runs exactly one search strategy per `attack` call, and reports progress
//! through an injected callback.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info};
use serde::{Serialize, Serializer};

use crate::charset;
use crate::config::{AttackMode, Config};
use crate::error::{Error, Result};
use crate::generator::CombinationGenerator;
use crate::patterns::SMART_PATTERNS;
use crate::token::{Algorithm, Token};

/// Pacing between smart-strategy attempts; the list is short and this pass
/// is meant to be cheap, not fast.
const SMART_ATTACK_DELAY: Duration = Duration::from_millis(10);
const WORDLIST_PROGRESS_FREQ: u64 = 100;
const CHARSET_PROGRESS_FREQ: u64 = 1000;
/// Below this many elapsed seconds the rate is reported as 0 instead of a
/// division-by-near-zero spike.
const MIN_RATE_ELAPSED: f64 = 0.1;
const MAX_REPORTED_RATE: f64 = 100_000_000.0;

/// Invoked with (attempts so far, rate per second, optional ETA, status).
/// Must not block; the engine calls it inline from the search loop.
pub type ProgressCallback = Box<dyn FnMut(u64, f64, Option<Duration>, &str) + Send>;

enum Stop {
    Cancelled,
    TimedOut,
}

/// Cooperative stop signal, polled by every strategy loop before each
/// candidate. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn with_timeout(timeout: Duration) -> CancelToken {
        CancelToken {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn stop_reason(&self) -> Option<Stop> {
        if self.is_cancelled() {
            return Some(Stop::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Stop::TimedOut),
            _ => None,
        }
    }
}

/// Shared attempt counter: one increment per secret tested, readable from
/// outside the attack loop without tearing.
#[derive(Debug, Clone, Default)]
pub struct AttemptCounter(Arc<AtomicU64>);

impl AttemptCounter {
    fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one `attack` call. Exhaustion without a match is a normal
/// result with `success == false`; cancellation and timeout surface as
/// errors instead and never produce a half-populated success.
#[derive(Debug, Clone, Serialize)]
pub struct AttackResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    pub algorithm: Algorithm,
    pub attempts: u64,
    #[serde(rename = "duration_secs", serialize_with = "duration_secs")]
    pub duration: Duration,
    #[serde(serialize_with = "unix_seconds")]
    pub timestamp: SystemTime,
    pub attack_mode: AttackMode,
}

fn duration_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

fn unix_seconds<S: Serializer>(t: &SystemTime, s: S) -> std::result::Result<S::Ok, S::Error> {
    let secs = t
        .duration_since(UNIX_EPOCH)
        .map_err(serde::ser::Error::custom)?
        .as_secs();
    s.serialize_u64(secs)
}

pub struct Engine {
    config: Config,
    token: Token,
    counter: AttemptCounter,
    progress: Option<ProgressCallback>,
}

impl Engine {
    /// Validates the configuration and parses the token. A failed
    /// construction yields no engine.
    pub fn new(config: Config) -> Result<Engine> {
        config.validate()?;
        let token = Token::parse(&config.token)?;
        debug!("token parsed, algorithm {}", token.algorithm());
        Ok(Engine {
            config,
            token,
            counter: AttemptCounter::default(),
            progress: None,
        })
    }

    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u64, f64, Option<Duration>, &str) + Send + 'static,
    {
        self.progress = Some(Box::new(callback));
    }

    pub fn algorithm(&self) -> Algorithm {
        self.token.algorithm()
    }

    /// Cloneable handle onto the attempt counter, safe to read from another
    /// thread while the attack runs.
    pub fn counter(&self) -> AttemptCounter {
        self.counter.clone()
    }

    pub fn get_stats(&self) -> (u64, AttackMode) {
        (self.counter.load(), self.config.attack_mode())
    }

    /// Run the configured strategy to success, exhaustion, or interruption.
    pub fn attack(&mut self, cancel: &CancelToken) -> Result<AttackResult> {
        let start = Instant::now();
        let mode = self.config.attack_mode();
        info!(
            "starting {} attack on {} token ({} advisory threads)",
            mode,
            self.token.algorithm(),
            self.config.performance.advisory_threads()
        );

        let secret = if self.config.smart {
            self.smart_attack(cancel, start)?
        } else if let Some(path) = self.config.wordlist.clone() {
            self.wordlist_attack(&path, cancel, start)?
        } else {
            self.charset_attack(cancel, start)?
        };

        let duration = start.elapsed();
        let attempts = self.counter.load();
        if secret.is_some() {
            info!("secret found after {} attempts in {:?}", attempts, duration);
        } else {
            info!(
                "search exhausted after {} attempts in {:?}",
                attempts, duration
            );
        }

        Ok(AttackResult {
            success: secret.is_some(),
            secret,
            algorithm: self.token.algorithm(),
            attempts,
            duration,
            timestamp: SystemTime::now(),
            attack_mode: mode,
        })
    }

    fn check_cancel(&self, cancel: &CancelToken) -> Result<()> {
        match cancel.stop_reason() {
            None => Ok(()),
            Some(Stop::Cancelled) => Err(Error::Cancelled {
                attempts: self.counter.load(),
            }),
            Some(Stop::TimedOut) => Err(Error::TimedOut {
                attempts: self.counter.load(),
            }),
        }
    }

    fn smart_attack(&mut self, cancel: &CancelToken, start: Instant) -> Result<Option<String>> {
        for pattern in SMART_PATTERNS {
            self.check_cancel(cancel)?;
            let attempts = self.counter.increment();
            if self.token.verify(pattern) {
                return Ok(Some(pattern.to_string()));
            }
            self.report_progress(start, attempts, &format!("testing pattern: {}", pattern));
            std::thread::sleep(SMART_ATTACK_DELAY);
        }
        Ok(None)
    }

    fn wordlist_attack(
        &mut self,
        path: &Path,
        cancel: &CancelToken,
        start: Instant,
    ) -> Result<Option<String>> {
        let file = File::open(path).map_err(|e| Error::Wordlist {
            path: path.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            self.check_cancel(cancel)?;
            let line = line.map_err(|e| Error::Wordlist {
                path: path.to_path_buf(),
                source: e,
            })?;
            let word = line.trim();
            if word.is_empty() {
                continue;
            }
            let attempts = self.counter.increment();
            if self.token.verify(word) {
                return Ok(Some(word.to_string()));
            }
            if attempts % WORDLIST_PROGRESS_FREQ == 0 {
                self.report_progress(start, attempts, &format!("tested {} candidates", attempts));
            }
        }
        Ok(None)
    }

    fn charset_attack(&mut self, cancel: &CancelToken, start: Instant) -> Result<Option<String>> {
        let alphabet = charset::resolve(&self.config.charset)?;
        let mut generator = CombinationGenerator::new(
            alphabet,
            self.config.length_min,
            self.config.length_max,
        );
        debug!("charset search space: {} candidates", generator.space_size());

        loop {
            self.check_cancel(cancel)?;
            let Some(candidate) = generator.next() else {
                break;
            };
            let attempts = self.counter.increment();
            if self.token.verify(&candidate) {
                return Ok(Some(candidate));
            }
            if attempts % CHARSET_PROGRESS_FREQ == 0 {
                let status = format!(
                    "testing length {}: {}",
                    candidate.chars().count(),
                    candidate
                );
                self.report_progress(start, attempts, &status);
            }
        }
        Ok(None)
    }

    fn report_progress(&mut self, start: Instant, attempts: u64, status: &str) {
        if let Some(callback) = self.progress.as_mut() {
            let elapsed = start.elapsed().as_secs_f64();
            let mut rate = 0.0;
            if elapsed > MIN_RATE_ELAPSED {
                rate = (attempts as f64 / elapsed).min(MAX_REPORTED_RATE);
            }
            callback(attempts, rate, None, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{encode_token, HS256_TOKEN};
    use serde_json::json;
    use std::io::Write;

    fn config_for(token: &str) -> Config {
        Config {
            token: token.to_string(),
            ..Config::default()
        }
    }

    fn fixture_token(algorithm: Algorithm, secret: &str) -> String {
        encode_token(algorithm, &json!({ "sub": "1234567890" }), secret)
    }

    #[test]
    fn smart_attack_recovers_common_default() {
        let config = Config {
            smart: true,
            ..config_for(HS256_TOKEN)
        };
        let mut engine = Engine::new(config).unwrap();
        let result = engine.attack(&CancelToken::new()).unwrap();

        assert!(result.success);
        assert_eq!(result.secret.as_deref(), Some("your-256-bit-secret"));
        assert_eq!(result.attack_mode, AttackMode::Smart);
        // fixed position in the pattern list
        assert_eq!(result.attempts, 15);
    }

    #[test]
    fn wordlist_attack_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "wrong1\n\nwrong2\nsecret\n\nwrong3\n").unwrap();

        let config = Config {
            wordlist: Some(file.path().to_path_buf()),
            ..config_for(&fixture_token(Algorithm::Hs256, "secret"))
        };
        let mut engine = Engine::new(config).unwrap();
        let result = engine.attack(&CancelToken::new()).unwrap();

        assert!(result.success);
        assert_eq!(result.secret.as_deref(), Some("secret"));
        assert_eq!(result.attempts, 3);
        assert_eq!(result.attack_mode, AttackMode::Wordlist);
    }

    #[test]
    fn wordlist_attack_surfaces_missing_file() {
        let config = Config {
            wordlist: Some("/nonexistent/words.txt".into()),
            ..config_for(HS256_TOKEN)
        };
        let mut engine = Engine::new(config).unwrap();
        match engine.attack(&CancelToken::new()) {
            Err(Error::Wordlist { .. }) => {}
            other => panic!("expected Wordlist error, got {:?}", other),
        }
    }

    #[test]
    fn charset_attack_finds_short_secret() {
        let config = Config {
            charset: "lowercase".to_string(),
            length_min: 3,
            length_max: 3,
            ..config_for(&fixture_token(Algorithm::Hs256, "abc"))
        };
        let mut engine = Engine::new(config).unwrap();
        let result = engine.attack(&CancelToken::new()).unwrap();

        assert!(result.success);
        assert_eq!(result.secret.as_deref(), Some("abc"));
        assert!(result.attempts <= 26u64.pow(3));
        assert_eq!(result.algorithm, Algorithm::Hs256);
        assert_eq!(result.attack_mode, AttackMode::Charset);
    }

    #[test]
    fn charset_attack_is_deterministic() {
        // "ba" is the 5th candidate over "ab" with lengths 1..=2
        let config = Config {
            charset: "ab".to_string(),
            length_min: 1,
            length_max: 2,
            ..config_for(&fixture_token(Algorithm::Hs512, "ba"))
        };
        let mut engine = Engine::new(config).unwrap();
        let result = engine.attack(&CancelToken::new()).unwrap();
        assert_eq!(result.secret.as_deref(), Some("ba"));
        assert_eq!(result.attempts, 5);
    }

    #[test]
    fn charset_exhaustion_covers_whole_space() {
        let config = Config {
            charset: "abcdef".to_string(),
            length_min: 2,
            length_max: 2,
            ..config_for(&fixture_token(Algorithm::Hs256, "zz9"))
        };
        let mut engine = Engine::new(config).unwrap();
        let result = engine.attack(&CancelToken::new()).unwrap();

        assert!(!result.success);
        assert_eq!(result.secret, None);
        assert_eq!(result.attempts, 36);
    }

    #[test]
    fn pre_cancelled_attack_stops_immediately() {
        let mut engine = Engine::new(config_for(HS256_TOKEN)).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        match engine.attack(&cancel) {
            Err(Error::Cancelled { attempts }) => assert_eq!(attempts, 0),
            other => panic!("expected Cancelled, got {:?}", other),
        }
    }

    #[test]
    fn cancellation_mid_attack_is_prompt() {
        let config = Config {
            charset: "lowercase".to_string(),
            length_min: 1,
            length_max: 8,
            ..config_for(&fixture_token(Algorithm::Hs256, "NOPE"))
        };
        let mut engine = Engine::new(config).unwrap();

        let cancel = CancelToken::new();
        let handle = cancel.clone();
        engine.set_progress_callback(move |attempts, _rate, _eta, _status| {
            if attempts >= 2000 {
                handle.cancel();
            }
        });

        match engine.attack(&cancel) {
            Err(Error::Cancelled { attempts }) => assert_eq!(attempts, 2000),
            other => panic!("expected Cancelled, got {:?}", other),
        }
    }

    #[test]
    fn expired_deadline_reports_timeout() {
        let config = Config {
            charset: "lowercase".to_string(),
            length_min: 1,
            length_max: 8,
            ..config_for(HS256_TOKEN)
        };
        let mut engine = Engine::new(config).unwrap();
        let cancel = CancelToken::with_timeout(Duration::ZERO);
        match engine.attack(&cancel) {
            Err(Error::TimedOut { .. }) => {}
            other => panic!("expected TimedOut, got {:?}", other),
        }
    }

    #[test]
    fn counter_handle_survives_the_attack() {
        let config = Config {
            charset: "digits".to_string(),
            length_min: 1,
            length_max: 2,
            ..config_for(&fixture_token(Algorithm::Hs384, "nope"))
        };
        let mut engine = Engine::new(config).unwrap();
        let counter = engine.counter();

        let result = engine.attack(&CancelToken::new()).unwrap();
        assert_eq!(counter.load(), result.attempts);
        assert_eq!(result.attempts, 110);

        let (attempts, mode) = engine.get_stats();
        assert_eq!(attempts, 110);
        assert_eq!(mode, AttackMode::Charset);
    }

    #[test]
    fn construction_rejects_malformed_tokens() {
        assert!(matches!(
            Engine::new(config_for("a.b")),
            Err(Error::InvalidToken(_))
        ));

        let head = base64::encode_config(r#"{"alg":"RS256"}"#, base64::URL_SAFE_NO_PAD);
        let body = base64::encode_config("{}", base64::URL_SAFE_NO_PAD);
        let raw = format!("{}.{}.c2ln", head, body);
        assert!(matches!(
            Engine::new(config_for(&raw)),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn result_serializes_cleanly() {
        let config = Config {
            charset: "ab".to_string(),
            length_min: 1,
            length_max: 1,
            ..config_for(&fixture_token(Algorithm::Hs256, "a"))
        };
        let mut engine = Engine::new(config).unwrap();
        let result = engine.attack(&CancelToken::new()).unwrap();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["secret"], json!("a"));
        assert_eq!(value["algorithm"], json!("HS256"));
        assert_eq!(value["attack_mode"], json!("charset"));
        assert!(value["duration_secs"].is_f64());
        assert!(value["timestamp"].is_u64());
    }
}
