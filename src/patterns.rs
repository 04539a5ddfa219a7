//! Curated list of common signing secrets, tried in order by the smart
//! strategy before any heavier search. Ordering matters: the most frequently
//! seen defaults come first.

pub const SMART_PATTERNS: &[&str] = &[
    "secret",
    "password",
    "123456",
    "admin",
    "test",
    "key",
    "jwt",
    "token",
    "secretkey",
    "jwtkey",
    "mysecret",
    "supersecret",
    "qwerty",
    "password123",
    "your-256-bit-secret",
    "your-secret",
    "secret-key",
    "jwt-secret",
    "",
    "null",
    "undefined",
    "your_secret_here",
    "change_me",
    "default",
    "demo",
    "example",
    "sample",
    "temp",
    "temporary",
    "dev",
    "development",
    "prod",
    "production",
    "staging",
    "testing",
    "debug",
    "localhost",
];
