//! Alphabet resolution for the charset strategy: named presets, hashcat-style
//! placeholder expansion, and order-preserving dedup.

use crate::error::{Error, Result};

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SPECIAL: &str = "!@#$%^&*()-_=+[]{}|;:'\",.<>?/\\`";
pub const PRINTABLE: &str =
    " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";
pub const HEX: &str = "0123456789abcdef";
pub const BASE64: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Hard ceiling on an alphabet after placeholder expansion.
pub const MAX_EXPANDED_LEN: usize = 1000;

/// Look up a named preset. Anything not listed here is treated as a literal
/// charset string (possibly containing placeholder rules).
pub fn preset(name: &str) -> Option<String> {
    let resolved = match name {
        "digits" => DIGITS.to_string(),
        "alpha" | "mixed" => [LOWERCASE, UPPERCASE].concat(),
        "password" => [LOWERCASE, UPPERCASE, DIGITS, "!@#$%^&*"].concat(),
        "full" => [LOWERCASE, UPPERCASE, DIGITS, SPECIAL].concat(),
        "lowercase" => LOWERCASE.to_string(),
        "uppercase" => UPPERCASE.to_string(),
        "alphanumeric" => [LOWERCASE, UPPERCASE, DIGITS].concat(),
        "special" => SPECIAL.to_string(),
        "printable" => PRINTABLE.to_string(),
        "hex" => HEX.to_string(),
        "base64" => BASE64.to_string(),
        _ => return None,
    };
    Some(resolved)
}

fn placeholder(rule: char) -> Option<&'static str> {
    match rule {
        'l' => Some(LOWERCASE),
        'u' => Some(UPPERCASE),
        'd' => Some(DIGITS),
        's' => Some(SPECIAL),
        'a' => Some(PRINTABLE),
        _ => None,
    }
}

/// Resolve a charset specification into a working alphabet: a preset name
/// resolves to its table, anything else gets `?l ?u ?d ?s ?a` placeholders
/// expanded. Duplicates are removed, first occurrence wins.
pub fn resolve(spec: &str) -> Result<Vec<char>> {
    let expanded = match preset(spec) {
        Some(p) => p,
        None => expand_placeholders(spec),
    };

    let expanded_len = expanded.chars().count();
    if expanded_len > MAX_EXPANDED_LEN {
        return Err(Error::InvalidCharset(format!(
            "{} characters after expansion (max: {})",
            expanded_len, MAX_EXPANDED_LEN
        )));
    }

    let mut alphabet: Vec<char> = Vec::new();
    for c in expanded.chars() {
        if !alphabet.contains(&c) {
            alphabet.push(c);
        }
    }

    if alphabet.is_empty() {
        return Err(Error::InvalidCharset(
            "empty after expansion".to_string(),
        ));
    }

    Ok(alphabet)
}

fn expand_placeholders(spec: &str) -> String {
    let mut out = String::new();
    let mut chars = spec.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '?' {
            if let Some(class) = chars.peek().copied().and_then(placeholder) {
                chars.next();
                out.push_str(class);
                continue;
            }
        }
        out.push(c);
    }
    out
}
