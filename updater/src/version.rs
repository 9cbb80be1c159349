//! Ordering of Maven version strings for "latest wins" selection.
//!
//! Versions are split into numeric and textual tokens. Separators (`.`, `-`,
//! `_`, `+`) and digit/letter boundaries end a token, so `1.2.0-beta01`
//! becomes `1 2 0 beta 1`. Numeric tokens compare by value, textual tokens
//! compare case-insensitively, and a numeric token outranks a textual one in
//! the same position. When one version runs out of tokens, a trailing number
//! makes the longer version newer (`1.2` < `1.2.1`) while a trailing
//! qualifier makes it older (`1.2.0-rc01` < `1.2.0`).

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Digits with leading zeros stripped, compared by length then lexically.
    Number(String),
    Text(String),
}

impl Token {
    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Self::Number(trimmed.to_owned())
    }

    fn text(letters: &str) -> Self {
        Self::Text(letters.to_ascii_lowercase())
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A comparable Maven version.
///
/// Equality follows the ordering, so `1.02` and `1.2` are equal even though
/// they render differently.
///
/// # Examples
///
/// ```
/// use gmaven_updater::version::MavenVersion;
///
/// let beta = MavenVersion::new("1.2.0-beta01");
/// let release = MavenVersion::new("1.2.0");
/// let patch = MavenVersion::new("1.2.1");
/// assert!(beta < release);
/// assert!(release < patch);
/// ```
#[derive(Debug, Clone)]
pub struct MavenVersion {
    raw: String,
    tokens: Vec<Token>,
}

impl MavenVersion {
    /// Tokenize `raw` into a comparable version.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_owned(),
            tokens: tokenize(raw),
        }
    }

    /// The version exactly as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut ours = self.tokens.iter();
        let mut theirs = other.tokens.iter();
        loop {
            match (ours.next(), theirs.next()) {
                (Some(a), Some(b)) => match a.cmp(b) {
                    Ordering::Equal => {}
                    decided => return decided,
                },
                (None, None) => return Ordering::Equal,
                (Some(extra), None) => return trailing_order(extra),
                (None, Some(extra)) => return trailing_order(extra).reverse(),
            }
        }
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for MavenVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Compare two version strings.
///
/// # Examples
///
/// ```
/// use gmaven_updater::version::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("1.10.0", "1.9.3"), Ordering::Greater);
/// ```
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    MavenVersion::new(a).cmp(&MavenVersion::new(b))
}

/// Ordering of the longer version when it has `extra` beyond a shared prefix.
fn trailing_order(extra: &Token) -> Ordering {
    match extra {
        Token::Number(_) => Ordering::Greater,
        Token::Text(_) => Ordering::Less,
    }
}

fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for ch in raw.chars() {
        if !ch.is_ascii_alphanumeric() {
            flush(&mut tokens, &mut current, current_is_digit);
            continue;
        }
        let is_digit = ch.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            flush(&mut tokens, &mut current, current_is_digit);
        }
        current_is_digit = is_digit;
        current.push(ch);
    }
    flush(&mut tokens, &mut current, current_is_digit);
    tokens
}

fn flush(tokens: &mut Vec<Token>, current: &mut String, is_digit: bool) {
    if current.is_empty() {
        return;
    }
    let token = if is_digit {
        Token::number(current)
    } else {
        Token::text(current)
    };
    tokens.push(token);
    current.clear();
}
