//! Domain validation and whitelisting for the strict classification mode.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::DgaError;

const SUFFIX_PATTERN: &str = r"[a-z]+\.[a-z]+$";

fn suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SUFFIX_PATTERN).expect("suffix pattern is valid"))
}

/// Returns the trailing `label.tld` of a domain, ignoring trailing slashes.
///
/// `mail.google.com/` yields `google.com`; `localhost` or `host.co1` fail.
pub fn registrable_suffix(domain: &str) -> Result<&str, DgaError> {
    let trimmed = domain.trim_matches('/');
    suffix_regex()
        .find(trimmed)
        .map(|m| m.as_str())
        .ok_or_else(|| DgaError::InvalidDomain(domain.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    entries: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Matches either the full `label.tld` suffix or the bare top-level label.
    pub fn clears(&self, suffix: &str) -> bool {
        if self.entries.contains(suffix) {
            return true;
        }
        suffix
            .rsplit('.')
            .next()
            .map_or(false, |tld| self.entries.contains(tld))
    }
}
