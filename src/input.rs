use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// What the caller handed us: one domain, several, or a file with one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainInput {
    Single(String),
    List(Vec<String>),
    File(PathBuf),
}

impl DomainInput {
    /// Strings ending in `.txt` name a domain file, anything else is a domain.
    pub fn from_arg(arg: &str) -> Self {
        if is_txt(Path::new(arg)) {
            DomainInput::File(PathBuf::from(arg))
        } else {
            DomainInput::Single(arg.to_string())
        }
    }

    /// Lowercased, trimmed domain list.
    pub fn normalize(&self) -> Result<Vec<String>> {
        match self {
            DomainInput::Single(d) => Ok(vec![normalize_domain(d)]),
            DomainInput::List(ds) => Ok(ds.iter().map(|d| normalize_domain(d)).collect()),
            DomainInput::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open domain file {}", path.display()))?;
                read_domains(BufReader::new(file))
                    .with_context(|| format!("Failed to read domain file {}", path.display()))
            }
        }
    }
}

impl From<&str> for DomainInput {
    fn from(s: &str) -> Self {
        DomainInput::from_arg(s)
    }
}

impl From<String> for DomainInput {
    fn from(s: String) -> Self {
        DomainInput::from_arg(&s)
    }
}

impl From<Vec<String>> for DomainInput {
    fn from(v: Vec<String>) -> Self {
        DomainInput::List(v)
    }
}

impl From<&[&str]> for DomainInput {
    fn from(v: &[&str]) -> Self {
        DomainInput::List(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<PathBuf> for DomainInput {
    fn from(p: PathBuf) -> Self {
        DomainInput::File(p)
    }
}

#[inline]
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}

/// One domain per line; blank lines are skipped.
pub fn read_domains<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut domains = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let domain = normalize_domain(&line);
        if !domain.is_empty() {
            domains.push(domain);
        }
    }
    Ok(domains)
}

pub(crate) fn is_txt(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "txt")
}
