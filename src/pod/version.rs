//! Dotted OS version numbers
//!
//! Deployment targets are short dotted strings like `6.0` or `10.8`. Compared
//! numerically component by component, with missing components treated as zero.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A dotted numeric version such as `10.8` or `9.0.1`
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    components: Vec<u32>,
    raw: String,
}

impl Version {
    pub fn new(components: &[u32]) -> Self {
        let raw = components
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Version {
            components: components.to_vec(),
            raw,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let components: Option<Vec<u32>> =
            trimmed.split('.').map(|part| part.parse().ok()).collect();
        components.map(|components| Version {
            components,
            raw: trimmed.to_string(),
        })
    }

    fn component(&self, index: usize) -> u32 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for index in 0..len {
            match self.component(index).cmp(&other.component(index)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s).ok_or_else(|| format!("invalid version: {s}"))
    }
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.raw
    }
}
