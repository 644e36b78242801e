use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})\.(\d{1,2})\.(\d{1,2})$").expect("pattern compiles"));

/// A game date.
///
/// The cached zero-padded key makes comparison lexicographic, so sorting
/// dates agrees with chronological order; `Display` prints the unpadded
/// `Y.M.D` form the files use.
#[derive(Debug, Clone)]
pub struct DateVal {
    y: u32,
    m: u32,
    d: u32,
    canonical: String,
}

impl DateVal {
    pub fn new(y: u32, m: u32, d: u32) -> Self {
        let canonical = format!("{y:04}.{m:02}.{d:02}");
        Self { y, m, d, canonical }
    }

    pub fn year(&self) -> u32 {
        self.y
    }

    pub fn month(&self) -> u32 {
        self.m
    }

    pub fn day(&self) -> u32 {
        self.d
    }

    /// Zero-padded sort key, e.g. `0867.01.01`.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl PartialEq for DateVal {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for DateVal {}

impl PartialOrd for DateVal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateVal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for DateVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.y, self.m, self.d)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid Y.M.D date")]
pub struct ParseDateError(pub String);

impl FromStr for DateVal {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = DATE.captures(s).ok_or_else(|| ParseDateError(s.to_string()))?;
        let part = |i: usize| {
            caps[i]
                .parse::<u32>()
                .expect("capture group is 1-4 digits")
        };
        Ok(Self::new(part(1), part(2), part(3)))
    }
}
