//! Numeric value types shared by the record model and the recalculation engine
//!
//! The register displays probabilities as `"35%"` and ranks as `"1"` or `"-"`.
//! Internally both are numbers; the string forms exist only at the
//! serialization and command-line boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a monetary amount, treating anything unparseable as zero
pub fn parse_amount(raw: &str) -> f64 {
    try_parse_amount(raw).unwrap_or(0.0)
}

/// Parse a monetary amount, returning `None` when the text is not a finite number
pub fn try_parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a percentage such as `"35%"`, `"35"` or `"12.5 %"`
///
/// Returns `None` for empty or non-numeric text.
pub fn try_parse_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    try_parse_amount(number)
}

/// A percentage value, e.g. a probability of occurrence
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percent(f64);

impl Percent {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// The percentage as a fraction (`35%` -> `0.35`)
    pub fn fraction(&self) -> f64 {
        self.0 / 100.0
    }

    /// Parse display text; malformed text yields `None`
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        try_parse_percent(raw).map(Self)
    }
}

/// Fraction of an optional percentage, where unset counts as zero
pub fn fraction_of(pct: Option<Percent>) -> f64 {
    pct.map_or(0.0, |p| p.fraction())
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", format_number(self.0))
    }
}

impl FromStr for Percent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| format!("Invalid percentage: {}", s))
    }
}

impl Serialize for Percent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Percent(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A rank within a nature partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    /// 1-based position, 1 = most significant
    Position(u32),
    /// Outside every ranked partition, displayed as `-`
    Unranked,
}

impl Rank {
    /// Rank for a zero-based sorted index
    pub fn from_index(index: usize) -> Self {
        Rank::Position(u32::try_from(index + 1).unwrap_or(u32::MAX))
    }

    pub fn position(&self) -> Option<u32> {
        match self {
            Rank::Position(n) => Some(*n),
            Rank::Unranked => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Position(n) => write!(f, "{}", n),
            Rank::Unranked => write!(f, "-"),
        }
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-" || s.eq_ignore_ascii_case(UNRANKED_KEYWORD) {
            return Ok(Rank::Unranked);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Rank::Position(n)),
            _ => Err(format!("Invalid rank: {}", s)),
        }
    }
}

/// Stored form of [`Rank::Unranked`]; a bare `-` reads back as a YAML
/// sequence marker
const UNRANKED_KEYWORD: &str = "unranked";

impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Rank::Position(n) => serializer.serialize_str(&n.to_string()),
            Rank::Unranked => serializer.serialize_str(UNRANKED_KEYWORD),
        }
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(0) => Err(serde::de::Error::custom("rank must be at least 1")),
            Raw::Number(n) => Ok(Rank::Position(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Display an optional rank the way the register grid shows it
pub fn format_rank(rank: Option<Rank>) -> String {
    rank.map(|r| r.to_string()).unwrap_or_default()
}

/// Format a number without a trailing `.0` for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Format a monetary amount with two decimals and thousands separators
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative && value != 0.0 {
        format!("-{}.{}", grouped, frac_part)
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}
