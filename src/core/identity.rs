//! Risk identity using prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Prefix carried by every risk identifier
pub const RISK_PREFIX: &str = "RISK";

/// A unique risk identifier: `RISK-<ULID>`
///
/// Identifiers are minted once, when a record enters the register, and are
/// never recycled: a ULID carries 80 random bits on top of its timestamp, so a
/// deleted id cannot come back through a later add or import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RiskId {
    ulid: Ulid,
}

impl RiskId {
    /// Mint a fresh identifier
    pub fn new() -> Self {
        Self { ulid: Ulid::new() }
    }

    /// Build an identifier from an existing ULID
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self { ulid }
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse a RiskId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl Default for RiskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RiskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", RISK_PREFIX, self.ulid)
    }
}

impl FromStr for RiskId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        if !prefix.eq_ignore_ascii_case(RISK_PREFIX) {
            return Err(IdParseError::InvalidPrefix(prefix.to_string()));
        }

        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { ulid })
    }
}

impl Serialize for RiskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RiskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing risk IDs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid risk id prefix: '{0}' (expected RISK)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in risk id: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}
