use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The claimed source recorded for a card that arrives in escrow without anyone having claimed it first.
pub const UNKNOWN_SOURCE: &str = "unknown_source";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid identifier: {0}")]
pub struct IdParseError(String);

//--------------------------------------       CardId        ---------------------------------------------------------
/// Opaque identifier for one physical card token issued by the game.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for CardId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------      PlayerId       ---------------------------------------------------------
/// A player's username. Comparison is case-sensitive and no normalization is performed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for PlayerId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------       TradeId       ---------------------------------------------------------
/// Sequence-assigned trade identifier. Rendered in plain decimal on the wire, and only accepted in that same canonical
/// form: no padding, no sign, no leading zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(u64);

impl TradeId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TradeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for TradeId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>().map_err(|e| IdParseError(format!("'{s}' is not a trade id. {e}")))?;
        if id.to_string() != s {
            return Err(IdParseError(format!("'{s}' is not a canonical trade id. Expected '{id}'")));
        }
        Ok(Self(id))
    }
}

impl Display for TradeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
