//! # Block Height
//!
//! `"<chain-id>:<integer-height>"` composite version marker for on-chain
//! state. Heights observed by a single node for a single request must be
//! non-decreasing; transitions that hit the chain must strictly increase.

use crate::errors::HarnessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parsed block height.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHeight {
    /// Chain identifier, left of the `:`.
    pub chain_id: String,
    /// Integer height, right of the `:`.
    pub height: u64,
}

impl BlockHeight {
    /// Parse a `"<chain-id>:<height>"` string.
    ///
    /// Both halves must be non-empty and the height must parse as an
    /// unsigned integer. A chain id containing `:` keeps everything up to
    /// the last separator.
    pub fn parse(s: &str) -> Result<Self, HarnessError> {
        let (chain_id, height_str) =
            s.rsplit_once(':')
                .ok_or_else(|| HarnessError::MalformedBlockHeight {
                    value: s.to_string(),
                })?;
        if chain_id.is_empty() || height_str.is_empty() {
            return Err(HarnessError::MalformedBlockHeight {
                value: s.to_string(),
            });
        }
        let height =
            height_str
                .parse::<u64>()
                .map_err(|_| HarnessError::MalformedBlockHeight {
                    value: s.to_string(),
                })?;
        Ok(Self {
            chain_id: chain_id.to_string(),
            height,
        })
    }

    /// Strictly greater than `other` on the integer part.
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.height > other.height
    }

    /// Greater than or equal to `other` on the integer part.
    #[must_use]
    pub fn is_at_or_after(&self, other: &Self) -> bool {
        self.height >= other.height
    }
}

impl FromStr for BlockHeight {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.height)
    }
}
