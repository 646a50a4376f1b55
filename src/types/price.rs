use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::{Error, Result};

/// Integer fixed-point price as carried in the ledger payload.
///
/// The scale is not stored; callers pass the same `scale` they converted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerPrice(i64);

impl LedgerPrice {
    pub const DEFAULT_SCALE: u32 = 100;

    /// Scale then round half up. Non-finite, non-positive and out-of-range
    /// results are rejected.
    pub fn from_consensus(value: f64, scale: u32) -> Result<Self> {
        let scaled = value * scale as f64;
        if !scaled.is_finite() {
            return Err(Error::ConsensusInvalid(format!(
                "non-finite price {} at scale {}",
                value, scale
            )));
        }

        let rounded = (scaled + 0.5).floor();
        if rounded <= 0.0 {
            return Err(Error::ConsensusInvalid(format!(
                "price {} rounds to {} at scale {}",
                value, rounded, scale
            )));
        }
        if rounded >= i64::MAX as f64 {
            return Err(Error::ConsensusInvalid(format!(
                "price {} overflows at scale {}",
                value, scale
            )));
        }

        Ok(LedgerPrice(rounded as i64))
    }

    pub fn from_i64(value: i64) -> Self {
        LedgerPrice(value)
    }

    pub fn to_i64(&self) -> i64 {
        self.0
    }

    pub fn to_f64(&self, scale: u32) -> f64 {
        self.0 as f64 / scale as f64
    }
}

impl fmt::Display for LedgerPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
