//! IMSI handling
//!
//! IMSIs arrive from S6a and SGsAP as ASCII digit strings. They are packed into
//! a single `u64` for context lookup: one BCD nibble per digit, least significant
//! nibble first, with the digit count in the top nibble. Fifteen digits use 60
//! bits, so the count always fits and "001..." never collides with "1...".

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Maximum number of IMSI digits
pub const OGS_MAX_IMSI_BCD_LEN: usize = 15;

const DIGIT_COUNT_SHIFT: u32 = 60;

/// IMSI validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImsiError {
    #[error("IMSI is empty")]
    Empty,

    #[error("IMSI has {len} digits, at most 15 allowed")]
    TooLong { len: usize },

    #[error("IMSI has non-digit {ch:?} at position {position}")]
    NonDigit { position: usize, ch: char },
}

/// IMSI result type
pub type ImsiResult<T> = Result<T, ImsiError>;

/// Packed IMSI
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Imsi(u64);

impl Imsi {
    /// Parse an IMSI from its BCD digit string
    pub fn from_bcd(bcd: &str) -> ImsiResult<Self> {
        if bcd.is_empty() {
            return Err(ImsiError::Empty);
        }

        let len = bcd.chars().count();
        if len > OGS_MAX_IMSI_BCD_LEN {
            return Err(ImsiError::TooLong { len });
        }

        let mut packed = (len as u64) << DIGIT_COUNT_SHIFT;
        for (position, ch) in bcd.chars().enumerate() {
            let digit = ch
                .to_digit(10)
                .ok_or(ImsiError::NonDigit { position, ch })?;
            packed |= u64::from(digit) << (4 * position);
        }

        Ok(Self(packed))
    }

    /// Fixed-width lookup key
    pub fn packed(&self) -> u64 {
        self.0
    }

    /// Number of digits
    pub fn num_digits(&self) -> usize {
        (self.0 >> DIGIT_COUNT_SHIFT) as usize
    }

    /// Digit at `index`, if present
    pub fn digit(&self, index: usize) -> Option<u8> {
        (index < self.num_digits()).then(|| ((self.0 >> (4 * index)) & 0xf) as u8)
    }

    /// Back to the BCD digit string
    pub fn to_bcd(&self) -> String {
        (0..self.num_digits())
            .filter_map(|i| self.digit(i))
            .map(|d| char::from(b'0' + d))
            .collect()
    }
}

impl FromStr for Imsi {
    type Err = ImsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bcd(s)
    }
}

impl fmt::Display for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bcd())
    }
}

impl fmt::Debug for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imsi({})", self.to_bcd())
    }
}
