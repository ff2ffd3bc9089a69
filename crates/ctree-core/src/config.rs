use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Partial-product encoding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    /// Radix-2 binary: one row per multiplier bit.
    Binary,
    /// Radix-4 Booth: one row per 3-bit multiplier window, signed only.
    Booth,
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Binary => f.write_str("binary"),
            Encoding::Booth => f.write_str("booth"),
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "binary" => Ok(Encoding::Binary),
            "booth" => Ok(Encoding::Booth),
            _ => Err(format!("unknown encoding `{s}` (expected binary or booth)")),
        }
    }
}

/// Reduction scheduling heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// As-late-as-possible scheduling against the Dadda height sequence.
    Dadda,
    /// As-soon-as-possible greedy scheduling (Bickerstaff).
    Bickerstaff,
    /// Full adders only, no target heights.
    FaOnly,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Dadda => f.write_str("dadda"),
            Algorithm::Bickerstaff => f.write_str("bickerstaff"),
            Algorithm::FaOnly => f.write_str("fa-only"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dadda" => Ok(Algorithm::Dadda),
            "bickerstaff" => Ok(Algorithm::Bickerstaff),
            "fa-only" | "faonly" => Ok(Algorithm::FaOnly),
            _ => Err(format!(
                "unknown algorithm `{s}` (expected dadda, bickerstaff, or fa-only)"
            )),
        }
    }
}

/// Build configuration for one reduction model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Operand width in bits, >= 1.
    pub width: usize,
    /// Number of partial-product rows; derived from the encoding if absent.
    pub num_partial_products: Option<usize>,
    pub unsigned: bool,
    pub encoding: Encoding,
    pub algorithm: Algorithm,
    /// Accepted and reported but currently inert: the signed-binary builder
    /// always applies the optimized invert+extend placement. See DESIGN.md.
    pub sign_ext_opt: bool,
}

impl Config {
    pub fn new(width: usize, encoding: Encoding, algorithm: Algorithm) -> Config {
        Config {
            width,
            num_partial_products: None,
            unsigned: false,
            encoding,
            algorithm,
            sign_ext_opt: true,
        }
    }

    pub fn with_unsigned(mut self, unsigned: bool) -> Config {
        self.unsigned = unsigned;
        self
    }

    pub fn with_num_partial_products(mut self, num_pp: Option<usize>) -> Config {
        self.num_partial_products = num_pp;
        self
    }

    pub fn with_sign_ext_opt(mut self, sign_ext_opt: bool) -> Config {
        self.sign_ext_opt = sign_ext_opt;
        self
    }

    /// Reject unsupported combinations before any heap is built.
    pub fn validate(&self) -> Result<()> {
        if self.width < 1 {
            return Err(Error::InvalidWidth(self.width));
        }
        if self.encoding == Encoding::Booth && self.unsigned {
            return Err(Error::UnsignedBooth);
        }
        Ok(())
    }

    /// Number of partial-product rows: `w` for binary, `ceil((w + 1) / 2)`
    /// for Booth, unless overridden.
    pub fn num_pp(&self) -> usize {
        match self.num_partial_products {
            Some(n) => n,
            None => match self.encoding {
                Encoding::Binary => self.width,
                Encoding::Booth => (self.width + 1) / 2,
            },
        }
    }

    /// Product width, fixed at twice the operand width.
    pub fn product_width(&self) -> usize {
        2 * self.width
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new(16, Encoding::Booth, Algorithm::Dadda)
    }
}
