//! Structural evaluation of a built model on concrete operands.
//!
//! Assigns the reference encoder outputs to the stage-0 input names, executes
//! every recorded cell in placement order, and reads the final `sum`/`carry`
//! rows back. Adding the two rows must reproduce the exact product; the
//! end-to-end tests rely on this.

use crate::reference;
use anyhow::{bail, Context, Result};
use ctree_core::partial::{cpl_name, pp_name};
use ctree_core::{Bit, BitKind, Encoding, ReductionModel};
use num_bigint::BigUint;
use num_traits::Zero;
use std::collections::HashMap;

/// The two output rows of the final stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub sum: BigUint,
    pub carry: BigUint,
    product_width: usize,
}

impl Evaluation {
    /// `sum + carry` through an ordinary binary adder, in the product field.
    pub fn product(&self) -> BigUint {
        (&self.sum + &self.carry) % (BigUint::from(1u8) << self.product_width)
    }
}

fn resolve(values: &HashMap<String, bool>, bit: &Bit) -> Result<bool> {
    if bit.is_literal_one() {
        return Ok(true);
    }
    let value = values
        .get(bit.name())
        .copied()
        .with_context(|| format!("bit `{}` has no assigned value", bit.name()))?;
    Ok(value != (bit.kind() == BitKind::InvertedMsb))
}

pub fn evaluate(model: &ReductionModel, a: &BigUint, b: &BigUint) -> Result<Evaluation> {
    let config = model.config();
    let mut values: HashMap<String, bool> = HashMap::new();

    match config.encoding {
        Encoding::Binary => {
            let rows = reference::binary_rows(a, b, config.width, config.num_pp());
            for (row, value) in rows.iter().enumerate() {
                for bit in 0..config.width {
                    values.insert(pp_name(row, bit), value.bit(bit as u64));
                }
            }
        }
        Encoding::Booth => {
            let rows = reference::booth_rows_signed(a, b, config.width);
            for (row, booth) in rows.iter().enumerate() {
                for bit in 0..=config.width {
                    values.insert(pp_name(row, bit), booth.pp.bit(bit as u64));
                }
                values.insert(cpl_name(row), booth.cpl);
            }
        }
    }

    for cell in model.cells() {
        let mut ones = 0;
        for input in &cell.inputs {
            if resolve(&values, input)? {
                ones += 1;
            }
        }
        values.insert(cell.sum_name(), ones % 2 == 1);
        values.insert(cell.carry_name(), ones >= 2);
    }

    let final_heap = model.final_stage();
    let mut sum = BigUint::zero();
    let mut carry = BigUint::zero();
    for col in 0..final_heap.width() {
        let bits = final_heap.column(col).bits();
        if bits.len() > 2 {
            bail!("final stage column {col} holds {} bits", bits.len());
        }
        if let Some(bit) = bits.first() {
            if resolve(&values, bit)? {
                sum.set_bit(col as u64, true);
            }
        }
        if let Some(bit) = bits.get(1) {
            if resolve(&values, bit)? {
                carry.set_bit(col as u64, true);
            }
        }
    }

    Ok(Evaluation {
        sum,
        carry,
        product_width: config.product_width(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::expected_product;
    use ctree_core::{Algorithm, Config};

    fn check(config: Config, a: u64, b: u64) {
        let model = ReductionModel::build(config.clone()).unwrap();
        let a = BigUint::from(a);
        let b = BigUint::from(b);
        let result = evaluate(&model, &a, &b).unwrap();
        assert_eq!(
            result.product(),
            expected_product(&a, &b, config.width, config.unsigned),
            "{config:?} a={a} b={b} sum={} carry={}",
            result.sum,
            result.carry,
        );
    }

    #[test]
    fn test_width4_unsigned_dadda_end_to_end() {
        let config = Config::new(4, Encoding::Binary, Algorithm::Dadda).with_unsigned(true);
        let model = ReductionModel::build(config).unwrap();
        let result = evaluate(&model, &BigUint::from(5u8), &BigUint::from(3u8)).unwrap();
        assert_eq!(result.product(), BigUint::from(15u8));
    }

    #[test]
    fn test_width8_booth_bickerstaff_end_to_end() {
        // a = -5, b = 3 in two's complement: product is -15 in the 16-bit
        // field.
        let config = Config::new(8, Encoding::Booth, Algorithm::Bickerstaff);
        let model = ReductionModel::build(config).unwrap();
        let result = evaluate(&model, &BigUint::from(251u16), &BigUint::from(3u8)).unwrap();
        assert_eq!(result.product(), BigUint::from(65521u32));
    }

    #[test]
    fn test_exhaustive_small_widths() {
        for width in [3usize, 4] {
            for algorithm in [Algorithm::Dadda, Algorithm::Bickerstaff, Algorithm::FaOnly] {
                let configs = [
                    Config::new(width, Encoding::Binary, algorithm).with_unsigned(true),
                    Config::new(width, Encoding::Binary, algorithm),
                    Config::new(width, Encoding::Booth, algorithm),
                ];
                for config in configs {
                    for a in 0..1u64 << width {
                        for b in 0..1u64 << width {
                            check(config.clone(), a, b);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_wide_booth_spot_checks() {
        let config = Config::new(16, Encoding::Booth, Algorithm::Dadda);
        // -32768 * -32768, -1 * -1, mixed signs.
        for (a, b) in [(0x8000, 0x8000), (0xFFFF, 0xFFFF), (0x8000, 3), (1234, 0xFFF0)] {
            check(config.clone(), a, b);
        }
    }

    #[test]
    fn test_wide_baugh_wooley_spot_checks() {
        let config = Config::new(16, Encoding::Binary, Algorithm::Bickerstaff);
        for (a, b) in [(0x8000, 0x7FFF), (0xFFFF, 1), (0xABCD, 0x1234)] {
            check(config.clone(), a, b);
        }
    }

    #[test]
    fn test_minimum_width() {
        for unsigned in [true, false] {
            let config =
                Config::new(1, Encoding::Binary, Algorithm::Dadda).with_unsigned(unsigned);
            for a in 0..2u64 {
                for b in 0..2u64 {
                    check(config.clone(), a, b);
                }
            }
        }
    }
}
