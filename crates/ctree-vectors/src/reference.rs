//! Independent numeric reference models for the partial-product encoders.
//!
//! These mirror what the hardware encoder blocks compute and are used both
//! to drive the structural evaluator and to emit simulation vectors.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

/// Booth radix-4 decode: 3-bit window `{b[2i+1], b[2i], b[2i-1]}` to the
/// selected multiple of the multiplicand.
pub fn booth_decode(window: u8) -> i8 {
    match window & 0b111 {
        0b000 | 0b111 => 0,
        0b001 | 0b010 => 1,
        0b011 => 2,
        0b100 => -2,
        _ => -1, // 0b101, 0b110
    }
}

/// One Booth row as the encoder emits it: the selected multiple in `w + 1`
/// bits, one's-complemented for negative digits, plus the complement bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoothRow {
    pub pp: BigUint,
    pub cpl: bool,
}

/// Signed Booth radix-4 rows for `a * b` at the given operand width.
pub fn booth_rows_signed(a: &BigUint, b: &BigUint, width: usize) -> Vec<BoothRow> {
    let num_pp = (width + 1) / 2;
    let mask = (BigUint::one() << (width + 1)) - BigUint::one();
    let a_ext = sign_extend(a, width, width + 1);
    let a_twice = (a.clone() << 1u32) & &mask;

    // Multiplier bit with a zero below bit 0 and the sign bit replicated
    // above the top.
    let b_bit = |i: isize| -> bool {
        if i < 0 {
            false
        } else if (i as usize) < width {
            b.bit(i as u64)
        } else {
            b.bit(width as u64 - 1)
        }
    };

    (0..num_pp)
        .map(|row| {
            let r = row as isize;
            let window = (u8::from(b_bit(2 * r + 1)) << 2)
                | (u8::from(b_bit(2 * r)) << 1)
                | u8::from(b_bit(2 * r - 1));
            let (pp, cpl) = match window {
                0b000 => (BigUint::zero(), false),
                0b001 | 0b010 => (a_ext.clone(), false),
                0b011 => (a_twice.clone(), false),
                0b100 => (&mask ^ &a_twice, true),
                0b101 | 0b110 => (&mask ^ &a_ext, true),
                _ => (mask.clone(), true), // 0b111: negated zero
            };
            BoothRow { pp, cpl }
        })
        .collect()
}

/// Binary rows: row `i` is the multiplicand gated by multiplier bit `i`,
/// unshifted (the heap's column placement carries the weight).
pub fn binary_rows(a: &BigUint, b: &BigUint, width: usize, num_pp: usize) -> Vec<BigUint> {
    (0..num_pp)
        .map(|row| {
            if row < width && b.bit(row as u64) {
                a.clone()
            } else {
                BigUint::zero()
            }
        })
        .collect()
}

/// The exact product in the `2w`-bit output field, unsigned or
/// two's-complement.
pub fn expected_product(a: &BigUint, b: &BigUint, width: usize, unsigned: bool) -> BigUint {
    let modulus = BigInt::one() << (2 * width);
    let product = if unsigned {
        BigInt::from(a.clone()) * BigInt::from(b.clone())
    } else {
        to_signed(a, width) * to_signed(b, width)
    };
    let wrapped = ((product % &modulus) + &modulus) % &modulus;
    wrapped.to_biguint().unwrap()
}

fn to_signed(x: &BigUint, width: usize) -> BigInt {
    if x.bit(width as u64 - 1) {
        BigInt::from(x.clone()) - (BigInt::one() << width)
    } else {
        BigInt::from(x.clone())
    }
}

fn sign_extend(x: &BigUint, from: usize, to: usize) -> BigUint {
    let mut extended = x.clone();
    if x.bit(from as u64 - 1) {
        for bit in from..to {
            extended.set_bit(bit as u64, true);
        }
    }
    extended
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(x: u64) -> BigUint {
        BigUint::from(x)
    }

    #[test]
    fn test_booth_decode_table() {
        assert_eq!(booth_decode(0b000), 0);
        assert_eq!(booth_decode(0b001), 1);
        assert_eq!(booth_decode(0b010), 1);
        assert_eq!(booth_decode(0b011), 2);
        assert_eq!(booth_decode(0b100), -2);
        assert_eq!(booth_decode(0b101), -1);
        assert_eq!(booth_decode(0b110), -1);
        assert_eq!(booth_decode(0b111), 0);
    }

    #[test]
    fn test_booth_rows_row_count() {
        assert_eq!(booth_rows_signed(&big(0), &big(0), 8).len(), 4);
        assert_eq!(booth_rows_signed(&big(0), &big(0), 5).len(), 3);
    }

    #[test]
    fn test_booth_row_values() {
        // a = 5, b = 3 at w = 4: windows are {b1,b0,0} = 110 (-1) and
        // {b3,b2,b1} = 001 (+1).
        let rows = booth_rows_signed(&big(5), &big(3), 4);
        assert_eq!(rows[0], BoothRow { pp: big(0b11010), cpl: true });
        assert_eq!(rows[1], BoothRow { pp: big(0b00101), cpl: false });
    }

    #[test]
    fn test_booth_negated_zero() {
        // b = -1: every window above the first is 111.
        let rows = booth_rows_signed(&big(1), &big(0xF), 4);
        assert_eq!(rows[1], BoothRow { pp: big(0b11111), cpl: true });
    }

    #[test]
    fn test_binary_rows_gate_on_multiplier_bits() {
        let rows = binary_rows(&big(0b1011), &big(0b0101), 4, 4);
        assert_eq!(rows, vec![big(0b1011), big(0), big(0b1011), big(0)]);
    }

    #[test]
    fn test_expected_product_signed_wraps() {
        // -5 * 3 = -15 in a 16-bit field.
        assert_eq!(expected_product(&big(251), &big(3), 8, false), big(65521));
        // -8 * -8 = 64 at w = 4.
        assert_eq!(expected_product(&big(8), &big(8), 4, false), big(64));
        assert_eq!(expected_product(&big(8), &big(8), 4, true), big(64));
    }
}
