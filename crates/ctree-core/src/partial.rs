//! Stage-0 construction: placing the encoded partial-product rows on the
//! bit heap.

use crate::bit::{Bit, BitKind};
use crate::config::{Config, Encoding};
use crate::error::{Error, Result};
use crate::heap::BitHeap;

/// Name of bit `bit` of partial-product row `row`, as exposed on the `pp`
/// input port.
pub fn pp_name(row: usize, bit: usize) -> String {
    format!("pp[{row}][{bit}]")
}

/// Name of the complement bit of Booth row `row`, as exposed on the `cpl`
/// input port.
pub fn cpl_name(row: usize) -> String {
    format!("cpl[{row}]")
}

/// Build the stage-0 heap for the given configuration.
pub fn build_initial(config: &Config) -> Result<BitHeap> {
    config.validate()?;
    let mut heap = BitHeap::new(config.product_width());
    match (config.encoding, config.unsigned) {
        (Encoding::Binary, true) => unsigned_binary(&mut heap, config.width, config.num_pp()),
        (Encoding::Binary, false) => baugh_wooley(&mut heap, config.width),
        (Encoding::Booth, false) => booth(&mut heap, config.width, config.num_pp()),
        (Encoding::Booth, true) => return Err(Error::UnsignedBooth),
    }
    Ok(heap)
}

/// Row `i` occupies columns `i ..= i + w - 1`, every bit plain.
fn unsigned_binary(heap: &mut BitHeap, width: usize, num_pp: usize) {
    for row in 0..num_pp {
        for bit in 0..width {
            heap.add_bit(row + bit, Bit::normal(pp_name(row, bit)));
        }
    }
}

/// Baugh-Wooley signed placement: the sign-extension rows are replaced by
/// local MSB inversion (all-but-MSB inversion on the last row) plus two
/// constant correction bits, at columns `w` and `2w - 1`.
///
/// The row structure is derived from the width alone; an explicit
/// partial-product override does not apply here.
fn baugh_wooley(heap: &mut BitHeap, width: usize) {
    for row in 0..width.saturating_sub(1) {
        for bit in 0..width - 1 {
            heap.add_bit(row + bit, Bit::normal(pp_name(row, bit)));
        }
        heap.add_bit(
            row + width - 1,
            Bit::new(pp_name(row, width - 1), BitKind::InvertedMsb),
        );
    }

    // Last row: b[w-1] is the sign bit, so all bits except its own MSB are
    // the inverted ones.
    let last = width - 1;
    for bit in 0..width - 1 {
        heap.add_bit(last + bit, Bit::new(pp_name(last, bit), BitKind::InvertedMsb));
    }
    heap.add_bit(last + width - 1, Bit::normal(pp_name(last, width - 1)));

    heap.add_bit(width, Bit::one());
    heap.add_bit(2 * width - 1, Bit::one());
}

/// Booth radix-4 signed placement: row `i` holds the one's-complemented
/// multiple at columns `2i ..= 2i + w - 1` with its sign bit inverted at
/// `2i + w`, the complement bit at the row's least-significant column `2i`,
/// and the per-row sign extension folded into one constant bit pattern.
fn booth(heap: &mut BitHeap, width: usize, num_pp: usize) {
    for row in 0..num_pp {
        let offset = 2 * row;
        for bit in 0..width {
            heap.add_bit(offset + bit, Bit::normal(pp_name(row, bit)));
        }
        heap.add_bit(
            offset + width,
            Bit::new(pp_name(row, width), BitKind::InvertedMsb),
        );
        heap.add_bit(offset, Bit::normal(cpl_name(row)));
    }

    for column in booth_correction_columns(width, num_pp) {
        heap.add_bit(column, Bit::one());
    }
}

/// Columns of the Booth sign-extension correction constant,
/// `(2^{2w} - sum_i 2^{w + 2i}) mod 2^{2w}`.
///
/// Inverting each row's sign bit leaves an excess `2^{2i + w}` per row; the
/// folded two's-complement negation of those excesses is a fixed bit pattern
/// injected as literal ones.
pub fn booth_correction_columns(width: usize, num_pp: usize) -> Vec<usize> {
    let prod_width = 2 * width;

    // ~S over prod_width bits, S sparse at the inverted-MSB columns.
    let mut bits = vec![true; prod_width];
    for row in 0..num_pp {
        let pos = width + 2 * row;
        if pos < prod_width {
            bits[pos] = false;
        }
    }

    // +1, carry rippling from the bottom; overflow past the product width
    // wraps away.
    let mut carry = true;
    for bit in &mut bits {
        let sum = *bit != carry;
        carry = *bit && carry;
        *bit = sum;
        if !carry {
            break;
        }
    }

    bits.iter()
        .enumerate()
        .filter_map(|(pos, &set)| set.then_some(pos))
        .collect()
}
