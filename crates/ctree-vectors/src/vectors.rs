//! Simulation vector files for the emitted netlists.
//!
//! Writes the `.hex` operand/row/expected files and the `top.h` define
//! header the downstream testbenches consume. Operand selection is
//! hand-picked corner cases padded with deterministic pseudo-random pairs,
//! or the full operand cross product in exhaustive mode.

use crate::reference;
use anyhow::{bail, Result};
use ctree_core::{Config, Encoding};
use num_bigint::BigUint;
use num_traits::Zero;
use std::fs;
use std::path::Path;

/// Ceiling on exhaustive enumeration, to keep the vector files bounded.
const MAX_EXHAUSTIVE: u64 = 1 << 20;

#[derive(Debug, Clone)]
pub struct VectorSet {
    pub width: usize,
    pub encoding: Encoding,
    pub unsigned: bool,
    pub num_pp: usize,
    pub a: Vec<BigUint>,
    pub b: Vec<BigUint>,
    /// Row values per test, `num_pp` entries each.
    pub pps: Vec<Vec<BigUint>>,
    /// Complement bits per test; empty for binary encodings.
    pub cpls: Vec<Vec<bool>>,
    pub expected: Vec<BigUint>,
}

/// Generate a vector set for the given configuration.
pub fn generate(
    config: &Config,
    num_tests: usize,
    exhaustive: bool,
    seed: u64,
) -> Result<VectorSet> {
    config.validate()?;
    let width = config.width;

    let (a_vals, b_vals) = if exhaustive {
        if width > 10 || (1u64 << (2 * width)) > MAX_EXHAUSTIVE {
            bail!(
                "exhaustive mode for width {width} exceeds the {MAX_EXHAUSTIVE} vector limit"
            );
        }
        let mut a_vals = Vec::new();
        let mut b_vals = Vec::new();
        for a in 0..1u64 << width {
            for b in 0..1u64 << width {
                a_vals.push(BigUint::from(a));
                b_vals.push(BigUint::from(b));
            }
        }
        (a_vals, b_vals)
    } else {
        corner_and_random_operands(width, config.unsigned, num_tests, seed)
    };

    let num_pp = config.num_pp();
    let mut pps = Vec::with_capacity(a_vals.len());
    let mut cpls = Vec::with_capacity(a_vals.len());
    let mut expected = Vec::with_capacity(a_vals.len());

    for (a, b) in a_vals.iter().zip(&b_vals) {
        match config.encoding {
            Encoding::Booth => {
                let rows = reference::booth_rows_signed(a, b, width);
                pps.push(rows.iter().map(|r| r.pp.clone()).collect());
                cpls.push(rows.iter().map(|r| r.cpl).collect());
            }
            Encoding::Binary => {
                pps.push(reference::binary_rows(a, b, width, num_pp));
                cpls.push(Vec::new());
            }
        }
        expected.push(reference::expected_product(a, b, width, config.unsigned));
    }

    Ok(VectorSet {
        width,
        encoding: config.encoding,
        unsigned: config.unsigned,
        num_pp,
        a: a_vals,
        b: b_vals,
        pps,
        cpls,
        expected,
    })
}

fn corner_and_random_operands(
    width: usize,
    unsigned: bool,
    num_tests: usize,
    seed: u64,
) -> (Vec<BigUint>, Vec<BigUint>) {
    let max = (BigUint::from(1u8) << width) - 1u8;
    let msb = BigUint::from(1u8) << (width - 1);

    let mut a_vals = vec![BigUint::zero(), max.clone()];
    let mut b_vals = vec![BigUint::zero(), max.clone()];
    if unsigned {
        a_vals.extend([BigUint::from(1u8), max.clone()]);
        b_vals.extend([BigUint::from(1u8), BigUint::from(1u8)]);
    } else {
        // Sign boundaries: minimum, one, maximum positive.
        a_vals.extend([msb.clone(), BigUint::from(1u8), &msb - 1u8]);
        b_vals.extend([BigUint::from(1u8), msb.clone(), &msb - 1u8]);
    }

    let mut rng = XorShift64::new(seed);
    while a_vals.len() < num_tests {
        a_vals.push(rng.operand(width));
        b_vals.push(rng.operand(width));
    }

    (a_vals, b_vals)
}

/// Write the `.hex` files the compressor-tree testbench reads.
pub fn write_hex_files(set: &VectorSet, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let row_digits = (2 * set.width + 3) / 4;
    let operand_digits = (set.width + 3) / 4;

    for row in 0..set.num_pp {
        let lines: Vec<String> = set
            .pps
            .iter()
            .map(|pps| format!("{:0row_digits$x}", pps[row]))
            .collect();
        fs::write(dir.join(format!("test_pp{row}.hex")), lines.join("\n") + "\n")?;
    }

    if set.encoding == Encoding::Booth {
        for row in 0..set.num_pp {
            let lines: Vec<String> = set
                .cpls
                .iter()
                .map(|cpls| format!("{:x}", u8::from(cpls[row])))
                .collect();
            fs::write(dir.join(format!("test_cpl{row}.hex")), lines.join("\n") + "\n")?;
        }
    }

    write_column(dir.join("test_a.hex"), &set.a, operand_digits)?;
    write_column(dir.join("test_b.hex"), &set.b, operand_digits)?;
    write_column(dir.join("test_expected.hex"), &set.expected, row_digits)?;
    Ok(())
}

fn write_column(path: std::path::PathBuf, values: &[BigUint], digits: usize) -> Result<()> {
    let lines: Vec<String> = values.iter().map(|v| format!("{v:0digits$x}")).collect();
    fs::write(path, lines.join("\n") + "\n")?;
    Ok(())
}

/// Write the `top.h` define header for the testbench.
pub fn write_defines(set: &VectorSet, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let mut header = String::new();
    header.push_str(&format!("`define W {}\n", set.width));
    header.push_str(&format!("`define TESTS {}\n", set.a.len()));
    header.push_str(&format!("`define NUM_PP {}\n", set.num_pp));
    header.push_str(&format!(
        "`define BOOTH {}\n",
        u8::from(set.encoding == Encoding::Booth)
    ));
    header.push_str(&format!("`define UNSIGNED {}\n", u8::from(set.unsigned)));
    header.push_str("`define PROD_W (2*`W)\n");
    fs::write(dir.join("top.h"), header)?;
    Ok(())
}

/// Small deterministic generator so vector sets are reproducible.
struct XorShift64(u64);

impl XorShift64 {
    fn new(seed: u64) -> XorShift64 {
        XorShift64(if seed == 0 { 0x2545_F491_4F6C_DD1D } else { seed })
    }

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn operand(&mut self, width: usize) -> BigUint {
        let mut value = BigUint::zero();
        for chunk in 0..(width + 63) / 64 {
            value |= BigUint::from(self.next()) << (64 * chunk);
        }
        value % (BigUint::from(1u8) << width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctree_core::Algorithm;

    #[test]
    fn test_generated_counts() {
        let config = Config::new(8, Encoding::Booth, Algorithm::Dadda);
        let set = generate(&config, 16, false, 1).unwrap();
        assert_eq!(set.a.len(), 16);
        assert_eq!(set.pps.len(), 16);
        assert_eq!(set.pps[0].len(), 4);
        assert_eq!(set.cpls[0].len(), 4);
    }

    #[test]
    fn test_exhaustive_covers_all_pairs() {
        let config = Config::new(3, Encoding::Binary, Algorithm::Dadda).with_unsigned(true);
        let set = generate(&config, 0, true, 0).unwrap();
        assert_eq!(set.a.len(), 64);
        assert_eq!(set.expected[9], BigUint::from(1u8)); // a=1, b=1
    }

    #[test]
    fn test_exhaustive_guard() {
        let config = Config::new(16, Encoding::Binary, Algorithm::Dadda).with_unsigned(true);
        assert!(generate(&config, 0, true, 0).is_err());
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let config = Config::new(8, Encoding::Binary, Algorithm::Dadda);
        let first = generate(&config, 32, false, 7).unwrap();
        let second = generate(&config, 32, false, 7).unwrap();
        assert_eq!(first.a, second.a);
        assert_eq!(first.expected, second.expected);
    }

    #[test]
    fn test_hex_files_land_on_disk() {
        let config = Config::new(4, Encoding::Booth, Algorithm::Dadda);
        let set = generate(&config, 8, false, 3).unwrap();
        let dir = std::env::temp_dir().join("ctree_vectors_test");
        write_hex_files(&set, &dir).unwrap();
        write_defines(&set, &dir).unwrap();
        let pp0 = fs::read_to_string(dir.join("test_pp0.hex")).unwrap();
        assert_eq!(pp0.lines().count(), 8);
        assert_eq!(pp0.lines().next().unwrap().len(), 2);
        let defines = fs::read_to_string(dir.join("top.h")).unwrap();
        assert!(defines.contains("`define W 4"));
        assert!(defines.contains("`define BOOTH 1"));
        fs::remove_dir_all(&dir).ok();
    }
}
