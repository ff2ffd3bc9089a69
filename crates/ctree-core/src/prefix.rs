//! Parallel-prefix carry trees for the final adder.
//!
//! A plain level-by-level construction, independent of the bit heap: no
//! consumption tracking is needed because every level is a total function of
//! the one below it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Technique {
    /// Minimum area, depth `2 log2(n) - 1`.
    BrentKung,
    /// Minimum depth, fanout up to `n / 2`.
    Sklansky,
    /// Minimum depth and unit fanout, maximum node count.
    KoggeStone,
}

impl Display for Technique {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Technique::BrentKung => f.write_str("brent-kung"),
            Technique::Sklansky => f.write_str("sklansky"),
            Technique::KoggeStone => f.write_str("kogge-stone"),
        }
    }
}

impl FromStr for Technique {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "brent-kung" => Ok(Technique::BrentKung),
            "sklansky" => Ok(Technique::Sklansky),
            "kogge-stone" => Ok(Technique::KoggeStone),
            _ => Err(format!(
                "unknown technique `{s}` (expected brent-kung, sklansky, or kogge-stone)"
            )),
        }
    }
}

/// One node of the tree. Buffers forward their left input unchanged; compute
/// nodes combine the left (higher) and right (lower) inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixNode {
    pub level: usize,
    pub index: usize,
    /// `(level, index)` of the left input.
    pub left: (usize, usize),
    /// `(level, index)` of the right input; same as `left` for buffers.
    pub right: (usize, usize),
    pub is_input: bool,
    pub is_buffer: bool,
}

impl PrefixNode {
    fn input(index: usize) -> PrefixNode {
        PrefixNode {
            level: 0,
            index,
            left: (0, index),
            right: (0, index),
            is_input: true,
            is_buffer: false,
        }
    }

    fn buffer(level: usize, index: usize) -> PrefixNode {
        PrefixNode {
            level,
            index,
            left: (level - 1, index),
            right: (level - 1, index),
            is_input: false,
            is_buffer: true,
        }
    }

    fn compute(level: usize, index: usize, right_index: usize) -> PrefixNode {
        PrefixNode {
            level,
            index,
            left: (level - 1, index),
            right: (level - 1, right_index),
            is_input: false,
            is_buffer: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrefixStats {
    pub total_nodes: usize,
    pub compute_nodes: usize,
    pub buffer_nodes: usize,
}

/// A generated prefix tree: level 0 holds the inputs, every further level one
/// node per bit position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTree {
    width: usize,
    technique: Technique,
    pipeline: usize,
    levels: Vec<Vec<PrefixNode>>,
}

impl PrefixTree {
    pub fn build(width: usize, technique: Technique, pipeline: usize) -> Result<PrefixTree> {
        if !(2..=256).contains(&width) {
            return Err(Error::InvalidPrefixWidth(width));
        }
        let mut tree = PrefixTree {
            width,
            technique,
            pipeline,
            levels: vec![(0..width).map(PrefixNode::input).collect()],
        };
        match technique {
            Technique::BrentKung => tree.build_brent_kung(),
            Technique::Sklansky => tree.build_sklansky(),
            Technique::KoggeStone => tree.build_kogge_stone(),
        }
        Ok(tree)
    }

    /// Divide-and-conquer: the second half of every `2^level` block combines
    /// with the last position of the first half.
    fn build_sklansky(&mut self) {
        let n = self.width;
        for level in 1..=ceil_log2(n) {
            let step = 1 << level;
            let half = step >> 1;
            let nodes = (0..n)
                .map(|i| {
                    let block = i / step;
                    if i % step < half {
                        PrefixNode::buffer(level, i)
                    } else {
                        PrefixNode::compute(level, i, block * step + half - 1)
                    }
                })
                .collect();
            self.levels.push(nodes);
        }
    }

    /// Every position combines with the one `2^(level-1)` below it.
    fn build_kogge_stone(&mut self) {
        let n = self.width;
        for level in 1..=ceil_log2(n) {
            let step = 1 << (level - 1);
            let nodes = (0..n)
                .map(|i| {
                    if i < step {
                        PrefixNode::buffer(level, i)
                    } else {
                        PrefixNode::compute(level, i, i - step)
                    }
                })
                .collect();
            self.levels.push(nodes);
        }
    }

    /// Up-sweep computing prefixes at positions `2^k - 1`, then a down-sweep
    /// distributing them back.
    fn build_brent_kung(&mut self) {
        let n = self.width;
        let up_levels = ceil_log2(n);

        for level in 1..=up_levels {
            let step = 1 << level;
            let nodes = (0..n)
                .map(|i| {
                    if (i + 1) % step == 0 {
                        PrefixNode::compute(level, i, i - (step >> 1))
                    } else {
                        PrefixNode::buffer(level, i)
                    }
                })
                .collect();
            self.levels.push(nodes);
        }

        for level in up_levels + 1..2 * up_levels {
            let step = 1 << (2 * up_levels - level);
            let half = step >> 1;
            let nodes = (0..n)
                .map(|i| {
                    let block = (i + 1) / step;
                    if (i + 1) % step == half && block > 0 {
                        PrefixNode::compute(level, i, block * step - 1)
                    } else {
                        PrefixNode::buffer(level, i)
                    }
                })
                .collect();
            self.levels.push(nodes);
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn technique(&self) -> Technique {
        self.technique
    }

    pub fn pipeline(&self) -> usize {
        self.pipeline
    }

    /// All levels, inputs first.
    pub fn levels(&self) -> &[Vec<PrefixNode>] {
        &self.levels
    }

    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn node(&self, level: usize, index: usize) -> &PrefixNode {
        &self.levels[level][index]
    }

    pub fn stats(&self) -> PrefixStats {
        let mut stats = PrefixStats {
            total_nodes: 0,
            compute_nodes: 0,
            buffer_nodes: 0,
        };
        for level in &self.levels[1..] {
            for node in level {
                stats.total_nodes += 1;
                if node.is_buffer {
                    stats.buffer_nodes += 1;
                } else {
                    stats.compute_nodes += 1;
                }
            }
        }
        stats
    }
}

fn ceil_log2(n: usize) -> usize {
    (usize::BITS - (n - 1).leading_zeros()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_bounds() {
        assert!(PrefixTree::build(1, Technique::Sklansky, 0).is_err());
        assert!(PrefixTree::build(257, Technique::Sklansky, 0).is_err());
        assert!(PrefixTree::build(2, Technique::Sklansky, 0).is_ok());
        assert!(PrefixTree::build(256, Technique::Sklansky, 0).is_ok());
    }

    #[test]
    fn test_sklansky_depth_and_nodes() {
        let tree = PrefixTree::build(8, Technique::Sklansky, 0).unwrap();
        assert_eq!(tree.max_level(), 3);
        assert_eq!(tree.stats().compute_nodes, 12);
        // Position 7 at level 3 reaches back to position 3.
        assert_eq!(tree.node(3, 7).right, (2, 3));
    }

    #[test]
    fn test_kogge_stone_depth_and_nodes() {
        let tree = PrefixTree::build(8, Technique::KoggeStone, 0).unwrap();
        assert_eq!(tree.max_level(), 3);
        // 7 + 6 + 4 compute nodes.
        assert_eq!(tree.stats().compute_nodes, 17);
        assert_eq!(tree.node(2, 5).right, (1, 3));
    }

    #[test]
    fn test_brent_kung_depth_and_nodes() {
        let tree = PrefixTree::build(8, Technique::BrentKung, 0).unwrap();
        assert_eq!(tree.max_level(), 5);
        // 4 + 2 + 1 up-sweep, 1 + 3 down-sweep.
        assert_eq!(tree.stats().compute_nodes, 11);
        // The up-sweep root at position 7.
        assert_eq!(tree.node(3, 7).right, (2, 3));
        assert!(!tree.node(3, 7).is_buffer);
    }

    #[test]
    fn test_brent_kung_minimum_width() {
        let tree = PrefixTree::build(2, Technique::BrentKung, 0).unwrap();
        assert_eq!(tree.max_level(), 1);
        assert_eq!(tree.stats().compute_nodes, 1);
    }

    #[test]
    fn test_non_power_of_two() {
        for technique in [Technique::BrentKung, Technique::Sklansky, Technique::KoggeStone] {
            let tree = PrefixTree::build(13, technique, 0).unwrap();
            for level in tree.levels() {
                assert_eq!(level.len(), 13);
                for node in level {
                    assert!(node.left.1 < 13);
                    assert!(node.right.1 < 13);
                }
            }
        }
    }
}
