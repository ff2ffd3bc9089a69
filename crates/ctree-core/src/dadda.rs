//! The Dadda height sequence and the per-stage reduction targets derived
//! from it.

/// Dadda height sequence up to and including the first value >= `n`.
///
/// `d[0] = 2`, `d[j+1] = floor(3 * d[j] / 2)`: 2, 3, 4, 6, 9, 13, 19, 28, ...
pub fn sequence(n: usize) -> Vec<usize> {
    let mut seq = vec![2];
    while *seq.last().unwrap() < n {
        seq.push(seq.last().unwrap() * 3 / 2);
    }
    seq
}

/// Per-stage target heights for reducing a heap of maximum height
/// `initial_max`: the sequence values strictly below the maximum, largest
/// first. One reduction stage is run per target.
pub fn targets(initial_max: usize) -> Vec<usize> {
    sequence(initial_max)
        .into_iter()
        .rev()
        .filter(|&h| h < initial_max)
        .collect()
}

/// Number of reduction stages needed for `n` partial products.
pub fn stage_count(n: usize) -> usize {
    targets(n).len()
}
