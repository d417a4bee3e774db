//! Lexicographic generation of k-permutations of `0..n`.

use bitvec::prelude::*;

/// Returns `n! / (n - k)!`, or `None` if it overflows `u128`.
pub fn permutation_count(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    ((n - k + 1)..=n).try_fold(1u128, |acc, f| acc.checked_mul(f as u128))
}

/// Ordered selections of `k` distinct values out of `0..n`, in lexicographic
/// order.
///
/// The current permutation is advanced in place. A bitset tracks which values
/// are still free: stepping releases values from the back until one position
/// can take a larger free value, then refills the later positions with the
/// smallest free values.
#[derive(Debug, Clone)]
pub struct KPermutations {
    current: Vec<usize>,
    free: BitVec,
    started: bool,
    exhausted: bool,
}

impl KPermutations {
    /// Starts at the first permutation `[0, 1, .., k - 1]`.
    pub fn new(n: usize, k: usize) -> Self {
        let mut free = bitvec![1; n];
        let exhausted = k > n;
        let current: Vec<usize> = if exhausted { Vec::new() } else { (0..k).collect() };
        for &v in &current {
            free.set(v, false);
        }
        Self {
            current,
            free,
            started: false,
            exhausted,
        }
    }

    /// Returns the current permutation.
    pub fn current(&self) -> &[usize] {
        &self.current
    }

    /// Steps to the lexicographic successor. Returns `false`, leaving the
    /// generator exhausted, when the current permutation was the last.
    pub fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        let k = self.current.len();
        for pos in (0..k).rev() {
            let old = self.current[pos];
            self.free.set(old, true);
            let larger = self.free[old + 1..].first_one().map(|i| i + old + 1);
            if let Some(next) = larger {
                self.current[pos] = next;
                self.free.set(next, false);
                for later in pos + 1..k {
                    let Some(smallest) = self.free.first_one() else {
                        self.exhausted = true;
                        return false;
                    };
                    self.current[later] = smallest;
                    self.free.set(smallest, false);
                }
                return true;
            }
        }
        self.exhausted = true;
        false
    }
}

impl Iterator for KPermutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if !self.started {
            self.started = true;
            return (!self.exhausted).then(|| self.current.clone());
        }
        self.advance().then(|| self.current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn counts() {
        assert_eq!(permutation_count(5, 3), Some(60));
        assert_eq!(permutation_count(4, 4), Some(24));
        assert_eq!(permutation_count(4, 0), Some(1));
        assert_eq!(permutation_count(2, 3), Some(0));
        assert_eq!(permutation_count(64, 64), None);
    }

    #[test]
    fn five_choose_three_ordered() {
        let all: Vec<Vec<usize>> = KPermutations::new(5, 3).collect();
        assert_eq!(all.len(), 60);
        let distinct: HashSet<_> = all.iter().cloned().collect();
        assert_eq!(distinct.len(), 60);
        for p in &all {
            assert!(p.iter().all(|&v| v < 5));
            let values: HashSet<_> = p.iter().collect();
            assert_eq!(values.len(), 3);
        }
    }

    #[test]
    fn lexicographic_order() {
        let all: Vec<Vec<usize>> = KPermutations::new(4, 2).collect();
        assert_eq!(all.first(), Some(&vec![0, 1]));
        assert_eq!(all.last(), Some(&vec![3, 2]));
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(all.len(), 12);
    }

    #[test]
    fn full_permutations() {
        let all: Vec<Vec<usize>> = KPermutations::new(3, 3).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
    }

    #[test]
    fn exhausted_generator_stays_exhausted() {
        let mut perms = KPermutations::new(2, 2);
        assert!(perms.advance());
        assert_eq!(perms.current(), &[1, 0]);
        assert!(!perms.advance());
        assert!(!perms.advance());
    }

    #[test]
    fn degenerate_sizes() {
        assert_eq!(KPermutations::new(3, 0).count(), 1);
        assert_eq!(KPermutations::new(2, 3).count(), 0);
        assert_eq!(KPermutations::new(1, 1).count(), 1);
    }
}
