//! Relative-frequency sampling over a discrete weight table.
//!
//! Weights need not sum to one. A draw `r` is taken uniformly from
//! `[0, total)` and entries are walked in declared order, subtracting each
//! weight until the remainder goes negative. Order has no effect on the
//! resulting distribution, only on which key a given `r` maps to.

use rand::Rng;

use crate::core::error::{GenError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable<K> {
    entries: Vec<(K, f64)>,
    total: f64,
}

impl<K> WeightTable<K> {
    /// Fails with `InvalidArgument` on an empty table or a non-positive weight.
    pub fn new(entries: impl IntoIterator<Item = (K, f64)>) -> Result<Self> {
        let entries: Vec<(K, f64)> = entries.into_iter().collect();
        let total = checked_total(&entries)?;
        Ok(Self { entries, total })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Expected share of draws for each key, in table order.
    pub fn probabilities(&self) -> impl Iterator<Item = (&K, f64)> {
        self.entries.iter().map(move |(k, w)| (k, w / self.total))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &K {
        let draw = rng.gen::<f64>() * self.total;
        self.pick(draw)
    }

    fn pick(&self, draw: f64) -> &K {
        walk(&self.entries, draw)
    }
}

/// Sum of all weights, or `InvalidArgument` for an empty table or any weight
/// that is not a finite number greater than zero.
fn checked_total<K>(entries: &[(K, f64)]) -> Result<f64> {
    if entries.is_empty() {
        return Err(GenError::InvalidArgument("weight table is empty".into()));
    }
    if let Some(pos) = entries
        .iter()
        .position(|(_, w)| !(w.is_finite() && *w > 0.0))
    {
        return Err(GenError::InvalidArgument(format!(
            "weight table entry {pos} has non-positive weight {}",
            entries[pos].1
        )));
    }
    Ok(entries.iter().map(|(_, w)| w).sum())
}

/// Cumulative subtraction for a draw in `[0, total)`. Rounding can leave the
/// remainder non-negative after the last entry, which then wins.
/// `entries` must be non-empty.
fn walk<K>(entries: &[(K, f64)], mut draw: f64) -> &K {
    for (key, weight) in entries {
        draw -= weight;
        if draw < 0.0 {
            return key;
        }
    }
    &entries[entries.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn empty_table_is_rejected() {
        let err = WeightTable::<char>::new(Vec::new()).unwrap_err();
        assert!(matches!(err, GenError::InvalidArgument(_)));
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let err = WeightTable::new([('a', 0.0), ('b', 0.0)]).unwrap_err();
        assert!(matches!(err, GenError::InvalidArgument(_)));
    }

    #[test]
    fn negative_and_nan_weights_are_rejected() {
        assert!(WeightTable::new([('a', 1.0), ('b', -0.5)]).is_err());
        assert!(WeightTable::new([('a', f64::NAN)]).is_err());
        assert!(WeightTable::new([('a', f64::INFINITY)]).is_err());
    }

    #[test]
    fn single_entry_always_wins() {
        let table = WeightTable::new([('q', 0.0016)]).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            assert_eq!(*table.sample(&mut rng), 'q');
        }
    }

    #[test]
    fn pick_walks_cumulative_boundaries() {
        let table = WeightTable::new([('a', 1.0), ('b', 2.0), ('c', 1.0)]).unwrap();
        assert_eq!(*table.pick(0.0), 'a');
        assert_eq!(*table.pick(0.999), 'a');
        assert_eq!(*table.pick(1.0), 'b');
        assert_eq!(*table.pick(2.999), 'b');
        assert_eq!(*table.pick(3.0), 'c');
    }

    #[test]
    fn exhausted_draw_falls_back_to_last_entry() {
        let table = WeightTable::new([('a', 0.5), ('b', 0.25), ('c', 0.125)]).unwrap();
        assert_eq!(*table.pick(table.total_weight()), 'c');
        assert_eq!(*table.pick(table.total_weight() + 1.0), 'c');
    }

    #[test]
    fn never_returns_unknown_keys() {
        let table = WeightTable::new([("x", 3.0), ("y", 0.25), ("z", 11.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5000 {
            let k = *table.sample(&mut rng);
            assert!(["x", "y", "z"].contains(&k));
        }
    }

    #[test]
    fn probabilities_are_normalized() {
        let table = WeightTable::new([('a', 2.0), ('b', 6.0)]).unwrap();
        let p: Vec<_> = table.probabilities().map(|(_, p)| p).collect();
        assert_eq!(p, vec![0.25, 0.75]);
    }
}
