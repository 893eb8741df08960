#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;

use glyph_batch::core::error::ComposeError;
use glyph_batch::rendering::fill_background;
use glyph_batch::{AttributeSet, ImageComposer, WeightTable};
use image::RgbImage;
use rand::{rngs::StdRng, SeedableRng};

/// Background-only composer so tests need no font file.
pub struct FlatComposer {
    pub size: u32,
}

impl ImageComposer for FlatComposer {
    fn compose(&self, attrs: &AttributeSet) -> Result<RgbImage, ComposeError> {
        Ok(fill_background(self.size, attrs.bg_color().to_rgb()))
    }
}

/// Composes `succeed` items, then fails every later call.
pub struct FailingComposer {
    pub succeed: usize,
    pub calls: Cell<usize>,
}

impl FailingComposer {
    pub fn after(succeed: usize) -> Self {
        Self {
            succeed,
            calls: Cell::new(0),
        }
    }
}

impl ImageComposer for FailingComposer {
    fn compose(&self, attrs: &AttributeSet) -> Result<RgbImage, ComposeError> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n >= self.succeed {
            return Err(ComposeError::MissingGlyph(attrs.letter()));
        }
        Ok(fill_background(2, attrs.bg_color().to_rgb()))
    }
}

/// Observed share of each key over `draws` seeded samples.
pub fn observed_frequencies<K: Clone + Eq + Hash>(
    table: &WeightTable<K>,
    draws: usize,
    seed: u64,
) -> HashMap<K, f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut counts: HashMap<K, usize> = HashMap::new();
    for _ in 0..draws {
        *counts.entry(table.sample(&mut rng).clone()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(k, c)| (k, c as f64 / draws as f64))
        .collect()
}

/// Panics if any key's observed share strays more than `epsilon` from its weight share.
pub fn assert_converges<K: Clone + Eq + Hash + std::fmt::Debug>(
    table: &WeightTable<K>,
    draws: usize,
    epsilon: f64,
) {
    let observed = observed_frequencies(table, draws, 0x5eed);
    for (key, expected) in table.probabilities() {
        let got = observed.get(key).copied().unwrap_or(0.0);
        assert!(
            (got - expected).abs() < epsilon,
            "{key:?}: observed {got:.5}, expected {expected:.5}"
        );
    }
    assert!(observed.keys().all(|k| table.keys().any(|t| t == k)));
}
