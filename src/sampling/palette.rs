//! Integer-weighted color palettes.
//!
//! A palette is expanded once into a flat list where each code repeats
//! `weight` times; a draw is then a uniform index into that list.

use std::sync::Arc;

use image::Rgb;
use rand::Rng;

use crate::core::attributes::HexColor;
use crate::core::error::{GenError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<(HexColor, u32)>,
    expanded: Arc<[HexColor]>,
}

impl Palette {
    pub fn new(entries: impl IntoIterator<Item = (HexColor, u32)>) -> Result<Self> {
        let entries: Vec<(HexColor, u32)> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(GenError::InvalidArgument("palette is empty".into()));
        }
        if let Some((code, _)) = entries.iter().find(|(_, w)| *w == 0) {
            return Err(GenError::InvalidArgument(format!(
                "palette color {code} has weight 0 (must be >= 1)"
            )));
        }
        let expanded: Arc<[HexColor]> = entries
            .iter()
            .flat_map(|(code, w)| std::iter::repeat(code.clone()).take(*w as usize))
            .collect();
        Ok(Self { entries, expanded })
    }

    /// Parses `(code, weight)` pairs as written in config files.
    pub fn from_codes<S: AsRef<str>>(pairs: &[(S, u32)]) -> Result<Self> {
        let entries = pairs
            .iter()
            .map(|(code, w)| HexColor::parse(code.as_ref()).map(|c| (c, *w)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[(HexColor, u32)] {
        &self.entries
    }

    pub fn expanded(&self) -> &[HexColor] {
        &self.expanded
    }

    pub fn contains(&self, color: &HexColor) -> bool {
        self.entries.iter().any(|(c, _)| c == color)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &HexColor {
        &self.expanded[rng.gen_range(0..self.expanded.len())]
    }
}

/// Color source for one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteSampler {
    Weighted(Palette),
    /// Any of the 16^6 codes with equal probability.
    Uniform,
}

impl PaletteSampler {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> HexColor {
        match self {
            PaletteSampler::Weighted(palette) => palette.sample(rng).clone(),
            PaletteSampler::Uniform => random_hex_color(rng),
        }
    }
}

impl From<Palette> for PaletteSampler {
    fn from(palette: Palette) -> Self {
        PaletteSampler::Weighted(palette)
    }
}

impl From<Option<Palette>> for PaletteSampler {
    fn from(palette: Option<Palette>) -> Self {
        palette.map_or(PaletteSampler::Uniform, PaletteSampler::Weighted)
    }
}

/// Uniform over all 24-bit colors, i.e. six independent lowercase hex digits.
pub fn random_hex_color<R: Rng + ?Sized>(rng: &mut R) -> HexColor {
    HexColor::from_rgb(Rgb(rng.gen::<[u8; 3]>()))
}
