use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use image::RgbImage;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::batch::output::OutputDir;
use crate::core::attributes::AttributeSet;
use crate::core::config::BatchConfig;
use crate::core::error::{GenError, Result};
use crate::rendering::composer::{GlyphComposer, ImageComposer};
use crate::sampling::{PaletteSampler, WeightTable};

/// One item in flight: produced, persisted, then dropped.
#[derive(Debug, Clone)]
pub struct GeneratedItem {
    pub index: usize,
    pub attributes: AttributeSet,
    pub image: RgbImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub requested: usize,
    pub written: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Produces `total` independent items and persists each one before starting
/// the next. The first failure aborts the run; items already written stay.
pub struct BatchGenerator<C> {
    total: usize,
    background: PaletteSampler,
    foreground: PaletteSampler,
    letters: WeightTable<char>,
    composer: C,
    output: OutputDir,
    cancel: Option<Arc<AtomicBool>>,
}

impl<C: ImageComposer> BatchGenerator<C> {
    pub fn new(
        total: usize,
        background: PaletteSampler,
        foreground: PaletteSampler,
        letters: WeightTable<char>,
        composer: C,
        output: OutputDir,
    ) -> Self {
        Self {
            total,
            background,
            foreground,
            letters,
            composer,
            output,
            cancel: None,
        }
    }

    /// Builds every sampler from `cfg`; malformed tables fail here, before
    /// anything touches the disk.
    pub fn from_config(cfg: &BatchConfig, composer: C) -> Result<Self> {
        Ok(Self::new(
            cfg.total,
            cfg.background_sampler()?,
            cfg.foreground_sampler()?,
            cfg.letter_table()?,
            composer,
            OutputDir::from_config(cfg)?,
        ))
    }

    /// Checked before each item; setting it stops the run after the item in progress.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn output(&self) -> &OutputDir {
        &self.output
    }

    pub fn sample_attributes<R: Rng + ?Sized>(&self, rng: &mut R) -> AttributeSet {
        let bg = self.background.sample(rng);
        let fg = self.foreground.sample(rng);
        let letter = *self.letters.sample(rng);
        AttributeSet::new(bg, letter, fg)
    }

    pub fn generate_item<R: Rng + ?Sized>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> Result<GeneratedItem> {
        let attributes = self.sample_attributes(rng);
        let image = self
            .composer
            .compose(&attributes)
            .map_err(|source| GenError::Compose { index, source })?;
        Ok(GeneratedItem {
            index,
            attributes,
            image,
        })
    }

    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<BatchReport> {
        let started = Instant::now();
        self.output.ensure()?;
        info!(
            target: "batch",
            "generating {} images into {}",
            self.total,
            self.output.path().display()
        );
        let mut written = 0usize;
        let mut cancelled = false;
        for index in 0..self.total {
            if self.is_cancelled() {
                warn!(target: "batch", "cancelled after {written} of {} items", self.total);
                cancelled = true;
                break;
            }
            let item = self.generate_item(index, rng)?;
            self.output.write_item(&item)?;
            debug!(
                target: "batch",
                index,
                bg = %item.attributes.bg_color(),
                letter = %item.attributes.letter(),
                fg = %item.attributes.letter_color(),
                "item written"
            );
            written += 1;
        }
        let elapsed = started.elapsed();
        info!(
            target: "batch",
            "{written} images generated in {:.3} seconds",
            elapsed.as_secs_f64()
        );
        Ok(BatchReport {
            requested: self.total,
            written,
            cancelled,
            elapsed,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl BatchGenerator<GlyphComposer> {
    /// Loads the font and builds every sampler, then empties the output
    /// directory when `clear` is set. A setup failure deletes nothing.
    pub fn prepare(cfg: &BatchConfig, clear: bool) -> Result<Self> {
        let generator = Self::from_config(cfg, GlyphComposer::from_config(cfg)?)?;
        if clear {
            generator.output.clear()?;
        }
        Ok(generator)
    }
}
