use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::core::attributes::HexColor;
use crate::core::error::{GenError, Result};
use crate::sampling::{Palette, PaletteSampler, WeightTable};

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/batch.ron";
pub const LOCAL_CONFIG_PATH: &str = "assets/config/batch.local.ron";

/// `(hex code, integer weight)` pairs in declared order.
pub type PaletteSpec = Vec<(String, u32)>;

/// Dark, subdued backgrounds.
pub fn default_background_palette() -> PaletteSpec {
    [
        ("171212", 5),
        ("002500", 4),
        ("083b49", 3),
        ("3d2b00", 2),
        ("3c011d", 1),
    ]
    .into_iter()
    .map(|(c, w)| (c.to_owned(), w))
    .collect()
}

/// Light, prominent letter colors.
pub fn default_foreground_palette() -> PaletteSpec {
    [
        ("f58eb9", 5),
        ("e19451", 4),
        ("f8f4a6", 3),
        ("bdf7b7", 2),
        ("b1b5e7", 1),
    ]
    .into_iter()
    .map(|(c, w)| (c.to_owned(), w))
    .collect()
}

/// Share of each letter among English dictionary words. Used directly as the
/// selection weight, so common letters like `e` show up most often and `j`,
/// `q`, `x` are the rare draws.
pub fn default_letter_weights() -> Vec<(char, f64)> {
    vec![
        ('a', 0.0846402860096712),
        ('h', 0.026430828106619526),
        ('e', 0.10772176322650225),
        ('d', 0.03238955368790574),
        ('i', 0.08956630698939853),
        ('n', 0.0719479487121524),
        ('g', 0.023643469967582403),
        ('s', 0.0716180211960545),
        ('l', 0.05577434674781033),
        ('m', 0.030104955866114096),
        ('r', 0.07043308637891531),
        ('v', 0.009464312744959735),
        ('k', 0.007672746241673479),
        ('w', 0.006411696316744151),
        ('o', 0.07199344608861344),
        ('f', 0.011227836840112776),
        ('c', 0.0437750575370124),
        ('t', 0.06606991659100463),
        ('u', 0.03762718877433788),
        ('b', 0.018296526718835086),
        ('y', 0.02019654294337122),
        ('x', 0.0030025406994062735),
        ('j', 0.001561218150763426),
        ('p', 0.03252432893515823),
        ('z', 0.004222671600222851),
        ('q', 0.0016834029290581443),
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of items produced per run.
    pub total: usize,
    /// Edge length in pixels of the square canvas.
    pub size: u32,
    /// Output image extension without the dot; picks the raster format.
    pub extension: String,
    pub font_path: PathBuf,
    /// Point size of the letter.
    pub font_size: f32,
    pub output_dir: PathBuf,
    /// `None` draws uniformly random colors instead of a weighted palette.
    pub background_palette: Option<PaletteSpec>,
    pub foreground_palette: Option<PaletteSpec>,
    pub letters: Vec<(char, f64)>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            total: 1000,
            size: 1024,
            extension: "jpg".into(),
            font_path: PathBuf::from("fonts/Volkhov-Bold.ttf"),
            font_size: 512.0,
            output_dir: PathBuf::from("output"),
            background_palette: Some(default_background_palette()),
            foreground_palette: Some(default_foreground_palette()),
            letters: default_letter_weights(),
        }
    }
}

impl BatchConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| GenError::Config {
            path: path.to_path_buf(),
            reason: format!("read: {e}"),
        })?;
        ron::from_str(&data).map_err(|e| GenError::Config {
            path: path.to_path_buf(),
            reason: format!("parse RON: {e}"),
        })
    }

    /// Reads every existing file in order and deep-merges them, later files
    /// overriding earlier ones key by key. Returns the config, the paths that
    /// contributed, and per-file problems. Missing files are skipped silently;
    /// if nothing usable was read the defaults are returned.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                if let Some(val) = incoming.take() {
                                    merge_value(ev, val);
                                }
                                break;
                            }
                        }
                        if let Some(val) = incoming {
                            bm.insert(k, val);
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            if !path_ref.exists() {
                continue;
            }
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.display().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<BatchConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (BatchConfig::default(), used, errors)
                }
            },
            None => (BatchConfig::default(), used, errors),
        }
    }

    /// Soft checks; hard failures surface when samplers are built.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.total == 0 {
            w.push("total is 0; nothing will be generated".into());
        }
        if self.size == 0 {
            w.push("size must be > 0".into());
        } else if self.size > 8192 {
            w.push(format!("very large canvas: {0}x{0}", self.size));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            w.push(format!("font_size {} must be > 0", self.font_size));
        } else if self.font_size > self.size as f32 {
            w.push(format!(
                "font_size {} exceeds canvas size {}; letters will be clipped",
                self.font_size, self.size
            ));
        }
        if let Err(e) = self.image_format() {
            w.push(e.to_string());
        }
        fn check_palette(w: &mut Vec<String>, label: &str, palette: &Option<PaletteSpec>) {
            let Some(entries) = palette else {
                return;
            };
            if entries.is_empty() {
                w.push(format!("{label} is empty"));
            }
            let mut seen = HashSet::new();
            for (code, weight) in entries {
                if HexColor::parse(code).is_err() {
                    w.push(format!("{label}: {code:?} is not a 6-digit hex code"));
                }
                if *weight == 0 {
                    w.push(format!("{label}: {code} has weight 0 (must be >= 1)"));
                }
                if !seen.insert(code.to_ascii_lowercase()) {
                    w.push(format!("{label}: {code} listed more than once"));
                }
            }
        }
        check_palette(&mut w, "background_palette", &self.background_palette);
        check_palette(&mut w, "foreground_palette", &self.foreground_palette);
        if self.letters.is_empty() {
            w.push("letters table is empty".into());
        }
        let mut seen = HashSet::new();
        for (letter, weight) in &self.letters {
            if !(weight.is_finite() && *weight > 0.0) {
                w.push(format!("letters: {letter:?} has non-positive weight {weight}"));
            }
            if !seen.insert(*letter) {
                w.push(format!("letters: {letter:?} listed more than once"));
            }
        }
        w
    }

    pub fn letter_table(&self) -> Result<WeightTable<char>> {
        WeightTable::new(self.letters.iter().copied())
    }

    pub fn background_sampler(&self) -> Result<PaletteSampler> {
        palette_sampler(&self.background_palette)
    }

    pub fn foreground_sampler(&self) -> Result<PaletteSampler> {
        palette_sampler(&self.foreground_palette)
    }

    pub fn image_format(&self) -> Result<ImageFormat> {
        resolve_extension(&self.extension).map(|(_, format)| format)
    }
}

/// Normalizes an image extension (leading dot dropped, lowercased) and picks
/// its raster format. Only jpg, jpeg and png are written.
pub fn resolve_extension(extension: &str) -> Result<(String, ImageFormat)> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    let format = ImageFormat::from_extension(&extension)
        .filter(|f| matches!(f, ImageFormat::Jpeg | ImageFormat::Png))
        .ok_or_else(|| {
            GenError::InvalidArgument(format!(
                "unsupported image extension {extension:?} (expected jpg, jpeg or png)"
            ))
        })?;
    Ok((extension, format))
}

fn palette_sampler(spec: &Option<PaletteSpec>) -> Result<PaletteSampler> {
    Ok(match spec {
        Some(entries) => PaletteSampler::Weighted(Palette::from_codes(entries)?),
        None => PaletteSampler::Uniform,
    })
}
