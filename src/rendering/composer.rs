//! Rasterizes one [`AttributeSet`] into a square RGB image.
//!
//! The letter is anchored middle-middle: the midpoint of its advance width
//! and the midpoint between ascent and descent sit on the canvas center, so
//! every letter shares one baseline regardless of its own ink extent.

use std::{fs, path::Path};

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};

use crate::core::attributes::AttributeSet;
use crate::core::config::BatchConfig;
use crate::core::error::{ComposeError, GenError, Result};

/// Turns sampled attributes into pixels.
pub trait ImageComposer {
    fn compose(&self, attrs: &AttributeSet) -> Result<RgbImage, ComposeError>;
}

impl<C: ImageComposer + ?Sized> ImageComposer for &C {
    fn compose(&self, attrs: &AttributeSet) -> Result<RgbImage, ComposeError> {
        (**self).compose(attrs)
    }
}

pub fn fill_background(size: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(size, size, color)
}

/// Renders the letter with one TrueType/OpenType font at a fixed point size.
pub struct GlyphComposer {
    font: FontVec,
    scale: PxScale,
    size: u32,
}

impl GlyphComposer {
    pub fn new(font_bytes: Vec<u8>, size: u32, point_size: f32) -> Result<Self> {
        if size == 0 {
            return Err(GenError::InvalidArgument("canvas size must be > 0".into()));
        }
        if !(point_size.is_finite() && point_size > 0.0) {
            return Err(GenError::InvalidArgument(format!(
                "font size {point_size} must be > 0"
            )));
        }
        let font = FontVec::try_from_vec(font_bytes).map_err(|e| GenError::ResourceUnavailable {
            resource: "font",
            path: Default::default(),
            reason: format!("decode font: {e}"),
        })?;
        // Point size is an em size; PxScale measures ascent - descent.
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        let scale = PxScale::from(point_size * font.height_unscaled() / units_per_em);
        Ok(Self { font, scale, size })
    }

    pub fn from_file(path: impl AsRef<Path>, size: u32, point_size: f32) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| GenError::ResourceUnavailable {
            resource: "font",
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::new(bytes, size, point_size).map_err(|e| match e {
            GenError::ResourceUnavailable {
                resource, reason, ..
            } => GenError::ResourceUnavailable {
                resource,
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_config(cfg: &BatchConfig) -> Result<Self> {
        Self::from_file(&cfg.font_path, cfg.size, cfg.font_size)
    }

    fn draw_letter(
        &self,
        canvas: &mut RgbImage,
        letter: char,
        color: Rgb<u8>,
    ) -> Result<(), ComposeError> {
        if letter.is_whitespace() {
            return Ok(());
        }
        let glyph_id = self.font.glyph_id(letter);
        if glyph_id.0 == 0 {
            return Err(ComposeError::MissingGlyph(letter));
        }
        let scaled = self.font.as_scaled(self.scale);
        let center = self.size as f32 / 2.0;
        let x = center - scaled.h_advance(glyph_id) / 2.0;
        let baseline = center + (scaled.ascent() + scaled.descent()) / 2.0;
        let glyph = glyph_id.with_scale_and_position(self.scale, point(x, baseline));
        let Some(outlined) = self.font.outline_glyph(glyph) else {
            return Ok(());
        };
        let bounds = outlined.px_bounds();
        let (ox, oy) = (bounds.min.x as i64, bounds.min.y as i64);
        let (w, h) = (canvas.width() as i64, canvas.height() as i64);
        outlined.draw(|gx, gy, coverage| {
            let (px, py) = (ox + gx as i64, oy + gy as i64);
            if px < 0 || py < 0 || px >= w || py >= h {
                return;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            *pixel = blend(*pixel, color, coverage);
        });
        Ok(())
    }
}

impl ImageComposer for GlyphComposer {
    fn compose(&self, attrs: &AttributeSet) -> Result<RgbImage, ComposeError> {
        let mut canvas = fill_background(self.size, attrs.bg_color().to_rgb());
        self.draw_letter(&mut canvas, attrs.letter(), attrs.letter_color().to_rgb())?;
        Ok(canvas)
    }
}

fn blend(under: Rgb<u8>, over: Rgb<u8>, coverage: f32) -> Rgb<u8> {
    let a = coverage.clamp(0.0, 1.0);
    let mix = |u: u8, o: u8| (u as f32 * (1.0 - a) + o as f32 * a).round() as u8;
    Rgb([
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::HexColor;

    const DEJAVU: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/fonts/DejaVuSans.ttf");

    fn white_on_black(letter: char) -> AttributeSet {
        AttributeSet::new(
            HexColor::from_rgb(Rgb([0, 0, 0])),
            letter,
            HexColor::from_rgb(Rgb([255, 255, 255])),
        )
    }

    /// `(min_x, min_y, max_x, max_y)` of every non-background pixel.
    fn ink_bounds(img: &RgbImage, bg: Rgb<u8>) -> Option<(u32, u32, u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p != bg)
            .fold(None, |acc, (x, y, _)| {
                Some(match acc {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                })
            })
    }

    #[test]
    fn background_fill_is_uniform() {
        let img = fill_background(16, Rgb([0x17, 0x12, 0x12]));
        assert_eq!(img.dimensions(), (16, 16));
        assert!(img.pixels().all(|p| *p == Rgb([0x17, 0x12, 0x12])));
    }

    #[test]
    fn blend_endpoints() {
        let bg = Rgb([0, 0, 0]);
        let fg = Rgb([200, 100, 50]);
        assert_eq!(blend(bg, fg, 0.0), bg);
        assert_eq!(blend(bg, fg, 1.0), fg);
        assert_eq!(blend(bg, fg, 0.5), Rgb([100, 50, 25]));
        assert_eq!(blend(bg, fg, 3.0), fg);
    }

    #[test]
    fn garbage_font_bytes_are_resource_unavailable() {
        let err = GlyphComposer::new(b"not a font".to_vec(), 64, 32.0)
            .err()
            .expect("garbage must not decode");
        assert!(matches!(err, GenError::ResourceUnavailable { resource: "font", .. }));
    }

    #[test]
    fn missing_font_file_names_the_path() {
        let err = GlyphComposer::from_file("/no/such/font.ttf", 64, 32.0)
            .err()
            .expect("missing file must fail");
        match err {
            GenError::ResourceUnavailable { path, .. } => {
                assert_eq!(path, Path::new("/no/such/font.ttf"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_canvas_is_invalid_argument() {
        let err = GlyphComposer::new(Vec::new(), 0, 32.0).err().unwrap();
        assert!(matches!(err, GenError::InvalidArgument(_)));
    }

    #[test]
    fn letter_is_drawn_in_its_color_around_the_center() {
        let composer = GlyphComposer::from_file(DEJAVU, 256, 128.0).unwrap();
        for letter in ['o', 'x', 'a'] {
            let img = composer.compose(&white_on_black(letter)).unwrap();
            assert_eq!(img.dimensions(), (256, 256));
            let solid = img.pixels().filter(|p| **p == Rgb([255, 255, 255])).count();
            assert!(solid > 100, "{letter}: only {solid} fully inked pixels");

            let (x0, y0, x1, y1) = ink_bounds(&img, Rgb([0, 0, 0])).unwrap();
            let mid_x = (x0 + x1) as f32 / 2.0;
            assert!((mid_x - 128.0).abs() < 12.0, "{letter}: ink x {x0}..{x1}");
            // Lowercase ink sits between the baseline and the x-height,
            // both inside the middle half of the canvas.
            assert!(y0 > 64 && y1 < 192, "{letter}: ink y {y0}..{y1}");
        }
    }

    #[test]
    fn letters_share_one_baseline() {
        let composer = GlyphComposer::from_file(DEJAVU, 256, 128.0).unwrap();
        let bottom = |c: char| {
            let img = composer.compose(&white_on_black(c)).unwrap();
            ink_bounds(&img, Rgb([0, 0, 0])).unwrap().3
        };
        let (x, z) = (bottom('x'), bottom('z'));
        assert!(x.abs_diff(z) <= 1, "x ends at {x}, z at {z}");
        assert!(bottom('p') > x + 10);
    }

    #[test]
    fn whitespace_renders_background_only() {
        let composer = GlyphComposer::from_file(DEJAVU, 32, 16.0).unwrap();
        let img = composer.compose(&white_on_black(' ')).unwrap();
        assert!(ink_bounds(&img, Rgb([0, 0, 0])).is_none());
    }

    #[test]
    fn letter_absent_from_font_is_missing_glyph() {
        let composer = GlyphComposer::from_file(DEJAVU, 32, 16.0).unwrap();
        let err = composer.compose(&white_on_black('\u{6F22}')).unwrap_err();
        assert!(matches!(err, ComposeError::MissingGlyph('\u{6F22}')));
    }
}
