pub mod composer;

pub use composer::{fill_background, GlyphComposer, ImageComposer};
