//! Random attribute sources.

pub mod palette;
pub mod weighted;

pub use palette::{random_hex_color, Palette, PaletteSampler};
pub use weighted::WeightTable;
