pub mod batch;
pub mod core;
pub mod rendering;
pub mod sampling;

// Curated re-exports
pub use batch::{BatchGenerator, BatchReport, GeneratedItem, OutputDir};
pub use crate::core::attributes::{AttributeSet, HexColor, Trait};
pub use crate::core::config::BatchConfig;
pub use crate::core::error::{ComposeError, GenError, Stage};
pub use rendering::{GlyphComposer, ImageComposer};
pub use sampling::{Palette, PaletteSampler, WeightTable};
