pub mod config;

pub use config::{
    default_background_palette, default_foreground_palette, default_letter_weights,
    resolve_extension, BatchConfig, PaletteSpec, DEFAULT_CONFIG_PATH, LOCAL_CONFIG_PATH,
};
