//! Output directory lifecycle and per-item file naming.
//!
//! Item `i` is written as `{i}.{ext}` plus `{i}-meta.json`, with `i` the
//! zero-based decimal index and no padding.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use image::{ImageError, ImageFormat};
use tracing::{debug, info};

use crate::batch::generator::GeneratedItem;
use crate::core::config::{resolve_extension, BatchConfig};
use crate::core::error::{GenError, Result, Stage};

pub const METADATA_SUFFIX: &str = "-meta.json";

#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    extension: String,
    format: ImageFormat,
}

impl OutputDir {
    /// `extension` may carry a leading dot (`.jpg`); only jpg/jpeg/png are accepted.
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Result<Self> {
        let (extension, format) = resolve_extension(extension)?;
        Ok(Self {
            root: root.into(),
            extension,
            format,
        })
    }

    pub fn from_config(cfg: &BatchConfig) -> Result<Self> {
        Self::new(&cfg.output_dir, &cfg.extension)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn image_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("{index}.{}", self.extension))
    }

    pub fn metadata_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("{index}{METADATA_SUFFIX}"))
    }

    /// Creates the directory (and parents) if absent.
    pub fn ensure(&self) -> Result<()> {
        if self.root.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.root).map_err(|e| GenError::ResourceUnavailable {
            resource: "output directory",
            path: self.root.clone(),
            reason: e.to_string(),
        })?;
        debug!(target: "output", "created {}", self.root.display());
        Ok(())
    }

    /// Removes every file and subtree inside the directory, keeping the
    /// directory itself. Irreversible. Returns the number of entries removed;
    /// a missing directory counts as already clear.
    pub fn clear(&self) -> Result<usize> {
        let clear_err = |source: io::Error| GenError::Clear {
            path: self.root.clone(),
            source,
        };
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(clear_err(e)),
        };
        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(clear_err)?;
            let path = entry.path();
            let is_dir = entry.file_type().map_err(clear_err)?.is_dir();
            let res = if is_dir {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            res.map_err(|source| GenError::Clear {
                path: path.clone(),
                source,
            })?;
            removed += 1;
        }
        info!(target: "output", "cleared {removed} entries from {}", self.root.display());
        Ok(removed)
    }

    /// Writes the raster image, then the metadata sidecar.
    pub fn write_item(&self, item: &GeneratedItem) -> Result<()> {
        let image_path = self.image_path(item.index);
        item.image
            .save_with_format(&image_path, self.format)
            .map_err(|e| GenError::Io {
                index: item.index,
                stage: Stage::WriteImage,
                path: image_path.clone(),
                source: image_error_to_io(e),
            })?;

        let meta_path = self.metadata_path(item.index);
        let meta_err = |source: io::Error| GenError::Io {
            index: item.index,
            stage: Stage::WriteMetadata,
            path: meta_path.clone(),
            source,
        };
        let json = item
            .attributes
            .to_metadata_json()
            .map_err(|e| meta_err(e.into()))?;
        fs::write(&meta_path, json).map_err(meta_err)?;
        Ok(())
    }
}

fn image_error_to_io(err: ImageError) -> io::Error {
    match err {
        ImageError::IoError(e) => e,
        other => io::Error::other(other),
    }
}
