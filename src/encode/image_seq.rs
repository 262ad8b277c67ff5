use std::path::{Path, PathBuf};

use image::{ImageFormat, PixelWithColorType};

use crate::compose::plan::MorphFrame;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, MorphPixel};
use crate::foundation::error::{MorphError, MorphResult};

/// Writes each frame to `<dir>/<index>.<ext>`.
#[derive(Clone, Debug)]
pub struct ImageSequenceSink {
    dir: PathBuf,
    format: ImageFormat,
    overwrite: bool,
    written: Vec<PathBuf>,
}

impl ImageSequenceSink {
    /// Create a sink writing `format` files into `dir`.
    pub fn new(dir: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            overwrite: true,
            written: Vec::new(),
        }
    }

    /// Refuse to replace files that already exist.
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Path used for frame `index`.
    pub fn frame_path(&self, index: FrameIndex) -> PathBuf {
        let ext = self.format.extensions_str().first().copied().unwrap_or("img");
        self.dir.join(format!("{}.{ext}", index.0))
    }
}

impl<P> FrameSink<P> for ImageSequenceSink
where
    P: MorphPixel + PixelWithColorType,
{
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            MorphError::sink(format!(
                "failed to create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.written.clear();
        tracing::debug!(
            dir = %self.dir.display(),
            width = cfg.width,
            height = cfg.height,
            frames = cfg.total_frames,
            "writing image sequence"
        );
        Ok(())
    }

    fn push_frame(&mut self, frame: &MorphFrame<P>) -> MorphResult<()> {
        let path = self.frame_path(frame.index);
        if !self.overwrite && path.exists() {
            return Err(MorphError::sink(format!(
                "output file '{}' already exists",
                path.display()
            )));
        }
        frame
            .image
            .save_with_format(&path, self.format)
            .map_err(|e| {
                MorphError::sink(format!("failed to write frame '{}': {e}", path.display()))
            })?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> MorphResult<()> {
        tracing::info!(
            dir = %self.dir.display(),
            frames = self.written.len(),
            "image sequence complete"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/image_seq.rs"]
mod tests;
