use crate::compose::plan::MorphFrame;
use crate::foundation::core::{FrameIndex, MorphPixel, Raster};
use crate::foundation::error::MorphResult;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback frames per second.
    pub fps: u32,
    /// Number of frames a complete run delivers.
    pub total_frames: u64,
}

/// Consumer of finished morph frames.
///
/// `push_frame` is called exactly once per frame index, in strictly increasing index order.
/// `end` is only called after a complete run; a cancelled or failed run stops after the last
/// successfully pushed frame.
pub trait FrameSink<P: MorphPixel> {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()>;
    /// Push one finished frame.
    fn push_frame(&mut self, frame: &MorphFrame<P>) -> MorphResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> MorphResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug)]
pub struct InMemorySink<P: MorphPixel> {
    cfg: Option<SinkConfig>,
    frames: Vec<MorphFrame<P>>,
    finished: bool,
}

impl<P: MorphPixel> Default for InMemorySink<P> {
    fn default() -> Self {
        Self {
            cfg: None,
            frames: Vec::new(),
            finished: false,
        }
    }
}

impl<P: MorphPixel> InMemorySink<P> {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[MorphFrame<P>] {
        &self.frames
    }

    /// Whether `end` was reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take the captured frames as `(index, buffer)` pairs.
    pub fn into_frames(self) -> Vec<(FrameIndex, Raster<P>)> {
        self.frames.into_iter().map(|f| (f.index, f.image)).collect()
    }
}

impl<P: MorphPixel> FrameSink<P> for InMemorySink<P> {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &MorphFrame<P>) -> MorphResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> MorphResult<()> {
        self.finished = true;
        Ok(())
    }
}
