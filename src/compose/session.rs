use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::compose::plan::{MorphFrame, MorphParams, MorphPlan};
use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
use crate::foundation::core::{FrameIndex, MorphPixel, Raster};
use crate::foundation::error::{MorphError, MorphResult};
use crate::grid::control::GridSnapshot;

/// Thread/chunk configuration for frame generation.
#[derive(Clone, Debug)]
pub struct MorphThreading {
    /// Compute the frames of a chunk concurrently on a rayon pool.
    pub parallel: bool,
    /// Frames computed before they are handed to the sink.
    pub chunk_size: usize,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for MorphThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 16,
            threads: None,
        }
    }
}

/// Counters for one generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MorphStats {
    /// Frames a complete run produces.
    pub frames_total: u64,
    /// Frames handed to the sink.
    pub frames_emitted: u64,
}

/// Shared flag used to abort a run between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; observed before the next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`Self::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives a [`MorphPlan`] to completion, feeding a [`FrameSink`].
///
/// A session keeps no state between runs; running it twice produces the same frames.
pub struct MorphSession<'a, P: MorphPixel> {
    plan: MorphPlan<'a, P>,
    fps: u32,
    threading: MorphThreading,
    cancel: CancelToken,
}

impl<'a, P: MorphPixel> MorphSession<'a, P> {
    /// Validate inputs and prepare a session (see [`MorphPlan::new`]).
    pub fn new(
        image_a: &'a Raster<P>,
        grid_a: &GridSnapshot,
        image_b: &'a Raster<P>,
        grid_b: &GridSnapshot,
        params: &MorphParams,
    ) -> MorphResult<Self> {
        Ok(Self {
            plan: MorphPlan::new(image_a, grid_a, image_b, grid_b, params)?,
            fps: params.fps,
            threading: MorphThreading::default(),
            cancel: CancelToken::new(),
        })
    }

    /// Replace the thread/chunk configuration.
    pub fn with_threading(mut self, threading: MorphThreading) -> Self {
        self.threading = threading;
        self
    }

    /// Observe `token` between frames.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Borrow the underlying plan.
    pub fn plan(&self) -> &MorphPlan<'a, P> {
        &self.plan
    }

    /// Number of frames in the sequence.
    pub fn total_frames(&self) -> u64 {
        self.plan.total_frames()
    }

    /// Compute a single frame without touching any sink.
    pub fn render_frame(&self, frame: FrameIndex) -> MorphResult<MorphFrame<P>> {
        self.plan.render_frame(frame)
    }

    /// Lazily compute frames in index order.
    pub fn frames(&self) -> FrameIter<'_, 'a, P> {
        FrameIter {
            session: self,
            next: 0,
        }
    }

    /// Generate every frame into `sink`.
    ///
    /// Frames are pushed in index order, exactly once each. Cancellation is checked before each
    /// frame; a cancelled run returns [`MorphError::Cancelled`] with the number of frames the sink
    /// already holds, which stay intact.
    #[tracing::instrument(skip_all, fields(frames = self.plan.total_frames(), parallel = self.threading.parallel))]
    pub fn run(&self, sink: &mut dyn FrameSink<P>) -> MorphResult<MorphStats> {
        let started = Instant::now();
        let total = self.plan.total_frames();
        let (width, height) = self.plan.dimensions();
        if self.cancel.is_cancelled() {
            return Err(MorphError::Cancelled { emitted: 0 });
        }

        sink.begin(SinkConfig {
            width,
            height,
            fps: self.fps,
            total_frames: total,
        })?;

        let mut stats = MorphStats {
            frames_total: total,
            frames_emitted: 0,
        };

        if self.threading.parallel {
            self.run_parallel(sink, &mut stats)?;
        } else {
            for i in 0..total {
                self.check_cancel(&stats)?;
                let frame = self.plan.render_frame(FrameIndex(i))?;
                self.emit(sink, &frame, &mut stats)?;
            }
        }

        sink.end()?;
        tracing::info!(
            frames = stats.frames_emitted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "morph complete"
        );
        Ok(stats)
    }

    fn run_parallel(&self, sink: &mut dyn FrameSink<P>, stats: &mut MorphStats) -> MorphResult<()> {
        let pool = build_thread_pool(self.threading.threads)?;
        let chunk_size = normalized_chunk_size(self.threading.chunk_size);
        let total = self.plan.total_frames();

        let mut chunk_start = 0u64;
        while chunk_start < total {
            self.check_cancel(stats)?;
            let chunk_end = (chunk_start + chunk_size).min(total);

            let rendered: Vec<Option<MorphResult<MorphFrame<P>>>> = pool.install(|| {
                (chunk_start as usize..chunk_end as usize)
                    .into_par_iter()
                    .map(|i| {
                        if self.cancel.is_cancelled() {
                            None
                        } else {
                            Some(self.plan.render_frame(FrameIndex(i as u64)))
                        }
                    })
                    .collect()
            });

            for item in rendered {
                self.check_cancel(stats)?;
                let Some(frame) = item else {
                    return Err(MorphError::Cancelled {
                        emitted: stats.frames_emitted,
                    });
                };
                self.emit(sink, &frame?, stats)?;
            }
            chunk_start = chunk_end;
        }
        Ok(())
    }

    fn emit(
        &self,
        sink: &mut dyn FrameSink<P>,
        frame: &MorphFrame<P>,
        stats: &mut MorphStats,
    ) -> MorphResult<()> {
        sink.push_frame(frame)?;
        stats.frames_emitted += 1;
        tracing::debug!(frame = frame.index.0, "frame emitted");
        Ok(())
    }

    fn check_cancel(&self, stats: &MorphStats) -> MorphResult<()> {
        if self.cancel.is_cancelled() {
            tracing::info!(emitted = stats.frames_emitted, "morph cancelled");
            return Err(MorphError::Cancelled {
                emitted: stats.frames_emitted,
            });
        }
        Ok(())
    }
}

/// Iterator returned by [`MorphSession::frames`].
pub struct FrameIter<'s, 'a, P: MorphPixel> {
    session: &'s MorphSession<'a, P>,
    next: u64,
}

impl<P: MorphPixel> Iterator for FrameIter<'_, '_, P> {
    type Item = MorphResult<MorphFrame<P>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.session.total_frames() {
            return None;
        }
        if self.session.cancel.is_cancelled() {
            let emitted = self.next;
            self.next = self.session.total_frames();
            return Some(Err(MorphError::Cancelled { emitted }));
        }
        let frame = self.session.render_frame(FrameIndex(self.next));
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.session.total_frames().saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

/// Morph `image_a` into `image_b` and collect every frame as `(index, buffer)`.
///
/// The grid resolution is taken from `grid_a`; `grid_b` must match it.
pub fn generate<P: MorphPixel>(
    image_a: &Raster<P>,
    grid_a: &GridSnapshot,
    image_b: &Raster<P>,
    grid_b: &GridSnapshot,
    seconds: u32,
    fps: u32,
) -> MorphResult<Vec<(FrameIndex, Raster<P>)>> {
    let params = MorphParams {
        grid_size: grid_a.grid_size(),
        seconds,
        fps,
        ..MorphParams::default()
    };
    let session = MorphSession::new(image_a, grid_a, image_b, grid_b, &params)?;
    let mut sink = InMemorySink::<P>::new();
    session.run(&mut sink)?;
    Ok(sink.into_frames())
}

fn build_thread_pool(threads: Option<usize>) -> MorphResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(MorphError::validation(
            "morph threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MorphError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/session.rs"]
mod tests;
