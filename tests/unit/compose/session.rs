use super::*;
use crate::foundation::core::Point;
use crate::grid::control::ControlGrid;
use image::{Rgb, RgbImage};

fn sources() -> (RgbImage, RgbImage) {
    let a = RgbImage::from_fn(60, 60, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 30]));
    let b = RgbImage::from_fn(60, 60, |x, y| Rgb([220, (y * 3) as u8, (x * 2) as u8]));
    (a, b)
}

fn grids(grid_size: u32) -> (GridSnapshot, GridSnapshot) {
    let a = GridSnapshot::even(600, 600, grid_size).unwrap();
    let mut g = ControlGrid::new(600, 600, grid_size).unwrap();
    g.move_point(2, 2, Point::new(140.0, 90.0)).unwrap();
    g.move_point(3, 4, Point::new(400.0, 260.0)).unwrap();
    (a, g.snapshot())
}

fn params(seconds: u32, fps: u32) -> MorphParams {
    MorphParams {
        grid_size: 10,
        seconds,
        fps,
        ..MorphParams::default()
    }
}

struct CancelAfter {
    token: CancelToken,
    after: usize,
    inner: InMemorySink<Rgb<u8>>,
}

impl FrameSink<Rgb<u8>> for CancelAfter {
    fn begin(&mut self, cfg: SinkConfig) -> MorphResult<()> {
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, frame: &MorphFrame<Rgb<u8>>) -> MorphResult<()> {
        self.inner.push_frame(frame)?;
        if self.inner.frames().len() == self.after {
            self.token.cancel();
        }
        Ok(())
    }

    fn end(&mut self) -> MorphResult<()> {
        self.inner.end()
    }
}

fn mean_abs_diff(a: &RgbImage, b: &RgbImage) -> f64 {
    let sum: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    sum as f64 / a.as_raw().len() as f64
}

#[test]
fn two_frame_run_goes_from_a_to_b() {
    let (a, b) = sources();
    let (ga, gb) = grids(10);
    let session = MorphSession::new(&a, &ga, &b, &gb, &params(1, 2)).unwrap();

    let mut sink = InMemorySink::<Rgb<u8>>::new();
    let stats = session.run(&mut sink).unwrap();
    assert_eq!(
        stats,
        MorphStats {
            frames_total: 2,
            frames_emitted: 2
        }
    );
    assert!(sink.is_finished());
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 60,
            height: 60,
            fps: 2,
            total_frames: 2
        })
    );

    let frames = sink.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].index, FrameIndex(0));
    assert_eq!(frames[1].index, FrameIndex(1));
    assert!(mean_abs_diff(&frames[0].image, &a) < mean_abs_diff(&frames[0].image, &b));
    assert!(mean_abs_diff(&frames[1].image, &b) < mean_abs_diff(&frames[1].image, &a));
}

#[test]
fn parallel_run_matches_sequential_run() {
    let (a, b) = sources();
    let (ga, gb) = grids(10);
    let seq = MorphSession::new(&a, &ga, &b, &gb, &params(1, 7)).unwrap();
    let par = MorphSession::new(&a, &ga, &b, &gb, &params(1, 7))
        .unwrap()
        .with_threading(MorphThreading {
            parallel: true,
            chunk_size: 3,
            threads: Some(2),
        });

    let mut s1 = InMemorySink::<Rgb<u8>>::new();
    let mut s2 = InMemorySink::<Rgb<u8>>::new();
    seq.run(&mut s1).unwrap();
    par.run(&mut s2).unwrap();
    assert_eq!(s1.frames(), s2.frames());
    let indices: Vec<u64> = s2.frames().iter().map(|f| f.index.0).collect();
    assert_eq!(indices, (0..7).collect::<Vec<_>>());
}

#[test]
fn cancellation_keeps_emitted_frames() {
    let (a, b) = sources();
    let (ga, gb) = grids(10);
    for parallel in [false, true] {
        let token = CancelToken::new();
        let session = MorphSession::new(&a, &ga, &b, &gb, &params(1, 6))
            .unwrap()
            .with_cancel_token(token.clone())
            .with_threading(MorphThreading {
                parallel,
                chunk_size: 4,
                threads: Some(2),
            });

        let mut sink = CancelAfter {
            token,
            after: 2,
            inner: InMemorySink::<Rgb<u8>>::new(),
        };
        let err = session.run(&mut sink).unwrap_err();
        assert!(
            matches!(err, MorphError::Cancelled { emitted: 2 }),
            "parallel={parallel}: {err}"
        );
        assert_eq!(sink.inner.frames().len(), 2);
        assert!(!sink.inner.is_finished());
        assert_eq!(sink.inner.frames()[1].index, FrameIndex(1));
    }
}

#[test]
fn pre_cancelled_run_never_touches_the_sink() {
    let (a, b) = sources();
    let (ga, gb) = grids(10);
    let token = CancelToken::new();
    token.cancel();
    let session = MorphSession::new(&a, &ga, &b, &gb, &params(1, 2))
        .unwrap()
        .with_cancel_token(token);

    let mut sink = InMemorySink::<Rgb<u8>>::new();
    assert!(matches!(
        session.run(&mut sink),
        Err(MorphError::Cancelled { emitted: 0 })
    ));
    assert!(sink.config().is_none());
    assert!(matches!(
        session.frames().next(),
        Some(Err(MorphError::Cancelled { emitted: 0 }))
    ));
}

#[test]
fn frame_iterator_matches_run_and_is_repeatable() {
    let (a, b) = sources();
    let (ga, gb) = grids(10);
    let session = MorphSession::new(&a, &ga, &b, &gb, &params(1, 3)).unwrap();

    let iter = session.frames();
    assert_eq!(iter.size_hint(), (3, Some(3)));
    let lazy: Vec<MorphFrame<Rgb<u8>>> = iter.collect::<MorphResult<_>>().unwrap();

    let mut sink = InMemorySink::<Rgb<u8>>::new();
    session.run(&mut sink).unwrap();
    assert_eq!(lazy.as_slice(), sink.frames());

    let mut again = InMemorySink::<Rgb<u8>>::new();
    session.run(&mut again).unwrap();
    assert_eq!(again.frames(), sink.frames());
}

#[test]
fn generate_collects_indexed_buffers() {
    let (a, b) = sources();
    let (ga, gb) = grids(10);
    let frames = generate(&a, &ga, &b, &gb, 1, 2).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].0, FrameIndex(0));
    assert_eq!(frames[0].1, a);
    assert_eq!(frames[1].0, FrameIndex(1));
    assert_eq!(frames[1].1, b);

    assert!(matches!(
        generate(&a, &ga, &b, &gb, 1, 0),
        Err(MorphError::Validation(_))
    ));
    let (_, other) = grids(5);
    assert!(matches!(
        generate(&a, &ga, &b, &other, 1, 2),
        Err(MorphError::GridContract(_))
    ));
}

#[test]
fn zero_threads_is_rejected() {
    let (a, b) = sources();
    let (ga, gb) = grids(10);
    let session = MorphSession::new(&a, &ga, &b, &gb, &params(1, 2))
        .unwrap()
        .with_threading(MorphThreading {
            parallel: true,
            chunk_size: 0,
            threads: Some(0),
        });
    let mut sink = InMemorySink::<Rgb<u8>>::new();
    assert!(matches!(
        session.run(&mut sink),
        Err(MorphError::Validation(_))
    ));
}
