use super::*;
use crate::foundation::core::Raster;
use image::Rgb;

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "meshmorph_seq_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

fn frame(i: u64, v: u8) -> MorphFrame<Rgb<u8>> {
    MorphFrame {
        index: FrameIndex(i),
        image: Raster::from_pixel(6, 4, Rgb([v, v, v])),
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 6,
        height: 4,
        fps: 2,
        total_frames: 2,
    }
}

#[test]
fn writes_numbered_files() {
    let dir = temp_dir("numbered");
    let mut sink = ImageSequenceSink::new(&dir, ImageFormat::Png);
    FrameSink::<Rgb<u8>>::begin(&mut sink, cfg()).unwrap();
    sink.push_frame(&frame(0, 10)).unwrap();
    sink.push_frame(&frame(1, 200)).unwrap();
    FrameSink::<Rgb<u8>>::end(&mut sink).unwrap();

    assert_eq!(sink.written(), &[dir.join("0.png"), dir.join("1.png")]);
    let back = image::open(dir.join("1.png")).unwrap().to_rgb8();
    assert_eq!(back.dimensions(), (6, 4));
    assert_eq!(*back.get_pixel(3, 2), Rgb([200, 200, 200]));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn jpeg_extension_follows_format() {
    let sink = ImageSequenceSink::new("renders", ImageFormat::Jpeg);
    assert_eq!(sink.frame_path(FrameIndex(7)), PathBuf::from("renders").join("7.jpg"));
}

#[test]
fn no_overwrite_refuses_existing_files() {
    let dir = temp_dir("no_overwrite");
    let mut sink = ImageSequenceSink::new(&dir, ImageFormat::Png);
    FrameSink::<Rgb<u8>>::begin(&mut sink, cfg()).unwrap();
    sink.push_frame(&frame(0, 1)).unwrap();

    let mut strict = ImageSequenceSink::new(&dir, ImageFormat::Png).no_overwrite();
    FrameSink::<Rgb<u8>>::begin(&mut strict, cfg()).unwrap();
    let err = strict.push_frame(&frame(0, 2)).unwrap_err();
    assert!(matches!(err, MorphError::Sink(_)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn io_failures_surface_as_sink_errors() {
    let dir = temp_dir("io_failure");
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let mut sink = ImageSequenceSink::new(blocker.join("sub"), ImageFormat::Png);
    let err = FrameSink::<Rgb<u8>>::begin(&mut sink, cfg()).unwrap_err();
    assert!(matches!(err, MorphError::Sink(_)), "{err}");
    assert!(err.to_string().starts_with("sink error:"));

    // Frame files land directly in the directory, so a regular file there blocks writing too.
    let mut sink = ImageSequenceSink::new(&blocker, ImageFormat::Png);
    let err = sink.push_frame(&frame(0, 5)).unwrap_err();
    assert!(matches!(err, MorphError::Sink(_)), "{err}");

    let _ = std::fs::remove_dir_all(&dir);
}
