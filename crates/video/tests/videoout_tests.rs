use {
    base::Vec2,
    image::{Image, PixelFormat},
    video::*,
};

fn frame(size: Vec2<usize>) -> Image {
    Image::new(size, vec![90; size.area() * 3], PixelFormat::Rgb8)
}

#[test]
fn test_opens_lazily_on_first_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.avi");
    let mut out = VideoOut::new(&path, VideoOutConfig::default());
    assert_eq!(out.state(), WriterState::Uninitialized);
    assert_eq!(out.size(), None);
    assert!(!path.exists());

    out.write(&frame(Vec2::new(40, 30))).unwrap();
    assert_eq!(out.state(), WriterState::Open);
    assert_eq!(out.size(), Some(Vec2::new(40, 30)));
    assert!(path.exists());

    assert_eq!(out.close().unwrap(), 1);
    assert_eq!(out.state(), WriterState::Closed);
}

#[test]
fn test_close_without_frames_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.avi");
    let mut out = VideoOut::new(&path, VideoOutConfig::default());
    assert_eq!(out.close().unwrap(), 0);
    assert!(!path.exists());
}

#[test]
fn test_rejects_mismatched_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = VideoOut::new(dir.path().join("out.avi"), VideoOutConfig::default());
    out.write(&frame(Vec2::new(40, 30))).unwrap();
    match out.write(&frame(Vec2::new(30, 40))) {
        Err(VideoError::FrameSize { expected, got }) => {
            assert_eq!(expected, Vec2::new(40, 30));
            assert_eq!(got, Vec2::new(30, 40));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(out.frames_written(), 1);
    assert_eq!(out.close().unwrap(), 1);
}

#[test]
fn test_write_after_close_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = VideoOut::new(dir.path().join("out.avi"), VideoOutConfig::default());
    out.write(&frame(Vec2::new(8, 8))).unwrap();
    out.close().unwrap();
    assert!(matches!(out.write(&frame(Vec2::new(8, 8))), Err(VideoError::Closed)));
    // closing twice is harmless
    assert_eq!(out.close().unwrap(), 1);
}

#[test]
fn test_rejects_non_rgb_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.avi");
    let mut out = VideoOut::new(&path, VideoOutConfig::default());
    let gray = Image::new(Vec2::new(4, 4), vec![0; 16], PixelFormat::Gray8);
    assert!(matches!(out.write(&gray), Err(VideoError::Image(_))));
    assert_eq!(out.state(), WriterState::Uninitialized);
    assert!(!path.exists());
}

#[test]
fn test_drop_finalizes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.avi");
    {
        let mut out = VideoOut::new(
            &path,
            VideoOutConfig {
                frame_rate: 25.0,
                quality: 80,
            },
        );
        out.write(&frame(Vec2::new(16, 16))).unwrap();
        out.write(&frame(Vec2::new(16, 16))).unwrap();
    }
    let reader = AviReader::open(&path).unwrap();
    assert_eq!(reader.info().total_frames, 2);
    assert!((reader.info().frame_rate - 25.0).abs() < 1e-9);
}
