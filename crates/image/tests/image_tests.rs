use base::Vec2;
use image::{Image, ImageError, PixelFormat};

#[test]
fn test_image_new_rgb8() {
    let size = Vec2::new(2, 3);
    let data: Vec<u8> = (0..18).collect(); // 2*3*3 = 18 bytes
    let image = Image::new(size, data.clone(), PixelFormat::Rgb8);

    assert_eq!(image.size, size);
    assert_eq!(image.width(), 2);
    assert_eq!(image.height(), 3);
    assert_eq!(image.data, data);
    assert!(image.validate().is_ok());
}

#[test]
fn test_from_rgb_rejects_short_buffer() {
    let result = Image::from_rgb(Vec2::new(4, 4), vec![0; 47]);
    match result {
        Err(ImageError::Size { expected, got, .. }) => {
            assert_eq!(expected, 48);
            assert_eq!(got, 47);
        }
        other => panic!("expected size error, got {other:?}"),
    }
}

#[test]
fn test_empty_image_is_empty() {
    let image = Image::new(Vec2::new(0, 0), vec![], PixelFormat::Rgb8);
    assert!(image.is_empty());
}

#[test]
fn test_gray_to_rgb_conversion() {
    let image = Image::new(Vec2::new(2, 1), vec![10, 200], PixelFormat::Gray8);
    let rgb = image.to_rgb().unwrap();
    assert_eq!(rgb.format, PixelFormat::Rgb8);
    assert_eq!(rgb.data, vec![10, 10, 10, 200, 200, 200]);
}

#[test]
fn test_yu12_to_rgb_conversion() {
    // 4x2 luma + 2x1 U + 2x1 V
    let mut data = vec![128u8; 8];
    data.extend_from_slice(&[128; 4]);
    let image = Image::new(Vec2::new(4, 2), data, PixelFormat::Yu12);
    let rgb = image.to_rgb().unwrap();
    assert_eq!(rgb.size, Vec2::new(4, 2));
    assert_eq!(rgb.data.len(), 24);
    assert!(rgb.data.iter().all(|&v| v == 128));
}

#[test]
fn test_yuv444_length_is_validated() {
    let image = Image::new(Vec2::new(2, 2), vec![0; 11], PixelFormat::Yuv444);
    assert!(image.to_rgb().is_err());
}

#[test]
fn test_into_rgb_keeps_rgb_buffer() {
    let data: Vec<u8> = (0..12).collect();
    let image = Image::new(Vec2::new(2, 2), data.clone(), PixelFormat::Rgb8);
    assert_eq!(image.into_rgb().unwrap().data, data);
}

#[test]
fn test_fourcc_round_trip() {
    for format in [
        PixelFormat::Rgb8,
        PixelFormat::Gray8,
        PixelFormat::Yu12,
        PixelFormat::Yuv444,
        PixelFormat::Jpeg,
    ] {
        assert_eq!(PixelFormat::from_fourcc(format.as_fourcc()), Some(format));
    }
    assert_eq!(image::fourcc_to_string(PixelFormat::Jpeg.as_fourcc()), "MJPG");
    assert_eq!(PixelFormat::from_fourcc(u32::from_le_bytes(*b"H264")), None);
}
