use base::Vec2;
use image::{Image, PixelFormat};

fn checker(size: Vec2<usize>) -> Image {
    let mut data = Vec::with_capacity(size.area() * 3);
    for y in 0..size.y {
        for x in 0..size.x {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            data.extend_from_slice(&[v, 255 - v, 40]);
        }
    }
    Image::from_rgb(size, data).unwrap()
}

#[test]
fn test_resize_to_same_size_is_identity() {
    let image = checker(Vec2::new(32, 16));
    let resized = image::resize_lanczos(&image, Vec2::new(32, 16)).unwrap();
    assert_eq!(resized, image);
}

#[test]
fn test_resize_changes_dimensions() {
    let image = checker(Vec2::new(64, 48));
    let resized = image::resize_lanczos(&image, Vec2::new(20, 10)).unwrap();
    assert_eq!(resized.size, Vec2::new(20, 10));
    assert_eq!(resized.data.len(), 20 * 10 * 3);
    assert_eq!(resized.format, PixelFormat::Rgb8);
}

#[test]
fn test_resize_uniform_image_stays_uniform() {
    let image = Image::from_rgb(Vec2::new(30, 20), vec![77; 30 * 20 * 3]).unwrap();
    let resized = image::resize_lanczos(&image, Vec2::new(64, 48)).unwrap();
    assert!(resized.data.iter().all(|&v| (v as i32 - 77).abs() <= 1));
}

#[test]
fn test_resize_rejects_empty_target() {
    let image = checker(Vec2::new(4, 4));
    assert!(image::resize_lanczos(&image, Vec2::new(0, 4)).is_err());
}

#[test]
fn test_load_and_save_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let image = checker(Vec2::new(5, 3));

    image::save_image(&image, &path).unwrap();
    let loaded = image::load_image(&path).unwrap();

    assert_eq!(loaded, image);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let result = image::load_image("/definitely/not/here.png");
    assert!(matches!(result, Err(image::ImageError::Io(_))));
}
