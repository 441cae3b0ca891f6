use {
    crate::*,
    base::Vec2,
    crates_image::imageops::{self, FilterType},
};

/// Resize an `Rgb8` image with a Lanczos (a = 3) kernel.
///
/// Returns a copy when the image already has the requested size, so the
/// operation is an exact identity in that case.
pub fn resize_lanczos(image: &Image, size: Vec2<usize>) -> Result<Image, ImageError> {
    image.format.ensure_format(PixelFormat::Rgb8)?;
    if size.is_empty() {
        return Err(ImageError::Encode(format!("cannot resize to {size}")));
    }
    if image.size == size {
        image.validate()?;
        return Ok(image.clone());
    }
    let buffer = to_rgb_buffer(image)?;
    let resized = imageops::resize(&buffer, size.x as u32, size.y as u32, FilterType::Lanczos3);
    Ok(Image::new(size, resized.into_raw(), PixelFormat::Rgb8))
}
