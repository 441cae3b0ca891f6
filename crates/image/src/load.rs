use {crate::*, base::Vec2, std::path::Path};

/// Read an image file from disk and convert it to `Rgb8`.
///
/// The container format is detected from the file contents, so a
/// misnamed extension still decodes.
pub fn load_image(path: impl AsRef<Path>) -> Result<Image, ImageError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let decoded = crates_image::load_from_memory(&bytes)
        .map_err(|e| ImageError::Decode(format!("{}: {}", path.display(), e)))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Image::new(
        Vec2::new(width as usize, height as usize),
        rgb.into_raw(),
        PixelFormat::Rgb8,
    ))
}

/// Write an `Rgb8` image; the format follows the path's extension.
pub fn save_image(image: &Image, path: impl AsRef<Path>) -> Result<(), ImageError> {
    image.format.ensure_format(PixelFormat::Rgb8)?;
    let buffer = to_rgb_buffer(image)?;
    buffer
        .save(path.as_ref())
        .map_err(|e| ImageError::Encode(e.to_string()))
}

pub(crate) fn to_rgb_buffer(image: &Image) -> Result<crates_image::RgbImage, ImageError> {
    image.validate()?;
    crates_image::RgbImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.data.clone(),
    )
    .ok_or_else(|| ImageError::Size {
        size: image.size,
        expected: image.size.area() * 3,
        got: image.data.len(),
    })
}
