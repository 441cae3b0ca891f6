use {crate::*, base::Vec2, crates_image::ImageEncoder};

pub fn rgb_to_jpeg(size: Vec2<usize>, data: &[u8], quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let encoder = crates_image::codecs::jpeg::JpegEncoder::new_with_quality(
        &mut buffer,
        quality.clamp(1, 100),
    );
    encoder
        .write_image(
            data,
            size.x as u32,
            size.y as u32,
            crates_image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Encode an `Rgb8` image as a baseline JPEG.
pub fn encode_jpeg(image: &Image, quality: u8) -> Result<Vec<u8>, ImageError> {
    image.format.ensure_format(PixelFormat::Rgb8)?;
    image.validate()?;
    rgb_to_jpeg(image.size, &image.data, quality)
}

pub fn decode_jpeg(data: &[u8]) -> Result<Image, ImageError> {
    let decoded = crates_image::load_from_memory_with_format(data, crates_image::ImageFormat::Jpeg)
        .map_err(|e| ImageError::Decode(format!("Failed to decode JPEG: {}", e)))?;

    let rgb_image = decoded.to_rgb8();
    let (width, height) = rgb_image.dimensions();
    let size = Vec2::new(width as usize, height as usize);
    Ok(Image::new(size, rgb_image.into_raw(), PixelFormat::Rgb8))
}

pub fn jpeg_to_rgb(image: &Image) -> Result<Image, ImageError> {
    image.format.ensure_format(PixelFormat::Jpeg)?;
    decode_jpeg(&image.data)
}
