use {
    crate::InferError,
    base::Vec2,
    candle_core::{Device, Tensor},
    image::{Image, PixelFormat, resize_lanczos},
};

/// Turn an `Rgb8` frame into a `[1, 3, h, w]` f32 tensor in [0, 1] at
/// `feed_size`.
///
/// The Lanczos resize is skipped when the frame already has the feed size.
pub fn preprocess(frame: &Image, feed_size: Vec2<usize>, device: &Device) -> Result<Tensor, InferError> {
    if frame.format != PixelFormat::Rgb8 {
        return Err(InferError::InvalidFrame(format!(
            "expected Rgb8 frame, got {:?}",
            frame.format
        )));
    }
    if frame.is_empty() {
        return Err(InferError::InvalidFrame(format!("empty frame ({})", frame.size)));
    }
    if frame.data.len() != frame.size.area() * 3 {
        return Err(InferError::InvalidFrame(format!(
            "{} frame holds {} bytes, expected {}",
            frame.size,
            frame.data.len(),
            frame.size.area() * 3
        )));
    }
    if feed_size.is_empty() {
        return Err(InferError::Shape(format!("invalid feed size {feed_size}")));
    }

    let resized;
    let frame = if frame.size == feed_size {
        frame
    } else {
        resized = resize_lanczos(frame, feed_size)
            .map_err(|e| InferError::InvalidFrame(e.to_string()))?;
        &resized
    };

    let data: Vec<f32> = frame.data.iter().map(|&v| v as f32 / 255.0).collect();
    let tensor = Tensor::from_vec(data, (feed_size.y, feed_size.x, 3), device)?
        .permute((2, 0, 1))?
        .contiguous()?
        .unsqueeze(0)?;
    Ok(tensor)
}
