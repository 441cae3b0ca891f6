use {
    super::DisparityMap,
    crate::InferError,
    base::Vec2,
    image::{Colormap, Image, PixelFormat},
};

/// Upper bound of the normalization range, as a percentile of all values.
pub const RANGE_PERCENTILE: f64 = 95.0;

/// Bilinear resize of a single-channel map, `align_corners = false`.
pub fn upsample_bilinear(data: &[f32], from: Vec2<usize>, to: Vec2<usize>) -> Vec<f32> {
    if from == to {
        return data.to_vec();
    }
    let xs = axis_taps(from.x, to.x);
    let ys = axis_taps(from.y, to.y);
    let mut out = Vec::with_capacity(to.area());
    for &(y0, y1, fy) in &ys {
        let row0 = &data[y0 * from.x..(y0 + 1) * from.x];
        let row1 = &data[y1 * from.x..(y1 + 1) * from.x];
        for &(x0, x1, fx) in &xs {
            let top = row0[x0] + (row0[x1] - row0[x0]) * fx;
            let bottom = row1[x0] + (row1[x1] - row1[x0]) * fx;
            out.push(top + (bottom - top) * fy);
        }
    }
    out
}

// per output index: the two source indices and the weight of the second
fn axis_taps(input: usize, output: usize) -> Vec<(usize, usize, f32)> {
    let scale = input as f64 / output as f64;
    (0..output)
        .map(|dst| {
            let src = ((dst as f64 + 0.5) * scale - 0.5).max(0.0);
            let i0 = (src.floor() as usize).min(input - 1);
            let i1 = (i0 + 1).min(input - 1);
            (i0, i1, (src - i0 as f64) as f32)
        })
        .collect()
}

/// `q`-th percentile with linear interpolation between the closest ranks.
pub fn percentile(values: &[f32], q: f64) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    let rank = q.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = (rank - lo as f64) as f32;
    let (_, &mut lo_value, upper) = sorted.select_nth_unstable_by(lo, f32::total_cmp);
    if frac == 0.0 || upper.is_empty() {
        return Some(lo_value);
    }
    let hi_value = upper.iter().copied().fold(f32::INFINITY, f32::min);
    Some(lo_value + (hi_value - lo_value) * frac)
}

/// Minimum and 95th percentile of the map.
pub fn disparity_range(values: &[f32]) -> Option<(f32, f32)> {
    let min = values.iter().copied().reduce(f32::min)?;
    let max = percentile(values, RANGE_PERCENTILE)?;
    Some((min, max))
}

/// Scale into [0, 1] over `[min, max]`, clamping outliers. A degenerate
/// range maps everything to 0.
pub fn normalize(values: &[f32], min: f32, max: f32) -> Vec<f32> {
    if max.is_nan() || min.is_nan() || max <= min {
        return vec![0.0; values.len()];
    }
    let span = max - min;
    values
        .iter()
        .map(|&v| ((v - min) / span).clamp(0.0, 1.0))
        .collect()
}

/// Render a disparity map as an `Rgb8` image of `size`.
pub fn colorize(disparity: &DisparityMap, size: Vec2<usize>, colormap: Colormap) -> Result<Image, InferError> {
    if disparity.size.is_empty() || disparity.data.len() != disparity.size.area() {
        return Err(InferError::Shape(format!(
            "disparity map of {} with {} values",
            disparity.size,
            disparity.data.len()
        )));
    }
    if size.is_empty() {
        return Err(InferError::InvalidFrame(format!("cannot colorize to {size}")));
    }

    let upsampled = upsample_bilinear(&disparity.data, disparity.size, size);
    let (min, max) = disparity_range(&upsampled)
        .ok_or_else(|| InferError::Shape("empty disparity map".to_string()))?;
    let normalized = normalize(&upsampled, min, max);

    let lut = colormap.lut();
    let mut data = Vec::with_capacity(size.area() * 3);
    for t in normalized {
        data.extend_from_slice(&lut.map(t));
    }
    Ok(Image::new(size, data, PixelFormat::Rgb8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsample_matches_align_corners_false() {
        // 2 -> 4: source coords -0.25 (clamped), 0.25, 0.75, 1.25 (clamped index)
        let out = upsample_bilinear(&[0.0, 1.0], Vec2::new(2, 1), Vec2::new(4, 1));
        assert_eq!(out, vec![0.0, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn test_upsample_same_size_is_copy() {
        let data = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(upsample_bilinear(&data, Vec2::new(2, 2), Vec2::new(2, 2)), data);
    }

    #[test]
    fn test_downsample_averages_neighbours() {
        // 4 -> 2: source coords 0.5 and 2.5
        let out = upsample_bilinear(&[0.0, 1.0, 2.0, 3.0], Vec2::new(4, 1), Vec2::new(2, 1));
        assert_eq!(out, vec![0.5, 2.5]);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values: Vec<f32> = (1..=5).map(|v| v as f32).collect();
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        // rank 0.95 * 4 = 3.8 -> 4 + 0.8
        assert!((percentile(&values, 95.0).unwrap() - 4.8).abs() < 1e-6);
        assert_eq!(percentile(&[], 95.0), None);
    }

    #[test]
    fn test_normalized_range_and_clamp_share() {
        let values: Vec<f32> = (0..1000).map(|i| ((i * 37) % 1000) as f32 / 7.0).collect();
        let (min, max) = disparity_range(&values).unwrap();
        let normalized = normalize(&values, min, max);
        assert!(normalized.iter().all(|&v| (0.0..=1.0).contains(&v)));
        let clamped = normalized.iter().filter(|&&v| v >= 1.0).count();
        assert!(clamped as f64 <= 0.05 * values.len() as f64 + 1.0);
    }

    #[test]
    fn test_constant_map_is_all_zero() {
        let normalized = normalize(&[0.3; 16], 0.3, 0.3);
        assert!(normalized.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_colorize_output_size_and_format() {
        let disparity = DisparityMap::new(
            Vec2::new(4, 2),
            vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7],
        )
        .unwrap();
        let image = colorize(&disparity, Vec2::new(10, 6), Colormap::Magma).unwrap();
        assert_eq!(image.size, Vec2::new(10, 6));
        assert_eq!(image.format, PixelFormat::Rgb8);
        assert_eq!(image.data.len(), 10 * 6 * 3);
        // the minimum lands on the darkest magma color
        assert_eq!(&image.data[0..3], &Colormap::Magma.map(0.0));
    }

    #[test]
    fn test_colorize_uses_table_bins() {
        // 95th percentile of 0..=99 is 94.05; everything above saturates
        let values: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let disparity = DisparityMap::new(Vec2::new(100, 1), values).unwrap();
        let image = colorize(&disparity, Vec2::new(100, 1), Colormap::Magma).unwrap();
        let lut = Colormap::Magma.lut();
        assert_eq!(&image.data[0..3], &lut.entries()[0]);
        assert_eq!(&image.data[99 * 3..], &lut.entries()[255]);
        assert_eq!(&image.data[95 * 3..96 * 3], &lut.entries()[255]);
    }

    #[test]
    fn test_colorize_rejects_bad_input() {
        let empty = DisparityMap {
            size: Vec2::new(0, 0),
            data: Vec::new(),
        };
        assert!(colorize(&empty, Vec2::new(4, 4), Colormap::Magma).is_err());
        let disparity = DisparityMap::new(Vec2::new(1, 1), vec![0.5]).unwrap();
        assert!(colorize(&disparity, Vec2::new(0, 4), Colormap::Magma).is_err());
    }
}
