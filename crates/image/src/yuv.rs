use base::Vec2;

// BT.601 YUV-to-RGB conversion for a single pixel (fixed-point, shift 8)
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    let r = (y + ((359 * v) >> 8)).clamp(0, 255) as u8;
    let g = (y - ((88 * u + 183 * v) >> 8)).clamp(0, 255) as u8;
    let b = (y + ((454 * u) >> 8)).clamp(0, 255) as u8;
    (r, g, b)
}

/// Planar 4:2:0 (Y, then U, then V; chroma rounded up for odd sizes) to RGB.
pub fn yu12_to_rgb(size: Vec2<usize>, data: &[u8]) -> Vec<u8> {
    let width = size.x;
    let height = size.y;
    let y_len = width * height;
    let uv_w = width.div_ceil(2);
    let uv_len = uv_w * height.div_ceil(2);

    let y_plane = &data[..y_len];
    let u_plane = &data[y_len..y_len + uv_len];
    let v_plane = &data[y_len + uv_len..y_len + 2 * uv_len];

    let mut rgb = Vec::with_capacity(y_len * 3);
    for row in 0..height {
        for col in 0..width {
            let y = y_plane[row * width + col];
            let u = u_plane[(row / 2) * uv_w + col / 2];
            let v = v_plane[(row / 2) * uv_w + col / 2];
            let (r, g, b) = yuv_to_rgb(y, u, v);
            rgb.extend_from_slice(&[r, g, b]);
        }
    }
    rgb
}

/// Planar 4:4:4 to RGB.
pub fn yuv444_to_rgb(size: Vec2<usize>, data: &[u8]) -> Vec<u8> {
    let plane = size.area();
    let (y_plane, rest) = data.split_at(plane);
    let (u_plane, v_plane) = rest.split_at(plane);

    let mut rgb = Vec::with_capacity(plane * 3);
    for i in 0..plane {
        let (r, g, b) = yuv_to_rgb(y_plane[i], u_plane[i], v_plane[i]);
        rgb.extend_from_slice(&[r, g, b]);
    }
    rgb
}

pub fn gray_to_rgb(data: &[u8]) -> Vec<u8> {
    data.iter().flat_map(|&v| [v, v, v]).collect()
}
