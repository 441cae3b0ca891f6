use {crate::*, base::Vec2};

// fourcc codes
pub const FOURCC_RGB8: u32 = u32::from_le_bytes(*b"RGB8");
pub const FOURCC_GREY: u32 = u32::from_le_bytes(*b"GREY");
pub const FOURCC_YU12: u32 = u32::from_le_bytes(*b"YU12");
pub const FOURCC_444P: u32 = u32::from_le_bytes(*b"444P");
pub const FOURCC_MJPG: u32 = u32::from_le_bytes(*b"MJPG");

/// Convert a fourcc code to a readable 4-character string.
pub fn fourcc_to_string(fourcc: u32) -> String {
    String::from_utf8_lossy(&fourcc.to_le_bytes()).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Gray8,
    Yu12,
    Yuv444,
    Jpeg,
}

impl PixelFormat {
    pub fn from_fourcc(fourcc: u32) -> Option<Self> {
        match fourcc {
            FOURCC_RGB8 => Some(PixelFormat::Rgb8),
            FOURCC_GREY => Some(PixelFormat::Gray8),
            FOURCC_YU12 => Some(PixelFormat::Yu12),
            FOURCC_444P => Some(PixelFormat::Yuv444),
            FOURCC_MJPG => Some(PixelFormat::Jpeg),
            _ => None,
        }
    }

    pub fn as_fourcc(&self) -> u32 {
        match self {
            PixelFormat::Rgb8 => FOURCC_RGB8,
            PixelFormat::Gray8 => FOURCC_GREY,
            PixelFormat::Yu12 => FOURCC_YU12,
            PixelFormat::Yuv444 => FOURCC_444P,
            PixelFormat::Jpeg => FOURCC_MJPG,
        }
    }

    /// Exact buffer length for a frame of `size`, `None` for compressed formats.
    pub fn frame_len(&self, size: Vec2<usize>) -> Option<usize> {
        let pixels = size.area();
        match self {
            PixelFormat::Rgb8 => Some(pixels * 3),
            PixelFormat::Gray8 => Some(pixels),
            PixelFormat::Yu12 => Some(pixels + 2 * size.x.div_ceil(2) * size.y.div_ceil(2)),
            PixelFormat::Yuv444 => Some(pixels * 3),
            PixelFormat::Jpeg => None,
        }
    }

    pub fn ensure_format(&self, expected: PixelFormat) -> Result<(), ImageError> {
        if *self != expected {
            return Err(ImageError::Decode(format!(
                "expected {:?} format, got {:?}",
                expected, self
            )));
        }
        Ok(())
    }
}
