use {crate::*, base::Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

impl Image {
    pub fn new(size: Vec2<usize>, data: Vec<u8>, format: PixelFormat) -> Self {
        Self { size, data, format }
    }

    /// Build a packed RGB image, checking that `data` covers `size` exactly.
    pub fn from_rgb(size: Vec2<usize>, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = size.area() * 3;
        if data.len() != expected {
            return Err(ImageError::Size {
                size,
                expected,
                got: data.len(),
            });
        }
        Ok(Self::new(size, data, PixelFormat::Rgb8))
    }

    pub fn width(&self) -> usize {
        self.size.x
    }

    pub fn height(&self) -> usize {
        self.size.y
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty() || self.data.is_empty()
    }

    /// Check that the buffer length agrees with size and format.
    ///
    /// JPEG payloads are variable length and only need to be non-empty.
    pub fn validate(&self) -> Result<(), ImageError> {
        let expected = match self.format.frame_len(self.size) {
            Some(expected) => expected,
            None => {
                if self.data.is_empty() {
                    return Err(ImageError::Decode("empty JPEG payload".to_string()));
                }
                return Ok(());
            }
        };
        if self.data.len() != expected {
            return Err(ImageError::Size {
                size: self.size,
                expected,
                got: self.data.len(),
            });
        }
        Ok(())
    }

    /// Convert any supported format to packed `Rgb8`.
    pub fn to_rgb(&self) -> Result<Image, ImageError> {
        if self.format != PixelFormat::Jpeg {
            self.validate()?;
        }
        match self.format {
            PixelFormat::Rgb8 => Ok(self.clone()),
            PixelFormat::Gray8 => Ok(Image::new(
                self.size,
                gray_to_rgb(&self.data),
                PixelFormat::Rgb8,
            )),
            PixelFormat::Yu12 => Ok(Image::new(
                self.size,
                yu12_to_rgb(self.size, &self.data),
                PixelFormat::Rgb8,
            )),
            PixelFormat::Yuv444 => Ok(Image::new(
                self.size,
                yuv444_to_rgb(self.size, &self.data),
                PixelFormat::Rgb8,
            )),
            PixelFormat::Jpeg => jpeg_to_rgb(self),
        }
    }

    /// Like `to_rgb`, but moves the buffer when it is already `Rgb8`.
    pub fn into_rgb(self) -> Result<Image, ImageError> {
        if self.format == PixelFormat::Rgb8 {
            self.validate()?;
            return Ok(self);
        }
        self.to_rgb()
    }
}
