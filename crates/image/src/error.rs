use {base::Vec2, std::fmt};

#[derive(Debug)]
pub enum ImageError {
    Decode(String),
    Encode(String),
    Io(String),
    Size {
        size: Vec2<usize>,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Decode(msg) => write!(f, "decode error: {msg}"),
            ImageError::Encode(msg) => write!(f, "encode error: {msg}"),
            ImageError::Io(msg) => write!(f, "io error: {msg}"),
            ImageError::Size {
                size,
                expected,
                got,
            } => write!(
                f,
                "size error: {size} image needs {expected} bytes, got {got}"
            ),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<crates_image::ImageError> for ImageError {
    fn from(err: crates_image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> Self {
        ImageError::Io(err.to_string())
    }
}
