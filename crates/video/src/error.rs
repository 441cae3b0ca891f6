use {base::Vec2, std::fmt, std::path::PathBuf};

#[derive(Debug)]
pub enum VideoError {
    /// Input is neither a file nor a directory.
    PathNotFound(PathBuf),
    /// The source cannot report how many frames it holds.
    FrameCountUnknown,
    /// A frame could not be read or decoded.
    InvalidFrame(String),
    /// Container or codec this build cannot read.
    Unsupported(String),
    /// Malformed container structure.
    Container(String),
    /// Frame does not match the size the output was opened with.
    FrameSize {
        expected: Vec2<usize>,
        got: Vec2<usize>,
    },
    /// Write attempted after the output was closed.
    Closed,
    Io(String),
    Image(image::ImageError),
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::PathNotFound(path) => {
                write!(f, "can not find video path: {}", path.display())
            }
            VideoError::FrameCountUnknown => write!(f, "frame count unknown"),
            VideoError::InvalidFrame(msg) => write!(f, "invalid frame: {msg}"),
            VideoError::Unsupported(msg) => write!(f, "unsupported input: {msg}"),
            VideoError::Container(msg) => write!(f, "container error: {msg}"),
            VideoError::FrameSize { expected, got } => {
                write!(f, "frame size mismatch: output is {expected}, frame is {got}")
            }
            VideoError::Closed => write!(f, "video output already closed"),
            VideoError::Io(msg) => write!(f, "io error: {msg}"),
            VideoError::Image(err) => write!(f, "image error: {err}"),
        }
    }
}

impl std::error::Error for VideoError {}

impl From<std::io::Error> for VideoError {
    fn from(err: std::io::Error) -> Self {
        VideoError::Io(err.to_string())
    }
}

impl From<image::ImageError> for VideoError {
    fn from(err: image::ImageError) -> Self {
        VideoError::Image(err)
    }
}
