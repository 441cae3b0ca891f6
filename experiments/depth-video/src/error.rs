use {inference::InferError, std::fmt, video::VideoError};

#[derive(Debug)]
pub enum PipelineError {
    /// Bad command line or configuration value.
    Configuration(String),
    Model(InferError),
    Video(VideoError),
    InvalidFrame(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            PipelineError::Model(err) => write!(f, "model error: {err}"),
            PipelineError::Video(err) => write!(f, "video error: {err}"),
            PipelineError::InvalidFrame(msg) => write!(f, "invalid frame: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<InferError> for PipelineError {
    fn from(err: InferError) -> Self {
        match err {
            InferError::Config(msg) => PipelineError::Configuration(msg),
            InferError::InvalidFrame(msg) => PipelineError::InvalidFrame(msg),
            other => PipelineError::Model(other),
        }
    }
}

impl From<VideoError> for PipelineError {
    fn from(err: VideoError) -> Self {
        match err {
            VideoError::InvalidFrame(msg) => PipelineError::InvalidFrame(msg),
            other => PipelineError::Video(other),
        }
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        PipelineError::Video(VideoError::Image(err))
    }
}
