//! Frame sources.
//!
//! A source yields `Rgb8` frames in order until it is exhausted. Read
//! failures come out as `Err` items; the caller decides whether to stop.

mod avi;
pub use avi::*;

mod directory;
pub use directory::*;

#[cfg(feature = "gst")]
mod gst;
#[cfg(feature = "gst")]
pub use gst::*;

mod yuv4mpeg;
pub use yuv4mpeg::*;

use {
    crate::VideoError,
    image::Image,
    std::path::Path,
};

pub trait FrameSource: Iterator<Item = Result<Image, VideoError>> {
    /// Number of frames the source will yield, if it can tell in advance.
    fn total_frames(&self) -> Result<usize, VideoError>;

    /// Short human readable kind, for logs.
    fn kind(&self) -> &'static str;
}

/// Resolve an input path to a frame source.
///
/// Directories are read as image sequences filtered by `ext`. Files are
/// picked by container: `.avi` (Motion-JPEG), `.y4m`, and anything else
/// through GStreamer when the `gst` feature is on.
pub fn open_source(path: impl AsRef<Path>, ext: &str) -> Result<Box<dyn FrameSource>, VideoError> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(Box::new(ImageDirectory::open(path, ext)?));
    }
    if !path.is_file() {
        return Err(VideoError::PathNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("avi") => match AviSource::open(path) {
            Ok(source) => Ok(Box::new(source)),
            Err(VideoError::Unsupported(reason)) => {
                base::log_debug!("{}: {}, trying the generic decoder", path.display(), reason);
                open_decoded(path)
            }
            Err(error) => Err(error),
        },
        Some("y4m") => Ok(Box::new(Y4mSource::open(path)?)),
        _ => open_decoded(path),
    }
}

#[cfg(feature = "gst")]
fn open_decoded(path: &Path) -> Result<Box<dyn FrameSource>, VideoError> {
    Ok(Box::new(GstSource::open(path)?))
}

#[cfg(not(feature = "gst"))]
fn open_decoded(path: &Path) -> Result<Box<dyn FrameSource>, VideoError> {
    Err(VideoError::Unsupported(format!(
        "{}: only MJPEG .avi and .y4m files can be read without the gst feature",
        path.display()
    )))
}
