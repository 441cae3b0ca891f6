//! Video input and output for the depth pipeline.
//!
//! Frames come in through a `FrameSource` (image folder, MJPEG AVI, Y4M or,
//! with the `gst` feature, anything GStreamer can decode) and go out through
//! a lazily opened Motion-JPEG AVI `VideoOut`.

pub mod avi;
pub use avi::{AviInfo, AviReader, AviWriter};

mod error;
pub use error::*;

pub mod source;
pub use source::{FrameSource, open_source};

mod videoout;
pub use videoout::*;
