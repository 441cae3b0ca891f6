//! Depth video: run a Monodepth2 model over a video or an image folder and
//! write the color-mapped disparity as a Motion-JPEG AVI.

mod config;
pub use config::*;

mod error;
pub use error::*;

mod pipeline;
pub use pipeline::*;
