//! Frame images for the depth pipeline.
//!
//! An `Image` is a packed byte buffer tagged with its size and pixel format.
//! Everything that reaches the model is converted to `PixelFormat::Rgb8`
//! first; the other formats only exist as decode inputs.

mod colormap;
pub use colormap::*;

mod error;
pub use error::*;

mod image;
pub use image::*;

mod jpeg;
pub use jpeg::*;

mod load;
pub use load::*;

mod pixelformat;
pub use pixelformat::*;

mod resize;
pub use resize::*;

mod yuv;
pub use yuv::*;
