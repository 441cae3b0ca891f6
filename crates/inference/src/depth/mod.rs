//! Monocular depth: Monodepth2 (ResNet encoder + multi-scale depth decoder)
//! and the pre/post-processing around it.

mod blocks;

mod colorize;
pub use colorize::*;

mod decoder;
pub use decoder::*;

mod encoder;
pub use encoder::*;

mod model;
pub use model::*;

mod monodepth;
pub use monodepth::*;

mod preprocess;
pub use preprocess::*;

use {
    crate::InferError,
    base::Vec2,
    candle_core::{DType, Device, Tensor},
    image::Image,
};

/// Encoder output: feature maps from finest to coarsest.
#[derive(Debug, Clone)]
pub struct Features(pub Vec<Tensor>);

/// Decoder output: one `[1, 1, h, w]` disparity tensor per scale.
#[derive(Debug, Clone)]
pub struct DisparityScales(pub Vec<Tensor>);

impl DisparityScales {
    pub fn get(&self, scale: usize) -> Option<&Tensor> {
        self.0.get(scale)
    }

    /// Scale 0, at the model's input resolution.
    pub fn finest(&self) -> Result<&Tensor, InferError> {
        self.get(0)
            .ok_or_else(|| InferError::Shape("decoder produced no disparity".to_string()))
    }
}

/// Single-channel disparity in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DisparityMap {
    pub size: Vec2<usize>,
    pub data: Vec<f32>,
}

impl DisparityMap {
    pub fn new(size: Vec2<usize>, data: Vec<f32>) -> Result<Self, InferError> {
        if data.len() != size.area() {
            return Err(InferError::Shape(format!(
                "disparity of {size} needs {} values, got {}",
                size.area(),
                data.len()
            )));
        }
        Ok(Self { size, data })
    }

    /// Copy a `[1, 1, h, w]` (or `[h, w]`) tensor back to the host.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self, InferError> {
        let dims = tensor.dims();
        let (height, width) = match dims {
            [1, 1, h, w] | [h, w] => (*h, *w),
            _ => {
                return Err(InferError::Shape(format!(
                    "expected a [1, 1, h, w] disparity tensor, got {dims:?}"
                )));
            }
        };
        let data = tensor
            .to_dtype(DType::F32)?
            .flatten_all()?
            .to_vec1::<f32>()?;
        Self::new(Vec2::new(width, height), data)
    }
}

/// Depth network split into its two stages.
pub trait DepthModel {
    /// Input resolution (width, height) the network was trained at.
    fn feed_size(&self) -> Vec2<usize>;

    fn device(&self) -> &Device;

    fn encode(&self, input: &Tensor) -> Result<Features, InferError>;

    fn decode(&self, features: &Features) -> Result<DisparityScales, InferError>;

    /// Preprocess, encode and decode one frame; returns scale 0 disparity.
    fn predict(&self, frame: &Image) -> Result<DisparityMap, InferError> {
        let input = preprocess(frame, self.feed_size(), self.device())?;
        let features = self.encode(&input)?;
        let scales = self.decode(&features)?;
        DisparityMap::from_tensor(scales.finest()?)
    }
}
