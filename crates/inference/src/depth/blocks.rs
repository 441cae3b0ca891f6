// Building blocks for the ResNet encoder and the depth decoder.
// Weight names follow the torchvision ResNet and Monodepth2 state dicts.

use candle_core::{Result, Tensor};
use candle_nn::{
    BatchNorm, Conv2d, Conv2dConfig, Module, VarBuilder, batch_norm, conv2d, conv2d_no_bias,
};

const BN_EPS: f64 = 1e-5;

/// Mirror one row/column on each side of dims 2 and 3 (NCHW).
///
/// A dimension of size 1 has nothing to mirror and is replicated instead.
pub fn reflection_pad1(xs: &Tensor) -> Result<Tensor> {
    let xs = pad_dim(xs, 2)?;
    pad_dim(&xs, 3)
}

fn pad_dim(xs: &Tensor, dim: usize) -> Result<Tensor> {
    let n = xs.dim(dim)?;
    let (left, right) = if n < 2 {
        (xs.narrow(dim, 0, 1)?, xs.narrow(dim, 0, 1)?)
    } else {
        (xs.narrow(dim, 1, 1)?, xs.narrow(dim, n - 2, 1)?)
    };
    Tensor::cat(&[&left, xs, &right], dim)
}

fn conv_bn(
    vb_conv: VarBuilder,
    vb_bn: VarBuilder,
    c1: usize,
    c2: usize,
    k: usize,
    stride: usize,
    padding: usize,
) -> Result<(Conv2d, BatchNorm)> {
    let conv = conv2d_no_bias(
        c1,
        c2,
        k,
        Conv2dConfig {
            stride,
            padding,
            ..Default::default()
        },
        vb_conv,
    )?;
    let bn = batch_norm(c2, BN_EPS, vb_bn)?;
    Ok((conv, bn))
}

/// 1x1 projection on the residual path (`downsample.0`, `downsample.1`).
#[derive(Debug)]
pub struct Downsample {
    conv: Conv2d,
    bn: BatchNorm,
}

impl Downsample {
    pub fn load(vb: VarBuilder, c1: usize, c2: usize, stride: usize) -> Result<Self> {
        let (conv, bn) = conv_bn(vb.pp("0"), vb.pp("1"), c1, c2, 1, stride, 0)?;
        Ok(Self { conv, bn })
    }
}

impl Module for Downsample {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        xs.apply(&self.conv)?.apply_t(&self.bn, false)
    }
}

/// Two 3x3 convolutions with an identity shortcut (ResNet-18/34).
#[derive(Debug)]
pub struct BasicBlock {
    conv1: Conv2d,
    bn1: BatchNorm,
    conv2: Conv2d,
    bn2: BatchNorm,
    downsample: Option<Downsample>,
}

impl BasicBlock {
    pub const EXPANSION: usize = 1;

    pub fn load(vb: VarBuilder, c1: usize, planes: usize, stride: usize) -> Result<Self> {
        let (conv1, bn1) = conv_bn(vb.pp("conv1"), vb.pp("bn1"), c1, planes, 3, stride, 1)?;
        let (conv2, bn2) = conv_bn(vb.pp("conv2"), vb.pp("bn2"), planes, planes, 3, 1, 1)?;
        let downsample = if stride != 1 || c1 != planes {
            Some(Downsample::load(vb.pp("downsample"), c1, planes, stride)?)
        } else {
            None
        };
        Ok(Self {
            conv1,
            bn1,
            conv2,
            bn2,
            downsample,
        })
    }
}

impl Module for BasicBlock {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let out = xs
            .apply(&self.conv1)?
            .apply_t(&self.bn1, false)?
            .relu()?
            .apply(&self.conv2)?
            .apply_t(&self.bn2, false)?;
        let identity = match &self.downsample {
            Some(downsample) => xs.apply(downsample)?,
            None => xs.clone(),
        };
        (out + identity)?.relu()
    }
}

/// 1x1, 3x3, 1x1 bottleneck with a 4x wider output (ResNet-50 and up).
#[derive(Debug)]
pub struct Bottleneck {
    conv1: Conv2d,
    bn1: BatchNorm,
    conv2: Conv2d,
    bn2: BatchNorm,
    conv3: Conv2d,
    bn3: BatchNorm,
    downsample: Option<Downsample>,
}

impl Bottleneck {
    pub const EXPANSION: usize = 4;

    pub fn load(vb: VarBuilder, c1: usize, planes: usize, stride: usize) -> Result<Self> {
        let c2 = planes * Self::EXPANSION;
        let (conv1, bn1) = conv_bn(vb.pp("conv1"), vb.pp("bn1"), c1, planes, 1, 1, 0)?;
        // stride sits on the 3x3 conv, as in torchvision
        let (conv2, bn2) = conv_bn(vb.pp("conv2"), vb.pp("bn2"), planes, planes, 3, stride, 1)?;
        let (conv3, bn3) = conv_bn(vb.pp("conv3"), vb.pp("bn3"), planes, c2, 1, 1, 0)?;
        let downsample = if stride != 1 || c1 != c2 {
            Some(Downsample::load(vb.pp("downsample"), c1, c2, stride)?)
        } else {
            None
        };
        Ok(Self {
            conv1,
            bn1,
            conv2,
            bn2,
            conv3,
            bn3,
            downsample,
        })
    }
}

impl Module for Bottleneck {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let out = xs
            .apply(&self.conv1)?
            .apply_t(&self.bn1, false)?
            .relu()?
            .apply(&self.conv2)?
            .apply_t(&self.bn2, false)?
            .relu()?
            .apply(&self.conv3)?
            .apply_t(&self.bn3, false)?;
        let identity = match &self.downsample {
            Some(downsample) => xs.apply(downsample)?,
            None => xs.clone(),
        };
        (out + identity)?.relu()
    }
}

/// Reflection-padded 3x3 convolution with bias.
#[derive(Debug)]
pub struct Conv3x3 {
    conv: Conv2d,
}

impl Conv3x3 {
    pub fn load(vb: VarBuilder, c1: usize, c2: usize) -> Result<Self> {
        let conv = conv2d(c1, c2, 3, Conv2dConfig::default(), vb.pp("conv"))?;
        Ok(Self { conv })
    }
}

impl Module for Conv3x3 {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        reflection_pad1(xs)?.apply(&self.conv)
    }
}

/// `Conv3x3` followed by ELU.
#[derive(Debug)]
pub struct ConvBlock {
    conv: Conv3x3,
}

impl ConvBlock {
    pub fn load(vb: VarBuilder, c1: usize, c2: usize) -> Result<Self> {
        let conv = Conv3x3::load(vb.pp("conv"), c1, c2)?;
        Ok(Self { conv })
    }
}

impl Module for ConvBlock {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        xs.apply(&self.conv)?.elu(1.0)
    }
}
