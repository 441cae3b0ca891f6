use {
    super::blocks::{Conv3x3, ConvBlock},
    candle_core::{Result, Tensor},
    candle_nn::{Module, VarBuilder, ops::sigmoid},
};

pub const NUM_CH_DEC: [usize; 5] = [16, 32, 64, 128, 256];
pub const SCALES: usize = 4;

/// U-Net style decoder producing sigmoid disparity at four scales.
///
/// Weights are a flat `decoder.<n>` list: upconvs (4,0), (4,1), (3,0) ...
/// (0,1) first, then the four disparity heads.
#[derive(Debug)]
pub struct DepthDecoder {
    // upconvs[i] = (conv before upsampling, conv after the skip concat)
    upconvs: Vec<(ConvBlock, ConvBlock)>,
    dispconvs: Vec<Conv3x3>,
}

impl DepthDecoder {
    pub fn load(vb: VarBuilder, num_ch_enc: [usize; 5]) -> Result<Self> {
        let mut upconvs = Vec::with_capacity(5);
        for i in 0..5 {
            let index = (4 - i) * 2;
            let c_in = if i == 4 { num_ch_enc[4] } else { NUM_CH_DEC[i + 1] };
            let first = ConvBlock::load(vb.pp(index), c_in, NUM_CH_DEC[i])?;
            let skip = if i > 0 { num_ch_enc[i - 1] } else { 0 };
            let second = ConvBlock::load(vb.pp(index + 1), NUM_CH_DEC[i] + skip, NUM_CH_DEC[i])?;
            upconvs.push((first, second));
        }
        let mut dispconvs = Vec::with_capacity(SCALES);
        for scale in 0..SCALES {
            dispconvs.push(Conv3x3::load(vb.pp(10 + scale), NUM_CH_DEC[scale], 1)?);
        }
        Ok(Self { upconvs, dispconvs })
    }

    /// Disparity maps indexed by scale; scale `s` is 1/2^s of the input.
    pub fn forward_scales(&self, features: &[Tensor]) -> Result<Vec<Tensor>> {
        if features.len() != 5 {
            candle_core::bail!("depth decoder needs 5 feature maps, got {}", features.len());
        }
        let mut outputs: Vec<Option<Tensor>> = vec![None; SCALES];
        let mut xs = features[4].clone();
        for i in (0..5).rev() {
            let (first, second) = &self.upconvs[i];
            xs = xs.apply(first)?;
            let (_, _, h, w) = xs.dims4()?;
            xs = xs.upsample_nearest2d(h * 2, w * 2)?;
            if i > 0 {
                xs = Tensor::cat(&[&xs, &features[i - 1]], 1)?;
            }
            xs = xs.apply(second)?;
            if i < SCALES {
                outputs[i] = Some(sigmoid(&xs.apply(&self.dispconvs[i])?)?);
            }
        }
        Ok(outputs.into_iter().flatten().collect())
    }
}
