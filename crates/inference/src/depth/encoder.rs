use {
    super::blocks::{BasicBlock, Bottleneck},
    candle_core::{Result, Tensor},
    candle_nn::{
        BatchNorm, Conv2d, Conv2dConfig, Module, VarBuilder, batch_norm, conv2d_no_bias,
    },
};

const PLANES: [usize; 4] = [64, 128, 256, 512];

/// Shape of a ResNet backbone: residual blocks per stage and block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResnetLayout {
    pub blocks: [usize; 4],
    pub bottleneck: bool,
}

impl ResnetLayout {
    pub const RESNET18: Self = Self {
        blocks: [2, 2, 2, 2],
        bottleneck: false,
    };
    pub const RESNET34: Self = Self {
        blocks: [3, 4, 6, 3],
        bottleneck: false,
    };
    pub const RESNET50: Self = Self {
        blocks: [3, 4, 6, 3],
        bottleneck: true,
    };

    /// Work the layout out from encoder weight names
    /// (`encoder.layer<stage>.<block>.<conv>.weight`).
    pub fn from_weight_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut blocks = [0usize; 4];
        let mut bottleneck = false;
        for name in names {
            let Some(rest) = name.strip_prefix("encoder.layer") else {
                continue;
            };
            let mut parts = rest.split('.');
            let (Some(stage), Some(block), Some(module)) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            let (Ok(stage), Ok(block)) = (stage.parse::<usize>(), block.parse::<usize>()) else {
                continue;
            };
            if !(1..=4).contains(&stage) {
                continue;
            }
            blocks[stage - 1] = blocks[stage - 1].max(block + 1);
            if module == "conv3" {
                bottleneck = true;
            }
        }
        blocks.iter().all(|&n| n > 0).then_some(Self { blocks, bottleneck })
    }

    pub fn expansion(&self) -> usize {
        if self.bottleneck {
            Bottleneck::EXPANSION
        } else {
            BasicBlock::EXPANSION
        }
    }

    /// Channels of the five feature maps the encoder returns.
    pub fn num_ch_enc(&self) -> [usize; 5] {
        let e = self.expansion();
        [64, 64 * e, 128 * e, 256 * e, 512 * e]
    }

    pub fn name(&self) -> String {
        let depth = match (self.blocks, self.bottleneck) {
            ([2, 2, 2, 2], false) => "18",
            ([3, 4, 6, 3], false) => "34",
            ([3, 4, 6, 3], true) => "50",
            ([3, 4, 23, 3], true) => "101",
            ([3, 8, 36, 3], true) => "152",
            _ => return format!("ResNet{:?}", self.blocks),
        };
        format!("ResNet-{depth}")
    }
}

#[derive(Debug)]
enum Block {
    Basic(BasicBlock),
    Bottleneck(Bottleneck),
}

impl Module for Block {
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        match self {
            Block::Basic(block) => block.forward(xs),
            Block::Bottleneck(block) => block.forward(xs),
        }
    }
}

/// ResNet feature extractor returning the stem output and all four stages.
#[derive(Debug)]
pub struct ResnetEncoder {
    conv1: Conv2d,
    bn1: BatchNorm,
    layers: [Vec<Block>; 4],
    layout: ResnetLayout,
}

impl ResnetEncoder {
    pub fn load(vb: VarBuilder, layout: ResnetLayout) -> Result<Self> {
        let conv1 = conv2d_no_bias(
            3,
            64,
            7,
            Conv2dConfig {
                stride: 2,
                padding: 3,
                ..Default::default()
            },
            vb.pp("conv1"),
        )?;
        let bn1 = batch_norm(64, 1e-5, vb.pp("bn1"))?;

        let expansion = layout.expansion();
        let mut c1 = 64;
        let mut layers: [Vec<Block>; 4] = Default::default();
        for (stage, layer) in layers.iter_mut().enumerate() {
            let vb = vb.pp(format!("layer{}", stage + 1));
            let planes = PLANES[stage];
            for i in 0..layout.blocks[stage] {
                let stride = if stage > 0 && i == 0 { 2 } else { 1 };
                let block = if layout.bottleneck {
                    Block::Bottleneck(Bottleneck::load(vb.pp(i), c1, planes, stride)?)
                } else {
                    Block::Basic(BasicBlock::load(vb.pp(i), c1, planes, stride)?)
                };
                layer.push(block);
                c1 = planes * expansion;
            }
        }

        Ok(Self {
            conv1,
            bn1,
            layers,
            layout,
        })
    }

    pub fn layout(&self) -> &ResnetLayout {
        &self.layout
    }

    /// Five feature maps at 1/2, 1/4, 1/8, 1/16 and 1/32 of the input.
    pub fn forward_features(&self, xs: &Tensor) -> Result<Vec<Tensor>> {
        let mut features = Vec::with_capacity(5);
        // ImageNet-style normalization baked into the model
        let xs = xs.affine(1.0 / 0.225, -0.45 / 0.225)?;
        let xs = xs.apply(&self.conv1)?.apply_t(&self.bn1, false)?.relu()?;
        features.push(xs.clone());

        // 3x3/2 max pool, padding 1; zero padding is safe after the ReLU
        let mut xs = xs
            .pad_with_zeros(2, 1, 1)?
            .pad_with_zeros(3, 1, 1)?
            .max_pool2d_with_stride(3, 2)?;
        for layer in &self.layers {
            for block in layer {
                xs = xs.apply(block)?;
            }
            features.push(xs.clone());
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_layout_from_names() {
        let names = [
            "encoder.conv1.weight",
            "encoder.layer1.1.conv2.weight",
            "encoder.layer2.1.bn1.running_mean",
            "encoder.layer3.1.conv1.weight",
            "encoder.layer4.1.downsample.0.weight",
            "encoder.fc.weight",
        ];
        assert_eq!(
            ResnetLayout::from_weight_names(names),
            Some(ResnetLayout::RESNET18)
        );

        let names = [
            "encoder.layer1.2.conv3.weight",
            "encoder.layer2.3.conv1.weight",
            "encoder.layer3.5.conv1.weight",
            "encoder.layer4.2.conv1.weight",
        ];
        assert_eq!(
            ResnetLayout::from_weight_names(names),
            Some(ResnetLayout::RESNET50)
        );

        assert_eq!(ResnetLayout::from_weight_names(["encoder.conv1.weight"]), None);
    }

    #[test]
    fn test_layout_names() {
        assert_eq!(ResnetLayout::RESNET18.name(), "ResNet-18");
        assert_eq!(ResnetLayout::RESNET50.num_ch_enc(), [64, 256, 512, 1024, 2048]);
    }

    #[test]
    fn test_resnet18_feature_shapes() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let encoder = ResnetEncoder::load(vb, ResnetLayout::RESNET18).unwrap();

        let xs = Tensor::zeros((1, 3, 64, 96), DType::F32, &device).unwrap();
        let features = encoder.forward_features(&xs).unwrap();
        let dims: Vec<Vec<usize>> = features.iter().map(|f| f.dims().to_vec()).collect();
        assert_eq!(
            dims,
            vec![
                vec![1, 64, 32, 48],
                vec![1, 64, 16, 24],
                vec![1, 128, 8, 12],
                vec![1, 256, 4, 6],
                vec![1, 512, 2, 3],
            ]
        );
    }

    #[test]
    fn test_resnet50_channels() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let encoder = ResnetEncoder::load(vb, ResnetLayout::RESNET50).unwrap();

        let xs = Tensor::zeros((1, 3, 64, 64), DType::F32, &device).unwrap();
        let features = encoder.forward_features(&xs).unwrap();
        let channels: Vec<usize> = features.iter().map(|f| f.dims()[1]).collect();
        assert_eq!(channels, ResnetLayout::RESNET50.num_ch_enc().to_vec());
    }
}
