use {
    super::{DepthDecoder, DepthModel, DisparityScales, Features, ModelName, ResnetEncoder, ResnetLayout},
    crate::InferError,
    base::Vec2,
    candle_core::{
        DType, Device, Tensor,
        pickle::{Object, Stack},
    },
    candle_nn::VarBuilder,
    std::{
        collections::HashMap,
        fs::File,
        io::{BufReader, Read},
        path::{Path, PathBuf},
    },
};

// torch.save archives since PyTorch 1.6 are zip files
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightFormat {
    Safetensors,
    /// PyTorch pickle (`torch.save` of a state dict).
    Pth,
}

/// Encoder and decoder weight files of one model directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightFiles {
    pub encoder: PathBuf,
    pub depth: PathBuf,
    pub format: WeightFormat,
}

impl WeightFiles {
    /// Prefer `{encoder,depth}.safetensors`, fall back to `{encoder,depth}.pth`.
    pub fn find(model_dir: &Path) -> Result<Self, InferError> {
        for (extension, format) in [("safetensors", WeightFormat::Safetensors), ("pth", WeightFormat::Pth)] {
            let encoder = model_dir.join(format!("encoder.{extension}"));
            let depth = model_dir.join(format!("depth.{extension}"));
            if encoder.is_file() && depth.is_file() {
                return Ok(Self {
                    encoder,
                    depth,
                    format,
                });
            }
        }
        Err(InferError::Io(format!(
            "no weights in {}: expected encoder/depth .safetensors or .pth (file not found)",
            model_dir.display()
        )))
    }
}

// tensor names and string metadata of a weight file
fn inspect(path: &Path, format: WeightFormat) -> Result<(Vec<String>, HashMap<String, String>), InferError> {
    match format {
        WeightFormat::Safetensors => {
            let file = std::fs::File::open(path)?;
            let mmap = unsafe { memmap2::Mmap::map(&file) }
                .map_err(|e| InferError::Io(format!("failed to memory-map safetensors file: {e}")))?;
            let (_, metadata) = safetensors::SafeTensors::read_metadata(&mmap)
                .map_err(|e| InferError::Io(format!("failed to read safetensors header: {e}")))?;
            let names = metadata.tensors().into_keys().collect();
            let extra = metadata.metadata().clone().unwrap_or_default();
            Ok((names, extra))
        }
        WeightFormat::Pth => {
            let infos = candle_core::pickle::read_pth_tensor_info(path, false, None)?;
            let names = infos.into_iter().map(|info| info.name).collect();
            Ok((names, pth_metadata(path)?))
        }
    }
}

/// Reject checkpoints in the pre-zip pickle format, which candle cannot read.
fn check_pth_archive(path: &Path) -> Result<(), InferError> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    if file.read_exact(&mut magic).is_ok() && magic == ZIP_MAGIC {
        return Ok(());
    }
    Err(InferError::Config(format!(
        "{} is a legacy PyTorch checkpoint (saved before PyTorch 1.6); \
         convert it to {} or re-save it with a current torch.save",
        path.display(),
        path.with_extension("safetensors").display()
    )))
}

// integer and string entries stored next to the tensors, e.g. `height`/`width`
fn pth_metadata(path: &Path) -> Result<HashMap<String, String>, InferError> {
    let zip_error = |e: zip::result::ZipError| InferError::Io(format!("{}: {e}", path.display()));
    let mut archive = zip::ZipArchive::new(BufReader::new(File::open(path)?)).map_err(zip_error)?;
    let Some(name) = archive
        .file_names()
        .find(|name| name.ends_with("data.pkl"))
        .map(str::to_string)
    else {
        return Ok(HashMap::new());
    };
    let mut stack = Stack::empty();
    stack.read_loop(&mut BufReader::new(archive.by_name(&name).map_err(zip_error)?))?;
    let Object::Dict(entries) = stack.finalize()? else {
        return Ok(HashMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| {
            let Object::Unicode(key) = key else {
                return None;
            };
            let value = match value {
                Object::Int(v) => v.to_string(),
                Object::Long(v) => v.to_string(),
                Object::Unicode(v) => v,
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}

fn var_builder(path: &Path, format: WeightFormat, device: &Device) -> Result<VarBuilder<'static>, InferError> {
    let vb = match format {
        WeightFormat::Safetensors => unsafe {
            VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)?
        },
        WeightFormat::Pth => VarBuilder::from_pth(path, DType::F32, device)?,
    };
    Ok(vb)
}

// training resolution stored next to the weights, if any
fn feed_size_from_metadata(metadata: &HashMap<String, String>) -> Option<Vec2<usize>> {
    let width = metadata.get("width")?.trim().parse().ok()?;
    let height = metadata.get("height")?.trim().parse().ok()?;
    let size = Vec2::new(width, height);
    (!size.is_empty()).then_some(size)
}

/// Monodepth2: ResNet encoder plus depth decoder, inference only.
#[derive(Debug)]
pub struct Monodepth2 {
    encoder: ResnetEncoder,
    decoder: DepthDecoder,
    feed_size: Vec2<usize>,
    device: Device,
}

impl Monodepth2 {
    /// Build from variable builders rooted at the state dict top level
    /// (`encoder.*`, `decoder.*`).
    pub fn load(
        encoder_vb: VarBuilder,
        decoder_vb: VarBuilder,
        layout: ResnetLayout,
        feed_size: Vec2<usize>,
        device: Device,
    ) -> Result<Self, InferError> {
        if feed_size.x % 32 != 0 || feed_size.y % 32 != 0 || feed_size.is_empty() {
            return Err(InferError::Shape(format!(
                "feed size {feed_size} must be a non-zero multiple of 32"
            )));
        }
        let encoder = ResnetEncoder::load(encoder_vb.pp("encoder"), layout)?;
        let decoder = DepthDecoder::load(decoder_vb.pp("decoder"), layout.num_ch_enc())?;
        Ok(Self {
            encoder,
            decoder,
            feed_size,
            device,
        })
    }

    pub(crate) fn from_dir(model_dir: &Path, name: ModelName, device: Device) -> Result<Self, InferError> {
        let files = WeightFiles::find(model_dir)?;
        if files.format == WeightFormat::Pth {
            check_pth_archive(&files.encoder)?;
            check_pth_archive(&files.depth)?;
        }
        let (names, metadata) = inspect(&files.encoder, files.format)?;
        let layout = ResnetLayout::from_weight_names(names.iter().map(String::as_str)).ok_or_else(|| {
            InferError::Shape(format!(
                "{} does not look like a ResNet encoder",
                files.encoder.display()
            ))
        })?;
        let feed_size = feed_size_from_metadata(&metadata).unwrap_or_else(|| name.feed_size());

        base::log_info!("   Loading pretrained encoder ({})", layout.name());
        let encoder_vb = var_builder(&files.encoder, files.format, &device)?;
        base::log_info!("   Loading pretrained decoder");
        let decoder_vb = var_builder(&files.depth, files.format, &device)?;

        let model = Self::load(encoder_vb, decoder_vb, layout, feed_size, device)?;
        base::log_info!("   Model feed size {}", feed_size);
        Ok(model)
    }

    pub fn encoder(&self) -> &ResnetEncoder {
        &self.encoder
    }
}

impl DepthModel for Monodepth2 {
    fn feed_size(&self) -> Vec2<usize> {
        self.feed_size
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn encode(&self, input: &Tensor) -> Result<Features, InferError> {
        let (_, channels, height, width) = input.dims4()?;
        if channels != 3 || height != self.feed_size.y || width != self.feed_size.x {
            return Err(InferError::Shape(format!(
                "encoder expects [1, 3, {}, {}], got {:?}",
                self.feed_size.y,
                self.feed_size.x,
                input.dims()
            )));
        }
        Ok(Features(self.encoder.forward_features(input)?))
    }

    fn decode(&self, features: &Features) -> Result<DisparityScales, InferError> {
        Ok(DisparityScales(self.decoder.forward_scales(&features.0)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;
    use image::{Image, PixelFormat};

    fn zero_model(feed_size: Vec2<usize>) -> Monodepth2 {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        Monodepth2::load(vb.clone(), vb, ResnetLayout::RESNET18, feed_size, device).unwrap()
    }

    #[test]
    fn test_predict_shapes() {
        let model = zero_model(Vec2::new(64, 32));
        let input = Tensor::zeros((1, 3, 32, 64), DType::F32, &Device::Cpu).unwrap();
        let features = model.encode(&input).unwrap();
        assert_eq!(features.0.len(), 5);
        let scales = model.decode(&features).unwrap();
        let dims: Vec<Vec<usize>> = scales.0.iter().map(|s| s.dims().to_vec()).collect();
        assert_eq!(
            dims,
            vec![
                vec![1, 1, 32, 64],
                vec![1, 1, 16, 32],
                vec![1, 1, 8, 16],
                vec![1, 1, 4, 8],
            ]
        );

        let frame = Image::new(Vec2::new(100, 40), vec![120; 100 * 40 * 3], PixelFormat::Rgb8);
        let disparity = model.predict(&frame).unwrap();
        assert_eq!(disparity.size, Vec2::new(64, 32));
        assert!(disparity.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_encode_checks_input_shape() {
        let model = zero_model(Vec2::new(64, 32));
        let input = Tensor::zeros((1, 3, 64, 64), DType::F32, &Device::Cpu).unwrap();
        assert!(matches!(model.encode(&input), Err(InferError::Shape(_))));
    }

    #[test]
    fn test_feed_size_must_be_multiple_of_32() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let result = Monodepth2::load(vb.clone(), vb, ResnetLayout::RESNET18, Vec2::new(100, 40), device);
        assert!(matches!(result, Err(InferError::Shape(_))));
    }

    // {'height': 192, 'width': 640} as a protocol 2 pickle
    const SIZE_PICKLE: &[u8] =
        b"\x80\x02}q\x00(X\x06\x00\x00\x00heightq\x01K\xc0X\x05\x00\x00\x00widthq\x02M\x80\x02u.";

    #[test]
    fn test_pth_metadata_from_zip_archive() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.pth");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("encoder/data.pkl", options).unwrap();
        zip.write_all(SIZE_PICKLE).unwrap();
        zip.finish().unwrap();

        check_pth_archive(&path).unwrap();
        let metadata = pth_metadata(&path).unwrap();
        assert_eq!(metadata.get("height").map(String::as_str), Some("192"));
        assert_eq!(feed_size_from_metadata(&metadata), Some(Vec2::new(640, 192)));
    }

    #[test]
    fn test_legacy_pth_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder.pth");
        // pre-1.6 files start with the pickled magic number
        std::fs::write(&path, b"\x80\x02\x8a\x0al\xfc\x9cF\xf9 j\xa8P\x19.").unwrap();
        match check_pth_archive(&path) {
            Err(InferError::Config(msg)) => {
                assert!(msg.contains("legacy"));
                assert!(msg.contains("encoder.safetensors"));
            }
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn test_feed_size_metadata() {
        let mut metadata = HashMap::new();
        assert_eq!(feed_size_from_metadata(&metadata), None);
        metadata.insert("width".to_string(), "1024".to_string());
        metadata.insert("height".to_string(), " 320".to_string());
        assert_eq!(feed_size_from_metadata(&metadata), Some(Vec2::new(1024, 320)));
    }
}
