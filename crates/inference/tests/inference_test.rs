use {
    base::Vec2,
    candle_core::{DType, Device},
    candle_nn::{VarBuilder, VarMap},
    image::{Colormap, Image, PixelFormat},
    inference::{
        DeviceChoice, InferError, Inference,
        depth::{DepthDecoder, DepthModel, ModelName, ResnetEncoder, ResnetLayout, colorize},
    },
    std::path::Path,
};

fn cpu() -> Inference {
    Inference::new(DeviceChoice::Cpu).expect("CPU device")
}

// write randomly initialized ResNet-18 weights under the published names
fn write_weights(model_dir: &Path) {
    std::fs::create_dir_all(model_dir).unwrap();
    let device = Device::Cpu;

    let encoder_map = VarMap::new();
    let vb = VarBuilder::from_varmap(&encoder_map, DType::F32, &device);
    ResnetEncoder::load(vb.pp("encoder"), ResnetLayout::RESNET18).unwrap();
    encoder_map.save(model_dir.join("encoder.safetensors")).unwrap();

    let decoder_map = VarMap::new();
    let vb = VarBuilder::from_varmap(&decoder_map, DType::F32, &device);
    DepthDecoder::load(vb.pp("decoder"), ResnetLayout::RESNET18.num_ch_enc()).unwrap();
    decoder_map.save(model_dir.join("depth.safetensors")).unwrap();
}

#[test]
fn test_inference_cpu() {
    let inference = cpu();
    assert!(inference.device().is_cpu());
}

#[test]
fn test_no_cuda_resolves_to_cpu() {
    assert_eq!(DeviceChoice::resolve(true), DeviceChoice::Cpu);
}

#[test]
fn test_missing_weights_fail() {
    let dir = tempfile::tempdir().unwrap();
    let result = cpu().use_monodepth2(dir.path(), ModelName::Mono640x192);
    match result {
        Err(InferError::Io(msg)) => assert!(msg.contains("not found")),
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[test]
fn test_legacy_pth_weights_fail_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let model_dir = dir.path().join("mono_640x192");
    std::fs::create_dir_all(&model_dir).unwrap();
    // torch.save output from before the zip container
    let legacy = b"\x80\x02\x8a\x0al\xfc\x9cF\xf9 j\xa8P\x19.";
    std::fs::write(model_dir.join("encoder.pth"), legacy).unwrap();
    std::fs::write(model_dir.join("depth.pth"), legacy).unwrap();

    match cpu().use_monodepth2(dir.path(), ModelName::Mono640x192) {
        Err(InferError::Config(msg)) => assert!(msg.contains("safetensors")),
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_loads_safetensors_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_weights(&dir.path().join("mono_640x192"));

    let model = cpu()
        .use_monodepth2(dir.path(), ModelName::Mono640x192)
        .unwrap();
    assert_eq!(model.feed_size(), Vec2::new(640, 192));
    assert_eq!(*model.encoder().layout(), ResnetLayout::RESNET18);

    let frame = Image::new(Vec2::new(320, 240), vec![100; 320 * 240 * 3], PixelFormat::Rgb8);
    let disparity = model.predict(&frame).unwrap();
    assert_eq!(disparity.size, Vec2::new(640, 192));

    let color = colorize(&disparity, frame.size, Colormap::Magma).unwrap();
    assert_eq!(color.size, frame.size);
    assert_eq!(color.format, PixelFormat::Rgb8);
}

#[test]
fn test_monodepth2_with_real_model() {
    let models_dir = "../../models";
    let name = ModelName::Mono640x192;
    if !Path::new(models_dir).join(name.as_str()).exists() {
        eprintln!("Skipping real model test: {}/{} not found", models_dir, name);
        return;
    }

    let model = cpu().use_monodepth2(models_dir, name).expect("Failed to load real model");
    assert_eq!(model.feed_size(), Vec2::new(640, 192));

    // top half bright, bottom half dark: any sane model disagrees across it
    let size = Vec2::new(640, 480);
    let mut data = vec![200u8; size.area() * 3];
    data[size.area() * 3 / 2..].fill(30);
    let frame = Image::new(size, data, PixelFormat::Rgb8);

    let disparity = model.predict(&frame).expect("Inference failed");
    let min = disparity.data.iter().copied().fold(f32::INFINITY, f32::min);
    let max = disparity.data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    assert!(min >= 0.0 && max <= 1.0);
    assert!(max > min);
}
