use {
    base::{FileLogger, Level, StdoutLogger, TeeLogger},
    clap::Parser,
    depth_video::{DecodeErrorPolicy, PipelineConfig, SizePolicy},
    image::Colormap,
    indicatif::{ProgressBar, ProgressState, ProgressStyle},
    std::{fmt::Write, path::PathBuf, process::ExitCode},
};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Color-mapped monocular depth video", long_about = None)]
struct Args {
    /// Video file or directory of images.
    #[arg(long = "video_path", alias = "video-path")]
    video_path: PathBuf,

    /// Output Motion-JPEG AVI.
    #[arg(long = "video_path_output", alias = "video-path-output")]
    video_path_output: PathBuf,

    #[arg(long = "model_name", alias = "model-name")]
    model_name: String,

    /// Image extension to pick when the input is a directory.
    #[arg(long, default_value = "jpg")]
    ext: String,

    /// Run on the CPU even when CUDA is available.
    #[arg(long = "no_cuda", alias = "no-cuda")]
    no_cuda: bool,

    #[arg(long = "models_dir", alias = "models-dir", default_value = "models")]
    models_dir: PathBuf,

    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    #[arg(long, default_value_t = 95)]
    quality: u8,

    #[arg(long, default_value = "magma")]
    colormap: Colormap,

    /// fail or end.
    #[arg(long = "on_decode_error", alias = "on-decode-error", default_value = "fail")]
    on_decode_error: DecodeErrorPolicy,

    /// reject or rescale.
    #[arg(long = "on_size_mismatch", alias = "on-size-mismatch", default_value = "reject")]
    on_size_mismatch: SizePolicy,

    /// Also append the log to a daily file in this directory.
    #[arg(long = "log_dir", alias = "log-dir")]
    log_dir: Option<PathBuf>,

    /// debug, info, warn or error.
    #[arg(long = "log_level", alias = "log-level", default_value = "info")]
    log_level: Level,
}

fn init_logging(log_dir: Option<&PathBuf>) -> Result<(), String> {
    match log_dir {
        Some(dir) => {
            let file = FileLogger::new(dir).map_err(|e| format!("cannot log to {}: {e}", dir.display()))?;
            base::init_logger(TeeLogger::new().with(StdoutLogger).with(file));
        }
        None => base::init_stdout_logger(),
    }
    Ok(())
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} (ETA: {eta})")
    {
        pb.set_style(
            style
                .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                })
                .progress_chars("#>-"),
        );
    }
    pb
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} frames") {
        pb.set_style(style);
    }
    pb
}

fn main() -> ExitCode {
    let args = Args::parse();
    base::set_level(args.log_level);
    if let Err(err) = init_logging(args.log_dir.as_ref()) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let config = PipelineConfig::new(args.video_path, args.video_path_output, args.model_name)
        .with_ext(args.ext)
        .with_no_cuda(args.no_cuda)
        .with_models_dir(args.models_dir)
        .with_frame_rate(args.fps)
        .with_quality(args.quality)
        .with_colormap(args.colormap)
        .with_decode_error_policy(args.on_decode_error)
        .with_size_policy(args.on_size_mismatch);

    let mut pb: Option<ProgressBar> = None;
    let result = depth_video::run(config, |written, total| {
        let pb = pb.get_or_insert_with(|| match total {
            Some(total) => {
                let pb = progress_bar();
                pb.set_length(total as u64);
                pb
            }
            None => spinner(),
        });
        pb.set_position(written as u64);
        if total.is_none() {
            pb.tick();
        }
    });
    if let Some(pb) = pb {
        pb.finish();
    }

    match result {
        Ok(report) => {
            base::log_debug!("{:?}", report);
            println!("-> Done!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            base::log_error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
