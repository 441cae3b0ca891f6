use {
    crate::{DecodeErrorPolicy, PipelineConfig, PipelineError, SizePolicy},
    base::Vec2,
    image::{Image, resize_lanczos},
    inference::{
        DeviceChoice, Inference,
        depth::{DepthModel, ModelName, Monodepth2, colorize},
    },
    std::time::{Duration, Instant},
    video::{FrameSource, VideoError, VideoOut, open_source},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Loading,
    Streaming,
    Done,
    Failed,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub frames_read: usize,
    pub frames_written: usize,
    /// Frame count announced by the source, if it knows it.
    pub total: Option<usize>,
    pub output_size: Option<Vec2<usize>>,
    /// Inference plus colorize time of the first frame.
    pub first_frame: Option<Duration>,
    pub elapsed: Duration,
}

pub struct Pipeline {
    config: PipelineConfig,
    model_name: ModelName,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let model_name: ModelName = config.model_name.parse()?;
        if !config.frame_rate.is_finite() || config.frame_rate <= 0.0 {
            return Err(PipelineError::Configuration(format!(
                "frame rate must be positive, got {}",
                config.frame_rate
            )));
        }
        if !(1..=100).contains(&config.quality) {
            return Err(PipelineError::Configuration(format!(
                "quality must be between 1 and 100, got {}",
                config.quality
            )));
        }
        Ok(Self {
            config,
            model_name,
            state: PipelineState::Loading,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model_name(&self) -> ModelName {
        self.model_name
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn fail<T>(&mut self, err: impl Into<PipelineError>) -> Result<T, PipelineError> {
        self.state = PipelineState::Failed;
        Err(err.into())
    }

    /// Resolve the input into a frame source.
    pub fn open_source(&mut self) -> Result<Box<dyn FrameSource>, PipelineError> {
        match open_source(&self.config.video_path, &self.config.ext) {
            Ok(source) => Ok(source),
            Err(err) => self.fail(err),
        }
    }

    /// Load the configured Monodepth2 weights on the configured device.
    pub fn load_model(&mut self) -> Result<Monodepth2, PipelineError> {
        let choice = DeviceChoice::resolve(self.config.no_cuda);
        let loaded = Inference::new(choice)
            .and_then(|inference| inference.use_monodepth2(&self.config.models_dir, self.model_name));
        match loaded {
            Ok(model) => Ok(model),
            Err(err) => self.fail(err),
        }
    }

    /// Open the source and stream it through `model`.
    pub fn run<M: DepthModel>(
        &mut self,
        model: &M,
        on_frame: impl FnMut(usize, Option<usize>),
    ) -> Result<Report, PipelineError> {
        let source = self.open_source()?;
        self.stream(model, source, on_frame)
    }

    /// Predict, colorize and write every frame of `source`.
    ///
    /// `on_frame` is called after each written frame with the number of
    /// frames written so far and the source total, if known. The output is
    /// closed on every exit path.
    pub fn stream<M: DepthModel>(
        &mut self,
        model: &M,
        mut source: Box<dyn FrameSource>,
        mut on_frame: impl FnMut(usize, Option<usize>),
    ) -> Result<Report, PipelineError> {
        let total = match source.total_frames() {
            Ok(total) => {
                base::log_info!("   {} total frames in {}", total, source.kind());
                Some(total)
            }
            Err(VideoError::FrameCountUnknown) => {
                base::log_info!("   Could not determine the number of frames in {}", source.kind());
                base::log_info!("   No completion estimate can be provided");
                None
            }
            Err(err) => return self.fail(err),
        };

        self.state = PipelineState::Streaming;
        base::log_info!("-> Predicting with model {}", self.model_name);
        let started = Instant::now();
        let mut out = VideoOut::new(&self.config.output, self.config.video_out());
        let mut report = Report {
            frames_read: 0,
            frames_written: 0,
            total,
            output_size: None,
            first_frame: None,
            elapsed: Duration::ZERO,
        };

        let streamed = self.stream_frames(model, source.as_mut(), &mut out, &mut report, &mut on_frame);
        let closed = out.close();
        report.frames_written = out.frames_written();
        report.output_size = out.size();
        report.elapsed = started.elapsed();

        if let Err(err) = streamed {
            if let Err(close_err) = closed {
                base::log_error!("failed to close {}: {}", self.config.output.display(), close_err);
            }
            return self.fail(err);
        }
        if let Err(err) = closed {
            return self.fail(err);
        }

        self.state = PipelineState::Done;
        base::log_info!(
            "-> Wrote {} frames to {} in {:.2}s",
            report.frames_written,
            self.config.output.display(),
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    fn stream_frames<M: DepthModel>(
        &self,
        model: &M,
        source: &mut dyn FrameSource,
        out: &mut VideoOut,
        report: &mut Report,
        on_frame: &mut impl FnMut(usize, Option<usize>),
    ) -> Result<(), PipelineError> {
        loop {
            let frame = match source.next() {
                None => return Ok(()),
                Some(Ok(frame)) => frame,
                Some(Err(err)) => match self.config.on_decode_error {
                    DecodeErrorPolicy::Fail => return Err(err.into()),
                    DecodeErrorPolicy::EndOfStream => {
                        base::log_warn!(
                            "stopping at frame {}: {} ({} frames kept)",
                            report.frames_read,
                            err,
                            out.frames_written()
                        );
                        return Ok(());
                    }
                },
            };
            report.frames_read += 1;

            let predict_started = Instant::now();
            let disparity = model.predict(&frame)?;
            let color = colorize(&disparity, frame.size, self.config.colormap)?;
            let latency = predict_started.elapsed();
            self.write(out, color)?;

            if report.first_frame.is_none() {
                report.first_frame = Some(latency);
                if let Some(total) = report.total {
                    base::log_info!("   Single frame took {:.4} seconds", latency.as_secs_f64());
                    base::log_info!(
                        "   Estimated total time to finish: {:.4}",
                        latency.as_secs_f64() * total as f64
                    );
                }
            }
            on_frame(out.frames_written(), report.total);
        }
    }

    fn write(&self, out: &mut VideoOut, color: Image) -> Result<(), PipelineError> {
        match (out.size(), self.config.on_size_mismatch) {
            (Some(size), SizePolicy::Rescale) if size != color.size => {
                base::log_debug!("rescaling {} frame to {}", color.size, size);
                let rescaled = resize_lanczos(&color, size)?;
                out.write(&rescaled)?;
            }
            _ => out.write(&color)?,
        }
        Ok(())
    }
}

/// Run the whole pipeline: validate, resolve the input, load the model and
/// stream. The input is resolved before any weights are loaded.
pub fn run(config: PipelineConfig, on_frame: impl FnMut(usize, Option<usize>)) -> Result<Report, PipelineError> {
    let mut pipeline = Pipeline::new(config)?;
    let source = pipeline.open_source()?;
    let model = pipeline.load_model()?;
    pipeline.stream(&model, source, on_frame)
}
