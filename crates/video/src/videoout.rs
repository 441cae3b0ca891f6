use {
    crate::{AviWriter, VideoError},
    base::Vec2,
    image::{Image, PixelFormat, encode_jpeg},
    std::{
        fs::File,
        io::BufWriter,
        path::{Path, PathBuf},
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoOutConfig {
    pub frame_rate: f64,
    /// JPEG quality, 1 to 100.
    pub quality: u8,
}

impl Default for VideoOutConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            quality: 95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Uninitialized,
    Open,
    Closed,
}

/// Motion-JPEG AVI output that opens on the first frame.
///
/// The output size is fixed by that first frame; later frames must match
/// it. Nothing is created on disk until a frame arrives.
pub struct VideoOut {
    path: PathBuf,
    config: VideoOutConfig,
    writer: Option<AviWriter<BufWriter<File>>>,
    state: WriterState,
    size: Option<Vec2<usize>>,
    frames: usize,
}

impl VideoOut {
    pub fn new(path: impl Into<PathBuf>, config: VideoOutConfig) -> Self {
        Self {
            path: path.into(),
            config,
            writer: None,
            state: WriterState::Uninitialized,
            size: None,
            frames: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &VideoOutConfig {
        &self.config
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Output size, once the first frame has been written.
    pub fn size(&self) -> Option<Vec2<usize>> {
        self.size
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    /// Encode and append one `Rgb8` frame.
    pub fn write(&mut self, image: &Image) -> Result<(), VideoError> {
        if self.state == WriterState::Closed {
            return Err(VideoError::Closed);
        }
        image.format.ensure_format(PixelFormat::Rgb8)?;
        image.validate()?;
        if let Some(expected) = self.size {
            if expected != image.size {
                return Err(VideoError::FrameSize {
                    expected,
                    got: image.size,
                });
            }
        }

        let jpeg = encode_jpeg(image, self.config.quality)?;
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                let writer = AviWriter::create(&self.path, image.size, self.config.frame_rate)?;
                base::log_info!(
                    "writing {} ({}, {} fps, MJPG)",
                    self.path.display(),
                    image.size,
                    self.config.frame_rate
                );
                self.state = WriterState::Open;
                self.size = Some(image.size);
                writer
            }
        };
        self.writer.insert(writer).write_jpeg(&jpeg)?;
        self.frames += 1;
        Ok(())
    }

    /// Finalize the file and return the number of frames in it.
    ///
    /// Closing an output that never received a frame creates no file.
    pub fn close(&mut self) -> Result<usize, VideoError> {
        self.state = WriterState::Closed;
        if let Some(mut writer) = self.writer.take() {
            writer.finish()?;
            base::log_debug!("closed {} after {} frames", self.path.display(), self.frames);
        }
        Ok(self.frames)
    }
}
