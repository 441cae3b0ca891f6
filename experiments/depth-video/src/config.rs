use {
    image::Colormap,
    std::{fmt, path::PathBuf, str::FromStr},
    video::VideoOutConfig,
};

/// What to do when a frame cannot be read or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrorPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Treat the bad frame as the end of the input and keep what was written.
    EndOfStream,
}

impl fmt::Display for DecodeErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorPolicy::Fail => write!(f, "fail"),
            DecodeErrorPolicy::EndOfStream => write!(f, "end"),
        }
    }
}

impl FromStr for DecodeErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(DecodeErrorPolicy::Fail),
            "end" | "eos" | "end-of-stream" => Ok(DecodeErrorPolicy::EndOfStream),
            other => Err(format!("unknown decode error policy: {other} (expected fail or end)")),
        }
    }
}

/// What to do with a frame whose size differs from the output video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizePolicy {
    #[default]
    Reject,
    /// Lanczos-resize the color frame to the output size.
    Rescale,
}

impl fmt::Display for SizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizePolicy::Reject => write!(f, "reject"),
            SizePolicy::Rescale => write!(f, "rescale"),
        }
    }
}

impl FromStr for SizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(SizePolicy::Reject),
            "rescale" => Ok(SizePolicy::Rescale),
            other => Err(format!("unknown size policy: {other} (expected reject or rescale)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Video file or directory of images.
    pub video_path: PathBuf,
    pub output: PathBuf,
    pub model_name: String,
    /// Image extension used when `video_path` is a directory.
    pub ext: String,
    pub no_cuda: bool,
    pub models_dir: PathBuf,
    pub frame_rate: f64,
    pub quality: u8,
    pub colormap: Colormap,
    pub on_decode_error: DecodeErrorPolicy,
    pub on_size_mismatch: SizePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let out = VideoOutConfig::default();
        Self {
            video_path: PathBuf::new(),
            output: PathBuf::from("depth.avi"),
            model_name: "mono_640x192".to_string(),
            ext: "jpg".to_string(),
            no_cuda: false,
            models_dir: PathBuf::from("models"),
            frame_rate: out.frame_rate,
            quality: out.quality,
            colormap: Colormap::Magma,
            on_decode_error: DecodeErrorPolicy::default(),
            on_size_mismatch: SizePolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(video_path: impl Into<PathBuf>, output: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            video_path: video_path.into(),
            output: output.into(),
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn with_no_cuda(mut self, no_cuda: bool) -> Self {
        self.no_cuda = no_cuda;
        self
    }

    pub fn with_models_dir(mut self, models_dir: impl Into<PathBuf>) -> Self {
        self.models_dir = models_dir.into();
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn with_decode_error_policy(mut self, policy: DecodeErrorPolicy) -> Self {
        self.on_decode_error = policy;
        self
    }

    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.on_size_mismatch = policy;
        self
    }

    pub fn video_out(&self) -> VideoOutConfig {
        VideoOutConfig {
            frame_rate: self.frame_rate,
            quality: self.quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new("in", "out.avi", "mono_1024x320");
        assert_eq!(config.ext, "jpg");
        assert_eq!(config.frame_rate, 30.0);
        assert_eq!(config.quality, 95);
        assert_eq!(config.colormap, Colormap::Magma);
        assert_eq!(config.on_decode_error, DecodeErrorPolicy::Fail);
        assert_eq!(config.on_size_mismatch, SizePolicy::Reject);
        assert_eq!(config.models_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("END".parse::<DecodeErrorPolicy>(), Ok(DecodeErrorPolicy::EndOfStream));
        assert_eq!("fail".parse::<DecodeErrorPolicy>(), Ok(DecodeErrorPolicy::Fail));
        assert!("skip".parse::<DecodeErrorPolicy>().is_err());
        assert_eq!(" rescale".parse::<SizePolicy>(), Ok(SizePolicy::Rescale));
        assert!("crop".parse::<SizePolicy>().is_err());
    }
}
