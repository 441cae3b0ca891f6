use {
    super::FrameSource,
    crate::VideoError,
    base::Vec2,
    gst::prelude::*,
    gstreamer as gst,
    gstreamer_app as gst_app,
    gstreamer_video as gst_video,
    image::{Image, PixelFormat},
    std::path::Path,
};

fn gst_error(error: impl std::fmt::Display) -> VideoError {
    VideoError::Container(format!("GStreamer: {error}"))
}

/// Any file GStreamer's `decodebin` can play, converted to packed RGB.
pub struct GstSource {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    total_frames: Option<usize>,
    done: bool,
}

impl GstSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        let path = path.as_ref();
        gst::init().map_err(gst_error)?;

        let pipeline = gst::Pipeline::default();
        let filesrc = gst::ElementFactory::make("filesrc")
            .property("location", path.to_string_lossy().as_ref())
            .build()
            .map_err(gst_error)?;
        let decodebin = gst::ElementFactory::make("decodebin")
            .build()
            .map_err(gst_error)?;
        let videoconvert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(gst_error)?;
        let appsink = gst_app::AppSink::builder()
            .caps(
                &gst_video::VideoCapsBuilder::new()
                    .format(gst_video::VideoFormat::Rgb)
                    .build(),
            )
            .sync(false)
            .build();

        pipeline
            .add_many([&filesrc, &decodebin, &videoconvert, appsink.upcast_ref()])
            .map_err(gst_error)?;
        gst::Element::link_many([&filesrc, &decodebin]).map_err(gst_error)?;
        gst::Element::link_many([&videoconvert, appsink.upcast_ref()]).map_err(gst_error)?;

        // decodebin exposes its pads only once the stream type is known
        let videoconvert_weak = videoconvert.downgrade();
        decodebin.connect_pad_added(move |_, src_pad| {
            let Some(videoconvert) = videoconvert_weak.upgrade() else {
                return;
            };
            let is_video = src_pad
                .current_caps()
                .and_then(|caps| {
                    caps.structure(0)
                        .map(|structure| structure.name().starts_with("video/"))
                })
                .unwrap_or(false);
            if !is_video {
                return;
            }
            let Some(sink_pad) = videoconvert.static_pad("sink") else {
                return;
            };
            if sink_pad.is_linked() {
                return;
            }
            if let Err(error) = src_pad.link(&sink_pad) {
                base::log_error!("cannot link decoded video: {:?}", error);
            }
        });

        // preroll so duration and caps can be queried
        pipeline.set_state(gst::State::Paused).map_err(gst_error)?;
        let (result, _, _) = pipeline.state(gst::ClockTime::from_seconds(10));
        if let Err(error) = result {
            let _ = pipeline.set_state(gst::State::Null);
            return Err(Self::bus_error(&pipeline).unwrap_or_else(|| gst_error(error)));
        }
        let total_frames = Self::query_total_frames(&pipeline, &appsink);
        pipeline.set_state(gst::State::Playing).map_err(gst_error)?;

        Ok(Self {
            pipeline,
            appsink,
            total_frames,
            done: false,
        })
    }

    fn query_total_frames(pipeline: &gst::Pipeline, appsink: &gst_app::AppSink) -> Option<usize> {
        let duration = pipeline.query_duration::<gst::ClockTime>()?;
        let caps = appsink.static_pad("sink")?.current_caps()?;
        let info = gst_video::VideoInfo::from_caps(&caps).ok()?;
        let fps = info.fps();
        if fps.numer() <= 0 || fps.denom() <= 0 {
            return None;
        }
        let seconds = duration.nseconds() as f64 / 1e9;
        let frames = (seconds * fps.numer() as f64 / fps.denom() as f64).round();
        (frames > 0.0).then_some(frames as usize)
    }

    fn bus_error(pipeline: &gst::Pipeline) -> Option<VideoError> {
        let bus = pipeline.bus()?;
        let message = bus.pop_filtered(&[gst::MessageType::Error])?;
        match message.view() {
            gst::MessageView::Error(error) => Some(VideoError::InvalidFrame(format!(
                "GStreamer: {}",
                error.error()
            ))),
            _ => None,
        }
    }

    fn read_frame(&mut self) -> Result<Option<Image>, VideoError> {
        if self.appsink.is_eos() {
            return Ok(None);
        }
        let sample = match self.appsink.pull_sample() {
            Ok(sample) => sample,
            Err(error) => {
                if self.appsink.is_eos() {
                    return Ok(None);
                }
                return Err(Self::bus_error(&self.pipeline).unwrap_or_else(|| gst_error(error)));
            }
        };
        let caps = sample
            .caps()
            .ok_or_else(|| VideoError::InvalidFrame("sample without caps".to_string()))?;
        let buffer = sample
            .buffer()
            .ok_or_else(|| VideoError::InvalidFrame("sample without buffer".to_string()))?;
        let info = gst_video::VideoInfo::from_caps(caps).map_err(gst_error)?;
        let frame =
            gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, &info).map_err(gst_error)?;

        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let stride = frame.plane_stride()[0] as usize;
        let plane = frame.plane_data(0).map_err(gst_error)?;
        let row = width * 3;
        let mut data = Vec::with_capacity(row * height);
        for y in 0..height {
            let start = y * stride;
            let line = plane
                .get(start..start + row)
                .ok_or_else(|| VideoError::InvalidFrame("short video plane".to_string()))?;
            data.extend_from_slice(line);
        }
        Ok(Some(Image::new(Vec2::new(width, height), data, PixelFormat::Rgb8)))
    }
}

impl Iterator for GstSource {
    type Item = Result<Image, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_frame() {
            Ok(Some(image)) => Some(Ok(image)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl FrameSource for GstSource {
    fn total_frames(&self) -> Result<usize, VideoError> {
        self.total_frames.ok_or(VideoError::FrameCountUnknown)
    }

    fn kind(&self) -> &'static str {
        "GStreamer"
    }
}

impl Drop for GstSource {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{VideoOut, VideoOutConfig},
    };

    fn plugins_available() -> bool {
        gst::init().is_ok()
            && ["filesrc", "decodebin", "videoconvert", "appsink", "avidemux", "jpegdec"]
                .iter()
                .all(|name| gst::ElementFactory::find(name).is_some())
    }

    fn gray(size: Vec2<usize>, value: u8) -> Image {
        Image::new(size, vec![value; size.area() * 3], PixelFormat::Rgb8)
    }

    #[test]
    fn test_reads_mjpeg_avi_through_decodebin() {
        if !plugins_available() {
            eprintln!("Skipping GStreamer test: avidemux/jpegdec not installed");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        let size = Vec2::new(64, 48);
        let mut out = VideoOut::new(&path, VideoOutConfig::default());
        for i in 0..6u8 {
            out.write(&gray(size, 40 + i * 20)).unwrap();
        }
        assert_eq!(out.close().unwrap(), 6);

        let source = GstSource::open(&path).unwrap();
        assert_eq!(source.kind(), "GStreamer");
        if let Ok(total) = source.total_frames() {
            assert_eq!(total, 6);
        }
        let frames: Vec<Image> = source.map(|frame| frame.unwrap()).collect();
        assert_eq!(frames.len(), 6);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.size, size);
            assert_eq!(frame.format, PixelFormat::Rgb8);
            let mean = frame.data.iter().map(|&v| v as f64).sum::<f64>() / frame.data.len() as f64;
            assert!((mean - (40 + i * 20) as f64).abs() < 6.0, "frame {i} mean {mean}");
        }
    }

    #[test]
    fn test_garbage_file_fails_to_open() {
        if !plugins_available() {
            eprintln!("Skipping GStreamer test: avidemux/jpegdec not installed");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, vec![0x5a; 4096]).unwrap();
        assert!(GstSource::open(&path).is_err());
    }
}
