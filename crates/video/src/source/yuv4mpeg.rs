use {
    super::FrameSource,
    crate::VideoError,
    base::Vec2,
    image::{Image, PixelFormat},
    std::{
        fs::File,
        io::{BufReader, Read},
        path::Path,
    },
};

/// YUV4MPEG2 stream. The header carries no frame count.
pub struct Y4mSource<R: Read = BufReader<File>> {
    decoder: y4m::Decoder<R>,
    size: Vec2<usize>,
    format: PixelFormat,
    done: bool,
}

impl Y4mSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        Self::new(BufReader::new(File::open(path.as_ref())?))
    }
}

impl<R: Read> Y4mSource<R> {
    pub fn new(read: R) -> Result<Self, VideoError> {
        let decoder = y4m::decode(read).map_err(from_y4m)?;
        let format = match decoder.get_colorspace() {
            y4m::Colorspace::C420
            | y4m::Colorspace::C420jpeg
            | y4m::Colorspace::C420paldv
            | y4m::Colorspace::C420mpeg2 => PixelFormat::Yu12,
            y4m::Colorspace::C444 => PixelFormat::Yuv444,
            y4m::Colorspace::Cmono => PixelFormat::Gray8,
            other => {
                return Err(VideoError::Unsupported(format!(
                    "Y4M colorspace {other:?}"
                )));
            }
        };
        let size = Vec2::new(decoder.get_width(), decoder.get_height());
        Ok(Self {
            decoder,
            size,
            format,
            done: false,
        })
    }

    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    fn read_frame(&mut self) -> Result<Option<Image>, VideoError> {
        let frame = match self.decoder.read_frame() {
            Ok(frame) => frame,
            Err(y4m::Error::EOF) => return Ok(None),
            Err(error) => return Err(from_y4m(error)),
        };
        let mut data = frame.get_y_plane().to_vec();
        if self.format != PixelFormat::Gray8 {
            data.extend_from_slice(frame.get_u_plane());
            data.extend_from_slice(frame.get_v_plane());
        }
        let image = Image::new(self.size, data, self.format).into_rgb()?;
        Ok(Some(image))
    }
}

impl<R: Read> Iterator for Y4mSource<R> {
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

impl<R: Read> FrameSource for Y4mSource<R> {
    fn total_frames(&self) -> Result<usize, VideoError> {
        Err(VideoError::FrameCountUnknown)
    }

    fn kind(&self) -> &'static str {
        "Y4M"
    }
}

fn from_y4m(error: y4m::Error) -> VideoError {
    match error {
        y4m::Error::IoError(error) => VideoError::from(error),
        y4m::Error::UnknownColorspace => {
            VideoError::Unsupported("unknown Y4M colorspace".to_string())
        }
        other => VideoError::InvalidFrame(format!("Y4M: {other:?}")),
    }
}
