use {
    super::FrameSource,
    crate::{AviReader, VideoError},
    image::{Image, decode_jpeg},
    std::{fs::File, io::BufReader, path::Path},
};

/// Motion-JPEG AVI file, decoded one chunk at a time.
pub struct AviSource {
    reader: AviReader<BufReader<File>>,
    done: bool,
}

impl AviSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        let reader = AviReader::open(path)?;
        Ok(Self {
            reader,
            done: false,
        })
    }

    pub fn reader(&self) -> &AviReader<BufReader<File>> {
        &self.reader
    }
}

impl Iterator for AviSource {
    type Item = Result<Image, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_chunk() {
            Ok(Some(jpeg)) => Some(
                decode_jpeg(&jpeg).map_err(|error| VideoError::InvalidFrame(error.to_string())),
            ),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                // the container cannot be walked past a broken chunk
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl FrameSource for AviSource {
    fn total_frames(&self) -> Result<usize, VideoError> {
        match self.reader.info().total_frames {
            0 => Err(VideoError::FrameCountUnknown),
            total => Ok(total),
        }
    }

    fn kind(&self) -> &'static str {
        "MJPEG AVI"
    }
}
