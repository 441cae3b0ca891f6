use {
    super::*,
    image::PixelFormat,
    std::{
        fs::File,
        io::{BufWriter, Seek, SeekFrom, Write},
        path::Path,
    },
};

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    offset: u32,
    size: u32,
}

// byte positions of header fields that are only known once all frames are in
#[derive(Debug, Clone, Copy)]
struct Placeholders {
    riff_size: u64,
    avih_total_frames: u64,
    avih_buffer_size: u64,
    strh_length: u64,
    strh_buffer_size: u64,
    movi_size: u64,
    movi_fourcc: u64,
}

/// Writes JPEG frames into an MJPG AVI file.
///
/// Headers go out first with placeholder counts; `finish` writes the
/// `idx1` index and patches the placeholders.
pub struct AviWriter<W: Write + Seek> {
    out: W,
    info: AviInfo,
    placeholders: Placeholders,
    index: Vec<IndexEntry>,
    max_chunk: u32,
    finished: bool,
}

impl AviWriter<BufWriter<File>> {
    pub fn create(
        path: impl AsRef<Path>,
        size: Vec2<usize>,
        frame_rate: f64,
    ) -> Result<Self, VideoError> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file), size, frame_rate)
    }
}

impl<W: Write + Seek> AviWriter<W> {
    pub fn new(mut out: W, size: Vec2<usize>, frame_rate: f64) -> Result<Self, VideoError> {
        if size.is_empty() || size.x > i32::MAX as usize || size.y > i32::MAX as usize {
            return Err(VideoError::Container(format!("invalid frame size {size}")));
        }
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(VideoError::Container(format!(
                "invalid frame rate {frame_rate}"
            )));
        }
        let width = size.x as u32;
        let height = size.y as u32;
        // rate/scale keeps three decimals of fractional rates such as 29.97
        let scale = 1000u32;
        let rate = (frame_rate * scale as f64).round() as u32;
        let usec_per_frame = (1_000_000.0 / frame_rate).round() as u32;
        let mjpg = PixelFormat::Jpeg.as_fourcc().to_le_bytes();

        out.write_all(&RIFF)?;
        let riff_size = out.stream_position()?;
        put_u32(&mut out, 0)?;
        out.write_all(&AVI)?;

        out.write_all(&LIST)?;
        put_u32(&mut out, HDRL_LIST_LEN)?;
        out.write_all(&HDRL)?;

        out.write_all(&AVIH)?;
        put_u32(&mut out, AVIH_LEN)?;
        put_u32(&mut out, usec_per_frame)?;
        put_u32(&mut out, 0)?; // max bytes per second
        put_u32(&mut out, 0)?; // padding granularity
        put_u32(&mut out, AVIF_HASINDEX)?;
        let avih_total_frames = out.stream_position()?;
        put_u32(&mut out, 0)?;
        put_u32(&mut out, 0)?; // initial frames
        put_u32(&mut out, 1)?; // streams
        let avih_buffer_size = out.stream_position()?;
        put_u32(&mut out, 0)?;
        put_u32(&mut out, width)?;
        put_u32(&mut out, height)?;
        out.write_all(&[0u8; 16])?; // reserved

        out.write_all(&LIST)?;
        put_u32(&mut out, STRL_LIST_LEN)?;
        out.write_all(&STRL)?;

        out.write_all(&STRH)?;
        put_u32(&mut out, STRH_LEN)?;
        out.write_all(&VIDS)?;
        out.write_all(&mjpg)?;
        put_u32(&mut out, 0)?; // flags
        put_u16(&mut out, 0)?; // priority
        put_u16(&mut out, 0)?; // language
        put_u32(&mut out, 0)?; // initial frames
        put_u32(&mut out, scale)?;
        put_u32(&mut out, rate)?;
        put_u32(&mut out, 0)?; // start
        let strh_length = out.stream_position()?;
        put_u32(&mut out, 0)?;
        let strh_buffer_size = out.stream_position()?;
        put_u32(&mut out, 0)?;
        put_u32(&mut out, u32::MAX)?; // quality: driver default
        put_u32(&mut out, 0)?; // sample size
        put_u16(&mut out, 0)?; // rcFrame
        put_u16(&mut out, 0)?;
        put_u16(&mut out, width.min(u16::MAX as u32) as u16)?;
        put_u16(&mut out, height.min(u16::MAX as u32) as u16)?;

        out.write_all(&STRF)?;
        put_u32(&mut out, STRF_LEN)?;
        put_u32(&mut out, STRF_LEN)?; // biSize
        put_u32(&mut out, width)?;
        put_u32(&mut out, height)?;
        put_u16(&mut out, 1)?; // planes
        put_u16(&mut out, 24)?; // bit count
        out.write_all(&mjpg)?;
        put_u32(&mut out, width.saturating_mul(height).saturating_mul(3))?;
        out.write_all(&[0u8; 16])?; // ppm x/y, colors used/important

        out.write_all(&LIST)?;
        let movi_size = out.stream_position()?;
        put_u32(&mut out, 0)?;
        let movi_fourcc = out.stream_position()?;
        out.write_all(&MOVI)?;

        Ok(Self {
            out,
            info: AviInfo {
                size,
                frame_rate,
                total_frames: 0,
                codec: u32::from_le_bytes(mjpg),
            },
            placeholders: Placeholders {
                riff_size,
                avih_total_frames,
                avih_buffer_size,
                strh_length,
                strh_buffer_size,
                movi_size,
                movi_fourcc,
            },
            index: Vec::new(),
            max_chunk: 0,
            finished: false,
        })
    }

    pub fn info(&self) -> &AviInfo {
        &self.info
    }

    pub fn frames(&self) -> usize {
        self.index.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Append one encoded JPEG as the next frame.
    pub fn write_jpeg(&mut self, jpeg: &[u8]) -> Result<(), VideoError> {
        if self.finished {
            return Err(VideoError::Closed);
        }
        let size = u32::try_from(jpeg.len())
            .map_err(|_| VideoError::Container("frame larger than 4 GiB".to_string()))?;
        let position = self.out.stream_position()?;
        // the final file also needs the idx1 chunk, 16 bytes per frame
        let projected = position
            + 8
            + size as u64
            + 1
            + 8
            + 16 * (self.index.len() as u64 + 1);
        if projected > u32::MAX as u64 {
            return Err(VideoError::Container(
                "AVI output would exceed 4 GiB".to_string(),
            ));
        }

        self.out.write_all(b"00dc")?;
        put_u32(&mut self.out, size)?;
        self.out.write_all(jpeg)?;
        if size % 2 == 1 {
            self.out.write_all(&[0])?;
        }

        self.index.push(IndexEntry {
            offset: (position - self.placeholders.movi_fourcc) as u32,
            size,
        });
        self.max_chunk = self.max_chunk.max(size);
        self.info.total_frames = self.index.len();
        Ok(())
    }

    /// Write the index and patch header counts. Calling it twice is a no-op.
    pub fn finish(&mut self) -> Result<(), VideoError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let movi_end = self.out.stream_position()?;
        self.out.write_all(&IDX1)?;
        put_u32(&mut self.out, 16 * self.index.len() as u32)?;
        for entry in &self.index {
            self.out.write_all(b"00dc")?;
            put_u32(&mut self.out, AVIIF_KEYFRAME)?;
            put_u32(&mut self.out, entry.offset)?;
            put_u32(&mut self.out, entry.size)?;
        }
        let file_end = self.out.stream_position()?;

        let frames = self.index.len() as u32;
        let buffer_size = self.max_chunk + 8;
        let p = self.placeholders;
        self.patch(p.riff_size, (file_end - 8) as u32)?;
        self.patch(p.avih_total_frames, frames)?;
        self.patch(p.avih_buffer_size, buffer_size)?;
        self.patch(p.strh_length, frames)?;
        self.patch(p.strh_buffer_size, buffer_size)?;
        self.patch(p.movi_size, (movi_end - p.movi_fourcc) as u32)?;

        self.out.seek(SeekFrom::Start(file_end))?;
        self.out.flush()?;
        Ok(())
    }

    fn patch(&mut self, position: u64, value: u32) -> Result<(), VideoError> {
        self.out.seek(SeekFrom::Start(position))?;
        put_u32(&mut self.out, value)
    }
}

impl<W: Write + Seek> Drop for AviWriter<W> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(error) = self.finish() {
                base::log_error!("failed to finalize AVI output: {}", error);
            }
        }
    }
}
