use {
    super::*,
    std::{
        fs::File,
        io::{BufReader, Read, Seek, SeekFrom},
        path::Path,
    },
};

// fields of the first video stream's strl list
#[derive(Debug, Default, Clone, Copy)]
struct StreamHeader {
    scale: u32,
    rate: u32,
    length: u32,
    width: i32,
    height: i32,
    compression: u32,
}

/// Reads the video chunks of an AVI file in stream order.
pub struct AviReader<R: Read + Seek> {
    input: R,
    info: AviInfo,
    stream_id: [u8; 2],
    file_len: u64,
    // current position and end of the active movi list
    cursor: u64,
    movi_end: u64,
    // where the next RIFF (AVIX) may start
    next_riff: u64,
}

impl AviReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> AviReader<R> {
    pub fn new(mut input: R) -> Result<Self, VideoError> {
        let file_len = input.seek(SeekFrom::End(0))?;
        input.seek(SeekFrom::Start(0))?;

        let riff = get_fourcc(&mut input)?;
        let riff_size = get_u32(&mut input)? as u64;
        let form = get_fourcc(&mut input)?;
        if riff != RIFF || form != AVI {
            return Err(VideoError::Container("not an AVI file".to_string()));
        }
        let riff_end = (8 + riff_size).min(file_len);

        let mut total_frames = 0u32;
        let mut usec_per_frame = 0u32;
        let mut stream: Option<(usize, StreamHeader)> = None;
        let mut movi: Option<(u64, u64)> = None;

        let mut position = 12u64;
        while position + 8 <= riff_end {
            input.seek(SeekFrom::Start(position))?;
            let id = get_fourcc(&mut input)?;
            let size = get_u32(&mut input)? as u64;
            let end = (position + 8 + size).min(riff_end);
            if id == LIST {
                match get_fourcc(&mut input)? {
                    HDRL => {
                        let header = read_hdrl(&mut input, position + 12, end)?;
                        total_frames = header.0;
                        usec_per_frame = header.1;
                        stream = header.2;
                    }
                    MOVI => {
                        movi = Some((position + 12, end));
                        break;
                    }
                    _ => {}
                }
            }
            position = position + 8 + size + (size & 1);
        }

        let (stream_index, header) = stream
            .ok_or_else(|| VideoError::Container("no video stream".to_string()))?;
        let (movi_start, movi_end) =
            movi.ok_or_else(|| VideoError::Container("no movi list".to_string()))?;
        if !is_mjpeg(header.compression) {
            return Err(VideoError::Unsupported(format!(
                "AVI codec {}",
                image::fourcc_to_string(header.compression)
            )));
        }
        if header.width <= 0 || header.height == 0 || stream_index > 99 {
            return Err(VideoError::Container(format!(
                "invalid stream header {}x{}",
                header.width, header.height
            )));
        }

        let frame_rate = if header.scale > 0 && header.rate > 0 {
            header.rate as f64 / header.scale as f64
        } else if usec_per_frame > 0 {
            1_000_000.0 / usec_per_frame as f64
        } else {
            0.0
        };

        // avih counts the first RIFF only in OpenDML files; strh covers all
        let total_frames = total_frames.max(header.length) as usize;
        let digits = format!("{stream_index:02}");
        let digits = digits.as_bytes();

        Ok(Self {
            input,
            info: AviInfo {
                size: Vec2::new(header.width as usize, header.height.unsigned_abs() as usize),
                frame_rate,
                total_frames,
                codec: header.compression,
            },
            stream_id: [digits[0], digits[1]],
            file_len,
            cursor: movi_start,
            movi_end,
            next_riff: riff_end + (riff_end & 1),
        })
    }

    pub fn info(&self) -> &AviInfo {
        &self.info
    }

    /// Payload of the next video chunk, `None` at the end of the stream.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, VideoError> {
        loop {
            if self.cursor + 8 > self.movi_end {
                if !self.enter_next_riff()? {
                    return Ok(None);
                }
                continue;
            }
            self.input.seek(SeekFrom::Start(self.cursor))?;
            let id = get_fourcc(&mut self.input)?;
            let size = get_u32(&mut self.input)? as u64;

            if id == LIST {
                let kind = get_fourcc(&mut self.input)?;
                if kind == REC {
                    // descend into the record list
                    self.cursor += 12;
                    continue;
                }
                self.cursor += 8 + size + (size & 1);
                continue;
            }

            let is_video = id[0..2] == self.stream_id && (&id[2..4] == b"dc" || &id[2..4] == b"db");
            if is_video {
                if self.cursor + 8 + size > self.movi_end {
                    return Err(VideoError::InvalidFrame(format!(
                        "truncated chunk at offset {}",
                        self.cursor
                    )));
                }
                let mut data = vec![0u8; size as usize];
                self.input.read_exact(&mut data)?;
                self.cursor += 8 + size + (size & 1);
                if size == 0 {
                    // dropped frame marker, nothing to show
                    continue;
                }
                return Ok(Some(data));
            }
            self.cursor += 8 + size + (size & 1);
        }
    }

    // follow an OpenDML AVIX extension, if there is one
    fn enter_next_riff(&mut self) -> Result<bool, VideoError> {
        while self.next_riff + 12 <= self.file_len {
            let start = self.next_riff;
            self.input.seek(SeekFrom::Start(start))?;
            let riff = get_fourcc(&mut self.input)?;
            let size = get_u32(&mut self.input)? as u64;
            let form = get_fourcc(&mut self.input)?;
            if riff != RIFF || form != AVIX {
                return Ok(false);
            }
            let riff_end = (start + 8 + size).min(self.file_len);
            self.next_riff = riff_end + (riff_end & 1);

            let mut position = start + 12;
            while position + 12 <= riff_end {
                self.input.seek(SeekFrom::Start(position))?;
                let id = get_fourcc(&mut self.input)?;
                let size = get_u32(&mut self.input)? as u64;
                if id == LIST && get_fourcc(&mut self.input)? == MOVI {
                    self.cursor = position + 12;
                    self.movi_end = (position + 8 + size).min(riff_end);
                    return Ok(true);
                }
                position = position + 8 + size + (size & 1);
            }
        }
        Ok(false)
    }
}

type HdrlInfo = (u32, u32, Option<(usize, StreamHeader)>);

fn read_hdrl<R: Read + Seek>(input: &mut R, start: u64, end: u64) -> Result<HdrlInfo, VideoError> {
    let mut total_frames = 0;
    let mut usec_per_frame = 0;
    let mut video = None;
    let mut stream_index = 0usize;

    let mut position = start;
    while position + 8 <= end {
        input.seek(SeekFrom::Start(position))?;
        let id = get_fourcc(input)?;
        let size = get_u32(input)? as u64;
        if id == AVIH {
            let avih = read_body(input, size, AVIH_LEN)?;
            usec_per_frame = le_u32(&avih, 0);
            total_frames = le_u32(&avih, 16);
        } else if id == LIST && get_fourcc(input)? == STRL {
            if video.is_none() {
                if let Some(header) = read_strl(input, position + 12, (position + 8 + size).min(end))? {
                    video = Some((stream_index, header));
                }
            }
            stream_index += 1;
        }
        position = position + 8 + size + (size & 1);
    }
    Ok((total_frames, usec_per_frame, video))
}

// None when the stream is not video
fn read_strl<R: Read + Seek>(
    input: &mut R,
    start: u64,
    end: u64,
) -> Result<Option<StreamHeader>, VideoError> {
    let mut header = StreamHeader::default();
    let mut is_video = false;
    let mut position = start;
    while position + 8 <= end {
        input.seek(SeekFrom::Start(position))?;
        let id = get_fourcc(input)?;
        let size = get_u32(input)? as u64;
        if id == STRH {
            let strh = read_body(input, size, 36)?;
            is_video = strh[0..4] == VIDS;
            header.scale = le_u32(&strh, 20);
            header.rate = le_u32(&strh, 24);
            header.length = le_u32(&strh, 32);
        } else if id == STRF && is_video {
            let strf = read_body(input, size, 20)?;
            header.width = le_i32(&strf, 4);
            header.height = le_i32(&strf, 8);
            header.compression = le_u32(&strf, 16);
        }
        position = position + 8 + size + (size & 1);
    }
    Ok(is_video.then_some(header))
}

fn read_body<R: Read>(input: &mut R, size: u64, min_len: u32) -> Result<Vec<u8>, VideoError> {
    if size < min_len as u64 {
        return Err(VideoError::Container(format!(
            "header chunk of {size} bytes, expected at least {min_len}"
        )));
    }
    let mut body = vec![0u8; min_len as usize];
    input.read_exact(&mut body)?;
    Ok(body)
}
