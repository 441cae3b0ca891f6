//! Motion-JPEG AVI (RIFF) container.
//!
//! Only the subset needed for a single MJPG video stream is implemented:
//! `hdrl` with `avih`/`strh`/`strf`, a `movi` list of `00dc` chunks and a
//! legacy `idx1` index. OpenDML `AVIX` extensions are followed on read.

mod reader;
pub use reader::*;

mod writer;
pub use writer::*;

use {
    crate::VideoError,
    base::Vec2,
    std::io::{Read, Write},
};

pub(crate) type FourCc = [u8; 4];

pub(crate) const RIFF: FourCc = *b"RIFF";
pub(crate) const LIST: FourCc = *b"LIST";
pub(crate) const AVI: FourCc = *b"AVI ";
pub(crate) const AVIX: FourCc = *b"AVIX";
pub(crate) const HDRL: FourCc = *b"hdrl";
pub(crate) const AVIH: FourCc = *b"avih";
pub(crate) const STRL: FourCc = *b"strl";
pub(crate) const STRH: FourCc = *b"strh";
pub(crate) const STRF: FourCc = *b"strf";
pub(crate) const MOVI: FourCc = *b"movi";
pub(crate) const REC: FourCc = *b"rec ";
pub(crate) const IDX1: FourCc = *b"idx1";
pub(crate) const VIDS: FourCc = *b"vids";

pub(crate) const AVIF_HASINDEX: u32 = 0x10;
pub(crate) const AVIIF_KEYFRAME: u32 = 0x10;

pub(crate) const AVIH_LEN: u32 = 56;
pub(crate) const STRH_LEN: u32 = 56;
pub(crate) const STRF_LEN: u32 = 40;
pub(crate) const STRL_LIST_LEN: u32 = 4 + (8 + STRH_LEN) + (8 + STRF_LEN);
pub(crate) const HDRL_LIST_LEN: u32 = 4 + (8 + AVIH_LEN) + (8 + STRL_LIST_LEN);

/// Stream properties taken from (or written to) the AVI headers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AviInfo {
    pub size: Vec2<usize>,
    pub frame_rate: f64,
    /// 0 when the header does not say.
    pub total_frames: usize,
    /// `biCompression` fourcc of the video stream.
    pub codec: u32,
}

/// Accept the handler codes MJPEG encoders commonly write.
pub(crate) fn is_mjpeg(codec: u32) -> bool {
    matches!(&codec.to_le_bytes(), b"MJPG" | b"mjpg" | b"AVRn" | b"dmb1" | b"JPEG" | b"jpeg")
}

pub(crate) fn put_u32(out: &mut impl Write, value: u32) -> Result<(), VideoError> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn put_u16(out: &mut impl Write, value: u16) -> Result<(), VideoError> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn get_fourcc(input: &mut impl Read) -> Result<FourCc, VideoError> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn get_u32(input: &mut impl Read) -> Result<u32, VideoError> {
    Ok(u32::from_le_bytes(get_fourcc(input)?))
}

pub(crate) fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

pub(crate) fn le_i32(bytes: &[u8], offset: usize) -> i32 {
    le_u32(bytes, offset) as i32
}

