//! Synthesized block headers.
//!
//! Downstream consumers expect a recording to start with a file header block
//! (`MLVI`) and a raw format block (`RAWI`), and expect every frame to carry a
//! video frame header (`VIDF`). A RAWM recording has none of these on disk, so
//! the reader fabricates them. Fields that can be taken from the footer or the
//! block index are filled in; everything else is one of the constants below.

use std::fmt::{Display, Formatter};

use rawmd_macros::{ToBytes, block_type};

use crate::structs::footer::Footer;
use crate::structs::raw_info::{RAW_INFO_SIZE, RawInfo};
use crate::structs::xref::BlockDescriptor;
use crate::utils::bitstream_io::LayoutSliceReader;
use crate::utils::errors::FormatError;

/// Encoded size of [`FileHeader`].
pub const FILE_HEADER_SIZE: usize = 52;

/// Encoded size of [`RawInfoHeader`].
pub const RAW_INFO_HEADER_SIZE: usize = 20 + RAW_INFO_SIZE;

/// Encoded size of [`VideoFrameHeader`], excluding the frame payload.
pub const VIDEO_FRAME_HEADER_SIZE: usize = 32;

/// Forged version string of the synthesized file header.
pub const FORGED_VERSION: [u8; 8] = *b"v2.0\0\0\0\0";

/// Forged file GUID. RAWM recordings carry no identifier.
pub const FORGED_FILE_GUID: u64 = 0;

/// Video class tag meaning uncompressed raw frames.
pub const VIDEO_CLASS_RAW: u16 = 1;

/// Audio class tag meaning no audio.
pub const AUDIO_CLASS_NONE: u16 = 0;

/// Denominator of the synthesized frame rate; the nominator is
/// `sourceFpsx1000`.
pub const FPS_DENOMINATOR: u32 = 1000;

/// A header that is emitted as its own block.
pub trait MetadataBlock {
    fn block_type(&self) -> &[u8; 4];

    /// Little-endian encoding of the whole header.
    fn block_bytes(&self) -> Vec<u8>;
}

/// The kind of block passed to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    FileHeader,
    RawInfo,
    VideoFrame,
}

impl BlockTag {
    pub fn as_bytes(&self) -> &'static [u8; 4] {
        match self {
            BlockTag::FileHeader => &FileHeader::BLOCK_TYPE,
            BlockTag::RawInfo => &RawInfoHeader::BLOCK_TYPE,
            BlockTag::VideoFrame => &VideoFrameHeader::BLOCK_TYPE,
        }
    }
}

impl Display for BlockTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_bytes().escape_ascii())
    }
}

fn check_block_type(
    reader: &mut LayoutSliceReader,
    expected: &'static [u8; 4],
    name: &'static str,
) -> Result<[u8; 4], FormatError> {
    let read = reader.get_bytes::<4>()?;
    if &read != expected {
        return Err(FormatError::InvalidBlockType {
            expected: name,
            read,
        });
    }
    Ok(read)
}

#[block_type(b"MLVI")]
#[derive(Debug, Clone, PartialEq, Eq, ToBytes)]
pub struct FileHeader {
    pub file_magic: [u8; 4],
    pub block_size: u32,
    pub version_string: [u8; 8],
    pub file_guid: u64,
    pub file_num: u16,
    pub file_count: u16,
    pub file_flags: u32,
    pub video_class: u16,
    pub audio_class: u16,
    pub video_frame_count: u32,
    pub audio_frame_count: u32,
    pub source_fps_nom: u32,
    pub source_fps_denom: u32,
}

impl FileHeader {
    /// Builds the file header for a recording of `file_count` files holding
    /// `frame_count` indexed frames.
    pub fn synthesize(footer: &Footer, file_count: usize, frame_count: usize) -> Self {
        Self {
            file_magic: Self::BLOCK_TYPE,
            block_size: FILE_HEADER_SIZE as u32,
            version_string: FORGED_VERSION,
            file_guid: FORGED_FILE_GUID,
            file_num: 0,
            file_count: file_count.min(u16::MAX as usize) as u16,
            file_flags: 0,
            video_class: VIDEO_CLASS_RAW,
            audio_class: AUDIO_CLASS_NONE,
            video_frame_count: frame_count.min(u32::MAX as usize) as u32,
            audio_frame_count: 0,
            source_fps_nom: footer.source_fps_x1000.max(0) as u32,
            source_fps_denom: FPS_DENOMINATOR,
        }
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self, FormatError> {
        let mut reader = LayoutSliceReader::from_slice(buffer);

        Ok(Self {
            file_magic: check_block_type(&mut reader, &Self::BLOCK_TYPE, "file header")?,
            block_size: reader.get_u32()?,
            version_string: reader.get_bytes()?,
            file_guid: reader.get_u64()?,
            file_num: reader.get_u16()?,
            file_count: reader.get_u16()?,
            file_flags: reader.get_u32()?,
            video_class: reader.get_u16()?,
            audio_class: reader.get_u16()?,
            video_frame_count: reader.get_u32()?,
            audio_frame_count: reader.get_u32()?,
            source_fps_nom: reader.get_u32()?,
            source_fps_denom: reader.get_u32()?,
        })
    }

    pub fn fps(&self) -> f64 {
        if self.source_fps_denom == 0 {
            return 0.0;
        }
        self.source_fps_nom as f64 / self.source_fps_denom as f64
    }
}

#[block_type(b"RAWI")]
#[derive(Debug, Clone, PartialEq, Eq, ToBytes)]
pub struct RawInfoHeader {
    pub block_type: [u8; 4],
    pub block_size: u32,
    pub timestamp: u64,
    pub x_res: u16,
    pub y_res: u16,
    pub raw_info: RawInfo,
}

impl RawInfoHeader {
    /// Copies resolution and the raw descriptor out of the footer.
    pub fn from_footer(footer: &Footer) -> Self {
        Self {
            block_type: Self::BLOCK_TYPE,
            block_size: RAW_INFO_HEADER_SIZE as u32,
            timestamp: 0,
            x_res: footer.x_res as u16,
            y_res: footer.y_res as u16,
            raw_info: footer.raw_info,
        }
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self, FormatError> {
        let mut reader = LayoutSliceReader::from_slice(buffer);

        Ok(Self {
            block_type: check_block_type(&mut reader, &Self::BLOCK_TYPE, "raw info")?,
            block_size: reader.get_u32()?,
            timestamp: reader.get_u64()?,
            x_res: reader.get_u16()?,
            y_res: reader.get_u16()?,
            raw_info: RawInfo::read(&mut reader)?,
        })
    }
}

#[block_type(b"VIDF")]
#[derive(Debug, Clone, PartialEq, Eq, ToBytes)]
pub struct VideoFrameHeader {
    pub block_type: [u8; 4],
    /// Header plus payload.
    pub block_size: u32,
    /// Microseconds since the start of the recording.
    pub timestamp: u64,
    pub frame_number: u32,
    pub crop_pos_x: u16,
    pub crop_pos_y: u16,
    pub pan_pos_x: u16,
    pub pan_pos_y: u16,
    /// Padding between header and payload. Always 0 here.
    pub frame_space: u32,
}

impl VideoFrameHeader {
    pub fn for_block(index: usize, descriptor: &BlockDescriptor, frame_size: usize) -> Self {
        Self {
            block_type: Self::BLOCK_TYPE,
            block_size: (VIDEO_FRAME_HEADER_SIZE + frame_size).min(u32::MAX as usize) as u32,
            timestamp: descriptor.timestamp_ns / 1000,
            frame_number: index.min(u32::MAX as usize) as u32,
            crop_pos_x: 0,
            crop_pos_y: 0,
            pan_pos_x: 0,
            pan_pos_y: 0,
            frame_space: 0,
        }
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self, FormatError> {
        let mut reader = LayoutSliceReader::from_slice(buffer);

        Ok(Self {
            block_type: check_block_type(&mut reader, &Self::BLOCK_TYPE, "video frame")?,
            block_size: reader.get_u32()?,
            timestamp: reader.get_u64()?,
            frame_number: reader.get_u32()?,
            crop_pos_x: reader.get_u16()?,
            crop_pos_y: reader.get_u16()?,
            pan_pos_x: reader.get_u16()?,
            pan_pos_y: reader.get_u16()?,
            frame_space: reader.get_u32()?,
        })
    }
}

/// The header carried by a dispatched block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockHeader {
    FileHeader(FileHeader),
    RawInfo(RawInfoHeader),
    VideoFrame(VideoFrameHeader),
}

impl BlockHeader {
    pub fn tag(&self) -> BlockTag {
        match self {
            BlockHeader::FileHeader(_) => BlockTag::FileHeader,
            BlockHeader::RawInfo(_) => BlockTag::RawInfo,
            BlockHeader::VideoFrame(_) => BlockTag::VideoFrame,
        }
    }

    pub fn as_metadata_block(&self) -> &dyn MetadataBlock {
        match self {
            BlockHeader::FileHeader(h) => h,
            BlockHeader::RawInfo(h) => h,
            BlockHeader::VideoFrame(h) => h,
        }
    }
}
