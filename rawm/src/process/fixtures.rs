//! Synthetic recordings for unit tests.

use std::io::Cursor;

use anyhow::Result;

use crate::process::read::{Block, BlockHandler};
use crate::structs::footer::{FOOTER_MAGIC, Footer};
use crate::structs::headers::{BlockHeader, BlockTag};
use crate::structs::raw_info::{ActiveArea, JpegCrop, RawInfo};
use crate::utils::file_set::FileSet;

pub fn sample_raw_info() -> RawInfo {
    RawInfo {
        api_version: 1,
        buffer: 0x4000_0000,
        height: 1080,
        width: 1920,
        pitch: 1920 * 14 / 8,
        frame_size: 1920 * 1080 * 14 / 8,
        bits_per_pixel: 14,
        black_level: 2047,
        white_level: 15000,
        jpeg: JpegCrop {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        },
        active_area: ActiveArea {
            y1: 28,
            x1: 72,
            y2: 1108,
            x2: 1992,
        },
        exposure_bias: [0, 0],
        cfa_pattern: 0x02010100,
        calibration_illuminant1: 1,
        color_matrix1: [
            6722, 10000, -635, 10000, -963, 10000, -4287, 10000, 12460, 10000, 2028, 10000, -908,
            10000, 2162, 10000, 5668, 10000,
        ],
        dynamic_range: 1100,
    }
}

pub fn sample_footer(frame_size: i32, fps_x1000: i32) -> Footer {
    Footer {
        magic: FOOTER_MAGIC,
        x_res: 1920,
        y_res: 1080,
        frame_size,
        frame_count: 0,
        frame_skip: 1,
        source_fps_x1000: fps_x1000,
        reserved3: 0,
        reserved4: 0,
        raw_info: sample_raw_info(),
    }
}

/// Frame payload of each file, without the footer.
///
/// Byte `i` of the whole recording is `i % 251`, so any misplaced byte shows
/// up when frames are compared.
pub fn recording_payload(payload_lengths: &[usize]) -> Vec<Vec<u8>> {
    let mut start = 0;
    payload_lengths
        .iter()
        .map(|&len| {
            let data = (start..start + len).map(|i| (i % 251) as u8).collect();
            start += len;
            data
        })
        .collect()
}

/// File contents of a recording: the payloads with `footer` appended to the
/// last one.
pub fn recording_files(payload_lengths: &[usize], footer: &Footer) -> Vec<Vec<u8>> {
    let mut files = recording_payload(payload_lengths);
    if let Some(last) = files.last_mut() {
        last.extend_from_slice(&footer.to_bytes());
    }
    files
}

pub fn recording(payload_lengths: &[usize], footer: &Footer) -> FileSet<Cursor<Vec<u8>>> {
    let streams = recording_files(payload_lengths, footer)
        .into_iter()
        .map(Cursor::new)
        .collect();
    FileSet::new(streams).unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedBlock {
    pub tag: BlockTag,
    pub header: BlockHeader,
    pub payload_offset: usize,
    pub data: Vec<u8>,
}

/// Handler that keeps a copy of every block.
#[derive(Debug, Default)]
pub struct Recorder {
    pub blocks: Vec<RecordedBlock>,
}

impl BlockHandler for Recorder {
    fn handle_block(&mut self, block: &Block<'_>) -> Result<()> {
        self.blocks.push(RecordedBlock {
            tag: block.tag(),
            header: block.header.clone(),
            payload_offset: block.payload_offset,
            data: block.data().to_vec(),
        });
        Ok(())
    }
}
