//! Recording footer.
//!
//! The last file of a recording ends with a fixed 192-byte record:
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 4    | magic `"RAWM"`   |
//! | 4      | 2    | xRes             |
//! | 6      | 2    | yRes             |
//! | 8      | 4    | frameSize        |
//! | 12     | 4    | frameCount       |
//! | 16     | 4    | frameSkip        |
//! | 20     | 4    | sourceFpsx1000   |
//! | 24     | 8    | reserved         |
//! | 32     | 160  | raw_info         |
//!
//! All integers are little-endian and the record has no padding.

use log::trace;
use rawmd_macros::ToBytes;

use crate::structs::raw_info::{RAW_INFO_SIZE, RawInfo};
use crate::utils::bitstream_io::LayoutSliceReader;
use crate::utils::byteorder::WriteBytesLe;
use crate::utils::errors::FormatError;

pub const FOOTER_MAGIC: [u8; 4] = *b"RAWM";

/// Encoded size of [`Footer`] in bytes.
pub const FOOTER_SIZE: usize = 32 + RAW_INFO_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, ToBytes)]
pub struct Footer {
    pub magic: [u8; 4],
    pub x_res: i16,
    pub y_res: i16,
    pub frame_size: i32,
    /// Declared frame count. Informational only; the block index is derived
    /// from the file sizes.
    pub frame_count: i32,
    pub frame_skip: i32,
    pub source_fps_x1000: i32,
    pub reserved3: i32,
    pub reserved4: i32,
    pub raw_info: RawInfo,
}

impl Footer {
    /// Decodes a footer and checks its magic.
    ///
    /// Geometry is not checked here; see [`Footer::validate`].
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, FormatError> {
        if buffer.len() < FOOTER_SIZE {
            return Err(FormatError::Truncated {
                read: buffer.len() as u64,
                expected: FOOTER_SIZE,
            });
        }

        let mut reader = LayoutSliceReader::from_slice(&buffer[..FOOTER_SIZE]);

        let magic = reader.get_bytes::<4>()?;
        if magic != FOOTER_MAGIC {
            return Err(FormatError::InvalidMagic(magic));
        }

        let footer = Footer {
            magic,
            x_res: reader.get_i16()?,
            y_res: reader.get_i16()?,
            frame_size: reader.get_i32()?,
            frame_count: reader.get_i32()?,
            frame_skip: reader.get_i32()?,
            source_fps_x1000: reader.get_i32()?,
            reserved3: reader.get_i32()?,
            reserved4: reader.get_i32()?,
            raw_info: RawInfo::read(&mut reader)?,
        };

        trace!("{footer:?}");

        Ok(footer)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(FOOTER_SIZE);
        self.write_le(&mut vec);
        vec
    }

    /// Rejects geometry that would make the block index meaningless.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.frame_size <= 0 {
            return Err(FormatError::InvalidFrameSize(self.frame_size));
        }
        if self.source_fps_x1000 <= 0 {
            return Err(FormatError::InvalidFrameRate(self.source_fps_x1000));
        }
        Ok(())
    }

    /// Bytes per frame block. Zero for footers that fail [`Footer::validate`].
    pub fn frame_bytes(&self) -> usize {
        self.frame_size.max(0) as usize
    }

    pub fn fps(&self) -> f64 {
        self.source_fps_x1000 as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fixtures::sample_footer;

    #[test]
    fn encoded_size_matches_layout() {
        assert_eq!(FOOTER_SIZE, 192);
        assert_eq!(sample_footer(100, 25_000).to_bytes().len(), FOOTER_SIZE);
    }

    #[test]
    fn fields_land_at_fixed_offsets() {
        let footer = sample_footer(3_110_400, 23_976);
        let bytes = footer.to_bytes();

        assert_eq!(&bytes[0..4], b"RAWM");
        assert_eq!(&bytes[4..6], &1920i16.to_le_bytes());
        assert_eq!(&bytes[6..8], &1080i16.to_le_bytes());
        assert_eq!(&bytes[8..12], &3_110_400i32.to_le_bytes());
        assert_eq!(&bytes[20..24], &23_976i32.to_le_bytes());
        assert_eq!(&bytes[32..], &footer.raw_info.to_bytes()[..]);
    }

    #[test]
    fn decodes_what_was_encoded() {
        let footer = sample_footer(100, 25_000);
        let decoded = Footer::from_bytes(&footer.to_bytes()).unwrap();

        assert_eq!(decoded, footer);
        assert_eq!(decoded.frame_bytes(), 100);
        assert!((decoded.fps() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = sample_footer(100, 25_000).to_bytes();
        bytes[..4].copy_from_slice(b"XXXX");

        let err = Footer::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::InvalidMagic(m) if &m == b"XXXX"));
        assert_eq!(
            err.to_string(),
            "Invalid footer magic. Read \"XXXX\", expected \"RAWM\""
        );
    }

    #[test]
    fn rejects_short_buffer() {
        let bytes = sample_footer(100, 25_000).to_bytes();

        let err = Footer::from_bytes(&bytes[..FOOTER_SIZE - 1]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Truncated {
                read: 191,
                expected: FOOTER_SIZE
            }
        ));
    }

    #[test]
    fn validate_rejects_degenerate_geometry() {
        assert!(matches!(
            sample_footer(0, 25_000).validate(),
            Err(FormatError::InvalidFrameSize(0))
        ));
        assert!(matches!(
            sample_footer(100, -1).validate(),
            Err(FormatError::InvalidFrameRate(-1))
        ));
        assert!(sample_footer(100, 25_000).validate().is_ok());
    }
}
