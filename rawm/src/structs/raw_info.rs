//! Raw sensor format descriptor.
//!
//! The camera copies its 160-byte `raw_info` descriptor into the footer. The
//! reader never interprets the pixel layout itself; the descriptor is decoded
//! into named fields for display and re-encoded byte-for-byte into the
//! synthesized `RAWI` header.

use rawmd_macros::ToBytes;

use crate::utils::bitstream_io::LayoutSliceReader;
use crate::utils::byteorder::WriteBytesLe;
use crate::utils::errors::FormatError;

/// Encoded size of [`RawInfo`] in bytes.
pub const RAW_INFO_SIZE: usize = 160;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ToBytes)]
pub struct JpegCrop {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ToBytes)]
pub struct ActiveArea {
    pub y1: i32,
    pub x1: i32,
    pub y2: i32,
    pub x2: i32,
}

impl ActiveArea {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ToBytes)]
pub struct RawInfo {
    pub api_version: u32,
    /// Frame buffer address on the camera. Meaningless once recorded.
    pub buffer: u32,
    pub height: i32,
    pub width: i32,
    pub pitch: i32,
    pub frame_size: i32,
    pub bits_per_pixel: i32,
    pub black_level: i32,
    pub white_level: i32,
    pub jpeg: JpegCrop,
    pub active_area: ActiveArea,
    pub exposure_bias: [i32; 2],
    pub cfa_pattern: i32,
    pub calibration_illuminant1: i32,
    pub color_matrix1: [i32; 18],
    pub dynamic_range: i32,
}

impl RawInfo {
    pub fn read(reader: &mut LayoutSliceReader) -> Result<Self, FormatError> {
        Ok(Self {
            api_version: reader.get_u32()?,
            buffer: reader.get_u32()?,
            height: reader.get_i32()?,
            width: reader.get_i32()?,
            pitch: reader.get_i32()?,
            frame_size: reader.get_i32()?,
            bits_per_pixel: reader.get_i32()?,
            black_level: reader.get_i32()?,
            white_level: reader.get_i32()?,
            jpeg: JpegCrop {
                x: reader.get_i32()?,
                y: reader.get_i32()?,
                width: reader.get_i32()?,
                height: reader.get_i32()?,
            },
            active_area: ActiveArea {
                y1: reader.get_i32()?,
                x1: reader.get_i32()?,
                y2: reader.get_i32()?,
                x2: reader.get_i32()?,
            },
            exposure_bias: reader.get_i32_array()?,
            cfa_pattern: reader.get_i32()?,
            calibration_illuminant1: reader.get_i32()?,
            color_matrix1: reader.get_i32_array()?,
            dynamic_range: reader.get_i32()?,
        })
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self, FormatError> {
        Self::read(&mut LayoutSliceReader::from_slice(buffer))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(RAW_INFO_SIZE);
        self.write_le(&mut vec);
        vec
    }

    /// Color matrix as rationals, stored as numerator/denominator pairs.
    pub fn color_matrix(&self) -> [(i32, i32); 9] {
        let mut matrix = [(0, 1); 9];
        for (i, entry) in matrix.iter_mut().enumerate() {
            *entry = (self.color_matrix1[2 * i], self.color_matrix1[2 * i + 1]);
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fixtures::sample_raw_info;

    #[test]
    fn encoded_size_matches_layout() {
        assert_eq!(sample_raw_info().to_bytes().len(), RAW_INFO_SIZE);
    }

    #[test]
    fn fields_land_at_fixed_offsets() {
        let bytes = sample_raw_info().to_bytes();

        // bits_per_pixel at 24, white_level at 32, active_area.x2 at 64
        assert_eq!(&bytes[24..28], &14i32.to_le_bytes());
        assert_eq!(&bytes[32..36], &15000i32.to_le_bytes());
        assert_eq!(&bytes[64..68], &1992i32.to_le_bytes());
        assert_eq!(&bytes[76..80], &0x02010100i32.to_le_bytes());
        assert_eq!(&bytes[156..160], &1100i32.to_le_bytes());
    }

    #[test]
    fn decodes_what_was_encoded() {
        let info = sample_raw_info();
        let decoded = RawInfo::from_bytes(&info.to_bytes()).unwrap();

        assert_eq!(decoded, info);
        assert_eq!(decoded.active_area.width(), 1920);
        assert_eq!(decoded.active_area.height(), 1080);
        assert_eq!(decoded.color_matrix()[1], (-635, 10000));
    }

    #[test]
    fn short_buffer_is_a_layout_error() {
        let bytes = sample_raw_info().to_bytes();
        let err = RawInfo::from_bytes(&bytes[..100]).unwrap_err();

        assert!(matches!(err, FormatError::Layout(_)));
    }
}
