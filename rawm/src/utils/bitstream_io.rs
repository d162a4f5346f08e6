//! Field reader for packed little-endian layouts.
//!
//! Wraps a `bitstream_io` reader and exposes byte-aligned integer and
//! byte-array reads with explicit bounds checks, so layout decoders can read
//! named fields in declaration order instead of reinterpreting memory.

use std::io;

use bitstream_io::{BitRead, BitReader, LittleEndian, UnsignedInteger};

#[derive(Debug)]
pub struct LayoutReader<R: io::Read + io::Seek> {
    bs: BitReader<R, LittleEndian>,
    len: u64,
}

pub type LayoutSliceReader<'a> = LayoutReader<io::Cursor<&'a [u8]>>;

impl<R> LayoutReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R, len_bytes: u64) -> Self {
        Self {
            bs: BitReader::new(read),
            len: len_bytes << 3,
        }
    }

    #[inline(always)]
    fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        let avail = self.available()?;
        if n as u64 > avail {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "get_n({}): out of bounds at byte {}",
                    n,
                    self.position()? >> 3
                ),
            ));
        }
        self.bs.read_unsigned_var(n)
    }

    #[inline(always)]
    pub fn get_u16(&mut self) -> io::Result<u16> {
        self.get_n(16)
    }

    #[inline(always)]
    pub fn get_i16(&mut self) -> io::Result<i16> {
        self.get_u16().map(|v| v as i16)
    }

    #[inline(always)]
    pub fn get_u32(&mut self) -> io::Result<u32> {
        self.get_n(32)
    }

    #[inline(always)]
    pub fn get_i32(&mut self) -> io::Result<i32> {
        self.get_u32().map(|v| v as i32)
    }

    #[inline(always)]
    pub fn get_u64(&mut self) -> io::Result<u64> {
        self.get_n(64)
    }

    pub fn get_i32_array<const N: usize>(&mut self) -> io::Result<[i32; N]> {
        let mut values = [0i32; N];
        for value in values.iter_mut() {
            *value = self.get_i32()?;
        }
        Ok(values)
    }

    pub fn get_bytes<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        if (N as u64) << 3 > self.available()? {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "get_bytes({}): out of bounds at byte {}",
                    N,
                    self.position()? >> 3
                ),
            ));
        }
        let mut bytes = [0u8; N];
        self.bs.read_bytes(&mut bytes)?;
        Ok(bytes)
    }

    #[inline(always)]
    pub fn available(&mut self) -> io::Result<u64> {
        self.bs.position_in_bits().map(|pos| self.len - pos)
    }

    /// Current position in bits.
    #[inline(always)]
    pub fn position(&mut self) -> io::Result<u64> {
        self.bs.position_in_bits()
    }
}

impl<'a> LayoutSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        let len = buf.len() as u64;
        let read = io::Cursor::new(buf);

        Self::new(read, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_fields() {
        let data = [
            0x34, 0x12, // u16
            0xFE, 0xFF, // i16 -2
            0x01, 0xEF, 0xCD, 0xAB, // u32
            b'R', b'A', b'W', b'M',
        ];
        let mut reader = LayoutSliceReader::from_slice(&data);

        assert_eq!(reader.get_u16().unwrap(), 0x1234);
        assert_eq!(reader.get_i16().unwrap(), -2);
        assert_eq!(reader.get_u32().unwrap(), 0xABCDEF01);
        assert_eq!(&reader.get_bytes::<4>().unwrap(), b"RAWM");
        assert_eq!(reader.available().unwrap(), 0);
    }

    #[test]
    fn rejects_reads_past_the_end() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = LayoutSliceReader::from_slice(&data);

        let err = reader.get_u32().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let err = reader.get_bytes::<4>().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        assert_eq!(reader.get_u16().unwrap(), 0x0201);
    }
}
