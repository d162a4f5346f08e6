//! Little-endian encoders for packed layouts.
//!
//! Structs deriving [`ToBytes`](rawmd_macros::ToBytes) write their fields in
//! declaration order with no padding, which is exactly the on-disk layout.

pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t { #[inline] fn write_le(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_le_bytes()); }}
    )+ }
}

impl_num_le!(u8, i8, u16, i16, u32, i32, u64, i64);

impl<T: WriteBytesLe, const N: usize> WriteBytesLe for [T; N] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::byteorder::WriteBytesLe;
    use rawmd_macros::ToBytes;

    #[derive(ToBytes)]
    struct Mini {
        a: u16,
        b: i32,
        tag: [u8; 4],
    }

    #[derive(ToBytes)]
    struct Nested {
        inner: Mini,
        tail: [i16; 2],
    }

    #[test]
    fn to_bytes_is_packed_little_endian() {
        let s = Nested {
            inner: Mini {
                a: 0x1234,
                b: -2,
                tag: *b"TEST",
            },
            tail: [1, -1],
        };

        let mut vec_le = Vec::new();
        s.write_le(&mut vec_le);

        let expected_le = [
            0x34, 0x12, 0xFE, 0xFF, 0xFF, 0xFF, b'T', b'E', b'S', b'T', 0x01, 0x00, 0xFF, 0xFF,
        ];

        assert_eq!(&vec_le[..], &expected_le);
    }
}
