//! Codec implementations for Rust primitive types.
//!
//! All multi-byte integers travel little-endian; floats travel as the
//! little-endian form of their IEEE-754 bit pattern, never via numeric
//! conversion. Every type here has a compile-time constant width.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    codec::Codec,
    error::Error,
};

// Numeric types implementation
macro_rules! impl_numeric {
    ($type:ty) => {
        impl Codec for $type {
            const WIDTH: Option<usize> = Some(std::mem::size_of::<$type>());

            #[inline]
            fn size(&self) -> usize {
                std::mem::size_of::<$type>()
            }

            #[inline]
            fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
                Ok(std::mem::size_of::<$type>())
            }

            #[inline]
            fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
                const W: usize = std::mem::size_of::<$type>();
                let mut raw = [0u8; W];
                raw.copy_from_slice(buf.peek(W)?);
                buf.advance(W);
                Ok(<$type>::from_le_bytes(raw))
            }

            #[inline]
            fn write(&self, buf: &mut WriteBuffer<'_>) {
                buf.claim(std::mem::size_of::<$type>())
                    .copy_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_numeric!(u8);
impl_numeric!(u16);
impl_numeric!(u32);
impl_numeric!(u64);
impl_numeric!(i8);
impl_numeric!(i16);
impl_numeric!(i32);
impl_numeric!(i64);
impl_numeric!(f32);
impl_numeric!(f64);

// Bool implementation. Any non-zero byte reads as true: the same byte doubles
// as the presence marker in nullable contexts.
impl Codec for bool {
    const WIDTH: Option<usize> = Some(1);

    #[inline]
    fn size(&self) -> usize {
        1
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(1)
    }

    #[inline]
    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let raw = buf.peek(1)?[0];
        buf.advance(1);
        Ok(raw != 0)
    }

    #[inline]
    fn write(&self, buf: &mut WriteBuffer<'_>) {
        buf.claim(1)[0] = if *self { 1 } else { 0 };
    }
}
