//! Codec implementation for 128-bit unique identifiers.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    codec::Codec,
    error::Error,
};
use uuid::Uuid;

// Raw 16-byte binary form, no byte-order transformation.
impl Codec for Uuid {
    const WIDTH: Option<usize> = Some(16);

    #[inline]
    fn size(&self) -> usize {
        16
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(16)
    }

    #[inline]
    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(buf.peek(16)?);
        buf.advance(16);
        Ok(Uuid::from_bytes(raw))
    }

    #[inline]
    fn write(&self, buf: &mut WriteBuffer<'_>) {
        buf.claim(16).copy_from_slice(self.as_bytes());
    }
}
