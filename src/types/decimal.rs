//! Codec implementation for 128-bit fixed-point decimals.
//!
//! The wire form is the standard 128-bit decimal component layout: four
//! little-endian 32-bit words: mantissa low, mid, high, then a flags word
//! carrying the scale in bits 16-23 and the sign in bit 31.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    codec::Codec,
    error::Error,
};
use rust_decimal::Decimal;

const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0xFF;
const SIGN_BIT: u32 = 1 << 31;
const MAX_SCALE: u32 = 28;

impl Codec for Decimal {
    const WIDTH: Option<usize> = Some(16);

    #[inline]
    fn size(&self) -> usize {
        16
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(16)
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let raw = buf.peek(16)?;
        let lo = u32::from_le_bytes(raw[0..4].try_into().expect("component width"));
        let mid = u32::from_le_bytes(raw[4..8].try_into().expect("component width"));
        let hi = u32::from_le_bytes(raw[8..12].try_into().expect("component width"));
        let flags = u32::from_le_bytes(raw[12..16].try_into().expect("component width"));
        let scale = (flags >> SCALE_SHIFT) & SCALE_MASK;
        if scale > MAX_SCALE {
            return Err(Error::OutOfRange("decimal scale"));
        }
        let negative = flags & SIGN_BIT != 0;
        buf.advance(16);
        Ok(Decimal::from_parts(lo, mid, hi, negative, scale))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>) {
        let mantissa = self.mantissa().unsigned_abs();
        let mut flags = self.scale() << SCALE_SHIFT;
        if self.is_sign_negative() {
            flags |= SIGN_BIT;
        }
        let raw = buf.claim(16);
        raw[0..4].copy_from_slice(&(mantissa as u32).to_le_bytes());
        raw[4..8].copy_from_slice(&((mantissa >> 32) as u32).to_le_bytes());
        raw[8..12].copy_from_slice(&((mantissa >> 64) as u32).to_le_bytes());
        raw[12..16].copy_from_slice(&flags.to_le_bytes());
    }
}
