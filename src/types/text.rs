//! Codec implementations for text.
//!
//! Text travels as a 4-byte little-endian byte-count prefix followed by the
//! UTF-8 payload. An explicit zero-length prefix is an empty string, a
//! distinct wire form from the null sentinel of the nullable path. UTF-8 is
//! the contract end to end; there is no separate in-memory encoding.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    codec::Codec,
    error::Error,
};

/// Width of the text length prefix.
const PREFIX: usize = 4;

impl Codec for String {
    const WIDTH: Option<usize> = None;

    #[inline]
    fn size(&self) -> usize {
        PREFIX + self.len()
    }

    fn measure(buf: &ReadBuffer, at: usize) -> Result<usize, Error> {
        let Some(prefix) = buf.chunk_at(at, PREFIX) else {
            return Err(Error::Incomplete { required: PREFIX });
        };
        let len = u32::from_le_bytes(prefix.try_into().expect("prefix width")) as usize;
        Ok(PREFIX + len)
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        // Once the prefix is visible the hint covers prefix plus payload; the
        // cursor moves only after the whole value is present and valid.
        let total = Self::measure(buf, buf.position())?;
        let payload = &buf.peek(total)?[PREFIX..];
        let text = std::str::from_utf8(payload)
            .map_err(|_| Error::InvalidText)?
            .to_owned();
        buf.advance(total);
        Ok(text)
    }

    fn write(&self, buf: &mut WriteBuffer<'_>) {
        let len = u32::try_from(self.len()).expect("text length exceeds u32");
        buf.claim(PREFIX).copy_from_slice(&len.to_le_bytes());
        buf.claim(self.len()).copy_from_slice(self.as_bytes());
    }
}

/// A single UTF-16 code unit, the wire form of a two-byte character.
///
/// Kept as a code unit rather than a `char` because a lone surrogate is a
/// valid wire value but not a valid Unicode scalar; conversions to and from
/// `char` are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Utf16Char(pub u16);

impl From<u16> for Utf16Char {
    fn from(unit: u16) -> Self {
        Self(unit)
    }
}

impl From<Utf16Char> for u16 {
    fn from(unit: Utf16Char) -> Self {
        unit.0
    }
}

impl TryFrom<char> for Utf16Char {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Error> {
        u16::try_from(value as u32)
            .map(Self)
            .map_err(|_| Error::Cast {
                from: "char",
                to: "utf-16 code unit",
            })
    }
}

impl TryFrom<Utf16Char> for char {
    type Error = Error;

    fn try_from(value: Utf16Char) -> Result<Self, Error> {
        char::from_u32(value.0 as u32).ok_or(Error::Cast {
            from: "utf-16 code unit",
            to: "char",
        })
    }
}

impl Codec for Utf16Char {
    const WIDTH: Option<usize> = Some(2);

    #[inline]
    fn size(&self) -> usize {
        2
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(2)
    }

    #[inline]
    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        u16::read(buf).map(Self::from)
    }

    #[inline]
    fn write(&self, buf: &mut WriteBuffer<'_>) {
        u16::from(*self).write(buf);
    }
}
