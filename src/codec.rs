//! Core codec trait and the generic nullable wrapper.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    error::Error,
};

/// The sentinel byte marking an absent nullable value.
pub(crate) const NULL_MARKER: u8 = 0;

/// The byte marking a present nullable value.
pub(crate) const PRESENT_MARKER: u8 = 1;

/// A value with a defined wire representation.
///
/// Every supported primitive implements this once; the nullable and
/// collection shapes are generic wrappers over it, so the full
/// type × nullability × shape surface collapses to this single trait plus
/// a handful of generic cursor methods.
pub trait Codec: Sized {
    /// The encoded width shared by every value of the type, or `None` for
    /// variable-width types (text).
    const WIDTH: Option<usize>;

    /// The exact number of bytes [`Codec::write`] will produce for this value.
    fn size(&self) -> usize;

    /// The number of bytes one encoded value starting at absolute offset `at`
    /// occupies, determined without decoding it.
    ///
    /// Fails with [`Error::Incomplete`] (relative to `at`) if the view does
    /// not yet hold enough bytes to tell. Collection decodes use this to
    /// bounds-check an entire run of elements before decoding any of them.
    fn measure(buf: &ReadBuffer, at: usize) -> Result<usize, Error>;

    /// Decodes one value from the buffer's current position.
    ///
    /// On any failure the position is left at its pre-call value; on success
    /// it has advanced by exactly the bytes consumed.
    fn read(buf: &mut ReadBuffer) -> Result<Self, Error>;

    /// Encodes this value at the buffer's current position.
    ///
    /// Capacity for [`Codec::size`] bytes must already be reserved; the
    /// public [`WriteBuffer`] operations do so before delegating here.
    fn write(&self, buf: &mut WriteBuffer<'_>);
}

// Nullable wrapper: one sentinel byte, then the payload when present. This is
// the per-element form used inside collections; bare nullable scalars go
// through `ReadBuffer::read_nullable`, which can omit the sentinel.
impl<T: Codec> Codec for Option<T> {
    const WIDTH: Option<usize> = None;

    #[inline]
    fn size(&self) -> usize {
        match self {
            Some(inner) => 1 + inner.size(),
            None => 1,
        }
    }

    fn measure(buf: &ReadBuffer, at: usize) -> Result<usize, Error> {
        let Some(marker) = buf.byte_at(at) else {
            return Err(Error::Incomplete { required: 1 });
        };
        if marker == NULL_MARKER {
            return Ok(1);
        }
        match T::measure(buf, at + 1) {
            Ok(width) => Ok(1 + width),
            Err(err) => Err(err.deepen(1)),
        }
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        // One up-front check covers the marker and the payload, so the marker
        // is never consumed ahead of an incomplete payload.
        let total = Self::measure(buf, buf.position())?;
        buf.require(total)?;
        let start = buf.position();
        let marker = buf.peek(1)?[0];
        buf.advance(1);
        if marker == NULL_MARKER {
            return Ok(None);
        }
        match T::read(buf) {
            Ok(inner) => Ok(Some(inner)),
            Err(err) => {
                buf.rewind(start);
                Err(err.deepen(1))
            }
        }
    }

    #[inline]
    fn write(&self, buf: &mut WriteBuffer<'_>) {
        match self {
            Some(inner) => {
                buf.claim(1)[0] = PRESENT_MARKER;
                inner.write(buf);
            }
            None => buf.claim(1)[0] = NULL_MARKER,
        }
    }
}
