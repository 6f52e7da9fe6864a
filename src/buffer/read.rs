//! The decode cursor.

use crate::{codec::Codec, error::Error, fault::Alternator};
use bytes::Bytes;
use std::{collections::HashSet, hash::Hash};

/// A non-owning decode cursor over an immutable byte view.
///
/// Every operation is atomic: it either consumes one complete logical value
/// or fails with [`Error::Incomplete`] carrying the total byte count required
/// from the pre-call position, leaving the position untouched. The caller
/// retries the same operation after appending bytes via
/// [`ReadBuffer::replenish`].
pub struct ReadBuffer {
    view: Bytes,
    position: usize,
    faults: Option<Alternator>,
}

impl ReadBuffer {
    pub fn new(view: Bytes) -> Self {
        Self {
            view,
            position: 0,
            faults: None,
        }
    }

    /// Builds a cursor whose single-value decode operations are periodically
    /// failed by `faults`, for exercising retry loops in tests.
    pub fn with_faults(view: Bytes, faults: Alternator) -> Self {
        Self {
            view,
            position: 0,
            faults: Some(faults),
        }
    }

    /// The current read position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes between the current position and the end of the view.
    pub fn remaining(&self) -> usize {
        self.view.len() - self.position
    }

    /// Swaps in a longer view holding the same already-read prefix, so a
    /// failed decode can be retried as more bytes arrive from the transport.
    ///
    /// Panics if the new view is shorter than the current one.
    pub fn replenish(&mut self, view: Bytes) {
        assert!(
            view.len() >= self.view.len(),
            "replenished view shrank from {} to {} bytes",
            self.view.len(),
            view.len()
        );
        self.view = view;
    }

    /// Decodes one bare scalar.
    pub fn read<T: Codec>(&mut self) -> Result<T, Error> {
        if self.tripped() {
            let required = T::measure(self, self.position)?;
            return Err(Error::Incomplete { required });
        }
        T::read(self)
    }

    /// Decodes one nullable scalar.
    ///
    /// With `null_flags` set the value carries a leading sentinel byte; without
    /// it the caller knows nullability out of band and the bare payload is
    /// decoded as present.
    pub fn read_nullable<T: Codec>(&mut self, null_flags: bool) -> Result<Option<T>, Error> {
        if self.tripped() {
            let required = if null_flags {
                Option::<T>::measure(self, self.position)?
            } else {
                T::measure(self, self.position)?
            };
            return Err(Error::Incomplete { required });
        }
        if null_flags {
            Option::<T>::read(self)
        } else {
            T::read(self).map(Some)
        }
    }

    /// Decodes `count` elements into an ordered sequence.
    ///
    /// The element count is supplied by the caller, never inferred from the
    /// buffer. Total size is bounds-checked before any element decodes, so the
    /// whole collection decodes or none of it does. Nullable elements
    /// (`Option<T>`) each carry their own sentinel byte.
    pub fn read_array<T: Codec>(&mut self, count: usize) -> Result<Vec<T>, Error> {
        let total = self.span::<T>(count)?;
        self.require(total)?;
        let start = self.position;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            match T::read(self) {
                Ok(item) => items.push(item),
                Err(err) => {
                    let consumed = self.position - start;
                    self.rewind(start);
                    return Err(err.deepen(consumed));
                }
            }
        }
        Ok(items)
    }

    /// Decodes `count` elements into a set. Same atomicity as
    /// [`ReadBuffer::read_array`].
    pub fn read_set<T: Codec + Eq + Hash>(&mut self, count: usize) -> Result<HashSet<T>, Error> {
        let total = self.span::<T>(count)?;
        self.require(total)?;
        let start = self.position;
        let mut items = HashSet::with_capacity(count);
        for _ in 0..count {
            match T::read(self) {
                Ok(item) => {
                    items.insert(item);
                }
                Err(err) => {
                    let consumed = self.position - start;
                    self.rewind(start);
                    return Err(err.deepen(consumed));
                }
            }
        }
        Ok(items)
    }

    /// Takes `len` raw bytes as a sub-view, without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, Error> {
        self.require(len)?;
        let taken = self.view.slice(self.position..self.position + len);
        self.advance(len);
        Ok(taken)
    }

    // The encoded extent of `count` back-to-back elements starting at the
    // current position. For fixed-width elements this is a multiplication;
    // variable-width elements are walked via `Codec::measure` without
    // decoding or allocating.
    fn span<T: Codec>(&self, count: usize) -> Result<usize, Error> {
        match T::WIDTH {
            Some(width) => Ok(width
                .checked_mul(count)
                .expect("collection size overflows usize")),
            None => {
                let mut total = 0usize;
                for _ in 0..count {
                    total += T::measure(self, self.position + total)
                        .map_err(|err| err.deepen(total))?;
                }
                Ok(total)
            }
        }
    }

    pub(crate) fn tripped(&mut self) -> bool {
        match &mut self.faults {
            Some(faults) => faults.trip(),
            None => false,
        }
    }

    pub(crate) fn require(&self, needed: usize) -> Result<(), Error> {
        if self.remaining() < needed {
            return Err(Error::Incomplete { required: needed });
        }
        Ok(())
    }

    pub(crate) fn peek(&self, len: usize) -> Result<&[u8], Error> {
        self.require(len)?;
        Ok(&self.view[self.position..self.position + len])
    }

    pub(crate) fn advance(&mut self, len: usize) {
        debug_assert!(self.position + len <= self.view.len());
        self.position += len;
    }

    pub(crate) fn rewind(&mut self, position: usize) {
        debug_assert!(position <= self.position);
        self.position = position;
    }

    pub(crate) fn byte_at(&self, at: usize) -> Option<u8> {
        self.view.get(at).copied()
    }

    pub(crate) fn chunk_at(&self, at: usize, len: usize) -> Option<&[u8]> {
        let end = at.checked_add(len)?;
        if end > self.view.len() {
            return None;
        }
        Some(&self.view[at..end])
    }
}
