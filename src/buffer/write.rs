//! The encode cursor.

use crate::{
    buffer::pool::BufferPool,
    codec::{Codec, NULL_MARKER, PRESENT_MARKER},
    error::Error,
};
use bytes::Bytes;
use std::{collections::HashSet, hash::Hash};

// A slab borrowed from a pool for the lifetime of one encoder. Returning it
// exactly once is handled by Drop.
struct Lease<'a> {
    pool: &'a BufferPool,
    slab: Option<Vec<u8>>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Some(slab) = self.slab.take() {
            self.pool.put_back(slab);
        }
    }
}

enum Backing<'a> {
    Fixed(&'a mut [u8]),
    Leased(Lease<'a>),
}

/// An encode cursor over either a caller-supplied fixed slice or a growable
/// pool-leased slab.
///
/// Every operation pre-computes its exact byte count and performs a single
/// capacity check before emitting anything, so a failed write leaves the
/// buffer unchanged. A leased buffer grows transparently (to at least double
/// its capacity, content preserved); a fixed buffer fails with
/// [`Error::Exhausted`] and the caller retries the whole message into a
/// larger destination.
pub struct WriteBuffer<'a> {
    backing: Backing<'a>,
    position: usize,
}

impl<'a> WriteBuffer<'a> {
    /// Wraps a caller-supplied destination. The cursor never reallocates it.
    pub fn fixed(dest: &'a mut [u8]) -> Self {
        Self {
            backing: Backing::Fixed(dest),
            position: 0,
        }
    }

    /// Leases an initial slab of capacity at least `initial` from `pool`.
    /// The slab returns to the pool when the cursor is frozen or dropped.
    pub fn pooled(pool: &'a BufferPool, initial: usize) -> Self {
        Self {
            backing: Backing::Leased(Lease {
                pool,
                slab: Some(pool.rent(initial)),
            }),
            position: 0,
        }
    }

    /// The current write position, i.e. the number of bytes produced so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        match &self.backing {
            Backing::Fixed(dest) => dest.len(),
            Backing::Leased(lease) => lease.slab.as_ref().expect("slab leased").len(),
        }
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        match &self.backing {
            Backing::Fixed(dest) => &dest[..self.position],
            Backing::Leased(lease) => &lease.slab.as_ref().expect("slab leased")[..self.position],
        }
    }

    /// Copies the written bytes out. A leased slab goes back to its pool.
    pub fn freeze(self) -> Bytes {
        Bytes::copy_from_slice(self.written())
    }

    /// Encodes one bare scalar.
    pub fn write<T: Codec>(&mut self, value: &T) -> Result<(), Error> {
        self.ensure(value.size())?;
        value.write(self);
        Ok(())
    }

    /// Encodes one nullable scalar.
    ///
    /// With `null_flags` set a sentinel byte precedes the payload; without it
    /// the caller conveys nullability out of band, so `Some` emits the bare
    /// payload and `None` emits nothing.
    pub fn write_nullable<T: Codec>(
        &mut self,
        value: Option<&T>,
        null_flags: bool,
    ) -> Result<(), Error> {
        if !null_flags {
            return match value {
                Some(inner) => self.write(inner),
                None => Ok(()),
            };
        }
        let total = 1 + value.map(Codec::size).unwrap_or(0);
        self.ensure(total)?;
        match value {
            Some(inner) => {
                self.claim(1)[0] = PRESENT_MARKER;
                inner.write(self);
            }
            None => self.claim(1)[0] = NULL_MARKER,
        }
        Ok(())
    }

    /// Encodes an ordered sequence of elements, back to back, with no count
    /// prefix: the count travels through the metadata layer. One capacity
    /// check covers the whole run.
    pub fn write_array<T: Codec>(&mut self, items: &[T]) -> Result<(), Error> {
        let total: usize = items.iter().map(Codec::size).sum();
        self.ensure(total)?;
        for item in items {
            item.write(self);
        }
        Ok(())
    }

    /// Encodes a set of elements. Iteration order is unspecified, like the
    /// collection itself.
    pub fn write_set<T: Codec + Eq + Hash>(&mut self, items: &HashSet<T>) -> Result<(), Error> {
        let total: usize = items.iter().map(Codec::size).sum();
        self.ensure(total)?;
        for item in items {
            item.write(self);
        }
        Ok(())
    }

    /// Appends raw bytes verbatim.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.ensure(bytes.len())?;
        self.claim(bytes.len()).copy_from_slice(bytes);
        Ok(())
    }

    // Makes room for `additional` bytes past the current position, growing a
    // leased slab when permitted.
    pub(crate) fn ensure(&mut self, additional: usize) -> Result<(), Error> {
        let needed = self.position + additional;
        if needed <= self.capacity() {
            return Ok(());
        }
        match &mut self.backing {
            Backing::Fixed(_) => Err(Error::Exhausted { required: needed }),
            Backing::Leased(lease) => {
                let slab = lease.slab.take().expect("slab leased");
                lease.slab = Some(lease.pool.grow(slab, self.position, needed));
                Ok(())
            }
        }
    }

    // Hands out the next `len` bytes and advances the cursor. Capacity must
    // already be ensured.
    pub(crate) fn claim(&mut self, len: usize) -> &mut [u8] {
        let start = self.position;
        let end = start + len;
        let slab: &mut [u8] = match &mut self.backing {
            Backing::Fixed(dest) => dest,
            Backing::Leased(lease) => lease.slab.as_mut().expect("slab leased"),
        };
        debug_assert!(end <= slab.len(), "write past reserved capacity");
        self.position = end;
        &mut slab[start..end]
    }
}
