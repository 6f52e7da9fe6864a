//! Reusable backing storage for growable encoders.

use std::cell::RefCell;

/// Slabs smaller than this are never allocated; tiny rents round up so the
/// shelf stays useful across differently-sized messages.
const MIN_SLAB: usize = 64;

/// A pool of reusable byte slabs backing growable [`WriteBuffer`]s.
///
/// Single-threaded by design: an encoder leases a slab for its lifetime and
/// the slab returns to the shelf when the encoder is frozen or dropped.
///
/// [`WriteBuffer`]: crate::WriteBuffer
pub struct BufferPool {
    shelf: RefCell<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            shelf: RefCell::new(Vec::new()),
        }
    }

    /// Takes a slab of capacity at least `min` off the shelf, allocating a
    /// fresh one if nothing fits.
    pub fn rent(&self, min: usize) -> Vec<u8> {
        let mut shelf = self.shelf.borrow_mut();
        if let Some(index) = shelf.iter().position(|slab| slab.len() >= min) {
            return shelf.swap_remove(index);
        }
        vec![0; min.max(MIN_SLAB).next_power_of_two()]
    }

    /// Exchanges `slab` for one of capacity at least `max(2 * slab.len(), min)`,
    /// preserving the first `written` bytes. The old slab goes back on the shelf.
    pub fn grow(&self, slab: Vec<u8>, written: usize, min: usize) -> Vec<u8> {
        let target = min.max(slab.len() * 2);
        let mut grown = self.rent(target);
        grown[..written].copy_from_slice(&slab[..written]);
        self.put_back(slab);
        grown
    }

    /// Returns a slab to the shelf for reuse. Contents are not cleared.
    pub fn put_back(&self, slab: Vec<u8>) {
        self.shelf.borrow_mut().push(slab);
    }

    /// The number of slabs currently shelved.
    pub fn shelved(&self) -> usize {
        self.shelf.borrow().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
