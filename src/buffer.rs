//! Cursors over byte buffers.
//!
//! [`ReadBuffer`] is a non-owning cursor over an immutable view; every decode
//! operation either consumes one complete logical value or leaves the cursor
//! where it started. [`WriteBuffer`] appends to either a caller-supplied
//! fixed slice or a growable slab leased from a [`BufferPool`].

mod pool;
mod read;
mod write;

pub use pool::BufferPool;
pub use read::ReadBuffer;
pub use write::WriteBuffer;
