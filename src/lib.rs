//! Binary wire format for courier messages.
//!
//! # Overview
//!
//! The byte-level encode/decode engine under the messaging layer: a
//! [`WriteBuffer`]/[`ReadBuffer`] pair converting primitive values, their
//! nullable forms, and homogeneous collections to and from a compact
//! little-endian representation. The decoder is built for incremental input
//! (as from a socket): an operation that lacks bytes fails with
//! [`Error::Incomplete`] carrying the byte count a retry needs, and never
//! moves the cursor or exposes a partial value. Which operation to invoke for
//! each field (and the element count for collections) comes from the metadata
//! layer above; the cursors know nothing about object shape.
//!
//! # Example (incremental decode)
//!
//! ```
//! use courier_codec::{BufferPool, Error, ReadBuffer, WriteBuffer};
//!
//! let pool = BufferPool::new();
//! let mut writer = WriteBuffer::pooled(&pool, 8);
//! writer.write(&0x01020304u32).unwrap();
//! writer.write(&String::from("ab")).unwrap();
//! let encoded = writer.freeze();
//!
//! // Feed the reader a truncated view first: decoding fails with the total
//! // byte count required, and the cursor does not move.
//! let mut reader = ReadBuffer::new(encoded.slice(..9));
//! assert_eq!(reader.read::<u32>().unwrap(), 0x01020304);
//! assert_eq!(
//!     reader.read::<String>(),
//!     Err(Error::Incomplete { required: 6 })
//! );
//!
//! // Retry once the rest has arrived.
//! reader.replenish(encoded);
//! assert_eq!(reader.read::<String>().unwrap(), "ab");
//! ```
//!
//! # Example (fixed destination)
//!
//! ```
//! use courier_codec::{Error, WriteBuffer};
//!
//! let mut dest = [0u8; 4];
//! let mut writer = WriteBuffer::fixed(&mut dest);
//! writer.write(&(-1i32)).unwrap();
//! // A fixed destination cannot grow; the caller retries with a larger one.
//! assert_eq!(writer.write(&0u8), Err(Error::Exhausted { required: 5 }));
//! drop(writer);
//! assert_eq!(dest, [0xFF, 0xFF, 0xFF, 0xFF]);
//! ```

pub mod buffer;
pub mod codec;
pub mod error;
pub mod fault;
pub mod types;
pub mod value;

// Re-export main types and traits
pub use buffer::{BufferPool, ReadBuffer, WriteBuffer};
pub use codec::Codec;
pub use error::Error;
pub use fault::Alternator;
pub use types::Utf16Char;
pub use value::{Kind, Value};
