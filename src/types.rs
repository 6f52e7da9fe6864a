//! Codec implementations for the supported wire types.

pub mod decimal;
pub mod ident;
pub mod primitives;
pub mod text;
pub mod time;

pub use text::Utf16Char;
