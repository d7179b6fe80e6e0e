//! In-memory tag tree for chunk records, with a big-endian reader and writer.

mod io;
mod tag;

pub use io::{Compression, NbtFile};
pub use tag::Tag;
