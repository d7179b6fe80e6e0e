pub type Result<T> = std::result::Result<T, crate::error::ChunkviewError>;

/// Alpha bits ORed into every color the renderer writes.
pub const OPAQUE: u32 = 0xFF00_0000;

#[inline]
pub fn opaque(rgb: u32) -> u32 {
    rgb | OPAQUE
}
