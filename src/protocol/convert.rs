//! Binary converter
//!
//! Big-endian integer and byte-range access at fixed buffer offsets. All
//! header fields are big-endian on the wire.
//!
//! Out-of-range offsets are a programming error, not a recoverable
//! condition: every function panics rather than silently truncating.

// =============================================================================
// Big-Endian Writers
// =============================================================================

/// Write a big-endian u16 at `offset`
///
/// # Panics
/// If `offset + 2` exceeds the buffer length.
pub fn write_u16(buffer: &mut [u8], offset: usize, value: u16) {
    buffer[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

/// Write a big-endian u32 at `offset`
///
/// # Panics
/// If `offset + 4` exceeds the buffer length.
pub fn write_u32(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Write a big-endian u64 at `offset`
///
/// # Panics
/// If `offset + 8` exceeds the buffer length.
pub fn write_u64(buffer: &mut [u8], offset: usize, value: u64) {
    buffer[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
}

/// Copy `bytes` into the buffer at `offset`
///
/// # Panics
/// If `offset + bytes.len()` exceeds the buffer length.
pub fn write_bytes(buffer: &mut [u8], offset: usize, bytes: &[u8]) {
    buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
}

// =============================================================================
// Big-Endian Readers
// =============================================================================

/// Read a big-endian u16 at `offset`
///
/// # Panics
/// If `offset + 2` exceeds the buffer length.
pub fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buffer[offset], buffer[offset + 1]])
}

/// Read a big-endian u32 at `offset`
///
/// # Panics
/// If `offset + 4` exceeds the buffer length.
pub fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

/// Read a big-endian u64 at `offset`
///
/// # Panics
/// If `offset + 8` exceeds the buffer length.
pub fn read_u64(buffer: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buffer[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}

/// Borrow `length` bytes starting at `offset`
///
/// # Panics
/// If `offset + length` exceeds the buffer length.
pub fn read_bytes(buffer: &[u8], offset: usize, length: usize) -> &[u8] {
    &buffer[offset..offset + length]
}
