//! Block-pipe length handling.
//!
//! Block pipes only move whole blocks. Transfers whose length is not a
//! multiple of the block size go through a zero-padded staging buffer.

use super::error::{DeviceError, DeviceResult};

/// Transfer length for `len` bytes on a pipe with `block_size` blocks.
///
/// Multiples pass through unchanged (including zero); anything else is
/// rounded up to the next multiple.
pub fn padded_len(len: usize, block_size: usize) -> DeviceResult<usize> {
    if block_size == 0 {
        return Err(DeviceError::InvalidBlockSize);
    }
    if len.is_multiple_of(block_size) {
        return Ok(len);
    }
    Ok(len.div_ceil(block_size) * block_size)
}

/// Copy `data` into a zero-padded buffer of `padded` bytes.
pub fn staged(data: &[u8], padded: usize) -> Vec<u8> {
    let mut buf = vec![0u8; padded];
    buf[..data.len()].copy_from_slice(data);
    buf
}
