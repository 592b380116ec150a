//! COBS (Consistent Overhead Byte Stuffing) encoding
//!
//! COBS removes all `0x00` bytes from a payload so that `0x00` can delimit
//! frames on the wire. The payload is split into blocks of at most 254
//! non-zero bytes, each prefixed with a length code; a code of `0xFF` marks a
//! full block with no implied zero after it.
//!
//! Besides the plain [`encode`]/[`decode`] pair, this module provides the
//! single-buffer variants the framer builds on: [`encode_from_offset`] reads
//! the payload from an offset inside the output buffer (the writer never
//! overtakes the reader as long as the offset is at least
//! [`cobs_overhead`]), and [`decode_in_place`] exploits that decoding only
//! shrinks data.

/// Worst-case encoded length for a `len`-byte payload, frame terminator not
/// included.
pub const fn max_encoded_len(len: usize) -> usize {
    len + cobs_overhead(len)
}

/// Number of length-code bytes encoding adds to a `len`-byte payload.
pub const fn cobs_overhead(len: usize) -> usize {
    (len + 253) / 254
}

#[derive(PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Error {
    /// Encoded output does not fit the destination buffer
    OutputBufferOverflow,
    /// A `0x00` byte appeared inside the encoded input
    ZeroByteInInput,
    /// A length code points past the end of the encoded input
    InputTooShort,
}

/// Encodes `src` into `dst`, returning the encoded length.
///
/// An empty payload encodes to the single code byte `0x01`.
pub fn encode(dst: &mut [u8], src: &[u8]) -> Result<usize, Error> {
    let mut code_idx = 0;
    let mut write_idx = 1;
    let mut code = 1u8;
    let mut read_idx = 0;

    if !src.is_empty() {
        loop {
            if write_idx >= dst.len() {
                return Err(Error::OutputBufferOverflow);
            }
            let byte = src[read_idx];
            read_idx += 1;
            if byte == 0 {
                dst[code_idx] = code;
                code_idx = write_idx;
                write_idx += 1;
                code = 1;
                if read_idx >= src.len() {
                    break;
                }
            } else {
                dst[write_idx] = byte;
                write_idx += 1;
                code += 1;
                if read_idx >= src.len() {
                    break;
                }
                if code == 0xFF {
                    // full block, open a new one
                    dst[code_idx] = code;
                    code_idx = write_idx;
                    write_idx += 1;
                    code = 1;
                }
            }
        }
    }

    if code_idx >= dst.len() {
        return Err(Error::OutputBufferOverflow);
    }
    dst[code_idx] = code;
    Ok(write_idx)
}

/// Encodes `len` bytes sitting at `buf[offset..offset + len]` into the front
/// of the same buffer.
///
/// `offset` must be at least [`cobs_overhead`]`(len)` (and non-zero) so the
/// write cursor can never pass the read cursor.
pub fn encode_from_offset(buf: &mut [u8], offset: usize, len: usize) -> Result<usize, Error> {
    debug_assert!(offset >= 1 && offset >= cobs_overhead(len));
    debug_assert!(offset + len <= buf.len());

    let end = offset + len;
    let mut code_idx = 0;
    let mut write_idx = 1;
    let mut code = 1u8;
    let mut read_idx = offset;

    if len != 0 {
        loop {
            if write_idx >= buf.len() {
                return Err(Error::OutputBufferOverflow);
            }
            let byte = buf[read_idx];
            read_idx += 1;
            if byte == 0 {
                buf[code_idx] = code;
                code_idx = write_idx;
                write_idx += 1;
                code = 1;
                if read_idx >= end {
                    break;
                }
            } else {
                buf[write_idx] = byte;
                write_idx += 1;
                code += 1;
                if read_idx >= end {
                    break;
                }
                if code == 0xFF {
                    buf[code_idx] = code;
                    code_idx = write_idx;
                    write_idx += 1;
                    code = 1;
                }
            }
        }
    }

    if code_idx >= buf.len() {
        return Err(Error::OutputBufferOverflow);
    }
    buf[code_idx] = code;
    Ok(write_idx)
}

/// Decodes `src` into `dst`, returning the decoded length.
///
/// `src` is the encoded byte string without the frame terminator. The
/// decoded length is undefined on failure.
pub fn decode(dst: &mut [u8], src: &[u8]) -> Result<usize, Error> {
    let mut write_idx = 0;
    let mut read_idx = 0;

    while read_idx < src.len() {
        let code = src[read_idx];
        read_idx += 1;
        if code == 0 {
            return Err(Error::ZeroByteInInput);
        }
        let block = (code - 1) as usize;
        if block > src.len() - read_idx {
            return Err(Error::InputTooShort);
        }
        if block > dst.len() - write_idx {
            return Err(Error::OutputBufferOverflow);
        }
        for _ in 0..block {
            let byte = src[read_idx];
            read_idx += 1;
            if byte == 0 {
                return Err(Error::ZeroByteInInput);
            }
            dst[write_idx] = byte;
            write_idx += 1;
        }
        if read_idx >= src.len() {
            break;
        }
        // a full block carries no implied zero
        if code != 0xFF {
            if write_idx >= dst.len() {
                return Err(Error::OutputBufferOverflow);
            }
            dst[write_idx] = 0;
            write_idx += 1;
        }
    }

    Ok(write_idx)
}

/// Decodes `buf` over itself, returning the decoded length.
///
/// Safe in one buffer because the write cursor always trails the read
/// cursor. Decoded bytes land at `buf[..decoded_len]`.
pub fn decode_in_place(buf: &mut [u8]) -> Result<usize, Error> {
    let len = buf.len();
    let mut write_idx = 0;
    let mut read_idx = 0;

    while read_idx < len {
        let code = buf[read_idx];
        read_idx += 1;
        if code == 0 {
            return Err(Error::ZeroByteInInput);
        }
        let block = (code - 1) as usize;
        if block > len - read_idx {
            return Err(Error::InputTooShort);
        }
        for _ in 0..block {
            let byte = buf[read_idx];
            read_idx += 1;
            if byte == 0 {
                return Err(Error::ZeroByteInInput);
            }
            buf[write_idx] = byte;
            write_idx += 1;
        }
        if read_idx >= len {
            break;
        }
        if code != 0xFF {
            buf[write_idx] = 0;
            write_idx += 1;
        }
    }

    Ok(write_idx)
}
