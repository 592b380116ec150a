//! Bounded byte buffer with an optional decode arena
//!
//! [`Buffer`] is the single cursor type both sides of the codec work against -
//! packing writes through it, unpacking reads through it. It never allocates;
//! it borrows a caller-owned byte slice and refuses any access past its end.
//!
//! [`Arena`] is a bump allocator over a second caller-owned slice. Unpacking
//! variable-length fields (length-prefixed arrays, null-terminated strings)
//! materializes them in the arena so the decoded value can borrow storage that
//! outlives the decode call.

use core::mem::{self, MaybeUninit};

#[derive(PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Error {
    /// Write would run past the end of the buffer
    Overflow,
    /// Read would run past the end of the buffer
    Underflow,
    /// Seek target is not within the buffer
    OutOfRange,
    /// Decode arena has no room left for a variable-length value
    ArenaExhausted,
}

/// Bump allocator handing out disjoint chunks of a caller-owned slice.
///
/// Chunks keep the lifetime of the backing slice, not of the arena itself,
/// so decoded values stay usable after the `Buffer` is dropped.
pub struct Arena<'a> {
    remaining: &'a mut [u8],
}

impl<'a> Arena<'a> {
    pub fn new(backing: &'a mut [u8]) -> Self {
        Self { remaining: backing }
    }

    pub fn empty() -> Self {
        Self { remaining: &mut [] }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Carves `len` bytes off the front of the arena.
    pub fn alloc(&mut self, len: usize) -> Option<&'a mut [u8]> {
        if len > self.remaining.len() {
            return None;
        }
        let (chunk, rest) = mem::take(&mut self.remaining).split_at_mut(len);
        self.remaining = rest;
        Some(chunk)
    }

    /// Carves storage for `count` values of `T`, aligned for `T`.
    ///
    /// The slots are uninitialized; the caller is responsible for writing
    /// every slot before reading any of them back as `T`.
    pub fn alloc_uninit<T>(&mut self, count: usize) -> Option<&'a mut [MaybeUninit<T>]> {
        let pad = self.remaining.as_ptr().align_offset(mem::align_of::<T>());
        let bytes = count.checked_mul(mem::size_of::<T>())?;
        let total = pad.checked_add(bytes)?;
        if total > self.remaining.len() {
            return None;
        }
        let (chunk, rest) = mem::take(&mut self.remaining).split_at_mut(total);
        self.remaining = rest;
        let ptr = chunk[pad..].as_mut_ptr() as *mut MaybeUninit<T>;
        // chunk[pad..] is aligned for T and holds exactly `count` elements
        Some(unsafe { core::slice::from_raw_parts_mut(ptr, count) })
    }
}

/// Cursor over a caller-owned byte slice.
///
/// All accesses are bounds checked against the full slice length; an access
/// ending exactly at the end of the slice is allowed. The cursor position is
/// unspecified after a failed access.
pub struct Buffer<'a> {
    data: &'a mut [u8],
    pos: usize,
    arena: Arena<'a>,
}

impl<'a> Buffer<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            pos: 0,
            arena: Arena::empty(),
        }
    }

    /// Buffer with a decode arena attached, required for unpacking
    /// variable-length fields.
    pub fn with_arena(data: &'a mut [u8], heap: &'a mut [u8]) -> Self {
        Self {
            data,
            pos: 0,
            arena: Arena::new(heap),
        }
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self.pos.checked_add(bytes.len()).ok_or(Error::Overflow)?;
        if end > self.data.len() {
            return Err(Error::Overflow);
        }
        self.data[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    pub fn read_into(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let end = self.pos.checked_add(out.len()).ok_or(Error::Underflow)?;
        if end > self.data.len() {
            return Err(Error::Underflow);
        }
        out.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8, Error> {
        if self.pos >= self.data.len() {
            return Err(Error::Underflow);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Moves the cursor to an absolute position.
    ///
    /// The position one past the last byte is not addressable; rewinding is
    /// the intended use.
    pub fn seek(&mut self, pos: usize) -> Result<(), Error> {
        if pos >= self.data.len() {
            return Err(Error::OutOfRange);
        }
        self.pos = pos;
        Ok(())
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn arena_mut(&mut self) -> &mut Arena<'a> {
        &mut self.arena
    }

    /// Reads bytes up to (and consuming) a null terminator, storing them in
    /// the arena. Returns the bytes without the terminator.
    pub(crate) fn read_cstr(&mut self) -> Result<&'a [u8], Error> {
        let mut len = 0;
        loop {
            if self.pos + len >= self.data.len() {
                return Err(Error::Underflow);
            }
            // each scanned byte occupies one arena slot, terminator included
            if len + 1 > self.arena.remaining() {
                return Err(Error::ArenaExhausted);
            }
            if self.data[self.pos + len] == 0 {
                break;
            }
            len += 1;
        }
        let chunk = self.arena.alloc(len + 1).ok_or(Error::ArenaExhausted)?;
        chunk[..len].copy_from_slice(&self.data[self.pos..self.pos + len]);
        chunk[len] = 0;
        self.pos += len + 1;
        let (out, _) = chunk.split_at_mut(len);
        Ok(out)
    }
}
