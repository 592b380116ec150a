//! Wire codec for fixed-width scalars, arrays, strings and length-prefixed
//! containers
//!
//! All multi-byte scalars are little-endian. Composite values are packed
//! field by field with no padding and no self-description; both peers must
//! agree on the schema out of band.
//!
//! Types with a single wire form implement [`Encode`]/[`Decode`]. Containers
//! whose element wire form is ambiguous (length-prefixed arrays of blobs or
//! strings) go through the `write_sized_with`/`read_sized_with` helpers and a
//! per-element closure instead.

use core::mem::MaybeUninit;
use core::str::Utf8Error;

use crate::buffer::{Buffer, Error};

/// A value that can be packed into a [`Buffer`].
pub trait Encode {
    fn encode(&self, buf: &mut Buffer<'_>) -> Result<(), Error>;
}

/// A value that can be unpacked from a [`Buffer`].
///
/// The lifetime ties decoded values to the buffer's storage: variable-length
/// fields borrow from the decode arena.
pub trait Decode<'a>: Sized {
    fn decode(buf: &mut Buffer<'a>) -> Result<Self, Error>;
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {$(
        impl Encode for $t {
            fn encode(&self, buf: &mut Buffer<'_>) -> Result<(), Error> {
                buf.write(&self.to_le_bytes())
            }
        }

        impl<'a> Decode<'a> for $t {
            fn decode(buf: &mut Buffer<'a>) -> Result<Self, Error> {
                let mut raw = [0u8; core::mem::size_of::<$t>()];
                buf.read_into(&mut raw)?;
                Ok(<$t>::from_le_bytes(raw))
            }
        }
    )*};
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Encode for bool {
    fn encode(&self, buf: &mut Buffer<'_>) -> Result<(), Error> {
        buf.write(&[*self as u8])
    }
}

impl<'a> Decode<'a> for bool {
    fn decode(buf: &mut Buffer<'a>) -> Result<Self, Error> {
        Ok(buf.read_byte()? != 0)
    }
}

/// Fixed-size arrays are packed element-wise with no length on the wire.
impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, buf: &mut Buffer<'_>) -> Result<(), Error> {
        for item in self {
            item.encode(buf)?;
        }
        Ok(())
    }
}

impl<'a, T: Decode<'a> + Default + Copy, const N: usize> Decode<'a> for [T; N] {
    fn decode(buf: &mut Buffer<'a>) -> Result<Self, Error> {
        let mut out = [T::default(); N];
        for slot in out.iter_mut() {
            *slot = T::decode(buf)?;
        }
        Ok(out)
    }
}

/// Integer type used as the length prefix of sized arrays and byte blobs.
///
/// The prefix width is a schema decision; `u8` is the default used by the
/// plain `write_*`/`read_*` helpers.
pub trait Count: Encode + for<'de> Decode<'de> + Copy {
    fn from_len(len: usize) -> Option<Self>;
    fn to_len(self) -> usize;
}

macro_rules! impl_count {
    ($($t:ty),* $(,)?) => {$(
        impl Count for $t {
            fn from_len(len: usize) -> Option<Self> {
                <$t>::try_from(len).ok()
            }

            fn to_len(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_count!(u8, u16, u32);

/// Packs a length-prefixed array with a `u8` count.
pub fn write_sized<T: Encode>(buf: &mut Buffer<'_>, items: &[T]) -> Result<(), Error> {
    write_sized_as::<u8, T>(buf, items)
}

/// Packs a length-prefixed array with an explicit count width.
///
/// Fails with [`Error::Overflow`] when the element count does not fit the
/// count type.
pub fn write_sized_as<C: Count, T: Encode>(buf: &mut Buffer<'_>, items: &[T]) -> Result<(), Error> {
    let count = C::from_len(items.len()).ok_or(Error::Overflow)?;
    count.encode(buf)?;
    for item in items {
        item.encode(buf)?;
    }
    Ok(())
}

/// Like [`write_sized`], with a caller-supplied element writer.
pub fn write_sized_with<'a, T, F>(buf: &mut Buffer<'a>, items: &[T], f: F) -> Result<(), Error>
where
    F: FnMut(&mut Buffer<'a>, &T) -> Result<(), Error>,
{
    write_sized_with_as::<u8, T, F>(buf, items, f)
}

pub fn write_sized_with_as<'a, C: Count, T, F>(
    buf: &mut Buffer<'a>,
    items: &[T],
    mut f: F,
) -> Result<(), Error>
where
    F: FnMut(&mut Buffer<'a>, &T) -> Result<(), Error>,
{
    let count = C::from_len(items.len()).ok_or(Error::Overflow)?;
    count.encode(buf)?;
    for item in items {
        f(buf, item)?;
    }
    Ok(())
}

/// Unpacks a length-prefixed array with a `u8` count into the arena.
pub fn read_sized<'a, T: Decode<'a>>(buf: &mut Buffer<'a>) -> Result<&'a [T], Error> {
    read_sized_as::<u8, T>(buf)
}

pub fn read_sized_as<'a, C: Count, T: Decode<'a>>(buf: &mut Buffer<'a>) -> Result<&'a [T], Error> {
    read_sized_with_as::<C, T, _>(buf, T::decode)
}

/// Like [`read_sized`], with a caller-supplied element reader.
pub fn read_sized_with<'a, T, F>(buf: &mut Buffer<'a>, f: F) -> Result<&'a [T], Error>
where
    F: FnMut(&mut Buffer<'a>) -> Result<T, Error>,
{
    read_sized_with_as::<u8, T, F>(buf, f)
}

pub fn read_sized_with_as<'a, C: Count, T, F>(
    buf: &mut Buffer<'a>,
    mut f: F,
) -> Result<&'a [T], Error>
where
    F: FnMut(&mut Buffer<'a>) -> Result<T, Error>,
{
    let count = C::decode(buf)?.to_len();
    let slots: &mut [MaybeUninit<T>] = buf
        .arena_mut()
        .alloc_uninit::<T>(count)
        .ok_or(Error::ArenaExhausted)?;
    for slot in slots.iter_mut() {
        *slot = MaybeUninit::new(f(buf)?);
    }
    // every slot was just initialized
    Ok(unsafe { core::slice::from_raw_parts(slots.as_ptr() as *const T, count) })
}

/// Packs a length-prefixed byte blob with a `u8` count.
pub fn write_bytes(buf: &mut Buffer<'_>, data: &[u8]) -> Result<(), Error> {
    write_bytes_as::<u8>(buf, data)
}

pub fn write_bytes_as<C: Count>(buf: &mut Buffer<'_>, data: &[u8]) -> Result<(), Error> {
    let count = C::from_len(data.len()).ok_or(Error::Overflow)?;
    count.encode(buf)?;
    buf.write(data)
}

/// Unpacks a length-prefixed byte blob into the arena.
pub fn read_bytes<'a>(buf: &mut Buffer<'a>) -> Result<&'a [u8], Error> {
    read_bytes_as::<u8>(buf)
}

pub fn read_bytes_as<'a, C: Count>(buf: &mut Buffer<'a>) -> Result<&'a [u8], Error> {
    let count = C::decode(buf)?.to_len();
    let chunk = buf
        .arena_mut()
        .alloc(count)
        .ok_or(Error::ArenaExhausted)?;
    buf.read_into(&mut chunk[..])?;
    Ok(chunk)
}

/// Packs a null-terminated string: the bytes up to the first null (or all of
/// `s` if it has none), then a `0x00` terminator.
pub fn write_cstr(buf: &mut Buffer<'_>, s: &[u8]) -> Result<(), Error> {
    let end = s.iter().position(|&b| b == 0).unwrap_or(s.len());
    buf.write(&s[..end])?;
    buf.write(&[0])
}

/// Unpacks a null-terminated string into the arena, without the terminator.
pub fn read_cstr<'a>(buf: &mut Buffer<'a>) -> Result<&'a [u8], Error> {
    buf.read_cstr()
}

/// Fixed-capacity string packed as exactly `N` bytes, null-padded.
///
/// Contents shorter than `N` are padded with `0x00`; longer contents are
/// truncated. The wire form carries all `N` bytes, embedded nulls included.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedStr<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedStr<N> {
    pub fn new(s: &str) -> Self {
        let mut raw = [0u8; N];
        let len = s.len().min(N);
        raw[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self(raw)
    }

    /// The string up to the first null padding byte.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        core::str::from_utf8(&self.0[..end])
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

#[cfg(feature = "std")]
impl<const N: usize> core::fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.as_str() {
            Ok(s) => write!(f, "FixedStr({:?})", s),
            Err(_) => write!(f, "FixedStr({:02x?})", &self.0[..]),
        }
    }
}

impl<const N: usize> Encode for FixedStr<N> {
    fn encode(&self, buf: &mut Buffer<'_>) -> Result<(), Error> {
        buf.write(&self.0)
    }
}

impl<'a, const N: usize> Decode<'a> for FixedStr<N> {
    fn decode(buf: &mut Buffer<'a>) -> Result<Self, Error> {
        let mut raw = [0u8; N];
        buf.read_into(&mut raw)?;
        Ok(Self(raw))
    }
}
