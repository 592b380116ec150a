//! Frame checksums
//!
//! A [`Checksum`] accumulates payload bytes and serializes its final value
//! little-endian at the end of a frame, in front of the COBS pass. The
//! presets cover the common embedded polynomial choices; [`CrcNoop`]
//! contributes zero bytes for links that already guarantee integrity.

use crc::{Crc, Digest, CRC_16_ARC, CRC_32_ISO_HDLC, CRC_8_SMBUS};

/// Incremental frame checksum.
pub trait Checksum {
    /// Number of bytes the checksum occupies on the wire, at most 8.
    const SIZE: usize;

    fn new() -> Self;

    fn update(&mut self, bytes: &[u8]);

    /// Writes the final value little-endian into `out[..SIZE]`.
    fn finish(self, out: &mut [u8]);
}

/// No checksum; frames carry payload bytes only.
pub struct CrcNoop;

impl Checksum for CrcNoop {
    const SIZE: usize = 0;

    fn new() -> Self {
        CrcNoop
    }

    fn update(&mut self, _bytes: &[u8]) {}

    fn finish(self, _out: &mut [u8]) {}
}

static CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);
static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);
static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

macro_rules! impl_crc {
    ($name:ident, $width:ty, $table:ident, $size:expr) => {
        pub struct $name {
            digest: Digest<'static, $width>,
        }

        impl Checksum for $name {
            const SIZE: usize = $size;

            fn new() -> Self {
                Self {
                    digest: $table.digest(),
                }
            }

            fn update(&mut self, bytes: &[u8]) {
                self.digest.update(bytes);
            }

            fn finish(self, out: &mut [u8]) {
                out[..$size].copy_from_slice(&self.digest.finalize().to_le_bytes());
            }
        }
    };
}

impl_crc!(Crc8, u8, CRC8, 1);
impl_crc!(Crc16, u16, CRC16, 2);
impl_crc!(Crc32, u32, CRC32, 4);
