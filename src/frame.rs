//! Incremental COBS frame transport
//!
//! [`Framer`] owns one receive and one transmit buffer and turns a raw byte
//! stream into delimited, checksum-verified payloads. The receive path is
//! driven one byte at a time so it can sit directly in a serial interrupt
//! handler or a poll loop; the transmit path stages the payload inside the
//! transmit buffer and encodes it in place, so a frame is built without any
//! scratch memory.
//!
//! Wire layout of one frame:
//!
//! ```text
//! COBS( payload .. checksum LE ) 0x00
//! ```

use crate::cobs;
use crate::crc::Checksum;

/// Length-code bytes COBS adds for a `len`-byte frame body.
pub const fn cobs_overhead(len: usize) -> usize {
    cobs::cobs_overhead(len)
}

/// Internal buffer size needed by a [`Framer`] with a `payload`-byte maximum
/// payload and a `crc_size`-byte checksum.
///
/// Intended for the `BUF` const parameter:
///
/// ```ignore
/// let framer = Framer::<Crc8, 256, { frame_buffer_len(256, 1) }>::new();
/// ```
pub const fn frame_buffer_len(payload: usize, crc_size: usize) -> usize {
    payload + crc_size + cobs_overhead(payload + crc_size) + 1
}

#[derive(PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Error {
    /// Frame terminator arrived but the received bytes do not form a valid
    /// COBS frame
    DecodeFailure,
    /// Frame decoded but its checksum does not match the payload
    CrcFailure,
    /// More bytes arrived than the receive buffer can hold; the partial
    /// frame was dropped
    BufferOverrun,
    /// Encoded frame does not fit the transmit buffer
    EncodeOverflow,
}

/// Outcome of feeding one received byte.
#[cfg_attr(feature = "std", derive(Debug))]
pub enum ReadStatus<'a> {
    /// Frame still in progress
    NotReady,
    /// A full frame arrived and verified; the payload with the checksum
    /// stripped
    Decoded(&'a [u8]),
}

/// Frame encoder/decoder over fixed internal buffers.
///
/// `PAYLOAD` is the largest payload one frame can carry, `C` the checksum
/// protecting it. `BUF` must equal [`frame_buffer_len`]`(PAYLOAD, C::SIZE)`;
/// it is a separate parameter only because stable Rust cannot derive it from
/// the other two.
pub struct Framer<C: Checksum, const PAYLOAD: usize, const BUF: usize> {
    read_buf: [u8; BUF],
    read_len: usize,
    write_buf: [u8; BUF],
    _crc: core::marker::PhantomData<C>,
}

impl<C: Checksum, const PAYLOAD: usize, const BUF: usize> Framer<C, PAYLOAD, BUF> {
    /// Offset of the staged payload inside the transmit buffer; leaves room
    /// for the in-place COBS pass.
    const DATA_OFFSET: usize = cobs::cobs_overhead(PAYLOAD + C::SIZE);

    pub fn new() -> Self {
        assert!(BUF == frame_buffer_len(PAYLOAD, C::SIZE));
        // the checksum scratch buffers hold 8 bytes
        assert!(C::SIZE <= 8);
        Self {
            read_buf: [0; BUF],
            read_len: 0,
            write_buf: [0; BUF],
            _crc: core::marker::PhantomData,
        }
    }

    /// Staging area for a payload to be framed with [`encode_frame`].
    ///
    /// [`encode_frame`]: Self::encode_frame
    pub fn write_buffer(&mut self) -> &mut [u8] {
        &mut self.write_buf[Self::DATA_OFFSET..Self::DATA_OFFSET + PAYLOAD]
    }

    /// Frames the first `len` bytes staged in [`write_buffer`], returning
    /// the wire-ready frame including the terminator.
    ///
    /// `len` must not exceed `PAYLOAD`.
    ///
    /// [`write_buffer`]: Self::write_buffer
    pub fn encode_frame(&mut self, len: usize) -> Result<&[u8], Error> {
        assert!(len <= PAYLOAD);

        if C::SIZE > 0 {
            let mut crc = C::new();
            crc.update(&self.write_buf[Self::DATA_OFFSET..Self::DATA_OFFSET + len]);
            let mut tail = [0u8; 8];
            crc.finish(&mut tail);
            self.write_buf[Self::DATA_OFFSET + len..Self::DATA_OFFSET + len + C::SIZE]
                .copy_from_slice(&tail[..C::SIZE]);
        }

        let encoded_len =
            cobs::encode_from_offset(&mut self.write_buf, Self::DATA_OFFSET, len + C::SIZE)
                .map_err(|_| Error::EncodeOverflow)?;
        self.write_buf[encoded_len] = 0;
        Ok(&self.write_buf[..encoded_len + 1])
    }

    /// Copies `data` into the staging area and frames it.
    pub fn encode_frame_from(&mut self, data: &[u8]) -> Result<&[u8], Error> {
        assert!(data.len() <= PAYLOAD);
        self.write_buffer()[..data.len()].copy_from_slice(data);
        self.encode_frame(data.len())
    }

    /// Feeds one received byte to the frame decoder.
    ///
    /// Returns [`ReadStatus::NotReady`] until a `0x00` terminator arrives,
    /// then either the decoded payload or the reason the frame was dropped.
    /// After any error the decoder is reset and ready for the next frame.
    pub fn read_frame_byte(&mut self, byte: u8) -> Result<ReadStatus<'_>, Error> {
        self.read_buf[self.read_len] = byte;
        let length = self.read_len + 1;

        if byte == 0 {
            self.read_len = 0;
            return self.decode_frame(length);
        } else if length == BUF {
            self.read_len = 0;
            return Err(Error::BufferOverrun);
        }

        self.read_len = length;
        Ok(ReadStatus::NotReady)
    }

    fn decode_frame(&mut self, length: usize) -> Result<ReadStatus<'_>, Error> {
        // a bare terminator is not a frame
        if length == 1 {
            return Err(Error::DecodeFailure);
        }
        let length = length - 1; // discard the terminator

        let decoded_len = cobs::decode_in_place(&mut self.read_buf[..length])
            .map_err(|_| Error::DecodeFailure)?;

        let payload_len = decoded_len.checked_sub(C::SIZE).ok_or(Error::DecodeFailure)?;

        if C::SIZE > 0 {
            let mut crc = C::new();
            crc.update(&self.read_buf[..payload_len]);
            let mut expected = [0u8; 8];
            crc.finish(&mut expected);
            if expected[..C::SIZE] != self.read_buf[payload_len..payload_len + C::SIZE] {
                return Err(Error::CrcFailure);
            }
        }

        Ok(ReadStatus::Decoded(&self.read_buf[..payload_len]))
    }

    pub(crate) fn read_buf_mut(&mut self) -> &mut [u8] {
        &mut self.read_buf
    }
}

impl<C: Checksum, const PAYLOAD: usize, const BUF: usize> Default for Framer<C, PAYLOAD, BUF> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::{Crc16, Crc32, Crc8, CrcNoop};

    fn hex(data: &[u8]) -> String {
        base16::encode_lower(data)
    }

    /// Feeds all bytes of `wire`, expecting NotReady for all but the last.
    fn feed_frame<'a, C: Checksum, const P: usize, const B: usize>(
        framer: &'a mut Framer<C, P, B>,
        wire: &[u8],
    ) -> Result<ReadStatus<'a>, Error> {
        let (last, rest) = wire.split_last().unwrap();
        for &byte in rest {
            assert!(matches!(
                framer.read_frame_byte(byte),
                Ok(ReadStatus::NotReady)
            ));
        }
        framer.read_frame_byte(*last)
    }

    #[test]
    fn test_encode_frame() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        let frame = framer.encode_frame_from(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        assert_eq!(hex(frame), "051122334400");
    }

    #[test]
    fn test_encode_frame_zero_length() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        let frame = framer.encode_frame_from(&[]).unwrap();
        assert_eq!(hex(frame), "0100");
    }

    #[test]
    fn test_encode_frame_one_byte() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        let frame = framer.encode_frame_from(&[0x22]).unwrap();
        assert_eq!(hex(frame), "022200");
    }

    #[test]
    fn test_decode_frame() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        match feed_frame(&mut framer, &[0x05, 0x11, 0x22, 0x33, 0x44, 0x00]) {
            Ok(ReadStatus::Decoded(payload)) => assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_zero_length() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        assert!(matches!(
            framer.read_frame_byte(0x01),
            Ok(ReadStatus::NotReady)
        ));
        match framer.read_frame_byte(0x00) {
            Ok(ReadStatus::Decoded(payload)) => assert!(payload.is_empty()),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_decoder_recovers_between_frames() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        let wire = [0x05, 0x11, 0x22, 0x33, 0x44, 0x00];
        for _ in 0..2 {
            match feed_frame(&mut framer, &wire) {
                Ok(ReadStatus::Decoded(payload)) => {
                    assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44])
                }
                other => panic!("unexpected status: {:?}", other),
            }
        }
        assert!(matches!(
            framer.read_frame_byte(0x05),
            Ok(ReadStatus::NotReady)
        ));
    }

    #[test]
    fn test_bare_terminator_is_decode_failure() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        match feed_frame(&mut framer, &[0x05, 0x11, 0x22, 0x33, 0x44, 0x00]) {
            Ok(ReadStatus::Decoded(_)) => {}
            other => panic!("unexpected status: {:?}", other),
        }
        assert!(matches!(
            framer.read_frame_byte(0x00),
            Err(Error::DecodeFailure)
        ));
    }

    #[test]
    fn test_buffer_overrun_drops_partial_frame() {
        let mut framer = Framer::<CrcNoop, 2, { frame_buffer_len(2, 0) }>::new();
        assert!(matches!(
            framer.read_frame_byte(0x05),
            Ok(ReadStatus::NotReady)
        ));
        assert!(matches!(
            framer.read_frame_byte(0x11),
            Ok(ReadStatus::NotReady)
        ));
        assert!(matches!(
            framer.read_frame_byte(0x22),
            Ok(ReadStatus::NotReady)
        ));
        assert!(matches!(
            framer.read_frame_byte(0x33),
            Err(Error::BufferOverrun)
        ));
        // the decoder is usable again right away
        match feed_frame(&mut framer, &[0x02, 0x11, 0x00]) {
            Ok(ReadStatus::Decoded(payload)) => assert_eq!(payload, &[0x11]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_frames_fail_decode() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        assert!(matches!(
            feed_frame(&mut framer, &[0x01, 0x11, 0x22, 0x33, 0x44, 0x00]),
            Err(Error::DecodeFailure)
        ));
        assert!(matches!(
            feed_frame(&mut framer, &[0x10, 0x11, 0x22, 0x33, 0x44, 0x00]),
            Err(Error::DecodeFailure)
        ));
    }

    #[test]
    fn test_roundtrip() {
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        let wire =
            heapless::Vec::<u8, 16>::from_slice(framer.encode_frame_from(&[0x11, 0x22, 0x33, 0x44]).unwrap())
                .unwrap();
        match feed_frame(&mut framer, &wire) {
            Ok(ReadStatus::Decoded(payload)) => assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_roundtrip_block_boundary_payload() {
        // payload crossing the 254-byte COBS block boundary
        const LEN: usize = 259;
        let mut payload = [0xeeu8; LEN];
        payload[0] = 0x00;
        payload[255] = 0x00;
        payload[256] = 0xaa;
        payload[257] = 0xbb;

        let mut framer = Framer::<CrcNoop, LEN, { frame_buffer_len(LEN, 0) }>::new();
        let wire =
            heapless::Vec::<u8, 264>::from_slice(framer.encode_frame_from(&payload).unwrap())
                .unwrap();
        assert_eq!(wire.len(), 262);
        assert_eq!(wire[0], 0x01);
        assert_eq!(wire[1], 0xff);

        match feed_frame(&mut framer, &wire) {
            Ok(ReadStatus::Decoded(decoded)) => assert_eq!(decoded, &payload[..]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_encode_frame_crc8() {
        let mut framer = Framer::<Crc8, 256, { frame_buffer_len(256, 1) }>::new();
        let frame = framer.encode_frame_from(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        assert_eq!(hex(frame), "0611223344f900");
    }

    #[test]
    fn test_encode_frame_crc16() {
        let mut framer = Framer::<Crc16, 256, { frame_buffer_len(256, 2) }>::new();
        let frame = framer.encode_frame_from(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        assert_eq!(hex(frame), "0711223344b1f500");
    }

    #[test]
    fn test_encode_frame_crc32() {
        let mut framer = Framer::<Crc32, 256, { frame_buffer_len(256, 4) }>::new();
        let frame = framer.encode_frame_from(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        assert_eq!(hex(frame), "0911223344d19df27700");
    }

    #[test]
    fn test_decode_frame_crc8() {
        let mut framer = Framer::<Crc8, 256, { frame_buffer_len(256, 1) }>::new();
        match feed_frame(&mut framer, &[0x06, 0x11, 0x22, 0x33, 0x44, 0xf9, 0x00]) {
            Ok(ReadStatus::Decoded(payload)) => assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_crc8_corrupted() {
        let mut framer = Framer::<Crc8, 256, { frame_buffer_len(256, 1) }>::new();
        assert!(matches!(
            feed_frame(&mut framer, &[0x06, 0xff, 0x22, 0x33, 0x44, 0xf9, 0x00]),
            Err(Error::CrcFailure)
        ));
    }

    #[test]
    fn test_decode_frame_noop_corruption_undetected() {
        // without a checksum a corrupted payload still decodes
        let mut framer = Framer::<CrcNoop, 256, { frame_buffer_len(256, 0) }>::new();
        match feed_frame(&mut framer, &[0x05, 0xff, 0x22, 0x33, 0x44, 0x00]) {
            Ok(ReadStatus::Decoded(payload)) => assert_eq!(payload, &[0xff, 0x22, 0x33, 0x44]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_crc16() {
        let mut framer = Framer::<Crc16, 256, { frame_buffer_len(256, 2) }>::new();
        match feed_frame(&mut framer, &[0x07, 0x11, 0x22, 0x33, 0x44, 0xb1, 0xf5, 0x00]) {
            Ok(ReadStatus::Decoded(payload)) => assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_crc16_corrupted() {
        let mut framer = Framer::<Crc16, 256, { frame_buffer_len(256, 2) }>::new();
        assert!(matches!(
            feed_frame(&mut framer, &[0x07, 0xff, 0x22, 0x33, 0x44, 0xb1, 0xf5, 0x00]),
            Err(Error::CrcFailure)
        ));
    }

    #[test]
    fn test_decode_frame_crc32() {
        let mut framer = Framer::<Crc32, 256, { frame_buffer_len(256, 4) }>::new();
        let wire = [0x09, 0x11, 0x22, 0x33, 0x44, 0xd1, 0x9d, 0xf2, 0x77, 0x00];
        match feed_frame(&mut framer, &wire) {
            Ok(ReadStatus::Decoded(payload)) => assert_eq!(payload, &[0x11, 0x22, 0x33, 0x44]),
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_decode_frame_crc32_corrupted() {
        let mut framer = Framer::<Crc32, 256, { frame_buffer_len(256, 4) }>::new();
        let wire = [0x09, 0xff, 0x22, 0x33, 0x44, 0xd1, 0x9d, 0xf2, 0x77, 0x00];
        assert!(matches!(feed_frame(&mut framer, &wire), Err(Error::CrcFailure)));
    }

    #[test]
    fn test_frame_shorter_than_checksum_fails() {
        // decodes to a single byte, less than the 4-byte checksum
        let mut framer = Framer::<Crc32, 256, { frame_buffer_len(256, 4) }>::new();
        assert!(matches!(
            feed_frame(&mut framer, &[0x02, 0x11, 0x00]),
            Err(Error::DecodeFailure)
        ));
    }

    #[test]
    fn test_frame_buffer_len() {
        assert_eq!(frame_buffer_len(2, 0), 4);
        assert_eq!(frame_buffer_len(256, 0), 259);
        assert_eq!(frame_buffer_len(256, 1), 260);
        assert_eq!(frame_buffer_len(256, 4), 263);
        assert_eq!(frame_buffer_len(259, 0), 262);
    }
}
