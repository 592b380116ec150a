//! Typed message port over the framing layer
//!
//! [`Protocol`] drives a [`Framer`] through two caller-supplied callbacks -
//! a non-blocking byte source and a frame sink - and prefixes every frame
//! payload with a one-byte message tag. Each message type declares its tag
//! through the [`Message`] trait; the packed field layout comes from the
//! [`codec`](crate::codec) traits.
//!
//! Receiving is split in two steps so the payload can stay in the framer's
//! buffer: [`Protocol::poll`] pumps bytes until a frame completes and
//! reports its tag, then [`Protocol::decode`] unpacks the retained frame
//! into the expected message type.

use crate::buffer::{self, Buffer};
use crate::codec::{Decode, Encode};
use crate::crc::Checksum;
use crate::frame::{self, Framer, ReadStatus};

/// A message type with a fixed wire tag.
pub trait Message {
    const ID: u8;
}

#[derive(PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Error {
    /// Framing layer rejected incoming or outgoing bytes
    Frame(frame::Error),
    /// Message body failed to pack or unpack
    Codec(buffer::Error),
    /// Retained frame does not carry the requested message type
    UnexpectedMessage,
    /// Transport wrote fewer bytes than the frame length
    TransportWrite,
}

impl From<frame::Error> for Error {
    fn from(e: frame::Error) -> Error {
        Error::Frame(e)
    }
}

impl From<buffer::Error> for Error {
    fn from(e: buffer::Error) -> Error {
        Error::Codec(e)
    }
}

/// Outcome of one [`Protocol::poll`] step.
#[derive(PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Poll {
    /// No complete frame yet
    Pending,
    /// A frame carrying this message tag arrived and is retained for
    /// [`Protocol::decode`]
    Received(u8),
}

/// Typed message port.
///
/// `R` supplies at most one received byte per call, `W` writes a complete
/// frame and returns how many bytes it accepted. `PAYLOAD` bounds the packed
/// message size including the tag byte; `BUF` follows
/// [`frame::frame_buffer_len`].
pub struct Protocol<R, W, C, const PAYLOAD: usize, const BUF: usize>
where
    R: FnMut() -> Option<u8>,
    W: FnMut(&[u8]) -> usize,
    C: Checksum,
{
    read_fn: R,
    write_fn: W,
    framer: Framer<C, PAYLOAD, BUF>,
    received_id: Option<u8>,
    received_len: usize,
}

impl<R, W, C, const PAYLOAD: usize, const BUF: usize> Protocol<R, W, C, PAYLOAD, BUF>
where
    R: FnMut() -> Option<u8>,
    W: FnMut(&[u8]) -> usize,
    C: Checksum,
{
    pub fn new(read_fn: R, write_fn: W) -> Self {
        Self {
            read_fn,
            write_fn,
            framer: Framer::new(),
            received_id: None,
            received_len: 0,
        }
    }

    /// Pumps one byte from the byte source through the frame decoder.
    ///
    /// Returns [`Poll::Received`] when a tagged frame completes; the frame
    /// stays retained only until the next byte is polled, so it must be
    /// decoded before polling continues. Empty frames are
    /// ignored. Framing errors are surfaced to the caller but leave the
    /// decoder ready for the next frame.
    pub fn poll(&mut self) -> Result<Poll, Error> {
        let byte = match (self.read_fn)() {
            Some(byte) => byte,
            None => return Ok(Poll::Pending),
        };

        match self.framer.read_frame_byte(byte)? {
            ReadStatus::NotReady => Ok(Poll::Pending),
            ReadStatus::Decoded(payload) => {
                if payload.is_empty() {
                    return Ok(Poll::Pending);
                }
                let id = payload[0];
                let len = payload.len() - 1;
                self.received_id = Some(id);
                self.received_len = len;
                Ok(Poll::Received(id))
            }
        }
    }

    /// Packs `msg` behind its tag, frames it and hands the frame to the
    /// write callback.
    pub fn send<M: Message + Encode>(&mut self, msg: &M) -> Result<(), Error> {
        let staged = self.framer.write_buffer();
        staged[0] = M::ID;
        let mut buf = Buffer::new(&mut staged[1..]);
        msg.encode(&mut buf)?;
        let frame_len = buf.pos() + 1;

        let frame = self.framer.encode_frame(frame_len)?;
        if (self.write_fn)(frame) != frame.len() {
            return Err(Error::TransportWrite);
        }
        Ok(())
    }

    /// Unpacks the retained frame as `M`, materializing variable-length
    /// fields in `arena`.
    pub fn decode<'s, M: Message + Decode<'s>>(
        &'s mut self,
        arena: &'s mut [u8],
    ) -> Result<M, Error> {
        if self.received_id != Some(M::ID) {
            return Err(Error::UnexpectedMessage);
        }
        let len = self.received_len;
        let read_buf = self.framer.read_buf_mut();
        let mut buf = Buffer::with_arena(&mut read_buf[1..1 + len], arena);
        Ok(M::decode(&mut buf)?)
    }
}
