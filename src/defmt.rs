use defmt::Formatter;

use crate::buffer::Error as BufferError;
use crate::cobs::Error as CobsError;
use crate::frame::Error as FrameError;
use crate::protocol::{Error as ProtocolError, Poll};

impl defmt::Format for BufferError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            BufferError::Overflow => defmt::write!(fmt, "Error::Overflow"),
            BufferError::Underflow => defmt::write!(fmt, "Error::Underflow"),
            BufferError::OutOfRange => defmt::write!(fmt, "Error::OutOfRange"),
            BufferError::ArenaExhausted => defmt::write!(fmt, "Error::ArenaExhausted"),
        }
    }
}

impl defmt::Format for CobsError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            CobsError::OutputBufferOverflow => defmt::write!(fmt, "Error::OutputBufferOverflow"),
            CobsError::ZeroByteInInput => defmt::write!(fmt, "Error::ZeroByteInInput"),
            CobsError::InputTooShort => defmt::write!(fmt, "Error::InputTooShort"),
        }
    }
}

impl defmt::Format for FrameError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            FrameError::DecodeFailure => defmt::write!(fmt, "Error::DecodeFailure"),
            FrameError::CrcFailure => defmt::write!(fmt, "Error::CrcFailure"),
            FrameError::BufferOverrun => defmt::write!(fmt, "Error::BufferOverrun"),
            FrameError::EncodeOverflow => defmt::write!(fmt, "Error::EncodeOverflow"),
        }
    }
}

impl defmt::Format for ProtocolError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            ProtocolError::Frame(e) => defmt::write!(fmt, "Error::Frame({=?})", e),
            ProtocolError::Codec(e) => defmt::write!(fmt, "Error::Codec({=?})", e),
            ProtocolError::UnexpectedMessage => defmt::write!(fmt, "Error::UnexpectedMessage"),
            ProtocolError::TransportWrite => defmt::write!(fmt, "Error::TransportWrite"),
        }
    }
}

impl defmt::Format for Poll {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            Poll::Pending => defmt::write!(fmt, "Poll::Pending"),
            Poll::Received(id) => defmt::write!(fmt, "Poll::Received({=u8})", *id),
        }
    }
}
