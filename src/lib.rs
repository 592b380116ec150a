//! Compact binary serialization and reliable framing for byte-oriented links
//! (UART, RS-485, radio serial bridges).
//!
//! The crate is split in two layers which can be used independently:
//!
//! * a serialization layer - [`buffer::Buffer`] plus the [`codec`] traits and
//!   helpers pack fixed-width scalars, arrays, strings and length-prefixed
//!   containers into caller-owned byte buffers, without any heap allocation
//! * a framing layer - [`frame::Framer`] delimits packed payloads on the wire
//!   with COBS encoding and a `0x00` frame terminator, optionally protected by
//!   one of the [`crc`] checksums
//!
//! [`protocol::Protocol`] ties both layers together into a minimal typed
//! message port driven by non-blocking byte I/O callbacks.

#![cfg_attr(any(not(feature = "std"), not(test)), no_std)]

pub mod buffer;
pub mod cobs;
pub mod codec;
pub mod crc;
pub mod frame;
pub mod protocol;

// include defmt::Format implementations
// we don't want them derive()d in the modules unless defmt-impl feature is set
#[cfg(feature = "defmt-impl")]
pub mod defmt;

// reexport heapless
pub use heapless;
