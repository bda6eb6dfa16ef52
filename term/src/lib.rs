// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A thin codec for the subset of the external term format spoken between a
//! port process and its host.
//!
//! Only the terms a GPIO port needs are supported - tuples, atoms, integers
//! and nil - together with the 2 byte length-prefixed packet framing used on
//! the port's stdin and stdout.

/// Cursor style decoding of a term buffer.
pub mod decode;

/// Appending encoder for a term buffer.
pub mod encode;

/// Length-prefixed packet framing.
pub mod packet;

pub use decode::Decoder;
pub use encode::Encoder;
pub use packet::{FrameTag, PacketReader, PACKET_MAX};

/// The version byte that prefixes every encoded term.
pub const VERSION_MAGIC: u8 = 131;

/// The longest atom, in characters, accepted by the decoder.
pub const ATOM_LEN_MAX: usize = 255;

pub(crate) mod tag {
    pub const SMALL_INTEGER: u8 = 97;
    pub const INTEGER: u8 = 98;
    pub const ATOM: u8 = 100;
    pub const SMALL_TUPLE: u8 = 104;
    pub const LARGE_TUPLE: u8 = 105;
    pub const NIL: u8 = 106;
    pub const SMALL_BIG: u8 = 110;
    pub const SMALL_ATOM: u8 = 115;
    pub const ATOM_UTF8: u8 = 118;
    pub const SMALL_ATOM_UTF8: u8 = 119;
}

/// The result returned by [`gpioport_term`] functions.
///
/// [`gpioport_term`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`gpioport_term`] functions.
///
/// [`gpioport_term`]: crate
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    /// The buffer ended in the middle of a term.
    #[error("term truncated at byte {0}")]
    Truncated(usize),

    /// The buffer does not start with the expected version byte.
    #[error("unsupported term version {0}")]
    Version(u8),

    /// The term at the cursor is not of the expected kind.
    #[error("expected {expected} at byte {pos}, found tag {found}")]
    UnexpectedTag {
        expected: &'static str,
        found: u8,
        pos: usize,
    },

    /// An atom is too long, or is not valid UTF-8.
    #[error("invalid atom at byte {0}")]
    InvalidAtom(usize),

    /// An integer does not fit in an i64.
    #[error("integer at byte {0} is out of range")]
    IntegerRange(usize),

    /// A packet exceeds [`PACKET_MAX`].
    #[error("packet of {0} bytes exceeds the packet size limit")]
    PacketTooLong(usize),
}
