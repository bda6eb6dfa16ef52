// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Encoder, Error, Result};

/// The largest packet, including its 2 byte length header, in either direction.
pub const PACKET_MAX: usize = 1024;

const HEADER_LEN: usize = 2;

/// Identifies the kind of an outbound packet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum FrameTag {
    /// The reply to a command.
    Response = b'r',
    /// An unsolicited event.
    Notification = b'n',
}

impl FrameTag {
    /// An encoder primed with the tag and the term version byte.
    pub fn encoder(self) -> Encoder {
        let mut e = Encoder::with_prefix(&[self as u8]);
        e.version();
        e
    }
}

/// Prefix a payload with its length.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>> {
    let len = payload.len() + HEADER_LEN;
    if len > PACKET_MAX {
        return Err(Error::PacketTooLong(len));
    }
    let mut p = Vec::with_capacity(len);
    p.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    p.extend_from_slice(payload);
    Ok(p)
}

/// Reassembles packets from a byte stream.
///
/// Bytes are pushed as they arrive, in whatever chunks the stream provides,
/// and complete packet payloads are popped in order.
#[derive(Debug, Default)]
pub struct PacketReader {
    buf: Vec<u8>,
}

impl PacketReader {
    /// A reader with nothing buffered.
    pub fn new() -> PacketReader {
        PacketReader::default()
    }

    /// Append bytes received from the stream.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// The number of buffered bytes not yet returned as a packet.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Pop the payload of the next complete packet, if any.
    ///
    /// An oversized packet is an error as the stream cannot be resynchronised.
    pub fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let len = u16::from_be_bytes([self.buf[0], self.buf[1]]) as usize;
        if len + HEADER_LEN > PACKET_MAX {
            return Err(Error::PacketTooLong(len + HEADER_LEN));
        }
        if self.buf.len() < len + HEADER_LEN {
            return Ok(None);
        }
        let payload = self.buf[HEADER_LEN..HEADER_LEN + len].to_vec();
        self.buf.drain(..HEADER_LEN + len);
        Ok(Some(payload))
    }
}
