// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{tag, VERSION_MAGIC};

/// Encodes terms into an owned buffer.
///
/// The encoder is infallible - it is up to the caller to emit a well formed
/// term, e.g. to follow a tuple header with the matching number of elements.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// An empty encoder.
    pub fn new() -> Encoder {
        Encoder::default()
    }

    /// Start an encoder with a prefix already in the buffer, such as a frame tag.
    pub fn with_prefix(prefix: &[u8]) -> Encoder {
        Encoder {
            buf: prefix.to_vec(),
        }
    }

    /// Append the version byte.
    pub fn version(&mut self) -> &mut Self {
        self.buf.push(VERSION_MAGIC);
        self
    }

    /// Append a tuple header, small or large depending on the arity.
    pub fn tuple_header(&mut self, arity: usize) -> &mut Self {
        match u8::try_from(arity) {
            Ok(a) => self.buf.extend_from_slice(&[tag::SMALL_TUPLE, a]),
            Err(_) => {
                self.buf.push(tag::LARGE_TUPLE);
                self.buf.extend_from_slice(&(arity as u32).to_be_bytes());
            }
        }
        self
    }

    /// Append an atom using the UTF-8 encodings.
    pub fn atom(&mut self, atom: &str) -> &mut Self {
        let b = atom.as_bytes();
        match u8::try_from(b.len()) {
            Ok(len) => self.buf.extend_from_slice(&[tag::SMALL_ATOM_UTF8, len]),
            Err(_) => {
                self.buf.push(tag::ATOM_UTF8);
                self.buf.extend_from_slice(&(b.len() as u16).to_be_bytes());
            }
        }
        self.buf.extend_from_slice(b);
        self
    }

    /// Append an integer in the smallest encoding that holds it.
    pub fn long(&mut self, value: i64) -> &mut Self {
        if let Ok(v) = u8::try_from(value) {
            self.buf.extend_from_slice(&[tag::SMALL_INTEGER, v]);
        } else if let Ok(v) = i32::try_from(value) {
            self.buf.push(tag::INTEGER);
            self.buf.extend_from_slice(&v.to_be_bytes());
        } else {
            let mag = value.unsigned_abs().to_le_bytes();
            let n = mag.iter().rposition(|&d| d != 0).map_or(0, |i| i + 1);
            self.buf
                .extend_from_slice(&[tag::SMALL_BIG, n as u8, (value < 0) as u8]);
            self.buf.extend_from_slice(&mag[..n]);
        }
        self
    }

    /// Append an empty list.
    pub fn nil(&mut self) -> &mut Self {
        self.buf.push(tag::NIL);
        self
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the encoder, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Decoder;

    #[test]
    fn error_tuple() {
        let mut e = Encoder::new();
        e.version()
            .tuple_header(2)
            .atom("error")
            .atom("gpio_read_failed");
        let b = e.as_bytes();
        assert_eq!(&b[..5], &[131, 104, 2, 119, 5]);
        assert_eq!(&b[5..10], b"error");

        let mut d = Decoder::new(b);
        d.version().unwrap();
        assert_eq!(d.tuple_header(), Ok(2));
        assert_eq!(d.atom().unwrap(), "error");
        assert_eq!(d.atom().unwrap(), "gpio_read_failed");
        assert_eq!(d.position(), b.len());
    }

    #[test]
    fn prefix() {
        let mut e = Encoder::with_prefix(b"r");
        e.version().atom("ok");
        assert_eq!(e.into_bytes(), vec![b'r', 131, 119, 2, b'o', b'k']);
    }

    #[test]
    fn long() {
        let mut e = Encoder::new();
        e.long(1);
        assert_eq!(e.as_bytes(), &[97, 1]);

        let mut e = Encoder::new();
        e.long(-2);
        assert_eq!(e.as_bytes(), &[98, 0xff, 0xff, 0xff, 0xfe]);

        let mut e = Encoder::new();
        e.long(-(1 << 40));
        assert_eq!(e.as_bytes(), &[110, 6, 1, 0, 0, 0, 0, 0, 1]);
        let mut d = Decoder::new(e.as_bytes());
        assert_eq!(d.long(), Ok(-(1 << 40)));

        let mut e = Encoder::new();
        e.long(i64::MIN);
        let mut d = Decoder::new(e.as_bytes());
        assert_eq!(d.long(), Ok(i64::MIN));
    }

    #[test]
    fn large_tuple() {
        let mut e = Encoder::new();
        e.tuple_header(300);
        assert_eq!(e.as_bytes(), &[105, 0, 0, 1, 44]);
    }
}
