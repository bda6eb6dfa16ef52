// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{tag, Error, Result, ATOM_LEN_MAX, VERSION_MAGIC};

/// Decodes terms from a borrowed buffer.
///
/// Each decode call consumes exactly one term header or scalar and advances
/// the cursor.  A failed call leaves the cursor where it was.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// A decoder positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Decoder<'a> {
        Decoder { buf, pos: 0 }
    }

    /// The offset of the cursor into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume the version byte.
    pub fn version(&mut self) -> Result<()> {
        match self.peek()? {
            VERSION_MAGIC => {
                self.pos += 1;
                Ok(())
            }
            v => Err(Error::Version(v)),
        }
    }

    /// Consume a tuple header and return the arity of the tuple.
    pub fn tuple_header(&mut self) -> Result<usize> {
        let start = self.pos;
        let res = match self.u8()? {
            tag::SMALL_TUPLE => self.u8().map(usize::from),
            tag::LARGE_TUPLE => self.u32().map(|n| n as usize),
            found => Err(Error::UnexpectedTag {
                expected: "tuple",
                found,
                pos: start,
            }),
        };
        if res.is_err() {
            self.pos = start;
        }
        res
    }

    /// Consume an atom.
    ///
    /// Both the legacy latin-1 and the UTF-8 encodings are accepted.
    pub fn atom(&mut self) -> Result<String> {
        let start = self.pos;
        let res = self.atom_inner(start);
        if res.is_err() {
            self.pos = start;
        }
        res
    }

    fn atom_inner(&mut self, start: usize) -> Result<String> {
        let (len, utf8) = match self.u8()? {
            tag::ATOM => (self.u16()? as usize, false),
            tag::SMALL_ATOM => (self.u8()? as usize, false),
            tag::ATOM_UTF8 => (self.u16()? as usize, true),
            tag::SMALL_ATOM_UTF8 => (self.u8()? as usize, true),
            found => {
                return Err(Error::UnexpectedTag {
                    expected: "atom",
                    found,
                    pos: start,
                })
            }
        };
        let bytes = self.bytes(len)?;
        let atom = if utf8 {
            std::str::from_utf8(bytes)
                .map_err(|_| Error::InvalidAtom(start))?
                .to_owned()
        } else {
            bytes.iter().map(|&b| b as char).collect()
        };
        if atom.chars().count() > ATOM_LEN_MAX {
            return Err(Error::InvalidAtom(start));
        }
        Ok(atom)
    }

    /// Consume an integer.
    pub fn long(&mut self) -> Result<i64> {
        let start = self.pos;
        let res = self.long_inner(start);
        if res.is_err() {
            self.pos = start;
        }
        res
    }

    fn long_inner(&mut self, start: usize) -> Result<i64> {
        match self.u8()? {
            tag::SMALL_INTEGER => Ok(self.u8()? as i64),
            tag::INTEGER => Ok(self.u32()? as i32 as i64),
            tag::SMALL_BIG => {
                let n = self.u8()? as usize;
                let sign = self.u8()?;
                let digits = self.bytes(n)?;
                // little endian base 256 magnitude
                let mut mag: u64 = 0;
                for (i, &d) in digits.iter().enumerate() {
                    if d == 0 {
                        continue;
                    }
                    if i >= 8 {
                        return Err(Error::IntegerRange(start));
                    }
                    mag |= (d as u64) << (8 * i);
                }
                if sign == 0 {
                    i64::try_from(mag).map_err(|_| Error::IntegerRange(start))
                } else if mag <= i64::MAX as u64 + 1 {
                    Ok((mag as i64).wrapping_neg())
                } else {
                    Err(Error::IntegerRange(start))
                }
            }
            found => Err(Error::UnexpectedTag {
                expected: "integer",
                found,
                pos: start,
            }),
        }
    }

    /// Consume an empty list.
    pub fn nil(&mut self) -> Result<()> {
        match self.peek()? {
            tag::NIL => {
                self.pos += 1;
                Ok(())
            }
            found => Err(Error::UnexpectedTag {
                expected: "nil",
                found,
                pos: self.pos,
            }),
        }
    }

    fn peek(&self) -> Result<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(Error::Truncated(self.pos))
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(Error::Truncated(self.pos))?;
        let b = self
            .buf
            .get(self.pos..end)
            .ok_or(Error::Truncated(self.buf.len()))?;
        self.pos = end;
        Ok(b)
    }

    fn u8(&mut self) -> Result<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Ok(b)
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
