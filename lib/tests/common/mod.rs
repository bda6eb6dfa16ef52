// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(dead_code)]

use gpioport::RegisterWindow;
use gpioport_term::{packet, Decoder, Encoder, PacketReader};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// The read end of a non-blocking pipe fed by the test.
#[derive(Clone, Default)]
pub struct Pipe {
    data: Rc<RefCell<VecDeque<u8>>>,
    closed: Rc<Cell<bool>>,
}

impl Pipe {
    pub fn send(&self, cmd: &[u8]) {
        let p = packet::encode(cmd).unwrap();
        self.data.borrow_mut().extend(p);
    }

    /// Send bytes without framing.
    pub fn send_raw(&self, bytes: &[u8]) {
        self.data.borrow_mut().extend(bytes);
    }

    pub fn close(&self) {
        self.closed.set(true);
    }
}

impl Read for Pipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut data = self.data.borrow_mut();
        if data.is_empty() {
            if self.closed.get() {
                return Ok(0);
            }
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let n = buf.len().min(data.len());
        for (dst, src) in buf.iter_mut().zip(data.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

/// Collects the packets written by the port.
#[derive(Clone, Default)]
pub struct Sink(Rc<RefCell<Vec<u8>>>);

impl Sink {
    /// Take the packets written so far, rendered as text.
    pub fn take(&self) -> Vec<String> {
        let mut r = PacketReader::new();
        r.push(&self.0.borrow_mut().split_off(0));
        let mut out = Vec::new();
        while let Some(p) = r.next_packet().unwrap() {
            out.push(render(&p));
        }
        assert_eq!(r.pending(), 0, "partial packet written");
        out
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Render a tagged payload, e.g. "r {error,gpio_write_failed}" or "n {gpio_interrupt,rising}".
fn render(p: &[u8]) -> String {
    let tag = p[0] as char;
    let mut d = Decoder::new(&p[1..]);
    d.version().unwrap();
    format!("{tag} {}", render_term(&mut d))
}

fn render_term(d: &mut Decoder) -> String {
    if let Ok(v) = d.long() {
        return v.to_string();
    }
    if let Ok(a) = d.atom() {
        return a;
    }
    let arity = d.tuple_header().unwrap();
    let elems: Vec<String> = (0..arity).map(|_| render_term(d)).collect();
    format!("{{{}}}", elems.join(","))
}

/// Build a {cmd, arg} command.
pub fn command(cmd: &str, arg: impl FnOnce(&mut Encoder)) -> Vec<u8> {
    let mut e = Encoder::new();
    e.version().tuple_header(2).atom(cmd);
    arg(&mut e);
    e.into_bytes()
}

/// Records register writes in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub writes: Vec<(usize, u32)>,
}

impl RegisterWindow for Recorder {
    fn write(&mut self, idx: usize, value: u32) {
        self.writes.push((idx, value));
    }
}

/// A fake GPIO sysfs tree.
pub struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    /// An empty tree with only the export file.
    pub fn new() -> FakeSysfs {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("export"), "").unwrap();
        FakeSysfs { dir }
    }

    /// A tree with the pin already exported.
    pub fn with_pin(pin: u32) -> FakeSysfs {
        let s = FakeSysfs::new();
        s.export(pin, true);
        s
    }

    /// Create the attribute files for an exported pin.
    pub fn export(&self, pin: u32, with_direction: bool) {
        let pdir = self.root().join(format!("gpio{pin}"));
        fs::create_dir(&pdir).unwrap();
        fs::write(pdir.join("value"), "0").unwrap();
        fs::write(pdir.join("edge"), "none").unwrap();
        if with_direction {
            fs::write(pdir.join("direction"), "in").unwrap();
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn attr_path(&self, pin: u32, attr: &str) -> PathBuf {
        self.root().join(format!("gpio{pin}")).join(attr)
    }

    pub fn attr(&self, pin: u32, attr: &str) -> String {
        fs::read_to_string(self.attr_path(pin, attr)).unwrap()
    }

    /// Drive the level seen through the value file.
    pub fn set_level(&self, pin: u32, level: u8) {
        fs::write(self.attr_path(pin, "value"), level.to_string()).unwrap();
    }

    pub fn sysfs(&self) -> gpioport::Sysfs {
        gpioport::Sysfs::new(self.root())
    }
}
