// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Direction, Error, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// The default root of the GPIO sysfs interface.
pub const SYSFS_PATH: &str = "/sys/class/gpio";

/// The maximum number of attempts to write the direction file.
///
/// The direction file is not writable until udev has caught up with the
/// export, so early writes can fail.
pub const DIRECTION_ATTEMPTS: usize = 1000;

const DIRECTION_RETRY_PAUSE: Duration = Duration::from_millis(1);

/// The edges that trigger an interrupt.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Edge {
    /// Interrupts disabled.
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

impl Edge {
    /// The name of the edge as used by the edge file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::None => "none",
            Edge::Rising => "rising",
            Edge::Falling => "falling",
            Edge::Both => "both",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Edge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Edge::None),
            "rising" => Ok(Edge::Rising),
            "falling" => Ok(Edge::Falling),
            "both" => Ok(Edge::Both),
            _ => Err(Error::UnknownEdge(s.into())),
        }
    }
}

/// The GPIO sysfs interface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sysfs {
    root: PathBuf,
}

impl Default for Sysfs {
    fn default() -> Self {
        Sysfs::new(SYSFS_PATH)
    }
}

impl Sysfs {
    /// An interface rooted at `root`, typically [`SYSFS_PATH`].
    pub fn new<P: Into<PathBuf>>(root: P) -> Sysfs {
        Sysfs { root: root.into() }
    }

    /// The path to an attribute of an exported pin.
    pub fn pin_path(&self, pin: u32, attr: &str) -> PathBuf {
        let mut p = self.root.join(format!("gpio{pin}"));
        p.push(attr);
        p
    }

    /// Export the pin, if not already exported, and open its value file.
    ///
    /// The value file is only writable for outputs.
    pub fn export_and_open(&self, pin: u32, dir: Direction) -> Result<File> {
        let value = self.pin_path(pin, "value");
        if !value.exists() {
            let export = self.root.join("export");
            log::debug!("exporting GPIO {pin}");
            write_attr(&export, &pin.to_string()).map_err(|e| Error::Io(export, e))?;
        }
        OpenOptions::new()
            .read(true)
            .write(dir == Direction::Output)
            .open(&value)
            .map_err(|e| Error::Io(value, e))
    }

    /// Set the direction of the pin.
    ///
    /// Pins that only support one direction have no direction file, and are
    /// left as is.
    pub fn configure_direction(&self, pin: u32, dir: Direction) -> Result<()> {
        let path = self.pin_path(pin, "direction");
        if !path.exists() {
            log::debug!("GPIO {pin} has no direction file");
            return Ok(());
        }
        let value = match dir {
            Direction::Output => "out",
            Direction::Input => "in",
        };
        retry(DIRECTION_ATTEMPTS, DIRECTION_RETRY_PAUSE, || {
            write_attr(&path, value)
        })
        .map_err(|(attempts, e)| Error::Direction(pin, attempts, e))
    }

    /// Write the edge file of the pin.
    pub fn set_edge(&self, pin: u32, edge: Edge) -> Result<()> {
        write_attr(&self.pin_path(pin, "edge"), edge.as_str()).map_err(|e| Error::Edge(pin, e))
    }
}

/// Read the logical value from a value file.
pub fn read(f: &File) -> io::Result<u8> {
    let mut buf = [0; 1];
    match f.read_at(&mut buf, 0)? {
        0 => Err(io::ErrorKind::UnexpectedEof.into()),
        _ => Ok((buf[0] == b'1') as u8),
    }
}

/// Write a logical value to a value file.
///
/// Any non-zero value is high.
pub fn write(f: &File, value: i64) -> io::Result<()> {
    let buf = if value != 0 { b"1" } else { b"0" };
    match f.write_at(buf, 0)? {
        0 => Err(io::ErrorKind::WriteZero.into()),
        _ => Ok(()),
    }
}

// Write a complete attribute value in one write.
fn write_attr(path: &Path, value: &str) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).truncate(true).open(path)?;
    let n = f.write(value.as_bytes())?;
    if n != value.len() {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("wrote {n} of {} bytes", value.len()),
        ));
    }
    Ok(())
}

// Call f until it succeeds or has been called `attempts` times, pausing between calls.
//
// On failure returns the number of attempts and the last error.
pub(crate) fn retry<F>(
    attempts: usize,
    pause: Duration,
    mut f: F,
) -> std::result::Result<(), (usize, io::Error)>
where
    F: FnMut() -> io::Result<()>,
{
    let mut count = 0;
    loop {
        count += 1;
        match f() {
            Ok(()) => return Ok(()),
            Err(e) if count >= attempts => return Err((count, e)),
            Err(_) => thread::sleep(pause),
        }
    }
}
