// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::sysfs::{self, Edge, Sysfs};
use crate::{Error, Result, ValueOp};
use std::fmt;
use std::fs::File;
use std::os::unix::io::{AsRawFd, RawFd};

/// The direction of a pin, as configured at startup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// The operating state of a pin.
///
/// Outputs remain outputs.  Inputs move between [`State::Input`] and
/// [`State::InputWithInterrupts`] as edge detection is disabled and enabled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Output,
    Input,
    InputWithInterrupts,
}

impl From<Direction> for State {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Input => State::Input,
            Direction::Output => State::Output,
        }
    }
}

/// The pin controlled by the port.
#[derive(Debug)]
pub struct Pin {
    number: u32,
    // read-write for outputs, read-only for inputs
    file: File,
    state: State,
}

impl Pin {
    /// Export the pin and configure its direction.
    pub fn open(sysfs: &Sysfs, number: u32, dir: Direction) -> Result<Pin> {
        let file = sysfs.export_and_open(number, dir)?;
        sysfs.configure_direction(number, dir)?;
        Ok(Pin {
            number,
            file,
            state: dir.into(),
        })
    }

    /// The GPIO number of the pin.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The current operating state of the pin.
    pub fn state(&self) -> State {
        self.state
    }

    /// Read the value of the pin.
    pub fn read(&self) -> Result<u8> {
        sysfs::read(&self.file).map_err(|e| Error::Value(self.number, ValueOp::Read, e))
    }

    /// Set the value of an output.
    pub fn write(&self, value: i64) -> Result<()> {
        if self.state != State::Output {
            return Err(Error::NotOutput(self.number));
        }
        sysfs::write(&self.file, value).map_err(|e| Error::Value(self.number, ValueOp::Write, e))
    }

    /// Set the edges that trigger interrupts.
    ///
    /// Interrupts are enabled for any edge other than [`Edge::None`].
    /// The state is unchanged if the edge file cannot be written.
    pub fn set_edge_mode(&mut self, sysfs: &Sysfs, edge: Edge) -> Result<()> {
        if self.state == State::Output {
            return Err(Error::EdgeOnOutput(self.number));
        }
        sysfs.set_edge(self.number, edge)?;
        self.state = match edge {
            Edge::None => State::Input,
            _ => State::InputWithInterrupts,
        };
        Ok(())
    }

    /// The source of interrupts for the pin.
    ///
    /// Only available while interrupts are enabled.
    pub fn interrupt_source(&self) -> Option<InterruptSource<'_>> {
        match self.state {
            State::InputWithInterrupts => Some(InterruptSource { pin: self }),
            _ => None,
        }
    }
}

/// A pin with interrupts enabled.
///
/// The value file signals priority data when an edge is detected.
#[derive(Clone, Copy, Debug)]
pub struct InterruptSource<'a> {
    pin: &'a Pin,
}

impl InterruptSource<'_> {
    /// The pin signalling the interrupts.
    pub fn pin(&self) -> &Pin {
        self.pin
    }
}

impl AsRawFd for InterruptSource<'_> {
    fn as_raw_fd(&self) -> RawFd {
        self.pin.file.as_raw_fd()
    }
}
