// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for controlling a single Raspberry Pi GPIO pin on behalf of
//! a host process.
//!
//! The pin is exported and driven through the kernel GPIO sysfs interface,
//! see the [`sysfs`] module, while pull-up and pull-down resistors are
//! programmed directly through the memory mapped GPIO register block, see the
//! [`pull`] module.
//!
//! Commands from the host are decoded and executed by the [`Gateway`], which
//! also turns edge interrupts into notifications for the host.
//!
//! [`sysfs`]: module@sysfs
//! [`pull`]: module@pull

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Identification of the board generation.
pub mod board;

/// Command dispatch and interrupt notification.
pub mod gateway;

/// The state of the controlled pin.
pub mod pin;

/// Pull-up and pull-down control via the GPIO register block.
pub mod pull;

/// Access to pins via the kernel GPIO sysfs interface.
pub mod sysfs;

pub use board::BoardType;
pub use gateway::{Gateway, Readiness, Status};
pub use pin::{Direction, Pin, State};
pub use pull::{Pull, PullController, RegisterWindow};
pub use sysfs::{Edge, Sysfs};

/// Errors returned by [`gpioport`] functions.
///
/// Errors are either reported to the host, as identified by
/// [`Error::reply_reason`], or are fatal to the port.
///
/// [`gpioport`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The board generation could not be determined.
    #[error("unable to determine board type: {0}")]
    UnknownBoard(String),

    /// A file could not be accessed.
    #[error("\"{0}\" {1}")]
    Io(PathBuf, #[source] io::Error),

    /// The GPIO register block could not be mapped.
    #[error("unable to map GPIO registers from \"{0}\": {1}")]
    Map(PathBuf, #[source] io::Error),

    /// The pin direction could not be set before the retries were exhausted.
    #[error("unable to set direction of GPIO {0} after {1} attempts: {2}")]
    Direction(u32, usize, #[source] io::Error),

    /// A value file operation failed on an open pin.
    #[error("GPIO {0} {1} failed: {2}")]
    Value(u32, ValueOp, #[source] io::Error),

    /// The pin cannot be written as it is not an output.
    #[error("GPIO {0} is not an output")]
    NotOutput(u32),

    /// Edge detection cannot be configured on an output.
    #[error("GPIO {0} is an output so cannot detect edges")]
    EdgeOnOutput(u32),

    /// The requested edge mode is not recognised.
    #[error("unknown edge mode '{0}'")]
    UnknownEdge(String),

    /// The edge file could not be written.
    #[error("unable to set edge detection on GPIO {0}: {1}")]
    Edge(u32, #[source] io::Error),

    /// A malformed or unsupported command was received.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A command or reply could not be coded.
    #[error(transparent)]
    Term(#[from] gpioport_term::Error),

    /// The host channel failed.
    #[error("channel {0}")]
    Channel(#[source] io::Error),
}

impl Error {
    /// The reason reported to the host for a recoverable error.
    ///
    /// Returns None for errors that are fatal.
    pub fn reply_reason(&self) -> Option<&'static str> {
        match self {
            Error::NotOutput(_) => Some("gpio_write_failed"),
            Error::EdgeOnOutput(_) | Error::UnknownEdge(_) | Error::Edge(_, _) => {
                Some("gpio_set_int_failed")
            }
            _ => None,
        }
    }
}

/// Identifies the operation on a value file that failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueOp {
    Read,
    Write,
}

impl fmt::Display for ValueOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueOp::Read => write!(f, "read"),
            ValueOp::Write => write!(f, "write"),
        }
    }
}

/// The result for [`gpioport`] functions.
///
/// [`gpioport`]: crate
pub type Result<T> = std::result::Result<T, Error>;
