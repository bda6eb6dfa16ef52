// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{BoardType, Error, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::{self, NonNull};
use std::thread;
use std::time::Duration;

/// The default physical memory device.
pub const MEM_PATH: &str = "/dev/mem";

/// The offset of the GPIO register block from the peripheral base.
pub const GPIO_BLOCK_OFFSET: u64 = 0x20_0000;

/// The size of the mapped GPIO register block.
pub const BLOCK_SIZE: usize = 4096;

/// The number of pins controlled by the GPIO register block.
pub const NUM_PINS: u32 = 54;

// Register indices, in 32 bit words.
const GPPUD: usize = 37;
const GPPUDCLK0: usize = 38;

// Setup and hold time for the pull control signals.
const SETTLE: Duration = Duration::from_micros(1);

/// The pull-up/pull-down resistor configuration of a pin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Pull {
    /// Leave the configuration unchanged.
    #[default]
    Unset,
    /// Disable both resistors.
    None,
    /// Enable the pull-down resistor.
    Down,
    /// Enable the pull-up resistor.
    Up,
}

impl Pull {
    /// Map a mode name to a Pull.
    ///
    /// Unrecognised names map to [`Pull::Unset`].
    pub fn from_name(name: &str) -> Pull {
        match name {
            "none" => Pull::None,
            "down" => Pull::Down,
            "up" => Pull::Up,
            _ => Pull::Unset,
        }
    }

    // The value written to GPPUD.
    fn code(&self) -> Option<u32> {
        match self {
            Pull::Unset => None,
            Pull::None => Some(0),
            Pull::Down => Some(1),
            Pull::Up => Some(2),
        }
    }
}

impl fmt::Display for Pull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pull::Unset => "unset",
            Pull::None => "none",
            Pull::Down => "down",
            Pull::Up => "up",
        };
        write!(f, "{}", s)
    }
}

/// Write access to the 32 bit registers of the GPIO block.
pub trait RegisterWindow {
    /// Write the register at word index `idx`.
    fn write(&mut self, idx: usize, value: u32);
}

/// The GPIO register block mapped from physical memory.
#[derive(Debug)]
pub struct GpioMem {
    base: NonNull<u32>,
}

impl GpioMem {
    /// Map the GPIO register block for the board from the memory device at `path`,
    /// typically [`MEM_PATH`].
    pub fn map<P: AsRef<Path>>(board: BoardType, path: P) -> Result<GpioMem> {
        let p = path.as_ref();
        let f = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(p)
            .map_err(|e| Error::Map(p.to_path_buf(), e))?;
        let offset = board.peripheral_base() + GPIO_BLOCK_OFFSET;
        // SAFETY: a fresh shared mapping that is only released on drop.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                BLOCK_SIZE,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                f.as_raw_fd(),
                offset as libc::off_t,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(Error::Map(p.to_path_buf(), io::Error::last_os_error()));
        }
        // the mapping outlives the file
        let base = NonNull::new(addr as *mut u32)
            .ok_or_else(|| Error::Map(p.to_path_buf(), io::ErrorKind::InvalidData.into()))?;
        log::debug!("mapped GPIO block at {offset:#x} from {}", p.display());
        Ok(GpioMem { base })
    }
}

impl RegisterWindow for GpioMem {
    fn write(&mut self, idx: usize, value: u32) {
        assert!(idx < BLOCK_SIZE / 4, "register {idx} is outside the GPIO block");
        // SAFETY: idx is within the mapping, and the registers must be
        // written with volatile stores.
        unsafe { self.base.as_ptr().add(idx).write_volatile(value) }
    }
}

impl Drop for GpioMem {
    fn drop(&mut self) {
        // SAFETY: base was returned by mmap with BLOCK_SIZE.
        unsafe {
            libc::munmap(self.base.as_ptr() as *mut libc::c_void, BLOCK_SIZE);
        }
    }
}

/// Programs the pull-up/pull-down resistors of pins.
#[derive(Debug)]
pub struct PullController<R: RegisterWindow> {
    regs: R,
}

impl PullController<GpioMem> {
    /// Map the GPIO register block for the board from the memory device at `path`.
    pub fn initialize<P: AsRef<Path>>(board: BoardType, path: P) -> Result<Self> {
        Ok(PullController::new(GpioMem::map(board, path)?))
    }
}

impl<R: RegisterWindow> PullController<R> {
    /// A controller driving the registers in `regs`.
    pub fn new(regs: R) -> Self {
        PullController { regs }
    }

    /// The underlying register window.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Apply the pull to the pin.
    ///
    /// The control code is presented on GPPUD then clocked into the pin by
    /// its bit in GPPUDCLKn, with each signal held for the setup time, before
    /// both are released.
    pub fn set_pull(&mut self, pin: u32, pull: Pull) {
        let Some(code) = pull.code() else {
            return;
        };
        if pin >= NUM_PINS {
            log::warn!("GPIO {pin} is outside the register block, ignoring pull {pull}");
            return;
        }
        let clk = GPPUDCLK0 + (pin / 32) as usize;
        let mask = 1 << (pin % 32);

        self.regs.write(GPPUD, code & 0x3);
        thread::sleep(SETTLE);
        self.regs.write(clk, mask);
        thread::sleep(SETTLE);
        self.regs.write(GPPUD, 0);
        self.regs.write(clk, 0);
    }
}
