// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A port process that controls a single Raspberry Pi GPIO pin on behalf of
//! a host.
//!
//! Commands are read from stdin and responses and interrupt notifications
//! written to stdout, so diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gpioport::board::CPUINFO_PATH;
use gpioport::pull::MEM_PATH;
use gpioport::sysfs::SYSFS_PATH;
use gpioport::{BoardType, Direction, Gateway, Pin, Pull, PullController, Sysfs};
use std::fs::File;
use std::io::{self, Read};
use std::num::ParseIntError;
use std::os::unix::io::{AsFd, AsRawFd, RawFd};
use std::path::PathBuf;
use std::process::ExitCode;

mod event_loop;

fn main() -> ExitCode {
    match Opts::try_parse() {
        Ok(opts) => {
            env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn"))
                .init();
            match run(&opts) {
                Ok(()) => return ExitCode::SUCCESS,
                Err(e) => eprintln!("{}", format_error(&opts, &e)),
            }
        }
        Err(e) => eprintln!("{e}"),
    }
    ExitCode::FAILURE
}

const LOG_ENV: &str = "GPIO_PORT_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "gpio_port",
    about = "Control a Raspberry Pi GPIO pin on behalf of a host process.",
    version
)]
struct Opts {
    /// The GPIO number of the pin
    ///
    /// Decimal, or hex with a 0x prefix.
    #[arg(value_name = "pin", value_parser = parse_pin)]
    pin: u32,

    /// The direction of the pin
    #[arg(value_name = "direction", value_enum)]
    direction: DirectionFlags,

    /// The pull to apply to the pin at startup
    ///
    /// If not specified the pull is left unchanged.
    #[arg(value_name = "pull", value_enum)]
    pull: Option<PullFlags>,

    /// The root of the GPIO sysfs interface
    #[arg(long, value_name = "dir", env = "GPIO_PORT_SYSFS_ROOT", default_value = SYSFS_PATH)]
    sysfs_root: PathBuf,

    /// The file used to identify the board
    #[arg(long, value_name = "file", env = "GPIO_PORT_CPUINFO", default_value = CPUINFO_PATH)]
    cpuinfo: PathBuf,

    /// The device providing access to the GPIO registers
    #[arg(long, value_name = "file", env = "GPIO_PORT_MEM_DEVICE", default_value = MEM_PATH)]
    mem_device: PathBuf,

    /// Provide more detailed error messages.
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum DirectionFlags {
    Input,
    Output,
}

impl From<DirectionFlags> for Direction {
    fn from(d: DirectionFlags) -> Self {
        match d {
            DirectionFlags::Input => Direction::Input,
            DirectionFlags::Output => Direction::Output,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum PullFlags {
    None,
    Down,
    Up,
}

impl From<PullFlags> for Pull {
    fn from(p: PullFlags) -> Self {
        match p {
            PullFlags::None => Pull::None,
            PullFlags::Down => Pull::Down,
            PullFlags::Up => Pull::Up,
        }
    }
}

fn parse_pin(s: &str) -> std::result::Result<u32, ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

fn format_error(opts: &Opts, e: &anyhow::Error) -> String {
    if opts.verbose {
        format!("{e:#}")
    } else {
        format!("{e}")
    }
}

fn run(opts: &Opts) -> Result<()> {
    let board = BoardType::detect(&opts.cpuinfo)?;
    log::info!("board type {board}");
    let mut pull = PullController::initialize(board, &opts.mem_device)?;
    let sysfs = Sysfs::new(&opts.sysfs_root);
    let dir = opts.direction.into();
    let pin = Pin::open(&sysfs, opts.pin, dir)
        .with_context(|| format!("unable to open GPIO {} as {dir}", opts.pin))?;
    log::info!("GPIO {} opened as {dir}", opts.pin);
    if let Some(p) = opts.pull {
        let p = Pull::from(p);
        log::info!("GPIO {} pull {p}", opts.pin);
        pull.set_pull(opts.pin, p);
    }
    let (input, output) = channel().context("unable to open channel")?;
    let mut gw = Gateway::new(pin, sysfs, pull, input, output);
    event_loop::run(&mut gw)
}

// The command channel, as a non-blocking stdin, and the reply channel.
fn channel() -> io::Result<(NonBlocking, File)> {
    let input = NonBlocking::new(File::from(io::stdin().as_fd().try_clone_to_owned()?))?;
    let output = File::from(io::stdout().as_fd().try_clone_to_owned()?);
    Ok((input, output))
}

/// A file switched to non-blocking mode for as long as it is held.
///
/// The mode belongs to the open file description, not the descriptor, so it
/// is shared with every duplicate, including the invoking shell's.  The host
/// is expected to connect stdin and stdout to separate pipes.  Where they
/// share a description, such as a terminal, writes to stdout may also fail
/// with WouldBlock, which is fatal.  The original flags are restored on drop.
struct NonBlocking {
    file: File,
    flags: libc::c_int,
}

impl NonBlocking {
    fn new(file: File) -> io::Result<NonBlocking> {
        let flags = status_flags(&file)?;
        set_status_flags(&file, flags | libc::O_NONBLOCK)?;
        Ok(NonBlocking { file, flags })
    }
}

impl Read for NonBlocking {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl AsRawFd for NonBlocking {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl Drop for NonBlocking {
    fn drop(&mut self) {
        if let Err(e) = set_status_flags(&self.file, self.flags) {
            log::warn!("unable to restore channel flags: {e}");
        }
    }
}

fn status_flags(f: &File) -> io::Result<libc::c_int> {
    // SAFETY: the fd is open for the lifetime of f
    let flags = unsafe { libc::fcntl(f.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(flags)
}

fn set_status_flags(f: &File, flags: libc::c_int) -> io::Result<()> {
    // SAFETY: the fd is open for the lifetime of f
    if unsafe { libc::fcntl(f.as_raw_fd(), libc::F_SETFL, flags) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
