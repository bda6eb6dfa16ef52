// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use anyhow::{bail, Context, Result};
use gpioport::{Gateway, Readiness, RegisterWindow, Status};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};

const CHANNEL: Token = Token(0);
const INTERRUPT: Token = Token(1);

/// Service commands and interrupts until the host closes the channel.
///
/// The channel must be non-blocking.
pub fn run<R, I, O>(gw: &mut Gateway<R, I, O>) -> Result<()>
where
    R: RegisterWindow,
    I: Read + AsRawFd,
    O: Write,
{
    let mut poll = Poll::new()?;
    poll.registry()
        .register(
            &mut SourceFd(&gw.input().as_raw_fd()),
            CHANNEL,
            Interest::READABLE,
        )
        .context("unable to watch channel")?;
    let mut watched = None;
    sync_interrupt(&poll, gw, &mut watched)?;
    let mut events = Events::with_capacity(2);
    loop {
        if let Err(e) = poll.poll(&mut events, None) {
            if e.kind() == ErrorKind::Interrupted {
                continue;
            }
            bail!(e);
        }
        let mut ready = Readiness::default();
        for event in &events {
            match event.token() {
                CHANNEL => ready.command = true,
                INTERRUPT => ready.interrupt |= event.is_priority(),
                _ => (),
            }
        }
        if gw.service(ready)? == Status::Closed {
            return Ok(());
        }
        sync_interrupt(&poll, gw, &mut watched)?;
    }
}

// Watch the value file only while the pin has interrupts enabled.
fn sync_interrupt<R, I, O>(
    poll: &Poll,
    gw: &Gateway<R, I, O>,
    watched: &mut Option<RawFd>,
) -> Result<()>
where
    R: RegisterWindow,
    I: Read,
    O: Write,
{
    match (gw.pin().interrupt_source(), *watched) {
        (Some(src), None) => {
            let fd = src.as_raw_fd();
            poll.registry()
                .register(&mut SourceFd(&fd), INTERRUPT, Interest::PRIORITY)
                .context("unable to watch for interrupts")?;
            log::debug!("watching GPIO {} for interrupts", src.pin().number());
            *watched = Some(fd);
        }
        (None, Some(fd)) => {
            poll.registry()
                .deregister(&mut SourceFd(&fd))
                .context("unable to stop watching for interrupts")?;
            log::debug!("stopped watching for interrupts");
            *watched = None;
        }
        _ => (),
    }
    Ok(())
}
