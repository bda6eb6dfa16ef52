// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::pull::{Pull, PullController, RegisterWindow};
use crate::sysfs::{Edge, Sysfs};
use crate::{Error, Pin, Result};
use gpioport_term::{packet, Decoder, Encoder, FrameTag, PacketReader, PACKET_MAX};
use std::io::{ErrorKind, Read, Write};

/// The sources with pending work.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Readiness {
    /// The command channel is readable or closed.
    pub command: bool,
    /// The pin has signalled an edge.
    pub interrupt: bool,
}

/// The state of the command channel after servicing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Running,
    /// The host has closed the channel.
    Closed,
}

// The successful outcome of a command.
enum Reply {
    Ok,
    Value(u8),
}

/// Executes commands from the host on the pin, and notifies the host of
/// interrupts.
///
/// Commands arrive as packets on `input` and each is answered with exactly
/// one response packet on `output`.  Notifications are interleaved on
/// `output` in the order they are serviced.
///
/// The input is read until it would block or is closed, so a blocking
/// input only returns after the host closes it.
pub struct Gateway<R: RegisterWindow, I: Read, O: Write> {
    pin: Pin,
    sysfs: Sysfs,
    pull: PullController<R>,
    input: I,
    output: O,
    packets: PacketReader,
}

impl<R: RegisterWindow, I: Read, O: Write> Gateway<R, I, O> {
    /// A gateway for the pin, serving commands from `input` and replying on `output`.
    pub fn new(pin: Pin, sysfs: Sysfs, pull: PullController<R>, input: I, output: O) -> Self {
        Gateway {
            pin,
            sysfs,
            pull,
            input,
            output,
            packets: PacketReader::new(),
        }
    }

    /// The controlled pin.
    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    /// The command channel.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Service the ready sources.
    ///
    /// Commands are always serviced before an interrupt.
    pub fn service(&mut self, ready: Readiness) -> Result<Status> {
        if ready.command && self.receive()? == Status::Closed {
            return Ok(Status::Closed);
        }
        if ready.interrupt {
            self.notify()?;
        }
        Ok(Status::Running)
    }

    /// Drain the command channel and dispatch any complete commands.
    ///
    /// Commands received before the channel closed are dispatched before
    /// reporting the closure.
    pub fn receive(&mut self) -> Result<Status> {
        let mut buf = [0; PACKET_MAX];
        let mut status = Status::Running;
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => {
                    status = Status::Closed;
                    break;
                }
                Ok(n) => self.packets.push(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(Error::Channel(e)),
            }
        }
        while let Some(p) = self.packets.next_packet()? {
            self.dispatch(&p)?;
        }
        if status == Status::Closed {
            log::debug!("channel closed");
        }
        Ok(status)
    }

    /// Execute one command and send the response.
    ///
    /// Commands are {Command, Argument} tuples.  Errors the host can recover
    /// from are returned to the host as {error, Reason}, while malformed
    /// commands are fatal.
    pub fn dispatch(&mut self, packet: &[u8]) -> Result<()> {
        let mut d = Decoder::new(packet);
        d.version()?;
        let arity = d.tuple_header()?;
        if arity != 2 {
            return Err(Error::Protocol(format!(
                "expected {{cmd, args}} tuple, found arity {arity}"
            )));
        }
        let cmd = d.atom()?;
        let mut resp = FrameTag::Response.encoder();
        match self.execute(&cmd, &mut d) {
            Ok(Reply::Ok) => {
                resp.atom("ok");
            }
            Ok(Reply::Value(v)) => {
                resp.long(v as i64);
            }
            Err(e) => {
                let Some(reason) = e.reply_reason() else {
                    return Err(e);
                };
                log::debug!("{cmd} failed: {e}");
                resp.tuple_header(2).atom("error").atom(reason);
            }
        }
        self.send(resp)
    }

    fn execute(&mut self, cmd: &str, args: &mut Decoder) -> Result<Reply> {
        match cmd {
            "read" => {
                let v = self.pin.read()?;
                log::debug!("read {v}");
                Ok(Reply::Value(v))
            }
            "write" => {
                let v = args.long()?;
                log::debug!("write {v}");
                self.pin.write(v)?;
                Ok(Reply::Ok)
            }
            "set_int" => {
                let mode = args.atom()?;
                log::debug!("set_int {mode}");
                let edge = mode.parse::<Edge>()?;
                self.pin.set_edge_mode(&self.sysfs, edge)?;
                Ok(Reply::Ok)
            }
            "set_mode" => {
                let mode = args.atom()?;
                let pull = Pull::from_name(&mode);
                if pull == Pull::Unset {
                    log::debug!("set_mode {mode} is not a pull mode, ignoring");
                } else {
                    log::debug!("set_mode {pull}");
                }
                self.pull.set_pull(self.pin.number(), pull);
                Ok(Reply::Ok)
            }
            _ => Err(Error::Protocol(format!("unknown command: {cmd}"))),
        }
    }

    /// Notify the host of the level following an edge.
    ///
    /// Ignored unless interrupts are enabled.
    pub fn notify(&mut self) -> Result<()> {
        let Some(src) = self.pin.interrupt_source() else {
            log::debug!("ignoring interrupt with interrupts disabled");
            return Ok(());
        };
        let edge = match src.pin().read()? {
            1 => Edge::Rising,
            _ => Edge::Falling,
        };
        log::debug!("interrupt {edge}");
        let mut n = FrameTag::Notification.encoder();
        n.tuple_header(2).atom("gpio_interrupt").atom(edge.as_str());
        self.send(n)
    }

    fn send(&mut self, e: Encoder) -> Result<()> {
        let p = packet::encode(e.as_bytes())?;
        self.output.write_all(&p).map_err(Error::Channel)?;
        self.output.flush().map_err(Error::Channel)
    }
}
