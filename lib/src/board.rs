// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Error, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// The default source of board identification.
pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

// Hardware names that identify a later generation SoC outright.
const LATER_HARDWARE: [&str; 2] = ["BCM2709", "BCM2710"];

// The only revisions, after masking, that identify an early generation board.
const EARLY_REVISIONS: [u32; 2] = [0x0002, 0x0003];

/// The SoC generation of the board, which determines where the peripherals
/// are located in physical memory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoardType {
    /// The early A and B models.
    Early,
    /// Everything since.
    Later,
}

impl BoardType {
    /// Determine the board type from the identification file at `path`,
    /// typically [`CPUINFO_PATH`].
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<BoardType> {
        let p = path.as_ref();
        let info = fs::read_to_string(p).map_err(|e| Error::Io(p.to_path_buf(), e))?;
        BoardType::from_cpuinfo(&info)
    }

    /// Determine the board type from the contents of a cpuinfo file.
    ///
    /// A Hardware line naming a later SoC is conclusive.  Otherwise the board
    /// revision decides.
    pub fn from_cpuinfo(info: &str) -> Result<BoardType> {
        if let Some(hw) = field(info, "Hardware") {
            if LATER_HARDWARE.iter().any(|m| hw.contains(m)) {
                return Ok(BoardType::Later);
            }
            log::debug!("hardware '{hw}' is not conclusive, checking revision");
        }
        let rev = field(info, "Revision")
            .ok_or_else(|| Error::UnknownBoard("no Hardware or Revision line".into()))?;
        let code = u32::from_str_radix(rev, 16)
            .map_err(|e| Error::UnknownBoard(format!("revision '{rev}' {e}")))?;
        if EARLY_REVISIONS.contains(&(code & 0xffff)) {
            Ok(BoardType::Early)
        } else {
            Ok(BoardType::Later)
        }
    }

    /// The physical address of the peripheral block.
    pub fn peripheral_base(&self) -> u64 {
        match self {
            BoardType::Early => 0x2000_0000,
            BoardType::Later => 0x3F00_0000,
        }
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardType::Early => write!(f, "early"),
            BoardType::Later => write!(f, "later"),
        }
    }
}

// The value of the first line starting with name, e.g. "Revision\t: 000e".
fn field<'a>(info: &'a str, name: &str) -> Option<&'a str> {
    info.lines()
        .find(|l| l.starts_with(name))
        .and_then(|l| l.split_once(':'))
        .map(|(_, v)| v.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI2: &str = "processor\t: 0\n\
        model name\t: ARMv7 Processor rev 5 (v7l)\n\
        Hardware\t: BCM2709\n\
        Revision\t: 0002\n\
        Serial\t\t: 00000000deadbeef\n";

    const PI1_REV1: &str = "processor\t: 0\n\
        Hardware\t: BCM2708\n\
        Revision\t: 0002\n";

    #[test]
    fn later_hardware_wins() {
        // revision alone would say early
        assert_eq!(BoardType::from_cpuinfo(PI2).unwrap(), BoardType::Later);
        assert_eq!(
            BoardType::from_cpuinfo("Hardware\t: BCM2710\n").unwrap(),
            BoardType::Later
        );
    }

    #[test]
    fn early_revision() {
        assert_eq!(BoardType::from_cpuinfo(PI1_REV1).unwrap(), BoardType::Early);
        assert_eq!(
            BoardType::from_cpuinfo("Revision\t: 0003\n").unwrap(),
            BoardType::Early
        );
        // warranty bit set
        assert_eq!(
            BoardType::from_cpuinfo("Hardware\t: BCM2708\nRevision\t: 1000002\n").unwrap(),
            BoardType::Early
        );
    }

    #[test]
    fn later_revision() {
        assert_eq!(
            BoardType::from_cpuinfo("Hardware\t: BCM2835\nRevision\t: a02082\n").unwrap(),
            BoardType::Later
        );
        assert_eq!(
            BoardType::from_cpuinfo("Hardware\t: BCM2708\nRevision\t: 000e\n").unwrap(),
            BoardType::Later
        );
    }

    #[test]
    fn inconclusive() {
        assert!(matches!(
            BoardType::from_cpuinfo("processor\t: 0\n"),
            Err(Error::UnknownBoard(_))
        ));
        assert!(matches!(
            BoardType::from_cpuinfo("Hardware\t: BCM2708\n"),
            Err(Error::UnknownBoard(_))
        ));
        assert!(matches!(
            BoardType::from_cpuinfo("Revision\t: banana\n"),
            Err(Error::UnknownBoard(_))
        ));
    }

    #[test]
    fn detect() {
        let f = tempfile::NamedTempFile::new().unwrap();
        fs::write(f.path(), PI1_REV1).unwrap();
        assert_eq!(BoardType::detect(f.path()).unwrap(), BoardType::Early);

        assert!(matches!(
            BoardType::detect("/nonexistent/cpuinfo"),
            Err(Error::Io(_, _))
        ));
    }

    #[test]
    fn peripheral_base() {
        assert_eq!(BoardType::Early.peripheral_base(), 0x2000_0000);
        assert_eq!(BoardType::Later.peripheral_base(), 0x3F00_0000);
    }
}
