// SPDX-FileCopyrightText: 2026 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod common;

use common::FakeSysfs;
use gpioport::{Direction, Error, Pin, State};
use std::fs;
use std::io::Write;

mod export_and_open {
    use super::*;

    #[test]
    fn exports_missing_pin() {
        let sim = FakeSysfs::new();
        // no kernel behind the fake, so the value file never appears
        let res = sim.sysfs().export_and_open(17, Direction::Input);
        assert!(matches!(res, Err(Error::Io(p, _)) if p == sim.attr_path(17, "value")));
        assert_eq!(fs::read_to_string(sim.root().join("export")).unwrap(), "17");
    }

    #[test]
    fn skips_export_of_exported_pin() {
        let sim = FakeSysfs::with_pin(17);
        sim.sysfs()
            .export_and_open(17, Direction::Input)
            .unwrap();
        assert_eq!(fs::read_to_string(sim.root().join("export")).unwrap(), "");
    }

    #[test]
    fn missing_export_file() {
        let sim = FakeSysfs::new();
        fs::remove_file(sim.root().join("export")).unwrap();
        let res = sim.sysfs().export_and_open(17, Direction::Output);
        assert!(matches!(res, Err(Error::Io(p, _)) if p == sim.root().join("export")));
    }

    #[test]
    fn input_is_read_only() {
        let sim = FakeSysfs::with_pin(17);
        let mut f = sim
            .sysfs()
            .export_and_open(17, Direction::Input)
            .unwrap();
        assert!(f.write_all(b"1").is_err());
    }

    #[test]
    fn output_is_writable() {
        let sim = FakeSysfs::with_pin(17);
        let mut f = sim
            .sysfs()
            .export_and_open(17, Direction::Output)
            .unwrap();
        f.write_all(b"1").unwrap();
        assert_eq!(sim.attr(17, "value"), "1");
    }
}

mod configure_direction {
    use super::*;

    #[test]
    fn writes_direction() {
        let sim = FakeSysfs::with_pin(4);
        let sysfs = sim.sysfs();
        sysfs.configure_direction(4, Direction::Output).unwrap();
        assert_eq!(sim.attr(4, "direction"), "out");
        sysfs.configure_direction(4, Direction::Input).unwrap();
        assert_eq!(sim.attr(4, "direction"), "in");
    }

    #[test]
    fn fixed_direction_pin() {
        let sim = FakeSysfs::new();
        sim.export(4, false);
        sim.sysfs()
            .configure_direction(4, Direction::Output)
            .unwrap();
        assert!(!sim.attr_path(4, "direction").exists());
    }

    #[test]
    fn gives_up_after_attempts() {
        let sim = FakeSysfs::new();
        sim.export(4, false);
        // a directory is never writable
        fs::create_dir(sim.attr_path(4, "direction")).unwrap();
        let res = sim.sysfs().configure_direction(4, Direction::Input);
        assert!(matches!(
            res,
            Err(Error::Direction(4, n, _)) if n == gpioport::sysfs::DIRECTION_ATTEMPTS
        ));
    }
}

#[test]
fn open_pin() {
    let sim = FakeSysfs::with_pin(27);
    let pin = Pin::open(&sim.sysfs(), 27, Direction::Output).unwrap();
    assert_eq!(pin.state(), State::Output);
    assert_eq!(sim.attr(27, "direction"), "out");

    let pin = Pin::open(&sim.sysfs(), 27, Direction::Input).unwrap();
    assert_eq!(pin.state(), State::Input);
    assert_eq!(sim.attr(27, "direction"), "in");
    sim.set_level(27, 1);
    assert_eq!(pin.read().unwrap(), 1);
}
