//! Seven-segment key echo on an MCP23018 I/O expander.
//!
//! GPIOA drives segments a-g and dp. The expander outputs are open-drain, so
//! a segment lights when its pin is pulled low (common-anode digit).

use multitap_core::hal::Readout;

use crate::i2c::{BusError, I2cBus};

/// MCP23018 I2C address (all address pins grounded).
const MCP23018_ADDR: u8 = 0x20;

// MCP23018 register addresses (IOCON.BANK = 0, default)
const IODIRA: u8 = 0x00;
const GPIOA: u8 = 0x12;

pub struct SegmentReadout<B> {
    bus: B,
    initialized: bool,
}

impl<B: I2cBus> SegmentReadout<B> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            initialized: false,
        }
    }

    /// Make GPIOA all outputs and blank the digit.
    pub fn init(&mut self) {
        self.initialized = self.configure().is_ok();
    }

    /// Try to re-initialize if the MCP23018 was not detected.
    pub fn try_reinit(&mut self) {
        if !self.initialized {
            self.init();
        }
    }

    fn configure(&mut self) -> Result<(), BusError> {
        self.bus.write(MCP23018_ADDR, &[IODIRA, 0x00])?;
        self.bus.write(MCP23018_ADDR, &[GPIOA, 0xFF])
    }
}

impl<B: I2cBus> Readout for SegmentReadout<B> {
    fn show_digit(&mut self, pattern: u8) {
        if self.initialized && self.bus.write(MCP23018_ADDR, &[GPIOA, !pattern]).is_err() {
            self.initialized = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeBus {
        writes: Vec<Vec<u8>>,
        /// Writes fail with a NACK while set.
        absent: bool,
    }

    impl I2cBus for FakeBus {
        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
            assert_eq!(addr, MCP23018_ADDR);
            if self.absent {
                return Err(BusError);
            }
            self.writes.push(bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn pattern_is_inverted_for_open_drain() {
        let mut readout = SegmentReadout::new(FakeBus::default());
        readout.init();
        readout.show_digit(multitap_core::segment::pattern(multitap_core::KeyEvent::digit(1)));
        assert_eq!(readout.bus.writes, [vec![IODIRA, 0x00], vec![GPIOA, 0xFF], vec![GPIOA, !0x06]]);
    }

    #[test]
    fn uninitialized_readout_stays_quiet() {
        let mut readout = SegmentReadout::new(FakeBus::default());
        readout.show_digit(0x7F);
        assert!(readout.bus.writes.is_empty());
    }

    #[test]
    fn reinit_recovers_a_missing_expander() {
        let mut readout = SegmentReadout::new(FakeBus {
            absent: true,
            ..FakeBus::default()
        });
        readout.init();
        readout.show_digit(0x06);
        assert!(readout.bus.writes.is_empty());

        readout.bus.absent = false;
        readout.try_reinit();
        readout.show_digit(0x06);
        assert_eq!(readout.bus.writes, [vec![IODIRA, 0x00], vec![GPIOA, 0xFF], vec![GPIOA, !0x06]]);
    }
}
