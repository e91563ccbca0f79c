//! HD44780 character LCD behind a PCF8574 I2C backpack.
//!
//! The backpack maps its eight outputs to the LCD as:
//!   P0 = RS, P1 = RW, P2 = EN, P3 = backlight, P4-P7 = D4-D7
//! so the controller is driven in 4-bit mode, one nibble per EN pulse.

use multitap_core::hal::Display;

use crate::i2c::{BusError, DelayUs, I2cBus};

/// Backpack address with A0-A2 pulled high.
pub const PCF8574_ADDR: u8 = 0x27;

/// Rows on the 20x4 module.
pub const ROWS: usize = 4;
/// Columns on the 20x4 module.
pub const COLS: usize = 20;

/// DDRAM address of the first cell of each row.
const ROW_OFFSETS: [u8; ROWS] = [0x00, 0x40, 0x14, 0x54];

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

// HD44780 instructions
const CLEAR: u8 = 0x01;
const ENTRY_MODE_INC: u8 = 0x06;
const DISPLAY_ON: u8 = 0x0C;
const FUNCTION_4BIT_2LINE: u8 = 0x28;
const SET_DDRAM: u8 = 0x80;

pub struct Lcd<B, D> {
    bus: B,
    delay: D,
    initialized: bool,
}

impl<B: I2cBus, D: DelayUs> Lcd<B, D> {
    pub const fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            initialized: false,
        }
    }

    /// Run the power-on sequence. Failures leave the driver uninitialized so
    /// [`try_reinit`](Self::try_reinit) can retry later.
    pub fn init(&mut self) {
        self.initialized = self.configure().is_ok();
    }

    /// Retry initialization if the backpack was not found.
    pub fn try_reinit(&mut self) {
        if !self.initialized {
            self.init();
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn configure(&mut self) -> Result<(), BusError> {
        // Power-on wait, then the 8-bit reset dance to force a known state
        self.delay.delay_us(50_000);
        self.nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.nibble(0x02, 0)?;

        self.command(FUNCTION_4BIT_2LINE)?;
        self.command(DISPLAY_ON)?;
        self.command(ENTRY_MODE_INC)?;
        self.command(CLEAR)?;
        self.delay.delay_us(2_000);
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), BusError> {
        self.byte(cmd, 0)
    }

    fn data(&mut self, ch: u8) -> Result<(), BusError> {
        self.byte(ch, RS)
    }

    fn byte(&mut self, value: u8, mode: u8) -> Result<(), BusError> {
        self.nibble(value >> 4, mode)?;
        self.nibble(value & 0x0F, mode)
    }

    /// Latch one nibble: EN high then low in a single bus transaction.
    fn nibble(&mut self, nibble: u8, mode: u8) -> Result<(), BusError> {
        let bits = (nibble << 4) | mode | BACKLIGHT;
        self.bus.write(PCF8574_ADDR, &[bits | EN, bits])?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn print_row(&mut self, row: usize, text: &str) -> Result<(), BusError> {
        let Some(&offset) = ROW_OFFSETS.get(row) else {
            return Ok(());
        };
        self.command(SET_DDRAM | offset)?;
        for &ch in text.as_bytes().iter().take(COLS) {
            self.data(ch)?;
        }
        Ok(())
    }
}

impl<B: I2cBus, D: DelayUs> Display for Lcd<B, D> {
    fn clear(&mut self) {
        if !self.initialized {
            return;
        }
        if self.command(CLEAR).is_err() {
            self.initialized = false;
            return;
        }
        self.delay.delay_us(2_000);
    }

    fn write_row(&mut self, row: usize, text: &str) {
        if self.initialized && self.print_row(row, text).is_err() {
            self.initialized = false;
        }
    }
}
