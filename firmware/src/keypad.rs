//! Phone keypad and backspace button on Teensy 2.0 GPIO.
//!
//! Pin mapping on Teensy 2.0 (ATmega32U4):
//!   Row drive pins (active-low outputs): PB0, PB1, PB2, PB3
//!   Column read pins (inputs w/ pull-up): PF0, PF1, PF4
//!   Backspace button (input w/ pull-up, to ground): PB6

use avr_device::atmega32u4::Peripherals;
use multitap_core::hal::Keypad;
use multitap_core::key::{PAD_COLS, PAD_ROWS};
use multitap_core::Position;

/// PB0-PB3.
const ROW_MASK: u8 = 0x0F;
/// PF0, PF1, PF4.
const COL_MASK: u8 = 0x13;
/// PB6.
const BACKSPACE: u8 = 0x40;

/// Configure the row, column and backspace pins.
pub fn init_gpio(dp: &Peripherals) {
    let portb = &dp.PORTB;
    let portf = &dp.PORTF;

    // Row pins as outputs, initially high (inactive)
    portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });
    portb.portb.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });

    // Column pins as inputs with pull-ups
    portf.ddrf.modify(|r, w| unsafe { w.bits(r.bits() & !COL_MASK) });
    portf.portf.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK) });

    // Backspace as input with pull-up
    portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() & !BACKSPACE) });
    portb.portb.modify(|r, w| unsafe { w.bits(r.bits() | BACKSPACE) });
}

pub struct BoardKeypad<'a> {
    dp: &'a Peripherals,
}

impl<'a> BoardKeypad<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }

    /// Drive one row low, all others high.
    fn drive_row(&self, row: usize) {
        self.dp.PORTB.portb.modify(|r, w| unsafe {
            w.bits((r.bits() | ROW_MASK) & !(1 << row))
        });
    }

    fn release_rows(&self) {
        self.dp
            .PORTB
            .portb
            .modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });
    }

    /// Column readings as 3 bits, 1 = pressed.
    fn read_cols(&self) -> u8 {
        let pinf = self.dp.PORTF.pinf.read().bits();
        // Col 0 = PF0, Col 1 = PF1, Col 2 = PF4 (active low)
        let c0 = (pinf >> 0) & 1;
        let c1 = (pinf >> 1) & 1;
        let c2 = (pinf >> 4) & 1;
        !(c0 | (c1 << 1) | (c2 << 2)) & 0x07
    }
}

impl Keypad for BoardKeypad<'_> {
    /// First pressed key in row-major order.
    fn scan_matrix(&mut self) -> Option<Position> {
        let mut found = None;
        for row in 0..PAD_ROWS {
            self.drive_row(row);
            tiny_delay();
            let cols = self.read_cols();
            if let Some(col) = (0..PAD_COLS).find(|c| cols & (1 << c) != 0) {
                found = Some(Position::new(row as u8, col as u8));
                break;
            }
        }
        self.release_rows();
        found
    }

    fn backspace_active(&mut self) -> bool {
        self.dp.PORTB.pinb.read().bits() & BACKSPACE == 0
    }
}

/// Short delay for pin settling (~5us at 16MHz).
#[inline(always)]
fn tiny_delay() {
    for _ in 0..20u8 {
        unsafe { core::arch::asm!("nop") };
    }
}
