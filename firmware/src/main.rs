//! Multi-tap text entry firmware for ATmega32U4 (Teensy 2.0).
//!
//! - 4x3 phone keypad and a backspace button on GPIO
//! - Multi-tap decoding into a 4x20 text buffer
//! - HD44780 LCD and a 7-segment key echo on the I2C bus
//! - Two cooperative tasks (input, render) stepped from a 1ms super-loop
//!
//! Build for the board with `--target avr-atmega32u4`. On any other target
//! only the board-independent modules are compiled, for their tests.

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]
#![cfg_attr(not(target_arch = "avr"), allow(dead_code))]

mod i2c;
#[cfg(target_arch = "avr")]
mod keypad;
mod lcd;
mod readout;
mod tasks;

/// Consecutive 1ms scans a reading must hold before it is accepted.
#[cfg(target_arch = "avr")]
const DEBOUNCE_THRESHOLD: u8 = 5;

/// Super-loop iterations between attempts to bring up missing I2C devices.
#[cfg(target_arch = "avr")]
const REINIT_PERIOD: u16 = 1000;

#[cfg(target_arch = "avr")]
mod board {
    use avr_device::atmega32u4::Peripherals;
    use multitap_core::segment::SegmentEcho;
    use multitap_core::{DirtySignal, Instant, KeyScanner, MultitapDecoder, TextBuffer, Timing, PHONE_PAD};

    use crate::i2c::{SpinDelay, Twi};
    use crate::keypad::{self, BoardKeypad};
    use crate::lcd::{self, Lcd};
    use crate::readout::SegmentReadout;
    use crate::tasks::{InputTask, RenderTask};
    use crate::{DEBOUNCE_THRESHOLD, REINIT_PERIOD};

    /// Raised by the input task, taken by the render task.
    static DIRTY: DirtySignal = DirtySignal::new();

    // LED0 (PD6, on-board) blinks with the input task, LED1 (PD7) with render
    const LED0: u8 = 0x40;
    const LED1: u8 = 0x80;

    /// Panic handler. On AVR we just loop forever.
    #[panic_handler]
    fn panic(_info: &core::panic::PanicInfo) -> ! {
        loop {}
    }

    /// Main entry point.
    #[no_mangle]
    pub extern "C" fn main() -> ! {
        let dp = unsafe { Peripherals::steal() };

        // Disable clock prescaler (CLKPR)
        dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
        dp.CPU.clkpr.write(|w| unsafe { w.bits(0) }); // Prescaler = 1

        // Heartbeat LEDs as outputs
        dp.PORTD
            .ddrd
            .modify(|r, w| unsafe { w.bits(r.bits() | LED0 | LED1) });

        keypad::init_gpio(&dp);

        // LCD backpack and segment expander share the TWI bus
        let twi = Twi::new(&dp.TWI);
        let mut segments = SegmentReadout::new(twi);
        segments.init();
        let mut lcd = Lcd::new(twi, SpinDelay);
        lcd.init();

        let timing = Timing {
            debounce_threshold: DEBOUNCE_THRESHOLD,
            ..Timing::DEFAULT
        };
        let scanner = KeyScanner::with_layout(BoardKeypad::new(&dp), &PHONE_PAD, DEBOUNCE_THRESHOLD)
            .with_echo(SegmentEcho(segments));
        let mut input = InputTask::new(scanner, MultitapDecoder::new(), timing);
        let mut render = RenderTask::new(lcd, timing.render_poll);
        let mut buffer = TextBuffer::<{ lcd::ROWS }, { lcd::COLS }>::new(&DIRTY);

        let mut now = Instant::ZERO;
        let mut reinit_counter: u16 = 0;

        loop {
            if input.step(now, &mut buffer) {
                toggle_led(&dp, LED0);
            }
            if render.step(now, &DIRTY, &buffer) {
                toggle_led(&dp, LED1);
            }

            // Periodically attempt to re-initialize I2C devices that weren't found
            reinit_counter = reinit_counter.wrapping_add(1);
            if reinit_counter >= REINIT_PERIOD {
                reinit_counter = 0;
                input.echo_mut().0.try_reinit();
                let lcd = render.display_mut();
                if !lcd.is_initialized() {
                    lcd.try_reinit();
                    // Redraw everything once the panel is back
                    buffer.mark_dirty();
                }
            }

            // ~1ms per tick
            delay_ms(1);
            now = now + multitap_core::Millis(1);
        }
    }

    fn toggle_led(dp: &Peripherals, mask: u8) {
        dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() ^ mask) });
    }

    /// Busy-wait delay in milliseconds (approximate, at 16MHz).
    fn delay_ms(ms: u16) {
        for _ in 0..ms {
            // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
            for _ in 0..4000u16 {
                unsafe { core::arch::asm!("nop") };
            }
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("firmware targets the ATmega32U4; build with --target avr-atmega32u4");
}
