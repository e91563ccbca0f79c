//! I2C (TWI) master for the LCD backpack and the segment expander.
//!
//! Device drivers talk to [`I2cBus`] so their byte sequences can be checked
//! on the host; [`Twi`] is the ATmega32U4 implementation.

/// Bus-level failure: missing ACK, arbitration loss or timeout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusError;

pub trait I2cBus {
    /// Write `bytes` to the 7-bit address `addr` in one transaction.
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError>;
}

/// Microsecond busy-wait used by device init sequences.
pub trait DelayUs {
    fn delay_us(&mut self, us: u32);
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
        (**self).write(addr, bytes)
    }
}

#[cfg(target_arch = "avr")]
pub use avr::{Twi, SpinDelay};

#[cfg(target_arch = "avr")]
mod avr {
    use avr_device::atmega32u4::TWI;

    use super::{BusError, DelayUs, I2cBus};

    /// SCL freq = CPU_FREQ / (16 + 2 * TWBR * prescaler)
    /// 100kHz = 16MHz / (16 + 2 * 72 * 1) => TWBR = 72
    const TWBR_VALUE: u8 = 72;

    // TWI status codes
    const TW_START: u8 = 0x08;
    const TW_REP_START: u8 = 0x10;
    const TW_MT_SLA_ACK: u8 = 0x18;
    const TW_MT_DATA_ACK: u8 = 0x28;

    #[derive(Copy, Clone)]
    pub struct Twi<'a> {
        twi: &'a TWI,
    }

    impl<'a> Twi<'a> {
        /// Set the bit rate and enable the peripheral.
        pub fn new(twi: &'a TWI) -> Self {
            twi.twbr.write(|w| unsafe { w.bits(TWBR_VALUE) });
            twi.twsr.write(|w| w.twps().prescaler_1());
            twi.twcr.write(|w| w.twen().set_bit());
            Self { twi }
        }

        fn start(&self) -> Result<(), BusError> {
            self.twi
                .twcr
                .write(|w| w.twint().set_bit().twsta().set_bit().twen().set_bit());
            self.wait_twint()?;
            match self.status() {
                TW_START | TW_REP_START => Ok(()),
                _ => Err(BusError),
            }
        }

        fn send(&self, data: u8) -> Result<(), BusError> {
            self.twi.twdr.write(|w| unsafe { w.bits(data) });
            self.twi.twcr.write(|w| w.twint().set_bit().twen().set_bit());
            self.wait_twint()?;
            match self.status() {
                TW_MT_SLA_ACK | TW_MT_DATA_ACK => Ok(()),
                _ => Err(BusError),
            }
        }

        fn stop(&self) {
            self.twi
                .twcr
                .write(|w| w.twint().set_bit().twsto().set_bit().twen().set_bit());
        }

        fn status(&self) -> u8 {
            // Upper five bits hold the status, prescaler bits masked off
            self.twi.twsr.read().bits() & 0xF8
        }

        fn wait_twint(&self) -> Result<(), BusError> {
            let mut timeout: u16 = 0xFFFF;
            while self.twi.twcr.read().twint().bit_is_clear() {
                timeout = timeout.wrapping_sub(1);
                if timeout == 0 {
                    return Err(BusError);
                }
            }
            Ok(())
        }
    }

    impl I2cBus for Twi<'_> {
        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
            let result = self.start().and_then(|()| {
                self.send(addr << 1)?;
                bytes.iter().try_for_each(|&b| self.send(b))
            });
            self.stop();
            result
        }
    }

    /// Busy-wait calibrated for 16MHz.
    pub struct SpinDelay;

    impl DelayUs for SpinDelay {
        fn delay_us(&mut self, us: u32) {
            // ~4 cycles per iteration
            for _ in 0..us {
                for _ in 0..4u8 {
                    unsafe { core::arch::asm!("nop") };
                }
            }
        }
    }
}
