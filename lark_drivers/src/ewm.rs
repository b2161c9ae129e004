//! EWM: external watchdog-like monitor.
//!
//! Once enabled the monitor must be serviced with the two-byte key
//! sequence inside the compare window, or it asserts its output pin. The
//! enable bit is write-once; only a part reset releases it.

use crate::clock::{self, ClockId};
use core::ptr::{read_volatile, write_volatile};

pub static mut EWM_BASE: usize = 0;

/// Publish the EWM block base address.
///
/// # Safety
///
/// `base` must be the EWM register block of this part.
pub unsafe fn set_ewm_base(base: usize) {
    write_volatile(&mut EWM_BASE, base);
}

mod registers {
    use bitflags::bitflags;
    use lark_lib::{mmio_rw, mmio_w};

    mmio_rw!(offset 0x00 => pub CTRL<Control>);
    mmio_w!(offset 0x04 => pub SERVICE<u32>);
    mmio_rw!(offset 0x08 => pub CMP_LOW<u32>);
    mmio_rw!(offset 0x0c => pub CMP_HIGH<u32>);

    bitflags! {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct Control: u32 {
            const EN = 1; // write-once until reset
            const INT_EN = 1 << 1;
            const ASSERTED = 1 << 2; // read-only status
        }
    }
}

use registers::Control;

pub const SERVICE_KEY_FIRST: u32 = 0xb4;
pub const SERVICE_KEY_SECOND: u32 = 0x2c;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub interrupt_enable: bool,
    pub window_low: u32,
    pub window_high: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            interrupt_enable: false,
            window_low: 0,
            window_high: 0xff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EwmError {
    InvalidWindow,
    AlreadyEnabled,
}

#[derive(Default)]
pub struct Ewm {
    base: usize,
}

impl Ewm {
    pub fn new() -> Self {
        let base = unsafe { read_volatile(&EWM_BASE) };
        Ewm { base }
    }

    /// Program the service window and arm the monitor.
    pub fn init(&self, config: &Config) -> Result<(), EwmError> {
        if config.window_low >= config.window_high {
            return Err(EwmError::InvalidWindow);
        }

        if registers::CTRL.read(self.base).contains(Control::EN) {
            return Err(EwmError::AlreadyEnabled);
        }

        clock::clock_enable(ClockId::Ewm, true);

        registers::CMP_LOW.write(config.window_low, self.base);
        registers::CMP_HIGH.write(config.window_high, self.base);

        let mut ctrl = Control::EN;
        if config.interrupt_enable {
            ctrl |= Control::INT_EN;
        }
        registers::CTRL.write(ctrl, self.base);

        log::debug!(
            "ewm: armed (window {:#x}..{:#x})",
            config.window_low,
            config.window_high
        );

        Ok(())
    }

    /// Feed the monitor. Both key writes must land back to back.
    pub fn service(&self) {
        registers::SERVICE.write(SERVICE_KEY_FIRST, self.base);
        registers::SERVICE.write(SERVICE_KEY_SECOND, self.base);
    }

    pub fn is_asserted(&self) -> bool {
        registers::CTRL.read(self.base).contains(Control::ASSERTED)
    }
}
