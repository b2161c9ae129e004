//! On-die temperature sensor.
//!
//! The data register packs a 12-bit code and a validity bit; fields are
//! picked apart with explicit shift/mask constants rather than a bitfield
//! layout, so the packing is the same on every compiler and target.

use crate::clock::{self, ClockId};
use core::ptr::{read_volatile, write_volatile};

pub static mut TSENSOR_BASE: usize = 0;

/// Publish the temperature sensor block base address.
///
/// # Safety
///
/// `base` must be the temperature sensor register block of this part.
pub unsafe fn set_tsensor_base(base: usize) {
    write_volatile(&mut TSENSOR_BASE, base);
}

mod registers {
    use lark_lib::{mmio_r, mmio_rw};

    mmio_rw!(offset 0x00 => pub CTRL<u32>);
    mmio_r!(offset 0x04 => pub DATA<u32>);
}

const CTRL_POWER: u32 = 1;
const CTRL_EN: u32 = 1 << 1;

const DATA_VALID: u32 = 1 << 31;
const DATA_CODE_MASK: u32 = 0xfff;

// Linear code-to-temperature transfer: 0x800 reads 25 C, one code is
// 0.125 C.
const ANCHOR_CODE: i32 = 0x800;
const ANCHOR_MILLICELSIUS: i32 = 25_000;
const MILLICELSIUS_PER_CODE: i32 = 125;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsensorError {
    /// No valid sample yet; the sensor needs a conversion period after
    /// `enable`.
    NotReady,
}

#[derive(Default)]
pub struct Tsensor {
    base: usize,
}

impl Tsensor {
    pub fn new() -> Self {
        let base = unsafe { read_volatile(&TSENSOR_BASE) };
        Tsensor { base }
    }

    /// Power the sensor up and start converting.
    pub fn enable(&self) {
        clock::clock_enable(ClockId::Tsensor, true);
        registers::CTRL.setbits(CTRL_POWER, self.base);
        registers::CTRL.setbits(CTRL_EN, self.base);
    }

    pub fn disable(&self) {
        registers::CTRL.clrbits(CTRL_EN, self.base);
        registers::CTRL.clrbits(CTRL_POWER, self.base);
        clock::clock_enable(ClockId::Tsensor, false);
    }

    /// Latest die temperature in millidegrees Celsius.
    pub fn read_millicelsius(&self) -> Result<i32, TsensorError> {
        let data = registers::DATA.read(self.base);

        if data & DATA_VALID == 0 {
            return Err(TsensorError::NotReady);
        }

        Ok(code_to_millicelsius(data & DATA_CODE_MASK))
    }
}

fn code_to_millicelsius(code: u32) -> i32 {
    (code as i32 - ANCHOR_CODE) * MILLICELSIUS_PER_CODE + ANCHOR_MILLICELSIUS
}
