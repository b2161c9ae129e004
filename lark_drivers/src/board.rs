//! Board configuration for the Lark LK1040 evaluation board.
//!
//! Static data only: the part's peripheral memory map, IRQ assignments
//! and the pin-mux table. `init` publishes the register bases to the
//! drivers; it does not touch any peripheral beyond that.

use crate::{clock, ewm, gtmr, tsensor};

pub const CLKCTL_BASE: usize = 0x4002_0000;
pub const GTMR0_BASE: usize = 0x4003_8000;
pub const EWM_BASE: usize = 0x4003_9000;
pub const TSENSOR_BASE: usize = 0x4003_a000;
pub const PWM0_BASE: usize = 0x4003_b000;
pub const TPIU_BASE: usize = 0xe004_0000;

pub const IRQ_GTMR0: u16 = 23;
pub const IRQ_EWM: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// One pad routed to a peripheral function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMux {
    pub pin: u8,
    pub alt: u8,
    pub pull: Pull,
    pub signal: &'static str,
}

pub const PINMUX: &[PinMux] = &[
    PinMux { pin: 4, alt: 2, pull: Pull::Down, signal: "gtmr0_trig_in" },
    PinMux { pin: 5, alt: 2, pull: Pull::None, signal: "gtmr0_trig_out" },
    PinMux { pin: 9, alt: 1, pull: Pull::Up, signal: "ewm_out" },
    PinMux { pin: 12, alt: 3, pull: Pull::None, signal: "pwm0_out" },
    PinMux { pin: 20, alt: 7, pull: Pull::None, signal: "tpiu_traceclk" },
    PinMux { pin: 21, alt: 7, pull: Pull::None, signal: "tpiu_traced0" },
    PinMux { pin: 22, alt: 7, pull: Pull::None, signal: "tpiu_traced1" },
    PinMux { pin: 26, alt: 5, pull: Pull::None, signal: "tsensor_alert" },
];

pub fn pinmux_for(pin: u8) -> Option<&'static PinMux> {
    PINMUX.iter().find(|entry| entry.pin == pin)
}

/// Publish the peripheral base addresses for this part.
///
/// # Safety
///
/// Must run once, before any driver is used, on a part whose memory map
/// matches the constants above.
pub unsafe fn init() {
    clock::set_clk_base(CLKCTL_BASE);
    gtmr::set_gtmr_base(GTMR0_BASE);
    ewm::set_ewm_base(EWM_BASE);
    tsensor::set_tsensor_base(TSENSOR_BASE);

    log::info!("lk1040: peripheral bases published");
}
