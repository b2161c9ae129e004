//! GTMR: free-running trigger timer.
//!
//! A 32-bit up-counter per instance. The counter runs from a programmable
//! start value; reaching the trigger-count value while the trigger engine
//! is armed raises a trigger pulse for dependent peripherals, and wrapping
//! past `0xffff_ffff` reloads the start value and latches the overflow
//! flag, the unit's sole interrupt condition.
//!
//! Lifecycle per instance:
//! uninitialized → configured ([`Gtmr::init`]/[`Gtmr::set_config`]) →
//! running ([`Gtmr::start_counter`]) ⇄ stopped ([`Gtmr::stop_counter`]) →
//! uninitialized ([`Gtmr::deinit`]). Reconfiguring is legal from any
//! initialized state and resets the counter; reconfiguring a live instance
//! with its interrupt enabled is not safe, so disable the line first.
//!
//! The trigger engine is armed by [`Gtmr::start_counter`]'s software pulse
//! (software source) or an external pulse (hardware source). In one-shot
//! mode each trigger disarms the engine and [`Gtmr::gen_once_trigger`]
//! must re-arm it; in continuous mode it re-fires every period and
//! `gen_once_trigger` is harmless.

use crate::clock::{self, ClockId};
use alloc::boxed::Box;
use core::ptr::{read_volatile, write_volatile};
use lark_lib::{
    interrupt::{self, IrqConfig, IrqTrigger},
    sync::mutex::Mutex,
};

pub const INSTANCE_COUNT: usize = 1;

const INSTANCE_STRIDE: usize = 0x1000;
const GTMR_IRQS: [u16; INSTANCE_COUNT] = [crate::board::IRQ_GTMR0];
const GTMR_CLOCKS: [ClockId; INSTANCE_COUNT] = [ClockId::Gtmr0];
const IRQ_NAMES: [&str; INSTANCE_COUNT] = ["gtmr0"];

pub static mut GTMR_BASE: usize = 0;

/// Publish the GTMR block base address.
///
/// # Safety
///
/// `base` must be the GTMR register block of this part.
pub unsafe fn set_gtmr_base(base: usize) {
    write_volatile(&mut GTMR_BASE, base);
}

mod registers {
    use bitflags::bitflags;
    use lark_lib::{mmio_r, mmio_rw};

    mmio_rw!(offset 0x00 => pub CTRL<Control>);
    mmio_rw!(offset 0x04 => pub STATUS<Status>);
    mmio_rw!(offset 0x08 => pub START_COUNT<u32>);
    mmio_r!(offset 0x0c => pub CURRENT_COUNT<u32>);
    mmio_rw!(offset 0x10 => pub TRIGGER_COUNT<u32>);

    bitflags! {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct Control: u32 {
            const INT_EN = 1; // overflow interrupt enable
            const MODULE_EN = 1 << 1;
            const TRIG_SRC_SOFT = 1 << 2; // 1: software trigger source
            const STOP = 1 << 8; // hold the count without disabling
            const SW_TRIG = 1 << 16; // software trigger pulse, self-clearing
            const ONCE_REQ = 1 << 29; // one-shot re-arm request, self-clearing
            const CONTINUOUS = 1 << 30;
            const TRIG_FLAG = 1 << 31; // latched; write one then zero to clear
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct Status: u32 {
            const CNT_RESET = 1; // reload from START_COUNT, self-clearing
            const FULL = 1 << 31; // overflow; latched; write one then zero to clear
        }
    }
}

use registers::{Control, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    Hardware,
    Software,
}

pub type Callback = Box<dyn FnMut() + Send>;

pub struct Config {
    pub trigger_mode: TriggerMode,
    pub interrupt_enable: bool,
    pub continuous: bool,
    pub start_value: u32,
    /// Compared against the running count to raise trigger pulses. The
    /// driver does not check it against `start_value`; a trigger value at
    /// or below the start value silently never matches before wrap-around.
    pub trigger_value: u32,
    pub callback: Option<Callback>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trigger_mode: TriggerMode::Hardware,
            interrupt_enable: false,
            continuous: false,
            start_value: 0,
            trigger_value: 0,
            callback: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GtmrError {
    UnsupportedInstance,
}

const NO_CALLBACK: Option<Callback> = None;

/// One overflow-callback slot per instance, written by the configuring
/// context and read by the interrupt handler. Configuration completes the
/// slot write before the line is enabled at the controller.
static REGISTRATIONS: Mutex<[Option<Callback>; INSTANCE_COUNT]> =
    Mutex::new([NO_CALLBACK; INSTANCE_COUNT]);

pub struct Gtmr {
    instance: usize,
    base: usize,
}

impl Gtmr {
    /// Handle to one timer unit.
    ///
    /// Panics if `instance` is out of range; a correctly integrated system
    /// never constructs one.
    pub fn new(instance: usize) -> Self {
        assert!(instance < INSTANCE_COUNT, "GTMR instance out of range");

        let base = unsafe { read_volatile(&GTMR_BASE) } + instance * INSTANCE_STRIDE;
        Gtmr { instance, base }
    }

    /// Gate the peripheral clock on and apply `config`.
    pub fn init(&self, config: Config) {
        clock::clock_enable(GTMR_CLOCKS[self.instance], true);
        self.set_config(config);
    }

    /// Apply a full configuration. The callback slot and handler
    /// registration are written before the interrupt line state changes,
    /// and the register block is cleared before the count values are
    /// programmed.
    pub fn set_config(&self, config: Config) {
        let irq = GTMR_IRQS[self.instance];

        {
            let mut slots = REGISTRATIONS.lock();
            slots[self.instance] = config.callback;
        }

        let instance = self.instance;
        let _ = interrupt::register_handler(
            irq,
            IRQ_NAMES[self.instance],
            Box::new(move |_irq| overflow_isr(instance)),
            IrqConfig {
                trigger: IrqTrigger::Level,
                priority: 1,
            },
        );

        self.reset_registers();

        if config.interrupt_enable {
            registers::CTRL.setbits(Control::INT_EN, self.base);
            interrupt::enable_irq(irq);
        } else {
            registers::CTRL.clrbits(Control::INT_EN, self.base);
            interrupt::disable_irq(irq);
        }

        match config.trigger_mode {
            TriggerMode::Software => registers::CTRL.setbits(Control::TRIG_SRC_SOFT, self.base),
            TriggerMode::Hardware => registers::CTRL.clrbits(Control::TRIG_SRC_SOFT, self.base),
        }

        registers::START_COUNT.write(config.start_value, self.base);
        registers::TRIGGER_COUNT.write(config.trigger_value, self.base);

        if config.continuous {
            registers::CTRL.setbits(Control::CONTINUOUS, self.base);
        } else {
            registers::CTRL.clrbits(Control::CONTINUOUS, self.base);
        }

        log::debug!(
            "gtmr{}: configured (start {:#x}, trigger {:#x})",
            self.instance,
            config.start_value,
            config.trigger_value
        );
    }

    /// Enable the module. With the software trigger source selected this
    /// also issues the first trigger pulse; a hardware source is left to
    /// the external trigger line.
    pub fn start_counter(&self) {
        registers::CTRL.setbits(Control::MODULE_EN, self.base);

        if registers::CTRL
            .read(self.base)
            .contains(Control::TRIG_SRC_SOFT)
        {
            registers::CTRL.setbits(Control::SW_TRIG, self.base);
        }
    }

    /// `stop == true` holds the count; `false` resumes from the held
    /// value. The module stays enabled either way.
    pub fn stop_counter(&self, stop: bool) {
        if stop {
            registers::CTRL.setbits(Control::STOP, self.base);
        } else {
            registers::CTRL.clrbits(Control::STOP, self.base);
        }
    }

    /// Re-arm the trigger engine after a one-shot trigger. Without this
    /// call a one-shot configuration produces no further trigger pulses.
    pub fn gen_once_trigger(&self) {
        registers::CTRL.setbits(Control::ONCE_REQ, self.base);
    }

    /// Release the latched trigger-occurred flag.
    pub fn clear_trigger_flag(&self) {
        registers::CTRL.setbits(Control::TRIG_FLAG, self.base);
        registers::CTRL.clrbits(Control::TRIG_FLAG, self.base);
    }

    /// Release the latched overflow flag.
    pub fn clear_int_flag(&self) {
        registers::STATUS.write(Status::FULL, self.base);
        registers::STATUS.write(Status::empty(), self.base);
    }

    /// Reload the counter from the configured start value. The module
    /// enable state is untouched.
    pub fn counter_reset(&self) {
        registers::STATUS.write(Status::CNT_RESET, self.base);
    }

    pub fn counter_value(&self) -> u32 {
        registers::CURRENT_COUNT.read(self.base)
    }

    pub fn trigger_flag(&self) -> bool {
        registers::CTRL.read(self.base).contains(Control::TRIG_FLAG)
    }

    pub fn overflow_flag(&self) -> bool {
        registers::STATUS.read(self.base).contains(Status::FULL)
    }

    /// Tear the instance down: interrupt line off, handler released,
    /// module disabled, registers cleared, clock gated off. `init` is
    /// required before the instance is used again.
    pub fn deinit(&self) {
        let irq = GTMR_IRQS[self.instance];

        interrupt::disable_irq(irq);
        interrupt::unregister_handler(irq);

        registers::CTRL.clrbits(Control::MODULE_EN, self.base);
        self.reset_registers();

        {
            let mut slots = REGISTRATIONS.lock();
            slots[self.instance] = None;
        }

        clock::clock_enable(GTMR_CLOCKS[self.instance], false);
    }

    fn reset_registers(&self) {
        registers::CTRL.write(Control::empty(), self.base);
        registers::START_COUNT.write(0, self.base);
        registers::TRIGGER_COUNT.write(0, self.base);
        registers::STATUS.write(Status::CNT_RESET | Status::FULL, self.base);
        registers::STATUS.write(Status::empty(), self.base);
    }
}

/// Replace the overflow callback for `instance`. Unlike the configure
/// path, which treats a bad instance as a fatal precondition, installing
/// a callback reports bad arguments to the caller.
pub fn install_callback(instance: usize, callback: Callback) -> Result<(), GtmrError> {
    if instance >= INSTANCE_COUNT {
        return Err(GtmrError::UnsupportedInstance);
    }

    let mut slots = REGISTRATIONS.lock();
    slots[instance] = Some(callback);

    Ok(())
}

/// Overflow interrupt entry. Runs the installed callback, then
/// acknowledges the flag whether or not one was installed so an empty
/// registration cannot leave the line screaming.
fn overflow_isr(instance: usize) {
    {
        let mut slots = REGISTRATIONS.lock();
        if let Some(callback) = slots[instance].as_mut() {
            callback();
        }
    }

    let base = unsafe { read_volatile(&GTMR_BASE) } + instance * INSTANCE_STRIDE;
    registers::STATUS.write(Status::FULL, base);
    registers::STATUS.write(Status::empty(), base);
}
