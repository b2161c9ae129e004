//! Platform interrupt controller abstraction and IRQ handler registry.
//!
//! The board registers one [`InterruptController`] at bring-up. Drivers
//! request an IRQ line with [`register_handler`], then gate it with
//! [`enable_irq`]/[`disable_irq`]. The architecture vector (or a test)
//! routes a taken interrupt to the owning driver through [`handle_irq`].
//!
//! A driver must finish its registration writes before it enables the
//! line; that ordering is what makes the handler's view of driver state
//! coherent without a lock shared with interrupt context.

use crate::sync::mutex::Mutex;
use alloc::{boxed::Box, collections::BTreeMap};

/// IRQ numbers at or above this bound are rejected by [`register_handler`].
pub const MAX_IRQ: u16 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqTrigger {
    Level,
    Edge,
}

/// Per-line configuration handed to the controller when a handler is
/// requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqConfig {
    pub trigger: IrqTrigger,
    pub priority: u8,
}

pub trait InterruptController: Send {
    /// Apply trigger type and priority for one line.
    fn configure_irq(&mut self, irq: u16, config: &IrqConfig);

    fn enable_irq(&mut self, irq: u16);

    fn disable_irq(&mut self, irq: u16);
}

struct IrqHandler {
    name: &'static str,
    handler: Box<dyn FnMut(u16) + Send>,
}

static CONTROLLER: Mutex<Option<Box<dyn InterruptController>>> = Mutex::new(None);
static HANDLERS: Mutex<BTreeMap<u16, IrqHandler>> = Mutex::new(BTreeMap::new());

/// Install the platform interrupt controller. Called once at board
/// bring-up, before any driver enables its line.
pub fn register_controller(controller: Box<dyn InterruptController>) {
    let mut guard = CONTROLLER.lock();

    if guard.is_some() {
        log::warn!("interrupt: replacing the registered controller");
    }

    *guard = Some(controller);
}

/// Request an IRQ line. A line already owned by a handler is handed over
/// to the new one, so a driver's configure path may run repeatedly.
pub fn register_handler(
    irq: u16,
    name: &'static str,
    handler: Box<dyn FnMut(u16) + Send>,
    config: IrqConfig,
) -> Result<(), &'static str> {
    if irq >= MAX_IRQ {
        return Err("IRQ number out of range");
    }

    {
        let mut handlers = HANDLERS.lock();
        if let Some(prev) = handlers.insert(irq, IrqHandler { name, handler }) {
            log::debug!("interrupt: IRQ #{irq} handed over from {}", prev.name);
        }
    }

    let mut controller = CONTROLLER.lock();
    if let Some(controller) = controller.as_mut() {
        controller.configure_irq(irq, &config);
    }

    Ok(())
}

/// Release an IRQ line. The caller is expected to have disabled it.
pub fn unregister_handler(irq: u16) {
    let mut handlers = HANDLERS.lock();
    if handlers.remove(&irq).is_none() {
        log::debug!("interrupt: IRQ #{irq} was not registered");
    }
}

pub fn enable_irq(irq: u16) {
    let mut controller = CONTROLLER.lock();

    if let Some(controller) = controller.as_mut() {
        controller.enable_irq(irq);
    } else {
        log::warn!("interrupt: no controller; IRQ #{irq} stays disabled");
    }
}

pub fn disable_irq(irq: u16) {
    let mut controller = CONTROLLER.lock();

    if let Some(controller) = controller.as_mut() {
        controller.disable_irq(irq);
    } else {
        log::warn!("interrupt: no controller; IRQ #{irq} cannot be disabled");
    }
}

/// Route a taken interrupt to the registered handler.
pub fn handle_irq(irq: u16) {
    let mut handlers = HANDLERS.lock();

    if let Some(entry) = handlers.get_mut(&irq) {
        (entry.handler)(irq);
    } else {
        log::warn!("interrupt: unhandled IRQ #{irq}");
    }
}
