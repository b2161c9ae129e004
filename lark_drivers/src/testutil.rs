//! Shared test support: a heap-backed register block standing in for a
//! peripheral, a recording interrupt controller, and a lock serializing
//! tests that publish a global register base.

use lark_lib::interrupt::{self, InterruptController, IrqConfig};
use std::cell::UnsafeCell;
use std::collections::BTreeMap;
use std::ptr::{read_volatile, write_volatile};
use std::sync::{Arc, Mutex, MutexGuard};

static HW_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that share the driver statics (register bases, the
/// callback table, the interrupt registry).
pub fn lock_hw() -> MutexGuard<'static, ()> {
    HW_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// A fake peripheral register block: `words` 32-bit registers on the heap.
/// Drivers access it through the published base address; tests peek and
/// poke through `read`/`write`.
pub struct RegBlock {
    words: Box<[UnsafeCell<u32>]>,
}

impl RegBlock {
    pub fn new(words: usize) -> Self {
        let words = (0..words).map(|_| UnsafeCell::new(0)).collect();
        RegBlock { words }
    }

    pub fn base(&self) -> usize {
        self.words.as_ptr() as usize
    }

    pub fn read(&self, index: usize) -> u32 {
        unsafe { read_volatile(self.words[index].get()) }
    }

    pub fn write(&self, index: usize, value: u32) {
        unsafe { write_volatile(self.words[index].get(), value) }
    }
}

#[derive(Debug, Default)]
pub struct IntcState {
    pub enabled: BTreeMap<u16, bool>,
    pub configured: BTreeMap<u16, IrqConfig>,
}

impl IntcState {
    pub fn is_enabled(&self, irq: u16) -> bool {
        self.enabled.get(&irq).copied().unwrap_or(false)
    }
}

struct MockIntc {
    state: Arc<Mutex<IntcState>>,
}

impl InterruptController for MockIntc {
    fn configure_irq(&mut self, irq: u16, config: &IrqConfig) {
        self.state.lock().unwrap().configured.insert(irq, *config);
    }

    fn enable_irq(&mut self, irq: u16) {
        self.state.lock().unwrap().enabled.insert(irq, true);
    }

    fn disable_irq(&mut self, irq: u16) {
        self.state.lock().unwrap().enabled.insert(irq, false);
    }
}

/// Install a recording interrupt controller and hand back its state.
pub fn install_mock_intc() -> Arc<Mutex<IntcState>> {
    let state = Arc::new(Mutex::new(IntcState::default()));
    interrupt::register_controller(Box::new(MockIntc {
        state: state.clone(),
    }));
    state
}
