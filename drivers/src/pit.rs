//! Intel 8253/8254 PIT, bound into the MAIN timer slot.
//!
//! Frequency/divisor calculation and channel 0 square-wave mode, built on
//! `x86_64::Port` rather than raw `io::outb` calls, and exposed behind
//! [`TimerDriverOps`] instead of a hand-written
//! `pit_set_frequency`/`pit_enable_irq` pair.

use core::sync::atomic::{AtomicBool, AtomicPtr, AtomicU32, AtomicU64, Ordering};

use utk_abi::traits::{DayTime, TimerDriverOps};
use utk_abi::{DeviceTreeNode, KernelConfig, KernelResult};
use x86_64::instructions::port::Port;

pub const PIT_BASE_FREQUENCY_HZ: u32 = 1_193_182;
pub const PIT_DEFAULT_FREQUENCY_HZ: u32 = 100;

const PIT_CHANNEL0_PORT: u16 = 0x40;
const PIT_COMMAND_PORT: u16 = 0x43;

const PIT_COMMAND_CHANNEL0: u8 = 0x00;
const PIT_COMMAND_ACCESS_LOHI: u8 = 0x30;
const PIT_COMMAND_MODE_SQUARE: u8 = 0x06;
const PIT_COMMAND_BINARY: u8 = 0x00;

const PIT_IRQ: u8 = 0;

fn outb(port: u16, value: u8) {
    let mut p: Port<u8> = Port::new(port);
    unsafe { p.write(value) };
}

fn io_wait() {
    outb(0x80, 0);
}

pub struct Pit {
    frequency_hz: AtomicU32,
    ticks: AtomicU64,
    tick_handler: AtomicPtr<()>,
    enabled: AtomicBool,
}

impl Pit {
    const fn new() -> Pit {
        Pit {
            frequency_hz: AtomicU32::new(PIT_DEFAULT_FREQUENCY_HZ),
            ticks: AtomicU64::new(0),
            tick_handler: AtomicPtr::new(core::ptr::null_mut()),
            enabled: AtomicBool::new(false),
        }
    }

    fn program(&self, mut frequency_hz: u32) {
        if frequency_hz == 0 {
            frequency_hz = PIT_DEFAULT_FREQUENCY_HZ;
        }
        if frequency_hz > PIT_BASE_FREQUENCY_HZ {
            frequency_hz = PIT_BASE_FREQUENCY_HZ;
        }
        let mut divisor = PIT_BASE_FREQUENCY_HZ / frequency_hz;
        if divisor == 0 {
            divisor = 1;
        } else if divisor > 0xFFFF {
            divisor = 0xFFFF;
        }
        let actual_freq = PIT_BASE_FREQUENCY_HZ / divisor;
        self.frequency_hz.store(actual_freq, Ordering::SeqCst);

        outb(
            PIT_COMMAND_PORT,
            PIT_COMMAND_CHANNEL0
                | PIT_COMMAND_ACCESS_LOHI
                | PIT_COMMAND_MODE_SQUARE
                | PIT_COMMAND_BINARY,
        );
        outb(PIT_CHANNEL0_PORT, (divisor & 0xFF) as u8);
        outb(PIT_CHANNEL0_PORT, ((divisor >> 8) & 0xFF) as u8);
        io_wait();
    }

    /// The IRQ0 handler registered by [`attach`]: this is the actual
    /// hardware ISR, which bumps the tick counter and forwards to
    /// whatever tick handler the timer layer installed via
    /// [`TimerDriverOps::set_tick_handler`].
    fn on_irq(&self, _line: u8) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let raw = self.tick_handler.load(Ordering::Acquire);
        if !raw.is_null() {
            let f: fn() = unsafe { core::mem::transmute(raw) };
            f();
        }
        let _ = utk_interrupt::int_irq_eoi(PIT_IRQ);
    }
}

impl TimerDriverOps for Pit {
    fn frequency_hz(&self) -> u64 {
        self.frequency_hz.load(Ordering::SeqCst) as u64
    }

    fn time_ns(&self) -> u64 {
        let freq = self.frequency_hz();
        if freq == 0 {
            return 0;
        }
        self.ticks
            .load(Ordering::Relaxed)
            .saturating_mul(1_000_000_000)
            / freq
    }

    /// The PIT has no settable epoch; only the RTC/LIFETIME drivers need to
    /// support `set_time_ns`, so MAIN silently ignores it.
    fn set_time_ns(&self, _ns: u64) {}

    fn date(&self) -> DayTime {
        DayTime::default()
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        let _ = utk_interrupt::int_irq_mask(PIT_IRQ, true);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        let _ = utk_interrupt::int_irq_mask(PIT_IRQ, false);
    }

    fn set_tick_handler(&self, handler: fn()) {
        self.tick_handler
            .store(handler as *mut (), Ordering::Release);
    }

    fn remove_tick_handler(&self) {
        self.tick_handler
            .store(core::ptr::null_mut(), Ordering::Release);
    }
}

static PIT: Pit = Pit::new();

static PIT_IRQ_REGISTERED: AtomicBool = AtomicBool::new(false);

fn pit_irq_trampoline(line: u8) {
    PIT.on_irq(line);
}

/// `DriverDescriptor::attach` for `compatible = "x86,pit"`. Reads an
/// optional `clock-frequency` property (single byte count in kHz, falling
/// back to [`PIT_DEFAULT_FREQUENCY_HZ`]), programs the divisor, registers
/// the hardware IRQ0 handler, and binds into the MAIN slot.
pub fn attach(node: &dyn DeviceTreeNode) -> KernelResult<()> {
    use crate::props::byte_prop;

    let frequency_hz = byte_prop(node, "clock-frequency")
        .map(|khz| khz as u32 * 1000)
        .unwrap_or(PIT_DEFAULT_FREQUENCY_HZ);
    PIT.program(frequency_hz);

    if !PIT_IRQ_REGISTERED.swap(true, Ordering::SeqCst) {
        let cfg = KernelConfig::default();
        utk_interrupt::int_irq_register(&cfg, PIT_IRQ, pit_irq_trampoline)?;
    }

    utk_timer::bind(
        utk_timer::TimerSlot::Main,
        &PIT,
        utk_timer::main_tick_handler,
    )
}
