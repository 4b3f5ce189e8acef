//! 16550 UART console, bound as both console output and input.
//!
//! Built on the `uart_16550` crate's `SerialPort` rather than hand-rolled
//! register poking, since that dependency already does this job and
//! nothing here needs a from-scratch port-I/O routine to duplicate it.

use core::cell::UnsafeCell;

use uart_16550::SerialPort;
use utk_abi::{DeviceTreeNode, KernelResult};
use utk_console::{ConsoleInput, ConsoleOutput};
use utk_lib::Spinlock;
use x86_64::instructions::port::Port;

const COM1_BASE: u16 = 0x3F8;
const LSR_OFFSET: u16 = 5;
const LSR_DATA_READY: u8 = 0x01;

pub struct Uart {
    lock: Spinlock,
    port: UnsafeCell<SerialPort>,
}

// SAFETY: all access to `port` goes through `lock`.
unsafe impl Sync for Uart {}

impl Uart {
    const fn new(base: u16) -> Uart {
        Uart {
            lock: Spinlock::new(),
            port: UnsafeCell::new(unsafe { SerialPort::new(base) }),
        }
    }

    fn init(&self) {
        self.lock.acquire();
        unsafe { (*self.port.get()).init() };
        self.lock.release();
    }
}

impl ConsoleOutput for Uart {
    fn put_byte(&self, byte: u8) {
        self.lock.acquire();
        unsafe { (*self.port.get()).send(byte) };
        self.lock.release();
    }
}

impl ConsoleInput for Uart {
    /// `uart_16550::SerialPort::receive` blocks until a byte is ready, so
    /// the line-status register is polled directly first (bit 0, "data
    /// ready") to keep this non-blocking, matching
    /// [`ConsoleInput::try_read_byte`]'s contract.
    fn try_read_byte(&self) -> Option<u8> {
        self.lock.acquire();
        let mut lsr: Port<u8> = Port::new(COM1_BASE + LSR_OFFSET);
        let ready = unsafe { lsr.read() } & LSR_DATA_READY != 0;
        let byte = if ready {
            Some(unsafe { (*self.port.get()).receive() })
        } else {
            None
        };
        self.lock.release();
        byte
    }
}

static UART: Uart = Uart::new(COM1_BASE);

/// `DriverDescriptor::attach` for `compatible = "x86,uart16550"`. Binds
/// both the output and input sides of the console to the same port.
pub fn attach(_node: &dyn DeviceTreeNode) -> KernelResult<()> {
    UART.init();
    utk_console::bind_output(&UART);
    utk_console::bind_input(&UART);
    Ok(())
}
