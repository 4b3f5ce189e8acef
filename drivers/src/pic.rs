//! Classic 8259 PIC interrupt controller.
//!
//! "Configure once from device-tree properties, then serve
//! `InterruptController` calls off atomics", targeting the legacy
//! dual-8259 pair (`compatible = "x86,x86-pic"`) rather than an APIC/
//! IOAPIC pair. Port access goes through `x86_64::Port`, matching the
//! rest of this workspace (`utk-panic::shutdown`).

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, Ordering};

use utk_abi::traits::{InterruptController, SpuriousStatus};
use utk_abi::{DeviceTreeNode, KernelError, KernelResult};
use x86_64::instructions::port::Port;

const ICW1_INIT: u8 = 0x11;
const ICW4_8086: u8 = 0x01;
const PIC_EOI: u8 = 0x20;

/// Read in-service register: OCW3 with the ISR-read bit set.
const OCW3_READ_ISR: u8 = 0x0B;

const SPURIOUS_MASTER_IRQ: u8 = 7;
const SPURIOUS_SLAVE_IRQ: u8 = 15;

fn outb(port: u16, value: u8) {
    let mut p: Port<u8> = Port::new(port);
    unsafe { p.write(value) };
}

fn inb(port: u16) -> u8 {
    let mut p: Port<u8> = Port::new(port);
    unsafe { p.read() }
}

fn io_wait() {
    outb(0x80, 0);
}

pub struct Pic8259 {
    offset: AtomicU8,
    master_cmd: AtomicU16,
    master_data: AtomicU16,
    slave_cmd: AtomicU16,
    slave_data: AtomicU16,
    chained: AtomicBool,
    configured: AtomicBool,
}

impl Pic8259 {
    const fn new() -> Pic8259 {
        Pic8259 {
            offset: AtomicU8::new(0x20),
            master_cmd: AtomicU16::new(0x20),
            master_data: AtomicU16::new(0x21),
            slave_cmd: AtomicU16::new(0xA0),
            slave_data: AtomicU16::new(0xA1),
            chained: AtomicBool::new(false),
            configured: AtomicBool::new(false),
        }
    }

    fn configure(&self, offset: u8, comm: [u8; 4], chained: bool) {
        self.offset.store(offset, Ordering::SeqCst);
        self.master_cmd.store(comm[0] as u16, Ordering::SeqCst);
        self.master_data.store(comm[1] as u16, Ordering::SeqCst);
        self.slave_cmd.store(comm[2] as u16, Ordering::SeqCst);
        self.slave_data.store(comm[3] as u16, Ordering::SeqCst);
        self.chained.store(chained, Ordering::SeqCst);

        let master_cmd = self.master_cmd.load(Ordering::SeqCst);
        let master_data = self.master_data.load(Ordering::SeqCst);
        let slave_cmd = self.slave_cmd.load(Ordering::SeqCst);
        let slave_data = self.slave_data.load(Ordering::SeqCst);

        // Save the current masks, run the ICW1-4 sequence, then restore
        // them masked (all interrupts start masked; drivers unmask their
        // own line through `mask`).
        outb(master_cmd, ICW1_INIT);
        io_wait();
        outb(slave_cmd, ICW1_INIT);
        io_wait();
        outb(master_data, offset);
        io_wait();
        outb(slave_data, offset.wrapping_add(8));
        io_wait();
        outb(master_data, 0x04); // tell master a slave sits on IRQ2
        io_wait();
        outb(slave_data, 0x02); // tell slave its cascade identity
        io_wait();
        outb(master_data, ICW4_8086);
        io_wait();
        outb(slave_data, ICW4_8086);
        io_wait();

        outb(master_data, 0xFF);
        outb(slave_data, 0xFF);

        self.configured.store(true, Ordering::SeqCst);
    }

    fn in_service_register(&self, port: u16) -> u8 {
        outb(port, OCW3_READ_ISR);
        inb(port)
    }
}

impl InterruptController for Pic8259 {
    fn mask(&self, irq: u8, enabled: bool) {
        let (port, bit) = if irq < 8 {
            (self.master_data.load(Ordering::SeqCst), irq)
        } else {
            (self.slave_data.load(Ordering::SeqCst), irq - 8)
        };
        let mut value = inb(port);
        if enabled {
            value &= !(1 << bit);
        } else {
            value |= 1 << bit;
        }
        outb(port, value);
    }

    fn eoi(&self, irq: u8) {
        if irq >= 8 && self.chained.load(Ordering::SeqCst) {
            outb(self.slave_cmd.load(Ordering::SeqCst), PIC_EOI);
        }
        outb(self.master_cmd.load(Ordering::SeqCst), PIC_EOI);
    }

    /// A spurious IRQ7/IRQ15 is signalled by the CPU but absent from the
    /// in-service register (glossary "Spurious interrupt").
    fn spurious_check(&self, interrupt_number: u8) -> SpuriousStatus {
        let offset = self.offset.load(Ordering::SeqCst);
        let irq = interrupt_number.wrapping_sub(offset);
        if irq == SPURIOUS_MASTER_IRQ {
            let isr = self.in_service_register(self.master_cmd.load(Ordering::SeqCst));
            if isr & (1 << SPURIOUS_MASTER_IRQ) == 0 {
                return SpuriousStatus::Spurious;
            }
        } else if irq == SPURIOUS_SLAVE_IRQ && self.chained.load(Ordering::SeqCst) {
            let isr = self.in_service_register(self.slave_cmd.load(Ordering::SeqCst));
            if isr & (1 << (SPURIOUS_SLAVE_IRQ - 8)) == 0 {
                return SpuriousStatus::Spurious;
            }
        }
        SpuriousStatus::Regular
    }

    fn irq_to_line(&self, irq: u8) -> u8 {
        self.offset.load(Ordering::SeqCst).wrapping_add(irq)
    }
}

static PIC: Pic8259 = Pic8259::new();

/// `DriverDescriptor::attach` for `compatible = "x86,x86-pic"`. Parses `int-offset`, `comm`, and `is-chained`/
/// `interrupt-controller`, then installs the controller.
pub fn attach(node: &dyn DeviceTreeNode) -> KernelResult<()> {
    use crate::props::{byte_prop, bytes_prop, flag_prop};

    if !flag_prop(node, "interrupt-controller") {
        return Err(KernelError::IncorrectValue);
    }
    let offset = byte_prop(node, "int-offset").ok_or(KernelError::IncorrectValue)?;
    let comm = bytes_prop(node, "comm").ok_or(KernelError::IncorrectValue)?;
    if comm.len() != 4 {
        return Err(KernelError::IncorrectValue);
    }
    let chained = flag_prop(node, "is-chained");

    PIC.configure(offset, [comm[0], comm[1], comm[2], comm[3]], chained);
    utk_interrupt::set_interrupt_controller(&PIC);
    Ok(())
}
