//! Panic report rendering.
//!
//! Renders through fixed-size `core::fmt::Write` targets, since the
//! allocator may itself be the thing that's broken. No framebuffer driver
//! is in scope here (`utk-drivers` stops at PIC/PIT/RTC/UART), so "switch
//! the console to a dedicated colour scheme" is realized as an ANSI SGR
//! escape (reverse-video red) around the report banner rather than a VGA
//! palette swap, the same "unmistakably a panic" property over a
//! text-only console.

use core::fmt::{self, Write};

use utk_abi::VcpuRegisters;
use utk_sched::ThreadDiag;

use crate::backtrace::Frame;
use crate::state::PanicFrame;

const PANIC_BANNER_ON: &str = "\x1b[41;97m";
const PANIC_BANNER_OFF: &str = "\x1b[0m";

/// A fixed-capacity line buffer, since the heap may not exist or may
/// itself be the cause of the panic.
pub struct LineBuffer {
    buf: [u8; 256],
    len: usize,
}

impl LineBuffer {
    pub const fn new() -> LineBuffer {
        LineBuffer {
            buf: [0; 256],
            len: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        // SAFETY: only ever written through `Write::write_str`, which
        // copies from an existing valid `&str`.
        unsafe { core::str::from_utf8_unchecked(&self.buf[..self.len]) }
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

impl Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let available = self.buf.len() - self.len;
        let to_copy = bytes.len().min(available);
        self.buf[self.len..self.len + to_copy].copy_from_slice(&bytes[..to_copy]);
        self.len += to_copy;
        Ok(())
    }
}

fn write_line(buf: &mut LineBuffer, args: fmt::Arguments<'_>) {
    buf.clear();
    let _ = buf.write_fmt(args);
    utk_console::console_write_unlocked(buf.as_str());
    utk_console::console_write_unlocked("\n");
}

/// Decode the subset of RFLAGS worth rendering as mnemonics rather than a
/// bare hex value.
fn flag_mnemonics(buf: &mut LineBuffer, rflags: u64) {
    const BITS: &[(u64, &str)] = &[
        (1 << 0, "CF"),
        (1 << 2, "PF"),
        (1 << 4, "AF"),
        (1 << 6, "ZF"),
        (1 << 7, "SF"),
        (1 << 8, "TF"),
        (1 << 9, "IF"),
        (1 << 10, "DF"),
        (1 << 11, "OF"),
    ];
    buf.clear();
    let _ = write!(buf, "flags: ");
    for &(mask, name) in BITS {
        if rflags & mask != 0 {
            let _ = write!(buf, "{name} ");
        }
    }
    utk_console::console_write_unlocked(buf.as_str());
    utk_console::console_write_unlocked("\n");
}

fn registers(buf: &mut LineBuffer, regs: &VcpuRegisters) {
    write_line(
        buf,
        format_args!(
            "rax={:016x} rbx={:016x} rcx={:016x} rdx={:016x}",
            regs.rax, regs.rbx, regs.rcx, regs.rdx
        ),
    );
    write_line(
        buf,
        format_args!(
            "rsi={:016x} rdi={:016x} rbp={:016x} rsp={:016x}",
            regs.rsi, regs.rdi, regs.rbp, regs.rsp
        ),
    );
    write_line(
        buf,
        format_args!(
            "r8 ={:016x} r9 ={:016x} r10={:016x} r11={:016x}",
            regs.r8, regs.r9, regs.r10, regs.r11
        ),
    );
    write_line(
        buf,
        format_args!(
            "r12={:016x} r13={:016x} r14={:016x} r15={:016x}",
            regs.r12, regs.r13, regs.r14, regs.r15
        ),
    );
    write_line(
        buf,
        format_args!(
            "rip={:016x} cs={:04x} ss={:04x} cr3={:016x}",
            regs.rip, regs.cs, regs.ss, regs.cr3
        ),
    );
    flag_mnemonics(buf, regs.rflags);
}

fn backtrace(buf: &mut LineBuffer, frames: &[Frame], count: usize) {
    if count == 0 {
        write_line(buf, format_args!("backtrace: <empty>"));
        return;
    }
    write_line(buf, format_args!("backtrace (most recent call first):"));
    for (i, frame) in frames[..count].iter().enumerate() {
        write_line(
            buf,
            format_args!(
                " #{i} rbp={:016x} rip={:016x}",
                frame.frame_pointer, frame.return_address
            ),
        );
    }
}

/// Renders every field of a panic report, in a fixed order. `location`/
/// `message` come straight from `core::panic::PanicInfo`; `code` is
/// whatever [`crate::set_panic_code`] left behind, if anything.
#[allow(clippy::too_many_arguments)]
pub fn render(
    frame: Option<&PanicFrame>,
    thread: Option<&ThreadDiag>,
    cpu: usize,
    uptime_ns: u64,
    location_file: Option<&str>,
    location_line: u32,
    message: fmt::Arguments<'_>,
    code: Option<i64>,
    backtrace_frames: &[Frame],
    backtrace_count: usize,
) {
    let mut buf = LineBuffer::new();

    utk_console::console_write_unlocked(PANIC_BANNER_ON);
    write_line(&mut buf, format_args!("=== KERNEL PANIC ==="));

    if let Some(frame) = frame {
        if let Some(id) = frame.interrupt_id {
            write_line(&mut buf, format_args!("interrupt id: {id}"));
        }
        if let Some(code) = frame.error_code {
            write_line(&mut buf, format_args!("error code: 0x{code:x}"));
        }
        write_line(
            &mut buf,
            format_args!("faulting rip: 0x{:016x}", frame.registers.rip),
        );
        registers(&mut buf, &frame.registers);
    }

    write_line(&mut buf, format_args!("cpu: {cpu}"));
    write_line(&mut buf, format_args!("uptime: {uptime_ns} ns"));

    match thread {
        Some(t) => write_line(
            &mut buf,
            format_args!(
                "thread: {} (index={}, gen={})",
                t.name,
                t.id.index(),
                t.id.generation()
            ),
        ),
        None => write_line(&mut buf, format_args!("thread: <none current>")),
    }

    match location_file {
        Some(file) => write_line(&mut buf, format_args!("{file}:{location_line}: {message}")),
        None => write_line(&mut buf, format_args!("<unknown location>: {message}")),
    }

    if let Some(code) = code {
        write_line(&mut buf, format_args!("code: {code}"));
    }

    backtrace(&mut buf, backtrace_frames, backtrace_count);

    write_line(&mut buf, format_args!("==================="));
    utk_console::console_write_unlocked(PANIC_BANNER_OFF);
}
