//! The VCPU register frame.
//!
//! A `#[repr(C, packed)]` struct of `u64` fields, because assembly
//! context-switch glue indexes into it by byte offset. The fields stay
//! private with typed accessors in front of them rather than exposed as a
//! mutable open structure, while the packed layout itself is preserved so
//! the same offsets still work from `global_asm!` glue living in the
//! surrounding boot crate.

/// Saved general-purpose and control register state that makes a thread's
/// execution point restorable.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct VcpuFrame {
    rax: u64,
    rbx: u64,
    rcx: u64,
    rdx: u64,
    rsi: u64,
    rdi: u64,
    rbp: u64,
    r8: u64,
    r9: u64,
    r10: u64,
    r11: u64,
    r12: u64,
    r13: u64,
    r14: u64,
    r15: u64,
    rip: u64,
    rflags: u64,
    rsp: u64,
    cs: u64,
    ss: u64,
    cr3: u64,
}

/// An unpacked copy of a [`VcpuFrame`]'s fields, safe to move around and
/// format without the packed-struct reference restrictions. `cr3` is the
/// only control register this core's frame models; the rest (cr0, cr4)
/// belong to the out-of-scope MMU bring-up layer.
#[derive(Debug, Clone, Copy)]
pub struct VcpuRegisters {
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rip: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub cs: u64,
    pub ss: u64,
    pub cr3: u64,
}

impl VcpuFrame {
    pub const fn zeroed() -> VcpuFrame {
        VcpuFrame {
            rax: 0,
            rbx: 0,
            rcx: 0,
            rdx: 0,
            rsi: 0,
            rdi: 0,
            rbp: 0,
            r8: 0,
            r9: 0,
            r10: 0,
            r11: 0,
            r12: 0,
            r13: 0,
            r14: 0,
            r15: 0,
            rip: 0,
            rflags: 0,
            rsp: 0,
            cs: 0,
            ss: 0,
            cr3: 0,
        }
    }

    #[inline]
    pub fn instruction_pointer(&self) -> u64 {
        self.rip
    }

    /// Snapshot every field as a plain, unpacked struct. `utk-panic` is the only
    /// caller; everything else reaches the frame through the narrower
    /// typed accessors above.
    pub fn registers(&self) -> VcpuRegisters {
        VcpuRegisters {
            rax: self.rax,
            rbx: self.rbx,
            rcx: self.rcx,
            rdx: self.rdx,
            rsi: self.rsi,
            rdi: self.rdi,
            rbp: self.rbp,
            r8: self.r8,
            r9: self.r9,
            r10: self.r10,
            r11: self.r11,
            r12: self.r12,
            r13: self.r13,
            r14: self.r14,
            r15: self.r15,
            rip: self.rip,
            rflags: self.rflags,
            rsp: self.rsp,
            cs: self.cs,
            ss: self.ss,
            cr3: self.cr3,
        }
    }

    /// Rewrite the saved instruction pointer. This is how the signal
    /// subsystem redirects a thread's next return-from-interrupt (spec
    /// §4.4, §9: "on return-from-interrupt... rewrite saved IP to handler").
    #[inline]
    pub fn set_instruction_pointer(&mut self, rip: u64) {
        self.rip = rip;
    }

    #[inline]
    pub fn stack_pointer(&self) -> u64 {
        self.rsp
    }

    #[inline]
    pub fn set_stack_pointer(&mut self, rsp: u64) {
        self.rsp = rsp;
    }

    #[inline]
    pub fn flags(&self) -> u64 {
        self.rflags
    }

    #[inline]
    pub fn set_flags(&mut self, flags: u64) {
        self.rflags = flags;
    }

    #[inline]
    pub fn page_table_root(&self) -> u64 {
        self.cr3
    }

    #[inline]
    pub fn set_page_table_root(&mut self, cr3: u64) {
        self.cr3 = cr3;
    }

    #[inline]
    pub fn code_segment(&self) -> u64 {
        self.cs
    }

    /// Initialize a frame such that the first resume jumps to `entry` with
    /// `rdi` carrying `arg` (System V AMD64 first integer argument
    /// register), and the stack pointer at the top of a freshly allocated
    /// stack.
    pub fn for_new_kernel_thread(
        entry: u64,
        arg: u64,
        stack_top: u64,
        kernel_cs: u64,
    ) -> VcpuFrame {
        let mut frame = VcpuFrame::zeroed();
        frame.rip = entry;
        frame.rdi = arg;
        frame.rsp = stack_top;
        frame.rbp = stack_top;
        frame.cs = kernel_cs;
        frame.rflags = 0x202; // IF set, reserved bit 1 set.
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_kernel_thread_frame_points_at_entry_and_stack() {
        let frame = VcpuFrame::for_new_kernel_thread(0x1000, 42, 0x9000, 0x08);
        assert_eq!(frame.instruction_pointer(), 0x1000);
        assert_eq!(frame.stack_pointer(), 0x9000);
        assert_eq!(frame.code_segment(), 0x08);
    }

    #[test]
    fn signal_dispatch_rewrites_ip_in_place() {
        let mut frame = VcpuFrame::for_new_kernel_thread(0x1000, 0, 0x9000, 0x08);
        frame.set_instruction_pointer(0x2000);
        assert_eq!(frame.instruction_pointer(), 0x2000);
        assert_eq!(frame.stack_pointer(), 0x9000);
    }
}
