//! Motorola MC146818-compatible CMOS RTC, bound into the RTC wall-clock
//! slot.
//!
//! Standard OSDev-level port I/O (index port 0x70, data port 0x71,
//! register numbers 0x00/0x02/0x04/0x06/0x07/0x09, status register B bit 2
//! for BCD-vs-binary), kept in the same style as the other drivers in
//! this crate (`x86_64::Port`, `TimerDriverOps`).

use core::sync::atomic::{AtomicBool, Ordering};

use utk_abi::traits::{DayTime, TimerDriverOps};
use utk_abi::{DeviceTreeNode, KernelResult};
use x86_64::instructions::port::Port;

const CMOS_INDEX_PORT: u16 = 0x70;
const CMOS_DATA_PORT: u16 = 0x71;

const REG_SECONDS: u8 = 0x00;
const REG_MINUTES: u8 = 0x02;
const REG_HOURS: u8 = 0x04;
const REG_DAY: u8 = 0x07;
const REG_MONTH: u8 = 0x08;
const REG_YEAR: u8 = 0x09;
const REG_STATUS_A: u8 = 0x0A;
const REG_STATUS_B: u8 = 0x0B;

const STATUS_A_UPDATE_IN_PROGRESS: u8 = 0x80;
const STATUS_B_BINARY_MODE: u8 = 0x04;
const STATUS_B_24_HOUR: u8 = 0x02;

fn read_reg(reg: u8) -> u8 {
    let mut index: Port<u8> = Port::new(CMOS_INDEX_PORT);
    let mut data: Port<u8> = Port::new(CMOS_DATA_PORT);
    unsafe {
        index.write(reg);
        data.read()
    }
}

fn bcd_to_binary(value: u8) -> u8 {
    (value & 0x0F) + ((value >> 4) * 10)
}

pub struct Rtc {
    enabled: AtomicBool,
}

impl Rtc {
    const fn new() -> Rtc {
        Rtc {
            enabled: AtomicBool::new(false),
        }
    }

    /// Read a coherent snapshot by re-reading until two consecutive
    /// samples agree, avoiding the well-known CMOS update-in-progress
    /// tearing race.
    fn read_snapshot(&self) -> DayTime {
        loop {
            while read_reg(REG_STATUS_A) & STATUS_A_UPDATE_IN_PROGRESS != 0 {
                core::hint::spin_loop();
            }
            let first = self.read_raw();
            while read_reg(REG_STATUS_A) & STATUS_A_UPDATE_IN_PROGRESS != 0 {
                core::hint::spin_loop();
            }
            let second = self.read_raw();
            if first == second {
                return self.normalize(first);
            }
        }
    }

    fn read_raw(&self) -> [u8; 6] {
        [
            read_reg(REG_SECONDS),
            read_reg(REG_MINUTES),
            read_reg(REG_HOURS),
            read_reg(REG_DAY),
            read_reg(REG_MONTH),
            read_reg(REG_YEAR),
        ]
    }

    fn normalize(&self, raw: [u8; 6]) -> DayTime {
        let status_b = read_reg(REG_STATUS_B);
        let binary = status_b & STATUS_B_BINARY_MODE != 0;
        let [second, minute, mut hour, day, month, year] =
            raw.map(|v| if binary { v } else { bcd_to_binary(v) });

        if status_b & STATUS_B_24_HOUR == 0 && hour & 0x80 != 0 {
            hour = ((hour & 0x7F) + 12) % 24;
        }

        DayTime {
            year: 2000 + year as u16,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

impl TimerDriverOps for Rtc {
    /// The CMOS RTC ticks once per second; it is never bound as MAIN, so
    /// this value only matters if a caller asks directly.
    fn frequency_hz(&self) -> u64 {
        1
    }

    fn time_ns(&self) -> u64 {
        0
    }

    /// Setting the wall clock is not implemented for the reference driver
    /// (writing CMOS registers back requires disabling NMI and is out of
    /// scope for this core); silently ignored like PIT's `set_time_ns`.
    fn set_time_ns(&self, _ns: u64) {}

    fn date(&self) -> DayTime {
        self.read_snapshot()
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// The RTC's periodic-interrupt mode is not wired up here; it is
    /// bound for its `date()` reading only, not as a tick source.
    fn set_tick_handler(&self, _handler: fn()) {}

    fn remove_tick_handler(&self) {}
}

static RTC: Rtc = Rtc::new();

/// `DriverDescriptor::attach` for `compatible = "x86,cmos-rtc"`.
pub fn attach(_node: &dyn DeviceTreeNode) -> KernelResult<()> {
    utk_timer::bind(
        utk_timer::TimerSlot::Rtc,
        &RTC,
        utk_timer::main_tick_handler,
    )
}
