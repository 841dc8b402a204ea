//! MPU region setup and per-task sub-region-disable application.
//!
//! Region numbers and RASR encodings are translated from
//! `examples/original_source/mm.c`'s `setupAllAccess`/`allowFlashAccess`/
//! `allowPeripheralAccess`/`setupSramAccess`/`initMpu`, using
//! `drivers::read_write::{read_register, write_register}` the same way the
//! teacher's `drivers::cortex_m4` module uses them for NVIC access.

use drivers::read_write::{read_register, write_register};
use kernel_core::config::{
    FLASH_BASE, FLASH_SIZE, LARGE_POOL_BASE, LARGE_POOL_REGIONS, LARGE_POOL_REGION_SIZE,
    NUM_SRAM_REGIONS, PERIPHERAL_BASE, PERIPHERAL_SIZE, SMALL_POOL_BASE, SMALL_POOL_SIZE,
    SRAM_KERNEL_BASE,
};

use crate::registers::{MPU_CTRL, MPU_CTRL_ENABLE, MPU_CTRL_PRIVDEFENA, MPU_RASR, MPU_RASR_ENABLE, MPU_RASR_XN, MPU_RBAR, MPU_RNR};

const REGION_BACKGROUND: u32 = 0;
const REGION_FLASH: u32 = 1;
const REGION_SRAM_KERNEL: u32 = 2;
/// First of the four user-SRAM regions gated per task: small pool, then the
/// three large-pool regions (`Tcb::srd` indexes line up with
/// `REGION_SRAM_USER + i`).
const REGION_SRAM_USER: u32 = 3;
const REGION_PERIPHERAL: u32 = 7;

/// RASR AP field (bits 26:24). `original_source/mm.c` uses all three of
/// these across `setupAllAccess`/`allowFlashAccess`/`setupSramAccess`.
#[derive(Clone, Copy)]
enum Access {
    /// `0b011`: read/write for both privileged and unprivileged code.
    ReadWrite,
    /// `0b001`: read/write for privileged code only — unprivileged access is
    /// denied outright. Every SRAM region uses this (`mm.c::
    /// setupSramAccess`); the per-task sub-region-disable bits then carve
    /// out exceptions within that denial instead of widening the AP.
    PrivilegedReadWrite,
    /// `0b110`: read-only for both privileged and unprivileged code.
    ReadOnly,
}

impl Access {
    fn bits(self) -> u32 {
        match self {
            Access::ReadWrite => 0b011,
            Access::PrivilegedReadWrite => 0b001,
            Access::ReadOnly => 0b110,
        }
    }
}

/// RASR `SIZE` field: a region of `2^(n+1)` bytes is encoded as `n`. Takes
/// `u64` so the 4 GiB background region doesn't overflow a `u32` shift.
fn size_field(bytes: u64) -> u32 {
    let mut n = 1u32;
    while (1u64 << (n + 1)) < bytes {
        n += 1;
    }
    n
}

unsafe fn configure_region(number: u32, base: u32, size_bytes: u64, srd: u32, xn: bool, access: Access) {
    unsafe {
        write_register(MPU_RNR, number);
        write_register(MPU_RBAR, base);
        // TEX=001: normal, cacheable memory, matching
        // `mm.c::setupSramAccess`'s attribute word.
        let mut rasr =
            MPU_RASR_ENABLE | (size_field(size_bytes) << 1) | (srd << 8) | (access.bits() << 24) | (0b001 << 19);
        if xn {
            rasr |= MPU_RASR_XN;
        }
        write_register(MPU_RASR, rasr);
    }
}

/// Boot-time MPU setup. The background region covers the full 4 GiB address
/// space and is execute-never (`mm.c::setupAllAccess`); the user-facing
/// SRAM regions are privileged-read/write, fully sub-region-disabled, then
/// opened per task by [`apply_srd_mask`] at every context switch — the
/// kernel itself keeps write access to a task's stack through every switch,
/// only the task's own unprivileged access is gated.
pub fn init() {
    unsafe {
        configure_region(REGION_BACKGROUND, 0, 1u64 << 32, 0, true, Access::ReadWrite);
        configure_region(REGION_FLASH, FLASH_BASE, FLASH_SIZE as u64, 0, false, Access::ReadOnly);
        configure_region(
            REGION_SRAM_KERNEL,
            SRAM_KERNEL_BASE,
            0x1000,
            0,
            true,
            Access::PrivilegedReadWrite,
        );
        configure_region(
            REGION_SRAM_USER,
            SMALL_POOL_BASE,
            SMALL_POOL_SIZE as u64,
            0xFF,
            true,
            Access::PrivilegedReadWrite,
        );
        for i in 0..LARGE_POOL_REGIONS {
            configure_region(
                REGION_SRAM_USER + 1 + i,
                LARGE_POOL_BASE + i * LARGE_POOL_REGION_SIZE,
                LARGE_POOL_REGION_SIZE as u64,
                0xFF,
                true,
                Access::PrivilegedReadWrite,
            );
        }
        configure_region(REGION_PERIPHERAL, PERIPHERAL_BASE, PERIPHERAL_SIZE as u64, 0, true, Access::ReadWrite);

        write_register(MPU_CTRL, MPU_CTRL_ENABLE | MPU_CTRL_PRIVDEFENA);
    }
}

/// Applies one task's sub-region-disable bitmap to the four user SRAM
/// regions at a context switch. `srd[0]` gates the small pool, `srd[1..=3]`
/// the three large-pool regions.
pub fn apply_srd_mask(srd: &[u8; NUM_SRAM_REGIONS]) {
    unsafe {
        for (i, &mask) in srd.iter().enumerate() {
            write_register(MPU_RNR, REGION_SRAM_USER + i as u32);
            let mut rasr = read_register(MPU_RASR);
            rasr = (rasr & !(0xFFu32 << 8)) | ((mask as u32) << 8);
            write_register(MPU_RASR, rasr);
        }
    }
}
