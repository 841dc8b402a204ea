//! Compile-time constants shared by the whole kernel.
//!
//! Single source of truth for the fixed-size tables the rest of the crate
//! indexes into. Kept separate from [`crate::task`]/[`crate::ipc`] the same
//! way the teacher's `os_config.rs` is kept separate from `os.rs`.

/// Maximum number of task-table slots.
pub const MAX_TASKS: usize = 12;

/// Priority levels, 0 = highest (`NUM_PRIORITIES` in
/// `original_source/kernel.c`).
pub const NUM_PRIORITIES: usize = 8;

/// Fixed number of mutexes and counting semaphores.
pub const MAX_MUTEXES: usize = 4;
pub const MAX_SEMAPHORES: usize = 4;

/// Bound on a mutex/semaphore wait queue: each queue is sized to the full
/// task table rather than a tighter estimate, so no legal wait list can
/// overflow it.
pub const MAX_QUEUE: usize = MAX_TASKS;

/// One byte of sub-region-disable bits per user SRAM region.
pub const NUM_SRAM_REGIONS: usize = 4;

/// Max length of a task name, excluding the NUL the C original reserved.
pub const MAX_NAME_LEN: usize = 15;

/// SRAM arena.
pub const SRAM_KERNEL_BASE: u32 = 0x2000_0000;
pub const SRAM_USER_BASE: u32 = 0x2000_1000;
pub const SRAM_USER_END: u32 = 0x2000_8000;
pub const SRAM_USER_SIZE: u32 = SRAM_USER_END - SRAM_USER_BASE;

/// Small-block pool: one 4 KiB region split into 512 B sub-regions.
pub const SMALL_POOL_BASE: u32 = SRAM_USER_BASE;
pub const SMALL_POOL_SIZE: u32 = 4 * 1024;
pub const SMALL_BLOCK_SIZE: u32 = 512;

/// Large-block pool: three 8 KiB regions split into 1024 B sub-regions.
pub const LARGE_POOL_BASE: u32 = SMALL_POOL_BASE + SMALL_POOL_SIZE;
pub const LARGE_POOL_REGION_SIZE: u32 = 8 * 1024;
pub const LARGE_POOL_REGIONS: u32 = 3;
pub const LARGE_BLOCK_SIZE: u32 = 1024;

/// Flash and peripheral windows, used by the arch layer when programming
/// the MPU background/flash/peripheral regions.
pub const FLASH_BASE: u32 = 0x0000_0000;
pub const FLASH_SIZE: u32 = 256 * 1024;
pub const PERIPHERAL_BASE: u32 = 0x4000_0000;
pub const PERIPHERAL_SIZE: u32 = 64 * 1024 * 1024;

/// 1 kHz tick.
pub const TICK_PERIOD_MS: u32 = 1;
