//! Task control block and its lifecycle states.

use heapless::String;

use crate::config::{MAX_NAME_LEN, NUM_SRAM_REGIONS};

/// Index into the task table. Plain `usize` rather than a newtype: the
/// scheduler, mutex, and semaphore queues all cross-reference tasks purely
/// by index, the same way `original_source/kernel.c` passes around a
/// `tcb[]` index instead of a pointer.
pub type TaskId = usize;

/// Lifecycle state of a task-table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Slot unused.
    Invalid,
    /// Created, then explicitly stopped; can be restarted.
    Stopped,
    /// Created, never dispatched.
    Unrun,
    /// Runnable.
    Ready,
    /// Sleeping; `ticks` counts down to zero.
    Delayed,
    /// Waiting on a mutex.
    BlockedMutex,
    /// Waiting on a semaphore.
    BlockedSemaphore,
}

impl TaskState {
    /// True for the two states the scheduler is allowed to hand out.
    pub fn is_runnable(self) -> bool {
        matches!(self, TaskState::Ready | TaskState::Unrun)
    }
}

/// One task-table slot. Never destroyed once allocated — a `Stopped` slot
/// keeps its identity and is reused only by `restartThread`, never freed.
#[derive(Debug, Clone)]
pub struct Tcb {
    pub state: TaskState,
    /// Entry-point address, reinterpreted from the task's `extern "C" fn()`.
    /// Doubles as a unique task identity token.
    pub pid: u32,
    /// Initial (highest) address of the task's private stack.
    pub sp_init: u32,
    /// Saved process stack pointer at the last preemption/yield.
    pub sp: u32,
    /// Static priority, 0 = highest.
    pub priority: u8,
    /// Effective priority. Reserved for priority inheritance (disabled).
    pub current_priority: u8,
    /// Remaining sleep ticks while `Delayed`.
    pub ticks: u32,
    /// Sub-region-disable bitmap, one byte per user SRAM region.
    pub srd: [u8; NUM_SRAM_REGIONS],
    pub name: String<MAX_NAME_LEN>,
    /// Index of the mutex this task owns or is blocked on. Valid only in
    /// `BlockedMutex`, or while the task owns a mutex.
    pub mutex: Option<usize>,
    /// Index of the semaphore this task is blocked on. Valid only in
    /// `BlockedSemaphore`.
    pub semaphore: Option<usize>,
}

impl Tcb {
    /// An empty slot, as produced by `initRtos` zeroing the table.
    pub const fn invalid() -> Self {
        Tcb {
            state: TaskState::Invalid,
            pid: 0,
            sp_init: 0,
            sp: 0,
            priority: 0,
            current_priority: 0,
            ticks: 0,
            srd: [0; NUM_SRAM_REGIONS],
            name: String::new(),
            mutex: None,
            semaphore: None,
        }
    }
}

impl Default for Tcb {
    fn default() -> Self {
        Self::invalid()
    }
}
