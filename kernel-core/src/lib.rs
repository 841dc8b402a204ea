//! Portable kernel logic: task table, scheduler, memory manager, mutexes,
//! semaphores, and the service-call dispatch table.
//!
//! This crate touches no hardware and depends on nothing but `heapless`, so
//! it builds and its tests run on the host — the same split
//! `oxidecomputer-hubris` uses between `sys/kerncore` (this crate's role)
//! and `sys/kern` (the arch-specific crate, `kernel` in this workspace).
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod ipc;
pub mod mm;
pub mod ps;
pub mod scheduler;
pub mod syscall;
pub mod task;

use config::{MAX_MUTEXES, MAX_SEMAPHORES};
use ipc::{Mutex, Semaphore};
use mm::AllocTable;
use scheduler::TaskTable;

/// A single kernel object with well-defined initialization and a single
/// start entry, consolidating the task table, scheduler, and IPC objects
/// the original C kernel keeps as separate globals. All fields here are
/// mutated only from handler-mode code in the `kernel` crate.
pub struct Kernel {
    pub tasks: TaskTable,
    pub mutexes: [Mutex; MAX_MUTEXES],
    pub semaphores: [Semaphore; MAX_SEMAPHORES],
    pub heap: AllocTable,
    /// Cooperative unless a task/shell enables preemption.
    pub preemption: bool,
}

impl Kernel {
    pub const fn new() -> Self {
        Kernel {
            tasks: TaskTable::new(),
            mutexes: [const { Mutex::new() }; MAX_MUTEXES],
            semaphores: [const { Semaphore::new(0) }; MAX_SEMAPHORES],
            heap: AllocTable::new(),
            preemption: false,
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}
