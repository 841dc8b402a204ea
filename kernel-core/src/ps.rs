//! Copy-out layouts for the `ps`/`ipcs` introspection service calls.
//!
//! Mirrors `original_source/shell.h`'s `PS_DATA`/`IPCS_MUT_DATA`/
//! `IPCS_SEM_DATA` structs, translated from fixed `char[16]` arrays into
//! owned `heapless::String`s.

use heapless::{String, Vec};

use crate::config::{MAX_NAME_LEN, MAX_QUEUE, MAX_TASKS};

/// `getTcb`: `(pid, name)` for every slot, `Invalid` slots included so the
/// shell's `ps` can show free slots.
pub struct PsData {
    pub pid: Vec<u32, MAX_TASKS>,
    pub name: Vec<String<MAX_NAME_LEN>, MAX_TASKS>,
}

impl PsData {
    pub const fn new() -> Self {
        PsData {
            pid: Vec::new(),
            name: Vec::new(),
        }
    }
}

impl Default for PsData {
    fn default() -> Self {
        Self::new()
    }
}

/// `getMutexInfo`.
pub struct MutexInfo {
    pub locked: bool,
    pub locked_by_name: String<MAX_NAME_LEN>,
    pub queue_names: Vec<String<MAX_NAME_LEN>, MAX_QUEUE>,
}

/// `getSemaphoreInfo`.
pub struct SemaphoreInfo {
    pub count: u8,
    pub queue_names: Vec<String<MAX_NAME_LEN>, MAX_QUEUE>,
}
