//! Task table and scheduler.

use heapless::String;

use crate::config::{MAX_TASKS, NUM_PRIORITIES};
use crate::task::{TaskId, TaskState, Tcb};

/// Selects between the two scheduling policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerMode {
    /// Highest populated priority wins; round-robin within a priority.
    Priority,
    /// Ignore priority; one rotor over all slots.
    RoundRobin,
}

/// The fixed-size task table plus the scheduler's own bookkeeping (the
/// per-priority rotor and the round-robin rotor).
pub struct TaskTable {
    tasks: [Tcb; MAX_TASKS],
    task_count: usize,
    current: TaskId,
    mode: SchedulerMode,
    /// Last-dispatched task index at each priority, used as the round-robin
    /// rotor within a priority level.
    last_at_priority: [TaskId; NUM_PRIORITIES],
    /// Single rotor used in round-robin mode.
    rr_rotor: TaskId,
}

impl TaskTable {
    pub const fn new() -> Self {
        TaskTable {
            tasks: [const { Tcb::invalid() }; MAX_TASKS],
            task_count: 0,
            current: 0,
            mode: SchedulerMode::Priority,
            last_at_priority: [0; NUM_PRIORITIES],
            rr_rotor: 0,
        }
    }

    pub fn task(&self, id: TaskId) -> &Tcb {
        &self.tasks[id]
    }

    pub fn task_mut(&mut self, id: TaskId) -> &mut Tcb {
        &mut self.tasks[id]
    }

    pub fn current(&self) -> TaskId {
        self.current
    }

    /// Records which slot is now running, after the arch layer has acted on
    /// a [`Self::schedule`] result. Kept separate from `schedule` itself so
    /// host tests can call `schedule` repeatedly without a real context
    /// switch ever happening.
    pub fn set_current(&mut self, id: TaskId) {
        self.current = id;
    }

    pub fn current_task(&self) -> &Tcb {
        &self.tasks[self.current]
    }

    pub fn current_task_mut(&mut self) -> &mut Tcb {
        &mut self.tasks[self.current]
    }

    pub fn mode(&self) -> SchedulerMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SchedulerMode) {
        self.mode = mode;
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn len(&self) -> usize {
        MAX_TASKS
    }

    /// `createThread`: refuses if the table is full or `entry` is already
    /// registered. Otherwise assigns the lowest `Invalid` slot, marks it
    /// `Unrun`, and returns its index.
    pub fn create_thread(
        &mut self,
        entry: u32,
        name: &str,
        priority: u8,
        sp_init: u32,
        srd: [u8; crate::config::NUM_SRAM_REGIONS],
    ) -> Option<TaskId> {
        if self.task_count >= MAX_TASKS {
            return None;
        }
        if self.tasks.iter().any(|t| t.state != TaskState::Invalid && t.pid == entry) {
            return None;
        }
        let slot = self.tasks.iter().position(|t| t.state == TaskState::Invalid)?;

        let tcb = &mut self.tasks[slot];
        tcb.state = TaskState::Unrun;
        tcb.pid = entry;
        tcb.sp_init = sp_init;
        tcb.sp = sp_init;
        tcb.priority = priority;
        tcb.current_priority = priority;
        tcb.ticks = 0;
        tcb.srd = srd;
        tcb.name = String::try_from(name).unwrap_or_default();
        tcb.mutex = None;
        tcb.semaphore = None;

        self.task_count += 1;
        Some(slot)
    }

    /// `rtosScheduler`: returns the next task to dispatch. Always finds one
    /// because the idle task (slot 0, registered first) is always READY
    /// when nothing else is.
    pub fn schedule(&mut self) -> TaskId {
        match self.mode {
            SchedulerMode::RoundRobin => self.schedule_round_robin(),
            SchedulerMode::Priority => self.schedule_priority(),
        }
    }

    fn schedule_round_robin(&mut self) -> TaskId {
        let n = self.len();
        let mut i = (self.rr_rotor + 1) % n;
        for _ in 0..n {
            if self.tasks[i].state.is_runnable() {
                self.rr_rotor = i;
                return i;
            }
            i = (i + 1) % n;
        }
        // Unreachable in a correctly configured system: the idle task is
        // always ready.
        self.rr_rotor
    }

    /// Mirrors `original_source/kernel.c::rtosScheduler`'s priority branch:
    /// starting one slot after the rotor position recorded for the current
    /// priority, scan for the first runnable task at that priority; if none
    /// is found after a full lap, descend to the next priority and wrap
    /// through all `NUM_PRIORITIES` levels. The first match at a priority
    /// wins — no further scanning for a "better" slot within that priority.
    fn schedule_priority(&mut self) -> TaskId {
        let n = self.len();
        let mut priority = 0usize;
        loop {
            let start = (self.last_at_priority[priority] + 1) % n;
            let mut i = start;
            loop {
                let t = &self.tasks[i];
                if t.priority as usize == priority && t.state.is_runnable() {
                    self.last_at_priority[priority] = i;
                    return i;
                }
                i = (i + 1) % n;
                if i == start {
                    break;
                }
            }
            priority = (priority + 1) % NUM_PRIORITIES;
        }
    }

    /// SysTick bookkeeping: decrement every `Delayed` task's tick count,
    /// waking it when it hits zero. Returns `true` if at
    /// least one task woke, so the caller can decide whether a preemptive
    /// switch is warranted even with preemption otherwise idle.
    pub fn tick(&mut self) -> bool {
        let mut woke = false;
        for t in self.tasks.iter_mut() {
            if t.state == TaskState::Delayed {
                t.ticks -= 1;
                if t.ticks == 0 {
                    t.state = TaskState::Ready;
                    woke = true;
                }
            }
        }
        woke
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srd() -> [u8; crate::config::NUM_SRAM_REGIONS] {
        [0; crate::config::NUM_SRAM_REGIONS]
    }

    #[test]
    fn create_thread_rejects_duplicate_entry() {
        let mut t = TaskTable::new();
        assert!(t.create_thread(0x1000, "idle", 7, 0x2000_1000, srd()).is_some());
        assert!(t.create_thread(0x1000, "idle-again", 7, 0x2000_1400, srd()).is_none());
    }

    #[test]
    fn create_thread_rejects_full_table() {
        let mut t = TaskTable::new();
        for i in 0..MAX_TASKS {
            assert!(t
                .create_thread(0x1000 + i as u32, "t", 0, 0x2000_1000, srd())
                .is_some());
        }
        assert!(t.create_thread(0x9999, "overflow", 0, 0x2000_1000, srd()).is_none());
    }

    #[test]
    fn scheduler_never_returns_non_runnable_task() {
        let mut t = TaskTable::new();
        let idle = t.create_thread(0x1000, "idle", 7, 0x2000_1000, srd()).unwrap();
        let a = t.create_thread(0x1004, "a", 0, 0x2000_1400, srd()).unwrap();
        t.task_mut(idle).state = TaskState::Ready;
        t.task_mut(a).state = TaskState::Delayed;
        t.task_mut(a).ticks = 5;

        for _ in 0..10 {
            let next = t.schedule();
            assert!(t.task(next).state.is_runnable());
        }
    }

    #[test]
    fn priority_scheduler_prefers_highest_populated_priority() {
        let mut t = TaskTable::new();
        let a = t.create_thread(0x1000, "a", 0, 0x2000_1000, srd()).unwrap();
        let b = t.create_thread(0x1004, "b", 7, 0x2000_1400, srd()).unwrap();
        t.task_mut(a).state = TaskState::Ready;
        t.task_mut(b).state = TaskState::Ready;

        for _ in 0..5 {
            assert_eq!(t.schedule(), a);
        }
    }

    #[test]
    fn priority_scheduler_descends_when_priority_has_no_runnable_task() {
        let mut t = TaskTable::new();
        let a = t.create_thread(0x1000, "a", 0, 0x2000_1000, srd()).unwrap();
        let b = t.create_thread(0x1004, "b", 7, 0x2000_1400, srd()).unwrap();
        t.task_mut(a).state = TaskState::Delayed;
        t.task_mut(a).ticks = 10;
        t.task_mut(b).state = TaskState::Ready;

        assert_eq!(t.schedule(), b);
    }

    #[test]
    fn round_robin_rotates_across_equal_priority_tasks() {
        let mut t = TaskTable::new();
        t.set_mode(SchedulerMode::RoundRobin);
        let ids: heapless::Vec<TaskId, 3> = [
            t.create_thread(0x1000, "a", 0, 0x2000_1000, srd()).unwrap(),
            t.create_thread(0x1004, "b", 0, 0x2000_1400, srd()).unwrap(),
            t.create_thread(0x1008, "c", 0, 0x2000_1800, srd()).unwrap(),
        ]
        .into_iter()
        .collect();
        for &id in ids.iter() {
            t.task_mut(id).state = TaskState::Ready;
        }

        let picked: heapless::Vec<TaskId, 3> =
            (0..3).map(|_| t.schedule()).collect::<heapless::Vec<_, 3>>();
        assert_eq!(picked.as_slice(), ids.as_slice());
    }

    #[test]
    fn tick_wakes_delayed_task_exactly_when_it_hits_zero() {
        let mut t = TaskTable::new();
        let a = t.create_thread(0x1000, "a", 0, 0x2000_1000, srd()).unwrap();
        t.task_mut(a).state = TaskState::Delayed;
        t.task_mut(a).ticks = 3;

        assert!(!t.tick());
        assert_eq!(t.task(a).state, TaskState::Delayed);
        assert!(!t.tick());
        assert!(t.tick());
        assert_eq!(t.task(a).state, TaskState::Ready);
    }
}
