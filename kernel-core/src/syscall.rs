//! Service-call table implemented as methods on [`crate::Kernel`]. Pure
//! logic: the arch layer decodes the trapped instruction and the caller's
//! stacked register arguments, then calls these; it re-encodes
//! [`PendAction`] into a PendSV request afterward.
//!
//! Failure conditions (bad index, unknown pid/name) are silent no-ops here —
//! callers validate indices and existence before issuing the trap. Index
//! bounds are still checked defensively so a malformed argument can never
//! panic or index out of range.

use heapless::{String, Vec};

use crate::config::{MAX_MUTEXES, MAX_SEMAPHORES};
use crate::ps::{MutexInfo, PsData, SemaphoreInfo};
use crate::task::{TaskId, TaskState};
use crate::Kernel;

/// The 16 supervisor-call numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SvcNumber {
    Yield = 1,
    Sleep = 2,
    Lock = 3,
    Unlock = 4,
    Wait = 5,
    Post = 6,
    GetPid = 7,
    RestartThread = 8,
    Preempt = 9,
    StopThread = 10,
    Reboot = 11,
    SetThreadPriority = 12,
    GetMutexInfo = 13,
    GetSemaphoreInfo = 14,
    Sched = 15,
    GetTcb = 16,
}

impl TryFrom<u8> for SvcNumber {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use SvcNumber::*;
        Ok(match value {
            1 => Yield,
            2 => Sleep,
            3 => Lock,
            4 => Unlock,
            5 => Wait,
            6 => Post,
            7 => GetPid,
            8 => RestartThread,
            9 => Preempt,
            10 => StopThread,
            11 => Reboot,
            12 => SetThreadPriority,
            13 => GetMutexInfo,
            14 => GetSemaphoreInfo,
            15 => Sched,
            16 => GetTcb,
            _ => return Err(()),
        })
    }
}

/// What the caller (the arch-layer SVC handler) must do after a service
/// call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendAction {
    /// Nothing to do; the call completed synchronously.
    None,
    /// Pend a PendSV so the scheduler runs before returning to thread mode.
    ContextSwitch,
}

impl Kernel {
    fn find_by_pid(&self, pid: u32) -> Option<TaskId> {
        (0..self.tasks.len())
            .find(|&i| self.tasks.task(i).state != TaskState::Invalid && self.tasks.task(i).pid == pid)
    }

    fn find_by_name(&self, name: &str) -> Option<TaskId> {
        (0..self.tasks.len()).find(|&i| self.tasks.task(i).name.as_str() == name)
    }

    /// Call 1: `yield`.
    pub fn svc_yield(&mut self) -> PendAction {
        PendAction::ContextSwitch
    }

    /// Call 2: `sleep(ticks)`.
    pub fn svc_sleep(&mut self, current: TaskId, ticks: u32) -> PendAction {
        let t = self.tasks.task_mut(current);
        t.state = TaskState::Delayed;
        t.ticks = ticks;
        PendAction::ContextSwitch
    }

    /// Call 3: `lock(mutex)`.
    pub fn svc_lock(&mut self, current: TaskId, mutex: usize) -> PendAction {
        if mutex >= MAX_MUTEXES {
            return PendAction::None;
        }
        if self.mutexes[mutex].lock(current) {
            PendAction::None
        } else {
            let t = self.tasks.task_mut(current);
            t.state = TaskState::BlockedMutex;
            t.mutex = Some(mutex);
            PendAction::ContextSwitch
        }
    }

    /// Call 4: `unlock(mutex)`. The woken waiter is immediately `Ready` —
    /// visible to the very next `schedule()` call without waiting for a
    /// PendSV round-trip.
    pub fn svc_unlock(&mut self, current: TaskId, mutex: usize) -> PendAction {
        if mutex >= MAX_MUTEXES {
            return PendAction::None;
        }
        if let Some(new_owner) = self.mutexes[mutex].unlock(current) {
            self.tasks.task_mut(new_owner).state = TaskState::Ready;
        }
        PendAction::None
    }

    /// Call 5: `wait(semaphore)`.
    pub fn svc_wait(&mut self, current: TaskId, semaphore: usize) -> PendAction {
        if semaphore >= MAX_SEMAPHORES {
            return PendAction::None;
        }
        if self.semaphores[semaphore].wait(current) {
            PendAction::None
        } else {
            let t = self.tasks.task_mut(current);
            t.state = TaskState::BlockedSemaphore;
            t.semaphore = Some(semaphore);
            PendAction::ContextSwitch
        }
    }

    /// Call 6: `post(semaphore)`.
    pub fn svc_post(&mut self, semaphore: usize) -> PendAction {
        if semaphore >= MAX_SEMAPHORES {
            return PendAction::None;
        }
        if let Some(woken) = self.semaphores[semaphore].post() {
            self.tasks.task_mut(woken).state = TaskState::Ready;
        }
        PendAction::None
    }

    /// Call 7: `getPid(name)`. Silent no-op (returns `None`) if no task
    /// with that name exists.
    pub fn svc_get_pid(&self, name: &str) -> Option<u32> {
        self.find_by_name(name).map(|i| self.tasks.task(i).pid)
    }

    /// Call 8: `restartThread(pid)`. Does not reset the stack pointer or
    /// state beyond `Ready` — left exactly as the original source leaves it.
    pub fn svc_restart_thread(&mut self, pid: u32) -> PendAction {
        if let Some(i) = self.find_by_pid(pid) {
            self.tasks.task_mut(i).state = TaskState::Ready;
        }
        PendAction::None
    }

    /// Call 9: `preempt(on)`.
    pub fn svc_preempt(&mut self, on: bool) -> PendAction {
        self.preemption = on;
        PendAction::None
    }

    /// Call 10: `stopThread(pid)`. Cleans up any mutex/semaphore queue
    /// membership and mutex ownership before marking the task `Stopped`.
    /// Guards every queue/ownership touch on the task's actual state and
    /// `mutex`/`semaphore` field, fixing a gap in the original source (which
    /// wrote through `tcb[task].mutex` unconditionally).
    pub fn svc_stop_thread(&mut self, pid: u32) -> PendAction {
        let Some(task) = self.find_by_pid(pid) else {
            return PendAction::None;
        };
        let state = self.tasks.task(task).state;

        if state == TaskState::BlockedMutex {
            if let Some(m) = self.tasks.task(task).mutex {
                self.mutexes[m].remove_from_queue(task);
            }
        }
        // A task can own a mutex while Ready/Delayed/etc, not only while
        // blocked on a different one, so this check is independent of
        // `state`.
        for m in self.mutexes.iter_mut() {
            if m.owner() == Some(task) {
                if let Some(new_owner) = m.unlock(task) {
                    self.tasks.task_mut(new_owner).state = TaskState::Ready;
                }
            }
        }
        if state == TaskState::BlockedSemaphore {
            if let Some(s) = self.tasks.task(task).semaphore {
                self.semaphores[s].remove_from_queue(task);
            }
        }

        let t = self.tasks.task_mut(task);
        t.state = TaskState::Stopped;
        t.mutex = None;
        t.semaphore = None;
        PendAction::None
    }

    /// Call 12: `setThreadPriority(pid, priority)`.
    pub fn svc_set_thread_priority(&mut self, pid: u32, priority: u8) -> PendAction {
        if let Some(i) = self.find_by_pid(pid) {
            self.tasks.task_mut(i).priority = priority;
        }
        PendAction::None
    }

    /// Call 13: `getMutexInfo(mutex)`.
    pub fn svc_get_mutex_info(&self, mutex: usize) -> Option<MutexInfo> {
        if mutex >= MAX_MUTEXES {
            return None;
        }
        let m = &self.mutexes[mutex];
        let locked_by_name = m
            .owner()
            .map(|i| self.tasks.task(i).name.clone())
            .unwrap_or_default();
        let mut queue_names: Vec<String<15>, { crate::config::MAX_QUEUE }> = Vec::new();
        for &t in m.queue() {
            let _ = queue_names.push(self.tasks.task(t).name.clone());
        }
        Some(MutexInfo {
            locked: m.is_locked(),
            locked_by_name,
            queue_names,
        })
    }

    /// Call 14: `getSemaphoreInfo(semaphore)`.
    pub fn svc_get_semaphore_info(&self, semaphore: usize) -> Option<SemaphoreInfo> {
        if semaphore >= MAX_SEMAPHORES {
            return None;
        }
        let s = &self.semaphores[semaphore];
        let mut queue_names: Vec<String<15>, { crate::config::MAX_QUEUE }> = Vec::new();
        for &t in s.queue() {
            let _ = queue_names.push(self.tasks.task(t).name.clone());
        }
        Some(SemaphoreInfo {
            count: s.count(),
            queue_names,
        })
    }

    /// Call 15: `sched(priorityMode)`.
    pub fn svc_sched(&mut self, priority_mode: bool) -> PendAction {
        use crate::scheduler::SchedulerMode;
        self.tasks.set_mode(if priority_mode {
            SchedulerMode::Priority
        } else {
            SchedulerMode::RoundRobin
        });
        PendAction::None
    }

    /// Call 16: `getTcb()`. Every slot is reported, `Invalid` ones included,
    /// so the caller can tell a free slot from an occupied one.
    pub fn svc_get_tcb(&self) -> PsData {
        let mut data = PsData::new();
        for i in 0..self.tasks.len() {
            let t = self.tasks.task(i);
            let _ = data.pid.push(t.pid);
            let _ = data.name.push(t.name.clone());
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskState;

    fn make_kernel() -> (Kernel, TaskId, TaskId) {
        let mut k = Kernel::new();
        let a = k
            .tasks
            .create_thread(0x1000, "a", 0, 0x2000_1000, [0; 4])
            .unwrap();
        let b = k
            .tasks
            .create_thread(0x1004, "b", 0, 0x2000_1400, [0; 4])
            .unwrap();
        k.tasks.task_mut(a).state = TaskState::Ready;
        k.tasks.task_mut(b).state = TaskState::Ready;
        (k, a, b)
    }

    #[test]
    fn lock_then_second_locker_blocks_and_is_woken_on_unlock() {
        let (mut k, a, b) = make_kernel();
        assert_eq!(k.svc_lock(a, 0), PendAction::None);
        assert_eq!(k.svc_lock(b, 0), PendAction::ContextSwitch);
        assert_eq!(k.tasks.task(b).state, TaskState::BlockedMutex);

        k.svc_unlock(a, 0);
        assert_eq!(k.tasks.task(b).state, TaskState::Ready);
        assert_eq!(k.mutexes[0].owner(), Some(b));
    }

    #[test]
    fn wait_on_empty_semaphore_blocks_post_wakes_it() {
        let (mut k, a, _b) = make_kernel();
        assert_eq!(k.svc_wait(a, 0), PendAction::ContextSwitch);
        assert_eq!(k.tasks.task(a).state, TaskState::BlockedSemaphore);

        k.svc_post(0);
        assert_eq!(k.tasks.task(a).state, TaskState::Ready);
        assert_eq!(k.semaphores[0].count(), 0);
    }

    #[test]
    fn stop_thread_blocked_on_semaphore_is_removed_and_skipped_by_post() {
        let (mut k, a, b) = make_kernel();
        k.svc_wait(a, 0);
        k.svc_wait(b, 0);

        let pid_a = k.tasks.task(a).pid;
        k.svc_stop_thread(pid_a);

        assert_eq!(k.tasks.task(a).state, TaskState::Stopped);
        assert!(!k.semaphores[0].queue().contains(&a));

        k.svc_post(0);
        assert_eq!(k.tasks.task(b).state, TaskState::Ready);
        assert_eq!(k.tasks.task(a).state, TaskState::Stopped);
    }

    #[test]
    fn stop_thread_releases_owned_mutex_to_next_waiter() {
        let (mut k, a, b) = make_kernel();
        k.svc_lock(a, 0);
        k.svc_lock(b, 0);

        let pid_a = k.tasks.task(a).pid;
        k.svc_stop_thread(pid_a);

        assert_eq!(k.mutexes[0].owner(), Some(b));
        assert_eq!(k.tasks.task(b).state, TaskState::Ready);
    }

    #[test]
    fn create_thread_twice_with_same_entry_fails() {
        let mut k = Kernel::new();
        assert!(k
            .tasks
            .create_thread(0x2000, "x", 0, 0x2000_1000, [0; 4])
            .is_some());
        assert!(k
            .tasks
            .create_thread(0x2000, "y", 1, 0x2000_1400, [0; 4])
            .is_none());
    }

    #[test]
    fn get_pid_is_silent_no_op_for_unknown_name() {
        let (k, _a, _b) = make_kernel();
        assert_eq!(k.svc_get_pid("nonexistent"), None);
    }

    #[test]
    fn out_of_range_mutex_index_is_a_no_op() {
        let (mut k, a, _b) = make_kernel();
        assert_eq!(k.svc_lock(a, MAX_MUTEXES + 5), PendAction::None);
    }
}
