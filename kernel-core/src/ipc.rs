//! Mutexes and counting semaphores.

use heapless::Vec;

use crate::config::MAX_QUEUE;
use crate::task::TaskId;

/// A bounded FIFO of waiting task indices, shared by mutexes and
/// semaphores.
pub type WaitQueue = Vec<TaskId, MAX_QUEUE>;

/// `locked ⇔ some task holds it; queue non-empty ⇒ locked`.
pub struct Mutex {
    locked: bool,
    locked_by: Option<TaskId>,
    queue: WaitQueue,
}

impl Mutex {
    pub const fn new() -> Self {
        Mutex {
            locked: false,
            locked_by: None,
            queue: Vec::new(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn owner(&self) -> Option<TaskId> {
        self.locked_by
    }

    pub fn queue(&self) -> &[TaskId] {
        &self.queue
    }

    /// `lock`: returns `true` if the lock was acquired immediately, `false`
    /// if `task` was enqueued and must block.
    pub fn lock(&mut self, task: TaskId) -> bool {
        if !self.locked {
            self.locked = true;
            self.locked_by = Some(task);
            true
        } else {
            // A full queue silently refuses the enqueue rather than
            // panicking. The caller is left `BlockedMutex` with no queue
            // entry, which a correctly sized `MAX_QUEUE` never actually
            // triggers.
            let _ = self.queue.push(task);
            false
        }
    }

    /// `unlock`: valid only if `task` is the current owner. Transfers
    /// ownership atomically to the queue head, then compacts the queue —
    /// the new owner is assigned from `queue[0]` before it's removed,
    /// matching `original_source/kernel.c`. Returns the task that became
    /// the new owner (now `Ready`), if any.
    pub fn unlock(&mut self, task: TaskId) -> Option<TaskId> {
        if self.locked_by != Some(task) {
            return None;
        }
        self.locked = false;
        self.locked_by = None;
        if self.queue.is_empty() {
            return None;
        }
        let next = self.queue[0];
        self.queue.remove(0);
        self.locked = true;
        self.locked_by = Some(next);
        Some(next)
    }

    /// Removes `task` from the wait queue (used by `stopThread`). No-op if
    /// `task` isn't queued.
    pub fn remove_from_queue(&mut self, task: TaskId) {
        if let Some(pos) = self.queue.iter().position(|&t| t == task) {
            self.queue.remove(pos);
        }
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

/// `queue non-empty ⇒ count == 0` at the moment a waiter was enqueued.
pub struct Semaphore {
    count: u8,
    queue: WaitQueue,
}

impl Semaphore {
    pub const fn new(initial_count: u8) -> Self {
        Semaphore {
            count: initial_count,
            queue: Vec::new(),
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn queue(&self) -> &[TaskId] {
        &self.queue
    }

    /// `wait`: returns `true` if a permit was available immediately,
    /// `false` if `task` was enqueued and must block.
    pub fn wait(&mut self, task: TaskId) -> bool {
        if self.count > 0 {
            self.count -= 1;
            true
        } else {
            let _ = self.queue.push(task);
            false
        }
    }

    /// `post`: increments the count; if a waiter is queued, wakes it and
    /// transfers the permit back out, leaving the observable count
    /// unchanged from the waiter's perspective. Returns the task that was
    /// woken, if any.
    pub fn post(&mut self) -> Option<TaskId> {
        self.count += 1;
        if self.queue.is_empty() {
            return None;
        }
        let woken = self.queue[0];
        self.queue.remove(0);
        self.count -= 1;
        Some(woken)
    }

    /// Removes `task` from the wait queue and undoes the implicit permit
    /// reservation that put it there, used by `stopThread`.
    pub fn remove_from_queue(&mut self, task: TaskId) {
        if let Some(pos) = self.queue.iter().position(|&t| t == task) {
            self.queue.remove(pos);
            self.count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutex_second_locker_blocks_then_becomes_owner_on_unlock() {
        let mut m = Mutex::new();
        assert!(m.lock(0));
        assert!(!m.lock(1));
        assert_eq!(m.owner(), Some(0));

        let new_owner = m.unlock(0);
        assert_eq!(new_owner, Some(1));
        assert_eq!(m.owner(), Some(1));
        assert!(m.is_locked());
        assert!(m.queue().is_empty());
    }

    #[test]
    fn unlock_by_non_owner_is_a_no_op() {
        let mut m = Mutex::new();
        m.lock(0);
        assert_eq!(m.unlock(1), None);
        assert_eq!(m.owner(), Some(0));
    }

    #[test]
    fn queue_head_never_equals_current_owner() {
        let mut m = Mutex::new();
        m.lock(0);
        m.lock(1);
        m.lock(2);
        assert_ne!(m.queue()[0], m.owner().unwrap());
    }

    #[test]
    fn semaphore_wait_then_post_resumes_waiter_with_count_still_zero() {
        let mut s = Semaphore::new(0);
        assert!(!s.wait(0));
        assert_eq!(s.count(), 0);

        let woken = s.post();
        assert_eq!(woken, Some(0));
        assert_eq!(s.count(), 0);
    }

    #[test]
    fn semaphore_post_with_empty_queue_increments_count() {
        let mut s = Semaphore::new(0);
        assert_eq!(s.post(), None);
        assert_eq!(s.count(), 1);
    }

    #[test]
    fn semaphore_wait_strictly_decrements_when_count_positive() {
        let mut s = Semaphore::new(3);
        assert!(s.wait(0));
        assert_eq!(s.count(), 2);
    }

    #[test]
    fn stop_thread_removal_undoes_permit_reservation() {
        let mut s = Semaphore::new(0);
        s.wait(0);
        s.wait(1);
        s.remove_from_queue(0);
        assert_eq!(s.count(), 1);
        assert_eq!(s.queue(), &[1]);
    }
}
