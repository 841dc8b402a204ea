//! Command table standing in for the external shell: the tokenizer, UART
//! reads, and number formatting aren't carried forward, but the 1:1
//! mapping from a parsed command to an ABI call is part of the kernel's
//! external interface, so it's captured here as the data a real shell
//! would dispatch through.

use kernel::abi;

pub enum ShellCommand {
    Yield,
    Sleep(u32),
    Lock(u32),
    Unlock(u32),
    Wait(u32),
    Post(u32),
    RestartThread(u32),
    Preempt(bool),
    StopThread(u32),
    Reboot,
    SetThreadPriority(u32, u8),
    Sched(bool),
    /// `ps`: dump every task-table slot.
    Ps,
    /// `ipcs`: dump one mutex's lock state/owner/queue.
    MutexInfo(u32),
    /// `ipcs`: dump one semaphore's count/queue.
    SemaphoreInfo(u32),
    /// Looks a task up by name, returning its pid (0 if not found).
    PidOf(&'static str),
}

pub fn dispatch(cmd: ShellCommand) {
    match cmd {
        ShellCommand::Yield => abi::yield_now(),
        ShellCommand::Sleep(ticks) => abi::sleep(ticks),
        ShellCommand::Lock(mutex) => abi::lock(mutex),
        ShellCommand::Unlock(mutex) => abi::unlock(mutex),
        ShellCommand::Wait(semaphore) => abi::wait(semaphore),
        ShellCommand::Post(semaphore) => abi::post(semaphore),
        ShellCommand::RestartThread(pid) => abi::restart_thread(pid),
        ShellCommand::Preempt(on) => abi::preempt(on),
        ShellCommand::StopThread(pid) => abi::stop_thread(pid),
        ShellCommand::Reboot => abi::reboot(),
        ShellCommand::SetThreadPriority(pid, priority) => abi::set_thread_priority(pid, priority),
        ShellCommand::Sched(priority_mode) => abi::sched(priority_mode),
        ShellCommand::Ps => {
            let mut out = abi::PsData::new();
            abi::get_tcb(&mut out);
        }
        ShellCommand::MutexInfo(mutex) => {
            let mut out = abi::MutexInfo::new();
            abi::get_mutex_info(mutex, &mut out);
        }
        ShellCommand::SemaphoreInfo(semaphore) => {
            let mut out = abi::SemaphoreInfo::new();
            abi::get_semaphore_info(semaphore, &mut out);
        }
        ShellCommand::PidOf(name) => {
            let _ = abi::get_pid(name);
        }
    }
}
