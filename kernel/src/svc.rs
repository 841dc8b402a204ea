//! SVC (supervisor call) trap handler.
//!
//! Decodes the trap number from the `svc #N` instruction itself (the
//! immediate is the byte before the stacked return PC) and the call's
//! arguments from r0..r3 of the stacked exception frame — the technique
//! `original_source/kernel.c::svCallIsr` uses (`*(getPsp() + offset)`),
//! expressed here as a typed view over the stacked frame instead of raw
//! pointer offsets.

use cortex_m_rt::exception;

use kernel_core::syscall::{PendAction, SvcNumber};

use crate::os::{schedule, with_kernel};
use crate::registers::{AIRCR_SYSRESETREQ, AIRCR_VECTKEY, SCB_AIRCR};

#[repr(C)]
struct StackedFrame {
    r0: u32,
    r1: u32,
    r2: u32,
    r3: u32,
    r12: u32,
    lr: u32,
    pc: u32,
    xpsr: u32,
}

fn act(action: PendAction) {
    if action == PendAction::ContextSwitch {
        schedule();
    }
}

#[exception]
unsafe fn SVCall() {
    let psp = cortex_m::register::psp::read();
    let frame = unsafe { &*(psp as *const StackedFrame) };
    // svc imm8 is the low byte of the two-byte Thumb encoding just before
    // the stacked return address.
    let trap_instr = unsafe { core::ptr::read_volatile((frame.pc - 2) as *const u16) };
    let svc_number = (trap_instr & 0xFF) as u8;

    let Ok(call) = SvcNumber::try_from(svc_number) else {
        return;
    };

    use SvcNumber::*;
    match call {
        Yield => act(with_kernel(|k| k.svc_yield())),
        Sleep => act(with_kernel(|k| {
            let current = k.tasks.current();
            k.svc_sleep(current, frame.r0)
        })),
        Lock => act(with_kernel(|k| {
            let current = k.tasks.current();
            k.svc_lock(current, frame.r0 as usize)
        })),
        Unlock => act(with_kernel(|k| {
            let current = k.tasks.current();
            k.svc_unlock(current, frame.r0 as usize)
        })),
        Wait => act(with_kernel(|k| {
            let current = k.tasks.current();
            k.svc_wait(current, frame.r0 as usize)
        })),
        Post => act(with_kernel(|k| k.svc_post(frame.r0 as usize))),
        GetPid => {
            // `r0` carries a `(ptr, len)` pair in `r0`/`r1` on entry; the
            // result overwrites the stacked `r0` slot so the caller sees it
            // in its own r0 register on exception return.
            let name_ptr = frame.r0 as *const u8;
            let name_len = frame.r1 as usize;
            let name = unsafe {
                core::str::from_utf8_unchecked(core::slice::from_raw_parts(name_ptr, name_len))
            };
            let pid = with_kernel(|k| k.svc_get_pid(name)).unwrap_or(0);
            unsafe {
                core::ptr::write_volatile(psp as *mut u32, pid);
            }
        }
        RestartThread => act(with_kernel(|k| k.svc_restart_thread(frame.r0))),
        Preempt => act(with_kernel(|k| k.svc_preempt(frame.r0 != 0))),
        StopThread => act(with_kernel(|k| k.svc_stop_thread(frame.r0))),
        Reboot => unsafe {
            core::ptr::write_volatile(SCB_AIRCR, AIRCR_VECTKEY | AIRCR_SYSRESETREQ);
            loop {}
        },
        SetThreadPriority => {
            act(with_kernel(|k| k.svc_set_thread_priority(frame.r0, frame.r1 as u8)))
        }
        Sched => act(with_kernel(|k| k.svc_sched(frame.r0 != 0))),
        // The introspection calls return structured data through
        // `kernel_core::ps`, not a single register: `r1` carries a pointer
        // to a caller-allocated `abi::{MutexInfo,SemaphoreInfo,PsData}`
        // buffer, filled in place the same way `GetPid` writes its scalar
        // result back through the stacked `r0` slot.
        GetMutexInfo => {
            let mutex = frame.r0 as usize;
            let out = frame.r1 as *mut crate::abi::MutexInfo;
            with_kernel(|k| {
                if let Some(info) = k.svc_get_mutex_info(mutex) {
                    unsafe { (*out).fill_from(&info) };
                }
            });
        }
        GetSemaphoreInfo => {
            let semaphore = frame.r0 as usize;
            let out = frame.r1 as *mut crate::abi::SemaphoreInfo;
            with_kernel(|k| {
                if let Some(info) = k.svc_get_semaphore_info(semaphore) {
                    unsafe { (*out).fill_from(&info) };
                }
            });
        }
        GetTcb => {
            let out = frame.r1 as *mut crate::abi::PsData;
            with_kernel(|k| {
                let data = k.svc_get_tcb();
                unsafe { (*out).fill_from(&data) };
            });
        }
    }
}
