//! Owns the single global kernel instance and the boot/scheduling entry
//! points.
//!
//! Mirrors the teacher's split: a bare `static mut` behind
//! `cortex_m::interrupt::free`, so kernel state is only ever mutated from
//! handler mode. The teacher's `TASKS`/
//! `CURRENT_TASK_IDX` pair becomes the single [`kernel_core::Kernel`]
//! aggregate here.

use cortex_m::interrupt;

use kernel_core::task::TaskState;
use kernel_core::Kernel;

use crate::mpu;
use crate::registers::{SCB_ICSR, SCB_SHPR3, ICSR_PENDSVSET};
use crate::systick::SysTick;

pub const CORE_CLOCK_MHZ: u32 = 16;

static mut KERNEL: Kernel = Kernel::new();

/// Runs `f` with exclusive access to the kernel state.
pub fn with_kernel<R>(f: impl FnOnce(&mut Kernel) -> R) -> R {
    interrupt::free(|_| unsafe { f(&mut *core::ptr::addr_of_mut!(KERNEL)) })
}

/// `createThread`. Allocates the task's stack out of the static SRAM
/// arena, computes its sub-region-disable mask, and registers it `Unrun`.
/// Returns whether the task was created.
pub fn create_thread(entry: unsafe extern "C" fn(), name: &str, priority: u8, stack_bytes: u32) -> bool {
    let entry_addr = entry as usize as u32;
    with_kernel(|k| {
        let Some(base) = k.heap.allocate(stack_bytes) else {
            return false;
        };
        let top = base + stack_bytes - 1;
        let srd = kernel_core::mm::generate_srd_mask(top, stack_bytes);
        k.tasks
            .create_thread(entry_addr, name, priority, top, srd)
            .is_some()
    })
}

/// Trigger a PendSV to request a context switch.
pub fn schedule() {
    unsafe {
        core::ptr::write_volatile(SCB_ICSR, ICSR_PENDSVSET);
    }
}

#[cortex_m_rt::exception]
fn SysTick() {
    let should_switch = with_kernel(|k| {
        let woke = k.tasks.tick();
        woke && k.preemption
    });
    if should_switch {
        schedule();
    }
}

// == External assembly symbols ==
// The callee-saved register push/pop across an exception boundary, and the
// jump into unprivileged thread mode, live in hand-written assembly —
// declared here exactly as the teacher declares `init_scheduler_stack`/
// `switch_sp_to_psp`/`PendSV_Handler`, implemented by a linked `.s`/`.o`
// this workspace does not provide.
unsafe extern "C" {
    fn init_scheduler_stack(top_of_stack: u32);
    fn save_callee_regs_to_psp(psp: u32);
    fn restore_callee_regs_from_psp(psp: u32);
    fn launch_task(entry: u32) -> !;
}

#[cortex_m_rt::exception]
fn PendSV() {
    unsafe {
        let old_psp = cortex_m::register::psp::read();
        save_callee_regs_to_psp(old_psp);

        let (state, new_psp, entry) = with_kernel(|k| {
            let current = k.tasks.current();
            k.tasks.task_mut(current).sp = old_psp;

            let next = k.tasks.schedule();
            k.tasks.set_current(next);
            mpu::apply_srd_mask(&k.tasks.task(next).srd);

            let state = k.tasks.task(next).state;
            if state == TaskState::Unrun {
                k.tasks.task_mut(next).state = TaskState::Ready;
            }
            (state, k.tasks.task(next).sp, k.tasks.task(next).pid)
        });

        cortex_m::register::psp::write(new_psp);
        if state == TaskState::Unrun {
            launch_task(entry);
        } else {
            restore_callee_regs_from_psp(new_psp);
        }
    }
}

/// Configures PendSV/SysTick priorities, starts the tick timer, places the
/// scheduler (MSP) stack, and launches the first task, mirroring the
/// teacher's `scheduler_init`.
pub fn scheduler_init(idle_entry: unsafe extern "C" fn(), idle_stack_bytes: u32) {
    if !create_thread(idle_entry, "idle", (kernel_core::config::NUM_PRIORITIES - 1) as u8, idle_stack_bytes) {
        panic!("failed to register idle task");
    }

    mpu::init();

    unsafe {
        init_scheduler_stack(kernel_core::config::SRAM_KERNEL_BASE + 0x1000);

        // PendSV lowest priority, SysTick just above it, matching the
        // teacher's SHPR3 programming.
        let mut v = core::ptr::read_volatile(SCB_SHPR3);
        v &= !((0xFFu32 << 16) | (0xFFu32 << 24));
        v |= (0xFFu32 << 16) | (0xF0u32 << 24);
        core::ptr::write_volatile(SCB_SHPR3, v);
    }

    let mut systick = SysTick::take().expect("SysTick already taken");
    systick.init_systic_interrupt_ms(kernel_core::config::TICK_PERIOD_MS, CORE_CLOCK_MHZ);

    let (entry, sp) = with_kernel(|k| {
        let first = k.tasks.schedule();
        k.tasks.set_current(first);
        k.tasks.task_mut(first).state = TaskState::Ready;
        mpu::apply_srd_mask(&k.tasks.task(first).srd);
        (k.tasks.task(first).pid, k.tasks.task(first).sp)
    });

    unsafe {
        cortex_m::register::psp::write(sp);
        launch_task(entry);
    }
}
