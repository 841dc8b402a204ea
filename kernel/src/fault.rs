//! Fault handlers.
//!
//! The original source's `faults.c` dumps the entire stacked register set
//! over UART with hand-rolled hex formatting; that printer isn't carried
//! forward. What's kept is the policy: log a structured record with
//! `defmt` and decide whether the system can keep
//! running. An MPU fault only ever means one task overstepped its own
//! region, so it's recoverable by simply descheduling that task; bus and
//! usage faults mean something is structurally wrong and there is no task
//! to safely resume, so they halt.

use cortex_m_rt::{exception, ExceptionFrame};

use crate::os::schedule;
use crate::registers::{CFSR, HFSR, MM_FAULT_ADDR};

#[exception]
unsafe fn MemoryManagement() {
    let cfsr = unsafe { core::ptr::read_volatile(CFSR) };
    let addr = unsafe { core::ptr::read_volatile(MM_FAULT_ADDR) };
    defmt::error!("mpu fault: cfsr={:x} addr={:x}", cfsr, addr);
    // Write-one-to-clear the MemManage status byte before returning.
    unsafe { core::ptr::write_volatile(CFSR, cfsr & 0xFF) };
    schedule();
}

#[exception]
unsafe fn BusFault() {
    let cfsr = unsafe { core::ptr::read_volatile(CFSR) };
    defmt::error!("bus fault: cfsr={:x}", cfsr);
    loop {}
}

#[exception]
unsafe fn UsageFault() {
    let cfsr = unsafe { core::ptr::read_volatile(CFSR) };
    defmt::error!("usage fault: cfsr={:x}", cfsr);
    loop {}
}

#[exception]
unsafe fn HardFault(frame: &ExceptionFrame) -> ! {
    let hfsr = unsafe { core::ptr::read_volatile(HFSR) };
    defmt::error!("hard fault: hfsr={:x} pc={:x}", hfsr, frame.pc());
    loop {}
}
