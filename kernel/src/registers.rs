#![allow(dead_code)]
//! ARMv7-M System Control Space register addresses used by the kernel.
//!
//! Named after the register, not the bit field, the same way
//! `drivers::stm32f407_registers` only declares peripheral base addresses
//! and leaves bit-level encoding to the caller. Values are the TRM-standard
//! SCS layout, which is identical on the teacher's STM32F407 and the
//! original `TM4C123GH6PM` source this kernel's MPU/SVC logic is grounded
//! on.

/// Interrupt Control and State Register — bit 28 (`PENDSVSET`) requests a
/// PendSV exception.
pub const SCB_ICSR: *mut u32 = 0xE000_ED04 as *mut u32;
pub const ICSR_PENDSVSET: u32 = 1 << 28;

/// Application Interrupt and Reset Control Register.
pub const SCB_AIRCR: *mut u32 = 0xE000_ED0C as *mut u32;
pub const AIRCR_VECTKEY: u32 = 0x05FA << 16;
pub const AIRCR_SYSRESETREQ: u32 = 1 << 2;

/// System Handler Priority Register 3 — PendSV (bits 23:16) and SysTick
/// (bits 31:24) priorities.
pub const SCB_SHPR3: *mut u32 = 0xE000_ED20 as *mut u32;

/// System Handler Control and State Register — enables the dedicated
/// MemManage/BusFault/UsageFault handlers instead of escalating to HardFault.
pub const SCB_SHCSR: *mut u32 = 0xE000_ED24 as *mut u32;
pub const SHCSR_MEMFAULTENA: u32 = 1 << 16;
pub const SHCSR_BUSFAULTENA: u32 = 1 << 17;
pub const SHCSR_USGFAULTENA: u32 = 1 << 18;

/// MemManage Fault Address Register — valid address of an MPU violation.
pub const MM_FAULT_ADDR: *mut u32 = 0xE000_ED34 as *mut u32;
/// Configurable Fault Status Register — low byte is the MemManage status.
pub const CFSR: *mut u32 = 0xE000_ED28 as *mut u32;
/// HardFault Status Register.
pub const HFSR: *mut u32 = 0xE000_ED2C as *mut u32;

/// MPU Type Register — bits 15:8 report the number of supported regions.
pub const MPU_TYPE: *mut u32 = 0xE000_ED90 as *mut u32;
/// MPU Control Register.
pub const MPU_CTRL: *mut u32 = 0xE000_ED94 as *mut u32;
pub const MPU_CTRL_ENABLE: u32 = 1;
pub const MPU_CTRL_PRIVDEFENA: u32 = 1 << 2;
/// MPU Region Number Register.
pub const MPU_RNR: *mut u32 = 0xE000_ED98 as *mut u32;
/// MPU Region Base Address Register.
pub const MPU_RBAR: *mut u32 = 0xE000_ED9C as *mut u32;
/// MPU Region Attribute and Size Register.
pub const MPU_RASR: *mut u32 = 0xE000_EDA0 as *mut u32;
pub const MPU_RASR_ENABLE: u32 = 1;
pub const MPU_RASR_XN: u32 = 1 << 28;

/// SysTick Control and Status Register.
pub const SYST_CSR: *mut u32 = 0xE000_E010 as *mut u32;
pub const SYST_CSR_ENABLE: u32 = 1;
pub const SYST_CSR_TICKINT: u32 = 1 << 1;
pub const SYST_CSR_CLKSOURCE: u32 = 1 << 2;
/// SysTick Reload Value Register.
pub const SYST_RVR: *mut u32 = 0xE000_E014 as *mut u32;
