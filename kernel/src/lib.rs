#![no_std]

pub mod abi;
pub mod fault;
pub mod mpu;
pub mod os;
pub mod registers;
pub mod svc;
pub mod systick;
