#![no_std]
#![no_main]
#![allow(clippy::empty_loop)]

mod button;
mod led;
mod shell_demo;

use cortex_m_rt::entry;
use panic_halt as _;

use kernel::abi;
use kernel::os;

use crate::led::*;

#[entry]
fn main() -> ! {
    init_led();

    if !os::create_thread(blinker_handler, "blinker", 3, 512) {
        panic!("failed to create blinker task");
    }
    if !os::create_thread(mutex_demo_handler, "mutex-demo", 3, 512) {
        panic!("failed to create mutex-demo task");
    }
    if !os::create_thread(sem_demo_handler, "sem-demo", 4, 512) {
        panic!("failed to create sem-demo task");
    }

    os::scheduler_init(idle_handler, 512);
}

#[unsafe(no_mangle)]
pub extern "C" fn idle_handler() {
    loop {
        led1_toggle();
        abi::yield_now();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn blinker_handler() {
    loop {
        abi::sleep(100);
        led2_toggle();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn mutex_demo_handler() {
    loop {
        abi::lock(0);
        led3_toggle();
        abi::unlock(0);
        abi::yield_now();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn sem_demo_handler() {
    loop {
        abi::wait(0);
        led4_toggle();
    }
}
