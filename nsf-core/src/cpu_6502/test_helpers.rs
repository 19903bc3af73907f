#![macro_use]

use crate::bus::Bus;
use crate::cpu_6502::*;

pub const P: u8 = 0;
pub const C: u8 = StatusFlag::Carry as u8;
pub const Z: u8 = StatusFlag::Zero as u8;
pub const I: u8 = StatusFlag::InterruptDisable as u8;
pub const D: u8 = StatusFlag::Decimal as u8;
pub const B: u8 = StatusFlag::Break as u8;
pub const T: u8 = StatusFlag::Push as u8;
pub const V: u8 = StatusFlag::Overflow as u8;
pub const N: u8 = StatusFlag::Negative as u8;

/// Out of the way of the zero page and the stack, so programs can freely
/// poke at low memory.
pub const PROGRAM_START: u16 = 0x0600;

/// Stop a runaway test before it spins forever.
const MAX_TEST_STEPS: u64 = 10_000;

/// Place a byte program somewhere in memory and aim the CPU at it.
pub fn cpu_with_program_at(program: &[u8], start: u16) -> Cpu6502 {
    let mut bus = Bus::new();
    bus.load_at(program, start);
    let mut cpu = Cpu6502::new(bus);
    cpu.jump(start);
    cpu
}

pub fn cpu_with_program(program: &[u8]) -> Cpu6502 {
    cpu_with_program_at(program, PROGRAM_START)
}

/// Run a byte program until the CPU reaches a 0x00 byte. Memory starts
/// zeroed, so the first byte past the program acts as an end marker.
pub fn run_program_at(program: &[u8], start: u16) -> Cpu6502 {
    let mut cpu = cpu_with_program_at(program, start);
    let start_count = cpu.tick_count;
    while cpu.peek_u8() != 0x00 {
        if let Err(error) = cpu.step() {
            panic!("The program hit a fault: {:?}", error);
        }
        if cpu.tick_count - start_count > MAX_TEST_STEPS {
            panic!("The program did not terminate.");
        }
    }
    cpu
}

pub fn run_program(program: &[u8]) -> Cpu6502 {
    run_program_at(program, PROGRAM_START)
}

/// Run two's complement on a u8.
pub fn negative(n: u8) -> u8 {
    !n + 1
}

pub fn assert_register_a(program: &[u8], value: u8, status: u8) {
    let cpu = run_program(program);
    if cpu.a != value {
        panic!(
            "\n{:02x?}\nExpected register A to be {:#x} ({:#b}) but it was {:#x} ({:#b})",
            program, value, value, cpu.a, cpu.a
        );
    }
    assert_status(&cpu, status);
}

pub fn assert_register_x(program: &[u8], value: u8, status: u8) {
    let cpu = run_program(program);
    if cpu.x != value {
        panic!(
            "\n{:02x?}\nExpected register X to be {:#x} ({:#b}) but it was {:#x} ({:#b})",
            program, value, value, cpu.x, cpu.x
        );
    }
    assert_status(&cpu, status);
}

pub fn assert_register_y(program: &[u8], value: u8, status: u8) {
    let cpu = run_program(program);
    if cpu.y != value {
        panic!(
            "\n{:02x?}\nExpected register Y to be {:#x} ({:#b}) but it was {:#x} ({:#b})",
            program, value, value, cpu.y, cpu.y
        );
    }
    assert_status(&cpu, status);
}

pub fn assert_status(cpu: &Cpu6502, value: u8) {
    let mut result = String::new();

    let flags = [
        ("Carry", StatusFlag::Carry as u8),
        ("Zero", StatusFlag::Zero as u8),
        ("InterruptDisable", StatusFlag::InterruptDisable as u8),
        ("Decimal", StatusFlag::Decimal as u8),
        ("Break", StatusFlag::Break as u8),
        ("Push", StatusFlag::Push as u8),
        ("Overflow", StatusFlag::Overflow as u8),
        ("Negative", StatusFlag::Negative as u8),
    ];

    for (name, flag) in flags.iter() {
        let expected = value & flag == *flag;
        let actual = cpu.p & flag == *flag;
        if expected != actual {
            result.push_str(&format!(
                "Expected StatusFlag::{} to be {} but received {}\n",
                name, expected, actual
            ));
        }
    }

    if cpu.p != value {
        panic!(
            "\nExpected cpu status 0b{:08b} to match 0b{:08b}\n{}",
            cpu.p, value, result
        );
    }
}

#[macro_export]
macro_rules! register_a {
    ($name:ident, $a:expr, $p:expr, $program:expr) => {
        #[test]
        pub fn $name() {
            assert_register_a($program, $a, $p);
        }
    };
}

#[macro_export]
macro_rules! register_x {
    ($name:ident, $x:expr, $p:expr, $program:expr) => {
        #[test]
        fn $name() {
            assert_register_x($program, $x, $p);
        }
    };
}

#[macro_export]
macro_rules! register_y {
    ($name:ident, $y:expr, $p:expr, $program:expr) => {
        #[test]
        fn $name() {
            assert_register_y($program, $y, $p);
        }
    };
}

#[macro_export]
macro_rules! status {
    ($name:ident, $p:expr, $program:expr) => {
        #[test]
        fn $name() {
            let cpu = run_program($program);
            assert_status(&cpu, $p);
        }
    };
}

#[macro_export]
macro_rules! memory {
    ($name:ident, [$addr:expr, $expected:expr], $program:expr) => {
        #[test]
        fn $name() {
            let cpu = run_program($program);
            let actual = cpu.bus.read_u8($addr);
            if actual != $expected {
                panic!(
                    "\nExpected address {:#x} to contain {:#x} ({:#b}) but it was {:#x} ({:#b})",
                    $addr, $expected, $expected, actual, actual
                );
            }
        }
    };
}
