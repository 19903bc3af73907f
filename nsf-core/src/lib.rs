// Clippy rules to disable.
#![allow(clippy::new_without_default)]

pub mod bus;
pub mod constants;
pub mod cpu_6502;
pub mod nsf;
pub mod opcodes;
pub mod player;
