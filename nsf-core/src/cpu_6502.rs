use crate::bus::Bus;
use crate::constants::{memory_range, InterruptVectors};
use crate::opcodes::Mode;
mod opcodes_jump;
mod opcodes_logical;
mod opcodes_move;

use opcodes_jump::*;
use opcodes_logical::*;
use opcodes_move::*;

#[cfg(test)]
mod test_helpers;


#[rustfmt::skip]
pub enum StatusFlag {
    Carry            = 0b00000001,
    Zero             = 0b00000010,
    InterruptDisable = 0b00000100,
    Decimal          = 0b00001000,
    Break            = 0b00010000,
    Push             = 0b00100000,
    Overflow         = 0b01000000,
    Negative         = 0b10000000,
}

/// A fault that stops the interpreter. Execution does not silently continue
/// past a byte the dispatch table has no entry for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    UnknownOpcode { opcode: u8, pc: u16 },
}

/// A copy of the register file, cheap enough to hand out freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
}

pub type ObserverId = u64;
pub type ObserverCallback = Box<dyn FnMut(&Cpu6502)>;

struct Observer {
    id: ObserverId,
    callback: ObserverCallback,
}

/// This struct implements the MOS Technology 6502 central processing unit,
/// to the precision an NSF music program needs: registers, flags and memory
/// are exact per instruction, while cycles are not counted.
///
/// http://www.6502.org/
/// https://en.wikipedia.org/wiki/MOS_Technology_6502
pub struct Cpu6502 {
    // The bus is what holds all the memory access for the program.
    pub bus: Bus,
    // "A" register - The accumulator. Typical results of operations are stored here.
    // In combination with the status register, supports using the status register for
    // carrying, overflow detection, and so on.
    pub a: u8,
    /// "X" register.
    /// Used for several addressing modes. They can be used as loop counters easily, using
    /// INC/DEC and branch instructions. Not being the accumulator, they have limited
    /// addressing modes themselves when loading and saving.
    pub x: u8,
    /// "Y" register.
    pub y: u8,

    /// "PC" - Program counter.
    /// The 2-byte program counter PC supports 65536 direct (unbanked) memory locations.
    /// It moves by the CPU's internal fetch logic incrementing it, and by the
    /// RTS/JMP/JSR/Branch instructions.
    pub pc: u16,

    /// "S" - Stack pointer
    ///
    /// The 6502 has hardware support for a stack implemented using a 256-byte array
    /// whose location is hardcoded at page 0x01 (0x0100-0x01FF), using the S register
    /// for a stack pointer.
    ///
    /// The 6502 uses a descending stack (it grows downwards)
    /// https://wiki.nesdev.com/w/index.php/Stack
    pub s: u8,

    /// "P" - Status register.
    /// P has 6 bits used by the ALU but is byte-wide. PHP, PLP, arithmetic, testing,
    /// and branch instructions can access this register.
    ///
    /// http://wiki.nesdev.com/w/index.php/Status_flags
    ///
    ///   7  bit  0
    /// ---- ----
    /// NVss DIZC
    /// |||| ||||
    /// |||| |||+- Carry
    /// |||| ||+-- Zero
    /// |||| |+--- Interrupt Disable
    /// |||| +---- Decimal
    /// ||++------ No CPU effect, see: the B flag
    /// |+-------- Overflow
    /// +--------- Negative
    pub p: u8,

    /// The number of instructions executed so far. Increments by exactly one
    /// per successful step.
    pub tick_count: u64,

    observers: Vec<Observer>,
    next_observer_id: ObserverId,
}

macro_rules! mode_to_type {
    (abs) => {
        Mode::Absolute
    };
    (abx) => {
        Mode::AbsoluteIndexedX
    };
    (aby) => {
        Mode::AbsoluteIndexedY
    };
    (imm) => {
        Mode::Immediate
    };
    (imp) => {
        Mode::Implied
    };
    (ind) => {
        Mode::Indirect
    };
    (izx) => {
        Mode::IndirectX
    };
    (izy) => {
        Mode::IndirectY
    };
    (rel) => {
        Mode::Relative
    };
    (a) => {
        Mode::RegisterA
    };
    (zp) => {
        Mode::ZeroPage
    };
    (zpx) => {
        Mode::ZeroPageX
    };
    (zpy) => {
        Mode::ZeroPageY
    };
}

/// Usage:
/// match_opcode!(self, opcode, [
///   { 0x00, brk, imp },
/// ]);
///
/// Bytes without an entry fall through to the unknown opcode fault.
macro_rules! match_opcode {
    (
        $self:expr,
        $opcode:expr,
        [
            $({
                $byte:expr,
                $op_name:ident,
                $addressing_mode:ident
            }),* $(,)?
        ]
    ) => {
        match $opcode {
            $(
                $byte => $op_name($self, mode_to_type!($addressing_mode)),
            )*
            _ => {
                return Err(StepError::UnknownOpcode {
                    opcode: $opcode,
                    pc: $self.pc.wrapping_sub(1),
                });
            }
        }
    };
}

impl Cpu6502 {
    pub fn new(bus: Bus) -> Cpu6502 {
        Cpu6502 {
            bus,
            // Accumulator
            a: 0,
            // X & Y Registers.
            x: 0,
            y: 0,
            // The program counter. The NSF driver installs the real entry
            // point with a synthetic jump, so nothing is read from the reset
            // vector here.
            pc: 0,
            // Stack pointer - It grows down, so initialize it at the top.
            s: 0xFF,
            // Status register
            p: 0,
            tick_count: 0,
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    /// Perform a synthetic JMP, pointing the program counter somewhere new
    /// without executing an instruction.
    pub fn jump(&mut self, address: u16) {
        self.pc = address;
    }

    pub fn registers(&self) -> Registers {
        Registers {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.p,
        }
    }

    pub fn instruction_count(&self) -> u64 {
        self.tick_count
    }

    /// Register a callback that runs after every successful step, in
    /// subscription order, before `step` returns. The id stays valid until
    /// `unsubscribe` is called with it.
    pub fn subscribe(&mut self, callback: ObserverCallback) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push(Observer { id, callback });
        id
    }

    /// Remove a callback. Returns false if the id was never subscribed or was
    /// already removed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let count_before = self.observers.len();
        self.observers.retain(|observer| observer.id != id);
        self.observers.len() != count_before
    }

    fn notify_observers(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        // The callbacks need to borrow the cpu, so take the list out first.
        let mut observers = std::mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            (observer.callback)(self);
        }
        let subscribed_during_notify = std::mem::replace(&mut self.observers, observers);
        self.observers.extend(subscribed_during_notify);
    }

    /// Read the PC without incrementing.
    pub fn peek_u8(&self) -> u8 {
        self.bus.read_u8(self.pc)
    }

    /// Increment the program counter and read the next u8 value following
    /// the current pc.
    fn next_u8(&mut self) -> u8 {
        let value = self.bus.read_u8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Increment the program counter and read the next u16 value following
    /// the current pc.
    fn next_u16(&mut self) -> u16 {
        let value = self.bus.read_u16(self.pc);
        self.pc = self.pc.wrapping_add(2);
        value
    }

    /// Step while the predicate is false. Useful for tests and for drivers
    /// that run until a program reaches a known state.
    pub fn run_until<F>(&mut self, predicate: F) -> Result<(), StepError>
    where
        F: Fn(&Cpu6502) -> bool,
    {
        while !predicate(self) {
            self.step()?;
        }
        Ok(())
    }

    /// Execute a single instruction: fetch the opcode byte, consume operands
    /// according to the addressing mode, apply the operation and its flag
    /// updates, then bump the instruction counter and notify observers.
    pub fn step(&mut self) -> Result<(), StepError> {
        let opcode = self.next_u8();

        match_opcode!(self, opcode, [
            { 0x00, brk, imp },
            { 0x01, ora, izx },
            { 0x05, ora, zp },
            { 0x06, asl, zp },
            { 0x08, php, imp },
            { 0x09, ora, imm },
            { 0x0a, asl, a },
            { 0x0d, ora, abs },
            { 0x0e, asl, abs },
            { 0x10, bpl, rel },
            { 0x11, ora, izy },
            { 0x15, ora, zpx },
            { 0x16, asl, zpx },
            { 0x18, clc, imp },
            { 0x19, ora, aby },
            { 0x1d, ora, abx },
            { 0x1e, asl, abx },
            { 0x20, jsr, abs },
            { 0x21, and, izx },
            { 0x24, bit, zp },
            { 0x25, and, zp },
            { 0x26, rol, zp },
            { 0x28, plp, imp },
            { 0x29, and, imm },
            { 0x2a, rol, a },
            { 0x2c, bit, abs },
            { 0x2d, and, abs },
            { 0x2e, rol, abs },
            { 0x30, bmi, rel },
            { 0x31, and, izy },
            { 0x35, and, zpx },
            { 0x36, rol, zpx },
            { 0x38, sec, imp },
            { 0x39, and, aby },
            { 0x3d, and, abx },
            { 0x3e, rol, abx },
            { 0x40, rti, imp },
            { 0x41, eor, izx },
            { 0x45, eor, zp },
            { 0x46, lsr, zp },
            { 0x48, pha, imp },
            { 0x49, eor, imm },
            { 0x4a, lsr, a },
            { 0x4c, jmp, abs },
            { 0x4d, eor, abs },
            { 0x4e, lsr, abs },
            { 0x50, bvc, rel },
            { 0x51, eor, izy },
            { 0x55, eor, zpx },
            { 0x56, lsr, zpx },
            { 0x58, cli, imp },
            { 0x59, eor, aby },
            { 0x5d, eor, abx },
            { 0x5e, lsr, abx },
            { 0x60, rts, imp },
            { 0x61, adc, izx },
            { 0x65, adc, zp },
            { 0x66, ror, zp },
            { 0x68, pla, imp },
            { 0x69, adc, imm },
            { 0x6a, ror, a },
            { 0x6c, jmp, ind },
            { 0x6d, adc, abs },
            { 0x6e, ror, abs },
            { 0x70, bvs, rel },
            { 0x71, adc, izy },
            { 0x75, adc, zpx },
            { 0x76, ror, zpx },
            { 0x78, sei, imp },
            { 0x79, adc, aby },
            { 0x7d, adc, abx },
            { 0x7e, ror, abx },
            { 0x81, sta, izx },
            { 0x84, sty, zp },
            { 0x85, sta, zp },
            { 0x86, stx, zp },
            { 0x88, dey, imp },
            { 0x8a, txa, imp },
            { 0x8c, sty, abs },
            { 0x8d, sta, abs },
            { 0x8e, stx, abs },
            { 0x90, bcc, rel },
            { 0x91, sta, izy },
            { 0x94, sty, zpx },
            { 0x95, sta, zpx },
            { 0x96, stx, zpy },
            { 0x98, tya, imp },
            { 0x99, sta, aby },
            { 0x9a, txs, imp },
            { 0x9d, sta, abx },
            { 0xa0, ldy, imm },
            { 0xa1, lda, izx },
            { 0xa2, ldx, imm },
            { 0xa4, ldy, zp },
            { 0xa5, lda, zp },
            { 0xa6, ldx, zp },
            { 0xa8, tay, imp },
            { 0xa9, lda, imm },
            { 0xaa, tax, imp },
            { 0xac, ldy, abs },
            { 0xad, lda, abs },
            { 0xae, ldx, abs },
            { 0xb0, bcs, rel },
            { 0xb1, lda, izy },
            { 0xb4, ldy, zpx },
            { 0xb5, lda, zpx },
            { 0xb6, ldx, zpy },
            { 0xb8, clv, imp },
            { 0xb9, lda, aby },
            { 0xba, tsx, imp },
            { 0xbc, ldy, abx },
            { 0xbd, lda, abx },
            { 0xbe, ldx, aby },
            { 0xc0, cpy, imm },
            { 0xc1, cmp, izx },
            { 0xc4, cpy, zp },
            { 0xc5, cmp, zp },
            { 0xc6, dec, zp },
            { 0xc8, iny, imp },
            { 0xc9, cmp, imm },
            { 0xca, dex, imp },
            { 0xcc, cpy, abs },
            { 0xcd, cmp, abs },
            { 0xce, dec, abs },
            { 0xd0, bne, rel },
            { 0xd1, cmp, izy },
            { 0xd5, cmp, zpx },
            { 0xd6, dec, zpx },
            { 0xd8, cld, imp },
            { 0xd9, cmp, aby },
            { 0xdd, cmp, abx },
            { 0xde, dec, abx },
            { 0xe0, cpx, imm },
            { 0xe1, sbc, izx },
            { 0xe4, cpx, zp },
            { 0xe5, sbc, zp },
            { 0xe6, inc, zp },
            { 0xe8, inx, imp },
            { 0xe9, sbc, imm },
            { 0xea, nop, imp },
            { 0xec, cpx, abs },
            { 0xed, sbc, abs },
            { 0xee, inc, abs },
            { 0xf0, beq, rel },
            { 0xf1, sbc, izy },
            { 0xf5, sbc, zpx },
            { 0xf6, inc, zpx },
            { 0xf8, sed, imp },
            { 0xf9, sbc, aby },
            { 0xfd, sbc, abx },
            { 0xfe, inc, abx },
        ]);

        self.tick_count += 1;
        self.notify_observers();
        Ok(())
    }

    /// Resolve an addressing mode to the effective address, consuming the
    /// operand bytes and advancing the program counter past them.
    fn get_operand_address(&mut self, mode: Mode) -> u16 {
        match mode {
            // The two bytes after the opcode name the address outright,
            // little-endian.
            Mode::Absolute => self.next_u16(),
            // Absolute plus an index register. The add is a full 16-bit add,
            // carrying into the high byte.
            Mode::AbsoluteIndexedX => {
                let base_address = self.next_u16();
                base_address.wrapping_add(self.x as u16)
            }
            Mode::AbsoluteIndexedY => {
                let base_address = self.next_u16();
                base_address.wrapping_add(self.y as u16)
            }
            // The operand byte itself is the value, so the effective address
            // is wherever the pc is pointing.
            Mode::Immediate => {
                let address = self.pc;
                self.pc = self.pc.wrapping_add(1);
                address
            }
            // Only used by JMP. The operand word points at another word, and
            // that second word is the target. The hardware's page-wrap quirk
            // at $xxFF pointers is not replicated; the pointer's high byte
            // comes from the next address.
            Mode::Indirect => {
                let pointer = self.next_u16();
                self.bus.read_u16(pointer)
            }
            // The operand is a zero page address, offset by X before the
            // pointer word is read. Both pointer bytes stay in the zero page.
            Mode::IndirectX => {
                let pointer = self.next_u8().wrapping_add(self.x);
                u16::from_le_bytes([
                    self.bus.read_u8(pointer as u16),
                    self.bus.read_u8(pointer.wrapping_add(1) as u16),
                ])
            }
            // The zero page operand holds a pointer word, and Y offsets the
            // address it points at. This add is 16-bit.
            Mode::IndirectY => {
                let pointer = self.next_u8();
                let base_address = u16::from_le_bytes([
                    self.bus.read_u8(pointer as u16),
                    self.bus.read_u8(pointer.wrapping_add(1) as u16),
                ]);
                base_address.wrapping_add(self.y as u16)
            }
            // Branches only. The operand is a signed byte added to the pc
            // after the operand fetch.
            Mode::Relative => {
                let relative_offset = self.next_u8() as i8;
                self.pc.wrapping_add(relative_offset as u16)
            }
            // A single operand byte addressing the first 256 bytes of memory.
            Mode::ZeroPage => self.next_u8() as u16,
            // Zero page plus an index. The add wraps in u8 space, so the
            // effective address never leaves the zero page.
            Mode::ZeroPageX => self.next_u8().wrapping_add(self.x) as u16,
            Mode::ZeroPageY => self.next_u8().wrapping_add(self.y) as u16,
            Mode::Implied => panic!("An implied mode should never be directly activated."),
            Mode::RegisterA => panic!("Register A has no address."),
            Mode::None => panic!("Mode::None is attempting to be used."),
        }
    }

    /// Resolve a mode to both the effective address and the byte at it.
    fn get_operand(&mut self, mode: Mode) -> (u16, u8) {
        let address = self.get_operand_address(mode);
        let value = self.bus.read_u8(address);
        (address, value)
    }

    /// These flags are commonly set together.
    fn update_zero_and_negative_flag(&mut self, value: u8) {
        // Numbers can be interpreted as signed or unsigned. The negative flag only
        // cares if the most-significant bit is 1 or 0.
        let negative = 0b1000_0000;
        self.set_status_flag(StatusFlag::Zero, value == 0);
        self.set_status_flag(StatusFlag::Negative, value & negative == negative);
    }

    /// ADC and SBC operate on 9 bits. 8 of them are the register A, while the last bit
    /// is the carry flag. Store this 9th bit onto the status flag.
    fn update_carry_flag(&mut self, result: u16) {
        let carry = 0b1_0000_0000;
        self.set_status_flag(StatusFlag::Carry, result & carry == carry);
    }

    /// Overflow for ADC and SBC indicates that the result changed sign as an
    /// 8-bit two's complement number. That happens exactly when A and the
    /// operand agree on their most significant bit and the result disagrees.
    /// Must run before the result is assigned back to A.
    fn update_overflow_flag(&mut self, operand: u8, result: u8) {
        let bit_7_mask = 0b1000_0000;
        let does_overflow = bit_7_mask & !(self.a ^ operand) & (self.a ^ result) == bit_7_mask;
        self.set_status_flag(StatusFlag::Overflow, does_overflow);
    }

    fn set_status_flag(&mut self, status_flag: StatusFlag, value: bool) {
        if value {
            self.p |= status_flag as u8;
        } else {
            self.p &= !(status_flag as u8);
        }
    }

    /// The carry flag as a 0 or 1, ready for arithmetic.
    fn get_carry(&self) -> u8 {
        self.p & (StatusFlag::Carry as u8)
    }

    pub fn is_status_flag_set(&self, status_flag: StatusFlag) -> bool {
        let flag = status_flag as u8;
        self.p & flag == flag
    }

    /// This function implements pushing to the stack.
    /// See the "S" register for more details.
    fn push_stack_u8(&mut self, value: u8) {
        // The stack page is hard coded.
        let address = u16::from_le_bytes([self.s, memory_range::STACK_PAGE]);
        // The stack points to the next available memory.
        self.bus.set_u8(address, value);
        // Grow down only after setting the memory.
        self.s = self.s.wrapping_sub(1);
    }

    /// This function implements pulling from the stack.
    /// See the "S" register for more details.
    fn pull_stack_u8(&mut self) -> u8 {
        // The current stack pointer points at available memory, increment it first.
        self.s = self.s.wrapping_add(1);
        // Now read out the memory that is being pulled.
        let address = u16::from_le_bytes([self.s, memory_range::STACK_PAGE]);
        self.bus.read_u8(address)
    }

    /// Push a word, high byte first, so that it reads back little-endian.
    fn push_stack_u16(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.push_stack_u8(high);
        self.push_stack_u8(low);
    }

    fn pull_stack_u16(&mut self) -> u16 {
        let low = self.pull_stack_u8();
        let high = self.pull_stack_u8();
        u16::from_le_bytes([low, high])
    }
}
