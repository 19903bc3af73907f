use crate::cpu_6502::*;

/// Apply the logical "or" operator on the accumulator.
/// Function: A:=A or {adr}
/// Flags: N Z
pub fn ora(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    cpu.a |= operand;
    cpu.update_zero_and_negative_flag(cpu.a);
}

/// Apply the logical "and" operator on the accumulator.
/// Function: A:=A&{adr}
/// Flags: N Z
pub fn and(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    cpu.a &= operand;
    cpu.update_zero_and_negative_flag(cpu.a);
}

/// Logical Exclusive OR
/// Function: A:=A exor {adr}
/// Flags: N Z
pub fn eor(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    cpu.a ^= operand;
    cpu.update_zero_and_negative_flag(cpu.a);
}

fn add_impl(cpu: &mut Cpu6502, operand: u8) {
    // Translating to u16 means that the values won't wrap, so wrapping
    // add is not needed.
    let result_u16 =
        // Get the carry from the previous operation, and carry it over
        // into this one, but operate in the u16 space as to not overflow.
        cpu.get_carry() as u16 + // Either 0x00 or 0x01
        cpu.a as u16 +
        operand as u16;

    let result_u8 = result_u16 as u8;

    cpu.update_zero_and_negative_flag(result_u8);
    // Take the 0x100 value here, and set it to the register. This can then carry
    // over into the next byte of a number.
    cpu.update_carry_flag(result_u16);
    cpu.update_overflow_flag(operand, result_u8);
    cpu.a = result_u8;
}

/// Add with Carry. The decimal flag is tracked by SED/CLD but has no effect
/// here; the 2A03 in the NES has no BCD unit.
/// Function: A:=A+{adr}+C
/// Flags: N V Z C
pub fn adc(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    add_impl(cpu, operand);
}

/// Subtract with Carry
/// Function: A:=A-{adr}+C-1
/// Flags: N V Z C
pub fn sbc(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);

    // Subtraction is addition of the two's complement. Normally that would be
    // `!operand + 1`; here the inverted operand goes through the adder and
    // the carry flag provides the +1, which is why a program runs SEC before
    // a single-byte sbc. The carry then ends up set when no borrow happened.
    add_impl(cpu, !operand);
}

/// Compare A with source. Only the flags record the outcome, the register
/// keeps its value.
/// http://6502.org/tutorials/compare_instructions.html
/// Function: A-{adr}
/// Flags: N Z C
pub fn cmp(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    cpu.update_zero_and_negative_flag(cpu.a.wrapping_sub(operand));
    cpu.set_status_flag(StatusFlag::Carry, cpu.a >= operand);
}

/// Compare X with source
/// Function: X-{adr}
/// Flags: N Z C
pub fn cpx(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    cpu.update_zero_and_negative_flag(cpu.x.wrapping_sub(operand));
    cpu.set_status_flag(StatusFlag::Carry, cpu.x >= operand);
}

/// Compare Y with source
/// Function: Y-{adr}
/// Flags: N Z C
pub fn cpy(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    cpu.update_zero_and_negative_flag(cpu.y.wrapping_sub(operand));
    cpu.set_status_flag(StatusFlag::Carry, cpu.y >= operand);
}

/// Decrement at an address
/// Function: {adr}:={adr}-1
/// Flags: N Z
pub fn dec(cpu: &mut Cpu6502, mode: Mode) {
    let (address, operand) = cpu.get_operand(mode);
    let result = operand.wrapping_sub(1);
    cpu.update_zero_and_negative_flag(result);
    cpu.bus.set_u8(address, result);
}

/// Decrement X
/// Function: X:=X-1
/// Flags: N Z
pub fn dex(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.update_zero_and_negative_flag(cpu.x);
}

/// Decrement Y
/// Function: Y:=Y-1
/// Flags: N Z
pub fn dey(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.update_zero_and_negative_flag(cpu.y);
}

/// Increment the address
/// Function: {adr}:={adr}+1
/// Flags: N Z
pub fn inc(cpu: &mut Cpu6502, mode: Mode) {
    let (address, operand) = cpu.get_operand(mode);
    let result = operand.wrapping_add(1);
    cpu.update_zero_and_negative_flag(result);
    cpu.bus.set_u8(address, result);
}

/// Increment X
/// Function: X:=X+1
/// Flags: N Z
pub fn inx(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.x = cpu.x.wrapping_add(1);
    cpu.update_zero_and_negative_flag(cpu.x);
}

/// Increment Y
/// Function: Y:=Y+1
/// Flags: N Z
pub fn iny(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.y = cpu.y.wrapping_add(1);
    cpu.update_zero_and_negative_flag(cpu.y);
}

/// The shifts and rotates either operate on a byte in memory or directly on
/// the accumulator, depending on the opcode's mode.
fn read_shift_operand(cpu: &mut Cpu6502, mode: Mode) -> (Option<u16>, u8) {
    if mode == Mode::RegisterA {
        (None, cpu.a)
    } else {
        let (address, operand) = cpu.get_operand(mode);
        (Some(address), operand)
    }
}

fn write_shift_result(cpu: &mut Cpu6502, target: Option<u16>, result: u8) {
    match target {
        Some(address) => cpu.bus.set_u8(address, result),
        None => cpu.a = result,
    }
}

/// Arithmetic shift left
/// Function: {adr}:={adr}*2
/// Flags: N Z C
pub fn asl(cpu: &mut Cpu6502, mode: Mode) {
    let (target, operand) = read_shift_operand(cpu, mode);
    let result = operand << 1;
    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b1000_0000 != 0);
    write_shift_result(cpu, target, result);
}

/// Rotate left
/// Function: {adr}:={adr}*2+C
/// Flags: N Z C
pub fn rol(cpu: &mut Cpu6502, mode: Mode) {
    let (target, operand) = read_shift_operand(cpu, mode);
    let result = (operand << 1) | cpu.get_carry();
    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b1000_0000 != 0);
    write_shift_result(cpu, target, result);
}

/// Logical shift right
/// Function: {adr}:={adr}/2
/// Flags: N Z C
pub fn lsr(cpu: &mut Cpu6502, mode: Mode) {
    let (target, operand) = read_shift_operand(cpu, mode);
    let result = operand >> 1;
    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b0000_0001 != 0);
    write_shift_result(cpu, target, result);
}

/// Rotate right
/// Function: {adr}:={adr}/2+C*128
/// Flags: N Z C
pub fn ror(cpu: &mut Cpu6502, mode: Mode) {
    let (target, operand) = read_shift_operand(cpu, mode);

    let result =
        // Shift the operand, {adr}/2
        (operand >> 1) |
        // Move the carry bit to the top, C*128
        (cpu.get_carry() << 7);

    cpu.update_zero_and_negative_flag(result);
    // The Carry flag contains the bit that was shifted out:
    cpu.set_status_flag(StatusFlag::Carry, operand & 0b0000_0001 != 0);
    write_shift_result(cpu, target, result);
}
