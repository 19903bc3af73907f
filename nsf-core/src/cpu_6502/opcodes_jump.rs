use crate::cpu_6502::*;

/// Every branch resolves the relative target, which also consumes the operand
/// byte, and only commits it to the pc when the condition held.
fn branch(cpu: &mut Cpu6502, mode: Mode, do_branch: bool) {
    let address = cpu.get_operand_address(mode);
    if do_branch {
        cpu.pc = address;
    }
}

/// Branch if plus
/// Function: branch on N=0
/// Flags:
pub fn bpl(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, !cpu.is_status_flag_set(StatusFlag::Negative));
}

/// Branch if minus
/// Function: branch on N=1
/// Flags:
pub fn bmi(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, cpu.is_status_flag_set(StatusFlag::Negative));
}

/// Branch if Overflow Clear
/// Function: branch on V=0
/// Flags:
pub fn bvc(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, !cpu.is_status_flag_set(StatusFlag::Overflow));
}

/// Branch if Overflow Set
/// Function: branch on V=1
/// Flags:
pub fn bvs(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, cpu.is_status_flag_set(StatusFlag::Overflow));
}

/// Branch if Carry Clear
/// Function: branch on C=0
/// Flags:
pub fn bcc(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, !cpu.is_status_flag_set(StatusFlag::Carry));
}

/// Branch if Carry Set
/// Function: branch on C=1
/// Flags:
pub fn bcs(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, cpu.is_status_flag_set(StatusFlag::Carry));
}

/// Branch if Not Equal
/// Function: branch on Z=0
/// Flags:
pub fn bne(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, !cpu.is_status_flag_set(StatusFlag::Zero));
}

/// Branch if Equal
/// Function: branch on Z=1
/// Flags:
pub fn beq(cpu: &mut Cpu6502, mode: Mode) {
    branch(cpu, mode, cpu.is_status_flag_set(StatusFlag::Zero));
}

/// Break - Software interrupt. The byte after the opcode is padding that gets
/// consumed, then the pc and the status register (with the break bit set) are
/// saved to the stack and execution vectors through $FFFE.
/// Function: (S)-:=PC,P PC:=($FFFE)
/// Flags: B I
pub fn brk(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.pc = cpu.pc.wrapping_add(1);
    cpu.push_stack_u16(cpu.pc);
    cpu.push_stack_u8(cpu.p | StatusFlag::Break as u8);
    cpu.set_status_flag(StatusFlag::InterruptDisable, true);
    cpu.pc = cpu.bus.read_u16(InterruptVectors::IrqBrkVector as u16);
}

/// Return from Interrupt. Unlike RTS the restored pc is used as-is, and the
/// break bit never makes it back into the live status register.
/// Function: P,PC:=+(S)
/// Flags: N V D I Z C
pub fn rti(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.p = cpu.pull_stack_u8() & !(StatusFlag::Break as u8);
    cpu.pc = cpu.pull_stack_u16();
}

/// Jump to subroutine. The pushed address is the last byte of this
/// instruction; RTS compensates by adding one.
/// Function: (S)-:=PC-1 PC:={adr}
/// Flags:
pub fn jsr(cpu: &mut Cpu6502, mode: Mode) {
    let address = cpu.get_operand_address(mode);
    cpu.push_stack_u16(cpu.pc.wrapping_sub(1));
    cpu.pc = address;
}

/// Return from Sub Routine
/// Function: PC:=+(S)+1
/// Flags:
pub fn rts(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.pc = cpu.pull_stack_u16().wrapping_add(1);
}

/// Jump
/// Function: PC:={adr}
/// Flags:
pub fn jmp(cpu: &mut Cpu6502, mode: Mode) {
    let address = cpu.get_operand_address(mode);
    cpu.pc = address;
}

/// Bit test
/// Function: N:=b7 V:=b6 Z:=A&{adr}
/// Flags: N V Z
pub fn bit(cpu: &mut Cpu6502, mode: Mode) {
    let (_, operand) = cpu.get_operand(mode);
    let result = cpu.a & operand;
    cpu.set_status_flag(StatusFlag::Negative, operand & 0b1000_0000 != 0);
    cpu.set_status_flag(StatusFlag::Overflow, operand & 0b0100_0000 != 0);
    cpu.set_status_flag(StatusFlag::Zero, result == 0);
}

/// Clear Carry flag
/// Function: C:=0
/// Flags: C
pub fn clc(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.set_status_flag(StatusFlag::Carry, false);
}

/// Set Carry flag
/// Function: C:=1
/// Flags: C
pub fn sec(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.set_status_flag(StatusFlag::Carry, true);
}

/// Clear Decimal flag
/// Function: D:=0
/// Flags: D
pub fn cld(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.set_status_flag(StatusFlag::Decimal, false);
}

/// Set Decimal flag. The flag is tracked faithfully even though ADC and SBC
/// ignore it.
/// Function: D:=1
/// Flags: D
pub fn sed(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.set_status_flag(StatusFlag::Decimal, true);
}

/// Clear Interrupt disable
/// Function: I:=0
/// Flags: I
pub fn cli(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.set_status_flag(StatusFlag::InterruptDisable, false);
}

/// Set Interrupt disable
/// Function: I:=1
/// Flags: I
pub fn sei(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.set_status_flag(StatusFlag::InterruptDisable, true);
}

/// Clear overflow flag
/// Function: V:=0
/// Flags: V
pub fn clv(cpu: &mut Cpu6502, _mode: Mode) {
    cpu.set_status_flag(StatusFlag::Overflow, false);
}

/// No operation
/// Function:
/// Flags:
pub fn nop(_cpu: &mut Cpu6502, _mode: Mode) {}
