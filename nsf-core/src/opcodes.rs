use crate::bus::Bus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Absolute,         // abs
    AbsoluteIndexedX, // abx
    AbsoluteIndexedY, // aby
    Immediate,        // imm
    Implied,          // imp
    Indirect,         // ind
    IndirectX,        // izx
    IndirectY,        // izy
    RegisterA,        // a
    Relative,         // rel
    ZeroPage,         // zp
    ZeroPageX,        // zpx
    ZeroPageY,        // zpy
    None,             // non - an unpopulated slot in the table
}

impl Mode {
    /// How many bytes follow the opcode. The fetch arity belongs to the
    /// addressing mode, not to the instruction.
    pub fn operand_bytes(self) -> u16 {
        match self {
            Mode::Implied | Mode::RegisterA | Mode::None => 0,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndirectX
            | Mode::IndirectY
            | Mode::Relative => 1,
            Mode::Absolute
            | Mode::AbsoluteIndexedX
            | Mode::AbsoluteIndexedY
            | Mode::Indirect => 2,
        }
    }
}

/// Every official opcode, named by mnemonic and addressing mode, with the
/// encoded byte as the discriminant. Implied instructions have a single
/// encoding so they go without a suffix.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy)]
pub enum OpCode {
    BRK = 0x00,
    ORA_izx = 0x01,
    ORA_zp = 0x05,
    ASL_zp = 0x06,
    PHP = 0x08,
    ORA_imm = 0x09,
    ASL_a = 0x0a,
    ORA_abs = 0x0d,
    ASL_abs = 0x0e,
    BPL_rel = 0x10,
    ORA_izy = 0x11,
    ORA_zpx = 0x15,
    ASL_zpx = 0x16,
    CLC = 0x18,
    ORA_aby = 0x19,
    ORA_abx = 0x1d,
    ASL_abx = 0x1e,
    JSR_abs = 0x20,
    AND_izx = 0x21,
    BIT_zp = 0x24,
    AND_zp = 0x25,
    ROL_zp = 0x26,
    PLP = 0x28,
    AND_imm = 0x29,
    ROL_a = 0x2a,
    BIT_abs = 0x2c,
    AND_abs = 0x2d,
    ROL_abs = 0x2e,
    BMI_rel = 0x30,
    AND_izy = 0x31,
    AND_zpx = 0x35,
    ROL_zpx = 0x36,
    SEC = 0x38,
    AND_aby = 0x39,
    AND_abx = 0x3d,
    ROL_abx = 0x3e,
    RTI = 0x40,
    EOR_izx = 0x41,
    EOR_zp = 0x45,
    LSR_zp = 0x46,
    PHA = 0x48,
    EOR_imm = 0x49,
    LSR_a = 0x4a,
    JMP_abs = 0x4c,
    EOR_abs = 0x4d,
    LSR_abs = 0x4e,
    BVC_rel = 0x50,
    EOR_izy = 0x51,
    EOR_zpx = 0x55,
    LSR_zpx = 0x56,
    CLI = 0x58,
    EOR_aby = 0x59,
    EOR_abx = 0x5d,
    LSR_abx = 0x5e,
    RTS = 0x60,
    ADC_izx = 0x61,
    ADC_zp = 0x65,
    ROR_zp = 0x66,
    PLA = 0x68,
    ADC_imm = 0x69,
    ROR_a = 0x6a,
    JMP_ind = 0x6c,
    ADC_abs = 0x6d,
    ROR_abs = 0x6e,
    BVS_rel = 0x70,
    ADC_izy = 0x71,
    ADC_zpx = 0x75,
    ROR_zpx = 0x76,
    SEI = 0x78,
    ADC_aby = 0x79,
    ADC_abx = 0x7d,
    ROR_abx = 0x7e,
    STA_izx = 0x81,
    STY_zp = 0x84,
    STA_zp = 0x85,
    STX_zp = 0x86,
    DEY = 0x88,
    TXA = 0x8a,
    STY_abs = 0x8c,
    STA_abs = 0x8d,
    STX_abs = 0x8e,
    BCC_rel = 0x90,
    STA_izy = 0x91,
    STY_zpx = 0x94,
    STA_zpx = 0x95,
    STX_zpy = 0x96,
    TYA = 0x98,
    STA_aby = 0x99,
    TXS = 0x9a,
    STA_abx = 0x9d,
    LDY_imm = 0xa0,
    LDA_izx = 0xa1,
    LDX_imm = 0xa2,
    LDY_zp = 0xa4,
    LDA_zp = 0xa5,
    LDX_zp = 0xa6,
    TAY = 0xa8,
    LDA_imm = 0xa9,
    TAX = 0xaa,
    LDY_abs = 0xac,
    LDA_abs = 0xad,
    LDX_abs = 0xae,
    BCS_rel = 0xb0,
    LDA_izy = 0xb1,
    LDY_zpx = 0xb4,
    LDA_zpx = 0xb5,
    LDX_zpy = 0xb6,
    CLV = 0xb8,
    LDA_aby = 0xb9,
    TSX = 0xba,
    LDY_abx = 0xbc,
    LDA_abx = 0xbd,
    LDX_aby = 0xbe,
    CPY_imm = 0xc0,
    CMP_izx = 0xc1,
    CPY_zp = 0xc4,
    CMP_zp = 0xc5,
    DEC_zp = 0xc6,
    INY = 0xc8,
    CMP_imm = 0xc9,
    DEX = 0xca,
    CPY_abs = 0xcc,
    CMP_abs = 0xcd,
    DEC_abs = 0xce,
    BNE_rel = 0xd0,
    CMP_izy = 0xd1,
    CMP_zpx = 0xd5,
    DEC_zpx = 0xd6,
    CLD = 0xd8,
    CMP_aby = 0xd9,
    CMP_abx = 0xdd,
    DEC_abx = 0xde,
    CPX_imm = 0xe0,
    SBC_izx = 0xe1,
    CPX_zp = 0xe4,
    SBC_zp = 0xe5,
    INC_zp = 0xe6,
    INX = 0xe8,
    SBC_imm = 0xe9,
    NOP = 0xea,
    CPX_abs = 0xec,
    SBC_abs = 0xed,
    INC_abs = 0xee,
    BEQ_rel = 0xf0,
    SBC_izy = 0xf1,
    SBC_zpx = 0xf5,
    INC_zpx = 0xf6,
    SED = 0xf8,
    SBC_aby = 0xf9,
    SBC_abx = 0xfd,
    INC_abx = 0xfe,
}

// Short aliases to keep the 16-wide table rows readable.
const ABS: Mode = Mode::Absolute;
const ABX: Mode = Mode::AbsoluteIndexedX;
const ABY: Mode = Mode::AbsoluteIndexedY;
const IMM: Mode = Mode::Immediate;
const IMP: Mode = Mode::Implied;
const IND: Mode = Mode::Indirect;
const IZX: Mode = Mode::IndirectX;
const IZY: Mode = Mode::IndirectY;
const NON: Mode = Mode::None;
const REG: Mode = Mode::RegisterA;
const REL: Mode = Mode::Relative;
const ZP: Mode = Mode::ZeroPage;
const ZPX: Mode = Mode::ZeroPageX;
const ZPY: Mode = Mode::ZeroPageY;

/// The addressing mode for each encoded byte. Unofficial opcodes are not
/// executed, so their slots hold Mode::None.
#[rustfmt::skip]
pub const ADDRESSING_MODE_TABLE: [Mode; 256] = [
    //  x0   x1   x2   x3   x4   x5   x6   x7   x8   x9   xa   xb   xc   xd   xe   xf
    IMP, IZX, NON, NON, NON, ZP,  ZP,  NON, IMP, IMM, REG, NON, NON, ABS, ABS, NON, // 0x
    REL, IZY, NON, NON, NON, ZPX, ZPX, NON, IMP, ABY, NON, NON, NON, ABX, ABX, NON, // 1x
    ABS, IZX, NON, NON, ZP,  ZP,  ZP,  NON, IMP, IMM, REG, NON, ABS, ABS, ABS, NON, // 2x
    REL, IZY, NON, NON, NON, ZPX, ZPX, NON, IMP, ABY, NON, NON, NON, ABX, ABX, NON, // 3x
    IMP, IZX, NON, NON, NON, ZP,  ZP,  NON, IMP, IMM, REG, NON, ABS, ABS, ABS, NON, // 4x
    REL, IZY, NON, NON, NON, ZPX, ZPX, NON, IMP, ABY, NON, NON, NON, ABX, ABX, NON, // 5x
    IMP, IZX, NON, NON, NON, ZP,  ZP,  NON, IMP, IMM, REG, NON, IND, ABS, ABS, NON, // 6x
    REL, IZY, NON, NON, NON, ZPX, ZPX, NON, IMP, ABY, NON, NON, NON, ABX, ABX, NON, // 7x
    NON, IZX, NON, NON, ZP,  ZP,  ZP,  NON, IMP, NON, IMP, NON, ABS, ABS, ABS, NON, // 8x
    REL, IZY, NON, NON, ZPX, ZPX, ZPY, NON, IMP, ABY, IMP, NON, NON, ABX, NON, NON, // 9x
    IMM, IZX, IMM, NON, ZP,  ZP,  ZP,  NON, IMP, IMM, IMP, NON, ABS, ABS, ABS, NON, // ax
    REL, IZY, NON, NON, ZPX, ZPX, ZPY, NON, IMP, ABY, IMP, NON, ABX, ABX, ABY, NON, // bx
    IMM, IZX, NON, NON, ZP,  ZP,  ZP,  NON, IMP, IMM, IMP, NON, ABS, ABS, ABS, NON, // cx
    REL, IZY, NON, NON, NON, ZPX, ZPX, NON, IMP, ABY, NON, NON, NON, ABX, ABX, NON, // dx
    IMM, IZX, NON, NON, ZP,  ZP,  ZP,  NON, IMP, IMM, IMP, NON, ABS, ABS, ABS, NON, // ex
    REL, IZY, NON, NON, NON, ZPX, ZPX, NON, IMP, ABY, NON, NON, NON, ABX, ABX, NON, // fx
];

/// The mnemonic for each encoded byte, "???" for unofficial slots.
#[rustfmt::skip]
pub const OPCODE_STRING_TABLE: [&str; 256] = [
    "brk", "ora", "???", "???", "???", "ora", "asl", "???", "php", "ora", "asl", "???",
    "???", "ora", "asl", "???", "bpl", "ora", "???", "???", "???", "ora", "asl", "???",
    "clc", "ora", "???", "???", "???", "ora", "asl", "???", "jsr", "and", "???", "???",
    "bit", "and", "rol", "???", "plp", "and", "rol", "???", "bit", "and", "rol", "???",
    "bmi", "and", "???", "???", "???", "and", "rol", "???", "sec", "and", "???", "???",
    "???", "and", "rol", "???", "rti", "eor", "???", "???", "???", "eor", "lsr", "???",
    "pha", "eor", "lsr", "???", "jmp", "eor", "lsr", "???", "bvc", "eor", "???", "???",
    "???", "eor", "lsr", "???", "cli", "eor", "???", "???", "???", "eor", "lsr", "???",
    "rts", "adc", "???", "???", "???", "adc", "ror", "???", "pla", "adc", "ror", "???",
    "jmp", "adc", "ror", "???", "bvs", "adc", "???", "???", "???", "adc", "ror", "???",
    "sei", "adc", "???", "???", "???", "adc", "ror", "???", "???", "sta", "???", "???",
    "sty", "sta", "stx", "???", "dey", "???", "txa", "???", "sty", "sta", "stx", "???",
    "bcc", "sta", "???", "???", "sty", "sta", "stx", "???", "tya", "sta", "txs", "???",
    "???", "sta", "???", "???", "ldy", "lda", "ldx", "???", "ldy", "lda", "ldx", "???",
    "tay", "lda", "tax", "???", "ldy", "lda", "ldx", "???", "bcs", "lda", "???", "???",
    "ldy", "lda", "ldx", "???", "clv", "lda", "tsx", "???", "ldy", "lda", "ldx", "???",
    "cpy", "cmp", "???", "???", "cpy", "cmp", "dec", "???", "iny", "cmp", "dex", "???",
    "cpy", "cmp", "dec", "???", "bne", "cmp", "???", "???", "???", "cmp", "dec", "???",
    "cld", "cmp", "???", "???", "???", "cmp", "dec", "???", "cpx", "sbc", "???", "???",
    "cpx", "sbc", "inc", "???", "inx", "sbc", "nop", "???", "cpx", "sbc", "inc", "???",
    "beq", "sbc", "???", "???", "???", "sbc", "inc", "???", "sed", "sbc", "???", "???",
    "???", "sbc", "inc", "???",
];

/// Render the instruction at an address as assembly text, returning the text
/// and the full instruction length in bytes. Branch targets are resolved to
/// the address they would land on.
pub fn disassemble(bus: &Bus, address: u16) -> (String, u16) {
    let opcode = bus.read_u8(address);
    let name = OPCODE_STRING_TABLE[opcode as usize];
    let mode = ADDRESSING_MODE_TABLE[opcode as usize];
    let length = 1 + mode.operand_bytes();

    let operand_u8 = bus.read_u8(address.wrapping_add(1));
    let operand_u16 = bus.read_u16(address.wrapping_add(1));

    let text = match mode {
        Mode::Implied | Mode::None => name.to_string(),
        Mode::RegisterA => format!("{} a", name),
        Mode::Immediate => format!("{} #${:02x}", name, operand_u8),
        Mode::ZeroPage => format!("{} ${:02x}", name, operand_u8),
        Mode::ZeroPageX => format!("{} ${:02x},x", name, operand_u8),
        Mode::ZeroPageY => format!("{} ${:02x},y", name, operand_u8),
        Mode::Absolute => format!("{} ${:04x}", name, operand_u16),
        Mode::AbsoluteIndexedX => format!("{} ${:04x},x", name, operand_u16),
        Mode::AbsoluteIndexedY => format!("{} ${:04x},y", name, operand_u16),
        Mode::Indirect => format!("{} (${:04x})", name, operand_u16),
        Mode::IndirectX => format!("{} (${:02x},x)", name, operand_u8),
        Mode::IndirectY => format!("{} (${:02x}),y", name, operand_u8),
        Mode::Relative => {
            let target = address
                .wrapping_add(2)
                .wrapping_add(operand_u8 as i8 as u16);
            format!("{} ${:04x}", name, target)
        }
    };

    (text, length)
}

#[cfg(test)]
mod test {
    use super::*;

    /// Disassemble a program one instruction at a time until the bytes run out.
    fn disassemble_all(program: &[u8]) -> String {
        let mut bus = Bus::new();
        bus.load_at(program, 0x8000);

        let mut address = 0x8000;
        let mut lines = Vec::new();
        while address < 0x8000 + program.len() as u16 {
            let (text, length) = disassemble(&bus, address);
            lines.push(format!("{:04x}  {}", address, text));
            address += length;
        }
        lines.join("\n")
    }

    #[test]
    fn every_official_opcode_has_a_mode_and_a_name() {
        for (byte, mode) in ADDRESSING_MODE_TABLE.iter().enumerate() {
            let name = OPCODE_STRING_TABLE[byte];
            if *mode == Mode::None {
                assert_eq!(name, "???", "byte {:#04x}", byte);
            } else {
                assert_ne!(name, "???", "byte {:#04x}", byte);
            }
        }
    }

    #[test]
    fn brk_is_a_populated_slot() {
        // 0x00 is a real instruction even though the byte is zero.
        assert_eq!(ADDRESSING_MODE_TABLE[0x00], Mode::Implied);
        assert_eq!(OPCODE_STRING_TABLE[0x00], "brk");
    }

    #[test]
    fn operand_arity_lives_on_the_mode() {
        assert_eq!(Mode::Implied.operand_bytes(), 0);
        assert_eq!(Mode::RegisterA.operand_bytes(), 0);
        assert_eq!(Mode::Immediate.operand_bytes(), 1);
        assert_eq!(Mode::IndirectY.operand_bytes(), 1);
        assert_eq!(Mode::Absolute.operand_bytes(), 2);
        assert_eq!(Mode::Indirect.operand_bytes(), 2);
    }

    #[test]
    fn disassembles_each_operand_shape() {
        let program = [
            OpCode::LDA_imm as u8, 0x22,
            OpCode::STA_abs as u8, 0x00, 0x46,
            OpCode::ASL_a as u8,
            OpCode::LDA_izx as u8, 0x70,
            OpCode::LDA_izy as u8, 0x70,
            OpCode::JMP_ind as u8, 0x42, 0x00,
            OpCode::BEQ_rel as u8, 0xfc,
        ];
        insta::assert_snapshot!(disassemble_all(&program), @r###"
        8000  lda #$22
        8002  sta $4600
        8005  asl a
        8006  lda ($70,x)
        8008  lda ($70),y
        800a  jmp ($0042)
        800d  beq $800b
        "###);
    }
}
