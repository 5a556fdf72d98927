//! Opcode decode table.
//!
//! A dense, immutable table of all 256 opcode slots. Each entry carries the
//! mnemonic, the addressing mode and the base cycle count from the published
//! timing tables. Which slots are assigned depends on the build:
//!
//! - default: the 151 official opcodes plus the undocumented set
//!   (`illegal` feature, on by default)
//! - `illegal` disabled: unofficial slots fall back to the catch-all
//!   [`Mnemonic::Xxx`], a two-cycle NOP
//! - `emulate-65c02`: the `abs,X` shifts drop a cycle and `WAI`/`STP` appear

use crate::addressing::AddrMode;
use crate::{CpuError, Result};

/// Instruction mnemonic.
///
/// The undocumented mnemonics follow the names in common use on NesDev;
/// `Anc2` is the second encoding of ANC, `Usbc` the SBC alias at `$EB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)] // the variants are the 6502 mnemonics themselves
pub enum Mnemonic {
    // Official
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Undocumented
    Alr, Anc, Anc2, Ane, Arr, Dcp, Dop, Isc, Jam, Las, Lax, Lxa, Rla, Rra,
    Sax, Sbx, Sha, Shx, Shy, Slo, Sre, Tas, Top, Usbc,
    // 65C02 additions
    Wai, Stp,
    /// Catch-all for slots with no assignment in the active build.
    Xxx,
}

impl Mnemonic {
    /// The canonical three-letter spelling (used by the disassembler).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC", Self::And => "AND", Self::Asl => "ASL",
            Self::Bcc => "BCC", Self::Bcs => "BCS", Self::Beq => "BEQ",
            Self::Bit => "BIT", Self::Bmi => "BMI", Self::Bne => "BNE",
            Self::Bpl => "BPL", Self::Brk => "BRK", Self::Bvc => "BVC",
            Self::Bvs => "BVS", Self::Clc => "CLC", Self::Cld => "CLD",
            Self::Cli => "CLI", Self::Clv => "CLV", Self::Cmp => "CMP",
            Self::Cpx => "CPX", Self::Cpy => "CPY", Self::Dec => "DEC",
            Self::Dex => "DEX", Self::Dey => "DEY", Self::Eor => "EOR",
            Self::Inc => "INC", Self::Inx => "INX", Self::Iny => "INY",
            Self::Jmp => "JMP", Self::Jsr => "JSR", Self::Lda => "LDA",
            Self::Ldx => "LDX", Self::Ldy => "LDY", Self::Lsr => "LSR",
            Self::Nop => "NOP", Self::Ora => "ORA", Self::Pha => "PHA",
            Self::Php => "PHP", Self::Pla => "PLA", Self::Plp => "PLP",
            Self::Rol => "ROL", Self::Ror => "ROR", Self::Rti => "RTI",
            Self::Rts => "RTS", Self::Sbc => "SBC", Self::Sec => "SEC",
            Self::Sed => "SED", Self::Sei => "SEI", Self::Sta => "STA",
            Self::Stx => "STX", Self::Sty => "STY", Self::Tax => "TAX",
            Self::Tay => "TAY", Self::Tsx => "TSX", Self::Txa => "TXA",
            Self::Txs => "TXS", Self::Tya => "TYA",
            Self::Alr => "ALR", Self::Anc | Self::Anc2 => "ANC",
            Self::Ane => "ANE", Self::Arr => "ARR", Self::Dcp => "DCP",
            Self::Dop => "DOP", Self::Isc => "ISC", Self::Jam => "JAM",
            Self::Las => "LAS", Self::Lax => "LAX", Self::Lxa => "LXA",
            Self::Rla => "RLA", Self::Rra => "RRA", Self::Sax => "SAX",
            Self::Sbx => "SBX", Self::Sha => "SHA", Self::Shx => "SHX",
            Self::Shy => "SHY", Self::Slo => "SLO", Self::Sre => "SRE",
            Self::Tas => "TAS", Self::Top => "TOP", Self::Usbc => "USBC",
            Self::Wai => "WAI", Self::Stp => "STP",
            Self::Xxx => "XXX",
        }
    }

    /// Whether indexed addressing charges the page-cross penalty cycle.
    ///
    /// Only read/load-style instructions take the extra cycle; stores and
    /// read-modify-write instructions pay the worst case in their base count.
    #[must_use]
    pub const fn page_cross_penalty(self) -> bool {
        matches!(
            self,
            Self::Adc | Self::And | Self::Bit | Self::Cmp | Self::Cpx
                | Self::Cpy | Self::Eor | Self::Lda | Self::Ldx | Self::Ldy
                | Self::Nop | Self::Ora | Self::Sbc
                | Self::Dop | Self::Top | Self::Lax | Self::Las | Self::Usbc
                | Self::Xxx
        )
    }

    /// Whether this mnemonic is one of the undocumented NMOS opcodes.
    #[must_use]
    pub const fn unofficial(self) -> bool {
        matches!(
            self,
            Self::Alr | Self::Anc | Self::Anc2 | Self::Ane | Self::Arr
                | Self::Dcp | Self::Dop | Self::Isc | Self::Jam | Self::Las
                | Self::Lax | Self::Lxa | Self::Rla | Self::Rra | Self::Sax
                | Self::Sbx | Self::Sha | Self::Shx | Self::Shy | Self::Slo
                | Self::Sre | Self::Tas | Self::Top | Self::Usbc
        )
    }
}

/// One slot of the decode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,
    /// Addressing mode.
    pub mode: AddrMode,
    /// Base cycle count from the published timing table. Page crossings and
    /// taken branches add on top of this.
    pub cycles: u8,
}

impl OpcodeInfo {
    /// True when this slot has a real assignment in the active build.
    #[must_use]
    pub const fn assigned(&self) -> bool {
        !matches!(self.mnemonic, Mnemonic::Xxx)
    }
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        cycles,
    }
}

#[allow(clippy::too_many_lines)]
const fn build_table() -> [OpcodeInfo; 256] {
    use AddrMode::{Abs, Abx, Aby, Acc, Imm, Imp, Ind, Izx, Izy, Rel, Zp0, Zpx, Zpy};
    use Mnemonic as M;

    let mut t = [op(M::Xxx, Imp, 2); 256];

    // Official opcodes
    t[0x00] = op(M::Brk, Imp, 7);
    t[0x01] = op(M::Ora, Izx, 6);
    t[0x05] = op(M::Ora, Zp0, 3);
    t[0x06] = op(M::Asl, Zp0, 5);
    t[0x08] = op(M::Php, Imp, 3);
    t[0x09] = op(M::Ora, Imm, 2);
    t[0x0A] = op(M::Asl, Acc, 2);
    t[0x0D] = op(M::Ora, Abs, 4);
    t[0x0E] = op(M::Asl, Abs, 6);
    t[0x10] = op(M::Bpl, Rel, 2);
    t[0x11] = op(M::Ora, Izy, 5);
    t[0x15] = op(M::Ora, Zpx, 4);
    t[0x16] = op(M::Asl, Zpx, 6);
    t[0x18] = op(M::Clc, Imp, 2);
    t[0x19] = op(M::Ora, Aby, 4);
    t[0x1D] = op(M::Ora, Abx, 4);
    t[0x1E] = op(M::Asl, Abx, 7);
    t[0x20] = op(M::Jsr, Abs, 6);
    t[0x21] = op(M::And, Izx, 6);
    t[0x24] = op(M::Bit, Zp0, 3);
    t[0x25] = op(M::And, Zp0, 3);
    t[0x26] = op(M::Rol, Zp0, 5);
    t[0x28] = op(M::Plp, Imp, 4);
    t[0x29] = op(M::And, Imm, 2);
    t[0x2A] = op(M::Rol, Acc, 2);
    t[0x2C] = op(M::Bit, Abs, 4);
    t[0x2D] = op(M::And, Abs, 4);
    t[0x2E] = op(M::Rol, Abs, 6);
    t[0x30] = op(M::Bmi, Rel, 2);
    t[0x31] = op(M::And, Izy, 5);
    t[0x35] = op(M::And, Zpx, 4);
    t[0x36] = op(M::Rol, Zpx, 6);
    t[0x38] = op(M::Sec, Imp, 2);
    t[0x39] = op(M::And, Aby, 4);
    t[0x3D] = op(M::And, Abx, 4);
    t[0x3E] = op(M::Rol, Abx, 7);
    t[0x40] = op(M::Rti, Imp, 6);
    t[0x41] = op(M::Eor, Izx, 6);
    t[0x45] = op(M::Eor, Zp0, 3);
    t[0x46] = op(M::Lsr, Zp0, 5);
    t[0x48] = op(M::Pha, Imp, 3);
    t[0x49] = op(M::Eor, Imm, 2);
    t[0x4A] = op(M::Lsr, Acc, 2);
    t[0x4C] = op(M::Jmp, Abs, 3);
    t[0x4D] = op(M::Eor, Abs, 4);
    t[0x4E] = op(M::Lsr, Abs, 6);
    t[0x50] = op(M::Bvc, Rel, 2);
    t[0x51] = op(M::Eor, Izy, 5);
    t[0x55] = op(M::Eor, Zpx, 4);
    t[0x56] = op(M::Lsr, Zpx, 6);
    t[0x58] = op(M::Cli, Imp, 2);
    t[0x59] = op(M::Eor, Aby, 4);
    t[0x5D] = op(M::Eor, Abx, 4);
    t[0x5E] = op(M::Lsr, Abx, 7);
    t[0x60] = op(M::Rts, Imp, 6);
    t[0x61] = op(M::Adc, Izx, 6);
    t[0x65] = op(M::Adc, Zp0, 3);
    t[0x66] = op(M::Ror, Zp0, 5);
    t[0x68] = op(M::Pla, Imp, 4);
    t[0x69] = op(M::Adc, Imm, 2);
    t[0x6A] = op(M::Ror, Acc, 2);
    t[0x6C] = op(M::Jmp, Ind, 5);
    t[0x6D] = op(M::Adc, Abs, 4);
    t[0x6E] = op(M::Ror, Abs, 6);
    t[0x70] = op(M::Bvs, Rel, 2);
    t[0x71] = op(M::Adc, Izy, 5);
    t[0x75] = op(M::Adc, Zpx, 4);
    t[0x76] = op(M::Ror, Zpx, 6);
    t[0x78] = op(M::Sei, Imp, 2);
    t[0x79] = op(M::Adc, Aby, 4);
    t[0x7D] = op(M::Adc, Abx, 4);
    t[0x7E] = op(M::Ror, Abx, 7);
    t[0x81] = op(M::Sta, Izx, 6);
    t[0x84] = op(M::Sty, Zp0, 3);
    t[0x85] = op(M::Sta, Zp0, 3);
    t[0x86] = op(M::Stx, Zp0, 3);
    t[0x88] = op(M::Dey, Imp, 2);
    t[0x8A] = op(M::Txa, Imp, 2);
    t[0x8C] = op(M::Sty, Abs, 4);
    t[0x8D] = op(M::Sta, Abs, 4);
    t[0x8E] = op(M::Stx, Abs, 4);
    t[0x90] = op(M::Bcc, Rel, 2);
    t[0x91] = op(M::Sta, Izy, 6);
    t[0x94] = op(M::Sty, Zpx, 4);
    t[0x95] = op(M::Sta, Zpx, 4);
    t[0x96] = op(M::Stx, Zpy, 4);
    t[0x98] = op(M::Tya, Imp, 2);
    t[0x99] = op(M::Sta, Aby, 5);
    t[0x9A] = op(M::Txs, Imp, 2);
    t[0x9D] = op(M::Sta, Abx, 5);
    t[0xA0] = op(M::Ldy, Imm, 2);
    t[0xA1] = op(M::Lda, Izx, 6);
    t[0xA2] = op(M::Ldx, Imm, 2);
    t[0xA4] = op(M::Ldy, Zp0, 3);
    t[0xA5] = op(M::Lda, Zp0, 3);
    t[0xA6] = op(M::Ldx, Zp0, 3);
    t[0xA8] = op(M::Tay, Imp, 2);
    t[0xA9] = op(M::Lda, Imm, 2);
    t[0xAA] = op(M::Tax, Imp, 2);
    t[0xAC] = op(M::Ldy, Abs, 4);
    t[0xAD] = op(M::Lda, Abs, 4);
    t[0xAE] = op(M::Ldx, Abs, 4);
    t[0xB0] = op(M::Bcs, Rel, 2);
    t[0xB1] = op(M::Lda, Izy, 5);
    t[0xB4] = op(M::Ldy, Zpx, 4);
    t[0xB5] = op(M::Lda, Zpx, 4);
    t[0xB6] = op(M::Ldx, Zpy, 4);
    t[0xB8] = op(M::Clv, Imp, 2);
    t[0xB9] = op(M::Lda, Aby, 4);
    t[0xBA] = op(M::Tsx, Imp, 2);
    t[0xBC] = op(M::Ldy, Abx, 4);
    t[0xBD] = op(M::Lda, Abx, 4);
    t[0xBE] = op(M::Ldx, Aby, 4);
    t[0xC0] = op(M::Cpy, Imm, 2);
    t[0xC1] = op(M::Cmp, Izx, 6);
    t[0xC4] = op(M::Cpy, Zp0, 3);
    t[0xC5] = op(M::Cmp, Zp0, 3);
    t[0xC6] = op(M::Dec, Zp0, 5);
    t[0xC8] = op(M::Iny, Imp, 2);
    t[0xC9] = op(M::Cmp, Imm, 2);
    t[0xCA] = op(M::Dex, Imp, 2);
    t[0xCC] = op(M::Cpy, Abs, 4);
    t[0xCD] = op(M::Cmp, Abs, 4);
    t[0xCE] = op(M::Dec, Abs, 6);
    t[0xD0] = op(M::Bne, Rel, 2);
    t[0xD1] = op(M::Cmp, Izy, 5);
    t[0xD5] = op(M::Cmp, Zpx, 4);
    t[0xD6] = op(M::Dec, Zpx, 6);
    t[0xD8] = op(M::Cld, Imp, 2);
    t[0xD9] = op(M::Cmp, Aby, 4);
    t[0xDD] = op(M::Cmp, Abx, 4);
    t[0xDE] = op(M::Dec, Abx, 7);
    t[0xE0] = op(M::Cpx, Imm, 2);
    t[0xE1] = op(M::Sbc, Izx, 6);
    t[0xE4] = op(M::Cpx, Zp0, 3);
    t[0xE5] = op(M::Sbc, Zp0, 3);
    t[0xE6] = op(M::Inc, Zp0, 5);
    t[0xE8] = op(M::Inx, Imp, 2);
    t[0xE9] = op(M::Sbc, Imm, 2);
    t[0xEA] = op(M::Nop, Imp, 2);
    t[0xEC] = op(M::Cpx, Abs, 4);
    t[0xED] = op(M::Sbc, Abs, 4);
    t[0xEE] = op(M::Inc, Abs, 6);
    t[0xF0] = op(M::Beq, Rel, 2);
    t[0xF1] = op(M::Sbc, Izy, 5);
    t[0xF5] = op(M::Sbc, Zpx, 4);
    t[0xF6] = op(M::Inc, Zpx, 6);
    t[0xF8] = op(M::Sed, Imp, 2);
    t[0xF9] = op(M::Sbc, Aby, 4);
    t[0xFD] = op(M::Sbc, Abx, 4);
    t[0xFE] = op(M::Inc, Abx, 7);

    if cfg!(feature = "illegal") {
        // Halts
        t[0x02] = op(M::Jam, Imp, 2);
        t[0x12] = op(M::Jam, Imp, 2);
        t[0x22] = op(M::Jam, Imp, 2);
        t[0x32] = op(M::Jam, Imp, 2);
        t[0x42] = op(M::Jam, Imp, 2);
        t[0x52] = op(M::Jam, Imp, 2);
        t[0x62] = op(M::Jam, Imp, 2);
        t[0x72] = op(M::Jam, Imp, 2);
        t[0x92] = op(M::Jam, Imp, 2);
        t[0xB2] = op(M::Jam, Imp, 2);
        t[0xD2] = op(M::Jam, Imp, 2);
        t[0xF2] = op(M::Jam, Imp, 2);
        // SLO: ASL + ORA
        t[0x03] = op(M::Slo, Izx, 8);
        t[0x07] = op(M::Slo, Zp0, 5);
        t[0x0F] = op(M::Slo, Abs, 6);
        t[0x13] = op(M::Slo, Izy, 8);
        t[0x17] = op(M::Slo, Zpx, 6);
        t[0x1B] = op(M::Slo, Aby, 7);
        t[0x1F] = op(M::Slo, Abx, 7);
        // RLA: ROL + AND
        t[0x23] = op(M::Rla, Izx, 8);
        t[0x27] = op(M::Rla, Zp0, 5);
        t[0x2F] = op(M::Rla, Abs, 6);
        t[0x33] = op(M::Rla, Izy, 8);
        t[0x37] = op(M::Rla, Zpx, 6);
        t[0x3B] = op(M::Rla, Aby, 7);
        t[0x3F] = op(M::Rla, Abx, 7);
        // SRE: LSR + EOR
        t[0x43] = op(M::Sre, Izx, 8);
        t[0x47] = op(M::Sre, Zp0, 5);
        t[0x4F] = op(M::Sre, Abs, 6);
        t[0x53] = op(M::Sre, Izy, 8);
        t[0x57] = op(M::Sre, Zpx, 6);
        t[0x5B] = op(M::Sre, Aby, 7);
        t[0x5F] = op(M::Sre, Abx, 7);
        // RRA: ROR + ADC
        t[0x63] = op(M::Rra, Izx, 8);
        t[0x67] = op(M::Rra, Zp0, 5);
        t[0x6F] = op(M::Rra, Abs, 6);
        t[0x73] = op(M::Rra, Izy, 8);
        t[0x77] = op(M::Rra, Zpx, 6);
        t[0x7B] = op(M::Rra, Aby, 7);
        t[0x7F] = op(M::Rra, Abx, 7);
        // SAX: store A & X
        t[0x83] = op(M::Sax, Izx, 6);
        t[0x87] = op(M::Sax, Zp0, 3);
        t[0x8F] = op(M::Sax, Abs, 4);
        t[0x97] = op(M::Sax, Zpy, 4);
        // LAX: LDA + LDX
        t[0xA3] = op(M::Lax, Izx, 6);
        t[0xA7] = op(M::Lax, Zp0, 3);
        t[0xAF] = op(M::Lax, Abs, 4);
        t[0xB3] = op(M::Lax, Izy, 5);
        t[0xB7] = op(M::Lax, Zpy, 4);
        t[0xBF] = op(M::Lax, Aby, 4);
        // DCP: DEC + CMP
        t[0xC3] = op(M::Dcp, Izx, 8);
        t[0xC7] = op(M::Dcp, Zp0, 5);
        t[0xCF] = op(M::Dcp, Abs, 6);
        t[0xD3] = op(M::Dcp, Izy, 8);
        t[0xD7] = op(M::Dcp, Zpx, 6);
        t[0xDB] = op(M::Dcp, Aby, 7);
        t[0xDF] = op(M::Dcp, Abx, 7);
        // ISC: INC + SBC
        t[0xE3] = op(M::Isc, Izx, 8);
        t[0xE7] = op(M::Isc, Zp0, 5);
        t[0xEF] = op(M::Isc, Abs, 6);
        t[0xF3] = op(M::Isc, Izy, 8);
        t[0xF7] = op(M::Isc, Zpx, 6);
        t[0xFB] = op(M::Isc, Aby, 7);
        t[0xFF] = op(M::Isc, Abx, 7);
        // Immediate-mode combinations
        t[0x0B] = op(M::Anc, Imm, 2);
        t[0x2B] = op(M::Anc2, Imm, 2);
        t[0x4B] = op(M::Alr, Imm, 2);
        t[0x6B] = op(M::Arr, Imm, 2);
        t[0x8B] = op(M::Ane, Imm, 2);
        t[0xAB] = op(M::Lxa, Imm, 2);
        t[0xCB] = op(M::Sbx, Imm, 2);
        t[0xEB] = op(M::Usbc, Imm, 2);
        // Unstable high-byte stores
        t[0x93] = op(M::Sha, Izy, 6);
        t[0x9B] = op(M::Tas, Aby, 5);
        t[0x9C] = op(M::Shy, Abx, 5);
        t[0x9E] = op(M::Shx, Aby, 5);
        t[0x9F] = op(M::Sha, Aby, 5);
        // LAS: memory & SP into A, X, SP
        t[0xBB] = op(M::Las, Aby, 4);
        // Multi-byte NOPs
        t[0x80] = op(M::Dop, Imm, 2);
        t[0x82] = op(M::Dop, Imm, 2);
        t[0x89] = op(M::Dop, Imm, 2);
        t[0xC2] = op(M::Dop, Imm, 2);
        t[0xE2] = op(M::Dop, Imm, 2);
        t[0x04] = op(M::Dop, Zp0, 3);
        t[0x44] = op(M::Dop, Zp0, 3);
        t[0x64] = op(M::Dop, Zp0, 3);
        t[0x14] = op(M::Dop, Zpx, 4);
        t[0x34] = op(M::Dop, Zpx, 4);
        t[0x54] = op(M::Dop, Zpx, 4);
        t[0x74] = op(M::Dop, Zpx, 4);
        t[0xD4] = op(M::Dop, Zpx, 4);
        t[0xF4] = op(M::Dop, Zpx, 4);
        t[0x0C] = op(M::Top, Abs, 4);
        t[0x1C] = op(M::Top, Abx, 4);
        t[0x3C] = op(M::Top, Abx, 4);
        t[0x5C] = op(M::Top, Abx, 4);
        t[0x7C] = op(M::Top, Abx, 4);
        t[0xDC] = op(M::Top, Abx, 4);
        t[0xFC] = op(M::Top, Abx, 4);
        // Single-byte NOPs
        t[0x1A] = op(M::Nop, Imp, 2);
        t[0x3A] = op(M::Nop, Imp, 2);
        t[0x5A] = op(M::Nop, Imp, 2);
        t[0x7A] = op(M::Nop, Imp, 2);
        t[0xDA] = op(M::Nop, Imp, 2);
        t[0xFA] = op(M::Nop, Imp, 2);
    }

    if cfg!(feature = "emulate-65c02") {
        // The CMOS part drops the dead cycle from the abs,X shifts and adds
        // the two wait/stop opcodes. Applied last, so these win over the
        // NMOS undocumented assignments.
        t[0x1E] = op(M::Asl, Abx, 6);
        t[0x3E] = op(M::Rol, Abx, 6);
        t[0x5E] = op(M::Lsr, Abx, 6);
        t[0x7E] = op(M::Ror, Abx, 6);
        t[0xCB] = op(M::Wai, Imp, 3);
        t[0xDB] = op(M::Stp, Imp, 7);
    }

    t
}

/// The active decode table: 256 immutable entries, built once.
pub static OPCODE_TABLE: [OpcodeInfo; 256] = build_table();

/// Looks up an opcode. Unassigned slots decode to the [`Mnemonic::Xxx`]
/// catch-all, so this never fails; execution treats the catch-all as a
/// two-cycle NOP.
#[must_use]
pub fn decode(opcode: u8) -> OpcodeInfo {
    OPCODE_TABLE[opcode as usize]
}

/// Looks up an opcode, failing on slots with no assignment in the active
/// build.
///
/// # Errors
///
/// Returns [`CpuError::InvalidOpcode`] when the slot is unassigned (only
/// possible when the `illegal` feature is disabled).
pub fn decode_strict(opcode: u8) -> Result<OpcodeInfo> {
    let info = OPCODE_TABLE[opcode as usize];
    if info.assigned() {
        Ok(info)
    } else {
        Err(CpuError::InvalidOpcode(opcode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_entries() {
        assert_eq!(decode(0xA9).mnemonic, Mnemonic::Lda);
        assert_eq!(decode(0xA9).mode, AddrMode::Imm);
        assert_eq!(decode(0xA9).cycles, 2);

        assert_eq!(decode(0x4C).mnemonic, Mnemonic::Jmp);
        assert_eq!(decode(0x4C).mode, AddrMode::Abs);
        assert_eq!(decode(0x6C).mode, AddrMode::Ind);

        assert_eq!(decode(0x00).mnemonic, Mnemonic::Brk);
        assert_eq!(decode(0x00).cycles, 7);
    }

    #[test]
    fn test_official_count() {
        let official = OPCODE_TABLE
            .iter()
            .filter(|info| info.assigned() && !info.mnemonic.unofficial())
            .filter(|info| !matches!(info.mnemonic, Mnemonic::Wai | Mnemonic::Stp))
            .count();
        assert_eq!(official, 151);
    }

    #[cfg(feature = "illegal")]
    #[test]
    fn test_every_slot_assigned_with_illegals() {
        #[cfg(not(feature = "emulate-65c02"))]
        assert!(OPCODE_TABLE.iter().all(OpcodeInfo::assigned));

        assert_eq!(decode(0x03).mnemonic, Mnemonic::Slo);
        assert_eq!(decode(0x03).cycles, 8);
        assert_eq!(decode(0xA3).mnemonic, Mnemonic::Lax);
        assert_eq!(decode(0x02).mnemonic, Mnemonic::Jam);
    }

    #[cfg(not(feature = "illegal"))]
    #[test]
    fn test_unofficial_slots_are_catch_all() {
        assert!(!decode(0x03).assigned());
        assert_eq!(decode(0x03).cycles, 2);
        assert!(decode_strict(0x03).is_err());
    }

    #[test]
    fn test_decode_strict_on_official() {
        assert!(decode_strict(0xEA).is_ok());
    }

    #[cfg(feature = "emulate-65c02")]
    #[test]
    fn test_cmos_cycle_changes() {
        assert_eq!(decode(0x1E).cycles, 6);
        assert_eq!(decode(0x5E).cycles, 6);
        assert_eq!(decode(0xCB).mnemonic, Mnemonic::Wai);
        assert_eq!(decode(0xDB).mnemonic, Mnemonic::Stp);
    }

    #[cfg(not(feature = "emulate-65c02"))]
    #[test]
    fn test_nmos_cycle_counts() {
        assert_eq!(decode(0x1E).cycles, 7);
        assert_eq!(decode(0x7E).cycles, 7);
    }

    #[test]
    fn test_page_cross_classification() {
        assert!(Mnemonic::Lda.page_cross_penalty());
        assert!(Mnemonic::Top.page_cross_penalty());
        assert!(!Mnemonic::Sta.page_cross_penalty());
        assert!(!Mnemonic::Asl.page_cross_penalty());
        assert!(!Mnemonic::Dcp.page_cross_penalty());
    }
}
