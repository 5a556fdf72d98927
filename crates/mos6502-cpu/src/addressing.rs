//! 6502 addressing modes.
//!
//! Each opcode names one of thirteen addressing modes. The mode routine runs
//! before the instruction routine: it computes the operand's effective
//! address (or notes that the operand is the accumulator), advances PC past
//! the operand bytes, and accounts for the cycles its memory traffic costs.
//!
//! Several modes can require an additional cycle when indexing crosses a
//! page boundary. Whether that penalty actually applies depends on the
//! instruction: loads and other read-only operations take it, stores and
//! read-modify-write operations have the worst case baked into their base
//! cycle count (see [`Mnemonic::page_cross_penalty`]).

use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcodes::Mnemonic;

/// Addressing modes for 6502 instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// Implied - no operand, the operation is implicit.
    /// Example: CLC, SEC, INX
    Imp,

    /// Accumulator - the operand is the accumulator.
    /// Example: ASL A, ROL A
    Acc,

    /// Immediate - 8-bit constant operand.
    /// Example: LDA #$42
    Imm,

    /// Zero Page - 8-bit address into `$0000-$00FF`.
    /// Example: LDA $42
    Zp0,

    /// Zero Page,X - zero page address plus X, wrapping within the page.
    /// Example: LDA $42,X
    Zpx,

    /// Zero Page,Y - zero page address plus Y, wrapping within the page.
    /// Example: LDX $42,Y
    Zpy,

    /// Relative - signed 8-bit displacement for branches.
    /// Example: BEQ label
    Rel,

    /// Absolute - full 16-bit address.
    /// Example: LDA $1234
    Abs,

    /// Absolute,X - 16-bit address plus X.
    /// Example: LDA $1234,X
    Abx,

    /// Absolute,Y - 16-bit address plus Y.
    /// Example: LDA $1234,Y
    Aby,

    /// Indirect - a 16-bit pointer to the 16-bit target. JMP only.
    /// Carries the NMOS page-wrap bug.
    /// Example: JMP ($1234)
    Ind,

    /// Indexed Indirect - pointer in zero page indexed by X.
    /// Example: LDA ($42,X)
    Izx,

    /// Indirect Indexed - zero-page pointer, then indexed by Y.
    /// Example: LDA ($42),Y
    Izy,
}

impl AddrMode {
    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_size(self) -> u8 {
        match self {
            Self::Imp | Self::Acc => 0,
            Self::Imm | Self::Zp0 | Self::Zpx | Self::Zpy | Self::Rel | Self::Izx | Self::Izy => 1,
            Self::Abs | Self::Abx | Self::Aby | Self::Ind => 2,
        }
    }

    /// The canonical three-letter spelling (used by the disassembler).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Imp => "IMP",
            Self::Acc => "ACC",
            Self::Imm => "IMM",
            Self::Zp0 => "ZP0",
            Self::Zpx => "ZPX",
            Self::Zpy => "ZPY",
            Self::Rel => "REL",
            Self::Abs => "ABS",
            Self::Abx => "ABX",
            Self::Aby => "ABY",
            Self::Ind => "IND",
            Self::Izx => "IZX",
            Self::Izy => "IZY",
        }
    }
}

impl<B: Bus> Cpu<B> {
    /// Runs the addressing-mode routine for the current instruction.
    ///
    /// On return `addr_abs` holds the effective address (or `addr_rel` the
    /// sign-extended branch displacement), PC has advanced past the operand
    /// bytes, and any page-cross penalty cycles have been charged.
    pub(crate) fn resolve_mode(&mut self, mode: AddrMode, mnemonic: Mnemonic) {
        self.page_crossed = false;
        match mode {
            AddrMode::Imp => self.addr_implied(),
            AddrMode::Acc => self.addr_accumulator(),
            AddrMode::Imm => self.addr_immediate(),
            AddrMode::Zp0 => self.addr_zero_page(),
            AddrMode::Zpx => self.addr_zero_page_indexed(self.regs.x),
            AddrMode::Zpy => self.addr_zero_page_indexed(self.regs.y),
            AddrMode::Rel => self.addr_relative(),
            AddrMode::Abs => self.addr_absolute(),
            AddrMode::Abx => self.addr_absolute_indexed(self.regs.x, mnemonic),
            AddrMode::Aby => self.addr_absolute_indexed(self.regs.y, mnemonic),
            AddrMode::Ind => self.addr_indirect(),
            AddrMode::Izx => self.addr_indexed_indirect(),
            AddrMode::Izy => self.addr_indirect_indexed(mnemonic),
        }
    }

    /// No operand bytes; the instruction is self-contained.
    fn addr_implied(&mut self) {
        self.fetched = 0;
    }

    /// The operand is the accumulator; the instruction writes back to AC.
    fn addr_accumulator(&mut self) {
        self.fetched = self.regs.ac;
    }

    /// The operand is the next program byte, so the effective address is PC
    /// itself.
    fn addr_immediate(&mut self) {
        self.addr_abs = self.regs.pc;
        self.regs.pc = self.regs.pc.wrapping_add(1);
    }

    /// One address byte into the first page. Saves a program byte over the
    /// absolute form, which is why zero page is prime 6502 real estate.
    fn addr_zero_page(&mut self) {
        self.addr_abs = u16::from(self.read_tick(self.regs.pc));
        self.regs.pc = self.regs.pc.wrapping_add(1);
    }

    /// Zero page plus an index register. The add happens inside the zero
    /// page, so `$FF + 1` wraps to `$00`, and it costs one internal cycle.
    fn addr_zero_page_indexed(&mut self, index: u8) {
        let base = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.tick();
        self.addr_abs = u16::from(base.wrapping_add(index));
    }

    /// Signed 8-bit displacement for branches, sign-extended into
    /// `addr_rel`. The branch instruction applies it (or doesn't).
    fn addr_relative(&mut self) {
        let disp = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.addr_rel = disp as i8 as u16;
    }

    /// Full little-endian 16-bit address.
    fn addr_absolute(&mut self) {
        let lo = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        let hi = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.addr_abs = u16::from_le_bytes([lo, hi]);
    }

    /// Absolute plus an index register. Crossing into the next page costs
    /// an extra cycle for read-style instructions only.
    fn addr_absolute_indexed(&mut self, index: u8, mnemonic: Mnemonic) {
        let lo = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        let hi = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);

        let base = u16::from_le_bytes([lo, hi]);
        self.addr_abs = base.wrapping_add(u16::from(index));
        self.page_crossed = (self.addr_abs & 0xFF00) != (base & 0xFF00);

        if self.page_crossed && mnemonic.page_cross_penalty() {
            self.add_extra_cycle();
        }
    }

    /// The pointer for JMP indirect, including the NMOS hardware bug: a
    /// pointer whose low byte is `$FF` fetches its high byte from the start
    /// of the same page instead of the next one. The 65C02 build reads the
    /// correct address.
    fn addr_indirect(&mut self) {
        let ptr_lo = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        let ptr_hi = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);

        let ptr = u16::from_le_bytes([ptr_lo, ptr_hi]);
        let hi_addr = if ptr_lo == 0xFF && !cfg!(feature = "emulate-65c02") {
            ptr & 0xFF00
        } else {
            ptr.wrapping_add(1)
        };

        let lo = self.read_tick(ptr);
        let hi = self.read_tick(hi_addr);
        self.addr_abs = u16::from_le_bytes([lo, hi]);
    }

    /// `($nn,X)`: the operand byte plus X indexes a pointer in zero page.
    /// Both the index add and the pointer walk wrap within the zero page.
    fn addr_indexed_indirect(&mut self) {
        let base = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.tick();

        let zp = base.wrapping_add(self.regs.x);
        let lo = self.read_tick(u16::from(zp));
        let hi = self.read_tick(u16::from(zp.wrapping_add(1)));
        self.addr_abs = u16::from_le_bytes([lo, hi]);
    }

    /// `($nn),Y`: the operand byte indexes a pointer in zero page (wrapping
    /// for the high half), and Y offsets the pointed-to address. Crossing a
    /// page costs the read-only penalty cycle.
    fn addr_indirect_indexed(&mut self, mnemonic: Mnemonic) {
        let zp = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);

        let lo = self.read_tick(u16::from(zp));
        let hi = self.read_tick(u16::from(zp.wrapping_add(1)));
        let base = u16::from_le_bytes([lo, hi]);

        self.addr_abs = base.wrapping_add(u16::from(self.regs.y));
        self.page_crossed = (self.addr_abs & 0xFF00) != (base & 0xFF00);

        if self.page_crossed && mnemonic.page_cross_penalty() {
            self.add_extra_cycle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_size() {
        assert_eq!(AddrMode::Imp.operand_size(), 0);
        assert_eq!(AddrMode::Acc.operand_size(), 0);
        assert_eq!(AddrMode::Imm.operand_size(), 1);
        assert_eq!(AddrMode::Zp0.operand_size(), 1);
        assert_eq!(AddrMode::Rel.operand_size(), 1);
        assert_eq!(AddrMode::Izx.operand_size(), 1);
        assert_eq!(AddrMode::Abs.operand_size(), 2);
        assert_eq!(AddrMode::Ind.operand_size(), 2);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(AddrMode::Zpx.name(), "ZPX");
        assert_eq!(AddrMode::Izy.name(), "IZY");
    }
}
