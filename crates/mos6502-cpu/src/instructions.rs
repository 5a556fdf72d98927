//! 6502 instruction implementations.
//!
//! One routine per mnemonic. Each consumes the operand staged by the
//! addressing mode, mutates registers/flags/memory, and inserts the internal
//! cycles that memory traffic alone does not account for, so the per-step
//! totals match the published timing tables.
//!
//! The undocumented NMOS instructions live at the bottom. Their behavior is
//! deterministic on real silicon and well documented by now; the two
//! "magic constant" instructions (ANE/LXA) use a fixed `$EE`, which models
//! the analog OR seen on most production parts.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcodes::Mnemonic;
use crate::status::Status;
use crate::vectors;
use log::warn;

/// Magic constant for the unstable ANE/LXA encodings. Batch-dependent on
/// real chips ($FF, $EE or $00 are all attested); fixed here.
const ANE_MAGIC: u8 = 0xEE;

impl<B: Bus> Cpu<B> {
    /// Dispatches the decoded mnemonic.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn execute(&mut self, mnemonic: Mnemonic, mode: AddrMode) {
        match mnemonic {
            // Arithmetic
            Mnemonic::Adc => self.adc(mode),
            Mnemonic::Sbc | Mnemonic::Usbc => self.sbc(mode),

            // Logic
            Mnemonic::And => self.and(mode),
            Mnemonic::Ora => self.ora(mode),
            Mnemonic::Eor => self.eor(mode),
            Mnemonic::Bit => self.bit(mode),

            // Shifts and rotates
            Mnemonic::Asl => self.asl(mode),
            Mnemonic::Lsr => self.lsr(mode),
            Mnemonic::Rol => self.rol(mode),
            Mnemonic::Ror => self.ror(mode),

            // Loads and stores
            Mnemonic::Lda => self.lda(mode),
            Mnemonic::Ldx => self.ldx(mode),
            Mnemonic::Ldy => self.ldy(mode),
            Mnemonic::Sta => self.sta(mode),
            Mnemonic::Stx => self.stx(mode),
            Mnemonic::Sty => self.sty(mode),

            // Register transfers
            Mnemonic::Tax => self.tax(),
            Mnemonic::Tay => self.tay(),
            Mnemonic::Tsx => self.tsx(),
            Mnemonic::Txa => self.txa(),
            Mnemonic::Txs => self.txs(),
            Mnemonic::Tya => self.tya(),

            // Increment / decrement
            Mnemonic::Inc => self.inc(mode),
            Mnemonic::Dec => self.dec(mode),
            Mnemonic::Inx => self.inx(),
            Mnemonic::Iny => self.iny(),
            Mnemonic::Dex => self.dex(),
            Mnemonic::Dey => self.dey(),

            // Compares
            Mnemonic::Cmp => self.cmp(mode),
            Mnemonic::Cpx => self.cpx(mode),
            Mnemonic::Cpy => self.cpy(mode),

            // Branches
            Mnemonic::Bcc => self.branch_op(!self.regs.get_flag(Status::C)),
            Mnemonic::Bcs => self.branch_op(self.regs.get_flag(Status::C)),
            Mnemonic::Beq => self.branch_op(self.regs.get_flag(Status::Z)),
            Mnemonic::Bne => self.branch_op(!self.regs.get_flag(Status::Z)),
            Mnemonic::Bmi => self.branch_op(self.regs.get_flag(Status::N)),
            Mnemonic::Bpl => self.branch_op(!self.regs.get_flag(Status::N)),
            Mnemonic::Bvs => self.branch_op(self.regs.get_flag(Status::V)),
            Mnemonic::Bvc => self.branch_op(!self.regs.get_flag(Status::V)),

            // Jumps and returns
            Mnemonic::Jmp => self.jmp(),
            Mnemonic::Jsr => self.jsr(),
            Mnemonic::Rts => self.rts(),
            Mnemonic::Rti => self.rti(),
            Mnemonic::Brk => self.brk(),

            // Stack
            Mnemonic::Pha => self.pha(),
            Mnemonic::Php => self.php(),
            Mnemonic::Pla => self.pla(),
            Mnemonic::Plp => self.plp(),

            // Flags
            Mnemonic::Clc => self.flag_op(Status::C, false),
            Mnemonic::Sec => self.flag_op(Status::C, true),
            Mnemonic::Cli => self.flag_op(Status::I, false),
            Mnemonic::Sei => self.flag_op(Status::I, true),
            Mnemonic::Clv => self.flag_op(Status::V, false),
            Mnemonic::Cld => self.flag_op(Status::D, false),
            Mnemonic::Sed => self.flag_op(Status::D, true),

            Mnemonic::Nop => self.nop(),

            // Undocumented
            Mnemonic::Slo => self.slo(mode),
            Mnemonic::Rla => self.rla(mode),
            Mnemonic::Sre => self.sre(mode),
            Mnemonic::Rra => self.rra(mode),
            Mnemonic::Dcp => self.dcp(mode),
            Mnemonic::Isc => self.isc(mode),
            Mnemonic::Lax => self.lax(mode),
            Mnemonic::Sax => self.sax(mode),
            Mnemonic::Las => self.las(mode),
            Mnemonic::Anc | Mnemonic::Anc2 => self.anc(mode),
            Mnemonic::Alr => self.alr(mode),
            Mnemonic::Arr => self.arr(mode),
            Mnemonic::Ane => self.ane(mode),
            Mnemonic::Lxa => self.lxa(mode),
            Mnemonic::Sbx => self.sbx(mode),
            Mnemonic::Sha => self.sha(mode),
            Mnemonic::Shx => self.shx(mode),
            Mnemonic::Shy => self.shy(mode),
            Mnemonic::Tas => self.tas(mode),
            Mnemonic::Dop => self.nop_read(),
            Mnemonic::Top => self.nop_read(),
            Mnemonic::Jam => self.jam_op(),

            // 65C02
            Mnemonic::Wai => self.wai(),
            Mnemonic::Stp => self.stp(),

            Mnemonic::Xxx => self.xxx(),
        }
    }

    // =========================================================================
    // COMMON OPERATIONS
    // =========================================================================

    /// Sets Z and N from a result byte.
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.regs.sr.set_zn(value);
    }

    /// Shared branch tail: a taken branch costs one cycle, crossing a page
    /// on the way costs another.
    fn branch_op(&mut self, take: bool) {
        if !take {
            return;
        }
        self.add_extra_cycle();
        let target = self.regs.pc.wrapping_add(self.addr_rel);
        if (target & 0xFF00) != (self.regs.pc & 0xFF00) {
            self.add_extra_cycle();
        }
        self.regs.pc = target;
    }

    /// Read-modify-write scaffolding shared by the shifts, INC/DEC and the
    /// undocumented RMW fusions.
    ///
    /// Memory forms read the operand, write the unmodified value back (the
    /// hardware does), then write the result. Indexed forms spend the dead
    /// address-fix cycle; under `emulate-65c02` the shifts skip it when no
    /// page was crossed (`cmos_fast`).
    fn modify(&mut self, mode: AddrMode, cmos_fast: bool, f: impl FnOnce(&mut Self, u8) -> u8) {
        if mode == AddrMode::Acc {
            self.tick();
            let value = self.regs.ac;
            let result = f(&mut *self, value);
            self.regs.ac = result;
            return;
        }

        let value = self.fetch_operand(mode);
        self.write_tick(self.addr_abs, value);
        let result = f(&mut *self, value);
        self.write_tick(self.addr_abs, result);

        if matches!(mode, AddrMode::Abx | AddrMode::Aby | AddrMode::Izy)
            && !(cmos_fast && cfg!(feature = "emulate-65c02") && !self.page_crossed)
        {
            self.tick();
        }
    }

    /// Store tail: indexed stores always pay the address-fix cycle.
    fn store(&mut self, mode: AddrMode, value: u8) {
        self.write_tick(self.addr_abs, value);
        if matches!(mode, AddrMode::Abx | AddrMode::Aby | AddrMode::Izy) {
            self.tick();
        }
    }

    /// Binary add with carry; the single ALU path behind ADC, SBC and RRA.
    ///
    /// `V = ~(A^M) & (A^R) & $80`: set when both inputs share a sign and the
    /// result does not.
    fn adc_binary(&mut self, value: u8) {
        let a = u16::from(self.regs.ac);
        let m = u16::from(value);
        let c = u16::from(self.regs.get_flag(Status::C));

        let sum = a + m + c;
        let result = sum as u8;

        self.regs.set_flag(Status::C, sum > 0xFF);
        self.regs
            .set_flag(Status::V, (!(a ^ m) & (a ^ sum)) & 0x80 != 0);
        self.regs.ac = result;
        self.set_zn(result);
    }

    /// BCD add, nibble by nibble; C reflects decimal overflow.
    fn adc_decimal(&mut self, value: u8) {
        let a = self.regs.ac;
        let c = u8::from(self.regs.get_flag(Status::C));

        let d0 = (a & 0x0F) + (value & 0x0F) + c;
        let d1 = (a >> 4) + (value >> 4) + u8::from(d0 > 9);
        let result = (d0 % 10) | ((d1 % 10) << 4);

        self.regs.set_flag(Status::C, d1 > 9);
        self.regs.ac = result;
        self.set_zn(result);
    }

    /// BCD subtract; C clear means a borrow was needed.
    fn sbc_decimal(&mut self, value: u8) {
        let a = self.regs.ac;
        let borrow = i16::from(!self.regs.get_flag(Status::C));

        let d0 = i16::from(a & 0x0F) - i16::from(value & 0x0F) - borrow;
        let d1 = i16::from(a >> 4) - i16::from(value >> 4) - i16::from(d0 < 0);
        let lo = if d0 < 0 { d0 + 10 } else { d0 } as u8;
        let hi = if d1 < 0 { d1 + 10 } else { d1 } as u8;
        let result = lo | (hi << 4);

        self.regs.set_flag(Status::C, d1 >= 0);
        self.regs.ac = result;
        self.set_zn(result);
    }

    fn adc_value(&mut self, value: u8) {
        if cfg!(feature = "decimal-mode") && self.regs.get_flag(Status::D) {
            self.adc_decimal(value);
        } else {
            self.adc_binary(value);
        }
    }

    fn sbc_value(&mut self, value: u8) {
        if cfg!(feature = "decimal-mode") && self.regs.get_flag(Status::D) {
            self.sbc_decimal(value);
        } else {
            // Inverting the operand turns A - M - (1-C) into A + ~M + C.
            self.adc_binary(!value);
        }
    }

    /// Shared compare: C = reg >= M, Z = reg == M, N from the difference.
    fn compare(&mut self, reg: u8, value: u8) {
        self.regs.set_flag(Status::C, reg >= value);
        self.set_zn(reg.wrapping_sub(value));
    }

    // =========================================================================
    // OFFICIAL INSTRUCTIONS
    // =========================================================================

    /// ADC - Add with Carry: `A = A + M + C`. Flags: C, V, N, Z.
    fn adc(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.adc_value(value);
    }

    /// SBC - Subtract with Borrow: `A = A - M - (1 - C)`. Flags: C, V, N, Z.
    fn sbc(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.sbc_value(value);
    }

    /// AND - Bitwise AND: `A = A & M`. Flags: N, Z.
    fn and(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.ac &= value;
        let a = self.regs.ac;
        self.set_zn(a);
    }

    /// ORA - Bitwise OR: `A = A | M`. Flags: N, Z.
    fn ora(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.ac |= value;
        let a = self.regs.ac;
        self.set_zn(a);
    }

    /// EOR - Bitwise XOR: `A = A ^ M`. Flags: N, Z.
    fn eor(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.ac ^= value;
        let a = self.regs.ac;
        self.set_zn(a);
    }

    /// BIT - Test bits: `Z = (A & M) == 0`, `N = M7`, `V = M6`.
    fn bit(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.set_flag(Status::Z, self.regs.ac & value == 0);
        self.regs.set_flag(Status::N, value & 0x80 != 0);
        self.regs.set_flag(Status::V, value & 0x40 != 0);
    }

    /// ASL - Arithmetic shift left: `C <- [7..0] <- 0`. Flags: C, N, Z.
    fn asl(&mut self, mode: AddrMode) {
        self.modify(mode, true, |cpu, value| {
            cpu.regs.set_flag(Status::C, value & 0x80 != 0);
            let result = value << 1;
            cpu.set_zn(result);
            result
        });
    }

    /// LSR - Logical shift right: `0 -> [7..0] -> C`. Flags: C, Z; N = 0.
    fn lsr(&mut self, mode: AddrMode) {
        self.modify(mode, true, |cpu, value| {
            cpu.regs.set_flag(Status::C, value & 0x01 != 0);
            let result = value >> 1;
            cpu.set_zn(result);
            result
        });
    }

    /// ROL - Rotate left through carry. Flags: C, N, Z.
    fn rol(&mut self, mode: AddrMode) {
        self.modify(mode, true, |cpu, value| {
            let carry_in = u8::from(cpu.regs.get_flag(Status::C));
            cpu.regs.set_flag(Status::C, value & 0x80 != 0);
            let result = (value << 1) | carry_in;
            cpu.set_zn(result);
            result
        });
    }

    /// ROR - Rotate right through carry. Flags: C, N, Z.
    fn ror(&mut self, mode: AddrMode) {
        self.modify(mode, true, |cpu, value| {
            let carry_in = u8::from(cpu.regs.get_flag(Status::C));
            cpu.regs.set_flag(Status::C, value & 0x01 != 0);
            let result = (value >> 1) | (carry_in << 7);
            cpu.set_zn(result);
            result
        });
    }

    /// LDA - Load accumulator. Flags: N, Z.
    fn lda(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.ac = value;
        self.set_zn(value);
    }

    /// LDX - Load X. Flags: N, Z.
    fn ldx(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.x = value;
        self.set_zn(value);
    }

    /// LDY - Load Y. Flags: N, Z.
    fn ldy(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.y = value;
        self.set_zn(value);
    }

    /// STA - Store accumulator.
    fn sta(&mut self, mode: AddrMode) {
        let value = self.regs.ac;
        self.store(mode, value);
    }

    /// STX - Store X.
    fn stx(&mut self, mode: AddrMode) {
        let value = self.regs.x;
        self.store(mode, value);
    }

    /// STY - Store Y.
    fn sty(&mut self, mode: AddrMode) {
        let value = self.regs.y;
        self.store(mode, value);
    }

    /// TAX - Transfer A to X. Flags: N, Z.
    fn tax(&mut self) {
        self.tick();
        self.regs.x = self.regs.ac;
        let v = self.regs.x;
        self.set_zn(v);
    }

    /// TAY - Transfer A to Y. Flags: N, Z.
    fn tay(&mut self) {
        self.tick();
        self.regs.y = self.regs.ac;
        let v = self.regs.y;
        self.set_zn(v);
    }

    /// TSX - Transfer SP to X. Flags: N, Z.
    fn tsx(&mut self) {
        self.tick();
        self.regs.x = self.regs.sp;
        let v = self.regs.x;
        self.set_zn(v);
    }

    /// TXA - Transfer X to A. Flags: N, Z.
    fn txa(&mut self) {
        self.tick();
        self.regs.ac = self.regs.x;
        let v = self.regs.ac;
        self.set_zn(v);
    }

    /// TXS - Transfer X to SP. No flags.
    fn txs(&mut self) {
        self.tick();
        self.regs.sp = self.regs.x;
    }

    /// TYA - Transfer Y to A. Flags: N, Z.
    fn tya(&mut self) {
        self.tick();
        self.regs.ac = self.regs.y;
        let v = self.regs.ac;
        self.set_zn(v);
    }

    /// INC - Increment memory. Flags: N, Z.
    fn inc(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            let result = value.wrapping_add(1);
            cpu.set_zn(result);
            result
        });
    }

    /// DEC - Decrement memory. Flags: N, Z.
    fn dec(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            let result = value.wrapping_sub(1);
            cpu.set_zn(result);
            result
        });
    }

    /// INX - Increment X. Flags: N, Z.
    fn inx(&mut self) {
        self.tick();
        self.regs.x = self.regs.x.wrapping_add(1);
        let v = self.regs.x;
        self.set_zn(v);
    }

    /// INY - Increment Y. Flags: N, Z.
    fn iny(&mut self) {
        self.tick();
        self.regs.y = self.regs.y.wrapping_add(1);
        let v = self.regs.y;
        self.set_zn(v);
    }

    /// DEX - Decrement X. Flags: N, Z.
    fn dex(&mut self) {
        self.tick();
        self.regs.x = self.regs.x.wrapping_sub(1);
        let v = self.regs.x;
        self.set_zn(v);
    }

    /// DEY - Decrement Y. Flags: N, Z.
    fn dey(&mut self) {
        self.tick();
        self.regs.y = self.regs.y.wrapping_sub(1);
        let v = self.regs.y;
        self.set_zn(v);
    }

    /// CMP - Compare accumulator. Flags: C, Z, N.
    fn cmp(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.compare(self.regs.ac, value);
    }

    /// CPX - Compare X. Flags: C, Z, N.
    fn cpx(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.compare(self.regs.x, value);
    }

    /// CPY - Compare Y. Flags: C, Z, N.
    fn cpy(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.compare(self.regs.y, value);
    }

    /// JMP - Jump to the resolved address (absolute or indirect).
    fn jmp(&mut self) {
        self.regs.pc = self.addr_abs;
    }

    /// JSR - Push the address of the last operand byte, then jump.
    fn jsr(&mut self) {
        self.tick();
        let ret = self.regs.pc.wrapping_sub(1);
        self.push_tick((ret >> 8) as u8);
        self.push_tick((ret & 0xFF) as u8);
        self.regs.pc = self.addr_abs;
    }

    /// RTS - Pull PC and resume at the byte after the JSR operand.
    fn rts(&mut self) {
        self.tick();
        let lo = self.pop_tick();
        let hi = self.pop_tick();
        self.tick();
        self.regs.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
        self.tick();
    }

    /// RTI - Pull status (B discarded, U forced), then PC. No +1.
    fn rti(&mut self) {
        self.tick();
        self.tick();
        let sr = self.pop_tick();
        self.regs.sr = Status::from_stack_byte(sr);
        let lo = self.pop_tick();
        let hi = self.pop_tick();
        self.regs.pc = u16::from_le_bytes([lo, hi]);
    }

    /// BRK - Software interrupt through `$FFFE`, with B set in the pushed
    /// status.
    fn brk(&mut self) {
        self.break_op(true, vectors::IRQ);
    }

    /// PHA - Push accumulator.
    fn pha(&mut self) {
        self.tick();
        let value = self.regs.ac;
        self.push_tick(value);
    }

    /// PHP - Push status with B and U set in the pushed copy.
    fn php(&mut self) {
        self.tick();
        let value = self.regs.sr.to_stack_byte(true);
        self.push_tick(value);
    }

    /// PLA - Pull accumulator. Flags: N, Z.
    fn pla(&mut self) {
        self.tick();
        self.tick();
        let value = self.pop_tick();
        self.regs.ac = value;
        self.set_zn(value);
    }

    /// PLP - Pull status; B is discarded and U forced high.
    fn plp(&mut self) {
        self.tick();
        self.tick();
        let value = self.pop_tick();
        self.regs.sr = Status::from_stack_byte(value);
    }

    /// CLC/SEC/CLI/SEI/CLV/CLD/SED - one flag, one internal cycle.
    fn flag_op(&mut self, flag: Status, value: bool) {
        self.regs.set_flag(flag, value);
        self.tick();
    }

    /// NOP - One internal cycle, nothing else.
    fn nop(&mut self) {
        self.tick();
    }

    // =========================================================================
    // UNDOCUMENTED INSTRUCTIONS
    // =========================================================================

    /// SLO - ASL memory, then ORA the result into A. Flags: C, N, Z.
    fn slo(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            cpu.regs.set_flag(Status::C, value & 0x80 != 0);
            let result = value << 1;
            cpu.regs.ac |= result;
            let a = cpu.regs.ac;
            cpu.set_zn(a);
            result
        });
    }

    /// RLA - ROL memory, then AND the result into A. Flags: C, N, Z.
    fn rla(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            let carry_in = u8::from(cpu.regs.get_flag(Status::C));
            cpu.regs.set_flag(Status::C, value & 0x80 != 0);
            let result = (value << 1) | carry_in;
            cpu.regs.ac &= result;
            let a = cpu.regs.ac;
            cpu.set_zn(a);
            result
        });
    }

    /// SRE - LSR memory, then EOR the result into A. Flags: C, N, Z.
    fn sre(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            cpu.regs.set_flag(Status::C, value & 0x01 != 0);
            let result = value >> 1;
            cpu.regs.ac ^= result;
            let a = cpu.regs.ac;
            cpu.set_zn(a);
            result
        });
    }

    /// RRA - ROR memory, then ADC the result; the rotate's carry feeds the
    /// add. Flags: C, V, N, Z.
    fn rra(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            let carry_in = u8::from(cpu.regs.get_flag(Status::C));
            cpu.regs.set_flag(Status::C, value & 0x01 != 0);
            let result = (value >> 1) | (carry_in << 7);
            cpu.adc_value(result);
            result
        });
    }

    /// DCP - DEC memory, then compare A against the decremented value.
    /// Flags: C, Z, N.
    fn dcp(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            let result = value.wrapping_sub(1);
            let a = cpu.regs.ac;
            cpu.compare(a, result);
            result
        });
    }

    /// ISC - INC memory, then SBC the incremented value. Flags: C, V, N, Z.
    fn isc(&mut self, mode: AddrMode) {
        self.modify(mode, false, |cpu, value| {
            let result = value.wrapping_add(1);
            cpu.sbc_value(result);
            result
        });
    }

    /// LAX - LDA and LDX at once. Flags: N, Z.
    fn lax(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.ac = value;
        self.regs.x = value;
        self.set_zn(value);
    }

    /// SAX - Store `A & X`. No flags.
    fn sax(&mut self, mode: AddrMode) {
        let value = self.regs.ac & self.regs.x;
        self.store(mode, value);
    }

    /// LAS - `M & SP` into A, X and SP. Flags: N, Z.
    fn las(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        let result = value & self.regs.sp;
        self.regs.ac = result;
        self.regs.x = result;
        self.regs.sp = result;
        self.set_zn(result);
    }

    /// ANC - AND immediate, with C mirroring the sign bit. Flags: C, N, Z.
    fn anc(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.ac &= value;
        let a = self.regs.ac;
        self.set_zn(a);
        self.regs.set_flag(Status::C, a & 0x80 != 0);
    }

    /// ALR - AND immediate, then LSR A. Flags: C, N, Z.
    fn alr(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        let anded = self.regs.ac & value;
        self.regs.set_flag(Status::C, anded & 0x01 != 0);
        self.regs.ac = anded >> 1;
        let a = self.regs.ac;
        self.set_zn(a);
    }

    /// ARR - AND immediate, then ROR A; C comes from bit 6 of the result
    /// and V from bits 6 and 5 (the ALU's decimal-adjust path leaks here).
    fn arr(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        let carry_in = u8::from(self.regs.get_flag(Status::C));
        let anded = self.regs.ac & value;
        let result = (anded >> 1) | (carry_in << 7);
        self.regs.ac = result;
        self.set_zn(result);
        self.regs.set_flag(Status::C, result & 0x40 != 0);
        self.regs
            .set_flag(Status::V, ((result >> 6) ^ (result >> 5)) & 0x01 != 0);
    }

    /// ANE - `(A | MAGIC) & X & M` into A. Unstable on silicon. Flags: N, Z.
    fn ane(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        self.regs.ac = (self.regs.ac | ANE_MAGIC) & self.regs.x & value;
        let a = self.regs.ac;
        self.set_zn(a);
    }

    /// LXA - `(A | MAGIC) & M` into A and X. Unstable on silicon.
    /// Flags: N, Z.
    fn lxa(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        let result = (self.regs.ac | ANE_MAGIC) & value;
        self.regs.ac = result;
        self.regs.x = result;
        self.set_zn(result);
    }

    /// SBX - `X = (A & X) - M`, compare-style carry. Flags: C, Z, N.
    fn sbx(&mut self, mode: AddrMode) {
        let value = self.fetch_operand(mode);
        let base = self.regs.ac & self.regs.x;
        self.regs.set_flag(Status::C, base >= value);
        self.regs.x = base.wrapping_sub(value);
        let x = self.regs.x;
        self.set_zn(x);
    }

    /// SHA - Store `A & X & (H + 1)`, H being the high byte of the target.
    fn sha(&mut self, mode: AddrMode) {
        let hi_plus_1 = ((self.addr_abs >> 8) as u8).wrapping_add(1);
        let value = self.regs.ac & self.regs.x & hi_plus_1;
        self.store(mode, value);
    }

    /// SHX - Store `X & (H + 1)`.
    fn shx(&mut self, mode: AddrMode) {
        let hi_plus_1 = ((self.addr_abs >> 8) as u8).wrapping_add(1);
        let value = self.regs.x & hi_plus_1;
        self.store(mode, value);
    }

    /// SHY - Store `Y & (H + 1)`.
    fn shy(&mut self, mode: AddrMode) {
        let hi_plus_1 = ((self.addr_abs >> 8) as u8).wrapping_add(1);
        let value = self.regs.y & hi_plus_1;
        self.store(mode, value);
    }

    /// TAS - `SP = A & X`, then store `SP & (H + 1)`. No flags.
    fn tas(&mut self, mode: AddrMode) {
        self.regs.sp = self.regs.ac & self.regs.x;
        let hi_plus_1 = ((self.addr_abs >> 8) as u8).wrapping_add(1);
        let value = self.regs.sp & hi_plus_1;
        self.store(mode, value);
    }

    /// DOP/TOP - Multi-byte NOPs; the operand was fetched by the mode and
    /// discarded here.
    fn nop_read(&mut self) {
        self.tick();
    }

    /// JAM - Trap the CPU until reset.
    fn jam_op(&mut self) {
        self.tick();
        self.jam();
    }

    /// Catch-all for unassigned slots: a two-cycle NOP, logged.
    fn xxx(&mut self) {
        warn!("invalid opcode ${:02X}, treating as NOP", self.opcode);
        self.tick();
    }

    // =========================================================================
    // 65C02 ADDITIONS
    // =========================================================================

    /// WAI - Hold on this instruction until an interrupt is latched.
    fn wai(&mut self) {
        if !self.pending_nmi && !self.pending_irq {
            self.regs.pc = self.regs.pc.wrapping_sub(1);
        }
        self.tick();
        self.tick();
    }

    /// STP - Stop the clock; only reset recovers.
    fn stp(&mut self) {
        self.tick();
        self.jam();
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::RamBus;
    use crate::cpu::Cpu;
    use crate::status::Status;

    fn run(program: &[u8], steps: usize) -> Cpu<RamBus> {
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, program, Some(0x8000)).unwrap();
        for _ in 0..steps {
            cpu.step();
        }
        cpu
    }

    #[test]
    fn test_lda_flags() {
        let cpu = run(&[0xA9, 0x00], 1);
        assert_eq!(cpu.a(), 0x00);
        assert!(cpu.status().contains(Status::Z));
        assert!(!cpu.status().contains(Status::N));

        let cpu = run(&[0xA9, 0x80], 1);
        assert_eq!(cpu.a(), 0x80);
        assert!(!cpu.status().contains(Status::Z));
        assert!(cpu.status().contains(Status::N));
    }

    #[test]
    fn test_sta_zero_page() {
        // LDA #$42, STA $10
        let mut cpu = run(&[0xA9, 0x42, 0x85, 0x10], 2);
        assert_eq!(cpu.peek(0x0010), 0x42);
    }

    #[test]
    fn test_adc_carry_chain() {
        // LDA #$FF, CLC, ADC #$02
        let cpu = run(&[0xA9, 0xFF, 0x18, 0x69, 0x02], 3);
        assert_eq!(cpu.a(), 0x01);
        assert!(cpu.status().contains(Status::C));
        assert!(!cpu.status().contains(Status::Z));
    }

    #[test]
    fn test_sbc_borrow() {
        // SEC, LDA #$10, SBC #$08
        let cpu = run(&[0x38, 0xA9, 0x10, 0xE9, 0x08], 3);
        assert_eq!(cpu.a(), 0x08);
        assert!(cpu.status().contains(Status::C));
    }

    #[test]
    fn test_asl_accumulator_and_memory() {
        // LDA #$81, ASL A
        let cpu = run(&[0xA9, 0x81, 0x0A], 2);
        assert_eq!(cpu.a(), 0x02);
        assert!(cpu.status().contains(Status::C));

        // ASL $10 with $10 = $40
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0x06, 0x10], Some(0x8000)).unwrap();
        cpu.poke(0x0010, 0x40);
        cpu.step();
        assert_eq!(cpu.peek(0x0010), 0x80);
        assert!(cpu.status().contains(Status::N));
    }

    #[test]
    fn test_ror_uses_carry() {
        // SEC, LDA #$02, ROR A
        let cpu = run(&[0x38, 0xA9, 0x02, 0x6A], 3);
        assert_eq!(cpu.a(), 0x81);
        assert!(!cpu.status().contains(Status::C));
    }

    #[test]
    fn test_bit_copies_high_bits() {
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xA9, 0x01, 0x24, 0x10], Some(0x8000))
            .unwrap();
        cpu.poke(0x0010, 0xC0);
        cpu.step();
        cpu.step();
        assert!(cpu.status().contains(Status::N));
        assert!(cpu.status().contains(Status::V));
        assert!(cpu.status().contains(Status::Z));
    }

    #[test]
    fn test_compare_flags() {
        // LDA #$20, CMP #$20
        let cpu = run(&[0xA9, 0x20, 0xC9, 0x20], 2);
        assert!(cpu.status().contains(Status::C));
        assert!(cpu.status().contains(Status::Z));

        // LDA #$10, CMP #$20
        let cpu = run(&[0xA9, 0x10, 0xC9, 0x20], 2);
        assert!(!cpu.status().contains(Status::C));
        assert!(!cpu.status().contains(Status::Z));
        assert!(cpu.status().contains(Status::N));
    }

    #[test]
    fn test_inc_dec_memory() {
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xE6, 0x10, 0xC6, 0x10, 0xC6, 0x10], Some(0x8000))
            .unwrap();
        cpu.step();
        assert_eq!(cpu.peek(0x0010), 1);
        cpu.step();
        assert_eq!(cpu.peek(0x0010), 0);
        assert!(cpu.status().contains(Status::Z));
        cpu.step();
        assert_eq!(cpu.peek(0x0010), 0xFF);
        assert!(cpu.status().contains(Status::N));
    }

    #[test]
    fn test_transfers() {
        // LDA #$7F, TAX, TXS, TYA
        let cpu = run(&[0xA9, 0x7F, 0xAA, 0x9A], 3);
        assert_eq!(cpu.x(), 0x7F);
        assert_eq!(cpu.sp(), 0x7F);
    }

    #[test]
    fn test_jsr_rts_round_trip() {
        // JSR $8010 ... RTS at $8010
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0x20, 0x10, 0x80], Some(0x8000))
            .unwrap();
        cpu.poke(0x8010, 0x60);

        let sp = cpu.sp();
        cpu.step();
        assert_eq!(cpu.pc(), 0x8010);
        assert_eq!(cpu.sp(), sp.wrapping_sub(2));

        cpu.step();
        assert_eq!(cpu.pc(), 0x8003);
        assert_eq!(cpu.sp(), sp);
    }

    #[test]
    fn test_branch_cycles() {
        // BNE +2 with Z clear, same page: 3 cycles
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xD0, 0x02], Some(0x8000)).unwrap();
        assert_eq!(cpu.step(), 3);
        assert_eq!(cpu.pc(), 0x8004);

        // Not taken: 2 cycles
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xF0, 0x02], Some(0x8000)).unwrap();
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.pc(), 0x8002);

        // Taken across a page: 4 cycles
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x80F0, &[0xD0, 0x20], Some(0x80F0)).unwrap();
        assert_eq!(cpu.step(), 4);
        assert_eq!(cpu.pc(), 0x8112);
    }

    #[test]
    fn test_backward_branch() {
        // BNE -3 (0xFD)
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8005, &[0xD0, 0xFD], Some(0x8005)).unwrap();
        cpu.step();
        assert_eq!(cpu.pc(), 0x8004);
    }

    #[test]
    fn test_php_plp_normalizes_b_and_u() {
        // SEC, PHP, CLC, PLP
        let cpu = run(&[0x38, 0x08, 0x18, 0x28], 4);
        assert!(cpu.status().contains(Status::C));
        assert!(cpu.status().contains(Status::U));
        assert!(!cpu.status().contains(Status::B));
    }

    #[test]
    fn test_page_cross_cycles_lda_abx() {
        // LDX #$01, LDA $80FF,X: crossing costs 5
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xA2, 0x01, 0xBD, 0xFF, 0x80], Some(0x8000))
            .unwrap();
        cpu.step();
        assert_eq!(cpu.step(), 5);
        assert_eq!(cpu.extra_cycles(), 1);

        // LDA $8000,X without crossing costs 4
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xA2, 0x01, 0xBD, 0x00, 0x80], Some(0x8000))
            .unwrap();
        cpu.step();
        assert_eq!(cpu.step(), 4);
    }

    #[test]
    fn test_sta_abx_always_pays_the_fix_cycle() {
        // LDX #$01, STA $8000,X: no crossing, still 5
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xA2, 0x01, 0x9D, 0x00, 0x20], Some(0x8000))
            .unwrap();
        cpu.step();
        assert_eq!(cpu.step(), 5);
    }

    #[test]
    fn test_izx_wraps_zero_page() {
        // LDX #$05, LDA ($FE,X): pointer at $03/$04
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xA2, 0x05, 0xA1, 0xFE], Some(0x8000))
            .unwrap();
        cpu.poke(0x0003, 0x34);
        cpu.poke(0x0004, 0x12);
        cpu.poke(0x1234, 0x99);
        cpu.step();
        assert_eq!(cpu.step(), 6);
        assert_eq!(cpu.a(), 0x99);
    }

    #[test]
    fn test_izy_pointer_high_byte_wraps() {
        // LDY #$00, LDA ($FF),Y: pointer low at $FF, high at $00
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xA0, 0x00, 0xB1, 0xFF], Some(0x8000))
            .unwrap();
        cpu.poke(0x00FF, 0x21);
        cpu.poke(0x0000, 0x43);
        cpu.poke(0x4321, 0x55);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.a(), 0x55);
    }

    #[cfg(feature = "illegal")]
    mod illegal {
        use super::*;

        #[test]
        fn test_lax_loads_both() {
            let mut cpu = Cpu::new(RamBus::new());
            cpu.load_program(0x8000, &[0xA7, 0x10], Some(0x8000)).unwrap();
            cpu.poke(0x0010, 0xC3);
            cpu.step();
            assert_eq!(cpu.a(), 0xC3);
            assert_eq!(cpu.x(), 0xC3);
            assert!(cpu.status().contains(Status::N));
        }

        #[test]
        fn test_sax_stores_a_and_x() {
            // LDA #$F0, LDX #$3C, SAX $10
            let mut cpu = run(&[0xA9, 0xF0, 0xA2, 0x3C, 0x87, 0x10], 3);
            assert_eq!(cpu.peek(0x0010), 0x30);
        }

        #[test]
        fn test_dcp_compares_decremented_value() {
            // LDA #$41, DCP $10 with $10 = $42
            let mut cpu = Cpu::new(RamBus::new());
            cpu.load_program(0x8000, &[0xA9, 0x41, 0xC7, 0x10], Some(0x8000))
                .unwrap();
            cpu.poke(0x0010, 0x42);
            cpu.step();
            cpu.step();
            assert_eq!(cpu.peek(0x0010), 0x41);
            assert!(cpu.status().contains(Status::Z));
            assert!(cpu.status().contains(Status::C));
        }

        #[test]
        fn test_isc_increments_then_subtracts() {
            // SEC, LDA #$10, ISC $10 with $10 = $04
            let mut cpu = Cpu::new(RamBus::new());
            cpu.load_program(0x8000, &[0x38, 0xA9, 0x10, 0xE7, 0x10], Some(0x8000))
                .unwrap();
            cpu.poke(0x0010, 0x04);
            for _ in 0..3 {
                cpu.step();
            }
            assert_eq!(cpu.peek(0x0010), 0x05);
            assert_eq!(cpu.a(), 0x0B);
        }

        #[test]
        fn test_slo_shifts_and_ors() {
            // LDA #$01, SLO $10 with $10 = $80
            let mut cpu = Cpu::new(RamBus::new());
            cpu.load_program(0x8000, &[0xA9, 0x01, 0x07, 0x10], Some(0x8000))
                .unwrap();
            cpu.poke(0x0010, 0x80);
            cpu.step();
            cpu.step();
            assert_eq!(cpu.peek(0x0010), 0x00);
            assert_eq!(cpu.a(), 0x01);
            assert!(cpu.status().contains(Status::C));
        }

        #[test]
        fn test_sbx() {
            // LDA #$F0, LDX #$0F, SBX #$05: X = (F0 & 0F) - 5 = FB, borrow
            let cpu = run(&[0xA9, 0xF0, 0xA2, 0x0F, 0xCB, 0x05], 3);
            assert_eq!(cpu.x(), 0xFB);
            assert!(!cpu.status().contains(Status::C));
        }

        #[test]
        fn test_anc_sets_carry_from_sign() {
            let cpu = run(&[0xA9, 0xFF, 0x0B, 0x80], 2);
            assert_eq!(cpu.a(), 0x80);
            assert!(cpu.status().contains(Status::C));
            assert!(cpu.status().contains(Status::N));
        }

        #[test]
        fn test_alr() {
            // LDA #$FF, ALR #$03: (FF & 03) >> 1 = 1, C from bit 0
            let cpu = run(&[0xA9, 0xFF, 0x4B, 0x03], 2);
            assert_eq!(cpu.a(), 0x01);
            assert!(cpu.status().contains(Status::C));
        }

        #[test]
        fn test_shx_high_byte_mask() {
            // LDX #$FF, LDY #$00, SHX $1000,Y stores X & $11
            let mut cpu = run(&[0xA2, 0xFF, 0xA0, 0x00, 0x9E, 0x00, 0x10], 3);
            assert_eq!(cpu.peek(0x1000), 0xFF & 0x11);
        }

        #[test]
        fn test_jam_halts_until_reset() {
            let mut cpu = run(&[0x02, 0xEA], 1);
            assert!(cpu.jammed());
            let before = cpu.total_cycles();
            assert_eq!(cpu.step(), 0);
            assert_eq!(cpu.total_cycles(), before);
        }

        #[test]
        fn test_las() {
            // Preload SP via TXS: LDX #$0F, TXS, LDY #$00, LAS $0010,Y
            let mut cpu = Cpu::new(RamBus::new());
            cpu.load_program(
                0x8000,
                &[0xA2, 0x0F, 0x9A, 0xA0, 0x00, 0xBB, 0x10, 0x00],
                Some(0x8000),
            )
            .unwrap();
            cpu.poke(0x0010, 0x33);
            for _ in 0..4 {
                cpu.step();
            }
            assert_eq!(cpu.a(), 0x03);
            assert_eq!(cpu.x(), 0x03);
            assert_eq!(cpu.sp(), 0x03);
        }
    }

    #[cfg(feature = "decimal-mode")]
    mod decimal {
        use super::*;

        #[test]
        fn test_adc_bcd() {
            // SED, SEC, LDA #$58, ADC #$46 -> $05 with carry (58+46+1=105)
            let cpu = run(&[0xF8, 0x38, 0xA9, 0x58, 0x69, 0x46], 4);
            assert_eq!(cpu.a(), 0x05);
            assert!(cpu.status().contains(Status::C));
        }

        #[test]
        fn test_sbc_bcd() {
            // SED, SEC, LDA #$46, SBC #$12 -> $34
            let cpu = run(&[0xF8, 0x38, 0xA9, 0x46, 0xE9, 0x12], 4);
            assert_eq!(cpu.a(), 0x34);
            assert!(cpu.status().contains(Status::C));
        }
    }

    #[cfg(not(feature = "decimal-mode"))]
    #[test]
    fn test_d_flag_ignored_without_decimal_mode() {
        // SED, SEC, LDA #$58, ADC #$46: plain binary add
        let cpu = run(&[0xF8, 0x38, 0xA9, 0x58, 0x69, 0x46], 4);
        assert_eq!(cpu.a(), 0x9F);
        assert!(!cpu.status().contains(Status::C));
    }
}
