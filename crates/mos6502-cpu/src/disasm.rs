//! Disassembler.
//!
//! A convenience layer, not part of execution: it turns instruction bytes
//! into human-readable rows, reading memory exclusively through the
//! side-effect-free path so devices on the bus stay untouched.

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcodes::decode_strict;
use crate::{CpuError, Result};
use std::collections::BTreeMap;

/// One disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    /// Address of the opcode byte.
    pub addr: u16,
    /// The opcode byte.
    pub opcode: u8,
    /// First operand byte, when present.
    pub lo: u8,
    /// Second operand byte, when present.
    pub hi: u8,
    /// Instruction mnemonic.
    pub mnemonic: &'static str,
    /// Addressing mode, as its three-letter tag.
    pub mode: &'static str,
    /// The rendered row, `"$ADDR: MNEMONIC OPERAND {MODE}"`. Empty when the
    /// byte does not decode in the active build.
    pub text: String,
}

impl<B: Bus> Cpu<B> {
    /// Disassembles the instruction at `addr`, returning the row and the
    /// address of the following instruction.
    ///
    /// A byte with no assignment in the active decode table yields an empty
    /// row and advances by one byte.
    pub fn disassemble_at(&mut self, addr: u16) -> (Disassembly, u16) {
        let opcode = self.peek(addr);

        let Ok(info) = decode_strict(opcode) else {
            return (
                Disassembly {
                    addr,
                    opcode,
                    lo: 0,
                    hi: 0,
                    mnemonic: "",
                    mode: "",
                    text: String::new(),
                },
                addr.wrapping_add(1),
            );
        };

        let name = info.mnemonic.name();
        let mode = info.mode;
        let mut lo = 0u8;
        let mut hi = 0u8;
        let mut next = addr.wrapping_add(1);

        if mode.operand_size() >= 1 {
            lo = self.peek(next);
            next = next.wrapping_add(1);
        }
        if mode.operand_size() >= 2 {
            hi = self.peek(next);
            next = next.wrapping_add(1);
        }

        let word = u16::from_le_bytes([lo, hi]);
        let operand = match mode {
            AddrMode::Imp => String::new(),
            AddrMode::Acc => "AC ".to_string(),
            AddrMode::Imm => format!("#${lo:02X} "),
            AddrMode::Zp0 => format!("${lo:02X} "),
            AddrMode::Zpx => format!("${lo:02X}, X "),
            AddrMode::Zpy => format!("${lo:02X}, Y "),
            AddrMode::Izx => format!("(${lo:02X}, X) "),
            AddrMode::Izy => format!("(${lo:02X}), Y "),
            AddrMode::Abs => format!("${word:04X} "),
            AddrMode::Abx => format!("${word:04X}, X "),
            AddrMode::Aby => format!("${word:04X}, Y "),
            AddrMode::Ind => format!("(${word:04X}) "),
            AddrMode::Rel => {
                let target = next.wrapping_add(lo as i8 as u16);
                format!("${lo:02X} [${target:04X}] ")
            }
        };

        let row = Disassembly {
            addr,
            opcode,
            lo,
            hi,
            mnemonic: name,
            mode: mode.name(),
            text: format!("${addr:04X}: {name} {operand}{{{}}}", mode.name()),
        };
        (row, next)
    }

    /// Disassembles `start..=end`, keyed by each instruction's start
    /// address. Rows overlap only at instruction boundaries; the final
    /// instruction may extend past `end`.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::OutOfRange`] when `start > end`.
    pub fn disassemble(&mut self, start: u16, end: u16) -> Result<BTreeMap<u16, Disassembly>> {
        if start > end {
            return Err(CpuError::OutOfRange {
                start: u32::from(start),
                end: u32::from(end),
            });
        }

        let mut rows = BTreeMap::new();
        let mut addr = u32::from(start);
        while addr <= u32::from(end) {
            let (row, next) = self.disassemble_at(addr as u16);
            // Wrapped past $FFFF; the range is done.
            let advanced = u32::from(next) > addr;
            rows.insert(addr as u16, row);
            if !advanced {
                break;
            }
            addr = u32::from(next);
        }
        Ok(rows)
    }
}
