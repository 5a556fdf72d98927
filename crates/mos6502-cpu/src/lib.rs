//! Cycle-stepped MOS 6502 CPU emulator.
//!
//! This crate emulates the observable behavior of the NMOS 6502: registers
//! and status flags, all thirteen addressing modes, the full official
//! instruction set plus the undocumented opcodes, memory-timed bus
//! transactions, the reset/IRQ/NMI sequences and the classic hardware
//! quirks (JMP-indirect page wrap, branch page-cross penalties,
//! decimal-mode arithmetic behind a feature flag).
//!
//! # Architecture
//!
//! The CPU talks to the outside world through the [`Bus`] trait and is
//! generic over it, so any memory layout plugs in with static dispatch.
//! [`RamBus`] ships as the simplest implementation: a flat 64 KiB RAM.
//!
//! Timing is derived from memory traffic: every access on the timed path
//! costs one cycle, internal operations insert explicit dead cycles, and
//! the per-instruction totals land on the published tables.
//!
//! # Example
//!
//! ```
//! use mos6502_cpu::{Cpu, RamBus};
//!
//! let mut cpu = Cpu::new(RamBus::new());
//! // LDA #$2A, STA $02
//! cpu.load_program(0x8000, &[0xA9, 0x2A, 0x85, 0x02], Some(0x8000))
//!     .unwrap();
//! cpu.step();
//! cpu.step();
//! assert_eq!(cpu.peek(0x0002), 0x2A);
//! ```
//!
//! # Build features
//!
//! - `illegal` (default): execute the undocumented NMOS opcodes
//! - `emulate-65c02`: CMOS timing/behavior changes, `WAI`/`STP`
//! - `decimal-mode`: honor the D flag in ADC/SBC

mod addressing;
mod bus;
mod cpu;
mod disasm;
mod instructions;
mod opcodes;
mod registers;
mod state;
mod status;
mod trace;

pub use addressing::AddrMode;
pub use bus::{Bus, RamBus};
pub use cpu::Cpu;
pub use disasm::Disassembly;
pub use opcodes::{decode, decode_strict, Mnemonic, OpcodeInfo, OPCODE_TABLE};
pub use registers::{Register, RegisterFile};
pub use state::CpuState;
pub use status::Status;
pub use trace::{TraceEntry, Tracer};

/// CPU error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpuError {
    /// Opcode byte with no assignment in the active decode table.
    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    /// The program counter was addressed through the 8-bit register API.
    #[error("register {0:?} is not accessible through the 8-bit interface")]
    InvalidRegister(Register),

    /// An address range that does not fit the 16-bit address space, or runs
    /// backwards.
    #[error("address range out of bounds: 0x{start:04X}..=0x{end:04X}")]
    OutOfRange {
        /// First address of the offending range.
        start: u32,
        /// Last address of the offending range.
        end: u32,
    },
}

/// Result type for CPU operations.
pub type Result<T> = std::result::Result<T, CpuError>;

/// Interrupt vector addresses.
pub mod vectors {
    /// NMI (non-maskable interrupt) vector address.
    pub const NMI: u16 = 0xFFFA;
    /// Reset vector address.
    pub const RESET: u16 = 0xFFFC;
    /// IRQ/BRK vector address.
    pub const IRQ: u16 = 0xFFFE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_through_public_api() {
        let mut cpu = Cpu::new(RamBus::new());
        cpu.poke(vectors::RESET, 0x00);
        cpu.poke(vectors::RESET + 1, 0x80);
        cpu.reset();

        assert_eq!(cpu.get_pc(), 0x8000);
        assert_eq!(cpu.get_register(Register::Sp).unwrap(), 0xFD);
        assert!(cpu.get_flag(Status::I));
        assert!(cpu.get_flag(Status::U));
    }

    #[test]
    fn test_lda_immediate_cycles() {
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xA9, 0x42], Some(0x8000)).unwrap();

        let before = cpu.total_cycles();
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.total_cycles() - before, 2);
        assert_eq!(cpu.get_register(Register::Ac).unwrap(), 0x42);
        assert_eq!(cpu.get_pc(), 0x8002);
    }

    #[test]
    fn test_custom_bus_implementation() {
        // An I/O overlay: reads from $D000 count accesses.
        struct CountingBus {
            ram: Vec<u8>,
            reads_at_d000: u32,
        }

        impl Bus for CountingBus {
            fn read(&mut self, addr: u16, readonly: bool) -> u8 {
                if addr == 0xD000 && !readonly {
                    self.reads_at_d000 += 1;
                }
                self.ram[addr as usize]
            }

            fn write(&mut self, addr: u16, data: u8) {
                self.ram[addr as usize] = data;
            }
        }

        let mut bus = CountingBus {
            ram: vec![0; 0x10000],
            reads_at_d000: 0,
        };
        // LDA $D000 at $8000, reset vector -> $8000
        bus.ram[0x8000] = 0xAD;
        bus.ram[0x8001] = 0x00;
        bus.ram[0x8002] = 0xD0;
        bus.ram[0xFFFC] = 0x00;
        bus.ram[0xFFFD] = 0x80;

        let mut cpu = Cpu::new(bus);
        cpu.reset();
        cpu.step();
        assert_eq!(cpu.bus().reads_at_d000, 1);

        // The disassembler must not touch the device.
        cpu.disassemble(0x8000, 0x8002).unwrap();
        assert_eq!(cpu.bus().reads_at_d000, 1);
    }

    #[test]
    fn test_brk_sets_complete() {
        let mut cpu = Cpu::new(RamBus::new());
        cpu.load_program(0x8000, &[0xEA, 0x00], Some(0x8000)).unwrap();
        assert!(!cpu.complete());
        cpu.step();
        assert!(!cpu.complete());
        cpu.step();
        assert!(cpu.complete());
    }
}
