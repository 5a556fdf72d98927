//! CPU register file.
//!
//! Six registers is all the 6502 has: the accumulator, two index registers,
//! the stack pointer, the program counter and the status register. Everything
//! except PC is 8 bits wide, so the enum-driven accessors deal in bytes and
//! reject PC; the program counter has its own 16-bit endpoints.

use crate::status::Status;
use crate::{CpuError, Result};
use std::fmt;

/// Register selector for the byte-wide accessor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Program counter (16-bit; rejected by the byte-wide accessors).
    Pc,
    /// Accumulator.
    Ac,
    /// X index register.
    X,
    /// Y index register.
    Y,
    /// Status register.
    Sr,
    /// Stack pointer (indexes into `$0100-$01FF`).
    Sp,
}

/// The CPU core registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
    /// Accumulator.
    pub ac: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer.
    pub sp: u8,
    /// Program counter.
    pub pc: u16,
    /// Status register.
    pub sr: Status,
}

impl RegisterFile {
    /// Creates a register file in the post-reset state.
    #[must_use]
    pub fn new() -> Self {
        let mut regs = Self {
            ac: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            sr: Status::empty(),
        };
        regs.reset();
        regs
    }

    /// Resets all registers.
    ///
    /// A reset pulls three bytes through the stack pointer, so SP lands on
    /// `$FD`. The status register keeps U and B high; the CPU reset sequence
    /// adds I on top of this.
    pub fn reset(&mut self) {
        self.ac = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.pc = 0;
        self.sr = Status::POWER_ON;
    }

    /// Reads a byte-wide register.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::InvalidRegister`] for [`Register::Pc`]; the
    /// program counter does not fit in the 8-bit interface.
    pub fn get(&self, reg: Register) -> Result<u8> {
        match reg {
            Register::Ac => Ok(self.ac),
            Register::X => Ok(self.x),
            Register::Y => Ok(self.y),
            Register::Sr => Ok(self.sr.bits()),
            Register::Sp => Ok(self.sp),
            Register::Pc => Err(CpuError::InvalidRegister(Register::Pc)),
        }
    }

    /// Writes a byte-wide register.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::InvalidRegister`] for [`Register::Pc`].
    pub fn set(&mut self, reg: Register, value: u8) -> Result<()> {
        match reg {
            Register::Ac => self.ac = value,
            Register::X => self.x = value,
            Register::Y => self.y = value,
            Register::Sr => self.sr = Status::from_bits_truncate(value),
            Register::Sp => self.sp = value,
            Register::Pc => return Err(CpuError::InvalidRegister(Register::Pc)),
        }
        Ok(())
    }

    /// Returns the value of a single status flag.
    #[must_use]
    pub fn get_flag(&self, flag: Status) -> bool {
        self.sr.contains(flag)
    }

    /// Sets or clears a single status flag.
    pub fn set_flag(&mut self, flag: Status, value: bool) {
        self.sr.set(flag, value);
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} {} STKP:{:02X}",
            self.pc, self.ac, self.x, self.y, self.sr, self.sp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let regs = RegisterFile::new();
        assert_eq!(regs.ac, 0);
        assert_eq!(regs.x, 0);
        assert_eq!(regs.y, 0);
        assert_eq!(regs.sp, 0xFD);
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.sr, Status::U | Status::B);
    }

    #[test]
    fn test_get_set_byte_registers() {
        let mut regs = RegisterFile::new();
        for reg in [Register::Ac, Register::X, Register::Y, Register::Sp] {
            regs.set(reg, 0x5A).unwrap();
            assert_eq!(regs.get(reg).unwrap(), 0x5A);
        }
        regs.set(Register::Sr, 0xFF).unwrap();
        assert_eq!(regs.get(Register::Sr).unwrap(), 0xFF);
    }

    #[test]
    fn test_pc_rejected_by_byte_api() {
        let mut regs = RegisterFile::new();
        assert_eq!(
            regs.get(Register::Pc),
            Err(CpuError::InvalidRegister(Register::Pc))
        );
        assert_eq!(
            regs.set(Register::Pc, 0x12),
            Err(CpuError::InvalidRegister(Register::Pc))
        );
    }

    #[test]
    fn test_flag_accessors() {
        let mut regs = RegisterFile::new();
        assert!(!regs.get_flag(Status::C));
        regs.set_flag(Status::C, true);
        assert!(regs.get_flag(Status::C));
        regs.set_flag(Status::C, false);
        assert!(!regs.get_flag(Status::C));
    }

    #[test]
    fn test_display() {
        let regs = RegisterFile::new();
        assert_eq!(regs.to_string(), "PC:0000 A:00 X:00 Y:00 ..UB.... STKP:FD");
    }
}
