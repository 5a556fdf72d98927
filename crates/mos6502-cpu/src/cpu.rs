//! 6502 CPU core.
//!
//! The [`Cpu`] owns its registers, the per-instruction step state and the
//! bus it talks to. A call to [`Cpu::step`] runs exactly one instruction
//! (and any interrupt sequence due at the boundary) to completion.
//!
//! Timing follows the memory traffic: every access on the timed path
//! (`read_tick`/`write_tick`) costs one cycle, and instructions doing
//! internal computation insert one-cycle no-memory ticks so the totals match
//! the published tables. The untimed path ([`peek`]/[`poke`]) is for
//! loaders, debuggers and the disassembler.
//!
//! [`peek`]: Cpu::peek
//! [`poke`]: Cpu::poke

use crate::addressing::AddrMode;
use crate::bus::Bus;
use crate::opcodes::decode;
use crate::registers::{Register, RegisterFile};
use crate::state::CpuState;
use crate::status::Status;
use crate::{vectors, Result};
use log::info;
use std::time::Duration;

/// Host-loop pacing hint: milliseconds of sleep per step, indexed by the
/// configured CPU speed (0 = slowest, 10 = fastest).
const SLEEP_TABLE: [u64; 11] = [550, 550, 440, 330, 220, 160, 80, 40, 20, 10, 5];

/// The MOS 6502 emulation class. This is it!
///
/// Generic over its [`Bus`], so the hot path dispatches statically; any
/// device layout from a flat RAM to a full system bus plugs in unchanged.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)] // Bools are edge latches and pins
pub struct Cpu<B: Bus> {
    pub(crate) bus: B,
    pub(crate) regs: RegisterFile,

    // Per-step state, reset at every instruction boundary.
    /// The instruction byte being executed.
    pub(crate) opcode: u8,
    /// Working input value to the ALU when the mode reads one.
    pub(crate) fetched: u8,
    /// Effective address produced by the addressing mode.
    pub(crate) addr_abs: u16,
    /// Sign-extended branch displacement.
    pub(crate) addr_rel: u16,
    /// Whether indexing crossed a page boundary this instruction.
    pub(crate) page_crossed: bool,
    /// Cycles consumed by the current instruction.
    pub(crate) cycle_count: u8,
    /// Penalty cycles (page crosses, taken branches) within `cycle_count`.
    pub(crate) extra_cycles: u8,

    // Cumulative state.
    /// Total cycles since reset.
    pub(crate) operation_cycle: u64,
    pub(crate) pending_nmi: bool,
    pub(crate) pending_irq: bool,
    /// Two-stage interrupt latch: a request observed before the final cycle
    /// of an instruction is serviced after that instruction completes.
    pub(crate) interrupt_armed_prev: bool,
    pub(crate) interrupt_armed_now: bool,
    pub(crate) jammed: bool,
    pub(crate) state: CpuState,

    cpu_speed: u8,
}

impl<B: Bus> Cpu<B> {
    /// Creates a CPU connected to `bus`.
    ///
    /// Registers hold their post-reset values but no reset sequence has run;
    /// call [`reset`](Self::reset) (or [`load_program`](Self::load_program))
    /// before stepping so PC comes from the reset vector.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            regs: RegisterFile::new(),
            opcode: 0,
            fetched: 0,
            addr_abs: 0,
            addr_rel: 0,
            page_crossed: false,
            cycle_count: 0,
            extra_cycles: 0,
            operation_cycle: 0,
            pending_nmi: false,
            pending_irq: false,
            interrupt_armed_prev: false,
            interrupt_armed_now: false,
            jammed: false,
            state: CpuState::Running,
            cpu_speed: 0,
        }
    }

    // =========================================================================
    // EXTERNAL EVENTS
    // =========================================================================

    /// Resets the CPU into a known state.
    ///
    /// Registers clear to their power-on values, interrupts are disabled,
    /// PC loads from the reset vector at `$FFFC/$FFFD`, the cycle counters
    /// clear and a jammed CPU comes back to life. Nothing is pushed; the
    /// stack writes a real part would attempt are suppressed during reset.
    pub fn reset(&mut self) {
        self.jammed = false;
        self.regs.reset();
        self.regs.sr.insert(Status::I);

        let pc = self.bus.read_u16(vectors::RESET, false);
        self.regs.pc = pc;

        self.opcode = 0;
        self.fetched = 0;
        self.addr_abs = 0;
        self.addr_rel = 0;
        self.page_crossed = false;
        self.cycle_count = 0;
        self.extra_cycles = 0;
        self.operation_cycle = 0;
        self.pending_nmi = false;
        self.pending_irq = false;
        self.interrupt_armed_prev = false;
        self.interrupt_armed_now = false;
        self.state = CpuState::Running;
    }

    /// Services an interrupt request immediately.
    ///
    /// Ignored while the I flag is set. The current PC and status are pushed
    /// and PC loads from `$FFFE/$FFFF`. Hosts normally prefer
    /// [`request_irq`](Self::request_irq), which lets the running
    /// instruction finish first.
    pub fn irq(&mut self) {
        if self.regs.get_flag(Status::I) {
            return;
        }
        self.state = CpuState::InInterrupt;
        self.tick();
        self.break_op(false, vectors::IRQ);
        self.state = CpuState::Running;
    }

    /// Services a non-maskable interrupt immediately.
    ///
    /// Same sequence as [`irq`](Self::irq) but never ignored, and PC loads
    /// from `$FFFA/$FFFB`.
    pub fn nmi(&mut self) {
        self.state = CpuState::InInterrupt;
        self.tick();
        self.break_op(false, vectors::NMI);
        self.state = CpuState::Running;
    }

    /// Latches an NMI request, serviced at the next instruction boundary.
    pub fn request_nmi(&mut self) {
        self.pending_nmi = true;
    }

    /// Latches an IRQ request, serviced at the next instruction boundary
    /// unless the I flag is set.
    pub fn request_irq(&mut self) {
        self.pending_irq = true;
    }

    /// Executes one instruction and returns the cycles it consumed.
    ///
    /// A pending NMI/IRQ that was latched before the final cycle of the
    /// previous instruction is serviced after the instruction completes,
    /// with its cycles included in the returned count. While jammed this
    /// returns immediately.
    pub fn step(&mut self) -> u8 {
        if self.jammed {
            return 0;
        }

        self.cycle_count = 0;
        self.extra_cycles = 0;

        self.opcode = self.read_tick(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);

        // The unused bit is hard-wired high.
        self.regs.set_flag(Status::U, true);

        let info = decode(self.opcode);
        self.resolve_mode(info.mode, info.mnemonic);
        self.execute(info.mnemonic, info.mode);

        self.regs.set_flag(Status::U, true);

        if self.interrupt_armed_prev {
            if self.pending_nmi {
                self.pending_nmi = false;
                self.nmi();
            } else if self.pending_irq {
                self.pending_irq = false;
                self.irq();
            }
        }

        self.operation_cycle += u64::from(self.cycle_count);
        self.cycle_count
    }

    /// True once the B flag is set: the "run until BRK" completion check
    /// used by simple harness loops. [`load_program`](Self::load_program)
    /// clears B so a freshly loaded program starts incomplete.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.regs.get_flag(Status::B)
    }

    // =========================================================================
    // PROGRAM LOADING
    // =========================================================================

    /// Loads a program image into memory and resets the CPU.
    ///
    /// The bus is reset first, then `program` is written starting at
    /// `offset` through the untimed path. When `initial_pc` is given the
    /// reset vector at `$FFFC/$FFFD` is pointed at it, so the reset lands
    /// on the program's first instruction.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::OutOfRange`](crate::CpuError::OutOfRange) when
    /// the image does not fit above `offset`.
    pub fn load_program(
        &mut self,
        offset: u16,
        program: &[u8],
        initial_pc: Option<u16>,
    ) -> Result<()> {
        let end = usize::from(offset) + program.len();
        if end > 0x10000 {
            return Err(crate::CpuError::OutOfRange {
                start: u32::from(offset),
                end: end as u32,
            });
        }

        info!("** Loading {} byte program at ${offset:04X}", program.len());

        self.bus.reset();
        for (i, &byte) in program.iter().enumerate() {
            self.poke(offset.wrapping_add(i as u16), byte);
        }

        if let Some(pc) = initial_pc {
            self.poke(vectors::RESET, (pc & 0xFF) as u8);
            self.poke(vectors::RESET.wrapping_add(1), (pc >> 8) as u8);
        }

        self.reset();
        // The harness runs until BRK raises B again.
        self.regs.set_flag(Status::B, false);
        Ok(())
    }

    // =========================================================================
    // TIMED AND UNTIMED BUS PATHS
    // =========================================================================

    /// Advances one cycle without touching memory.
    ///
    /// Also steps the two-stage interrupt latch, so a request raised during
    /// the final cycle of an instruction is not armed until the boundary
    /// after the next one.
    pub(crate) fn tick(&mut self) {
        self.cycle_count = self.cycle_count.wrapping_add(1);
        self.interrupt_armed_prev = self.interrupt_armed_now;
        self.interrupt_armed_now =
            self.pending_nmi || (self.pending_irq && !self.regs.get_flag(Status::I));
    }

    /// Charges one penalty cycle (page cross, taken branch).
    pub(crate) fn add_extra_cycle(&mut self) {
        self.extra_cycles = self.extra_cycles.wrapping_add(1);
        self.tick();
    }

    /// Reads a byte on the timed path: one cycle per access.
    pub(crate) fn read_tick(&mut self, addr: u16) -> u8 {
        self.tick();
        self.bus.read(addr, false)
    }

    /// Writes a byte on the timed path: one cycle per access.
    pub(crate) fn write_tick(&mut self, addr: u16, data: u8) {
        self.tick();
        self.bus.write(addr, data);
    }

    /// Reads a byte without consuming a cycle (debugger/loader path).
    pub fn peek(&mut self, addr: u16) -> u8 {
        self.bus.read(addr, true)
    }

    /// Writes a byte without consuming a cycle (debugger/loader path).
    pub fn poke(&mut self, addr: u16, data: u8) {
        self.bus.write(addr, data);
    }

    // =========================================================================
    // STACK
    // =========================================================================

    /// Pushes a byte; the stack lives at `$0100 + SP`, growing downward.
    pub(crate) fn push_tick(&mut self, value: u8) {
        self.write_tick(0x0100 | u16::from(self.regs.sp), value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    /// Pops a byte.
    pub(crate) fn pop_tick(&mut self) -> u8 {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.read_tick(0x0100 | u16::from(self.regs.sp))
    }

    /// Pushes a byte on the timed path, moving SP down one.
    pub fn push_stack(&mut self, value: u8) {
        self.push_tick(value);
    }

    /// Pops a byte on the timed path, moving SP up one.
    pub fn pop_stack(&mut self) -> u8 {
        self.pop_tick()
    }

    /// Reads the byte under the stack pointer without moving it or spending
    /// a cycle.
    #[must_use]
    pub fn peek_stack(&mut self) -> u8 {
        self.bus.read(0x0100 | u16::from(self.regs.sp), true)
    }

    /// Writes the byte under the stack pointer without moving it or
    /// spending a cycle.
    pub fn poke_stack(&mut self, value: u8) {
        self.bus.write(0x0100 | u16::from(self.regs.sp), value);
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Reads a byte-wide register. A jammed CPU reports `$FF` everywhere.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::InvalidRegister`](crate::CpuError::InvalidRegister)
    /// for [`Register::Pc`]; use [`get_pc`](Self::get_pc).
    pub fn get_register(&self, reg: Register) -> Result<u8> {
        let value = self.regs.get(reg)?;
        Ok(if self.jammed { 0xFF } else { value })
    }

    /// Writes a byte-wide register. Ignored while jammed.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::InvalidRegister`](crate::CpuError::InvalidRegister)
    /// for [`Register::Pc`]; use [`set_pc`](Self::set_pc).
    pub fn set_register(&mut self, reg: Register, value: u8) -> Result<()> {
        if self.jammed {
            // Still reject PC so misuse surfaces regardless of CPU state.
            return match reg {
                Register::Pc => Err(crate::CpuError::InvalidRegister(Register::Pc)),
                _ => Ok(()),
            };
        }
        self.regs.set(reg, value)
    }

    /// The program counter. A jammed CPU reports `$FFFF`.
    #[must_use]
    pub fn get_pc(&self) -> u16 {
        if self.jammed {
            0xFFFF
        } else {
            self.regs.pc
        }
    }

    /// Sets the program counter. Ignored while jammed.
    pub fn set_pc(&mut self, pc: u16) {
        if !self.jammed {
            self.regs.pc = pc;
        }
    }

    /// Reads one status flag.
    #[must_use]
    pub fn get_flag(&self, flag: Status) -> bool {
        if self.jammed {
            return true;
        }
        self.regs.get_flag(flag)
    }

    /// Sets or clears one status flag. Ignored while jammed.
    pub fn set_flag(&mut self, flag: Status, value: bool) {
        if !self.jammed {
            self.regs.set_flag(flag, value);
        }
    }

    /// Accumulator.
    #[must_use]
    pub fn a(&self) -> u8 {
        self.regs.ac
    }

    /// X index register.
    #[must_use]
    pub fn x(&self) -> u8 {
        self.regs.x
    }

    /// Y index register.
    #[must_use]
    pub fn y(&self) -> u8 {
        self.regs.y
    }

    /// Stack pointer.
    #[must_use]
    pub fn sp(&self) -> u8 {
        self.regs.sp
    }

    /// Program counter, unmasked.
    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    /// Status register.
    #[must_use]
    pub fn status(&self) -> Status {
        self.regs.sr
    }

    /// The opcode byte of the current (last fetched) instruction.
    #[must_use]
    pub fn op_code(&self) -> u8 {
        self.opcode
    }

    /// Cycles consumed by the current instruction.
    #[must_use]
    pub fn cycle_count(&self) -> u8 {
        self.cycle_count
    }

    /// Penalty cycles within the current instruction's count.
    #[must_use]
    pub fn extra_cycles(&self) -> u8 {
        self.extra_cycles
    }

    /// Total cycles since reset.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.operation_cycle
    }

    /// True after a JAM/KIL opcode; only [`reset`](Self::reset) recovers.
    #[must_use]
    pub fn jammed(&self) -> bool {
        self.jammed
    }

    /// Coarse execution state.
    #[must_use]
    pub fn state(&self) -> CpuState {
        self.state
    }

    /// Renders the status register as `NVUBDIZC` with dots for clear bits.
    #[must_use]
    pub fn flag_string(&self) -> String {
        self.regs.sr.to_string()
    }

    /// Hex dump of `start..=stop` through the untimed path.
    pub fn dump_ram(&mut self, start: u16, stop: u16) -> String {
        self.bus.dump_range(start, stop)
    }

    /// Replaces the connected bus, returning the previous one.
    ///
    /// The CPU state is left untouched; callers normally
    /// [`reset`](Self::reset) afterwards so PC comes from the new bus's
    /// reset vector.
    pub fn connect_bus(&mut self, bus: B) -> B {
        std::mem::replace(&mut self.bus, bus)
    }

    /// Shared access to the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Exclusive access to the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the CPU, returning the bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    // =========================================================================
    // PACING
    // =========================================================================

    /// Sets the host-loop speed hint (0 = slowest .. 10 = fastest).
    /// Purely advisory; emulation correctness never depends on it.
    pub fn set_cpu_speed(&mut self, speed: u8) {
        self.cpu_speed = speed.min(10);
    }

    /// The configured speed hint.
    #[must_use]
    pub fn cpu_speed(&self) -> u8 {
        self.cpu_speed
    }

    /// How long an interactive host should sleep between steps at the
    /// configured speed.
    #[must_use]
    pub fn sleep_duration(&self) -> Duration {
        Duration::from_millis(SLEEP_TABLE[usize::from(self.cpu_speed)])
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    /// Reads the operand for the current instruction into `fetched`.
    ///
    /// Implied and accumulator modes have nothing to read; the accumulator
    /// mode already staged AC during address resolution.
    pub(crate) fn fetch_operand(&mut self, mode: AddrMode) -> u8 {
        if !matches!(mode, AddrMode::Imp | AddrMode::Acc) {
            self.fetched = self.read_tick(self.addr_abs);
        }
        self.fetched
    }

    /// The shared BRK/IRQ/NMI sequence.
    ///
    /// A software break skips the padding byte after the opcode; hardware
    /// interrupts spend the same cycle internally. PC and status are pushed
    /// (B in the pushed copy tells the handler which case it was), I is
    /// raised and PC loads from `vector`.
    pub(crate) fn break_op(&mut self, is_break: bool, vector: u16) {
        if is_break {
            self.read_tick(self.regs.pc);
            self.regs.pc = self.regs.pc.wrapping_add(1);
        } else {
            self.tick();
        }

        self.push_tick((self.regs.pc >> 8) as u8);
        self.push_tick((self.regs.pc & 0xFF) as u8);

        self.regs.set_flag(Status::B, is_break);
        self.regs.set_flag(Status::U, true);
        self.push_tick(self.regs.sr.bits());

        self.regs.set_flag(Status::I, true);
        if cfg!(feature = "emulate-65c02") {
            self.regs.set_flag(Status::D, false);
        }

        let lo = self.read_tick(vector);
        let hi = self.read_tick(vector.wrapping_add(1));
        self.regs.pc = u16::from_le_bytes([lo, hi]);

        self.interrupt_armed_prev = false;
        self.interrupt_armed_now = false;
    }

    /// Enters the terminal jammed state.
    pub(crate) fn jam(&mut self) {
        self.jammed = true;
        self.state = CpuState::Jammed;
    }
}

impl<B: Bus + Default> Default for Cpu<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}
