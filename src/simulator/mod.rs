/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Instruction-level simulator. Loads a binary artifact, decodes it
//! through the target and interprets the instruction stream against the
//! SPARC V8 machine state: register windows, PSR, the %y register, the
//! PC/nPC pair, predicate state, hardware-loop state and data memory.

mod disasm;
pub mod memory;
mod regfile;

use std::io::{self, Read, Write};

use crate::errors::SimulationError;
use crate::isa::{CondCode, Instruction, LoopReg, Opcode, Operand};
use crate::target::{
    self, CALL_ADDR_REGISTER, END_OF_INS_MEM, NWINDOWS, PSR_INIT_MASK, RET_VAL_REGISTER,
    SP_REGISTER, TargetIsa,
};
use memory::{DataMemory, LoadAccess, StoreAccess};
use regfile::RegisterFile;

/// Header of the binary artifact.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub target_id: u16,
    pub memory_size: u32,
    pub instruction_size: u32,
}

/// Processor status register: integer condition codes at bits 20..23 and
/// the current window pointer in the low five bits.
#[derive(Debug, Copy, Clone)]
struct Psr(u32);

impl Psr {
    fn new() -> Psr {
        Psr(PSR_INIT_MASK)
    }

    fn cwp(self) -> usize {
        (self.0 & 0x1f) as usize
    }

    fn set_cwp(&mut self, cwp: usize) {
        self.0 = (self.0 & !0x1f) | (cwp as u32 & 0x1f);
    }

    fn n(self) -> bool {
        (self.0 >> 23) & 1 == 1
    }

    fn z(self) -> bool {
        (self.0 >> 22) & 1 == 1
    }

    fn v(self) -> bool {
        (self.0 >> 21) & 1 == 1
    }

    fn c(self) -> bool {
        (self.0 >> 20) & 1 == 1
    }

    /// The ICC field is cleared and rewritten atomically.
    fn set_icc(&mut self, icc: IccFlags) {
        self.0 &= !(0x1f << 20);
        self.0 |= (icc.n as u32) << 23;
        self.0 |= (icc.z as u32) << 22;
        self.0 |= (icc.v as u32) << 21;
        self.0 |= (icc.c as u32) << 20;
    }
}

/// One set of integer condition codes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct IccFlags {
    pub n: bool,
    pub z: bool,
    pub v: bool,
    pub c: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Predication {
    None,
    Icc(CondCode),
    Preg { reg: u8, tf: bool },
}

#[derive(Debug, Copy, Clone, Default)]
struct HwloopState {
    active: bool,
    start_address: u32,
    end_address: u32,
    loop_counter: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halted,
}

#[derive(Debug, Copy, Clone)]
enum WindowShift {
    Decrement,
    Increment,
}

#[derive(Debug, Copy, Clone)]
enum HwloopUpdate {
    SetStart(u32),
    SetEnd(u32),
    SetBound(u32),
    Activate,
}

/// Side effects of one instruction, computed first and committed only when
/// the predication gate is open. Predication-state changes and the local
/// cycle-counter intrinsics apply unconditionally.
#[derive(Default)]
struct Pending {
    cost: u32,
    clear_local: bool,
    predication: Option<Predication>,
    window: Option<WindowShift>,
    reg: Option<(u8, u32)>,
    load: Option<(LoadAccess, u8, u32)>,
    store: Option<(StoreAccess, u32, u32)>,
    y: Option<u32>,
    icc: Option<IccFlags>,
    npc: Option<u32>,
    preg: Option<u32>,
    hwloop: Option<HwloopUpdate>,
    warning: Option<&'static str>,
}

pub struct Simulator {
    target: &'static dyn TargetIsa,
    header: FileHeader,
    memory: DataMemory,
    instructions: Vec<Instruction>,

    psr: Psr,
    y: u32,
    pc: u32,
    npc: u32,
    regs: RegisterFile,
    preg: u32,
    predication: Predication,
    hwloop: HwloopState,

    cycle_counter: u32,
    cycle_counter_local: u32,
}

fn read_bytes<const N: usize>(reader: &mut dyn Read) -> Result<[u8; N], SimulationError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            SimulationError::TruncatedBinary
        } else {
            SimulationError::Io(e)
        }
    })?;
    Ok(buf)
}

impl Simulator {
    /// Reads the header, the data memory image and the instruction stream
    /// from the binary artifact and leaves the machine in reset state.
    pub fn load(
        reader: &mut dyn Read,
        target: &'static dyn TargetIsa,
    ) -> Result<Simulator, SimulationError> {
        let header = FileHeader {
            target_id: u16::from_be_bytes(read_bytes::<2>(reader)?),
            memory_size: u32::from_be_bytes(read_bytes::<4>(reader)?),
            instruction_size: u32::from_be_bytes(read_bytes::<4>(reader)?),
        };

        if header.target_id != target.target_id() {
            return Err(SimulationError::TargetMismatch {
                found: header.target_id,
                expected: target.target_id(),
            });
        }

        let mut memory = DataMemory::new(header.memory_size);
        memory.read_image(reader, header.memory_size)?;

        if header.instruction_size % 4 != 0 {
            return Err(SimulationError::InvalidInstructionSize(
                header.instruction_size,
            ));
        }
        let count = header.instruction_size / 4;
        let mut instructions = Vec::with_capacity(count as usize);
        for instr_no in 0..count {
            let word = u32::from_be_bytes(read_bytes::<4>(reader)?);
            instructions.push(target.decode(word, instr_no)?);
        }

        let mut simulator = Simulator {
            target,
            header,
            memory,
            instructions,
            psr: Psr::new(),
            y: 0,
            pc: 0,
            npc: 1,
            regs: RegisterFile::new(),
            preg: 0,
            predication: Predication::None,
            hwloop: HwloopState::default(),
            cycle_counter: 0,
            cycle_counter_local: 0,
        };
        simulator.reset();
        Ok(simulator)
    }

    /// Resets every machine-state field to its initial value without
    /// touching the loaded data memory or the instruction stream.
    pub fn reset(&mut self) {
        self.psr = Psr::new();
        self.y = 0;
        self.pc = 0;
        self.npc = 1;
        self.regs.reset();

        let cwp = self.psr.cwp();
        // stack pointer starts at the top of data memory
        self.regs.write(cwp, SP_REGISTER, self.memory.len() - 4);
        // returning from the entry function drives nPC to the end-of-memory
        // sentinel
        self.regs
            .write(cwp, CALL_ADDR_REGISTER, END_OF_INS_MEM - 8);

        self.preg = 0;
        self.predication = Predication::None;
        self.hwloop = HwloopState::default();
        self.cycle_counter = 0;
        self.cycle_counter_local = 0;
    }

    // ------------- accessors -------------

    pub fn target(&self) -> &'static dyn TargetIsa {
        self.target
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.bytes()
    }

    /// Architectural register in the current window.
    pub fn register(&self, reg: u8) -> u32 {
        self.regs.read(self.psr.cwp(), reg)
    }

    pub fn y_register(&self) -> u32 {
        self.y
    }

    /// Return value of the entry function.
    pub fn result(&self) -> u32 {
        self.register(RET_VAL_REGISTER)
    }

    pub fn cycles(&self) -> u32 {
        self.cycle_counter
    }

    pub fn local_cycles(&self) -> u32 {
        self.cycle_counter_local
    }

    pub fn current_window(&self) -> usize {
        self.psr.cwp()
    }

    pub fn condition_flags(&self) -> IccFlags {
        IccFlags {
            n: self.psr.n(),
            z: self.psr.z(),
            v: self.psr.v(),
            c: self.psr.c(),
        }
    }

    pub fn predicate_register(&self) -> u32 {
        self.preg
    }

    // ------------- condition evaluation -------------

    /// Condition evaluation over the PSR flags, SPARC V8 manual p. 178.
    fn eval_icc(&self, icc: CondCode) -> bool {
        let (n, z, v, c) = (self.psr.n(), self.psr.z(), self.psr.v(), self.psr.c());
        match icc {
            CondCode::A => true,
            CondCode::N => false,
            CondCode::Ne => !z,
            CondCode::E => z,
            CondCode::G => !(z | (n ^ v)),
            CondCode::Le => z | (n ^ v),
            CondCode::Ge => !(n ^ v),
            CondCode::L => n ^ v,
            CondCode::Gu => !c && !z,
            CondCode::Leu => c || z,
            CondCode::Cc => !c,
            CondCode::Cs => c,
            CondCode::Pos => !n,
            CondCode::Neg => n,
            CondCode::Vc => !v,
            CondCode::Vs => v,
        }
    }

    /// Bit `2*reg + tf` of the packed predicate register.
    fn eval_pred(&self, reg: u8, tf: bool) -> bool {
        (self.preg >> (2 * reg as u32 + tf as u32)) & 1 == 1
    }

    /// The predication gate: open when no predicated block is active or
    /// when the installed condition holds.
    fn gate_open(&self) -> bool {
        match self.predication {
            Predication::None => true,
            Predication::Icc(icc) => self.eval_icc(icc),
            Predication::Preg { reg, tf } => self.eval_pred(reg, tf),
        }
    }

    // ------------- operand helpers -------------

    fn reg_read(&self, reg: u8) -> u32 {
        self.regs.read(self.psr.cwp(), reg)
    }

    /// Value of a source operand: a register read or a sign-extended
    /// immediate.
    fn operand_value(&self, operand: &Operand) -> u32 {
        match operand {
            Operand::Reg(r) => self.reg_read(*r),
            Operand::Simm13(v) | Operand::Simm11(v) | Operand::Simm8(v) | Operand::Imm22(v) => {
                *v as u32
            }
            _ => 0,
        }
    }

    fn bad_operands(&self, instr_no: u32) -> SimulationError {
        SimulationError::UnknownOpcode { instr_no }
    }

    // ------------- the step interpreter -------------

    /// Executes one instruction. Returns whether the simulation should
    /// continue or has reached the end-of-memory sentinel.
    pub fn step(&mut self, out: &mut dyn Write) -> Result<StepOutcome, SimulationError> {
        let cur_pc = self.pc;
        if cur_pc as usize >= self.instructions.len() {
            return Err(SimulationError::PcOutOfRange { pc: cur_pc });
        }

        // advance the PC/nPC pair
        self.pc = self.npc;
        self.npc = self.npc.wrapping_add(1);

        // hardware-loop auto-branch: when the next address is the loop end,
        // the loop either closes or retires, before the opcode is looked at
        if self.hwloop.active && self.npc == self.hwloop.end_address {
            self.hwloop.loop_counter = self.hwloop.loop_counter.wrapping_sub(1);
            if self.hwloop.loop_counter > 0 {
                self.npc = self.hwloop.start_address;
            } else {
                self.hwloop.active = false;
            }
        }

        // the gate is evaluated against the state before this instruction
        let committing = self.gate_open();
        let pending = self.compute(cur_pc, committing, out)?;

        // cycle counters advance regardless of the gate
        self.cycle_counter = self.cycle_counter.wrapping_add(pending.cost);
        self.cycle_counter_local = self.cycle_counter_local.wrapping_add(pending.cost);
        if pending.clear_local {
            self.cycle_counter_local = 0;
        }
        // predication state changes are not themselves gated, otherwise a
        // closed block could never end
        if let Some(predication) = pending.predication {
            self.predication = predication;
        }

        if committing {
            self.commit(pending)?;
        }

        if self.pc == END_OF_INS_MEM >> 2 {
            Ok(StepOutcome::Halted)
        } else {
            Ok(StepOutcome::Continue)
        }
    }

    /// Runs until the termination sentinel and returns the entry
    /// function's return value.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<u32, SimulationError> {
        while self.step(out)? == StepOutcome::Continue {}
        Ok(self.result())
    }

    fn compute(
        &self,
        cur_pc: u32,
        committing: bool,
        out: &mut dyn Write,
    ) -> Result<Pending, SimulationError> {
        use Opcode::*;

        let ins = &self.instructions[cur_pc as usize];
        let mut p = Pending {
            cost: target::cycle_cost(ins.opcode),
            ..Pending::default()
        };

        match ins.opcode {
            CyclePrint => {
                writeln!(
                    out,
                    "Current simulated cycles: {}.",
                    self.cycle_counter_local
                )?;
                p.clear_local = true;
            }
            CycleClear => {
                p.clear_local = true;
            }
            Nop => {}
            Call => {
                let target = ins.operands[0]
                    .label_address()
                    .ok_or_else(|| self.bad_operands(cur_pc))?;
                p.npc = Some(target);
                // the return address is a byte address
                p.reg = Some((CALL_ADDR_REGISTER, cur_pc << 2));
            }
            Branch => {
                let target = ins.operands[0]
                    .label_address()
                    .ok_or_else(|| self.bad_operands(cur_pc))?;
                let icc = ins.operands[1]
                    .icc()
                    .ok_or_else(|| self.bad_operands(cur_pc))?;
                if self.eval_icc(icc) {
                    p.npc = Some(target);
                }
            }
            Sethi => match ins.operands.as_slice() {
                [Operand::Reg(rd), Operand::Imm22(imm)] => {
                    p.reg = Some((*rd, (*imm as u32) << 10));
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            Ldsb | Ldub | Ldsh | Lduh | Ld | Ldsba | Lduba | Ldsha | Lduha | Lda => {
                let access = match ins.opcode {
                    Ldsb | Ldsba => LoadAccess::ByteSigned,
                    Ldub | Lduba => LoadAccess::ByteUnsigned,
                    Ldsh | Ldsha => LoadAccess::HalfSigned,
                    Lduh | Lduha => LoadAccess::HalfUnsigned,
                    _ => LoadAccess::Word,
                };
                let (rd, addr) = self.memory_operands(ins, cur_pc)?;
                p.load = Some((access, rd, addr));
            }
            Ldd | Ldda => {
                p.warning =
                    Some("simulator currently does not implement load double instructions!");
            }
            Stb | Sth | St | Stba | Stha | Sta => {
                let access = match ins.opcode {
                    Stb | Stba => StoreAccess::Byte,
                    Sth | Stha => StoreAccess::Half,
                    _ => StoreAccess::Word,
                };
                let (src, addr) = self.memory_operands(ins, cur_pc)?;
                p.store = Some((access, addr, self.reg_read(src)));
            }
            Std | Stda => {
                p.warning =
                    Some("simulator currently does not implement store double instructions!");
            }
            // atomics are accepted but have no semantics in this simulator
            Ldstub | Ldstuba | Swap | Swapa => {}
            Save | Restore => {
                let (rd, s1, s2) = self.three_operands(ins, cur_pc)?;
                // the sources come from the old window, the destination
                // lives in the new one
                p.reg = Some((rd, s1.wrapping_add(s2)));
                p.window = Some(if ins.opcode == Save {
                    WindowShift::Decrement
                } else {
                    WindowShift::Increment
                });
            }
            Jumpl => {
                let (rd, s1, s2) = self.three_operands(ins, cur_pc)?;
                // the jump target is a byte address, the PC counts words
                p.npc = Some(s1.wrapping_add(s2) >> 2);
                p.reg = Some((rd, cur_pc << 2));
            }
            Rd => match ins.operands.as_slice() {
                [Operand::Reg(rd), Operand::Y, ..] => {
                    p.reg = Some((*rd, self.y));
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            Wr => match ins.operands.as_slice() {
                [Operand::Y, Operand::Reg(rs1), second] => {
                    p.y = Some(self.reg_read(*rs1) ^ self.operand_value(second));
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            Mov => match ins.operands.as_slice() {
                [Operand::Reg(rd), Operand::Reg(rs), Operand::Icc(icc)] => {
                    let value = if self.eval_icc(*icc) {
                        self.reg_read(*rs)
                    } else {
                        self.reg_read(*rd)
                    };
                    p.reg = Some((*rd, value));
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            Sel => match ins.operands.as_slice() {
                [Operand::Reg(rd), src1, src2, Operand::Icc(icc)] => {
                    let value = if self.eval_icc(*icc) {
                        self.operand_value(src1)
                    } else {
                        self.operand_value(src2)
                    };
                    p.reg = Some((*rd, value));
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            HwloopInit => match ins.operands.as_slice() {
                [Operand::LoopReg(LoopReg::Start), Operand::LabelAddress(addr)] => {
                    p.hwloop = Some(HwloopUpdate::SetStart(*addr));
                }
                [Operand::LoopReg(LoopReg::End), Operand::LabelAddress(addr)] => {
                    p.hwloop = Some(HwloopUpdate::SetEnd(*addr));
                }
                [Operand::LoopReg(LoopReg::Bound), bound] => {
                    p.hwloop = Some(HwloopUpdate::SetBound(self.operand_value(bound)));
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            HwloopStart => {
                p.hwloop = Some(HwloopUpdate::Activate);
            }
            PredBegin => match ins.operands.as_slice() {
                [Operand::Icc(icc)] => {
                    p.predication = Some(Predication::Icc(*icc));
                }
                [Operand::Preg(reg), Operand::Tf(tf)] => {
                    p.predication = Some(Predication::Preg { reg: *reg, tf: *tf });
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            PredEnd => {
                p.predication = Some(Predication::None);
            }
            PredSet => match ins.operands.as_slice() {
                [Operand::Preg(reg), rest @ ..] => {
                    let (t_bit, f_bit) = (1u32 << (2 * reg + 1), 1u32 << (2 * reg));
                    let mut next = self.preg;
                    match rest {
                        [Operand::Icc(icc), ..] => {
                            if self.eval_icc(*icc) {
                                next = (next & !f_bit) | t_bit;
                            } else {
                                next = (next & !t_bit) | f_bit;
                            }
                        }
                        _ => next |= t_bit | f_bit,
                    }
                    p.preg = Some(next);
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            PredClear => match ins.operands.as_slice() {
                [Operand::Preg(reg)] => {
                    let mask = 0x3u32 << (2 * reg);
                    p.preg = Some(self.preg & !mask);
                }
                _ => return Err(self.bad_operands(cur_pc)),
            },
            Unknown => {
                return Err(SimulationError::UnknownOpcode { instr_no: cur_pc });
            }
            _ => self.compute_alu(ins, cur_pc, committing, &mut p)?,
        }

        Ok(p)
    }

    /// Destination register number and the computed memory address of a
    /// load/store instruction.
    fn memory_operands(
        &self,
        ins: &Instruction,
        cur_pc: u32,
    ) -> Result<(u8, u32), SimulationError> {
        match ins.operands.as_slice() {
            [Operand::Reg(rd), Operand::Reg(rs1), second, ..] => {
                let addr = self.reg_read(*rs1).wrapping_add(self.operand_value(second));
                Ok((*rd, addr))
            }
            _ => Err(self.bad_operands(cur_pc)),
        }
    }

    /// Destination register number and both source values of a
    /// three-operand instruction.
    fn three_operands(
        &self,
        ins: &Instruction,
        cur_pc: u32,
    ) -> Result<(u8, u32, u32), SimulationError> {
        match ins.operands.as_slice() {
            [Operand::Reg(rd), Operand::Reg(rs1), second, ..] => Ok((
                *rd,
                self.reg_read(*rs1),
                self.operand_value(second),
            )),
            _ => Err(self.bad_operands(cur_pc)),
        }
    }

    /// The arithmetic/logic/shift/multiply/divide group: computes the
    /// result value and, for the *cc opcodes, the next condition codes.
    fn compute_alu(
        &self,
        ins: &Instruction,
        cur_pc: u32,
        committing: bool,
        p: &mut Pending,
    ) -> Result<(), SimulationError> {
        use Opcode::*;

        let (rd, s1, s2) = self.three_operands(ins, cur_pc)?;
        let carry = self.psr.c() as u32;

        // 64-bit intermediates for the divide overflow checks
        let mut udiv_result: u64 = 0;
        let mut sdiv_result: i64 = 0;

        let value = match ins.opcode {
            And | Andcc => s1 & s2,
            Andn | Andncc => !(s1 & s2),
            Or | Orcc => s1 | s2,
            Orn | Orncc => !(s1 | s2),
            Xor | Xorcc => s1 ^ s2,
            Xnor | Xnorcc => !(s1 ^ s2),
            // shift counts are the low five bits of the second operand
            Sll => s1 << (s2 & 0x1f),
            Srl => s1 >> (s2 & 0x1f),
            Sra => ((s1 as i32) >> (s2 & 0x1f)) as u32,
            // tagged add/subtract do not trap here, so they behave like
            // their plain cc variants
            Add | Addcc | Taddcc | Taddcctv => s1.wrapping_add(s2),
            Addx | Addxcc => s1.wrapping_add(s2).wrapping_add(carry),
            Sub | Subcc | Tsubcc | Tsubcctv => s1.wrapping_sub(s2),
            Subx | Subxcc => s1.wrapping_sub(s2).wrapping_sub(carry),
            // multiply-step is not modeled; the zero default result is
            // written back
            Mulscc => 0,
            Umul | Umulcc => {
                let product = u64::from(s1) * u64::from(s2);
                p.y = Some((product >> 32) as u32);
                product as u32
            }
            Smul | Smulcc => {
                let product = i64::from(s1 as i32) * i64::from(s2 as i32);
                p.y = Some(((product as u64) >> 32) as u32);
                product as u32
            }
            Udiv | Udivcc => {
                if s2 == 0 {
                    if committing {
                        return Err(SimulationError::DivisionByZero { instr_no: cur_pc });
                    }
                    // a gated-off division must not fault
                    return Ok(());
                }
                let dividend = (u64::from(self.y) << 32) | u64::from(s1);
                udiv_result = dividend / u64::from(s2);
                udiv_result as u32
            }
            Sdiv | Sdivcc => {
                if s2 == 0 {
                    if committing {
                        return Err(SimulationError::DivisionByZero { instr_no: cur_pc });
                    }
                    return Ok(());
                }
                let dividend = (i64::from(self.y as i32) << 32) | i64::from(s1);
                sdiv_result = dividend.wrapping_div(i64::from(s2 as i32));
                sdiv_result as u32
            }
            _ => return Err(self.bad_operands(cur_pc)),
        };

        p.reg = Some((rd, value));

        let n = value & (1 << 31) != 0;
        let z = value == 0;
        p.icc = match ins.opcode {
            // the logical and multiply cc opcodes only set N and Z
            Andcc | Andncc | Orcc | Orncc | Xorcc | Xnorcc | Umulcc | Smulcc => Some(IccFlags {
                n,
                z,
                ..IccFlags::default()
            }),
            Addcc | Addxcc | Taddcc | Taddcctv => Some(icc_add(s1, s2, value)),
            Subcc | Subxcc | Tsubcc | Tsubcctv => Some(icc_sub(s1, s2, value)),
            Udivcc => Some(IccFlags {
                n,
                z,
                v: (udiv_result >> 32) != 0,
                c: false,
            }),
            Sdivcc => {
                let high = ((sdiv_result as u64) >> 32) as u32;
                Some(IccFlags {
                    n,
                    z,
                    v: high != 0 && high != 0xffff_ffff,
                    c: false,
                })
            }
            _ => None,
        };

        Ok(())
    }

    /// Writes back the computed side effects. The window shift is applied
    /// first so register writes land in the new window.
    fn commit(&mut self, pending: Pending) -> Result<(), SimulationError> {
        if let Some(shift) = pending.window {
            let cwp = self.psr.cwp();
            let new_cwp = match shift {
                WindowShift::Decrement => (cwp + NWINDOWS - 1) % NWINDOWS,
                WindowShift::Increment => (cwp + 1) % NWINDOWS,
            };
            self.psr.set_cwp(new_cwp);
        }

        if let Some((access, rd, addr)) = pending.load {
            let value = self.memory.load(access, addr)?;
            self.regs.write(self.psr.cwp(), rd, value);
        }
        if let Some((access, addr, value)) = pending.store {
            self.memory.store(access, addr, value)?;
        }
        if let Some((rd, value)) = pending.reg {
            self.regs.write(self.psr.cwp(), rd, value);
        }
        if let Some(y) = pending.y {
            self.y = y;
        }
        if let Some(icc) = pending.icc {
            self.psr.set_icc(icc);
        }
        if let Some(npc) = pending.npc {
            self.npc = npc;
        }
        if let Some(preg) = pending.preg {
            self.preg = preg;
        }
        if let Some(update) = pending.hwloop {
            match update {
                HwloopUpdate::SetStart(addr) => self.hwloop.start_address = addr,
                HwloopUpdate::SetEnd(addr) => self.hwloop.end_address = addr,
                HwloopUpdate::SetBound(bound) => self.hwloop.loop_counter = bound,
                HwloopUpdate::Activate => self.hwloop.active = true,
            }
        }
        if let Some(warning) = pending.warning {
            eprintln!("Warning: {}", warning);
        }

        Ok(())
    }

    // ------------- diagnostic output -------------

    /// Disassembly-style listing of the loaded instruction stream.
    pub fn print_instructions(&self, out: &mut dyn Write) -> io::Result<()> {
        disasm::write_listing(out, &self.instructions, self.header.instruction_size)
    }

    pub fn print_memory(&self, out: &mut dyn Write) -> io::Result<()> {
        self.memory.dump(out)
    }

    /// Register contents of the current window, the %y register, the PSR
    /// flags and the packed predicate register.
    pub fn print_registers(&self, out: &mut dyn Write) -> io::Result<()> {
        const REG_NAMES: [char; 4] = ['g', 'o', 'l', 'i'];

        writeln!(out, "Register contents of current window:")?;
        for i in 0..32u8 {
            writeln!(
                out,
                "%{}{}:\t0x{:08x}",
                REG_NAMES[i as usize / 8],
                i % 8,
                self.reg_read(i)
            )?;
        }
        writeln!(out, "%y:\t\t0x{:08x}", self.y)?;
        writeln!(
            out,
            "PSR:\tN={}, Z={}, V={}, C={}",
            self.psr.n() as u32,
            self.psr.z() as u32,
            self.psr.v() as u32,
            self.psr.c() as u32
        )?;
        writeln!(out)?;
        writeln!(out, "preg:\t0x{:08x}", self.preg)?;
        Ok(())
    }

    pub fn print_results(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "Main function returned value 0x{:08x}.",
            self.result()
        )?;
        writeln!(out, "Simulated cycles: {}.", self.cycle_counter)?;
        Ok(())
    }
}

// ------------- condition-code derivation -------------

/// N/Z/V/C for the add family, from the sign bits of both sources and the
/// result.
fn icc_add(s1: u32, s2: u32, value: u32) -> IccFlags {
    let (s1n, s2n, dn) = (s1 >> 31 == 1, s2 >> 31 == 1, value >> 31 == 1);
    IccFlags {
        n: dn,
        z: value == 0,
        v: (s1n && s2n && !dn) || (!s1n && !s2n && dn),
        c: (s1n && s2n) || (!dn && (s1n || s2n)),
    }
}

/// N/Z/V/C for the subtract family.
fn icc_sub(s1: u32, s2: u32, value: u32) -> IccFlags {
    let (s1n, s2n, dn) = (s1 >> 31 == 1, s2 >> 31 == 1, value >> 31 == 1);
    IccFlags {
        n: dn,
        z: value == 0,
        v: (s1n && !s2n && !dn) || (!s1n && s2n && dn),
        c: (!s1n && s2n) || (dn && (!s1n || s2n)),
    }
}

// ------------- unit tests -------------
