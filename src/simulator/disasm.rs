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

//! Disassembly-style listing of a decoded instruction stream: one line per
//! instruction with its index, mnemonic, predicate suffixes and operands
//! in source order (destination last).

use std::io::{self, Write};

use crate::isa::{Instruction, LoopReg, Opcode, Operand};

fn reg_name(reg: u8) -> String {
    const REG_NAMES: [char; 4] = ['g', 'o', 'l', 'i'];
    format!("%{}{}", REG_NAMES[reg as usize / 8], reg % 8)
}

pub(super) fn write_listing(
    out: &mut dyn Write,
    instructions: &[Instruction],
    instruction_size: u32,
) -> io::Result<()> {
    writeln!(
        out,
        "Contents of instruction memory ({} bytes):",
        instruction_size
    )?;

    for ins in instructions {
        write!(out, "{:08x}\t", ins.instr_no)?;
        // number of trailing operands still to print generically
        let mut operands_end = ins.operands.len();

        match ins.opcode {
            Opcode::CyclePrint => write!(out, "sim-printcycles")?,
            Opcode::CycleClear => write!(out, "sim-clearcycles")?,
            Opcode::Nop => write!(out, "nop")?,
            Opcode::Call => {
                let address = ins.operands[0].label_address().unwrap_or(0);
                write!(out, "call 0x{:08x}", address)?;
                operands_end = 0;
            }
            Opcode::Branch => {
                let address = ins.operands[0].label_address().unwrap_or(0);
                if let Some(icc) = ins.operands[1].icc() {
                    write!(out, "b{}", icc.suffix())?;
                }
                write!(out, " 0x{:08x}", address)?;
                operands_end = 0;
            }
            Opcode::Rd => {
                write!(out, "rd")?;
                write_instruction_predicate(out, ins, 2)?;
                write!(out, " %y,")?;
                operands_end = 0;
            }
            Opcode::Mov => {
                if let Some(icc) = ins.operands[2].icc() {
                    write!(out, "mov[{}]", icc.suffix())?;
                }
                // the condition code has already been printed
                operands_end = 2;
            }
            Opcode::Sel => {
                if let Some(icc) = ins.operands[3].icc() {
                    write!(out, "sel[{}]", icc.suffix())?;
                }
                for source in &ins.operands[1..3] {
                    match source {
                        Operand::Reg(r) => write!(out, " {},", reg_name(*r))?,
                        Operand::Simm11(v) | Operand::Simm8(v) => write!(out, " {},", v)?,
                        _ => {}
                    }
                }
                operands_end = 0;
            }
            Opcode::HwloopInit => {
                write!(out, "hwloop init ")?;
                match ins.operands.as_slice() {
                    [Operand::LoopReg(LoopReg::Start), Operand::LabelAddress(addr)] => {
                        write!(out, "0x{:08x}, %loops", addr)?;
                    }
                    [Operand::LoopReg(LoopReg::End), Operand::LabelAddress(addr)] => {
                        write!(out, "0x{:08x}, %loope", addr)?;
                    }
                    [Operand::LoopReg(LoopReg::Bound), Operand::Reg(r)] => {
                        write!(out, "{}, %loopb", reg_name(*r))?;
                    }
                    [Operand::LoopReg(LoopReg::Bound), Operand::Imm22(v)] => {
                        write!(out, "{}, %loopb", v)?;
                    }
                    _ => {}
                }
                operands_end = 0;
            }
            Opcode::HwloopStart => {
                write!(out, "hwloop start")?;
                operands_end = 0;
            }
            Opcode::PredBegin => {
                write!(out, "predbegin")?;
                match ins.operands.as_slice() {
                    [Operand::Icc(icc)] => write!(out, "[{}]", icc.suffix())?,
                    [Operand::Preg(reg), Operand::Tf(tf)] => {
                        write!(out, "[%p{}][{}]", reg, if *tf { "t" } else { "f" })?;
                    }
                    _ => {}
                }
                operands_end = 0;
            }
            Opcode::PredEnd => write!(out, "predend")?,
            Opcode::PredSet => {
                write!(out, "predset")?;
                if let Some(Operand::Icc(icc)) = ins.operands.get(1) {
                    write!(out, "[{}]", icc.suffix())?;
                }
                if let Some(Operand::Preg(reg)) = ins.operands.first() {
                    write!(out, " %p{}", reg)?;
                }
                operands_end = 0;
            }
            Opcode::PredClear => {
                if let Some(Operand::Preg(reg)) = ins.operands.first() {
                    write!(out, "predclear %p{}", reg)?;
                }
                operands_end = 0;
            }
            Opcode::Unknown => write!(out, "unknown")?,
            opcode => write!(out, "{}", opcode.mnemonic())?,
        }

        // instruction-level predicate suffixes on three-operand
        // instructions
        if operands_end == 4 || operands_end == 5 {
            write_instruction_predicate(out, ins, 3)?;
            operands_end = 3;
        }

        // sources in order, then the destination slot
        for operand in ins.operands.iter().take(operands_end).skip(1) {
            match operand {
                Operand::Reg(r) => write!(out, " {}", reg_name(*r))?,
                Operand::Simm13(v) => write!(out, " {}", v)?,
                Operand::Imm22(v) => write!(out, " {}", v)?,
                _ => {}
            }
            write!(out, ",")?;
        }
        match ins.operands.first() {
            Some(Operand::Reg(r)) => write!(out, " {}", reg_name(*r))?,
            Some(Operand::Y) => write!(out, " %y")?,
            _ => {}
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    Ok(())
}

/// `[cc]` or `[%pN][t|f]` suffix appended by the predicate entry points,
/// starting at the given operand index.
fn write_instruction_predicate(
    out: &mut dyn Write,
    ins: &Instruction,
    from: usize,
) -> io::Result<()> {
    match ins.operands.get(from..) {
        Some([Operand::Icc(icc), ..]) => write!(out, "[{}]", icc.suffix()),
        Some([Operand::Preg(reg), Operand::Tf(tf), ..]) => {
            write!(out, "[%p{}][{}]", reg, if *tf { "t" } else { "f" })
        }
        _ => Ok(()),
    }
}
