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

//! Encoder and decoder for the integer base instruction set, shared by all
//! four target variants. Extension opcodes are passed back to the target
//! (`Ok(None)`), which owns their layout.

use super::fields::*;
use crate::errors::{AssemblyError, SimulationError};
use crate::isa::{CondCode, Instruction, Opcode, Operand};

/// op3 code of a format-3 opcode, together with its op field variant.
fn op3_for(opcode: Opcode) -> Option<u32> {
    use Opcode::*;
    Some(match opcode {
        Ldsb => OP3_LDSB,
        Ldsh => OP3_LDSH,
        Ldub => OP3_LDUB,
        Lduh => OP3_LDUH,
        Ld => OP3_LD,
        Ldd => OP3_LDD,
        Ldsba => OP3_LDSBA,
        Ldsha => OP3_LDSHA,
        Lduba => OP3_LDUBA,
        Lduha => OP3_LDUHA,
        Lda => OP3_LDA,
        Ldda => OP3_LDDA,
        Stb => OP3_STB,
        Sth => OP3_STH,
        St => OP3_ST,
        Std => OP3_STD,
        Stba => OP3_STBA,
        Stha => OP3_STHA,
        Sta => OP3_STA,
        Stda => OP3_STDA,
        Ldstub => OP3_LDSTUB,
        Ldstuba => OP3_LDSTUBA,
        Swap => OP3_SWAP,
        Swapa => OP3_SWAPA,
        And => OP3_AND,
        Andcc => OP3_ANDCC,
        Andn => OP3_ANDN,
        Andncc => OP3_ANDNCC,
        Or => OP3_OR,
        Orcc => OP3_ORCC,
        Orn => OP3_ORN,
        Orncc => OP3_ORNCC,
        Xor => OP3_XOR,
        Xorcc => OP3_XORCC,
        Xnor => OP3_XNOR,
        Xnorcc => OP3_XNORCC,
        Sll => OP3_SLL,
        Srl => OP3_SRL,
        Sra => OP3_SRA,
        Add => OP3_ADD,
        Addcc => OP3_ADDCC,
        Addx => OP3_ADDX,
        Addxcc => OP3_ADDXCC,
        Taddcc => OP3_TADDCC,
        Taddcctv => OP3_TADDCCTV,
        Sub => OP3_SUB,
        Subcc => OP3_SUBCC,
        Subx => OP3_SUBX,
        Subxcc => OP3_SUBXCC,
        Tsubcc => OP3_TSUBCC,
        Tsubcctv => OP3_TSUBCCTV,
        Mulscc => OP3_MULSCC,
        Umul => OP3_UMUL,
        Smul => OP3_SMUL,
        Umulcc => OP3_UMULCC,
        Smulcc => OP3_SMULCC,
        Udiv => OP3_UDIV,
        Sdiv => OP3_SDIV,
        Udivcc => OP3_UDIVCC,
        Sdivcc => OP3_SDIVCC,
        Save => OP3_SAVE,
        Restore => OP3_RESTORE,
        Jumpl => OP3_JUMPL,
        Rd => OP3_RDY,
        Wr => OP3_WRY,
        _ => return None,
    })
}

fn malformed(ins: &Instruction) -> AssemblyError {
    AssemblyError::MalformedOperands {
        instr_no: ins.instr_no,
    }
}

/// Writes the second source operand of a format-3 word: either rs2 with a
/// cleared immediate bit or simm13 with the immediate bit set.
fn encode_second_source(word: u32, ins: &Instruction, operand: &Operand) -> Result<u32, AssemblyError> {
    match operand {
        Operand::Reg(r) => Ok(set_rs2(word, *r)),
        Operand::Simm13(v) => Ok(set_simm13(word, *v)),
        _ => Err(malformed(ins)),
    }
}

/// Encodes a base-ISA instruction, or returns `Ok(None)` for the extension
/// opcodes whose layout belongs to the target.
pub(super) fn encode_base(ins: &Instruction) -> Result<Option<u32>, AssemblyError> {
    use Opcode::*;

    let word = match ins.opcode {
        Mov | Sel | HwloopInit | HwloopStart | PredBegin | PredEnd | PredSet | PredClear => {
            return Ok(None);
        }
        CyclePrint => set_rd(set_op2(format2(), OP2_SIMCYCLES), SIM_CYCLES_PRINT),
        CycleClear => set_rd(set_op2(format2(), OP2_SIMCYCLES), SIM_CYCLES_CLEAR),
        Nop => set_imm22(set_rd(set_op2(format2(), OP2_SETHI), 0), 0),
        Call => {
            let target = ins
                .operands
                .first()
                .and_then(|o| o.label_address())
                .ok_or_else(|| malformed(ins))?;
            let disp = target as i64 - ins.instr_no as i64;
            if !(-(1 << 29)..(1 << 29)).contains(&disp) {
                return Err(AssemblyError::DisplacementOutOfRange {
                    instr_no: ins.instr_no,
                });
            }
            set_disp30(format1(), disp as i32)
        }
        Branch => {
            let target = ins
                .operands
                .first()
                .and_then(|o| o.label_address())
                .ok_or_else(|| malformed(ins))?;
            let icc = ins
                .operands
                .get(1)
                .and_then(|o| o.icc())
                .ok_or_else(|| malformed(ins))?;
            let disp = target as i64 - ins.instr_no as i64;
            if !(-(1 << 21)..(1 << 21)).contains(&disp) {
                return Err(AssemblyError::DisplacementOutOfRange {
                    instr_no: ins.instr_no,
                });
            }
            let word = set_op2(format2(), OP2_BICC);
            let word = set_imm22(word, disp as i32);
            set_a(set_cond(word, icc.bits()), 0)
        }
        Sethi => match ins.operands.as_slice() {
            [Operand::Reg(rd), Operand::Imm22(imm)] => {
                set_imm22(set_rd(set_op2(format2(), OP2_SETHI), *rd), *imm)
            }
            _ => return Err(malformed(ins)),
        },
        Rd => match ins.operands.as_slice() {
            [Operand::Reg(rd), Operand::Y, ..] => {
                set_rs1(set_rd(set_op3(format3_oth(), OP3_RDY), *rd), 0)
            }
            _ => return Err(malformed(ins)),
        },
        Wr => match ins.operands.as_slice() {
            [Operand::Y, Operand::Reg(rs1), second] => {
                let word = set_rs1(set_rd(set_op3(format3_oth(), OP3_WRY), 0), *rs1);
                encode_second_source(word, ins, second)?
            }
            _ => return Err(malformed(ins)),
        },
        opcode => {
            // every remaining base instruction is a three-operand format-3
            // word; the opcode decides between the memory and the
            // arithmetic op space
            let op3 = op3_for(opcode).ok_or_else(|| malformed(ins))?;
            let base = if opcode.is_memory() {
                format3_mem()
            } else {
                format3_oth()
            };
            match ins.operands.as_slice() {
                [Operand::Reg(rd), Operand::Reg(rs1), second, ..] => {
                    let word = set_rs1(set_rd(set_op3(base, op3), *rd), *rs1);
                    encode_second_source(word, ins, second)?
                }
                _ => return Err(malformed(ins)),
            }
        }
    };

    Ok(Some(word))
}

fn unknown(instr_no: u32) -> Instruction {
    Instruction::new(Opcode::Unknown, instr_no, vec![])
}

/// Second source operand of a format-3 word.
fn decode_second_source(word: u32) -> Operand {
    if get_i(word) == 1 {
        Operand::Simm13(get_simm13(word))
    } else {
        Operand::Reg(get_rs2(word))
    }
}

fn arith_op3_opcode(op3: u32) -> Option<Opcode> {
    use Opcode::*;
    Some(match op3 {
        OP3_AND => And,
        OP3_ANDCC => Andcc,
        OP3_ANDN => Andn,
        OP3_ANDNCC => Andncc,
        OP3_OR => Or,
        OP3_ORCC => Orcc,
        OP3_ORN => Orn,
        OP3_ORNCC => Orncc,
        OP3_XOR => Xor,
        OP3_XORCC => Xorcc,
        OP3_XNOR => Xnor,
        OP3_XNORCC => Xnorcc,
        OP3_SLL => Sll,
        OP3_SRL => Srl,
        OP3_SRA => Sra,
        OP3_ADD => Add,
        OP3_ADDCC => Addcc,
        OP3_ADDX => Addx,
        OP3_ADDXCC => Addxcc,
        OP3_TADDCC => Taddcc,
        OP3_TADDCCTV => Taddcctv,
        OP3_SUB => Sub,
        OP3_SUBCC => Subcc,
        OP3_SUBX => Subx,
        OP3_SUBXCC => Subxcc,
        OP3_TSUBCC => Tsubcc,
        OP3_TSUBCCTV => Tsubcctv,
        OP3_MULSCC => Mulscc,
        OP3_UMUL => Umul,
        OP3_SMUL => Smul,
        OP3_UMULCC => Umulcc,
        OP3_SMULCC => Smulcc,
        OP3_UDIV => Udiv,
        OP3_SDIV => Sdiv,
        OP3_UDIVCC => Udivcc,
        OP3_SDIVCC => Sdivcc,
        OP3_SAVE => Save,
        OP3_RESTORE => Restore,
        OP3_JUMPL => Jumpl,
        OP3_RDY => Rd,
        OP3_WRY => Wr,
        _ => return None,
    })
}

fn mem_op3_opcode(op3: u32) -> Option<Opcode> {
    use Opcode::*;
    Some(match op3 {
        OP3_LDSB => Ldsb,
        OP3_LDSH => Ldsh,
        OP3_LDUB => Ldub,
        OP3_LDUH => Lduh,
        OP3_LD => Ld,
        OP3_LDD => Ldd,
        OP3_LDSBA => Ldsba,
        OP3_LDSHA => Ldsha,
        OP3_LDUBA => Lduba,
        OP3_LDUHA => Lduha,
        OP3_LDA => Lda,
        OP3_LDDA => Ldda,
        OP3_STB => Stb,
        OP3_STH => Sth,
        OP3_ST => St,
        OP3_STD => Std,
        OP3_STBA => Stba,
        OP3_STHA => Stha,
        OP3_STA => Sta,
        OP3_STDA => Stda,
        OP3_LDSTUB => Ldstub,
        OP3_LDSTUBA => Ldstuba,
        OP3_SWAP => Swap,
        OP3_SWAPA => Swapa,
        _ => return None,
    })
}

/// Decodes a base-ISA word, or returns `Ok(None)` when the word lies in the
/// extension op2 space owned by the target. Encodings that belong to no
/// instruction decode to the `Unknown` opcode; executing one is fatal,
/// decoding is not.
pub(super) fn decode_base(word: u32, instr_no: u32) -> Result<Option<Instruction>, SimulationError> {
    use Opcode::*;

    let decoded = match get_op(word) {
        // only the call instruction has format 1
        1 => {
            let target = instr_no.wrapping_add(get_disp30(word) as u32);
            Instruction::new(Call, instr_no, vec![Operand::LabelAddress(target)])
        }
        0 => match get_op2(word) {
            OP2_BICC => {
                let target = instr_no.wrapping_add(get_imm22_signed(word) as u32);
                let icc = CondCode::from_bits(get_cond(word));
                Instruction::new(
                    Branch,
                    instr_no,
                    vec![Operand::LabelAddress(target), Operand::Icc(icc)],
                )
            }
            OP2_SETHI => {
                let rd = get_rd(word);
                let imm = get_imm22_raw(word);
                if rd == 0 && imm == 0 {
                    Instruction::new(Nop, instr_no, vec![])
                } else {
                    Instruction::new(
                        Sethi,
                        instr_no,
                        vec![Operand::Reg(rd), Operand::Imm22(imm as i32)],
                    )
                }
            }
            OP2_SIMCYCLES => match get_rd(word) {
                SIM_CYCLES_PRINT => Instruction::new(CyclePrint, instr_no, vec![]),
                SIM_CYCLES_CLEAR => Instruction::new(CycleClear, instr_no, vec![]),
                _ => unknown(instr_no),
            },
            OP2_HWLOOP | OP2_SELCC | OP2_PREDBLOCKS => return Ok(None),
            _ => unknown(instr_no),
        },
        2 => match arith_op3_opcode(get_op3(word)) {
            Some(Rd) => {
                if get_rs1(word) != 0 {
                    return Err(SimulationError::InvalidYRegister { instr_no });
                }
                Instruction::new(Rd, instr_no, vec![Operand::Reg(get_rd(word)), Operand::Y])
            }
            Some(Wr) => {
                if get_rd(word) != 0 {
                    return Err(SimulationError::InvalidYRegister { instr_no });
                }
                Instruction::new(
                    Wr,
                    instr_no,
                    vec![
                        Operand::Y,
                        Operand::Reg(get_rs1(word)),
                        decode_second_source(word),
                    ],
                )
            }
            Some(opcode) => Instruction::new(
                opcode,
                instr_no,
                vec![
                    Operand::Reg(get_rd(word)),
                    Operand::Reg(get_rs1(word)),
                    decode_second_source(word),
                ],
            ),
            None => unknown(instr_no),
        },
        3 => match mem_op3_opcode(get_op3(word)) {
            Some(opcode) => Instruction::new(
                opcode,
                instr_no,
                vec![
                    Operand::Reg(get_rd(word)),
                    Operand::Reg(get_rs1(word)),
                    decode_second_source(word),
                ],
            ),
            None => unknown(instr_no),
        },
        _ => unreachable!("two-bit op field"),
    };

    Ok(Some(decoded))
}
