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

//! Codecs for the extension instruction families. A target that exports an
//! extension composes the matching pair from here; targets without the
//! extension leave the op2 code undecoded.

use super::fields::*;
use crate::errors::{AssemblyError, SimulationError};
use crate::isa::{CondCode, Instruction, LoopReg, Opcode, Operand};

fn malformed(ins: &Instruction) -> AssemblyError {
    AssemblyError::MalformedOperands {
        instr_no: ins.instr_no,
    }
}

// ------------- hardware loops (op2 = 1) -------------

pub(super) fn encode_hwloop(ins: &Instruction) -> Result<u32, AssemblyError> {
    let word = set_op2(format2(), OP2_HWLOOP);

    if ins.opcode == Opcode::HwloopStart {
        return Ok(set_hwloop_type(word, HWLOOP_TYPE_START));
    }

    match ins.operands.as_slice() {
        // loop start/end registers take an instruction address, stored as a
        // displacement relative to this instruction
        [Operand::LoopReg(lr @ (LoopReg::Start | LoopReg::End)), Operand::LabelAddress(addr)] => {
            let disp = *addr as i64 - ins.instr_no as i64;
            if !(-(1 << 21)..(1 << 21)).contains(&disp) {
                return Err(AssemblyError::DisplacementOutOfRange {
                    instr_no: ins.instr_no,
                });
            }
            let ty = if *lr == LoopReg::Start {
                HWLOOP_TYPE_SET_S
            } else {
                HWLOOP_TYPE_SET_E
            };
            Ok(set_imm22(set_hwloop_type(word, ty), disp as i32))
        }
        [Operand::LoopReg(LoopReg::Bound), Operand::Reg(rs1)] => {
            Ok(set_rs1(set_hwloop_type(word, HWLOOP_TYPE_SET_B_REG), *rs1))
        }
        [Operand::LoopReg(LoopReg::Bound), Operand::Imm22(imm)] => {
            Ok(set_imm22(set_hwloop_type(word, HWLOOP_TYPE_SET_B_IMM), *imm))
        }
        _ => Err(malformed(ins)),
    }
}

pub(super) fn decode_hwloop(word: u32, instr_no: u32) -> Result<Instruction, SimulationError> {
    let decoded = match get_hwloop_type(word) {
        HWLOOP_TYPE_SET_S | HWLOOP_TYPE_SET_E => {
            let lr = if get_hwloop_type(word) == HWLOOP_TYPE_SET_S {
                LoopReg::Start
            } else {
                LoopReg::End
            };
            let target = instr_no.wrapping_add(get_imm22_signed(word) as u32);
            Instruction::new(
                Opcode::HwloopInit,
                instr_no,
                vec![Operand::LoopReg(lr), Operand::LabelAddress(target)],
            )
        }
        HWLOOP_TYPE_SET_B_IMM => Instruction::new(
            Opcode::HwloopInit,
            instr_no,
            vec![
                Operand::LoopReg(LoopReg::Bound),
                Operand::Imm22(get_imm22_signed(word)),
            ],
        ),
        HWLOOP_TYPE_SET_B_REG => Instruction::new(
            Opcode::HwloopInit,
            instr_no,
            vec![
                Operand::LoopReg(LoopReg::Bound),
                Operand::Reg(get_rs1(word)),
            ],
        ),
        HWLOOP_TYPE_START => Instruction::new(Opcode::HwloopStart, instr_no, vec![]),
        _ => Instruction::new(Opcode::Unknown, instr_no, vec![]),
    };
    Ok(decoded)
}

// ------------- conditional select (op2 = 3) -------------

pub(super) fn encode_selcc(ins: &Instruction) -> Result<u32, AssemblyError> {
    let [dst, src1, src2, icc] = ins.operands.as_slice() else {
        return Err(malformed(ins));
    };
    let rd = dst.reg().ok_or_else(|| malformed(ins))?;
    let icc = icc.icc().ok_or_else(|| malformed(ins))?;

    let word = set_op2(format2(), OP2_SELCC);
    let word = selcc_set_icc(set_rd(word, rd), icc.bits());

    match (src1, src2) {
        (Operand::Reg(rs1), Operand::Reg(rs2)) => Ok(selcc_set_rs2(
            selcc_set_rs1(selcc_set_type(word, SELCC_TYPE_REG_REG), *rs1),
            *rs2,
        )),
        (Operand::Reg(rs1), Operand::Simm11(imm)) => Ok(selcc_set_simm11(
            selcc_set_rs1(selcc_set_type(word, SELCC_TYPE_REG_IMM), *rs1),
            *imm,
        )),
        (Operand::Simm8(imm1), Operand::Simm8(imm2)) => Ok(selcc_set_src2_imm8(
            selcc_set_src1_imm8(selcc_set_type(word, SELCC_TYPE_IMM_IMM), *imm1),
            *imm2,
        )),
        _ => Err(malformed(ins)),
    }
}

pub(super) fn decode_selcc(word: u32, instr_no: u32) -> Result<Instruction, SimulationError> {
    let rd = Operand::Reg(get_rd(word));
    let icc = Operand::Icc(CondCode::from_bits(selcc_get_icc(word)));

    let (src1, src2) = match selcc_get_type(word) {
        SELCC_TYPE_REG_REG => (
            Operand::Reg(selcc_get_rs1(word)),
            Operand::Reg(get_rs2(word)),
        ),
        SELCC_TYPE_REG_IMM => (
            Operand::Reg(selcc_get_rs1(word)),
            Operand::Simm11(selcc_get_simm11(word)),
        ),
        SELCC_TYPE_IMM_IMM => (
            Operand::Simm8(selcc_get_src1_imm8(word)),
            Operand::Simm8(selcc_get_src2_imm8(word)),
        ),
        _ => return Ok(Instruction::new(Opcode::Unknown, instr_no, vec![])),
    };

    Ok(Instruction::new(
        Opcode::Sel,
        instr_no,
        vec![rd, src1, src2, icc],
    ))
}

// ------------- conditional move (op2 = 3) -------------

pub(super) fn encode_movcc(ins: &Instruction) -> Result<u32, AssemblyError> {
    match ins.operands.as_slice() {
        [Operand::Reg(rd), Operand::Reg(rs), Operand::Icc(icc)] => {
            let word = set_op2(format2(), OP2_SELCC);
            Ok(movcc_set_rs(
                selcc_set_icc(set_rd(word, *rd), icc.bits()),
                *rs,
            ))
        }
        _ => Err(malformed(ins)),
    }
}

pub(super) fn decode_movcc(word: u32, instr_no: u32) -> Result<Instruction, SimulationError> {
    Ok(Instruction::new(
        Opcode::Mov,
        instr_no,
        vec![
            Operand::Reg(get_rd(word)),
            Operand::Reg(movcc_get_rs(word)),
            Operand::Icc(CondCode::from_bits(selcc_get_icc(word))),
        ],
    ))
}

// ------------- predicated blocks on condition codes (op2 = 5) -------------

pub(super) fn encode_predblocks_icc(ins: &Instruction) -> Result<u32, AssemblyError> {
    let word = set_op2(format2(), OP2_PREDBLOCKS);
    match ins.opcode {
        Opcode::PredEnd => Ok(pred_block_set_end(word)),
        Opcode::PredBegin => match ins.operands.as_slice() {
            [Operand::Icc(icc)] => Ok(set_cond(pred_block_set_begin(word), icc.bits())),
            _ => Err(malformed(ins)),
        },
        _ => Err(malformed(ins)),
    }
}

pub(super) fn decode_predblocks_icc(word: u32, instr_no: u32) -> Result<Instruction, SimulationError> {
    if pred_block_is_begin(word) {
        Ok(Instruction::new(
            Opcode::PredBegin,
            instr_no,
            vec![Operand::Icc(CondCode::from_bits(get_cond(word)))],
        ))
    } else {
        Ok(Instruction::new(Opcode::PredEnd, instr_no, vec![]))
    }
}

// ------------- predicated blocks on predicate registers (op2 = 5) -------------

pub(super) fn encode_predblocks_preg(ins: &Instruction) -> Result<u32, AssemblyError> {
    let word = set_op2(format2(), OP2_PREDBLOCKS);
    match ins.opcode {
        Opcode::PredEnd => Ok(pred_block_set_type(word, PRED_BLOCK_TYPE_END)),
        Opcode::PredBegin => match ins.operands.as_slice() {
            [Operand::Preg(preg), Operand::Tf(tf)] => {
                let word = pred_block_set_type(word, PRED_BLOCK_TYPE_BEGIN);
                Ok(pred_block_set_tf(pred_block_set_preg(word, *preg), *tf))
            }
            _ => Err(malformed(ins)),
        },
        Opcode::PredSet => match ins.operands.as_slice() {
            // predset without a condition uses the "always" condition code
            [Operand::Preg(preg)] => {
                let word = pred_block_set_type(word, PRED_BLOCK_TYPE_SET);
                Ok(pred_block_set_icc(
                    set_rd(word, *preg),
                    CondCode::A.bits(),
                ))
            }
            [Operand::Preg(preg), Operand::Icc(icc)] => {
                let word = pred_block_set_type(word, PRED_BLOCK_TYPE_SET);
                Ok(pred_block_set_icc(set_rd(word, *preg), icc.bits()))
            }
            _ => Err(malformed(ins)),
        },
        // predclear is only a special case of predset, using ICC "never"
        Opcode::PredClear => match ins.operands.as_slice() {
            [Operand::Preg(preg)] => {
                let word = pred_block_set_type(word, PRED_BLOCK_TYPE_CLEAR);
                Ok(pred_block_set_icc(
                    set_rd(word, *preg),
                    CondCode::N.bits(),
                ))
            }
            _ => Err(malformed(ins)),
        },
        _ => Err(malformed(ins)),
    }
}

pub(super) fn decode_predblocks_preg(
    word: u32,
    instr_no: u32,
) -> Result<Instruction, SimulationError> {
    let decoded = match pred_block_get_type(word) {
        PRED_BLOCK_TYPE_BEGIN => Instruction::new(
            Opcode::PredBegin,
            instr_no,
            vec![
                Operand::Preg(pred_block_get_preg(word)),
                Operand::Tf(pred_block_get_tf(word)),
            ],
        ),
        PRED_BLOCK_TYPE_END => Instruction::new(Opcode::PredEnd, instr_no, vec![]),
        PRED_BLOCK_TYPE_SET => {
            let preg = Operand::Preg(get_rd(word));
            let icc = CondCode::from_bits(pred_block_get_icc(word));
            // the "always" condition round-trips to the unconditional form
            if icc == CondCode::A {
                Instruction::new(Opcode::PredSet, instr_no, vec![preg])
            } else {
                Instruction::new(Opcode::PredSet, instr_no, vec![preg, Operand::Icc(icc)])
            }
        }
        PRED_BLOCK_TYPE_CLEAR => {
            Instruction::new(Opcode::PredClear, instr_no, vec![Operand::Preg(get_rd(word))])
        }
        _ => unreachable!("two-bit type field"),
    };
    Ok(decoded)
}
