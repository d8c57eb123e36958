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

//! Lowering of parsed source lines onto the assembler's save-* entry
//! points: mnemonic dispatch, operand shape validation, section tracking
//! and expansion of the synthetic instructions.

use super::{AddressIndex, Assembler};
use crate::ast::*;
use crate::errors::AssemblyError;
use crate::isa::{self, CondCode, LoopReg, Opcode};

#[derive(Debug, Copy, Clone, PartialEq)]
enum Section {
    Text,
    Data,
}

pub(super) fn lower_lines(
    lines: &[AssemblyLine],
    asm: &mut Assembler,
) -> Result<(), AssemblyError> {
    let mut lowerer = Lowerer {
        asm,
        section: Section::Text,
        instr_no: 0,
        data_offset: 0,
    };
    for line in lines {
        lowerer.lower_line(line)?;
    }
    Ok(())
}

struct Lowerer<'a> {
    asm: &'a mut Assembler,
    section: Section,
    instr_no: u32,
    data_offset: u32,
}

fn structural(line: usize, reason: String) -> AssemblyError {
    AssemblyError::StructuralError { line, reason }
}

impl Lowerer<'_> {
    fn lower_line(&mut self, line: &AssemblyLine) -> Result<(), AssemblyError> {
        if let Some(label) = &line.label {
            let address = match self.section {
                Section::Text => self.instr_no,
                Section::Data => self.data_offset,
            };
            self.asm.save_label(address, label)?;
        }

        match &line.statement {
            None => Ok(()),
            Some(Statement::Directive(directive)) => self.lower_directive(line.line_number, directive),
            Some(Statement::Instruction(instruction)) => {
                if self.section != Section::Text {
                    return Err(structural(
                        line.line_number,
                        "Instructions are only allowed in the .text section.".to_string(),
                    ));
                }
                self.lower_instruction(line.line_number, instruction)?;
                self.instr_no += 1;
                Ok(())
            }
        }
    }

    // ------------- directives -------------

    fn lower_directive(&mut self, line: usize, directive: &Directive) -> Result<(), AssemblyError> {
        match directive {
            Directive::Text => {
                self.section = Section::Text;
                Ok(())
            }
            Directive::Data => {
                self.section = Section::Data;
                Ok(())
            }
            Directive::Global(_) => Ok(()),
            Directive::Align(alignment) => {
                self.require_data_section(line, ".align")?;
                self.data_offset = self.data_offset.next_multiple_of(*alignment);
                self.asm.reserve_data(self.data_offset);
                Ok(())
            }
            Directive::Skip(size) => {
                self.require_data_section(line, ".skip")?;
                self.data_offset += size;
                self.asm.reserve_data(self.data_offset);
                Ok(())
            }
            Directive::Word(exprs) => self.lower_data_exprs(line, exprs, 4),
            Directive::Half(exprs) => self.lower_data_exprs(line, exprs, 2),
            Directive::Byte(exprs) => self.lower_data_exprs(line, exprs, 1),
        }
    }

    fn require_data_section(&self, line: usize, what: &str) -> Result<(), AssemblyError> {
        if self.section != Section::Data {
            return Err(structural(
                line,
                format!("{} is only allowed in the .data section.", what),
            ));
        }
        Ok(())
    }

    fn lower_data_exprs(
        &mut self,
        line: usize,
        exprs: &[DataExpr],
        width: u8,
    ) -> Result<(), AssemblyError> {
        self.require_data_section(line, "Data emission")?;
        for expr in exprs {
            match expr {
                DataExpr::Value(value) => {
                    self.asm.save_data(self.data_offset, *value as u32, width);
                }
                DataExpr::Label(name) => {
                    if width != 4 {
                        return Err(structural(
                            line,
                            "Label-valued data must be word sized.".to_string(),
                        ));
                    }
                    self.asm.save_data_label(self.data_offset, name);
                }
            }
            self.data_offset += width as u32;
        }
        Ok(())
    }

    // ------------- instructions -------------

    fn lower_instruction(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
    ) -> Result<(), AssemblyError> {
        let no = self.instr_no;
        let mnemonic = instr.mnemonic.as_str();

        // family dispatch first, explicit mnemonics after
        if let Some(opcode) = alu_opcode(mnemonic) {
            return self.lower_alu(line, instr, opcode);
        }
        if let Some(opcode) = load_opcode(mnemonic) {
            return self.lower_load(line, instr, opcode);
        }
        if let Some(opcode) = store_opcode(mnemonic) {
            return self.lower_store(line, instr, opcode);
        }
        if let Some(icc) = branch_cond(mnemonic) {
            return self.lower_branch(line, instr, icc);
        }

        match mnemonic {
            "nop" => {
                self.expect_shape(line, instr, 0)?;
                self.asm.save_zero_operand_instr(no, Opcode::Nop);
                self.apply_predicate(line, instr)
            }
            "call" => match instr.operands.as_slice() {
                [AsmOperand::Ident(label)] => {
                    self.asm.save_call_instr(no, label.clone());
                    self.apply_predicate(line, instr)
                }
                _ => Err(structural(
                    line,
                    "Operand to a CALL instruction must be a label.".to_string(),
                )),
            },
            "sethi" => match instr.operands.as_slice() {
                [AsmOperand::Hi(label), AsmOperand::Reg(rd)] => {
                    self.asm.save_sethi_label_instr(no, *rd, label.clone());
                    self.apply_predicate(line, instr)
                }
                [AsmOperand::Imm(imm), AsmOperand::Reg(rd)] => {
                    self.asm.save_sethi_instr(no, *rd, *imm)?;
                    self.apply_predicate(line, instr)
                }
                _ => Err(structural(
                    line,
                    "Invalid operands to a SETHI instruction.".to_string(),
                )),
            },
            "jmpl" => {
                let (base, index, rd) = match instr.operands.as_slice() {
                    [AsmOperand::RegOffset(base, offset), AsmOperand::Reg(rd)] => {
                        (*base, self.address_index(line, Some(offset))?, *rd)
                    }
                    [AsmOperand::Reg(base), AsmOperand::Reg(rd)] => {
                        (*base, AddressIndex::Simm13(0), *rd)
                    }
                    _ => {
                        return Err(structural(
                            line,
                            "Invalid operands to a JMPL instruction.".to_string(),
                        ));
                    }
                };
                self.asm.save_addr_instr(no, Opcode::Jumpl, rd, base, index)?;
                self.apply_predicate(line, instr)
            }
            "rd" => match instr.operands.as_slice() {
                [AsmOperand::Y, AsmOperand::Reg(rd)] => {
                    self.asm.save_rd_instr(no, *rd);
                    self.apply_predicate(line, instr)
                }
                _ => Err(structural(
                    line,
                    "Source of an RD instruction must be the %y register.".to_string(),
                )),
            },
            "wr" => match instr.operands.as_slice() {
                [AsmOperand::Reg(rs1), second, AsmOperand::Y] => {
                    let index = match second {
                        AsmOperand::Reg(r) => AddressIndex::Reg(*r),
                        AsmOperand::Imm(v) => self.simm13_index(line, *v)?,
                        _ => {
                            return Err(structural(
                                line,
                                "Invalid second source of a WR instruction.".to_string(),
                            ));
                        }
                    };
                    self.asm.save_wr_instr(no, *rs1, index)?;
                    self.apply_predicate(line, instr)
                }
                _ => Err(structural(
                    line,
                    "Destination of a WR instruction must be the %y register.".to_string(),
                )),
            },
            "mov" => self.lower_mov(line, instr),
            "sel" => self.lower_sel(line, instr),
            "hwloop" => self.lower_hwloop(line, instr),
            "predbegin" => self.lower_predbegin(line, instr),
            "predend" => {
                let caps = self.asm.target().caps();
                if !caps.pred_blocks_cc && !caps.pred_blocks_reg {
                    return Err(self.unsupported("predicated blocks"));
                }
                self.expect_shape(line, instr, 0)?;
                self.asm.save_zero_operand_instr(no, Opcode::PredEnd);
                Ok(())
            }
            "predset" => self.lower_predset(line, instr),
            "predclear" => {
                if !self.asm.target().caps().pred_blocks_reg {
                    return Err(self.unsupported("predicate registers"));
                }
                match instr.operands.as_slice() {
                    [AsmOperand::Preg(preg)] => {
                        self.asm.save_pred_reg_instr(no, Opcode::PredClear, *preg);
                        Ok(())
                    }
                    _ => Err(structural(
                        line,
                        "Operand to a PREDCLEAR instruction must be a predicate register."
                            .to_string(),
                    )),
                }
            }
            "sim-printcycles" => {
                self.expect_shape(line, instr, 0)?;
                self.asm.save_zero_operand_instr(no, Opcode::CyclePrint);
                Ok(())
            }
            "sim-clearcycles" => {
                self.expect_shape(line, instr, 0)?;
                self.asm.save_zero_operand_instr(no, Opcode::CycleClear);
                Ok(())
            }
            // synthetic instructions
            "clr" => match instr.operands.as_slice() {
                [AsmOperand::Reg(rd)] => {
                    self.asm.save_reg_reg_instr(no, Opcode::Or, *rd, 0, 0);
                    self.apply_predicate(line, instr)
                }
                _ => Err(structural(
                    line,
                    "Operand to a CLR instruction must be a register.".to_string(),
                )),
            },
            "cmp" => match instr.operands.as_slice() {
                [AsmOperand::Reg(rs1), AsmOperand::Reg(rs2)] => {
                    self.asm.save_reg_reg_instr(no, Opcode::Subcc, 0, *rs1, *rs2);
                    self.apply_predicate(line, instr)
                }
                [AsmOperand::Reg(rs1), AsmOperand::Imm(imm)] => {
                    self.asm.save_reg_imm_instr(no, Opcode::Subcc, 0, *rs1, *imm)?;
                    self.apply_predicate(line, instr)
                }
                _ => Err(structural(
                    line,
                    "Invalid operands to a CMP instruction.".to_string(),
                )),
            },
            "ret" => {
                self.expect_shape(line, instr, 0)?;
                self.asm
                    .save_addr_instr(no, Opcode::Jumpl, 0, 31, AddressIndex::Simm13(8))?;
                Ok(())
            }
            "retl" => {
                self.expect_shape(line, instr, 0)?;
                self.asm
                    .save_addr_instr(no, Opcode::Jumpl, 0, 15, AddressIndex::Simm13(8))?;
                Ok(())
            }
            other => Err(structural(
                line,
                format!("Unknown instruction \"{}\".", other),
            )),
        }
    }

    // ------------- instruction families -------------

    fn lower_alu(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
        opcode: Opcode,
    ) -> Result<(), AssemblyError> {
        let no = self.instr_no;

        // bare restore is a synthetic form of restore %g0, %g0, %g0
        if opcode == Opcode::Restore && instr.operands.is_empty() {
            self.asm.save_reg_reg_instr(no, opcode, 0, 0, 0);
            return self.apply_predicate(line, instr);
        }

        match instr.operands.as_slice() {
            [AsmOperand::Reg(rs1), AsmOperand::Reg(rs2), AsmOperand::Reg(rd)] => {
                self.asm.save_reg_reg_instr(no, opcode, *rd, *rs1, *rs2);
            }
            [AsmOperand::Reg(rs1), AsmOperand::Imm(imm), AsmOperand::Reg(rd)] => {
                self.asm.save_reg_imm_instr(no, opcode, *rd, *rs1, *imm)?;
            }
            [AsmOperand::Reg(rs1), AsmOperand::Lo(label), AsmOperand::Reg(rd)] => {
                self.asm
                    .save_reg_label_instr(no, opcode, *rd, *rs1, label.clone());
            }
            _ => {
                return Err(structural(
                    line,
                    format!(
                        "Invalid operands to a {} instruction.",
                        instr.mnemonic.to_uppercase()
                    ),
                ));
            }
        }
        self.apply_predicate(line, instr)
    }

    fn lower_load(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
        opcode: Opcode,
    ) -> Result<(), AssemblyError> {
        let no = self.instr_no;
        match instr.operands.as_slice() {
            [AsmOperand::Addr(base, offset), AsmOperand::Reg(rd)] => {
                let index = self.address_index(line, offset.as_ref())?;
                self.asm.save_addr_instr(no, opcode, *rd, *base, index)?;
                self.apply_predicate(line, instr)
            }
            _ => Err(structural(
                line,
                format!(
                    "Invalid operands to a {} instruction.",
                    instr.mnemonic.to_uppercase()
                ),
            )),
        }
    }

    fn lower_store(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
        opcode: Opcode,
    ) -> Result<(), AssemblyError> {
        let no = self.instr_no;
        match instr.operands.as_slice() {
            [AsmOperand::Reg(src), AsmOperand::Addr(base, offset)] => {
                let index = self.address_index(line, offset.as_ref())?;
                self.asm.save_addr_instr(no, opcode, *src, *base, index)?;
                self.apply_predicate(line, instr)
            }
            _ => Err(structural(
                line,
                format!(
                    "Invalid operands to a {} instruction.",
                    instr.mnemonic.to_uppercase()
                ),
            )),
        }
    }

    fn lower_branch(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
        icc: CondCode,
    ) -> Result<(), AssemblyError> {
        match instr.operands.as_slice() {
            [AsmOperand::Ident(label)] => {
                self.asm.save_branch_instr(self.instr_no, icc, label.clone());
                self.apply_predicate(line, instr)
            }
            _ => Err(structural(
                line,
                "Operand to a branch instruction must be a label.".to_string(),
            )),
        }
    }

    fn lower_mov(&mut self, line: usize, instr: &SourceInstruction) -> Result<(), AssemblyError> {
        let no = self.instr_no;

        // with a condition tag this is the conditional-move extension,
        // without one the standard synthetic alias of or
        if let [Tag::Cond(icc)] = instr.tags.as_slice() {
            if !self.asm.target().caps().mov_cc {
                return Err(self.unsupported("conditional moves"));
            }
            return match instr.operands.as_slice() {
                [AsmOperand::Reg(rs), AsmOperand::Reg(rd)] => {
                    self.asm.save_movcc_instr(no, *rd, *rs, *icc);
                    Ok(())
                }
                _ => Err(structural(
                    line,
                    "Invalid operands to a MOV instruction.".to_string(),
                )),
            };
        }

        match instr.operands.as_slice() {
            [AsmOperand::Reg(rs), AsmOperand::Reg(rd)] => {
                self.asm.save_reg_reg_instr(no, Opcode::Or, *rd, 0, *rs);
            }
            [AsmOperand::Imm(imm), AsmOperand::Reg(rd)] => {
                self.asm.save_reg_imm_instr(no, Opcode::Or, *rd, 0, *imm)?;
            }
            [AsmOperand::Lo(label), AsmOperand::Reg(rd)] => {
                self.asm
                    .save_reg_label_instr(no, Opcode::Or, *rd, 0, label.clone());
            }
            _ => {
                return Err(structural(
                    line,
                    "Invalid operands to a MOV instruction.".to_string(),
                ));
            }
        }
        self.apply_predicate(line, instr)
    }

    fn lower_sel(&mut self, line: usize, instr: &SourceInstruction) -> Result<(), AssemblyError> {
        let no = self.instr_no;
        let [Tag::Cond(icc)] = instr.tags.as_slice() else {
            return Err(structural(
                line,
                "A SEL instruction requires a condition code tag.".to_string(),
            ));
        };
        if !self.asm.target().caps().sel_cc {
            return Err(self.unsupported("conditional selects"));
        }

        match instr.operands.as_slice() {
            [AsmOperand::Reg(rs1), AsmOperand::Reg(rs2), AsmOperand::Reg(rd)] => {
                self.asm.save_selcc_reg_reg_instr(no, *rd, *rs1, *rs2, *icc);
                Ok(())
            }
            [AsmOperand::Reg(rs1), AsmOperand::Imm(imm2), AsmOperand::Reg(rd)] => {
                self.asm
                    .save_selcc_reg_imm_instr(no, *rd, *rs1, *imm2, *icc)
            }
            [AsmOperand::Imm(imm1), AsmOperand::Imm(imm2), AsmOperand::Reg(rd)] => {
                self.asm
                    .save_selcc_imm_imm_instr(no, *rd, *imm1, *imm2, *icc)
            }
            _ => Err(structural(
                line,
                "Invalid operands to a SEL instruction.".to_string(),
            )),
        }
    }

    fn lower_hwloop(&mut self, line: usize, instr: &SourceInstruction) -> Result<(), AssemblyError> {
        let no = self.instr_no;
        if !self.asm.target().caps().hw_loops {
            return Err(self.unsupported("hardware loops"));
        }

        match instr.operands.as_slice() {
            [AsmOperand::Ident(sub)] if sub == "start" => {
                self.asm.save_zero_operand_instr(no, Opcode::HwloopStart);
                Ok(())
            }
            [AsmOperand::Ident(sub), AsmOperand::Ident(label), AsmOperand::LoopReg(lr)]
                if sub == "init" && matches!(lr, LoopReg::Start | LoopReg::End) =>
            {
                self.asm.save_hwloop_init_instr(no, *lr, label.clone());
                Ok(())
            }
            [AsmOperand::Ident(sub), AsmOperand::Reg(src), AsmOperand::LoopReg(LoopReg::Bound)]
                if sub == "init" =>
            {
                self.asm.save_hwloop_bound_reg_instr(no, *src);
                Ok(())
            }
            [AsmOperand::Ident(sub), AsmOperand::Imm(imm), AsmOperand::LoopReg(LoopReg::Bound)]
                if sub == "init" =>
            {
                self.asm.save_hwloop_bound_imm_instr(no, *imm)
            }
            _ => Err(structural(
                line,
                "Invalid operands to a HWLOOP instruction.".to_string(),
            )),
        }
    }

    fn lower_predbegin(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
    ) -> Result<(), AssemblyError> {
        let no = self.instr_no;
        let caps = self.asm.target().caps();
        if !instr.operands.is_empty() {
            return Err(structural(
                line,
                "A PREDBEGIN instruction takes no operands.".to_string(),
            ));
        }

        match instr.tags.as_slice() {
            [Tag::Cond(icc)] => {
                if !caps.pred_blocks_cc {
                    return Err(self.unsupported("predicated blocks on condition codes"));
                }
                self.asm.save_zero_operand_instr(no, Opcode::PredBegin);
                self.asm.add_icc_predicate(no, *icc)
            }
            [Tag::Preg(preg), tf @ (Tag::True | Tag::False)] => {
                if !caps.pred_blocks_reg {
                    return Err(self.unsupported("predicated blocks on predicate registers"));
                }
                self.asm.save_zero_operand_instr(no, Opcode::PredBegin);
                self.asm
                    .add_preg_predicate(no, *preg, *tf == Tag::True)
            }
            _ => Err(structural(
                line,
                "A PREDBEGIN instruction requires a [cc] or [%pN][t|f] condition.".to_string(),
            )),
        }
    }

    fn lower_predset(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
    ) -> Result<(), AssemblyError> {
        let no = self.instr_no;
        if !self.asm.target().caps().pred_blocks_reg {
            return Err(self.unsupported("predicate registers"));
        }
        let [AsmOperand::Preg(preg)] = instr.operands.as_slice() else {
            return Err(structural(
                line,
                "Operand to a PREDSET instruction must be a predicate register.".to_string(),
            ));
        };

        match instr.tags.as_slice() {
            [] => {
                self.asm.save_pred_reg_instr(no, Opcode::PredSet, *preg);
                Ok(())
            }
            [Tag::Cond(icc)] => {
                self.asm.save_pred_reg_instr(no, Opcode::PredSet, *preg);
                self.asm.add_icc_predicate(no, *icc)
            }
            _ => Err(structural(
                line,
                "Invalid condition tags on a PREDSET instruction.".to_string(),
            )),
        }
    }

    // ------------- helpers -------------

    fn expect_shape(
        &self,
        line: usize,
        instr: &SourceInstruction,
        operands: usize,
    ) -> Result<(), AssemblyError> {
        if instr.operands.len() != operands {
            return Err(structural(
                line,
                format!(
                    "A {} instruction takes {} operands.",
                    instr.mnemonic.to_uppercase(),
                    operands
                ),
            ));
        }
        Ok(())
    }

    fn simm13_index(&self, line: usize, value: i64) -> Result<AddressIndex, AssemblyError> {
        if !isa::is_simm13(value) {
            return Err(structural(
                line,
                format!("Value {} is no valid signed 13-bit immediate.", value),
            ));
        }
        Ok(AddressIndex::Simm13(value as i32))
    }

    fn address_index(
        &self,
        line: usize,
        offset: Option<&Offset>,
    ) -> Result<AddressIndex, AssemblyError> {
        match offset {
            None => Ok(AddressIndex::Simm13(0)),
            Some(Offset::Reg(r)) => Ok(AddressIndex::Reg(*r)),
            Some(Offset::Imm(v)) => self.simm13_index(line, *v),
            Some(Offset::Lo(label)) => Ok(AddressIndex::LowLabel(label.clone())),
        }
    }

    fn unsupported(&self, feature: &'static str) -> AssemblyError {
        AssemblyError::UnsupportedCapability {
            target: self.asm.target().name(),
            feature,
        }
    }

    /// Applies a `[cc]` or `[%pN][t|f]` suffix on a base instruction as an
    /// instruction-level predicate. No shipping target exports the
    /// corresponding capabilities, so in practice this rejects the suffix.
    fn apply_predicate(
        &mut self,
        line: usize,
        instr: &SourceInstruction,
    ) -> Result<(), AssemblyError> {
        let caps = self.asm.target().caps();
        match instr.tags.as_slice() {
            [] => Ok(()),
            [Tag::Cond(icc)] => {
                if !caps.pred_instrs_cc {
                    return Err(self.unsupported("predicated instructions on condition codes"));
                }
                self.asm.add_icc_predicate(self.instr_no, *icc)
            }
            [Tag::Preg(preg), tf @ (Tag::True | Tag::False)] => {
                if !caps.pred_instrs_reg {
                    return Err(self.unsupported("predicated instructions on predicate registers"));
                }
                self.asm
                    .add_preg_predicate(self.instr_no, *preg, *tf == Tag::True)
            }
            _ => Err(structural(
                line,
                "Invalid condition tags on this instruction.".to_string(),
            )),
        }
    }
}

// ------------- mnemonic tables -------------

fn alu_opcode(mnemonic: &str) -> Option<Opcode> {
    use Opcode::*;
    Some(match mnemonic {
        "and" => And,
        "andcc" => Andcc,
        "andn" => Andn,
        "andncc" => Andncc,
        "or" => Or,
        "orcc" => Orcc,
        "orn" => Orn,
        "orncc" => Orncc,
        "xor" => Xor,
        "xorcc" => Xorcc,
        "xnor" => Xnor,
        "xnorcc" => Xnorcc,
        "sll" => Sll,
        "srl" => Srl,
        "sra" => Sra,
        "add" => Add,
        "addcc" => Addcc,
        "addx" => Addx,
        "addxcc" => Addxcc,
        "taddcc" => Taddcc,
        "taddcctv" => Taddcctv,
        "sub" => Sub,
        "subcc" => Subcc,
        "subx" => Subx,
        "subxcc" => Subxcc,
        "tsubcc" => Tsubcc,
        "tsubcctv" => Tsubcctv,
        "mulscc" => Mulscc,
        "umul" => Umul,
        "smul" => Smul,
        "umulcc" => Umulcc,
        "smulcc" => Smulcc,
        "udiv" => Udiv,
        "sdiv" => Sdiv,
        "udivcc" => Udivcc,
        "sdivcc" => Sdivcc,
        "save" => Save,
        "restore" => Restore,
        _ => return None,
    })
}

fn load_opcode(mnemonic: &str) -> Option<Opcode> {
    use Opcode::*;
    Some(match mnemonic {
        "ldsb" => Ldsb,
        "ldsh" => Ldsh,
        "ldub" => Ldub,
        "lduh" => Lduh,
        "ld" => Ld,
        "ldd" => Ldd,
        "ldsba" => Ldsba,
        "ldsha" => Ldsha,
        "lduba" => Lduba,
        "lduha" => Lduha,
        "lda" => Lda,
        "ldda" => Ldda,
        "ldstub" => Ldstub,
        "ldstuba" => Ldstuba,
        "swap" => Swap,
        "swapa" => Swapa,
        _ => return None,
    })
}

fn store_opcode(mnemonic: &str) -> Option<Opcode> {
    use Opcode::*;
    Some(match mnemonic {
        "stb" => Stb,
        "sth" => Sth,
        "st" => St,
        "std" => Std,
        "stba" => Stba,
        "stha" => Stha,
        "sta" => Sta,
        "stda" => Stda,
        _ => return None,
    })
}

fn branch_cond(mnemonic: &str) -> Option<CondCode> {
    match mnemonic {
        "b" | "ba" => Some(CondCode::A),
        "bn" => Some(CondCode::N),
        "bne" | "bnz" => Some(CondCode::Ne),
        "be" | "bz" => Some(CondCode::E),
        "bg" => Some(CondCode::G),
        "ble" => Some(CondCode::Le),
        "bge" => Some(CondCode::Ge),
        "bl" => Some(CondCode::L),
        "bgu" => Some(CondCode::Gu),
        "bleu" => Some(CondCode::Leu),
        "bcc" => Some(CondCode::Cc),
        "bcs" => Some(CondCode::Cs),
        "bpos" => Some(CondCode::Pos),
        "bneg" => Some(CondCode::Neg),
        "bvc" => Some(CondCode::Vc),
        "bvs" => Some(CondCode::Vs),
        _ => None,
    }
}
