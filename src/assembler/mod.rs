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

//! Assembler core. Accumulates instructions, data and labels through the
//! save-* entry points while the frontend walks the source, resolves labels
//! in a single pass, and emits the binary artifact through the target's
//! encoder.

mod lower;

use std::collections::HashMap;

use crate::ast::AssemblyLine;
use crate::errors::AssemblyError;
use crate::isa::{
    self, CondCode, DataItem, DataValue, Instruction, LoopReg, Opcode, Operand,
};
use crate::target::TargetIsa;

/// Size of the binary artifact header in bytes: 2 bytes target id, 4 bytes
/// data memory size, 4 bytes instruction size.
pub const HEADER_SIZE: usize = 10;

/// Second operand of a load/store/jumpl address computation.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressIndex {
    Reg(u8),
    Simm13(i32),
    LowLabel(String),
}

pub struct Assembler {
    target: &'static dyn TargetIsa,
    instructions: Vec<Instruction>,
    data: Vec<DataItem>,
    labels: HashMap<String, u32>,
    /// Total size of the data segment, including trailing reserved space.
    data_size: u32,
}

impl Assembler {
    pub fn new(target: &'static dyn TargetIsa) -> Assembler {
        Assembler {
            target,
            instructions: Vec::new(),
            data: Vec::new(),
            labels: HashMap::new(),
            data_size: 0,
        }
    }

    pub fn target(&self) -> &'static dyn TargetIsa {
        self.target
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Runs the full pipeline over parsed source lines: lowering, label
    /// resolution and emission.
    pub fn assemble(&mut self, lines: &[AssemblyLine]) -> Result<Vec<u8>, AssemblyError> {
        lower::lower_lines(lines, self)?;
        self.check_labels()?;
        self.emit()
    }

    // ------------- labels and data -------------

    pub fn save_label(&mut self, address: u32, name: &str) -> Result<(), AssemblyError> {
        if self.labels.contains_key(name) {
            return Err(AssemblyError::DuplicateLabel(name.to_string()));
        }
        self.labels.insert(name.to_string(), address);
        Ok(())
    }

    pub fn save_data(&mut self, offset: u32, value: u32, width: u8) {
        self.data.push(DataItem {
            offset,
            value: DataValue::Word(value),
            width,
        });
        self.reserve_data(offset + width as u32);
    }

    /// Defers the value to the check-labels pass; label-valued data is
    /// always word sized.
    pub fn save_data_label(&mut self, offset: u32, label: &str) {
        self.data.push(DataItem {
            offset,
            value: DataValue::Label(label.to_string()),
            width: 4,
        });
        self.reserve_data(offset + 4);
    }

    /// Extends the data segment to at least `end` bytes (skip and align
    /// directives reserve space without emitting items).
    pub fn reserve_data(&mut self, end: u32) {
        self.data_size = self.data_size.max(end);
    }

    // ------------- instruction save entry points -------------

    fn save_instruction(&mut self, opcode: Opcode, instr_no: u32, operands: Vec<Operand>) {
        self.instructions.push(Instruction::new(opcode, instr_no, operands));
    }

    pub fn save_branch_instr(&mut self, instr_no: u32, icc: CondCode, label: String) {
        self.save_instruction(
            Opcode::Branch,
            instr_no,
            vec![Operand::Label(label), Operand::Icc(icc)],
        );
    }

    pub fn save_call_instr(&mut self, instr_no: u32, label: String) {
        self.save_instruction(Opcode::Call, instr_no, vec![Operand::Label(label)]);
    }

    pub fn save_reg_reg_instr(
        &mut self,
        instr_no: u32,
        opcode: Opcode,
        dest_reg: u8,
        src_reg1: u8,
        src_reg2: u8,
    ) {
        self.save_instruction(
            opcode,
            instr_no,
            vec![
                Operand::Reg(dest_reg),
                Operand::Reg(src_reg1),
                Operand::Reg(src_reg2),
            ],
        );
    }

    pub fn save_reg_imm_instr(
        &mut self,
        instr_no: u32,
        opcode: Opcode,
        dest_reg: u8,
        src_reg1: u8,
        src_imm2: i64,
    ) -> Result<(), AssemblyError> {
        if !isa::is_simm13(src_imm2) {
            return Err(AssemblyError::ImmediateOutOfRange {
                value: src_imm2,
                what: "signed 13-bit immediate",
            });
        }
        self.save_instruction(
            opcode,
            instr_no,
            vec![
                Operand::Reg(dest_reg),
                Operand::Reg(src_reg1),
                Operand::Simm13(src_imm2 as i32),
            ],
        );
        Ok(())
    }

    /// The immediate is the lower 10 bits of the label's address, resolved
    /// by the check-labels pass.
    pub fn save_reg_label_instr(
        &mut self,
        instr_no: u32,
        opcode: Opcode,
        dest_reg: u8,
        src_reg1: u8,
        label: String,
    ) {
        self.save_instruction(
            opcode,
            instr_no,
            vec![
                Operand::Reg(dest_reg),
                Operand::Reg(src_reg1),
                Operand::LowLabel(label),
            ],
        );
    }

    pub fn save_sethi_instr(
        &mut self,
        instr_no: u32,
        dest_reg: u8,
        imm22: i64,
    ) -> Result<(), AssemblyError> {
        if !isa::is_uimm22(imm22) {
            return Err(AssemblyError::ImmediateOutOfRange {
                value: imm22,
                what: "unsigned 22-bit immediate",
            });
        }
        self.save_instruction(
            Opcode::Sethi,
            instr_no,
            vec![Operand::Reg(dest_reg), Operand::Imm22(imm22 as i32)],
        );
        Ok(())
    }

    /// The immediate is the upper 22 bits of the label's address, resolved
    /// by the check-labels pass.
    pub fn save_sethi_label_instr(&mut self, instr_no: u32, dest_reg: u8, label: String) {
        self.save_instruction(
            Opcode::Sethi,
            instr_no,
            vec![Operand::Reg(dest_reg), Operand::HiLabel(label)],
        );
    }

    pub fn save_addr_instr(
        &mut self,
        instr_no: u32,
        opcode: Opcode,
        dest_reg: u8,
        base_reg: u8,
        index: AddressIndex,
    ) -> Result<(), AssemblyError> {
        let second = match index {
            AddressIndex::Reg(r) => Operand::Reg(r),
            AddressIndex::Simm13(v) => {
                if !isa::is_simm13(v as i64) {
                    return Err(AssemblyError::ImmediateOutOfRange {
                        value: v as i64,
                        what: "signed 13-bit immediate",
                    });
                }
                Operand::Simm13(v)
            }
            AddressIndex::LowLabel(l) => Operand::LowLabel(l),
        };
        self.save_instruction(
            opcode,
            instr_no,
            vec![Operand::Reg(dest_reg), Operand::Reg(base_reg), second],
        );
        Ok(())
    }

    pub fn save_rd_instr(&mut self, instr_no: u32, dest_reg: u8) {
        self.save_instruction(
            Opcode::Rd,
            instr_no,
            vec![Operand::Reg(dest_reg), Operand::Y],
        );
    }

    pub fn save_wr_instr(
        &mut self,
        instr_no: u32,
        src_reg1: u8,
        index: AddressIndex,
    ) -> Result<(), AssemblyError> {
        let second = match index {
            AddressIndex::Reg(r) => Operand::Reg(r),
            AddressIndex::Simm13(v) => {
                if !isa::is_simm13(v as i64) {
                    return Err(AssemblyError::ImmediateOutOfRange {
                        value: v as i64,
                        what: "signed 13-bit immediate",
                    });
                }
                Operand::Simm13(v)
            }
            AddressIndex::LowLabel(l) => Operand::LowLabel(l),
        };
        self.save_instruction(
            Opcode::Wr,
            instr_no,
            vec![Operand::Y, Operand::Reg(src_reg1), second],
        );
        Ok(())
    }

    pub fn save_movcc_instr(&mut self, instr_no: u32, dest_reg: u8, sel_reg: u8, icc: CondCode) {
        self.save_instruction(
            Opcode::Mov,
            instr_no,
            vec![
                Operand::Reg(dest_reg),
                Operand::Reg(sel_reg),
                Operand::Icc(icc),
            ],
        );
    }

    pub fn save_selcc_reg_reg_instr(
        &mut self,
        instr_no: u32,
        dest_reg: u8,
        sel_reg1: u8,
        sel_reg2: u8,
        icc: CondCode,
    ) {
        self.save_instruction(
            Opcode::Sel,
            instr_no,
            vec![
                Operand::Reg(dest_reg),
                Operand::Reg(sel_reg1),
                Operand::Reg(sel_reg2),
                Operand::Icc(icc),
            ],
        );
    }

    pub fn save_selcc_reg_imm_instr(
        &mut self,
        instr_no: u32,
        dest_reg: u8,
        sel_reg1: u8,
        sel_simm2: i64,
        icc: CondCode,
    ) -> Result<(), AssemblyError> {
        if !isa::is_simm11(sel_simm2) {
            return Err(AssemblyError::ImmediateOutOfRange {
                value: sel_simm2,
                what: "signed 11-bit immediate",
            });
        }
        self.save_instruction(
            Opcode::Sel,
            instr_no,
            vec![
                Operand::Reg(dest_reg),
                Operand::Reg(sel_reg1),
                Operand::Simm11(sel_simm2 as i32),
                Operand::Icc(icc),
            ],
        );
        Ok(())
    }

    pub fn save_selcc_imm_imm_instr(
        &mut self,
        instr_no: u32,
        dest_reg: u8,
        sel_simm1: i64,
        sel_simm2: i64,
        icc: CondCode,
    ) -> Result<(), AssemblyError> {
        for imm in [sel_simm1, sel_simm2] {
            if !isa::is_simm8(imm) {
                return Err(AssemblyError::ImmediateOutOfRange {
                    value: imm,
                    what: "signed 8-bit immediate",
                });
            }
        }
        self.save_instruction(
            Opcode::Sel,
            instr_no,
            vec![
                Operand::Reg(dest_reg),
                Operand::Simm8(sel_simm1 as i32),
                Operand::Simm8(sel_simm2 as i32),
                Operand::Icc(icc),
            ],
        );
        Ok(())
    }

    pub fn save_zero_operand_instr(&mut self, instr_no: u32, opcode: Opcode) {
        self.save_instruction(opcode, instr_no, vec![]);
    }

    pub fn save_hwloop_init_instr(&mut self, instr_no: u32, loop_reg: LoopReg, label: String) {
        self.save_instruction(
            Opcode::HwloopInit,
            instr_no,
            vec![Operand::LoopReg(loop_reg), Operand::Label(label)],
        );
    }

    pub fn save_hwloop_bound_reg_instr(&mut self, instr_no: u32, src_reg: u8) {
        self.save_instruction(
            Opcode::HwloopInit,
            instr_no,
            vec![Operand::LoopReg(LoopReg::Bound), Operand::Reg(src_reg)],
        );
    }

    pub fn save_hwloop_bound_imm_instr(
        &mut self,
        instr_no: u32,
        src_imm: i64,
    ) -> Result<(), AssemblyError> {
        if !isa::is_imm22(src_imm) {
            return Err(AssemblyError::ImmediateOutOfRange {
                value: src_imm,
                what: "signed 22-bit immediate",
            });
        }
        self.save_instruction(
            Opcode::HwloopInit,
            instr_no,
            vec![
                Operand::LoopReg(LoopReg::Bound),
                Operand::Imm22(src_imm as i32),
            ],
        );
        Ok(())
    }

    pub fn save_pred_reg_instr(&mut self, instr_no: u32, opcode: Opcode, preg: u8) {
        self.save_instruction(opcode, instr_no, vec![Operand::Preg(preg)]);
    }

    // ------------- instruction predicates -------------

    /// Appends an integer-condition predicate to the last recorded
    /// instruction, which must carry the given instruction number.
    pub fn add_icc_predicate(&mut self, instr_no: u32, icc: CondCode) -> Result<(), AssemblyError> {
        let last = self.last_instruction(instr_no)?;
        last.operands.push(Operand::Icc(icc));
        Ok(())
    }

    /// Appends a predicate-register predicate to the last recorded
    /// instruction, which must carry the given instruction number.
    pub fn add_preg_predicate(
        &mut self,
        instr_no: u32,
        preg: u8,
        tf: bool,
    ) -> Result<(), AssemblyError> {
        let last = self.last_instruction(instr_no)?;
        last.operands.push(Operand::Preg(preg));
        last.operands.push(Operand::Tf(tf));
        Ok(())
    }

    fn last_instruction(&mut self, instr_no: u32) -> Result<&mut Instruction, AssemblyError> {
        match self.instructions.last_mut() {
            Some(ins) if ins.instr_no == instr_no => Ok(ins),
            _ => Err(AssemblyError::MalformedOperands { instr_no }),
        }
    }

    // ------------- label resolution -------------

    /// Single pass over all instructions and data items, replacing label
    /// operands by their resolved addresses. Unresolved labels are fatal.
    pub fn check_labels(&mut self) -> Result<(), AssemblyError> {
        for (counter, instruction) in self.instructions.iter_mut().enumerate() {
            if instruction.instr_no != counter as u32 {
                eprintln!("Warning: wrong instruction counter value!");
            }
            for operand in &mut instruction.operands {
                let resolved = match operand {
                    Operand::Label(name) => {
                        Operand::LabelAddress(Self::lookup(&self.labels, name)?)
                    }
                    Operand::HiLabel(name) => {
                        let address = Self::lookup(&self.labels, name)?;
                        Operand::Imm22(((address >> 10) & 0x3f_ffff) as i32)
                    }
                    Operand::LowLabel(name) => {
                        let address = Self::lookup(&self.labels, name)?;
                        Operand::Simm13((address & 0x3ff) as i32)
                    }
                    _ => continue,
                };
                *operand = resolved;
            }
        }

        for item in &mut self.data {
            if let DataValue::Label(name) = &item.value {
                let address = Self::lookup(&self.labels, name)?;
                item.value = DataValue::Word(address);
            }
        }

        Ok(())
    }

    fn lookup(labels: &HashMap<String, u32>, name: &str) -> Result<u32, AssemblyError> {
        labels
            .get(name)
            .copied()
            .ok_or_else(|| AssemblyError::UnresolvedLabel {
                name: name.to_string(),
            })
    }

    // ------------- emission -------------

    /// Serializes the binary artifact: the 10-byte header, the zero-gap
    /// filled data segment and one big-endian word per instruction. The
    /// header's size fields are patched in after both bodies are emitted.
    pub fn emit(&self) -> Result<Vec<u8>, AssemblyError> {
        let mut out = vec![0u8; HEADER_SIZE];

        // data segment, zero-filling the gaps between items
        let mut last_end = 0u32;
        for item in &self.data {
            debug_assert!(item.offset >= last_end, "data items out of order");
            for _ in last_end..item.offset {
                out.push(0);
            }
            let DataValue::Word(value) = &item.value else {
                unreachable!("labels resolved before emission");
            };
            let bytes = value.to_be_bytes();
            out.extend_from_slice(&bytes[4 - item.width as usize..]);
            last_end = item.offset + item.width as u32;
        }
        // trailing space reserved by skip/align directives
        for _ in last_end..self.data_size {
            out.push(0);
        }
        let data_length = (out.len() - HEADER_SIZE) as u32;

        // text segment, one 4-byte big-endian word per instruction
        for instruction in &self.instructions {
            let word = self.target.encode(instruction)?;
            out.extend_from_slice(&word.to_be_bytes());
        }
        let instruction_length = (out.len() - HEADER_SIZE) as u32 - data_length;

        // patch the header now that both lengths are known
        out[0..2].copy_from_slice(&self.target.target_id().to_be_bytes());
        out[2..6].copy_from_slice(&data_length.to_be_bytes());
        out[6..10].copy_from_slice(&instruction_length.to_be_bytes());

        Ok(out)
    }
}

// ------------- unit tests -------------
