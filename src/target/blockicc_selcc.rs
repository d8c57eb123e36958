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

//! SPARC V8 with conditional selects, predicated blocks on integer
//! condition codes and hardware loops.

use super::base::{decode_base, encode_base};
use super::ext;
use super::fields::{OP2_HWLOOP, OP2_PREDBLOCKS, OP2_SELCC, get_op, get_op2};
use super::{Caps, TargetIsa, extension_feature};
use crate::errors::{AssemblyError, SimulationError};
use crate::isa::{Instruction, Opcode};

pub struct SparcV8BlockIccSelcc;

impl TargetIsa for SparcV8BlockIccSelcc {
    fn name(&self) -> &'static str {
        "v8-blockicc-selcc"
    }

    fn target_id(&self) -> u16 {
        0x0003
    }

    fn caps(&self) -> Caps {
        Caps {
            sel_cc: true,
            hw_loops: true,
            pred_blocks_cc: true,
            ..Caps::default()
        }
    }

    fn encode(&self, instruction: &Instruction) -> Result<u32, AssemblyError> {
        if let Some(word) = encode_base(instruction)? {
            return Ok(word);
        }
        match instruction.opcode {
            Opcode::Sel => ext::encode_selcc(instruction),
            Opcode::HwloopInit | Opcode::HwloopStart => ext::encode_hwloop(instruction),
            Opcode::PredBegin | Opcode::PredEnd => ext::encode_predblocks_icc(instruction),
            _ => Err(AssemblyError::UnsupportedCapability {
                target: self.name(),
                feature: extension_feature(instruction.opcode),
            }),
        }
    }

    fn decode(&self, word: u32, instr_no: u32) -> Result<Instruction, SimulationError> {
        if let Some(decoded) = decode_base(word, instr_no)? {
            return Ok(decoded);
        }
        debug_assert_eq!(get_op(word), 0);
        match get_op2(word) {
            OP2_HWLOOP => ext::decode_hwloop(word, instr_no),
            OP2_SELCC => ext::decode_selcc(word, instr_no),
            OP2_PREDBLOCKS => ext::decode_predblocks_icc(word, instr_no),
            _ => Ok(Instruction::new(Opcode::Unknown, instr_no, vec![])),
        }
    }
}
