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

//! The unmodified SPARC V8 integer target. No extensions; the extension
//! op2 space decodes to the unknown opcode.

use super::base::{decode_base, encode_base};
use super::{Caps, TargetIsa, extension_feature};
use crate::errors::{AssemblyError, SimulationError};
use crate::isa::{Instruction, Opcode};

pub struct SparcV8;

impl TargetIsa for SparcV8 {
    fn name(&self) -> &'static str {
        "v8"
    }

    fn target_id(&self) -> u16 {
        0x0001
    }

    fn caps(&self) -> Caps {
        Caps::default()
    }

    fn encode(&self, instruction: &Instruction) -> Result<u32, AssemblyError> {
        encode_base(instruction)?.ok_or(AssemblyError::UnsupportedCapability {
            target: self.name(),
            feature: extension_feature(instruction.opcode),
        })
    }

    fn decode(&self, word: u32, instr_no: u32) -> Result<Instruction, SimulationError> {
        Ok(decode_base(word, instr_no)?
            .unwrap_or_else(|| Instruction::new(Opcode::Unknown, instr_no, vec![])))
    }
}
