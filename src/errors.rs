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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Syntax Error: {0}")]
    PestError(#[from] Box<pest::error::Error<crate::parser::Rule>>),

    #[error("Structural Error on line {line}: {reason}")]
    StructuralError { line: usize, reason: String },

    #[error("Label \"{0}\" already exists but must be unique")]
    DuplicateLabel(String),

    #[error("Unknown label \"{name}\"")]
    UnresolvedLabel { name: String },

    #[error("Value {value} is no valid {what}")]
    ImmediateOutOfRange { value: i64, what: &'static str },

    #[error("Displacement out of range for instruction number {instr_no}")]
    DisplacementOutOfRange { instr_no: u32 },

    #[error("Target \"{target}\" does not support {feature}")]
    UnsupportedCapability {
        target: &'static str,
        feature: &'static str,
    },

    #[error("Malformed operands for instruction number {instr_no}")]
    MalformedOperands { instr_no: u32 },
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Could not read from file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not read from file: unexpected end of input")]
    TruncatedBinary,

    #[error(
        "Target ID 0x{found:04x} not supported by current simulator (expected 0x{expected:04x})"
    )]
    TargetMismatch { found: u16, expected: u16 },

    #[error("Invalid instruction size {0}: has to be a multiple of 4")]
    InvalidInstructionSize(u32),

    #[error("Encountered unknown opcode at instruction number {instr_no}")]
    UnknownOpcode { instr_no: u32 },

    #[error("Instruction number {instr_no} does not address the %y register")]
    InvalidYRegister { instr_no: u32 },

    #[error("Unaligned {access} access at address 0x{addr:08x}")]
    UnalignedAccess { access: &'static str, addr: u32 },

    #[error("Memory access out of range at address 0x{addr:08x}")]
    AddressOutOfRange { addr: u32 },

    #[error("Encountered division by zero at instruction number {instr_no}")]
    DivisionByZero { instr_no: u32 },

    #[error("Program counter 0x{pc:08x} outside instruction memory")]
    PcOutOfRange { pc: u32 },
}
