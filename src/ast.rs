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

//! Surface syntax tree produced by the parser. The lowering layer turns
//! these lines into the instruction model via the assembler's save-*
//! entry points.

use crate::isa::{CondCode, LoopReg};

// Represents a single line of code, which can have a label, a statement, or
// both.
#[derive(Debug, Clone, Default)]
pub struct AssemblyLine {
    pub line_number: usize,
    pub label: Option<String>,
    pub statement: Option<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Directive(Directive),
    Instruction(SourceInstruction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Text,                 // .text
    Data,                 // .data
    Align(u32),           // .align 4
    Word(Vec<DataExpr>),  // .word 0x0001, label, 3
    Half(Vec<DataExpr>),  // .half 0x0001, 0x0002
    Byte(Vec<DataExpr>),  // .byte 1, 2, 3
    Skip(u32),            // .skip 400
    Global(String),       // .global main (accepted, no effect)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataExpr {
    Value(i64),
    Label(String),
}

// One parsed instruction: a mnemonic, the bracketed condition/predicate
// tags that may follow it, and its operand list.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInstruction {
    pub mnemonic: String,
    pub tags: Vec<Tag>,
    pub operands: Vec<AsmOperand>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tag {
    Cond(CondCode), // [le]
    Preg(u8),       // [%p3]
    True,           // [t]
    False,          // [f]
}

// Represents all possible forms an operand of an instruction can take.
#[derive(Debug, Clone, PartialEq)]
pub enum AsmOperand {
    Reg(u8),                 // %o1
    Y,                       // %y
    Preg(u8),                // %p3
    LoopReg(LoopReg),        // %loops, %loope, %loopb
    Imm(i64),                // 0x10 or -4
    Ident(String),           // label or hwloop sub-mnemonic
    Hi(String),              // %hi(label)
    Lo(String),              // %lo(label)
    RegOffset(u8, Offset),   // %o7+8 (jmpl)
    Addr(u8, Option<Offset>), // [%fp-4], [%g1+%g2], [%l0]
}

#[derive(Debug, Clone, PartialEq)]
pub enum Offset {
    Imm(i64),
    Reg(u8),
    Lo(String),
}
