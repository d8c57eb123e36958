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

//! Two-stage toolchain for a SPARC V8 integer target with single-path ISA
//! extensions: an assembler producing a compact binary artifact and a
//! cycle-counting instruction-level simulator consuming it. Four target
//! variants share the instruction model; each owns its extension encoding.

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod isa;
pub mod parser;
pub mod simulator;
pub mod target;

use assembler::Assembler;
use errors::AssemblyError;
use target::TargetIsa;

/// Assembles a source text for the given target into the binary artifact:
/// parse, lower, resolve labels, encode and emit.
pub fn assemble(source: &str, target: &'static dyn TargetIsa) -> Result<Vec<u8>, AssemblyError> {
    let lines = parser::parse_source(source)?;
    let mut assembler = Assembler::new(target);
    assembler.assemble(&lines)
}
