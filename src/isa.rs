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

//! Target-neutral instruction model shared by the assembler's encoders and
//! the simulator's decoders. Encoding and decoding are inverse functions on
//! the types defined here.

/// Integer condition codes, numbered as in the SPARC V8 branch encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CondCode {
    N = 0,
    E = 1,
    Le = 2,
    L = 3,
    Leu = 4,
    Cs = 5,
    Neg = 6,
    Vs = 7,
    A = 8,
    Ne = 9,
    G = 10,
    Ge = 11,
    Gu = 12,
    Cc = 13,
    Pos = 14,
    Vc = 15,
}

impl CondCode {
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// All 16 encodings are defined, so decoding is total.
    pub fn from_bits(bits: u32) -> CondCode {
        use CondCode::*;
        match bits & 0xf {
            0 => N,
            1 => E,
            2 => Le,
            3 => L,
            4 => Leu,
            5 => Cs,
            6 => Neg,
            7 => Vs,
            8 => A,
            9 => Ne,
            10 => G,
            11 => Ge,
            12 => Gu,
            13 => Cc,
            14 => Pos,
            15 => Vc,
            _ => unreachable!(),
        }
    }

    /// Mnemonic suffix as used by branches and condition tags.
    pub fn suffix(self) -> &'static str {
        use CondCode::*;
        match self {
            N => "n",
            E => "e",
            Le => "le",
            L => "l",
            Leu => "leu",
            Cs => "cs",
            Neg => "neg",
            Vs => "vs",
            A => "a",
            Ne => "ne",
            G => "g",
            Ge => "ge",
            Gu => "gu",
            Cc => "cc",
            Pos => "pos",
            Vc => "vc",
        }
    }

    pub fn from_suffix(s: &str) -> Option<CondCode> {
        use CondCode::*;
        Some(match s {
            "n" => N,
            "e" | "z" => E,
            "le" => Le,
            "l" => L,
            "leu" => Leu,
            "cs" => Cs,
            "neg" => Neg,
            "vs" => Vs,
            "a" => A,
            "ne" | "nz" => Ne,
            "g" => G,
            "ge" => Ge,
            "gu" => Gu,
            "cc" => Cc,
            "pos" => Pos,
            "vc" => Vc,
            _ => return None,
        })
    }
}

/// Hardware-loop register selectors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopReg {
    /// %loops - first instruction of the loop body.
    Start,
    /// %loope - first instruction following the loop body.
    End,
    /// %loopb - iteration bound.
    Bound,
}

/// One instruction operand. The tag pattern of an instruction's operand
/// vector is determined by its opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// General-purpose register number (0..31).
    Reg(u8),
    /// The %y register.
    Y,
    /// Predicate register number (0..15).
    Preg(u8),
    /// 13-bit signed immediate.
    Simm13(i32),
    /// 11-bit signed immediate (selcc only).
    Simm11(i32),
    /// 8-bit signed immediate (selcc only).
    Simm8(i32),
    /// 22-bit immediate (sethi, hwloop bound).
    Imm22(i32),
    /// Unresolved label reference (branch, call, hwloop init, .word).
    Label(String),
    /// Unresolved label whose upper 22 address bits are wanted (sethi).
    HiLabel(String),
    /// Unresolved label whose lower 10 address bits are wanted.
    LowLabel(String),
    /// Resolved label: an instruction index or a data byte offset.
    LabelAddress(u32),
    /// Hardware-loop register selector.
    LoopReg(LoopReg),
    /// Integer condition code.
    Icc(CondCode),
    /// True/false selector of a predicate register read.
    Tf(bool),
}

impl Operand {
    pub fn reg(&self) -> Option<u8> {
        match self {
            Operand::Reg(r) => Some(*r),
            _ => None,
        }
    }

    pub fn label_address(&self) -> Option<u32> {
        match self {
            Operand::LabelAddress(a) => Some(*a),
            _ => None,
        }
    }

    pub fn icc(&self) -> Option<CondCode> {
        match self {
            Operand::Icc(cc) => Some(*cc),
            _ => None,
        }
    }
}

/// Every opcode known to the toolchain: the SPARC V8 integer base set, the
/// single-path extension instructions and the two simulator intrinsics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Opcode {
    // simulator intrinsics (UNIMP encoding space)
    CyclePrint,
    CycleClear,
    // control transfer
    Call,
    Branch,
    Jumpl,
    // sethi / nop
    Sethi,
    Nop,
    // loads
    Ldsb,
    Ldsh,
    Ldub,
    Lduh,
    Ld,
    Ldd,
    Ldsba,
    Ldsha,
    Lduba,
    Lduha,
    Lda,
    Ldda,
    // stores
    Stb,
    Sth,
    St,
    Std,
    Stba,
    Stha,
    Sta,
    Stda,
    // atomics (accepted, not executed)
    Ldstub,
    Ldstuba,
    Swap,
    Swapa,
    // logic
    And,
    Andcc,
    Andn,
    Andncc,
    Or,
    Orcc,
    Orn,
    Orncc,
    Xor,
    Xorcc,
    Xnor,
    Xnorcc,
    // shifts
    Sll,
    Srl,
    Sra,
    // add/sub
    Add,
    Addcc,
    Addx,
    Addxcc,
    Taddcc,
    Taddcctv,
    Sub,
    Subcc,
    Subx,
    Subxcc,
    Tsubcc,
    Tsubcctv,
    // multiply/divide
    Mulscc,
    Umul,
    Smul,
    Umulcc,
    Smulcc,
    Udiv,
    Sdiv,
    Udivcc,
    Sdivcc,
    // register windows
    Save,
    Restore,
    // control registers
    Rd,
    Wr,
    // extensions
    Mov,
    Sel,
    HwloopInit,
    HwloopStart,
    PredBegin,
    PredEnd,
    PredSet,
    PredClear,
    // decoder fallback, fatal when executed
    Unknown,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            CyclePrint => "sim-printcycles",
            CycleClear => "sim-clearcycles",
            Call => "call",
            Branch => "b",
            Jumpl => "jmpl",
            Sethi => "sethi",
            Nop => "nop",
            Ldsb => "ldsb",
            Ldsh => "ldsh",
            Ldub => "ldub",
            Lduh => "lduh",
            Ld => "ld",
            Ldd => "ldd",
            Ldsba => "ldsba",
            Ldsha => "ldsha",
            Lduba => "lduba",
            Lduha => "lduha",
            Lda => "lda",
            Ldda => "ldda",
            Stb => "stb",
            Sth => "sth",
            St => "st",
            Std => "std",
            Stba => "stba",
            Stha => "stha",
            Sta => "sta",
            Stda => "stda",
            Ldstub => "ldstub",
            Ldstuba => "ldstuba",
            Swap => "swap",
            Swapa => "swapa",
            And => "and",
            Andcc => "andcc",
            Andn => "andn",
            Andncc => "andncc",
            Or => "or",
            Orcc => "orcc",
            Orn => "orn",
            Orncc => "orncc",
            Xor => "xor",
            Xorcc => "xorcc",
            Xnor => "xnor",
            Xnorcc => "xnorcc",
            Sll => "sll",
            Srl => "srl",
            Sra => "sra",
            Add => "add",
            Addcc => "addcc",
            Addx => "addx",
            Addxcc => "addxcc",
            Taddcc => "taddcc",
            Taddcctv => "taddcctv",
            Sub => "sub",
            Subcc => "subcc",
            Subx => "subx",
            Subxcc => "subxcc",
            Tsubcc => "tsubcc",
            Tsubcctv => "tsubcctv",
            Mulscc => "mulscc",
            Umul => "umul",
            Smul => "smul",
            Umulcc => "umulcc",
            Smulcc => "smulcc",
            Udiv => "udiv",
            Sdiv => "sdiv",
            Udivcc => "udivcc",
            Sdivcc => "sdivcc",
            Save => "save",
            Restore => "restore",
            Rd => "rd",
            Wr => "wr",
            Mov => "mov",
            Sel => "sel",
            HwloopInit => "hwloop init",
            HwloopStart => "hwloop start",
            PredBegin => "predbegin",
            PredEnd => "predend",
            PredSet => "predset",
            PredClear => "predclear",
            Unknown => "unknown",
        }
    }

    /// True for all load/store/atomic opcodes (instruction format 3 with
    /// op = 3).
    pub fn is_memory(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            Ldsb | Ldsh
                | Ldub
                | Lduh
                | Ld
                | Ldd
                | Ldsba
                | Ldsha
                | Lduba
                | Lduha
                | Lda
                | Ldda
                | Stb
                | Sth
                | St
                | Std
                | Stba
                | Stha
                | Sta
                | Stda
                | Ldstub
                | Ldstuba
                | Swap
                | Swapa
        )
    }
}

/// One decoded or assembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Zero-based index within the text segment.
    pub instr_no: u32,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, instr_no: u32, operands: Vec<Operand>) -> Instruction {
        Instruction {
            opcode,
            instr_no,
            operands,
        }
    }
}

/// The payload of one data-segment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    Word(u32),
    /// Resolved to the label's address during the check-labels pass.
    Label(String),
}

/// One data-segment entry. Gaps between consecutive entries are zero-filled
/// at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    /// Byte offset within the data segment.
    pub offset: u32,
    pub value: DataValue,
    /// Byte width, one of 1, 2 or 4.
    pub width: u8,
}

// ------------- immediate range checks -------------

pub fn is_simm13(value: i64) -> bool {
    (-4096..4096).contains(&value)
}

pub fn is_simm11(value: i64) -> bool {
    (-1024..1024).contains(&value)
}

pub fn is_simm8(value: i64) -> bool {
    (-128..128).contains(&value)
}

pub fn is_uimm22(value: i64) -> bool {
    (0..(1 << 22)).contains(&value)
}

pub fn is_imm22(value: i64) -> bool {
    (-2097152..2097152).contains(&value)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cond_code_round_trip() {
        for bits in 0..16 {
            let cc = CondCode::from_bits(bits);
            assert_eq!(cc.bits(), bits);
            assert_eq!(CondCode::from_suffix(cc.suffix()), Some(cc));
        }
    }

    #[test]
    fn test_cond_code_encoding_values() {
        assert_eq!(CondCode::A.bits(), 8);
        assert_eq!(CondCode::N.bits(), 0);
        assert_eq!(CondCode::Ne.bits(), 9);
        assert_eq!(CondCode::E.bits(), 1);
        assert_eq!(CondCode::Vc.bits(), 15);
    }

    #[test]
    fn test_immediate_ranges() {
        assert!(is_simm13(-4096) && is_simm13(4095));
        assert!(!is_simm13(4096) && !is_simm13(-4097));
        assert!(is_simm11(-1024) && is_simm11(1023));
        assert!(!is_simm11(1024));
        assert!(is_simm8(-128) && is_simm8(127));
        assert!(!is_simm8(128));
        assert!(is_uimm22(0) && is_uimm22((1 << 22) - 1));
        assert!(!is_uimm22(-1) && !is_uimm22(1 << 22));
        assert!(is_imm22(-2097152) && is_imm22(2097151));
    }
}
