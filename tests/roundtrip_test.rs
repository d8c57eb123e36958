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

//! Decoding an emitted binary must reproduce the assembler's resolved
//! instruction stream exactly, for every target.

use sparcx::assemble;
use sparcx::isa::{CondCode, Instruction, Opcode, Operand};
use sparcx::simulator::Simulator;
use sparcx::target;

fn roundtrip(target_name: &str, source: &str) -> Vec<Instruction> {
    let target = target::by_name(target_name).unwrap();
    let binary = assemble(source, target).unwrap();
    let simulator = Simulator::load(&mut binary.as_slice(), target).unwrap();
    simulator.instructions().to_vec()
}

fn ins(opcode: Opcode, instr_no: u32, operands: Vec<Operand>) -> Instruction {
    Instruction::new(opcode, instr_no, operands)
}

#[test]
fn test_base_instructions_round_trip() {
    use Operand::*;

    let source = "\
main:	nop
	sethi 0x3f, %g1
	add %g1, %g2, %g3
	sub %o1, -4, %o2
	and %l3, 0x7f, %l4
	sra %i1, 3, %i2
	ld [%fp-8], %l0
	stb %l0, [%g1+%g2]
	lduh [%g1], %o3
	save %sp, -96, %sp
	restore %g0, %g0, %g0
	rd %y, %o4
	wr %g1, %o5, %y
	umulcc %g1, %g2, %g3
	sdiv %o0, %o1, %o2
	jmpl %o7+8, %g0
	call main
	ba main
	bne main
	sim-printcycles
	sim-clearcycles
";
    let decoded = roundtrip("v8", source);

    let expected = vec![
        ins(Opcode::Nop, 0, vec![]),
        ins(Opcode::Sethi, 1, vec![Reg(1), Imm22(0x3f)]),
        ins(Opcode::Add, 2, vec![Reg(3), Reg(1), Reg(2)]),
        ins(Opcode::Sub, 3, vec![Reg(10), Reg(9), Simm13(-4)]),
        ins(Opcode::And, 4, vec![Reg(20), Reg(19), Simm13(0x7f)]),
        ins(Opcode::Sra, 5, vec![Reg(26), Reg(25), Simm13(3)]),
        ins(Opcode::Ld, 6, vec![Reg(16), Reg(30), Simm13(-8)]),
        ins(Opcode::Stb, 7, vec![Reg(16), Reg(1), Reg(2)]),
        ins(Opcode::Lduh, 8, vec![Reg(11), Reg(1), Simm13(0)]),
        ins(Opcode::Save, 9, vec![Reg(14), Reg(14), Simm13(-96)]),
        ins(Opcode::Restore, 10, vec![Reg(0), Reg(0), Reg(0)]),
        ins(Opcode::Rd, 11, vec![Reg(12), Y]),
        ins(Opcode::Wr, 12, vec![Y, Reg(1), Reg(13)]),
        ins(Opcode::Umulcc, 13, vec![Reg(3), Reg(1), Reg(2)]),
        ins(Opcode::Sdiv, 14, vec![Reg(10), Reg(8), Reg(9)]),
        ins(Opcode::Jumpl, 15, vec![Reg(0), Reg(15), Simm13(8)]),
        ins(Opcode::Call, 16, vec![LabelAddress(0)]),
        ins(Opcode::Branch, 17, vec![LabelAddress(0), Icc(CondCode::A)]),
        ins(Opcode::Branch, 18, vec![LabelAddress(0), Icc(CondCode::Ne)]),
        ins(Opcode::CyclePrint, 19, vec![]),
        ins(Opcode::CycleClear, 20, vec![]),
    ];

    assert_eq!(decoded, expected);
}

#[test]
fn test_selcc_and_hwloop_round_trip() {
    use Operand::*;

    let source = "\
main:	sel[le] %o0, %o1, %o2
	sel[gu] %l1, -100, %l2
	sel[e] -5, 7, %g4
	hwloop init body, %loops
	hwloop init after, %loope
	hwloop init 1000, %loopb
	hwloop init %i0, %loopb
	hwloop start
body:	nop
	nop
after:	nop
";
    let decoded = roundtrip("v8-blockicc-selcc", source);

    let expected = vec![
        ins(
            Opcode::Sel,
            0,
            vec![Reg(10), Reg(8), Reg(9), Icc(CondCode::Le)],
        ),
        ins(
            Opcode::Sel,
            1,
            vec![Reg(18), Reg(17), Simm11(-100), Icc(CondCode::Gu)],
        ),
        ins(
            Opcode::Sel,
            2,
            vec![Reg(4), Simm8(-5), Simm8(7), Icc(CondCode::E)],
        ),
        ins(
            Opcode::HwloopInit,
            3,
            vec![LoopReg(sparcx::isa::LoopReg::Start), LabelAddress(8)],
        ),
        ins(
            Opcode::HwloopInit,
            4,
            vec![LoopReg(sparcx::isa::LoopReg::End), LabelAddress(10)],
        ),
        ins(
            Opcode::HwloopInit,
            5,
            vec![LoopReg(sparcx::isa::LoopReg::Bound), Imm22(1000)],
        ),
        ins(Opcode::HwloopInit, 6, vec![LoopReg(sparcx::isa::LoopReg::Bound), Reg(24)]),
        ins(Opcode::HwloopStart, 7, vec![]),
        ins(Opcode::Nop, 8, vec![]),
        ins(Opcode::Nop, 9, vec![]),
        ins(Opcode::Nop, 10, vec![]),
    ];

    assert_eq!(decoded, expected);
}

#[test]
fn test_predblock_icc_round_trip() {
    use Operand::*;

    let source = "predbegin[leu]\nnop\npredend\n";
    let decoded = roundtrip("v8-blockicc-selcc", source);

    let expected = vec![
        ins(Opcode::PredBegin, 0, vec![Icc(CondCode::Leu)]),
        ins(Opcode::Nop, 1, vec![]),
        ins(Opcode::PredEnd, 2, vec![]),
    ];
    assert_eq!(decoded, expected);
}

#[test]
fn test_predblock_preg_round_trip() {
    use Operand::*;

    let source = "\
	predset %p3
	predset[l] %p15
	predclear %p3
	predbegin[%p15][t]
	nop
	predend
	predbegin[%p2][f]
	nop
	predend
";
    let decoded = roundtrip("v8-blockpreg-selcc", source);

    let expected = vec![
        ins(Opcode::PredSet, 0, vec![Preg(3)]),
        ins(Opcode::PredSet, 1, vec![Preg(15), Icc(CondCode::L)]),
        ins(Opcode::PredClear, 2, vec![Preg(3)]),
        ins(Opcode::PredBegin, 3, vec![Preg(15), Tf(true)]),
        ins(Opcode::Nop, 4, vec![]),
        ins(Opcode::PredEnd, 5, vec![]),
        ins(Opcode::PredBegin, 6, vec![Preg(2), Tf(false)]),
        ins(Opcode::Nop, 7, vec![]),
        ins(Opcode::PredEnd, 8, vec![]),
    ];
    assert_eq!(decoded, expected);
}

#[test]
fn test_movcc_round_trip() {
    use Operand::*;

    let decoded = roundtrip("v8-blockicc-movcc", "mov[neg] %i3, %o5\n");
    assert_eq!(
        decoded,
        vec![ins(
            Opcode::Mov,
            0,
            vec![Reg(13), Reg(27), Icc(CondCode::Neg)]
        )]
    );
}

#[test]
fn test_extension_words_decode_as_unknown_on_the_base_target() {
    // assemble a hwloop for an extension target, then decode the words
    // with the base decoder: the extension op2 space is unknown there
    let extended = target::by_name("v8-blockicc-selcc").unwrap();
    let base = target::by_name("v8").unwrap();
    let binary = assemble("hwloop start\n", extended).unwrap();
    let word = u32::from_be_bytes(binary[10..14].try_into().unwrap());
    let decoded = base.decode(word, 0).unwrap();
    assert_eq!(decoded.opcode, Opcode::Unknown);
}

#[test]
fn test_all_condition_codes_round_trip_in_branches() {
    for bits in 0..16u32 {
        let cc = CondCode::from_bits(bits);
        let source = format!("main:\nb{} main\n", cc.suffix());
        let decoded = roundtrip("v8", &source);
        assert_eq!(
            decoded[1].operands[1],
            Operand::Icc(cc),
            "condition {} did not survive the round trip",
            cc.suffix()
        );
    }
}
