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

use sparcx::assemble;
use sparcx::errors::AssemblyError;
use sparcx::target;

fn assemble_for(target_name: &str, source: &str) -> Result<Vec<u8>, AssemblyError> {
    assemble(source, target::by_name(target_name).unwrap())
}

fn text_words(binary: &[u8]) -> Vec<u32> {
    let data_size = u32::from_be_bytes(binary[2..6].try_into().unwrap()) as usize;
    binary[10 + data_size..]
        .chunks(4)
        .map(|chunk| u32::from_be_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[test]
fn test_empty_program_header() {
    let binary = assemble_for("v8", "").unwrap();
    assert_eq!(binary.len(), 10);
    assert_eq!(&binary[0..2], &[0x00, 0x01]);
    assert_eq!(&binary[2..6], &[0, 0, 0, 0]);
    assert_eq!(&binary[6..10], &[0, 0, 0, 0]);
}

#[test]
fn test_header_carries_target_id() {
    for (name, id) in [
        ("v8", 0x0001u16),
        ("v8-blockicc-movcc", 0x0002),
        ("v8-blockicc-selcc", 0x0003),
        ("v8-blockpreg-selcc", 0x0004),
    ] {
        let binary = assemble_for(name, "nop\n").unwrap();
        assert_eq!(&binary[0..2], &id.to_be_bytes());
    }
}

#[test]
fn test_nop_encoding() {
    let binary = assemble_for("v8", "nop\n").unwrap();
    assert_eq!(text_words(&binary), vec![0x0100_0000]);
}

#[test]
fn test_arithmetic_encodings_match_the_architecture() {
    // reference words taken from the SPARC V8 instruction formats
    let binary = assemble_for(
        "v8",
        "add %g1, %g2, %g3\nsub %o1, 4, %o2\nld [%fp-8], %o0\n",
    )
    .unwrap();
    assert_eq!(
        text_words(&binary),
        vec![0x8600_4002, 0x9422_6004, 0xd007_bff8]
    );
}

#[test]
fn test_store_and_sethi_encodings() {
    let source = "\
.data
buf:	.skip 4
.text
main:	sethi %hi(buf), %g1
	st %o0, [%g1+%lo(buf)]
";
    let binary = assemble_for("v8", source).unwrap();
    let words = text_words(&binary);
    // buf sits at data offset 0, so %hi and %lo both resolve to zero
    assert_eq!(words[0], 0x0300_0000);
    // st %o0, [%g1+0]: op=3, op3=0x04, rd=8, rs1=1, i=1, simm13=0
    assert_eq!(words[1], 0xd020_6000);
}

#[test]
fn test_branch_and_call_displacements() {
    let binary = assemble_for("v8", "start:\nnop\nba start\ncall start\n").unwrap();
    let words = text_words(&binary);
    // backwards branch by one instruction: cond=a, imm22 = -1
    assert_eq!(words[1], 0x10bf_ffff);
    // backwards call by two instructions: disp30 = -2
    assert_eq!(words[2], 0x7fff_fffe);
}

#[test]
fn test_branch_displacement_overflow_rejected() {
    // the branch target is further away than a signed 22-bit word
    // displacement can reach
    use sparcx::assembler::Assembler;
    use sparcx::isa::CondCode;

    let mut asm = Assembler::new(target::by_name("v8").unwrap());
    asm.save_label(1 << 21, "far").unwrap();
    asm.save_branch_instr(0, CondCode::A, "far".to_string());
    asm.check_labels().unwrap();
    assert!(matches!(
        asm.emit(),
        Err(AssemblyError::DisplacementOutOfRange { instr_no: 0 })
    ));
}

#[test]
fn test_wr_and_rd_y_encodings() {
    let binary = assemble_for("v8", "wr %g0, %o0, %y\nrd %y, %o1\n").unwrap();
    let words = text_words(&binary);
    // wr: op=2, op3=0x30, rd=0, rs1=0, rs2=%o0
    assert_eq!(words[0], 0x8180_0008);
    // rd: op=2, op3=0x28, rd=%o1, rs1=0
    assert_eq!(words[1], 0x9340_0000);
}

#[test]
fn test_data_segment_layout() {
    let source = "\
.data
words:	.word 0x11223344, end
bytes:	.byte 1, 2
half:	.half 0x5566
.skip 2
end:
.text
	nop
";
    let binary = assemble_for("v8", source).unwrap();
    let data_size = u32::from_be_bytes(binary[2..6].try_into().unwrap());
    assert_eq!(data_size, 14);
    // the label "end" resolves to data offset 14
    assert_eq!(
        &binary[10..24],
        &[
            0x11, 0x22, 0x33, 0x44, // words[0]
            0x00, 0x00, 0x00, 0x0e, // resolved address of end
            0x01, 0x02, // bytes
            0x55, 0x66, // half
            0x00, 0x00, // skip
        ]
    );
}

#[test]
fn test_duplicate_label_is_fatal() {
    assert!(matches!(
        assemble_for("v8", "main:\nnop\nmain:\nnop\n"),
        Err(AssemblyError::DuplicateLabel(_))
    ));
}

#[test]
fn test_unresolved_label_is_fatal() {
    assert!(matches!(
        assemble_for("v8", "ba nowhere\n"),
        Err(AssemblyError::UnresolvedLabel { .. })
    ));
}

#[test]
fn test_immediate_ranges_are_fatal() {
    assert!(matches!(
        assemble_for("v8", "add %g1, 4096, %g2\n"),
        Err(AssemblyError::ImmediateOutOfRange { .. })
    ));
    assert!(matches!(
        assemble_for("v8", "sethi 0x400000, %g1\n"),
        Err(AssemblyError::ImmediateOutOfRange { .. })
    ));
    assert!(matches!(
        assemble_for("v8-blockicc-selcc", "sel[e] %g1, 1024, %g2\n"),
        Err(AssemblyError::ImmediateOutOfRange { .. })
    ));
    assert!(matches!(
        assemble_for("v8-blockicc-selcc", "sel[e] 128, 0, %g2\n"),
        Err(AssemblyError::ImmediateOutOfRange { .. })
    ));
}

#[test]
fn test_capability_rejection() {
    // the base target has no extensions
    for source in [
        "sel[e] %g1, %g2, %g3\n",
        "mov[e] %g1, %g2\n",
        "hwloop start\n",
        "predbegin[e]\n",
        "predset %p1\n",
    ] {
        assert!(matches!(
            assemble_for("v8", source),
            Err(AssemblyError::UnsupportedCapability { .. })
        ));
    }

    // selcc targets have no conditional move, the movcc target no select
    assert!(matches!(
        assemble_for("v8-blockicc-selcc", "mov[e] %g1, %g2\n"),
        Err(AssemblyError::UnsupportedCapability { .. })
    ));
    assert!(matches!(
        assemble_for("v8-blockicc-movcc", "sel[e] %g1, %g2, %g3\n"),
        Err(AssemblyError::UnsupportedCapability { .. })
    ));

    // predicate registers only exist on the blockpreg target
    assert!(matches!(
        assemble_for("v8-blockicc-selcc", "predset %p1\n"),
        Err(AssemblyError::UnsupportedCapability { .. })
    ));
    assert!(matches!(
        assemble_for("v8-blockpreg-selcc", "predbegin[e]\n"),
        Err(AssemblyError::UnsupportedCapability { .. })
    ));

    // no shipping target supports instruction-level predicates
    for name in [
        "v8",
        "v8-blockicc-movcc",
        "v8-blockpreg-selcc",
        "v8-blockicc-selcc",
    ] {
        assert!(matches!(
            assemble_for(name, "add[le] %g1, %g2, %g3\n"),
            Err(AssemblyError::UnsupportedCapability { .. })
        ));
    }
}

#[test]
fn test_syntax_error_reports_line() {
    let result = assemble_for("v8", "nop\nadd %g1 %g2 %g3\n");
    assert!(matches!(result, Err(AssemblyError::PestError(_))));
}

#[test]
fn test_instructions_outside_text_rejected() {
    assert!(matches!(
        assemble_for("v8", ".data\nnop\n"),
        Err(AssemblyError::StructuralError { line: 2, .. })
    ));
}

#[test]
fn test_synthetic_instructions_expand() {
    let binary = assemble_for("v8", "clr %o0\nmov 5, %o1\ncmp %o0, %o1\nretl\nrestore\n").unwrap();
    let words = text_words(&binary);
    // clr  -> or %g0, %g0, %o0
    assert_eq!(words[0], 0x9010_0000);
    // mov  -> or %g0, 5, %o1
    assert_eq!(words[1], 0x9210_2005);
    // cmp  -> subcc %o0, %o1, %g0
    assert_eq!(words[2], 0x80a2_0009);
    // retl -> jmpl %o7+8, %g0
    assert_eq!(words[3], 0x81c3_e008);
    // bare restore -> restore %g0, %g0, %g0
    assert_eq!(words[4], 0x81e8_0000);
}

#[test]
fn test_cycle_intrinsics_use_unimp_space() {
    let binary = assemble_for("v8", "sim-printcycles\nsim-clearcycles\n").unwrap();
    let words = text_words(&binary);
    // format-2 words with op2=0; rd selects print (0) or clear (1)
    assert_eq!(words[0], 0x0000_0000);
    assert_eq!(words[1], 0x0200_0000);
}

#[test]
fn test_hwloop_encodings() {
    let source = "\
	hwloop init body, %loops
	hwloop init body, %loope
	hwloop init 100, %loopb
	hwloop init %o2, %loopb
	hwloop start
body:	nop
";
    let binary = assemble_for("v8-blockicc-selcc", source).unwrap();
    let words = text_words(&binary);
    // op2=1; rd holds the loop operation; imm22 the displacement
    assert_eq!(words[0], 0x0040_0005); // set start, body at +5
    assert_eq!(words[1], 0x0240_0004); // set end, body at +4
    assert_eq!(words[2], 0x0440_0064); // bound immediate 100
    assert_eq!(words[3], 0x0640_0000 | (10 << 14)); // bound from %o2
    assert_eq!(words[4], 0x0840_0000); // start
}
