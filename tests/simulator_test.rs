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

//! End-to-end execution tests: assemble a source program, load the binary
//! and run it to the termination sentinel.
//!
//! Control transfers have one delay slot: the instruction after a branch,
//! call or jmpl executes before the transfer takes effect, so the programs
//! below fill delay slots the way compiled code would.

use sparcx::assemble;
use sparcx::errors::SimulationError;
use sparcx::simulator::{Simulator, StepOutcome};
use sparcx::target;

fn load(target_name: &str, source: &str) -> Simulator {
    let target = target::by_name(target_name).unwrap();
    let binary = assemble(source, target).unwrap();
    Simulator::load(&mut binary.as_slice(), target).unwrap()
}

/// Runs a program to the sentinel; returns the simulator and the captured
/// step output.
fn run(target_name: &str, source: &str) -> (Simulator, String) {
    let mut simulator = load(target_name, source);
    let mut out = Vec::new();
    simulator.run(&mut out).unwrap();
    (simulator, String::from_utf8(out).unwrap())
}

fn run_error(target_name: &str, source: &str) -> SimulationError {
    let mut simulator = load(target_name, source);
    let mut out = Vec::new();
    simulator.run(&mut out).unwrap_err()
}

// ------------- termination and calling convention -------------

#[test]
fn test_sentinel_termination_and_return_value() {
    let (sim, _) = run("v8", "main:\tmov 42, %o0\n\tretl\n\tnop\n");
    assert_eq!(sim.result(), 42);
    // three integer instructions
    assert_eq!(sim.cycles(), 3);
}

#[test]
fn test_step_reports_halt_exactly_at_the_sentinel() {
    let mut sim = load("v8", "main:\tretl\n\tnop\n");
    let mut out = Vec::new();
    assert_eq!(sim.step(&mut out).unwrap(), StepOutcome::Continue);
    assert_eq!(sim.step(&mut out).unwrap(), StepOutcome::Halted);
}

#[test]
fn test_delay_slot_executes_after_branch() {
    // the instruction after the taken branch runs before the target
    let source = "\
main:	mov 1, %o0
	ba done
	mov 2, %o0
	mov 3, %o0
done:	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), 2);
}

#[test]
fn test_zero_register_stays_zero() {
    let source = "\
main:	mov 7, %g0
	add %g0, %g0, %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), 0);
    assert_eq!(sim.register(0), 0);
}

#[test]
fn test_call_links_and_windows_nest() {
    // main saves a window, calls a leaf and forwards its result
    let source = "\
main:	save %sp, -96, %sp
	mov 20, %o0
	call double
	mov 11, %o1
	mov %o0, %i0
	ret
	restore
double:	add %o0, %o0, %o0
	retl
	add %o0, %o1, %o0
";
    let (sim, _) = run("v8", source);
    // (20 * 2) + 11, computed in the leaf's delay slot
    assert_eq!(sim.result(), 51);
    assert_eq!(sim.current_window(), target::NWINDOWS - 1);
}

// ------------- condition codes -------------

#[test]
fn test_icc_derivation_over_boundary_values() {
    let values: [u32; 5] = [0, 1, 0xffff_ffff, 0x8000_0000, 0x7fff_ffff];

    for &a in &values {
        for &b in &values {
            for op in ["addcc", "subcc"] {
                let source = format!(
                    "main:\tsethi {}, %g1\n\tor %g1, {}, %g1\n\tsethi {}, %g2\n\tor %g2, {}, %g2\n\t{} %g1, %g2, %g3\n\tretl\n\tnop\n",
                    a >> 10,
                    a & 0x3ff,
                    b >> 10,
                    b & 0x3ff,
                    op
                );
                let (sim, _) = run("v8", &source);
                let flags = sim.condition_flags();

                let (result, expected_v, expected_c) = if op == "addcc" {
                    let r = a.wrapping_add(b);
                    let v = ((a ^ r) & (b ^ r)) >> 31 == 1;
                    let c = (u64::from(a) + u64::from(b)) >> 32 == 1;
                    (r, v, c)
                } else {
                    let r = a.wrapping_sub(b);
                    let v = ((a ^ b) & (a ^ r)) >> 31 == 1;
                    let c = a < b;
                    (r, v, c)
                };

                assert_eq!(sim.register(3), result, "{} {:#x} {:#x}", op, a, b);
                assert_eq!(flags.n, result >> 31 == 1, "N of {} {:#x} {:#x}", op, a, b);
                assert_eq!(flags.z, result == 0, "Z of {} {:#x} {:#x}", op, a, b);
                assert_eq!(flags.v, expected_v, "V of {} {:#x} {:#x}", op, a, b);
                assert_eq!(flags.c, expected_c, "C of {} {:#x} {:#x}", op, a, b);
            }
        }
    }
}

#[test]
fn test_logical_cc_only_sets_n_and_z() {
    let source = "\
main:	mov -1, %g1
	addcc %g1, 2, %g0
	andcc %g1, %g1, %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    let flags = sim.condition_flags();
    // andcc rewrote the carry left behind by addcc
    assert!(flags.n && !flags.z && !flags.v && !flags.c);
    assert_eq!(sim.result(), 0xffff_ffff);
}

#[test]
fn test_conditional_branches_follow_the_flags() {
    let source = "\
main:	mov 3, %o1
	cmp %o1, 5
	bl less
	nop
	mov 0, %o0
	ba done
	nop
less:	mov 1, %o0
done:	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), 1);
}

// ------------- window rotation -------------

#[test]
fn test_window_rotation_comes_full_circle() {
    // NWINDOWS saves bring the window pointer back to its start value
    let mut source = String::from("main:\tmov 99, %l0\n");
    for _ in 0..target::NWINDOWS {
        source.push_str("\tsave %sp, -96, %sp\n");
    }
    source.push_str("\tmov %l0, %o0\n\tretl\n\tnop\n");

    let (sim, _) = run("v8", &source);
    assert_eq!(sim.current_window(), target::NWINDOWS - 1);
    // the locals of the start window are visible again
    assert_eq!(sim.result(), 99);
}

#[test]
fn test_save_reads_old_window_and_writes_new() {
    let source = "\
main:	mov 64, %o1
	save %o1, 32, %o1
	mov %o1, %i0
	ret
	restore
";
    let (sim, _) = run("v8", source);
    // the source %o1 is the old window's, the destination the new one's
    assert_eq!(sim.result(), 96);
}

// ------------- memory accesses -------------

#[test]
fn test_sub_word_memory_accesses() {
    let source = "\
.data
buf:	.word 0x11223344
sbyte:	.byte 0x80
.text
main:	sethi %hi(buf), %g1
	or %g1, %lo(buf), %g1
	ldub [%g1], %o1
	ldub [%g1+3], %o2
	lduh [%g1+2], %o3
	ldsb [%g1+4], %o4
	mov 0xab, %g2
	stb %g2, [%g1+1]
	ld [%g1], %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.register(9), 0x11);
    assert_eq!(sim.register(10), 0x44);
    assert_eq!(sim.register(11), 0x3344);
    // signed byte load of 0x80 extends to -128
    assert_eq!(sim.register(12), 0xffff_ff80);
    // the byte store preserved its neighbours
    assert_eq!(sim.result(), 0x11ab_3344);
    assert_eq!(sim.memory()[1], 0xab);
}

#[test]
fn test_halfword_store_is_read_modify_write() {
    let source = "\
.data
buf:	.word 0xaabbccdd
.text
main:	sethi %hi(buf), %g1
	or %g1, %lo(buf), %g1
	mov 0x123, %g2
	sth %g2, [%g1+2]
	ld [%g1], %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), 0xaabb_0123);
}

#[test]
fn test_unaligned_accesses_are_fatal() {
    let word_load = "\
.data
buf:	.word 1, 2
.text
main:	sethi %hi(buf), %g1
	or %g1, %lo(buf), %g1
	ld [%g1+2], %o0
	retl
	nop
";
    assert!(matches!(
        run_error("v8", word_load),
        SimulationError::UnalignedAccess { access: "word", .. }
    ));

    let half_store = "\
.data
buf:	.word 1
.text
main:	sethi %hi(buf), %g1
	or %g1, %lo(buf), %g1
	sth %g0, [%g1+1]
	retl
	nop
";
    assert!(matches!(
        run_error("v8", half_store),
        SimulationError::UnalignedAccess {
            access: "halfword",
            ..
        }
    ));
}

#[test]
fn test_stack_pointer_tops_out_data_memory() {
    let source = "\
main:	mov 5, %g1
	st %g1, [%sp]
	ld [%sp], %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), 5);
    assert_eq!(sim.register(14), sim.memory().len() as u32 - 4);
}

#[test]
fn test_double_word_accesses_are_skipped() {
    let source = "\
.data
buf:	.word 0x11111111, 0x22222222
.text
main:	sethi %hi(buf), %g1
	or %g1, %lo(buf), %g1
	ldd [%g1], %o2
	std %o2, [%g1]
	ld [%g1], %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    // no state change from either double access
    assert_eq!(sim.result(), 0x1111_1111);
    assert_eq!(sim.register(10), 0);
    // but both consumed their cycle classes (3 + 4) on top of the four
    // integer instructions and the word load
    assert_eq!(sim.cycles(), 4 + 3 + 4 + 2);
}

// ------------- multiply, divide and %y -------------

#[test]
fn test_umul_splits_the_product_across_y() {
    let source = "\
main:	sethi 0x200000, %g1
	mov 4, %g2
	umul %g1, %g2, %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    // 0x80000000 * 4 = 0x2_00000000
    assert_eq!(sim.result(), 0);
    assert_eq!(sim.y_register(), 2);
    // sethi, mov, retl, nop plus five cycles for the multiply
    assert_eq!(sim.cycles(), 4 + 5);
}

#[test]
fn test_smul_sign_extends_into_y() {
    let source = "\
main:	mov -3, %g1
	mov 5, %g2
	smul %g1, %g2, %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), (-15i32) as u32);
    assert_eq!(sim.y_register(), 0xffff_ffff);
}

#[test]
fn test_sdiv_uses_y_as_high_dividend_half() {
    let source = "\
main:	wr %g0, -1, %y
	mov -100, %g1
	mov 7, %g2
	sdiv %g1, %g2, %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), (-14i32) as u32);
}

#[test]
fn test_udiv_and_rd_y() {
    let source = "\
main:	wr %g0, 1, %y
	mov 0, %g1
	mov 16, %g2
	udiv %g1, %g2, %o1
	rd %y, %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    // {1:0} / 16 = 0x10000000
    assert_eq!(sim.register(9), 0x1000_0000);
    // rd %y still sees the written value
    assert_eq!(sim.result(), 1);
}

#[test]
fn test_udivcc_overflow_sets_v() {
    let source = "\
main:	wr %g0, 1, %y
	mov 0, %g1
	mov 1, %g2
	udivcc %g1, %g2, %o0
	retl
	nop
";
    let (sim, _) = run("v8", source);
    // {1:0} / 1 does not fit 32 bits
    let flags = sim.condition_flags();
    assert!(flags.v);
    assert_eq!(sim.result(), 0);
}

#[test]
fn test_division_by_zero_is_fatal() {
    let source = "main:\tmov 9, %g1\n\tudiv %g1, %g0, %o0\n\tretl\n\tnop\n";
    assert!(matches!(
        run_error("v8", source),
        SimulationError::DivisionByZero { instr_no: 1 }
    ));
}

// ------------- hardware loops -------------

#[test]
fn test_hwloop_executes_body_exactly_bound_times() {
    let source = "\
main:	clr %o0
	hwloop init loop_start, %loops
	hwloop init loop_end, %loope
	hwloop init 5, %loopb
	hwloop start
loop_start:
	add %o0, 1, %o0
	add %o0, 0, %o0
loop_end:
	retl
	nop
";
    let (sim, _) = run("v8-blockicc-selcc", source);
    assert_eq!(sim.result(), 5);
}

#[test]
fn test_hwloop_bound_from_register() {
    let source = "\
main:	clr %o0
	mov 3, %o1
	hwloop init loop_start, %loops
	hwloop init loop_end, %loope
	hwloop init %o1, %loopb
	hwloop start
loop_start:
	add %o0, 2, %o0
	nop
loop_end:
	retl
	nop
";
    let (sim, _) = run("v8-blockicc-selcc", source);
    assert_eq!(sim.result(), 6);
}

// ------------- predicated blocks -------------

#[test]
fn test_closed_icc_block_suppresses_state_but_not_cycles() {
    let source = "\
main:	clr %o0
	cmp %g0, %g0
	predbegin[ne]
	add %o0, 1, %o0
	predend
	add %o0, 2, %o0
	retl
	nop
";
    let (sim, _) = run("v8-blockicc-selcc", source);
    // the block is closed: only the add after predend commits
    assert_eq!(sim.result(), 2);
    // the suppressed add still costs its cycle
    assert_eq!(sim.cycles(), 8);
}

#[test]
fn test_open_icc_block_commits() {
    let source = "\
main:	clr %o0
	cmp %g0, 1
	predbegin[ne]
	add %o0, 1, %o0
	predend
	add %o0, 2, %o0
	retl
	nop
";
    let (sim, _) = run("v8-blockicc-selcc", source);
    assert_eq!(sim.result(), 3);
}

#[test]
fn test_closed_block_suppresses_stores_and_flags() {
    let source = "\
.data
buf:	.word 7
.text
main:	sethi %hi(buf), %g1
	or %g1, %lo(buf), %g1
	cmp %g0, %g0
	predbegin[ne]
	mov 1, %g2
	st %g2, [%g1]
	addcc %g0, 1, %g0
	predend
	ld [%g1], %o0
	retl
	nop
";
    let (sim, _) = run("v8-blockicc-selcc", source);
    // the store never happened
    assert_eq!(sim.result(), 7);
    // the suppressed addcc did not clear the Z flag of the cmp
    assert!(sim.condition_flags().z);
}

#[test]
fn test_predicate_register_blocks() {
    let source = "\
main:	clr %o0
	predset %p1
	predbegin[%p1][t]
	add %o0, 1, %o0
	predend
	predclear %p1
	predbegin[%p1][t]
	add %o0, 4, %o0
	predend
	retl
	nop
";
    let (sim, _) = run("v8-blockpreg-selcc", source);
    assert_eq!(sim.result(), 1);
    assert_eq!(sim.predicate_register(), 0);
}

#[test]
fn test_conditional_predset_splits_true_and_false_bits() {
    let source = "\
main:	clr %o0
	cmp %g0, %g0
	predset[e] %p2
	predbegin[%p2][t]
	add %o0, 1, %o0
	predend
	predbegin[%p2][f]
	add %o0, 4, %o0
	predend
	retl
	nop
";
    let (sim, _) = run("v8-blockpreg-selcc", source);
    // Z was set, so the t bit is set and the f bit cleared
    assert_eq!(sim.result(), 1);
    assert_eq!(sim.predicate_register(), 1 << 5);
}

#[test]
fn test_unconditional_predset_sets_both_bits() {
    let source = "main:\tpredset %p0\n\tretl\n\tnop\n";
    let (sim, _) = run("v8-blockpreg-selcc", source);
    assert_eq!(sim.predicate_register(), 0b11);
}

// ------------- conditional move and select -------------

#[test]
fn test_conditional_move() {
    let source = "\
main:	mov 3, %g1
	mov 9, %o0
	cmp %g0, %g0
	mov[e] %g1, %o0
	mov[ne] %g0, %o0
	retl
	nop
";
    let (sim, _) = run("v8-blockicc-movcc", source);
    // the first move takes, the second keeps the destination
    assert_eq!(sim.result(), 3);
}

#[test]
fn test_conditional_select_shapes() {
    let source = "\
main:	mov 3, %g1
	mov 4, %g2
	cmp %g0, 1
	sel[l] %g1, %g2, %o1
	sel[ge] %g1, %g2, %o2
	sel[l] %g1, -7, %o3
	sel[ge] %g1, -7, %o4
	sel[l] 5, 9, %o0
	retl
	nop
";
    let (sim, _) = run("v8-blockicc-selcc", source);
    assert_eq!(sim.register(9), 3);
    assert_eq!(sim.register(10), 4);
    assert_eq!(sim.register(11), 3);
    assert_eq!(sim.register(12), (-7i32) as u32);
    assert_eq!(sim.result(), 5);
}

// ------------- cycle counter intrinsics -------------

#[test]
fn test_cycle_intrinsics_report_and_reset_the_local_counter() {
    let source = "\
main:	sim-clearcycles
	add %g0, 1, %o1
	sim-printcycles
	add %g0, 2, %o2
	sim-printcycles
	retl
	nop
";
    let (sim, output) = run("v8", source);
    assert_eq!(
        output,
        "Current simulated cycles: 1.\nCurrent simulated cycles: 1.\n"
    );
    // the intrinsics are free and do not touch the global counter
    assert_eq!(sim.cycles(), 4);
    // retl and nop ran after the last reset
    assert_eq!(sim.local_cycles(), 2);
}

#[test]
fn test_single_path_select_kernel_has_constant_cycles() {
    // the classic single-path pattern: a data-dependent choice through
    // sel instead of a branch costs the same for every input
    let mut counts = Vec::new();
    for key in [1u32, 2, 3, 50] {
        let source = format!(
            "main:\tsim-clearcycles\n\tmov {}, %o1\n\tcmp %o1, 2\n\tsel[le] 1, 0, %o0\n\tsim-printcycles\n\tretl\n\tnop\n",
            key
        );
        let (_, output) = run("v8-blockicc-selcc", &source);
        counts.push(output);
    }
    assert!(counts.windows(2).all(|pair| pair[0] == pair[1]));
}

// ------------- loader errors -------------

#[test]
fn test_target_id_mismatch_is_fatal() {
    let binary = assemble("nop\n", target::by_name("v8").unwrap()).unwrap();
    let other = target::by_name("v8-blockicc-selcc").unwrap();
    assert!(matches!(
        Simulator::load(&mut binary.as_slice(), other),
        Err(SimulationError::TargetMismatch {
            found: 0x0001,
            expected: 0x0003
        })
    ));
}

#[test]
fn test_truncated_binary_is_fatal() {
    let binary = assemble("nop\n", target::by_name("v8").unwrap()).unwrap();
    for cut in [1, 5, 11] {
        assert!(matches!(
            Simulator::load(&mut &binary[..cut], target::by_name("v8").unwrap()),
            Err(SimulationError::TruncatedBinary)
        ));
    }
}

#[test]
fn test_unknown_opcode_is_fatal_at_execution_not_load() {
    // header for the base target, no data, one word in the unused
    // coprocessor-branch op2 slot
    let mut binary = vec![0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 4];
    binary.extend_from_slice(&0x01c0_0000u32.to_be_bytes());
    let mut sim = Simulator::load(&mut binary.as_slice(), target::by_name("v8").unwrap()).unwrap();
    let mut out = Vec::new();
    assert!(matches!(
        sim.step(&mut out),
        Err(SimulationError::UnknownOpcode { instr_no: 0 })
    ));
}

#[test]
fn test_running_off_instruction_memory_is_fatal() {
    let source = "main:\tnop\n";
    assert!(matches!(
        run_error("v8", source),
        SimulationError::PcOutOfRange { .. }
    ));
}

// ------------- reset -------------

#[test]
fn test_reset_clears_state_but_keeps_memory() {
    let source = "\
.data
buf:	.word 0
.text
main:	sethi %hi(buf), %g1
	or %g1, %lo(buf), %g1
	mov 77, %g2
	st %g2, [%g1]
	mov 1, %o0
	retl
	nop
";
    let (mut sim, _) = run("v8", source);
    assert_eq!(sim.result(), 1);
    assert!(sim.cycles() > 0);

    sim.reset();
    assert_eq!(sim.result(), 0);
    assert_eq!(sim.cycles(), 0);
    assert_eq!(sim.local_cycles(), 0);
    assert_eq!(sim.register(1), 0);
    assert_eq!(sim.current_window(), target::NWINDOWS - 1);
    assert_eq!(sim.register(14), sim.memory().len() as u32 - 4);
    // data memory is not reloaded by a reset
    assert_eq!(&sim.memory()[0..4], &[0, 0, 0, 77]);

    // the machine runs again from the entry point
    let mut out = Vec::new();
    assert_eq!(sim.run(&mut out).unwrap(), 1);
}

// ------------- an end-to-end program -------------

#[test]
fn test_gcd_program() {
    let source = "\
main:	save %sp, -96, %sp
	mov 54, %o0
	call gcd
	mov 24, %o1
	mov %o0, %i0
	ret
	restore
gcd:	cmp %o0, %o1
	be gcd_done
	nop
	bg gcd_greater
	nop
	ba gcd
	sub %o1, %o0, %o1
gcd_greater:
	ba gcd
	sub %o0, %o1, %o0
gcd_done:
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), 6);
}

#[test]
fn test_memory_sum_loop() {
    let source = "\
.data
table:	.word 3, 5, 7, 11, 13
.text
main:	sethi %hi(table), %g1
	or %g1, %lo(table), %g1
	clr %o0
	mov 5, %o1
sum:	ld [%g1], %o2
	add %o0, %o2, %o0
	add %g1, 4, %g1
	subcc %o1, 1, %o1
	bne sum
	nop
	retl
	nop
";
    let (sim, _) = run("v8", source);
    assert_eq!(sim.result(), 39);
}
