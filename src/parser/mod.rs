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

mod ast_builder;

use crate::ast::*;
use crate::errors::AssemblyError;
use pest::Parser;
use pest_derive::Parser;

// Derive the parser from our grammar file.
#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct SparcParser;

// Main parsing function that takes the entire source code string.
pub fn parse_source(source: &str) -> Result<Vec<AssemblyLine>, AssemblyError> {
    let pairs =
        SparcParser::parse(Rule::program, source).map_err(|e| AssemblyError::PestError(Box::new(e)))?;
    let mut ast = Vec::new();

    for line_pair in pairs
        .flatten()
        .filter(|p| p.as_rule() == Rule::line_content)
    {
        let mut inner = line_pair.into_inner();
        let mut assembly_line = AssemblyLine::default();

        // Check for a label first
        if let Some(pair) = inner.peek() {
            assembly_line.line_number = pair.as_span().start_pos().line_col().0;
            if pair.as_rule() == Rule::label {
                let label_pair = inner.next().expect("peeked pair");
                assembly_line.label = Some(
                    label_pair
                        .into_inner()
                        .next()
                        .expect("label contains an identifier")
                        .as_str()
                        .to_string(),
                );
            }
        }

        // Check for a statement
        if let Some(pair) = inner.peek() {
            if pair.as_rule() == Rule::statement {
                let statement_pair = inner
                    .next()
                    .expect("peeked pair")
                    .into_inner()
                    .next()
                    .expect("statement contains an alternative");
                assembly_line.statement = Some(ast_builder::build_statement(statement_pair)?);
            }
        }

        // Only add non-empty lines to our AST
        if assembly_line.label.is_some() || assembly_line.statement.is_some() {
            ast.push(assembly_line);
        }
    }

    Ok(ast)
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{CondCode, LoopReg};

    fn single_instruction(source: &str) -> SourceInstruction {
        let lines = parse_source(source).unwrap();
        assert_eq!(lines.len(), 1);
        match lines[0].statement.clone() {
            Some(Statement::Instruction(i)) => i,
            other => panic!("expected instruction, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nop() {
        let instr = single_instruction("nop\n");
        assert_eq!(instr.mnemonic, "nop");
        assert!(instr.tags.is_empty());
        assert!(instr.operands.is_empty());
    }

    #[test]
    fn test_parse_three_operand_add() {
        let instr = single_instruction("add %g1, %o2, %l3\n");
        assert_eq!(instr.mnemonic, "add");
        assert_eq!(
            instr.operands,
            vec![AsmOperand::Reg(1), AsmOperand::Reg(10), AsmOperand::Reg(19)]
        );
    }

    #[test]
    fn test_parse_immediate_and_aliases() {
        let instr = single_instruction("sub %sp, -0x10, %fp\n");
        assert_eq!(
            instr.operands,
            vec![AsmOperand::Reg(14), AsmOperand::Imm(-16), AsmOperand::Reg(30)]
        );
    }

    #[test]
    fn test_parse_load_with_negative_offset() {
        let instr = single_instruction("ld [%fp-4], %o0\n");
        assert_eq!(
            instr.operands,
            vec![
                AsmOperand::Addr(30, Some(Offset::Imm(-4))),
                AsmOperand::Reg(8)
            ]
        );
    }

    #[test]
    fn test_parse_store_with_register_offset() {
        let instr = single_instruction("st %o0, [%g1+%g2]\n");
        assert_eq!(
            instr.operands,
            vec![
                AsmOperand::Reg(8),
                AsmOperand::Addr(1, Some(Offset::Reg(2)))
            ]
        );
    }

    #[test]
    fn test_parse_sethi_hi_and_lo() {
        let instr = single_instruction("sethi %hi(values), %g1\n");
        assert_eq!(
            instr.operands,
            vec![AsmOperand::Hi("values".to_string()), AsmOperand::Reg(1)]
        );
        let instr = single_instruction("or %g1, %lo(values), %g1\n");
        assert_eq!(
            instr.operands,
            vec![
                AsmOperand::Reg(1),
                AsmOperand::Lo("values".to_string()),
                AsmOperand::Reg(1)
            ]
        );
    }

    #[test]
    fn test_parse_jmpl_reg_offset() {
        let instr = single_instruction("jmpl %o7+8, %g0\n");
        assert_eq!(
            instr.operands,
            vec![
                AsmOperand::RegOffset(15, Offset::Imm(8)),
                AsmOperand::Reg(0)
            ]
        );
    }

    #[test]
    fn test_parse_label_and_comment() {
        let lines = parse_source(".L5: ! loop head\n\tba .L5\n").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].label.as_deref(), Some(".L5"));
        assert!(lines[0].statement.is_none());
        assert_eq!(
            lines[1].statement,
            Some(Statement::Instruction(SourceInstruction {
                mnemonic: "ba".to_string(),
                tags: vec![],
                operands: vec![AsmOperand::Ident(".L5".to_string())],
            }))
        );
    }

    #[test]
    fn test_parse_condition_tags() {
        let instr = single_instruction("sel[le] %o0, %o1, %o2\n");
        assert_eq!(instr.mnemonic, "sel");
        assert_eq!(instr.tags, vec![Tag::Cond(CondCode::Le)]);

        let instr = single_instruction("predbegin[%p3][t]\n");
        assert_eq!(instr.mnemonic, "predbegin");
        assert_eq!(instr.tags, vec![Tag::Preg(3), Tag::True]);
    }

    #[test]
    fn test_parse_hwloop_forms() {
        let instr = single_instruction("hwloop init .L3, %loops\n");
        assert_eq!(instr.mnemonic, "hwloop");
        assert_eq!(
            instr.operands,
            vec![
                AsmOperand::Ident("init".to_string()),
                AsmOperand::Ident(".L3".to_string()),
                AsmOperand::LoopReg(LoopReg::Start)
            ]
        );
        let instr = single_instruction("hwloop init 100, %loopb\n");
        assert_eq!(
            instr.operands,
            vec![
                AsmOperand::Ident("init".to_string()),
                AsmOperand::Imm(100),
                AsmOperand::LoopReg(LoopReg::Bound)
            ]
        );
    }

    #[test]
    fn test_parse_directives() {
        let lines = parse_source(".data\n.align 4\nvalues: .word 1, 2, value_end\n.skip 16\n").unwrap();
        assert_eq!(lines[0].statement, Some(Statement::Directive(Directive::Data)));
        assert_eq!(
            lines[1].statement,
            Some(Statement::Directive(Directive::Align(4)))
        );
        assert_eq!(lines[2].label.as_deref(), Some("values"));
        assert_eq!(
            lines[2].statement,
            Some(Statement::Directive(Directive::Word(vec![
                DataExpr::Value(1),
                DataExpr::Value(2),
                DataExpr::Label("value_end".to_string())
            ])))
        );
        assert_eq!(
            lines[3].statement,
            Some(Statement::Directive(Directive::Skip(16)))
        );
    }

    #[test]
    fn test_parse_wr_y() {
        let instr = single_instruction("wr %g0, %o0, %y\n");
        assert_eq!(
            instr.operands,
            vec![AsmOperand::Reg(0), AsmOperand::Reg(8), AsmOperand::Y]
        );
    }

    #[test]
    fn test_parse_sim_intrinsics() {
        let instr = single_instruction("sim-printcycles\n");
        assert_eq!(instr.mnemonic, "sim-printcycles");
        assert!(instr.operands.is_empty());
    }

    #[test]
    fn test_parse_syntax_error() {
        assert!(parse_source("add %g1 %g2 %g3,\n").is_err());
    }
}
