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

use super::Rule;
use crate::ast::*;
use crate::errors::AssemblyError;
use crate::isa::{CondCode, LoopReg};
use pest::iterators::Pair;

fn structural(line: usize, reason: String) -> AssemblyError {
    AssemblyError::StructuralError { line, reason }
}

fn line_of(pair: &Pair<Rule>) -> usize {
    pair.as_span().start_pos().line_col().0
}

// ------------- statement builders -------------

pub fn build_statement(pair: Pair<Rule>) -> Result<Statement, AssemblyError> {
    match pair.as_rule() {
        Rule::directive => {
            let inner = pair.into_inner().next().expect("directive alternative");
            Ok(Statement::Directive(build_directive(inner)?))
        }
        Rule::instruction => {
            let inner = pair.into_inner().next().expect("instruction alternative");
            Ok(Statement::Instruction(build_instruction(inner)?))
        }
        other => unreachable!("unexpected statement rule: {:?}", other),
    }
}

fn build_directive(pair: Pair<Rule>) -> Result<Directive, AssemblyError> {
    let line = line_of(&pair);
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();

    match rule {
        Rule::dir_text => Ok(Directive::Text),
        Rule::dir_data => Ok(Directive::Data),
        Rule::dir_align => {
            let value = build_number(inner.next().expect("alignment value"))?;
            if value <= 0 || (value & (value - 1)) != 0 {
                return Err(structural(
                    line,
                    format!("Alignment must be a positive power of two, got {}.", value),
                ));
            }
            Ok(Directive::Align(value as u32))
        }
        Rule::dir_skip => {
            let value = build_number(inner.next().expect("skip size"))?;
            if value < 0 {
                return Err(structural(line, "Skip size must not be negative.".to_string()));
            }
            Ok(Directive::Skip(value as u32))
        }
        Rule::dir_global => {
            let name = inner.next().expect("global symbol").as_str().to_string();
            Ok(Directive::Global(name))
        }
        Rule::dir_word | Rule::dir_half | Rule::dir_byte => {
            let mut exprs = Vec::new();
            for expr_pair in inner {
                let expr = expr_pair.into_inner().next().expect("data expression");
                exprs.push(match expr.as_rule() {
                    Rule::number => DataExpr::Value(build_number(expr)?),
                    Rule::identifier => DataExpr::Label(expr.as_str().to_string()),
                    other => unreachable!("unexpected data expression rule: {:?}", other),
                });
            }
            Ok(match rule {
                Rule::dir_word => Directive::Word(exprs),
                Rule::dir_half => Directive::Half(exprs),
                _ => Directive::Byte(exprs),
            })
        }
        other => unreachable!("unexpected directive rule: {:?}", other),
    }
}

// ------------- instruction builders -------------

fn build_instruction(pair: Pair<Rule>) -> Result<SourceInstruction, AssemblyError> {
    match pair.as_rule() {
        Rule::generic_instr => build_generic_instruction(pair),
        Rule::hwloop_instr => build_hwloop_instruction(pair),
        other => unreachable!("unexpected instruction rule: {:?}", other),
    }
}

fn build_generic_instruction(pair: Pair<Rule>) -> Result<SourceInstruction, AssemblyError> {
    let mut inner = pair.into_inner();
    let mnemonic = inner.next().expect("mnemonic").as_str().to_string();

    let mut tags = Vec::new();
    let mut operands = Vec::new();

    for part in inner {
        match part.as_rule() {
            Rule::tag => tags.push(build_tag(part)?),
            Rule::operand_list => {
                for operand_pair in part.into_inner() {
                    operands.push(build_operand(operand_pair)?);
                }
            }
            other => unreachable!("unexpected instruction part: {:?}", other),
        }
    }

    Ok(SourceInstruction {
        mnemonic,
        tags,
        operands,
    })
}

// hwloop is rebuilt as mnemonic "hwloop" with the sub-mnemonic as its first
// operand, so the lowering layer sees one uniform shape
fn build_hwloop_instruction(pair: Pair<Rule>) -> Result<SourceInstruction, AssemblyError> {
    let body = pair.into_inner().next().expect("hwloop body");
    let mut operands = Vec::new();

    match body.as_rule() {
        Rule::hwloop_start => operands.push(AsmOperand::Ident("start".to_string())),
        Rule::hwloop_init => {
            operands.push(AsmOperand::Ident("init".to_string()));
            let list = body.into_inner().next().expect("hwloop init operands");
            for operand_pair in list.into_inner() {
                operands.push(build_operand(operand_pair)?);
            }
        }
        other => unreachable!("unexpected hwloop rule: {:?}", other),
    }

    Ok(SourceInstruction {
        mnemonic: "hwloop".to_string(),
        tags: Vec::new(),
        operands,
    })
}

fn build_tag(pair: Pair<Rule>) -> Result<Tag, AssemblyError> {
    let line = line_of(&pair);
    let body = pair
        .into_inner()
        .next()
        .expect("tag body")
        .into_inner()
        .next()
        .expect("tag alternative");

    match body.as_rule() {
        Rule::preg => Ok(Tag::Preg(build_preg(body)?)),
        Rule::identifier => match body.as_str() {
            "t" => Ok(Tag::True),
            "f" => Ok(Tag::False),
            name => CondCode::from_suffix(name).map(Tag::Cond).ok_or_else(|| {
                structural(line, format!("Unknown condition code \"{}\".", name))
            }),
        },
        other => unreachable!("unexpected tag rule: {:?}", other),
    }
}

// ------------- operand builders -------------

fn build_operand(pair: Pair<Rule>) -> Result<AsmOperand, AssemblyError> {
    let inner = pair.into_inner().next().expect("operand alternative");
    match inner.as_rule() {
        Rule::reg => Ok(AsmOperand::Reg(build_register(inner)?)),
        Rule::y_reg => Ok(AsmOperand::Y),
        Rule::preg => Ok(AsmOperand::Preg(build_preg(inner)?)),
        Rule::loop_reg => Ok(AsmOperand::LoopReg(build_loop_register(&inner))),
        Rule::number => Ok(AsmOperand::Imm(build_number(inner)?)),
        Rule::identifier => Ok(AsmOperand::Ident(inner.as_str().to_string())),
        Rule::hi_expr => Ok(AsmOperand::Hi(
            inner.into_inner().next().expect("label").as_str().to_string(),
        )),
        Rule::lo_expr => Ok(AsmOperand::Lo(
            inner.into_inner().next().expect("label").as_str().to_string(),
        )),
        Rule::address => {
            let mut parts = inner.into_inner();
            let base = build_register(parts.next().expect("base register"))?;
            let offset = parts.next().map(build_offset).transpose()?;
            Ok(AsmOperand::Addr(base, offset))
        }
        Rule::reg_offset => {
            let mut parts = inner.into_inner();
            let base = build_register(parts.next().expect("base register"))?;
            let offset = build_offset(parts.next().expect("offset"))?;
            Ok(AsmOperand::RegOffset(base, offset))
        }
        other => unreachable!("unexpected operand rule: {:?}", other),
    }
}

fn build_offset(pair: Pair<Rule>) -> Result<Offset, AssemblyError> {
    let signed = pair.into_inner().next().expect("offset alternative");
    let negative = signed.as_rule() == Rule::minus_offset;
    let inner = signed.into_inner().next().expect("offset value");

    match inner.as_rule() {
        Rule::reg => Ok(Offset::Reg(build_register(inner)?)),
        Rule::lo_expr => Ok(Offset::Lo(
            inner.into_inner().next().expect("label").as_str().to_string(),
        )),
        Rule::number => {
            let value = build_number(inner)?;
            Ok(Offset::Imm(if negative { -value } else { value }))
        }
        other => unreachable!("unexpected offset rule: {:?}", other),
    }
}

// ------------- token builders -------------

fn build_register(pair: Pair<Rule>) -> Result<u8, AssemblyError> {
    let line = line_of(&pair);
    let name = &pair.as_str()[1..];
    match name {
        "sp" => Ok(14),
        "fp" => Ok(30),
        _ => {
            let index: u8 = name[1..].parse().map_err(|_| {
                structural(line, format!("Invalid register \"%{}\".", name))
            })?;
            let base = match &name[..1] {
                "g" => 0,
                "o" => 8,
                "l" => 16,
                "i" => 24,
                "r" => {
                    if index > 31 {
                        return Err(structural(
                            line,
                            format!("Register number {} out of range.", index),
                        ));
                    }
                    return Ok(index);
                }
                _ => unreachable!("register prefix checked by grammar"),
            };
            Ok(base + index)
        }
    }
}

fn build_preg(pair: Pair<Rule>) -> Result<u8, AssemblyError> {
    let line = line_of(&pair);
    let index: u8 = pair.as_str()[2..]
        .parse()
        .map_err(|_| structural(line, format!("Invalid predicate register \"{}\".", pair.as_str())))?;
    if index >= 16 {
        return Err(structural(
            line,
            format!("Predicate register number {} out of range.", index),
        ));
    }
    Ok(index)
}

fn build_loop_register(pair: &Pair<Rule>) -> LoopReg {
    match pair.as_str() {
        "%loops" => LoopReg::Start,
        "%loope" => LoopReg::End,
        "%loopb" => LoopReg::Bound,
        other => unreachable!("unexpected loop register: {}", other),
    }
}

fn build_number(pair: Pair<Rule>) -> Result<i64, AssemblyError> {
    let line = line_of(&pair);
    let text = pair.as_str();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let parsed = match digits.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse(),
    };
    let value = parsed.map_err(|_| structural(line, format!("Invalid number \"{}\".", text)))?;
    Ok(if negative { -value } else { value })
}
