//! Statements and function bodies
//!
//! Statement nodes are allocated before their children so the arena keeps
//! source order; extents are stretched once the statement is complete.

use smol_str::SmolStr;

use super::DeclContext;
use super::declarations::{
    Terminator, parse_declaration, parse_init_declarators, parse_static_assert, parse_using,
    starts_declaration,
};
use super::expressions::{parse_conditional_expression, parse_expression};
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::{CursorKind, NodeId};

/// `{ statement* }`, appended to `parent`.
pub(crate) fn parse_compound_statement(p: &mut Parser<'_>, parent: NodeId) -> NodeId {
    let start = p.loc();
    let id = p.node(CursorKind::CompoundStmt, "", start, start);
    p.attach(parent, id);
    p.expect(SyntaxKind::L_BRACE);
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        let before = p.position();
        parse_statement(p, id);
        if p.position() == before {
            p.bump();
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node(id);
    id
}

pub(crate) fn parse_statement(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    match p.current_kind() {
        SyntaxKind::L_BRACE => {
            parse_compound_statement(p, parent);
        }
        SyntaxKind::SEMICOLON => {
            p.bump();
            let id = p.node(CursorKind::NullStmt, "", start, start);
            p.attach(parent, id);
        }
        SyntaxKind::IF_KW => parse_if(p, parent),
        SyntaxKind::WHILE_KW => parse_while(p, parent),
        SyntaxKind::DO_KW => parse_do(p, parent),
        SyntaxKind::FOR_KW => parse_for(p, parent),
        SyntaxKind::SWITCH_KW => parse_switch(p, parent),
        SyntaxKind::CASE_KW => parse_case(p, parent),
        SyntaxKind::DEFAULT_KW => {
            p.bump();
            let id = p.node(CursorKind::DefaultStmt, "", start, start);
            p.attach(parent, id);
            p.expect(SyntaxKind::COLON);
            parse_sub_statement(p, id);
            p.finish_node(id);
        }
        SyntaxKind::RETURN_KW => {
            p.bump();
            let id = p.node(CursorKind::ReturnStmt, "", start, start);
            p.attach(parent, id);
            if !p.at(SyntaxKind::SEMICOLON) {
                let value = parse_expression(p);
                p.attach_opt(id, value);
            }
            expect_semicolon(p, "return statement");
            p.finish_node(id);
        }
        SyntaxKind::BREAK_KW | SyntaxKind::CONTINUE_KW => {
            let (kind, what) = if p.at(SyntaxKind::BREAK_KW) {
                (CursorKind::BreakStmt, "break")
            } else {
                (CursorKind::ContinueStmt, "continue")
            };
            p.bump();
            let id = p.node(kind, "", start, start);
            p.attach(parent, id);
            if !p.eat(SyntaxKind::SEMICOLON) {
                p.error_expected(&format!("';' after {what} statement"));
            }
            p.finish_node(id);
        }
        SyntaxKind::GOTO_KW => parse_goto(p, parent),
        SyntaxKind::IDENT if p.nth(1) == SyntaxKind::COLON => {
            let name = SmolStr::new(p.current_text());
            p.bump();
            p.bump();
            let id = p.node(CursorKind::LabelStmt, name, start, start);
            p.attach(parent, id);
            parse_sub_statement(p, id);
            p.finish_node(id);
        }
        SyntaxKind::USING_KW => wrap_decl_stmt(p, parent, parse_using),
        SyntaxKind::STATIC_ASSERT_KW => wrap_decl_stmt(p, parent, parse_static_assert),
        _ if starts_declaration(p) => {
            wrap_decl_stmt(p, parent, |p, stmt| parse_declaration(p, stmt, DeclContext::Block))
        }
        _ => {
            let Some(expr) = parse_expression(p) else {
                p.recover();
                return;
            };
            p.attach(parent, expr);
            expect_semicolon(p, "expression");
        }
    }
}

/// The statement a label or loop owns. A missing one is reported and
/// leaves the owner without a body.
fn parse_sub_statement(p: &mut Parser<'_>, parent: NodeId) {
    if p.at(SyntaxKind::R_BRACE) || p.at_eof() {
        p.error("expected statement", p.loc());
        return;
    }
    parse_statement(p, parent);
}

fn expect_semicolon(p: &mut Parser<'_>, after: &str) {
    if !p.eat(SyntaxKind::SEMICOLON) {
        p.error_expected(&format!("';' after {after}"));
        p.recover();
    }
}

fn wrap_decl_stmt(p: &mut Parser<'_>, parent: NodeId, body: impl FnOnce(&mut Parser<'_>, NodeId)) {
    let start = p.loc();
    let stmt = p.node(CursorKind::DeclStmt, "", start, start);
    p.attach(parent, stmt);
    body(p, stmt);
    p.finish_node(stmt);
}

/// `( condition )`; in C++ the condition may declare a variable.
fn parse_condition(p: &mut Parser<'_>, owner: NodeId) {
    if !p.expect(SyntaxKind::L_PAREN) {
        return;
    }
    if p.cplusplus() && starts_declaration(p) {
        parse_init_declarators(p, owner, DeclContext::Block);
    } else {
        let cond = parse_expression(p);
        p.attach_opt(owner, cond);
    }
    if !p.expect(SyntaxKind::R_PAREN) {
        while !p.at_eof() && !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::L_BRACE, SyntaxKind::SEMICOLON]) {
            p.bump();
        }
        p.eat(SyntaxKind::R_PAREN);
    }
}

fn parse_if(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::IfStmt, "", start, start);
    p.attach(parent, id);
    if p.cplusplus() {
        p.eat(SyntaxKind::CONSTEXPR_KW);
    }
    parse_condition(p, id);
    parse_sub_statement(p, id);
    if p.eat(SyntaxKind::ELSE_KW) {
        parse_sub_statement(p, id);
    }
    p.finish_node(id);
}

fn parse_while(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::WhileStmt, "", start, start);
    p.attach(parent, id);
    parse_condition(p, id);
    parse_sub_statement(p, id);
    p.finish_node(id);
}

fn parse_do(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::DoStmt, "", start, start);
    p.attach(parent, id);
    parse_sub_statement(p, id);
    if !p.eat(SyntaxKind::WHILE_KW) {
        p.error_expected("'while' in do/while loop");
        p.recover();
        p.finish_node(id);
        return;
    }
    parse_condition(p, id);
    expect_semicolon(p, "do/while statement");
    p.finish_node(id);
}

/// `for (init; cond; inc)` and the C++11 `for (decl : range)` form.
fn parse_for(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::ForStmt, "", start, start);
    p.attach(parent, id);
    if !p.expect(SyntaxKind::L_PAREN) {
        p.recover();
        p.finish_node(id);
        return;
    }

    if starts_declaration(p) {
        let decl_start = p.loc();
        let stmt = p.node(CursorKind::DeclStmt, "", decl_start, decl_start);
        p.attach(id, stmt);
        let terminator = parse_init_declarators(p, stmt, DeclContext::Block);
        p.finish_node(stmt);
        if terminator == Terminator::Semicolon && p.cplusplus() && p.eat(SyntaxKind::COLON) {
            let range = parse_expression(p);
            p.attach_opt(id, range);
            p.expect(SyntaxKind::R_PAREN);
            parse_sub_statement(p, id);
            p.finish_node(id);
            return;
        }
        if !p.eat(SyntaxKind::SEMICOLON) {
            p.error_expected("';' in 'for' statement specifier");
        }
    } else if !p.eat(SyntaxKind::SEMICOLON) {
        let init = parse_expression(p);
        p.attach_opt(id, init);
        if !p.eat(SyntaxKind::SEMICOLON) {
            p.error_expected("';' in 'for' statement specifier");
        }
    }

    if !p.at(SyntaxKind::SEMICOLON) {
        let cond = parse_expression(p);
        p.attach_opt(id, cond);
    }
    if !p.eat(SyntaxKind::SEMICOLON) {
        p.error_expected("';' in 'for' statement specifier");
    }
    if !p.at(SyntaxKind::R_PAREN) {
        let inc = parse_expression(p);
        p.attach_opt(id, inc);
    }
    if !p.expect(SyntaxKind::R_PAREN) {
        while !p.at_eof() && !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::L_BRACE]) {
            p.bump();
        }
        p.eat(SyntaxKind::R_PAREN);
    }
    parse_sub_statement(p, id);
    p.finish_node(id);
}

fn parse_switch(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::SwitchStmt, "", start, start);
    p.attach(parent, id);
    parse_condition(p, id);
    parse_sub_statement(p, id);
    p.finish_node(id);
}

/// `case value:` or the GNU `case low ... high:` range.
fn parse_case(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::CaseStmt, "", start, start);
    p.attach(parent, id);
    let value = parse_conditional_expression(p);
    p.attach_opt(id, value);
    if p.eat(SyntaxKind::ELLIPSIS) {
        let high = parse_conditional_expression(p);
        p.attach_opt(id, high);
    }
    if !p.eat(SyntaxKind::COLON) {
        p.error_expected("':' after 'case'");
    }
    parse_sub_statement(p, id);
    p.finish_node(id);
}

fn parse_goto(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::GotoStmt, "", start, start);
    p.attach(parent, id);
    if p.at(SyntaxKind::IDENT) {
        let location = p.loc();
        let name = SmolStr::new(p.current_text());
        p.bump();
        let label = p.node(CursorKind::LabelRef, name, location, location);
        p.attach(id, label);
    } else {
        p.error_expected("identifier");
    }
    expect_semicolon(p, "goto statement");
    p.finish_node(id);
}
