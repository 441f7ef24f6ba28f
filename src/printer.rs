// File: src/printer.rs
//
// Debug pretty-printer for parsed programs. Renders each top-level statement
// as a parenthesised S-expression on its own line. Used by `tinypy --ast`;
// evaluation never looks at its output.

use crate::ast::{Expr, Stmt};
use crate::lexer::TokenKind;

pub fn print_program(stmts: &[Stmt]) -> String {
    stmts.iter().map(print_stmt).collect::<Vec<_>>().join("\n")
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Block(stmts) => {
            let parts: Vec<String> = stmts.iter().map(print_stmt).collect();
            parenthesize("Block", &parts)
        }
        Stmt::ExprStmt(expr) => parenthesize("Expression", &[print_expr(expr)]),
        Stmt::FuncDef(decl) => {
            let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme.as_str()).collect();
            let mut parts = vec![decl.name().to_string(), format!("({})", params.join(" "))];
            parts.extend(decl.body.iter().map(print_stmt));
            parenthesize("Function", &parts)
        }
        Stmt::If { condition, then_branch, else_branch } => {
            let mut parts = vec![print_expr(condition), print_stmt(then_branch)];
            if let Some(else_branch) = else_branch {
                parts.push(print_stmt(else_branch));
            }
            parenthesize("If", &parts)
        }
        Stmt::Print(args) => {
            let parts: Vec<String> = args.iter().map(print_expr).collect();
            parenthesize("Print", &parts)
        }
        Stmt::Return { value, .. } => {
            let parts: Vec<String> = value.iter().map(print_expr).collect();
            parenthesize("Return", &parts)
        }
        Stmt::Var { name, initializer } => {
            let mut parts = vec![name.lexeme.clone()];
            parts.extend(initializer.iter().map(print_expr));
            parenthesize("Var", &parts)
        }
    }
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Binary { left, op, right } | Expr::Logical { left, op, right } => {
            parenthesize(op.kind.name(), &[print_expr(left), print_expr(right)])
        }
        Expr::Call { callee, args, .. } => {
            let mut parts = vec![callee.lexeme.clone()];
            parts.extend(args.iter().map(print_expr));
            parenthesize("Call", &parts)
        }
        Expr::Grouping(inner) => parenthesize("group", &[print_expr(inner)]),
        Expr::Literal { token, value } => match token.kind {
            TokenKind::True | TokenKind::False | TokenKind::None => {
                format!("({})", token.kind.name())
            }
            _ => parenthesize(token.kind.name(), &[value.clone()]),
        },
        Expr::Unary { op, right } => parenthesize(op.kind.name(), &[print_expr(right)]),
    }
}

fn parenthesize(name: &str, parts: &[String]) -> String {
    let mut out = format!("({name}");
    for part in parts {
        out.push(' ');
        out.push_str(part);
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;

    fn render(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        print_program(&Parser::new(tokens).parse().unwrap())
    }

    #[test]
    fn prints_precedence_as_nesting() {
        assert_eq!(
            render("x = 1 + 2 * 3\n"),
            "(Var x (PLUS (NUMBER 1) (MULTIPLY (NUMBER 2) (NUMBER 3))))"
        );
    }

    #[test]
    fn prints_calls_grouping_and_unary() {
        assert_eq!(
            render("print(f(-a), (not True))\n"),
            "(Print (Call f (MINUS (IDENTIFIER a))) (group (NOT (TRUE))))"
        );
    }

    #[test]
    fn prints_functions_and_blocks() {
        let source = "def f(a, b):\n    if a:\n        return\n    else:\n        return b\n";
        assert_eq!(
            render(source),
            "(Function f (a b) (If (IDENTIFIER a) (Block (Return)) (Block (Return (IDENTIFIER b)))))"
        );
    }

    #[test]
    fn keyword_literals_have_no_payload() {
        assert_eq!(
            render("print(True, None, \"\", \"False\")\n"),
            "(Print (TRUE) (NONE) (STRING ) (STRING False))"
        );
    }

    #[test]
    fn one_line_per_top_level_statement() {
        assert_eq!(
            render("x = \"hi\"\nprint(x)\n"),
            "(Var x (STRING hi))\n(Print (IDENTIFIER x))"
        );
    }
}
