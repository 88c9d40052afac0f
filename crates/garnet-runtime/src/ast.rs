//! Abstract Syntax Tree (AST) definitions
//!
//! Garnet is expression-oriented: every construct, including `if`, `while`
//! and `def`, produces a value, so there is a single `Expr` node type and a
//! body is just a list of expressions.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// AST schema version
///
/// Included in JSON dumps so tooling can detect incompatible changes.
pub const AST_VERSION: u32 = 1;

/// Top-level program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Body,
}

/// Sequence of expressions; evaluates to the last one (nil when empty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub exprs: Vec<Expr>,
    pub span: Span,
}

impl Body {
    pub fn empty(span: Span) -> Self {
        Self {
            exprs: Vec::new(),
            span,
        }
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal, Span),
    /// Double-quoted string with `#{}` pieces
    Interpolated(InterpolatedStr),
    SelfRef(Span),
    /// Read of a local variable
    Local(Identifier),
    /// Read of a constant
    Constant(Identifier),
    Assign(Assign),
    CompoundAssign(CompoundAssign),
    /// Method call, including operators (`a + b` is `a.+(b)`)
    Call(CallExpr),
    Not(NotExpr),
    Logical(LogicalExpr),
    If(IfExpr),
    While(WhileExpr),
    Break(JumpExpr),
    Next(JumpExpr),
    Return(JumpExpr),
    Def(MethodDef),
    /// Parenthesised sequence: `(a; b)`
    Group(Body),
}

impl Expr {
    /// Source span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span) | Expr::SelfRef(span) => *span,
            Expr::Interpolated(s) => s.span,
            Expr::Local(id) | Expr::Constant(id) => id.span,
            Expr::Assign(a) => a.span,
            Expr::CompoundAssign(a) => a.span,
            Expr::Call(c) => c.span,
            Expr::Not(n) => n.span,
            Expr::Logical(l) => l.span,
            Expr::If(i) => i.span,
            Expr::While(w) => w.span,
            Expr::Break(j) | Expr::Next(j) | Expr::Return(j) => j.span,
            Expr::Def(d) => d.span,
            Expr::Group(b) => b.span,
        }
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// Piece of an interpolated string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StrPart {
    Text(String),
    Code(Body),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedStr {
    pub parts: Vec<StrPart>,
    pub span: Span,
}

/// Local variable assignment: `x = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub target: Identifier,
    pub value: Box<Expr>,
    pub span: Span,
}

/// Compound assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundOp {
    AddAssign, // +=
    SubAssign, // -=
    MulAssign, // *=
    DivAssign, // /=
}

impl CompoundOp {
    /// Method the operator expands to
    pub fn method_name(self) -> &'static str {
        match self {
            CompoundOp::AddAssign => "+",
            CompoundOp::SubAssign => "-",
            CompoundOp::MulAssign => "*",
            CompoundOp::DivAssign => "/",
        }
    }
}

/// Compound assignment: `x += value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundAssign {
    pub target: Identifier,
    pub op: CompoundOp,
    pub value: Box<Expr>,
    pub span: Span,
}

/// Method call
///
/// `receiver` is `None` for receiverless calls (`puts x`), which dispatch on
/// `self` and may reach private methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub receiver: Option<Box<Expr>>,
    pub method: Identifier,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `!expr` or `not expr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotExpr {
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Short-circuit operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And, // && / and
    Or,  // || / or
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpr {
    pub op: LogicalOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

/// `if`/`unless` and their modifier forms
///
/// `unless c then a else b end` is stored as `if c then b else a end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfExpr {
    pub cond: Box<Expr>,
    pub then_body: Body,
    pub else_body: Option<Body>,
    pub span: Span,
}

/// `while`/`until` loop (and modifier forms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileExpr {
    pub cond: Box<Expr>,
    /// True for `until` (loop while the condition is falsy)
    pub negated: bool,
    pub body: Body,
    pub span: Span,
}

/// `break`, `next` and `return` with an optional value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpExpr {
    pub value: Option<Box<Expr>>,
    pub span: Span,
}

/// `def name(params) ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub body: Body,
    pub span: Span,
}
