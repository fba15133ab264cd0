//! Abstract Syntax Tree definitions for the cell language.
//!
//! The tree covers the Python subset the executor runs: simple and compound statements, functions, `try`
//! blocks, comprehensions and lambdas. Every statement and expression carries a byte-offset [`Span`] into the
//! cell source so the executor can report line numbers in tracebacks.

use std::fmt;

use testmynb_core::lang::operators::{self, OperatorId};

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

/// A parsed cell: the statements of its body, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Spanned<Statement>>,
}

pub type Block = Vec<Spanned<Statement>>;

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Spanned<Expr>),
    /// `a = b = value`; one entry in `targets` per `=`.
    Assign(AssignStmt),
    AugAssign(AugAssignStmt),
    /// `x: int` without a value only declares; it is kept so spans stay accurate.
    AnnAssign(AnnAssignStmt),
    Assert(AssertStmt),
    Raise(Option<Spanned<Expr>>),
    Return(Option<Spanned<Expr>>),
    Del(Vec<Spanned<Target>>),
    Global(Vec<Ident>),
    Pass,
    Break,
    Continue,
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Try(TryStmt),
    FunctionDef(FunctionDef),
    Import(Vec<ImportName>),
    FromImport(FromImportStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub targets: Vec<Spanned<Target>>,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugAssignStmt {
    pub target: Spanned<Target>,
    pub op: BinaryOp,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnAssignStmt {
    pub target: Spanned<Target>,
    pub annotation: Spanned<Expr>,
    pub value: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmt {
    pub test: Spanned<Expr>,
    pub msg: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Spanned<Expr>,
    pub then_body: Block,
    pub elif_branches: Vec<(Spanned<Expr>, Block)>,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Spanned<Expr>,
    pub body: Block,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub target: Spanned<Target>,
    pub iter: Spanned<Expr>,
    pub body: Block,
    pub else_body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub body: Block,
    pub handlers: Vec<Spanned<ExceptHandler>>,
    pub else_body: Option<Block>,
    pub finally_body: Option<Block>,
}

/// `except [kind [as name]]: body`
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub kind: Option<Spanned<Expr>>,
    pub name: Option<Ident>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub params: Vec<Spanned<Param>>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Normal,
    /// `*args`
    VarArgs,
    /// `**kwargs`
    KwArgs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub kind: ParamKind,
    pub default: Option<Spanned<Expr>>,
}

/// `import a.b as c`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportName {
    pub path: Vec<Ident>,
    pub alias: Option<Ident>,
}

impl ImportName {
    /// Dotted module path as written (`"os.path"`).
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// `from module import a as b, c` (or `*`, recorded as an empty `names` list with `star = true`).
#[derive(Debug, Clone, PartialEq)]
pub struct FromImportStmt {
    pub module: Vec<Ident>,
    pub names: Vec<(Ident, Option<Ident>)>,
    pub star: bool,
}

// ============================================================================
// Assignment targets
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(Ident),
    Attribute(Box<Spanned<Expr>>, Ident),
    Index(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    Slice(Box<Spanned<Expr>>, SliceExpr),
    /// `a, b` / `(a, b)` / `[a, b]` unpacking.
    Tuple(Vec<Spanned<Target>>),
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Literal(Literal),
    FString(Vec<FStringPart>),
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
    Unary(UnaryOp, Box<Spanned<Expr>>),
    /// `a < b <= c`: the first operand and each `(op, operand)` link of the chain.
    Compare(Box<Spanned<Expr>>, Vec<(CompareOp, Spanned<Expr>)>),
    Call(Box<Spanned<Expr>>, Vec<CallArg>),
    MethodCall(Box<Spanned<Expr>>, Ident, Vec<CallArg>),
    Field(Box<Spanned<Expr>>, Ident),
    Index(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    Slice(Box<Spanned<Expr>>, SliceExpr),
    List(Vec<Spanned<Expr>>),
    Tuple(Vec<Spanned<Expr>>),
    Dict(Vec<(Spanned<Expr>, Spanned<Expr>)>),
    /// Also used for generator expressions, which are evaluated eagerly.
    ListComp(Box<ListComp>),
    DictComp(Box<DictComp>),
    Lambda(Vec<Spanned<Param>>, Box<Spanned<Expr>>),
    IfExp(Box<IfExpr>),
    Paren(Box<Spanned<Expr>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    /// Digits of an integer literal beyond 64 bits; every character is a valid digit in `radix`.
    BigInt { digits: String, radix: u32 },
    Float(f64),
    String(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    Literal(String),
    Expr {
        expr: Spanned<Expr>,
        /// `!r`, `!s` or `!a`
        conversion: Option<char>,
        format_spec: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Positional(Spanned<Expr>),
    Named(Ident, Spanned<Expr>),
    /// `*iterable`
    Star(Spanned<Expr>),
    /// `**mapping`
    DoubleStar(Spanned<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub start: Option<Box<Spanned<Expr>>>,
    pub end: Option<Box<Spanned<Expr>>>,
    pub step: Option<Box<Spanned<Expr>>>,
}

/// One `for target in iter if cond...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub target: Spanned<Target>,
    pub iter: Spanned<Expr>,
    pub conditions: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListComp {
    pub expr: Spanned<Expr>,
    pub generators: Vec<Comprehension>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictComp {
    pub key: Spanned<Expr>,
    pub value: Spanned<Expr>,
    pub generators: Vec<Comprehension>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Spanned<Expr>,
    pub then_expr: Spanned<Expr>,
    pub else_expr: Spanned<Expr>,
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    And,
    Or,
}

impl BinaryOp {
    /// Map an arithmetic operator id (or an augmented-assignment id) to the binary operation it performs.
    pub fn from_operator(id: OperatorId) -> Option<Self> {
        let base = operators::augmented_base(id).unwrap_or(id);
        Some(match base {
            OperatorId::Plus => BinaryOp::Add,
            OperatorId::Minus => BinaryOp::Sub,
            OperatorId::Star => BinaryOp::Mul,
            OperatorId::Slash => BinaryOp::Div,
            OperatorId::SlashSlash => BinaryOp::FloorDiv,
            OperatorId::Percent => BinaryOp::Mod,
            OperatorId::StarStar => BinaryOp::Pow,
            OperatorId::And => BinaryOp::And,
            OperatorId::Or => BinaryOp::Or,
            _ => return None,
        })
    }

    /// The registry operator id for this operation.
    pub fn operator_id(self) -> OperatorId {
        match self {
            BinaryOp::Add => OperatorId::Plus,
            BinaryOp::Sub => OperatorId::Minus,
            BinaryOp::Mul => OperatorId::Star,
            BinaryOp::Div => OperatorId::Slash,
            BinaryOp::FloorDiv => OperatorId::SlashSlash,
            BinaryOp::Mod => OperatorId::Percent,
            BinaryOp::Pow => OperatorId::StarStar,
            BinaryOp::And => OperatorId::And,
            BinaryOp::Or => OperatorId::Or,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(operators::as_str(self.operator_id()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    Is,
    IsNot,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => operators::as_str(OperatorId::EqEq),
            CompareOp::NotEq => operators::as_str(OperatorId::NotEq),
            CompareOp::Lt => operators::as_str(OperatorId::Lt),
            CompareOp::LtEq => operators::as_str(OperatorId::LtEq),
            CompareOp::Gt => operators::as_str(OperatorId::Gt),
            CompareOp::GtEq => operators::as_str(OperatorId::GtEq),
            CompareOp::In => "in",
            CompareOp::NotIn => "not in",
            CompareOp::Is => "is",
            CompareOp::IsNot => "is not",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Pos => write!(f, "+"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}
