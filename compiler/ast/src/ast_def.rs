use std::fmt::{Display, Formatter};

/// Defines AST datatypes
///
/// The tree is strictly owned: every node has exactly one parent and nodes
/// are never mutated after construction.

#[derive(Debug, Eq, PartialEq)]
pub struct CompUnit {
    pub funcs: Vec<FuncDef>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct FuncDef {
    pub func_type: FuncType,
    pub ident: String,
    pub body: Block,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum FuncType {
    Int,
    Void,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Block {
    pub items: Vec<Stmt>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Stmt {
    Return {
        expr: Option<Expr>,
    },
    Compound {
        block: Block,
    },
    Assign {
        lval: Lval,
        expr: Expr,
    },
    If {
        condition: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    Decl(VarDecl),
}

/// A declaration group: `int a, b = 1, c;` is one `VarDecl` with three
/// `VarDef`s in source order. `int` is the only declarable type.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct VarDecl {
    pub defs: Vec<VarDef>,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct VarDef {
    pub ident: String,
    pub init: Option<Expr>,
}

/// A bare variable name in assignable position. Resolution to storage is
/// left to semantic analysis.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Lval {
    pub ident: String,
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Expr {
    Constant(i64),
    Var(Lval),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Relational and equality operators
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,

    // Logical operators
    And,
    Or,
}

impl Display for FuncType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FuncType::Int => write!(f, "int"),
            FuncType::Void => write!(f, "void"),
        }
    }
}
