use crate::language::span::Span;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
}

#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl FunctionDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Statement {
    VarDef(VarDef),
    Assign(Assign),
    Call(Call),
    Return(Return),
    If(IfStmt),
    For(ForStmt),
    Try(TryStmt),
    Raise(RaiseStmt),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::VarDef(stmt) => stmt.span,
            Statement::Assign(stmt) => stmt.span,
            Statement::Call(call) => call.span,
            Statement::Return(stmt) => stmt.span,
            Statement::If(stmt) => stmt.span,
            Statement::For(stmt) => stmt.span,
            Statement::Try(stmt) => stmt.span,
            Statement::Raise(stmt) => stmt.span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct VarDef {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Assign {
    pub name: String,
    pub expr: Rc<Expr>,
    pub span: Span,
}

/// A call site. Arguments are shared so they can be captured by thunks without copying.
#[derive(Clone, Debug)]
pub struct Call {
    pub name: String,
    pub args: Vec<Rc<Expr>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Return {
    pub expr: Option<Rc<Expr>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub statements: Vec<Statement>,
    pub else_statements: Option<Vec<Statement>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ForStmt {
    pub init: Box<Statement>,
    pub condition: Expr,
    pub update: Box<Statement>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TryStmt {
    pub statements: Vec<Statement>,
    pub catchers: Vec<Catch>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Catch {
    pub exception_type: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct RaiseStmt {
    pub exception_type: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Int(i64),
    String(String),
    Bool(bool),
    Nil,
    Var(String),
    Call(Call),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Int(value) => write!(f, "{value}"),
            ExprKind::String(value) => write!(f, "\"{value}\""),
            ExprKind::Bool(value) => write!(f, "{value}"),
            ExprKind::Nil => write!(f, "nil"),
            ExprKind::Var(name) => write!(f, "{name}"),
            ExprKind::Call(call) => {
                write!(f, "{}(", call.name)?;
                for (idx, arg) in call.args.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            ExprKind::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op.symbol(), operand),
        }
    }
}
