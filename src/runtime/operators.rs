//! Operator dispatch keyed by the left operand's type, then by operator.

use crate::language::ast::{BinaryOp, UnaryOp};
use crate::language::span::Span;
use crate::runtime::{
    error::{EvalResult, Exception, Interrupt, RuntimeError, RuntimeResult},
    value::{Value, ValueType},
};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpError {
    DivideByZero,
    Operands,
}

pub type BinaryFn = fn(&Value, &Value) -> Result<Value, OpError>;

pub struct OperatorTable {
    binary: HashMap<ValueType, HashMap<BinaryOp, BinaryFn>>,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorTable {
    pub fn new() -> Self {
        let mut binary: HashMap<ValueType, HashMap<BinaryOp, BinaryFn>> = HashMap::new();

        let int = binary.entry(ValueType::Int).or_default();
        int.insert(BinaryOp::Add, |l, r| ints(l, r).map(|(a, b)| Value::Int(a.wrapping_add(b))));
        int.insert(BinaryOp::Sub, |l, r| ints(l, r).map(|(a, b)| Value::Int(a.wrapping_sub(b))));
        int.insert(BinaryOp::Mul, |l, r| ints(l, r).map(|(a, b)| Value::Int(a.wrapping_mul(b))));
        int.insert(BinaryOp::Div, |l, r| {
            let (a, b) = ints(l, r)?;
            floor_div(a, b).map(Value::Int)
        });
        int.insert(BinaryOp::Lt, |l, r| ints(l, r).map(|(a, b)| Value::Bool(a < b)));
        int.insert(BinaryOp::LtEq, |l, r| ints(l, r).map(|(a, b)| Value::Bool(a <= b)));
        int.insert(BinaryOp::Gt, |l, r| ints(l, r).map(|(a, b)| Value::Bool(a > b)));
        int.insert(BinaryOp::GtEq, |l, r| ints(l, r).map(|(a, b)| Value::Bool(a >= b)));

        let string = binary.entry(ValueType::String).or_default();
        string.insert(BinaryOp::Add, |l, r| match (l, r) {
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
            _ => Err(OpError::Operands),
        });

        let boolean = binary.entry(ValueType::Bool).or_default();
        boolean.insert(BinaryOp::And, |l, r| bools(l, r).map(|(a, b)| Value::Bool(a && b)));
        boolean.insert(BinaryOp::Or, |l, r| bools(l, r).map(|(a, b)| Value::Bool(a || b)));

        binary.entry(ValueType::Nil).or_default();

        for ops in binary.values_mut() {
            ops.insert(BinaryOp::Eq, |l, r| Ok(Value::Bool(l.same_as(r))));
            ops.insert(BinaryOp::NotEq, |l, r| Ok(Value::Bool(!l.same_as(r))));
        }

        Self { binary }
    }

    pub fn lookup(&self, left: ValueType, op: BinaryOp) -> Option<BinaryFn> {
        self.binary.get(&left)?.get(&op).copied()
    }

    /// Applies `op` to two forced values. Division by zero raises the catchable
    /// exception `"div0"` instead of aborting the run.
    pub fn apply(&self, op: BinaryOp, left: &Value, right: &Value, span: Span) -> EvalResult<Value> {
        let equality = matches!(op, BinaryOp::Eq | BinaryOp::NotEq);
        if !equality && left.type_of() != right.type_of() {
            return Err(Interrupt::Fatal(RuntimeError::type_mismatch(
                format!(
                    "Incompatible types {} and {} for `{}`",
                    left.type_of(),
                    right.type_of(),
                    op.symbol()
                ),
                span,
            )));
        }
        let Some(func) = self.lookup(left.type_of(), op) else {
            return Err(Interrupt::Fatal(RuntimeError::type_mismatch(
                format!(
                    "Operator `{}` is not supported for type {}",
                    op.symbol(),
                    left.type_of()
                ),
                span,
            )));
        };
        match func(left, right) {
            Ok(value) => Ok(value),
            Err(OpError::DivideByZero) => Err(Interrupt::Raise(Exception::new("div0", span))),
            Err(OpError::Operands) => Err(Interrupt::Fatal(RuntimeError::type_mismatch(
                format!("Invalid operands for `{}`", op.symbol()),
                span,
            ))),
        }
    }
}

pub fn apply_unary(op: UnaryOp, operand: &Value, span: Span) -> RuntimeResult<Value> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int(value)) => Ok(Value::Int(value.wrapping_neg())),
        (UnaryOp::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
        (UnaryOp::Neg, other) => Err(RuntimeError::type_mismatch(
            format!("Unary `-` expects int, found {}", other.type_of()),
            span,
        )),
        (UnaryOp::Not, other) => Err(RuntimeError::type_mismatch(
            format!("Unary `!` expects bool, found {}", other.type_of()),
            span,
        )),
    }
}

/// Integer division rounding toward negative infinity.
pub fn floor_div(a: i64, b: i64) -> Result<i64, OpError> {
    if b == 0 {
        return Err(OpError::DivideByZero);
    }
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn ints(left: &Value, right: &Value) -> Result<(i64, i64), OpError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        _ => Err(OpError::Operands),
    }
}

fn bools(left: &Value, right: &Value) -> Result<(bool, bool), OpError> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok((*a, *b)),
        _ => Err(OpError::Operands),
    }
}
