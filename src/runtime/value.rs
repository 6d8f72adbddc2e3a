use crate::language::ast::Expr;
use crate::runtime::environment::Environment;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// The dynamic type of a value, used for operator dispatch and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Bool,
    String,
    Nil,
    Thunk,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Nil => "nil",
            ValueType::Thunk => "thunk",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(Rc<str>),
    Nil,
    Thunk(Thunk),
}

impl Value {
    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Value::String(text.into())
    }

    pub fn type_of(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Bool(_) => ValueType::Bool,
            Value::String(_) => ValueType::String,
            Value::Nil => ValueType::Nil,
            Value::Thunk(_) => ValueType::Thunk,
        }
    }

    pub fn is_thunk(&self) -> bool {
        matches!(self, Value::Thunk(_))
    }

    /// Text written by `print`. Nil contributes nothing.
    pub fn printable(&self) -> String {
        match self {
            Value::Int(value) => value.to_string(),
            Value::Bool(true) => "true".into(),
            Value::Bool(false) => "false".into(),
            Value::String(text) => text.to_string(),
            Value::Nil | Value::Thunk(_) => String::new(),
        }
    }

    /// Type-and-value equality between forced values; mismatched types are never equal.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::String(text) => write!(f, "\"{text}\""),
            Value::Nil => write!(f, "nil"),
            Value::Thunk(thunk) => write!(f, "<thunk {}>", thunk.expr),
        }
    }
}

/// A deferred expression together with the environment it must be evaluated in.
#[derive(Clone)]
pub struct Thunk {
    pub expr: Rc<Expr>,
    pub snapshot: Environment,
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("expr", &self.expr.to_string())
            .finish_non_exhaustive()
    }
}

/// Shared handle to a value cell.
///
/// Every binding, snapshot and argument list holds one of these. Forcing a thunk
/// overwrites the cell in place, so all holders observe the memoized result.
#[derive(Clone, Debug)]
pub struct ValueRef(Rc<RefCell<Value>>);

impl ValueRef {
    pub fn new(value: Value) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn nil() -> Self {
        Self::new(Value::Nil)
    }

    pub fn thunk(expr: Rc<Expr>, snapshot: Environment) -> Self {
        Self::new(Value::Thunk(Thunk { expr, snapshot }))
    }

    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    pub fn is_thunk(&self) -> bool {
        self.0.borrow().is_thunk()
    }

    pub fn type_of(&self) -> ValueType {
        self.0.borrow().type_of()
    }

    /// The pending thunk, if this cell has not been forced yet.
    pub fn pending(&self) -> Option<Thunk> {
        match &*self.0.borrow() {
            Value::Thunk(thunk) => Some(thunk.clone()),
            _ => None,
        }
    }

    /// Replace the cell's contents; used once per thunk when it is forced.
    pub fn memoize(&self, value: Value) {
        debug_assert!(!value.is_thunk(), "memoized a thunk into a thunk cell");
        *self.0.borrow_mut() = value;
    }

    pub fn ptr_eq(&self, other: &ValueRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Value> for ValueRef {
    fn from(value: Value) -> Self {
        ValueRef::new(value)
    }
}
