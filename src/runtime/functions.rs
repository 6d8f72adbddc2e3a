use crate::language::ast::{FunctionDef, Program};
use crate::language::span::Span;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FunctionKey {
    name: String,
    arity: usize,
}

/// Top-level functions, overloadable by argument count.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<FunctionKey, Rc<FunctionDef>>,
}

impl FunctionTable {
    pub fn build(program: &Program) -> Self {
        let mut table = FunctionTable::default();
        for def in &program.functions {
            table.register(def.clone());
        }
        table
    }

    pub fn register(&mut self, def: FunctionDef) {
        let key = FunctionKey {
            name: def.name.clone(),
            arity: def.arity(),
        };
        if let Some(previous) = self.functions.insert(key, Rc::new(def)) {
            tracing::warn!(
                name = %previous.name,
                arity = previous.arity(),
                "later definition replaces an earlier function with the same arity"
            );
        }
    }

    pub fn resolve(&self, name: &str, arity: usize, span: Span) -> RuntimeResult<Rc<FunctionDef>> {
        let key = FunctionKey {
            name: name.to_string(),
            arity,
        };
        if let Some(def) = self.functions.get(&key) {
            return Ok(def.clone());
        }
        let known = self.functions.keys().any(|key| key.name == name);
        let message = if known {
            format!("Function {name} taking {arity} parameters not found")
        } else {
            format!("Function {name} not found")
        };
        Err(RuntimeError::name(message, span))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
