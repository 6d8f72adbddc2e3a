use crate::language::{ast::*, span::Span};
use crate::runtime::{
    console::Console,
    environment::Environment,
    error::{EvalResult, Exception, Interrupt, RuntimeError, RuntimeResult},
    functions::FunctionTable,
    operators::{apply_unary, OperatorTable},
    value::{Value, ValueRef},
};

/// How a statement, block or call finished.
#[derive(Clone, Debug)]
pub enum ExecStatus {
    Continue,
    Return(ValueRef),
    Raise(Exception),
}

/// Turns an in-flight raise back into a status at a statement boundary.
macro_rules! or_raise {
    ($eval:expr) => {
        match settle($eval)? {
            Ok(value) => value,
            Err(exception) => return Ok(ExecStatus::Raise(exception)),
        }
    };
}

fn settle<T>(result: EvalResult<T>) -> RuntimeResult<Result<T, Exception>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(Interrupt::Raise(exception)) => Ok(Err(exception)),
        Err(Interrupt::Fatal(err)) => Err(err),
    }
}

pub struct Interpreter<C: Console> {
    functions: FunctionTable,
    operators: OperatorTable,
    env: Environment,
    console: C,
}

impl<C: Console> Interpreter<C> {
    pub fn new(program: &Program, console: C) -> Self {
        Self {
            functions: FunctionTable::build(program),
            operators: OperatorTable::new(),
            env: Environment::new(),
            console,
        }
    }

    /// Calls `main()` with a fresh environment. An exception nobody catches becomes a fault.
    pub fn run(&mut self) -> RuntimeResult<()> {
        self.env = Environment::new();
        let main = self.functions.resolve("main", 0, Span::default())?;
        match self.invoke(&main, Vec::new())? {
            ExecStatus::Raise(exception) => {
                tracing::debug!(exception = %exception.tag, "uncaught exception");
                Err(RuntimeError::fault(&exception))
            }
            ExecStatus::Continue | ExecStatus::Return(_) => Ok(()),
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %def.name, arity = def.arity()))]
    fn invoke(&mut self, def: &FunctionDef, args: Vec<ValueRef>) -> RuntimeResult<ExecStatus> {
        self.env.push_func();
        for (param, arg) in def.params.iter().zip(args) {
            if !self.env.create(&param.name, arg) {
                self.env.pop_func();
                return Err(RuntimeError::name(
                    format!("Duplicate definition for parameter {}", param.name),
                    param.span,
                ));
            }
        }
        let status = self.run_statements(&def.statements);
        self.env.pop_func();
        status
    }

    /// Resolves and performs a call. The result is the callee's lazy return value.
    fn call_function(&mut self, call: &Call) -> EvalResult<ValueRef> {
        match call.name.as_str() {
            "print" => return self.call_print(call),
            "inputi" | "inputs" => return self.call_input(call),
            _ => {}
        }
        let def = self
            .functions
            .resolve(&call.name, call.args.len(), call.span)?;
        let snapshot = self.env.snapshot();
        let args = call
            .args
            .iter()
            .map(|arg| ValueRef::thunk(arg.clone(), snapshot.clone()))
            .collect();
        match self.invoke(&def, args)? {
            ExecStatus::Return(value) => Ok(value),
            ExecStatus::Continue => Ok(ValueRef::nil()),
            ExecStatus::Raise(exception) => Err(Interrupt::Raise(exception)),
        }
    }

    fn call_print(&mut self, call: &Call) -> EvalResult<ValueRef> {
        let mut line = String::new();
        for arg in &call.args {
            let value = self.eval_expr(arg)?;
            line.push_str(&value.borrow().printable());
        }
        self.console.output(&line);
        Ok(ValueRef::nil())
    }

    fn call_input(&mut self, call: &Call) -> EvalResult<ValueRef> {
        if call.args.len() > 1 {
            return Err(RuntimeError::name(
                format!("No {}() function that takes > 1 parameter", call.name),
                call.span,
            )
            .into());
        }
        if let Some(prompt) = call.args.first() {
            let prompt = self.eval_expr(prompt)?;
            let text = prompt.borrow().printable();
            self.console.output(&text);
        }
        let line = self.console.get_input().unwrap_or_default();
        if call.name == "inputi" {
            let number = line.trim().parse::<i64>().map_err(|_| {
                RuntimeError::type_mismatch(
                    format!("inputi() expected an integer but read `{line}`"),
                    call.span,
                )
            })?;
            Ok(ValueRef::new(Value::Int(number)))
        } else {
            Ok(ValueRef::new(Value::string(line)))
        }
    }

    /// Runs a block in its own scope. The scope is popped on every exit path.
    fn run_statements(&mut self, statements: &[Statement]) -> RuntimeResult<ExecStatus> {
        self.env.push_block();
        let mut status = Ok(ExecStatus::Continue);
        for statement in statements {
            match self.run_statement(statement) {
                Ok(ExecStatus::Continue) => {}
                other => {
                    status = other;
                    break;
                }
            }
        }
        self.env.pop_block();
        status
    }

    fn run_statement(&mut self, statement: &Statement) -> RuntimeResult<ExecStatus> {
        match statement {
            Statement::VarDef(def) => {
                if !self.env.create(&def.name, ValueRef::nil()) {
                    return Err(RuntimeError::name(
                        format!("Duplicate definition for variable {}", def.name),
                        def.span,
                    ));
                }
                Ok(ExecStatus::Continue)
            }
            Statement::Assign(assign) => {
                let deferred = ValueRef::thunk(assign.expr.clone(), self.env.snapshot());
                if !self.env.set(&assign.name, deferred) {
                    return Err(RuntimeError::name(
                        format!("Undefined variable {} in assignment", assign.name),
                        assign.span,
                    ));
                }
                Ok(ExecStatus::Continue)
            }
            Statement::Call(call) => {
                or_raise!(self.call_function(call));
                Ok(ExecStatus::Continue)
            }
            Statement::Return(ret) => {
                let value = match &ret.expr {
                    Some(expr) => ValueRef::thunk(expr.clone(), self.env.snapshot()),
                    None => ValueRef::nil(),
                };
                Ok(ExecStatus::Return(value))
            }
            Statement::If(stmt) => self.run_if(stmt),
            Statement::For(stmt) => self.run_for(stmt),
            Statement::Try(stmt) => self.run_try(stmt),
            Statement::Raise(stmt) => {
                let value = or_raise!(self.eval_expr(&stmt.exception_type));
                let tag = match &*value.borrow() {
                    Value::String(text) => text.clone(),
                    other => {
                        return Err(RuntimeError::type_mismatch(
                            format!(
                                "Raise condition does not evaluate to a string (found {})",
                                other.type_of()
                            ),
                            stmt.exception_type.span,
                        ))
                    }
                };
                tracing::debug!(exception = %tag, "raise");
                Ok(ExecStatus::Raise(Exception::new(tag, stmt.span)))
            }
        }
    }

    fn run_if(&mut self, stmt: &IfStmt) -> RuntimeResult<ExecStatus> {
        if or_raise!(self.eval_condition(&stmt.condition, "if")) {
            return self.run_statements(&stmt.statements);
        }
        match &stmt.else_statements {
            Some(statements) => self.run_statements(statements),
            None => Ok(ExecStatus::Continue),
        }
    }

    fn run_for(&mut self, stmt: &ForStmt) -> RuntimeResult<ExecStatus> {
        if let raised @ ExecStatus::Raise(_) = self.run_statement(&stmt.init)? {
            return Ok(raised);
        }
        while or_raise!(self.eval_condition(&stmt.condition, "for")) {
            match self.run_statements(&stmt.statements)? {
                ExecStatus::Continue => {}
                done => return Ok(done),
            }
            if let raised @ ExecStatus::Raise(_) = self.run_statement(&stmt.update)? {
                return Ok(raised);
            }
        }
        Ok(ExecStatus::Continue)
    }

    /// Runs the body; a raise is handed to the first catcher with the same tag,
    /// otherwise it keeps propagating to enclosing handlers.
    fn run_try(&mut self, stmt: &TryStmt) -> RuntimeResult<ExecStatus> {
        let exception = match self.run_statements(&stmt.statements)? {
            ExecStatus::Raise(exception) => exception,
            status => return Ok(status),
        };
        match stmt
            .catchers
            .iter()
            .find(|catcher| *catcher.exception_type == *exception.tag)
        {
            Some(catcher) => {
                tracing::debug!(exception = %exception.tag, "caught");
                self.run_statements(&catcher.statements)
            }
            None => Ok(ExecStatus::Raise(exception)),
        }
    }

    /// Eagerly evaluates a control-flow condition, which must be a bool.
    fn eval_condition(&mut self, expr: &Expr, construct: &str) -> EvalResult<bool> {
        let value = self.eval_expr(expr)?;
        let flag = match &*value.borrow() {
            Value::Bool(flag) => *flag,
            other => {
                return Err(RuntimeError::type_mismatch(
                    format!(
                        "Incompatible type for {construct} condition: expected bool, found {}",
                        other.type_of()
                    ),
                    expr.span,
                )
                .into())
            }
        };
        Ok(flag)
    }

    /// Evaluates an expression to a concrete value; never returns a thunk.
    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<ValueRef> {
        let value = match &expr.kind {
            ExprKind::Int(value) => ValueRef::new(Value::Int(*value)),
            ExprKind::String(text) => ValueRef::new(Value::string(text.as_str())),
            ExprKind::Bool(flag) => ValueRef::new(Value::Bool(*flag)),
            ExprKind::Nil => ValueRef::nil(),
            ExprKind::Var(name) => {
                let cell = self.env.get(name).ok_or_else(|| {
                    RuntimeError::name(format!("Variable {name} not found"), expr.span)
                })?;
                self.force(&cell)?;
                cell
            }
            ExprKind::Call(call) => {
                let result = self.call_function(call)?;
                self.force(&result)?;
                result
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                let result =
                    self.operators
                        .apply(*op, &left.borrow(), &right.borrow(), expr.span)?;
                ValueRef::new(result)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                let result = apply_unary(*op, &operand.borrow(), expr.span)?;
                ValueRef::new(result)
            }
        };
        debug_assert!(!value.is_thunk(), "expression evaluated to a thunk");
        Ok(value)
    }

    /// Evaluates a pending thunk in its captured environment and memoizes the result
    /// in place. Already-forced cells are left untouched.
    fn force(&mut self, cell: &ValueRef) -> EvalResult<()> {
        let Some(thunk) = cell.pending() else {
            return Ok(());
        };
        tracing::trace!(expr = %thunk.expr, "forcing thunk");
        let live = std::mem::replace(&mut self.env, thunk.snapshot);
        let result = self.eval_expr(&thunk.expr);
        self.env = live;
        let forced = result?.borrow().clone();
        cell.memoize(forced);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse_program;
    use crate::runtime::console::ScriptedConsole;
    use crate::runtime::value::ValueType;

    fn interpreter(source: &str) -> Interpreter<ScriptedConsole> {
        let program = parse_program(source).expect("parse");
        Interpreter::new(&program, ScriptedConsole::new())
    }

    #[test]
    fn environment_is_unwound_after_success_and_failure() {
        let mut ok = interpreter("func main() { var x; if (true) { var y; return 1; } }");
        ok.run().expect("run");
        assert_eq!(ok.environment().frame_depth(), 0);

        let mut failing = interpreter("func f() { var y; y = 1 + true; return y; } func main() { print(f()); }");
        assert!(failing.run().is_err());
        assert_eq!(failing.environment().frame_depth(), 0);
    }

    #[test]
    fn forcing_memoizes_into_the_shared_cell() {
        let mut interp = interpreter("func main() { }");
        interp.env.push_func();
        interp.env.create("a", ValueRef::new(Value::Int(20)));
        let expr = parse_program("func f() { return a + 1; }").expect("parse").functions[0]
            .statements[0]
            .clone();
        let Statement::Return(Return { expr: Some(expr), .. }) = expr else {
            panic!("expected return");
        };
        let cell = ValueRef::thunk(expr, interp.env.snapshot());
        let alias = cell.clone();

        interp.force(&cell).expect("force");

        assert_eq!(alias.type_of(), ValueType::Int);
        assert!(alias.borrow().same_as(&Value::Int(21)));
        assert_eq!(interp.environment().frame_depth(), 1);
    }

    #[test]
    fn missing_main_is_a_name_error() {
        let mut interp = interpreter("func helper() { }");
        let err = interp.run().unwrap_err();
        assert_eq!(err.kind(), crate::runtime::error::ErrorKind::NameError);
    }
}
