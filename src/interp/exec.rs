//! Statement execution: assignments, control flow, `try`, definitions and imports.

use std::rc::Rc;

use testmynb_core::errors::ExceptionKind;
use testmynb_core::lang::exceptions;
use testmynb_syntax::ast::*;
use testmynb_syntax::diagnostics::CompileError;

use super::eval::ops;
use super::exceptions::{ExecResult, Raised};
use super::modules;
use super::scope::{LocalNames, Scope};
use super::value::{Function, FunctionBody, Value, collect_values, iter_values};
use super::{Flow, Interpreter};

impl Interpreter {
    // ========================================================================
    // Blocks
    // ========================================================================

    pub(super) fn exec_block(&mut self, block: &[Spanned<Statement>], scope: &Scope) -> ExecResult<Flow> {
        for stmt in block {
            match self.exec_statement(stmt, scope)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_statement(&mut self, stmt: &Spanned<Statement>, scope: &Scope) -> ExecResult<Flow> {
        self.set_offset(stmt.span.start);
        self.exec_statement_inner(stmt, scope).map_err(|raised| self.stamp(raised))
    }

    fn exec_statement_inner(&mut self, stmt: &Spanned<Statement>, scope: &Scope) -> ExecResult<Flow> {
        match &stmt.node {
            Statement::Expr(expr) => {
                self.eval(expr, scope)?;
            }
            Statement::Assign(assign) => {
                let value = self.eval(&assign.value, scope)?;
                for target in &assign.targets {
                    self.assign_target(target, value.clone(), scope)?;
                }
            }
            Statement::AugAssign(aug) => self.exec_aug_assign(aug, scope)?,
            Statement::AnnAssign(ann) => {
                if let Some(value) = &ann.value {
                    let value = self.eval(value, scope)?;
                    self.assign_target(&ann.target, value, scope)?;
                }
            }
            Statement::Assert(assert) => {
                if !self.eval(&assert.test, scope)?.truthy() {
                    let args = match &assert.msg {
                        Some(msg) => vec![self.eval(msg, scope)?],
                        None => Vec::new(),
                    };
                    return Err(Raised::with_args(ExceptionKind::AssertionError, args));
                }
            }
            Statement::Raise(expr) => return Err(self.exec_raise(expr.as_ref(), scope)?),
            Statement::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            Statement::Del(targets) => {
                for target in targets {
                    self.delete_target(target, scope)?;
                }
            }
            Statement::Global(_) | Statement::Pass => {}
            Statement::Break => return Ok(Flow::Break),
            Statement::Continue => return Ok(Flow::Continue),
            Statement::If(stmt) => return self.exec_if(stmt, scope),
            Statement::While(stmt) => return self.exec_while(stmt, scope),
            Statement::For(stmt) => return self.exec_for(stmt, scope),
            Statement::Try(stmt) => return self.exec_try(stmt, scope),
            Statement::FunctionDef(def) => {
                let func = self.make_function(def, stmt.span, scope)?;
                scope.assign(&def.name, func);
            }
            Statement::Import(names) => {
                for import in names {
                    let module = modules::import(&import.dotted())?;
                    match &import.alias {
                        Some(alias) => scope.assign(alias, module),
                        None => scope.assign(&import.path[0], module),
                    }
                }
            }
            Statement::FromImport(from) => self.exec_from_import(from, scope)?,
        }
        Ok(Flow::Normal)
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    pub(super) fn assign_target(&mut self, target: &Spanned<Target>, value: Value, scope: &Scope) -> ExecResult<()> {
        match &target.node {
            Target::Name(name) => scope.assign(name, value),
            Target::Attribute(obj, name) => {
                let obj = self.eval(obj, scope)?;
                let exists = self.get_attr(&obj, name).is_ok();
                return Err(Raised::readonly_attribute(&obj, name, exists));
            }
            Target::Index(obj, index) => {
                let obj = self.eval(obj, scope)?;
                let index = self.eval(index, scope)?;
                self.set_item(&obj, &index, value)?;
            }
            Target::Slice(obj, slice) => {
                let obj = self.eval(obj, scope)?;
                let bounds = self.eval_slice_bounds(slice, scope)?;
                self.set_slice(&obj, bounds, value)?;
            }
            Target::Tuple(targets) => {
                let items = collect_values(&value).map_err(|_| {
                    Raised::type_error(format!(
                        "cannot unpack non-iterable {} object",
                        value.type_name()
                    ))
                })?;
                if items.len() != targets.len() {
                    let expected = targets.len();
                    let message = if items.len() > expected {
                        format!("too many values to unpack (expected {expected})")
                    } else {
                        format!("not enough values to unpack (expected {expected}, got {})", items.len())
                    };
                    return Err(Raised::value_error(message));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign_target(target, item, scope)?;
                }
            }
        }
        Ok(())
    }

    fn exec_aug_assign(&mut self, aug: &AugAssignStmt, scope: &Scope) -> ExecResult<()> {
        match &aug.target.node {
            Target::Name(name) => {
                let current = scope.lookup(name)?;
                let rhs = self.eval(&aug.value, scope)?;
                let updated = ops::inplace_binary(aug.op, &current, &rhs)?;
                scope.assign(name, updated);
            }
            Target::Index(obj, index) => {
                let obj = self.eval(obj, scope)?;
                let index = self.eval(index, scope)?;
                let current = self.get_item(&obj, &index)?;
                let rhs = self.eval(&aug.value, scope)?;
                let updated = ops::inplace_binary(aug.op, &current, &rhs)?;
                self.set_item(&obj, &index, updated)?;
            }
            Target::Attribute(obj, name) => {
                let obj = self.eval(obj, scope)?;
                self.get_attr(&obj, name)?;
                return Err(Raised::readonly_attribute(&obj, name, true));
            }
            Target::Slice(..) | Target::Tuple(_) => {
                return Err(Raised::new(
                    ExceptionKind::SyntaxError,
                    "illegal expression for augmented assignment",
                ));
            }
        }
        Ok(())
    }

    fn delete_target(&mut self, target: &Spanned<Target>, scope: &Scope) -> ExecResult<()> {
        match &target.node {
            Target::Name(name) => scope.delete(name),
            Target::Index(obj, index) => {
                let obj = self.eval(obj, scope)?;
                let index = self.eval(index, scope)?;
                self.del_item(&obj, &index)
            }
            Target::Slice(obj, slice) => {
                let obj = self.eval(obj, scope)?;
                let bounds = self.eval_slice_bounds(slice, scope)?;
                self.del_slice(&obj, bounds)
            }
            Target::Attribute(obj, name) => {
                let obj = self.eval(obj, scope)?;
                let exists = self.get_attr(&obj, name).is_ok();
                Err(Raised::readonly_attribute(&obj, name, exists))
            }
            Target::Tuple(targets) => {
                for target in targets {
                    self.delete_target(target, scope)?;
                }
                Ok(())
            }
        }
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn exec_if(&mut self, stmt: &IfStmt, scope: &Scope) -> ExecResult<Flow> {
        if self.eval(&stmt.condition, scope)?.truthy() {
            return self.exec_block(&stmt.then_body, scope);
        }
        for (condition, body) in &stmt.elif_branches {
            if self.eval(condition, scope)?.truthy() {
                return self.exec_block(body, scope);
            }
        }
        match &stmt.else_body {
            Some(body) => self.exec_block(body, scope),
            None => Ok(Flow::Normal),
        }
    }

    fn exec_while(&mut self, stmt: &WhileStmt, scope: &Scope) -> ExecResult<Flow> {
        while self.eval(&stmt.condition, scope)?.truthy() {
            match self.exec_block(&stmt.body, scope)? {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
        }
        match &stmt.else_body {
            Some(body) => self.exec_block(body, scope),
            None => Ok(Flow::Normal),
        }
    }

    fn exec_for(&mut self, stmt: &ForStmt, scope: &Scope) -> ExecResult<Flow> {
        let iterable = self.eval(&stmt.iter, scope)?;
        for item in iter_values(&iterable)? {
            self.assign_target(&stmt.target, item, scope)?;
            match self.exec_block(&stmt.body, scope)? {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal | Flow::Continue => {}
            }
        }
        match &stmt.else_body {
            Some(body) => self.exec_block(body, scope),
            None => Ok(Flow::Normal),
        }
    }

    // ========================================================================
    // Exceptions
    // ========================================================================

    /// Build the exception a `raise` statement throws.
    fn exec_raise(&mut self, expr: Option<&Spanned<Expr>>, scope: &Scope) -> ExecResult<Raised> {
        let Some(expr) = expr else {
            return Ok(self.handling.last().cloned().unwrap_or_else(|| {
                Raised::new(ExceptionKind::RuntimeError, "No active exception to reraise")
            }));
        };
        match self.eval(expr, scope)? {
            Value::ExceptionType(kind) => Ok(Raised::with_args(kind, Vec::new())),
            Value::Exception(exc) => Ok(Raised::from_exception(exc)),
            _ => Ok(Raised::type_error("exceptions must derive from BaseException")),
        }
    }

    fn exec_try(&mut self, stmt: &TryStmt, scope: &Scope) -> ExecResult<Flow> {
        let outcome = match self.exec_block(&stmt.body, scope) {
            Ok(Flow::Normal) => match &stmt.else_body {
                Some(body) => self.exec_block(body, scope),
                None => Ok(Flow::Normal),
            },
            Ok(flow) => Ok(flow),
            Err(raised) => self.handle_exception(stmt, raised, scope),
        };

        let Some(finally_body) = &stmt.finally_body else {
            return outcome;
        };
        match self.exec_block(finally_body, scope)? {
            Flow::Normal => outcome,
            flow => Ok(flow),
        }
    }

    fn handle_exception(&mut self, stmt: &TryStmt, raised: Raised, scope: &Scope) -> ExecResult<Flow> {
        for handler in &stmt.handlers {
            let handler = &handler.node;
            let matches = match &handler.kind {
                None => true,
                Some(kind) => {
                    let class = self.eval(kind, scope)?;
                    exception_matches(raised.kind(), &class)?
                }
            };
            if !matches {
                continue;
            }

            if let Some(name) = &handler.name {
                scope.assign(name, Value::Exception(raised.exc.clone()));
            }
            self.handling.push(raised);
            let result = self.exec_block(&handler.body, scope);
            self.handling.pop();
            if let Some(name) = &handler.name {
                let _ = scope.delete(name);
            }
            return result;
        }
        Err(raised)
    }

    // ========================================================================
    // Definitions and imports
    // ========================================================================

    fn make_function(&mut self, def: &FunctionDef, span: Span, scope: &Scope) -> ExecResult<Value> {
        let defaults = self.eval_defaults(&def.params, scope)?;
        Ok(Value::Function(Rc::new(Function {
            name: def.name.as_str().into(),
            params: def.params.clone(),
            defaults,
            body: FunctionBody::Block(Rc::new(def.body.clone())),
            globals: scope.globals.clone(),
            enclosing: scope.frame.clone(),
            names: Rc::new(LocalNames::for_function(&def.params, &def.body)),
            lines: self.current_lines(),
            def_offset: span.start,
        })))
    }

    pub(super) fn eval_defaults(&mut self, params: &[Spanned<Param>], scope: &Scope) -> ExecResult<Vec<Option<Value>>> {
        params
            .iter()
            .map(|p| p.node.default.as_ref().map(|d| self.eval(d, scope)).transpose())
            .collect()
    }

    fn exec_from_import(&mut self, from: &FromImportStmt, scope: &Scope) -> ExecResult<()> {
        let module_name = from.module.join(".");
        let module = modules::import(&module_name)?;
        if from.star {
            for name in modules::public_names(&module_name) {
                scope.assign(name, self.get_attr(&module, name)?);
            }
            return Ok(());
        }
        for (name, alias) in &from.names {
            let value = self.get_attr(&module, name).map_err(|_| {
                Raised::new(
                    ExceptionKind::ImportError,
                    format!("cannot import name '{name}' from '{module_name}' (unknown location)"),
                )
            })?;
            scope.assign(alias.as_ref().unwrap_or(name), value);
        }
        Ok(())
    }
}

/// Whether an `except` clause naming `class` catches `kind`.
fn exception_matches(kind: ExceptionKind, class: &Value) -> ExecResult<bool> {
    match class {
        Value::ExceptionType(base) => Ok(exceptions::is_subclass(kind, *base)),
        Value::Tuple(classes) => {
            for class in classes.iter() {
                if exception_matches(kind, class)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(Raised::type_error(
            "catching classes that do not inherit from BaseException is not allowed",
        )),
    }
}

/// Reject `return` outside a function and `break`/`continue` outside a loop before anything runs.
pub(super) fn check_control_flow(
    block: &[Spanned<Statement>],
    in_function: bool,
    in_loop: bool,
) -> Result<(), CompileError> {
    for stmt in block {
        match &stmt.node {
            Statement::Return(_) if !in_function => {
                return Err(CompileError::syntax("'return' outside function".to_string(), stmt.span));
            }
            Statement::Break if !in_loop => {
                return Err(CompileError::syntax("'break' outside loop".to_string(), stmt.span));
            }
            Statement::Continue if !in_loop => {
                return Err(CompileError::syntax(
                    "'continue' not properly in loop".to_string(),
                    stmt.span,
                ));
            }
            Statement::If(stmt) => {
                check_control_flow(&stmt.then_body, in_function, in_loop)?;
                for (_, body) in &stmt.elif_branches {
                    check_control_flow(body, in_function, in_loop)?;
                }
                if let Some(body) = &stmt.else_body {
                    check_control_flow(body, in_function, in_loop)?;
                }
            }
            Statement::While(WhileStmt { body, else_body, .. }) | Statement::For(ForStmt { body, else_body, .. }) => {
                check_control_flow(body, in_function, true)?;
                if let Some(body) = else_body {
                    check_control_flow(body, in_function, in_loop)?;
                }
            }
            Statement::Try(stmt) => {
                check_control_flow(&stmt.body, in_function, in_loop)?;
                for handler in &stmt.handlers {
                    check_control_flow(&handler.node.body, in_function, in_loop)?;
                }
                for body in [&stmt.else_body, &stmt.finally_body].into_iter().flatten() {
                    check_control_flow(body, in_function, in_loop)?;
                }
            }
            Statement::FunctionDef(def) => check_control_flow(&def.body, true, false)?,
            _ => {}
        }
    }
    Ok(())
}
