//! Name resolution: module globals, function frames and closures.
//!
//! Local names are decided statically when a function is defined, as in Python: a name assigned anywhere in the
//! body (and not declared `global`) is local to every statement of that body. Reading it before assignment is an
//! `UnboundLocalError`, not a fallback to the global of the same name.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;
use testmynb_core::errors::ExceptionKind;
use testmynb_syntax::ast::{Comprehension, Param, Spanned, Statement, Target};

use super::builtins::builtin_value;
use super::exceptions::{ExecResult, Raised};
use super::value::Value;

/// Module-level bindings shared by every function defined in one namespace.
pub type Globals = Rc<RefCell<IndexMap<String, Value>>>;

/// The statically-known names of one function body.
#[derive(Debug, Default)]
pub struct LocalNames {
    pub locals: HashSet<String>,
    pub globals: HashSet<String>,
}

impl LocalNames {
    pub fn for_function(params: &[Spanned<Param>], body: &[Spanned<Statement>]) -> Self {
        let mut names = LocalNames::default();
        names.locals.extend(params.iter().map(|p| p.node.name.clone()));
        collect_block(body, &mut names);
        let globals = &names.globals;
        names.locals.retain(|name| !globals.contains(name));
        names
    }

    pub fn for_lambda(params: &[Spanned<Param>]) -> Self {
        LocalNames {
            locals: params.iter().map(|p| p.node.name.clone()).collect(),
            globals: HashSet::new(),
        }
    }

    /// Comprehension variables live in their own scope and do not leak.
    pub fn for_comprehension(generators: &[Comprehension]) -> Self {
        let mut names = LocalNames::default();
        for generator in generators {
            collect_target(&generator.target, &mut names);
        }
        names
    }
}

fn collect_block(block: &[Spanned<Statement>], names: &mut LocalNames) {
    for stmt in block {
        match &stmt.node {
            Statement::Assign(assign) => assign.targets.iter().for_each(|t| collect_target(t, names)),
            Statement::AugAssign(aug) => collect_target(&aug.target, names),
            Statement::AnnAssign(ann) => collect_target(&ann.target, names),
            Statement::Del(targets) => targets.iter().for_each(|t| collect_target(t, names)),
            Statement::Global(declared) => names.globals.extend(declared.iter().cloned()),
            Statement::If(stmt) => {
                collect_block(&stmt.then_body, names);
                for (_, body) in &stmt.elif_branches {
                    collect_block(body, names);
                }
                if let Some(body) = &stmt.else_body {
                    collect_block(body, names);
                }
            }
            Statement::While(stmt) => {
                collect_block(&stmt.body, names);
                if let Some(body) = &stmt.else_body {
                    collect_block(body, names);
                }
            }
            Statement::For(stmt) => {
                collect_target(&stmt.target, names);
                collect_block(&stmt.body, names);
                if let Some(body) = &stmt.else_body {
                    collect_block(body, names);
                }
            }
            Statement::Try(stmt) => {
                collect_block(&stmt.body, names);
                for handler in &stmt.handlers {
                    if let Some(name) = &handler.node.name {
                        names.locals.insert(name.clone());
                    }
                    collect_block(&handler.node.body, names);
                }
                for body in [&stmt.else_body, &stmt.finally_body].into_iter().flatten() {
                    collect_block(body, names);
                }
            }
            Statement::FunctionDef(def) => {
                names.locals.insert(def.name.clone());
            }
            Statement::Import(imports) => {
                for import in imports {
                    let bound = import.alias.as_ref().or(import.path.first());
                    names.locals.extend(bound.cloned());
                }
            }
            Statement::FromImport(from) => {
                for (name, alias) in &from.names {
                    names.locals.insert(alias.as_ref().unwrap_or(name).clone());
                }
            }
            Statement::Expr(_)
            | Statement::Assert(_)
            | Statement::Raise(_)
            | Statement::Return(_)
            | Statement::Pass
            | Statement::Break
            | Statement::Continue => {}
        }
    }
}

fn collect_target(target: &Spanned<Target>, names: &mut LocalNames) {
    match &target.node {
        Target::Name(name) => {
            names.locals.insert(name.clone());
        }
        Target::Tuple(items) => items.iter().for_each(|t| collect_target(t, names)),
        Target::Attribute(..) | Target::Index(..) | Target::Slice(..) => {}
    }
}

/// Bindings of one function call (or comprehension).
pub struct LocalFrame {
    vars: RefCell<HashMap<String, Value>>,
    names: Rc<LocalNames>,
    parent: Option<Rc<LocalFrame>>,
}

impl LocalFrame {
    pub fn new(names: Rc<LocalNames>, parent: Option<Rc<LocalFrame>>) -> Self {
        Self {
            vars: RefCell::new(HashMap::new()),
            names,
            parent,
        }
    }

    pub fn bind(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }

    fn owns(&self, name: &str) -> bool {
        self.names.locals.contains(name) && !self.names.globals.contains(name)
    }
}

/// Where names are read from and written to while executing a block.
#[derive(Clone)]
pub struct Scope {
    pub globals: Globals,
    pub frame: Option<Rc<LocalFrame>>,
}

impl Scope {
    pub fn module(globals: Globals) -> Self {
        Self { globals, frame: None }
    }

    pub fn function(globals: Globals, frame: Rc<LocalFrame>) -> Self {
        Self {
            globals,
            frame: Some(frame),
        }
    }

    /// A child scope for a comprehension evaluated in this scope.
    pub fn comprehension(&self, names: LocalNames) -> Self {
        Self {
            globals: self.globals.clone(),
            frame: Some(Rc::new(LocalFrame::new(Rc::new(names), self.frame.clone()))),
        }
    }

    /// Resolve a name: local frame, enclosing frames, globals, then builtins.
    pub fn lookup(&self, name: &str) -> ExecResult<Value> {
        if let Some(frame) = &self.frame {
            if frame.owns(name) {
                return frame.vars.borrow().get(name).cloned().ok_or_else(|| {
                    Raised::new(
                        ExceptionKind::UnboundLocalError,
                        format!("cannot access local variable '{name}' where it is not associated with a value"),
                    )
                });
            }
            if !frame.names.globals.contains(name) {
                let mut enclosing = frame.parent.as_ref();
                while let Some(outer) = enclosing {
                    if outer.owns(name) {
                        return outer.vars.borrow().get(name).cloned().ok_or_else(|| {
                            Raised::new(
                                ExceptionKind::NameError,
                                format!(
                                    "cannot access free variable '{name}' where it is not associated with a value in enclosing scope"
                                ),
                            )
                        });
                    }
                    enclosing = outer.parent.as_ref();
                }
            }
        }

        if let Some(value) = self.globals.borrow().get(name) {
            return Ok(value.clone());
        }
        builtin_value(name).ok_or_else(|| name_error(name))
    }

    pub fn assign(&self, name: &str, value: Value) {
        match &self.frame {
            Some(frame) if !frame.names.globals.contains(name) => frame.bind(name, value),
            _ => {
                self.globals.borrow_mut().insert(name.to_string(), value);
            }
        }
    }

    pub fn delete(&self, name: &str) -> ExecResult<()> {
        let removed = match &self.frame {
            Some(frame) if !frame.names.globals.contains(name) => frame.vars.borrow_mut().remove(name).is_some(),
            _ => self.globals.borrow_mut().shift_remove(name).is_some(),
        };
        if removed { Ok(()) } else { Err(name_error(name)) }
    }
}

fn name_error(name: &str) -> Raised {
    Raised::new(ExceptionKind::NameError, format!("name '{name}' is not defined"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_def(source: &str) -> (Vec<Spanned<Param>>, Vec<Spanned<Statement>>) {
        let program = testmynb_syntax::parse_source(source).unwrap();
        match program.body.into_iter().next().map(|s| s.node) {
            Some(Statement::FunctionDef(def)) => (def.params, def.body),
            other => panic!("Expected function definition, got {other:?}"),
        }
    }

    #[test]
    fn test_assigned_names_are_local_unless_global() {
        let (params, body) = parse_def(
            "def f(a):\n    global total\n    total = a\n    for i, (x, y) in pairs:\n        seen = x\n    import math as m\n",
        );
        let names = LocalNames::for_function(&params, &body);
        for local in ["a", "i", "x", "y", "seen", "m"] {
            assert!(names.locals.contains(local), "{local} should be local");
        }
        assert!(!names.locals.contains("total"));
        assert!(names.globals.contains("total"));
        assert!(!names.locals.contains("pairs"));
    }

    #[test]
    fn test_lookup_order_and_unbound_local() {
        let globals: Globals = Rc::default();
        globals.borrow_mut().insert("x".to_string(), Value::Int(1));
        let module = Scope::module(globals.clone());
        assert!(matches!(module.lookup("x"), Ok(Value::Int(1))));
        assert!(matches!(module.lookup("len"), Ok(Value::Builtin(_))));

        let names = LocalNames {
            locals: ["x".to_string()].into_iter().collect(),
            globals: HashSet::new(),
        };
        let scope = Scope::function(globals, Rc::new(LocalFrame::new(Rc::new(names), None)));
        let err = scope.lookup("x").unwrap_err();
        assert_eq!(err.kind(), ExceptionKind::UnboundLocalError);
        scope.assign("x", Value::Int(2));
        assert!(matches!(scope.lookup("x"), Ok(Value::Int(2))));
        assert!(matches!(module.lookup("x"), Ok(Value::Int(1))));
    }

    #[test]
    fn test_delete_missing_name_is_name_error() {
        let scope = Scope::module(Rc::default());
        let err = scope.delete("nope").unwrap_err();
        assert_eq!(err.kind(), ExceptionKind::NameError);
        assert_eq!(err.exc.message(), "name 'nope' is not defined");
    }
}
