//! Calls: argument evaluation, parameter binding and user-function frames.

use std::rc::Rc;

use testmynb_core::errors::{ExceptionKind, RECURSION_DEPTH_MSG};
use testmynb_syntax::ast::{CallArg, ParamKind};

use crate::interp::exceptions::{ExecResult, Raised};
use crate::interp::scope::{LocalFrame, Scope};
use crate::interp::value::{Dict, ExceptionObj, Function, FunctionBody, Value, collect_values};
use crate::interp::{Flow, FrameState, Interpreter};

/// Keyword arguments in call order.
pub(crate) type Keywords = Vec<(String, Value)>;

/// Native stack that must remain before a user function is entered.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each extra stack segment allocated for deep call chains.
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

impl Interpreter {
    /// Evaluate call arguments left to right, expanding `*iterable` and `**mapping`.
    pub(in crate::interp) fn eval_args(
        &mut self,
        args: &[CallArg],
        scope: &Scope,
    ) -> ExecResult<(Vec<Value>, Keywords)> {
        let mut positional = Vec::new();
        let mut keywords: Keywords = Vec::new();
        for arg in args {
            match arg {
                CallArg::Positional(expr) => positional.push(self.eval(expr, scope)?),
                CallArg::Star(expr) => {
                    let value = self.eval(expr, scope)?;
                    let items = collect_values(&value).map_err(|_| {
                        Raised::type_error(format!(
                            "argument after * must be an iterable, not {}",
                            value.type_name()
                        ))
                    })?;
                    positional.extend(items);
                }
                CallArg::Named(name, expr) => {
                    let value = self.eval(expr, scope)?;
                    push_keyword(&mut keywords, name.clone(), value)?;
                }
                CallArg::DoubleStar(expr) => {
                    let Value::Dict(dict) = self.eval(expr, scope)? else {
                        return Err(Raised::type_error("argument after ** must be a mapping"));
                    };
                    for (key, value) in dict.borrow().iter() {
                        let Value::Str(name) = key else {
                            return Err(Raised::type_error("keywords must be strings"));
                        };
                        push_keyword(&mut keywords, name.to_string(), value.clone())?;
                    }
                }
            }
        }
        Ok((positional, keywords))
    }

    /// Call any callable value.
    pub(in crate::interp) fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        keywords: Keywords,
    ) -> ExecResult<Value> {
        match callee {
            Value::Function(func) => self.call_function(func, args, keywords),
            Value::Builtin(id) => self.call_builtin(*id, args, keywords),
            Value::BoundMethod(method) => self.call_method(method.receiver.clone(), &method.name, args, keywords),
            Value::ExceptionType(kind) => {
                if let Some((name, _)) = keywords.first() {
                    return Err(Raised::type_error(format!(
                        "{}() takes no keyword arguments ('{name}' given)",
                        testmynb_core::lang::exceptions::as_str(*kind)
                    )));
                }
                Ok(Value::Exception(Rc::new(ExceptionObj { kind: *kind, args })))
            }
            other => Err(Raised::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }

    /// Enter a user function. Deep call chains continue on heap-allocated stack segments.
    fn call_function(&mut self, func: &Rc<Function>, args: Vec<Value>, keywords: Keywords) -> ExecResult<Value> {
        if self.frames.len() >= self.recursion_limit {
            return Err(Raised::new(ExceptionKind::RecursionError, RECURSION_DEPTH_MSG));
        }
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.run_function(func, args, keywords))
    }

    fn run_function(&mut self, func: &Rc<Function>, args: Vec<Value>, keywords: Keywords) -> ExecResult<Value> {
        let frame = Rc::new(LocalFrame::new(func.names.clone(), func.enclosing.clone()));
        bind_arguments(func, args, keywords, &frame)?;
        let scope = Scope::function(func.globals.clone(), frame);

        self.frames.push(FrameState {
            name: func.name.clone(),
            lines: func.lines.clone(),
            offset: func.def_offset,
        });
        let result = match &func.body {
            FunctionBody::Block(body) => self.exec_block(body, &scope).map(|flow| match flow {
                Flow::Return(value) => value,
                Flow::Normal | Flow::Break | Flow::Continue => Value::None,
            }),
            FunctionBody::Lambda(body) => {
                self.set_offset(body.span.start);
                self.eval(body, &scope)
            }
        }
        .map_err(|raised| self.stamp(raised));
        self.frames.pop();
        result
    }
}

fn push_keyword(keywords: &mut Keywords, name: String, value: Value) -> ExecResult<()> {
    if keywords.iter().any(|(existing, _)| *existing == name) {
        return Err(Raised::type_error(format!("keyword argument repeated: {name}")));
    }
    keywords.push((name, value));
    Ok(())
}

/// Bind call arguments to a function's parameters in its new frame.
///
/// ## Errors
/// - `TypeError` with CPython's wording for too many or missing positional arguments, unknown or duplicate
///   keywords.
fn bind_arguments(func: &Function, args: Vec<Value>, keywords: Keywords, frame: &LocalFrame) -> ExecResult<()> {
    let name = &func.name;
    let mut slots: Vec<Option<Value>> = vec![None; func.params.len()];

    let positional_slots: Vec<usize> = func
        .params
        .iter()
        .take_while(|p| p.node.kind == ParamKind::Normal)
        .enumerate()
        .map(|(i, _)| i)
        .collect();
    let varargs = func.params.iter().position(|p| p.node.kind == ParamKind::VarArgs);
    let kwargs = func.params.iter().position(|p| p.node.kind == ParamKind::KwArgs);

    let given = args.len();
    let mut args = args.into_iter();
    for &slot in &positional_slots {
        match args.next() {
            Some(value) => slots[slot] = Some(value),
            None => break,
        }
    }
    let extra: Vec<Value> = args.collect();
    match varargs {
        Some(slot) => slots[slot] = Some(Value::tuple(extra)),
        None if !extra.is_empty() => {
            let count = positional_slots.len();
            let plural = if count == 1 { "" } else { "s" };
            let was = if given == 1 { "was" } else { "were" };
            return Err(Raised::type_error(format!(
                "{name}() takes {count} positional argument{plural} but {given} {was} given"
            )));
        }
        None => {}
    }

    let mut extra_keywords = Dict::default();
    for (keyword, value) in keywords {
        let target = func
            .params
            .iter()
            .position(|p| p.node.kind == ParamKind::Normal && p.node.name == keyword);
        match target {
            Some(slot) if slots[slot].is_some() => {
                return Err(Raised::type_error(format!(
                    "{name}() got multiple values for argument '{keyword}'"
                )));
            }
            Some(slot) => slots[slot] = Some(value),
            None if kwargs.is_some() => extra_keywords.insert(Value::from(keyword), value)?,
            None => {
                return Err(Raised::type_error(format!(
                    "{name}() got an unexpected keyword argument '{keyword}'"
                )));
            }
        }
    }
    if let Some(slot) = kwargs {
        slots[slot] = Some(Value::dict(extra_keywords));
    }

    let mut missing = Vec::new();
    for (i, param) in func.params.iter().enumerate() {
        let value = match slots[i].take().or_else(|| func.defaults[i].clone()) {
            Some(value) => value,
            None => {
                missing.push(format!("'{}'", param.node.name));
                continue;
            }
        };
        frame.bind(&param.node.name, value);
    }
    if !missing.is_empty() {
        let count = missing.len();
        let plural = if count == 1 { "" } else { "s" };
        let names = match missing.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} and {last}", rest.join(", ")),
            _ => missing.join(""),
        };
        return Err(Raised::type_error(format!(
            "{name}() missing {count} required positional argument{plural}: {names}"
        )));
    }
    Ok(())
}
