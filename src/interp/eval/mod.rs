//! Expression evaluation.
//!
//! ## Notes
//! - Comprehensions (and generator expressions, which the parser turns into list comprehensions) run in their own
//!   scope, so loop variables do not leak into the enclosing block. The first iterable is evaluated in the
//!   enclosing scope, the rest inside the comprehension.
//! - `and`/`or` return one of their operands, not a `bool`.

mod call;
pub(crate) mod ops;
mod subscript;

pub(crate) use call::Keywords;

use std::rc::Rc;

use num_bigint::BigInt;
use testmynb_syntax::ast::*;

use super::exceptions::ExecResult;
use super::format::{convert_field, format_value};
use super::scope::{LocalNames, Scope};
use super::value::{Dict, Function, FunctionBody, Value, iter_values};
use super::Interpreter;

impl Interpreter {
    pub(super) fn eval(&mut self, expr: &Spanned<Expr>, scope: &Scope) -> ExecResult<Value> {
        match &expr.node {
            Expr::Ident(name) => scope.lookup(name),
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::FString(parts) => self.eval_fstring(parts, scope),
            Expr::Binary(lhs, BinaryOp::And, rhs) => {
                let left = self.eval(lhs, scope)?;
                if left.truthy() { self.eval(rhs, scope) } else { Ok(left) }
            }
            Expr::Binary(lhs, BinaryOp::Or, rhs) => {
                let left = self.eval(lhs, scope)?;
                if left.truthy() { Ok(left) } else { self.eval(rhs, scope) }
            }
            Expr::Binary(lhs, op, rhs) => {
                let left = self.eval(lhs, scope)?;
                let right = self.eval(rhs, scope)?;
                ops::binary(*op, &left, &right)
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, scope)?;
                ops::unary(*op, &value)
            }
            Expr::Compare(first, chain) => {
                let mut left = self.eval(first, scope)?;
                for (op, operand) in chain {
                    let right = self.eval(operand, scope)?;
                    if !ops::compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::Call(callee, args) => {
                let callee = self.eval(callee, scope)?;
                let (positional, keywords) = self.eval_args(args, scope)?;
                self.call_value(&callee, positional, keywords)
            }
            Expr::MethodCall(receiver, name, args) => {
                let receiver = self.eval(receiver, scope)?;
                let (positional, keywords) = self.eval_args(args, scope)?;
                self.call_method(receiver, name, positional, keywords)
            }
            Expr::Field(obj, name) => {
                let obj = self.eval(obj, scope)?;
                self.get_attr(&obj, name)
            }
            Expr::Index(obj, index) => {
                let obj = self.eval(obj, scope)?;
                let index = self.eval(index, scope)?;
                self.get_item(&obj, &index)
            }
            Expr::Slice(obj, slice) => {
                let obj = self.eval(obj, scope)?;
                let bounds = self.eval_slice_bounds(slice, scope)?;
                self.get_slice(&obj, bounds)
            }
            Expr::List(items) => Ok(Value::list(self.eval_all(items, scope)?)),
            Expr::Tuple(items) => Ok(Value::tuple(self.eval_all(items, scope)?)),
            Expr::Dict(pairs) => {
                let mut dict = Dict::default();
                for (key, value) in pairs {
                    let key = self.eval(key, scope)?;
                    let value = self.eval(value, scope)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            Expr::ListComp(comp) => self.eval_list_comp(comp, scope),
            Expr::DictComp(comp) => self.eval_dict_comp(comp, scope),
            Expr::Lambda(params, body) => {
                let defaults = self.eval_defaults(params, scope)?;
                Ok(Value::Function(Rc::new(Function {
                    name: "<lambda>".into(),
                    params: params.clone(),
                    defaults,
                    body: FunctionBody::Lambda(Rc::new((**body).clone())),
                    globals: scope.globals.clone(),
                    enclosing: scope.frame.clone(),
                    names: Rc::new(LocalNames::for_lambda(params)),
                    lines: self.current_lines(),
                    def_offset: expr.span.start,
                })))
            }
            Expr::IfExp(if_expr) => {
                if self.eval(&if_expr.condition, scope)?.truthy() {
                    self.eval(&if_expr.then_expr, scope)
                } else {
                    self.eval(&if_expr.else_expr, scope)
                }
            }
            Expr::Paren(inner) => self.eval(inner, scope),
        }
    }

    fn eval_all(&mut self, items: &[Spanned<Expr>], scope: &Scope) -> ExecResult<Vec<Value>> {
        items.iter().map(|item| self.eval(item, scope)).collect()
    }

    fn eval_fstring(&mut self, parts: &[FStringPart], scope: &Scope) -> ExecResult<Value> {
        let mut out = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => out.push_str(text),
                FStringPart::Expr {
                    expr,
                    conversion,
                    format_spec,
                } => {
                    let value = convert_field(self.eval(expr, scope)?, *conversion);
                    out.push_str(&format_value(&value, format_spec.as_deref().unwrap_or(""))?);
                }
            }
        }
        Ok(Value::from(out))
    }

    // ========================================================================
    // Comprehensions
    // ========================================================================

    fn eval_list_comp(&mut self, comp: &ListComp, scope: &Scope) -> ExecResult<Value> {
        let inner = scope.comprehension(LocalNames::for_comprehension(&comp.generators));
        let mut items = Vec::new();
        self.run_generators(&comp.generators, scope, &inner, &mut |this, s| {
            items.push(this.eval(&comp.expr, s)?);
            Ok(())
        })?;
        Ok(Value::list(items))
    }

    fn eval_dict_comp(&mut self, comp: &DictComp, scope: &Scope) -> ExecResult<Value> {
        let inner = scope.comprehension(LocalNames::for_comprehension(&comp.generators));
        let mut dict = Dict::default();
        self.run_generators(&comp.generators, scope, &inner, &mut |this, s| {
            let key = this.eval(&comp.key, s)?;
            let value = this.eval(&comp.value, s)?;
            dict.insert(key, value)
        })?;
        Ok(Value::dict(dict))
    }

    /// Drive nested `for ... if ...` clauses, calling `emit` once per produced element.
    fn run_generators(
        &mut self,
        generators: &[Comprehension],
        outer: &Scope,
        inner: &Scope,
        emit: &mut dyn FnMut(&mut Self, &Scope) -> ExecResult<()>,
    ) -> ExecResult<()> {
        let Some((first, rest)) = generators.split_first() else {
            return emit(self, inner);
        };
        let iterable = self.eval(&first.iter, outer)?;
        'items: for item in iter_values(&iterable)? {
            self.assign_target(&first.target, item, inner)?;
            for condition in &first.conditions {
                if !self.eval(condition, inner)?.truthy() {
                    continue 'items;
                }
            }
            self.run_generators(rest, inner, inner, emit)?;
        }
        Ok(())
    }
}

pub(super) fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(i) => Value::Int(*i),
        Literal::BigInt { digits, radix } => {
            Value::from_bigint(BigInt::parse_bytes(digits.as_bytes(), *radix).unwrap_or_default())
        }
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::from(s.as_str()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::None => Value::None,
    }
}
