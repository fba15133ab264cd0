//! Runtime values of the cell interpreter.
//!
//! Values follow Python's object model closely enough for test cells: containers are shared and mutable
//! (`Rc<RefCell<..>>`), so `b = a; b.append(1)` is visible through `a`, while numbers and strings are immutable.
//!
//! ## Notes
//! - Nothing here is `Send`; a namespace belongs to one notebook on one thread.
//! - `repr`/`str` renderings match CPython for the types the interpreter supports.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive};
use testmynb_core::errors::ExceptionKind;
use testmynb_core::lang::builtins::{self, BuiltinFnId};
use testmynb_core::lang::exceptions;
use testmynb_core::py_float_repr;
use testmynb_core::strings::str_repr;
use testmynb_syntax::ast::{Block, Expr, Param, Spanned};

use super::exceptions::{ExecResult, Raised};
use super::scope::{Globals, LocalFrame, LocalNames};
use super::LineIndex;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<Dict>>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    /// An `int` outside the 64-bit range. Arithmetic narrows results back to `Int` whenever they fit, so a `BigInt`
    /// never holds a value `Int` could.
    BigInt(Rc<BigInt>),
    Float(f64),
    Str(Rc<str>),
    List(ListRef),
    Tuple(Rc<[Value]>),
    Dict(DictRef),
    Range(RangeValue),
    Function(Rc<Function>),
    Builtin(BuiltinFnId),
    /// A method looked up on a receiver (`xs.append`), or a function of a builtin module.
    BoundMethod(Rc<BoundMethod>),
    ExceptionType(ExceptionKind),
    Exception(Rc<ExceptionObj>),
    Module(Rc<Module>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(items.into())
    }

    pub fn dict(dict: Dict) -> Value {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    /// An `int` value, narrowed to `Int` when it fits in 64 bits.
    pub fn from_bigint(n: BigInt) -> Value {
        match i64::try_from(&n) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::BigInt(Rc::new(n)),
        }
    }

    /// The Python type name, as used in error messages (`'int' object is not iterable`).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::BigInt(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Range(_) => "range",
            Value::Function(_) => "function",
            Value::Builtin(id) if is_type_builtin(*id) => "type",
            Value::Builtin(_) | Value::BoundMethod(_) => "builtin_function_or_method",
            Value::ExceptionType(_) => "type",
            Value::Exception(exc) => exceptions::as_str(exc.kind),
            Value::Module(_) => "module",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::BigInt(_) => true,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            Value::Range(range) => range.len() > 0,
            _ => true,
        }
    }

    /// Integer view of `int` and `bool` values.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Exact integer view of `int` and `bool` values of any size.
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::BigInt(n) => Some(BigInt::clone(n)),
            other => other.as_int().map(BigInt::from),
        }
    }

    /// Float view of any numeric value. Integers beyond the float range map to an infinity.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::BigInt(n) => Some(n.to_f64().unwrap_or(match n.sign() {
                Sign::Minus => f64::NEG_INFINITY,
                _ => f64::INFINITY,
            })),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, &mut HashSet::new());
        out
    }

    /// Python's `str()`.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            Value::Exception(exc) => exc.message(),
            _ => self.repr(),
        }
    }

    fn write_repr(&self, out: &mut String, seen: &mut HashSet<usize>) {
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::BigInt(n) => out.push_str(&n.to_string()),
            Value::Float(f) => out.push_str(&py_float_repr(*f)),
            Value::Str(s) => out.push_str(&str_repr(s)),
            Value::List(items) => {
                let key = Rc::as_ptr(items) as *const () as usize;
                if !seen.insert(key) {
                    out.push_str("[...]");
                    return;
                }
                out.push('[');
                write_items(&items.borrow(), out, seen);
                out.push(']');
                seen.remove(&key);
            }
            Value::Tuple(items) => {
                out.push('(');
                write_items(items, out, seen);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Value::Dict(dict) => {
                let key = Rc::as_ptr(dict) as *const () as usize;
                if !seen.insert(key) {
                    out.push_str("{...}");
                    return;
                }
                out.push('{');
                for (i, (k, v)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_repr(out, seen);
                    out.push_str(": ");
                    v.write_repr(out, seen);
                }
                out.push('}');
                seen.remove(&key);
            }
            Value::Range(range) => out.push_str(&range.to_string()),
            Value::Function(func) => {
                out.push_str(&format!("<function {} at {:#x}>", func.name, Rc::as_ptr(func) as usize));
            }
            Value::Builtin(id) if is_type_builtin(*id) => {
                out.push_str(&format!("<class '{}'>", builtins::as_str(*id)));
            }
            Value::Builtin(id) => out.push_str(&format!("<built-in function {}>", builtins::as_str(*id))),
            Value::BoundMethod(method) => match &method.receiver {
                Value::Module(_) => out.push_str(&format!("<built-in function {}>", method.name)),
                receiver => out.push_str(&format!(
                    "<built-in method {} of {} object>",
                    method.name,
                    receiver.type_name()
                )),
            },
            Value::ExceptionType(kind) => out.push_str(&format!("<class '{}'>", exceptions::as_str(*kind))),
            Value::Exception(exc) => {
                out.push_str(exceptions::as_str(exc.kind));
                out.push('(');
                write_items(&exc.args, out, seen);
                out.push(')');
            }
            Value::Module(module) => out.push_str(&format!("<module '{}' (built-in)>", module.name)),
        }
    }
}

fn write_items(items: &[Value], out: &mut String, seen: &mut HashSet<usize>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out, seen);
    }
}

/// Builtins that are classes in Python (`int`, `list`, ...) rather than plain functions.
pub fn is_type_builtin(id: BuiltinFnId) -> bool {
    matches!(
        id,
        BuiltinFnId::Str
            | BuiltinFnId::Int
            | BuiltinFnId::Float
            | BuiltinFnId::Bool
            | BuiltinFnId::List
            | BuiltinFnId::Tuple
            | BuiltinFnId::Dict
            | BuiltinFnId::Range
    )
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::from_bigint(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ============================================================================
// Equality, ordering and identity
// ============================================================================

/// Python `==`.
pub fn py_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::BigInt(_), Value::Int(_) | Value::Bool(_)) | (Value::Int(_) | Value::Bool(_), Value::BigInt(_)) => false,
        (Value::BigInt(n), Value::Float(f)) | (Value::Float(f), Value::BigInt(n)) => {
            cmp_int_float(n, *f) == Some(Ordering::Equal)
        }
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y) || seq_eq(&x.borrow(), &y.borrow()),
        (Value::Tuple(x), Value::Tuple(y)) => seq_eq(x, y),
        (Value::Dict(x), Value::Dict(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.entries
                    .iter()
                    .all(|(key, (_, v))| y.entries.get(key).is_some_and(|(_, other)| py_eq(v, other)))
        }
        (Value::Range(x), Value::Range(y)) => {
            let (lx, ly) = (x.len(), y.len());
            lx == ly && (lx == 0 || (x.start == y.start && (lx == 1 || x.step == y.step)))
        }
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => x == y,
        (Value::BoundMethod(x), Value::BoundMethod(y)) => x.name == y.name && py_is(&x.receiver, &y.receiver),
        (Value::ExceptionType(x), Value::ExceptionType(y)) => x == y,
        (Value::Exception(x), Value::Exception(y)) => Rc::ptr_eq(x, y),
        (Value::Module(x), Value::Module(y)) => x.name == y.name,
        _ => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| py_eq(x, y))
}

/// Python `is`.
///
/// ## Notes
/// - Small immutable values (numbers, strings, `None`) compare by value, as interning makes them identical
///   in CPython for the literals test cells typically use.
pub fn py_is(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => Rc::ptr_eq(x, y),
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y),
        (Value::Tuple(x), Value::Tuple(y)) => Rc::ptr_eq(x, y) || (x.is_empty() && y.is_empty()),
        (Value::Dict(x), Value::Dict(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::BoundMethod(x), Value::BoundMethod(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => x == y,
        (Value::ExceptionType(x), Value::ExceptionType(y)) => x == y,
        (Value::Exception(x), Value::Exception(y)) => Rc::ptr_eq(x, y),
        (Value::Module(x), Value::Module(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Python ordering for `<`, `<=`, `>`, `>=`, `sorted`, `min` and `max`.
///
/// ## Returns
/// - `Ok(Some(ordering))` for comparable values.
/// - `Ok(None)` when a NaN takes part (every ordering comparison is then false).
/// - `Err(TypeError)` when the types cannot be ordered; `op` is the spelling used in the message.
pub fn py_cmp(a: &Value, b: &Value, op: &str) -> ExecResult<Option<Ordering>> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Some(x.cmp(y))),
        (Value::BigInt(n), Value::Float(f)) => Ok(cmp_int_float(n, *f)),
        (Value::Float(f), Value::BigInt(n)) => Ok(cmp_int_float(n, *f).map(Ordering::reverse)),
        (Value::BigInt(_), _) | (_, Value::BigInt(_)) if a.as_bigint().is_some() && b.as_bigint().is_some() => {
            Ok(Some(a.as_bigint().cmp(&b.as_bigint())))
        }
        (Value::Str(x), Value::Str(y)) => Ok(Some(x.cmp(y))),
        (Value::List(x), Value::List(y)) => seq_cmp(&x.borrow(), &y.borrow(), op),
        (Value::Tuple(x), Value::Tuple(y)) => seq_cmp(x, y, op),
        _ => match (a.as_float(), b.as_float()) {
            (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
            _ => Err(Raised::type_error(format!(
                "'{op}' not supported between instances of '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// Exact ordering of an integer against a float; `None` for NaN.
fn cmp_int_float(n: &BigInt, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f.is_infinite() {
        return Some(if f > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    let floor = f.floor();
    let whole = BigInt::from_f64(floor)?;
    Some(match n.cmp(&whole) {
        Ordering::Equal if f > floor => Ordering::Less,
        ordering => ordering,
    })
}

fn seq_cmp(a: &[Value], b: &[Value], op: &str) -> ExecResult<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if !py_eq(x, y) {
            return py_cmp(x, y, op);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

// ============================================================================
// Containers
// ============================================================================

/// Hashable projection of a value, used as a dict key.
///
/// Numbers that compare equal hash equal (`1`, `1.0` and `True` are the same key), as in Python.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    None,
    Int(i64),
    BigInt(BigInt),
    Float(u64),
    Str(Rc<str>),
    Tuple(Vec<DictKey>),
    Builtin(BuiltinFnId),
    ExceptionType(ExceptionKind),
    Identity(usize),
}

impl DictKey {
    pub fn from_value(value: &Value) -> ExecResult<DictKey> {
        Ok(match value {
            Value::None => DictKey::None,
            Value::Bool(b) => DictKey::Int(i64::from(*b)),
            Value::Int(i) => DictKey::Int(*i),
            Value::BigInt(n) => DictKey::BigInt(BigInt::clone(n)),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => match Value::from_bigint(
                BigInt::from_f64(*f).unwrap_or_default(),
            ) {
                Value::Int(i) => DictKey::Int(i),
                Value::BigInt(n) => DictKey::BigInt(Rc::unwrap_or_clone(n)),
                _ => DictKey::Float(f.to_bits()),
            },
            Value::Float(f) => DictKey::Float(f.to_bits()),
            Value::Str(s) => DictKey::Str(s.clone()),
            Value::Tuple(items) => DictKey::Tuple(items.iter().map(DictKey::from_value).collect::<ExecResult<_>>()?),
            Value::Range(r) => DictKey::Tuple(vec![
                DictKey::Str("range".into()),
                DictKey::Int(r.start),
                DictKey::Int(r.stop),
                DictKey::Int(r.step),
            ]),
            Value::Builtin(id) => DictKey::Builtin(*id),
            Value::ExceptionType(kind) => DictKey::ExceptionType(*kind),
            Value::Function(f) => DictKey::Identity(Rc::as_ptr(f) as *const () as usize),
            Value::Exception(e) => DictKey::Identity(Rc::as_ptr(e) as *const () as usize),
            Value::Module(m) => DictKey::Identity(Rc::as_ptr(m) as *const () as usize),
            Value::BoundMethod(m) => DictKey::Identity(Rc::as_ptr(m) as *const () as usize),
            Value::List(_) | Value::Dict(_) => {
                return Err(Raised::type_error(format!("unhashable type: '{}'", value.type_name())));
            }
        })
    }
}

/// Insertion-ordered dict storage.
#[derive(Clone, Default)]
pub struct Dict {
    entries: IndexMap<DictKey, (Value, Value)>,
}

impl Dict {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> ExecResult<Option<Value>> {
        let hashed = DictKey::from_value(key)?;
        Ok(self.entries.get(&hashed).map(|(_, v)| v.clone()))
    }

    pub fn contains(&self, key: &Value) -> ExecResult<bool> {
        Ok(self.entries.contains_key(&DictKey::from_value(key)?))
    }

    /// Insert or overwrite; an existing key keeps its position and original key object.
    pub fn insert(&mut self, key: Value, value: Value) -> ExecResult<()> {
        let hashed = DictKey::from_value(&key)?;
        match self.entries.get_mut(&hashed) {
            Some(slot) => slot.1 = value,
            None => {
                self.entries.insert(hashed, (key, value));
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> ExecResult<Option<Value>> {
        let hashed = DictKey::from_value(key)?;
        Ok(self.entries.shift_remove(&hashed).map(|(_, v)| v))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.values().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.values().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.values().map(|(_, v)| v.clone()).collect()
    }

    pub fn items(&self) -> Vec<Value> {
        self.entries
            .values()
            .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
            .collect()
    }
}

/// `range(start, stop, step)`; `step` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    pub fn len(&self) -> usize {
        let (start, stop, step) = (i128::from(self.start), i128::from(self.stop), i128::from(self.step));
        let len = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / (-step) + 1
        } else {
            0
        };
        usize::try_from(len).unwrap_or(usize::MAX)
    }

    /// The item at a non-negative position, if in range.
    pub fn get(&self, index: usize) -> Option<i64> {
        if index >= self.len() {
            return None;
        }
        let value = i128::from(self.start) + (index as i128) * i128::from(self.step);
        i64::try_from(value).ok()
    }

    pub fn contains(&self, value: i64) -> bool {
        let (value, start, step) = (i128::from(value), i128::from(self.start), i128::from(self.step));
        let in_bounds = if step > 0 {
            value >= start && value < i128::from(self.stop)
        } else {
            value <= start && value > i128::from(self.stop)
        };
        in_bounds && (value - start) % step == 0
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "range({}, {})", self.start, self.stop)
        } else {
            write!(f, "range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

// ============================================================================
// Callables, exceptions and modules
// ============================================================================

/// A user-defined function (`def` or `lambda`).
pub struct Function {
    pub name: Rc<str>,
    pub params: Vec<Spanned<Param>>,
    /// Default values evaluated at definition time, aligned with `params`.
    pub defaults: Vec<Option<Value>>,
    pub body: FunctionBody,
    pub globals: Globals,
    /// The frame of the lexically enclosing function, for closures.
    pub enclosing: Option<Rc<LocalFrame>>,
    pub names: Rc<LocalNames>,
    /// Line table of the cell that defined the function, for traceback line numbers.
    pub lines: Rc<LineIndex>,
    pub def_offset: usize,
}

pub enum FunctionBody {
    Block(Rc<Block>),
    Lambda(Rc<Spanned<Expr>>),
}

pub struct BoundMethod {
    pub receiver: Value,
    pub name: Rc<str>,
}

/// An exception instance.
pub struct ExceptionObj {
    pub kind: ExceptionKind,
    pub args: Vec<Value>,
}

impl ExceptionObj {
    /// Python's `str(exc)`.
    pub fn message(&self) -> String {
        match self.args.as_slice() {
            [] => String::new(),
            [arg] if self.kind == ExceptionKind::KeyError => arg.repr(),
            [arg] => arg.to_str(),
            args => Value::tuple(args.to_vec()).repr(),
        }
    }
}

/// A builtin module (`math`).
pub struct Module {
    pub name: &'static str,
}

// ============================================================================
// Iteration
// ============================================================================

/// Iterator over the items of an iterable value.
///
/// Lists are iterated live (items appended during the loop are visited, as in Python); other containers
/// are snapshotted when iteration starts.
pub enum ValueIter {
    Items(std::vec::IntoIter<Value>),
    List { list: ListRef, index: usize },
    Range { range: RangeValue, index: usize },
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            ValueIter::Items(items) => items.next(),
            ValueIter::List { list, index } => {
                let item = list.borrow().get(*index).cloned();
                *index += 1;
                item
            }
            ValueIter::Range { range, index } => {
                let item = range.get(*index).map(Value::Int);
                *index += 1;
                item
            }
        }
    }
}

/// Start iterating a value.
///
/// ## Errors
/// - `TypeError` if the value is not iterable.
pub fn iter_values(value: &Value) -> ExecResult<ValueIter> {
    Ok(match value {
        Value::List(list) => ValueIter::List {
            list: list.clone(),
            index: 0,
        },
        Value::Tuple(items) => ValueIter::Items(items.to_vec().into_iter()),
        Value::Str(s) => ValueIter::Items(
            s.chars()
                .map(|c| Value::from(c.to_string()))
                .collect::<Vec<_>>()
                .into_iter(),
        ),
        Value::Dict(dict) => ValueIter::Items(dict.borrow().keys().into_iter()),
        Value::Range(range) => ValueIter::Range {
            range: *range,
            index: 0,
        },
        other => {
            return Err(Raised::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            )));
        }
    })
}

/// Collect every item of an iterable.
pub fn collect_values(value: &Value) -> ExecResult<Vec<Value>> {
    Ok(iter_values(value)?.collect())
}
