//! Subscripts, slices and attribute access.

use std::rc::Rc;

use num_bigint::Sign;
use testmynb_core::errors::{INDEX_SIZED_INTEGER_MSG, LIST_INDEX_OUT_OF_RANGE_MSG, TUPLE_INDEX_OUT_OF_RANGE_MSG};
use testmynb_core::strings::{normalize_index, slice_indices, str_char_at};
use testmynb_syntax::ast::{Expr, SliceExpr, Spanned};

use crate::interp::exceptions::{ExecResult, Raised};
use crate::interp::methods::has_method;
use crate::interp::modules;
use crate::interp::scope::Scope;
use crate::interp::value::{BoundMethod, RangeValue, Value, collect_values};
use crate::interp::Interpreter;

/// Evaluated `start:stop:step`; `None` where omitted.
pub(crate) type SliceBounds = (Option<i64>, Option<i64>, Option<i64>);

impl Interpreter {
    pub(in crate::interp) fn eval_slice_bounds(&mut self, slice: &SliceExpr, scope: &Scope) -> ExecResult<SliceBounds> {
        let mut bound = |part: &Option<Box<Spanned<Expr>>>| {
            let Some(expr) = part else {
                return Ok(None);
            };
            match self.eval(expr, scope)? {
                Value::None => Ok(None),
                Value::BigInt(n) if n.sign() == Sign::Minus => Ok(Some(i64::MIN)),
                Value::BigInt(_) => Ok(Some(i64::MAX)),
                value => value.as_int().map(Some).ok_or_else(|| {
                    Raised::type_error("slice indices must be integers or None or have an __index__ method")
                }),
            }
        };
        Ok((bound(&slice.start)?, bound(&slice.end)?, bound(&slice.step)?))
    }

    // ========================================================================
    // Items
    // ========================================================================

    pub(in crate::interp) fn get_item(&self, obj: &Value, index: &Value) -> ExecResult<Value> {
        match obj {
            Value::List(items) => {
                let items = items.borrow();
                let i = sequence_index(obj, index, items.len(), LIST_INDEX_OUT_OF_RANGE_MSG)?;
                Ok(items[i].clone())
            }
            Value::Tuple(items) => {
                let i = sequence_index(obj, index, items.len(), TUPLE_INDEX_OUT_OF_RANGE_MSG)?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                if let Value::BigInt(_) = index {
                    return Err(Raised::index_error(INDEX_SIZED_INTEGER_MSG));
                }
                let i = index.as_int().ok_or_else(|| {
                    Raised::type_error(format!("string indices must be integers, not '{}'", index.type_name()))
                })?;
                str_char_at(s, i)
                    .map(Value::from)
                    .map_err(|e| Raised::index_error(e.message()))
            }
            Value::Dict(dict) => dict.borrow().get(index)?.ok_or_else(|| Raised::key_error(index.clone())),
            Value::Range(range) => {
                let i = sequence_index(obj, index, range.len(), "range object index out of range")?;
                range
                    .get(i)
                    .map(Value::Int)
                    .ok_or_else(|| Raised::index_error("range object index out of range"))
            }
            other => Err(Raised::type_error(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    pub(in crate::interp) fn set_item(&self, obj: &Value, index: &Value, value: Value) -> ExecResult<()> {
        match obj {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let i = sequence_index(obj, index, items.len(), "list assignment index out of range")?;
                items[i] = value;
                Ok(())
            }
            Value::Dict(dict) => dict.borrow_mut().insert(index.clone(), value),
            other => Err(Raised::type_error(format!(
                "'{}' object does not support item assignment",
                other.type_name()
            ))),
        }
    }

    pub(in crate::interp) fn del_item(&self, obj: &Value, index: &Value) -> ExecResult<()> {
        match obj {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let i = sequence_index(obj, index, items.len(), "list assignment index out of range")?;
                items.remove(i);
                Ok(())
            }
            Value::Dict(dict) => match dict.borrow_mut().remove(index)? {
                Some(_) => Ok(()),
                None => Err(Raised::key_error(index.clone())),
            },
            other => Err(Raised::type_error(format!(
                "'{}' object doesn't support item deletion",
                other.type_name()
            ))),
        }
    }

    // ========================================================================
    // Slices
    // ========================================================================

    pub(in crate::interp) fn get_slice(&self, obj: &Value, (start, stop, step): SliceBounds) -> ExecResult<Value> {
        let positions = |len: usize| slice_indices(len, start, stop, step).map_err(|e| Raised::value_error(e.message()));
        match obj {
            Value::List(items) => {
                let items = items.borrow();
                Ok(Value::list(positions(items.len())?.into_iter().map(|i| items[i].clone()).collect()))
            }
            Value::Tuple(items) => Ok(Value::tuple(
                positions(items.len())?.into_iter().map(|i| items[i].clone()).collect(),
            )),
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                Ok(Value::from(positions(chars.len())?.into_iter().map(|i| chars[i]).collect::<String>()))
            }
            Value::Range(range) => {
                let picked = positions(range.len())?;
                let new_step = range.step * step.unwrap_or(1);
                let new_start = picked.first().and_then(|&i| range.get(i)).unwrap_or(range.start);
                let stop = new_start.saturating_add(new_step.saturating_mul(picked.len() as i64));
                Ok(Value::Range(RangeValue {
                    start: new_start,
                    stop,
                    step: new_step,
                }))
            }
            other => Err(Raised::type_error(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    pub(in crate::interp) fn set_slice(&self, obj: &Value, bounds: SliceBounds, value: Value) -> ExecResult<()> {
        let Value::List(items) = obj else {
            return Err(Raised::type_error(format!(
                "'{}' object does not support item assignment",
                obj.type_name()
            )));
        };
        let replacement = collect_values(&value).map_err(|_| Raised::type_error("can only assign an iterable"))?;
        let mut items = items.borrow_mut();
        let (start, stop, step) = bounds;
        let positions =
            slice_indices(items.len(), start, stop, step).map_err(|e| Raised::value_error(e.message()))?;

        if step.unwrap_or(1) == 1 {
            let len = items.len() as i64;
            let clamp = |i: i64| if i < 0 { (i + len).max(0) } else { i.min(len) } as usize;
            let from = start.map_or(0, clamp);
            let to = stop.map_or(items.len(), clamp).max(from);
            items.splice(from..to, replacement);
            return Ok(());
        }

        if positions.len() != replacement.len() {
            return Err(Raised::value_error(format!(
                "attempt to assign sequence of size {} to extended slice of size {}",
                replacement.len(),
                positions.len()
            )));
        }
        for (i, item) in positions.into_iter().zip(replacement) {
            items[i] = item;
        }
        Ok(())
    }

    pub(in crate::interp) fn del_slice(&self, obj: &Value, (start, stop, step): SliceBounds) -> ExecResult<()> {
        let Value::List(items) = obj else {
            return Err(Raised::type_error(format!(
                "'{}' object doesn't support item deletion",
                obj.type_name()
            )));
        };
        let mut items = items.borrow_mut();
        let mut positions =
            slice_indices(items.len(), start, stop, step).map_err(|e| Raised::value_error(e.message()))?;
        positions.sort_unstable();
        for i in positions.into_iter().rev() {
            items.remove(i);
        }
        Ok(())
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub(in crate::interp) fn get_attr(&self, obj: &Value, name: &str) -> ExecResult<Value> {
        match obj {
            Value::Module(module) => modules::get_attr(module, obj, name),
            Value::Exception(exc) if name == "args" => Ok(Value::tuple(exc.args.clone())),
            Value::Function(func) if name == "__name__" => Ok(Value::from(&*func.name)),
            _ if has_method(obj, name) => Ok(Value::BoundMethod(Rc::new(BoundMethod {
                receiver: obj.clone(),
                name: name.into(),
            }))),
            _ => Err(Raised::attribute_error(obj, name)),
        }
    }
}

/// Resolve a Python index against a sequence length.
fn sequence_index(obj: &Value, index: &Value, len: usize, out_of_range: &str) -> ExecResult<usize> {
    if let Value::BigInt(_) = index {
        return Err(Raised::index_error(INDEX_SIZED_INTEGER_MSG));
    }
    let i = index.as_int().ok_or_else(|| {
        Raised::type_error(format!(
            "{} indices must be integers or slices, not {}",
            obj.type_name(),
            index.type_name()
        ))
    })?;
    normalize_index(len, i).ok_or_else(|| Raised::index_error(out_of_range))
}
