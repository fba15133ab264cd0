//! Shared adapters to map syntax and runtime types into numeric policy enums.
use testmynb_core::{NumericOp, NumericTy};
use testmynb_syntax::ast::{BinaryOp, CompareOp};

use crate::interp::Value;

/// Map an AST BinaryOp to NumericOp. `and`/`or` are not numeric.
pub fn numeric_op_from_ast(op: BinaryOp) -> Option<NumericOp> {
    match op {
        BinaryOp::Add => Some(NumericOp::Add),
        BinaryOp::Sub => Some(NumericOp::Sub),
        BinaryOp::Mul => Some(NumericOp::Mul),
        BinaryOp::Div => Some(NumericOp::Div),
        BinaryOp::FloorDiv => Some(NumericOp::FloorDiv),
        BinaryOp::Mod => Some(NumericOp::Mod),
        BinaryOp::Pow => Some(NumericOp::Pow),
        BinaryOp::And | BinaryOp::Or => None,
    }
}

/// Map an ordering/equality CompareOp to NumericOp. Membership and identity tests are not numeric.
pub fn numeric_op_from_compare(op: CompareOp) -> Option<NumericOp> {
    match op {
        CompareOp::Eq => Some(NumericOp::Eq),
        CompareOp::NotEq => Some(NumericOp::NotEq),
        CompareOp::Lt => Some(NumericOp::Lt),
        CompareOp::LtEq => Some(NumericOp::LtEq),
        CompareOp::Gt => Some(NumericOp::Gt),
        CompareOp::GtEq => Some(NumericOp::GtEq),
        CompareOp::In | CompareOp::NotIn | CompareOp::Is | CompareOp::IsNot => None,
    }
}

/// Numeric category of a runtime value. `bool` counts as `int`.
pub fn numeric_ty_of(value: &Value) -> Option<NumericTy> {
    match value {
        Value::Int(_) | Value::BigInt(_) | Value::Bool(_) => Some(NumericTy::Int),
        Value::Float(_) => Some(NumericTy::Float),
        _ => None,
    }
}
