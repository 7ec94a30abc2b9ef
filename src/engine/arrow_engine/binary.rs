//! Binary operator evaluation.

use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::kernels::cmp::{eq, gt, gt_eq, lt, lt_eq, neq, not_distinct};
use arrow::compute::kernels::numeric::{
    add, add_wrapping, div, mul, mul_wrapping, rem, sub, sub_wrapping,
};
use arrow::error::Result as ArrowResult;

use crate::data::{Column, Operand};
use crate::engine::{EngineConfig, EngineError, EngineResult};
use crate::ops::BinaryOperator;
use crate::types::{promote, TypeId};

use super::kernels::{self, cast_to, Side};

/// Evaluates `lhs op rhs`, returning an array of the `output` type.
pub(super) fn evaluate(
    config: &EngineConfig,
    lhs: &Column,
    rhs: &Operand,
    op: BinaryOperator,
    output: TypeId,
) -> EngineResult<ArrayRef> {
    let rhs_side = match rhs {
        Operand::Column(column) => Side::column(Arc::clone(column.array())),
        Operand::Scalar(scalar) => Side::scalar(Arc::clone(scalar.array())),
    };
    let lhs_type = lhs.type_id();
    let rhs_type = rhs.type_id();
    let lhs = lhs.array();

    let result = match op {
        BinaryOperator::Add
        | BinaryOperator::Sub
        | BinaryOperator::Mul
        | BinaryOperator::Div
        | BinaryOperator::Mod => {
            arithmetic(config, op, lhs, lhs_type, &rhs_side, rhs_type, output)?
        }
        BinaryOperator::TrueDiv => {
            let l = cast_to(lhs, TypeId::Float64)?;
            let r = rhs_side.cast(TypeId::Float64)?;
            div(&l, r.datum())?
        }
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual
        | BinaryOperator::NullEquals => compare(op, lhs, lhs_type, &rhs_side, rhs_type)?,
        BinaryOperator::FloorDiv => {
            kernels::floor_div(lhs, &rhs_side.broadcast(lhs.len())?, output)?
        }
        BinaryOperator::Pow | BinaryOperator::LogBase | BinaryOperator::Atan2 => {
            kernels::transcendental(op, lhs, &rhs_side.broadcast(lhs.len())?, output)?
        }
        BinaryOperator::BitwiseAnd
        | BinaryOperator::BitwiseOr
        | BinaryOperator::BitwiseXor
        | BinaryOperator::ShiftLeft
        | BinaryOperator::ShiftRight
        | BinaryOperator::ShiftRightUnsigned => {
            let boolean_ok = output == TypeId::Bool8 && !is_shift(op);
            if !(output.is_integral() || boolean_ok) {
                return Err(EngineError::UnsupportedOperator {
                    operator: op,
                    output,
                });
            }
            kernels::bitwise(op, lhs, &rhs_side.broadcast(lhs.len())?, output)?
        }
        BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => {
            kernels::logical(op, lhs, &rhs_side.broadcast(lhs.len())?, output)?
        }
        BinaryOperator::Coalesce => {
            kernels::coalesce(lhs, &rhs_side.broadcast(lhs.len())?, output)?
        }
        BinaryOperator::NullMax | BinaryOperator::NullMin => {
            kernels::null_extremum(op, lhs, &rhs_side.broadcast(lhs.len())?, output)?
        }
    };

    Ok(cast_to(&result, output)?)
}

fn is_shift(op: BinaryOperator) -> bool {
    matches!(
        op,
        BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight | BinaryOperator::ShiftRightUnsigned
    )
}

/// Operand type used for arithmetic producing `output`.
///
/// Durations keep their kind when added to or subtracted from timestamps.
fn arithmetic_operand_type(operand: TypeId, output: TypeId) -> TypeId {
    if output.is_timestamp() && operand.is_duration() {
        output.resolution().map_or(operand, TypeId::duration)
    } else {
        output
    }
}

fn arithmetic(
    config: &EngineConfig,
    op: BinaryOperator,
    lhs: &ArrayRef,
    lhs_type: TypeId,
    rhs: &Side,
    rhs_type: TypeId,
    output: TypeId,
) -> ArrowResult<ArrayRef> {
    let l = cast_to(lhs, arithmetic_operand_type(lhs_type, output))?;
    let r = rhs.cast(arithmetic_operand_type(rhs_type, output))?;
    let r = r.datum();
    let checked = config.checked_arithmetic;
    match op {
        BinaryOperator::Add if checked => add(&l, r),
        BinaryOperator::Add => add_wrapping(&l, r),
        BinaryOperator::Sub if checked => sub(&l, r),
        BinaryOperator::Sub => sub_wrapping(&l, r),
        BinaryOperator::Mul if checked => mul(&l, r),
        BinaryOperator::Mul => mul_wrapping(&l, r),
        BinaryOperator::Div => div(&l, r),
        _ => rem(&l, r),
    }
}

/// Comparisons evaluate in the common type of both operands.
fn compare(
    op: BinaryOperator,
    lhs: &ArrayRef,
    lhs_type: TypeId,
    rhs: &Side,
    rhs_type: TypeId,
) -> EngineResult<ArrayRef> {
    let common = promote(lhs_type, rhs_type).ok_or(EngineError::UnsupportedTypes {
        operator: op,
        lhs: lhs_type,
        rhs: rhs_type,
    })?;
    let l = cast_to(lhs, common)?;
    let r = rhs.cast(common)?;
    let r = r.datum();
    let result = match op {
        BinaryOperator::Equal => eq(&l, r)?,
        BinaryOperator::NotEqual => neq(&l, r)?,
        BinaryOperator::Less => lt(&l, r)?,
        BinaryOperator::LessEqual => lt_eq(&l, r)?,
        BinaryOperator::Greater => gt(&l, r)?,
        BinaryOperator::GreaterEqual => gt_eq(&l, r)?,
        _ => not_distinct(&l, r)?,
    };
    Ok(Arc::new(result))
}
