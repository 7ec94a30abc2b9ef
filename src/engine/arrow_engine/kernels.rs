//! Elementwise kernels that Arrow does not ship directly.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, ArrowPrimitiveType, AsArray, BooleanArray, Datum, PrimitiveArray,
    UInt32Array,
};
use arrow::compute::kernels::arity::{binary, try_binary};
use arrow::compute::kernels::boolean::{and, or};
use arrow::compute::kernels::cmp::{gt_eq, lt_eq, neq};
use arrow::compute::kernels::zip::zip;
use arrow::compute::{cast, is_not_null, take};
use arrow::datatypes::{
    Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type, UInt64Type,
    UInt8Type,
};
use arrow::error::{ArrowError, Result as ArrowResult};

use crate::ops::BinaryOperator;
use crate::types::TypeId;

/// One side of a binary kernel: a full array or a length-1 scalar.
pub(super) struct Side {
    values: ArrayRef,
    scalar: Option<arrow::array::Scalar<ArrayRef>>,
}

impl Side {
    pub(super) fn column(values: ArrayRef) -> Self {
        Side {
            values,
            scalar: None,
        }
    }

    pub(super) fn scalar(values: ArrayRef) -> Self {
        Side {
            scalar: Some(arrow::array::Scalar::new(Arc::clone(&values))),
            values,
        }
    }

    /// Returns the side as a datum for scalar-aware Arrow kernels.
    pub(super) fn datum(&self) -> &dyn Datum {
        match &self.scalar {
            Some(scalar) => scalar as &dyn Datum,
            None => &self.values as &dyn Datum,
        }
    }

    pub(super) fn cast(&self, to: TypeId) -> ArrowResult<Side> {
        let values = cast_to(&self.values, to)?;
        Ok(if self.scalar.is_some() {
            Side::scalar(values)
        } else {
            Side::column(values)
        })
    }

    /// Materializes the side at `len` rows, repeating a scalar.
    pub(super) fn broadcast(&self, len: usize) -> ArrowResult<ArrayRef> {
        if self.scalar.is_none() {
            if self.values.len() != len {
                return Err(ArrowError::InvalidArgumentError(format!(
                    "Cannot perform a binary operation on arrays of different length ({len} and {})",
                    self.values.len()
                )));
            }
            return Ok(Arc::clone(&self.values));
        }
        take(&self.values, &UInt32Array::from(vec![0u32; len]), None)
    }
}

/// Casts an array to the Arrow type of `to`, skipping no-op casts.
pub(super) fn cast_to(array: &ArrayRef, to: TypeId) -> ArrowResult<ArrayRef> {
    let target = to.to_arrow();
    if array.data_type() == &target {
        Ok(Arc::clone(array))
    } else {
        cast(array, &target)
    }
}

/// Expands `$body` once per integer type, binding `$T` to the Arrow type,
/// `$N` to its native type and `$U` to the unsigned native of equal width.
macro_rules! with_integral_type {
    ($type_id:expr, $T:ident, $N:ident, $U:ident, $body:block, $otherwise:expr) => {
        match $type_id {
            TypeId::Int8 => { type $T = Int8Type; type $N = i8; type $U = u8; $body }
            TypeId::Int16 => { type $T = Int16Type; type $N = i16; type $U = u16; $body }
            TypeId::Int32 => { type $T = Int32Type; type $N = i32; type $U = u32; $body }
            TypeId::Int64 => { type $T = Int64Type; type $N = i64; type $U = u64; $body }
            TypeId::UInt8 => { type $T = UInt8Type; type $N = u8; type $U = u8; $body }
            TypeId::UInt16 => { type $T = UInt16Type; type $N = u16; type $U = u16; $body }
            TypeId::UInt32 => { type $T = UInt32Type; type $N = u32; type $U = u32; $body }
            TypeId::UInt64 => { type $T = UInt64Type; type $N = u64; type $U = u64; $body }
            _ => $otherwise,
        }
    };
}

fn unsupported(op: BinaryOperator, output: TypeId) -> ArrowError {
    ArrowError::InvalidArgumentError(format!(
        "{} is not supported for output type {output}",
        op.qualified_name()
    ))
}

/// Division rounding toward negative infinity.
pub(super) fn floor_div(lhs: &ArrayRef, rhs: &ArrayRef, output: TypeId) -> ArrowResult<ArrayRef> {
    let result: ArrayRef = if output.is_floating() {
        let (l, r) = (cast_to(lhs, TypeId::Float64)?, cast_to(rhs, TypeId::Float64)?);
        let quotient: PrimitiveArray<Float64Type> = binary(
            l.as_primitive::<Float64Type>(),
            r.as_primitive::<Float64Type>(),
            |a, b| (a / b).floor(),
        )?;
        Arc::new(quotient)
    } else if output.is_signed_integral() {
        let (l, r) = (cast_to(lhs, TypeId::Int64)?, cast_to(rhs, TypeId::Int64)?);
        let quotient: PrimitiveArray<Int64Type> = try_binary(
            l.as_primitive::<Int64Type>(),
            r.as_primitive::<Int64Type>(),
            |a: i64, b: i64| {
                if b == 0 {
                    return Err(ArrowError::DivideByZero);
                }
                let q = a.wrapping_div(b);
                if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
                    Ok(q - 1)
                } else {
                    Ok(q)
                }
            },
        )?;
        Arc::new(quotient)
    } else if output.is_unsigned_integral() {
        let (l, r) = (cast_to(lhs, TypeId::UInt64)?, cast_to(rhs, TypeId::UInt64)?);
        let quotient: PrimitiveArray<UInt64Type> = try_binary(
            l.as_primitive::<UInt64Type>(),
            r.as_primitive::<UInt64Type>(),
            |a: u64, b: u64| a.checked_div(b).ok_or(ArrowError::DivideByZero),
        )?;
        Arc::new(quotient)
    } else {
        return Err(unsupported(BinaryOperator::FloorDiv, output));
    };
    cast_to(&result, output)
}

/// POW, LOG_BASE and ATAN2, evaluated in double precision.
pub(super) fn transcendental(
    op: BinaryOperator,
    lhs: &ArrayRef,
    rhs: &ArrayRef,
    output: TypeId,
) -> ArrowResult<ArrayRef> {
    if !(output.is_numeric() || output == TypeId::Bool8) {
        return Err(unsupported(op, output));
    }
    let (l, r) = (cast_to(lhs, TypeId::Float64)?, cast_to(rhs, TypeId::Float64)?);
    let (l, r) = (l.as_primitive::<Float64Type>(), r.as_primitive::<Float64Type>());
    let result: PrimitiveArray<Float64Type> = match op {
        BinaryOperator::Pow => binary(l, r, f64::powf)?,
        BinaryOperator::LogBase => binary(l, r, |a, b| a.ln() / b.ln())?,
        BinaryOperator::Atan2 => binary(l, r, f64::atan2)?,
        _ => return Err(unsupported(op, output)),
    };
    let result: ArrayRef = Arc::new(result);
    cast_to(&result, output)
}

/// Bitwise AND/OR/XOR and the shift family.
///
/// Shift amounts are taken modulo the bit width of the output type.
#[allow(clippy::unnecessary_cast, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub(super) fn bitwise(
    op: BinaryOperator,
    lhs: &ArrayRef,
    rhs: &ArrayRef,
    output: TypeId,
) -> ArrowResult<ArrayRef> {
    if output == TypeId::Bool8 {
        return boolean_bitwise(op, lhs, rhs);
    }
    let (l, r) = (cast_to(lhs, output)?, cast_to(rhs, output)?);
    with_integral_type!(
        output,
        T,
        N,
        U,
        {
            let (a, b) = (l.as_primitive::<T>(), r.as_primitive::<T>());
            let result: PrimitiveArray<T> = match op {
                BinaryOperator::BitwiseAnd => binary(a, b, |x: N, y: N| x & y)?,
                BinaryOperator::BitwiseOr => binary(a, b, |x: N, y: N| x | y)?,
                BinaryOperator::BitwiseXor => binary(a, b, |x: N, y: N| x ^ y)?,
                BinaryOperator::ShiftLeft => binary(a, b, |x: N, y: N| x.wrapping_shl(y as u32))?,
                BinaryOperator::ShiftRight => binary(a, b, |x: N, y: N| x.wrapping_shr(y as u32))?,
                BinaryOperator::ShiftRightUnsigned => {
                    binary(a, b, |x: N, y: N| (x as U).wrapping_shr(y as u32) as N)?
                }
                _ => return Err(unsupported(op, output)),
            };
            Ok(Arc::new(result) as ArrayRef)
        },
        Err(unsupported(op, output))
    )
}

fn boolean_bitwise(op: BinaryOperator, lhs: &ArrayRef, rhs: &ArrayRef) -> ArrowResult<ArrayRef> {
    let (l, r) = (cast_to(lhs, TypeId::Bool8)?, cast_to(rhs, TypeId::Bool8)?);
    let (l, r) = (l.as_boolean(), r.as_boolean());
    let result = match op {
        BinaryOperator::BitwiseAnd => and(l, r)?,
        BinaryOperator::BitwiseOr => or(l, r)?,
        BinaryOperator::BitwiseXor => neq(l, r)?,
        _ => return Err(unsupported(op, TypeId::Bool8)),
    };
    Ok(Arc::new(result))
}

/// LOGICAL_AND/OR over truthiness; null when either side is null.
pub(super) fn logical(
    op: BinaryOperator,
    lhs: &ArrayRef,
    rhs: &ArrayRef,
    output: TypeId,
) -> ArrowResult<ArrayRef> {
    let (l, r) = (cast_to(lhs, TypeId::Bool8)?, cast_to(rhs, TypeId::Bool8)?);
    let (l, r) = (l.as_boolean(), r.as_boolean());
    let result: ArrayRef = match op {
        BinaryOperator::LogicalAnd => Arc::new(and(l, r)?),
        BinaryOperator::LogicalOr => Arc::new(or(l, r)?),
        _ => return Err(unsupported(op, output)),
    };
    cast_to(&result, output)
}

/// Left value where valid, otherwise the right value.
pub(super) fn coalesce(lhs: &ArrayRef, rhs: &ArrayRef, output: TypeId) -> ArrowResult<ArrayRef> {
    let (l, r) = (cast_to(lhs, output)?, cast_to(rhs, output)?);
    let mask = is_not_null(&l)?;
    zip(&mask, &l, &r)
}

/// NULL_MAX / NULL_MIN: the larger (smaller) value, ignoring a null side.
pub(super) fn null_extremum(
    op: BinaryOperator,
    lhs: &ArrayRef,
    rhs: &ArrayRef,
    output: TypeId,
) -> ArrowResult<ArrayRef> {
    let (l, r) = (cast_to(lhs, output)?, cast_to(rhs, output)?);
    let prefer_left = match op {
        BinaryOperator::NullMax => gt_eq(&l, &r)?,
        BinaryOperator::NullMin => lt_eq(&l, &r)?,
        _ => return Err(unsupported(op, output)),
    };
    let mask: BooleanArray = (0..l.len())
        .map(|i| Some(l.is_valid(i) && (r.is_null(i) || prefer_left.value(i))))
        .collect();
    zip(&mask, &l, &r)
}

/// Floating-point natives.
pub(super) trait FloatNative: Copy {
    fn is_nan_value(self) -> bool;
}

impl FloatNative for f32 {
    fn is_nan_value(self) -> bool {
        self.is_nan()
    }
}

impl FloatNative for f64 {
    fn is_nan_value(self) -> bool {
        self.is_nan()
    }
}

/// Mask that is false exactly at NaN values; nulls are kept.
pub(super) fn not_nan_mask<T>(array: &PrimitiveArray<T>) -> BooleanArray
where
    T: ArrowPrimitiveType,
    T::Native: FloatNative,
{
    array
        .iter()
        .map(|value| Some(value.map_or(true, |v| !v.is_nan_value())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, Int8Array, UInt8Array};

    fn int32(values: Vec<Option<i32>>) -> ArrayRef {
        Arc::new(Int32Array::from(values))
    }

    #[test]
    fn test_floor_div_signed_rounds_down() {
        let l = int32(vec![Some(7), Some(-7), Some(7), Some(-7)]);
        let r = int32(vec![Some(2), Some(2), Some(-2), Some(-2)]);
        let result = floor_div(&l, &r, TypeId::Int32).unwrap();
        let values = result.as_primitive::<Int32Type>();
        assert_eq!(values.values().to_vec(), vec![3, -4, -4, 3]);
    }

    #[test]
    fn test_floor_div_by_zero_fails() {
        let l = int32(vec![Some(1)]);
        let r = int32(vec![Some(0)]);
        assert!(floor_div(&l, &r, TypeId::Int32).is_err());
    }

    #[test]
    fn test_floor_div_skips_null_divisor() {
        let l = int32(vec![Some(1), Some(4)]);
        let r = int32(vec![None, Some(2)]);
        let result = floor_div(&l, &r, TypeId::Int32).unwrap();
        assert!(result.is_null(0));
        assert_eq!(result.as_primitive::<Int32Type>().value(1), 2);
    }

    #[test]
    fn test_shift_right_unsigned_on_signed() {
        let l: ArrayRef = Arc::new(Int8Array::from(vec![-128i8]));
        let r: ArrayRef = Arc::new(Int8Array::from(vec![7i8]));
        let result = bitwise(BinaryOperator::ShiftRightUnsigned, &l, &r, TypeId::Int8).unwrap();
        assert_eq!(result.as_primitive::<Int8Type>().value(0), 1);

        let arithmetic = bitwise(BinaryOperator::ShiftRight, &l, &r, TypeId::Int8).unwrap();
        assert_eq!(arithmetic.as_primitive::<Int8Type>().value(0), -1);
    }

    #[test]
    fn test_shift_amount_wraps_at_width() {
        let l: ArrayRef = Arc::new(UInt8Array::from(vec![1u8]));
        let r: ArrayRef = Arc::new(UInt8Array::from(vec![9u8]));
        let result = bitwise(BinaryOperator::ShiftLeft, &l, &r, TypeId::UInt8).unwrap();
        assert_eq!(result.as_primitive::<UInt8Type>().value(0), 2);
    }

    #[test]
    fn test_bitwise_rejects_float_output() {
        let l: ArrayRef = Arc::new(Float64Array::from(vec![1.0]));
        assert!(bitwise(BinaryOperator::BitwiseAnd, &l, &l, TypeId::Float64).is_err());
    }

    #[test]
    fn test_null_extremum_ignores_null_side() {
        let l = int32(vec![Some(1), None, Some(5), None]);
        let r = int32(vec![Some(3), Some(2), None, None]);
        let max = null_extremum(BinaryOperator::NullMax, &l, &r, TypeId::Int32).unwrap();
        let max = max.as_primitive::<Int32Type>();
        assert_eq!(max.value(0), 3);
        assert_eq!(max.value(1), 2);
        assert_eq!(max.value(2), 5);
        assert!(max.is_null(3));

        let min = null_extremum(BinaryOperator::NullMin, &l, &r, TypeId::Int32).unwrap();
        assert_eq!(min.as_primitive::<Int32Type>().value(0), 1);
    }

    #[test]
    fn test_side_broadcast() {
        let side = Side::scalar(int32(vec![Some(9)]));
        let array = side.broadcast(3).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.as_primitive::<Int32Type>().value(2), 9);

        let column = Side::column(int32(vec![Some(1), Some(2)]));
        assert!(column.broadcast(3).is_err());
    }

    #[test]
    fn test_not_nan_mask_keeps_nulls() {
        let values = Float64Array::from(vec![Some(1.0), Some(f64::NAN), None]);
        let mask = not_nan_mask(&values);
        assert_eq!(
            mask.iter().collect::<Vec<_>>(),
            vec![Some(true), Some(false), Some(true)]
        );
    }
}
