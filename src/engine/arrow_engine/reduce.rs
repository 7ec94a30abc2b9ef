//! Reductions over a single column.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, ArrowPrimitiveType, AsArray, BooleanArray, PrimitiveArray, StringArray,
};
use arrow::compute::{
    filter, max, max_boolean, max_string, min, min_boolean, min_string, sum, sum_checked,
};
use arrow::datatypes::{
    Date32Type, DurationMicrosecondType, DurationMillisecondType, DurationNanosecondType,
    DurationSecondType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};

use crate::data::{Column, Scalar};
use crate::engine::{EngineConfig, EngineError, EngineResult};
use crate::ops::{Aggregation, AggregationKind};
use crate::types::TypeId;

use super::kernels::{cast_to, not_nan_mask, FloatNative};

/// Reduces `column` according to `aggregation`.
pub(super) fn reduce(
    config: &EngineConfig,
    column: &Column,
    aggregation: Aggregation,
) -> EngineResult<Scalar> {
    match aggregation.kind {
        AggregationKind::Sum => sum_as(config, column, aggregation.output),
        AggregationKind::Min => extremum_as(minmax(config, column)?.0, aggregation.output),
        AggregationKind::Max => extremum_as(minmax(config, column)?.1, aggregation.output),
    }
}

/// Casts an extremum to the requested output type.
fn extremum_as(value: Scalar, output: TypeId) -> EngineResult<Scalar> {
    if value.type_id() == output {
        return Ok(value);
    }
    let array = cast_to(value.array(), output)?;
    Ok(Scalar::from_typed(array, output))
}

fn sum_as(config: &EngineConfig, column: &Column, output: TypeId) -> EngineResult<Scalar> {
    if !(column.type_id().is_numeric() || column.type_id() == TypeId::Bool8) {
        return Err(EngineError::Compute(format!(
            "sum is not supported for {}",
            column.type_id()
        )));
    }
    let values = cast_to(column.array(), output)?;
    match output {
        TypeId::Int64 => sum_primitive::<Int64Type>(config, &values, output),
        TypeId::UInt64 => sum_primitive::<UInt64Type>(config, &values, output),
        TypeId::Float64 => sum_primitive::<Float64Type>(config, &values, output),
        other => Err(EngineError::Compute(format!(
            "sum accumulator must be INT64, UINT64 or FLOAT64, got {other}"
        ))),
    }
}

fn sum_primitive<T: ArrowPrimitiveType>(
    config: &EngineConfig,
    values: &ArrayRef,
    output: TypeId,
) -> EngineResult<Scalar> {
    let values = values.as_primitive::<T>();
    let total = if config.checked_arithmetic {
        sum_checked(values)?
    } else {
        sum(values)
    };
    Ok(primitive_scalar::<T>(total, output))
}

fn primitive_scalar<T: ArrowPrimitiveType>(value: Option<T::Native>, type_id: TypeId) -> Scalar {
    let array: PrimitiveArray<T> = std::iter::once(value).collect();
    Scalar::from_typed(Arc::new(array), type_id)
}

/// Computes both extrema in one pass over the column.
///
/// Nulls are skipped. NaN is skipped too unless the configuration says
/// otherwise, in which case it orders above every other value.
pub(super) fn minmax(config: &EngineConfig, column: &Column) -> EngineResult<(Scalar, Scalar)> {
    let array = column.array();
    let type_id = column.type_id();
    let pair = match type_id {
        TypeId::Int8 => primitive_minmax::<Int8Type>(array, type_id),
        TypeId::Int16 => primitive_minmax::<Int16Type>(array, type_id),
        TypeId::Int32 => primitive_minmax::<Int32Type>(array, type_id),
        TypeId::Int64 => primitive_minmax::<Int64Type>(array, type_id),
        TypeId::UInt8 => primitive_minmax::<UInt8Type>(array, type_id),
        TypeId::UInt16 => primitive_minmax::<UInt16Type>(array, type_id),
        TypeId::UInt32 => primitive_minmax::<UInt32Type>(array, type_id),
        TypeId::UInt64 => primitive_minmax::<UInt64Type>(array, type_id),
        TypeId::Float32 => {
            let values = without_nans::<Float32Type>(config, array)?;
            primitive_minmax::<Float32Type>(&values, type_id)
        }
        TypeId::Float64 => {
            let values = without_nans::<Float64Type>(config, array)?;
            primitive_minmax::<Float64Type>(&values, type_id)
        }
        TypeId::TimestampDays => primitive_minmax::<Date32Type>(array, type_id),
        TypeId::TimestampSeconds => primitive_minmax::<TimestampSecondType>(array, type_id),
        TypeId::TimestampMilliseconds => {
            primitive_minmax::<TimestampMillisecondType>(array, type_id)
        }
        TypeId::TimestampMicroseconds => {
            primitive_minmax::<TimestampMicrosecondType>(array, type_id)
        }
        TypeId::TimestampNanoseconds => primitive_minmax::<TimestampNanosecondType>(array, type_id),
        TypeId::DurationSeconds => primitive_minmax::<DurationSecondType>(array, type_id),
        TypeId::DurationMilliseconds => primitive_minmax::<DurationMillisecondType>(array, type_id),
        TypeId::DurationMicroseconds => primitive_minmax::<DurationMicrosecondType>(array, type_id),
        TypeId::DurationNanoseconds => primitive_minmax::<DurationNanosecondType>(array, type_id),
        TypeId::Bool8 => {
            let values = array.as_boolean();
            let build = |v: Option<bool>| {
                Scalar::from_typed(Arc::new(BooleanArray::from(vec![v])), type_id)
            };
            (build(min_boolean(values)), build(max_boolean(values)))
        }
        TypeId::String => {
            let values = array.as_string::<i32>();
            let build = |v: Option<&str>| {
                Scalar::from_typed(Arc::new(StringArray::from(vec![v])), type_id)
            };
            (build(min_string(values)), build(max_string(values)))
        }
    };
    Ok(pair)
}

fn primitive_minmax<T: ArrowPrimitiveType>(array: &ArrayRef, type_id: TypeId) -> (Scalar, Scalar) {
    let values = array.as_primitive::<T>();
    (
        primitive_scalar::<T>(min(values), type_id),
        primitive_scalar::<T>(max(values), type_id),
    )
}

fn without_nans<T>(config: &EngineConfig, array: &ArrayRef) -> EngineResult<ArrayRef>
where
    T: ArrowPrimitiveType,
    T::Native: FloatNative,
{
    if !config.nan_is_null_for_minmax {
        return Ok(Arc::clone(array));
    }
    let keep = not_nan_mask(array.as_primitive::<T>());
    Ok(filter(array, &keep)?)
}
