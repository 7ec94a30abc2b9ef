//! Host-memory execution engine on Arrow compute kernels.

mod binary;
mod kernels;
mod reduce;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{filter, is_not_null};
use arrow::datatypes::{Float32Type, Float64Type};

use crate::data::{Column, Operand, Scalar};
use crate::memory::{MemoryResourceRef, Reservation};
use crate::observability::log_trace;
use crate::ops::{Aggregation, BinaryOperator};
use crate::types::TypeId;

use super::{EngineConfig, EngineError, EngineResult, ExecutionEngine};

/// Execution engine evaluating operations with Arrow kernels.
#[derive(Debug, Clone, Default)]
pub struct ArrowEngine {
    config: EngineConfig,
}

impl ArrowEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        ArrowEngine { config }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Charges a result array to the memory resource and wraps it as a column.
///
/// The charge is held by the column and released when it is dropped.
fn charge_column(
    array: ArrayRef,
    type_id: TypeId,
    mr: &MemoryResourceRef,
) -> EngineResult<Column> {
    let reservation = Reservation::acquire(mr, array.get_array_memory_size())?;
    Ok(Column::from_typed(array, type_id).with_reservation(reservation))
}

fn charge_scalar(scalar: Scalar, mr: &MemoryResourceRef) -> EngineResult<Scalar> {
    let reservation = Reservation::acquire(mr, scalar.array().get_array_memory_size())?;
    Ok(scalar.with_reservation(reservation))
}

impl ExecutionEngine for ArrowEngine {
    fn binary_op(
        &self,
        lhs: &Column,
        rhs: &Operand,
        op: BinaryOperator,
        output: TypeId,
        mr: &MemoryResourceRef,
    ) -> EngineResult<Column> {
        log_trace!(
            component = "engine",
            event = "binary_op",
            operator = op.name(),
            lhs_type = %lhs.type_id(),
            rhs_type = %rhs.type_id(),
            output_type = %output,
            rows = lhs.len(),
        );
        let result = binary::evaluate(&self.config, lhs, rhs, op, output)?;
        charge_column(result, output, mr)
    }

    fn reduce(
        &self,
        column: &Column,
        aggregation: Aggregation,
        mr: &MemoryResourceRef,
    ) -> EngineResult<Scalar> {
        log_trace!(
            component = "engine",
            event = "reduce",
            kind = ?aggregation.kind,
            input_type = %column.type_id(),
            output_type = %aggregation.output,
        );
        let scalar = reduce::reduce(&self.config, column, aggregation)?;
        charge_scalar(scalar, mr)
    }

    fn minmax(&self, column: &Column) -> EngineResult<(Scalar, Scalar)> {
        reduce::minmax(&self.config, column)
    }

    fn apply_boolean_mask(
        &self,
        column: &Column,
        mask: &Column,
        mr: &MemoryResourceRef,
    ) -> EngineResult<Column> {
        let predicate = mask.array().as_boolean_opt().ok_or_else(|| {
            EngineError::Compute(format!(
                "boolean mask must be BOOL8, got {}",
                mask.type_id()
            ))
        })?;
        if predicate.len() != column.len() {
            return Err(EngineError::Compute(format!(
                "boolean mask length {} does not match column length {}",
                predicate.len(),
                column.len()
            )));
        }
        let result = filter(column.array(), predicate)?;
        charge_column(result, column.type_id(), mr)
    }

    fn drop_nulls(&self, column: &Column, mr: &MemoryResourceRef) -> EngineResult<Column> {
        let valid = is_not_null(column.array())?;
        let result = filter(column.array(), &valid)?;
        charge_column(result, column.type_id(), mr)
    }

    fn drop_nans(&self, column: &Column, mr: &MemoryResourceRef) -> EngineResult<Column> {
        let array = column.array();
        let keep = match column.type_id() {
            TypeId::Float32 => kernels::not_nan_mask(array.as_primitive::<Float32Type>()),
            TypeId::Float64 => kernels::not_nan_mask(array.as_primitive::<Float64Type>()),
            _ => return charge_column(Arc::clone(array), column.type_id(), mr),
        };
        let result = filter(array, &keep)?;
        charge_column(result, column.type_id(), mr)
    }
}
