//! Execution engine interface.
//!
//! The dispatch layer never computes results itself. It resolves one call
//! into an [`ExecutionEngine`], which owns the kernels. [`ArrowEngine`] is a
//! host-memory implementation on Arrow compute kernels.

mod arrow_engine;

use std::fmt;

use arrow::error::ArrowError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Column, Operand, Scalar};
use crate::memory::{AllocationError, MemoryResourceRef};
use crate::ops::{Aggregation, BinaryOperator};
use crate::types::TypeId;

pub use arrow_engine::ArrowEngine;

/// Result type alias using [`EngineError`].
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Logic failures raised by an execution engine.
///
/// These are deterministic (bad type combination, unsupported operator for a
/// type, length mismatch) and are never retried.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failure reported by an Arrow kernel.
    #[error(transparent)]
    Arrow(#[from] ArrowError),

    /// The memory resource refused the result allocation.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Operator not implemented for the given output type.
    #[error("Unsupported operation: Column.{operator} with output type {output}")]
    UnsupportedOperator {
        operator: BinaryOperator,
        output: TypeId,
    },

    /// Operand types the engine cannot combine.
    #[error("Unsupported operand types for {operator}: {lhs} and {rhs}")]
    UnsupportedTypes {
        operator: BinaryOperator,
        lhs: TypeId,
        rhs: TypeId,
    },

    /// General compute failure.
    #[error("Compute error: {0}")]
    Compute(String),
}

/// Narrow interface into a vectorized execution engine.
pub trait ExecutionEngine: Send + Sync + fmt::Debug {
    /// Applies `op` elementwise, producing a column of `output` type.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the engine rejects the operation.
    fn binary_op(
        &self,
        lhs: &Column,
        rhs: &Operand,
        op: BinaryOperator,
        output: TypeId,
        mr: &MemoryResourceRef,
    ) -> EngineResult<Column>;

    /// Reduces a column to a single value.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the engine rejects the reduction.
    fn reduce(
        &self,
        column: &Column,
        aggregation: Aggregation,
        mr: &MemoryResourceRef,
    ) -> EngineResult<Scalar>;

    /// Computes minimum and maximum in one traversal.
    ///
    /// Both values are null for an empty or all-null column.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the column type is not orderable.
    fn minmax(&self, column: &Column) -> EngineResult<(Scalar, Scalar)>;

    /// Keeps the rows where `mask` is true.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the mask is not a boolean column of the
    /// same length.
    fn apply_boolean_mask(
        &self,
        column: &Column,
        mask: &Column,
        mr: &MemoryResourceRef,
    ) -> EngineResult<Column>;

    /// Removes null rows.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if filtering fails.
    fn drop_nulls(&self, column: &Column, mr: &MemoryResourceRef) -> EngineResult<Column>;

    /// Removes NaN rows from floating columns; other columns are returned as is.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if filtering fails.
    fn drop_nans(&self, column: &Column, mr: &MemoryResourceRef) -> EngineResult<Column>;
}

/// Configuration for [`ArrowEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fail on integer overflow instead of wrapping (ADD, SUB, MUL, sum).
    pub checked_arithmetic: bool,
    /// Skip NaN values when computing floating-point extrema.
    pub nan_is_null_for_minmax: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            checked_arithmetic: false,
            nan_is_null_for_minmax: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new engine configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether integer arithmetic is overflow-checked.
    #[must_use]
    pub fn with_checked_arithmetic(mut self, checked: bool) -> Self {
        self.checked_arithmetic = checked;
        self
    }

    /// Sets whether NaN is ignored by `minmax`.
    #[must_use]
    pub fn with_nan_is_null_for_minmax(mut self, skip: bool) -> Self {
        self.nan_is_null_for_minmax = skip;
        self
    }
}
