//! Reduction dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{Column, Scalar};
use crate::error::{DispatchError, Result};
use crate::memory::MemoryResourceRef;
use crate::observability::{log_debug, log_warn};
use crate::types::TypeId;

use super::Dispatcher;

/// Reduction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Min,
    Max,
    Sum,
}

impl AggregationKind {
    /// Returns the lowercase name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Sum => "sum",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reduction request: what to compute and the type of the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub kind: AggregationKind,
    pub output: TypeId,
}

impl Aggregation {
    #[must_use]
    pub fn new(kind: AggregationKind, output: TypeId) -> Self {
        Aggregation { kind, output }
    }
}

/// Accumulator type for `sum` over a column of `input` type.
///
/// INT64 stays INT64 and UINT64 stays UINT64; every other numeric type, and
/// BOOL8, sums into FLOAT64.
///
/// # Errors
///
/// Returns `TypeError` for STRING and temporal input.
pub fn sum_output_type(input: TypeId) -> Result<TypeId> {
    match input {
        TypeId::Int64 => Ok(TypeId::Int64),
        TypeId::UInt64 => Ok(TypeId::UInt64),
        other if other.is_numeric() || other == TypeId::Bool8 => Ok(TypeId::Float64),
        other => Err(DispatchError::type_error(
            "Column.sum",
            format!("cannot sum a column of type {other}"),
        )),
    }
}

impl Dispatcher {
    /// Sums a column into its widened accumulator type.
    ///
    /// The result is null when the column has no valid rows.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` for non-numeric columns and `EngineLogicError`
    /// when the engine rejects the reduction.
    pub fn sum(&self, column: &Column, mr: Option<&MemoryResourceRef>) -> Result<Scalar> {
        let output = sum_output_type(column.type_id())?;
        self.reduce(column, Aggregation::new(AggregationKind::Sum, output), mr)
    }

    /// Minimum and maximum from a single engine traversal.
    ///
    /// Both are null for an empty or all-null column.
    ///
    /// # Errors
    ///
    /// Returns `EngineLogicError` when the engine rejects the reduction.
    pub fn minmax(&self, column: &Column) -> Result<(Scalar, Scalar)> {
        log_debug!(
            component = "reduce",
            event = "minmax",
            input_type = %column.type_id(),
            rows = column.len(),
        );
        self.engine().minmax(column).map_err(|err| {
            log_warn!(component = "reduce", event = "engine_error", kind = "minmax", error = %err);
            DispatchError::from(err)
        })
    }

    /// Minimum value. Runs a full [`Dispatcher::minmax`] on every call.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::minmax`].
    pub fn min(&self, column: &Column) -> Result<Scalar> {
        self.minmax(column).map(|(min, _)| min)
    }

    /// Maximum value. Runs a full [`Dispatcher::minmax`] on every call.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::minmax`].
    pub fn max(&self, column: &Column) -> Result<Scalar> {
        self.minmax(column).map(|(_, max)| max)
    }

    /// Issues one reduction call to the engine.
    ///
    /// # Errors
    ///
    /// Returns `EngineLogicError` carrying the engine's message when the
    /// engine rejects the reduction.
    pub fn reduce(
        &self,
        column: &Column,
        aggregation: Aggregation,
        mr: Option<&MemoryResourceRef>,
    ) -> Result<Scalar> {
        let resource = self.resolve(mr);
        log_debug!(
            component = "reduce",
            event = "reduce",
            kind = aggregation.kind.name(),
            input_type = %column.type_id(),
            output_type = %aggregation.output,
            resource = resource.name(),
        );
        self.engine()
            .reduce(column, aggregation, &resource)
            .map_err(|err| {
                log_warn!(
                    component = "reduce",
                    event = "engine_error",
                    kind = aggregation.kind.name(),
                    error = %err,
                );
                DispatchError::from(err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CountingResource, DeviceResources, ResourceAccessor};
    use crate::ops::dispatch::tests::RecordingEngine;
    use arrow::array::{Int32Array, StringArray};
    use std::sync::Arc;

    fn int_column(values: Vec<i32>) -> Column {
        Column::try_new(Arc::new(Int32Array::from(values))).unwrap()
    }

    #[test]
    fn test_sum_output_type_widening() {
        assert_eq!(sum_output_type(TypeId::Int64).unwrap(), TypeId::Int64);
        assert_eq!(sum_output_type(TypeId::UInt64).unwrap(), TypeId::UInt64);
        for input in [
            TypeId::Bool8,
            TypeId::Int8,
            TypeId::Int32,
            TypeId::UInt32,
            TypeId::Float32,
            TypeId::Float64,
        ] {
            assert_eq!(sum_output_type(input).unwrap(), TypeId::Float64, "{input}");
        }
    }

    #[test]
    fn test_sum_output_type_rejects_non_numeric() {
        for input in [TypeId::String, TypeId::TimestampSeconds, TypeId::DurationNanoseconds] {
            let err = sum_output_type(input).unwrap_err();
            assert_eq!(err.operator(), Some("Column.sum"));
        }
    }

    #[test]
    fn test_min_and_max_each_run_minmax() {
        let engine = Arc::new(RecordingEngine::default());
        let dispatcher = Dispatcher::with_engine(engine.clone());
        let column = int_column(vec![3, 1, 2]);

        dispatcher.min(&column).unwrap();
        dispatcher.max(&column).unwrap();

        assert_eq!(engine.calls.lock().len(), 2);
    }

    #[test]
    fn test_sum_resolves_resource_and_output_type() {
        let engine = Arc::new(RecordingEngine::default());
        let resources = Arc::new(DeviceResources::new(Arc::new(CountingResource::new("pool"))));
        let dispatcher = Dispatcher::new(engine.clone(), resources as Arc<dyn ResourceAccessor>);

        let result = dispatcher.sum(&int_column(vec![1, 2]), None).unwrap();
        assert_eq!(result.type_id(), TypeId::Float64);

        let calls = engine.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].output, TypeId::Float64);
        assert_eq!(calls[0].resource, "pool");
    }

    #[test]
    fn test_sum_type_error_skips_engine() {
        let engine = Arc::new(RecordingEngine::default());
        let dispatcher = Dispatcher::with_engine(engine.clone());
        let strings = Column::try_new(Arc::new(StringArray::from(vec!["a"]))).unwrap();

        assert!(dispatcher.sum(&strings, None).unwrap_err().is_type_error());
        assert!(engine.calls.lock().is_empty());
    }

    #[test]
    fn test_aggregation_serde() {
        let aggregation = Aggregation::new(AggregationKind::Sum, TypeId::Float64);
        let json = serde_json::to_string(&aggregation).unwrap();
        assert_eq!(json, r#"{"kind":"sum","output":"FLOAT64"}"#);
    }
}
