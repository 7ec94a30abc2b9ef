//! Binary operation dispatch.

use std::sync::Arc;

use crate::data::{Column, Operand};
use crate::engine::{ArrowEngine, ExecutionEngine};
use crate::error::{DispatchError, Result};
use crate::memory::{DeviceResources, MemoryResourceRef, ResourceAccessor};
use crate::observability::{log_debug, log_warn};

use super::normalize::{normalize, Argument};
use super::BinaryOperator;

/// Routes binary operations and reductions into an execution engine.
///
/// A dispatcher holds no per-call state. The default memory resource is read
/// from the injected [`ResourceAccessor`] on every call that is not given
/// one explicitly, so swapping the current resource between calls is seen by
/// the next call.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine: Arc<dyn ExecutionEngine>,
    resources: Arc<dyn ResourceAccessor>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_engine(Arc::new(ArrowEngine::new()))
    }
}

impl Dispatcher {
    /// Creates a dispatcher over `engine` resolving default resources
    /// through `resources`.
    #[must_use]
    pub fn new(engine: Arc<dyn ExecutionEngine>, resources: Arc<dyn ResourceAccessor>) -> Self {
        Dispatcher { engine, resources }
    }

    /// Creates a dispatcher over `engine` using the process-wide resources.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self::new(engine, DeviceResources::global())
    }

    /// Returns the execution engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn ExecutionEngine> {
        &self.engine
    }

    /// Resolves the memory resource for one call.
    #[must_use]
    pub fn resolve(&self, mr: Option<&MemoryResourceRef>) -> MemoryResourceRef {
        match mr {
            Some(resource) => Arc::clone(resource),
            None => self.resources.current(),
        }
    }

    /// Normalizes `rhs` and applies `op` to `lhs` and `rhs`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` for an unsupported argument shape or a type pair
    /// with no common type, and `EngineLogicError` when the engine rejects
    /// the operation.
    pub fn binary_op(
        &self,
        lhs: &Column,
        rhs: impl Into<Argument>,
        op: BinaryOperator,
        mr: Option<&MemoryResourceRef>,
    ) -> Result<Column> {
        let rhs = normalize(rhs.into(), lhs.type_id(), op)?;
        self.dispatch(lhs, &rhs, op, mr)
    }

    /// Applies `op` to an already normalized operand with one engine call.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` when the operand types have no common type, and
    /// `EngineLogicError` carrying the engine's message when the engine
    /// rejects the operation.
    pub fn dispatch(
        &self,
        lhs: &Column,
        rhs: &Operand,
        op: BinaryOperator,
        mr: Option<&MemoryResourceRef>,
    ) -> Result<Column> {
        let output = op.descriptor().output_type(lhs.type_id(), rhs.type_id())?;
        let resource = self.resolve(mr);

        log_debug!(
            component = "dispatch",
            event = "binary_op",
            operator = op.name(),
            lhs_type = %lhs.type_id(),
            rhs_type = %rhs.type_id(),
            rhs_scalar = rhs.is_scalar(),
            output_type = %output,
            resource = resource.name(),
        );

        self.engine
            .binary_op(lhs, rhs, op, output, &resource)
            .map_err(|err| {
                log_warn!(
                    component = "dispatch",
                    event = "engine_error",
                    operator = op.name(),
                    error = %err,
                );
                DispatchError::from(err)
            })
    }

    /// Applies the operator with the given symbol alias, such as `"+"`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` for an unknown symbol, otherwise as
    /// [`Dispatcher::binary_op`].
    pub fn apply_symbol(
        &self,
        lhs: &Column,
        symbol: &str,
        rhs: impl Into<Argument>,
        mr: Option<&MemoryResourceRef>,
    ) -> Result<Column> {
        let op = BinaryOperator::from_symbol(symbol).ok_or_else(|| {
            DispatchError::type_error("Column", format!("unknown operator symbol {symbol:?}"))
        })?;
        self.binary_op(lhs, rhs, op, mr)
    }
}

macro_rules! named_operators {
    ($($method:ident => $op:ident),* $(,)?) => {
        impl Dispatcher {
            $(
                #[doc = concat!("Applies [`BinaryOperator::", stringify!($op), "`].")]
                ///
                /// # Errors
                ///
                /// See [`Dispatcher::binary_op`].
                pub fn $method(
                    &self,
                    lhs: &Column,
                    rhs: impl Into<Argument>,
                    mr: Option<&MemoryResourceRef>,
                ) -> Result<Column> {
                    self.binary_op(lhs, rhs, BinaryOperator::$op, mr)
                }
            )*
        }
    };
}

named_operators! {
    add => Add,
    sub => Sub,
    mul => Mul,
    div => Div,
    true_div => TrueDiv,
    floor_div => FloorDiv,
    modulo => Mod,
    pow => Pow,
    eq => Equal,
    ne => NotEqual,
    lt => Less,
    le => LessEqual,
    gt => Greater,
    ge => GreaterEqual,
    bitwise_and => BitwiseAnd,
    bitwise_or => BitwiseOr,
    bitwise_xor => BitwiseXor,
    logical_and => LogicalAnd,
    logical_or => LogicalOr,
    coalesce => Coalesce,
    shift_left => ShiftLeft,
    shift_right => ShiftRight,
    shift_right_unsigned => ShiftRightUnsigned,
    log_base => LogBase,
    atan2 => Atan2,
    null_equals => NullEquals,
    null_max => NullMax,
    null_min => NullMin,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::Scalar;
    use crate::engine::{EngineError, EngineResult};
    use crate::memory::{CountingResource, MemoryResource};
    use crate::ops::Aggregation;
    use crate::types::TypeId;
    use arrow::array::{BooleanArray, Int32Array, StringArray};
    use parking_lot::Mutex;

    /// One recorded engine call.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Call {
        pub operator: Option<BinaryOperator>,
        pub output: TypeId,
        pub resource: String,
    }

    /// Engine double that records calls and returns canned results.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingEngine {
        pub calls: Mutex<Vec<Call>>,
        pub fail_with: Option<String>,
    }

    impl RecordingEngine {
        pub(crate) fn failing(message: &str) -> Self {
            RecordingEngine {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }

        fn result_column(output: TypeId) -> Column {
            match output {
                TypeId::Bool8 => Column::try_new(Arc::new(BooleanArray::from(vec![true]))),
                TypeId::String => Column::try_new(Arc::new(StringArray::from(vec!["x"]))),
                _ => Column::try_new(Arc::new(Int32Array::from(vec![0]))),
            }
            .unwrap()
        }
    }

    impl ExecutionEngine for RecordingEngine {
        fn binary_op(
            &self,
            _lhs: &Column,
            _rhs: &Operand,
            op: BinaryOperator,
            output: TypeId,
            mr: &MemoryResourceRef,
        ) -> EngineResult<Column> {
            self.calls.lock().push(Call {
                operator: Some(op),
                output,
                resource: mr.name().to_string(),
            });
            match &self.fail_with {
                Some(message) => Err(EngineError::Compute(message.clone())),
                None => Ok(Self::result_column(output)),
            }
        }

        fn reduce(
            &self,
            _column: &Column,
            aggregation: Aggregation,
            mr: &MemoryResourceRef,
        ) -> EngineResult<Scalar> {
            self.calls.lock().push(Call {
                operator: None,
                output: aggregation.output,
                resource: mr.name().to_string(),
            });
            match &self.fail_with {
                Some(message) => Err(EngineError::Compute(message.clone())),
                None => Ok(Scalar::null(aggregation.output)),
            }
        }

        fn minmax(&self, column: &Column) -> EngineResult<(Scalar, Scalar)> {
            self.calls.lock().push(Call {
                operator: None,
                output: column.type_id(),
                resource: String::new(),
            });
            Ok((Scalar::null(column.type_id()), Scalar::null(column.type_id())))
        }

        fn apply_boolean_mask(
            &self,
            column: &Column,
            _mask: &Column,
            _mr: &MemoryResourceRef,
        ) -> EngineResult<Column> {
            Ok(column.clone())
        }

        fn drop_nulls(&self, column: &Column, _mr: &MemoryResourceRef) -> EngineResult<Column> {
            Ok(column.clone())
        }

        fn drop_nans(&self, column: &Column, _mr: &MemoryResourceRef) -> EngineResult<Column> {
            Ok(column.clone())
        }
    }

    fn int_column(values: Vec<i32>) -> Column {
        Column::try_new(Arc::new(Int32Array::from(values))).unwrap()
    }

    fn recording_dispatcher(engine: Arc<RecordingEngine>) -> (Dispatcher, Arc<DeviceResources>) {
        let resources = Arc::new(DeviceResources::new(Arc::new(CountingResource::new("first"))));
        let dispatcher = Dispatcher::new(engine, Arc::clone(&resources) as Arc<dyn ResourceAccessor>);
        (dispatcher, resources)
    }

    #[test]
    fn test_one_engine_call_per_operation() {
        let engine = Arc::new(RecordingEngine::default());
        let (dispatcher, _) = recording_dispatcher(Arc::clone(&engine));
        let lhs = int_column(vec![1, 2, 3]);

        dispatcher.add(&lhs, 10i32, None).unwrap();
        dispatcher.lt(&lhs, 2.5f64, None).unwrap();

        let calls = engine.calls.lock().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operator, Some(BinaryOperator::Add));
        assert_eq!(calls[0].output, TypeId::Int32);
        assert_eq!(calls[1].operator, Some(BinaryOperator::Less));
        assert_eq!(calls[1].output, TypeId::Bool8);
    }

    #[test]
    fn test_default_resource_is_resolved_per_call() {
        let engine = Arc::new(RecordingEngine::default());
        let (dispatcher, resources) = recording_dispatcher(Arc::clone(&engine));
        let lhs = int_column(vec![1]);

        dispatcher.add(&lhs, 1i32, None).unwrap();
        resources.set_current(Arc::new(CountingResource::new("second")));
        dispatcher.add(&lhs, 1i32, None).unwrap();

        let explicit: MemoryResourceRef = Arc::new(CountingResource::new("explicit"));
        dispatcher.add(&lhs, 1i32, Some(&explicit)).unwrap();

        let names: Vec<String> = engine.calls.lock().iter().map(|c| c.resource.clone()).collect();
        assert_eq!(names, vec!["first", "second", "explicit"]);
    }

    #[test]
    fn test_engine_errors_pass_through_verbatim() {
        let engine = Arc::new(RecordingEngine::failing("unsupported operator for type"));
        let (dispatcher, _) = recording_dispatcher(engine);
        let err = dispatcher.mul(&int_column(vec![1]), 2i32, None).unwrap_err();
        assert_eq!(
            err,
            DispatchError::EngineLogicError("Compute error: unsupported operator for type".into())
        );
    }

    #[test]
    fn test_type_errors_skip_the_engine() {
        let engine = Arc::new(RecordingEngine::default());
        let (dispatcher, _) = recording_dispatcher(Arc::clone(&engine));
        let lhs = int_column(vec![1]);

        let err = dispatcher.add(&lhs, "text", None).unwrap_err();
        assert_eq!(err.operator(), Some("Column.add"));

        let strings = Column::try_new(Arc::new(StringArray::from(vec!["a"]))).unwrap();
        let err = dispatcher.sub(&lhs, &strings, None).unwrap_err();
        assert!(err.is_type_error());

        assert!(engine.calls.lock().is_empty());
    }

    #[test]
    fn test_apply_symbol_matches_named_entry() {
        let engine = Arc::new(RecordingEngine::default());
        let (dispatcher, _) = recording_dispatcher(Arc::clone(&engine));
        let lhs = int_column(vec![1]);

        for op in BinaryOperator::all() {
            if let Some(symbol) = op.descriptor().symbol {
                dispatcher.apply_symbol(&lhs, symbol, 1i32, None).unwrap();
                assert_eq!(engine.calls.lock().last().unwrap().operator, Some(op));
            }
        }
        assert!(dispatcher.apply_symbol(&lhs, "<>", 1i32, None).unwrap_err().is_type_error());
    }
}
