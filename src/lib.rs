//! coldispatch - typed binary-operation and reduction dispatch for columns
//!
//! A [`Dispatcher`] takes a left column, an arbitrary right-hand argument
//! (column, scalar, integer literal or floating literal) and a
//! [`BinaryOperator`], settles the output element type, and issues exactly
//! one call into an [`ExecutionEngine`]. Reductions (`min`, `max`, `sum`,
//! `minmax`) go through the same dispatcher with a widened accumulator type
//! for `sum`.
//!
//! ```
//! use std::sync::Arc;
//!
//! use arrow::array::Int32Array;
//! use coldispatch::{Column, Dispatcher, TypeId};
//!
//! let dispatcher = Dispatcher::default();
//! let column = Column::try_new(Arc::new(Int32Array::from(vec![1, 2, 3]))).unwrap();
//!
//! let sum = dispatcher.add(&column, 10, None).unwrap();
//! assert_eq!(sum.type_id(), TypeId::Int32);
//!
//! let shifted = (dispatcher.on(&column) + 0.5).unwrap();
//! assert_eq!(shifted.type_id(), TypeId::Float64);
//! ```

pub mod data;
pub mod engine;
pub mod error;
pub mod memory;
mod observability;
pub mod ops;
pub mod types;

pub use data::{Column, Operand, Scalar};
pub use engine::{ArrowEngine, EngineConfig, EngineError, ExecutionEngine};
pub use error::{DispatchError, Result};
pub use memory::{
    CountingResource, DeviceResources, MemoryResource, MemoryResourceRef, Reservation,
    ResourceAccessor,
};
pub use ops::{
    Aggregation, AggregationKind, Argument, BinaryOperator, BoundColumn, Dispatcher,
};
pub use types::{promote, TypeId};
